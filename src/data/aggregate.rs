use super::model::{CountField, Record};

/// Sum `field` over `rows`. Missing cells contribute nothing; no rows sum to 0.
pub fn sum(rows: &[&Record], field: CountField) -> i64 {
    rows.iter().filter_map(|r| field.of(r)).sum()
}

/// `field` of every row that has it, as plot-ready floats.
pub fn values(rows: &[&Record], field: CountField) -> Vec<f64> {
    rows.iter()
        .filter_map(|r| field.of(r))
        .map(|v| v as f64)
        .collect()
}

// ---------------------------------------------------------------------------
// Box-and-whisker summary
// ---------------------------------------------------------------------------

/// Whisker reach as a multiple of the inter-quartile range.
pub const WHISKER_IQR: f64 = 1.5;

/// Five-number summary drawn by a box plot. Points beyond the whiskers
/// are outliers and are not kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

impl BoxSummary {
    /// Summarise `values`; `None` when there is nothing to summarise.
    ///
    /// Quartiles interpolate linearly between closest ranks. Each whisker
    /// ends at the most extreme value within `WHISKER_IQR` × IQR of its
    /// quartile, or at the quartile itself when no value qualifies. When
    /// Q1 == Q3 the whiskers span the full data range instead.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = percentile(&sorted, 0.25);
        let median = percentile(&sorted, 0.5);
        let q3 = percentile(&sorted, 0.75);
        let iqr = q3 - q1;
        if iqr == 0.0 {
            return Some(BoxSummary {
                lower_whisker: sorted[0],
                q1,
                median,
                q3,
                upper_whisker: sorted[sorted.len() - 1],
            });
        }
        let low_fence = q1 - WHISKER_IQR * iqr;
        let high_fence = q3 + WHISKER_IQR * iqr;

        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .filter(|&v| v <= q1)
            .unwrap_or(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .filter(|&v| v >= q3)
            .unwrap_or(q3);

        Some(BoxSummary {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
        })
    }
}

/// Linear-interpolated percentile of sorted, non-empty data; `p` in `[0, 1]`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
