use chrono::{Datelike, NaiveDate};

use super::aggregate::{self, BoxSummary};
use super::model::{CountField, CovidTable};
use super::select;

// ---------------------------------------------------------------------------
// Plot-ready data for the three charts
// ---------------------------------------------------------------------------

/// One country's (date, new deaths) line, dates mapped with [`date_to_x`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub country: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryTotal {
    pub country: String,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxGroup {
    pub country: String,
    pub summary: BoxSummary,
}

/// Everything the charts draw, derived from one table and one ordered
/// list of countries. Countries outside that list never appear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    /// New deaths over time, one series per listed country.
    pub trend: Vec<TrendSeries>,
    /// Total new deaths, one entry per listed country, in list order.
    pub totals: Vec<CountryTotal>,
    /// New-case distributions, grouped and ordered by country name.
    /// Countries with no rows have no group.
    pub distribution: Vec<BoxGroup>,
}

impl ChartData {
    pub fn build<S: AsRef<str>>(table: &CovidTable, countries: &[S]) -> Self {
        let selections: Vec<_> = countries
            .iter()
            .map(|c| {
                let rows = select::select(table, c.as_ref());
                log::debug!("{}: {} rows selected", c.as_ref(), rows.len());
                if rows.is_empty() && !table.contains_country(c.as_ref()) {
                    log::debug!("{} does not occur in the loaded table", c.as_ref());
                }
                (c.as_ref(), rows)
            })
            .collect();

        let trend = selections
            .iter()
            .map(|(country, rows)| TrendSeries {
                country: country.to_string(),
                points: rows
                    .iter()
                    .filter_map(|r| {
                        CountField::Deaths
                            .of(r)
                            .map(|deaths| [date_to_x(r.date), deaths as f64])
                    })
                    .collect(),
            })
            .collect();

        let totals = selections
            .iter()
            .map(|(country, rows)| CountryTotal {
                country: country.to_string(),
                total: aggregate::sum(rows, CountField::Deaths),
            })
            .collect();

        let working_set = select::concat(selections.into_iter().map(|(_, rows)| rows));
        let distribution = select::group_by_country(&working_set)
            .into_iter()
            .filter_map(|(country, rows)| {
                let summary =
                    BoxSummary::from_values(&aggregate::values(&rows, CountField::Cases))?;
                Some(BoxGroup {
                    country: country.to_string(),
                    summary,
                })
            })
            .collect();

        ChartData {
            trend,
            totals,
            distribution,
        }
    }

    /// Total for `country`, zero when it is not listed.
    pub fn total_for(&self, country: &str) -> i64 {
        self.totals
            .iter()
            .find(|t| t.country == country)
            .map_or(0, |t| t.total)
    }
}

// ---------------------------------------------------------------------------
// Date axis mapping
// ---------------------------------------------------------------------------

/// Plot x coordinate of a date: days since 0001-01-01 (CE day 1).
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of [`date_to_x`], rounding to the nearest day.
pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x < i32::MIN as f64 || x > i32::MAX as f64 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}
