use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// One output row, in WHO column order.
#[derive(Serialize)]
struct Row {
    #[serde(rename = "Date_reported")]
    date: String,
    #[serde(rename = "Country_code")]
    country_code: &'static str,
    #[serde(rename = "Country")]
    country: &'static str,
    #[serde(rename = "WHO_region")]
    region: &'static str,
    #[serde(rename = "New_cases")]
    new_cases: Option<i64>,
    #[serde(rename = "New_deaths")]
    new_deaths: Option<i64>,
}

/// A synthetic outbreak: sum of Gaussian waves `(peak_day, width_days, peak_cases)`.
struct Outbreak {
    code: &'static str,
    country: &'static str,
    region: &'static str,
    waves: &'static [(f64, f64, f64)],
    fatality: f64,
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const OUTBREAKS: [Outbreak; 4] = [
    Outbreak {
        code: "NG",
        country: "Nigeria",
        region: "AFRO",
        waves: &[(200.0, 30.0, 900.0), (390.0, 25.0, 1500.0), (600.0, 40.0, 700.0)],
        fatality: 0.012,
    },
    Outbreak {
        code: "AF",
        country: "Afghanistan",
        region: "EMRO",
        waves: &[(160.0, 35.0, 700.0), (520.0, 30.0, 1800.0)],
        fatality: 0.04,
    },
    Outbreak {
        code: "PY",
        country: "Paraguay",
        region: "AMRO",
        waves: &[(280.0, 45.0, 1200.0), (500.0, 35.0, 2600.0)],
        fatality: 0.025,
    },
    Outbreak {
        code: "TD",
        country: "Chad",
        region: "AFRO",
        waves: &[(350.0, 60.0, 150.0)],
        fatality: 0.03,
    },
];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2020, 1, 3).context("invalid start date")?;
    let days = 730;

    let mut rows = Vec::with_capacity(OUTBREAKS.len() * days);
    for outbreak in &OUTBREAKS {
        for day in 0..days {
            let date = start + Duration::days(day as i64);
            let expected: f64 = outbreak
                .waves
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(day as f64, mu, sigma, amp))
                .sum();
            let cases = rng.gauss(expected, expected.sqrt() + 1.0).round().max(0.0);
            let deaths = rng
                .gauss(cases * outbreak.fatality, (cases * outbreak.fatality).sqrt())
                .round()
                .max(0.0);

            // Occasional unreported day, as in the real export.
            let reported = rng.next_f64() > 0.02;
            rows.push(Row {
                date: date.format("%Y-%m-%d").to_string(),
                country_code: outbreak.code,
                country: outbreak.country,
                region: outbreak.region,
                new_cases: reported.then_some(cases as i64),
                new_deaths: reported.then_some(deaths as i64),
            });
        }
    }

    // Write CSV
    let csv_path = "WHO-COVID.csv";
    let mut writer = csv::Writer::from_path(csv_path).context("creating CSV output")?;
    for row in &rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV output")?;

    // Write Parquet
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("invalid epoch")?;
    let start_day = (start - epoch).num_days() as i32;
    let schema = Arc::new(Schema::new(vec![
        Field::new("Date_reported", DataType::Date32, false),
        Field::new("Country_code", DataType::Utf8, false),
        Field::new("Country", DataType::Utf8, false),
        Field::new("WHO_region", DataType::Utf8, false),
        Field::new("New_cases", DataType::Int64, true),
        Field::new("New_deaths", DataType::Int64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Date32Array::from(
                (0..rows.len())
                    .map(|i| start_day + (i % days) as i32)
                    .collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(rows.iter().map(|r| r.country_code).collect::<Vec<_>>())),
            Arc::new(StringArray::from(rows.iter().map(|r| r.country).collect::<Vec<_>>())),
            Arc::new(StringArray::from(rows.iter().map(|r| r.region).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.new_cases).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.new_deaths).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let parquet_path = "WHO-COVID.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    println!(
        "Wrote {} rows for {} countries to {csv_path} and {parquet_path}",
        rows.len(),
        OUTBREAKS.len()
    );
    Ok(())
}
