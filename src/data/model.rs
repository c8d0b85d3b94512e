use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use super::loader::LoadError;

// ---------------------------------------------------------------------------
// Column names of the WHO daily report table
// ---------------------------------------------------------------------------

pub const DATE_COLUMN: &str = "Date_reported";
pub const COUNTRY_CODE_COLUMN: &str = "Country_code";
pub const COUNTRY_COLUMN: &str = "Country";
pub const NEW_CASES_COLUMN: &str = "New_cases";
pub const NEW_DEATHS_COLUMN: &str = "New_deaths";

/// Columns every input table must carry. Anything else is ignored.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    DATE_COLUMN,
    COUNTRY_CODE_COLUMN,
    COUNTRY_COLUMN,
    NEW_CASES_COLUMN,
    NEW_DEATHS_COLUMN,
];

// ---------------------------------------------------------------------------
// Record – one row of the report table
// ---------------------------------------------------------------------------

/// A single daily report for one country.
///
/// Counts are `None` when the source cell is empty. WHO publishes negative
/// daily counts for retroactive corrections, so counts are signed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Record {
    #[serde(rename = "Date_reported", deserialize_with = "report_date::deserialize")]
    pub date: NaiveDate,
    #[serde(rename = "Country_code", default)]
    pub country_code: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "New_cases", default, deserialize_with = "count::deserialize")]
    pub new_cases: Option<i64>,
    #[serde(rename = "New_deaths", default, deserialize_with = "count::deserialize")]
    pub new_deaths: Option<i64>,
}

// ---------------------------------------------------------------------------
// CountField – which numeric column an aggregation reads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountField {
    Cases,
    Deaths,
}

impl CountField {
    /// Read this field from a record.
    pub fn of(self, record: &Record) -> Option<i64> {
        match self {
            CountField::Cases => record.new_cases,
            CountField::Deaths => record.new_deaths,
        }
    }

    /// Source column name.
    pub fn column(self) -> &'static str {
        match self {
            CountField::Cases => NEW_CASES_COLUMN,
            CountField::Deaths => NEW_DEATHS_COLUMN,
        }
    }
}

impl fmt::Display for CountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// CovidTable – the complete loaded table
// ---------------------------------------------------------------------------

/// All records in file order, plus the distinct country names seen.
#[derive(Debug, Clone, Default)]
pub struct CovidTable {
    pub records: Vec<Record>,
    pub countries: BTreeSet<String>,
}

impl CovidTable {
    /// Build the country index from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let countries = records.iter().map(|r| r.country.clone()).collect();
        CovidTable { records, countries }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains_country(&self, country: &str) -> bool {
        self.countries.contains(country)
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// Parse a report date. Accepts `YYYY-MM-DD`, `YYYY/MM/DD` and ISO
/// datetimes such as pandas' `to_json(date_format="iso")` output.
pub fn parse_report_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
                .ok()
                .map(|dt| dt.date())
        })
}

/// Count from a float cell. NaN is a missing count; anything non-integral
/// is rejected.
pub fn count_from_f64(f: f64) -> Result<Option<i64>, LoadError> {
    if f.is_nan() {
        Ok(None)
    } else if f.is_finite() && f.fract() == 0.0 {
        Ok(Some(f as i64))
    } else {
        Err(LoadError::InvalidCount(f.to_string()))
    }
}

/// Count from a text cell. Blank text is a missing count.
pub fn count_from_text(t: &str) -> Result<Option<i64>, LoadError> {
    let t = t.trim();
    if t.is_empty() {
        return Ok(None);
    }
    t.parse::<i64>()
        .map(Some)
        .map_err(|_| LoadError::InvalidCount(t.to_string()))
}

mod report_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};

    use super::{parse_report_date, LoadError};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse_report_date(&raw).ok_or_else(|| serde::de::Error::custom(LoadError::InvalidDate(raw)))
    }
}

mod count {
    use serde::{Deserialize, Deserializer};

    use super::{count_from_f64, count_from_text};

    /// Counts arrive as integers, as integral floats (pandas widens int
    /// columns holding NaN to float64) or as numeric text.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Int(i64),
        Float(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        let raw: Option<RawCount> = Option::deserialize(d)?;
        match raw {
            None => Ok(None),
            Some(RawCount::Int(i)) => Ok(Some(i)),
            Some(RawCount::Float(f)) => count_from_f64(f).map_err(serde::de::Error::custom),
            Some(RawCount::Text(t)) => count_from_text(&t).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 9).unwrap();
        assert_eq!(parse_report_date("2021-03-09"), Some(expected));
        assert_eq!(parse_report_date("2021/03/09"), Some(expected));
        assert_eq!(parse_report_date("2021-03-09T00:00:00.000"), Some(expected));
        assert_eq!(parse_report_date(" 2021-03-09 "), Some(expected));
        assert_eq!(parse_report_date("09.03.2021"), None);
    }

    #[test]
    fn counts_must_be_integral() {
        assert_eq!(count_from_f64(4.0).unwrap(), Some(4));
        assert_eq!(count_from_f64(f64::NAN).unwrap(), None);
        assert!(matches!(count_from_f64(4.7), Err(LoadError::InvalidCount(v)) if v == "4.7"));
        assert!(count_from_f64(f64::INFINITY).is_err());

        assert_eq!(count_from_text(" -3 ").unwrap(), Some(-3));
        assert_eq!(count_from_text("").unwrap(), None);
        assert!(matches!(count_from_text("many"), Err(LoadError::InvalidCount(v)) if v == "many"));
    }

    #[test]
    fn table_indexes_distinct_countries() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 3).unwrap();
        let row = |country: &str| Record {
            date,
            country_code: String::new(),
            country: country.to_string(),
            new_cases: Some(1),
            new_deaths: None,
        };
        let table = CovidTable::from_records(vec![row("Chad"), row("Nigeria"), row("Chad")]);

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.countries.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["Chad", "Nigeria"]
        );
        assert!(table.contains_country("Nigeria"));
        assert!(!table.contains_country("Paraguay"));
    }

    #[test]
    fn count_field_reads_its_column() {
        let record = Record {
            date: NaiveDate::from_ymd_opt(2020, 1, 3).unwrap(),
            country_code: "NG".into(),
            country: "Nigeria".into(),
            new_cases: Some(12),
            new_deaths: Some(2),
        };
        assert_eq!(CountField::Cases.of(&record), Some(12));
        assert_eq!(CountField::Deaths.of(&record), Some(2));
        assert_eq!(CountField::Deaths.to_string(), "New_deaths");
    }
}
