use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{cast, cast_with_options, CastOptions};
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{
    count_from_f64, count_from_text, CovidTable, Record, COUNTRY_CODE_COLUMN, COUNTRY_COLUMN, DATE_COLUMN, NEW_CASES_COLUMN,
    NEW_DEATHS_COLUMN, REQUIRED_COLUMNS,
};

/// Domain failures while turning a file into a [`CovidTable`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("'{0}' is not a valid report date")]
    InvalidDate(String),
    #[error("'{0}' is not an integer count")]
    InvalidCount(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a report table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the WHO daily report export (extra columns ignored)
/// * `.json`    – `[{ "Date_reported": "...", "Country": "...", ... }, ...]`
/// * `.parquet` – same columns; dates as `Date32`, timestamps or text
pub fn load_file(path: &Path) -> Result<CovidTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    }?;

    if table.is_empty() {
        log::warn!("{} contains no records", path.display());
    }
    log::info!(
        "Loaded {} records for {} countries from {}",
        table.len(),
        table.countries.len(),
        path.display()
    );
    Ok(table)
}

/// Fail on the first required column missing from `headers`.
fn check_columns<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<(), LoadError> {
    let present: Vec<&str> = headers.into_iter().map(str::trim).collect();
    match REQUIRED_COLUMNS.iter().find(|&&col| !present.contains(&col)) {
        Some(missing) => Err(LoadError::MissingColumn(missing.to_string())),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<CovidTable> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    read_csv(file)
}

/// Parse CSV text with a header row into a table.
pub fn read_csv<R: io::Read>(source: R) -> Result<CovidTable> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(source);
    let headers = reader.headers().context("reading CSV headers")?;
    check_columns(headers.iter())?;

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<Record>().enumerate() {
        let record = result.with_context(|| format!("CSV line {}", row_no + 2))?;
        records.push(record);
    }

    Ok(CovidTable::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient="records", date_format="iso")`):
///
/// ```json
/// [
///   {
///     "Date_reported": "2020-01-03",
///     "Country_code": "NG",
///     "Country": "Nigeria",
///     "New_cases": 0,
///     "New_deaths": null
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<CovidTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let records: Vec<Record> = serde_json::from_str(&text).context("parsing JSON records")?;
    Ok(CovidTable::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export of the report table.
///
/// Columns are cast to the types the record needs, so files written by
/// **Pandas** (`datetime64` dates, float counts with nulls) and **Polars**
/// (`Date` dates, integer counts) both load.
fn load_parquet(path: &Path) -> Result<CovidTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        read_batch(&batch, &mut records)?;
    }

    Ok(CovidTable::from_records(records))
}

fn read_batch(batch: &RecordBatch, out: &mut Vec<Record>) -> Result<()> {
    let schema = batch.schema();
    check_columns(schema.fields().iter().map(|f| f.name().as_str()))?;

    let dates = typed_column(batch, DATE_COLUMN, &DataType::Date32)?;
    let dates = dates.as_primitive::<Date32Type>();
    let codes = typed_column(batch, COUNTRY_CODE_COLUMN, &DataType::Utf8)?;
    let codes = codes.as_string::<i32>();
    let countries = typed_column(batch, COUNTRY_COLUMN, &DataType::Utf8)?;
    let countries = countries.as_string::<i32>();
    let cases = count_column(batch, NEW_CASES_COLUMN)?;
    let deaths = count_column(batch, NEW_DEATHS_COLUMN)?;

    out.reserve(batch.num_rows());
    for row in 0..batch.num_rows() {
        let date = (!dates.is_null(row))
            .then(|| dates.value_as_date(row))
            .flatten()
            .with_context(|| format!("Row {row}: missing '{DATE_COLUMN}'"))?;
        let text = |arr: &arrow::array::StringArray| {
            if arr.is_null(row) {
                String::new()
            } else {
                arr.value(row).to_string()
            }
        };

        out.push(Record {
            date,
            country_code: text(codes),
            country: text(countries),
            new_cases: cases[row],
            new_deaths: deaths[row],
        });
    }
    Ok(())
}

/// Look up a column by name and cast it to `to`.
fn typed_column(batch: &RecordBatch, name: &str, to: &DataType) -> Result<ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| LoadError::MissingColumn(name.to_string()))?;
    cast(batch.column(idx), to).with_context(|| format!("casting '{name}' to {to:?}"))
}

/// Read a count column with the same rules as the CSV and JSON loaders:
/// floats must be integral, text must parse, nulls are missing counts.
fn count_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<i64>>> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| LoadError::MissingColumn(name.to_string()))?;
    let col = batch.column(idx);

    match col.data_type() {
        DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let floats = cast(col, &DataType::Float64)
                .with_context(|| format!("casting '{name}' to Float64"))?;
            floats
                .as_primitive::<Float64Type>()
                .iter()
                .enumerate()
                .map(|(row, v)| match v {
                    Some(f) => count_from_f64(f).with_context(|| format!("Row {row}: '{name}'")),
                    None => Ok(None),
                })
                .collect()
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let text = cast(col, &DataType::Utf8)
                .with_context(|| format!("casting '{name}' to Utf8"))?;
            text.as_string::<i32>()
                .iter()
                .enumerate()
                .map(|(row, v)| match v {
                    Some(t) => count_from_text(t).with_context(|| format!("Row {row}: '{name}'")),
                    None => Ok(None),
                })
                .collect()
        }
        _ => {
            let options = CastOptions {
                safe: false,
                ..Default::default()
            };
            let ints = cast_with_options(col, &DataType::Int64, &options)
                .with_context(|| format!("casting '{name}' to Int64"))?;
            Ok(ints.as_primitive::<Int64Type>().iter().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Date32Array, Float64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use chrono::NaiveDate;
    use parquet::arrow::ArrowWriter;
    use tempfile::NamedTempFile;

    use super::*;

    const WHO_SAMPLE: &str = "\
Date_reported,Country_code,Country,WHO_region,New_cases,Cumulative_cases,New_deaths,Cumulative_deaths
2020-01-03,NG,Nigeria,AFRO,0,0,0,0
2020-01-03,TD,Chad,AFRO,,0,,0
2020-01-04,NG,Nigeria,AFRO,12,12,1,1
";

    fn temp_with_suffix(suffix: &str, contents: &[u8]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_who_csv_ignoring_extra_columns() {
        let table = read_csv(WHO_SAMPLE.as_bytes()).unwrap();

        assert_eq!(table.len(), 3);
        let first = &table.records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2020, 1, 3).unwrap());
        assert_eq!(first.country_code, "NG");
        assert_eq!(first.country, "Nigeria");
        assert_eq!(first.new_cases, Some(0));

        let chad = &table.records[1];
        assert_eq!(chad.new_cases, None);
        assert_eq!(chad.new_deaths, None);
        assert_eq!(table.records[2].new_deaths, Some(1));
    }

    #[test]
    fn accepts_integral_float_counts() {
        let csv = "Date_reported,Country_code,Country,New_cases,New_deaths\n\
                   2021-01-01,PY,Paraguay,4.0,-1\n";
        let table = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.records[0].new_cases, Some(4));
        assert_eq!(table.records[0].new_deaths, Some(-1));
    }

    #[test]
    fn rejects_missing_column() {
        let csv = "Date_reported,Country,New_cases,New_deaths\n2021-01-01,Chad,1,0\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        match err.downcast_ref::<LoadError>() {
            Some(LoadError::MissingColumn(col)) => assert_eq!(col, "Country_code"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_counts() {
        let csv = "Date_reported,Country_code,Country,New_cases,New_deaths\n\
                   2021-01-01,TD,Chad,many,0\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("CSV line 2"));
        assert!(format!("{err:#}").contains("many"));
    }

    #[test]
    fn rejects_bad_dates() {
        let csv = "Date_reported,Country_code,Country,New_cases,New_deaths\n\
                   yesterday,TD,Chad,1,0\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("yesterday"));
    }

    #[test]
    fn load_file_dispatches_csv() {
        let file = temp_with_suffix(".csv", WHO_SAMPLE.as_bytes());
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.contains_country("Chad"));
    }

    #[test]
    fn load_file_reads_records_json() {
        let json = r#"[
            {"Date_reported": "2020-01-03T00:00:00.000", "Country_code": "AF",
             "Country": "Afghanistan", "New_cases": 3.0, "New_deaths": null},
            {"Date_reported": "2020-01-04", "Country_code": "AF",
             "Country": "Afghanistan", "New_cases": 5, "New_deaths": 1}
        ]"#;
        let file = temp_with_suffix(".json", json.as_bytes());
        let table = load_file(file.path()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].new_cases, Some(3));
        assert_eq!(table.records[0].new_deaths, None);
        assert_eq!(table.records[1].date, NaiveDate::from_ymd_opt(2020, 1, 4).unwrap());
    }

    #[test]
    fn load_file_reads_parquet_with_float_counts() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(DATE_COLUMN, DataType::Date32, false),
            Field::new(COUNTRY_CODE_COLUMN, DataType::Utf8, true),
            Field::new(COUNTRY_COLUMN, DataType::Utf8, false),
            Field::new(NEW_CASES_COLUMN, DataType::Float64, true),
            Field::new(NEW_DEATHS_COLUMN, DataType::Float64, true),
        ]));
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let day = |d: NaiveDate| (d - epoch).num_days() as i32;
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Date32Array::from(vec![
                    day(NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()),
                    day(NaiveDate::from_ymd_opt(2020, 3, 2).unwrap()),
                ])),
                Arc::new(StringArray::from(vec![Some("PY"), None])),
                Arc::new(StringArray::from(vec!["Paraguay", "Paraguay"])),
                Arc::new(Float64Array::from(vec![Some(7.0), None])),
                Arc::new(Float64Array::from(vec![Some(0.0), Some(2.0)])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].date, NaiveDate::from_ymd_opt(2020, 3, 1).unwrap());
        assert_eq!(table.records[0].new_cases, Some(7));
        assert_eq!(table.records[1].country_code, "");
        assert_eq!(table.records[1].new_cases, None);
        assert_eq!(table.records[1].new_deaths, Some(2));
    }

    /// One Paraguay row on 2020-03-01 with the given count columns.
    fn parquet_with_counts(cases: ArrayRef, deaths: ArrayRef) -> NamedTempFile {
        let schema = Arc::new(Schema::new(vec![
            Field::new(DATE_COLUMN, DataType::Date32, false),
            Field::new(COUNTRY_CODE_COLUMN, DataType::Utf8, false),
            Field::new(COUNTRY_COLUMN, DataType::Utf8, false),
            Field::new(NEW_CASES_COLUMN, cases.data_type().clone(), true),
            Field::new(NEW_DEATHS_COLUMN, deaths.data_type().clone(), true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Date32Array::from(vec![18322])),
                Arc::new(StringArray::from(vec!["PY"])),
                Arc::new(StringArray::from(vec!["Paraguay"])),
                cases,
                deaths,
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    #[test]
    fn parquet_rejects_fractional_float_counts() {
        let file = parquet_with_counts(
            Arc::new(Float64Array::from(vec![Some(4.7)])),
            Arc::new(Float64Array::from(vec![Some(0.0)])),
        );
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::InvalidCount(v)) if v == "4.7"
        ));
    }

    #[test]
    fn parquet_rejects_non_numeric_text_counts() {
        let file = parquet_with_counts(
            Arc::new(StringArray::from(vec![Some("12")])),
            Arc::new(StringArray::from(vec![Some("many")])),
        );
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::InvalidCount(v)) if v == "many"
        ));
    }

    #[test]
    fn parquet_reads_numeric_text_counts() {
        let file = parquet_with_counts(
            Arc::new(StringArray::from(vec![Some(" 12 ")])),
            Arc::new(StringArray::from(vec![None::<&str>])),
        );
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.records[0].date, NaiveDate::from_ymd_opt(2020, 3, 1).unwrap());
        assert_eq!(table.records[0].new_cases, Some(12));
        assert_eq!(table.records[0].new_deaths, None);
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let file = temp_with_suffix(".xlsx", b"");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }
}
