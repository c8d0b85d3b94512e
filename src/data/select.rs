use std::collections::BTreeMap;

use super::model::{CovidTable, Record};

/// Rows whose country equals `country`, in table order.
///
/// An unknown country selects nothing; that is not an error.
pub fn select<'a>(table: &'a CovidTable, country: &str) -> Vec<&'a Record> {
    table
        .records
        .iter()
        .filter(|r| r.country == country)
        .collect()
}

/// Join selections into one working set, keeping the order they are given in.
pub fn concat<'a, I>(selections: I) -> Vec<&'a Record>
where
    I: IntoIterator<Item = Vec<&'a Record>>,
{
    selections.into_iter().flatten().collect()
}

/// Partition a working set by country. Groups are ordered by country name
/// and keep the input order of their rows.
pub fn group_by_country<'a>(rows: &[&'a Record]) -> BTreeMap<&'a str, Vec<&'a Record>> {
    let mut groups: BTreeMap<&'a str, Vec<&'a Record>> = BTreeMap::new();
    for &row in rows {
        groups.entry(row.country.as_str()).or_default().push(row);
    }
    groups
}
