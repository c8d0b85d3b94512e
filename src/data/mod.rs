/// Data layer: records, loading, selection and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → CovidTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  CovidTable   │  Vec<Record>, country index
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  select   │  rows per country → concat → group
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  sums, box summaries
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  ChartData for the three views
///   └──────────┘
/// ```

pub mod aggregate;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod select;
