use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::color::ColorMap;
use crate::config::ViewerConfig;
use crate::data::loader::load_file;
use crate::data::model::CovidTable;
use crate::data::pipeline::ChartData;

// ---------------------------------------------------------------------------
// Chart views
// ---------------------------------------------------------------------------

/// The three charts, shown one after another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartView {
    /// New cases per country, box-and-whisker.
    #[default]
    Distribution,
    /// New deaths over time.
    Trend,
    /// Total deaths per country.
    Totals,
}

impl ChartView {
    pub const ALL: [ChartView; 3] = [ChartView::Distribution, ChartView::Trend, ChartView::Totals];

    /// The view after this one, wrapping around.
    pub fn next(self) -> Self {
        match self {
            ChartView::Distribution => ChartView::Trend,
            ChartView::Trend => ChartView::Totals,
            ChartView::Totals => ChartView::Distribution,
        }
    }
}

impl fmt::Display for ChartView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartView::Distribution => "New cases (box plot)",
            ChartView::Trend => "Deaths over time",
            ChartView::Totals => "Total deaths",
        })
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Loaded table.
    pub table: CovidTable,

    /// Where `table` came from.
    pub source: PathBuf,

    /// Chart inputs derived from `table` (cached).
    pub charts: ChartData,

    /// Fixed colour per compared country.
    pub color_map: ColorMap,

    /// Chart currently on screen.
    pub view: ChartView,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: ViewerConfig, table: CovidTable, source: PathBuf) -> Self {
        let color_map = ColorMap::new(&config.categories);
        let charts = ChartData::build(&table, &config.category_names());
        Self {
            config,
            table,
            source,
            charts,
            color_map,
            view: ChartView::default(),
            status_message: None,
        }
    }

    /// Ingest a newly loaded table and recompute the charts.
    pub fn set_table(&mut self, table: CovidTable, source: PathBuf) {
        self.charts = ChartData::build(&table, &self.config.category_names());
        self.table = table;
        self.source = source;
        self.view = ChartView::default();
        self.status_message = None;
    }

    /// Load `path`, replacing the current table on success. On failure
    /// the current table stays and the error is kept for display.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        match load_file(path) {
            Ok(table) => {
                self.set_table(table, path.to_path_buf());
                Ok(())
            }
            Err(e) => {
                self.status_message = Some(format!("Error: {e:#}"));
                Err(e)
            }
        }
    }

    pub fn next_view(&mut self) {
        self.view = self.view.next();
    }
}
