use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Viewer configuration
// ---------------------------------------------------------------------------

/// A country compared by every chart, with its fixed colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    pub name: String,
    /// `#rrggbb`
    pub color_hex: String,
}

impl CategorySpec {
    pub fn new(name: &str, color_hex: &str) -> Self {
        Self {
            name: name.to_string(),
            color_hex: color_hex.to_string(),
        }
    }
}

/// Everything the viewer needs to start. There are no flags or config
/// files; `Default` is the configuration.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Table loaded on startup, relative to the working directory.
    pub input_path: PathBuf,
    /// Compared countries in bar order. Rows for any other country are
    /// dropped from every chart.
    pub categories: Vec<CategorySpec>,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("WHO-COVID.csv"),
            // matplotlib tab:blue, tab:orange, tab:green
            categories: vec![
                CategorySpec::new("Nigeria", "#1f77b4"),
                CategorySpec::new("Afghanistan", "#ff7f0e"),
                CategorySpec::new("Paraguay", "#2ca02c"),
            ],
            window_size: [1200.0, 800.0],
            min_window_size: [600.0, 400.0],
        }
    }
}

impl ViewerConfig {
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }
}
