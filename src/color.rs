use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::Srgb;

use crate::config::CategorySpec;

// ---------------------------------------------------------------------------
// Hex parsing
// ---------------------------------------------------------------------------

/// Parse `#rrggbb` (or `rrggbb`).
pub fn parse_hex(hex: &str) -> Option<Color32> {
    let rgb: Srgb<u8> = hex.trim().parse().ok()?;
    Some(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

// ---------------------------------------------------------------------------
// Color mapping: country → Color32
// ---------------------------------------------------------------------------

/// Fixed colour per compared country, shared by all three charts.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build from the configured categories. A country with a malformed
    /// hex value is drawn in the default colour.
    pub fn new(categories: &[CategorySpec]) -> Self {
        let mapping = categories
            .iter()
            .filter_map(|cat| match parse_hex(&cat.color_hex) {
                Some(color) => Some((cat.name.clone(), color)),
                None => {
                    log::warn!("Invalid colour '{}' for {}", cat.color_hex, cat.name);
                    None
                }
            })
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a country.
    pub fn color_for(&self, country: &str) -> Color32 {
        self.mapping
            .get(country)
            .copied()
            .unwrap_or(self.default_color)
    }
}
