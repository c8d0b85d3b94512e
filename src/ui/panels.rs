use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, ChartView};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar: file menu, one tab per chart, and a
/// button stepping to the next chart.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for view in ChartView::ALL {
            if ui
                .selectable_label(state.view == view, view.to_string())
                .clicked()
            {
                state.view = view;
            }
        }
        if ui.button("Next ▸").clicked() {
            state.next_view();
        }

        ui.separator();

        ui.label(format!(
            "{} records, {} countries ({})",
            state.table.len(),
            state.table.countries.len(),
            state
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        ));

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open WHO COVID-19 report")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load(&path) {
            log::error!("Failed to load {}: {e:#}", path.display());
        }
    }
}
