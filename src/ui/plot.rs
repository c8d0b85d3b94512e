use std::ops::RangeInclusive;

use eframe::egui::{Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints,
};

use crate::data::pipeline::x_to_date;
use crate::state::{AppState, ChartView};

/// Render whichever chart is selected in the central panel.
pub fn chart_view(ui: &mut Ui, state: &AppState) {
    match state.view {
        ChartView::Distribution => distribution_plot(ui, state),
        ChartView::Trend => trend_plot(ui, state),
        ChartView::Totals => totals_plot(ui, state),
    }
}

/// Axis formatter naming the category at each integer position.
fn category_axis(names: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let pos = mark.value;
        if pos.fract() != 0.0 || pos < 0.0 {
            return String::new();
        }
        names.get(pos as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Trend line view
// ---------------------------------------------------------------------------

/// New deaths over time, one line per country on shared axes.
pub fn trend_plot(ui: &mut Ui, state: &AppState) {
    Plot::new("trend_plot")
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Death")
        .x_axis_formatter(|mark, _range| {
            x_to_date(mark.value)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &state.charts.trend {
                let points: PlotPoints = series.points.iter().copied().collect();
                let line = Line::new(points)
                    .name(&series.country)
                    .color(state.color_map.color_for(&series.country))
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Aggregate bar view
// ---------------------------------------------------------------------------

/// One bar of total deaths per country, in configured order and colour.
pub fn totals_plot(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading("Death vs Country");
    });

    let categories = &state.config.categories;
    let names: Vec<String> = categories.iter().map(|c| c.name.clone()).collect();
    let bars: Vec<Bar> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Bar::new(i as f64, state.charts.total_for(&c.name) as f64)
                .name(&c.name)
                .fill(state.color_map.color_for(&c.name))
                .width(0.6)
        })
        .collect();

    Plot::new("totals_plot")
        .x_axis_label("Countries")
        .y_axis_label("Deaths per country")
        .x_axis_formatter(category_axis(names))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Distribution view
// ---------------------------------------------------------------------------

/// New cases per country as box-and-whisker summaries, outliers hidden.
pub fn distribution_plot(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading("New_cases grouped by Country");
    });

    let names: Vec<String> = state
        .charts
        .distribution
        .iter()
        .map(|g| g.country.clone())
        .collect();

    Plot::new("distribution_plot")
        .legend(Legend::default())
        .x_axis_label("Country")
        .y_axis_label("New cases")
        .x_axis_formatter(category_axis(names))
        .show(ui, |plot_ui| {
            for (i, group) in state.charts.distribution.iter().enumerate() {
                let s = &group.summary;
                let color = state.color_map.color_for(&group.country);
                let elem = BoxElem::new(
                    i as f64,
                    BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
                )
                .name(&group.country)
                .box_width(0.5)
                .whisker_width(0.3)
                .fill(color.linear_multiply(0.25))
                .stroke(Stroke::new(1.5, color));

                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&group.country));
            }
        });
}
