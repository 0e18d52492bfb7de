use eframe::egui::{self, Color32, RichText, Ui};

use crate::chart::{percent_chart, semester_chart, time_series_chart, ChartRenderer};
use crate::data::view::percent_indicators;
use crate::state::{AppState, RendererKind, Tab};
use crate::ui::plot::PlotRenderer;
use crate::ui::table::{percent_table, TableRenderer};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open an indicator table to begin  (File → Open…)");
        });
        return;
    };

    ui.heading("Sustainability Indicators");
    if dataset.is_empty() {
        no_data(ui, "The source table has no values.");
        return;
    }

    let indicator = state.selection.indicator.clone().unwrap_or_default();
    ui.label(RichText::new(format!("Indicator: {indicator}")).size(16.0));
    ui.add_space(4.0);
    metrics_row(ui, state);
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut state.tab, Tab::TimeSeries, "📈 Time series");
        ui.selectable_value(&mut state.tab, Tab::Semesters, "📊 Semester comparison");
        ui.selectable_value(&mut state.tab, Tab::Percent, "🔍 Percentage indicators");
    });
    ui.separator();

    match state.tab {
        Tab::TimeSeries => {
            if state.views.series.is_empty() {
                no_data(ui, "No data available.");
            } else {
                let chart = time_series_chart(&state.views.series, &indicator);
                with_renderer(ui, state.renderer, |r| r.line(&chart));
            }
        }
        Tab::Semesters => {
            if state.views.semesters.is_empty() {
                no_data(ui, "No data available.");
            } else {
                let unit = state.views.series.unit().unwrap_or_default();
                let chart = semester_chart(&state.views.semesters, unit);
                with_renderer(ui, state.renderer, |r| r.bars(&chart));
            }
        }
        Tab::Percent => percent_tab(ui, state, &percent_indicators(&dataset.records)),
    }
}

fn percent_tab(ui: &mut Ui, state: &mut AppState, available: &[String]) {
    if available.is_empty() {
        no_data(ui, "No percentage indicators available.");
        return;
    }

    ui.label("Indicators:");
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for name in available {
            let mut checked = state.percent_selection.contains(name);
            if ui.checkbox(&mut checked, name).changed() {
                state.toggle_percent_indicator(name);
            }
        }
    });
    ui.separator();

    if state.percent_selection.is_empty() {
        ui.label(RichText::new("Select at least one indicator.").italics());
        return;
    }
    let pivot = &state.views.percent;
    if pivot.is_empty() {
        no_data(ui, "No data available.");
        return;
    }

    let chart = percent_chart(pivot);
    with_renderer(ui, state.renderer, |r| r.multi_line(&chart));
    if state.renderer == RendererKind::Plot {
        ui.add_space(8.0);
        percent_table(ui, pivot);
    }
}

/// Run `draw` against the renderer the user picked.
fn with_renderer(ui: &mut Ui, kind: RendererKind, draw: impl FnOnce(&mut dyn ChartRenderer)) {
    match kind {
        RendererKind::Plot => draw(&mut PlotRenderer::new(ui)),
        RendererKind::Table => draw(&mut TableRenderer::new(ui)),
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

fn metrics_row(ui: &mut Ui, state: &AppState) {
    let series = &state.views.series;
    let unit = series.unit().unwrap_or_default();
    let metrics = [
        ("Latest value", series.latest_value()),
        ("Historical maximum", series.max_value()),
        ("Historical minimum", series.min_value()),
    ];

    ui.columns(metrics.len(), |cols| {
        for (col, (title, value)) in cols.iter_mut().zip(metrics) {
            col.group(|ui: &mut Ui| {
                ui.label(RichText::new(title).weak());
                ui.label(RichText::new(format_metric(value, unit)).size(22.0).strong());
            });
        }
    });
}

/// `"12 %"`, or a dash when the selection is empty.
pub fn format_metric(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) if unit.is_empty() => format!("{v}"),
        Some(v) => format!("{v} {unit}"),
        None => "–".to_string(),
    }
}

fn no_data(ui: &mut Ui, message: &str) {
    ui.add_space(12.0);
    ui.label(RichText::new(message).color(Color32::from_rgb(230, 170, 40)));
}

/// Footer line under the central panel.
pub fn footer(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        match &state.source {
            Some(path) => ui.weak(format!("Source: {}", path.display())),
            None => ui.weak("No source loaded"),
        };
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
            ui.weak("Indicator dashboard");
        });
    });
}
