use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::Half;
use crate::state::{AppState, RendererKind};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Arc clone so the state can be mutated while iterating the domains.
    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Indicator ----
            ui.strong("Indicator");
            let current = state.selection.indicator.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("indicator")
                .selected_text(&current)
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for name in &dataset.indicators {
                        if ui.selectable_label(current == *name, name).clicked() {
                            state.select_indicator(name);
                        }
                    }
                });
            ui.separator();

            // ---- Years ----
            let n_selected = state.selection.years.len();
            ui.strong(format!("Years  ({n_selected}/{})", dataset.years.len()));
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.set_all_years(true);
                }
                if ui.small_button("None").clicked() {
                    state.set_all_years(false);
                }
            });
            for year in &dataset.years {
                let mut checked = state.selection.years.contains(year);
                if ui.checkbox(&mut checked, year).changed() {
                    state.toggle_year(year);
                }
            }
            ui.separator();

            // ---- Halves ----
            ui.strong("Semesters");
            for half in Half::ALL {
                let mut checked = state.selection.halves.contains(&half);
                if ui.checkbox(&mut checked, half.to_string()).changed() {
                    state.toggle_half(half);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.source.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
            if ui.button("Clear cache").clicked() {
                state.cache.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .selectable_label(state.renderer == RendererKind::Plot, "Charts")
            .clicked()
        {
            state.renderer = RendererKind::Plot;
        }
        if ui
            .selectable_label(state.renderer == RendererKind::Table, "Tables")
            .clicked()
        {
            state.renderer = RendererKind::Table;
        }

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records, {} indicators, {} shown ({} cached)",
                ds.len(),
                ds.indicators.len(),
                state.views.series.records.len(),
                state.cache.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open indicator table")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON workbook", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(path);
    }
}
