use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::chart::{ChartRenderer, GroupedBars, LineChart, Series};
use crate::data::view::{round_one_decimal, PercentPivot};

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// egui_extras table backend
// ---------------------------------------------------------------------------

/// Shows chart data as plain tables, values rounded to one decimal.
pub struct TableRenderer<'a> {
    ui: &'a mut Ui,
}

impl<'a> TableRenderer<'a> {
    pub fn new(ui: &'a mut Ui) -> Self {
        Self { ui }
    }

    /// One row per label, one column per series.
    fn by_label(&mut self, id: &str, corner: &str, labels: &[String], series: &[Series]) {
        self.ui.push_id(id, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .column(Column::auto().at_least(120.0))
                .columns(Column::auto().at_least(80.0), series.len())
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    header.col(|ui| {
                        ui.strong(corner);
                    });
                    for s in series {
                        header.col(|ui| {
                            ui.strong(&s.name);
                        });
                    }
                })
                .body(|mut body| {
                    for (i, label) in labels.iter().enumerate() {
                        body.row(ROW_HEIGHT, |mut row| {
                            row.col(|ui| {
                                ui.label(label);
                            });
                            for s in series {
                                row.col(|ui| {
                                    ui.label(format_cell(s.values.get(i).copied().flatten()));
                                });
                            }
                        });
                    }
                });
        });
    }
}

/// `"12.3"`, or an empty string for a missing value.
pub fn format_cell(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", round_one_decimal(v)))
        .unwrap_or_default()
}

impl ChartRenderer for TableRenderer<'_> {
    fn line(&mut self, chart: &LineChart) {
        self.by_label(&chart.id, "Period", &chart.x_labels, &chart.series);
    }

    fn bars(&mut self, chart: &GroupedBars) {
        self.by_label(&chart.id, "Year", &chart.categories, &chart.series);
    }

    fn multi_line(&mut self, chart: &LineChart) {
        self.by_label(&chart.id, "Period", &chart.x_labels, &chart.series);
    }
}

// ---------------------------------------------------------------------------
// Percentage summary table (indicators as rows)
// ---------------------------------------------------------------------------

pub fn percent_table(ui: &mut Ui, pivot: &PercentPivot) {
    let labels = pivot.period_labels();
    ui.push_id("percent_table", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(160.0))
            .columns(Column::auto().at_least(90.0), labels.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Indicator");
                });
                for label in &labels {
                    header.col(|ui| {
                        ui.strong(label);
                    });
                }
            })
            .body(|mut body| {
                for (i, name) in pivot.indicators.iter().enumerate() {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui| {
                            ui.label(name);
                        });
                        for p in 0..labels.len() {
                            row.col(|ui| {
                                ui.label(format_cell(pivot.display_value(i, p)));
                            });
                        }
                    });
                }
            });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_rounded_or_blank() {
        assert_eq!(format_cell(Some(41.26)), "41.3");
        assert_eq!(format_cell(Some(12.0)), "12.0");
        assert_eq!(format_cell(None), "");
    }
}
