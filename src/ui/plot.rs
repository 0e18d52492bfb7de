use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, PlotUi, Points};

use crate::chart::{ChartRenderer, GroupedBars, LineChart};
use crate::color::SeriesColors;

// ---------------------------------------------------------------------------
// egui_plot backend
// ---------------------------------------------------------------------------

/// Draws charts with `egui_plot`, x positions being category indices.
pub struct PlotRenderer<'a> {
    ui: &'a mut Ui,
    height: f32,
}

impl<'a> PlotRenderer<'a> {
    pub fn new(ui: &'a mut Ui) -> Self {
        let height = (ui.available_height() * 0.6).clamp(220.0, 480.0);
        Self { ui, height }
    }

    fn show_plot(
        &mut self,
        id: &str,
        labels: &[String],
        y_label: &str,
        add: impl FnOnce(&mut PlotUi),
    ) {
        let labels = labels.to_vec();
        Plot::new(id.to_string())
            .legend(Legend::default())
            .height(self.height)
            .y_axis_label(y_label.to_string())
            .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
            .allow_boxed_zoom(true)
            .allow_drag(true)
            .allow_scroll(true)
            .allow_zoom(true)
            .show(self.ui, add);
    }

    fn draw_lines(&mut self, chart: &LineChart, markers: bool) {
        let colors = SeriesColors::new(chart.series.iter().map(|s| s.name.as_str()));
        self.show_plot(&chart.id, &chart.x_labels, &chart.y_label, |plot_ui| {
            for series in &chart.series {
                let color = colors.color_for(&series.name);
                // Gaps are skipped rather than drawn as zero.
                let points: Vec<[f64; 2]> = series
                    .values
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| v.map(|v| [i as f64, v]))
                    .collect();

                if markers {
                    plot_ui.points(
                        Points::new(PlotPoints::from(points.clone()))
                            .radius(3.0)
                            .color(color),
                    );
                }
                plot_ui.line(
                    Line::new(PlotPoints::from(points))
                        .name(&series.name)
                        .color(color)
                        .width(2.0),
                );
            }
        });
    }
}

/// Label for an axis tick; only integral ticks inside the range get one.
fn category_label(labels: &[String], value: f64) -> String {
    if value.fract().abs() > f64::EPSILON || value < 0.0 {
        return String::new();
    }
    labels.get(value as usize).cloned().unwrap_or_default()
}

impl ChartRenderer for PlotRenderer<'_> {
    fn line(&mut self, chart: &LineChart) {
        self.draw_lines(chart, true);
    }

    fn bars(&mut self, chart: &GroupedBars) {
        let colors = SeriesColors::new(chart.series.iter().map(|s| s.name.as_str()));
        let n = chart.series.len().max(1) as f64;
        let width = 0.8 / n;

        self.show_plot(&chart.id, &chart.categories, &chart.y_label, |plot_ui| {
            for (s, series) in chart.series.iter().enumerate() {
                let offset = (s as f64 - (n - 1.0) / 2.0) * width;
                let bars: Vec<Bar> = series
                    .values
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| {
                        v.map(|v| {
                            Bar::new(i as f64 + offset, v)
                                .width(width)
                                .name(format!("{} {}", chart.categories[i], series.name))
                        })
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name(&series.name)
                        .color(colors.color_for(&series.name)),
                );
            }
        });
    }

    fn multi_line(&mut self, chart: &LineChart) {
        self.draw_lines(chart, false);
    }
}
