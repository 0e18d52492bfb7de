use crate::data::view::{PercentPivot, SemesterPivot, TimeSeries};

// ---------------------------------------------------------------------------
// Framework-free chart descriptions
// ---------------------------------------------------------------------------

/// One named series, aligned with the chart's x labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Line chart over categorical x positions.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub id: String,
    pub x_labels: Vec<String>,
    pub y_label: String,
    pub series: Vec<Series>,
}

/// Grouped bars: one group per category, one bar per series within it.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedBars {
    pub id: String,
    pub categories: Vec<String>,
    pub y_label: String,
    pub series: Vec<Series>,
}

/// A display backend for the dashboard charts.
pub trait ChartRenderer {
    fn line(&mut self, chart: &LineChart);
    fn bars(&mut self, chart: &GroupedBars);
    fn multi_line(&mut self, chart: &LineChart);
}

// ---------------------------------------------------------------------------
// Views → charts
// ---------------------------------------------------------------------------

pub fn time_series_chart(series: &TimeSeries, name: &str) -> LineChart {
    LineChart {
        id: "time_series".to_string(),
        x_labels: series.records.iter().map(|r| r.period_label.clone()).collect(),
        y_label: series.unit().unwrap_or_default().to_string(),
        series: vec![Series {
            name: name.to_string(),
            values: series.records.iter().map(|r| Some(r.value)).collect(),
        }],
    }
}

pub fn semester_chart(pivot: &SemesterPivot, unit: &str) -> GroupedBars {
    GroupedBars {
        id: "semesters".to_string(),
        categories: pivot.years.clone(),
        y_label: unit.to_string(),
        series: pivot
            .halves
            .iter()
            .map(|half| Series {
                name: half.humanized().to_string(),
                values: pivot.years.iter().map(|y| pivot.value(y, *half)).collect(),
            })
            .collect(),
    }
}

pub fn percent_chart(pivot: &PercentPivot) -> LineChart {
    LineChart {
        id: "percent".to_string(),
        x_labels: pivot.period_labels(),
        y_label: "%".to_string(),
        series: pivot
            .indicators
            .iter()
            .zip(&pivot.values)
            .map(|(name, values)| Series {
                name: name.clone(),
                values: values.clone(),
            })
            .collect(),
    }
}
