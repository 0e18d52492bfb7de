use std::collections::{BTreeSet, HashMap};

use super::model::{cmp_years, Half, IndicatorDataset, IndicatorRecord, Period};

/// Unit marking an indicator as a percentage.
pub const PERCENT_UNIT: &str = "%";

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

/// Request-scoped filter state for the time-series and semester views.
///
/// `indicator == None` means every indicator for the time series and no
/// semester pivot. Empty `years` or `halves` sets select nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub indicator: Option<String>,
    pub years: BTreeSet<String>,
    pub halves: BTreeSet<Half>,
}

impl FilterSelection {
    /// First indicator, every year and both halves.
    pub fn initial(dataset: &IndicatorDataset) -> Self {
        Self {
            indicator: dataset.indicators.first().cloned(),
            years: dataset.years.iter().cloned().collect(),
            halves: Half::ALL.into_iter().collect(),
        }
    }

    pub fn matches(&self, record: &IndicatorRecord) -> bool {
        self.indicator
            .as_deref()
            .map_or(true, |name| record.indicator == name)
            && self.years.contains(&record.year)
            && self.halves.contains(&record.half)
    }
}

// ---------------------------------------------------------------------------
// a. Time series
// ---------------------------------------------------------------------------

/// Filtered records in chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    pub records: Vec<IndicatorRecord>,
}

impl TimeSeries {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Value of the chronologically last record.
    pub fn latest_value(&self) -> Option<f64> {
        self.records.last().map(|r| r.value)
    }

    pub fn max_value(&self) -> Option<f64> {
        self.records.iter().map(|r| r.value).reduce(f64::max)
    }

    pub fn min_value(&self) -> Option<f64> {
        self.records.iter().map(|r| r.value).reduce(f64::min)
    }

    /// Display unit, taken from the first record.
    pub fn unit(&self) -> Option<&str> {
        self.records.first().map(|r| r.unit.as_str())
    }
}

pub fn time_series(records: &[IndicatorRecord], selection: &FilterSelection) -> TimeSeries {
    let mut filtered: Vec<IndicatorRecord> = records
        .iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect();
    // Stable: duplicates of one period keep their load order.
    filtered.sort_by(IndicatorRecord::cmp_chronological);
    TimeSeries { records: filtered }
}

// ---------------------------------------------------------------------------
// Cell reduction
// ---------------------------------------------------------------------------

/// Several records landing in one pivot cell are averaged.
#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    fn get(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

// ---------------------------------------------------------------------------
// b. Semester comparison
// ---------------------------------------------------------------------------

/// Year × half grid of the selected indicator's series. Missing cells hold 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemesterPivot {
    pub years: Vec<String>,
    pub halves: Vec<Half>,
    /// `values[year][half]`, indexed like `years` and `halves`.
    pub values: Vec<Vec<f64>>,
}

impl SemesterPivot {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn value(&self, year: &str, half: Half) -> Option<f64> {
        let y = self.years.iter().position(|v| v == year)?;
        let h = self.halves.iter().position(|v| *v == half)?;
        Some(self.values[y][h])
    }
}

/// Empty unless `selection` names an indicator; values of different
/// indicators are never averaged together.
pub fn semester_pivot(records: &[IndicatorRecord], selection: &FilterSelection) -> SemesterPivot {
    if selection.indicator.is_none() {
        return SemesterPivot::default();
    }
    let series = time_series(records, selection);

    let mut cells: HashMap<(&str, Half), Mean> = HashMap::new();
    let mut years: Vec<String> = Vec::new();
    let mut halves: BTreeSet<Half> = BTreeSet::new();
    for rec in &series.records {
        cells.entry((rec.year.as_str(), rec.half)).or_default().push(rec.value);
        if years.last() != Some(&rec.year) {
            years.push(rec.year.clone());
        }
        halves.insert(rec.half);
    }
    // Already chronological; dedup guards against non-adjacent equal years.
    years.sort_by(|a, b| cmp_years(a, b));
    years.dedup();
    let halves: Vec<Half> = halves.into_iter().collect();

    let values = years
        .iter()
        .map(|year| {
            halves
                .iter()
                .map(|half| {
                    cells
                        .get(&(year.as_str(), *half))
                        .and_then(Mean::get)
                        .unwrap_or(0.0)
                })
                .collect()
        })
        .collect();

    SemesterPivot {
        years,
        halves,
        values,
    }
}

// ---------------------------------------------------------------------------
// c. Percentage indicators
// ---------------------------------------------------------------------------

/// Indicator × period grid over `%` indicators. Missing cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PercentPivot {
    /// Chronological.
    pub periods: Vec<Period>,
    /// Sorted by name.
    pub indicators: Vec<String>,
    /// `values[indicator][period]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl PercentPivot {
    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn period_labels(&self) -> Vec<String> {
        self.periods.iter().map(Period::label).collect()
    }

    /// Cell value rounded for the table display.
    pub fn display_value(&self, indicator: usize, period: usize) -> Option<f64> {
        self.values
            .get(indicator)?
            .get(period)
            .copied()
            .flatten()
            .map(round_one_decimal)
    }
}

/// One decimal, halves to even (`0.25` → `0.2`).
pub fn round_one_decimal(v: f64) -> f64 {
    (v * 10.0).round_ties_even() / 10.0
}

/// Names of `%` indicators, in order of first appearance.
pub fn percent_indicators(records: &[IndicatorRecord]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    records
        .iter()
        .filter(|r| r.unit == PERCENT_UNIT)
        .filter(|r| seen.insert(r.indicator.as_str()))
        .map(|r| r.indicator.clone())
        .collect()
}

/// The first `n` percentage indicators.
pub fn default_percent_selection(records: &[IndicatorRecord], n: usize) -> Vec<String> {
    percent_indicators(records).into_iter().take(n).collect()
}

pub fn percent_pivot(records: &[IndicatorRecord], selected: &[String]) -> PercentPivot {
    let wanted: BTreeSet<&str> = selected.iter().map(String::as_str).collect();

    let mut cells: HashMap<(&str, Period), Mean> = HashMap::new();
    let mut indicators: BTreeSet<&str> = BTreeSet::new();
    let mut periods: BTreeSet<Period> = BTreeSet::new();
    for rec in records
        .iter()
        .filter(|r| r.unit == PERCENT_UNIT && wanted.contains(r.indicator.as_str()))
    {
        let period = rec.period();
        cells
            .entry((rec.indicator.as_str(), period.clone()))
            .or_default()
            .push(rec.value);
        indicators.insert(rec.indicator.as_str());
        periods.insert(period);
    }

    let periods: Vec<Period> = periods.into_iter().collect();
    let values = indicators
        .iter()
        .map(|name| {
            periods
                .iter()
                .map(|p| cells.get(&(*name, p.clone())).and_then(Mean::get))
                .collect()
        })
        .collect();

    PercentPivot {
        periods,
        indicators: indicators.into_iter().map(str::to_string).collect(),
        values,
    }
}

// ---------------------------------------------------------------------------
// All three views for one interaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardViews {
    pub series: TimeSeries,
    pub semesters: SemesterPivot,
    pub percent: PercentPivot,
}

impl DashboardViews {
    pub fn build(
        records: &[IndicatorRecord],
        selection: &FilterSelection,
        percent_selection: &[String],
    ) -> Self {
        Self {
            series: time_series(records, selection),
            semesters: semester_pivot(records, selection),
            percent: percent_pivot(records, percent_selection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(indicator: &str, unit: &str, year: &str, half: Half, value: f64) -> IndicatorRecord {
        let period = Period::new(year, half);
        IndicatorRecord {
            indicator: indicator.to_string(),
            unit: unit.to_string(),
            frequency: "Annual".to_string(),
            year: year.to_string(),
            half,
            value,
            period_label: period.label(),
        }
    }

    fn co2() -> Vec<IndicatorRecord> {
        vec![
            rec("CO2 Emissions", "%", "2022", Half::FirstHalf, 10.0),
            rec("CO2 Emissions", "%", "2022", Half::SecondHalf, 12.0),
            rec("CO2 Emissions", "%", "2023", Half::SecondHalf, 15.0),
        ]
    }

    fn select(indicator: Option<&str>, years: &[&str], halves: &[Half]) -> FilterSelection {
        FilterSelection {
            indicator: indicator.map(str::to_string),
            years: years.iter().map(|y| y.to_string()).collect(),
            halves: halves.iter().copied().collect(),
        }
    }

    #[test]
    fn filter_by_year_and_summaries() {
        let sel = select(Some("CO2 Emissions"), &["2022"], &Half::ALL);
        let series = time_series(&co2(), &sel);

        assert_eq!(series.records.len(), 2);
        assert_eq!(series.max_value(), Some(12.0));
        assert_eq!(series.min_value(), Some(10.0));
        assert_eq!(series.latest_value(), Some(12.0));
        assert_eq!(series.unit(), Some("%"));
    }

    #[test]
    fn series_is_chronological_regardless_of_input_order() {
        let mut records = co2();
        records.reverse();
        records.push(rec("CO2 Emissions", "%", "2021", Half::SecondHalf, 3.0));

        let sel = select(None, &["2021", "2022", "2023"], &Half::ALL);
        let series = time_series(&records, &sel);
        let labels: Vec<&str> = series.records.iter().map(|r| r.period_label.as_str()).collect();
        assert_eq!(
            labels,
            ["2021 2nd half", "2022 1st half", "2022 2nd half", "2023 2nd half"]
        );
        assert_eq!(series.latest_value(), Some(15.0));
    }

    #[test]
    fn unknown_indicator_gives_empty_series() {
        let sel = select(Some("Noise"), &["2022", "2023"], &Half::ALL);
        let series = time_series(&co2(), &sel);
        assert!(series.is_empty());
        assert_eq!(series.latest_value(), None);
        assert_eq!(series.max_value(), None);
        assert_eq!(series.min_value(), None);
        assert!(semester_pivot(&co2(), &sel).is_empty());
    }

    #[test]
    fn empty_year_set_selects_nothing() {
        let sel = select(Some("CO2 Emissions"), &[], &Half::ALL);
        assert!(time_series(&co2(), &sel).is_empty());
    }

    #[test]
    fn semester_pivot_zero_fills_and_averages() {
        let mut records = co2();
        records.push(rec("CO2 Emissions", "%", "2023", Half::SecondHalf, 17.0));
        records.push(rec("Water", "m3", "2023", Half::FirstHalf, 99.0));

        let sel = select(Some("CO2 Emissions"), &["2022", "2023"], &Half::ALL);
        let pivot = semester_pivot(&records, &sel);

        assert_eq!(pivot.years, ["2022", "2023"]);
        assert_eq!(pivot.halves, [Half::FirstHalf, Half::SecondHalf]);
        assert_eq!(pivot.value("2022", Half::FirstHalf), Some(10.0));
        assert_eq!(pivot.value("2023", Half::FirstHalf), Some(0.0));
        assert_eq!(pivot.value("2023", Half::SecondHalf), Some(16.0));
    }

    #[test]
    fn semester_pivot_only_has_selected_halves() {
        let sel = select(Some("CO2 Emissions"), &["2022", "2023"], &[Half::SecondHalf]);
        let pivot = semester_pivot(&co2(), &sel);
        assert_eq!(pivot.halves, [Half::SecondHalf]);
        assert_eq!(pivot.values, [[12.0], [15.0]]);
    }

    #[test]
    fn percent_pivot_is_chronological_and_rounded() {
        let records = vec![
            rec("Recycling", "%", "2023", Half::FirstHalf, 41.26),
            rec("Recycling", "%", "2022", Half::SecondHalf, 40.04),
            rec("Renewables", "%", "2022", Half::SecondHalf, 20.0),
            rec("Renewables", "%", "2022", Half::SecondHalf, 21.0),
            rec("Water", "m3", "2022", Half::FirstHalf, 5.0),
        ];
        let selected = vec!["Renewables".to_string(), "Recycling".to_string(), "Water".to_string()];
        let pivot = percent_pivot(&records, &selected);

        assert_eq!(pivot.indicators, ["Recycling", "Renewables"]);
        assert_eq!(pivot.period_labels(), ["2022 2nd half", "2023 1st half"]);
        assert_eq!(pivot.display_value(0, 0), Some(40.0));
        assert_eq!(pivot.display_value(0, 1), Some(41.3));
        assert_eq!(pivot.display_value(1, 0), Some(20.5));
        assert_eq!(pivot.display_value(1, 1), None);
    }

    #[test]
    fn semester_pivot_needs_an_indicator() {
        let mut records = co2();
        records.push(rec("Water", "m3", "2022", Half::FirstHalf, 90.0));
        let sel = select(None, &["2022", "2023"], &Half::ALL);
        assert!(semester_pivot(&records, &sel).is_empty());
        assert_eq!(time_series(&records, &sel).records.len(), 4);
    }

    #[test]
    fn rounding_takes_ties_to_even() {
        assert_eq!(round_one_decimal(0.25), 0.2);
        assert_eq!(round_one_decimal(0.75), 0.8);
        assert_eq!(round_one_decimal(1.25), 1.2);
        assert_eq!(round_one_decimal(-0.25), -0.2);
        assert_eq!(round_one_decimal(41.26), 41.3);
    }

    #[test]
    fn percent_pivot_without_percent_indicators_is_empty() {
        let records = vec![rec("Water", "m3", "2022", Half::FirstHalf, 5.0)];
        let pivot = percent_pivot(&records, &["Water".to_string(), "Noise".to_string()]);
        assert!(pivot.is_empty());
        assert!(pivot.periods.is_empty());
        assert!(percent_pivot(&records, &[]).is_empty());
    }

    #[test]
    fn default_percent_selection_takes_first_three() {
        let records = vec![
            rec("A", "%", "2022", Half::FirstHalf, 1.0),
            rec("B", "kg", "2022", Half::FirstHalf, 1.0),
            rec("C", "%", "2022", Half::FirstHalf, 1.0),
            rec("D", "%", "2022", Half::FirstHalf, 1.0),
            rec("A", "%", "2022", Half::SecondHalf, 1.0),
            rec("E", "%", "2022", Half::FirstHalf, 1.0),
        ];
        assert_eq!(default_percent_selection(&records, 3), ["A", "C", "D"]);
    }

    #[test]
    fn views_on_empty_input_are_empty() {
        let views = DashboardViews::build(&[], &FilterSelection::default(), &[]);
        assert!(views.series.is_empty());
        assert!(views.semesters.is_empty());
        assert!(views.percent.is_empty());
    }
}
