use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the raw wide table
// ---------------------------------------------------------------------------

/// Markers spreadsheet tools and dataframe exports write for a missing value.
pub const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing_marker(s: &str) -> bool {
    MISSING_MARKERS.contains(&s)
}

/// A raw spreadsheet cell as read from the source, before normalisation.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// Interpret a textual cell the way a spreadsheet export writes it.
    ///
    /// Blank cells and missing-value markers are empty. Only finite numbers
    /// become [`CellValue::Number`]; `inf` and friends stay text.
    pub fn from_text(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || is_missing_marker(trimmed) {
            return CellValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => CellValue::Number(v),
            _ => CellValue::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(v) => v.is_nan(),
        }
    }

    /// Text content for label columns. Numbers are rendered as written.
    pub fn as_label(&self) -> Option<String> {
        match self {
            CellValue::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            CellValue::Number(v) if !v.is_nan() => Some(v.to_string()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Half / Period
// ---------------------------------------------------------------------------

/// One of the two six-month periods of a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Half {
    FirstHalf,
    SecondHalf,
}

impl Half {
    pub const ALL: [Half; 2] = [Half::FirstHalf, Half::SecondHalf];

    /// Parse the half marker of a period token (`"1"` or `"2"`).
    pub fn from_token(token: &str) -> Option<Half> {
        match token {
            "1" => Some(Half::FirstHalf),
            "2" => Some(Half::SecondHalf),
            _ => None,
        }
    }

    pub fn humanized(self) -> &'static str {
        match self {
            Half::FirstHalf => "1st half",
            Half::SecondHalf => "2nd half",
        }
    }
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.humanized())
    }
}

/// Compare two year strings chronologically.
///
/// Numeric years compare by value so that `"999"` sorts before `"2022"`;
/// anything non-numeric falls back to string order after the numeric ones.
pub fn cmp_years(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// A (year, half) pair with chronological ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Period {
    pub year: String,
    pub half: Half,
}

impl Period {
    pub fn new(year: impl Into<String>, half: Half) -> Self {
        Self {
            year: year.into(),
            half,
        }
    }

    /// `"2023 1st half"`.
    pub fn label(&self) -> String {
        format!("{} {}", self.year, self.half.humanized())
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_years(&self.year, &other.year).then(self.half.cmp(&other.half))
    }
}

// ---------------------------------------------------------------------------
// Raw wide table
// ---------------------------------------------------------------------------

/// The materialised source table: header row plus data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn width(&self) -> usize {
        self.header.len()
    }
}

/// One source row after the period columns were given canonical names.
/// Lives only for the duration of a load.
#[derive(Debug, Clone, PartialEq)]
pub struct RawIndicatorRow {
    pub indicator: Option<String>,
    pub unit: Option<String>,
    pub frequency: Option<String>,
    /// `(period token, cell)` in source column order.
    pub values: Vec<(String, CellValue)>,
}

// ---------------------------------------------------------------------------
// IndicatorRecord – the normalised long-form row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRecord {
    pub indicator: String,
    pub unit: String,
    pub frequency: String,
    pub year: String,
    pub half: Half,
    pub value: f64,
    pub period_label: String,
}

impl IndicatorRecord {
    pub fn period(&self) -> Period {
        Period::new(self.year.clone(), self.half)
    }

    /// Chronological comparison on (year, half) only.
    pub fn cmp_chronological(&self, other: &Self) -> Ordering {
        cmp_years(&self.year, &other.year).then(self.half.cmp(&other.half))
    }
}

// ---------------------------------------------------------------------------
// IndicatorDataset – the complete normalised set
// ---------------------------------------------------------------------------

/// The immutable normalised record set with pre-computed filter domains.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorDataset {
    pub records: Vec<IndicatorRecord>,
    /// Distinct indicator names in order of first appearance.
    pub indicators: Vec<String>,
    /// Distinct years in chronological order.
    pub years: Vec<String>,
}

impl IndicatorDataset {
    pub fn from_records(records: Vec<IndicatorRecord>) -> Self {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut indicators = Vec::new();
        for rec in &records {
            if seen.insert(rec.indicator.as_str()) {
                indicators.push(rec.indicator.clone());
            }
        }

        let mut years: Vec<String> = records
            .iter()
            .map(|r| r.year.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        years.sort_by(|a, b| cmp_years(a, b));

        IndicatorDataset {
            records,
            indicators,
            years,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
