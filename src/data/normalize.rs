use super::error::PipelineError;
use super::model::{CellValue, Half, IndicatorRecord, Period, RawIndicatorRow, RawTable};

/// Leading label columns: indicator, unit, frequency.
pub const LABEL_COLUMNS: usize = 3;

// ---------------------------------------------------------------------------
// Period tokens
// ---------------------------------------------------------------------------

/// Split a canonical `{year}_{half}` token into a [`Period`].
pub fn parse_period(token: &str) -> Result<Period, PipelineError> {
    let malformed = || PipelineError::MalformedPeriod {
        token: token.to_string(),
    };
    let (year, half) = token.split_once('_').ok_or_else(malformed)?;
    if year.trim().is_empty() {
        return Err(malformed());
    }
    let half = Half::from_token(half.trim()).ok_or_else(malformed)?;
    Ok(Period::new(year.trim(), half))
}

// ---------------------------------------------------------------------------
// Rename
// ---------------------------------------------------------------------------

/// Check the table shape and give each value column its canonical period token.
pub fn rename_columns(
    table: &RawTable,
    period_columns: &[String],
) -> Result<Vec<RawIndicatorRow>, PipelineError> {
    let expected = LABEL_COLUMNS + period_columns.len();
    if table.width() != expected {
        return Err(PipelineError::ColumnCount {
            expected,
            periods: period_columns.len(),
            found: table.width(),
            header: table.header.clone(),
        });
    }
    log::debug!(
        "renaming columns {:?} -> indicator, unit, frequency, {:?}",
        table.header,
        period_columns
    );

    Ok(table
        .rows
        .iter()
        .map(|row| RawIndicatorRow {
            indicator: cell_at(row, 0).as_label(),
            unit: cell_at(row, 1).as_label(),
            frequency: cell_at(row, 2).as_label(),
            values: period_columns
                .iter()
                .enumerate()
                .map(|(i, token)| (token.clone(), cell_at(row, LABEL_COLUMNS + i)))
                .collect(),
        })
        .collect())
}

fn cell_at(row: &[CellValue], idx: usize) -> CellValue {
    row.get(idx).cloned().unwrap_or(CellValue::Empty)
}

// ---------------------------------------------------------------------------
// Normalise (rename → unpivot → drop incomplete → split period → label)
// ---------------------------------------------------------------------------

/// Reshape the wide indicator table into long-form records.
///
/// Records are emitted period by period (all indicators for the first value
/// column, then the second, ...). A record is dropped when its value,
/// indicator, unit or frequency is empty. Duplicate `(indicator, year, half)`
/// combinations are kept as separate records.
pub fn normalize(
    table: &RawTable,
    period_columns: &[String],
) -> Result<Vec<IndicatorRecord>, PipelineError> {
    let periods = period_columns
        .iter()
        .map(|token| parse_period(token))
        .collect::<Result<Vec<_>, _>>()?;
    let rows = rename_columns(table, period_columns)?;

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for (col, period) in periods.iter().enumerate() {
        for (row_no, row) in rows.iter().enumerate() {
            let (token, cell) = &row.values[col];
            let (Some(indicator), Some(unit), Some(frequency)) =
                (&row.indicator, &row.unit, &row.frequency)
            else {
                dropped += 1;
                continue;
            };
            let Some(value) = cell_value(cell, row_no + 1, token)? else {
                dropped += 1;
                continue;
            };

            records.push(IndicatorRecord {
                indicator: indicator.clone(),
                unit: unit.clone(),
                frequency: frequency.clone(),
                year: period.year.clone(),
                half: period.half,
                value,
                period_label: period.label(),
            });
        }
    }

    log::debug!(
        "normalised {} rows into {} records ({} incomplete cells dropped)",
        rows.len(),
        records.len(),
        dropped
    );
    Ok(records)
}

fn cell_value(cell: &CellValue, row: usize, column: &str) -> Result<Option<f64>, PipelineError> {
    let text = match cell {
        CellValue::Empty => return Ok(None),
        CellValue::Number(v) if v.is_nan() => return Ok(None),
        CellValue::Number(v) if v.is_finite() => return Ok(Some(*v)),
        CellValue::Number(v) => v.to_string(),
        CellValue::Text(s) => match CellValue::from_text(s) {
            CellValue::Empty => return Ok(None),
            CellValue::Number(v) => return Ok(Some(v)),
            CellValue::Text(_) => s.clone(),
        },
    };
    Err(PipelineError::InvalidValue {
        row,
        column: column.to_string(),
        text,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::config::DEFAULT_PERIOD_COLUMNS;

    fn periods() -> Vec<String> {
        DEFAULT_PERIOD_COLUMNS.iter().map(|s| s.to_string()).collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn row(name: &str, unit: &str, values: [Option<f64>; 8]) -> Vec<CellValue> {
        let mut cells = vec![text(name), text(unit), text("Annual")];
        cells.extend(
            values
                .iter()
                .map(|v| v.map(CellValue::Number).unwrap_or(CellValue::Empty)),
        );
        cells
    }

    fn table(rows: Vec<Vec<CellValue>>) -> RawTable {
        let mut header = vec!["Indicator".to_string(), "Unit".into(), "Frequency".into()];
        header.extend((0..8).map(|i| format!("v{i}")));
        RawTable { header, rows }
    }

    fn co2_table() -> RawTable {
        table(vec![row(
            "CO2 Emissions",
            "%",
            [Some(10.0), Some(12.0), None, Some(15.0), None, None, None, None],
        )])
    }

    #[test]
    fn empty_cells_are_dropped_not_zero_filled() {
        let records = normalize(&co2_table(), &periods()).unwrap();
        let triples: Vec<(&str, Half, f64)> = records
            .iter()
            .map(|r| (r.year.as_str(), r.half, r.value))
            .collect();
        assert_eq!(
            triples,
            [
                ("2022", Half::FirstHalf, 10.0),
                ("2022", Half::SecondHalf, 12.0),
                ("2023", Half::SecondHalf, 15.0),
            ]
        );
        assert_eq!(records[1].period_label, "2022 2nd half");
        assert_eq!(records[0].unit, "%");
        assert_eq!(records[0].frequency, "Annual");
    }

    #[test]
    fn normalize_is_deterministic() {
        let t = table(vec![
            row("Water", "m3", [Some(1.0), None, Some(3.0), None, None, None, None, Some(8.0)]),
            row("Waste", "kg", [None, Some(2.0), None, None, Some(5.0), None, None, None]),
        ]);
        assert_eq!(
            normalize(&t, &periods()).unwrap(),
            normalize(&t, &periods()).unwrap()
        );
    }

    #[test]
    fn recovered_triples_match_non_empty_cells() {
        let t = table(vec![
            row("Water", "m3", [Some(1.0), None, Some(3.0), None, None, None, None, Some(8.0)]),
            row("Waste", "kg", [None, Some(2.0), None, None, Some(5.0), None, None, None]),
        ]);
        let records = normalize(&t, &periods()).unwrap();
        let recovered: BTreeSet<(String, String, Half)> = records
            .iter()
            .map(|r| (r.indicator.clone(), r.year.clone(), r.half))
            .collect();

        let mut expected = BTreeSet::new();
        let p = periods();
        for data_row in &t.rows {
            let name = data_row[0].as_label().unwrap();
            for (i, cell) in data_row[LABEL_COLUMNS..].iter().enumerate() {
                if !cell.is_empty() {
                    let period = parse_period(&p[i]).unwrap();
                    expected.insert((name.clone(), period.year, period.half));
                }
            }
        }
        assert_eq!(recovered, expected);
        assert!(records.iter().all(|r| !r.value.is_nan()));
    }

    #[test]
    fn duplicate_indicators_are_preserved() {
        let values = [Some(1.0), None, None, None, None, None, None, None];
        let t = table(vec![row("Water", "m3", values), row("Water", "m3", values)]);
        let records = normalize(&t, &periods()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn rows_missing_labels_are_dropped() {
        let mut unnamed = row("", "%", [Some(1.0); 8]);
        unnamed[0] = CellValue::Empty;
        let mut no_unit = row("Energy", "", [Some(1.0); 8]);
        no_unit[1] = CellValue::Empty;
        let t = table(vec![unnamed, no_unit, row("Water", "m3", [Some(2.0); 8])]);

        let records = normalize(&t, &periods()).unwrap();
        assert_eq!(records.len(), 8);
        assert!(records.iter().all(|r| r.indicator == "Water"));
    }

    #[test]
    fn numeric_text_cells_are_accepted() {
        let mut r = row("Water", "m3", [None; 8]);
        r[3] = text(" 4.5 ");
        let records = normalize(&table(vec![r]), &periods()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 4.5);
    }

    #[test]
    fn non_numeric_value_is_rejected() {
        let mut r = row("Water", "m3", [None; 8]);
        r[4] = text("approx. 5");
        let err = normalize(&table(vec![r]), &periods()).unwrap_err();
        assert_eq!(
            err,
            PipelineError::InvalidValue {
                row: 1,
                column: "2022_2".to_string(),
                text: "approx. 5".to_string(),
            }
        );
    }

    #[test]
    fn missing_value_markers_are_dropped() {
        let mut r = row("Water", "m3", [Some(1.0); 8]);
        r[4] = text("n/a");
        r[5] = text("#N/A");
        r[6] = text("NULL");
        r[7] = CellValue::Number(f64::NAN);
        let records = normalize(&table(vec![r]), &periods()).unwrap();
        let tokens: Vec<String> = records.iter().map(|r| r.period().label()).collect();
        assert_eq!(
            tokens,
            ["2022 1st half", "2024 2nd half", "2025 1st half", "2025 2nd half"]
        );
    }

    #[test]
    fn infinite_values_are_rejected() {
        let mut r = row("Energy", "MWh", [None; 8]);
        r[3] = text("inf");
        let err = normalize(&table(vec![r]), &periods()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidValue { ref text, .. } if text == "inf"));

        let mut r = row("Energy", "MWh", [None; 8]);
        r[3] = CellValue::Number(f64::INFINITY);
        assert!(normalize(&table(vec![r]), &periods()).is_err());
    }

    #[test]
    fn wrong_column_count_is_a_schema_error() {
        let t = RawTable {
            header: vec!["Indicator".into(), "Unit".into(), "Frequency".into(), "2022".into()],
            rows: vec![],
        };
        let err = normalize(&t, &periods()).unwrap_err();
        assert!(err.is_schema_error());
        assert!(matches!(
            err,
            PipelineError::ColumnCount { expected: 11, found: 4, .. }
        ));
    }

    #[test]
    fn malformed_period_tokens_abort() {
        assert_eq!(
            parse_period("2024_3"),
            Err(PipelineError::MalformedPeriod {
                token: "2024_3".to_string()
            })
        );
        assert!(parse_period("2024").is_err());
        assert!(parse_period("_1").is_err());

        let mut tokens = periods();
        tokens[5] = "2024-2".to_string();
        let err = normalize(&co2_table(), &tokens).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedPeriod { .. }));
        assert!(!err.is_schema_error());
    }

    #[test]
    fn custom_period_layout() {
        let t = RawTable {
            header: vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()],
            rows: vec![vec![
                text("Energy"),
                text("kWh"),
                text("Monthly"),
                CellValue::Number(7.0),
                CellValue::Number(9.0),
            ]],
        };
        let tokens = vec!["2030_2".to_string(), "2031_1".to_string()];
        let records = normalize(&t, &tokens).unwrap();
        assert_eq!(records[0].period_label, "2030 2nd half");
        assert_eq!(records[1].period_label, "2031 1st half");
    }
}
