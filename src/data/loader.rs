use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::PipelineError;
use super::model::{CellValue, RawTable};
use crate::config::LoadOptions;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Physical format of a source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    Json,
    Parquet,
}

impl SourceKind {
    /// Dispatch by extension.
    ///
    /// Supported formats:
    /// * `.csv`     – text grid with title rows, a header row and data rows
    /// * `.json`    – workbook: `[[...], ...]` or `{ "Sheet": [[...], ...] }`
    /// * `.parquet` – typed wide table, header taken from the schema
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(SourceKind::Csv),
            "json" => Ok(SourceKind::Json),
            "parquet" | "pq" => Ok(SourceKind::Parquet),
            other => bail!("Unsupported file extension: .{other}"),
        }
    }
}

/// Parse an in-memory source table.
pub fn parse_bytes(kind: SourceKind, bytes: &[u8], options: &LoadOptions) -> Result<RawTable> {
    let table = match kind {
        SourceKind::Csv => {
            if let Some(sheet) = &options.sheet_selector {
                log::debug!("CSV sources have a single sheet, ignoring selector '{sheet}'");
            }
            let (skipped, rest) = split_title_lines(bytes, options.skip_rows);
            let mut grid = vec![Vec::new(); skipped];
            grid.extend(read_csv_grid(rest)?);
            table_from_grid(grid, options.skip_rows)?
        }
        SourceKind::Json => {
            let grid = read_json_grid(bytes, options.sheet_selector.as_deref())?;
            table_from_grid(grid, options.skip_rows)?
        }
        SourceKind::Parquet => read_parquet_table(bytes)?,
    };
    log::info!(
        "Read {:?} table with {} columns and {} data rows",
        kind,
        table.width(),
        table.rows.len()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Grid → table
// ---------------------------------------------------------------------------

/// Skip the title rows, take the header, and square up the data rows.
///
/// Blank data rows are removed, as are trailing columns with a blank header
/// and no values.
pub fn table_from_grid(
    grid: Vec<Vec<CellValue>>,
    skip_rows: usize,
) -> Result<RawTable, PipelineError> {
    let mut rows = grid.into_iter().skip(skip_rows);
    let header_cells = rows
        .next()
        .ok_or(PipelineError::MissingHeader { skip_rows })?;
    let mut data: Vec<Vec<CellValue>> = rows
        .filter(|row| !row.iter().all(CellValue::is_empty))
        .collect();

    let width = data
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header_cells.len()))
        .max()
        .unwrap_or(0);

    let mut header: Vec<String> = header_cells
        .iter()
        .map(|c| c.as_label().unwrap_or_default())
        .collect();
    header.resize(width, String::new());
    for row in &mut data {
        row.resize(width, CellValue::Empty);
    }

    while let Some(last) = header.last() {
        let col = header.len() - 1;
        if !last.trim().is_empty() || data.iter().any(|row| !row[col].is_empty()) {
            break;
        }
        header.pop();
        for row in &mut data {
            row.pop();
        }
    }

    Ok(RawTable { header, rows: data })
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Cut the first `n` physical lines off a CSV buffer.
///
/// `csv` skips blank lines, so title rows are counted here on raw bytes
/// instead. Returns how many lines were cut and the remainder.
fn split_title_lines(bytes: &[u8], n: usize) -> (usize, &[u8]) {
    let mut rest = bytes;
    for skipped in 0..n {
        match rest.iter().position(|&b| b == b'\n') {
            Some(end) => rest = &rest[end + 1..],
            None if rest.is_empty() => return (skipped, rest),
            None => return (skipped + 1, &[]),
        }
    }
    (n, rest)
}

fn read_csv_grid(bytes: &[u8]) -> Result<Vec<Vec<CellValue>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        grid.push(record.iter().map(CellValue::from_text).collect());
    }
    Ok(grid)
}

// ---------------------------------------------------------------------------
// JSON workbook
// ---------------------------------------------------------------------------

/// Accepted shapes:
///
/// ```json
/// [["Sustainability report"], [], ["Indicator", "Unit", ...], ["Water", "m3", ...]]
/// ```
///
/// or, for several sheets:
///
/// ```json
/// { "Summary": [...], "Hoja3": [["Indicator", ...], ...] }
/// ```
fn read_json_grid(bytes: &[u8], sheet: Option<&str>) -> Result<Vec<Vec<CellValue>>> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;

    let rows = match &root {
        JsonValue::Array(rows) => {
            if let Some(name) = sheet {
                log::debug!("single-sheet workbook, ignoring selector '{name}'");
            }
            rows
        }
        JsonValue::Object(sheets) => {
            let names: Vec<&String> = sheets.keys().collect();
            let chosen = match sheet {
                Some(name) => sheets.get(name).with_context(|| {
                    format!("Sheet '{name}' not found, available sheets: {names:?}")
                })?,
                None if sheets.len() == 1 => sheets.values().next().context("empty workbook")?,
                None => bail!(
                    "Workbook has {} sheets {names:?}; set sheet_selector",
                    sheets.len()
                ),
            };
            chosen.as_array().context("Sheet is not an array of rows")?
        }
        _ => bail!("Expected a JSON array of rows or an object of sheets"),
    };

    rows.iter()
        .enumerate()
        .map(|(i, row)| -> Result<Vec<CellValue>> {
            let cells = row
                .as_array()
                .with_context(|| format!("Row {i} is not a JSON array"))?;
            Ok(cells.iter().map(json_to_cell).collect())
        })
        .collect()
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::from_text(s),
        JsonValue::Number(n) => n
            .as_f64()
            .map(CellValue::Number)
            .unwrap_or_else(|| CellValue::Text(n.to_string())),
        JsonValue::Null => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the wide table.
///
/// Column names form the header; string and numeric columns become cells,
/// nulls become empty cells. Files written by both Pandas and Polars work.
fn read_parquet_table(bytes: &[u8]) -> Result<RawTable> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))
        .context("reading parquet metadata")?;
    let header: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut grid = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            grid.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect::<Result<Vec<_>>>()?,
            );
        }
    }

    let header_row = header.into_iter().map(CellValue::Text).collect();
    let table = table_from_grid(std::iter::once(header_row).chain(grid).collect(), 0)?;
    Ok(table)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Empty);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => {
            let s = col.as_any().downcast_ref::<StringArray>().context("expected StringArray")?;
            CellValue::from_text(s.value(row))
        }
        DataType::LargeUtf8 => CellValue::from_text(col.as_string::<i64>().value(row)),
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().context("expected Int32Array")?;
            CellValue::Number(arr.value(row) as f64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().context("expected Int64Array")?;
            CellValue::Number(arr.value(row) as f64)
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            CellValue::Number(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            CellValue::Number(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            CellValue::Text(arr.value(row).to_string())
        }
        other => bail!("Unsupported parquet column type {other:?}"),
    };
    Ok(cell)
}
