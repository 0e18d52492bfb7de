use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::print_batches;
use parquet::arrow::ArrowWriter;

const PERIODS: [&str; 8] = [
    "2022_1", "2022_2", "2023_1", "2023_2", "2024_1", "2024_2", "2025_1", "2025_2",
];

/// (indicator, unit, frequency, starting value, drift per half-year)
const INDICATORS: [(&str, &str, &str, f64, f64); 8] = [
    ("CO2 emissions reduction", "%", "Semiannual", 8.0, 1.6),
    ("Renewable energy share", "%", "Semiannual", 22.0, 2.4),
    ("Waste recycled", "%", "Semiannual", 41.0, 1.1),
    ("Water withdrawal", "m3", "Semiannual", 15400.0, -310.0),
    ("Energy consumption", "MWh", "Semiannual", 980.0, -12.5),
    ("Hazardous waste", "kg", "Annual", 620.0, -25.0),
    ("Women in leadership", "%", "Annual", 31.0, 0.9),
    ("Training hours per employee", "h", "Annual", 12.0, 0.7),
];

/// Small deterministic generator (splitmix64), enough for sample noise.
struct SplitMix(u64);

impl SplitMix {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[-1, 1)`.
    fn jitter(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 52) as f64 - 1.0
    }
}

/// One value per period; annual indicators only report second halves and
/// the latest two periods are not reported yet for some rows.
fn series(
    rng: &mut SplitMix,
    start: f64,
    drift: f64,
    annual: bool,
    lagging: bool,
) -> Vec<Option<f64>> {
    (0..PERIODS.len())
        .map(|i| {
            if annual && i % 2 == 0 {
                return None;
            }
            if lagging && i >= PERIODS.len() - 2 {
                return None;
            }
            let noise = rng.jitter() * drift.abs() * 0.5;
            let v = start + drift * i as f64 + noise;
            Some((v * 100.0).round() / 100.0)
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let mut rng = SplitMix(2024);

    let rows: Vec<(&str, &str, &str, Vec<Option<f64>>)> = INDICATORS
        .iter()
        .enumerate()
        .map(|(i, &(name, unit, freq, start, drift))| {
            let values = series(&mut rng, start, drift, freq == "Annual", i % 3 == 2);
            (name, unit, freq, values)
        })
        .collect();

    // ---- CSV with two title rows, as exported from the spreadsheet ----
    let csv_path = "sample_indicators.csv";
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(csv_path)?;
    writer.write_record(["Sustainability indicators"])?;
    writer.write_record(["Generated sample data"])?;
    let mut header = vec!["Indicator", "Unit", "Frequency"];
    header.extend(PERIODS);
    writer.write_record(&header)?;
    for (name, unit, freq, values) in &rows {
        let mut record = vec![name.to_string(), unit.to_string(), freq.to_string()];
        record.extend(
            values
                .iter()
                .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;

    // ---- Parquet with the same layout ----
    let mut fields = vec![
        Field::new("Indicator", DataType::Utf8, false),
        Field::new("Unit", DataType::Utf8, false),
        Field::new("Frequency", DataType::Utf8, false),
    ];
    fields.extend(PERIODS.iter().map(|p| Field::new(*p, DataType::Float64, true)));
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.0))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.1))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.2))),
    ];
    for p in 0..PERIODS.len() {
        columns.push(Arc::new(Float64Array::from(
            rows.iter().map(|r| r.3[p]).collect::<Vec<_>>(),
        )));
    }
    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let parquet_path = "sample_indicators.parquet";
    let file = std::fs::File::create(parquet_path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    print_batches(&[batch])?;
    println!(
        "Wrote {} indicators over {} periods to {csv_path} and {parquet_path}",
        rows.len(),
        PERIODS.len()
    );
    Ok(())
}
