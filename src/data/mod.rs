/// Data layer: source parsing, normalisation, caching and views.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  bytes → RawTable (title rows skipped, header split off)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  rename → unpivot → drop empty → split period → label
///   └───────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ IndicatorDataset  │  immutable Vec<IndicatorRecord>, cached per file
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   view    │  FilterSelection → time series, semester / percent pivots
///   └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod view;
