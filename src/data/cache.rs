use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use super::loader::{parse_bytes, SourceKind};
use super::model::IndicatorDataset;
use super::normalize::normalize;
use crate::config::LoadOptions;

/// Hex SHA-256 of a source file's bytes.
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Run the full pipeline over an in-memory source.
pub fn build_dataset(
    kind: SourceKind,
    bytes: &[u8],
    options: &LoadOptions,
) -> Result<IndicatorDataset> {
    let table = parse_bytes(kind, bytes, options)?;
    let records = normalize(&table, &options.period_columns)?;
    Ok(IndicatorDataset::from_records(records))
}

#[derive(Debug)]
struct CachedLoad {
    fingerprint: String,
    options: LoadOptions,
    dataset: Arc<IndicatorDataset>,
}

/// Memoises normalised datasets per source path.
///
/// An entry is reused only while both the file content hash and the load
/// options are unchanged.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, CachedLoad>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(
        &mut self,
        path: &Path,
        options: &LoadOptions,
    ) -> Result<Arc<IndicatorDataset>> {
        let kind = SourceKind::from_path(path)?;
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let digest = fingerprint(&bytes);

        if let Some(entry) = self.entries.get(path) {
            if entry.fingerprint == digest && entry.options == *options {
                log::debug!("cache hit for {}", path.display());
                return Ok(Arc::clone(&entry.dataset));
            }
            log::info!("{} changed since last load, reloading", path.display());
        }

        let dataset = Arc::new(
            build_dataset(kind, &bytes, options)
                .with_context(|| format!("loading {}", path.display()))?,
        );
        self.entries.insert(
            path.to_path_buf(),
            CachedLoad {
                fingerprint: digest,
                options: options.clone(),
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    /// Drop the entry for `path`. Returns whether one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::PipelineError;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    const CSV: &str = "\
title,,,,,,,,,,
,,,,,,,,,,
Indicator,Unit,Frequency,a,b,c,d,e,f,g,h
Energy,%,Annual,1,2,3,4,5,6,7,8
";

    fn csv_file(contents: &str) -> Result<NamedTempFile> {
        let mut file = Builder::new().suffix(".csv").tempfile()?;
        file.write_all(contents.as_bytes())?;
        Ok(file)
    }

    #[test]
    fn unchanged_file_is_served_from_cache() -> Result<()> {
        let file = csv_file(CSV)?;
        let mut cache = DatasetCache::new();
        let opts = LoadOptions::default();

        let first = cache.get_or_load(file.path(), &opts)?;
        let second = cache.get_or_load(file.path(), &opts)?;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 8);
        Ok(())
    }

    #[test]
    fn content_change_or_new_options_reload() -> Result<()> {
        let file = csv_file(CSV)?;
        let mut cache = DatasetCache::new();
        let opts = LoadOptions::default();
        let first = cache.get_or_load(file.path(), &opts)?;

        std::fs::write(file.path(), CSV.replace("1,2,3", ",,3"))?;
        let second = cache.get_or_load(file.path(), &opts)?;
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 6);

        let mut shifted = opts.clone();
        shifted.period_columns[0] = "2021_2".to_string();
        let third = cache.get_or_load(file.path(), &shifted)?;
        assert!(!Arc::ptr_eq(&second, &third));
        assert_eq!(cache.len(), 1);
        Ok(())
    }

    #[test]
    fn invalidate_forces_reload() -> Result<()> {
        let file = csv_file(CSV)?;
        let mut cache = DatasetCache::new();
        let opts = LoadOptions::default();

        let first = cache.get_or_load(file.path(), &opts)?;
        assert!(cache.invalidate(file.path()));
        assert!(!cache.invalidate(file.path()));
        let second = cache.get_or_load(file.path(), &opts)?;
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);

        cache.clear();
        assert_eq!(cache.len(), 0);
        Ok(())
    }

    #[test]
    fn schema_errors_are_not_cached() -> Result<()> {
        let file = csv_file("t\n\nIndicator,Unit,Frequency,2022_1\nEnergy,%,Annual,1\n")?;
        let mut cache = DatasetCache::new();

        let err = cache
            .get_or_load(file.path(), &LoadOptions::default())
            .unwrap_err();
        let pipeline = err.downcast_ref::<PipelineError>().expect("pipeline error");
        assert!(pipeline.is_schema_error());
        assert_eq!(cache.len(), 0);
        Ok(())
    }

    #[test]
    fn fingerprint_is_content_hash() {
        assert_eq!(
            fingerprint(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
