use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::data::cache::DatasetCache;
use crate::data::error::PipelineError;
use crate::data::model::{Half, IndicatorDataset};
use crate::data::view::{default_percent_selection, DashboardViews, FilterSelection};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    TimeSeries,
    Semesters,
    Percent,
}

/// Which [`crate::chart::ChartRenderer`] draws the views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererKind {
    #[default]
    Plot,
    Table,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Normalised datasets keyed by source path.
    pub cache: DatasetCache,

    /// File the current dataset came from.
    pub source: Option<PathBuf>,

    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Arc<IndicatorDataset>>,

    /// Indicator / year / half selection for the series and semester views.
    pub selection: FilterSelection,

    /// Indicators shown in the percentage view.
    pub percent_selection: Vec<String>,

    /// Views for the current selection (recomputed on every change).
    pub views: DashboardViews,

    pub tab: Tab,
    pub renderer: RendererKind,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            cache: DatasetCache::new(),
            source: None,
            dataset: None,
            selection: FilterSelection::default(),
            percent_selection: Vec::new(),
            views: DashboardViews::default(),
            tab: Tab::default(),
            renderer: RendererKind::default(),
            status_message: None,
        }
    }

    /// Load `path` through the cache and make it the current dataset.
    pub fn open(&mut self, path: PathBuf) {
        match self.cache.get_or_load(&path, &self.config.load) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records for {} indicators from {}",
                    dataset.len(),
                    dataset.indicators.len(),
                    path.display()
                );
                self.source = Some(path);
                self.set_dataset(dataset);
            }
            Err(e) => {
                let hint = match e.downcast_ref::<PipelineError>() {
                    Some(p) if p.is_schema_error() => " (check skip_rows and period_columns)",
                    _ => "",
                };
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}{hint}"));
            }
        }
    }

    /// Drop the cached entry for the current source and load it again.
    pub fn reload(&mut self) {
        if let Some(path) = self.source.clone() {
            self.cache.invalidate(&path);
            self.open(path);
        }
    }

    /// Ingest a newly loaded dataset and reset the selections.
    pub fn set_dataset(&mut self, dataset: Arc<IndicatorDataset>) {
        self.selection = FilterSelection::initial(&dataset);
        self.percent_selection =
            default_percent_selection(&dataset.records, self.config.default_percent_indicators);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.recompute();
    }

    /// Rebuild the three views after a selection change.
    pub fn recompute(&mut self) {
        self.views = match &self.dataset {
            Some(ds) => {
                DashboardViews::build(&ds.records, &self.selection, &self.percent_selection)
            }
            None => DashboardViews::default(),
        };
    }

    pub fn select_indicator(&mut self, name: &str) {
        self.selection.indicator = Some(name.to_string());
        self.recompute();
    }

    pub fn toggle_year(&mut self, year: &str) {
        if !self.selection.years.remove(year) {
            self.selection.years.insert(year.to_string());
        }
        self.recompute();
    }

    pub fn set_all_years(&mut self, selected: bool) {
        self.selection.years = match (&self.dataset, selected) {
            (Some(ds), true) => ds.years.iter().cloned().collect(),
            _ => Default::default(),
        };
        self.recompute();
    }

    pub fn toggle_half(&mut self, half: Half) {
        if !self.selection.halves.remove(&half) {
            self.selection.halves.insert(half);
        }
        self.recompute();
    }

    pub fn toggle_percent_indicator(&mut self, name: &str) {
        if let Some(pos) = self.percent_selection.iter().position(|n| n == name) {
            self.percent_selection.remove(pos);
        } else {
            self.percent_selection.push(name.to_string());
        }
        self.recompute();
    }
}
