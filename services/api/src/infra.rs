use bidmatch::config::PipelineSettings;
use bidmatch::error::AppError;
use bidmatch::workflows::catalog::{CatalogProvider, StaticCatalog};
use bidmatch::workflows::matching::{PhaseController, SpeedProfile};
use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Shared handles behind the pipeline routes.
#[derive(Clone)]
pub(crate) struct PipelineState {
    pub(crate) engine: Arc<PhaseController>,
    pub(crate) catalog: Arc<dyn CatalogProvider>,
    pub(crate) default_speed: SpeedProfile,
}

impl PipelineState {
    pub(crate) fn new(
        engine: Arc<PhaseController>,
        catalog: Arc<dyn CatalogProvider>,
        default_speed: SpeedProfile,
    ) -> Self {
        Self {
            engine,
            catalog,
            default_speed,
        }
    }

    pub(crate) fn from_settings(settings: &PipelineSettings) -> Result<Self, AppError> {
        let catalog: Arc<dyn CatalogProvider> = Arc::new(load_catalog(settings)?);
        let engine = Arc::new(PhaseController::new(
            catalog.clone(),
            settings.thresholds.clone(),
        ));
        Ok(Self::new(engine, catalog, settings.speed))
    }
}

/// Loads the configured catalog table, falling back to the standard range.
pub(crate) fn load_catalog(settings: &PipelineSettings) -> Result<StaticCatalog, AppError> {
    match &settings.catalog_path {
        Some(path) => {
            let catalog = StaticCatalog::from_path(path)?;
            info!(path = %path.display(), items = catalog.items().len(), "catalog loaded");
            Ok(catalog)
        }
        None => Ok(StaticCatalog::standard()),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Start of `date` in UTC, used as the deadline reference instant.
pub(crate) fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or_else(Utc::now)
}

pub(crate) fn parse_speed(raw: &str) -> Result<SpeedProfile, String> {
    SpeedProfile::parse(raw).ok_or_else(|| format!("unknown speed '{raw}' (expected fast or realistic)"))
}
