use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::workflows::catalog::{
    CatalogError, CatalogItem, CatalogProvider, PropertyKind, Rating, StaticCatalog,
};
use crate::workflows::matching::{
    Candidate, FixedClock, InstantPacer, PhaseController, PipelineConfig, Requirements,
    ScoredCandidate, ScoringEngine,
};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn candidate(id: &str, requirements: &str, days_left: i64) -> Candidate {
    Candidate {
        id: id.to_string(),
        title: format!("Tender {id}"),
        description: String::new(),
        requirements: Requirements::Text(requirements.to_string()),
        deadline: now() + Duration::days(days_left),
        quantity: 1000.0,
    }
}

/// The reference proposal: one corrosion requirement plus one standard.
pub(super) fn reference_candidate() -> Candidate {
    candidate("SFP-001", "corrosion resistant, ISO 12944 compliant", 30)
}

/// The reference item: high corrosion resistance, ISO 12944, priced at 420.
pub(super) fn reference_item() -> CatalogItem {
    let mut properties = BTreeMap::new();
    properties.insert(PropertyKind::CorrosionResistance, Rating::High);

    CatalogItem {
        sku: "AP-REF-20L-001".to_string(),
        product_name: "Reference Shield".to_string(),
        category: "Protective".to_string(),
        properties,
        compliance: vec!["ISO 12944".to_string()],
        cost_per_unit: 420.0,
        pack_sizes: vec![20.0, 200.0],
        applications: Vec::new(),
    }
}

pub(super) fn scored(id: &str, score: u32) -> ScoredCandidate {
    let mut entry = ScoringEngine.best_match(&candidate(id, "corrosion", 30), &[reference_item()]);
    entry.score = score;
    entry.breakdown.total = score;
    entry
}

/// Controller over the reference item with no pacing and a frozen clock.
pub(super) fn controller() -> PhaseController {
    controller_with(Arc::new(StaticCatalog::new(vec![reference_item()])))
}

pub(super) fn controller_with(catalog: Arc<dyn CatalogProvider>) -> PhaseController {
    PhaseController::new(catalog, PipelineConfig::default())
        .with_pacer(InstantPacer)
        .with_clock(FixedClock(now()))
}

/// Mixed batch exercising every elimination stage.
pub(super) fn mixed_batch() -> Vec<Candidate> {
    vec![
        reference_candidate(),
        candidate("SFP-002", "corrosion protection to ISO 12944", 3),
        candidate("SFP-003", "decorative finish only", 20),
        candidate("SFP-004", "ASTM tested", 15),
        candidate("SFP-005", "corrosion, ISO 12944, exterior", 45),
    ]
}

#[derive(Default)]
pub(super) struct FailingCatalog;

impl CatalogProvider for FailingCatalog {
    fn list_items(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        Err(CatalogError::Unavailable("inventory service offline".to_string()))
    }
}
