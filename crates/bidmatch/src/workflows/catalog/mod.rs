//! Read-only product catalog consumed by the matching engine.

pub mod domain;
mod standard;

use std::io::Read;
use std::path::Path;

pub use domain::{CatalogItem, PropertyKind, Rating};

/// Source of catalog entries. Swappable without touching the matching logic.
pub trait CatalogProvider: Send + Sync {
    fn list_items(&self) -> Result<Vec<CatalogItem>, CatalogError>;
}

/// Catalog load or lookup failure.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// In-memory catalog, either the standard range or a loaded JSON table.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    items: Vec<CatalogItem>,
}

impl StaticCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn standard() -> Self {
        Self::new(standard::standard_items())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let items: Vec<CatalogItem> = serde_json::from_reader(reader)?;
        Ok(Self::new(items))
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn find(&self, sku: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.sku == sku)
    }
}

impl CatalogProvider for StaticCatalog {
    fn list_items(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        Ok(self.items.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Cursor;

    #[test]
    fn standard_catalog_is_complete_and_unique() {
        let catalog = StaticCatalog::standard();
        assert_eq!(catalog.items().len(), 12);

        let skus: HashSet<&str> = catalog.items().iter().map(|item| item.sku.as_str()).collect();
        assert_eq!(skus.len(), 12);

        assert!(catalog.items().iter().all(|item| {
            item.cost_per_unit > 0.0 && !item.pack_sizes.is_empty() && !item.compliance.is_empty()
        }));
    }

    #[test]
    fn standard_catalog_exposes_marine_grade_ratings() {
        let catalog = StaticCatalog::standard();
        let marine = catalog
            .find("AP-MARINE-COAT-20L-077")
            .expect("marine coating present");
        assert_eq!(marine.rating(PropertyKind::CorrosionResistance), Rating::VeryHigh);
        assert_eq!(marine.rating(PropertyKind::UvResistance), Rating::High);
        assert_eq!(marine.cost_per_unit, 820.0);
    }

    #[test]
    fn from_reader_loads_json_tables() {
        let json = r#"[{
            "sku": "CUSTOM-1",
            "product_name": "Custom Primer",
            "category": "Protective",
            "properties": {"durability": "High"},
            "compliance": ["ASTM D714"],
            "cost_per_unit": 99.5,
            "pack_sizes": [5.0],
            "applications": ["Bridges"]
        }]"#;

        let catalog = StaticCatalog::from_reader(Cursor::new(json)).expect("catalog parses");
        let items = catalog.list_items().expect("items listed");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].rating(PropertyKind::Durability), Rating::High);
    }

    #[test]
    fn from_reader_rejects_malformed_json() {
        let error = StaticCatalog::from_reader(Cursor::new("{ not json"))
            .expect_err("malformed catalog rejected");
        assert!(matches!(error, CatalogError::Json(_)));
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = StaticCatalog::from_path("./does-not-exist.json").expect_err("io error");
        assert!(matches!(error, CatalogError::Io(_)));
    }
}
