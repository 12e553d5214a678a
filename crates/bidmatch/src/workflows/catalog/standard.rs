use std::collections::BTreeMap;

use super::domain::{CatalogItem, PropertyKind, Rating};

struct Entry {
    sku: &'static str,
    product_name: &'static str,
    category: &'static str,
    corrosion: Rating,
    uv: Rating,
    durability: Rating,
    compliance: &'static [&'static str],
    cost_per_unit: f64,
    pack_sizes: &'static [f64],
    applications: &'static [&'static str],
}

impl Entry {
    fn to_item(&self) -> CatalogItem {
        let properties = BTreeMap::from([
            (PropertyKind::CorrosionResistance, self.corrosion),
            (PropertyKind::UvResistance, self.uv),
            (PropertyKind::Durability, self.durability),
        ]);

        CatalogItem {
            sku: self.sku.to_string(),
            product_name: self.product_name.to_string(),
            category: self.category.to_string(),
            properties,
            compliance: self.compliance.iter().map(|c| c.to_string()).collect(),
            cost_per_unit: self.cost_per_unit,
            pack_sizes: self.pack_sizes.to_vec(),
            applications: self.applications.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Default protective-coatings range, priced per litre with pack sizes in litres.
const STANDARD_ENTRIES: &[Entry] = &[
    Entry {
        sku: "AP-EXT-IC-20L-001",
        product_name: "Industrial Exterior Protective Paint",
        category: "Exterior / Industrial",
        corrosion: Rating::High,
        uv: Rating::High,
        durability: Rating::High,
        compliance: &["ISO 12944", "ASTM D523"],
        cost_per_unit: 420.0,
        pack_sizes: &[20.0, 200.0],
        applications: &["Industrial buildings", "Infrastructure projects", "Coastal facilities"],
    },
    Entry {
        sku: "AP-EPX-PRT-10L-014",
        product_name: "Epoxy Protective Coating",
        category: "Protective / Industrial",
        corrosion: Rating::VeryHigh,
        uv: Rating::Low,
        durability: Rating::VeryHigh,
        compliance: &["ISO 1461", "ASTM D4541"],
        cost_per_unit: 680.0,
        pack_sizes: &[10.0, 50.0],
        applications: &["Chemical storage tanks", "Pipelines", "Industrial floors"],
    },
    Entry {
        sku: "AP-IND-ECO-20L-009",
        product_name: "Economy Industrial Coating",
        category: "Industrial / Economy",
        corrosion: Rating::Medium,
        uv: Rating::Medium,
        durability: Rating::Medium,
        compliance: &["Basic ISO"],
        cost_per_unit: 310.0,
        pack_sizes: &[20.0, 200.0],
        applications: &["Warehouse interiors", "Non-critical infrastructure"],
    },
    Entry {
        sku: "AP-EXT-PRM-20L-002",
        product_name: "Premium Exterior Finish",
        category: "Exterior",
        corrosion: Rating::High,
        uv: Rating::VeryHigh,
        durability: Rating::High,
        compliance: &["ISO 12944", "Environmental Safe Coatings"],
        cost_per_unit: 520.0,
        pack_sizes: &[20.0],
        applications: &["Architectural facades", "Commercial exteriors"],
    },
    Entry {
        sku: "AP-INT-PLUS-5L-011",
        product_name: "Interior Durable Emulsion",
        category: "Interior",
        corrosion: Rating::Low,
        uv: Rating::Low,
        durability: Rating::High,
        compliance: &["Low VOC"],
        cost_per_unit: 210.0,
        pack_sizes: &[5.0, 20.0],
        applications: &["Office interiors", "Residential interiors"],
    },
    Entry {
        sku: "AP-ANTI-CORR-DR-200L-020",
        product_name: "Anti-Corrosive Primer (Drum)",
        category: "Protective / Industrial",
        corrosion: Rating::VeryHigh,
        uv: Rating::Low,
        durability: Rating::High,
        compliance: &["ASTM D714", "ISO 12944"],
        cost_per_unit: 480.0,
        pack_sizes: &[200.0],
        applications: &["Structural steel", "Bridges", "Offshore platforms"],
    },
    Entry {
        sku: "AP-UV-SHIELD-4L-033",
        product_name: "UV Stabilized Topcoat",
        category: "Exterior",
        corrosion: Rating::Medium,
        uv: Rating::VeryHigh,
        durability: Rating::High,
        compliance: &["ASTM D523"],
        cost_per_unit: 610.0,
        pack_sizes: &[4.0, 20.0],
        applications: &["Facade coatings", "Solar-exposed structures"],
    },
    Entry {
        sku: "AP-CHEM-RES-10L-044",
        product_name: "Chemical Resistant Coating",
        category: "Protective",
        corrosion: Rating::High,
        uv: Rating::Low,
        durability: Rating::VeryHigh,
        compliance: &["ISO 1461", "Chemical Safety Std"],
        cost_per_unit: 700.0,
        pack_sizes: &[10.0, 50.0],
        applications: &["Chemical plants", "Storage tanks"],
    },
    Entry {
        sku: "AP-FIRE-RET-20L-055",
        product_name: "Fire Retardant Coating",
        category: "Protective",
        corrosion: Rating::Medium,
        uv: Rating::Medium,
        durability: Rating::High,
        compliance: &["Fire Safety Std", "ISO 9001"],
        cost_per_unit: 750.0,
        pack_sizes: &[20.0],
        applications: &["Structural steel", "Large enclosures"],
    },
    Entry {
        sku: "AP-ECON-EXT-20L-066",
        product_name: "Economy Exterior Coating",
        category: "Exterior / Economy",
        corrosion: Rating::Medium,
        uv: Rating::Medium,
        durability: Rating::Medium,
        compliance: &["Basic ISO"],
        cost_per_unit: 330.0,
        pack_sizes: &[20.0],
        applications: &["Low-cost housing", "Non-critical exteriors"],
    },
    Entry {
        sku: "AP-MARINE-COAT-20L-077",
        product_name: "Marine Grade Coating",
        category: "Protective / Exterior",
        corrosion: Rating::VeryHigh,
        uv: Rating::High,
        durability: Rating::VeryHigh,
        compliance: &["ISO 12944", "Marine Coating Std"],
        cost_per_unit: 820.0,
        pack_sizes: &[20.0, 200.0],
        applications: &["Ships", "Offshore structures", "Coastal installations"],
    },
    Entry {
        sku: "AP-INT-ECO-1L-088",
        product_name: "Budget Interior Emulsion",
        category: "Interior / Economy",
        corrosion: Rating::Low,
        uv: Rating::Low,
        durability: Rating::Medium,
        compliance: &["Low VOC"],
        cost_per_unit: 150.0,
        pack_sizes: &[1.0, 5.0],
        applications: &["Residential interiors"],
    },
];

pub(crate) fn standard_items() -> Vec<CatalogItem> {
    STANDARD_ENTRIES.iter().map(Entry::to_item).collect()
}
