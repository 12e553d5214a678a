use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Qualitative rating attached to a catalog property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    #[default]
    None,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Rating {
    /// Lenient parse used for catalog feeds: "Very High", "very-high" and
    /// "VERY_HIGH" all resolve the same way.
    pub fn parse(value: &str) -> Self {
        let value = value.trim().to_ascii_lowercase();
        if value.contains("very") {
            Self::VeryHigh
        } else if value.contains("high") {
            Self::High
        } else if value.contains("medium") {
            Self::Medium
        } else if value.contains("low") {
            Self::Low
        } else {
            Self::None
        }
    }

    pub const fn points(self) -> u32 {
        match self {
            Self::None | Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::VeryHigh => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Rating::parse(&raw))
    }
}

/// Properties the specification stage knows how to rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    CorrosionResistance,
    UvResistance,
    Durability,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 3] = [
        Self::CorrosionResistance,
        Self::UvResistance,
        Self::Durability,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::CorrosionResistance => "Corrosion resistance",
            Self::UvResistance => "UV resistance",
            Self::Durability => "Durability",
        }
    }
}

/// A sellable SKU with its qualitative ratings, standards and pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub sku: String,
    pub product_name: String,
    pub category: String,
    #[serde(default)]
    pub properties: BTreeMap<PropertyKind, Rating>,
    #[serde(default)]
    pub compliance: Vec<String>,
    pub cost_per_unit: f64,
    #[serde(default)]
    pub pack_sizes: Vec<f64>,
    #[serde(default)]
    pub applications: Vec<String>,
}

impl CatalogItem {
    /// Missing properties rate as [`Rating::None`].
    pub fn rating(&self, kind: PropertyKind) -> Rating {
        self.properties.get(&kind).copied().unwrap_or_default()
    }
}
