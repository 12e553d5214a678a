use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::workflows::catalog::CatalogItem;

/// Quantity assumed when a proposal omits it or supplies something non-numeric.
pub const DEFAULT_QUANTITY: f64 = 1000.0;

/// A procurement proposal evaluated against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable_requirements")]
    pub requirements: Requirements,
    #[serde(deserialize_with = "deserialize_deadline")]
    pub deadline: DateTime<Utc>,
    #[serde(default = "default_quantity", deserialize_with = "lenient_quantity")]
    pub quantity: f64,
}

impl Candidate {
    /// Lowercased requirement text used by every keyword check.
    pub fn requirement_text(&self) -> String {
        self.requirements.joined().to_lowercase()
    }

    /// Lowercased description and title, matched against application tags.
    pub fn application_text(&self) -> String {
        format!("{} {}", self.description, self.title).to_lowercase()
    }
}

/// Requirements arrive either as prose or as a list of bullet points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Requirements {
    Text(String),
    List(Vec<String>),
}

impl Requirements {
    pub fn joined(&self) -> String {
        match self {
            Requirements::Text(text) => text.clone(),
            Requirements::List(items) => items.join(" "),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Requirements::Text(text) => text.trim().is_empty(),
            Requirements::List(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }
}

impl Default for Requirements {
    fn default() -> Self {
        Requirements::Text(String::new())
    }
}

fn default_quantity() -> f64 {
    DEFAULT_QUANTITY
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawQuantity>::deserialize(deserializer)?;
    let quantity = match raw {
        Some(RawQuantity::Number(value)) => Some(value),
        Some(RawQuantity::Text(text)) => text.trim().parse::<f64>().ok(),
        Some(RawQuantity::Other(_)) | None => None,
    };
    Ok(quantity
        .filter(|value| value.is_finite())
        .unwrap_or(DEFAULT_QUANTITY))
}

fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_requirements<'de, D>(deserializer: D) -> Result<Requirements, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Requirements>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_deadline<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_deadline(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid deadline '{raw}'")))
}

/// Accepts RFC 3339 instants or bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_deadline(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Weighted match between one candidate and one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub specification: u32,
    pub compliance: u32,
    pub quantity: u32,
    pub application: u32,
    pub total: u32,
    pub compliance_matches: Vec<String>,
    pub reasons: Vec<String>,
}

/// A candidate paired with its best-scoring catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: u32,
    pub breakdown: ScoreBreakdown,
    pub matched_item: Option<CatalogItem>,
    pub estimated_cost: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elimination {
    pub candidate: Candidate,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    InitialLoad,
    DeadlineValidation,
    SpecComplianceFilter,
    ScoringThreshold,
    FinalShortlist,
}

impl Stage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::InitialLoad => "Initial Load",
            Self::DeadlineValidation => "Deadline Validation",
            Self::SpecComplianceFilter => "Spec/Compliance Filter",
            Self::ScoringThreshold => "Scoring & Threshold Filter",
            Self::FinalShortlist => "Final Shortlist",
        }
    }
}

/// Survivors and eliminees produced by one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepState {
    pub stage: Stage,
    pub survivors: Vec<Candidate>,
    pub eliminated: Vec<Elimination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scored_data: Option<Vec<ScoredCandidate>>,
}

impl StepState {
    pub fn new(stage: Stage, survivors: Vec<Candidate>, eliminated: Vec<Elimination>) -> Self {
        Self {
            stage,
            survivors,
            eliminated,
            scored_data: None,
        }
    }

    pub fn input_len(&self) -> usize {
        self.survivors.len() + self.eliminated.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item: String,
    pub cost: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub unit_price: f64,
    pub quantity: f64,
    pub material_cost: i64,
    pub implementation_cost: i64,
    pub annual_support: i64,
    pub contingency: i64,
    pub total_cost: i64,
    pub line_items: Vec<LineItem>,
}

/// Priced recommendation for one shortlisted candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingQuote {
    pub candidate_id: String,
    pub candidate_title: String,
    pub sku: String,
    pub product_name: String,
    pub pricing: PricingBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalSelection {
    pub candidate: Candidate,
    pub item: CatalogItem,
    pub match_score: u32,
    pub justification: String,
    pub pricing: PricingBreakdown,
    pub total_cost: i64,
}

/// Engine phases, strictly linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    NotStarted,
    Loading,
    DeadlineFilter,
    SpecFilter,
    Scoring,
    Shortlist,
    Completed,
}

impl Phase {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::NotStarted,
            Self::Loading,
            Self::DeadlineFilter,
            Self::SpecFilter,
            Self::Scoring,
            Self::Shortlist,
            Self::Completed,
        ]
    }

    /// Transition table. `Completed` is terminal.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::NotStarted => Some(Self::Loading),
            Self::Loading => Some(Self::DeadlineFilter),
            Self::DeadlineFilter => Some(Self::SpecFilter),
            Self::SpecFilter => Some(Self::Scoring),
            Self::Scoring => Some(Self::Shortlist),
            Self::Shortlist => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::Loading => "LOADING",
            Self::DeadlineFilter => "DEADLINE_FILTER",
            Self::SpecFilter => "SPEC_FILTER",
            Self::Scoring => "SCORING",
            Self::Shortlist => "SHORTLIST",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Append-only event log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub severity: Severity,
}
