use super::domain::{Candidate, ScoreBreakdown, ScoredCandidate};
use super::pricing::material_cost;
use crate::workflows::catalog::{CatalogItem, PropertyKind};

pub const SPECIFICATION_WEIGHT: u32 = 40;
pub const COMPLIANCE_WEIGHT: u32 = 30;
pub const QUANTITY_WEIGHT: u32 = 20;
pub const APPLICATION_WEIGHT: u32 = 10;

const SPECIFICATION_CAP: u32 = 12;
const COMPLIANCE_CAP: usize = 3;
const PARTIAL_QUANTITY_POINTS: u32 = 8;

const UV_KEYWORDS: [&str; 3] = ["uv", "sun", "exterior"];

/// Stateless weighted matcher between proposals and catalog items.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn score(&self, item: &CatalogItem, candidate: &Candidate) -> ScoreBreakdown {
        let requirements = candidate.requirement_text();
        let mut reasons = Vec::new();

        let specification = specification_points(item, &requirements, &mut reasons);

        let compliance_matches = compliance_matches(item, &requirements);
        let compliance = scale(
            compliance_matches.len().min(COMPLIANCE_CAP) as u32,
            COMPLIANCE_CAP as u32,
            COMPLIANCE_WEIGHT,
        );
        if !compliance_matches.is_empty() {
            reasons.push(format!(
                "Compliance matched ({})",
                compliance_matches.join(", ")
            ));
        }

        let quantity = quantity_points(item, candidate.quantity, &mut reasons);

        let application = match application_match(item, &candidate.application_text()) {
            Some(tag) => {
                reasons.push(format!("Application matched ({tag})"));
                APPLICATION_WEIGHT
            }
            None => 0,
        };

        ScoreBreakdown {
            specification,
            compliance,
            quantity,
            application,
            total: specification + compliance + quantity + application,
            compliance_matches,
            reasons,
        }
    }

    /// Scores the candidate against every item and keeps the first item with the
    /// highest total. An empty catalog yields a zero score and no match.
    pub fn best_match(&self, candidate: &Candidate, items: &[CatalogItem]) -> ScoredCandidate {
        let mut best: Option<(&CatalogItem, ScoreBreakdown)> = None;

        for item in items {
            let breakdown = self.score(item, candidate);
            let better = best
                .as_ref()
                .map(|(_, current)| breakdown.total > current.total)
                .unwrap_or(true);
            if better {
                best = Some((item, breakdown));
            }
        }

        match best {
            Some((item, breakdown)) => ScoredCandidate {
                candidate: candidate.clone(),
                score: breakdown.total,
                estimated_cost: material_cost(item.cost_per_unit, candidate.quantity),
                breakdown,
                matched_item: Some(item.clone()),
            },
            None => ScoredCandidate {
                candidate: candidate.clone(),
                score: 0,
                breakdown: ScoreBreakdown::default(),
                matched_item: None,
                estimated_cost: 0,
            },
        }
    }
}

fn specification_points(item: &CatalogItem, requirements: &str, reasons: &mut Vec<String>) -> u32 {
    let mut points = 0;

    if requirements.contains("corrosion") {
        let rating = item.rating(PropertyKind::CorrosionResistance);
        points += rating.points() * 2;
        reasons.push(format!("Corrosion matched ({rating})"));
    }
    if UV_KEYWORDS
        .iter()
        .any(|keyword| requirements.contains(keyword))
    {
        let rating = item.rating(PropertyKind::UvResistance);
        points += rating.points() * 2;
        reasons.push(format!("UV matched ({rating})"));
    }
    if requirements.contains("chemical") {
        let rating = item.rating(PropertyKind::Durability);
        points += rating.points() * 2;
        reasons.push(format!("Chemical/durability matched ({rating})"));
    }

    scale(points.min(SPECIFICATION_CAP), SPECIFICATION_CAP, SPECIFICATION_WEIGHT)
}

fn compliance_matches(item: &CatalogItem, requirements: &str) -> Vec<String> {
    item.compliance
        .iter()
        .filter(|standard| {
            let full = standard.trim().to_lowercase();
            let leading = leading_word(&full);
            (!full.is_empty() && requirements.contains(full.as_str()))
                || (!leading.is_empty() && requirements.contains(leading))
        })
        .cloned()
        .collect()
}

fn quantity_points(item: &CatalogItem, quantity: f64, reasons: &mut Vec<String>) -> u32 {
    if let Some(pack) = item.pack_sizes.iter().find(|pack| quantity >= **pack) {
        reasons.push(format!("Quantity {quantity} covers pack size {pack}"));
        QUANTITY_WEIGHT
    } else if quantity > 0.0 {
        reasons.push(format!("Quantity {quantity} below smallest pack size"));
        PARTIAL_QUANTITY_POINTS
    } else {
        0
    }
}

fn application_match<'a>(item: &'a CatalogItem, text: &str) -> Option<&'a str> {
    item.applications
        .iter()
        .map(String::as_str)
        .find(|tag| {
            let leading = tag.split_whitespace().next().unwrap_or("").to_lowercase();
            !leading.is_empty() && text.contains(leading.as_str())
        })
}

fn leading_word(value: &str) -> &str {
    value.split_whitespace().next().unwrap_or("")
}

/// `round(points / cap * weight)`, half away from zero.
fn scale(points: u32, cap: u32, weight: u32) -> u32 {
    if cap == 0 {
        return 0;
    }
    (f64::from(points) / f64::from(cap) * f64::from(weight)).round() as u32
}
