use super::domain::{FinalSelection, ScoredCandidate};
use super::pricing::PricingCalculator;

/// Turns the ranked shortlist into the single priced recommendation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAssembler {
    pricing: PricingCalculator,
}

impl ResultAssembler {
    pub fn new(pricing: PricingCalculator) -> Self {
        Self { pricing }
    }

    /// Uses the highest ranked entry that has a matched catalog item.
    pub fn assemble(&self, shortlist: &[ScoredCandidate]) -> Option<FinalSelection> {
        let selected = shortlist.iter().find(|entry| entry.matched_item.is_some())?;
        let item = selected.matched_item.clone()?;
        let pricing = self.pricing.price(&item, selected.candidate.quantity);

        Some(FinalSelection {
            candidate: selected.candidate.clone(),
            justification: format!(
                "Highest match score ({}%) among {} shortlisted candidates",
                selected.score,
                shortlist.len()
            ),
            match_score: selected.score,
            total_cost: pricing.total_cost,
            pricing,
            item,
        })
    }
}
