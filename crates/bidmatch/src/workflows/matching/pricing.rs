use super::domain::{LineItem, PricingBreakdown, PricingQuote, ScoredCandidate};
use crate::workflows::catalog::CatalogItem;

const IMPLEMENTATION_RATE: f64 = 0.2;
const SUPPORT_RATE: f64 = 0.1;
const CONTINGENCY_RATE: f64 = 0.03;

/// Derives project cost from a matched item and requested quantity.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingCalculator;

impl PricingCalculator {
    /// Every term is rounded on its own; the total is the exact sum of the
    /// rounded terms.
    pub fn price(&self, item: &CatalogItem, quantity: f64) -> PricingBreakdown {
        let material_cost = material_cost(item.cost_per_unit, quantity);
        let implementation_cost = surcharge(material_cost, IMPLEMENTATION_RATE);
        let annual_support = surcharge(material_cost, SUPPORT_RATE);
        let contingency = surcharge(material_cost, CONTINGENCY_RATE);
        let total_cost = material_cost + implementation_cost + annual_support + contingency;

        let line_items = vec![
            LineItem {
                item: format!("Material ({})", item.product_name),
                cost: material_cost,
            },
            LineItem {
                item: "Implementation & Integration".to_string(),
                cost: implementation_cost,
            },
            LineItem {
                item: "Annual Support".to_string(),
                cost: annual_support,
            },
            LineItem {
                item: "Contingency".to_string(),
                cost: contingency,
            },
        ];

        PricingBreakdown {
            unit_price: item.cost_per_unit,
            quantity,
            material_cost,
            implementation_cost,
            annual_support,
            contingency,
            total_cost,
            line_items,
        }
    }

    /// Quote for a shortlisted candidate; `None` when nothing in the catalog matched.
    pub fn quote(&self, scored: &ScoredCandidate) -> Option<PricingQuote> {
        let item = scored.matched_item.as_ref()?;
        Some(PricingQuote {
            candidate_id: scored.candidate.id.clone(),
            candidate_title: scored.candidate.title.clone(),
            sku: item.sku.clone(),
            product_name: item.product_name.clone(),
            pricing: self.price(item, scored.candidate.quantity),
        })
    }
}

pub(crate) fn material_cost(cost_per_unit: f64, quantity: f64) -> i64 {
    (cost_per_unit * quantity).round() as i64
}

fn surcharge(material_cost: i64, rate: f64) -> i64 {
    (material_cost as f64 * rate).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn item(cost_per_unit: f64) -> CatalogItem {
        CatalogItem {
            sku: "AP-TEST".to_string(),
            product_name: "Test Coat".to_string(),
            category: "Protective".to_string(),
            properties: BTreeMap::new(),
            compliance: Vec::new(),
            cost_per_unit,
            pack_sizes: vec![20.0],
            applications: Vec::new(),
        }
    }

    #[test]
    fn price_matches_reference_quote() {
        let pricing = PricingCalculator.price(&item(420.0), 1000.0);
        assert_eq!(pricing.material_cost, 420_000);
        assert_eq!(pricing.implementation_cost, 84_000);
        assert_eq!(pricing.annual_support, 42_000);
        assert_eq!(pricing.contingency, 12_600);
        assert_eq!(pricing.total_cost, 558_600);
        assert_eq!(pricing.line_items[0].item, "Material (Test Coat)");
        assert_eq!(pricing.line_items.len(), 4);
    }

    #[test]
    fn terms_round_independently_and_sum_exactly() {
        for (cost, quantity) in [(3.35, 7.0), (0.0, 1000.0), (820.0, 333.0), (12.49, 0.5), (1.0, 0.0)] {
            let pricing = PricingCalculator.price(&item(cost), quantity);
            assert_eq!(
                pricing.material_cost
                    + pricing.implementation_cost
                    + pricing.annual_support
                    + pricing.contingency,
                pricing.total_cost,
                "cost {cost} quantity {quantity}"
            );
            let line_total: i64 = pricing.line_items.iter().map(|line| line.cost).sum();
            assert_eq!(line_total, pricing.total_cost);
        }
    }

    #[test]
    fn rounding_applies_per_term() {
        // material 23 -> implementation 4.6 -> 5, support 2.3 -> 2, contingency 0.69 -> 1
        let pricing = PricingCalculator.price(&item(23.0), 1.0);
        assert_eq!(pricing.material_cost, 23);
        assert_eq!(pricing.implementation_cost, 5);
        assert_eq!(pricing.annual_support, 2);
        assert_eq!(pricing.contingency, 1);
        assert_eq!(pricing.total_cost, 31);
    }
}
