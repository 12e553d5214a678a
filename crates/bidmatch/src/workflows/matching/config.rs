use serde::{Deserialize, Serialize};

/// Thresholds applied by the elimination stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub min_deadline_days: i64,
    pub min_score: u32,
    pub shortlist_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_deadline_days: 7,
            min_score: 40,
            shortlist_size: 3,
        }
    }
}
