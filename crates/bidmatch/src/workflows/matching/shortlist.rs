use super::domain::ScoredCandidate;

/// Picks the top ranked entries from an already sorted scoring result.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortlistSelector;

impl ShortlistSelector {
    /// Entries at or above `min_score`, capped at `top_n`. When nothing meets
    /// the threshold the first `top_n` of the unfiltered ranking is returned
    /// instead of an empty list.
    pub fn shortlist(
        &self,
        scored: &[ScoredCandidate],
        top_n: usize,
        min_score: u32,
    ) -> Vec<ScoredCandidate> {
        self.select_indices(scored, top_n, min_score)
            .into_iter()
            .map(|index| scored[index].clone())
            .collect()
    }

    pub(crate) fn select_indices(
        &self,
        scored: &[ScoredCandidate],
        top_n: usize,
        min_score: u32,
    ) -> Vec<usize> {
        let qualified: Vec<usize> = scored
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.score >= min_score)
            .map(|(index, _)| index)
            .take(top_n)
            .collect();

        if qualified.is_empty() {
            return (0..scored.len().min(top_n)).collect();
        }

        qualified
    }
}
