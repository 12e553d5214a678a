use chrono::{DateTime, Duration, Utc};

use super::config::PipelineConfig;
use super::domain::{Candidate, Elimination, ScoredCandidate, Stage, StepState};
use super::scoring::ScoringEngine;
use super::shortlist::ShortlistSelector;
use crate::workflows::catalog::CatalogItem;

/// Keywords a proposal must mention to reach scoring.
pub const SPEC_KEYWORDS: [&str; 5] = ["corrosion", "uv", "chemical", "iso", "astm"];

const SECONDS_PER_DAY: i64 = 86_400;

/// Ordered elimination stages. Each stage consumes the previous survivors and
/// partitions them into survivors and eliminees; nothing is dropped or added.
#[derive(Debug, Clone, Default)]
pub struct EliminationPipeline {
    config: PipelineConfig,
    scoring: ScoringEngine,
    selector: ShortlistSelector,
}

impl EliminationPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            scoring: ScoringEngine,
            selector: ShortlistSelector,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn initial_load(&self, candidates: &[Candidate]) -> StepState {
        StepState::new(Stage::InitialLoad, candidates.to_vec(), Vec::new())
    }

    /// Passes candidates with at least `min_deadline_days` left, measured
    /// exactly against `now`.
    ///
    /// The day count in an elimination reason is floored toward negative
    /// infinity: 6 days 23 hours reads "6 days" and 36 hours overdue reads
    /// "-2 days". A requirement too large for a [`Duration`] eliminates
    /// every candidate.
    pub fn deadline_filter(&self, candidates: &[Candidate], now: DateTime<Utc>) -> StepState {
        let min_days = self.config.min_deadline_days;
        let required = Duration::try_days(min_days).unwrap_or(if min_days < 0 {
            Duration::MIN
        } else {
            Duration::MAX
        });
        let mut survivors = Vec::new();
        let mut eliminated = Vec::new();

        for candidate in candidates {
            let remaining = candidate.deadline - now;
            if remaining >= required {
                survivors.push(candidate.clone());
            } else {
                let days = remaining.num_seconds().div_euclid(SECONDS_PER_DAY);
                eliminated.push(Elimination {
                    candidate: candidate.clone(),
                    reason: format!(
                        "Insufficient deadline ({} days < {} days required)",
                        days, self.config.min_deadline_days
                    ),
                });
            }
        }

        StepState::new(Stage::DeadlineValidation, survivors, eliminated)
    }

    pub fn spec_filter(&self, candidates: &[Candidate]) -> StepState {
        let (survivors, eliminated): (Vec<&Candidate>, Vec<&Candidate>) = candidates
            .iter()
            .partition(|candidate| mentions_critical_keyword(&candidate.requirement_text()));

        StepState::new(
            Stage::SpecComplianceFilter,
            survivors.into_iter().cloned().collect(),
            eliminated
                .into_iter()
                .map(|candidate| Elimination {
                    candidate: candidate.clone(),
                    reason: "Missing critical specification or compliance keywords".to_string(),
                })
                .collect(),
        )
    }

    /// Scores every candidate against the catalog, ranks by best score
    /// (stable, ties keep input order) and drops anything under `min_score`.
    /// The passing entries are kept as `scored_data` in rank order.
    pub fn score_and_threshold(&self, candidates: &[Candidate], items: &[CatalogItem]) -> StepState {
        self.threshold(self.rank(candidates, items))
    }

    /// Best match per candidate, sorted by score descending.
    pub fn rank(&self, candidates: &[Candidate], items: &[CatalogItem]) -> Vec<ScoredCandidate> {
        let mut ranked: Vec<ScoredCandidate> = candidates
            .iter()
            .map(|candidate| self.scoring.best_match(candidate, items))
            .collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }

    pub fn threshold(&self, ranked: Vec<ScoredCandidate>) -> StepState {
        let min_score = self.config.min_score;
        let (passed, failed): (Vec<ScoredCandidate>, Vec<ScoredCandidate>) =
            ranked.into_iter().partition(|entry| entry.score >= min_score);

        let eliminated = failed
            .into_iter()
            .map(|entry| Elimination {
                reason: format!("Score {} below threshold {}", entry.score, min_score),
                candidate: entry.candidate,
            })
            .collect();

        StepState {
            stage: Stage::ScoringThreshold,
            survivors: passed.iter().map(|entry| entry.candidate.clone()).collect(),
            eliminated,
            scored_data: Some(passed),
        }
    }

    /// Keeps the top `shortlist_size` ranked entries. Returns the stage
    /// snapshot together with the shortlisted scored entries.
    pub fn shortlist(&self, ranked: &[ScoredCandidate]) -> (StepState, Vec<ScoredCandidate>) {
        let top_n = self.config.shortlist_size;
        let selected = self
            .selector
            .select_indices(ranked, top_n, self.config.min_score);

        let mut keep = vec![false; ranked.len()];
        for index in &selected {
            keep[*index] = true;
        }

        let shortlisted: Vec<ScoredCandidate> =
            selected.iter().map(|index| ranked[*index].clone()).collect();
        let eliminated = ranked
            .iter()
            .zip(keep)
            .filter(|(_, kept)| !kept)
            .map(|(entry, _)| Elimination {
                candidate: entry.candidate.clone(),
                reason: format!("Ranked beyond top {}", top_n),
            })
            .collect();

        let step = StepState::new(
            Stage::FinalShortlist,
            shortlisted
                .iter()
                .map(|entry| entry.candidate.clone())
                .collect(),
            eliminated,
        );

        (step, shortlisted)
    }
}

fn mentions_critical_keyword(requirements: &str) -> bool {
    SPEC_KEYWORDS
        .iter()
        .any(|keyword| requirements.contains(keyword))
}
