use chrono::Duration;

use super::common::*;
use crate::workflows::matching::{EliminationPipeline, PipelineConfig, Stage, StepState};

fn assert_partition(step: &StepState, input: usize) {
    assert_eq!(step.input_len(), input, "{} lost or gained candidates", step.stage.label());
    for elimination in &step.eliminated {
        assert!(!elimination.reason.is_empty());
        assert!(step
            .survivors
            .iter()
            .all(|survivor| survivor.id != elimination.candidate.id));
    }
}

#[test]
fn deadline_boundary_is_inclusive_at_seven_days() {
    let pipeline = EliminationPipeline::default();
    let mut exact = candidate("SFP-020", "corrosion", 0);
    exact.deadline = now() + Duration::days(7);
    let mut short = candidate("SFP-021", "corrosion", 0);
    short.deadline = now() + Duration::days(7) - Duration::hours(1);

    let step = pipeline.deadline_filter(&[exact, short], now());

    assert_eq!(step.stage, Stage::DeadlineValidation);
    assert_eq!(step.survivors.len(), 1);
    assert_eq!(step.survivors[0].id, "SFP-020");
    assert_eq!(
        step.eliminated[0].reason,
        "Insufficient deadline (6 days < 7 days required)"
    );
}

#[test]
fn past_deadlines_report_negative_days() {
    let pipeline = EliminationPipeline::default();
    let step = pipeline.deadline_filter(&[candidate("SFP-022", "iso", -2)], now());

    assert!(step.survivors.is_empty());
    assert_eq!(
        step.eliminated[0].reason,
        "Insufficient deadline (-2 days < 7 days required)"
    );
}

#[test]
fn partial_days_are_floored_in_reasons() {
    let pipeline = EliminationPipeline::default();
    let mut soon = candidate("SFP-023", "iso", 0);
    soon.deadline = now() + Duration::hours(84);
    let mut overdue = candidate("SFP-024", "iso", 0);
    overdue.deadline = now() - Duration::hours(36);

    let step = pipeline.deadline_filter(&[soon, overdue], now());

    let reasons: Vec<&str> = step
        .eliminated
        .iter()
        .map(|elimination| elimination.reason.as_str())
        .collect();
    assert_eq!(
        reasons,
        vec![
            "Insufficient deadline (3 days < 7 days required)",
            "Insufficient deadline (-2 days < 7 days required)",
        ]
    );
}

#[test]
fn oversized_deadline_requirement_eliminates_without_panicking() {
    let pipeline = EliminationPipeline::new(PipelineConfig {
        min_deadline_days: i64::MAX,
        ..PipelineConfig::default()
    });

    let step = pipeline.deadline_filter(&[candidate("SFP-025", "iso", 3650)], now());

    assert_partition(&step, 1);
    assert!(step.survivors.is_empty());
    assert_eq!(
        step.eliminated[0].reason,
        format!("Insufficient deadline (3650 days < {} days required)", i64::MAX)
    );
}

#[test]
fn spec_filter_requires_a_critical_keyword() {
    let pipeline = EliminationPipeline::default();
    let batch = vec![
        candidate("SFP-030", "Chemical splash zones", 30),
        candidate("SFP-031", "UV stable topcoat", 30),
        candidate("SFP-032", "matte finish, low odour", 30),
    ];

    let step = pipeline.spec_filter(&batch);

    assert_partition(&step, 3);
    let survivors: Vec<&str> = step.survivors.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(survivors, vec!["SFP-030", "SFP-031"]);
    assert_eq!(
        step.eliminated[0].reason,
        "Missing critical specification or compliance keywords"
    );
}

#[test]
fn threshold_ranks_descending_and_records_scored_data() {
    let pipeline = EliminationPipeline::default();
    let batch = vec![
        candidate("SFP-040", "astm only", 30),
        reference_candidate(),
    ];

    let step = pipeline.score_and_threshold(&batch, &[reference_item()]);

    assert_partition(&step, 2);
    assert_eq!(step.stage, Stage::ScoringThreshold);
    assert_eq!(step.survivors[0].id, "SFP-001");
    assert_eq!(step.eliminated[0].reason, "Score 20 below threshold 40");

    let scored = step.scored_data.expect("scored data recorded");
    assert_eq!(scored.len(), 1);
    assert_eq!(scored[0].score, 43);
}

#[test]
fn ranking_is_stable_for_equal_scores() {
    let pipeline = EliminationPipeline::default();
    let batch = vec![
        candidate("SFP-050", "corrosion, ISO 12944", 30),
        candidate("SFP-051", "corrosion, ISO 12944", 30),
        candidate("SFP-052", "corrosion, ISO 12944", 30),
    ];

    let ranked = pipeline.rank(&batch, &[reference_item()]);
    let order: Vec<&str> = ranked.iter().map(|entry| entry.candidate.id.as_str()).collect();
    assert_eq!(order, vec!["SFP-050", "SFP-051", "SFP-052"]);
}

#[test]
fn shortlist_eliminates_entries_beyond_the_cut() {
    let pipeline = EliminationPipeline::new(PipelineConfig {
        shortlist_size: 2,
        ..PipelineConfig::default()
    });
    let ranked = vec![scored("A", 90), scored("B", 70), scored("C", 50)];

    let (step, shortlisted) = pipeline.shortlist(&ranked);

    assert_partition(&step, 3);
    assert_eq!(shortlisted.len(), 2);
    assert_eq!(step.eliminated[0].candidate.id, "C");
    assert_eq!(step.eliminated[0].reason, "Ranked beyond top 2");
}

#[test]
fn every_stage_partitions_its_input() {
    let pipeline = EliminationPipeline::default();
    let batch = mixed_batch();

    let loaded = pipeline.initial_load(&batch);
    assert_partition(&loaded, 5);

    let deadline = pipeline.deadline_filter(&loaded.survivors, now());
    assert_partition(&deadline, 5);
    assert_eq!(deadline.survivors.len(), 4);

    let spec = pipeline.spec_filter(&deadline.survivors);
    assert_partition(&spec, 4);
    assert_eq!(spec.survivors.len(), 3);

    let scoring = pipeline.score_and_threshold(&spec.survivors, &[reference_item()]);
    assert_partition(&scoring, 3);
    assert_eq!(scoring.survivors.len(), 2);

    let ranked = scoring.scored_data.clone().unwrap_or_default();
    let (shortlist, _) = pipeline.shortlist(&ranked);
    assert_partition(&shortlist, 2);
    assert_eq!(shortlist.survivors.len(), 2);
}
