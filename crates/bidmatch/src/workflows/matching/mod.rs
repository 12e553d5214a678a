//! Proposal elimination, scoring, shortlisting and pricing.
//!
//! The stage engines are pure functions over their inputs. [`PhaseController`]
//! sequences them, owns all observable run state and enforces single-flight.

pub mod assembly;
pub mod config;
pub mod controller;
pub mod domain;
pub mod pacing;
pub mod pipeline;
pub mod pricing;
pub mod scoring;
pub mod shortlist;

#[cfg(test)]
mod tests;

pub use assembly::ResultAssembler;
pub use config::PipelineConfig;
pub use controller::{
    EngineSnapshot, PhaseController, RunRejection, RunStatus, RunTicket, StageError,
};
pub use domain::{
    parse_deadline, Candidate, Elimination, FinalSelection, LineItem, LogEntry, Phase,
    PricingBreakdown, PricingQuote, Requirements, ScoreBreakdown, ScoredCandidate, Severity, Stage,
    StepState, DEFAULT_QUANTITY,
};
pub use pacing::{Clock, FixedClock, InstantPacer, Pacer, ProfilePacer, SpeedProfile, SystemClock};
pub use pipeline::{EliminationPipeline, SPEC_KEYWORDS};
pub use pricing::PricingCalculator;
pub use scoring::ScoringEngine;
pub use shortlist::ShortlistSelector;
