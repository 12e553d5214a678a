use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use super::assembly::ResultAssembler;
use super::config::PipelineConfig;
use super::domain::{
    Candidate, FinalSelection, LogEntry, Phase, PricingQuote, ScoredCandidate, Severity, StepState,
};
use super::pacing::{Clock, Pacer, ProfilePacer, SpeedProfile, SystemClock};
use super::pipeline::EliminationPipeline;
use super::pricing::PricingCalculator;
use crate::workflows::catalog::{CatalogError, CatalogProvider};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Failure inside a phase. Aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Why a `run` call did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunRejection {
    Busy,
    NoCandidates,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Rejected(RunRejection),
    Failed(String),
    /// `reset` was called while this run was in flight; its remaining work was discarded.
    Abandoned,
}

/// Read-only view of the engine handed to observers.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub phase: Phase,
    pub step_history: Vec<StepState>,
    pub log: Vec<LogEntry>,
    pub quotes: Vec<PricingQuote>,
    pub final_selection: Option<FinalSelection>,
    pub is_running: bool,
}

#[derive(Debug, Default)]
struct EngineState {
    phase: Phase,
    step_history: Vec<StepState>,
    log: Vec<LogEntry>,
    quotes: Vec<PricingQuote>,
    final_selection: Option<FinalSelection>,
    active_run: Option<u64>,
    next_run_id: u64,
}

impl EngineState {
    fn clear(&mut self) {
        self.phase = Phase::NotStarted;
        self.step_history.clear();
        self.log.clear();
        self.quotes.clear();
        self.final_selection = None;
    }
}

/// Working set threaded through the phases of one run.
struct RunContext {
    active: Vec<Candidate>,
    ranked: Vec<ScoredCandidate>,
    shortlist: Vec<ScoredCandidate>,
}

#[derive(Default)]
struct StageOutcome {
    step: Option<StepState>,
    entries: Vec<(Severity, String)>,
    quotes: Option<Vec<PricingQuote>>,
    final_selection: Option<FinalSelection>,
}

impl StageOutcome {
    fn log(&mut self, severity: Severity, message: impl Into<String>) {
        self.entries.push((severity, message.into()));
    }
}

/// Drives the elimination pipeline through its phases, one run at a time.
pub struct PhaseController {
    catalog: Arc<dyn CatalogProvider>,
    pipeline: EliminationPipeline,
    pricing: PricingCalculator,
    assembler: ResultAssembler,
    pacer: Box<dyn Pacer>,
    clock: Box<dyn Clock>,
    state: Arc<Mutex<EngineState>>,
    events: broadcast::Sender<LogEntry>,
}

/// Claim on the engine's single run slot, returned by
/// [`PhaseController::try_begin`]. Dropping it without driving the run
/// releases the slot.
#[must_use = "the run slot is held until the ticket is driven or dropped"]
pub struct RunTicket {
    run_id: u64,
    candidates: Vec<Candidate>,
    state: Arc<Mutex<EngineState>>,
}

impl RunTicket {
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }
}

impl Drop for RunTicket {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.active_run == Some(self.run_id) {
            state.active_run = None;
        }
    }
}

impl PhaseController {
    pub fn new(catalog: Arc<dyn CatalogProvider>, config: PipelineConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let pricing = PricingCalculator;

        Self {
            catalog,
            pipeline: EliminationPipeline::new(config),
            pricing,
            assembler: ResultAssembler::new(pricing),
            pacer: Box::new(ProfilePacer),
            clock: Box::new(SystemClock),
            state: Arc::new(Mutex::new(EngineState::default())),
            events,
        }
    }

    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        self.pipeline.config()
    }

    /// Receives every log entry in emission order from the moment of subscription.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let state = self.lock_state();
        EngineSnapshot {
            phase: state.phase,
            step_history: state.step_history.clone(),
            log: state.log.clone(),
            quotes: state.quotes.clone(),
            final_selection: state.final_selection.clone(),
            is_running: state.active_run.is_some(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock_state().active_run.is_some()
    }

    /// Clears every piece of run state. A run still in flight loses ownership
    /// of the engine and its remaining output is discarded.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        if let Some(run_id) = state.active_run.take() {
            warn!(run_id, "reset while a run was in flight");
        }
        state.clear();
    }

    /// Runs the full phase sequence over `candidates`.
    ///
    /// A call made while another run is in flight returns
    /// [`RunRejection::Busy`] without touching any state. An empty candidate
    /// set logs a warning and performs no phase transition.
    pub async fn run(&self, candidates: Vec<Candidate>, speed: SpeedProfile) -> RunStatus {
        match self.try_begin(candidates) {
            Ok(ticket) => self.drive(ticket, speed).await,
            Err(rejection) => RunStatus::Rejected(rejection),
        }
    }

    /// Claims the run slot synchronously. Callers that hand the run to a
    /// background task use this to learn about rejection before spawning.
    pub fn try_begin(&self, candidates: Vec<Candidate>) -> Result<RunTicket, RunRejection> {
        let run_id = self.begin(&candidates)?;
        Ok(RunTicket {
            run_id,
            candidates,
            state: Arc::clone(&self.state),
        })
    }

    /// Walks every phase for a claimed run.
    pub async fn drive(&self, mut ticket: RunTicket, speed: SpeedProfile) -> RunStatus {
        if !Arc::ptr_eq(&ticket.state, &self.state) {
            warn!(run_id = ticket.run_id, "ticket issued by another engine");
            return RunStatus::Abandoned;
        }
        let run_id = ticket.run_id;
        let candidates = std::mem::take(&mut ticket.candidates);

        info!(run_id, candidates = candidates.len(), speed = speed.label(), "run started");

        let mut context = RunContext {
            active: candidates,
            ranked: Vec::new(),
            shortlist: Vec::new(),
        };
        let mut phase = Phase::NotStarted;

        while let Some(next) = phase.next() {
            phase = next;

            let start_line = self.start_line(phase, &context);
            if !self.enter(run_id, phase, start_line) {
                return RunStatus::Abandoned;
            }

            self.pause(phase, speed).await;

            let committed = match self.execute(phase, &mut context) {
                Ok(outcome) => self.commit(run_id, outcome),
                Err(err) => {
                    error!(run_id, %phase, error = %err, "run aborted");
                    let message = err.to_string();
                    self.abort(run_id, &message);
                    return RunStatus::Failed(message);
                }
            };
            if !committed {
                return RunStatus::Abandoned;
            }

            info!(run_id, %phase, survivors = context.active.len(), "phase completed");
        }

        RunStatus::Completed
    }

    fn begin(&self, candidates: &[Candidate]) -> Result<u64, RunRejection> {
        let mut state = self.lock_state();

        if let Some(active) = state.active_run {
            warn!(active_run = active, "run rejected: another run is in flight");
            return Err(RunRejection::Busy);
        }

        if candidates.is_empty() {
            warn!("run rejected: no candidates supplied");
            self.push_entry(
                &mut state,
                Severity::Warning,
                "No candidates available to process. Please load candidates first.".to_string(),
            );
            return Err(RunRejection::NoCandidates);
        }

        let run_id = state.next_run_id;
        state.next_run_id += 1;
        state.active_run = Some(run_id);
        state.clear();
        self.push_entry(
            &mut state,
            Severity::Success,
            format!(
                "Starting multi-candidate run with {} candidates...",
                candidates.len()
            ),
        );

        Ok(run_id)
    }

    fn start_line(&self, phase: Phase, context: &RunContext) -> String {
        let count = context.active.len();
        // The driving loop starts from `NotStarted.next()`, so `NotStarted` never reaches here.
        match phase {
            Phase::NotStarted | Phase::Loading => "Automated trigger activated".to_string(),
            Phase::DeadlineFilter => format!("Validating deadlines across {count} candidates..."),
            Phase::SpecFilter => {
                format!("Filtering {count} candidates by specification and compliance...")
            }
            Phase::Scoring => format!("Scoring {count} remaining candidates against catalog..."),
            Phase::Shortlist => format!("Creating final shortlist from {count} candidates..."),
            Phase::Completed => "Assembling final selection...".to_string(),
        }
    }

    async fn pause(&self, phase: Phase, speed: SpeedProfile) {
        let delay = self.pacer.delay_for(phase, speed);
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }
    }

    fn execute(&self, phase: Phase, context: &mut RunContext) -> Result<StageOutcome, StageError> {
        let config = self.pipeline.config();
        let mut outcome = StageOutcome::default();

        match phase {
            Phase::NotStarted | Phase::Loading => {
                let step = self.pipeline.initial_load(&context.active);
                outcome.log(
                    Severity::Info,
                    format!("Loaded {} candidates for processing...", step.survivors.len()),
                );
                outcome.step = Some(step);
            }
            Phase::DeadlineFilter => {
                let step = self
                    .pipeline
                    .deadline_filter(&context.active, self.clock.now());
                let severity = if step.eliminated.is_empty() {
                    Severity::Success
                } else {
                    Severity::Warning
                };
                outcome.log(
                    severity,
                    format!(
                        "Deadline filter: {} passed, {} eliminated",
                        step.survivors.len(),
                        step.eliminated.len()
                    ),
                );
                context.active = step.survivors.clone();
                outcome.step = Some(step);
            }
            Phase::SpecFilter => {
                let step = self.pipeline.spec_filter(&context.active);
                outcome.log(
                    Severity::Success,
                    format!(
                        "Spec/Compliance filter: {} passed, {} eliminated",
                        step.survivors.len(),
                        step.eliminated.len()
                    ),
                );
                context.active = step.survivors.clone();
                outcome.step = Some(step);
            }
            Phase::Scoring => {
                let items = self.catalog.list_items()?;
                let ranked = self.pipeline.rank(&context.active, &items);
                outcome.log(
                    Severity::Info,
                    format!(
                        "Scoring complete: Top score {}, Lowest score {}",
                        ranked.first().map(|entry| entry.score).unwrap_or(0),
                        ranked.last().map(|entry| entry.score).unwrap_or(0)
                    ),
                );

                let step = self.pipeline.threshold(ranked);
                outcome.log(
                    Severity::Success,
                    format!(
                        "Score filter: {} passed (score >= {}), {} eliminated",
                        step.survivors.len(),
                        config.min_score,
                        step.eliminated.len()
                    ),
                );
                context.active = step.survivors.clone();
                context.ranked = step.scored_data.clone().unwrap_or_default();
                outcome.step = Some(step);
            }
            Phase::Shortlist => {
                let (step, shortlisted) = self.pipeline.shortlist(&context.ranked);
                outcome.log(
                    Severity::Success,
                    format!("Final shortlist: {} candidates selected", shortlisted.len()),
                );

                let quotes: Vec<PricingQuote> = shortlisted
                    .iter()
                    .filter_map(|entry| self.pricing.quote(entry))
                    .collect();
                outcome.log(
                    Severity::Success,
                    format!("Pricing complete for {} candidates", quotes.len()),
                );

                context.active = step.survivors.clone();
                context.shortlist = shortlisted;
                outcome.step = Some(step);
                outcome.quotes = Some(quotes);
            }
            Phase::Completed => {
                outcome.log(Severity::Success, "Run completed successfully");
                let selection = self.assembler.assemble(&context.shortlist);
                if let Some(selection) = &selection {
                    outcome.log(
                        Severity::Success,
                        format!(
                            "Final selection: {} with {} (Score: {}%)",
                            selection.candidate.title,
                            selection.item.product_name,
                            selection.match_score
                        ),
                    );
                }
                outcome.final_selection = selection;
            }
        }

        Ok(outcome)
    }

    fn enter(&self, run_id: u64, phase: Phase, start_line: String) -> bool {
        let mut state = self.lock_state();
        if state.active_run != Some(run_id) {
            return false;
        }
        state.phase = phase;
        self.push_entry(&mut state, Severity::Info, start_line);
        true
    }

    /// Applies one phase's output under a single lock so observers never see
    /// a partially committed stage.
    fn commit(&self, run_id: u64, outcome: StageOutcome) -> bool {
        let mut state = self.lock_state();
        if state.active_run != Some(run_id) {
            return false;
        }

        if let Some(step) = outcome.step {
            state.step_history.push(step);
        }
        for (severity, message) in outcome.entries {
            self.push_entry(&mut state, severity, message);
        }
        if let Some(quotes) = outcome.quotes {
            state.quotes = quotes;
        }
        if outcome.final_selection.is_some() {
            state.final_selection = outcome.final_selection;
        }
        true
    }

    fn abort(&self, run_id: u64, message: &str) {
        let mut state = self.lock_state();
        if state.active_run != Some(run_id) {
            return;
        }
        self.push_entry(&mut state, Severity::Error, format!("Run error: {message}"));
        state.phase = Phase::NotStarted;
        state.active_run = None;
    }

    fn push_entry(&self, state: &mut EngineState, severity: Severity, message: String) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            message,
            severity,
        };
        // No subscribers is not an error.
        let _ = self.events.send(entry.clone());
        state.log.push(entry);
    }

    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
