use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::Phase;

/// Cosmetic pacing applied between phases. Never affects results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedProfile {
    #[default]
    Realistic,
    Fast,
}

impl SpeedProfile {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "realistic" => Some(Self::Realistic),
            "fast" => Some(Self::Fast),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Realistic => "realistic",
            Self::Fast => "fast",
        }
    }

    pub const fn delay(self, phase: Phase) -> Duration {
        let millis = match (self, phase) {
            (_, Phase::NotStarted) => 0,
            (Self::Realistic, Phase::Loading) => 2000,
            (Self::Realistic, Phase::DeadlineFilter) => 2500,
            (Self::Realistic, Phase::SpecFilter) => 1500,
            (Self::Realistic, Phase::Scoring) => 2000,
            (Self::Realistic, Phase::Shortlist) => 2500,
            (Self::Realistic, Phase::Completed) => 2000,
            (Self::Fast, Phase::Loading) => 500,
            (Self::Fast, Phase::DeadlineFilter) => 800,
            (Self::Fast, Phase::SpecFilter) => 600,
            (Self::Fast, Phase::Scoring) => 900,
            (Self::Fast, Phase::Shortlist) => 700,
            (Self::Fast, Phase::Completed) => 500,
        };
        Duration::from_millis(millis)
    }
}

/// Decides how long the engine idles before executing a phase.
pub trait Pacer: Send + Sync {
    fn delay_for(&self, phase: Phase, speed: SpeedProfile) -> Duration;
}

/// Sleeps according to the selected speed profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfilePacer;

impl Pacer for ProfilePacer {
    fn delay_for(&self, phase: Phase, speed: SpeedProfile) -> Duration {
        speed.delay(phase)
    }
}

/// Zero delay, for tests and batch use.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantPacer;

impl Pacer for InstantPacer {
    fn delay_for(&self, _phase: Phase, _speed: SpeedProfile) -> Duration {
        Duration::ZERO
    }
}

/// Source of "now" for the deadline stage.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
