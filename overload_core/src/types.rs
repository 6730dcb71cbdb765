//! Core domain types for the progressive overload scheduler.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises, methods and schedules
//! - Adaptation state and workout prescriptions (plans)
//! - Programs and their calendar days
//! - Logged results

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of a generated rolling window, in calendar days.
pub const WINDOW_DAYS: u32 = 28;

/// Weeks between capability tests when a request does not say otherwise.
pub const DEFAULT_TEST_EVERY_WEEKS: u32 = 4;

// ============================================================================
// Exercise and Method
// ============================================================================

/// Exercise a program trains
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKey {
    Burpees,
    Pushups,
    Pullups,
}

impl ExerciseKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKey::Burpees => "burpees",
            ExerciseKey::Pushups => "pushups",
            ExerciseKey::Pullups => "pullups",
        }
    }
}

impl fmt::Display for ExerciseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "burpees" => Ok(ExerciseKey::Burpees),
            "pushups" => Ok(ExerciseKey::Pushups),
            "pullups" => Ok(ExerciseKey::Pullups),
            other => Err(Error::Validation(format!(
                "unknown exercise '{}' (expected burpees, pushups or pullups)",
                other
            ))),
        }
    }
}

/// Progression method
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Fixed-rep sets below failure, adjusted by performance ratio
    Submax,
    /// Ascending step ladders (1, 2, ..., top)
    Ladder,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Submax => "submax",
            Method::Ladder => "ladder",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "submax" => Ok(Method::Submax),
            "ladder" => Ok(Method::Ladder),
            other => Err(Error::Validation(format!(
                "unknown method '{}' (expected submax or ladder)",
                other
            ))),
        }
    }
}

/// Parse a weekday name ("mon", "Monday", ...)
pub fn parse_weekday(s: &str) -> Result<Weekday> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| Error::Validation(format!("unknown weekday '{}'", s.trim())))
}

// ============================================================================
// Schedule and Adaptation State
// ============================================================================

/// Weekly layout of a program
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schedule {
    pub days_per_week: u32,
    pub preferred_days: Vec<Weekday>,
    #[serde(default = "default_test_every_weeks")]
    pub test_every_weeks: u32,
}

fn default_test_every_weeks() -> u32 {
    DEFAULT_TEST_EVERY_WEEKS
}

impl Schedule {
    pub fn is_training_day(&self, weekday: Weekday) -> bool {
        self.preferred_days.contains(&weekday)
    }

    /// Offset from the window start at which the test day falls
    pub fn test_offset(&self) -> u32 {
        (self.test_every_weeks * 7).saturating_sub(1)
    }
}

/// Per-program numeric parameters driving plan synthesis
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AdaptationState {
    Submax { work_reps: u32 },
    Ladder { top: u32 },
}

impl AdaptationState {
    pub fn method(&self) -> Method {
        match self {
            AdaptationState::Submax { .. } => Method::Submax,
            AdaptationState::Ladder { .. } => Method::Ladder,
        }
    }
}

impl fmt::Display for AdaptationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdaptationState::Submax { work_reps } => write!(f, "work_reps={}", work_reps),
            AdaptationState::Ladder { top } => write!(f, "top={}", top),
        }
    }
}

// ============================================================================
// Plans and Results
// ============================================================================

/// One prescribed set of a submax workout
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannedSet {
    pub target_reps: u32,
    pub rest_seconds: u32,
}

/// Concrete prescription stored on a day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Plan {
    Submax {
        exercise: ExerciseKey,
        sets: Vec<PlannedSet>,
    },
    Ladder {
        exercise: ExerciseKey,
        steps: Vec<u32>,
        rest_between_steps_seconds: u32,
        rest_between_ladders_seconds: u32,
    },
    /// Max-rep test; no numeric target
    Test {
        exercise: ExerciseKey,
        instructions: String,
    },
}

impl Plan {
    /// Total reps prescribed across all submax sets (None for other plans)
    pub fn target_total(&self) -> Option<u64> {
        match self {
            Plan::Submax { sets, .. } => Some(sets.iter().map(|s| u64::from(s.target_reps)).sum()),
            _ => None,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Plan::Submax { exercise, sets } => {
                let reps: Vec<String> = sets.iter().map(|s| s.target_reps.to_string()).collect();
                format!("{} sets of {} [{}]", sets.len(), exercise, reps.join(","))
            }
            Plan::Ladder { exercise, steps, .. } => {
                let steps: Vec<String> = steps.iter().map(|s| s.to_string()).collect();
                format!("{} ladder [{}]", exercise, steps.join(","))
            }
            Plan::Test { exercise, .. } => format!("{} max test", exercise),
        }
    }
}

/// Outcome reported for a completed day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayResult {
    Submax {
        actual_reps: Vec<u32>,
        #[serde(default)]
        completed_at: Option<DateTime<Utc>>,
    },
    Ladder {
        steps: Vec<u32>,
        #[serde(default)]
        completed_at: Option<DateTime<Utc>>,
    },
    Test {
        test_max: u32,
        #[serde(default)]
        completed_at: Option<DateTime<Utc>>,
    },
}

impl DayResult {
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            DayResult::Submax { completed_at, .. }
            | DayResult::Ladder { completed_at, .. }
            | DayResult::Test { completed_at, .. } => *completed_at,
        }
    }

    /// Fill in the completion time if the caller left it out
    pub fn stamp(mut self, now: DateTime<Utc>) -> Self {
        match &mut self {
            DayResult::Submax { completed_at, .. }
            | DayResult::Ladder { completed_at, .. }
            | DayResult::Test { completed_at, .. } => {
                completed_at.get_or_insert(now);
            }
        }
        self
    }

    pub fn summary(&self) -> String {
        fn join(values: &[u32]) -> String {
            values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(",")
        }

        match self {
            DayResult::Submax { actual_reps, .. } => format!("reps [{}]", join(actual_reps)),
            DayResult::Ladder { steps, .. } => format!("steps [{}]", join(steps)),
            DayResult::Test { test_max, .. } => format!("max {}", test_max),
        }
    }
}

// ============================================================================
// Program and ProgramDay
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    Rest,
    Workout,
    Test,
}

impl DayType {
    /// Ranking used when several days compete for "today"
    pub fn priority(&self) -> u8 {
        match self {
            DayType::Test => 2,
            DayType::Workout => 1,
            DayType::Rest => 0,
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DayType::Rest => "rest",
            DayType::Workout => "workout",
            DayType::Test => "test",
        })
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Planned,
    Done,
    Skipped,
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DayStatus::Planned => "planned",
            DayStatus::Done => "done",
            DayStatus::Skipped => "skipped",
        })
    }
}

/// A user's progressive-overload plan for one exercise and one method
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Program {
    pub id: Uuid,
    pub owner: String,
    pub exercise: ExerciseKey,
    pub method: Method,
    pub test_max: u32,
    pub schedule: Schedule,
    pub state: AdaptationState,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// One calendar day of a program
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgramDay {
    pub id: Uuid,
    pub program_id: Uuid,
    pub date: NaiveDate,
    pub day_type: DayType,
    pub plan: Option<Plan>,
    pub status: DayStatus,
    pub result: Option<DayResult>,
}

impl ProgramDay {
    pub fn is_planned(&self) -> bool {
        self.status == DayStatus::Planned
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Program creation request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewProgram {
    pub exercise: ExerciseKey,
    pub method: Method,
    pub test_max: u32,
    pub days_per_week: u32,
    pub preferred_days: Vec<Weekday>,
    #[serde(default = "default_test_every_weeks")]
    pub test_every_weeks: u32,
}

impl NewProgram {
    /// Check every creation constraint; nothing is persisted on failure
    pub fn validate(&self) -> Result<()> {
        if self.test_max < 1 {
            return Err(Error::Validation("test_max must be at least 1".into()));
        }

        if !matches!(self.days_per_week, 3 | 4) {
            return Err(Error::Validation(format!(
                "days_per_week must be 3 or 4, got {}",
                self.days_per_week
            )));
        }

        if self.preferred_days.len() != self.days_per_week as usize {
            return Err(Error::Validation(format!(
                "expected {} preferred days, got {}",
                self.days_per_week,
                self.preferred_days.len()
            )));
        }

        let mut seen = HashSet::new();
        for day in &self.preferred_days {
            if !seen.insert(day) {
                return Err(Error::Validation(format!(
                    "preferred day {} listed more than once",
                    day
                )));
            }
        }

        if self.test_every_weeks < 1 {
            return Err(Error::Validation(
                "test_every_weeks must be at least 1".into(),
            ));
        }

        Ok(())
    }

    pub fn schedule(&self) -> Schedule {
        Schedule {
            days_per_week: self.days_per_week,
            preferred_days: self.preferred_days.clone(),
            test_every_weeks: self.test_every_weeks,
        }
    }
}
