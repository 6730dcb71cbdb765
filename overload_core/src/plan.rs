//! Plan synthesis: adaptation state in, concrete prescription out.
//!
//! Everything here is a pure function of its arguments so that regenerating a
//! plan from the same state always yields the same prescription.

use crate::{AdaptationState, ExerciseKey, Method, Plan, PlannedSet};

/// Rest after each of the five submax sets
pub const SUBMAX_REST_SECONDS: [u32; 5] = [90, 90, 90, 90, 120];

pub const LADDER_REST_BETWEEN_STEPS: u32 = 60;
pub const LADDER_REST_BETWEEN_LADDERS: u32 = 120;

/// Bounds for a ladder top, both at (re-)base time and during adaptation
pub const LADDER_MIN_TOP: u32 = 3;
pub const LADDER_INITIAL_MAX_TOP: u32 = 12;
pub const LADDER_MAX_TOP: u32 = 20;

/// `round(value * tenths / 10)` with halves rounded up, in integer arithmetic
fn round_fraction(value: u32, tenths: u32) -> u32 {
    ((u64::from(value) * u64::from(tenths) + 5) / 10) as u32
}

/// Derive a fresh adaptation state from a max-rep test
///
/// - submax: `work_reps = round(0.7 * test_max)`, clamped to `[1, test_max]`
/// - ladder: `top = round(0.6 * test_max)`, clamped to `[3, 12]`
pub fn initial_state(method: Method, test_max: u32) -> AdaptationState {
    match method {
        Method::Submax => {
            let ceiling = test_max.max(1);
            AdaptationState::Submax {
                work_reps: round_fraction(test_max, 7).clamp(1, ceiling),
            }
        }
        Method::Ladder => AdaptationState::Ladder {
            top: round_fraction(test_max, 6).clamp(LADDER_MIN_TOP, LADDER_INITIAL_MAX_TOP),
        },
    }
}

/// Build the workout prescription for the given state
pub fn synthesize(exercise: ExerciseKey, state: &AdaptationState) -> Plan {
    match *state {
        AdaptationState::Submax { work_reps } => Plan::Submax {
            exercise,
            sets: SUBMAX_REST_SECONDS
                .iter()
                .map(|&rest_seconds| PlannedSet {
                    target_reps: work_reps,
                    rest_seconds,
                })
                .collect(),
        },
        AdaptationState::Ladder { top } => Plan::Ladder {
            exercise,
            steps: (1..=top).collect(),
            rest_between_steps_seconds: LADDER_REST_BETWEEN_STEPS,
            rest_between_ladders_seconds: LADDER_REST_BETWEEN_LADDERS,
        },
    }
}

/// The fixed prescription used on test days
pub fn test_plan(exercise: ExerciseKey) -> Plan {
    Plan::Test {
        exercise,
        instructions: format!(
            "Warm up, then perform as many strict {} as possible in one set.",
            exercise
        ),
    }
}
