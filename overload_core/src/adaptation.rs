//! Adaptation rules: how a logged workout moves the program state.
//!
//! - Submax: compare the reps performed against the reps prescribed.
//!   At least 90% of target bumps `work_reps` by one, under 70% drops it by
//!   one, anything between keeps it. Always clamped to `[1, test_max]`.
//! - Ladder: completing the exact prescribed step sequence bumps `top` by one,
//!   anything else keeps it. Always clamped to `[3, 20]`.

use crate::plan::{LADDER_MAX_TOP, LADDER_MIN_TOP};
use crate::{AdaptationState, DayResult, Error, Method, Plan, Result};

/// Check that a workout result has the shape the program's method expects
pub fn validate_workout_result(method: Method, result: &DayResult) -> Result<()> {
    match (method, result) {
        (Method::Submax, DayResult::Submax { actual_reps, .. }) => {
            if actual_reps.is_empty() {
                return Err(Error::Validation(
                    "submax result must report at least one set".into(),
                ));
            }
            Ok(())
        }
        (Method::Ladder, DayResult::Ladder { .. }) => Ok(()),
        (_, DayResult::Test { .. }) => Err(Error::Validation(
            "test results are submitted through the test-day operation".into(),
        )),
        (method, _) => Err(Error::Validation(format!(
            "result does not match the program's {} method",
            method
        ))),
    }
}

/// Next submax `work_reps` given what was prescribed and what was done
pub fn adapt_submax(work_reps: u32, test_max: u32, target_total: u64, actual_total: u64) -> u32 {
    let ceiling = test_max.max(1);

    if target_total == 0 {
        return work_reps.clamp(1, ceiling);
    }

    // ratio >= 0.9 and ratio < 0.7, without floating point
    let actual = u128::from(actual_total) * 10;
    let target = u128::from(target_total);

    let next = if actual >= target * 9 {
        work_reps.saturating_add(1)
    } else if actual < target * 7 {
        work_reps.saturating_sub(1)
    } else {
        work_reps
    };

    next.clamp(1, ceiling)
}

/// Next ladder `top`: only an exact, complete ladder earns a step
pub fn adapt_ladder(top: u32, prescribed: &[u32], completed: &[u32]) -> u32 {
    let next = if !prescribed.is_empty() && prescribed == completed {
        top.saturating_add(1)
    } else {
        top
    };

    next.clamp(LADDER_MIN_TOP, LADDER_MAX_TOP)
}

/// Apply the method's update rule for one completed workout day
///
/// `plan` is the prescription that was stored on the day being completed.
pub fn adapt(
    state: &AdaptationState,
    test_max: u32,
    plan: Option<&Plan>,
    result: &DayResult,
) -> Result<AdaptationState> {
    match (*state, result) {
        (AdaptationState::Submax { work_reps }, DayResult::Submax { actual_reps, .. }) => {
            let target_total = plan.and_then(Plan::target_total).unwrap_or(0);
            let actual_total: u64 = actual_reps.iter().map(|&r| u64::from(r)).sum();
            let next = adapt_submax(work_reps, test_max, target_total, actual_total);

            tracing::debug!(
                "Submax adaptation: {}/{} reps, work_reps {} -> {}",
                actual_total,
                target_total,
                work_reps,
                next
            );
            Ok(AdaptationState::Submax { work_reps: next })
        }

        (AdaptationState::Ladder { top }, DayResult::Ladder { steps, .. }) => {
            let prescribed: &[u32] = match plan {
                Some(Plan::Ladder { steps, .. }) => steps,
                _ => {
                    tracing::warn!("Ladder day has no ladder prescription; keeping top {}", top);
                    &[]
                }
            };
            let next = adapt_ladder(top, prescribed, steps);

            tracing::debug!("Ladder adaptation: top {} -> {}", top, next);
            Ok(AdaptationState::Ladder { top: next })
        }

        (state, _) => Err(Error::Validation(format!(
            "result does not match the program's {} method",
            state.method()
        ))),
    }
}
