//! Rolling window generation.
//!
//! A window is [`WINDOW_DAYS`] consecutive calendar days starting at a given
//! date. Each day is a test day (at offset `test_every_weeks * 7 - 1`, if that
//! falls inside the window), a workout day (its UTC weekday is a preferred
//! day), or a rest day. Workout plans are synthesized from the state passed
//! in, never from whatever the program holds at the time, so the window is a
//! pure function of its inputs.

use crate::store::ProgramRecord;
use crate::{
    plan, AdaptationState, DayStatus, DayType, ExerciseKey, Plan, ProgramDay, Schedule,
    WINDOW_DAYS,
};
use chrono::{Datelike, Days, NaiveDate};
use uuid::Uuid;

/// A day of a window before it is given an identity and persisted
#[derive(Clone, Debug, PartialEq)]
pub struct DaySpec {
    pub date: NaiveDate,
    pub day_type: DayType,
    pub plan: Option<Plan>,
}

/// Lay out the window starting at `start`
pub fn build_window(
    schedule: &Schedule,
    exercise: ExerciseKey,
    state: &AdaptationState,
    start: NaiveDate,
) -> Vec<DaySpec> {
    let test_offset = schedule.test_offset();

    (0..WINDOW_DAYS)
        .filter_map(|offset| {
            let date = start.checked_add_days(Days::new(u64::from(offset)))?;

            let day_type = if offset == test_offset {
                DayType::Test
            } else if schedule.is_training_day(date.weekday()) {
                DayType::Workout
            } else {
                DayType::Rest
            };

            let plan = match day_type {
                DayType::Workout => Some(plan::synthesize(exercise, state)),
                DayType::Test => Some(plan::test_plan(exercise)),
                DayType::Rest => None,
            };

            Some(DaySpec {
                date,
                day_type,
                plan,
            })
        })
        .collect()
}

/// Generate the window into a program record, skipping dates that already exist
///
/// Returns the number of days inserted. Calling this again with the same
/// start and state inserts nothing.
pub fn generate_window(
    record: &mut ProgramRecord,
    state: &AdaptationState,
    start: NaiveDate,
) -> usize {
    let program_id = record.program.id;
    let specs = build_window(&record.program.schedule, record.program.exercise, state, start);

    let mut inserted = 0;
    for spec in specs {
        let day = ProgramDay {
            id: Uuid::new_v4(),
            program_id,
            date: spec.date,
            day_type: spec.day_type,
            plan: spec.plan,
            status: DayStatus::Planned,
            result: None,
        };
        if record.insert_day_if_absent(day) {
            inserted += 1;
        }
    }

    tracing::debug!(
        "Generated window for program {} from {}: {} new days ({})",
        program_id,
        start,
        inserted,
        state
    );
    inserted
}
