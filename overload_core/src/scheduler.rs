//! Program operations.
//!
//! [`Scheduler`] is the entry point a transport talks to. Each mutating
//! operation runs as one store transaction on one program, so a completion,
//! its state change, the plan refresh and any regenerated days commit
//! together or not at all.

use crate::store::{ProgramRecord, ProgramStore};
use crate::today::{self, TodayPick};
use crate::{
    adaptation, generator, plan, AdaptationState, DayResult, DayStatus, DayType, Error,
    NewProgram, Program, ProgramDay, Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::io::Write;
use uuid::Uuid;

/// A freshly created program and the size of its first window
#[derive(Clone, Debug)]
pub struct CreatedProgram {
    pub program: Program,
    pub days_generated: usize,
}

/// A program with its upcoming days
#[derive(Clone, Debug)]
pub struct ProgramView {
    pub program: Program,
    pub days: Vec<ProgramDay>,
}

/// What a completed workout did to its program
#[derive(Clone, Debug, PartialEq)]
pub struct WorkoutOutcome {
    pub previous_state: AdaptationState,
    pub state: AdaptationState,
    /// The planned workout whose prescription was rewritten, if any
    pub refreshed_day: Option<Uuid>,
}

/// What a completed test did to its program
#[derive(Clone, Debug, PartialEq)]
pub struct TestOutcome {
    pub test_max: u32,
    pub state: AdaptationState,
    pub days_generated: usize,
    pub refreshed_day: Option<Uuid>,
}

pub struct Scheduler<S> {
    store: S,
}

impl<S: ProgramStore> Scheduler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate a request, derive the initial state and generate the first window
    pub fn create_program(
        &self,
        owner: &str,
        request: NewProgram,
        now: DateTime<Utc>,
    ) -> Result<CreatedProgram> {
        request.validate()?;

        let state = plan::initial_state(request.method, request.test_max);
        let program = Program {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            exercise: request.exercise,
            method: request.method,
            test_max: request.test_max,
            schedule: request.schedule(),
            state,
            active: true,
            created_at: now,
        };

        let mut record = ProgramRecord::new(program);
        let days_generated = generator::generate_window(&mut record, &state, now.date_naive());
        let program = record.program.clone();

        self.store.insert(record)?;

        tracing::info!(
            "Created {} {} program {} for {} ({}, {} days)",
            program.method,
            program.exercise,
            program.id,
            owner,
            state,
            days_generated
        );

        Ok(CreatedProgram {
            program,
            days_generated,
        })
    }

    /// A program and all of its days from today onwards
    pub fn get_program(
        &self,
        owner: &str,
        program_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<ProgramView> {
        let record = self.owned_record(owner, program_id)?;
        let days = record.days_from(now.date_naive()).cloned().collect();

        Ok(ProgramView {
            program: record.program,
            days,
        })
    }

    /// All of the owner's programs, active ones first, newest first within each group
    pub fn list_programs(&self, owner: &str) -> Result<Vec<Program>> {
        let mut programs: Vec<Program> = self
            .store
            .load_owned(owner)?
            .into_iter()
            .map(|r| r.program)
            .collect();

        programs.sort_by(|a, b| {
            b.active
                .cmp(&a.active)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(programs)
    }

    /// Finished (done or skipped) days of a program, oldest first
    pub fn program_history(&self, owner: &str, program_id: Uuid) -> Result<Vec<ProgramDay>> {
        let record = self.owned_record(owner, program_id)?;
        Ok(record
            .days
            .into_values()
            .filter(|d| !d.is_planned())
            .collect())
    }

    /// Soft-deactivate a program; its schedule and state are untouched
    pub fn deactivate_program(&self, owner: &str, program_id: Uuid) -> Result<Program> {
        let program = self.store.update(program_id, |record| {
            check_owner(record, owner)?;
            record.program.active = false;
            Ok(record.program.clone())
        })?;

        tracing::info!("Deactivated program {}", program_id);
        Ok(program)
    }

    /// The caller's most relevant day for today, if any program has one
    pub fn resolve_today(&self, owner: &str, now: DateTime<Utc>) -> Result<Option<TodayPick>> {
        let records = self.store.load_owned(owner)?;
        let pick = today::resolve_today(&records, owner, now.date_naive());

        match &pick {
            Some(p) => tracing::debug!(
                "Today for {}: {} day {} of program {}",
                owner,
                p.day.day_type,
                p.day.id,
                p.program.id
            ),
            None => tracing::debug!("Nothing scheduled today for {}", owner),
        }
        Ok(pick)
    }

    /// Log a planned workout, adapt the program state and refresh the next workout
    pub fn complete_workout_day(
        &self,
        owner: &str,
        day_id: Uuid,
        result: DayResult,
        now: DateTime<Utc>,
    ) -> Result<WorkoutOutcome> {
        let program_id = self.locate(day_id)?;

        let outcome = self.store.update(program_id, |record| {
            check_owner(record, owner)?;
            let method = record.program.method;
            let test_max = record.program.test_max;
            let previous_state = record.program.state;

            let day = planned_day(record, day_id, DayType::Workout)?;
            adaptation::validate_workout_result(method, &result)?;

            let state = adaptation::adapt(&previous_state, test_max, day.plan.as_ref(), &result)?;
            day.status = DayStatus::Done;
            day.result = Some(result.stamp(now));
            let anchor = day.date.max(now.date_naive());

            record.program.state = state;
            let refreshed_day = refresh_next_workout(record, anchor);

            Ok(WorkoutOutcome {
                previous_state,
                state,
                refreshed_day,
            })
        })?;

        tracing::info!(
            "Completed workout day {} of program {}: {} -> {}",
            day_id,
            program_id,
            outcome.previous_state,
            outcome.state
        );
        Ok(outcome)
    }

    /// Log a max test and re-base the program from it
    pub fn complete_test_day(
        &self,
        owner: &str,
        day_id: Uuid,
        test_max: u32,
        now: DateTime<Utc>,
    ) -> Result<TestOutcome> {
        if test_max < 1 {
            return Err(Error::Validation("test_max must be at least 1".into()));
        }

        let program_id = self.locate(day_id)?;

        let outcome = self.store.update(program_id, |record| {
            check_owner(record, owner)?;

            let day = planned_day(record, day_id, DayType::Test)?;
            day.status = DayStatus::Done;
            day.result = Some(DayResult::Test {
                test_max,
                completed_at: Some(now),
            });
            let test_date = day.date;

            // Full re-base: prior state is discarded, not blended
            let state = plan::initial_state(record.program.method, test_max);
            record.program.test_max = test_max;
            record.program.state = state;

            let start = test_date
                .succ_opt()
                .ok_or_else(|| Error::Validation(format!("no day follows {}", test_date)))?;
            let days_generated = generator::generate_window(record, &state, start);
            let refreshed_day = refresh_next_workout(record, test_date.max(now.date_naive()));

            Ok(TestOutcome {
                test_max,
                state,
                days_generated,
                refreshed_day,
            })
        })?;

        tracing::info!(
            "Completed test day {} of program {}: max {}, re-based to {} ({} new days)",
            day_id,
            program_id,
            outcome.test_max,
            outcome.state,
            outcome.days_generated
        );
        Ok(outcome)
    }

    /// Mark a planned workout or test day as skipped
    pub fn skip_day(&self, owner: &str, day_id: Uuid) -> Result<()> {
        let program_id = self.locate(day_id)?;

        self.store.update(program_id, |record| {
            check_owner(record, owner)?;
            let day = record.day_mut(day_id).ok_or(Error::DayNotFound(day_id))?;

            if !day.is_planned() {
                return Err(Error::DayNotPlanned {
                    day_id,
                    status: day.status,
                });
            }
            if day.day_type == DayType::Rest {
                return Err(Error::DayTypeMismatch {
                    day_id,
                    expected: DayType::Workout,
                    actual: DayType::Rest,
                });
            }

            day.status = DayStatus::Skipped;
            Ok(())
        })?;

        tracing::info!("Skipped day {} of program {}", day_id, program_id);
        Ok(())
    }

    /// Write every day of a program as CSV; returns the number of rows
    pub fn export_program<W: Write>(
        &self,
        owner: &str,
        program_id: Uuid,
        writer: W,
    ) -> Result<usize> {
        let record = self.owned_record(owner, program_id)?;
        crate::export::write_days(&record, writer)
    }

    fn locate(&self, day_id: Uuid) -> Result<Uuid> {
        self.store
            .locate_day(day_id)?
            .ok_or(Error::DayNotFound(day_id))
    }

    fn owned_record(&self, owner: &str, program_id: Uuid) -> Result<ProgramRecord> {
        let record = self
            .store
            .load(program_id)?
            .ok_or(Error::ProgramNotFound(program_id))?;
        check_owner(&record, owner)?;
        Ok(record)
    }
}

fn check_owner(record: &ProgramRecord, owner: &str) -> Result<()> {
    if record.program.owner != owner {
        return Err(Error::NotOwner {
            program_id: record.program.id,
            owner: owner.to_string(),
        });
    }
    Ok(())
}

/// Look up a day that must still be planned and of the expected type
fn planned_day(
    record: &mut ProgramRecord,
    day_id: Uuid,
    expected: DayType,
) -> Result<&mut ProgramDay> {
    let day = record.day_mut(day_id).ok_or(Error::DayNotFound(day_id))?;

    if !day.is_planned() {
        return Err(Error::DayNotPlanned {
            day_id,
            status: day.status,
        });
    }
    if day.day_type != expected {
        return Err(Error::DayTypeMismatch {
            day_id,
            expected,
            actual: day.day_type,
        });
    }
    Ok(day)
}

/// Rewrite the plan of the nearest planned workout after `anchor` from the current state
///
/// Only that one day is touched; later workouts keep their plans.
fn refresh_next_workout(record: &mut ProgramRecord, anchor: NaiveDate) -> Option<Uuid> {
    let exercise = record.program.exercise;
    let state = record.program.state;

    let day = record.next_planned_workout_after(anchor)?;
    day.plan = Some(plan::synthesize(exercise, &state));
    tracing::debug!("Refreshed plan of day {} ({}) to {}", day.id, day.date, state);
    Some(day.id)
}
