//! Program persistence.
//!
//! A program and all of its calendar days are stored together as one
//! [`ProgramRecord`]. Every mutation goes through [`ProgramStore::update`],
//! which runs a closure against a working copy of the record while holding
//! that program's write lock, and commits only if the closure succeeds.
//! Writers on different programs never contend, and readers only ever
//! observe committed records.

use crate::{DayStatus, DayType, Error, Program, ProgramDay, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

/// A program together with its calendar, keyed by date
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgramRecord {
    pub program: Program,
    pub days: BTreeMap<NaiveDate, ProgramDay>,
}

impl ProgramRecord {
    pub fn new(program: Program) -> Self {
        Self {
            program,
            days: BTreeMap::new(),
        }
    }

    /// Insert a day unless one already exists for its date
    ///
    /// Returns `true` if the day was inserted.
    pub fn insert_day_if_absent(&mut self, day: ProgramDay) -> bool {
        if self.days.contains_key(&day.date) {
            return false;
        }
        self.days.insert(day.date, day);
        true
    }

    pub fn day(&self, day_id: Uuid) -> Option<&ProgramDay> {
        self.days.values().find(|d| d.id == day_id)
    }

    pub fn day_mut(&mut self, day_id: Uuid) -> Option<&mut ProgramDay> {
        self.days.values_mut().find(|d| d.id == day_id)
    }

    /// Days on or after `date`, in date order
    pub fn days_from(&self, date: NaiveDate) -> impl Iterator<Item = &ProgramDay> {
        self.days.range(date..).map(|(_, day)| day)
    }

    /// The earliest planned workout strictly after `date`
    pub fn next_planned_workout_after(&mut self, date: NaiveDate) -> Option<&mut ProgramDay> {
        let start = date.succ_opt()?;
        self.days
            .range_mut(start..)
            .map(|(_, day)| day)
            .find(|d| d.day_type == DayType::Workout && d.status == DayStatus::Planned)
    }
}

/// Storage backend for programs and their days
pub trait ProgramStore {
    /// Persist a brand new program record in one step
    fn insert(&self, record: ProgramRecord) -> Result<()>;

    /// Latest committed version of a program
    fn load(&self, program_id: Uuid) -> Result<Option<ProgramRecord>>;

    /// Latest committed version of every program
    fn load_all(&self) -> Result<Vec<ProgramRecord>>;

    /// Find the program that owns a day
    fn locate_day(&self, day_id: Uuid) -> Result<Option<Uuid>>;

    /// Run `f` as a transaction on one program
    ///
    /// The closure sees a working copy; changes are committed only when it
    /// returns `Ok`. Concurrent updates to the same program are serialized.
    fn update<T, F>(&self, program_id: Uuid, f: F) -> Result<T>
    where
        F: FnOnce(&mut ProgramRecord) -> Result<T>;

    fn load_owned(&self, owner: &str) -> Result<Vec<ProgramRecord>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|r| r.program.owner == owner)
            .collect())
    }
}

impl<S: ProgramStore + ?Sized> ProgramStore for &S {
    fn insert(&self, record: ProgramRecord) -> Result<()> {
        (**self).insert(record)
    }

    fn load(&self, program_id: Uuid) -> Result<Option<ProgramRecord>> {
        (**self).load(program_id)
    }

    fn load_all(&self) -> Result<Vec<ProgramRecord>> {
        (**self).load_all()
    }

    fn locate_day(&self, day_id: Uuid) -> Result<Option<Uuid>> {
        (**self).locate_day(day_id)
    }

    fn update<T, F>(&self, program_id: Uuid, f: F) -> Result<T>
    where
        F: FnOnce(&mut ProgramRecord) -> Result<T>,
    {
        (**self).update(program_id, f)
    }
}

fn poisoned<E>(_: E) -> Error {
    Error::Store("lock poisoned".into())
}

struct Slot {
    write: Mutex<()>,
    committed: RwLock<ProgramRecord>,
}

/// In-process store, used by tests and embedders that bring their own persistence
#[derive(Default)]
pub struct MemoryStore {
    programs: RwLock<HashMap<Uuid, Arc<Slot>>>,
    day_index: RwLock<HashMap<Uuid, Uuid>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, program_id: Uuid) -> Result<Option<Arc<Slot>>> {
        let programs = self.programs.read().map_err(poisoned)?;
        Ok(programs.get(&program_id).cloned())
    }

    fn index_days(&self, record: &ProgramRecord) -> Result<()> {
        let mut index = self.day_index.write().map_err(poisoned)?;
        for day in record.days.values() {
            index.insert(day.id, record.program.id);
        }
        Ok(())
    }
}

impl ProgramStore for MemoryStore {
    fn insert(&self, record: ProgramRecord) -> Result<()> {
        let program_id = record.program.id;
        let mut programs = self.programs.write().map_err(poisoned)?;
        if programs.contains_key(&program_id) {
            return Err(Error::Store(format!("program {} already exists", program_id)));
        }
        self.index_days(&record)?;
        programs.insert(
            program_id,
            Arc::new(Slot {
                write: Mutex::new(()),
                committed: RwLock::new(record),
            }),
        );
        tracing::debug!("Inserted program {} into memory store", program_id);
        Ok(())
    }

    fn load(&self, program_id: Uuid) -> Result<Option<ProgramRecord>> {
        match self.slot(program_id)? {
            Some(slot) => Ok(Some(slot.committed.read().map_err(poisoned)?.clone())),
            None => Ok(None),
        }
    }

    fn load_all(&self) -> Result<Vec<ProgramRecord>> {
        let slots: Vec<Arc<Slot>> = {
            let programs = self.programs.read().map_err(poisoned)?;
            programs.values().cloned().collect()
        };

        slots
            .iter()
            .map(|slot| -> Result<ProgramRecord> {
                Ok(slot.committed.read().map_err(poisoned)?.clone())
            })
            .collect()
    }

    fn locate_day(&self, day_id: Uuid) -> Result<Option<Uuid>> {
        let index = self.day_index.read().map_err(poisoned)?;
        Ok(index.get(&day_id).copied())
    }

    fn update<T, F>(&self, program_id: Uuid, f: F) -> Result<T>
    where
        F: FnOnce(&mut ProgramRecord) -> Result<T>,
    {
        let slot = self
            .slot(program_id)?
            .ok_or(Error::ProgramNotFound(program_id))?;

        let _guard = slot.write.lock().map_err(poisoned)?;
        let mut working = slot.committed.read().map_err(poisoned)?.clone();

        let value = f(&mut working)?;

        if working.program.id != program_id {
            return Err(Error::Store(format!(
                "transaction on {} changed the program id",
                program_id
            )));
        }

        self.index_days(&working)?;
        *slot.committed.write().map_err(poisoned)? = working;
        Ok(value)
    }
}
