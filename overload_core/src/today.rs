//! "What should I do today?"
//!
//! Among the caller's active programs, pick the one day scheduled for the
//! given date. A test beats a workout, which beats a rest day; if that still
//! ties, the most recently created program wins.

use crate::store::ProgramRecord;
use crate::{Program, ProgramDay};
use chrono::NaiveDate;

/// The day picked for today and the program it belongs to
#[derive(Clone, Debug, PartialEq)]
pub struct TodayPick {
    pub program: Program,
    pub day: ProgramDay,
}

pub fn resolve_today(
    records: &[ProgramRecord],
    owner: &str,
    today: NaiveDate,
) -> Option<TodayPick> {
    records
        .iter()
        .filter(|r| r.program.active && r.program.owner == owner)
        .filter_map(|r| r.days.get(&today).map(|day| (&r.program, day)))
        .max_by(|(pa, da), (pb, db)| {
            da.day_type
                .priority()
                .cmp(&db.day_type.priority())
                .then(pa.created_at.cmp(&pb.created_at))
        })
        .map(|(program, day)| TodayPick {
            program: program.clone(),
            day: day.clone(),
        })
}
