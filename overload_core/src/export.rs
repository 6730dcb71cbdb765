//! CSV export of a program's calendar.

use crate::store::ProgramRecord;
use crate::{ProgramDay, Result};
use std::io::Write;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    day_id: String,
    date: String,
    day_type: String,
    status: String,
    plan: Option<String>,
    result: Option<String>,
    completed_at: Option<String>,
}

impl From<&ProgramDay> for CsvRow {
    fn from(day: &ProgramDay) -> Self {
        CsvRow {
            day_id: day.id.to_string(),
            date: day.date.to_string(),
            day_type: day.day_type.to_string(),
            status: day.status.to_string(),
            plan: day.plan.as_ref().map(|p| p.summary()),
            result: day.result.as_ref().map(|r| r.summary()),
            completed_at: day
                .result
                .as_ref()
                .and_then(|r| r.completed_at())
                .map(|t| t.to_rfc3339()),
        }
    }
}

/// Write every day of a program, in date order, as CSV with headers
///
/// Returns the number of rows written.
pub fn write_days<W: Write>(record: &ProgramRecord, writer: W) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for day in record.days.values() {
        writer.serialize(CsvRow::from(day))?;
    }
    writer.flush()?;

    tracing::info!(
        "Exported {} days of program {}",
        record.days.len(),
        record.program.id
    );
    Ok(record.days.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_window;
    use crate::store::tests::sample_program;
    use crate::{DayResult, DayStatus, DayType};
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_export_writes_header_and_rows() {
        let program = sample_program("ana", Utc::now());
        let state = program.state;
        let mut record = ProgramRecord::new(program);
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        generate_window(&mut record, &state, start);

        if let Some(day) = record.days.get_mut(&start) {
            day.status = DayStatus::Done;
            day.result = Some(DayResult::Submax {
                actual_reps: vec![8, 8, 8, 7, 7],
                completed_at: Some(Utc::now()),
            });
        }

        let mut out = Vec::new();
        let rows = write_days(&record, &mut out).unwrap();
        assert_eq!(rows, 28);

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("day_id,date,day_type,status,plan,result,completed_at")
        );
        let first = lines.next().unwrap();
        assert!(first.contains("2026-03-02,workout,done"));
        assert!(first.contains("reps [8,8,8,7,7]"));
        assert_eq!(text.lines().count(), 29);
        assert_eq!(
            record.days.values().filter(|d| d.day_type == DayType::Rest).count(),
            15
        );
    }
}
