//! Solution Extractor (C7).
//!
//! Maps a solved CP-SAT model back to concrete `ScheduleEntry` values.
//! Every variable with value 1 becomes an entry; pinned entries keep their
//! original week type and room, new entries get `WeekType::All` and no
//! room. Output is sorted deterministically by `(day, period, class,
//! teacher)`, matching the distilled spec exactly.

use std::collections::HashMap;

use crate::backend::CpBackend;
use crate::domain::{ScheduleEntry, WeekType};
use crate::error::CoreError;
use crate::snapshot::Snapshot;
use crate::variables::{VarKey, VariableSet};

/// Extracts the final schedule from a solved backend.
///
/// `pinned_entries` supplies the original week type and room for any
/// variable that backs a preserved/pinned entry; all other positive
/// variables become fresh `WeekType::All` entries with no room.
///
/// Returns `CoreError::Internal` if the backend reports a positive variable
/// for a break slot — `variables::build` never creates such a variable, so
/// this can only mean the backend or the model fed to it is broken.
pub fn extract<B: CpBackend>(
    backend: &B,
    snapshot: &Snapshot,
    variables: &VariableSet,
    pinned_entries: &[ScheduleEntry],
) -> Result<Vec<ScheduleEntry>, CoreError> {
    let pinned_by_key: HashMap<VarKey, &ScheduleEntry> = pinned_entries
        .iter()
        .map(|entry| {
            (
                VarKey {
                    teacher: entry.teacher,
                    class: entry.class,
                    subject: entry.subject,
                    time_slot: entry.time_slot,
                },
                entry,
            )
        })
        .collect();

    let mut next_id = pinned_entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
    let mut entries = Vec::new();

    for (key, &handle) in &variables.vars {
        if !backend.value(handle) {
            continue;
        }

        if snapshot.time_slot(key.time_slot).is_none() {
            return Err(CoreError::Internal(format!(
                "solver returned a positive variable for break slot {:?}",
                key.time_slot
            )));
        }

        let entry = if let Some(&pinned) = pinned_by_key.get(key) {
            pinned.clone()
        } else {
            let entry = ScheduleEntry {
                id: next_id,
                class: key.class,
                teacher: key.teacher,
                subject: key.subject,
                time_slot: key.time_slot,
                room: None,
                week_type: WeekType::All,
            };
            next_id += 1;
            entry
        };
        entries.push(entry);
    }

    entries.sort_by_key(|entry| {
        let slot = snapshot.any_time_slot(entry.time_slot);
        (
            slot.map(|s| s.day).unwrap_or(u32::MAX),
            slot.map(|s| s.period).unwrap_or(u32::MAX),
            entry.class.get(),
            entry.teacher.get(),
        )
    });

    Ok(entries)
}
