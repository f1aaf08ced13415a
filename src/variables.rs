//! Variable Builder (C3).
//!
//! Translates a `Snapshot` into sparse Boolean decision variables
//! `x[t,c,s,tau]` meaning "teacher t teaches class c subject s at time slot
//! tau", pre-filtering impossible tuples before a single CP-SAT variable is
//! created. Dense encoding is deliberately avoided: a Grundschule instance
//! has far more (teacher, class, subject, slot) tuples than valid
//! assignments once qualification and availability are accounted for.

use std::collections::HashMap;

use crate::backend::{BoolVarHandle, CpBackend};
use crate::domain::{ClassId, ScheduleEntry, SubjectId, TeacherId, TimeSlotId};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarKey {
    pub teacher: TeacherId,
    pub class: ClassId,
    pub subject: SubjectId,
    pub time_slot: TimeSlotId,
}

/// The sparse map of decision variables for one solve.
pub struct VariableSet {
    pub vars: HashMap<VarKey, BoolVarHandle>,
    /// Variables seeded at 1 because they back a pinned (preserved) entry.
    pub pinned: Vec<VarKey>,
}

impl VariableSet {
    pub fn get(&self, key: &VarKey) -> Option<BoolVarHandle> {
        self.vars.get(key).copied()
    }
}

/// Builds the sparse variable set for one solve.
///
/// Skips breaks, `(teacher, subject)` pairs lacking a valid qualification at
/// the class's grade, and `(teacher, time slot)` pairs where availability is
/// BLOCKED. Every `preserve_existing` entry is seeded to 1.
pub fn build<B: CpBackend>(
    backend: &mut B,
    snapshot: &Snapshot,
    pinned_entries: &[ScheduleEntry],
) -> VariableSet {
    let mut vars = HashMap::new();
    let mut pinned = Vec::new();

    for class in snapshot.classes() {
        for subject in snapshot.subjects() {
            let qualified_teachers = snapshot.qualified_teachers(subject.id, class.grade);
            if qualified_teachers.is_empty() {
                continue;
            }
            for time_slot in snapshot.teaching_slots() {
                let slot = snapshot.time_slot(time_slot).expect("teaching slot exists");
                for (teacher, _level) in &qualified_teachers {
                    let blocked = matches!(
                        snapshot.availability(*teacher, slot.weekday(), slot.period),
                        Some(crate::domain::AvailabilityKind::Blocked)
                    );
                    if blocked {
                        continue;
                    }

                    let key = VarKey {
                        teacher: *teacher,
                        class: class.id,
                        subject: subject.id,
                        time_slot,
                    };
                    let label = format!(
                        "x_t{}_c{}_s{}_ts{}",
                        teacher.get(),
                        class.id.get(),
                        subject.id.get(),
                        time_slot.get()
                    );
                    let handle = backend.new_bool_var(&label);
                    vars.insert(key, handle);
                }
            }
        }
    }

    for entry in pinned_entries {
        let key = VarKey {
            teacher: entry.teacher,
            class: entry.class,
            subject: entry.subject,
            time_slot: entry.time_slot,
        };
        if let Some(handle) = vars.get(&key) {
            backend.fix_bool(*handle, true);
            pinned.push(key);
        }
    }

    VariableSet { vars, pinned }
}
