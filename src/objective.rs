//! Objective Compiler (C5).
//!
//! Emits the four weighted soft-constraint terms of §4.5 into a single
//! maximized objective on the CP-SAT backend. Weights are fixed constants
//! for this version, matching the distilled spec exactly; a future version
//! adding heavier terms (gap minimization, workload balance) would extend
//! `compile`, not change these.

use crate::backend::CpBackend;
use crate::domain::{AvailabilityKind, QualificationLevel};
use crate::snapshot::Snapshot;
use crate::variables::VariableSet;

pub const WEIGHT_PREFERRED: i64 = 10;
pub const WEIGHT_PRIMARY: i64 = 5;
pub const WEIGHT_SUBSTITUTE: i64 = -3;
pub const WEIGHT_CORE_MORNING: i64 = 8;
pub const WEIGHT_SPORT_AFTERNOON: i64 = 3;

const CORE_MORNING_PERIOD_CEILING: u32 = 3;
const SPORT_AFTERNOON_PERIOD_FLOOR: u32 = 4;

/// Compiles all soft terms into the backend's objective.
pub fn compile<B: CpBackend>(backend: &mut B, snapshot: &Snapshot, variables: &VariableSet) {
    for (key, &var) in &variables.vars {
        let Some(slot) = snapshot.time_slot(key.time_slot) else {
            continue;
        };

        if snapshot.availability(key.teacher, slot.weekday(), slot.period)
            == Some(AvailabilityKind::Preferred)
        {
            backend.add_objective_term(WEIGHT_PREFERRED, var);
        }

        match snapshot.qualification(key.teacher, key.subject).map(|q| q.level) {
            Some(QualificationLevel::Primary) => backend.add_objective_term(WEIGHT_PRIMARY, var),
            Some(QualificationLevel::Secondary) => {}
            Some(QualificationLevel::Substitute) => {
                backend.add_objective_term(WEIGHT_SUBSTITUTE, var)
            }
            None => {}
        }

        if let Some(subject) = snapshot.subject(key.subject) {
            if subject.is_core() && slot.period <= CORE_MORNING_PERIOD_CEILING {
                backend.add_objective_term(WEIGHT_CORE_MORNING, var);
            }
            if subject.is_sport() && slot.period >= SPORT_AFTERNOON_PERIOD_FLOOR {
                backend.add_objective_term(WEIGHT_SPORT_AFTERNOON, var);
            }
        }
    }
}
