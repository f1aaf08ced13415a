//! Quality Scorer (C8).
//!
//! Computes a 0-100 score across six weighted rubrics from an extracted
//! schedule, independent of the solver's internal numeric objective, so
//! runs from different solvers (or different random seeds) are comparable.
//! The compliance rubric calls `conflict::scan` directly so this score can
//! never drift from the conflict detector's notion of a legal schedule.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::conflict;
use crate::domain::{AvailabilityKind, QualificationLevel, ScheduleEntry};
use crate::snapshot::Snapshot;

const WEIGHT_AVAILABILITY: f64 = 25.0;
const WEIGHT_QUALIFICATION: f64 = 20.0;
const WEIGHT_TIMING: f64 = 20.0;
const WEIGHT_WORKLOAD: f64 = 15.0;
const WEIGHT_EFFICIENCY: f64 = 10.0;
const WEIGHT_COMPLIANCE: f64 = 10.0;

/// A per-rubric breakdown plus the final weighted score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub availability: f64,
    pub qualification: f64,
    pub timing: f64,
    pub workload: f64,
    pub efficiency: f64,
    pub compliance: f64,
    pub total: f64,
}

/// Scores an extracted schedule. Returns `total = 100.0` for an empty
/// schedule (every rubric is vacuously perfect).
pub fn score(snapshot: &Snapshot, schedule: &[ScheduleEntry]) -> QualityReport {
    if schedule.is_empty() {
        return QualityReport {
            availability: 100.0,
            qualification: 100.0,
            timing: 100.0,
            workload: 100.0,
            efficiency: 100.0,
            compliance: 100.0,
            total: 100.0,
        };
    }

    let availability = availability_score(snapshot, schedule);
    let qualification = qualification_score(snapshot, schedule);
    let timing = timing_score(snapshot, schedule);
    let workload = workload_score(schedule);
    let efficiency = efficiency_score(snapshot, schedule);
    let compliance = compliance_score(snapshot, schedule);

    let total = (availability * WEIGHT_AVAILABILITY
        + qualification * WEIGHT_QUALIFICATION
        + timing * WEIGHT_TIMING
        + workload * WEIGHT_WORKLOAD
        + efficiency * WEIGHT_EFFICIENCY
        + compliance * WEIGHT_COMPLIANCE)
        / (WEIGHT_AVAILABILITY
            + WEIGHT_QUALIFICATION
            + WEIGHT_TIMING
            + WEIGHT_WORKLOAD
            + WEIGHT_EFFICIENCY
            + WEIGHT_COMPLIANCE);

    QualityReport {
        availability,
        qualification,
        timing,
        workload,
        efficiency,
        compliance,
        total: total.clamp(0.0, 100.0),
    }
}

fn availability_score(snapshot: &Snapshot, schedule: &[ScheduleEntry]) -> f64 {
    let points: f64 = schedule
        .iter()
        .map(|entry| {
            let Some(slot) = snapshot.any_time_slot(entry.time_slot) else {
                return 50.0;
            };
            match snapshot.availability(entry.teacher, slot.weekday(), slot.period) {
                Some(AvailabilityKind::Preferred) => 100.0,
                Some(AvailabilityKind::Blocked) => 0.0,
                _ => 50.0,
            }
        })
        .sum();
    points / schedule.len() as f64
}

fn qualification_score(snapshot: &Snapshot, schedule: &[ScheduleEntry]) -> f64 {
    let points: f64 = schedule
        .iter()
        .map(|entry| {
            match snapshot.qualification(entry.teacher, entry.subject).map(|q| q.level) {
                Some(QualificationLevel::Primary) => 100.0,
                Some(QualificationLevel::Secondary) => 70.0,
                Some(QualificationLevel::Substitute) => 30.0,
                None => 0.0,
            }
        })
        .sum();
    points / schedule.len() as f64
}

fn timing_score(snapshot: &Snapshot, schedule: &[ScheduleEntry]) -> f64 {
    let points: f64 = schedule
        .iter()
        .map(|entry| {
            let Some(slot) = snapshot.any_time_slot(entry.time_slot) else {
                return 100.0;
            };
            let Some(subject) = snapshot.subject(entry.subject) else {
                return 100.0;
            };
            if subject.is_core() {
                if slot.period <= 3 {
                    100.0
                } else {
                    50.0
                }
            } else if subject.is_sport() {
                if slot.period >= 4 {
                    100.0
                } else {
                    30.0
                }
            } else {
                100.0
            }
        })
        .sum();
    points / schedule.len() as f64
}

fn workload_score(schedule: &[ScheduleEntry]) -> f64 {
    let mut counts: HashMap<_, u32> = HashMap::new();
    for entry in schedule {
        *counts.entry(entry.teacher).or_insert(0) += 1;
    }
    if counts.is_empty() {
        return 100.0;
    }
    let points: f64 = counts
        .values()
        .map(|&n| {
            if (8..=15).contains(&n) {
                100.0
            } else if (5..=20).contains(&n) {
                70.0
            } else if n > 0 {
                30.0
            } else {
                0.0
            }
        })
        .sum();
    points / counts.len() as f64
}

fn efficiency_score(snapshot: &Snapshot, schedule: &[ScheduleEntry]) -> f64 {
    let mut days_per_class: HashMap<_, std::collections::HashSet<u32>> = HashMap::new();
    for entry in schedule {
        if let Some(slot) = snapshot.any_time_slot(entry.time_slot) {
            days_per_class.entry(entry.class).or_default().insert(slot.day);
        }
    }
    if days_per_class.is_empty() {
        return 100.0;
    }
    let points: f64 = days_per_class
        .values()
        .map(|days| match days.len() {
            4..=5 => 100.0,
            3 => 70.0,
            2 => 40.0,
            1 => 10.0,
            _ => 0.0,
        })
        .sum();
    points / days_per_class.len() as f64
}

fn compliance_score(snapshot: &Snapshot, schedule: &[ScheduleEntry]) -> f64 {
    let violations: usize = conflict::scan(snapshot, schedule)
        .iter()
        .map(|entry_conflict| entry_conflict.conflicts.len())
        .sum();
    (100.0 - 10.0 * violations as f64).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo_data;

    #[test]
    fn empty_schedule_scores_100() {
        let (snapshot, _) = demo_data::tiny_instance();
        let report = score(&snapshot, &[]);
        assert_eq!(report.total, 100.0);
    }

    #[test]
    fn score_is_always_within_bounds() {
        let (snapshot, entities) = demo_data::tiny_instance();
        let report = score(&snapshot, &entities.schedule);
        assert!((0.0..=100.0).contains(&report.total));
    }
}
