//! Conflict Detector (C2).
//!
//! Pure predicates over a candidate assignment or a full schedule. Never
//! raises: every operation returns a typed list of violations, empty iff
//! the input is admissible. Used both by manual edits (validate a single
//! candidate) and by the solver driver (post-hoc `scan` of an extracted
//! schedule), so the two paths can never disagree (tested in
//! `tests::determinism`).

use serde::{Deserialize, Serialize};

use crate::domain::{ScheduleEntry, WeekType};
use crate::snapshot::Snapshot;

/// A single typed violation, optionally naming the colliding existing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conflict {
    BreakConflict,
    QualificationConflict,
    AvailabilityConflict,
    TeacherConflict { existing_entry: u32 },
    ClassConflict { existing_entry: u32 },
    RoomConflict { existing_entry: u32 },
}

impl Conflict {
    pub fn message(&self) -> String {
        match self {
            Conflict::BreakConflict => "the time slot is a break".to_string(),
            Conflict::QualificationConflict => {
                "the teacher is not qualified for this subject at this class's grade, or the certification has expired".to_string()
            }
            Conflict::AvailabilityConflict => {
                "the teacher's availability is blocked at this time slot".to_string()
            }
            Conflict::TeacherConflict { existing_entry } => {
                format!("the teacher is already scheduled in entry {existing_entry} at an overlapping time slot")
            }
            Conflict::ClassConflict { existing_entry } => {
                format!("the class is already scheduled in entry {existing_entry} at an overlapping time slot")
            }
            Conflict::RoomConflict { existing_entry } => {
                format!("the room is already booked in entry {existing_entry} at an overlapping time slot")
            }
        }
    }
}

/// All conflicts a single persisted entry participates in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryConflict {
    pub entry_id: u32,
    pub conflicts: Vec<Conflict>,
}

fn overlaps(a_slot: crate::domain::TimeSlotId, a_week: WeekType, b_slot: crate::domain::TimeSlotId, b_week: WeekType) -> bool {
    a_slot == b_slot && a_week.collides_with(b_week)
}

/// Checks a single candidate entry against an existing schedule set.
///
/// Check order is fixed and deterministic: break, qualification,
/// availability, teacher, class, room. The returned list is empty iff the
/// candidate is admissible.
pub fn validate_candidate(
    snapshot: &Snapshot,
    existing: &[ScheduleEntry],
    candidate: &ScheduleEntry,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    let Some(slot) = snapshot.time_slot(candidate.time_slot) else {
        conflicts.push(Conflict::BreakConflict);
        return conflicts;
    };
    if slot.is_break {
        conflicts.push(Conflict::BreakConflict);
    }

    let Some(class) = snapshot.class(candidate.class) else {
        conflicts.push(Conflict::QualificationConflict);
        return conflicts;
    };

    let qualified = snapshot
        .qualification(candidate.teacher, candidate.subject)
        .map(|q| q.valid_at(class.grade, snapshot.reference_date()))
        .unwrap_or(false);
    if !qualified {
        conflicts.push(Conflict::QualificationConflict);
    }

    let blocked = matches!(
        snapshot.availability(candidate.teacher, slot.weekday(), slot.period),
        Some(crate::domain::AvailabilityKind::Blocked)
    );
    if blocked {
        conflicts.push(Conflict::AvailabilityConflict);
    }

    let colliding = |other: &&ScheduleEntry| {
        other.id != candidate.id
            && overlaps(other.time_slot, other.week_type, candidate.time_slot, candidate.week_type)
    };

    for other in existing.iter().filter(colliding) {
        if other.teacher == candidate.teacher {
            conflicts.push(Conflict::TeacherConflict { existing_entry: other.id });
        }
    }
    for other in existing.iter().filter(colliding) {
        if other.class == candidate.class {
            conflicts.push(Conflict::ClassConflict { existing_entry: other.id });
        }
    }
    for other in existing.iter().filter(colliding) {
        if let (Some(a), Some(b)) = (&other.room, &candidate.room) {
            if a == b {
                conflicts.push(Conflict::RoomConflict { existing_entry: other.id });
            }
        }
    }

    conflicts
}

/// For each persisted entry, the list of conflicts it participates in.
pub fn scan(snapshot: &Snapshot, schedule: &[ScheduleEntry]) -> Vec<EntryConflict> {
    schedule
        .iter()
        .filter_map(|entry| {
            let others: Vec<ScheduleEntry> = schedule
                .iter()
                .filter(|e| e.id != entry.id)
                .cloned()
                .collect();
            let conflicts = validate_candidate(snapshot, &others, entry);
            if conflicts.is_empty() {
                None
            } else {
                Some(EntryConflict { entry_id: entry.id, conflicts })
            }
        })
        .collect()
}

/// Validates a batch of candidates atomically: either every candidate is
/// admissible against the existing schedule and each other, or nothing is
/// reported as committable. Callers decide whether to actually persist.
pub fn validate_batch(
    snapshot: &Snapshot,
    existing: &[ScheduleEntry],
    candidates: &[ScheduleEntry],
) -> Result<(), Vec<(usize, Conflict)>> {
    let mut pool = existing.to_vec();
    let mut failures = Vec::new();

    for (idx, candidate) in candidates.iter().enumerate() {
        let conflicts = validate_candidate(snapshot, &pool, candidate);
        if conflicts.is_empty() {
            pool.push(candidate.clone());
        } else {
            for conflict in conflicts {
                failures.push((idx, conflict));
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo_data;

    #[test]
    fn break_slot_is_rejected() {
        let (snapshot, _) = demo_data::tiny_instance();
        let break_slot = snapshot
            .time_slots()
            .find(|s| s.is_break)
            .expect("tiny instance has a break slot");
        let teacher = snapshot.teachers().next().unwrap();
        let class = snapshot.classes().next().unwrap();
        let subject = snapshot.subjects().next().unwrap();

        let candidate = ScheduleEntry {
            id: 9001,
            class: class.id,
            teacher: teacher.id,
            subject: subject.id,
            time_slot: break_slot.id,
            room: None,
            week_type: WeekType::All,
        };

        let conflicts = validate_candidate(&snapshot, &[], &candidate);
        assert_eq!(conflicts, vec![Conflict::BreakConflict]);
    }

    #[test]
    fn a_and_b_week_types_do_not_collide() {
        let (snapshot, _) = demo_data::tiny_instance();
        let slot = snapshot.teaching_slots().next().unwrap();
        let class = snapshot.classes().next().unwrap().id;
        let teachers: Vec<_> = snapshot.teachers().map(|t| t.id).collect();
        let subjects: Vec<_> = snapshot.subjects().map(|s| s.id).collect();

        let e1 = ScheduleEntry {
            id: 1,
            class,
            teacher: teachers[0],
            subject: subjects[0],
            time_slot: slot,
            room: None,
            week_type: WeekType::A,
        };
        let e2 = ScheduleEntry {
            id: 2,
            class,
            teacher: teachers[0],
            subject: subjects[0],
            time_slot: slot,
            room: None,
            week_type: WeekType::B,
        };

        let conflicts = validate_candidate(&snapshot, &[e1], &e2);
        assert!(
            conflicts.iter().all(|c| !matches!(c, Conflict::TeacherConflict { .. } | Conflict::ClassConflict { .. })),
            "A and B week types must not collide: {conflicts:?}"
        );
    }

    /// The fixed check order (teacher, then class, then room) must hold
    /// across *different* colliding entries, not just within one entry's own
    /// checks: an entry that only collides on class, listed before an entry
    /// that only collides on teacher, must still surface as
    /// `[TeacherConflict, ClassConflict]`, never the reverse.
    #[test]
    fn conflict_order_holds_across_distinct_colliding_entries() {
        use crate::domain::{
            Class, ClassId, DomainEntities, QualificationLevel, Subject, SubjectId, Teacher,
            TeacherId, TeacherSubject, TimeSlot, TimeSlotId,
        };

        let class_a = Class { id: ClassId::new(0), label: "1a".into(), grade: 1, size: 20, home_room: None };
        let class_b = Class { id: ClassId::new(1), label: "1b".into(), grade: 1, size: 20, home_room: None };
        let teacher = Teacher { id: TeacherId::new(0), display_name: "A".into(), short_code: "AAA".into(), max_hours_per_week: 28, part_time: false };
        let other_teacher = Teacher { id: TeacherId::new(1), display_name: "B".into(), short_code: "BBB".into(), max_hours_per_week: 28, part_time: false };
        let subject = Subject { id: SubjectId::new(0), name: "Mathematik".into(), code: "MA".into(), color: "#000".into() };
        let slot = TimeSlot {
            id: TimeSlotId::new(0),
            day: 1,
            period: 1,
            start: chrono::NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end: chrono::NaiveTime::from_hms_opt(8, 45, 0).unwrap(),
            is_break: false,
        };

        let entities = DomainEntities {
            teachers: vec![teacher.clone(), other_teacher.clone()],
            classes: vec![class_a.clone(), class_b.clone()],
            subjects: vec![subject.clone()],
            time_slots: vec![slot],
            availabilities: Vec::new(),
            qualifications: vec![
                TeacherSubject {
                    teacher: teacher.id,
                    subject: subject.id,
                    level: QualificationLevel::Primary,
                    allowed_grades: [1].into_iter().collect(),
                    max_hours_per_week: None,
                    certified_from: None,
                    certified_until: None,
                },
                TeacherSubject {
                    teacher: other_teacher.id,
                    subject: subject.id,
                    level: QualificationLevel::Primary,
                    allowed_grades: [1].into_iter().collect(),
                    max_hours_per_week: None,
                    certified_from: None,
                    certified_until: None,
                },
            ],
            schedule: Vec::new(),
        };
        let reference_date = chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let snapshot = Snapshot::build(&entities, reference_date).unwrap();

        // Collides on class only (same class as candidate, different teacher).
        let class_collider = ScheduleEntry {
            id: 10,
            class: class_a.id,
            teacher: other_teacher.id,
            subject: subject.id,
            time_slot: slot.id,
            room: None,
            week_type: WeekType::All,
        };
        // Collides on teacher only (same teacher as candidate, different class).
        let teacher_collider = ScheduleEntry {
            id: 11,
            class: class_b.id,
            teacher: teacher.id,
            subject: subject.id,
            time_slot: slot.id,
            room: None,
            week_type: WeekType::All,
        };

        let candidate = ScheduleEntry {
            id: 12,
            class: class_a.id,
            teacher: teacher.id,
            subject: subject.id,
            time_slot: slot.id,
            room: None,
            week_type: WeekType::All,
        };

        // Listed in class-collider-first order so the old per-entry loop
        // would have emitted ClassConflict before TeacherConflict.
        let existing = [class_collider, teacher_collider];
        let conflicts = validate_candidate(&snapshot, &existing, &candidate);

        let teacher_pos = conflicts.iter().position(|c| matches!(c, Conflict::TeacherConflict { .. }));
        let class_pos = conflicts.iter().position(|c| matches!(c, Conflict::ClassConflict { .. }));
        assert!(teacher_pos.is_some() && class_pos.is_some(), "{conflicts:?}");
        assert!(
            teacher_pos < class_pos,
            "teacher conflicts must precede class conflicts regardless of entry order: {conflicts:?}"
        );
    }
}
