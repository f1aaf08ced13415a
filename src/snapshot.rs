//! Domain Snapshot (C1).
//!
//! An immutable, read-consistent view of one solve's domain entities, built
//! once and shared by reference with every downstream stage. Precomputes
//! the indices the constraint compiler and objective compiler need so they
//! never re-scan the raw entity lists.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{
    AvailabilityKind, Class, ClassId, DomainEntities, QualificationLevel, Subject, SubjectId,
    Teacher, TeacherAvailability, TeacherId, TeacherSubject, TimeSlot, TimeSlotId,
};
use crate::error::CoreError;

/// An immutable, frozen view of the domain for the duration of one solve.
#[derive(Debug, Clone)]
pub struct Snapshot {
    teachers: HashMap<TeacherId, Teacher>,
    classes: HashMap<ClassId, Class>,
    subjects: HashMap<SubjectId, Subject>,
    time_slots: HashMap<TimeSlotId, TimeSlot>,
    teaching_slots: Vec<TimeSlotId>,
    qualifications: HashMap<(TeacherId, SubjectId), TeacherSubject>,
    availability: HashMap<(TeacherId, u32, u32), Vec<TeacherAvailability>>,
    reference_date: NaiveDate,
}

impl Snapshot {
    /// Validates and freezes a set of domain entities as of `reference_date`.
    pub fn build(entities: &DomainEntities, reference_date: NaiveDate) -> Result<Self, CoreError> {
        let mut teachers = HashMap::new();
        for t in &entities.teachers {
            if teachers.insert(t.id, t.clone()).is_some() {
                return Err(CoreError::Validation(format!("duplicate teacher id {}", t.id)));
            }
        }

        let mut classes = HashMap::new();
        for c in &entities.classes {
            if !(1..=4).contains(&c.grade) {
                return Err(CoreError::Validation(format!("class {} has invalid grade {}", c.label, c.grade)));
            }
            if classes.insert(c.id, c.clone()).is_some() {
                return Err(CoreError::Validation(format!("duplicate class id {}", c.id)));
            }
        }

        let mut subjects = HashMap::new();
        for s in &entities.subjects {
            if subjects.insert(s.id, s.clone()).is_some() {
                return Err(CoreError::Validation(format!("duplicate subject id {}", s.id)));
            }
        }

        let mut time_slots = HashMap::new();
        let mut day_period_seen = std::collections::HashSet::new();
        for slot in &entities.time_slots {
            if slot.end <= slot.start {
                return Err(CoreError::Validation(format!(
                    "time slot {} has end <= start",
                    slot.id
                )));
            }
            if !day_period_seen.insert((slot.day, slot.period)) {
                return Err(CoreError::Validation(format!(
                    "duplicate (day, period) = ({}, {})",
                    slot.day, slot.period
                )));
            }
            if time_slots.insert(slot.id, *slot).is_some() {
                return Err(CoreError::Validation(format!("duplicate time slot id {}", slot.id)));
            }
        }

        let mut teaching_slots: Vec<TimeSlotId> = time_slots
            .values()
            .filter(|s| !s.is_break)
            .map(|s| s.id)
            .collect();
        teaching_slots.sort_by_key(|id| {
            let slot = &time_slots[id];
            (slot.day, slot.period)
        });

        let mut qualifications = HashMap::new();
        for q in &entities.qualifications {
            if let Some(until) = q.certified_until {
                if let Some(from) = q.certified_from {
                    if until < from {
                        return Err(CoreError::Validation(format!(
                            "qualification ({}, {}) has certification expiry before start",
                            q.teacher, q.subject
                        )));
                    }
                }
            }
            if qualifications
                .insert((q.teacher, q.subject), q.clone())
                .is_some()
            {
                return Err(CoreError::Validation(format!(
                    "duplicate qualification for ({}, {})",
                    q.teacher, q.subject
                )));
            }
        }

        let mut availability: HashMap<(TeacherId, u32, u32), Vec<TeacherAvailability>> = HashMap::new();
        let mut seen_rows = std::collections::HashSet::new();
        for a in &entities.availabilities {
            let row_key = (a.teacher, a.weekday, a.period, a.effective_from);
            if !seen_rows.insert(row_key) {
                return Err(CoreError::Validation(format!(
                    "duplicate availability row for teacher {} at ({}, {}) from {}",
                    a.teacher, a.weekday, a.period, a.effective_from
                )));
            }
            availability
                .entry((a.teacher, a.weekday, a.period))
                .or_default()
                .push(a.clone());
        }

        Ok(Self {
            teachers,
            classes,
            subjects,
            time_slots,
            teaching_slots,
            qualifications,
            availability,
            reference_date,
        })
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn teacher(&self, id: TeacherId) -> Option<&Teacher> {
        self.teachers.get(&id)
    }

    pub fn class(&self, id: ClassId) -> Option<&Class> {
        self.classes.get(&id)
    }

    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.get(&id)
    }

    pub fn time_slot(&self, id: TimeSlotId) -> Option<&TimeSlot> {
        self.time_slots.get(&id).filter(|s| !s.is_break)
    }

    /// All time slots, including breaks. Used by the conflict detector,
    /// which must be able to say "this slot is a break".
    pub fn any_time_slot(&self, id: TimeSlotId) -> Option<&TimeSlot> {
        self.time_slots.get(&id)
    }

    pub fn teachers(&self) -> impl Iterator<Item = &Teacher> {
        self.teachers.values()
    }

    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.values()
    }

    pub fn subjects(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.values()
    }

    pub fn time_slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.time_slots.values()
    }

    /// Non-break time slots ordered by `(day, period)`.
    pub fn teaching_slots(&self) -> impl Iterator<Item = TimeSlotId> + '_ {
        self.teaching_slots.iter().copied()
    }

    pub fn qualification(&self, teacher: TeacherId, subject: SubjectId) -> Option<&TeacherSubject> {
        self.qualifications.get(&(teacher, subject))
    }

    /// Teachers qualified for `subject` at `grade`, ordered PRIMARY -> SECONDARY -> SUBSTITUTE.
    pub fn qualified_teachers(&self, subject: SubjectId, grade: u32) -> Vec<(TeacherId, QualificationLevel)> {
        let mut result: Vec<(TeacherId, QualificationLevel)> = self
            .qualifications
            .values()
            .filter(|q| q.subject == subject && q.valid_at(grade, self.reference_date))
            .map(|q| (q.teacher, q.level))
            .collect();
        result.sort_by_key(|(teacher, level)| (*level, teacher.get()));
        result
    }

    /// Resolves a teacher's availability at (weekday, period) as of the reference date.
    /// Returns `None` if no row applies (treated as neutral/available by callers).
    pub fn availability(&self, teacher: TeacherId, weekday: u32, period: u32) -> Option<AvailabilityKind> {
        self.availability
            .get(&(teacher, weekday, period))?
            .iter()
            .find(|a| a.covers(self.reference_date))
            .map(|a| a.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo_data;

    #[test]
    fn rejects_duplicate_day_period() {
        let (_, mut entities) = demo_data::tiny_instance();
        let dup = entities.time_slots[0];
        entities.time_slots.push(dup);
        let err = Snapshot::build(&entities, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert!(matches!(err, Err(CoreError::Validation(_))));
    }

    #[test]
    fn expired_certification_is_not_qualified() {
        let (snapshot, _) = demo_data::tiny_instance();
        let teacher = snapshot.teachers().next().unwrap().id;
        let subject = snapshot.subjects().next().unwrap().id;
        // Certification windows in the tiny instance have no expiry, so this
        // exercises the `valid_at` boundary directly.
        let q = snapshot.qualification(teacher, subject).cloned();
        if let Some(q) = q {
            let mut expiring = q.clone();
            expiring.certified_until = Some(snapshot.reference_date());
            assert!(!expiring.valid_at(*q.allowed_grades.iter().next().unwrap(), snapshot.reference_date()));
        }
    }
}
