//! Domain model for the Grundschule timetable generator.
//!
//! Mirrors the entities of a real timetabling store: teachers, classes,
//! subjects, time slots, availabilities, qualifications, and schedule
//! entries. Identifiers are opaque, stable, and typed so that a teacher id
//! can never be passed where a class id is expected.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            pub fn new(value: u32) -> Self {
                Self(value)
            }

            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

opaque_id!(TeacherId);
opaque_id!(ClassId);
opaque_id!(SubjectId);
opaque_id!(TimeSlotId);

/// Subject codes treated as "core" for the morning-placement soft constraint.
pub const CORE_SUBJECT_CODES: &[&str] = &["DE", "MA", "SU"];
/// Subject code treated as "sport" for the afternoon-placement soft constraint.
pub const SPORT_SUBJECT_CODE: &str = "SP";

/// A teacher who can be assigned to lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub display_name: String,
    /// 2-3 character unique short code, e.g. "MUE".
    pub short_code: String,
    /// Weekly teaching hour cap, in [1, 40].
    pub max_hours_per_week: u32,
    /// Part-time teachers are capped at 3 working days and a reduced daily bound.
    pub part_time: bool,
}

impl Teacher {
    /// Daily hour cap implied by the part-time flag (§4.4 rule 8).
    pub fn daily_hour_cap(&self) -> u32 {
        if self.part_time {
            3
        } else {
            6
        }
    }

    /// Maximum distinct working days implied by the part-time flag (§4.4 rule 9).
    pub fn max_working_days(&self) -> Option<u32> {
        if self.part_time {
            Some(3)
        } else {
            None
        }
    }
}

/// A group of students sharing a home room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    /// Unique label, e.g. "1a".
    pub label: String,
    /// Grade in [1, 4].
    pub grade: u32,
    /// Class size in [1, 35].
    pub size: u32,
    pub home_room: Option<String>,
}

/// A catalog subject, e.g. Mathematik.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    /// 2-5 character unique code, e.g. "MA".
    pub code: String,
    /// Display color as a hex string, e.g. "#3366ff".
    pub color: String,
}

impl Subject {
    pub fn is_core(&self) -> bool {
        CORE_SUBJECT_CODES.contains(&self.code.as_str())
    }

    pub fn is_sport(&self) -> bool {
        self.code == SPORT_SUBJECT_CODE
    }
}

/// A (day, period) slot with wall-clock bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: TimeSlotId,
    /// Weekday, 1-indexed Monday..Friday: 1..=5.
    pub day: u32,
    /// Period within the day, 1..=8.
    pub period: u32,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub is_break: bool,
}

impl TimeSlot {
    /// 0-indexed weekday, matching `TeacherAvailability::weekday`.
    pub fn weekday(&self) -> u32 {
        self.day - 1
    }
}

/// Kind of a teacher's availability at a given (weekday, period).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityKind {
    Available,
    Blocked,
    Preferred,
}

/// A teacher's availability at a (weekday, period), valid over a date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherAvailability {
    pub id: u32,
    pub teacher: TeacherId,
    /// 0-indexed Monday..Friday: 0..=4.
    pub weekday: u32,
    pub period: u32,
    pub kind: AvailabilityKind,
    pub effective_from: NaiveDate,
    pub effective_until: Option<NaiveDate>,
    pub reason: Option<String>,
}

impl TeacherAvailability {
    pub fn covers(&self, as_of: NaiveDate) -> bool {
        self.effective_from <= as_of
            && self.effective_until.map_or(true, |until| as_of <= until)
    }
}

/// Qualification level of a (teacher, subject) pair, best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualificationLevel {
    Primary,
    Secondary,
    Substitute,
}

/// A teacher's qualification to teach a subject at a set of grades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherSubject {
    pub teacher: TeacherId,
    pub subject: SubjectId,
    pub level: QualificationLevel,
    /// Subset of {1, 2, 3, 4}.
    pub allowed_grades: HashSet<u32>,
    pub max_hours_per_week: Option<u32>,
    pub certified_from: Option<NaiveDate>,
    pub certified_until: Option<NaiveDate>,
}

impl TeacherSubject {
    /// A certification expiring exactly on `as_of` is treated as expired
    /// (strict `<`, per the distilled spec's boundary behavior).
    pub fn valid_at(&self, grade: u32, as_of: NaiveDate) -> bool {
        if !self.allowed_grades.contains(&grade) {
            return false;
        }
        if let Some(from) = self.certified_from {
            if as_of < from {
                return false;
            }
        }
        if let Some(until) = self.certified_until {
            if as_of >= until {
                return false;
            }
        }
        true
    }
}

/// Bi-weekly alternation. `A` and `B` never collide; `All` collides with both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeekType {
    All,
    A,
    B,
}

impl WeekType {
    /// Whether two week types can coexist in the same (slot, class/teacher/room) bucket.
    pub fn collides_with(self, other: WeekType) -> bool {
        use WeekType::*;
        match (self, other) {
            (All, _) | (_, All) => true,
            (A, A) | (B, B) => true,
            (A, B) | (B, A) => false,
        }
    }
}

/// A single concrete lesson assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: u32,
    pub class: ClassId,
    pub teacher: TeacherId,
    pub subject: SubjectId,
    pub time_slot: TimeSlotId,
    pub room: Option<String>,
    pub week_type: WeekType,
}

/// The raw entity collections a caller hands in to build a `Snapshot`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainEntities {
    pub teachers: Vec<Teacher>,
    pub classes: Vec<Class>,
    pub subjects: Vec<Subject>,
    pub time_slots: Vec<TimeSlot>,
    pub availabilities: Vec<TeacherAvailability>,
    pub qualifications: Vec<TeacherSubject>,
    /// Pre-existing entries to preserve (pinned) or validate against.
    pub schedule: Vec<ScheduleEntry>,
}
