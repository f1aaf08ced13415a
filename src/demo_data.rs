//! Demo data generators for the Grundschule timetable generator.
//!
//! Grounded on the teacher's own `demo_data.rs`: a seeded `StdRng`, a small
//! enum selecting instance size, and weighted distributions driving how much
//! of each entity gets generated. Adapted here to a German primary school's
//! domain: short teacher codes, DE/MA/SU/SP/RE/EN subjects, grade-1..4
//! classes labelled "1a".."4b", and a Monday-Friday, 6-period day with a
//! single mid-morning break.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::domain::{
    AvailabilityKind, Class, ClassId, DomainEntities, QualificationLevel, Subject, SubjectId,
    Teacher, TeacherAvailability, TeacherId, TeacherSubject, TimeSlot, TimeSlotId,
};
use crate::snapshot::Snapshot;

/// Selects which pre-tuned instance size `generate` builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoData {
    Small,
    Large,
}

impl std::str::FromStr for DemoData {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SMALL" => Ok(DemoData::Small),
            "LARGE" => Ok(DemoData::Large),
            _ => Err(()),
        }
    }
}

impl DemoData {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoData::Small => "SMALL",
            DemoData::Large => "LARGE",
        }
    }

    fn parameters(&self) -> DemoDataParameters {
        match self {
            DemoData::Small => DemoDataParameters {
                class_labels: vec!["1a", "1b", "2a", "2b"],
                teacher_count: 8,
                part_time_fraction: 0.25,
                preferred_slot_fraction: 0.1,
                blocked_slot_fraction: 0.05,
            },
            DemoData::Large => DemoDataParameters {
                class_labels: vec![
                    "1a", "1b", "1c", "2a", "2b", "2c", "3a", "3b", "3c", "4a", "4b", "4c",
                ],
                teacher_count: 24,
                part_time_fraction: 0.35,
                preferred_slot_fraction: 0.1,
                blocked_slot_fraction: 0.05,
            },
        }
    }
}

struct DemoDataParameters {
    class_labels: Vec<&'static str>,
    teacher_count: usize,
    part_time_fraction: f64,
    preferred_slot_fraction: f64,
    blocked_slot_fraction: f64,
}

/// A subject code, display name, and color, matching the Grundschule catalog.
const SUBJECT_CATALOG: &[(&str, &str, &str)] = &[
    ("DE", "Deutsch", "#3366ff"),
    ("MA", "Mathematik", "#ff6633"),
    ("SU", "Sachunterricht", "#33cc66"),
    ("SP", "Sport", "#ffcc00"),
    ("RE", "Religion", "#9966ff"),
    ("EN", "Englisch", "#33cccc"),
];

const FIRST_NAMES: &[&str] = &[
    "Anna", "Ben", "Clara", "David", "Emma", "Felix", "Greta", "Hannes", "Ina", "Jonas", "Klara",
    "Lukas", "Mira", "Noah", "Olga", "Paul", "Rosa", "Stefan", "Tina", "Uwe", "Vera", "Wolf",
    "Yara", "Zoe",
];
const LAST_NAMES: &[&str] = &[
    "Becker", "Fischer", "Hoffmann", "Koch", "Lang", "Meyer", "Neumann", "Richter", "Schmidt",
    "Schneider", "Vogel", "Wagner",
];

/// A small, fully deterministic instance, stable across runs: exactly what
/// the unit tests across this crate build their fixtures from. Not randomized
/// (no `rand` call) so test expectations never drift with the RNG.
pub fn tiny_instance() -> (Snapshot, DomainEntities) {
    let reference_date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

    let subjects: Vec<Subject> = SUBJECT_CATALOG
        .iter()
        .enumerate()
        .map(|(i, &(code, name, color))| Subject {
            id: SubjectId::new(i as u32),
            name: name.to_string(),
            code: code.to_string(),
            color: color.to_string(),
        })
        .collect();
    let de = subjects[0].id;
    let ma = subjects[1].id;
    let su = subjects[2].id;
    let sp = subjects[3].id;

    let classes = vec![
        Class { id: ClassId::new(0), label: "1a".to_string(), grade: 1, size: 22, home_room: Some("R101".to_string()) },
        Class { id: ClassId::new(1), label: "2a".to_string(), grade: 2, size: 24, home_room: Some("R102".to_string()) },
    ];

    let teachers = vec![
        Teacher { id: TeacherId::new(0), display_name: "Anna Becker".to_string(), short_code: "ABE".to_string(), max_hours_per_week: 28, part_time: false },
        Teacher { id: TeacherId::new(1), display_name: "Ben Fischer".to_string(), short_code: "BFI".to_string(), max_hours_per_week: 15, part_time: true },
        Teacher { id: TeacherId::new(2), display_name: "Clara Hoffmann".to_string(), short_code: "CHO".to_string(), max_hours_per_week: 28, part_time: false },
    ];

    // Monday-Friday, periods 1-5, with period 3 flagged as the mid-morning
    // break so every day keeps the same period count while the break sits
    // outside the teaching-slot index.
    let mut time_slots = Vec::new();
    let mut slot_id = 0u32;
    for day in 1..=5u32 {
        for period in 1..=5u32 {
            let is_break = period == 3;
            time_slots.push(TimeSlot {
                id: TimeSlotId::new(slot_id),
                day,
                period,
                start: NaiveTimeHelper::start_of(period),
                end: NaiveTimeHelper::end_of(period),
                is_break,
            });
            slot_id += 1;
        }
    }

    let qualifications = vec![
        TeacherSubject {
            teacher: teachers[0].id,
            subject: de,
            level: QualificationLevel::Primary,
            allowed_grades: [1, 2, 3, 4].into_iter().collect(),
            max_hours_per_week: None,
            certified_from: None,
            certified_until: None,
        },
        TeacherSubject {
            teacher: teachers[0].id,
            subject: ma,
            level: QualificationLevel::Secondary,
            allowed_grades: [1, 2].into_iter().collect(),
            max_hours_per_week: Some(10),
            certified_from: None,
            certified_until: None,
        },
        TeacherSubject {
            teacher: teachers[1].id,
            subject: su,
            level: QualificationLevel::Primary,
            allowed_grades: [1, 2, 3, 4].into_iter().collect(),
            max_hours_per_week: None,
            certified_from: Some(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
            certified_until: None,
        },
        TeacherSubject {
            teacher: teachers[2].id,
            subject: sp,
            level: QualificationLevel::Primary,
            allowed_grades: [1, 2, 3, 4].into_iter().collect(),
            max_hours_per_week: None,
            certified_from: None,
            certified_until: None,
        },
        TeacherSubject {
            teacher: teachers[2].id,
            subject: de,
            level: QualificationLevel::Substitute,
            allowed_grades: [1, 2].into_iter().collect(),
            max_hours_per_week: Some(4),
            certified_from: None,
            certified_until: None,
        },
    ];

    let availabilities = vec![
        TeacherAvailability {
            id: 0,
            teacher: teachers[0].id,
            weekday: 0,
            period: 1,
            kind: AvailabilityKind::Preferred,
            effective_from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            effective_until: None,
            reason: None,
        },
        TeacherAvailability {
            id: 1,
            teacher: teachers[1].id,
            weekday: 4,
            period: 4,
            kind: AvailabilityKind::Blocked,
            effective_from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            effective_until: None,
            reason: Some("external training".to_string()),
        },
    ];

    let entities = DomainEntities {
        teachers,
        classes,
        subjects,
        time_slots,
        availabilities,
        qualifications,
        schedule: Vec::new(),
    };

    let snapshot = Snapshot::build(&entities, reference_date).expect("tiny instance is internally consistent");
    (snapshot, entities)
}

/// Generates a randomized demo instance of the requested size, seeded so
/// repeated calls produce byte-identical output.
pub fn generate(demo: DemoData) -> (Snapshot, DomainEntities) {
    let params = demo.parameters();
    let mut rng = StdRng::seed_from_u64(42);
    let reference_date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

    let subjects: Vec<Subject> = SUBJECT_CATALOG
        .iter()
        .enumerate()
        .map(|(i, &(code, name, color))| Subject {
            id: SubjectId::new(i as u32),
            name: name.to_string(),
            code: code.to_string(),
            color: color.to_string(),
        })
        .collect();

    let classes: Vec<Class> = params
        .class_labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let grade = label.chars().next().and_then(|c| c.to_digit(10)).unwrap_or(1);
            Class {
                id: ClassId::new(i as u32),
                label: label.to_string(),
                grade,
                size: rng.gen_range(18..=28),
                home_room: Some(format!("R{}", 100 + i)),
            }
        })
        .collect();

    let mut teachers = Vec::new();
    for i in 0..params.teacher_count {
        let first = FIRST_NAMES.choose(&mut rng).unwrap();
        let last = LAST_NAMES.choose(&mut rng).unwrap();
        let part_time = rng.gen_bool(params.part_time_fraction);
        teachers.push(Teacher {
            id: TeacherId::new(i as u32),
            display_name: format!("{first} {last}"),
            short_code: format!("{}{}", &first[..1], &last[..2]).to_uppercase(),
            max_hours_per_week: if part_time { rng.gen_range(10..=18) } else { rng.gen_range(22..=28) },
            part_time,
        });
    }

    let mut time_slots = Vec::new();
    let mut slot_id = 0u32;
    for day in 1..=5u32 {
        for period in 1..=7u32 {
            let is_break = period == 4;
            time_slots.push(TimeSlot {
                id: TimeSlotId::new(slot_id),
                day,
                period,
                start: NaiveTimeHelper::start_of(period),
                end: NaiveTimeHelper::end_of(period),
                is_break,
            });
            slot_id += 1;
        }
    }

    // Every teacher is qualified, at PRIMARY or SECONDARY, for 1-3 subjects
    // drawn at random, covering all grades. This guarantees at least one
    // qualified teacher exists per (subject, grade) pair with overwhelming
    // probability at these instance sizes; demo data is illustrative, not a
    // hard feasibility guarantee.
    let mut qualifications = Vec::new();
    for teacher in &teachers {
        let subject_count = rng.gen_range(1..=3usize.min(subjects.len()));
        let picked: Vec<_> = subjects.choose_multiple(&mut rng, subject_count).collect();
        for (j, subject) in picked.into_iter().enumerate() {
            let level = if j == 0 { QualificationLevel::Primary } else { QualificationLevel::Secondary };
            qualifications.push(TeacherSubject {
                teacher: teacher.id,
                subject: subject.id,
                level,
                allowed_grades: [1, 2, 3, 4].into_iter().collect(),
                max_hours_per_week: None,
                certified_from: None,
                certified_until: None,
            });
        }
    }
    // Ensure Sport always has at least one PRIMARY-qualified teacher, since
    // the soft objective's afternoon-Sport term is otherwise vacuous.
    let sport = subjects.iter().find(|s| s.is_sport()).unwrap().id;
    if !qualifications.iter().any(|q| q.subject == sport && q.level == QualificationLevel::Primary) {
        if let Some(teacher) = teachers.first() {
            qualifications.push(TeacherSubject {
                teacher: teacher.id,
                subject: sport,
                level: QualificationLevel::Primary,
                allowed_grades: [1, 2, 3, 4].into_iter().collect(),
                max_hours_per_week: None,
                certified_from: None,
                certified_until: None,
            });
        }
    }

    let mut availabilities = Vec::new();
    let mut availability_id = 0u32;
    for teacher in &teachers {
        for day in 0..5u32 {
            for period in [1u32, 2, 3, 5, 6, 7] {
                let roll: f64 = rng.gen();
                let kind = if roll < params.blocked_slot_fraction {
                    Some(AvailabilityKind::Blocked)
                } else if roll < params.blocked_slot_fraction + params.preferred_slot_fraction {
                    Some(AvailabilityKind::Preferred)
                } else {
                    None
                };
                if let Some(kind) = kind {
                    availabilities.push(TeacherAvailability {
                        id: availability_id,
                        teacher: teacher.id,
                        weekday: day,
                        period,
                        kind,
                        effective_from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                        effective_until: None,
                        reason: None,
                    });
                    availability_id += 1;
                }
            }
        }
    }

    let entities = DomainEntities {
        teachers,
        classes,
        subjects,
        time_slots,
        availabilities,
        qualifications,
        schedule: Vec::new(),
    };

    let snapshot = Snapshot::build(&entities, reference_date).expect("generated instance is internally consistent");
    (snapshot, entities)
}

/// Lists the demo instance sizes available to callers (CLI, bench harness).
pub fn list_demo_data() -> Vec<&'static str> {
    vec!["SMALL", "LARGE"]
}

struct NaiveTimeHelper;

impl NaiveTimeHelper {
    fn start_of(period: u32) -> chrono::NaiveTime {
        let minutes_from_eight = (period - 1) * 50;
        chrono::NaiveTime::from_hms_opt(8, 0, 0).unwrap() + chrono::Duration::minutes(minutes_from_eight as i64)
    }

    fn end_of(period: u32) -> chrono::NaiveTime {
        Self::start_of(period) + chrono::Duration::minutes(45)
    }
}
