//! Literal end-to-end scenarios S1-S6.

use chrono::NaiveDate;

use grundschule_timetabler::api::{self, SolveConfigDto};
use grundschule_timetabler::conflict::{self, Conflict};
use grundschule_timetabler::domain::{
    AvailabilityKind, Class, ClassId, DomainEntities, QualificationLevel, ScheduleEntry, Subject,
    SubjectId, Teacher, TeacherAvailability, TeacherId, TeacherSubject, TimeSlot, TimeSlotId,
    WeekType,
};
use grundschule_timetabler::snapshot::Snapshot;

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
}

fn subject(id: u32, code: &str) -> Subject {
    Subject { id: SubjectId::new(id), name: code.to_string(), code: code.to_string(), color: "#000000".to_string() }
}

fn teacher(id: u32, code: &str, max_hours: u32) -> Teacher {
    Teacher { id: TeacherId::new(id), display_name: code.to_string(), short_code: code.to_string(), max_hours_per_week: max_hours, part_time: false }
}

fn qualification(teacher: TeacherId, subject: SubjectId, grades: &[u32]) -> TeacherSubject {
    TeacherSubject {
        teacher,
        subject,
        level: QualificationLevel::Primary,
        allowed_grades: grades.iter().copied().collect(),
        max_hours_per_week: None,
        certified_from: None,
        certified_until: None,
    }
}

fn class(id: u32, label: &str, grade: u32) -> Class {
    Class { id: ClassId::new(id), label: label.to_string(), grade, size: 20, home_room: None }
}

fn slot(id: u32, day: u32, period: u32, is_break: bool) -> TimeSlot {
    TimeSlot {
        id: TimeSlotId::new(id),
        day,
        period,
        start: chrono::NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        end: chrono::NaiveTime::from_hms_opt(8, 45, 0).unwrap(),
        is_break,
    }
}

/// S1 — break rejection.
#[test]
fn s1_break_rejection() {
    let class_1a = class(0, "1a", 1);
    let mue = teacher(0, "MUE", 28);
    let ma = subject(0, "MA");
    let break_slot = slot(0, 1, 3, true);

    let entities = DomainEntities {
        teachers: vec![mue.clone()],
        classes: vec![class_1a.clone()],
        subjects: vec![ma.clone()],
        time_slots: vec![break_slot.clone()],
        availabilities: Vec::new(),
        qualifications: vec![qualification(mue.id, ma.id, &[1])],
        schedule: Vec::new(),
    };

    let candidate = ScheduleEntry {
        id: 1,
        class: class_1a.id,
        teacher: mue.id,
        subject: ma.id,
        time_slot: break_slot.id,
        room: None,
        week_type: WeekType::All,
    };

    let conflicts = api::validate(&entities, reference_date(), &candidate).unwrap();
    assert_eq!(conflicts, vec![Conflict::BreakConflict]);
}

/// S2 — A/B non-conflict.
#[test]
fn s2_ab_non_conflict() {
    let class_1a = class(0, "1a", 1);
    let teacher_a = teacher(0, "A", 28);
    let teacher_b = teacher(1, "B", 28);
    let religion = subject(0, "RE");
    let ethik = subject(1, "ET");
    let non_break = slot(0, 1, 1, false);

    let e1 = ScheduleEntry {
        id: 1,
        class: class_1a.id,
        teacher: teacher_a.id,
        subject: religion.id,
        time_slot: non_break.id,
        room: None,
        week_type: WeekType::A,
    };

    let entities = DomainEntities {
        teachers: vec![teacher_a.clone(), teacher_b.clone()],
        classes: vec![class_1a.clone()],
        subjects: vec![religion.clone(), ethik.clone()],
        time_slots: vec![non_break.clone()],
        availabilities: Vec::new(),
        qualifications: vec![
            qualification(teacher_a.id, religion.id, &[1]),
            qualification(teacher_b.id, ethik.id, &[1]),
        ],
        schedule: vec![e1.clone()],
    };

    let e2 = ScheduleEntry {
        id: 2,
        class: class_1a.id,
        teacher: teacher_b.id,
        subject: ethik.id,
        time_slot: non_break.id,
        room: None,
        week_type: WeekType::B,
    };

    let conflicts = api::validate(&entities, reference_date(), &e2).unwrap();
    assert!(conflicts.is_empty(), "A and B week entries in the same slot must not conflict: {conflicts:?}");
}

/// S3 — teacher double-book.
#[test]
fn s3_teacher_double_book() {
    let class_1a = class(0, "1a", 1);
    let class_2b = class(1, "2b", 2);
    let mue = teacher(0, "MUE", 28);
    let ma = subject(0, "MA");
    let slot5 = slot(5, 2, 1, false);

    let e1 = ScheduleEntry {
        id: 1,
        class: class_1a.id,
        teacher: mue.id,
        subject: ma.id,
        time_slot: slot5.id,
        room: None,
        week_type: WeekType::All,
    };

    let entities = DomainEntities {
        teachers: vec![mue.clone()],
        classes: vec![class_1a.clone(), class_2b.clone()],
        subjects: vec![ma.clone()],
        time_slots: vec![slot5.clone()],
        availabilities: Vec::new(),
        qualifications: vec![qualification(mue.id, ma.id, &[1, 2])],
        schedule: vec![e1.clone()],
    };

    let candidate = ScheduleEntry {
        id: 2,
        class: class_2b.id,
        teacher: mue.id,
        subject: ma.id,
        time_slot: slot5.id,
        room: None,
        week_type: WeekType::All,
    };

    let conflicts = api::validate(&entities, reference_date(), &candidate).unwrap();
    assert_eq!(conflicts, vec![Conflict::TeacherConflict { existing_entry: 1 }]);
}

fn s4_entities() -> DomainEntities {
    let class_1a = class(0, "1a", 1);
    let class_1b = class(1, "1b", 1);
    let mue = teacher(0, "MUE", 28);
    let sch = teacher(1, "SCH", 28);
    let ma = subject(0, "MA");
    let de = subject(1, "DE");
    let slot1 = slot(0, 1, 1, false);
    let slot2 = slot(1, 1, 2, false);

    DomainEntities {
        teachers: vec![mue.clone(), sch.clone()],
        classes: vec![class_1a, class_1b],
        subjects: vec![ma.clone(), de.clone()],
        time_slots: vec![slot1, slot2],
        availabilities: Vec::new(),
        qualifications: vec![
            qualification(mue.id, ma.id, &[1]),
            qualification(sch.id, de.id, &[1]),
        ],
        schedule: Vec::new(),
    }
}

/// S4 — generate on a tiny instance.
#[test]
fn s4_generate_tiny_instance() {
    let entities = s4_entities();
    let config = SolveConfigDto { time_limit_seconds: 5.0, reference_date: reference_date(), ..Default::default() };

    let result = api::generate(&entities, &config).expect("tiny instance is feasible");
    assert_eq!(result.schedule.len(), 4);

    // All-PRIMARY, all-morning, all-neutral-availability, zero-violation
    // rubrics should each read as ideal; workload/efficiency are naturally
    // low here (2 lessons on a single day per teacher/class) since this toy
    // instance only has two slots total, not because anything is wrong.
    assert_eq!(result.quality.qualification, 100.0);
    assert_eq!(result.quality.timing, 100.0);
    assert_eq!(result.quality.compliance, 100.0);

    let snapshot = Snapshot::build(&entities, reference_date()).unwrap();
    assert!(conflict::scan(&snapshot, &result.schedule).is_empty());
}

/// S5 — infeasibility / partial coverage when both teachers are BLOCKED on
/// Mon-p1. No explicit demand is modelled, so the solver is free to leave
/// Mon-p1 empty; the assertion is "no hard violations", not a specific count.
#[test]
fn s5_blocked_slot_yields_no_violations() {
    let mut entities = s4_entities();
    for t in &entities.teachers {
        entities.availabilities.push(TeacherAvailability {
            id: t.id.get(),
            teacher: t.id,
            weekday: 0,
            period: 1,
            kind: AvailabilityKind::Blocked,
            effective_from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            effective_until: None,
            reason: None,
        });
    }

    let config = SolveConfigDto { time_limit_seconds: 5.0, reference_date: reference_date(), ..Default::default() };
    let result = api::generate(&entities, &config).expect("still feasible: Mon-p1 can simply stay empty");

    let snapshot = Snapshot::build(&entities, reference_date()).unwrap();
    assert!(conflict::scan(&snapshot, &result.schedule).is_empty());
    assert!(result.schedule.iter().all(|e| {
        let slot = snapshot.any_time_slot(e.time_slot).unwrap();
        !(slot.day == 1 && slot.period == 1)
    }));
}

/// S6 — determinism: two generate() calls on the same inputs with the same
/// seed must agree, after canonical sorting.
#[test]
fn s6_determinism() {
    let entities = s4_entities();
    let config = SolveConfigDto { time_limit_seconds: 5.0, random_seed: Some(42), reference_date: reference_date(), ..Default::default() };

    let first = api::generate(&entities, &config).unwrap();
    let second = api::generate(&entities, &config).unwrap();

    let key = |e: &ScheduleEntry| (e.class.get(), e.teacher.get(), e.subject.get(), e.time_slot.get());
    let mut first_keys: Vec<_> = first.schedule.iter().map(key).collect();
    let mut second_keys: Vec<_> = second.schedule.iter().map(key).collect();
    first_keys.sort();
    second_keys.sort();
    assert_eq!(first_keys, second_keys);
    assert_eq!(first.quality.total, second.quality.total);
}
