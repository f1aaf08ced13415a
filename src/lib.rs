//! Automatic timetable generator and conflict detector for a German primary
//! school ("Grundschule").
//!
//! Given a snapshot of teachers, classes, subjects, time slots, teacher
//! availability, and teacher-subject qualifications, produces a legal weekly
//! schedule satisfying every hard constraint while maximizing a weighted
//! soft-constraint objective, backed by a CP-SAT solver behind a narrow
//! adapter trait (`backend::CpBackend`). The same invariants back a conflict
//! detector usable independently of the solver.

pub mod api;
pub mod backend;
pub mod conflict;
pub mod constraints;
pub mod demo_data;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod objective;
pub mod quality;
pub mod snapshot;
pub mod solver;
pub mod variables;
