//! Error taxonomy for the timetable generator and conflict detector.
//!
//! One variant per kind in the distilled spec's error taxonomy. `conflict`
//! never raises these itself; it returns `Vec<Conflict>`/
//! `Result<(), Vec<(usize, Conflict)>>` directly, since a single candidate or
//! batch can carry more than one violation. `Conflict(Vec<Conflict>)` exists
//! for callers that need to fold those violations into this crate's own
//! error type at a transport boundary (e.g. rejecting an HTTP request body
//! with one error instead of a conflict list) — like `Persistence`, this
//! crate never constructs it itself. `Internal` is constructed by
//! `extractor::extract` when the backend hands back a solution that violates
//! an invariant this crate relies on (a positive variable for a break slot);
//! every such invariant is supposed to be unreachable by construction, so
//! seeing one is a bug in variable/constraint compilation, not a normal
//! runtime condition.

use crate::conflict::Conflict;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{} conflict(s) detected", .0.len())]
    Conflict(Vec<Conflict>),

    #[error("no feasible solution exists under the current constraints ({hint})")]
    Infeasible { hint: String },

    #[error("solver exhausted its {budget_seconds}s time budget with no feasible solution")]
    Timeout { budget_seconds: u64 },

    #[error("solve was cancelled before completion")]
    Cancelled,

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("internal invariant violated: {0}")]
    Internal(String),
}
