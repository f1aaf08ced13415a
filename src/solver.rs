//! Solver Driver (C6).
//!
//! Wraps a `CpBackend` with a time budget, cooperative cancellation, and a
//! fixed random seed. Grounded on the teacher's `SolverManager`/
//! `SolutionManager` split in `solver.rs`: here `Driver::solve` plays the
//! role of `SolverManager` (drives one solve to completion) and
//! `quality::score` (called separately by `api::generate`) plays the role of
//! `SolutionManager` (stateless post-hoc analysis).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::backend::{CpBackend, CpSatBackend, SolveParams, SolveStatus};
use crate::constraints::Demand;
use crate::domain::ScheduleEntry;
use crate::error::CoreError;
use crate::snapshot::Snapshot;
use crate::{constraints, extractor, objective, variables};

/// Inputs controlling one solve, beyond the domain entities themselves.
#[derive(Debug, Clone)]
pub struct SolveConfig {
    pub time_limit_seconds: f64,
    /// `None` falls back to a fixed default seed, never wall-clock time, so
    /// two calls with otherwise identical inputs are reproducible.
    pub random_seed: Option<i64>,
    /// Entries to preserve from a prior schedule (seeded to 1 in the model).
    pub pinned_entries: Vec<ScheduleEntry>,
    /// Optional exact weekly-hour demand per (class, subject).
    pub demand: Demand,
    pub cancellation: Option<CancellationToken>,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            time_limit_seconds: 30.0,
            random_seed: Some(DEFAULT_SEED),
            pinned_entries: Vec::new(),
            demand: Demand::new(),
            cancellation: None,
        }
    }
}

/// Fixed default seed, used whenever a caller doesn't supply one.
pub const DEFAULT_SEED: i64 = 0xC0FFEE;

/// The result of one completed solve attempt.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub schedule: Vec<ScheduleEntry>,
    pub objective_value: Option<f64>,
    pub status: SolveStatus,
    pub wall_time: Duration,
}

/// Drives one CP-SAT solve end to end: C3 (variables) -> C4+C5 (constraints
/// + objective) -> backend solve -> C7 (extraction).
pub struct Driver;

impl Driver {
    /// Solves the instance described by `snapshot` under `config`.
    ///
    /// Returns `CoreError::Infeasible` when the backend proves no feasible
    /// solution exists, `CoreError::Timeout` when the time budget is
    /// exhausted with no incumbent, and `CoreError::Cancelled` when the
    /// cancellation token fires before or after the (single, blocking)
    /// solve call. `cp_sat`/OR-Tools gives no way to interrupt a solve in
    /// progress, so cancellation can only be observed at those two points,
    /// not used to shorten the budget mid-solve.
    pub fn solve(snapshot: &Snapshot, config: &SolveConfig) -> Result<SolveOutcome, CoreError> {
        if let Some(token) = &config.cancellation {
            if token.is_cancelled() {
                return Err(CoreError::Cancelled);
            }
        }

        let mut backend = CpSatBackend::new();
        let var_set = variables::build(&mut backend, snapshot, &config.pinned_entries);
        constraints::compile(&mut backend, snapshot, &var_set, &config.demand);
        objective::compile(&mut backend, snapshot, &var_set);

        let params = SolveParams {
            time_limit_seconds: config.time_limit_seconds,
            random_seed: Some(config.random_seed.unwrap_or(DEFAULT_SEED)),
        };

        let outcome = backend.solve(&params);

        if let Some(token) = &config.cancellation {
            if token.is_cancelled() {
                return Err(CoreError::Cancelled);
            }
        }

        match outcome.status {
            SolveStatus::Infeasible => Err(CoreError::Infeasible {
                hint: "no assignment satisfies every hard constraint; relax qualification, \
                       availability, or demand inputs and retry"
                    .to_string(),
            }),
            SolveStatus::Unknown => Err(CoreError::Timeout {
                budget_seconds: config.time_limit_seconds as u64,
            }),
            SolveStatus::Optimal | SolveStatus::Feasible => {
                let schedule = extractor::extract(&backend, snapshot, &var_set, &config.pinned_entries)?;
                Ok(SolveOutcome {
                    schedule,
                    objective_value: outcome.objective_value,
                    status: outcome.status,
                    wall_time: outcome.wall_time,
                })
            }
        }
    }

    /// Solves the `WeekType::A` and `WeekType::B` sub-instances jointly by
    /// running two independent solves that share the same teacher/class
    /// uniqueness pools (§9's week-type open question, resolution (a)):
    /// entries pinned as `All` in one pass are fed back as pinned entries to
    /// the other, so neither pass can violate a slot already fully claimed.
    pub fn solve_ab_weeks(
        snapshot: &Snapshot,
        config_a: &SolveConfig,
        config_b: &SolveConfig,
    ) -> Result<(SolveOutcome, SolveOutcome), CoreError> {
        let outcome_a = Self::solve(snapshot, config_a)?;

        let mut config_b_with_a = config_b.clone();
        config_b_with_a.pinned_entries.extend(
            outcome_a
                .schedule
                .iter()
                .filter(|e| matches!(e.week_type, crate::domain::WeekType::All))
                .cloned(),
        );
        let outcome_b = Self::solve(snapshot, &config_b_with_a)?;

        Ok((outcome_a, outcome_b))
    }
}

/// A caller-owned registry of in-flight and completed solve jobs, mirroring
/// the teacher's `AppState.jobs: RwLock<HashMap<String, SolveJob>>`. Entirely
/// optional: callers are free to track jobs their own way instead.
pub struct JobRegistry {
    jobs: RwLock<HashMap<Uuid, JobStatus>>,
}

#[derive(Debug, Clone)]
pub enum JobStatus {
    Running { started_at: Instant },
    Completed(Box<SolveOutcome>),
    Failed(String),
}

impl JobRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { jobs: RwLock::new(HashMap::new()) })
    }

    /// Registers a new job and returns its id.
    pub fn start(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.jobs.write().insert(id, JobStatus::Running { started_at: Instant::now() });
        id
    }

    pub fn complete(&self, id: Uuid, outcome: SolveOutcome) {
        self.jobs.write().insert(id, JobStatus::Completed(Box::new(outcome)));
    }

    pub fn fail(&self, id: Uuid, message: String) {
        self.jobs.write().insert(id, JobStatus::Failed(message));
    }

    pub fn status(&self, id: Uuid) -> Option<JobStatus> {
        self.jobs.read().get(&id).cloned()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self { jobs: RwLock::new(HashMap::new()) }
    }
}
