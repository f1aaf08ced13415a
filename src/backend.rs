//! The narrow CP-SAT adapter boundary (§9: "Solver callback abstraction").
//!
//! `CpBackend` is the only interface the constraint compiler, objective
//! compiler, and solver driver know about. Any backend satisfying it is
//! substitutable; this crate ships one implementation, `CpSatBackend`,
//! built on the `cp_sat` crate (a Rust binding over Google OR-Tools'
//! CP-SAT solver), grounded on the `cp_sat::builder` usage in the pack's
//! `bc-ross-ross` course-scheduling example.

use std::time::{Duration, Instant};

use cp_sat::builder::{BoolVar, CpModelBuilder, LinearExpr};
use cp_sat::proto::{CpSolverStatus, SatParameters};

/// An opaque handle to a Boolean decision variable. Stable for the life of
/// one backend instance; not meaningful across backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoolVarHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Proven optimal within the time budget.
    Optimal,
    /// A feasible, not necessarily optimal, solution was found.
    Feasible,
    /// The backend proved no feasible solution exists.
    Infeasible,
    /// The time budget was exhausted with no incumbent and no proof either way.
    Unknown,
}

/// Solve parameters the driver (C6) hands to the backend for one solve.
#[derive(Debug, Clone)]
pub struct SolveParams {
    pub time_limit_seconds: f64,
    /// `Some(seed)` pins `num_search_workers` to 1 as well, since OR-Tools'
    /// portfolio search across multiple workers is not bitwise-deterministic.
    pub random_seed: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub objective_value: Option<f64>,
    pub wall_time: Duration,
}

/// The narrow adapter interface a CP-SAT-style backend must expose.
pub trait CpBackend {
    fn new_bool_var(&mut self, label: &str) -> BoolVarHandle;
    /// Fixes a variable to a constant, used to seed pinned/preserved entries.
    fn fix_bool(&mut self, var: BoolVarHandle, value: bool);
    fn add_linear_le(&mut self, terms: &[(i64, BoolVarHandle)], bound: i64);
    fn add_linear_eq(&mut self, terms: &[(i64, BoolVarHandle)], bound: i64);
    fn add_linear_ge(&mut self, terms: &[(i64, BoolVarHandle)], bound: i64);
    /// Accumulates one weighted term into the (single, maximized) objective.
    fn add_objective_term(&mut self, coeff: i64, var: BoolVarHandle);
    fn solve(&mut self, params: &SolveParams) -> SolveOutcome;
    /// Reads a variable's value from the most recent `solve()` call.
    /// Panics if called before any solve.
    fn value(&self, var: BoolVarHandle) -> bool;
}

/// `cp_sat`-crate-backed implementation of `CpBackend`.
pub struct CpSatBackend {
    model: CpModelBuilder,
    vars: Vec<BoolVar>,
    objective_terms: Vec<(i64, BoolVar)>,
    response: Option<cp_sat::proto::CpSolverResponse>,
}

impl CpSatBackend {
    pub fn new() -> Self {
        Self {
            model: CpModelBuilder::default(),
            vars: Vec::new(),
            objective_terms: Vec::new(),
            response: None,
        }
    }

    fn expr_from(&self, terms: &[(i64, BoolVarHandle)]) -> LinearExpr {
        terms
            .iter()
            .map(|(coeff, handle)| (*coeff, self.vars[handle.0].clone()))
            .collect()
    }
}

impl Default for CpSatBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpBackend for CpSatBackend {
    fn new_bool_var(&mut self, label: &str) -> BoolVarHandle {
        let _ = label;
        let var = self.model.new_bool_var();
        let handle = BoolVarHandle(self.vars.len());
        self.vars.push(var);
        handle
    }

    fn fix_bool(&mut self, var: BoolVarHandle, value: bool) {
        let v = self.vars[var.0].clone();
        let bound = if value { 1 } else { 0 };
        self.model.add_eq(LinearExpr::from(v), bound);
    }

    fn add_linear_le(&mut self, terms: &[(i64, BoolVarHandle)], bound: i64) {
        let expr = self.expr_from(terms);
        self.model.add_le(expr, bound);
    }

    fn add_linear_eq(&mut self, terms: &[(i64, BoolVarHandle)], bound: i64) {
        let expr = self.expr_from(terms);
        self.model.add_eq(expr, bound);
    }

    fn add_linear_ge(&mut self, terms: &[(i64, BoolVarHandle)], bound: i64) {
        let expr = self.expr_from(terms);
        self.model.add_ge(expr, bound);
    }

    fn add_objective_term(&mut self, coeff: i64, var: BoolVarHandle) {
        self.objective_terms.push((coeff, self.vars[var.0].clone()));
    }

    fn solve(&mut self, params: &SolveParams) -> SolveOutcome {
        if !self.objective_terms.is_empty() {
            let expr: LinearExpr = self.objective_terms.clone().into_iter().collect();
            self.model.maximize(expr);
        }

        let mut sat_params = SatParameters::default();
        sat_params.max_time_in_seconds = Some(params.time_limit_seconds);
        if let Some(seed) = params.random_seed {
            sat_params.random_seed = Some(seed as i32);
            sat_params.num_search_workers = Some(1);
        }

        let start = Instant::now();
        let response = self.model.solve_with_parameters(&sat_params);
        let wall_time = start.elapsed();

        let status = match response.status() {
            CpSolverStatus::Optimal => SolveStatus::Optimal,
            CpSolverStatus::Feasible => SolveStatus::Feasible,
            CpSolverStatus::Infeasible => SolveStatus::Infeasible,
            _ => SolveStatus::Unknown,
        };
        let objective_value = matches!(status, SolveStatus::Optimal | SolveStatus::Feasible)
            .then_some(response.objective_value);

        self.response = Some(response);

        SolveOutcome { status, objective_value, wall_time }
    }

    fn value(&self, var: BoolVarHandle) -> bool {
        let response = self
            .response
            .as_ref()
            .expect("CpBackend::value called before solve()");
        self.vars[var.0].solution_value(response)
    }
}
