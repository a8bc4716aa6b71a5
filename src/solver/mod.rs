//! Solver adapter boundary.
//!
//! The combinatorial search itself is delegated: a [`SolverAdapter`]
//! receives a finished [`Model`] by reference and returns a status plus,
//! when it has one, a value for every column.
//!
//! - [`SolverAdapter`] — the one-call interface the pipeline depends on
//! - [`GlpkSolver`] — adapter driving the `glpsol` command-line solver

mod glpk;

use std::fmt;

pub use crate::formulation::Assignment;
pub use glpk::GlpkSolver;

use crate::config::SolveOptions;
use crate::formulation::Model;

/// Outcome class of a solve attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Proven optimal assignment available.
    Optimal,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// Objective unbounded below.
    Unbounded,
    /// Time limit hit before optimality was proven.
    Timeout,
    /// The solver failed.
    Error,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::Timeout => "timeout",
            SolveStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// What a solver returns for one model.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    /// Outcome class of the attempt.
    pub status: SolveStatus,
    /// Column values; expected for `Optimal`, optional otherwise.
    pub assignment: Option<Assignment>,
    /// Objective of `assignment` as reported by the solver.
    pub objective_value: Option<f64>,
    /// Solver output worth showing to a user (errors, limits hit).
    pub diagnostic: Option<String>,
}

impl SolveResult {
    /// An optimal result.
    pub fn optimal(assignment: Assignment, objective_value: f64) -> Self {
        Self {
            status: SolveStatus::Optimal,
            assignment: Some(assignment),
            objective_value: Some(objective_value),
            diagnostic: None,
        }
    }

    /// A result without assignment.
    pub fn status(status: SolveStatus) -> Self {
        Self {
            status,
            assignment: None,
            objective_value: None,
            diagnostic: None,
        }
    }

    /// A solver failure with its diagnostic text.
    pub fn error(diagnostic: impl Into<String>) -> Self {
        Self::status(SolveStatus::Error).with_diagnostic(diagnostic)
    }

    /// Attaches diagnostic text.
    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostic = Some(diagnostic.into());
        self
    }
}

/// An external MILP solver.
///
/// Implementations must not depend on anything but the model and options,
/// and must return `Optimal` only with an assignment satisfying every
/// constraint of the model.
pub trait SolverAdapter: Send + Sync {
    /// Solves `model`, blocking until done or `options.time_limit` elapses.
    fn solve(&self, model: &Model, options: &SolveOptions) -> SolveResult;
}
