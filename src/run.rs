//! Build → solve → decode pipeline.

use std::fmt;

use rayon::prelude::*;
use tracing::{info, instrument};

use crate::config::RunConfig;
use crate::decode::SolutionDecoder;
use crate::error::RunError;
use crate::formulation::build_model;
use crate::models::{DecodedSolution, ProblemInstance};
use crate::solver::{SolveStatus, SolverAdapter};

/// Outcome of one run: `Optimal` with decoded routes, or `Infeasible`.
///
/// Every other solver status is a [`RunError`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// `Optimal` or `Infeasible`.
    pub status: SolveStatus,
    /// Minimized total distance, when optimal.
    pub objective_value: Option<f64>,
    /// Decoded routes with their failures, violations and tolerance flags.
    /// Empty when infeasible.
    pub solution: DecodedSolution,
    /// Solver output passed through from the adapter, if any.
    pub diagnostic: Option<String>,
}

impl RunResult {
    /// `true` when the solver proved optimality.
    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// `true` when the instance has no feasible route assignment.
    pub fn is_infeasible(&self) -> bool {
        self.status == SolveStatus::Infeasible
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            SolveStatus::Optimal => {
                match self.objective_value {
                    Some(obj) => writeln!(f, "Optimal objective value: {}", obj)?,
                    None => writeln!(f, "Optimal objective value: unknown")?,
                }
                for route in self.solution.routes() {
                    let path: Vec<String> = route.nodes().iter().map(|n| n.to_string()).collect();
                    write!(f, "Vehicle {}: {}", route.vehicle_id(), path.join(" -> "))?;
                    if !route.is_confirmed() {
                        write!(f, " (within tolerance only)")?;
                    }
                    writeln!(f)?;
                }
                for failure in self.solution.failures() {
                    writeln!(f, "Vehicle {}: {}", failure.vehicle(), failure)?;
                }
                for violation in self.solution.violations() {
                    writeln!(f, "Violation: {}", violation.kind)?;
                }
                Ok(())
            }
            SolveStatus::Infeasible => writeln!(
                f,
                "The instance has no feasible solution. \
                 Consider relaxing vehicle capacities, adding vehicles, or widening time windows."
            ),
            other => writeln!(f, "Solver status: {}", other),
        }
    }
}

/// Builds the model for `instance`, solves it with `solver`, and decodes the
/// assignment into routes.
///
/// Decode failures and violations do not fail the run; they are reported
/// inside [`RunResult::solution`].
///
/// # Errors
///
/// - [`RunError::Build`] if the configured big-M is invalid
/// - [`RunError::Solver`] / [`RunError::Timeout`] for operational solver failures
/// - [`RunError::UnexpectedStatus`] for `Unbounded`
/// - [`RunError::MissingAssignment`] for `Optimal` without column values
/// - [`RunError::MismatchedAssignment`] if the values belong to another layout
#[instrument(skip_all, fields(nodes = instance.num_nodes(), vehicles = instance.num_vehicles()))]
pub fn run<S: SolverAdapter + ?Sized>(
    instance: &ProblemInstance,
    config: &RunConfig,
    solver: &S,
) -> Result<RunResult, RunError> {
    let model = build_model(instance, &config.model)?;
    let result = solver.solve(&model, &config.solve);
    let diagnostic = result.diagnostic.clone().unwrap_or_default();

    match result.status {
        SolveStatus::Optimal => {}
        SolveStatus::Infeasible => {
            info!("instance is infeasible");
            return Ok(RunResult {
                status: SolveStatus::Infeasible,
                objective_value: None,
                solution: DecodedSolution::new(),
                diagnostic: result.diagnostic,
            });
        }
        SolveStatus::Error => return Err(RunError::Solver { diagnostic }),
        SolveStatus::Timeout => return Err(RunError::Timeout { diagnostic }),
        status @ SolveStatus::Unbounded => {
            return Err(RunError::UnexpectedStatus { status, diagnostic })
        }
    }

    let assignment = result.assignment.ok_or(RunError::MissingAssignment)?;
    let (expected, actual) = (model.layout(), assignment.layout());
    if expected != actual {
        return Err(RunError::MismatchedAssignment {
            expected_nodes: expected.num_nodes(),
            expected_vehicles: expected.num_vehicles(),
            actual_nodes: actual.num_nodes(),
            actual_vehicles: actual.num_vehicles(),
        });
    }
    let solution = SolutionDecoder::new(instance, config.decode).decode(&assignment);
    let objective = result
        .objective_value
        .filter(|v| v.is_finite())
        .unwrap_or_else(|| model.objective_value(&assignment));

    info!(
        objective,
        routes = solution.routes().len(),
        valid = solution.is_valid(),
        "solved"
    );

    Ok(RunResult {
        status: SolveStatus::Optimal,
        objective_value: Some(objective),
        solution,
        diagnostic: result.diagnostic,
    })
}

/// Runs independent instances in parallel, one result per instance in input
/// order.
pub fn run_batch<S: SolverAdapter + ?Sized>(
    instances: &[ProblemInstance],
    config: &RunConfig,
    solver: &S,
) -> Vec<Result<RunResult, RunError>> {
    instances
        .par_iter()
        .map(|instance| run(instance, config, solver))
        .collect()
}
