//! # u-cvrptw
//!
//! Capacitated vehicle routing with time windows as a mixed-integer linear
//! program: instance validation, model building, an external-solver
//! boundary, and decoding of solver output into validated routes.
//!
//! ## Modules
//!
//! - [`models`] — Problem instance, nodes, vehicles, decoded routes and violations
//! - [`distance`] — Dense distance matrix
//! - [`formulation`] — Variables, constraint families, big-M, LP export
//! - [`solver`] — `SolverAdapter` boundary and the GLPK adapter
//! - [`evaluation`] — Per-route capacity and time-window validation
//! - [`decode`] — Arc-chain decoding and fleet-wide single-visit checks
//! - [`run`] — Build → solve → decode pipeline, batch runs
//! - [`config`] — Run configuration
//! - [`error`] — Error taxonomy
//!
//! ## Node convention
//!
//! Nodes are `0..N`. The depot appears twice: node `0` is where every route
//! starts, node `N-1` where every route ends. Customers are `1..N-1`.

pub mod config;
pub mod decode;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod formulation;
pub mod models;
pub mod run;
pub mod solver;

#[cfg(test)]
mod test_utils;

pub use run::{run, run_batch, RunResult};
