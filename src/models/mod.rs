//! Domain model types for the capacitated VRP with time windows.
//!
//! Provides the static problem data (nodes with demands and time windows,
//! vehicles with weight/volume capacities, the validated instance) and the
//! derived entities produced by decoding: routes, visits, and violations.

mod node;
mod problem;
mod route;
mod solution;
mod vehicle;

pub use node::{NodeData, TimeWindow};
pub use problem::{Capacity, DemandRow, InstanceData, ProblemInstance};
pub use route::{Route, ToleranceFlag, Visit};
pub use solution::{DecodedSolution, Violation, ViolationType};
pub use vehicle::Vehicle;
