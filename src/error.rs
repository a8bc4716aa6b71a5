//! Error taxonomy for instance validation, model building, decoding, and runs.

use std::fmt;

use thiserror::Error;

use crate::solver::SolveStatus;

/// Which of the two demand dimensions a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandKind {
    /// Weight demand / capacity.
    Weight,
    /// Volume demand / capacity.
    Volume,
}

impl fmt::Display for DemandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemandKind::Weight => f.write_str("weight"),
            DemandKind::Volume => f.write_str("volume"),
        }
    }
}

/// A malformed or internally inconsistent problem instance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("instance needs at least 2 nodes (depot-out and depot-in), got {0}")]
    TooFewNodes(usize),

    #[error("instance needs at least one vehicle")]
    NoVehicles,

    #[error("distance matrix has size {actual}, expected {expected}")]
    MatrixSize { expected: usize, actual: usize },

    #[error("distance matrix row {row} has {actual} entries, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("distance from {from} to {to} is {value}, expected a finite non-negative value")]
    InvalidDistance { from: usize, to: usize, value: f64 },

    #[error("node table has {actual} rows, expected {expected}")]
    NodeCount { expected: usize, actual: usize },

    #[error("node {node} has invalid {kind} demand {value}")]
    NegativeDemand {
        node: usize,
        kind: DemandKind,
        value: f64,
    },

    #[error("depot node {node} must carry zero demand")]
    DepotDemand { node: usize },

    #[error("node {node} has an invalid time window [{start}, {end}]")]
    InvalidTimeWindow { node: usize, start: f64, end: f64 },

    #[error("node {node} has invalid service time {value}")]
    InvalidServiceTime { node: usize, value: f64 },

    #[error("vehicle {vehicle} has invalid {kind} capacity {value}")]
    InvalidCapacity {
        vehicle: usize,
        kind: DemandKind,
        value: f64,
    },

    #[error("capacity list has {actual} entries for {expected} vehicles")]
    CapacityCount { expected: usize, actual: usize },

    #[error("travel speed must be positive and finite, got {0}")]
    InvalidSpeed(f64),

    #[error("failed to parse instance: {0}")]
    Parse(String),
}

/// Failure while building the mixed-integer model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("big-M constant must be positive and finite, got {0}")]
    InvalidBigM(f64),
}

/// An optimal assignment whose arcs do not form a depot-to-depot chain.
///
/// Every variant carries the vehicle and the chain walked so far.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("vehicle {vehicle}: no arc leaves node {node} (chain {chain:?})")]
    DeadEnd {
        vehicle: usize,
        node: usize,
        chain: Vec<usize>,
    },

    #[error("vehicle {vehicle}: node {node} has several selected successors {successors:?} (chain {chain:?})")]
    Branching {
        vehicle: usize,
        node: usize,
        successors: Vec<usize>,
        chain: Vec<usize>,
    },

    #[error("vehicle {vehicle}: arc chain closes a sub-tour at node {node} without reaching the depot (chain {chain:?})")]
    SubTour {
        vehicle: usize,
        node: usize,
        chain: Vec<usize>,
    },
}

impl DecodeError {
    /// The vehicle whose chain failed to decode.
    pub fn vehicle(&self) -> usize {
        match self {
            DecodeError::DeadEnd { vehicle, .. }
            | DecodeError::Branching { vehicle, .. }
            | DecodeError::SubTour { vehicle, .. } => *vehicle,
        }
    }

    /// The partial chain walked before the failure, starting at depot-out.
    pub fn chain(&self) -> &[usize] {
        match self {
            DecodeError::DeadEnd { chain, .. }
            | DecodeError::Branching { chain, .. }
            | DecodeError::SubTour { chain, .. } => chain,
        }
    }
}

/// Fatal failure of a build-solve-decode run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error("failed to build model: {0}")]
    Build(#[from] BuildError),

    #[error("solver error: {diagnostic}")]
    Solver { diagnostic: String },

    #[error("solver timed out: {diagnostic}")]
    Timeout { diagnostic: String },

    #[error("solver status: {status} ({diagnostic})")]
    UnexpectedStatus {
        status: SolveStatus,
        diagnostic: String,
    },

    #[error("solver reported an optimal status without an assignment")]
    MissingAssignment,

    #[error(
        "solver returned {actual_nodes} nodes x {actual_vehicles} vehicles, \
         model has {expected_nodes} x {expected_vehicles}"
    )]
    MismatchedAssignment {
        expected_nodes: usize,
        expected_vehicles: usize,
        actual_nodes: usize,
        actual_vehicles: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_accessors() {
        let err = DecodeError::SubTour {
            vehicle: 2,
            node: 1,
            chain: vec![0, 1, 2, 1],
        };
        assert_eq!(err.vehicle(), 2);
        assert_eq!(err.chain(), &[0, 1, 2, 1]);
    }

    #[test]
    fn test_validation_error_message() {
        let err = ValidationError::NegativeDemand {
            node: 3,
            kind: DemandKind::Volume,
            value: -1.0,
        };
        assert_eq!(err.to_string(), "node 3 has invalid volume demand -1");
    }

    #[test]
    fn test_build_error_from_validation() {
        let err: BuildError = ValidationError::NoVehicles.into();
        assert_eq!(err.to_string(), "instance needs at least one vehicle");
    }
}
