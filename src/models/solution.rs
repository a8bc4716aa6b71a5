//! Decoded solution and violation types.

use std::fmt;

use super::Route;
use crate::error::DecodeError;

/// A type of constraint violation found while validating decoded routes.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationType {
    /// Cumulative weight exceeds the vehicle's weight capacity.
    WeightCapacityExceeded {
        /// Vehicle driving the route.
        vehicle: usize,
        /// Total weight delivered.
        load: f64,
        /// Vehicle weight capacity.
        capacity: f64,
    },
    /// Cumulative volume exceeds the vehicle's volume capacity.
    VolumeCapacityExceeded {
        /// Vehicle driving the route.
        vehicle: usize,
        /// Total volume delivered.
        load: f64,
        /// Vehicle volume capacity.
        capacity: f64,
    },
    /// Modeled arrival time outside the node's window.
    TimeWindowViolated {
        /// Vehicle driving the route.
        vehicle: usize,
        /// Node where the violation occurred.
        node: usize,
        /// Modeled arrival time.
        arrival: f64,
        /// Window start.
        start: f64,
        /// Window end.
        end: f64,
    },
    /// A customer that no decoded route visits.
    CustomerNotVisited {
        /// Customer node.
        node: usize,
    },
    /// A customer visited more than once across the fleet.
    CustomerVisitedMultiple {
        /// Customer node.
        node: usize,
        /// Vehicle of every visit, in route order.
        vehicles: Vec<usize>,
    },
    /// Selected arcs of a vehicle that are not on its depot-to-depot chain.
    DetachedArcs {
        /// Vehicle owning the arcs.
        vehicle: usize,
        /// The stray arcs `(from, to)`.
        arcs: Vec<(usize, usize)>,
    },
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationType::WeightCapacityExceeded {
                vehicle,
                load,
                capacity,
            } => write!(f, "vehicle {} carries weight {} over capacity {}", vehicle, load, capacity),
            ViolationType::VolumeCapacityExceeded {
                vehicle,
                load,
                capacity,
            } => write!(f, "vehicle {} carries volume {} over capacity {}", vehicle, load, capacity),
            ViolationType::TimeWindowViolated {
                vehicle,
                node,
                arrival,
                start,
                end,
            } => write!(
                f,
                "vehicle {} arrives at node {} at {}, outside [{}, {}]",
                vehicle, node, arrival, start, end
            ),
            ViolationType::CustomerNotVisited { node } => write!(f, "customer {} is not visited", node),
            ViolationType::CustomerVisitedMultiple { node, vehicles } => {
                write!(f, "customer {} is visited by vehicles {:?}", node, vehicles)
            }
            ViolationType::DetachedArcs { vehicle, arcs } => {
                write!(f, "vehicle {} has arcs off its route: {:?}", vehicle, arcs)
            }
        }
    }
}

/// A constraint violation in a decoded solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

/// Routes decoded from a raw assignment, with everything that went wrong.
///
/// Vehicles whose arc chain could not be decoded have no route; their
/// failure is kept in [`failures`](Self::failures) instead.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::{DecodedSolution, Route};
///
/// let mut sol = DecodedSolution::new();
/// sol.add_route(Route::new(0));
/// assert_eq!(sol.routes().len(), 1);
/// assert!(sol.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedSolution {
    routes: Vec<Route>,
    failures: Vec<DecodeError>,
    violations: Vec<Violation>,
}

impl DecodedSolution {
    /// Creates an empty solution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a decoded route.
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Records a vehicle whose chain failed to decode.
    pub fn add_failure(&mut self, failure: DecodeError) {
        self.failures.push(failure);
    }

    /// Records a violated check.
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Decoded routes, ordered by vehicle.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Route of the given vehicle, if its chain decoded.
    pub fn route_for(&self, vehicle: usize) -> Option<&Route> {
        self.routes.iter().find(|r| r.vehicle_id() == vehicle)
    }

    /// Vehicles whose chain failed to decode.
    pub fn failures(&self) -> &[DecodeError] {
        &self.failures
    }

    /// Violated checks.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// `true` when every chain decoded and no check was violated.
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty() && self.violations.is_empty()
    }

    /// Total distance across all decoded routes.
    pub fn total_distance(&self) -> f64 {
        self.routes.iter().map(|r| r.total_distance()).sum()
    }

    /// Total number of customer visits across all routes.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(|r| r.customers().len()).sum()
    }
}
