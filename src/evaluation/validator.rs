//! Route validator that rebuilds timing and load from a decoded node chain.

use crate::formulation::Assignment;
use crate::models::{ProblemInstance, Route, ToleranceFlag, Violation, ViolationType, Visit};

/// Validates one vehicle's node chain against capacities and time windows.
///
/// Arrival times come from the solver's `s[i,k]` values; loads and distance
/// are recomputed from the instance. Checks that fail by less than the
/// tolerance are recorded as [`ToleranceFlag`]s on the route instead of
/// violations.
///
/// # Examples
///
/// ```
/// use u_cvrptw::distance::DistanceMatrix;
/// use u_cvrptw::evaluation::RouteValidator;
/// use u_cvrptw::formulation::{Assignment, VariableLayout};
/// use u_cvrptw::models::{NodeData, ProblemInstance, TimeWindow, Vehicle};
///
/// let tw = TimeWindow::new(0.0, 10.0).unwrap();
/// let nodes = vec![NodeData::depot(tw), NodeData::new(4.0, 1.0, tw), NodeData::depot(tw)];
/// let dm = DistanceMatrix::from_rows(vec![
///     vec![0.0, 2.0, 2.0],
///     vec![2.0, 0.0, 2.0],
///     vec![2.0, 2.0, 0.0],
/// ]).unwrap();
/// let instance = ProblemInstance::new(dm, nodes, Vehicle::fleet(1, 5.0, 5.0), 1.0).unwrap();
///
/// let mut a = Assignment::new(VariableLayout::new(3, 1));
/// a.set_arrival(1, 0, 2.0);
/// a.set_arrival(2, 0, 4.0);
///
/// let validator = RouteValidator::new(&instance, 1e-6);
/// let (route, violations) = validator.build_route(0, &[0, 1, 2], &a);
/// assert!(violations.is_empty());
/// assert_eq!(route.total_distance(), 4.0);
/// assert_eq!(route.total_weight(), 4.0);
/// ```
pub struct RouteValidator<'a> {
    instance: &'a ProblemInstance,
    tolerance: f64,
}

impl<'a> RouteValidator<'a> {
    /// Creates a validator with the given absolute tolerance.
    pub fn new(instance: &'a ProblemInstance, tolerance: f64) -> Self {
        Self {
            instance,
            tolerance,
        }
    }

    /// Builds the route of `vehicle` along `chain` and checks it.
    ///
    /// `chain` is the full node sequence, depot-out first.
    pub fn build_route(
        &self,
        vehicle: usize,
        chain: &[usize],
        assignment: &Assignment,
    ) -> (Route, Vec<Violation>) {
        let inst = self.instance;
        let mut route = Route::new(vehicle);
        let mut violations = Vec::new();
        let mut weight = 0.0;
        let mut volume = 0.0;
        let mut total_distance = 0.0;

        for (pos, &node) in chain.iter().enumerate() {
            if pos > 0 {
                total_distance += inst.distance(chain[pos - 1], node);
            }
            weight += inst.weight_demand(node);
            volume += inst.volume_demand(node);

            let arrival = assignment.arrival(node, vehicle);
            let window = inst.nodes()[node].time_window();
            if !window.contains(arrival) {
                if window.contains_within(arrival, self.tolerance) {
                    route.push_flag(ToleranceFlag::TimeWindow { node, arrival });
                } else {
                    violations.push(Violation::new(ViolationType::TimeWindowViolated {
                        vehicle,
                        node,
                        arrival,
                        start: window.start(),
                        end: window.end(),
                    }));
                }
            }

            route.push_visit(Visit {
                node,
                arrival_time: arrival,
                weight_after: weight,
                volume_after: volume,
            });
        }
        route.set_total_distance(total_distance);

        let weight_cap = inst.vehicle_weight_capacity(vehicle);
        if weight > weight_cap {
            if weight <= weight_cap + self.tolerance {
                route.push_flag(ToleranceFlag::WeightCapacity {
                    load: weight,
                    capacity: weight_cap,
                });
            } else {
                violations.push(Violation::new(ViolationType::WeightCapacityExceeded {
                    vehicle,
                    load: weight,
                    capacity: weight_cap,
                }));
            }
        }

        let volume_cap = inst.vehicle_volume_capacity(vehicle);
        if volume > volume_cap {
            if volume <= volume_cap + self.tolerance {
                route.push_flag(ToleranceFlag::VolumeCapacity {
                    load: volume,
                    capacity: volume_cap,
                });
            } else {
                violations.push(Violation::new(ViolationType::VolumeCapacityExceeded {
                    vehicle,
                    load: volume,
                    capacity: volume_cap,
                }));
            }
        }

        (route, violations)
    }
}
