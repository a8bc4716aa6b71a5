//! Turns a raw solver assignment into validated per-vehicle routes.

use tracing::warn;

use crate::config::DecodeOptions;
use crate::error::DecodeError;
use crate::evaluation::RouteValidator;
use crate::formulation::Assignment;
use crate::models::{DecodedSolution, ProblemInstance, ToleranceFlag, Violation, ViolationType};

/// Arc values at or above this are read as selected.
const SELECTED: f64 = 0.5;

/// Decodes arc assignments into routes.
///
/// For each vehicle the chain is walked from depot-out along the unique
/// selected successor until depot-in; walks that dead-end, branch, or close a
/// cycle become [`DecodeError`]s for that vehicle only. Decoded routes are
/// then validated individually (capacity, time windows) and fleet-wide
/// (every customer exactly once).
///
/// Decoding is a pure function of the assignment.
pub struct SolutionDecoder<'a> {
    instance: &'a ProblemInstance,
    options: DecodeOptions,
}

struct Chain {
    nodes: Vec<usize>,
    flags: Vec<ToleranceFlag>,
}

impl<'a> SolutionDecoder<'a> {
    /// Creates a decoder for assignments of `instance`'s model.
    pub fn new(instance: &'a ProblemInstance, options: DecodeOptions) -> Self {
        Self { instance, options }
    }

    /// Decodes every vehicle and validates the resulting routes.
    ///
    /// # Panics
    ///
    /// Panics if `assignment` was built for a different node or vehicle count.
    pub fn decode(&self, assignment: &Assignment) -> DecodedSolution {
        let layout = assignment.layout();
        assert!(
            layout.num_nodes() == self.instance.num_nodes()
                && layout.num_vehicles() == self.instance.num_vehicles(),
            "assignment layout does not match the instance"
        );

        let validator = RouteValidator::new(self.instance, self.options.tolerance);
        let mut solution = DecodedSolution::new();

        for k in 0..self.instance.num_vehicles() {
            let chain = match self.walk(k, assignment) {
                Ok(chain) => chain,
                Err(e) => {
                    warn!(vehicle = k, error = %e, "failed to decode vehicle route");
                    solution.add_failure(e);
                    continue;
                }
            };

            let detached = self.detached_arcs(k, &chain.nodes, assignment);
            if !detached.is_empty() {
                solution.add_violation(Violation::new(ViolationType::DetachedArcs {
                    vehicle: k,
                    arcs: detached,
                }));
            }

            let (mut route, violations) = validator.build_route(k, &chain.nodes, assignment);
            for flag in chain.flags {
                route.push_flag(flag);
            }
            for v in violations {
                solution.add_violation(v);
            }
            solution.add_route(route);
        }

        self.check_single_visit(&mut solution);

        for v in solution.violations() {
            warn!(violation = %v.kind, "decoded solution violates a constraint");
        }
        solution
    }

    /// Follows selected arcs of vehicle `k` from depot-out, for at most `N` steps.
    fn walk(&self, k: usize, assignment: &Assignment) -> Result<Chain, DecodeError> {
        let n = self.instance.num_nodes();
        let end = self.instance.depot_in();
        let mut current = self.instance.depot_out();
        let mut nodes = vec![current];
        let mut flags = Vec::new();

        for _ in 0..n {
            let successors: Vec<usize> = (0..n)
                .filter(|&j| assignment.arc(current, j, k) >= SELECTED)
                .collect();
            let next = match successors.len() {
                0 => {
                    return Err(DecodeError::DeadEnd {
                        vehicle: k,
                        node: current,
                        chain: nodes,
                    })
                }
                1 => successors[0],
                _ => {
                    return Err(DecodeError::Branching {
                        vehicle: k,
                        node: current,
                        successors,
                        chain: nodes,
                    })
                }
            };

            let value = assignment.arc(current, next, k);
            if (value - 1.0).abs() > self.options.tolerance {
                flags.push(ToleranceFlag::FractionalArc {
                    from: current,
                    to: next,
                    value,
                });
            }

            let revisit = nodes.contains(&next);
            nodes.push(next);
            if revisit {
                return Err(DecodeError::SubTour {
                    vehicle: k,
                    node: next,
                    chain: nodes,
                });
            }
            if next == end {
                return Ok(Chain { nodes, flags });
            }
            current = next;
        }

        Err(DecodeError::SubTour {
            vehicle: k,
            node: current,
            chain: nodes,
        })
    }

    /// Selected arcs of vehicle `k` that are not consecutive pairs of `chain`.
    fn detached_arcs(&self, k: usize, chain: &[usize], assignment: &Assignment) -> Vec<(usize, usize)> {
        let n = self.instance.num_nodes();
        let mut arcs = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if assignment.arc(i, j, k) >= SELECTED && !chain.windows(2).any(|w| w[0] == i && w[1] == j) {
                    arcs.push((i, j));
                }
            }
        }
        arcs
    }

    fn check_single_visit(&self, solution: &mut DecodedSolution) {
        let mut visits: Vec<Vec<usize>> = vec![Vec::new(); self.instance.num_nodes()];
        for route in solution.routes() {
            for node in route.customers() {
                visits[node].push(route.vehicle_id());
            }
        }

        // Customers on undecodable chains are still reported, as missing.
        for node in self.instance.customers() {
            match visits[node].len() {
                0 => solution.add_violation(Violation::new(ViolationType::CustomerNotVisited { node })),
                1 => {}
                _ => solution.add_violation(Violation::new(ViolationType::CustomerVisitedMultiple {
                    node,
                    vehicles: std::mem::take(&mut visits[node]),
                })),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::formulation::{build_model, VariableLayout};
    use crate::test_utils::{line_instance, route_assignment};
    use proptest::prelude::*;

    fn decode(inst: &ProblemInstance, a: &Assignment) -> DecodedSolution {
        SolutionDecoder::new(inst, DecodeOptions::default()).decode(a)
    }

    fn layout(inst: &ProblemInstance) -> VariableLayout {
        VariableLayout::new(inst.num_nodes(), inst.num_vehicles())
    }

    #[test]
    fn test_decode_single_route() {
        let inst = line_instance(&[1.0, 1.0], 1, 10.0, 10.0);
        let a = route_assignment(&inst, &layout(&inst), &[vec![1, 2]]);
        let sol = decode(&inst, &a);
        assert!(sol.is_valid());
        assert_eq!(sol.routes().len(), 1);
        let route = &sol.routes()[0];
        assert_eq!(route.nodes(), vec![0, 1, 2, 3]);
        assert_eq!(route.total_distance(), 3.0);
        assert!(route.is_confirmed());
    }

    #[test]
    fn test_decode_empty_vehicle() {
        let inst = line_instance(&[1.0, 1.0], 2, 10.0, 10.0);
        let a = route_assignment(&inst, &layout(&inst), &[vec![2, 1], vec![]]);
        let sol = decode(&inst, &a);
        assert!(sol.is_valid());
        assert_eq!(sol.route_for(0).map(|r| r.customers()), Some(vec![2, 1]));
        assert_eq!(sol.route_for(1).map(|r| r.nodes()), Some(vec![0, 3]));
    }

    #[test]
    fn test_zero_time_sub_tour() {
        // Vehicle 0 drives 0→3 and also closes the cycle 1→2→1.
        let inst = line_instance(&[1.0, 1.0], 1, 10.0, 10.0);
        let mut a = Assignment::new(layout(&inst));
        a.set_arc(0, 3, 0, 1.0);
        a.set_arc(1, 2, 0, 1.0);
        a.set_arc(2, 1, 0, 1.0);
        a.set_arrival(3, 0, 3.0);
        let sol = decode(&inst, &a);
        assert!(sol.failures().is_empty());
        let kinds: Vec<_> = sol.violations().iter().map(|v| v.kind.clone()).collect();
        assert!(kinds.contains(&ViolationType::DetachedArcs {
            vehicle: 0,
            arcs: vec![(1, 2), (2, 1)]
        }));
        assert!(kinds.contains(&ViolationType::CustomerNotVisited { node: 1 }));
        assert!(kinds.contains(&ViolationType::CustomerNotVisited { node: 2 }));
    }

    #[test]
    fn test_chain_closing_cycle() {
        let inst = line_instance(&[1.0, 1.0], 1, 10.0, 10.0);
        let mut a = Assignment::new(layout(&inst));
        a.set_arc(0, 1, 0, 1.0);
        a.set_arc(1, 2, 0, 1.0);
        a.set_arc(2, 1, 0, 1.0);
        let sol = decode(&inst, &a);
        assert_eq!(
            sol.failures(),
            &[DecodeError::SubTour {
                vehicle: 0,
                node: 1,
                chain: vec![0, 1, 2, 1]
            }]
        );
        assert!(sol.routes().is_empty());
        assert_eq!(sol.violations().len(), 2);
    }

    #[test]
    fn test_self_loop_is_sub_tour() {
        let inst = line_instance(&[1.0], 1, 10.0, 10.0);
        let mut a = Assignment::new(layout(&inst));
        a.set_arc(0, 1, 0, 1.0);
        a.set_arc(1, 1, 0, 1.0);
        let sol = decode(&inst, &a);
        assert!(matches!(
            sol.failures(),
            [DecodeError::SubTour { node: 1, .. }]
        ));
    }

    #[test]
    fn test_dead_end() {
        let inst = line_instance(&[1.0], 1, 10.0, 10.0);
        let mut a = Assignment::new(layout(&inst));
        a.set_arc(0, 1, 0, 1.0);
        let sol = decode(&inst, &a);
        let err = &sol.failures()[0];
        assert_eq!(err.vehicle(), 0);
        assert_eq!(err.chain(), &[0, 1]);
        assert!(matches!(err, DecodeError::DeadEnd { node: 1, .. }));
    }

    #[test]
    fn test_branching() {
        let inst = line_instance(&[1.0, 1.0], 1, 10.0, 10.0);
        let mut a = Assignment::new(layout(&inst));
        a.set_arc(0, 1, 0, 1.0);
        a.set_arc(0, 2, 0, 1.0);
        let sol = decode(&inst, &a);
        assert!(matches!(
            &sol.failures()[0],
            DecodeError::Branching { node: 0, successors, .. } if successors == &vec![1, 2]
        ));
    }

    #[test]
    fn test_near_binary_values_are_rounded_and_flagged() {
        let inst = line_instance(&[1.0, 1.0], 1, 10.0, 10.0);
        let mut a = route_assignment(&inst, &layout(&inst), &[vec![1, 2]]);
        a.set_arc(1, 2, 0, 0.9999);
        a.set_arc(2, 1, 0, 0.0001);
        let sol = decode(&inst, &a);
        assert!(sol.is_valid());
        let route = &sol.routes()[0];
        assert_eq!(route.nodes(), vec![0, 1, 2, 3]);
        assert_eq!(
            route.flags(),
            &[ToleranceFlag::FractionalArc {
                from: 1,
                to: 2,
                value: 0.9999
            }]
        );
    }

    #[test]
    fn test_duplicate_visit() {
        let inst = line_instance(&[1.0, 1.0], 2, 10.0, 10.0);
        let a = route_assignment(&inst, &layout(&inst), &[vec![1, 2], vec![2]]);
        let sol = decode(&inst, &a);
        assert_eq!(
            sol.violations().iter().map(|v| v.kind.clone()).collect::<Vec<_>>(),
            vec![ViolationType::CustomerVisitedMultiple {
                node: 2,
                vehicles: vec![0, 1]
            }]
        );
    }

    #[test]
    fn test_decoded_routes_match_model_constraints() {
        let inst = line_instance(&[2.0, 3.0, 4.0], 2, 10.0, 10.0);
        let model = build_model(&inst, &ModelConfig::default()).expect("builds");
        let a = route_assignment(&inst, model.layout(), &[vec![3, 1], vec![2]]);
        assert!(model.violated_constraints(&a, 1e-9).is_empty());
        let sol = decode(&inst, &a);
        assert!(sol.is_valid());
        assert!((sol.total_distance() - model.objective_value(&a)).abs() < 1e-9);
    }

    /// Random split of customers `1..=c` into `v` ordered routes.
    fn routes_strategy() -> impl Strategy<Value = (usize, Vec<Vec<usize>>)> {
        (1usize..6, 1usize..4).prop_flat_map(|(c, v)| {
            let customers: Vec<usize> = (1..=c).collect();
            (
                Just(c),
                Just(customers).prop_shuffle(),
                proptest::collection::vec(0..v, c),
                Just(v),
            )
                .prop_map(|(c, order, owners, v)| {
                    let mut routes = vec![Vec::new(); v];
                    for (customer, owner) in order.into_iter().zip(owners) {
                        routes[owner].push(customer);
                    }
                    (c, routes)
                })
        })
    }

    proptest! {
        #[test]
        fn prop_every_customer_once((c, routes) in routes_strategy()) {
            let demands = vec![1.0; c];
            let inst = line_instance(&demands, routes.len(), 100.0, 100.0);
            let a = route_assignment(&inst, &layout(&inst), &routes);
            let sol = decode(&inst, &a);

            prop_assert!(sol.is_valid());
            let mut served: Vec<usize> = sol.routes().iter().flat_map(|r| r.customers()).collect();
            served.sort_unstable();
            prop_assert_eq!(served, (1..=c).collect::<Vec<_>>());
        }

        #[test]
        fn prop_routes_start_and_end_at_depots((c, routes) in routes_strategy()) {
            let demands = vec![1.0; c];
            let inst = line_instance(&demands, routes.len(), 100.0, 100.0);
            let a = route_assignment(&inst, &layout(&inst), &routes);
            let sol = decode(&inst, &a);

            for (k, route) in sol.routes().iter().enumerate() {
                let nodes = route.nodes();
                prop_assert_eq!(nodes.first(), Some(&0));
                prop_assert_eq!(nodes.last(), Some(&(c + 1)));
                prop_assert!(nodes.windows(2).all(|w| w[0] != w[1]));
                prop_assert_eq!(route.customers(), routes[k].clone());
            }
        }

        #[test]
        fn prop_decoding_is_idempotent((c, routes) in routes_strategy()) {
            let demands = vec![1.0; c];
            let inst = line_instance(&demands, routes.len(), 100.0, 100.0);
            let a = route_assignment(&inst, &layout(&inst), &routes);
            prop_assert_eq!(decode(&inst, &a), decode(&inst, &a));
        }
    }
}
