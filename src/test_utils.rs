//! Instance builders and a brute-force solver shared by unit tests.

use crate::config::SolveOptions;
use crate::distance::DistanceMatrix;
use crate::formulation::{Assignment, Model, VariableLayout};
use crate::models::{NodeData, ProblemInstance, TimeWindow, Vehicle};
use crate::solver::{SolveResult, SolveStatus, SolverAdapter};

/// Nodes on a line: `d(i, j) = |i - j|`.
fn line_distances(n: usize) -> DistanceMatrix {
    let rows = (0..n)
        .map(|i| (0..n).map(|j| (i as f64 - j as f64).abs()).collect())
        .collect();
    DistanceMatrix::from_rows(rows).expect("line distances are valid")
}

/// Customers with the given demands (weight = volume) between two depots on
/// a line, every window `[0, 100]`, speed 1.
pub fn line_instance(
    demands: &[f64],
    vehicles: usize,
    weight_capacity: f64,
    volume_capacity: f64,
) -> ProblemInstance {
    let n = demands.len() + 2;
    let tw = TimeWindow::new(0.0, 100.0).expect("valid window");
    let mut nodes = vec![NodeData::depot(tw)];
    nodes.extend(demands.iter().map(|&d| NodeData::new(d, d, tw)));
    nodes.push(NodeData::depot(tw));
    ProblemInstance::new(
        line_distances(n),
        nodes,
        Vehicle::fleet(vehicles, weight_capacity, volume_capacity),
        1.0,
    )
    .expect("valid line instance")
}

/// Line instance with one window per node (depots included), unit demands
/// and ample capacity.
pub fn instance_with_windows(windows: &[(f64, f64)], vehicles: usize) -> ProblemInstance {
    let n = windows.len();
    let nodes = windows
        .iter()
        .enumerate()
        .map(|(i, &(start, end))| {
            let tw = TimeWindow::new(start, end).expect("valid window");
            if i == 0 || i == n - 1 {
                NodeData::depot(tw)
            } else {
                NodeData::new(1.0, 1.0, tw)
            }
        })
        .collect();
    ProblemInstance::new(line_distances(n), nodes, Vehicle::fleet(vehicles, 1000.0, 1000.0), 1.0)
        .expect("valid windowed instance")
}

/// Assignment driving `routes[k]` (customers only) with vehicle `k`.
///
/// Vehicles without a listed route go straight from depot-out to depot-in.
/// Arrivals are earliest-feasible along each route; customers a vehicle does
/// not visit get their window start.
pub fn route_assignment(
    instance: &ProblemInstance,
    layout: &VariableLayout,
    routes: &[Vec<usize>],
) -> Assignment {
    let n = instance.num_nodes();
    let mut a = Assignment::new(*layout);

    for k in 0..instance.num_vehicles() {
        for node in 0..n {
            a.set_arrival(node, k, instance.window_start(node));
        }

        let mut chain = vec![instance.depot_out()];
        chain.extend(routes.get(k).into_iter().flatten().copied());
        chain.push(instance.depot_in());

        let mut time = instance.window_start(chain[0]);
        a.set_arrival(chain[0], k, time);
        for pair in chain.windows(2) {
            let (i, j) = (pair[0], pair[1]);
            a.set_arc(i, j, k, 1.0);
            time = (time + instance.service_time(i) + instance.time(i, j)).max(instance.window_start(j));
            a.set_arrival(j, k, time);
        }
    }
    a
}

fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
    if items.is_empty() {
        return vec![Vec::new()];
    }
    let mut out = Vec::new();
    for (idx, &first) in items.iter().enumerate() {
        let mut rest = items.to_vec();
        rest.remove(idx);
        for mut tail in permutations(&rest) {
            tail.insert(0, first);
            out.push(tail);
        }
    }
    out
}

/// Exhaustive solver for tiny instances.
///
/// Tries every ordered split of the customers over the fleet, keeps the
/// candidates satisfying every model constraint, and returns the cheapest.
pub struct EnumerationSolver {
    instance: ProblemInstance,
}

impl EnumerationSolver {
    pub fn new(instance: &ProblemInstance) -> Self {
        Self {
            instance: instance.clone(),
        }
    }

    fn candidates(&self, layout: &VariableLayout) -> Vec<Assignment> {
        let customers: Vec<usize> = self.instance.customers().collect();
        let v = self.instance.num_vehicles();
        let splits = v.pow(customers.len() as u32);

        let mut out = Vec::new();
        for order in permutations(&customers) {
            for mut code in 0..splits {
                let mut routes = vec![Vec::new(); v];
                for &c in &order {
                    routes[code % v].push(c);
                    code /= v;
                }
                out.push(route_assignment(&self.instance, layout, &routes));
            }
        }
        out
    }
}

impl SolverAdapter for EnumerationSolver {
    fn solve(&self, model: &Model, _options: &SolveOptions) -> SolveResult {
        let best = self
            .candidates(model.layout())
            .into_iter()
            .filter(|a| model.violated_constraints(a, 1e-6).is_empty())
            .map(|a| (model.objective_value(&a), a))
            .min_by(|x, y| x.0.total_cmp(&y.0));

        match best {
            Some((objective, a)) => SolveResult::optimal(a, objective),
            None => SolveResult::status(SolveStatus::Infeasible),
        }
    }
}

/// Adapter that always answers with a fixed result.
pub struct FixedSolver(pub SolveResult);

impl SolverAdapter for FixedSolver {
    fn solve(&self, _model: &Model, _options: &SolveOptions) -> SolveResult {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::formulation::build_model;

    #[test]
    fn test_permutations() {
        assert_eq!(permutations(&[1, 2, 3]).len(), 6);
        assert_eq!(permutations(&[]), vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_enumeration_finds_direct_route() {
        let inst = line_instance(&[1.0], 1, 10.0, 10.0);
        let model = build_model(&inst, &ModelConfig::default()).expect("builds");
        let r = EnumerationSolver::new(&inst).solve(&model, &SolveOptions::default());
        assert_eq!(r.status, SolveStatus::Optimal);
        assert_eq!(r.objective_value, Some(2.0));
    }
}
