//! Builds the CVRPTW mixed-integer model from a problem instance.

use tracing::{debug, instrument, warn};

use super::{Assignment, Constraint, ConstraintFamily, LinExpr, Sense, VariableLayout};
use crate::config::{BigM, ModelConfig, WindowGating};
use crate::error::BuildError;
use crate::models::{InstanceData, ProblemInstance};

/// The formulation handed to a solver: variables, constraints, objective.
///
/// Built once by [`build_model`] and never mutated afterwards; solvers
/// receive it by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    layout: VariableLayout,
    constraints: Vec<Constraint>,
    objective: LinExpr,
    big_m: f64,
    window_gating: WindowGating,
}

impl Model {
    /// Column layout.
    pub fn layout(&self) -> &VariableLayout {
        &self.layout
    }

    /// Constraints in emission order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Constraints of one family, in emission order.
    pub fn constraints_in(&self, family: ConstraintFamily) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |c| c.family() == family)
    }

    /// Distance objective (minimized).
    pub fn objective(&self) -> &LinExpr {
        &self.objective
    }

    /// Big-M constant used by the time-propagation (and gated window) constraints.
    pub fn big_m(&self) -> f64 {
        self.big_m
    }

    /// How window bounds were emitted.
    pub fn window_gating(&self) -> WindowGating {
        self.window_gating
    }

    /// Number of columns.
    pub fn num_variables(&self) -> usize {
        self.layout.len()
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value of an assignment.
    pub fn objective_value(&self, assignment: &Assignment) -> f64 {
        self.objective.evaluate(assignment.values())
    }

    /// Constraints violated by more than `tol`.
    pub fn violated_constraints(&self, assignment: &Assignment, tol: f64) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied(assignment.values(), tol))
            .collect()
    }

    /// `true` if every arc column is within `tol` of 0 or 1.
    pub fn is_integral(&self, assignment: &Assignment, tol: f64) -> bool {
        assignment.values()[..self.layout.num_arcs()]
            .iter()
            .all(|&v| v.abs() <= tol || (v - 1.0).abs() <= tol)
    }
}

/// Smallest big-M that never cuts off a feasible solution of `instance`.
///
/// For an unselected arc `i→j` the constraint must hold for any arrival
/// values a feasible solution may take, so M has to cover the spread of
/// arrival times plus the longest service-and-travel leg. Visited-gated
/// windows let unvisited arrivals sit at 0, so the spread starts at 0.
pub fn safe_big_m(instance: &ProblemInstance, gating: WindowGating) -> f64 {
    let n = instance.num_nodes();
    let latest_end = (0..n)
        .map(|i| instance.window_end(i))
        .fold(0.0_f64, f64::max);
    let lowest = match gating {
        WindowGating::Visited => 0.0,
        WindowGating::Unconditional => (0..n)
            .map(|i| instance.window_start(i))
            .fold(f64::INFINITY, f64::min)
            .max(0.0),
    };
    let max_service = (0..n)
        .map(|i| instance.service_time(i))
        .fold(0.0_f64, f64::max);
    let max_travel = instance.distances().max_off_diagonal() / instance.speed();

    ((latest_end - lowest).max(0.0) + max_service + max_travel).max(1.0)
}

fn resolve_big_m(instance: &ProblemInstance, config: &ModelConfig) -> Result<f64, BuildError> {
    let safe = safe_big_m(instance, config.window_gating);
    match config.big_m {
        BigM::Auto => Ok(safe),
        BigM::Fixed(m) if !m.is_finite() || m <= 0.0 => Err(BuildError::InvalidBigM(m)),
        BigM::Fixed(m) => {
            if m < safe {
                warn!(big_m = m, safe, "fixed big-M is below the safe bound; feasible routes may be cut off");
            }
            Ok(m)
        }
    }
}

/// Builds variables, constraints, and objective for `instance`.
///
/// Pure function of its inputs: the same instance and config always give
/// an identical model, constraints in the same order.
///
/// # Examples
///
/// ```
/// use u_cvrptw::config::ModelConfig;
/// use u_cvrptw::distance::DistanceMatrix;
/// use u_cvrptw::formulation::{build_model, ConstraintFamily};
/// use u_cvrptw::models::{NodeData, ProblemInstance, TimeWindow, Vehicle};
///
/// let tw = TimeWindow::new(0.0, 100.0).unwrap();
/// let nodes = vec![NodeData::depot(tw), NodeData::new(1.0, 1.0, tw), NodeData::depot(tw)];
/// let dm = DistanceMatrix::from_rows(vec![
///     vec![0.0, 1.0, 1.0],
///     vec![1.0, 0.0, 1.0],
///     vec![1.0, 1.0, 0.0],
/// ]).unwrap();
/// let instance = ProblemInstance::new(dm, nodes, Vehicle::fleet(2, 5.0, 5.0), 1.0).unwrap();
///
/// let model = build_model(&instance, &ModelConfig::default()).unwrap();
/// assert_eq!(model.constraints_in(ConstraintFamily::DepotDeparture).count(), 2);
/// ```
#[instrument(skip_all, fields(nodes = instance.num_nodes(), vehicles = instance.num_vehicles()))]
pub fn build_model(instance: &ProblemInstance, config: &ModelConfig) -> Result<Model, BuildError> {
    let big_m = resolve_big_m(instance, config)?;
    let emitter = Emitter {
        instance,
        layout: VariableLayout::new(instance.num_nodes(), instance.num_vehicles()),
        big_m,
        gating: config.window_gating,
    };

    let mut constraints = Vec::new();
    emitter.single_visit(&mut constraints);
    emitter.depot_departure(&mut constraints);
    emitter.flow_conservation(&mut constraints);
    emitter.depot_return(&mut constraints);
    emitter.capacity(&mut constraints, ConstraintFamily::WeightCapacity);
    emitter.capacity(&mut constraints, ConstraintFamily::VolumeCapacity);
    emitter.time_propagation(&mut constraints);
    emitter.window_bounds(&mut constraints);
    emitter.no_self_loop(&mut constraints);
    emitter.depot_direction(&mut constraints);

    let objective = emitter.objective();

    debug!(
        variables = emitter.layout.len(),
        constraints = constraints.len(),
        big_m,
        "built model"
    );

    Ok(Model {
        layout: emitter.layout,
        constraints,
        objective,
        big_m,
        window_gating: config.window_gating,
    })
}

/// Validates raw input, then builds its model.
pub fn build_model_from_data(data: InstanceData, config: &ModelConfig) -> Result<Model, BuildError> {
    let instance = ProblemInstance::from_data(data)?;
    build_model(&instance, config)
}

struct Emitter<'a> {
    instance: &'a ProblemInstance,
    layout: VariableLayout,
    big_m: f64,
    gating: WindowGating,
}

impl Emitter<'_> {
    fn n(&self) -> usize {
        self.layout.num_nodes()
    }

    fn v(&self) -> usize {
        self.layout.num_vehicles()
    }

    /// Σ_j x[i, j, k]: 1 iff vehicle `k` leaves node `i`.
    fn add_outflow(&self, expr: &mut LinExpr, coeff: f64, i: usize, k: usize) {
        for j in 0..self.n() {
            expr.add_term(coeff, self.layout.arc(i, j, k));
        }
    }

    fn push(
        out: &mut Vec<Constraint>,
        family: ConstraintFamily,
        suffix: String,
        lhs: LinExpr,
        sense: Sense,
        rhs: f64,
    ) {
        let name = format!("{}_{}", family.prefix(), suffix);
        out.push(Constraint::new(name, family, lhs, sense, rhs));
    }

    fn single_visit(&self, out: &mut Vec<Constraint>) {
        for i in self.instance.customers() {
            let mut lhs = LinExpr::new();
            for k in 0..self.v() {
                self.add_outflow(&mut lhs, 1.0, i, k);
            }
            Self::push(out, ConstraintFamily::SingleVisit, i.to_string(), lhs, Sense::Equal, 1.0);
        }
    }

    fn depot_departure(&self, out: &mut Vec<Constraint>) {
        let depot = self.instance.depot_out();
        for k in 0..self.v() {
            let mut lhs = LinExpr::new();
            self.add_outflow(&mut lhs, 1.0, depot, k);
            Self::push(out, ConstraintFamily::DepotDeparture, k.to_string(), lhs, Sense::Equal, 1.0);
        }
    }

    fn flow_conservation(&self, out: &mut Vec<Constraint>) {
        for h in self.instance.customers() {
            for k in 0..self.v() {
                let mut lhs = LinExpr::new();
                for i in 0..self.n() {
                    lhs.add_term(1.0, self.layout.arc(i, h, k));
                }
                self.add_outflow(&mut lhs, -1.0, h, k);
                Self::push(
                    out,
                    ConstraintFamily::FlowConservation,
                    format!("{}_{}", h, k),
                    lhs,
                    Sense::Equal,
                    0.0,
                );
            }
        }
    }

    fn depot_return(&self, out: &mut Vec<Constraint>) {
        let depot = self.instance.depot_in();
        for k in 0..self.v() {
            let mut lhs = LinExpr::new();
            for i in 0..self.n() {
                lhs.add_term(1.0, self.layout.arc(i, depot, k));
            }
            Self::push(out, ConstraintFamily::DepotReturn, k.to_string(), lhs, Sense::Equal, 1.0);
        }
    }

    fn capacity(&self, out: &mut Vec<Constraint>, family: ConstraintFamily) {
        for k in 0..self.v() {
            let (capacity, demand): (f64, fn(&ProblemInstance, usize) -> f64) = match family {
                ConstraintFamily::WeightCapacity => (
                    self.instance.vehicle_weight_capacity(k),
                    ProblemInstance::weight_demand,
                ),
                _ => (
                    self.instance.vehicle_volume_capacity(k),
                    ProblemInstance::volume_demand,
                ),
            };
            let mut lhs = LinExpr::new();
            for i in self.instance.customers() {
                self.add_outflow(&mut lhs, demand(self.instance, i), i, k);
            }
            Self::push(out, family, k.to_string(), lhs, Sense::LessEqual, capacity);
        }
    }

    /// s[i,k] + service(i) + time(i,j) - M·(1 - x[i,j,k]) ≤ s[j,k]
    fn time_propagation(&self, out: &mut Vec<Constraint>) {
        for i in 0..self.n() {
            for j in 0..self.n() {
                if i == j {
                    continue;
                }
                let leg = self.instance.service_time(i) + self.instance.time(i, j);
                for k in 0..self.v() {
                    let mut lhs = LinExpr::new();
                    lhs.add_term(1.0, self.layout.arrival(i, k))
                        .add_term(-1.0, self.layout.arrival(j, k))
                        .add_term(self.big_m, self.layout.arc(i, j, k));
                    Self::push(
                        out,
                        ConstraintFamily::TimePropagation,
                        format!("{}_{}_{}", i, j, k),
                        lhs,
                        Sense::LessEqual,
                        self.big_m - leg,
                    );
                }
            }
        }
    }

    fn window_bounds(&self, out: &mut Vec<Constraint>) {
        let mut lower = Vec::new();
        let mut upper = Vec::new();
        for i in 0..self.n() {
            let gated = self.gating == WindowGating::Visited && !self.instance.is_depot(i);
            let start = self.instance.window_start(i);
            let end = self.instance.window_end(i);
            for k in 0..self.v() {
                let suffix = format!("{}_{}", i, k);
                let s = self.layout.arrival(i, k);

                let mut lb = LinExpr::new();
                lb.add_term(1.0, s);
                let mut ub = LinExpr::new();
                ub.add_term(1.0, s);

                if gated {
                    // s ≥ start·visit, s ≤ end + M·(1 - visit)
                    self.add_outflow(&mut lb, -start, i, k);
                    self.add_outflow(&mut ub, self.big_m, i, k);
                    Self::push(&mut lower, ConstraintFamily::WindowLowerBound, suffix.clone(), lb, Sense::GreaterEqual, 0.0);
                    Self::push(&mut upper, ConstraintFamily::WindowUpperBound, suffix, ub, Sense::LessEqual, end + self.big_m);
                } else {
                    Self::push(&mut lower, ConstraintFamily::WindowLowerBound, suffix.clone(), lb, Sense::GreaterEqual, start);
                    Self::push(&mut upper, ConstraintFamily::WindowUpperBound, suffix, ub, Sense::LessEqual, end);
                }
            }
        }
        out.append(&mut lower);
        out.append(&mut upper);
    }

    fn no_self_loop(&self, out: &mut Vec<Constraint>) {
        for i in 0..self.n() {
            let mut lhs = LinExpr::new();
            for k in 0..self.v() {
                lhs.add_term(1.0, self.layout.arc(i, i, k));
            }
            Self::push(out, ConstraintFamily::NoSelfLoop, i.to_string(), lhs, Sense::Equal, 0.0);
        }
    }

    fn depot_direction(&self, out: &mut Vec<Constraint>) {
        let (start, end) = (self.instance.depot_out(), self.instance.depot_in());
        for k in 0..self.v() {
            let mut lhs = LinExpr::new();
            for i in 0..self.n() {
                lhs.add_term(1.0, self.layout.arc(i, start, k));
            }
            self.add_outflow(&mut lhs, 1.0, end, k);
            Self::push(out, ConstraintFamily::DepotDirection, k.to_string(), lhs, Sense::Equal, 0.0);
        }
    }

    fn objective(&self) -> LinExpr {
        let mut obj = LinExpr::new();
        for i in 0..self.n() {
            for j in 0..self.n() {
                if i == j {
                    continue;
                }
                let d = self.instance.distance(i, j);
                for k in 0..self.v() {
                    obj.add_term(d, self.layout.arc(i, j, k));
                }
            }
        }
        obj
    }
}
