//! Linear expressions and constraints over model variables.

use std::fmt;

use super::VarId;

/// A linear expression `Σ coeff·var + constant`.
///
/// Terms are kept in insertion order; repeated variables are not merged
/// until [`merge_terms`](Self::merge_terms).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinExpr {
    /// Creates an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `coeff·var`.
    pub fn add_term(&mut self, coeff: f64, var: VarId) -> &mut Self {
        self.terms.push((var, coeff));
        self
    }

    /// Adds a constant offset.
    pub fn add_constant(&mut self, value: f64) -> &mut Self {
        self.constant += value;
        self
    }

    /// Terms in insertion order.
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    /// Constant offset.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Value of the expression for the given column values.
    ///
    /// # Panics
    ///
    /// Panics if a term refers to a column outside `values`.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(var, coeff)| coeff * values[var.index()])
            .sum::<f64>()
            + self.constant
    }

    /// Combines repeated variables into one term each, in order of first
    /// appearance, and drops terms whose coefficients cancel to zero.
    ///
    /// LP readers reject a row that names a column twice.
    pub fn merge_terms(&mut self) {
        let mut merged: Vec<(VarId, f64)> = Vec::with_capacity(self.terms.len());
        for &(var, coeff) in &self.terms {
            match merged.iter_mut().find(|(v, _)| *v == var) {
                Some((_, c)) => *c += coeff,
                None => merged.push((var, coeff)),
            }
        }
        merged.retain(|&(_, c)| c != 0.0);
        self.terms = merged;
    }

    /// Coefficient sum of `var` across all its terms.
    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms
            .iter()
            .filter(|(v, _)| *v == var)
            .map(|(_, c)| c)
            .sum()
    }
}

/// Relation between a constraint's left-hand side and right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `lhs ≤ rhs`
    LessEqual,
    /// `lhs = rhs`
    Equal,
    /// `lhs ≥ rhs`
    GreaterEqual,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::LessEqual => f.write_str("<="),
            Sense::Equal => f.write_str("="),
            Sense::GreaterEqual => f.write_str(">="),
        }
    }
}

/// The routing rule a constraint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintFamily {
    /// Each customer has exactly one outgoing arc across the fleet.
    SingleVisit,
    /// Each vehicle leaves depot-out exactly once.
    DepotDeparture,
    /// Per vehicle, inflow equals outflow at each customer.
    FlowConservation,
    /// Each vehicle enters depot-in exactly once.
    DepotReturn,
    /// Delivered weight within vehicle weight capacity.
    WeightCapacity,
    /// Delivered volume within vehicle volume capacity.
    VolumeCapacity,
    /// Big-M arrival-time precedence along selected arcs.
    TimePropagation,
    /// Arrival no earlier than window start.
    WindowLowerBound,
    /// Arrival no later than window end.
    WindowUpperBound,
    /// No vehicle travels from a node to itself.
    NoSelfLoop,
    /// No arc enters depot-out or leaves depot-in.
    DepotDirection,
}

impl ConstraintFamily {
    /// All families in emission order.
    pub const ALL: [ConstraintFamily; 11] = [
        ConstraintFamily::SingleVisit,
        ConstraintFamily::DepotDeparture,
        ConstraintFamily::FlowConservation,
        ConstraintFamily::DepotReturn,
        ConstraintFamily::WeightCapacity,
        ConstraintFamily::VolumeCapacity,
        ConstraintFamily::TimePropagation,
        ConstraintFamily::WindowLowerBound,
        ConstraintFamily::WindowUpperBound,
        ConstraintFamily::NoSelfLoop,
        ConstraintFamily::DepotDirection,
    ];

    /// Prefix of constraint names in this family.
    pub fn prefix(&self) -> &'static str {
        match self {
            ConstraintFamily::SingleVisit => "single_visit",
            ConstraintFamily::DepotDeparture => "depot_departure",
            ConstraintFamily::FlowConservation => "flow",
            ConstraintFamily::DepotReturn => "depot_return",
            ConstraintFamily::WeightCapacity => "weight_capacity",
            ConstraintFamily::VolumeCapacity => "volume_capacity",
            ConstraintFamily::TimePropagation => "time",
            ConstraintFamily::WindowLowerBound => "window_lb",
            ConstraintFamily::WindowUpperBound => "window_ub",
            ConstraintFamily::NoSelfLoop => "no_self_loop",
            ConstraintFamily::DepotDirection => "depot_direction",
        }
    }
}

/// A named linear constraint `lhs (sense) rhs`.
///
/// The left-hand side carries no constant; builders fold constants into `rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    name: String,
    family: ConstraintFamily,
    lhs: LinExpr,
    sense: Sense,
    rhs: f64,
}

impl Constraint {
    /// Creates a constraint, folding any constant of `lhs` into `rhs` and
    /// merging repeated variables.
    pub fn new(
        name: String,
        family: ConstraintFamily,
        mut lhs: LinExpr,
        sense: Sense,
        rhs: f64,
    ) -> Self {
        let rhs = rhs - lhs.constant;
        lhs.constant = 0.0;
        lhs.merge_terms();
        Self {
            name,
            family,
            lhs,
            sense,
            rhs,
        }
    }

    /// Unique name, e.g. `flow_3_1`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Routing rule this constraint encodes.
    pub fn family(&self) -> ConstraintFamily {
        self.family
    }

    /// Left-hand side.
    pub fn lhs(&self) -> &LinExpr {
        &self.lhs
    }

    /// Relation.
    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Right-hand side.
    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Amount by which `values` violate this constraint (0 when satisfied).
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs = self.lhs.evaluate(values);
        match self.sense {
            Sense::LessEqual => (lhs - self.rhs).max(0.0),
            Sense::Equal => (lhs - self.rhs).abs(),
            Sense::GreaterEqual => (self.rhs - lhs).max(0.0),
        }
    }

    /// `true` if `values` satisfy this constraint up to `tol`.
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        self.violation(values) <= tol
    }
}
