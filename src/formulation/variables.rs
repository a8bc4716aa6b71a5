//! Dense indexing of the arc-selection and arrival-time variables.

use std::fmt;

/// Index of a decision variable in the model's column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub usize);

impl VarId {
    /// The raw column index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Integrality of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// 0/1 variable.
    Binary,
    /// Non-negative real variable.
    Continuous,
}

/// A decision variable, resolved back to its indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    /// `x[from, to, vehicle]`: vehicle drives directly from `from` to `to`.
    Arc {
        from: usize,
        to: usize,
        vehicle: usize,
    },
    /// `s[node, vehicle]`: arrival time of the vehicle at the node.
    Arrival { node: usize, vehicle: usize },
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Arc { from, to, vehicle } => write!(f, "x_{}_{}_{}", from, to, vehicle),
            Variable::Arrival { node, vehicle } => write!(f, "s_{}_{}", node, vehicle),
        }
    }
}

/// Column layout of the model.
///
/// The `N·N·V` arc variables come first, ordered by `(from, to, vehicle)`,
/// followed by the `N·V` arrival variables ordered by `(node, vehicle)`.
///
/// # Examples
///
/// ```
/// use u_cvrptw::formulation::{VariableLayout, Variable};
///
/// let layout = VariableLayout::new(4, 2);
/// assert_eq!(layout.len(), 4 * 4 * 2 + 4 * 2);
/// let x = layout.arc(1, 2, 1);
/// assert_eq!(layout.variable(x), Variable::Arc { from: 1, to: 2, vehicle: 1 });
/// assert_eq!(layout.variable(x).to_string(), "x_1_2_1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableLayout {
    num_nodes: usize,
    num_vehicles: usize,
}

impl VariableLayout {
    /// Layout for `num_nodes` nodes and `num_vehicles` vehicles.
    pub fn new(num_nodes: usize, num_vehicles: usize) -> Self {
        Self {
            num_nodes,
            num_vehicles,
        }
    }

    /// Number of nodes `N`.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of vehicles `V`.
    pub fn num_vehicles(&self) -> usize {
        self.num_vehicles
    }

    /// Number of arc variables.
    pub fn num_arcs(&self) -> usize {
        self.num_nodes * self.num_nodes * self.num_vehicles
    }

    /// Total number of variables.
    pub fn len(&self) -> usize {
        self.num_arcs() + self.num_nodes * self.num_vehicles
    }

    /// `true` for a layout without variables.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column of `x[from, to, vehicle]`.
    pub fn arc(&self, from: usize, to: usize, vehicle: usize) -> VarId {
        debug_assert!(from < self.num_nodes && to < self.num_nodes);
        debug_assert!(vehicle < self.num_vehicles);
        VarId((from * self.num_nodes + to) * self.num_vehicles + vehicle)
    }

    /// Column of `s[node, vehicle]`.
    pub fn arrival(&self, node: usize, vehicle: usize) -> VarId {
        debug_assert!(node < self.num_nodes && vehicle < self.num_vehicles);
        VarId(self.num_arcs() + node * self.num_vehicles + vehicle)
    }

    /// Resolves a column back to its indices.
    ///
    /// # Panics
    ///
    /// Panics if `id` is outside the layout.
    pub fn variable(&self, id: VarId) -> Variable {
        assert!(id.0 < self.len(), "variable {} outside layout", id.0);
        let v = self.num_vehicles;
        if id.0 < self.num_arcs() {
            let vehicle = id.0 % v;
            let pair = id.0 / v;
            Variable::Arc {
                from: pair / self.num_nodes,
                to: pair % self.num_nodes,
                vehicle,
            }
        } else {
            let rest = id.0 - self.num_arcs();
            Variable::Arrival {
                node: rest / v,
                vehicle: rest % v,
            }
        }
    }

    /// Integrality of a column.
    pub fn kind(&self, id: VarId) -> VarKind {
        if id.0 < self.num_arcs() {
            VarKind::Binary
        } else {
            VarKind::Continuous
        }
    }

    /// Solver-facing name of a column (`x_i_j_k` or `s_i_k`).
    pub fn name(&self, id: VarId) -> String {
        self.variable(id).to_string()
    }

    /// All columns in order.
    pub fn ids(&self) -> impl Iterator<Item = VarId> {
        (0..self.len()).map(VarId)
    }
}
