//! Values of every model variable, as returned by a solver.

use super::{VarId, VariableLayout};

/// A value for each column of a [`VariableLayout`].
///
/// # Examples
///
/// ```
/// use u_cvrptw::formulation::{Assignment, VariableLayout};
///
/// let mut a = Assignment::new(VariableLayout::new(3, 1));
/// a.set_arc(0, 1, 0, 1.0);
/// a.set_arrival(1, 0, 4.5);
/// assert_eq!(a.arc(0, 1, 0), 1.0);
/// assert_eq!(a.arrival(1, 0), 4.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    layout: VariableLayout,
    values: Vec<f64>,
}

impl Assignment {
    /// All-zero assignment.
    pub fn new(layout: VariableLayout) -> Self {
        Self {
            layout,
            values: vec![0.0; layout.len()],
        }
    }

    /// Wraps raw column values.
    ///
    /// Returns `None` if `values` does not have one entry per column.
    pub fn from_values(layout: VariableLayout, values: Vec<f64>) -> Option<Self> {
        if values.len() != layout.len() {
            return None;
        }
        Some(Self { layout, values })
    }

    /// Column layout these values refer to.
    pub fn layout(&self) -> &VariableLayout {
        &self.layout
    }

    /// Raw column values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value of a column.
    pub fn value(&self, id: VarId) -> f64 {
        self.values[id.index()]
    }

    /// Sets a column.
    pub fn set(&mut self, id: VarId, value: f64) {
        self.values[id.index()] = value;
    }

    /// Value of `x[from, to, vehicle]`.
    pub fn arc(&self, from: usize, to: usize, vehicle: usize) -> f64 {
        self.value(self.layout.arc(from, to, vehicle))
    }

    /// Sets `x[from, to, vehicle]`.
    pub fn set_arc(&mut self, from: usize, to: usize, vehicle: usize, value: f64) {
        let id = self.layout.arc(from, to, vehicle);
        self.set(id, value);
    }

    /// Value of `s[node, vehicle]`.
    pub fn arrival(&self, node: usize, vehicle: usize) -> f64 {
        self.value(self.layout.arrival(node, vehicle))
    }

    /// Sets `s[node, vehicle]`.
    pub fn set_arrival(&mut self, node: usize, vehicle: usize, value: f64) {
        let id = self.layout.arrival(node, vehicle);
        self.set(id, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero() {
        let a = Assignment::new(VariableLayout::new(3, 2));
        assert_eq!(a.values().len(), 24);
        assert!(a.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_from_values_length() {
        let layout = VariableLayout::new(2, 1);
        assert!(Assignment::from_values(layout, vec![0.0; 6]).is_some());
        assert!(Assignment::from_values(layout, vec![0.0; 5]).is_none());
    }

    #[test]
    fn test_arc_and_arrival_are_distinct_columns() {
        let mut a = Assignment::new(VariableLayout::new(2, 1));
        a.set_arc(1, 1, 0, 1.0);
        a.set_arrival(0, 0, 7.0);
        assert_eq!(a.arc(1, 1, 0), 1.0);
        assert_eq!(a.arrival(0, 0), 7.0);
        assert_eq!(a.arrival(1, 0), 0.0);
    }
}
