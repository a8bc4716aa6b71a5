//! Vehicle type with weight and volume capacities.

/// A vehicle of the fleet.
///
/// The fleet is usually homogeneous, but every vehicle carries its own
/// capacities so the formulation can emit per-vehicle limits.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::Vehicle;
///
/// let v = Vehicle::new(0, 61200.0, 2389.0);
/// assert_eq!(v.id(), 0);
/// assert_eq!(v.weight_capacity(), 61200.0);
/// assert_eq!(v.volume_capacity(), 2389.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    id: usize,
    weight_capacity: f64,
    volume_capacity: f64,
}

impl Vehicle {
    /// Creates a vehicle with the given ID and capacities.
    pub fn new(id: usize, weight_capacity: f64, volume_capacity: f64) -> Self {
        Self {
            id,
            weight_capacity,
            volume_capacity,
        }
    }

    /// Creates `count` identical vehicles with IDs `0..count`.
    pub fn fleet(count: usize, weight_capacity: f64, volume_capacity: f64) -> Vec<Self> {
        (0..count)
            .map(|id| Self::new(id, weight_capacity, volume_capacity))
            .collect()
    }

    /// Vehicle ID.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Maximum total weight.
    pub fn weight_capacity(&self) -> f64 {
        self.weight_capacity
    }

    /// Maximum total volume.
    pub fn volume_capacity(&self) -> f64 {
        self.volume_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_new() {
        let v = Vehicle::new(3, 200.0, 50.0);
        assert_eq!(v.id(), 3);
        assert_eq!(v.weight_capacity(), 200.0);
        assert_eq!(v.volume_capacity(), 50.0);
    }

    #[test]
    fn test_fleet() {
        let fleet = Vehicle::fleet(3, 100.0, 10.0);
        assert_eq!(fleet.len(), 3);
        assert_eq!(fleet[2].id(), 2);
        assert!(fleet.iter().all(|v| v.weight_capacity() == 100.0));
    }
}
