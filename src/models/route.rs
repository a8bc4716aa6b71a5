//! Route and visit types.

/// A single node visit within a route.
///
/// Tracks the node along with its modeled arrival time and the load
/// delivered so far.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    /// Node being visited.
    pub node: usize,
    /// Modeled arrival time (`s[node, k]`).
    pub arrival_time: f64,
    /// Cumulative weight delivered after this visit.
    pub weight_after: f64,
    /// Cumulative volume delivered after this visit.
    pub volume_after: f64,
}

/// A check that passed only within the numerical tolerance.
///
/// Solvers return near-binary values and slightly violated bounds; these
/// flags mark what could not be confirmed exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum ToleranceFlag {
    /// A selected arc whose value is not exactly 0 or 1.
    FractionalArc { from: usize, to: usize, value: f64 },
    /// Weight load above capacity by less than the tolerance.
    WeightCapacity { load: f64, capacity: f64 },
    /// Volume load above capacity by less than the tolerance.
    VolumeCapacity { load: f64, capacity: f64 },
    /// Arrival outside the window by less than the tolerance.
    TimeWindow { node: usize, arrival: f64 },
}

/// An ordered node sequence driven by one vehicle.
///
/// Unlike a customer-only route, the stored visits include both depot
/// instances: the first visit is node `0`, the last is node `N-1`.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::{Route, Visit};
///
/// let mut route = Route::new(0);
/// for (node, t) in [(0, 0.0), (1, 1.0), (2, 2.0)] {
///     route.push_visit(Visit {
///         node,
///         arrival_time: t,
///         weight_after: 0.0,
///         volume_after: 0.0,
///     });
/// }
/// assert_eq!(route.nodes(), vec![0, 1, 2]);
/// assert_eq!(route.customers(), vec![1]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    vehicle_id: usize,
    visits: Vec<Visit>,
    total_distance: f64,
    flags: Vec<ToleranceFlag>,
}

impl Route {
    /// Creates an empty route for the given vehicle.
    pub fn new(vehicle_id: usize) -> Self {
        Self {
            vehicle_id,
            visits: Vec::new(),
            total_distance: 0.0,
            flags: Vec::new(),
        }
    }

    /// Appends a visit to the end of this route.
    pub fn push_visit(&mut self, visit: Visit) {
        self.visits.push(visit);
    }

    /// Records a check that only passed within tolerance.
    pub fn push_flag(&mut self, flag: ToleranceFlag) {
        self.flags.push(flag);
    }

    /// Returns the vehicle assigned to this route.
    pub fn vehicle_id(&self) -> usize {
        self.vehicle_id
    }

    /// Returns the ordered sequence of visits, depots included.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Full node sequence, from depot-out to depot-in.
    pub fn nodes(&self) -> Vec<usize> {
        self.visits.iter().map(|v| v.node).collect()
    }

    /// Customer nodes in visit order (depots excluded).
    pub fn customers(&self) -> Vec<usize> {
        let n = self.visits.len();
        if n <= 2 {
            return Vec::new();
        }
        self.visits[1..n - 1].iter().map(|v| v.node).collect()
    }

    /// Returns `true` if the vehicle goes straight from depot-out to depot-in.
    pub fn is_empty(&self) -> bool {
        self.visits.len() <= 2
    }

    /// Total weight delivered on this route.
    pub fn total_weight(&self) -> f64 {
        self.visits.last().map_or(0.0, |v| v.weight_after)
    }

    /// Total volume delivered on this route.
    pub fn total_volume(&self) -> f64 {
        self.visits.last().map_or(0.0, |v| v.volume_after)
    }

    /// Total distance of this route (set by the validator).
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Sets the total distance.
    pub fn set_total_distance(&mut self, d: f64) {
        self.total_distance = d;
    }

    /// Checks that passed only within tolerance.
    pub fn flags(&self) -> &[ToleranceFlag] {
        &self.flags
    }

    /// Returns `true` if every check on this route passed exactly.
    pub fn is_confirmed(&self) -> bool {
        self.flags.is_empty()
    }
}
