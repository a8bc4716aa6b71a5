//! Node data and time window types.

/// A service time window at a node.
///
/// Arrival must fall in `[start, end]`, both bounds inclusive.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::TimeWindow;
///
/// let tw = TimeWindow::new(100.0, 200.0).unwrap();
/// assert!(tw.start() <= tw.end());
/// assert!(tw.contains(150.0));
/// assert!(!tw.contains(250.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    start: f64,
    end: f64,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Returns `None` if `start > end` or either value is non-finite.
    pub fn new(start: f64, end: f64) -> Option<Self> {
        if !start.is_finite() || !end.is_finite() || start > end {
            return None;
        }
        Some(Self { start, end })
    }

    /// Earliest allowable arrival time.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Latest allowable arrival time.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Width of the window.
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Returns `true` if the given time falls within this window.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    /// Returns `true` if the given time falls within the window widened by `tol` on both sides.
    pub fn contains_within(&self, time: f64, tol: f64) -> bool {
        time >= self.start - tol && time <= self.end + tol
    }
}

/// Demand and timing data of one node.
///
/// Node 0 is the depot-out instance and node `N-1` the depot-in instance;
/// both carry zero demand. Every other node is a customer.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::{NodeData, TimeWindow};
///
/// let tw = TimeWindow::new(0.0, 480.0).unwrap();
/// let depot = NodeData::depot(tw);
/// assert_eq!(depot.weight_demand(), 0.0);
///
/// let c = NodeData::new(120.0, 3.5, tw).with_service_time(10.0);
/// assert_eq!(c.weight_demand(), 120.0);
/// assert_eq!(c.service_time(), 10.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    weight_demand: f64,
    volume_demand: f64,
    time_window: TimeWindow,
    service_time: f64,
}

impl NodeData {
    /// Creates a node with the given demands and time window, without service time.
    pub fn new(weight_demand: f64, volume_demand: f64, time_window: TimeWindow) -> Self {
        Self {
            weight_demand,
            volume_demand,
            time_window,
            service_time: 0.0,
        }
    }

    /// Creates a depot node (zero demand).
    pub fn depot(time_window: TimeWindow) -> Self {
        Self::new(0.0, 0.0, time_window)
    }

    /// Sets the time spent at this node before departing.
    pub fn with_service_time(mut self, service_time: f64) -> Self {
        self.service_time = service_time;
        self
    }

    /// Weight to deliver at this node.
    pub fn weight_demand(&self) -> f64 {
        self.weight_demand
    }

    /// Volume to deliver at this node.
    pub fn volume_demand(&self) -> f64 {
        self.volume_demand
    }

    /// Arrival time window.
    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    /// Service time at this node.
    pub fn service_time(&self) -> f64 {
        self.service_time
    }
}
