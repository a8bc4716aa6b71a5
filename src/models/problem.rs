//! Validated problem instance and its raw input form.

use std::ops::Range;

use serde::Deserialize;

use super::{NodeData, TimeWindow, Vehicle};
use crate::distance::DistanceMatrix;
use crate::error::{DemandKind, ValidationError};

/// Static, validated input of a CVRPTW instance.
///
/// Nodes are indexed `0..N`: node `0` is the depot-out instance (every route
/// starts there), node `N-1` the depot-in instance (every route ends there),
/// and `1..N-1` are the customers. Vehicles are indexed `0..V`.
///
/// # Examples
///
/// ```
/// use u_cvrptw::distance::DistanceMatrix;
/// use u_cvrptw::models::{NodeData, ProblemInstance, TimeWindow, Vehicle};
///
/// let tw = TimeWindow::new(0.0, 100.0).unwrap();
/// let nodes = vec![
///     NodeData::depot(tw),
///     NodeData::new(10.0, 1.0, tw),
///     NodeData::depot(tw),
/// ];
/// let dm = DistanceMatrix::from_rows(vec![
///     vec![0.0, 4.0, 0.0],
///     vec![4.0, 0.0, 4.0],
///     vec![0.0, 4.0, 0.0],
/// ])
/// .unwrap();
/// let instance = ProblemInstance::new(dm, nodes, Vehicle::fleet(1, 50.0, 5.0), 2.0).unwrap();
/// assert_eq!(instance.num_customers(), 1);
/// assert_eq!(instance.time(0, 1), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemInstance {
    distances: DistanceMatrix,
    nodes: Vec<NodeData>,
    vehicles: Vec<Vehicle>,
    speed: f64,
}

impl ProblemInstance {
    /// Validates and assembles an instance.
    pub fn new(
        distances: DistanceMatrix,
        nodes: Vec<NodeData>,
        vehicles: Vec<Vehicle>,
        speed: f64,
    ) -> Result<Self, ValidationError> {
        let n = nodes.len();
        if n < 2 {
            return Err(ValidationError::TooFewNodes(n));
        }
        if vehicles.is_empty() {
            return Err(ValidationError::NoVehicles);
        }
        if distances.size() != n {
            return Err(ValidationError::MatrixSize {
                expected: n,
                actual: distances.size(),
            });
        }
        distances.validate()?;

        for (i, node) in nodes.iter().enumerate() {
            check_amount(i, DemandKind::Weight, node.weight_demand())?;
            check_amount(i, DemandKind::Volume, node.volume_demand())?;
            let is_depot = i == 0 || i == n - 1;
            if is_depot && (node.weight_demand() != 0.0 || node.volume_demand() != 0.0) {
                return Err(ValidationError::DepotDemand { node: i });
            }
            let service = node.service_time();
            if !service.is_finite() || service < 0.0 {
                return Err(ValidationError::InvalidServiceTime {
                    node: i,
                    value: service,
                });
            }
        }

        for (k, vehicle) in vehicles.iter().enumerate() {
            for (kind, value) in [
                (DemandKind::Weight, vehicle.weight_capacity()),
                (DemandKind::Volume, vehicle.volume_capacity()),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(ValidationError::InvalidCapacity {
                        vehicle: k,
                        kind,
                        value,
                    });
                }
            }
        }

        if !speed.is_finite() || speed <= 0.0 {
            return Err(ValidationError::InvalidSpeed(speed));
        }

        Ok(Self {
            distances,
            nodes,
            vehicles,
            speed,
        })
    }

    /// Validates raw input and builds an instance from it.
    pub fn from_data(data: InstanceData) -> Result<Self, ValidationError> {
        let n = data.demands.len();
        if data.distances.len() != n {
            return Err(ValidationError::NodeCount {
                expected: data.distances.len(),
                actual: n,
            });
        }
        let distances = DistanceMatrix::from_rows(data.distances)?;

        let nodes = data
            .demands
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let tw = TimeWindow::new(row.start, row.end).ok_or(
                    ValidationError::InvalidTimeWindow {
                        node: i,
                        start: row.start,
                        end: row.end,
                    },
                )?;
                Ok(NodeData::new(row.weight, row.volume, tw).with_service_time(row.service))
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        let weights = data.weight_capacity.expand(data.vehicles)?;
        let volumes = data.volume_capacity.expand(data.vehicles)?;
        let vehicles = weights
            .into_iter()
            .zip(volumes)
            .enumerate()
            .map(|(k, (w, v))| Vehicle::new(k, w, v))
            .collect();

        Self::new(distances, nodes, vehicles, data.speed)
    }

    /// Total number of nodes `N`, both depot instances included.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of customers `C = N - 2`.
    pub fn num_customers(&self) -> usize {
        self.nodes.len() - 2
    }

    /// Fleet size `V`.
    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    /// Depot-out node (route origin).
    pub fn depot_out(&self) -> usize {
        0
    }

    /// Depot-in node (route terminus).
    pub fn depot_in(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Customer node indices `1..N-1`.
    pub fn customers(&self) -> Range<usize> {
        1..self.nodes.len() - 1
    }

    /// Returns `true` if `node` is one of the two depot instances.
    pub fn is_depot(&self, node: usize) -> bool {
        node == self.depot_out() || node == self.depot_in()
    }

    /// Travel distance from `i` to `j`.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances.get(i, j)
    }

    /// Travel time from `i` to `j` (`distance / speed`).
    pub fn time(&self, i: usize, j: usize) -> f64 {
        self.distances.get(i, j) / self.speed
    }

    /// Weight demand of node `i`.
    pub fn weight_demand(&self, i: usize) -> f64 {
        self.nodes[i].weight_demand()
    }

    /// Volume demand of node `i`.
    pub fn volume_demand(&self, i: usize) -> f64 {
        self.nodes[i].volume_demand()
    }

    /// Earliest arrival at node `i`.
    pub fn window_start(&self, i: usize) -> f64 {
        self.nodes[i].time_window().start()
    }

    /// Latest arrival at node `i`.
    pub fn window_end(&self, i: usize) -> f64 {
        self.nodes[i].time_window().end()
    }

    /// Service time at node `i`.
    pub fn service_time(&self, i: usize) -> f64 {
        self.nodes[i].service_time()
    }

    /// Weight capacity of vehicle `k`.
    pub fn vehicle_weight_capacity(&self, k: usize) -> f64 {
        self.vehicles[k].weight_capacity()
    }

    /// Volume capacity of vehicle `k`.
    pub fn vehicle_volume_capacity(&self, k: usize) -> f64 {
        self.vehicles[k].volume_capacity()
    }

    /// All nodes, indexed by node ID.
    pub fn nodes(&self) -> &[NodeData] {
        &self.nodes
    }

    /// All vehicles, indexed by vehicle ID.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// The underlying distance matrix.
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Constant travel speed.
    pub fn speed(&self) -> f64 {
        self.speed
    }
}

fn check_amount(node: usize, kind: DemandKind, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::NegativeDemand { node, kind, value });
    }
    Ok(())
}

/// Raw instance input: distance rows, a demand table, and fleet parameters.
///
/// ```
/// use u_cvrptw::models::{InstanceData, ProblemInstance};
///
/// let json = r#"{
///     "distances": [[0, 3, 0], [3, 0, 3], [0, 3, 0]],
///     "demands": [
///         {"weight": 0, "volume": 0, "start": 0, "end": 100},
///         {"weight": 10, "volume": 2, "start": 0, "end": 100},
///         {"weight": 0, "volume": 0, "start": 0, "end": 100}
///     ],
///     "vehicles": 2,
///     "weight_capacity": 50,
///     "volume_capacity": [5, 8],
///     "speed": 40
/// }"#;
/// let data = InstanceData::from_json(json).unwrap();
/// let instance = ProblemInstance::from_data(data).unwrap();
/// assert_eq!(instance.vehicle_volume_capacity(1), 8.0);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstanceData {
    /// `N` rows of `N` distances.
    pub distances: Vec<Vec<f64>>,
    /// One row per node, depots included.
    pub demands: Vec<DemandRow>,
    /// Fleet size `V`.
    pub vehicles: usize,
    pub weight_capacity: Capacity,
    pub volume_capacity: Capacity,
    /// Travel speed; travel time is distance divided by speed.
    pub speed: f64,
}

impl InstanceData {
    /// Parses raw input from JSON.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json).map_err(|e| ValidationError::Parse(e.to_string()))
    }
}

/// One row of the demand table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DemandRow {
    pub weight: f64,
    pub volume: f64,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub service: f64,
}

/// A capacity given once for the whole fleet or per vehicle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Capacity {
    Uniform(f64),
    PerVehicle(Vec<f64>),
}

impl Capacity {
    fn expand(&self, vehicles: usize) -> Result<Vec<f64>, ValidationError> {
        match self {
            Capacity::Uniform(value) => Ok(vec![*value; vehicles]),
            Capacity::PerVehicle(values) if values.len() == vehicles => Ok(values.clone()),
            Capacity::PerVehicle(values) => Err(ValidationError::CapacityCount {
                expected: vehicles,
                actual: values.len(),
            }),
        }
    }
}
