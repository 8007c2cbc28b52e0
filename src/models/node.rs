//! Node and time window types.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by [`Node::distance_to`], in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A service time window carried on a node.
///
/// The search does not enforce windows; they travel with the node so that
/// consumers of a solution can schedule visits.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::TimeWindow;
///
/// let tw = TimeWindow::new(180.0, 1439.0).unwrap();
/// assert!(tw.start() <= tw.end());
/// assert!(tw.contains(600.0));
/// assert!(!tw.contains(60.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
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

    /// Earliest service time.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Latest service time.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Returns `true` if the given time falls within this window.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }
}

/// A client (or the depot) of a routing instance.
///
/// Node 0 is the depot. Nodes are created once from instance data and never
/// mutated afterwards.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::Node;
///
/// let depot = Node::depot(40.3739, -3.9196);
/// assert_eq!(depot.id(), 0);
/// assert_eq!(depot.demand(), 0);
/// assert!(depot.is_depot());
///
/// let n = Node::new(1, 12, 40.4168, -3.7038).with_category("GENERAL");
/// assert_eq!(n.demand(), 12);
/// assert_eq!(n.category(), "GENERAL");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: usize,
    demand: i32,
    latitude: f64,
    longitude: f64,
    time_window: Option<TimeWindow>,
    category: String,
}

impl Node {
    /// Creates a client node with no time window and an empty category.
    pub fn new(id: usize, demand: i32, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            demand,
            latitude,
            longitude,
            time_window: None,
            category: String::new(),
        }
    }

    /// Creates the depot at the given coordinates (id = 0, demand = 0).
    pub fn depot(latitude: f64, longitude: f64) -> Self {
        Self::new(0, 0, latitude, longitude).with_category("Depot")
    }

    /// Sets the time window.
    pub fn with_time_window(mut self, tw: TimeWindow) -> Self {
        self.time_window = Some(tw);
        self
    }

    /// Sets the category tag.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Node id (0 = depot).
    pub fn id(&self) -> usize {
        self.id
    }

    /// Demand to deliver at this node.
    pub fn demand(&self) -> i32 {
        self.demand
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Time window, if any.
    pub fn time_window(&self) -> Option<&TimeWindow> {
        self.time_window.as_ref()
    }

    /// Free-form category tag.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns `true` for the depot.
    pub fn is_depot(&self) -> bool {
        self.id == 0
    }

    /// Great-circle (haversine) distance to another node, in kilometres.
    pub fn distance_to(&self, other: &Node) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window_valid() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert_eq!(tw.start(), 10.0);
        assert_eq!(tw.end(), 20.0);
    }

    #[test]
    fn test_time_window_invalid() {
        assert!(TimeWindow::new(20.0, 10.0).is_none());
        assert!(TimeWindow::new(f64::NAN, 10.0).is_none());
        assert!(TimeWindow::new(10.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_time_window_contains() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert!(tw.contains(10.0));
        assert!(tw.contains(20.0));
        assert!(!tw.contains(9.9));
        assert!(!tw.contains(20.1));
    }

    #[test]
    fn test_node_new() {
        let n = Node::new(3, 7, 37.39, -6.0);
        assert_eq!(n.id(), 3);
        assert_eq!(n.demand(), 7);
        assert_eq!(n.latitude(), 37.39);
        assert_eq!(n.longitude(), -6.0);
        assert!(n.time_window().is_none());
        assert!(n.category().is_empty());
        assert!(!n.is_depot());
    }

    #[test]
    fn test_node_depot() {
        let d = Node::depot(40.0, -3.0);
        assert!(d.is_depot());
        assert_eq!(d.demand(), 0);
        assert_eq!(d.category(), "Depot");
    }

    #[test]
    fn test_node_with_time_window() {
        let tw = TimeWindow::new(180.0, 1439.0).expect("valid");
        let n = Node::new(1, 1, 0.0, 0.0).with_time_window(tw);
        assert_eq!(n.time_window().expect("has tw").start(), 180.0);
    }

    #[test]
    fn test_distance_one_degree_of_latitude() {
        let a = Node::new(1, 0, 0.0, 0.0);
        let b = Node::new(2, 0, 1.0, 0.0);
        // One degree along a meridian is ~111.2 km
        assert!((a.distance_to(&b) - 111.195).abs() < 0.05);
    }

    #[test]
    fn test_distance_symmetric_and_zero_on_self() {
        let a = Node::new(1, 0, 40.4168, -3.7038);
        let b = Node::new(2, 0, 41.3874, 2.1686);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-9);
        assert!(a.distance_to(&a).abs() < 1e-12);
        // Madrid - Barcelona is roughly 505 km
        assert!((a.distance_to(&b) - 505.0).abs() < 5.0);
    }
}
