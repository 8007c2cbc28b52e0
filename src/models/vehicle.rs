//! Vehicle type.

use serde::{Deserialize, Serialize};

/// A capacity-limited vehicle of the fleet.
///
/// Routes refer to vehicles by id; the vehicle itself never points back at
/// its route.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::Vehicle;
///
/// let v = Vehicle::new(1, 200);
/// assert_eq!(v.id(), 1);
/// assert_eq!(v.capacity(), 200);
/// assert!(v.fits(150, 50));
/// assert!(!v.fits(150, 51));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    id: usize,
    capacity: i32,
}

impl Vehicle {
    /// Creates a vehicle with the given id and capacity.
    pub fn new(id: usize, capacity: i32) -> Self {
        Self { id, capacity }
    }

    /// Vehicle id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Maximum load capacity.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    /// Returns `true` if `demand` can be added to a vehicle already carrying `load`.
    pub fn fits(&self, load: i32, demand: i32) -> bool {
        load + demand <= self.capacity
    }
}
