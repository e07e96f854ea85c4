//! Geometry primitives shared by the world, map and scenario crates.

use serde::{Deserialize, Serialize};

/// 3D transform: location + rotation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    /// Location (x, y, z) in meters
    pub location: Location,

    /// Rotation (pitch, yaw, roll) in degrees
    #[serde(default)]
    pub rotation: Rotation,
}

impl Transform {
    pub fn new(location: Location, rotation: Rotation) -> Self {
        Self { location, rotation }
    }

    /// Transform at `location` heading along `yaw` degrees on a flat road
    pub fn at(location: Location, yaw: f64) -> Self {
        Self {
            location,
            rotation: Rotation {
                pitch: 0.0,
                yaw,
                roll: 0.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in meters
    pub fn distance(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

/// A discrete, road-aligned point of the road network
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    /// Road the waypoint belongs to
    pub road_id: u32,

    /// Lane on the road; 1 is the rightmost driving lane
    pub lane_id: i32,

    /// Distance along the road from its start, in meters
    pub s: f64,

    /// Lane-centred pose, heading along the driving direction
    pub transform: Transform,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Location::new(0.0, 0.0, 0.0);
        let b = Location::new(3.0, 4.0, 0.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn transform_rotation_defaults_when_omitted() {
        let json = r#"{ "location": { "x": 1.0, "y": 2.0, "z": 0.5 } }"#;
        let transform: Transform = serde_json::from_str(json).unwrap();
        assert_eq!(transform.location, Location::new(1.0, 2.0, 0.5));
        assert_eq!(transform.rotation, Rotation::default());
    }
}
