//! Pose - rigid-body placement handed to the actuator
//!
//! Mirrors the usual `geometry_msgs/Pose` layout: a point plus an orientation
//! quaternion in `(x, y, z, w)` order.

use std::fmt;

use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

/// Position in metres
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Always 0.0 for planar targets
    #[serde(default)]
    pub z: f64,
}

impl Point {
    /// Create a point in the ground plane
    pub fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// Orientation quaternion, `(x, y, z, w)` component order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    /// Identity rotation
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Build a unit quaternion from static-frame Euler angles (radians).
    ///
    /// Rotations are applied roll about X, then pitch about Y, then yaw
    /// about Z, all in the fixed frame.
    pub fn from_euler(roll: f64, pitch: f64, yaw: f64) -> Self {
        let coords = UnitQuaternion::from_euler_angles(roll, pitch, yaw)
            .into_inner()
            .coords;
        Self {
            x: coords[0],
            y: coords[1],
            z: coords[2],
            w: coords[3],
        }
    }

    /// Rotation about the vertical axis only
    pub fn from_heading(heading: f64) -> Self {
        Self::from_euler(0.0, 0.0, heading)
    }

    /// Euclidean norm of the four components
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Target placement for the actuator
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

impl Pose {
    /// Create a pose from its parts
    pub fn new(position: Point, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Planar pose facing `heading` radians
    pub fn planar(x: f64, y: f64, heading: f64) -> Self {
        Self::new(Point::planar(x, y), Quaternion::from_heading(heading))
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.position;
        let q = &self.orientation;
        write!(
            f,
            "Pose(position=({}, {}, {}), orientation=({}, {}, {}, {}))",
            p.x, p.y, p.z, q.x, q.y, q.z, q.w
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_heading_quaternion() {
        let q = Quaternion::from_heading(FRAC_PI_2);
        let half = std::f64::consts::FRAC_1_SQRT_2;
        assert!(q.x.abs() < 1e-12);
        assert!(q.y.abs() < 1e-12);
        assert!((q.z - half).abs() < 1e-12);
        assert!((q.w - half).abs() < 1e-12);
    }

    #[test]
    fn test_euler_matches_sxyz_convention() {
        // roll = 1.0, pitch = 2.0, yaw = 0.0
        let q = Quaternion::from_euler(1.0, 2.0, 0.0);
        assert!((q.x - 0.259_03).abs() < 1e-4);
        assert!((q.y - 0.738_46).abs() < 1e-4);
        assert!((q.z + 0.403_42).abs() < 1e-4);
        assert!((q.w - 0.474_16).abs() < 1e-4);
    }

    #[test]
    fn test_derived_quaternion_is_unit() {
        for (r, p, y) in [(0.0, 0.0, 0.0), (3.5, -12.0, 0.0), (100.0, 0.25, 7.0)] {
            let q = Quaternion::from_euler(r, p, y);
            assert!((q.norm() - 1.0).abs() < 1e-12, "norm for ({r}, {p}, {y})");
        }
    }

    #[test]
    fn test_pose_display() {
        let pose = Pose::new(Point::planar(1.5, -2.0), Quaternion::IDENTITY);
        assert_eq!(
            pose.to_string(),
            "Pose(position=(1.5, -2, 0), orientation=(0, 0, 0, 1))"
        );
    }

    #[test]
    fn test_pose_deserialize_without_z() {
        let json = r#"{
            "position": { "x": 1.0, "y": 2.0 },
            "orientation": { "x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0 }
        }"#;
        let pose: Pose = serde_json::from_str(json).unwrap();
        assert_eq!(pose.position, Point::planar(1.0, 2.0));
        assert_eq!(pose.orientation, Quaternion::IDENTITY);
    }
}
