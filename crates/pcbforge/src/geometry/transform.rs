//! Rigid placement transforms.
//!
//! A [`Frame`] is a component's local coordinate system: an origin on the
//! board plus a rotation. Offsets are rotated counter-clockwise (y-up) by the
//! frame angle and then translated. Scaling and shearing are not supported.

use serde::{Deserialize, Serialize};

use super::types::Point;

/// Local coordinate frame of a placed component.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Board-space position of the local origin.
    pub origin: Point,
    /// Rotation in degrees, counter-clockwise positive.
    pub rotation_deg: f64,
}

impl Frame {
    /// Creates a frame at `origin` rotated by `rotation_deg` degrees.
    pub const fn new(origin: Point, rotation_deg: f64) -> Self {
        Self {
            origin,
            rotation_deg,
        }
    }

    /// Maps a local offset `(dx, dy)` into board space.
    pub fn to_board(&self, dx: f64, dy: f64) -> Point {
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        Point {
            x: self.origin.x + dx.mul_add(cos, -(dy * sin)),
            y: self.origin.y + dx.mul_add(sin, dy * cos),
        }
    }
}
