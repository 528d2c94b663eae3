//! Placed components and the pins/pads baked from their frames.

use indexmap::IndexMap;
use serde::Serialize;

use crate::geometry::{Frame, Point};

/// Zero-sized named reference point, used as a trace endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pin {
    /// Pin name, unique within its component.
    pub name: String,
    /// Board-space X.
    pub x: f64,
    /// Board-space Y.
    pub y: f64,
}

impl Pin {
    /// Board-space position.
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<&Pin> for Point {
    fn from(pin: &Pin) -> Self {
        pin.position()
    }
}

/// Sized copper contact on a component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pad {
    /// Pad name.
    pub name: String,
    /// Reference designator of the owning component.
    pub component: String,
    /// Board-space X of the pad centre.
    pub x: f64,
    /// Board-space Y of the pad centre.
    pub y: f64,
    /// Width in millimetres.
    pub w: f64,
    /// Height in millimetres.
    pub h: f64,
}

impl Pad {
    /// Board-space centre.
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Half of the larger pad dimension; the radius used for clearance.
    pub fn half_extent(&self) -> f64 {
        self.w.max(self.h) / 2.0
    }

    /// `REF:PAD` identifier.
    pub fn identifier(&self) -> String {
        format!("{}:{}", self.component, self.name)
    }

    /// Edge-to-edge clearance to `other`; negative when the pads overlap.
    pub fn clearance_to(&self, other: &Self) -> f64 {
        self.position().distance(other.position()) - self.half_extent() - other.half_extent()
    }
}

/// A placed part with its own coordinate frame.
///
/// Pins and pads are computed from the frame when they are added and are
/// never re-evaluated; a component cannot be moved after placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    reference: String,
    kind: String,
    frame: Frame,
    pads: Vec<Pad>,
    pins: IndexMap<String, Pin>,
}

impl Component {
    /// Creates a component with no pins or pads.
    pub fn new(
        reference: impl Into<String>,
        kind: impl Into<String>,
        position: Point,
        rotation_deg: f64,
    ) -> Self {
        Self {
            reference: reference.into(),
            kind: kind.into(),
            frame: Frame::new(position, rotation_deg),
            pads: Vec::new(),
            pins: IndexMap::new(),
        }
    }

    /// Reference designator.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Part type.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Board-space origin.
    pub const fn position(&self) -> Point {
        self.frame.origin
    }

    /// Rotation in degrees.
    pub const fn rotation(&self) -> f64 {
        self.frame.rotation_deg
    }

    /// Placement frame.
    pub const fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Adds a pad at local offset `(dx, dy)` and returns a snapshot of it.
    pub fn add_pad(&mut self, name: impl Into<String>, dx: f64, dy: f64, w: f64, h: f64) -> Pad {
        let at = self.frame.to_board(dx, dy);
        let pad = Pad {
            name: name.into(),
            component: self.reference.clone(),
            x: at.x,
            y: at.y,
            w,
            h,
        };
        log::debug!(
            "{}: pad {} placed at ({:.3}, {:.3})",
            self.reference,
            pad.name,
            at.x,
            at.y
        );
        self.pads.push(pad.clone());
        pad
    }

    /// Adds a pin at local offset `(dx, dy)`, replacing any pin of the same
    /// name, and returns a snapshot of it.
    pub fn add_pin(&mut self, name: impl Into<String>, dx: f64, dy: f64) -> Pin {
        let name = name.into();
        let at = self.frame.to_board(dx, dy);
        let pin = Pin {
            name: name.clone(),
            x: at.x,
            y: at.y,
        };
        self.pins.insert(name, pin.clone());
        pin
    }

    /// Looks up a pin by name.
    pub fn pin(&self, name: &str) -> Option<&Pin> {
        self.pins.get(name)
    }

    /// Pins in creation order.
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins.values()
    }

    /// Pads in creation order.
    pub fn pads(&self) -> &[Pad] {
        &self.pads
    }
}
