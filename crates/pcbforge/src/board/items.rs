//! Vias, zones, holes and silkscreen text records.

use serde::Serialize;

use crate::geometry::{Point, Polygon};

/// Plated through-connection between two layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Via {
    /// Centre position.
    pub position: Point,
    /// Layer the via starts on.
    pub from_layer: String,
    /// Layer the via ends on.
    pub to_layer: String,
    /// Copper pad diameter.
    pub diameter: f64,
    /// Drill diameter.
    pub hole: f64,
}

impl Via {
    /// Copper ring width around the drill.
    pub fn annular_ring(&self) -> f64 {
        (self.diameter - self.hole) / 2.0
    }
}

/// Filled copper region, optionally tied to a net.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    /// Net name, if any.
    pub net: Option<String>,
    /// Layer the zone is poured on.
    pub layer: String,
    /// Zone outline; `None` for a zone declared without geometry.
    pub geometry: Option<Polygon>,
}

/// Drilled hole, plated when it carries an annulus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hole {
    /// Centre position.
    pub position: Point,
    /// Drill diameter.
    pub diameter: f64,
    /// Copper ring width around the drill.
    pub annulus: Option<f64>,
}

impl Hole {
    /// `true` when a copper ring surrounds the hole.
    pub const fn is_plated(&self) -> bool {
        self.annulus.is_some()
    }

    /// Drill radius.
    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }
}

/// Silkscreen text placement, rendered by an external glyph flattener.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAnnotation {
    /// Text content.
    pub text: String,
    /// Baseline origin.
    pub position: Point,
    /// Character height in millimetres.
    pub height: f64,
    /// Stroke thickness in millimetres.
    pub thickness: f64,
    /// Target silkscreen layer.
    pub layer: String,
}
