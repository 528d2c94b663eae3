//! Named layers: ordered instruction streams plus the features they came from.

use std::ops::Range;

use serde::Serialize;

use crate::codec::{lower_contour, Instruction};
use crate::geometry::Point;

/// Top copper.
pub const TOP_COPPER: &str = "GTL";
/// Bottom copper.
pub const BOTTOM_COPPER: &str = "GBL";
/// Top silkscreen.
pub const TOP_SILK: &str = "GTO";
/// Bottom silkscreen.
pub const BOTTOM_SILK: &str = "GBO";
/// Drill ring approximations emitted by [`crate::Board::hole`].
pub const HOLES_LAYER: &str = "holes";

/// Width assumed for a stroke whose declared width is missing or not finite.
pub const FALLBACK_TRACE_WIDTH: f64 = 1.0;

/// What a run of instructions on a layer represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Single segment between two points.
    Trace,
    /// Polyline with one declared width.
    TracePath,
    /// Filled copper region outline.
    Region,
    /// Drill or annulus ring approximation.
    Ring,
}

/// A lowered geometric feature and the instruction span it occupies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    /// Feature category.
    pub kind: FeatureKind,
    /// Declared stroke width in millimetres, if any.
    pub width: Option<f64>,
    /// Board-space points in emission order.
    pub points: Vec<Point>,
    /// Indices into the layer's instruction stream.
    pub span: Range<usize>,
}

impl Feature {
    /// `true` for traces and trace paths.
    pub const fn is_stroke(&self) -> bool {
        matches!(self.kind, FeatureKind::Trace | FeatureKind::TracePath)
    }

    /// Declared width, or [`FALLBACK_TRACE_WIDTH`] when missing or garbled.
    pub fn effective_width(&self) -> f64 {
        match self.width {
            Some(width) if width.is_finite() => width,
            _ => FALLBACK_TRACE_WIDTH,
        }
    }
}

/// One physical or graphical plane of the board.
///
/// The stream is append-only; emission order is the draw order of the
/// final artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    name: String,
    instructions: Vec<Instruction>,
    features: Vec<Feature>,
}

impl Layer {
    /// Creates an empty layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: Vec::new(),
            features: Vec::new(),
        }
    }

    /// Layer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every instruction in emission order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Every feature in emission order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Traces and trace paths only.
    pub fn strokes(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter().filter(|feature| feature.is_stroke())
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// `true` when nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Appends a literal instruction.
    pub fn push_raw(&mut self, literal: impl Into<String>) {
        self.instructions.push(Instruction::Raw(literal.into()));
    }

    /// Lowers `points` as one contour and records the feature.
    ///
    /// Returns the span of instructions the feature occupies.
    pub fn push_feature(
        &mut self,
        kind: FeatureKind,
        width: Option<f64>,
        points: Vec<Point>,
    ) -> Range<usize> {
        let start = self.instructions.len();
        self.instructions
            .extend(lower_contour(points.iter().copied()));
        let span = start..self.instructions.len();
        log::debug!(
            "layer {}: {:?} lowered into {} instruction(s)",
            self.name,
            kind,
            span.len()
        );
        self.features.push(Feature {
            kind,
            width,
            points,
            span: span.clone(),
        });
        span
    }
}
