#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::indexing_slicing)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `pcbforge`: PCB layout model, fixed-point layer streams and design rule
//! checking.
//!
//! ```no_run
//! use pcbforge::{Board, Point, TOP_COPPER};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut board = Board::new("blinky", 30.0, 20.0);
//! board.set_layer_stack([TOP_COPPER]);
//! let u1 = board.add_component("U1", "ATtiny85", Point::new(5.0, 5.0), 0.0)?;
//! u1.add_pin("PB0", 1.27, 0.0);
//! let d1 = board.add_component("D1", "LED", Point::new(20.0, 5.0), 90.0)?;
//! d1.add_pin("A", 0.0, 0.0);
//! board.route_trace("U1:PB0", "D1:A", TOP_COPPER, 0.25, &[])?;
//! board.design_rule_check(None, None)?;
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod codec;
pub mod drc;
pub mod error;
pub mod export;
pub mod geometry;
pub mod rules;

pub use board::{
    Board, BoardConfig, Component, Feature, FeatureKind, Hole, Layer, Pad, Pin, TextAnnotation,
    Via, Zone, BOTTOM_COPPER, BOTTOM_SILK, HOLES_LAYER, TOP_COPPER, TOP_SILK,
};
pub use codec::{FixedPoint, Instruction};
pub use drc::{check_board, DrcThresholds, ExtraRules, Violation};
pub use error::{BoardError, CodecError, ConfigError, DrcError, ExportError, RulesError};
pub use export::{export_board, ExportOptions};
pub use geometry::{BoundingBox, Frame, Point, Polygon};
pub use rules::{Ruleset, LAYER_SERVICE_RULES};
