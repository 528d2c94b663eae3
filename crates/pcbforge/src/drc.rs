//! Design rule checking against static board geometry.
//!
//! [`check_board`] walks a finished [`Board`] and reports every rule it
//! breaks, in a stable order:
//!
//! 1. trace widths, layer by layer in stack order,
//! 2. pad-to-pad clearance between different components,
//! 3. the optional tier rules in [`ExtraRules`].
//!
//! The check itself never fails. Callers that need a hard gate wrap a
//! non-empty result in [`crate::DrcError`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Component, FeatureKind, Pad};
use crate::geometry::Point;
use crate::rules::{DEFAULT_MIN_CLEARANCE, DEFAULT_MIN_TRACE_WIDTH};

/// Optional tier rules; `None` means the rule is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtraRules {
    /// Minimum copper ring around a via or plated hole.
    pub min_annular_ring: Option<f64>,
    /// Minimum via pad diameter.
    pub min_via_diameter: Option<f64>,
    /// Minimum drill diameter for vias and holes.
    pub min_through_hole: Option<f64>,
    /// Minimum edge-to-edge distance between any two drills.
    pub hole_to_hole_clearance: Option<f64>,
    /// Minimum silkscreen character height.
    pub min_text_height: Option<f64>,
    /// Minimum silkscreen stroke thickness.
    pub min_text_thickness: Option<f64>,
}

impl ExtraRules {
    /// `true` when no optional rule is active.
    pub const fn is_empty(&self) -> bool {
        self.min_annular_ring.is_none()
            && self.min_via_diameter.is_none()
            && self.min_through_hole.is_none()
            && self.hole_to_hole_clearance.is_none()
            && self.min_text_height.is_none()
            && self.min_text_thickness.is_none()
    }
}

/// Resolved thresholds for one DRC run, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrcThresholds {
    /// Minimum trace width.
    pub min_trace_width: f64,
    /// Minimum pad edge clearance.
    pub min_clearance: f64,
    /// Optional tier rules.
    #[serde(default)]
    pub extra: ExtraRules,
}

impl DrcThresholds {
    /// Width and clearance limits with no optional rules.
    pub const fn new(min_trace_width: f64, min_clearance: f64) -> Self {
        Self {
            min_trace_width,
            min_clearance,
            extra: ExtraRules {
                min_annular_ring: None,
                min_via_diameter: None,
                min_through_hole: None,
                hole_to_hole_clearance: None,
                min_text_height: None,
                min_text_thickness: None,
            },
        }
    }

    /// Replaces the optional rules.
    #[must_use]
    pub const fn with_extra(mut self, extra: ExtraRules) -> Self {
        self.extra = extra;
        self
    }
}

impl Default for DrcThresholds {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TRACE_WIDTH, DEFAULT_MIN_CLEARANCE)
    }
}

/// A single broken rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Violation {
    /// A trace or trace path narrower than the minimum.
    TraceWidth {
        /// Layer carrying the trace.
        layer: String,
        /// `true` for a multi-point trace path.
        path: bool,
        /// Declared width.
        width: f64,
        /// Required minimum.
        minimum: f64,
    },
    /// Two pads of different components too close together.
    PadClearance {
        /// `REF:PAD` of the earlier pad.
        first: String,
        /// `REF:PAD` of the later pad.
        second: String,
        /// Edge-to-edge clearance; negative when overlapping.
        clearance: f64,
        /// Required minimum.
        minimum: f64,
    },
    /// Via pad diameter below the minimum.
    ViaDiameter {
        /// Via centre.
        position: Point,
        /// Pad diameter.
        diameter: f64,
        /// Required minimum.
        minimum: f64,
    },
    /// Via copper ring below the minimum.
    ViaAnnularRing {
        /// Via centre.
        position: Point,
        /// `(diameter - hole) / 2`.
        ring: f64,
        /// Required minimum.
        minimum: f64,
    },
    /// Via drill below the minimum through hole.
    ViaDrill {
        /// Via centre.
        position: Point,
        /// Drill diameter.
        hole: f64,
        /// Required minimum.
        minimum: f64,
    },
    /// Hole drill below the minimum through hole.
    HoleDrill {
        /// Hole centre.
        position: Point,
        /// Drill diameter.
        diameter: f64,
        /// Required minimum.
        minimum: f64,
    },
    /// Plated hole annulus below the minimum annular ring.
    HoleAnnularRing {
        /// Hole centre.
        position: Point,
        /// Declared annulus.
        annulus: f64,
        /// Required minimum.
        minimum: f64,
    },
    /// Two drills too close together.
    HoleToHole {
        /// Earlier drill centre.
        first: Point,
        /// Later drill centre.
        second: Point,
        /// Edge-to-edge clearance.
        clearance: f64,
        /// Required minimum.
        minimum: f64,
    },
    /// Silkscreen text too small.
    TextHeight {
        /// Annotation content.
        text: String,
        /// Character height.
        height: f64,
        /// Required minimum.
        minimum: f64,
    },
    /// Silkscreen stroke too thin.
    TextThickness {
        /// Annotation content.
        text: String,
        /// Stroke thickness.
        thickness: f64,
        /// Required minimum.
        minimum: f64,
    },
}

struct At(Point);

impl fmt::Display for At {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.0.x, self.0.y)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TraceWidth {
                layer,
                path,
                width,
                minimum,
            } => {
                let what = if *path { "Trace path" } else { "Trace" };
                write!(
                    f,
                    "{what} on {layer} width {width}mm below minimum {minimum}mm"
                )
            }
            Self::PadClearance {
                first,
                second,
                clearance,
                minimum,
            } => write!(
                f,
                "Pad clearance between {first} and {second} is {clearance:.3}mm; minimum {minimum}mm"
            ),
            Self::ViaDiameter {
                position,
                diameter,
                minimum,
            } => write!(
                f,
                "Via at {} diameter {diameter}mm below minimum {minimum}mm",
                At(*position)
            ),
            Self::ViaAnnularRing {
                position,
                ring,
                minimum,
            } => write!(
                f,
                "Via at {} annular ring {ring:.3}mm below minimum {minimum}mm",
                At(*position)
            ),
            Self::ViaDrill {
                position,
                hole,
                minimum,
            } => write!(
                f,
                "Via at {} drill {hole}mm below minimum through hole {minimum}mm",
                At(*position)
            ),
            Self::HoleDrill {
                position,
                diameter,
                minimum,
            } => write!(
                f,
                "Hole at {} diameter {diameter}mm below minimum through hole {minimum}mm",
                At(*position)
            ),
            Self::HoleAnnularRing {
                position,
                annulus,
                minimum,
            } => write!(
                f,
                "Hole at {} annular ring {annulus}mm below minimum {minimum}mm",
                At(*position)
            ),
            Self::HoleToHole {
                first,
                second,
                clearance,
                minimum,
            } => write!(
                f,
                "Hole to hole clearance between {} and {} is {clearance:.3}mm; minimum {minimum}mm",
                At(*first),
                At(*second)
            ),
            Self::TextHeight {
                text,
                height,
                minimum,
            } => write!(
                f,
                "Text '{text}' height {height}mm below minimum {minimum}mm"
            ),
            Self::TextThickness {
                text,
                thickness,
                minimum,
            } => write!(
                f,
                "Text '{text}' thickness {thickness}mm below minimum {minimum}mm"
            ),
        }
    }
}

/// Runs every check and returns the violations in report order.
pub fn check_board(board: &Board, thresholds: &DrcThresholds) -> Vec<Violation> {
    let mut violations = Vec::new();
    check_trace_widths(board, thresholds.min_trace_width, &mut violations);
    check_pad_clearance(board, thresholds.min_clearance, &mut violations);
    check_extra_rules(board, &thresholds.extra, &mut violations);

    if violations.is_empty() {
        log::info!("{}: design rule check passed", board.name());
    } else {
        log::info!(
            "{}: design rule check found {} violation(s)",
            board.name(),
            violations.len()
        );
    }
    violations
}

fn check_trace_widths(board: &Board, minimum: f64, out: &mut Vec<Violation>) {
    for layer in board.layers() {
        for feature in layer.strokes() {
            let width = feature.effective_width();
            if width < minimum {
                out.push(Violation::TraceWidth {
                    layer: layer.name().to_string(),
                    path: feature.kind == FeatureKind::TracePath,
                    width,
                    minimum,
                });
            }
        }
    }
}

fn check_pad_clearance(board: &Board, minimum: f64, out: &mut Vec<Violation>) {
    let pads: Vec<&Pad> = board
        .components()
        .flat_map(Component::pads)
        .collect();

    for (idx, first) in pads.iter().enumerate() {
        for second in pads.iter().skip(idx + 1) {
            if first.component == second.component {
                continue;
            }
            let clearance = first.clearance_to(second);
            if clearance < minimum {
                out.push(Violation::PadClearance {
                    first: first.identifier(),
                    second: second.identifier(),
                    clearance,
                    minimum,
                });
            }
        }
    }
}

fn check_extra_rules(board: &Board, rules: &ExtraRules, out: &mut Vec<Violation>) {
    if let Some(minimum) = rules.min_via_diameter {
        out.extend(
            board
                .vias()
                .iter()
                .filter(|via| via.diameter < minimum)
                .map(|via| Violation::ViaDiameter {
                    position: via.position,
                    diameter: via.diameter,
                    minimum,
                }),
        );
    }
    if let Some(minimum) = rules.min_annular_ring {
        out.extend(board.vias().iter().filter_map(|via| {
            let ring = via.annular_ring();
            (ring < minimum).then_some(Violation::ViaAnnularRing {
                position: via.position,
                ring,
                minimum,
            })
        }));
    }
    if let Some(minimum) = rules.min_through_hole {
        out.extend(
            board
                .vias()
                .iter()
                .filter(|via| via.hole < minimum)
                .map(|via| Violation::ViaDrill {
                    position: via.position,
                    hole: via.hole,
                    minimum,
                }),
        );
        out.extend(
            board
                .holes()
                .iter()
                .filter(|hole| hole.diameter < minimum)
                .map(|hole| Violation::HoleDrill {
                    position: hole.position,
                    diameter: hole.diameter,
                    minimum,
                }),
        );
    }
    if let Some(minimum) = rules.min_annular_ring {
        out.extend(board.holes().iter().filter_map(|hole| {
            hole.annulus
                .filter(|&annulus| annulus < minimum)
                .map(|annulus| Violation::HoleAnnularRing {
                    position: hole.position,
                    annulus,
                    minimum,
                })
        }));
    }

    if let Some(minimum) = rules.hole_to_hole_clearance {
        check_hole_to_hole(board, minimum, out);
    }

    if let Some(minimum) = rules.min_text_height {
        out.extend(
            board
                .texts()
                .iter()
                .filter(|text| text.height < minimum)
                .map(|text| Violation::TextHeight {
                    text: text.text.clone(),
                    height: text.height,
                    minimum,
                }),
        );
    }
    if let Some(minimum) = rules.min_text_thickness {
        out.extend(
            board
                .texts()
                .iter()
                .filter(|text| text.thickness < minimum)
                .map(|text| Violation::TextThickness {
                    text: text.text.clone(),
                    thickness: text.thickness,
                    minimum,
                }),
        );
    }
}

/// Edge-to-edge drill spacing; vias come before holes.
fn check_hole_to_hole(board: &Board, minimum: f64, out: &mut Vec<Violation>) {
    let drills: Vec<(Point, f64)> = board
        .vias()
        .iter()
        .map(|via| (via.position, via.hole / 2.0))
        .chain(board.holes().iter().map(|hole| (hole.position, hole.radius())))
        .collect();

    for (idx, &(a, ra)) in drills.iter().enumerate() {
        for &(b, rb) in drills.iter().skip(idx + 1) {
            let clearance = a.distance(b) - ra - rb;
            if clearance < minimum {
                out.push(Violation::HoleToHole {
                    first: a,
                    second: b,
                    clearance,
                    minimum,
                });
            }
        }
    }
}
