//! Error types for board construction, rule checking and export.

use std::path::PathBuf;

use thiserror::Error;

/// Lookup and contract failures raised by [`crate::Board`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// No component is registered under the given reference.
    #[error("component {0} not found")]
    UnknownComponent(String),

    /// The component exists but has no pin with that name.
    #[error("pin {pin} not found on {reference}")]
    UnknownPin {
        /// Component reference designator.
        reference: String,
        /// Requested pin name.
        pin: String,
    },

    /// A pin reference string is not of the form `REF:PIN`.
    #[error("pin reference must be 'REF:PIN', got `{0}`")]
    MalformedPinReference(String),

    /// A component with this reference is already placed on the board.
    #[error("component {0} already exists")]
    DuplicateReference(String),

    /// The named layer is not part of the layer stack.
    #[error("layer {0} is not in the layer stack")]
    UnknownLayer(String),

    /// A polygon has too few distinct vertices to enclose an area.
    #[error("polygon needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),
}

/// Failure of the design rule check when used as a precondition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrcError {
    /// One or more rules were violated; carries every violation message.
    #[error("design rule check failed with {} violation(s): {}", .0.len(), .0.join("; "))]
    Violations(Vec<String>),
}

/// Errors decoding the textual move/draw instruction format.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The instruction text does not match `X<int>Y<int>D0<1|2>`.
    #[error("malformed instruction `{0}`")]
    Malformed(String),

    /// A coordinate field is not a valid integer.
    #[error("invalid {axis} coordinate `{raw}`")]
    InvalidCoordinate {
        /// Axis label, `X` or `Y`.
        axis: char,
        /// The offending field text.
        raw: String,
    },

    /// The operation code is neither `D01` nor `D02`.
    #[error("unsupported operation code `{0}`")]
    UnsupportedOperation(String),
}

/// Errors loading a manufacturing ruleset.
#[derive(Debug, Error)]
pub enum RulesError {
    /// The ruleset document could not be parsed.
    #[error("invalid ruleset: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors loading a board configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("invalid board configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors writing manufacturing output.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The board failed its design rule check.
    #[error(transparent)]
    Drc(#[from] DrcError),

    /// An output file could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
