//! Manufacturing output: one Gerber file per layer plus an Excellon drill
//! file, gated by the design rule check.

pub mod excellon;
pub mod gerber;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::ExportError;

pub use excellon::{drill_holes, render_drill, tool_table, DrillHole, ToolDefinition};
pub use gerber::render_layer;

/// File name of the drill file inside the output directory.
pub const DRILL_FILE: &str = "drill.drl";

/// Export switches.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Write files even when the design rule check fails.
    pub skip_drc: bool,
    /// Overrides the tier's minimum trace width.
    pub min_trace_width: Option<f64>,
    /// Overrides the tier's minimum clearance.
    pub min_clearance: Option<f64>,
}

/// Writes `{layer}.gbr` for every layer and, when the board has drills,
/// [`DRILL_FILE`] into `dir`. Returns the written paths in order.
///
/// # Errors
///
/// Returns [`ExportError::Drc`] when the board fails its rule check and
/// `skip_drc` is not set, or [`ExportError::Io`] when a file or the
/// directory cannot be written.
pub fn export_board(
    board: &Board,
    dir: &Path,
    options: &ExportOptions,
) -> Result<Vec<PathBuf>, ExportError> {
    if options.skip_drc {
        log::warn!("{}: exporting without design rule check", board.name());
    } else {
        board.design_rule_check(options.min_trace_width, options.min_clearance)?;
    }

    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    for layer in board.layers() {
        let path = dir.join(format!("{}.gbr", layer.name()));
        write_file(&path, &render_layer(layer))?;
        written.push(path);
    }

    let holes = drill_holes(board);
    if !holes.is_empty() {
        let path = dir.join(DRILL_FILE);
        write_file(&path, &render_drill(&holes))?;
        written.push(path);
    }

    log::info!(
        "{}: wrote {} file(s) to {}",
        board.name(),
        written.len(),
        dir.display()
    );
    Ok(written)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    log::debug!("writing {}", path.display());
    fs::write(path, contents).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
