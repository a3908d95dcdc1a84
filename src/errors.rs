//! Error types for session start-up.
//!
//! Every error here is fatal to session initialization. Nothing in the per-frame
//! tick loop returns an error: collision treats out-of-range lookups as open space
//! and diagnostics report missing scene content as log anomalies.

use std::path::PathBuf;

use thiserror::Error;

use crate::maze::generator::Cell;

/// Failures while generating or loading a maze grid.
#[derive(Debug, Error)]
pub enum MazeError {
    #[error("maze must be at least 3x3 cells, got {width}x{height}")]
    TooSmall { width: usize, height: usize },
    #[error("{role} cell {cell} lies outside a {width}x{height} maze")]
    CellOutOfBounds {
        role: &'static str,
        cell: Cell,
        width: usize,
        height: usize,
    },
    #[error("maze grid is malformed: {0}")]
    Malformed(String),
}

/// Failures while reading or validating a level descriptor.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse level descriptor: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid level descriptor: {0}")]
    Invalid(String),
}

/// Failures that abort session initialization.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("level descriptor missing")]
    MissingLevel,
    #[error("scene backend missing")]
    MissingScene,
    #[error("maze source missing")]
    MissingMazeSource,
    #[error("render surface is not attached to the scene backend")]
    MissingRenderSurface,
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Maze(#[from] MazeError),
}
