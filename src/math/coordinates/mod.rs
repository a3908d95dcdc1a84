//! Coordinate system transformations for the maze.
//!
//! This module provides utilities to convert between the coordinate systems used by the
//! simulation:
//! - Maze Grid Coordinates: rows/columns of the occupancy grid
//! - World Coordinates: 3D space where the actor moves (x, y, z)
//!
//! Grid columns run along world X and grid rows run along world Z. The vertical axis is Y.

mod positions;
mod transformations;

pub use positions::*;
pub use transformations::*;
