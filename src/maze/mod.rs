//! Maze generation and grid representation.
//!
//! The [`generator`] module carves the occupancy grid the rest of the simulation runs on.

pub mod generator;

pub use generator::{Cell, CellState, Maze, MazeGenerator, MazeSource};
