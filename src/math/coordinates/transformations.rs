//! Coordinate system transformations between grid cells and world positions.
//!
//! This module provides functions to convert between maze grid coordinates and
//! world coordinates, making it clear how to map between these systems.

use crate::math::Vec3;
use crate::maze::generator::Cell;

/// Linear mapping between world X/Z and grid columns/rows.
///
/// A world coordinate maps to the grid index `floor((coord - offset) / cell_size)`.
/// The same offset applies to both horizontal axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapping {
    /// Edge length of one cell in world units.
    pub cell_size: f32,
    /// World coordinate of the grid's outer edge on both X and Z.
    pub offset: f32,
}

impl GridMapping {
    pub fn new(cell_size: f32, offset: f32) -> Self {
        Self { cell_size, offset }
    }

    /// Converts a world position to signed `(row, col)` grid indices.
    ///
    /// The result may lie outside the maze; callers decide how to treat that.
    /// The Y coordinate is ignored since the grid is 2D.
    pub fn world_to_grid(&self, position: Vec3) -> (i64, i64) {
        let col = ((position.x() - self.offset) / self.cell_size).floor() as i64;
        let row = ((position.z() - self.offset) / self.cell_size).floor() as i64;
        (row, col)
    }

    /// Converts a world position to a cell, or `None` when it falls outside a
    /// `width` x `height` grid.
    pub fn world_to_cell(&self, position: Vec3, width: usize, height: usize) -> Option<Cell> {
        let (row, col) = self.world_to_grid(position);
        if row < 0 || col < 0 || row >= height as i64 || col >= width as i64 {
            return None;
        }
        Some(Cell::new(row as usize, col as usize))
    }

    /// World-space center of a cell at the given height.
    pub fn cell_center(&self, cell: Cell, y: f32) -> Vec3 {
        Vec3::new(
            self.offset + cell.col as f32 * self.cell_size + self.cell_size / 2.0,
            y,
            self.offset + cell.row as f32 * self.cell_size + self.cell_size / 2.0,
        )
    }
}
