//! Cardinal directions on the maze grid.
//!
//! The maze generator steps two cells at a time along these directions and the
//! enclosure check casts one horizontal ray along each of them.

use crate::math::Vec3;

/// Enum representing cardinal directions in the maze
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards decreasing rows (world -Z)
    North,
    /// Towards increasing columns (world +X)
    East,
    /// Towards increasing rows (world +Z)
    South,
    /// Towards decreasing columns (world -X)
    West,
}

impl Direction {
    /// All four directions in enclosure-scan order (+X, -X, +Z, -Z).
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    /// Grid step as `(row_delta, col_delta)`.
    pub fn grid_step(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    /// Horizontal unit vector in world space.
    pub fn unit_vector(self) -> Vec3 {
        match self {
            Direction::North => Vec3::new(0.0, 0.0, -1.0),
            Direction::East => Vec3::new(1.0, 0.0, 0.0),
            Direction::South => Vec3::new(0.0, 0.0, 1.0),
            Direction::West => Vec3::new(-1.0, 0.0, 0.0),
        }
    }
}
