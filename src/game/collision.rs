//! Grid-based collision detection and resolution for the actor.
//!
//! # Overview
//!
//! The actor is an axis-aligned cube of half extent `actor_half_extent`. Instead of
//! testing box against box, every obstacle's box is grown by that half extent (a Minkowski
//! sum) and the actor's center point is tested against the grown box.
//!
//! # Core Components
//!
//! * [`AABB`] - Axis-Aligned Bounding Box, the fundamental collision primitive
//! * [`WorldObject`] - Named static body (enemy box, exit marker)
//! * [`Resolution`] - Outcome of one candidate move
//! * [`CollisionSystem`] - Resolves a candidate position against the maze and the objects
//!
//! # How the System Works
//!
//! 1. The candidate position is mapped to its grid cell.
//! 2. The 3x3 neighbourhood of cells is scanned row by row. The first WALL cell whose
//!    grown box contains the candidate decides the outcome.
//! 3. If no wall matched, each world object is tested the same way, in order.
//! 4. A contact at or above the obstacle's top (minus `landing_epsilon`) is a landing:
//!    the candidate is snapped onto the top and the move goes through. Any other contact
//!    blocks the move.
//!
//! Cells outside the grid never collide. Room bounds are enforced by the caller.

use crate::config::LevelDescriptor;
use crate::math::Vec3;
use crate::maze::generator::{Cell, CellState, Maze};

/// Small gap left between a pushed-out actor and the face it was pushed to.
const PUSH_OUT_SKIN: f32 = 1e-3;

/// Axis-Aligned Bounding Box (AABB) for collision and ray queries.
///
/// An AABB is a rectangular box whose faces are aligned with the world coordinate axes.
/// It is defined by two points: the minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    /// Creates a new AABB from minimum and maximum corner points.
    ///
    /// # Example
    /// ```
    /// use corridor::game::collision::AABB;
    /// use corridor::math::Vec3;
    ///
    /// let bbox = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0));
    /// assert_eq!(bbox.center(), Vec3::new(0.5, 1.0, 1.5));
    /// ```
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates an AABB from its center and half extents.
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Returns this box grown by `margin` on every side.
    ///
    /// Growing an obstacle by the actor's half extent turns a box-box overlap test
    /// into a point containment test.
    pub fn expanded(&self, margin: f32) -> Self {
        let grow = Vec3::new(margin, margin, margin);
        Self::new(self.min - grow, self.max + grow)
    }

    /// Checks if a point lies inside the box, faces included.
    pub fn contains(&self, point: Vec3) -> bool {
        point.x() >= self.min.x()
            && point.x() <= self.max.x()
            && point.y() >= self.min.y()
            && point.y() <= self.max.y()
            && point.z() >= self.min.z()
            && point.z() <= self.max.z()
    }

    /// Calculates the center point of the AABB.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Distance along a ray to the box surface, using the slab method.
    ///
    /// `direction` must be normalized. When the origin is outside the box this is the
    /// entry distance; when it is inside, the exit distance (the box acts as a shell).
    /// Returns `None` when the ray misses or the box lies behind the origin.
    pub fn ray_distance(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let origin = origin.as_array();
        let direction = direction.as_array();
        let (min, max) = (self.min.as_array(), self.max.as_array());

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        for axis in 0..3 {
            if direction[axis].abs() < f32::EPSILON {
                if origin[axis] < min[axis] || origin[axis] > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / direction[axis];
            let mut t0 = (min[axis] - origin[axis]) * inv;
            let mut t1 = (max[axis] - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        if t_far < 0.0 {
            None
        } else if t_near >= 0.0 {
            Some(t_near)
        } else {
            Some(t_far)
        }
    }

    /// Smallest horizontal translation that moves `point` out of the box, plus a skin.
    pub fn horizontal_push_out(&self, point: Vec3) -> Vec3 {
        let candidates = [
            Vec3::new(self.min.x() - point.x() - PUSH_OUT_SKIN, 0.0, 0.0),
            Vec3::new(self.max.x() - point.x() + PUSH_OUT_SKIN, 0.0, 0.0),
            Vec3::new(0.0, 0.0, self.min.z() - point.z() - PUSH_OUT_SKIN),
            Vec3::new(0.0, 0.0, self.max.z() - point.z() + PUSH_OUT_SKIN),
        ];
        candidates
            .into_iter()
            .min_by(|a, b| a.length().total_cmp(&b.length()))
            .unwrap_or(Vec3::ZERO)
    }
}

/// A named static body the actor can bump into or stand on.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldObject {
    pub name: String,
    pub position: Vec3,
    pub half_extents: Vec3,
}

impl WorldObject {
    /// Creates an object centered at `position` with the given full `size`.
    pub fn new(name: impl Into<String>, position: Vec3, size: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            position,
            half_extents: Vec3::from(size) * 0.5,
        }
    }

    pub fn bounds(&self) -> AABB {
        AABB::from_center(self.position, self.half_extents)
    }
}

/// What the actor touched.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactTarget {
    Wall(Cell),
    Object(String),
}

/// How the actor touched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Supportive contact from above; the actor now stands on the surface.
    Landing,
    /// Blocking contact from the side or below.
    Side,
}

/// The obstacle that decided a resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub target: ContactTarget,
    pub kind: ContactKind,
    /// World-space center of the obstacle.
    pub center: Vec3,
}

impl Contact {
    /// Human readable obstacle name for log lines.
    pub fn label(&self) -> String {
        match &self.target {
            ContactTarget::Wall(cell) => format!("Wall at maze[{}][{}]", cell.row, cell.col),
            ContactTarget::Object(name) => match self.kind {
                ContactKind::Landing => format!("{} (landed on top)", name),
                ContactKind::Side => name.clone(),
            },
        }
    }

    pub fn is_object(&self, name: &str) -> bool {
        matches!(&self.target, ContactTarget::Object(n) if n == name)
    }
}

/// Outcome of resolving one candidate position.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The candidate must not be committed.
    pub blocked: bool,
    /// Candidate after landing snap; equals the candidate otherwise.
    pub position: Vec3,
    /// The actor landed on a wall top or object top this tick.
    pub grounded: bool,
    /// The actor landed on a world object this tick.
    pub on_top_of_object: bool,
    pub contact: Option<Contact>,
    /// For blocking contacts: the horizontal translation that clears the obstacle.
    pub push_out: Option<Vec3>,
}

impl Resolution {
    fn clear(position: Vec3) -> Self {
        Self {
            blocked: false,
            position,
            grounded: false,
            on_top_of_object: false,
            contact: None,
            push_out: None,
        }
    }
}

/// Resolves candidate actor positions against maze walls and world objects.
///
/// # How To Use
///
/// 1. Create a `CollisionSystem` with the actor's half extent
/// 2. For each proposed move, call [`CollisionSystem::resolve`]
/// 3. Commit `resolution.position` unless `resolution.blocked`
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionSystem {
    pub actor_half_extent: f32,
    pub landing_epsilon: f32,
}

impl CollisionSystem {
    pub fn new(actor_half_extent: f32, landing_epsilon: f32) -> Self {
        Self {
            actor_half_extent,
            landing_epsilon,
        }
    }

    /// World-space box of a wall cell: the full cell footprint, floor to wall top.
    pub fn wall_bounds(&self, cell: Cell, level: &LevelDescriptor) -> AABB {
        let mapping = level.grid_mapping();
        let center = mapping.cell_center(cell, level.wall_height / 2.0);
        let half = Vec3::new(
            level.cell_size / 2.0,
            level.wall_height / 2.0,
            level.cell_size / 2.0,
        );
        AABB::from_center(center, half)
    }

    /// Resolves `candidate` against the walls around it, then against `objects`.
    ///
    /// Exactly one contact decides the outcome; walls are checked first in row-major
    /// order over the 3x3 neighbourhood, then objects in slice order.
    pub fn resolve(
        &self,
        candidate: Vec3,
        maze: &Maze,
        level: &LevelDescriptor,
        objects: &[WorldObject],
    ) -> Resolution {
        let (row, col) = level.grid_mapping().world_to_grid(candidate);

        for dz in -1..=1 {
            for dx in -1..=1 {
                let (r, c) = (row + dz, col + dx);
                if maze.get_signed(r, c) != Some(CellState::Wall) {
                    continue;
                }
                let cell = Cell::new(r as usize, c as usize);
                let bounds = self.wall_bounds(cell, level);
                if let Some(resolution) =
                    self.test_obstacle(candidate, &bounds, ContactTarget::Wall(cell))
                {
                    return resolution;
                }
            }
        }

        for object in objects {
            let target = ContactTarget::Object(object.name.clone());
            if let Some(resolution) = self.test_obstacle(candidate, &object.bounds(), target) {
                return resolution;
            }
        }

        Resolution::clear(candidate)
    }

    fn test_obstacle(
        &self,
        candidate: Vec3,
        bounds: &AABB,
        target: ContactTarget,
    ) -> Option<Resolution> {
        let grown = bounds.expanded(self.actor_half_extent);
        if !grown.contains(candidate) {
            return None;
        }

        let top = bounds.max.y();
        let is_object = matches!(target, ContactTarget::Object(_));
        let center = bounds.center();

        if candidate.y() >= top - self.landing_epsilon {
            return Some(Resolution {
                blocked: false,
                position: candidate.with_y(top + self.actor_half_extent),
                grounded: true,
                on_top_of_object: is_object,
                contact: Some(Contact {
                    target,
                    kind: ContactKind::Landing,
                    center,
                }),
                push_out: None,
            });
        }

        Some(Resolution {
            blocked: true,
            position: candidate,
            grounded: false,
            on_top_of_object: false,
            contact: Some(Contact {
                target,
                kind: ContactKind::Side,
                center,
            }),
            push_out: Some(grown.horizontal_push_out(candidate)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MazeDimensions;

    /// A 5x5 room of open cells ringed by walls, with one pillar at (2, 3).
    fn test_level() -> (LevelDescriptor, Maze) {
        let level = LevelDescriptor {
            name: "collision".to_string(),
            maze: MazeDimensions {
                width: 5,
                height: 5,
            },
            wall_height: 4.0,
            cell_size: 5.0,
            world_offset: 0.0,
            start: [7.5, 1.0, 7.5],
            exit: [17.5, 1.0, 17.5],
            enemies: vec![],
        };
        let maze = Maze::parse(
            "#####\n#  ##\n#   #\n#   #\n#####",
            Cell::new(1, 1),
            Cell::new(3, 3),
        )
        .unwrap();
        (level, maze)
    }

    fn system() -> CollisionSystem {
        CollisionSystem::new(0.5, 0.01)
    }

    /// Tests that standing still in the middle of an open cell collides with nothing.
    #[test]
    fn test_open_cell_is_not_blocked() {
        let (level, maze) = test_level();
        let resolution = system().resolve(Vec3::new(7.5, 1.0, 7.5), &maze, &level, &[]);
        assert!(!resolution.blocked);
        assert!(!resolution.grounded);
        assert!(resolution.contact.is_none());
        assert_eq!(resolution.position, Vec3::new(7.5, 1.0, 7.5));
    }

    /// Tests that a candidate within the half extent of a wall face is blocked.
    #[test]
    fn test_wall_within_half_extent_blocks() {
        let (level, maze) = test_level();
        // Wall (1, 3) spans x in [15, 20]; grown face at 14.5.
        let resolution = system().resolve(Vec3::new(14.6, 1.0, 7.5), &maze, &level, &[]);
        assert!(resolution.blocked);
        assert_eq!(
            resolution.contact.as_ref().map(|c| &c.target),
            Some(&ContactTarget::Wall(Cell::new(1, 3)))
        );
        let pushed = resolution.position + resolution.push_out.unwrap();
        assert!(pushed.x() < 14.5);
        assert_eq!(pushed.z(), 7.5);
    }

    /// Tests that a candidate just outside the grown face is free.
    #[test]
    fn test_wall_beyond_half_extent_is_free() {
        let (level, maze) = test_level();
        let resolution = system().resolve(Vec3::new(14.4, 1.0, 7.5), &maze, &level, &[]);
        assert!(!resolution.blocked);
    }

    /// Tests landing on a wall top snaps the actor onto it.
    #[test]
    fn test_landing_on_wall_top() {
        let (level, maze) = test_level();
        let resolution = system().resolve(Vec3::new(17.5, 4.2, 7.5), &maze, &level, &[]);
        assert!(!resolution.blocked);
        assert!(resolution.grounded);
        assert!(!resolution.on_top_of_object);
        assert_eq!(resolution.position.y(), 4.5);
        assert_eq!(resolution.contact.unwrap().kind, ContactKind::Landing);
    }

    /// Tests landing on and bumping into a world object.
    #[test]
    fn test_object_landing_and_side_contact() {
        let (level, maze) = test_level();
        let objects = [WorldObject::new("enemy_0", Vec3::new(10.0, 1.1, 12.5), [2.0, 2.2, 2.0])];

        let landing = system().resolve(Vec3::new(10.2, 2.5, 12.5), &maze, &level, &objects);
        assert!(landing.grounded && landing.on_top_of_object && !landing.blocked);
        assert!((landing.position.y() - 2.7).abs() < 1e-5);
        assert_eq!(landing.contact.unwrap().label(), "enemy_0 (landed on top)");

        let side = system().resolve(Vec3::new(8.6, 1.0, 12.5), &maze, &level, &objects);
        assert!(side.blocked && !side.on_top_of_object);
        assert!(side.contact.unwrap().is_object("enemy_0"));
    }

    /// Tests that walls win over objects when both contain the candidate.
    #[test]
    fn test_walls_checked_before_objects() {
        let (level, maze) = test_level();
        let objects = [WorldObject::new("exit", Vec3::new(5.0, 1.0, 7.5), [2.0, 2.0, 2.0])];
        let resolution = system().resolve(Vec3::new(5.2, 1.0, 7.5), &maze, &level, &objects);
        assert!(matches!(
            resolution.contact.unwrap().target,
            ContactTarget::Wall(_)
        ));
    }

    /// Tests that positions beyond the grid never collide.
    #[test]
    fn test_out_of_grid_is_free() {
        let (level, maze) = test_level();
        let resolution = system().resolve(Vec3::new(-30.0, 1.0, -30.0), &maze, &level, &[]);
        assert!(!resolution.blocked);
        assert!(resolution.contact.is_none());
    }

    /// Tests ray distances from outside and inside a box.
    #[test]
    fn test_ray_distance_entry_and_shell() {
        let bbox = AABB::new(Vec3::new(-5.0, 0.0, -5.0), Vec3::new(5.0, 10.0, 5.0));
        let outside = bbox.ray_distance(Vec3::new(-20.0, 5.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(outside, Some(15.0));
        let inside = bbox.ray_distance(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(inside, Some(2.0));
        let behind = bbox.ray_distance(Vec3::new(-20.0, 5.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(behind, None);
    }
}
