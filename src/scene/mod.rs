//! Scene query surface.
//!
//! The simulation never builds or draws geometry itself. Whatever renders the level
//! implements [`SceneBackend`], a narrow host surface for object lookup, ray casts,
//! light enumeration and renderer health. [`StaticScene`] is the in-memory backend used
//! by the headless binary and by tests.

pub mod static_scene;

pub use static_scene::StaticScene;

use std::fmt;

use crate::config::LevelDescriptor;
use crate::game::collision::{AABB, WorldObject};
use crate::math::Vec3;
use crate::maze::generator::Maze;

/// A named object as reported by the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub position: Vec3,
    pub half_extents: Vec3,
    pub visible: bool,
    pub scale: Vec3,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, position: Vec3, half_extents: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
            half_extents,
            visible: true,
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    /// World-space bounds with scale applied.
    pub fn bounds(&self) -> AABB {
        let half = Vec3::new(
            self.half_extents.x() * self.scale.x(),
            self.half_extents.y() * self.scale.y(),
            self.half_extents.z() * self.scale.z(),
        );
        AABB::from_center(self.position, half)
    }
}

/// A ray with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }
}

/// Which objects a ray cast may hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayTarget<'a> {
    /// Only the named object.
    Object(&'a str),
    /// Every object in the scene; the nearest hit wins.
    All,
}

/// Nearest intersection of a ray cast.
#[derive(Debug, Clone, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub object: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Ambient,
    Point,
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LightKind::Ambient => "AmbientLight",
            LightKind::Point => "PointLight",
        };
        f.write_str(name)
    }
}

/// An active light source.
#[derive(Debug, Clone, PartialEq)]
pub struct LightInfo {
    pub name: String,
    pub kind: LightKind,
    pub position: Vec3,
    pub intensity: f32,
    /// Packed `0xRRGGBB`.
    pub color: u32,
}

/// Liveness and configuration of the graphics context.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererHealth {
    /// A render surface is attached; sessions refuse to start without one.
    pub surface_attached: bool,
    pub context_lost: bool,
    pub antialias: bool,
    /// Packed `0xRRGGBB`.
    pub clear_color: u32,
    pub draw_calls: u32,
    pub triangles: u32,
}

/// Narrow query surface the simulation and diagnostics depend on.
pub trait SceneBackend {
    /// Builds the level geometry. `objects` are the collision bodies (enemies, exit)
    /// the session created from the level.
    fn load_level(&mut self, level: &LevelDescriptor, maze: &Maze, objects: &[WorldObject]);

    /// Looks up an object by name.
    fn object(&self, name: &str) -> Option<SceneObject>;

    /// Casts a ray and returns the nearest hit, if any.
    fn cast_ray(&self, ray: &Ray, target: RayTarget<'_>) -> Option<RayHit>;

    /// Enumerates active light sources.
    fn lights(&self) -> Vec<LightInfo>;

    fn renderer_health(&self) -> RendererHealth;
}
