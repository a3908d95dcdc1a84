use tracing::debug;

use super::{
    LightInfo, LightKind, Ray, RayHit, RayTarget, RendererHealth, SceneBackend, SceneObject,
};
use crate::config::LevelDescriptor;
use crate::game::collision::WorldObject;
use crate::math::Vec3;
use crate::maze::generator::Maze;

/// Thickness of the floor and ceiling slabs.
const SLAB_THICKNESS: f32 = 0.1;
/// Triangles in one box mesh.
const BOX_TRIANGLES: u32 = 12;

/// In-memory scene made of axis-aligned boxes.
///
/// Rays against a box whose interior contains the origin report the distance to the
/// far face, so the `room` box behaves as a shell seen from inside.
#[derive(Debug, Clone)]
pub struct StaticScene {
    objects: Vec<SceneObject>,
    lights: Vec<LightInfo>,
    surface_attached: bool,
    context_lost: bool,
    antialias: bool,
    clear_color: u32,
}

impl Default for StaticScene {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticScene {
    /// An empty scene with an attached surface.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            surface_attached: true,
            context_lost: false,
            antialias: true,
            clear_color: 0x000000,
        }
    }

    /// An empty scene without a render surface.
    pub fn detached() -> Self {
        Self {
            surface_attached: false,
            ..Self::new()
        }
    }

    /// Adds an object, replacing any object with the same name.
    pub fn insert(&mut self, object: SceneObject) {
        match self.objects.iter_mut().find(|o| o.name == object.name) {
            Some(existing) => *existing = object,
            None => self.objects.push(object),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| o.name == name)?;
        Some(self.objects.remove(index))
    }

    pub fn add_light(&mut self, light: LightInfo) {
        self.lights.push(light);
    }

    pub fn clear_lights(&mut self) {
        self.lights.clear();
    }

    pub fn set_context_lost(&mut self, lost: bool) {
        self.context_lost = lost;
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn hit(object: &SceneObject, ray: &Ray) -> Option<RayHit> {
        object
            .bounds()
            .ray_distance(ray.origin, ray.direction)
            .map(|distance| RayHit {
                distance,
                object: object.name.clone(),
            })
    }
}

impl SceneBackend for StaticScene {
    fn load_level(&mut self, level: &LevelDescriptor, maze: &Maze, objects: &[WorldObject]) {
        self.objects.clear();
        self.lights.clear();

        let room = level.room_size();
        let half_room = room / 2.0;
        let center = level.world_offset + half_room;
        let mapping = level.grid_mapping();

        self.insert(SceneObject::new(
            "floor",
            Vec3::new(center, -SLAB_THICKNESS / 2.0, center),
            Vec3::new(half_room, SLAB_THICKNESS / 2.0, half_room),
        ));
        self.insert(SceneObject::new(
            "ceiling",
            Vec3::new(center, level.wall_height + SLAB_THICKNESS / 2.0, center),
            Vec3::new(half_room, SLAB_THICKNESS / 2.0, half_room),
        ));
        self.insert(SceneObject::new(
            "room",
            Vec3::new(center, level.wall_height / 2.0, center),
            Vec3::new(half_room, level.wall_height / 2.0, half_room),
        ));

        let wall_half = Vec3::new(
            level.cell_size / 2.0,
            level.wall_height / 2.0,
            level.cell_size / 2.0,
        );
        for cell in maze.wall_cells() {
            self.objects.push(SceneObject::new(
                format!("wall_{}_{}", cell.col, cell.row),
                mapping.cell_center(cell, level.wall_height / 2.0),
                wall_half,
            ));
        }

        for object in objects {
            self.insert(SceneObject::new(
                object.name.clone(),
                object.position,
                object.half_extents,
            ));
        }

        let start = level.start_position();
        self.add_light(LightInfo {
            name: "ambientLight".to_string(),
            kind: LightKind::Ambient,
            position: Vec3::ZERO,
            intensity: 1.0,
            color: 0x808080,
        });
        self.add_light(LightInfo {
            name: "pointLight".to_string(),
            kind: LightKind::Point,
            position: Vec3::new(start.x(), level.wall_height / 2.0, start.z()),
            intensity: 1.0,
            color: 0xffffff,
        });
        if let Some(enemy) = level.enemies.first() {
            self.add_light(LightInfo {
                name: "boxLight".to_string(),
                kind: LightKind::Point,
                position: Vec3::new(enemy.position[0], 3.0, enemy.position[2]),
                intensity: 0.5,
                color: 0xffffff,
            });
        }

        debug!(
            objects = self.objects.len(),
            lights = self.lights.len(),
            "static scene built"
        );
    }

    fn object(&self, name: &str) -> Option<SceneObject> {
        self.objects.iter().find(|o| o.name == name).cloned()
    }

    fn cast_ray(&self, ray: &Ray, target: RayTarget<'_>) -> Option<RayHit> {
        match target {
            RayTarget::Object(name) => self
                .objects
                .iter()
                .find(|o| o.name == name)
                .and_then(|o| Self::hit(o, ray)),
            RayTarget::All => self
                .objects
                .iter()
                .filter_map(|o| Self::hit(o, ray))
                .min_by(|a, b| a.distance.total_cmp(&b.distance)),
        }
    }

    fn lights(&self) -> Vec<LightInfo> {
        self.lights.clone()
    }

    fn renderer_health(&self) -> RendererHealth {
        let visible = self.objects.iter().filter(|o| o.visible).count() as u32;
        RendererHealth {
            surface_attached: self.surface_attached,
            context_lost: self.context_lost,
            antialias: self.antialias,
            clear_color: self.clear_color,
            draw_calls: visible,
            triangles: visible * BOX_TRIANGLES,
        }
    }
}
