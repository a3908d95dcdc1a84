//! The individual scene and state checks run by [`DiagnosticsEngine::observe`].
//!
//! Checks never fail. Missing scene content is reported as an anomaly entry.

use rand::Rng;
use tracing::warn;

use super::{Category, DiagnosticsEngine, Observation};
use crate::config::HistoricalMode;
use crate::math::coordinates::Direction;
use crate::math::Vec3;
use crate::maze::generator::Maze;
use crate::scene::{Ray, RayTarget, SceneBackend};

/// The six axis directions the visual check measures, with their names.
const SHELL_DIRECTIONS: [(&str, Vec3); 6] = [
    ("Right Wall", Vec3::new(1.0, 0.0, 0.0)),
    ("Left Wall", Vec3::new(-1.0, 0.0, 0.0)),
    ("Ceiling", Vec3::new(0.0, 1.0, 0.0)),
    ("Floor", Vec3::new(0.0, -1.0, 0.0)),
    ("Front Wall", Vec3::new(0.0, 0.0, 1.0)),
    ("Back Wall", Vec3::new(0.0, 0.0, -1.0)),
];

fn format_distance(distance: Option<f32>) -> String {
    match distance {
        Some(d) => format!("{d:.2}"),
        None => "N/A".to_string(),
    }
}

impl DiagnosticsEngine {
    /// Full state line: position, rotation, velocity and raw inputs.
    pub(crate) fn log_state(&mut self, observation: &Observation<'_>) {
        let actor = observation.actor;
        let controls = observation.controls;
        let rotation = Vec3::new(actor.pitch, actor.yaw, 0.0);
        let message = format!(
            "Camera Position: {} | Camera Rotation: {} | Velocity: {} | Inputs: W:{}, S:{}, A:{}, D:{}, Space:{}, Mouse: ({}, {})",
            actor.position,
            rotation,
            actor.velocity,
            controls.move_forward,
            controls.move_backward,
            controls.move_left,
            controls.move_right,
            actor.jump_requested,
            self.mouse_delta.0,
            self.mouse_delta.1,
        );
        self.log(Category::State, message);
    }

    pub(crate) fn log_summary_state(&mut self, observation: &Observation<'_>) {
        let actor = observation.actor;
        self.log_summary(
            Category::State,
            format!(
                "Camera Position: {} | Velocity: {}",
                actor.position, actor.velocity
            ),
        );
    }

    /// Measures the room shell along the six axes and looks for the visibility target.
    pub(crate) fn check_visual(&mut self, observation: &Observation<'_>, scene: &dyn SceneBackend) {
        let position = observation.actor.position;
        let room_name = self.config.room_object.clone();
        let Some(room) = scene.object(&room_name) else {
            self.log(
                Category::VisualBug,
                format!("{room_name} geometry not found in scene!"),
            );
            self.log_summary(Category::VisualBug, "Room missing");
            return;
        };

        self.log(
            Category::Visual,
            format!("Room detected at position: {}", room.position),
        );
        self.log_summary(Category::Visual, format!("Room at {}", room.position));

        let bounds = room.bounds();
        let expected = [
            bounds.max.x() - position.x(),
            position.x() - bounds.min.x(),
            bounds.max.y() - position.y(),
            position.y() - bounds.min.y(),
            bounds.max.z() - position.z(),
            position.z() - bounds.min.z(),
        ];

        for ((name, direction), expected) in SHELL_DIRECTIONS.into_iter().zip(expected) {
            let target = RayTarget::Object(&room_name);
            let hit = scene.cast_ray(&Ray::new(position, direction), target);
            let samples: Vec<Option<f32>> = (0..self.config.jitter_samples)
                .map(|_| {
                    let magnitude = self.config.jitter_magnitude;
                    let jitter = Vec3::new(
                        self.rng.gen_range(0.0..=magnitude),
                        self.rng.gen_range(0.0..=magnitude),
                        self.rng.gen_range(0.0..=magnitude),
                    );
                    scene
                        .cast_ray(&Ray::new(position, direction + jitter), target)
                        .map(|h| h.distance)
                })
                .collect();

            let Some(hit) = hit else {
                self.log(
                    Category::VisualBug,
                    format!("{name} not detected (distance: N/A)"),
                );
                self.log_summary(Category::VisualBug, format!("{name} missing"));
                continue;
            };

            let distance = hit.distance;
            if (distance - expected).abs() > self.config.distance_tolerance {
                self.log(
                    Category::VisualBug,
                    format!("{name} distance mismatch (distance: {distance:.2}, expected: {expected:.2})"),
                );
                self.log_summary(
                    Category::VisualBug,
                    format!("{name} distance off: {distance:.2}"),
                );
            } else {
                self.log(
                    Category::Visual,
                    format!("{name} detected at distance: {distance:.2}"),
                );
            }

            let variance: f32 = samples
                .iter()
                .map(|s| s.map_or(0.0, |d| (d - distance).abs()))
                .sum();
            if variance > self.config.variance_threshold {
                let listed: Vec<String> = samples.iter().map(|s| format_distance(*s)).collect();
                self.log(
                    Category::VisualBug,
                    format!(
                        "{name} possible z-fighting, distances: [{}]",
                        listed.join(", ")
                    ),
                );
            }
        }

        self.check_visibility(position, scene);
    }

    /// Casts a ray at the visibility target; it is visible when it is the first hit.
    fn check_visibility(&mut self, position: Vec3, scene: &dyn SceneBackend) {
        let target = self.config.visibility_target.clone();
        let Some(object) = scene.object(&target) else {
            return;
        };
        let ray = Ray::new(position, object.position - position);
        let hit = scene
            .cast_ray(&ray, RayTarget::All)
            .filter(|hit| hit.object == target);
        let state = if hit.is_some() { "Visible" } else { "Occluded" };
        self.log(
            Category::Visual,
            format!(
                "{target} visibility: {state}, distance: {}",
                format_distance(hit.map(|h| h.distance))
            ),
        );
    }

    pub(crate) fn check_performance(
        &mut self,
        observation: &Observation<'_>,
        scene: &dyn SceneBackend,
    ) {
        let delta = observation.frame_delta;
        let health = scene.renderer_health();
        let (fps, frame_time) = if delta > 0.0 {
            ((1.0 / delta).round() as u32, format!("{:.1}", delta * 1000.0))
        } else {
            (0, "N/A".to_string())
        };

        if delta > 0.0 && fps < self.config.low_fps_threshold {
            warn!(fps, "low frame rate");
            self.log(
                Category::Performance,
                format!("Low FPS ({fps}) - possible flashing or rendering issue"),
            );
            self.log_summary(Category::Performance, format!("Low FPS: {fps}"));
        }
        self.log(
            Category::Performance,
            format!(
                "FPS: {fps}, Frame Time: {frame_time}ms, Draw Calls: {}, Triangles: {}",
                health.draw_calls, health.triangles
            ),
        );
    }

    pub(crate) fn check_objects(&mut self, scene: &dyn SceneBackend) {
        for name in self.config.tracked_objects.clone() {
            match scene.object(&name) {
                Some(object) => self.log(
                    Category::Objects,
                    format!(
                        "{name} at {}, visible: {}, scale: {}",
                        object.position, object.visible, object.scale
                    ),
                ),
                None => self.log(Category::VisualBug, format!("{name} not found in scene!")),
            }
        }
    }

    pub(crate) fn check_lighting(&mut self, observation: &Observation<'_>, scene: &dyn SceneBackend) {
        let lights = scene.lights();
        for light in &lights {
            let distance = light.position.distance(&observation.actor.position);
            self.log(
                Category::Lighting,
                format!(
                    "{} at {}, intensity: {}, distance to camera: {distance:.2}",
                    light.kind, light.position, light.intensity
                ),
            );
        }
        if lights.is_empty() {
            self.log(Category::LightingBug, "No active lights in scene!");
        }
    }

    pub(crate) fn check_renderer(&mut self, scene: &dyn SceneBackend) {
        let health = scene.renderer_health();
        self.log(
            Category::Renderer,
            format!(
                "Context: {}, Surface: {}, Antialias: {}, ClearColor: {:06x}",
                if health.context_lost { "Lost" } else { "Active" },
                if health.surface_attached {
                    "Attached"
                } else {
                    "Detached"
                },
                health.antialias,
                health.clear_color
            ),
        );
    }

    /// Compares the newest detailed entries with the baseline at the same offsets.
    ///
    /// In [`HistoricalMode::OnNewEntry`] deviation entries are excluded from the
    /// compared window, and a window is only compared again once a new entry has
    /// arrived. [`HistoricalMode::EveryTick`] compares the newest entries on every call.
    pub(crate) fn check_historical(&mut self) {
        let Some(baseline) = self.detailed.baseline() else {
            return;
        };
        let window = baseline.len();
        let mode = self.config.historical_mode;
        let current: Vec<_> = self
            .detailed
            .iter()
            .rev()
            .filter(|e| mode == HistoricalMode::EveryTick || e.category != Category::Historical)
            .take(window)
            .collect();
        let Some(newest) = current.first() else {
            return;
        };
        if mode == HistoricalMode::OnNewEntry {
            if newest.seq <= self.historical_mark {
                return;
            }
            self.historical_mark = newest.seq;
        }

        let deviations: Vec<String> = baseline
            .iter()
            .zip(current.iter().rev())
            .filter(|(base, now)| base.message != now.message)
            .map(|(base, now)| format!("Deviation from baseline: {base} -> {now}"))
            .collect();
        for deviation in deviations {
            self.log(Category::Historical, deviation);
        }
    }

    /// Logs the percentage of wall cells to the secondary stream.
    pub(crate) fn check_maze_density(&mut self, maze: &Maze) {
        self.log_secondary(
            Category::MazeDebug,
            format!(
                "Wall density: {:.2}% (Walls: {}, Total: {})",
                maze.wall_density(),
                maze.wall_count(),
                maze.total_cells()
            ),
        );
    }

    /// Classifies each horizontal direction as open space or a nearby wall hit.
    pub(crate) fn check_enclosure(&mut self, observation: &Observation<'_>, scene: &dyn SceneBackend) {
        let position = observation.actor.position;
        for direction in Direction::ALL.map(Direction::unit_vector) {
            let hit = scene.cast_ray(&Ray::new(position, direction), RayTarget::All);
            let label = format!(
                "{:.2},{:.2},{:.2}",
                direction.x(),
                direction.y(),
                direction.z()
            );
            let message = match hit {
                Some(hit) if hit.distance <= self.config.open_distance => {
                    format!("Wall hit in {label} (dist: {:.2})", hit.distance)
                }
                Some(hit) => format!("Open space in {label} (dist: {:.2})", hit.distance),
                None => format!("Open space in {label} (dist: ∞)"),
            };
            self.log_secondary(Category::MazeDebug, message);
        }
    }
}
