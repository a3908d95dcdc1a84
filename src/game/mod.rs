//! Session state management.
//!
//! This module defines [`Session`], which owns everything one play-through needs: the
//! level, the maze, the static world objects, the actor, the movement integrator, the
//! diagnostics engine and the scene backend. A session is built once through
//! [`SessionBuilder`] and then driven one [`Session::tick`] per display frame.

pub mod collision;
pub mod keys;
pub mod movement;
pub mod player;

use std::time::Duration;

use tracing::{debug, info};

use self::collision::{ContactKind, Resolution, WorldObject};
use self::keys::{ControlState, GameKey};
use self::movement::MovementIntegrator;
use self::player::ActorState;
use crate::config::{DiagnosticsConfig, LevelDescriptor, PhysicsConfig};
use crate::diagnostics::{DiagnosticsEngine, ExportAction, ExportDepth, Observation};
use crate::errors::{LevelError, SessionError};
use crate::math::Vec3;
use crate::maze::generator::{Maze, MazeSource};
use crate::scene::SceneBackend;

/// Name of the exit marker object.
pub const EXIT_OBJECT: &str = "exit";

/// Host events routed into the event log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    SceneLoaded,
    KeyDown(GameKey),
    KeyUp(GameKey),
    PointerLockRequested,
    PointerLockChanged { locked: bool },
    PointerMoved { dx: f32, dy: f32 },
    WindowResized { width: u32, height: u32 },
    ContextLost,
    ContextRestored,
}

/// Outcome of one session tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub frame: u64,
    /// Committed actor position.
    pub position: Vec3,
    pub resolution: Resolution,
    pub jumped: bool,
    pub pushed_out: Option<Vec3>,
    /// The actor touched the exit marker or stands in its cell.
    pub reached_exit: bool,
}

/// Builder for [`Session`]. Level, scene and maze source are required.
#[derive(Default)]
pub struct SessionBuilder {
    level: Option<LevelDescriptor>,
    scene: Option<Box<dyn SceneBackend>>,
    maze_source: Option<Box<dyn MazeSource>>,
    physics: PhysicsConfig,
    diagnostics: DiagnosticsConfig,
    seed: Option<u64>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LevelDescriptor) -> Self {
        self.level = Some(level);
        self
    }

    pub fn scene(mut self, scene: impl SceneBackend + 'static) -> Self {
        self.scene = Some(Box::new(scene));
        self
    }

    pub fn maze_source(mut self, source: impl MazeSource + 'static) -> Self {
        self.maze_source = Some(Box::new(source));
        self
    }

    pub fn physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }

    pub fn diagnostics(mut self, diagnostics: DiagnosticsConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Seeds the diagnostics ray jitter.
    pub fn diagnostics_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the level, generates the maze, builds the scene and starts the session.
    pub fn build(self) -> Result<Session, SessionError> {
        let level = self.level.ok_or(SessionError::MissingLevel)?;
        let mut scene = self.scene.ok_or(SessionError::MissingScene)?;
        let mut maze_source = self.maze_source.ok_or(SessionError::MissingMazeSource)?;
        if !scene.renderer_health().surface_attached {
            return Err(SessionError::MissingRenderSurface);
        }

        level.validate()?;
        let start = level
            .start_cell()
            .ok_or_else(|| LevelError::Invalid("start position is outside the maze".into()))?;
        let exit = level
            .exit_cell()
            .ok_or_else(|| LevelError::Invalid("exit position is outside the maze".into()))?;

        let maze = maze_source.generate_maze(level.maze.width, level.maze.height, start, exit)?;
        maze.validate()?;

        let physics = self.physics;
        let mut objects: Vec<WorldObject> = level
            .enemies
            .iter()
            .enumerate()
            .map(|(i, enemy)| {
                WorldObject::new(
                    format!("enemy_{i}"),
                    Vec3::from(enemy.position),
                    physics.enemy_size,
                )
            })
            .collect();
        objects.push(WorldObject::new(
            EXIT_OBJECT,
            level.exit_position(),
            physics.exit_size,
        ));

        scene.load_level(&level, &maze, &objects);

        let mut diagnostics = match self.seed {
            Some(seed) => DiagnosticsEngine::with_seed(self.diagnostics, seed),
            None => DiagnosticsEngine::new(self.diagnostics),
        };
        for (enemy, object) in level.enemies.iter().zip(&objects) {
            let [x, y, z] = enemy.position;
            diagnostics.log_event(format!("Enemy added at {x},{y},{z} as {}", object.name));
        }
        diagnostics.log_event("Exit added to scene");

        info!(
            level = %level.name,
            width = maze.width(),
            height = maze.height(),
            wall_density = maze.wall_density(),
            "session started"
        );
        debug!("maze layout:\n{maze}");

        let actor = ActorState::spawn(level.start_position());
        let mut session = Session {
            integrator: MovementIntegrator::new(physics),
            level,
            maze,
            objects,
            actor,
            diagnostics,
            scene,
            elapsed: Duration::ZERO,
            frame: 0,
            last_collision_log: None,
        };
        session.handle_event(SessionEvent::SceneLoaded);
        Ok(session)
    }
}

/// One play-through: simulation state plus its diagnostics.
pub struct Session {
    level: LevelDescriptor,
    maze: Maze,
    objects: Vec<WorldObject>,
    actor: ActorState,
    integrator: MovementIntegrator,
    diagnostics: DiagnosticsEngine,
    scene: Box<dyn SceneBackend>,
    elapsed: Duration,
    frame: u64,
    /// Session time of the last collision log line.
    last_collision_log: Option<Duration>,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn level(&self) -> &LevelDescriptor {
        &self.level
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn objects(&self) -> &[WorldObject] {
        &self.objects
    }

    pub fn actor(&self) -> &ActorState {
        &self.actor
    }

    /// Mutable actor access for hosts that teleport or respawn the actor.
    pub fn actor_mut(&mut self) -> &mut ActorState {
        &mut self.actor
    }

    pub fn diagnostics(&self) -> &DiagnosticsEngine {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticsEngine {
        &mut self.diagnostics
    }

    pub fn scene(&self) -> &dyn SceneBackend {
        self.scene.as_ref()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advances the simulation by one frame and lets diagnostics observe the result.
    ///
    /// `frame_delta` is the raw time since the previous frame in seconds; the
    /// integrator clamps it, diagnostics report it as is.
    pub fn tick(&mut self, controls: &ControlState, frame_delta: f32) -> TickReport {
        let physics = self.integrator.physics();
        self.actor.apply_controls(
            controls,
            physics.mouse_sensitivity,
            physics.pitch_limit,
            physics.floor_height,
            physics.landing_epsilon,
        );
        let allow_push_out = self.elapsed < physics.spawn_grace;
        let was_on_object = self.actor.on_object;

        let step = self.integrator.tick(
            &mut self.actor,
            &self.maze,
            &self.level,
            &self.objects,
            frame_delta,
            allow_push_out,
        );
        self.elapsed += Duration::try_from_secs_f32(frame_delta.max(0.0)).unwrap_or_default();
        self.frame += 1;

        if step.jumped {
            self.diagnostics.log_event("Jump initiated");
        }
        if let Some(position) = step.pushed_out {
            self.diagnostics
                .log_event(format!("Pushed out to {position}"));
        }
        self.log_contact(&step.resolution, was_on_object);

        let observation = Observation {
            elapsed: self.elapsed,
            frame_delta,
            actor: &self.actor,
            controls,
            maze: &self.maze,
        };
        self.diagnostics.observe(&observation, self.scene.as_ref());

        TickReport {
            frame: self.frame,
            position: self.actor.position,
            reached_exit: self.reached_exit(&step.resolution),
            resolution: step.resolution,
            jumped: step.jumped,
            pushed_out: step.pushed_out,
        }
    }

    /// Logs the tick's contact, at most once per throttle interval.
    ///
    /// Landing on an object is only logged on the tick the actor starts standing on it.
    fn log_contact(&mut self, resolution: &Resolution, was_on_object: bool) {
        let Some(contact) = &resolution.contact else {
            return;
        };
        if contact.kind == ContactKind::Landing && resolution.on_top_of_object && was_on_object {
            return;
        }
        let interval = self.integrator.physics().collision_log_interval;
        let due = self
            .last_collision_log
            .is_none_or(|last| self.elapsed.saturating_sub(last) >= interval);
        if !due {
            return;
        }
        self.last_collision_log = Some(self.elapsed);
        self.diagnostics
            .log_collision(&contact.label(), contact.center);
    }

    fn reached_exit(&self, resolution: &Resolution) -> bool {
        if resolution
            .contact
            .as_ref()
            .is_some_and(|c| c.is_object(EXIT_OBJECT))
        {
            return true;
        }
        let mapping = self.level.grid_mapping();
        mapping.world_to_grid(self.actor.position) == mapping.world_to_grid(self.level.exit_position())
    }

    /// Records a host event in the event log.
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SceneLoaded => {
                self.diagnostics.log_event("Scene loaded and game started");
            }
            SessionEvent::KeyDown(key) => {
                let physics = self.integrator.physics();
                if key == GameKey::Jump
                    && self
                        .actor
                        .can_jump(physics.floor_height, physics.landing_epsilon)
                {
                    self.diagnostics.log_event("Jump key pressed");
                }
                self.diagnostics.log_event(format!("Key down: {key}"));
            }
            SessionEvent::KeyUp(key) => self.diagnostics.log_event(format!("Key up: {key}")),
            SessionEvent::PointerLockRequested => {
                self.diagnostics.log_event("Pointer lock requested");
            }
            SessionEvent::PointerLockChanged { locked } => {
                let state = if locked { "acquired" } else { "released" };
                self.diagnostics.log_event(format!("Pointer lock {state}"));
            }
            SessionEvent::PointerMoved { dx, dy } => {
                self.diagnostics.record_pointer_motion(dx, dy);
            }
            SessionEvent::WindowResized { width, height } => {
                self.diagnostics
                    .log_event(format!("Window resized to {width}x{height}"));
            }
            SessionEvent::ContextLost => self.diagnostics.log_event("Graphics context lost"),
            SessionEvent::ContextRestored => {
                self.diagnostics.log_event("Graphics context restored");
            }
        }
    }

    /// Forwards a host error message into the detailed log.
    pub fn log_error(&mut self, message: impl Into<String>) {
        self.diagnostics.log_error(message);
    }

    pub fn export(&mut self, action: ExportAction) -> String {
        self.diagnostics.export(action)
    }

    pub fn export_secondary(&self, depth: ExportDepth) -> String {
        self.diagnostics.export_secondary(depth)
    }
}
