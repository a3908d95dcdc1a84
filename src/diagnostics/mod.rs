//! Runtime diagnostics: periodic scene inspection and bounded log streams.
//!
//! # Overview
//!
//! [`DiagnosticsEngine`] is a passive observer. The session hands it an [`Observation`]
//! after every committed tick, plus one-off events and collisions as they happen. It
//! writes tagged lines into three [`LogStream`]s:
//!
//! * **detailed** (300 entries): full state, scene checks, events, collisions
//! * **summary** (50 entries): terse state, anomalies, events, collisions
//! * **secondary** (1000 entries): maze density and enclosure checks, events, collisions
//!
//! # Cadences
//!
//! | Check | Trigger |
//! | --- | --- |
//! | state, visual, performance, objects, lighting, renderer | every `detailed_interval` of session time |
//! | terse state | every `summary_interval` |
//! | historical deviation | every tick once a baseline exists, see [`HistoricalMode`](crate::config::HistoricalMode) |
//! | maze density, enclosure | every `maze_check_frames` frames |
//!
//! The baseline is the last `baseline_window` detailed entries, captured right after
//! the detailed cadence fires for the first time.
//!
//! Every entry is mirrored to `tracing`: anomalies at `warn`, errors at `error`, the
//! rest at `debug`.

pub mod checks;
pub mod export;
pub mod log_stream;

pub use export::{DetailedPart, ExportAction, ExportDepth};
pub use log_stream::{Category, LogEntry, LogStream};

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, warn};

use crate::config::DiagnosticsConfig;
use crate::game::keys::ControlState;
use crate::game::player::ActorState;
use crate::math::Vec3;
use crate::maze::generator::Maze;
use crate::scene::SceneBackend;

/// Committed simulation state for one frame, as seen by diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    /// Session time after this frame.
    pub elapsed: Duration,
    /// Raw frame delta in seconds, before the integrator's clamp.
    pub frame_delta: f32,
    pub actor: &'a ActorState,
    pub controls: &'a ControlState,
    pub maze: &'a Maze,
}

/// Which stream an entry goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Detailed,
    Summary,
    Secondary,
}

/// Scene-consistency checker and owner of the log streams.
#[derive(Debug)]
pub struct DiagnosticsEngine {
    config: DiagnosticsConfig,
    detailed: LogStream,
    summary: LogStream,
    secondary: LogStream,
    last_detailed: Duration,
    last_summary: Duration,
    frame_count: u64,
    /// Pointer movement reported since the previous observation.
    mouse_delta: (f32, f32),
    /// Newest detailed entry the historical check has already compared.
    historical_mark: u64,
    rng: StdRng,
}

impl DiagnosticsEngine {
    pub fn new(config: DiagnosticsConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Uses a seeded generator for the visual check's ray jitter.
    pub fn with_seed(config: DiagnosticsConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: DiagnosticsConfig, rng: StdRng) -> Self {
        let mut engine = Self {
            detailed: LogStream::new("detailed", config.detailed_capacity),
            summary: LogStream::new("summary", config.summary_capacity),
            secondary: LogStream::new("secondary", config.secondary_capacity),
            config,
            last_detailed: Duration::ZERO,
            last_summary: Duration::ZERO,
            frame_count: 0,
            mouse_delta: (0.0, 0.0),
            historical_mark: 0,
            rng,
        };
        engine.log(Category::Event, "Diagnostics initialized");
        engine.log_summary(Category::Event, "Game started");
        engine
    }

    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    pub fn stream(&self, stream: Stream) -> &LogStream {
        match stream {
            Stream::Detailed => &self.detailed,
            Stream::Summary => &self.summary,
            Stream::Secondary => &self.secondary,
        }
    }

    pub fn detailed(&self) -> &LogStream {
        &self.detailed
    }

    pub fn summary(&self) -> &LogStream {
        &self.summary
    }

    pub fn secondary(&self) -> &LogStream {
        &self.secondary
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Runs every check that is due for this frame.
    pub fn observe(&mut self, observation: &Observation<'_>, scene: &dyn SceneBackend) {
        let elapsed = observation.elapsed;

        if elapsed.saturating_sub(self.last_detailed) >= self.config.detailed_interval {
            self.log_state(observation);
            self.check_visual(observation, scene);
            self.check_performance(observation, scene);
            self.check_objects(scene);
            self.check_lighting(observation, scene);
            self.check_renderer(scene);
            self.last_detailed = elapsed;
            if self.detailed.capture_baseline(self.config.baseline_window) {
                debug!(
                    window = self.config.baseline_window,
                    "diagnostics baseline captured"
                );
                self.historical_mark = self.detailed.pushed();
            }
        }

        if elapsed.saturating_sub(self.last_summary) >= self.config.summary_interval {
            self.log_summary_state(observation);
            self.last_summary = elapsed;
        }

        if self.config.historical_check {
            self.check_historical();
        }

        self.frame_count += 1;
        if self.config.maze_check_frames > 0
            && self.frame_count % self.config.maze_check_frames == 0
        {
            self.check_maze_density(observation.maze);
            self.check_enclosure(observation, scene);
        }

        self.mouse_delta = (0.0, 0.0);
    }

    /// Records raw pointer movement for the next state line.
    pub fn record_pointer_motion(&mut self, dx: f32, dy: f32) {
        self.mouse_delta = (dx, dy);
    }

    /// Logs a simulation or host event to every stream.
    pub fn log_event(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.log(Category::Event, message.clone());
        self.log_summary(Category::Event, message.clone());
        self.log_secondary(Category::Event, message);
    }

    /// Logs a prevented or supportive contact with a named obstacle.
    pub fn log_collision(&mut self, object: &str, position: Vec3) {
        self.log(
            Category::Collision,
            format!("Collision prevented with {object} at {position}"),
        );
        let terse = format!("Hit {object} at {position}");
        self.log_summary(Category::Collision, terse.clone());
        self.log_secondary(Category::Collision, terse);
    }

    /// Forwards a host error into the detailed stream.
    pub fn log_error(&mut self, message: impl Into<String>) {
        self.log(Category::Error, message);
    }

    pub(crate) fn log(&mut self, category: Category, message: impl Into<String>) {
        Self::append(&mut self.detailed, category, message.into());
    }

    pub(crate) fn log_summary(&mut self, category: Category, message: impl Into<String>) {
        Self::append(&mut self.summary, category, message.into());
    }

    pub(crate) fn log_secondary(&mut self, category: Category, message: impl Into<String>) {
        Self::append(&mut self.secondary, category, message.into());
    }

    fn append(stream: &mut LogStream, category: Category, message: String) {
        let name = stream.name();
        match category {
            Category::Error => error!(stream = name, category = %category, "{message}"),
            c if c.is_anomaly() => warn!(stream = name, category = %category, "{message}"),
            _ => debug!(stream = name, category = %category, "{message}"),
        }
        stream.push(category, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::generator::Cell;
    use crate::scene::StaticScene;

    fn maze() -> Maze {
        Maze::parse("#####\n#   #\n#####", Cell::new(1, 1), Cell::new(1, 3)).unwrap()
    }

    fn observe_at(engine: &mut DiagnosticsEngine, seconds: f32, actor: &ActorState, maze: &Maze) {
        let controls = ControlState::default();
        let observation = Observation {
            elapsed: Duration::from_secs_f32(seconds),
            frame_delta: 1.0 / 60.0,
            actor,
            controls: &controls,
            maze,
        };
        engine.observe(&observation, &StaticScene::new());
    }

    /// Tests that construction logs one entry to each primary stream.
    #[test]
    fn test_initial_entries() {
        let engine = DiagnosticsEngine::new(DiagnosticsConfig::default());
        assert_eq!(engine.detailed().len(), 1);
        assert_eq!(engine.summary().len(), 1);
        assert!(engine.secondary().is_empty());
    }

    /// Tests that events reach all three streams and collisions use both phrasings.
    #[test]
    fn test_event_and_collision_fan_out() {
        let mut engine = DiagnosticsEngine::new(DiagnosticsConfig::default());
        engine.log_event("Window resized");
        engine.log_collision("exit", Vec3::new(1.0, 2.0, 3.0));

        let detailed: Vec<_> = engine.detailed().last(2).map(|e| e.message.clone()).collect();
        assert_eq!(detailed[0], "Window resized");
        assert_eq!(
            detailed[1],
            "Collision prevented with exit at (1.00, 2.00, 3.00)"
        );
        let summary = engine.summary().last(1).next().unwrap();
        assert_eq!(summary.message, "Hit exit at (1.00, 2.00, 3.00)");
        assert_eq!(engine.secondary().len(), 2);
    }

    /// Tests the cadences: summary every second, detailed every five seconds.
    #[test]
    fn test_cadences() {
        let config = DiagnosticsConfig {
            historical_check: false,
            ..DiagnosticsConfig::default()
        };
        let mut engine = DiagnosticsEngine::new(config);
        let actor = ActorState::spawn(Vec3::new(0.0, 1.0, 0.0));
        let maze = maze();

        observe_at(&mut engine, 0.5, &actor, &maze);
        assert_eq!(engine.summary().count(Category::State), 0);
        observe_at(&mut engine, 1.0, &actor, &maze);
        assert_eq!(engine.summary().count(Category::State), 1);
        assert_eq!(engine.detailed().count(Category::State), 0);
        observe_at(&mut engine, 5.0, &actor, &maze);
        assert_eq!(engine.detailed().count(Category::State), 1);
        assert!(engine.detailed().baseline().is_some());
        observe_at(&mut engine, 7.0, &actor, &maze);
        assert_eq!(engine.detailed().count(Category::State), 1);
        assert_eq!(engine.summary().count(Category::State), 3);
    }

    /// Tests that density and enclosure checks run every 60 frames.
    #[test]
    fn test_maze_checks_every_sixty_frames() {
        let mut engine = DiagnosticsEngine::new(DiagnosticsConfig::default());
        let actor = ActorState::spawn(Vec3::new(0.0, 1.0, 0.0));
        let maze = maze();
        for _ in 0..59 {
            observe_at(&mut engine, 0.0, &actor, &maze);
        }
        assert_eq!(engine.secondary().count(Category::MazeDebug), 0);
        observe_at(&mut engine, 0.0, &actor, &maze);
        // One density line plus four enclosure lines.
        assert_eq!(engine.secondary().count(Category::MazeDebug), 5);
    }

    /// Tests that the pointer delta is cleared after each observation.
    #[test]
    fn test_mouse_delta_cleared_after_observe() {
        let mut engine = DiagnosticsEngine::new(DiagnosticsConfig::default());
        engine.record_pointer_motion(4.0, -2.0);
        assert_eq!(engine.mouse_delta, (4.0, -2.0));
        let actor = ActorState::default();
        observe_at(&mut engine, 0.0, &actor, &maze());
        assert_eq!(engine.mouse_delta, (0.0, 0.0));
    }
}
