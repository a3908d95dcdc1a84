//! Static configuration: the level descriptor and the tuning tables.
//!
//! [`LevelDescriptor`] is supplied once at session start, either built in
//! ([`LevelDescriptor::level_one`]) or loaded from JSON. [`PhysicsConfig`] and
//! [`DiagnosticsConfig`] carry the constants of the movement model and the anomaly
//! heuristics; their defaults reproduce the shipped game.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::LevelError;
use crate::math::Vec3;
use crate::math::coordinates::GridMapping;
use crate::maze::generator::Cell;

/// Grid size of a level in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MazeDimensions {
    pub width: usize,
    pub height: usize,
}

/// A static enemy body placed in the level.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnemyPlacement {
    #[serde(default = "default_enemy_kind")]
    pub kind: String,
    pub position: [f32; 3],
    /// Packed `0xRRGGBB` color, used only by the scene backend.
    pub color: u32,
}

/// Read-only description of a level.
///
/// # JSON Format
/// ```json
/// {
///   "name": "Level 1",
///   "maze": { "width": 48, "height": 48 },
///   "wall_height": 2.0,
///   "start": [-115.0, 1.0, -115.0],
///   "exit": [112.5, 1.0, 112.5],
///   "enemies": [{ "kind": "box", "position": [107.5, 1.1, 107.5], "color": 16711680 }]
/// }
/// ```
/// `cell_size` (default `5.0`) and `world_offset` (default `-120.0`) are optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LevelDescriptor {
    #[serde(default = "default_level_name")]
    pub name: String,
    pub maze: MazeDimensions,
    pub wall_height: f32,
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    #[serde(default = "default_world_offset")]
    pub world_offset: f32,
    pub start: [f32; 3],
    pub exit: [f32; 3],
    #[serde(default)]
    pub enemies: Vec<EnemyPlacement>,
}

fn default_enemy_kind() -> String {
    "box".to_string()
}

fn default_level_name() -> String {
    "Untitled".to_string()
}

fn default_cell_size() -> f32 {
    5.0
}

fn default_world_offset() -> f32 {
    -120.0
}

impl LevelDescriptor {
    /// The first level: a 48x48 maze, 240 units on a side, entered at cell (1, 1).
    pub fn level_one() -> Self {
        Self {
            name: "Level 1".to_string(),
            maze: MazeDimensions {
                width: 48,
                height: 48,
            },
            wall_height: 2.0,
            cell_size: default_cell_size(),
            world_offset: default_world_offset(),
            start: [-115.0, 1.0, -115.0],
            exit: [112.5, 1.0, 112.5],
            enemies: vec![EnemyPlacement {
                kind: default_enemy_kind(),
                position: [107.5, 1.1, 107.5],
                color: 0xff0000,
            }],
        }
    }

    /// Parses and validates a descriptor from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// Reads, parses and validates a descriptor from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks dimensions and that the start and exit positions lie on the grid.
    pub fn validate(&self) -> Result<(), LevelError> {
        let MazeDimensions { width, height } = self.maze;
        if width < 3 || height < 3 {
            return Err(LevelError::Invalid(format!(
                "maze must be at least 3x3, got {width}x{height}"
            )));
        }
        if !self.wall_height.is_finite() || self.wall_height <= 0.0 {
            return Err(LevelError::Invalid(format!(
                "wall height must be positive, got {}",
                self.wall_height
            )));
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(LevelError::Invalid(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        if self.start_cell().is_none() {
            return Err(LevelError::Invalid(format!(
                "start position {} is outside the maze",
                self.start_position()
            )));
        }
        if self.exit_cell().is_none() {
            return Err(LevelError::Invalid(format!(
                "exit position {} is outside the maze",
                self.exit_position()
            )));
        }
        Ok(())
    }

    pub fn grid_mapping(&self) -> GridMapping {
        GridMapping::new(self.cell_size, self.world_offset)
    }

    /// Side length of the square room enclosing the maze.
    pub fn room_size(&self) -> f32 {
        self.maze.width.max(self.maze.height) as f32 * self.cell_size
    }

    pub fn start_position(&self) -> Vec3 {
        Vec3::from(self.start)
    }

    pub fn exit_position(&self) -> Vec3 {
        Vec3::from(self.exit)
    }

    pub fn start_cell(&self) -> Option<Cell> {
        self.grid_mapping()
            .world_to_cell(self.start_position(), self.maze.width, self.maze.height)
    }

    pub fn exit_cell(&self) -> Option<Cell> {
        self.grid_mapping()
            .world_to_cell(self.exit_position(), self.maze.width, self.maze.height)
    }
}

/// Movement model constants.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsConfig {
    /// Upper bound on one tick's delta time, in seconds.
    pub max_delta: f32,
    /// Fraction of horizontal velocity kept each tick.
    pub damping: f32,
    /// Walk speed; horizontal velocity is `speed * delta` per active axis.
    pub speed: f32,
    pub jump_speed: f32,
    pub gravity: f32,
    /// Radians of yaw/pitch per unit of pointer movement.
    pub mouse_sensitivity: f32,
    pub pitch_limit: f32,
    /// Lowest eye height; the actor counts as on the floor within `landing_epsilon` of it.
    pub floor_height: f32,
    /// Distance kept below the wall tops.
    pub ceiling_margin: f32,
    /// Distance kept inside the room's horizontal edges.
    pub room_margin: f32,
    /// Half of the actor's cubic collision extent.
    pub actor_half_extent: f32,
    pub landing_epsilon: f32,
    /// Blocked moves are pushed out of walls instead of rejected during this window.
    pub spawn_grace: Duration,
    /// Minimum session time between two collision log lines.
    pub collision_log_interval: Duration,
    /// Full size of an enemy box.
    pub enemy_size: [f32; 3],
    /// Full size of the exit marker.
    pub exit_size: [f32; 3],
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_delta: 0.1,
            damping: 0.7,
            speed: 6.0,
            jump_speed: 7.0,
            gravity: -9.8,
            mouse_sensitivity: 0.002,
            pitch_limit: std::f32::consts::FRAC_PI_2,
            floor_height: 1.0,
            ceiling_margin: 1.0,
            room_margin: 1.0,
            actor_half_extent: 0.5,
            landing_epsilon: 0.01,
            spawn_grace: Duration::from_secs(1),
            collision_log_interval: Duration::from_millis(100),
            enemy_size: [2.0, 2.2, 2.0],
            exit_size: [2.0, 2.0, 2.0],
        }
    }
}

/// Cadences, capacities and anomaly thresholds of the diagnostics engine.
///
/// The thresholds are heuristics; hosts may tune them per scene.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsConfig {
    pub detailed_interval: Duration,
    pub summary_interval: Duration,
    /// Maze density and enclosure checks run every this many frames.
    pub maze_check_frames: u64,
    pub detailed_capacity: usize,
    pub summary_capacity: usize,
    pub secondary_capacity: usize,
    /// Entries in the baseline snapshot and in each historical comparison.
    pub baseline_window: usize,
    pub distance_tolerance: f32,
    pub variance_threshold: f32,
    pub jitter_magnitude: f32,
    pub jitter_samples: usize,
    /// Enclosure rays farther than this count as open space.
    pub open_distance: f32,
    pub low_fps_threshold: u32,
    /// Scene object whose shell the visual consistency check measures.
    pub room_object: String,
    pub tracked_objects: Vec<String>,
    /// Object the visibility ray is aimed at.
    pub visibility_target: String,
    pub historical_check: bool,
    pub historical_mode: HistoricalMode,
}

/// When the historical deviation check compares against the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoricalMode {
    /// Only when a new non-deviation entry has arrived; deviation entries are left
    /// out of the compared window.
    #[default]
    OnNewEntry,
    /// Every tick, over the newest entries whatever their category.
    EveryTick,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            detailed_interval: Duration::from_secs(5),
            summary_interval: Duration::from_secs(1),
            maze_check_frames: 60,
            detailed_capacity: 300,
            summary_capacity: 50,
            secondary_capacity: 1000,
            baseline_window: 10,
            distance_tolerance: 1.0,
            variance_threshold: 0.1,
            jitter_magnitude: 0.01,
            jitter_samples: 3,
            open_distance: 15.0,
            low_fps_threshold: 30,
            room_object: "room".to_string(),
            tracked_objects: vec!["room".to_string(), "enemy_0".to_string()],
            visibility_target: "enemy_0".to_string(),
            historical_check: true,
            historical_mode: HistoricalMode::default(),
        }
    }
}
