//! Corridor - first-person maze simulation core
//!
//! Corridor carves a procedural maze, moves a first-person actor through it with simple
//! walk/jump/gravity physics and axis-aligned collision, and runs a diagnostics engine
//! that inspects the live scene for visual and physics anomalies.
//!
//! # Architecture
//! - `maze/`: occupancy grid and the explicit-stack recursive backtracker
//! - `game/`: collision, actor state, movement integration, input and the [`Session`]
//! - `diagnostics/`: log streams, periodic scene checks and the export protocol
//! - `scene/`: the query surface a renderer implements, plus an in-memory scene
//! - `math/`: vectors and grid/world coordinate mapping
//! - `config`: level descriptor and tuning tables
//!
//! # Usage
//! ```no_run
//! use corridor::config::LevelDescriptor;
//! use corridor::game::keys::ControlState;
//! use corridor::maze::MazeGenerator;
//! use corridor::scene::StaticScene;
//! use corridor::Session;
//!
//! let mut session = Session::builder()
//!     .level(LevelDescriptor::level_one())
//!     .scene(StaticScene::new())
//!     .maze_source(MazeGenerator::new())
//!     .build()
//!     .expect("session");
//! let report = session.tick(&ControlState::default(), 1.0 / 60.0);
//! println!("{}", report.position);
//! ```

pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod game;
pub mod math;
pub mod maze;
pub mod scene;

pub use errors::{LevelError, MazeError, SessionError};
pub use game::{Session, SessionBuilder, SessionEvent, TickReport};
