//! Corridor headless runner.
//!
//! Builds a session over the in-memory scene, plays a short scripted walk through the
//! maze at 60 frames per second and prints the diagnostics exports.
//!
//! # Environment
//! - `CORRIDOR_LEVEL`: path to a JSON level descriptor (default: the built-in level one)
//! - `CORRIDOR_FRAMES`: number of frames to simulate (default: 600)
//! - `RUST_LOG`: tracing filter (default: `info`)

use std::process;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::keyboard::{Key, NamedKey, SmolStr};

use corridor::config::LevelDescriptor;
use corridor::diagnostics::{DetailedPart, ExportAction, ExportDepth};
use corridor::game::keys::{KeyState, winit_key_to_game_key};
use corridor::maze::MazeGenerator;
use corridor::scene::StaticScene;
use corridor::{Session, SessionError, SessionEvent};

const LEVEL_ENV_VAR: &str = "CORRIDOR_LEVEL";
const FRAMES_ENV_VAR: &str = "CORRIDOR_FRAMES";
const DEFAULT_FRAMES: u64 = 600;
const FRAME_DELTA: f32 = 1.0 / 60.0;

/// A scripted input step.
enum Input {
    Press(Key),
    Release(Key),
    Look(f32, f32),
    Host(SessionEvent),
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        error!(%err, "failed to start session");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run() -> Result<(), SessionError> {
    let level = match std::env::var(LEVEL_ENV_VAR) {
        Ok(path) => LevelDescriptor::from_path(&path)?,
        Err(_) => LevelDescriptor::level_one(),
    };
    let frames = frames_from_env();

    let mut session = Session::builder()
        .level(level)
        .scene(StaticScene::new())
        .maze_source(MazeGenerator::new())
        .build()?;
    let mut keys = KeyState::new();

    for frame in 0..frames {
        for input in script(frame) {
            apply_input(&mut session, &mut keys, input);
        }
        let controls = keys.snapshot();
        let report = session.tick(&controls, FRAME_DELTA);
        if report.reached_exit {
            info!(frame = report.frame, position = %report.position, "exit reached");
            break;
        }
    }

    info!(
        frames = session.frame(),
        position = %session.actor().position,
        "simulation finished"
    );

    for action in [
        ExportAction::Summary,
        ExportAction::Detailed(DetailedPart::First),
        ExportAction::Detailed(DetailedPart::Second),
        ExportAction::Detailed(DetailedPart::Third),
    ] {
        println!("===== {action} =====");
        println!("{}", session.export(action));
    }
    println!("===== secondary =====");
    println!("{}", session.export_secondary(ExportDepth::Full));
    Ok(())
}

fn frames_from_env() -> u64 {
    match std::env::var(FRAMES_ENV_VAR) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(value = %raw, "invalid frame count, using default");
            DEFAULT_FRAMES
        }),
        Err(_) => DEFAULT_FRAMES,
    }
}

fn character(c: &str) -> Key {
    Key::Character(SmolStr::new(c))
}

/// Inputs delivered before the given frame.
fn script(frame: u64) -> Vec<Input> {
    match frame {
        0 => vec![
            Input::Host(SessionEvent::PointerLockRequested),
            Input::Host(SessionEvent::PointerLockChanged { locked: true }),
        ],
        30 => vec![Input::Press(character("s"))],
        90 => vec![Input::Look(-120.0, 15.0)],
        120 => vec![Input::Press(Key::Named(NamedKey::Space))],
        125 => vec![Input::Release(Key::Named(NamedKey::Space))],
        200 => vec![
            Input::Release(character("s")),
            Input::Press(character("d")),
        ],
        260 => vec![Input::Release(character("d"))],
        300 => vec![Input::Host(SessionEvent::WindowResized {
            width: 1280,
            height: 720,
        })],
        _ => Vec::new(),
    }
}

fn apply_input(session: &mut Session, keys: &mut KeyState, input: Input) {
    match input {
        Input::Press(key) => {
            if let Some(game_key) = winit_key_to_game_key(&key) {
                if keys.press_key(game_key) {
                    session.handle_event(SessionEvent::KeyDown(game_key));
                }
            }
        }
        Input::Release(key) => {
            if let Some(game_key) = winit_key_to_game_key(&key) {
                keys.release_key(game_key);
                session.handle_event(SessionEvent::KeyUp(game_key));
            }
        }
        Input::Look(dx, dy) => {
            keys.add_look_delta(dx, dy);
            session.handle_event(SessionEvent::PointerMoved { dx, dy });
        }
        Input::Host(event) => session.handle_event(event),
    }
}
