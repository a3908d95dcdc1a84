//! Actor state: position, velocity, orientation and movement flags.
//!
//! This module defines [`ActorState`], the first-person body the session moves each
//! tick. Only [`crate::game::movement::MovementIntegrator`] mutates it during a tick;
//! the input collaborator writes the intent flags through [`ActorState::apply_controls`].
//!
//! # Coordinate System
//!
//! - X-axis: left/right
//! - Y-axis: height; `position.y` is eye height
//! - Z-axis: forward/backward; yaw 0 looks down -Z
//!
//! Angles are in radians:
//! - **Pitch**: up/down look angle, clamped to the configured limit
//! - **Yaw**: left/right look angle, unbounded
//!
//! # Usage Example
//!
//! ```rust
//! use corridor::game::player::ActorState;
//! use corridor::math::Vec3;
//!
//! let mut actor = ActorState::spawn(Vec3::new(0.0, 1.0, 0.0));
//! actor.look(10.0, 0.0, 0.002, std::f32::consts::FRAC_PI_2);
//! assert!(actor.yaw < 0.0);
//! ```

use crate::game::keys::ControlState;
use crate::math::Vec3;

/// Movement-intent flags set from the control snapshot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntents {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// The actor's physical and input state.
///
/// # Fields
///
/// ## Position and Orientation
/// - `position`: eye position in world space
/// - `yaw` / `pitch`: look angles in radians
///
/// ## Motion
/// - `velocity`: `x`/`z` hold the local strafe/forward components, `y` the vertical speed
///
/// ## Vertical State
/// - `grounded`: resting on a wall top or object top
/// - `on_object`: resting on a world object specifically
/// - `jump_requested`: a jump is pending; consumed by the next tick that can jump
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActorState {
    pub position: Vec3,
    /// Local-frame velocity: `x` strafe (left positive), `y` vertical, `z` forward.
    pub velocity: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub grounded: bool,
    pub on_object: bool,
    pub jump_requested: bool,
    pub intents: MoveIntents,
}

impl ActorState {
    /// Creates an actor at rest at `position`, looking down -Z.
    pub fn spawn(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Updates orientation from pointer movement.
    ///
    /// Positive `delta_x` turns left (yaw decreases), positive `delta_y` looks down.
    /// Pitch is clamped to `[-pitch_limit, pitch_limit]`.
    pub fn look(&mut self, delta_x: f32, delta_y: f32, sensitivity: f32, pitch_limit: f32) {
        self.yaw -= delta_x * sensitivity;
        self.pitch -= delta_y * sensitivity;
        self.pitch = self.pitch.clamp(-pitch_limit, pitch_limit);
    }

    /// Horizontal look direction derived from yaw alone.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// Horizontal unit vector pointing to the actor's left.
    pub fn left(&self) -> Vec3 {
        Vec3::new(-self.yaw.cos(), 0.0, self.yaw.sin())
    }

    /// Whether a jump may start from the current state.
    pub fn can_jump(&self, floor_height: f32, epsilon: f32) -> bool {
        self.position.y() <= floor_height + epsilon || self.grounded
    }

    /// Copies one frame of controls into the actor.
    ///
    /// Movement intents always follow the snapshot. A jump request is only latched when
    /// the actor is able to jump, so a press in mid-air is dropped.
    pub fn apply_controls(
        &mut self,
        controls: &ControlState,
        sensitivity: f32,
        pitch_limit: f32,
        floor_height: f32,
        epsilon: f32,
    ) {
        self.intents = MoveIntents {
            forward: controls.move_forward,
            backward: controls.move_backward,
            left: controls.move_left,
            right: controls.move_right,
        };
        if controls.jump && self.can_jump(floor_height, epsilon) {
            self.jump_requested = true;
        }
        if controls.look_delta != (0.0, 0.0) {
            self.look(
                controls.look_delta.0,
                controls.look_delta.1,
                sensitivity,
                pitch_limit,
            );
        }
    }

    /// Zeroes every velocity component.
    pub fn stop(&mut self) {
        self.velocity = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    /// Tests that pointer movement turns and pitches the view, with pitch clamped.
    #[test]
    fn test_look_turns_and_clamps_pitch() {
        let mut actor = ActorState::spawn(Vec3::new(0.0, 1.0, 0.0));
        actor.look(100.0, 0.0, 0.002, FRAC_PI_2);
        assert!((actor.yaw + 0.2).abs() < 1e-6);

        actor.look(0.0, -10_000.0, 0.002, FRAC_PI_2);
        assert_eq!(actor.pitch, FRAC_PI_2);
        actor.look(0.0, 10_000.0, 0.002, FRAC_PI_2);
        assert_eq!(actor.pitch, -FRAC_PI_2);
    }

    /// Tests the heading vectors at zero and quarter-turn yaw.
    #[test]
    fn test_heading_vectors() {
        let mut actor = ActorState::spawn(Vec3::ZERO);
        assert!(actor.forward().distance(&Vec3::new(0.0, 0.0, -1.0)) < 1e-6);
        assert!(actor.left().distance(&Vec3::new(-1.0, 0.0, 0.0)) < 1e-6);

        actor.yaw = FRAC_PI_2;
        assert!(actor.forward().distance(&Vec3::new(-1.0, 0.0, 0.0)) < 1e-6);
        assert!(actor.left().distance(&Vec3::new(0.0, 0.0, 1.0)) < 1e-6);
    }

    /// Tests that pitch never changes the horizontal heading.
    #[test]
    fn test_pitch_does_not_tilt_heading() {
        let mut actor = ActorState::spawn(Vec3::ZERO);
        actor.pitch = 1.2;
        assert_eq!(actor.forward().y(), 0.0);
    }

    /// Tests that a jump press in mid-air is not latched.
    #[test]
    fn test_jump_latched_only_when_able() {
        let controls = ControlState {
            jump: true,
            ..ControlState::default()
        };
        let mut airborne = ActorState::spawn(Vec3::new(0.0, 3.0, 0.0));
        airborne.apply_controls(&controls, 0.002, FRAC_PI_2, 1.0, 0.01);
        assert!(!airborne.jump_requested);

        let mut standing = ActorState::spawn(Vec3::new(0.0, 1.0, 0.0));
        standing.apply_controls(&controls, 0.002, FRAC_PI_2, 1.0, 0.01);
        assert!(standing.jump_requested);
    }
}
