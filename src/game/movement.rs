//! Per-tick actor integration.
//!
//! [`MovementIntegrator::tick`] advances an [`ActorState`] by one frame: damping,
//! jump and gravity, intent-driven horizontal velocity, heading projection, collision
//! resolution and the final room clamps. The actor has two vertical sub-states,
//! airborne and grounded, driven by the floor height and the resolver's landing result.

use crate::config::{LevelDescriptor, PhysicsConfig};
use crate::game::collision::{CollisionSystem, Resolution, WorldObject};
use crate::game::player::ActorState;
use crate::math::Vec3;
use crate::maze::generator::Maze;

/// Push-out vectors applied before a still-blocked spawn is given up on.
const MAX_PUSH_OUT_STEPS: usize = 4;

/// What happened during one integration step.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementStep {
    /// Delta time actually integrated, after clamping.
    pub delta: f32,
    pub jumped: bool,
    pub resolution: Resolution,
    /// Position a blocked move was pushed out to, when push-out was allowed.
    pub pushed_out: Option<Vec3>,
}

/// Advances actor state using the physics constants and the collision resolver.
#[derive(Debug, Clone)]
pub struct MovementIntegrator {
    physics: PhysicsConfig,
    collision: CollisionSystem,
}

impl MovementIntegrator {
    pub fn new(physics: PhysicsConfig) -> Self {
        let collision = CollisionSystem::new(physics.actor_half_extent, physics.landing_epsilon);
        Self { physics, collision }
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    pub fn collision(&self) -> &CollisionSystem {
        &self.collision
    }

    /// Advances `actor` by `delta` seconds.
    ///
    /// When `allow_push_out` is set, a blocked candidate is moved out of the blocking
    /// obstacle instead of being rejected.
    pub fn tick(
        &self,
        actor: &mut ActorState,
        maze: &Maze,
        level: &LevelDescriptor,
        objects: &[WorldObject],
        delta: f32,
        allow_push_out: bool,
    ) -> MovementStep {
        let p = &self.physics;
        let delta = delta.clamp(0.0, p.max_delta);

        actor.velocity.set_x(actor.velocity.x() * p.damping);
        actor.velocity.set_z(actor.velocity.z() * p.damping);

        let on_floor = actor.position.y() <= p.floor_height + p.landing_epsilon;
        let mut jumped = false;
        if actor.jump_requested && (on_floor || actor.grounded) {
            actor.velocity.set_y(p.jump_speed);
            actor.grounded = false;
            actor.on_object = false;
            actor.jump_requested = false;
            jumped = true;
        } else if !actor.grounded && !on_floor {
            actor.velocity.set_y(actor.velocity.y() + p.gravity * delta);
        } else {
            actor.velocity.set_y(0.0);
        }

        let intents = actor.intents;
        let axis = |positive: bool, negative: bool| positive as i32 as f32 - negative as i32 as f32;
        let direction = Vec3::new(
            axis(intents.left, intents.right),
            0.0,
            axis(intents.forward, intents.backward),
        )
        .normalize();
        if intents.forward || intents.backward {
            actor.velocity.set_z(direction.z() * p.speed * delta);
        }
        if intents.left || intents.right {
            actor.velocity.set_x(direction.x() * p.speed * delta);
        }

        let displacement = actor.forward() * actor.velocity.z()
            + actor.left() * actor.velocity.x()
            + Vec3::new(0.0, actor.velocity.y() * delta, 0.0);
        let candidate = actor.position + displacement;

        let resolution = self.collision.resolve(candidate, maze, level, objects);
        let mut pushed_out = None;
        if resolution.blocked {
            let cleared = if allow_push_out {
                self.push_out(candidate, &resolution, maze, level, objects)
            } else {
                None
            };
            actor.stop();
            match cleared {
                Some(cleared) => {
                    actor.position = cleared.position;
                    actor.grounded = cleared.grounded;
                    actor.on_object = cleared.on_top_of_object;
                    pushed_out = Some(cleared.position);
                }
                None => {
                    actor.grounded = false;
                    actor.on_object = false;
                }
            }
        } else {
            actor.position = resolution.position;
            actor.grounded = resolution.grounded;
            actor.on_object = resolution.on_top_of_object;
            if resolution.grounded {
                actor.velocity.set_y(0.0);
            }
        }

        self.clamp_to_room(actor, level);

        MovementStep {
            delta,
            jumped,
            resolution,
            pushed_out,
        }
    }

    /// Follows push-out vectors from a blocked candidate until a position resolves clear.
    ///
    /// Each step pushes out of the obstacle that blocked the previous one, so an inner
    /// corner clears both walls. Returns `None` if the position is still blocked after
    /// [`MAX_PUSH_OUT_STEPS`] pushes.
    fn push_out(
        &self,
        candidate: Vec3,
        blocked: &Resolution,
        maze: &Maze,
        level: &LevelDescriptor,
        objects: &[WorldObject],
    ) -> Option<Resolution> {
        let mut position = candidate;
        let mut push = blocked.push_out?;
        for _ in 0..MAX_PUSH_OUT_STEPS {
            position = position + push;
            let next = self.collision.resolve(position, maze, level, objects);
            if !next.blocked {
                return Some(next);
            }
            push = next.push_out?;
        }
        None
    }

    /// Keeps the actor between floor and ceiling and inside the room's horizontal extent.
    fn clamp_to_room(&self, actor: &mut ActorState, level: &LevelDescriptor) {
        let p = &self.physics;
        if actor.position.y() < p.floor_height {
            actor.position.set_y(p.floor_height);
            actor.velocity.set_y(0.0);
            actor.grounded = false;
            actor.on_object = false;
        }
        let ceiling = level.wall_height - p.ceiling_margin;
        if actor.position.y() > ceiling {
            actor.position.set_y(ceiling);
            actor.velocity.set_y(0.0);
        }

        let half_room = level.room_size() / 2.0;
        let center = level.world_offset + half_room;
        let (low, high) = (
            center - half_room + p.room_margin,
            center + half_room - p.room_margin,
        );
        actor.position.set_x(clamp_axis(actor.position.x(), low, high, center));
        actor.position.set_z(clamp_axis(actor.position.z(), low, high, center));
    }
}

/// Clamps to `[low, high]`, collapsing to `center` when the margins overlap.
fn clamp_axis(value: f32, low: f32, high: f32, center: f32) -> f32 {
    if low > high {
        center
    } else {
        value.clamp(low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MazeDimensions;
    use crate::maze::generator::Cell;
    use proptest::prelude::*;

    /// A 9x9 open field ringed by walls, 45 units across, with tall walls.
    fn open_field() -> (LevelDescriptor, Maze) {
        let level = LevelDescriptor {
            name: "field".to_string(),
            maze: MazeDimensions {
                width: 9,
                height: 9,
            },
            wall_height: 10.0,
            cell_size: 5.0,
            world_offset: 0.0,
            start: [22.5, 1.0, 22.5],
            exit: [32.5, 1.0, 32.5],
            enemies: vec![],
        };
        let mut text = String::new();
        for row in 0..9 {
            for col in 0..9 {
                let border = row == 0 || col == 0 || row == 8 || col == 8;
                text.push(if border { '#' } else { ' ' });
            }
            text.push('\n');
        }
        let maze = Maze::parse(&text, Cell::new(4, 4), Cell::new(6, 6)).unwrap();
        (level, maze)
    }

    fn integrator() -> MovementIntegrator {
        MovementIntegrator::new(PhysicsConfig::default())
    }

    /// Tests that walking forward at yaw 0 moves toward -Z by speed * delta.
    #[test]
    fn test_forward_moves_along_negative_z() {
        let (level, maze) = open_field();
        let mut actor = ActorState::spawn(level.start_position());
        actor.intents.forward = true;
        let step = integrator().tick(&mut actor, &maze, &level, &[], 0.05, false);
        assert!(!step.resolution.blocked);
        assert!((actor.position.z() - (22.5 - 0.3)).abs() < 1e-5);
        assert!((actor.position.x() - 22.5).abs() < 1e-5);
    }

    /// Tests that diagonal input is normalized.
    #[test]
    fn test_diagonal_input_has_no_speed_boost() {
        let (level, maze) = open_field();
        let mut actor = ActorState::spawn(level.start_position());
        actor.intents.forward = true;
        actor.intents.left = true;
        integrator().tick(&mut actor, &maze, &level, &[], 0.05, false);
        let moved = actor.position.distance(&level.start_position());
        assert!((moved - 0.3).abs() < 1e-5);
    }

    /// Tests that delta time is clamped to the configured maximum.
    #[test]
    fn test_delta_is_clamped() {
        let (level, maze) = open_field();
        let mut actor = ActorState::spawn(level.start_position());
        let step = integrator().tick(&mut actor, &maze, &level, &[], 2.0, false);
        assert_eq!(step.delta, 0.1);
    }

    /// Tests a jump from the floor rises, falls under gravity and lands back on the floor.
    #[test]
    fn test_jump_arc_returns_to_floor() {
        let (level, maze) = open_field();
        let integrator = integrator();
        let mut actor = ActorState::spawn(level.start_position());
        actor.jump_requested = true;

        let first = integrator.tick(&mut actor, &maze, &level, &[], 1.0 / 60.0, false);
        assert!(first.jumped);
        assert!(!actor.jump_requested);
        assert!(actor.position.y() > 1.0);

        let mut peak: f32 = 0.0;
        for _ in 0..240 {
            integrator.tick(&mut actor, &maze, &level, &[], 1.0 / 60.0, false);
            peak = peak.max(actor.position.y());
        }
        assert!(peak > 3.0);
        assert_eq!(actor.position.y(), 1.0);
        assert_eq!(actor.velocity.y(), 0.0);
    }

    /// Tests landing on an object: grounded, on the object, zero vertical velocity.
    #[test]
    fn test_landing_on_object_zeroes_vertical_velocity() {
        let (level, maze) = open_field();
        let objects = [WorldObject::new("enemy_0", Vec3::new(22.5, 1.1, 22.5), [2.0, 2.2, 2.0])];
        let mut actor = ActorState::spawn(Vec3::new(22.5, 2.71, 22.5));
        actor.velocity.set_y(-1.0);

        integrator().tick(&mut actor, &maze, &level, &objects, 1.0 / 60.0, false);
        assert!(actor.grounded);
        assert!(actor.on_object);
        assert_eq!(actor.velocity.y(), 0.0);
        assert!((actor.position.y() - 2.7).abs() < 1e-5);

        // Standing still keeps it there.
        integrator().tick(&mut actor, &maze, &level, &objects, 1.0 / 60.0, false);
        assert!(actor.on_object);
        assert!((actor.position.y() - 2.7).abs() < 1e-5);
    }

    /// Tests that a blocked move keeps the previous position and stops the actor.
    #[test]
    fn test_blocked_move_keeps_position() {
        let (level, maze) = open_field();
        // Border wall column 0 spans x in [0, 5]; grown face at 5.5.
        let start = Vec3::new(5.6, 1.0, 22.5);
        let mut actor = ActorState::spawn(start);
        // Facing -X.
        actor.yaw = std::f32::consts::FRAC_PI_2;
        actor.intents.forward = true;
        let step = integrator().tick(&mut actor, &maze, &level, &[], 0.05, false);
        assert!(step.resolution.blocked);
        assert_eq!(actor.position, start);
        assert_eq!(actor.velocity, Vec3::ZERO);
    }

    /// Tests that push-out moves a blocked actor clear of the wall.
    #[test]
    fn test_push_out_clears_wall() {
        let (level, maze) = open_field();
        let mut actor = ActorState::spawn(Vec3::new(5.2, 1.0, 22.5));
        let step = integrator().tick(&mut actor, &maze, &level, &[], 0.0, true);
        let pushed = step.pushed_out.unwrap();
        assert!(pushed.x() > 5.5);
        assert_eq!(actor.position, pushed);
    }

    /// Tests that push-out in an inner corner clears both walls and stops the actor.
    #[test]
    fn test_push_out_clears_inner_corner() {
        let (level, maze) = open_field();
        let integrator = integrator();
        // Drifts into corner wall (0, 0); clearing it along X lands inside wall (0, 1).
        let mut actor = ActorState::spawn(Vec3::new(5.2, 1.0, 5.2));
        actor.velocity = Vec3::new(0.5, 0.0, 0.5);
        let step = integrator.tick(&mut actor, &maze, &level, &[], 0.0, true);

        let pushed = step.pushed_out.unwrap();
        assert!(pushed.x() > 5.5);
        assert!(pushed.z() > 5.5);
        assert_eq!(actor.position, pushed);
        assert_eq!(actor.velocity, Vec3::ZERO);
        assert!(!actor.grounded);
        let again = integrator.collision().resolve(actor.position, &maze, &level, &[]);
        assert!(!again.blocked);
    }

    /// Tests a jump from the top of an object leaves the object with full jump speed.
    #[test]
    fn test_jump_from_object_top() {
        let (level, maze) = open_field();
        let objects = [WorldObject::new("enemy_0", Vec3::new(22.5, 1.1, 22.5), [2.0, 2.2, 2.0])];
        let mut actor = ActorState::spawn(Vec3::new(22.5, 2.7, 22.5));
        actor.grounded = true;
        actor.on_object = true;
        actor.jump_requested = true;

        let step = integrator().tick(&mut actor, &maze, &level, &objects, 1.0 / 60.0, false);
        assert!(step.jumped);
        assert!(!actor.grounded);
        assert!(!actor.on_object);
        assert_eq!(actor.velocity.y(), PhysicsConfig::default().jump_speed);
        assert!(actor.position.y() > 2.7);
    }

    /// Tests that a room narrower than both margins pins the actor to its center.
    #[test]
    fn test_room_smaller_than_margins_collapses_to_center() {
        let level = LevelDescriptor {
            name: "closet".to_string(),
            maze: MazeDimensions {
                width: 3,
                height: 3,
            },
            wall_height: 10.0,
            cell_size: 0.5,
            world_offset: 0.0,
            start: [0.75, 1.0, 0.75],
            exit: [0.75, 1.0, 0.75],
            enemies: vec![],
        };
        level.validate().unwrap();
        let maze = Maze::parse("###\n# #\n###", Cell::new(1, 1), Cell::new(1, 1)).unwrap();
        let mut actor = ActorState::spawn(Vec3::new(0.6, 1.0, 0.9));
        actor.intents.forward = true;

        integrator().tick(&mut actor, &maze, &level, &[], 1.0 / 60.0, false);
        assert_eq!(actor.position.x(), 0.75);
        assert_eq!(actor.position.z(), 0.75);
    }

    /// Tests the horizontal room clamp.
    #[test]
    fn test_room_clamp() {
        let (level, maze) = open_field();
        let mut actor = ActorState::spawn(Vec3::new(-50.0, 1.0, 100.0));
        integrator().tick(&mut actor, &maze, &level, &[], 0.0, false);
        assert_eq!(actor.position.x(), 1.0);
        assert_eq!(actor.position.z(), 44.0);
    }

    proptest! {
        /// Tests that without input, horizontal velocity decays by the damping factor
        /// every tick and never changes sign.
        #[test]
        fn prop_damping_decays_without_reversing(vx in -1.0f32..1.0, vz in -1.0f32..1.0) {
            let (level, maze) = open_field();
            let integrator = integrator();
            let mut actor = ActorState::spawn(level.start_position());
            actor.velocity = Vec3::new(vx, 0.0, vz);

            for _ in 0..20 {
                let before = actor.velocity;
                integrator.tick(&mut actor, &maze, &level, &[], 1.0 / 60.0, false);
                let after = actor.velocity;
                prop_assert!((after.x() - before.x() * 0.7).abs() < 1e-6);
                prop_assert!((after.z() - before.z() * 0.7).abs() < 1e-6);
                prop_assert!(after.x() * before.x() >= 0.0);
                prop_assert!(after.z() * before.z() >= 0.0);
                if before.horizontal().length() > 1e-6 {
                    prop_assert!(after.horizontal().length() < before.horizontal().length());
                }
            }
        }
    }
}
