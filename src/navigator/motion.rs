//! Smooth-motion clock.
//!
//! Continuous motions (arrow keys, zoom keys, duck, jump) are driven by
//! a single repeating clock instead of one timer per motion. Starting a
//! motion applies one step immediately and marks it active; every clock
//! tick then re-applies each active motion in a fixed order and checks
//! its governing condition afterwards. Because the check comes after
//! the step, releasing a key lets at most one further step through
//! before the motion stops.

use super::camera::CameraState;
use super::input::InputState;

/// Milliseconds between motion clock ticks.
pub const TICK_INTERVAL_MS: u64 = 40;
/// Degrees turned per tick at normal speed.
pub const DEFAULT_TURN_UNIT: f64 = 2.5;
/// World units moved per tick at normal speed.
pub const DEFAULT_MOVE_UNIT: f64 = 120.0;
/// Zoom level change per tick.
pub const ZOOM_UNIT: f64 = 5.0;
/// World units the camera drops (or recovers) per duck tick.
pub const DUCK_UNIT: f64 = 70.0;
/// Initial upward velocity of a jump, in world units per tick.
pub const DEFAULT_JUMP_IMPULSE: f64 = 170.0;
/// Amount the jump impulse decays before each application.
pub const JUMP_DECAY: f64 = 27.0;

/// The continuous motions the clock can drive.
///
/// Tick order is the declaration order, so simultaneous motions always
/// compose deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    TurnLeft,
    TurnRight,
    TurnUp,
    TurnDown,
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,
    ZoomIn,
    ZoomOut,
    Duck,
    Jump,
}

impl Motion {
    /// Every motion, in tick order.
    pub const ALL: [Self; 12] = [
        Self::TurnLeft,
        Self::TurnRight,
        Self::TurnUp,
        Self::TurnDown,
        Self::MoveForward,
        Self::MoveBackward,
        Self::StrafeLeft,
        Self::StrafeRight,
        Self::ZoomIn,
        Self::ZoomOut,
        Self::Duck,
        Self::Jump,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|&m| m == self).unwrap_or(0)
    }
}

/// Drives all active motions from one repeating tick.
#[derive(Debug)]
pub struct MotionClock {
    active: [bool; Motion::ALL.len()],
    turn_unit: f64,
    move_unit: f64,
    jump_impulse: f64,
}

impl Default for MotionClock {
    fn default() -> Self {
        Self {
            active: [false; Motion::ALL.len()],
            turn_unit: DEFAULT_TURN_UNIT,
            move_unit: DEFAULT_MOVE_UNIT,
            jump_impulse: DEFAULT_JUMP_IMPULSE,
        }
    }
}

impl MotionClock {
    /// True while any motion still wants ticks.
    #[must_use]
    pub fn any_active(&self) -> bool {
        self.active.iter().any(|&a| a)
    }

    #[must_use]
    pub fn is_active(&self, m: Motion) -> bool {
        self.active[m.index()]
    }

    /// Scale turn and move units for the next motions. Arrow handlers
    /// call this on every press: 1.0 normally, 2.0 with shift held.
    pub fn set_speed_multiplier(&mut self, multiplier: f64) {
        self.turn_unit = DEFAULT_TURN_UNIT * multiplier;
        self.move_unit = DEFAULT_MOVE_UNIT * multiplier;
    }

    /// Activate a motion and apply its first step right away, so a tap
    /// shorter than one tick interval still moves the camera.
    pub fn start(
        &mut self,
        m: Motion,
        cam: &mut CameraState,
        input: &mut InputState,
        clip: &mut dyn FnMut(&mut CameraState),
    ) {
        if self.active[m.index()] {
            return;
        }
        self.active[m.index()] = self.step(m, cam, input, clip);
    }

    /// Advance every active motion by one step, in [`Motion::ALL`]
    /// order. Returns true if any motion applied (the view changed).
    pub fn tick(
        &mut self,
        cam: &mut CameraState,
        input: &mut InputState,
        clip: &mut dyn FnMut(&mut CameraState),
    ) -> bool {
        let mut moved = false;
        for m in Motion::ALL {
            if self.active[m.index()] {
                moved = true;
                self.active[m.index()] = self.step(m, cam, input, clip);
            }
        }
        moved
    }

    /// Apply one step of `m` and report whether it stays active.
    ///
    /// The governing flag is read after the step is applied; that order
    /// is what bounds cancellation latency to a single tick. Positional
    /// steps run the clipping policy immediately after mutating the
    /// camera, angular and zoom steps do not touch position.
    fn step(
        &mut self,
        m: Motion,
        cam: &mut CameraState,
        input: &mut InputState,
        clip: &mut dyn FnMut(&mut CameraState),
    ) -> bool {
        match m {
            Motion::TurnLeft => {
                cam.turn_horizontal(self.turn_unit);
                input.left
            }
            Motion::TurnRight => {
                cam.turn_horizontal(-self.turn_unit);
                input.right
            }
            Motion::TurnUp => {
                cam.turn_vertical(self.turn_unit);
                input.up
            }
            Motion::TurnDown => {
                cam.turn_vertical(-self.turn_unit);
                input.down
            }
            Motion::MoveForward => {
                cam.move_forward(self.move_unit);
                clip(cam);
                input.up
            }
            Motion::MoveBackward => {
                cam.move_forward(-self.move_unit);
                clip(cam);
                input.down
            }
            Motion::StrafeLeft => {
                cam.move_sideways(self.move_unit);
                clip(cam);
                input.left
            }
            Motion::StrafeRight => {
                cam.move_sideways(-self.move_unit);
                clip(cam);
                input.right
            }
            Motion::ZoomIn => {
                cam.zoom(ZOOM_UNIT);
                input.zoom
            }
            Motion::ZoomOut => {
                cam.zoom(-ZOOM_UNIT);
                input.zoom
            }
            Motion::Duck => {
                // Descend while the key is held, recover after release,
                // and keep animating until the camera is back at rest
                // even if the key is long gone.
                if input.duck {
                    cam.move_up(-DUCK_UNIT);
                } else {
                    cam.move_up(DUCK_UNIT);
                }
                clip(cam);
                if input.duck || cam.position.y < 0.0 {
                    true
                } else {
                    cam.position.y = 0.0;
                    false
                }
            }
            Motion::Jump => {
                // Ballistic: the impulse decays before each application
                // and key state is irrelevant once airborne.
                self.jump_impulse -= JUMP_DECAY;
                cam.move_up(self.jump_impulse);
                clip(cam);
                if cam.position.y > 0.0 {
                    true
                } else {
                    cam.position.y = 0.0;
                    self.jump_impulse = DEFAULT_JUMP_IMPULSE;
                    input.jumping = false;
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_clip(_: &mut CameraState) {}

    #[test]
    fn release_allows_at_most_one_extra_step() {
        let mut clock = MotionClock::default();
        let mut cam = CameraState::default();
        let mut input = InputState::default();

        input.up = true;
        clock.start(Motion::MoveForward, &mut cam, &mut input, &mut no_clip);
        let after_press = cam.position.z;
        assert!((after_press - (5200.0 - 120.0)).abs() < 1e-9);

        assert!(clock.tick(&mut cam, &mut input, &mut no_clip));

        // Release: the next tick still applies one step, then stops.
        input.up = false;
        assert!(clock.tick(&mut cam, &mut input, &mut no_clip));
        assert!(!clock.is_active(Motion::MoveForward));
        let settled = cam.position.z;
        assert!((settled - (5200.0 - 3.0 * 120.0)).abs() < 1e-9);

        assert!(!clock.tick(&mut cam, &mut input, &mut no_clip));
        assert_eq!(cam.position.z, settled);
    }

    #[test]
    fn duck_recovers_after_release() {
        let mut clock = MotionClock::default();
        let mut cam = CameraState::default();
        let mut input = InputState::default();

        input.duck = true;
        clock.start(Motion::Duck, &mut cam, &mut input, &mut no_clip);
        assert!(clock.tick(&mut cam, &mut input, &mut no_clip));
        assert!((cam.position.y + 140.0).abs() < 1e-9);

        // Releasing does not stop the return animation.
        input.duck = false;
        assert!(clock.tick(&mut cam, &mut input, &mut no_clip));
        assert!((cam.position.y + 70.0).abs() < 1e-9);
        assert!(clock.is_active(Motion::Duck));

        assert!(clock.tick(&mut cam, &mut input, &mut no_clip));
        assert_eq!(cam.position.y, 0.0);
        assert!(!clock.is_active(Motion::Duck));
    }

    #[test]
    fn jump_runs_to_ground_and_restarts_identically() {
        let mut clock = MotionClock::default();
        let mut cam = CameraState::default();
        let mut input = InputState::default();

        input.jumping = true;
        clock.start(Motion::Jump, &mut cam, &mut input, &mut no_clip);
        // First application: the impulse has already decayed once.
        assert!((cam.position.y - 143.0).abs() < 1e-9);

        let mut heights = vec![cam.position.y];
        let mut ticks = 0;
        while clock.is_active(Motion::Jump) {
            clock.tick(&mut cam, &mut input, &mut no_clip);
            heights.push(cam.position.y);
            ticks += 1;
            assert!(ticks < 100, "jump never landed");
        }
        assert_eq!(cam.position.y, 0.0);
        assert!(!input.jumping);

        // A second jump replays the same trajectory.
        input.jumping = true;
        clock.start(Motion::Jump, &mut cam, &mut input, &mut no_clip);
        let mut replay = vec![cam.position.y];
        while clock.is_active(Motion::Jump) {
            clock.tick(&mut cam, &mut input, &mut no_clip);
            replay.push(cam.position.y);
        }
        assert_eq!(heights, replay);
    }

    #[test]
    fn jump_ignores_key_release() {
        let mut clock = MotionClock::default();
        let mut cam = CameraState::default();
        let mut input = InputState::default();

        input.jumping = true;
        clock.start(Motion::Jump, &mut cam, &mut input, &mut no_clip);
        // Still airborne after a couple of ticks with no key held.
        clock.tick(&mut cam, &mut input, &mut no_clip);
        clock.tick(&mut cam, &mut input, &mut no_clip);
        assert!(cam.position.y > 0.0);
        assert!(clock.is_active(Motion::Jump));
    }

    #[test]
    fn shift_doubles_turn_and_move_units() {
        let mut clock = MotionClock::default();
        let mut cam = CameraState::default();
        let mut input = InputState::default();

        clock.set_speed_multiplier(2.0);
        input.left = true;
        clock.start(Motion::TurnLeft, &mut cam, &mut input, &mut no_clip);
        assert!((cam.heading() - 5.0).abs() < 1e-9);

        // The next press resets to normal speed.
        input.left = false;
        while clock.any_active() {
            clock.tick(&mut cam, &mut input, &mut no_clip);
        }
        clock.set_speed_multiplier(1.0);
        input.up = true;
        let z = cam.position.z;
        clock.start(Motion::MoveForward, &mut cam, &mut input, &mut no_clip);
        assert!(((z - cam.position.z).abs() - 120.0 * cam.heading().to_radians().cos().abs()).abs() < 1.0);
    }

    #[test]
    fn starting_an_active_motion_is_a_no_op() {
        let mut clock = MotionClock::default();
        let mut cam = CameraState::default();
        let mut input = InputState::default();

        input.zoom = true;
        clock.start(Motion::ZoomIn, &mut cam, &mut input, &mut no_clip);
        let once = cam.zoom_level();
        clock.start(Motion::ZoomIn, &mut cam, &mut input, &mut no_clip);
        assert_eq!(cam.zoom_level(), once);
    }

    #[test]
    fn simultaneous_motions_tick_in_declaration_order() {
        let mut clock = MotionClock::default();
        let mut cam = CameraState::default();
        let mut input = InputState::default();

        // Turn left and move forward together: the turn is applied
        // before the move on every tick, so the path curves.
        input.left = true;
        input.up = true;
        clock.start(Motion::TurnLeft, &mut cam, &mut input, &mut no_clip);
        clock.start(Motion::MoveForward, &mut cam, &mut input, &mut no_clip);
        clock.tick(&mut cam, &mut input, &mut no_clip);

        // Two turn steps and two move steps have been applied, each
        // move using the heading as of its own step.
        assert!((cam.heading() - 5.0).abs() < 1e-9);
        let expected_x = 600.0
            - 120.0 * (2.5f64).to_radians().sin()
            - 120.0 * (5.0f64).to_radians().sin();
        assert!((cam.position.x - expected_x).abs() < 1e-6);
    }
}
