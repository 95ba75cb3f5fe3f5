//! Held-key and mouse-mode bookkeeping.

/// What the pointer currently controls.
///
/// At most one mode is active at a time; any button release returns to
/// `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseMode {
    #[default]
    Idle,
    /// Left button: pointer deltas pan the camera on the ground plane.
    Panning,
    /// Middle button: vertical pointer deltas drive the zoom.
    Zooming,
    /// Right button: pointer deltas turn the camera.
    Rotating,
}

/// Key-hold state feeding the motion clock.
///
/// Each directional flag is shared by the two motions its key can start
/// (plain and modified), mirroring the one-flag-per-key scheme the
/// motion termination rule depends on. Flags flip on the first key-down
/// and the matching key-up only; auto-repeat never reaches this struct.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    pub mouse_mode: MouseMode,
    /// Left arrow held (turn left or strafe left).
    pub left: bool,
    /// Right arrow held (turn right or strafe right).
    pub right: bool,
    /// Up arrow held (move forward or turn up).
    pub up: bool,
    /// Down arrow held (move backward or turn down).
    pub down: bool,
    /// Either zoom key held.
    pub zoom: bool,
    /// Duck key held.
    pub duck: bool,
    /// True from jump trigger until the camera lands. Blocks
    /// re-triggering while airborne.
    pub jumping: bool,
}

impl InputState {
    /// True if any flag could still demand motion ticks.
    #[must_use]
    pub fn any_held(&self) -> bool {
        self.left || self.right || self.up || self.down || self.zoom || self.duck || self.jumping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        let input = InputState::default();
        assert_eq!(input.mouse_mode, MouseMode::Idle);
        assert!(!input.any_held());
    }

    #[test]
    fn any_held_tracks_each_flag() {
        let mut input = InputState::default();
        input.jumping = true;
        assert!(input.any_held());
        input.jumping = false;
        input.duck = true;
        assert!(input.any_held());
    }
}
