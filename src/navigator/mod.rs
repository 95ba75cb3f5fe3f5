//! First-person navigation component.
//!
//! [`Navigator`] owns the camera, the key/mouse bookkeeping, and the
//! smooth-motion clock, and knows nothing about the scene it navigates.
//! The host feeds it translated [`NavEvent`]s and clock ticks; the
//! scene customizes it through three hooks:
//!
//! - a clip hook, run after every positional change while clipping is
//!   enabled, free to rewrite the position to enforce bounds,
//! - key hooks, run after the built-in bindings on every key event,
//! - a draw hook, handed the assembled view parameters on [`display`].
//!
//! [`display`]: Navigator::display

pub mod camera;
pub mod event;
pub mod input;
pub mod motion;

pub use camera::{CameraState, ViewMode};
pub use event::{Modifiers, NavEvent, NavKey, PointerButton};
pub use input::{InputState, MouseMode};
pub use motion::{Motion, MotionClock, TICK_INTERVAL_MS};

use glam::{DMat4, DVec3};

/// Degrees turned per pixel of pointer travel while rotating.
pub const ROTATE_SENSITIVITY: f64 = 0.2;
/// World units strafed per pixel while panning.
pub const PAN_SIDEWAYS_SENSITIVITY: f64 = 4.5;
/// World units moved forward per pixel while panning.
pub const PAN_FORWARD_SENSITIVITY: f64 = 6.0;
/// Lowest camera height the built-in clip hook allows.
pub const DEFAULT_FLOOR_CLIP: f64 = -230.0;

/// Rewrites the camera position in place to keep it in bounds.
pub type ClipHook = Box<dyn FnMut(&mut DVec3)>;
/// Observes key events after the built-in bindings have run.
pub type KeyHook = Box<dyn FnMut(NavKey, Modifiers)>;
/// Renders the scene for the given view parameters.
pub type DrawHook = Box<dyn FnMut(&ViewParams)>;

/// Everything a draw hook needs to render one frame.
#[derive(Debug, Clone, Copy)]
pub struct ViewParams {
    pub view: DMat4,
    pub projection: DMat4,
    pub eye: DVec3,
    pub show_origin: bool,
}

/// What the host should do after delivering an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Response {
    /// The view changed; schedule a redraw.
    pub redraw: bool,
    /// Warp the pointer back to the window center and tag the resulting
    /// motion event as synthetic.
    pub warp_pointer: bool,
}

impl Response {
    const REDRAW: Self = Self { redraw: true, warp_pointer: false };
    const WARP: Self = Self { redraw: false, warp_pointer: true };
}

/// Built-in floor clip: clamps the vertical coordinate only.
pub fn default_clip(pos: &mut DVec3) {
    if pos.y < DEFAULT_FLOOR_CLIP {
        pos.y = DEFAULT_FLOOR_CLIP;
    }
}

/// Scene-independent first-person navigator.
pub struct Navigator {
    camera: CameraState,
    input: InputState,
    clock: MotionClock,
    view_mode: ViewMode,
    clipping: bool,
    show_origin: bool,
    width: u32,
    height: u32,
    clip_hook: ClipHook,
    key_down_hook: Option<KeyHook>,
    key_up_hook: Option<KeyHook>,
    draw_hook: Option<DrawHook>,
}

impl Navigator {
    /// A navigator at the default pose, sized to the given window.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            camera: CameraState::default(),
            input: InputState::default(),
            clock: MotionClock::default(),
            view_mode: ViewMode::default(),
            clipping: true,
            show_origin: false,
            width,
            height,
            clip_hook: Box::new(default_clip),
            key_down_hook: None,
            key_up_hook: None,
            draw_hook: None,
        }
    }

    #[must_use]
    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    #[must_use]
    pub fn clipping_enabled(&self) -> bool {
        self.clipping
    }

    #[must_use]
    pub fn origin_shown(&self) -> bool {
        self.show_origin
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    /// Replace the clipping policy. The navigator keeps calling it
    /// without ever learning the scene's geometry.
    pub fn set_clip_hook(&mut self, hook: ClipHook) {
        self.clip_hook = hook;
    }

    /// Install a key-down observer, chained after the built-in
    /// bindings.
    pub fn set_key_down_hook(&mut self, hook: KeyHook) {
        self.key_down_hook = Some(hook);
    }

    /// Install a key-up observer, chained after the built-in bindings.
    pub fn set_key_up_hook(&mut self, hook: KeyHook) {
        self.key_up_hook = Some(hook);
    }

    pub fn set_draw_hook(&mut self, hook: DrawHook) {
        self.draw_hook = Some(hook);
    }

    /// Feed one translated input event through the navigator.
    pub fn handle_event(&mut self, event: NavEvent) -> Response {
        match event {
            NavEvent::Resized { width, height } => {
                self.width = width;
                self.height = height;
                Response::REDRAW
            }
            NavEvent::Button { button, pressed, .. } => self.handle_button(button, pressed),
            NavEvent::PointerMoved { x, y, synthetic } => self.handle_pointer(x, y, synthetic),
            NavEvent::Key {
                key,
                pressed,
                modifiers,
            } => self.handle_key(key, pressed, modifiers),
        }
    }

    fn handle_button(&mut self, button: PointerButton, pressed: bool) -> Response {
        if pressed {
            self.input.mouse_mode = match button {
                PointerButton::Left => MouseMode::Panning,
                PointerButton::Middle => MouseMode::Zooming,
                PointerButton::Right => MouseMode::Rotating,
            };
            // Capture the center as the delta reference point.
            Response::WARP
        } else {
            self.input.mouse_mode = MouseMode::Idle;
            Response::default()
        }
    }

    fn handle_pointer(&mut self, x: f64, y: f64, synthetic: bool) -> Response {
        // A warp echo carries no user intent; letting it through would
        // feed the warp distance back into the camera every frame.
        if synthetic || self.input.mouse_mode == MouseMode::Idle {
            return Response::default();
        }

        let dx = f64::from(self.width / 2) - x;
        let dy = f64::from(self.height / 2) - y;

        match self.input.mouse_mode {
            MouseMode::Idle => unreachable!(),
            MouseMode::Rotating => {
                self.camera.turn_horizontal(ROTATE_SENSITIVITY * dx);
                self.camera.turn_vertical(ROTATE_SENSITIVITY * dy);
            }
            MouseMode::Zooming => {
                self.camera.zoom(dy);
            }
            MouseMode::Panning => {
                self.camera.move_sideways(PAN_SIDEWAYS_SENSITIVITY * dx);
                self.apply_clip();
                self.camera.move_forward(PAN_FORWARD_SENSITIVITY * dy);
                self.apply_clip();
            }
        }

        Response {
            redraw: true,
            warp_pointer: true,
        }
    }

    fn handle_key(&mut self, key: NavKey, pressed: bool, modifiers: Modifiers) -> Response {
        let mut response = if pressed {
            self.handle_key_down(key, modifiers)
        } else {
            self.handle_key_up(key)
        };

        let hook = if pressed {
            self.key_down_hook.as_mut()
        } else {
            self.key_up_hook.as_mut()
        };
        if let Some(hook) = hook {
            hook(key, modifiers);
            // The hook may have changed scene state the host can't see.
            response.redraw = true;
        }
        response
    }

    fn handle_key_down(&mut self, key: NavKey, modifiers: Modifiers) -> Response {
        match key {
            NavKey::ArrowLeft | NavKey::ArrowRight | NavKey::ArrowUp | NavKey::ArrowDown => {
                self.clock
                    .set_speed_multiplier(if modifiers.shift { 2.0 } else { 1.0 });
                let (held, motion) = match key {
                    NavKey::ArrowLeft => (
                        &mut self.input.left,
                        if modifiers.alt {
                            Motion::StrafeLeft
                        } else {
                            Motion::TurnLeft
                        },
                    ),
                    NavKey::ArrowRight => (
                        &mut self.input.right,
                        if modifiers.alt {
                            Motion::StrafeRight
                        } else {
                            Motion::TurnRight
                        },
                    ),
                    NavKey::ArrowUp => (
                        &mut self.input.up,
                        if modifiers.alt {
                            Motion::TurnUp
                        } else {
                            Motion::MoveForward
                        },
                    ),
                    NavKey::ArrowDown => (
                        &mut self.input.down,
                        if modifiers.alt {
                            Motion::TurnDown
                        } else {
                            Motion::MoveBackward
                        },
                    ),
                    _ => unreachable!(),
                };
                if !*held {
                    *held = true;
                    self.start_motion(motion);
                }
                Response::REDRAW
            }
            NavKey::ZoomIn => {
                self.input.zoom = true;
                self.start_motion(Motion::ZoomIn);
                Response::REDRAW
            }
            NavKey::ZoomOut => {
                self.input.zoom = true;
                self.start_motion(Motion::ZoomOut);
                Response::REDRAW
            }
            NavKey::Duck => {
                self.input.duck = true;
                self.start_motion(Motion::Duck);
                Response::REDRAW
            }
            NavKey::Jump => {
                // One jump at a time; the guard clears on landing.
                if !self.input.jumping {
                    self.input.jumping = true;
                    self.start_motion(Motion::Jump);
                }
                Response::REDRAW
            }
            NavKey::ToggleClipping => {
                self.clipping = !self.clipping;
                Response::default()
            }
            NavKey::ToggleOrigin => {
                self.show_origin = !self.show_origin;
                Response::REDRAW
            }
            NavKey::ResetView => {
                self.camera.reset_view();
                Response::REDRAW
            }
            NavKey::Char(_) => Response::default(),
        }
    }

    fn handle_key_up(&mut self, key: NavKey) -> Response {
        match key {
            NavKey::ArrowLeft => self.input.left = false,
            NavKey::ArrowRight => self.input.right = false,
            NavKey::ArrowUp => self.input.up = false,
            NavKey::ArrowDown => self.input.down = false,
            NavKey::ZoomIn | NavKey::ZoomOut => self.input.zoom = false,
            NavKey::Duck => self.input.duck = false,
            _ => {}
        }
        Response::default()
    }

    /// True while any continuous motion still wants clock ticks. The
    /// host only needs to arm the tick timer while this holds.
    #[must_use]
    pub fn needs_tick(&self) -> bool {
        self.clock.any_active()
    }

    /// Advance all active motions by one clock tick. Returns true if
    /// the view changed.
    pub fn tick(&mut self) -> bool {
        let Self {
            camera,
            input,
            clock,
            clipping,
            clip_hook,
            ..
        } = self;
        let mut clip = |cam: &mut CameraState| {
            if *clipping {
                clip_hook(&mut cam.position);
            }
        };
        clock.tick(camera, input, &mut clip)
    }

    fn start_motion(&mut self, motion: Motion) {
        let Self {
            camera,
            input,
            clock,
            clipping,
            clip_hook,
            ..
        } = self;
        let mut clip = |cam: &mut CameraState| {
            if *clipping {
                clip_hook(&mut cam.position);
            }
        };
        clock.start(motion, camera, input, &mut clip);
    }

    fn apply_clip(&mut self) {
        if self.clipping {
            (self.clip_hook)(&mut self.camera.position);
        }
    }

    /// Assemble the view parameters for the current pose.
    #[must_use]
    pub fn view_params(&self) -> ViewParams {
        let aspect = f64::from(self.width) / f64::from(self.height.max(1));
        ViewParams {
            view: self.camera.view_matrix(self.view_mode),
            projection: self.camera.projection_matrix(aspect),
            eye: self.camera.position,
            show_origin: self.show_origin,
        }
    }

    /// Run the draw hook with the current view parameters.
    pub fn display(&mut self) {
        let params = self.view_params();
        if let Some(hook) = self.draw_hook.as_mut() {
            hook(&params);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn press(key: NavKey) -> NavEvent {
        NavEvent::Key {
            key,
            pressed: true,
            modifiers: Modifiers::default(),
        }
    }

    fn release(key: NavKey) -> NavEvent {
        NavEvent::Key {
            key,
            pressed: false,
            modifiers: Modifiers::default(),
        }
    }

    #[test]
    fn button_press_requests_warp_and_sets_mode() {
        let mut nav = Navigator::new(800, 600);
        let resp = nav.handle_event(NavEvent::Button {
            button: PointerButton::Right,
            pressed: true,
            x: 100.0,
            y: 100.0,
        });
        assert!(resp.warp_pointer);
        assert_eq!(nav.input().mouse_mode, MouseMode::Rotating);

        let resp = nav.handle_event(NavEvent::Button {
            button: PointerButton::Right,
            pressed: false,
            x: 100.0,
            y: 100.0,
        });
        assert!(!resp.warp_pointer);
        assert_eq!(nav.input().mouse_mode, MouseMode::Idle);
    }

    #[test]
    fn synthetic_pointer_moves_are_dropped() {
        let mut nav = Navigator::new(800, 600);
        nav.handle_event(NavEvent::Button {
            button: PointerButton::Right,
            pressed: true,
            x: 400.0,
            y: 300.0,
        });

        let before = nav.camera().heading();
        let resp = nav.handle_event(NavEvent::PointerMoved {
            x: 350.0,
            y: 300.0,
            synthetic: true,
        });
        assert_eq!(resp, Response::default());
        assert_eq!(nav.camera().heading(), before);

        // The same move without the tag turns the camera.
        let resp = nav.handle_event(NavEvent::PointerMoved {
            x: 350.0,
            y: 300.0,
            synthetic: false,
        });
        assert!(resp.redraw && resp.warp_pointer);
        assert!((nav.camera().heading() - 0.2 * 50.0).abs() < 1e-9);
    }

    #[test]
    fn pointer_moves_while_idle_do_nothing() {
        let mut nav = Navigator::new(800, 600);
        let resp = nav.handle_event(NavEvent::PointerMoved {
            x: 0.0,
            y: 0.0,
            synthetic: false,
        });
        assert_eq!(resp, Response::default());
    }

    #[test]
    fn panning_moves_and_rotating_turns() {
        let mut nav = Navigator::new(800, 600);
        nav.handle_event(NavEvent::Button {
            button: PointerButton::Left,
            pressed: true,
            x: 400.0,
            y: 300.0,
        });
        // 10 px left of center, 20 px above center.
        nav.handle_event(NavEvent::PointerMoved {
            x: 390.0,
            y: 280.0,
            synthetic: false,
        });
        let pos = nav.camera().position;
        // Heading 0: sideways +x is -X, forward is -Z.
        assert!((pos.x - (600.0 - 4.5 * 10.0)).abs() < 1e-9);
        assert!((pos.z - (5200.0 - 6.0 * 20.0)).abs() < 1e-9);
    }

    #[test]
    fn zoom_mode_uses_raw_vertical_delta() {
        let mut nav = Navigator::new(800, 600);
        nav.handle_event(NavEvent::Button {
            button: PointerButton::Middle,
            pressed: true,
            x: 400.0,
            y: 300.0,
        });
        nav.handle_event(NavEvent::PointerMoved {
            x: 400.0,
            y: 290.0,
            synthetic: false,
        });
        assert!((nav.camera().zoom_level() - 246.0).abs() < 1e-9);
    }

    #[test]
    fn arrow_press_applies_an_immediate_step() {
        let mut nav = Navigator::new(800, 600);
        let resp = nav.handle_event(press(NavKey::ArrowUp));
        assert!(resp.redraw);
        assert!(nav.input().up);
        assert!(nav.needs_tick());
        assert!((nav.camera().position.z - (5200.0 - 120.0)).abs() < 1e-9);
    }

    #[test]
    fn held_flag_clears_immediately_on_release() {
        let mut nav = Navigator::new(800, 600);
        nav.handle_event(press(NavKey::ArrowUp));
        nav.handle_event(release(NavKey::ArrowUp));
        assert!(!nav.input().up);
        // The in-flight motion still fires once more.
        assert!(nav.needs_tick());
        assert!(nav.tick());
        assert!(!nav.needs_tick());
    }

    #[test]
    fn alt_arrow_strafes_instead_of_turning() {
        let mut nav = Navigator::new(800, 600);
        nav.handle_event(NavEvent::Key {
            key: NavKey::ArrowLeft,
            pressed: true,
            modifiers: Modifiers {
                shift: false,
                alt: true,
            },
        });
        assert_eq!(nav.camera().heading(), 0.0);
        assert!((nav.camera().position.x - (600.0 - 120.0)).abs() < 1e-9);
    }

    #[test]
    fn clipping_toggle_gates_the_hook() {
        let mut nav = Navigator::new(800, 600);
        nav.set_clip_hook(Box::new(|pos| {
            pos.z = pos.z.min(5100.0);
        }));

        // Clipping on: backward motion is clamped.
        nav.handle_event(press(NavKey::ArrowDown));
        nav.handle_event(release(NavKey::ArrowDown));
        while nav.needs_tick() {
            nav.tick();
        }
        assert_eq!(nav.camera().position.z, 5100.0);

        // Toggle off: the same motion sails past the bound.
        nav.handle_event(press(NavKey::ToggleClipping));
        assert!(!nav.clipping_enabled());
        nav.handle_event(press(NavKey::ArrowDown));
        nav.handle_event(release(NavKey::ArrowDown));
        while nav.needs_tick() {
            nav.tick();
        }
        assert!(nav.camera().position.z > 5100.0);
    }

    #[test]
    fn default_clip_clamps_only_the_floor() {
        let mut pos = DVec3::new(1.0, -1000.0, 2.0);
        default_clip(&mut pos);
        assert_eq!(pos, DVec3::new(1.0, DEFAULT_FLOOR_CLIP, 2.0));

        let mut high = DVec3::new(0.0, 900.0, 0.0);
        default_clip(&mut high);
        assert_eq!(high.y, 900.0);
    }

    #[test]
    fn key_hooks_chain_after_builtin_bindings() {
        let mut nav = Navigator::new(800, 600);
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);
        nav.set_key_down_hook(Box::new(move |key, _| {
            sink.set(Some(key));
        }));

        // A built-in binding still runs, and the hook sees the key too.
        nav.handle_event(press(NavKey::ToggleOrigin));
        assert!(nav.origin_shown());
        assert_eq!(seen.get(), Some(NavKey::ToggleOrigin));

        // Unbound keys reach the hook as well.
        nav.handle_event(press(NavKey::Char('q')));
        assert_eq!(seen.get(), Some(NavKey::Char('q')));
    }

    #[test]
    fn reset_key_restores_pitch_and_zoom_only() {
        let mut nav = Navigator::new(800, 600);
        nav.handle_event(NavEvent::Button {
            button: PointerButton::Right,
            pressed: true,
            x: 400.0,
            y: 300.0,
        });
        nav.handle_event(NavEvent::PointerMoved {
            x: 300.0,
            y: 250.0,
            synthetic: false,
        });
        let heading = nav.camera().heading();
        assert!(heading != 0.0);
        assert!(nav.camera().pitch() != 0.0);

        nav.handle_event(press(NavKey::ResetView));
        assert_eq!(nav.camera().pitch(), 0.0);
        assert_eq!(nav.camera().zoom_level(), camera::DEFAULT_ZOOM);
        assert_eq!(nav.camera().heading(), heading);
    }

    #[test]
    fn jump_key_cannot_retrigger_in_flight() {
        let mut nav = Navigator::new(800, 600);
        nav.handle_event(press(NavKey::Jump));
        nav.handle_event(release(NavKey::Jump));
        let y = nav.camera().position.y;
        assert!(y > 0.0);

        // A second press while airborne changes nothing.
        nav.handle_event(press(NavKey::Jump));
        assert_eq!(nav.camera().position.y, y);

        let mut ticks = 0;
        while nav.needs_tick() {
            nav.tick();
            ticks += 1;
            assert!(ticks < 100);
        }
        assert_eq!(nav.camera().position.y, 0.0);
        assert!(!nav.input().jumping);
    }

    #[test]
    fn draw_hook_receives_current_view() {
        let mut nav = Navigator::new(800, 600);
        let frames = Rc::new(Cell::new(0u32));
        let sink = Rc::clone(&frames);
        nav.set_draw_hook(Box::new(move |params| {
            assert!(!params.show_origin);
            assert_eq!(params.eye, camera::DEFAULT_POSITION);
            sink.set(sink.get() + 1);
        }));
        nav.display();
        assert_eq!(frames.get(), 1);
    }
}
