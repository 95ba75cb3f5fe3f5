use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use galleria::error::GalleriaError;
use galleria::navigator::{
    Modifiers, NavEvent, NavKey, Navigator, PointerButton, Response, TICK_INTERVAL_MS,
};
use galleria::renderer::MuseumRenderer;
use galleria::scene::{self, Museum, MuseumAction, ANI_RATE_MS, MAX_TEXTURES, TEXTURE_PATHS};
use galleria::texture::{self, PngTexture};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowId};

struct MuseumApp {
    window: Option<Arc<Window>>,
    renderer: Option<MuseumRenderer>,
    navigator: Option<Navigator>,
    museum: Rc<RefCell<Museum>>,
    /// Host actions queued by the museum's key bindings.
    actions: Rc<RefCell<Vec<MuseumAction>>>,
    textures: Vec<PngTexture>,
    modifiers: Modifiers,
    last_cursor: (f64, f64),
    /// Set after warping the pointer; the next center-position move is
    /// the warp echo and gets the synthetic tag.
    expect_warp_echo: bool,
    next_animation: Instant,
    next_motion: Option<Instant>,
}

impl MuseumApp {
    fn new(textures: Vec<PngTexture>) -> Self {
        Self {
            window: None,
            renderer: None,
            navigator: None,
            museum: Rc::new(RefCell::new(Museum::new())),
            actions: Rc::new(RefCell::new(Vec::new())),
            textures,
            modifiers: Modifiers::default(),
            last_cursor: (0.0, 0.0),
            expect_warp_echo: false,
            next_animation: Instant::now() + Duration::from_millis(ANI_RATE_MS),
            next_motion: None,
        }
    }

    fn window_center(&self) -> (f64, f64) {
        self.window.as_ref().map_or((0.0, 0.0), |window| {
            let size = window.inner_size();
            (f64::from(size.width / 2), f64::from(size.height / 2))
        })
    }

    /// Act on a navigator response: schedule a redraw, warp the pointer
    /// back to center, and arm the motion timer if a motion started.
    fn apply_response(&mut self, response: Response) {
        if response.warp_pointer {
            let (cx, cy) = self.window_center();
            if let Some(window) = &self.window {
                match window.set_cursor_position(PhysicalPosition::new(cx, cy)) {
                    Ok(()) => self.expect_warp_echo = true,
                    Err(e) => log::warn!("pointer warp unavailable: {e}"),
                }
            }
        }
        if response.redraw {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        if self.next_motion.is_none()
            && self.navigator.as_ref().is_some_and(Navigator::needs_tick)
        {
            self.next_motion = Some(Instant::now() + Duration::from_millis(TICK_INTERVAL_MS));
        }
    }

    fn drain_actions(&mut self, event_loop: &ActiveEventLoop) {
        let actions: Vec<MuseumAction> = self.actions.borrow_mut().drain(..).collect();
        for action in actions {
            match action {
                MuseumAction::None => {}
                MuseumAction::Quit => event_loop.exit(),
                MuseumAction::ToggleFullscreen => {
                    if let Some(window) = &self.window {
                        if window.fullscreen().is_some() {
                            window.set_fullscreen(None);
                        } else {
                            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
                        }
                    }
                }
            }
        }
    }
}

impl ApplicationHandler for MuseumApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title("Galleria")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("window creation failed: {e}");
                std::process::exit(GalleriaError::Viewer(e.to_string()).exit_code());
            }
        };

        let size = window.inner_size();
        let renderer = pollster::block_on(MuseumRenderer::new(
            window.clone(),
            (size.width, size.height),
            &self.museum.borrow(),
            &self.textures,
        ));
        let renderer = match renderer {
            Ok(renderer) => renderer,
            Err(e) => {
                let e = GalleriaError::from(e);
                log::error!("{e}");
                std::process::exit(e.exit_code());
            }
        };

        let mut navigator = Navigator::new(size.width, size.height);
        navigator.set_clip_hook(Box::new(scene::wall_clip));
        let museum = Rc::clone(&self.museum);
        let actions = Rc::clone(&self.actions);
        navigator.set_key_down_hook(Box::new(move |key: NavKey, _| {
            let action = museum.borrow_mut().handle_key(key);
            if action != MuseumAction::None {
                actions.borrow_mut().push(action);
            }
        }));

        window.request_redraw();
        self.window = Some(window);
        self.renderer = Some(renderer);
        self.navigator = Some(navigator);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
                if let Some(navigator) = &mut self.navigator {
                    let response = navigator.handle_event(NavEvent::Resized {
                        width: size.width,
                        height: size.height,
                    });
                    self.apply_response(response);
                }
            }

            WindowEvent::RedrawRequested => {
                let museum = Rc::clone(&self.museum);
                if let (Some(window), Some(renderer), Some(navigator)) =
                    (&self.window, &mut self.renderer, &self.navigator)
                {
                    let params = navigator.view_params();
                    match renderer.render(&params, &museum.borrow()) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                            let inner = window.inner_size();
                            renderer.resize(inner.width, inner.height);
                        }
                        Err(e) => {
                            log::error!("render error: {e:?}");
                        }
                    }
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(button) = PointerButton::from_winit(button) {
                    let (x, y) = self.last_cursor;
                    if let Some(navigator) = &mut self.navigator {
                        let response = navigator.handle_event(NavEvent::Button {
                            button,
                            pressed: state == ElementState::Pressed,
                            x,
                            y,
                        });
                        self.apply_response(response);
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.last_cursor = (position.x, position.y);
                let (cx, cy) = self.window_center();
                let at_center = (position.x - cx).abs() < 1.0 && (position.y - cy).abs() < 1.0;
                let synthetic = self.expect_warp_echo && at_center;
                if synthetic {
                    self.expect_warp_echo = false;
                }
                if let Some(navigator) = &mut self.navigator {
                    let response = navigator.handle_event(NavEvent::PointerMoved {
                        x: position.x,
                        y: position.y,
                        synthetic,
                    });
                    self.apply_response(response);
                }
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                let state = modifiers.state();
                self.modifiers = Modifiers {
                    shift: state.shift_key(),
                    alt: state.alt_key(),
                };
            }

            WindowEvent::KeyboardInput { event, .. } => {
                // The smooth-motion clock assumes one press per physical
                // press; auto-repeat would re-trigger immediate steps.
                if event.repeat {
                    return;
                }
                if let Some(key) = NavKey::from_winit(&event.logical_key) {
                    let modifiers = self.modifiers;
                    if let Some(navigator) = &mut self.navigator {
                        let response = navigator.handle_event(NavEvent::Key {
                            key,
                            pressed: event.state == ElementState::Pressed,
                            modifiers,
                        });
                        self.apply_response(response);
                    }
                    self.drain_actions(event_loop);
                }
            }

            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let mut redraw = false;

        if now >= self.next_animation {
            if self.museum.borrow_mut().advance() {
                redraw = true;
            }
            self.next_animation = now + Duration::from_millis(ANI_RATE_MS);
        }

        if let Some(navigator) = &mut self.navigator {
            if let Some(deadline) = self.next_motion {
                if now >= deadline {
                    if navigator.tick() {
                        redraw = true;
                    }
                    self.next_motion = navigator
                        .needs_tick()
                        .then(|| now + Duration::from_millis(TICK_INTERVAL_MS));
                }
            }
        }

        if redraw {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }

        let mut deadline = self.next_animation;
        if let Some(motion) = self.next_motion {
            deadline = deadline.min(motion);
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
    }
}

/// Load every scene texture up front, enforcing the slot limit and the
/// power-of-two dimension rule.
fn load_textures() -> Result<Vec<PngTexture>, GalleriaError> {
    if TEXTURE_PATHS.len() > MAX_TEXTURES {
        return Err(GalleriaError::TooManyTextures {
            requested: TEXTURE_PATHS.len(),
            limit: MAX_TEXTURES,
        });
    }
    let mut textures = Vec::with_capacity(TEXTURE_PATHS.len());
    for path in TEXTURE_PATHS {
        let tex = texture::load(path)?;
        if !tex.is_power_of_two() {
            return Err(GalleriaError::TextureSize {
                width: tex.width,
                height: tex.height,
            });
        }
        textures.push(tex);
    }
    Ok(textures)
}

fn run() -> Result<(), GalleriaError> {
    let textures = load_textures()?;

    let event_loop = EventLoop::new().map_err(|e| GalleriaError::Viewer(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = MuseumApp::new(textures);
    event_loop
        .run_app(&mut app)
        .map_err(|e| GalleriaError::Viewer(e.to_string()))
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(e.exit_code());
    }
}
