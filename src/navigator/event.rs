//! Window-system-agnostic input events.
//!
//! The host translates its toolkit's events into these before handing
//! them to the navigator, so the navigator logic never touches winit
//! types and stays testable without a window.

/// Pointer buttons the navigator reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

/// Logical keys with navigator meaning.
///
/// Arrow keys drive smooth motion; the rest are one-shot actions. Keys
/// without a dedicated variant arrive as `Char` and fall through to the
/// host's key hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    /// `+` or `=` — narrow the projection while held.
    ZoomIn,
    /// `-` or `_` — widen the projection while held.
    ZoomOut,
    /// `d` — crouch while held.
    Duck,
    /// `j` — jump.
    Jump,
    /// `c` — toggle the position-clipping hook.
    ToggleClipping,
    /// `o` — toggle the origin marker.
    ToggleOrigin,
    /// `0` — reset pitch and zoom.
    ResetView,
    /// Any other printable key, forwarded to the host's key hook.
    Char(char),
}

/// Modifier state captured alongside a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
}

/// An input event in the navigator's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavEvent {
    /// The pointer moved to window coordinates `(x, y)`.
    ///
    /// `synthetic` marks a move the host generated itself by warping
    /// the pointer back to the window center. Synthetic moves must not
    /// feed back into camera deltas; the navigator consumes them
    /// without effect.
    PointerMoved { x: f64, y: f64, synthetic: bool },
    /// A pointer button changed state at window coordinates `(x, y)`.
    Button {
        button: PointerButton,
        pressed: bool,
        x: f64,
        y: f64,
    },
    /// A key changed state. Auto-repeat presses must be filtered out by
    /// the host; the navigator assumes one press per physical press.
    Key {
        key: NavKey,
        pressed: bool,
        modifiers: Modifiers,
    },
    /// The window was resized to `width` x `height` pixels.
    Resized { width: u32, height: u32 },
}

#[cfg(feature = "viewer")]
mod winit_support {
    use winit::event::MouseButton;
    use winit::keyboard::{Key, NamedKey};

    use super::{NavKey, PointerButton};

    impl PointerButton {
        /// Map a winit mouse button, ignoring the ones the navigator
        /// has no use for.
        #[must_use]
        pub fn from_winit(button: MouseButton) -> Option<Self> {
            match button {
                MouseButton::Left => Some(Self::Left),
                MouseButton::Middle => Some(Self::Middle),
                MouseButton::Right => Some(Self::Right),
                _ => None,
            }
        }
    }

    impl NavKey {
        /// Map a winit logical key into the navigator's vocabulary.
        #[must_use]
        pub fn from_winit(key: &Key) -> Option<Self> {
            match key {
                Key::Named(NamedKey::ArrowLeft) => Some(Self::ArrowLeft),
                Key::Named(NamedKey::ArrowRight) => Some(Self::ArrowRight),
                Key::Named(NamedKey::ArrowUp) => Some(Self::ArrowUp),
                Key::Named(NamedKey::ArrowDown) => Some(Self::ArrowDown),
                Key::Character(s) => {
                    let c = s.chars().next()?;
                    Some(match c {
                        '+' | '=' => Self::ZoomIn,
                        '-' | '_' => Self::ZoomOut,
                        'd' | 'D' => Self::Duck,
                        'j' | 'J' => Self::Jump,
                        'c' => Self::ToggleClipping,
                        'o' => Self::ToggleOrigin,
                        '0' => Self::ResetView,
                        other => Self::Char(other),
                    })
                }
                _ => None,
            }
        }
    }
}
