//! Camera state and view/projection math.
//!
//! Angles are kept in degrees to match the input sensitivities; they are
//! converted to radians only at the trigonometric boundary.

use glam::{DMat4, DVec3, DVec4};

/// Default camera position in world units.
pub const DEFAULT_POSITION: DVec3 = DVec3::new(600.0, 0.0, 5200.0);
/// Default heading in degrees.
pub const DEFAULT_HEADING: f64 = 0.0;
/// Default pitch in degrees.
pub const DEFAULT_PITCH: f64 = 0.0;
/// Maximum vertical rotation away from level, in degrees.
pub const MAX_PITCH: f64 = 15.0;
/// Default (and maximum) zoom level: the projection half-extent at the
/// near plane.
pub const DEFAULT_ZOOM: f64 = 256.0;
/// Smallest permitted zoom level.
pub const MIN_ZOOM: f64 = 0.1;
/// Near clipping plane distance.
pub const NEAR_PLANE: f64 = 512.0;
/// Far clipping plane distance.
pub const FAR_PLANE: f64 = 24000.0;

/// How the view transform is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Camera moves through a static world: a plain look-at built from
    /// heading only. Pitch is ignored in this mode — a known limitation
    /// kept from the reference behavior.
    FirstPersonLookAt,
    /// World moves around a static camera: rotate by -pitch, then by
    /// -heading, then translate by -position. The richer mode; clipping
    /// and duck/jump assume it.
    #[default]
    WorldRelative,
}

/// First-person camera state: position, heading, pitch, and zoom.
///
/// Invariants: heading always lands in `[0, 360)`; pitch never exceeds
/// `[-MAX_PITCH, MAX_PITCH]`; zoom stays within `[MIN_ZOOM,
/// DEFAULT_ZOOM]`. Mutated only through the turn/move/zoom operations.
#[derive(Debug, Clone)]
pub struct CameraState {
    /// World-space eye position. Public so a clipping policy can rewrite
    /// any coordinate in place.
    pub position: DVec3,
    heading: f64,
    pitch: f64,
    zoom: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION,
            heading: DEFAULT_HEADING,
            pitch: DEFAULT_PITCH,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl CameraState {
    /// Current heading in degrees, always in `[0, 360)`.
    #[must_use]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Current pitch in degrees, always in `[-MAX_PITCH, MAX_PITCH]`.
    #[must_use]
    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Current zoom level, always in `[MIN_ZOOM, DEFAULT_ZOOM]`.
    #[must_use]
    pub fn zoom_level(&self) -> f64 {
        self.zoom
    }

    /// Turn `d` degrees left (negative: right). Wraps indefinitely in
    /// either direction; the result is normalized into `[0, 360)`.
    pub fn turn_horizontal(&mut self, d: f64) {
        self.heading = (self.heading + d).rem_euclid(360.0);
    }

    /// Turn `d` degrees up (negative: down), clamped to the vertical
    /// limit.
    ///
    /// When the delta would cross a limit the clamp wins: the pitch
    /// snaps exactly to the limit value rather than wrapping past it.
    /// Only the in-range path applies the modulo.
    pub fn turn_vertical(&mut self, d: f64) {
        if self.pitch + d >= MAX_PITCH {
            self.pitch = MAX_PITCH;
        } else if self.pitch + d <= -MAX_PITCH {
            self.pitch = -MAX_PITCH;
        } else {
            self.pitch = (self.pitch + d) % 360.0;
        }
    }

    /// Move `d` units forward along the current heading (negative:
    /// backward). Vertical position is unaffected.
    pub fn move_forward(&mut self, d: f64) {
        let h = self.heading.to_radians();
        self.position.x += -d * h.sin();
        self.position.z += -d * h.cos();
    }

    /// Move `d` units to the left, perpendicular to the current heading
    /// (negative: right).
    pub fn move_sideways(&mut self, d: f64) {
        let h = self.heading.to_radians();
        self.position.x += -d * h.cos();
        self.position.z += d * h.sin();
    }

    /// Move `d` units straight up (negative: down).
    pub fn move_up(&mut self, d: f64) {
        self.position.y += d;
    }

    /// Narrow the projection by `amount` (negative: widen).
    ///
    /// The zoom level floors at exactly [`MIN_ZOOM`] and ceils at
    /// [`DEFAULT_ZOOM`]; overshooting either bound snaps to it.
    pub fn zoom(&mut self, amount: f64) {
        if self.zoom - amount <= 0.0 {
            self.zoom = MIN_ZOOM;
        } else if self.zoom - amount >= DEFAULT_ZOOM {
            self.zoom = DEFAULT_ZOOM;
        } else {
            self.zoom -= amount;
        }
    }

    /// Reset pitch and zoom to their defaults. Position and heading are
    /// deliberately left alone.
    pub fn reset_view(&mut self) {
        self.pitch = DEFAULT_PITCH;
        self.zoom = DEFAULT_ZOOM;
    }

    /// The unit direction the camera faces on the ground plane.
    #[must_use]
    pub fn forward(&self) -> DVec3 {
        let h = self.heading.to_radians();
        DVec3::new(-h.sin(), 0.0, -h.cos())
    }

    /// Build the view matrix for the given mode.
    #[must_use]
    pub fn view_matrix(&self, mode: ViewMode) -> DMat4 {
        match mode {
            ViewMode::FirstPersonLookAt => DMat4::look_at_rh(
                self.position,
                self.position + self.forward(),
                DVec3::Y,
            ),
            ViewMode::WorldRelative => {
                DMat4::from_rotation_x(-self.pitch.to_radians())
                    * DMat4::from_rotation_y(-self.heading.to_radians())
                    * DMat4::from_translation(-self.position)
            }
        }
    }

    /// Build the perspective projection for the given aspect ratio
    /// (width / height), using the current zoom as the near-plane
    /// half-extents.
    #[must_use]
    pub fn projection_matrix(&self, aspect: f64) -> DMat4 {
        frustum_rh(
            -self.zoom * aspect,
            self.zoom * aspect,
            -self.zoom,
            self.zoom,
            NEAR_PLANE,
            FAR_PLANE,
        )
    }
}

/// Right-handed perspective frustum with `[0, 1]` depth range (the
/// wgpu/Vulkan convention).
#[must_use]
pub fn frustum_rh(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> DMat4 {
    let rw = 1.0 / (right - left);
    let rh = 1.0 / (top - bottom);
    let rd = 1.0 / (near - far);
    DMat4::from_cols(
        DVec4::new(2.0 * near * rw, 0.0, 0.0, 0.0),
        DVec4::new(0.0, 2.0 * near * rh, 0.0, 0.0),
        DVec4::new(
            (right + left) * rw,
            (top + bottom) * rh,
            far * rd,
            -1.0,
        ),
        DVec4::new(0.0, 0.0, near * far * rd, 0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn heading_wraps_into_range() {
        let mut cam = CameraState::default();
        cam.turn_horizontal(370.0);
        assert!((cam.heading() - 10.0).abs() < EPS);

        cam.turn_horizontal(-30.0);
        assert!((cam.heading() - 340.0).abs() < EPS);

        // Many full wraps in either direction stay normalized.
        cam.turn_horizontal(-3600.0);
        assert!((cam.heading() - 340.0).abs() < EPS);
        assert!(cam.heading() >= 0.0 && cam.heading() < 360.0);
    }

    #[test]
    fn pitch_snaps_to_limit_instead_of_wrapping() {
        let mut cam = CameraState::default();
        cam.turn_vertical(14.0);
        assert!((cam.pitch() - 14.0).abs() < EPS);

        // Crossing the limit snaps exactly to it, no wrap.
        cam.turn_vertical(100.0);
        assert_eq!(cam.pitch(), MAX_PITCH);

        cam.turn_vertical(-100.0);
        assert_eq!(cam.pitch(), -MAX_PITCH);

        // Hitting the limit exactly also snaps.
        let mut cam = CameraState::default();
        cam.turn_vertical(MAX_PITCH);
        assert_eq!(cam.pitch(), MAX_PITCH);
    }

    #[test]
    fn in_range_pitch_sums_deltas() {
        let mut cam = CameraState::default();
        for _ in 0..5 {
            cam.turn_vertical(2.0);
        }
        assert!((cam.pitch() - 10.0).abs() < EPS);
    }

    #[test]
    fn forward_motion_follows_heading() {
        let mut cam = CameraState::default();
        let start = cam.position;
        cam.move_forward(120.0);
        let delta = cam.position - start;
        assert!(delta.x.abs() < EPS);
        assert!(delta.y.abs() < EPS);
        assert!((delta.z + 120.0).abs() < EPS);

        let mut cam = CameraState::default();
        cam.turn_horizontal(90.0);
        let start = cam.position;
        cam.move_forward(120.0);
        let delta = cam.position - start;
        assert!((delta.x + 120.0).abs() < 1e-6);
        assert!(delta.z.abs() < 1e-6);
    }

    #[test]
    fn sideways_motion_is_perpendicular() {
        let mut cam = CameraState::default();
        let start = cam.position;
        cam.move_sideways(50.0);
        let delta = cam.position - start;
        // Heading 0 faces -Z, so left is -X.
        assert!((delta.x + 50.0).abs() < EPS);
        assert!(delta.z.abs() < EPS);
    }

    #[test]
    fn zoom_clamps_at_both_ends() {
        let mut cam = CameraState::default();
        cam.zoom(5.0);
        assert!((cam.zoom_level() - 251.0).abs() < EPS);

        // Widening past the default snaps to the default.
        cam.zoom(-100.0);
        assert_eq!(cam.zoom_level(), DEFAULT_ZOOM);

        // Narrowing past the floor snaps to exactly MIN_ZOOM and never
        // goes negative.
        for _ in 0..100 {
            cam.zoom(5.0);
        }
        assert_eq!(cam.zoom_level(), MIN_ZOOM);
        cam.zoom(5.0);
        assert_eq!(cam.zoom_level(), MIN_ZOOM);
    }

    #[test]
    fn reset_view_keeps_position_and_heading() {
        let mut cam = CameraState::default();
        cam.turn_horizontal(45.0);
        cam.turn_vertical(10.0);
        cam.zoom(50.0);
        cam.move_forward(300.0);
        let pos = cam.position;
        let heading = cam.heading();

        cam.reset_view();
        assert_eq!(cam.pitch(), DEFAULT_PITCH);
        assert_eq!(cam.zoom_level(), DEFAULT_ZOOM);
        assert_eq!(cam.position, pos);
        assert_eq!(cam.heading(), heading);
    }

    #[test]
    fn world_relative_view_centers_the_eye() {
        let cam = CameraState::default();
        let view = cam.view_matrix(ViewMode::WorldRelative);
        let eye = view.transform_point3(cam.position);
        assert!(eye.length() < 1e-6);

        // A point one unit ahead of the camera lands on -Z in view space.
        let ahead = cam.position + cam.forward();
        let v = view.transform_point3(ahead);
        assert!(v.x.abs() < 1e-6);
        assert!(v.y.abs() < 1e-6);
        assert!((v.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn look_at_mode_ignores_pitch() {
        let mut cam = CameraState::default();
        let level = cam.view_matrix(ViewMode::FirstPersonLookAt);
        cam.turn_vertical(10.0);
        let pitched = cam.view_matrix(ViewMode::FirstPersonLookAt);
        assert_eq!(level, pitched);
    }

    #[test]
    fn frustum_maps_near_and_far_to_unit_depth() {
        let m = frustum_rh(-1.0, 1.0, -1.0, 1.0, 2.0, 100.0);

        let near = m * glam::DVec4::new(0.0, 0.0, -2.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-9);

        let far = m * glam::DVec4::new(0.0, 0.0, -100.0, 1.0);
        assert!((far.z / far.w - 1.0).abs() < 1e-9);
    }

    #[test]
    fn projection_half_extents_scale_with_zoom() {
        let mut cam = CameraState::default();
        cam.zoom(128.0); // zoom level 128
        let m = cam.projection_matrix(2.0);
        // A point at the near-plane corner projects to ndc (1, -1).
        let corner = m * glam::DVec4::new(128.0 * 2.0, -128.0, -NEAR_PLANE, 1.0);
        assert!((corner.x / corner.w - 1.0).abs() < 1e-9);
        assert!((corner.y / corner.w + 1.0).abs() < 1e-9);
    }
}
