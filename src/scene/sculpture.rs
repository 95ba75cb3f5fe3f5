//! Animation state for the five sculptures and the window.
//!
//! Each `advance` call is one animation tick (100ms). The original
//! per-tick rates were tuned against a 200ms reference interval, so
//! every rate carries the same 0.5 scale factor.

use std::f64::consts::{PI, TAU};

/// Per-tick rate scale: tick interval over the 200ms reference.
const RATE: f64 = 0.5;

/// Heliocentric orbital sculpture: two planets on conic-section orbits
/// and a moon on a circular one.
///
/// Orbits follow `r = l / (1 + e cos(theta))` with the angular speed
/// driven by an inverse-square term, so bodies visibly speed up near
/// perihelion.
#[derive(Debug, Clone)]
pub struct OrbitalSystem {
    pub earth_theta: f64,
    pub earth_dist: f64,
    pub moon_theta: f64,
    pub mercury_theta: f64,
    pub mercury_dist: f64,
}

impl OrbitalSystem {
    pub const EARTH_SEMI_LATUS_RECTUM: f64 = 350.0;
    pub const EARTH_ECCENTRICITY: f64 = 0.75;
    pub const MERCURY_SEMI_LATUS_RECTUM: f64 = 250.0;
    pub const MERCURY_ECCENTRICITY: f64 = 0.58;
    pub const MOON_DIST: f64 = 75.0;
}

impl Default for OrbitalSystem {
    fn default() -> Self {
        Self {
            earth_theta: 0.0,
            earth_dist: 400.0,
            moon_theta: 0.0,
            mercury_theta: 0.0,
            mercury_dist: 300.0,
        }
    }
}

impl OrbitalSystem {
    pub fn advance(&mut self) {
        self.earth_theta +=
            (75000.0 / (self.earth_dist * self.earth_dist) - PI / 220.0) * RATE;
        self.earth_theta %= TAU;
        self.earth_dist = Self::EARTH_SEMI_LATUS_RECTUM
            / (1.0 + Self::EARTH_ECCENTRICITY * self.earth_theta.cos());

        self.moon_theta += (PI / 6.0) * RATE;
        self.moon_theta %= TAU;

        self.mercury_theta +=
            (60000.0 / (self.mercury_dist * self.mercury_dist) - PI / 220.0) * RATE;
        self.mercury_theta %= TAU;
        self.mercury_dist = Self::MERCURY_SEMI_LATUS_RECTUM
            / (1.0 + Self::MERCURY_ECCENTRICITY * self.mercury_theta.cos());
    }
}

/// Four nested toruses spinning on alternating axes at staggered
/// speeds. Each rotation feeds into the next ring's frame, so the
/// motion compounds.
#[derive(Debug, Clone, Default)]
pub struct RingSculpture {
    /// Degrees; index order is outermost to innermost.
    pub rot: [f64; 4],
}

impl RingSculpture {
    const RATES: [f64; 4] = [5.0, 15.0, 25.0, 35.0];

    pub fn advance(&mut self) {
        for (rot, rate) in self.rot.iter_mut().zip(Self::RATES) {
            *rot = (*rot + rate * RATE) % 360.0;
        }
    }
}

/// Crank-and-piston four-bar linkage.
///
/// The piston height follows the slider-crank closure equation
/// `h = r cos(theta) + sqrt(L^2 - (r sin(theta))^2)`.
#[derive(Debug, Clone)]
pub struct PistonCrank {
    pub crank_theta: f64,
    pub piston_height: f64,
}

impl PistonCrank {
    pub const CRANK_RADIUS: f64 = 210.0;
    pub const ROD_LENGTH: f64 = 300.0;

    pub fn advance(&mut self) {
        self.crank_theta += 35.0_f64.to_radians() * RATE;
        self.crank_theta %= TAU;

        let r = Self::CRANK_RADIUS;
        let l = Self::ROD_LENGTH;
        let swing = r * self.crank_theta.sin();
        self.piston_height = r * self.crank_theta.cos() + (l * l - swing * swing).sqrt();
    }

    /// Angle of the connecting rod away from vertical.
    #[must_use]
    pub fn rod_angle(&self) -> f64 {
        (Self::CRANK_RADIUS * self.crank_theta.sin() / Self::ROD_LENGTH).asin()
    }
}

impl Default for PistonCrank {
    fn default() -> Self {
        Self {
            crank_theta: 0.0,
            piston_height: 0.0,
        }
    }
}

/// Sliding glass pane in the far wall. `open` is the pane's horizontal
/// offset, from 0 (closed) to minus the pane width (fully open).
#[derive(Debug, Clone)]
pub struct GlassWindow {
    pub open: f64,
    pub opening: bool,
    width: f64,
}

impl GlassWindow {
    /// Units the pane slides per tick.
    const SLIDE_RATE: f64 = 50.0 * RATE;

    #[must_use]
    pub fn new(width: f64) -> Self {
        Self {
            open: 0.0,
            opening: false,
            width,
        }
    }

    pub fn toggle(&mut self) {
        self.opening = !self.opening;
    }

    pub fn advance(&mut self) {
        if self.opening {
            if self.open > -self.width {
                self.open -= Self::SLIDE_RATE;
            } else {
                self.open = -self.width;
            }
        } else if self.open < 0.0 {
            self.open += Self::SLIDE_RATE;
        } else {
            self.open = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_radius_stays_between_apsides() {
        let mut orbit = OrbitalSystem::default();
        let perihelion = OrbitalSystem::EARTH_SEMI_LATUS_RECTUM
            / (1.0 + OrbitalSystem::EARTH_ECCENTRICITY);
        let aphelion = OrbitalSystem::EARTH_SEMI_LATUS_RECTUM
            / (1.0 - OrbitalSystem::EARTH_ECCENTRICITY);
        for _ in 0..10_000 {
            orbit.advance();
            assert!(orbit.earth_dist >= perihelion - 1e-9);
            assert!(orbit.earth_dist <= aphelion + 1e-9);
            assert!(orbit.earth_theta.abs() < TAU);
            assert!(orbit.mercury_theta.abs() < TAU);
        }
    }

    #[test]
    fn orbit_speeds_up_near_perihelion() {
        // The angular step is inverse-square in distance, so the rate
        // at perihelion must exceed the rate at aphelion.
        let rate = |dist: f64| 75000.0 / (dist * dist) - PI / 220.0;
        let perihelion = 350.0 / 1.75;
        let aphelion = 350.0 / 0.25;
        assert!(rate(perihelion) > rate(aphelion));
        assert!(rate(aphelion) < 0.0); // retrograde drift at the far end
    }

    #[test]
    fn ring_rotations_wrap_at_full_turns() {
        let mut rings = RingSculpture::default();
        for _ in 0..1000 {
            rings.advance();
            for rot in rings.rot {
                assert!(rot.abs() < 360.0);
            }
        }
        // The innermost ring spins seven times faster than the
        // outermost.
        let mut rings = RingSculpture::default();
        rings.advance();
        assert!((rings.rot[3] / rings.rot[0] - 7.0).abs() < 1e-9);
    }

    #[test]
    fn piston_height_stays_within_linkage_limits() {
        let mut piston = PistonCrank::default();
        let min = PistonCrank::ROD_LENGTH - PistonCrank::CRANK_RADIUS;
        let max = PistonCrank::ROD_LENGTH + PistonCrank::CRANK_RADIUS;
        for _ in 0..1000 {
            piston.advance();
            assert!(piston.piston_height >= min - 1e-9);
            assert!(piston.piston_height <= max + 1e-9);
            assert!(piston.rod_angle().is_finite());
        }
    }

    #[test]
    fn piston_tops_out_at_crank_zero() {
        let mut piston = PistonCrank::default();
        piston.crank_theta = -35.0_f64.to_radians() * RATE;
        piston.advance();
        assert!((piston.crank_theta).abs() < 1e-9);
        assert!(
            (piston.piston_height - (PistonCrank::ROD_LENGTH + PistonCrank::CRANK_RADIUS)).abs()
                < 1e-9
        );
    }

    #[test]
    fn glass_slides_between_closed_and_open() {
        let mut glass = GlassWindow::new(1024.0);
        assert_eq!(glass.open, 0.0);

        glass.toggle();
        for _ in 0..100 {
            glass.advance();
            assert!(glass.open >= -1024.0 - GlassWindow::SLIDE_RATE);
        }
        assert_eq!(glass.open, -1024.0);

        // Closing returns to exactly zero and stays there.
        glass.toggle();
        for _ in 0..100 {
            glass.advance();
        }
        assert_eq!(glass.open, 0.0);
        glass.advance();
        assert_eq!(glass.open, 0.0);
    }
}
