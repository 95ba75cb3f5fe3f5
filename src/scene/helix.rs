//! Double-helix model, built once from parametric formulas.
//!
//! Two backbone strands of spheres wind around the axis half a turn
//! apart, joined every few steps by a two-color base-pair rung. The
//! model is generated in small local units and scaled into place by the
//! sculpture transform.

use std::f64::consts::{PI, TAU};

use glam::{DMat4, DQuat, DVec3};

use super::mesh::{cylinder, uv_sphere, MeshData};

/// Helix radius in local units.
const RADIUS: f64 = 1.0;
/// Vertical rise per step.
const RISE: f64 = 0.35;
/// Turn per step.
const TWIST: f64 = TAU / 10.0;
/// Backbone steps per strand.
const STEPS: u32 = 40;
/// A rung every this many steps.
const RUNG_INTERVAL: u32 = 2;

const MOLECULE_RADIUS: f64 = 0.22;
const BOND_RADIUS: f64 = 0.07;

/// Diffuse colors for the four bases, cycled along the rungs.
const BASE_COLORS: [[f32; 4]; 4] = [
    [0.85, 0.25, 0.25, 1.0],
    [0.25, 0.65, 0.25, 1.0],
    [0.25, 0.35, 0.85, 1.0],
    [0.85, 0.75, 0.20, 1.0],
];
const BACKBONE_COLOR: [f32; 4] = [0.75, 0.75, 0.78, 1.0];

/// One same-colored piece of the helix.
#[derive(Debug, Clone)]
pub struct HelixPart {
    pub mesh: MeshData,
    pub color: [f32; 4],
}

fn strand_point(step: u32, phase: f64) -> DVec3 {
    let theta = f64::from(step) * TWIST + phase;
    DVec3::new(
        RADIUS * theta.cos(),
        RADIUS * theta.sin(),
        f64::from(step) * RISE,
    )
}

/// Cylinder from `a` to `b` with the given radius.
fn bond(a: DVec3, b: DVec3, radius: f64) -> MeshData {
    let axis = b - a;
    let mut rod = cylinder(radius, radius, axis.length(), 10);
    let rotation = DQuat::from_rotation_arc(DVec3::Z, axis.normalize());
    rod.transform(&(DMat4::from_translation(a) * DMat4::from_quat(rotation)));
    rod
}

/// Generate the helix as one part per color, so each can keep its own
/// material when drawn.
#[must_use]
pub fn build() -> Vec<HelixPart> {
    let mut backbone = MeshData::triangles();
    let mut bases: [MeshData; 4] = std::array::from_fn(|_| MeshData::triangles());

    for step in 0..=STEPS {
        for phase in [0.0, PI] {
            let mut molecule = uv_sphere(MOLECULE_RADIUS, 12, 8);
            molecule.transform(&DMat4::from_translation(strand_point(step, phase)));
            backbone.merge(&molecule);

            if step > 0 {
                backbone.merge(&bond(
                    strand_point(step - 1, phase),
                    strand_point(step, phase),
                    BOND_RADIUS,
                ));
            }
        }

        if step % RUNG_INTERVAL == 0 {
            // Each rung is two half-bonds meeting at the axis, colored
            // as a complementary base pair.
            let a = strand_point(step, 0.0);
            let b = strand_point(step, PI);
            let mid = (a + b) / 2.0;
            let pair = (step / RUNG_INTERVAL) as usize % 2;
            bases[2 * pair].merge(&bond(a, mid, BOND_RADIUS));
            bases[2 * pair + 1].merge(&bond(mid, b, BOND_RADIUS));
        }
    }

    let mut parts = vec![HelixPart {
        mesh: backbone,
        color: BACKBONE_COLOR,
    }];
    for (mesh, color) in bases.into_iter().zip(BASE_COLORS) {
        parts.push(HelixPart { mesh, color });
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_backbone_plus_four_base_colors() {
        let parts = build();
        assert_eq!(parts.len(), 5);
        assert!(parts.iter().all(|p| !p.mesh.is_empty()));
    }

    #[test]
    fn strands_stay_on_the_helix_radius() {
        for step in 0..=STEPS {
            for phase in [0.0, PI] {
                let p = strand_point(step, phase);
                let r = (p.x * p.x + p.y * p.y).sqrt();
                assert!((r - RADIUS).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn strands_are_half_a_turn_apart() {
        let a = strand_point(7, 0.0);
        let b = strand_point(7, PI);
        // Opposite points at the same height.
        assert!((a.z - b.z).abs() < 1e-9);
        assert!((a.x + b.x).abs() < 1e-9);
        assert!((a.y + b.y).abs() < 1e-9);
    }

    #[test]
    fn bond_spans_its_endpoints() {
        let a = DVec3::new(1.0, 0.0, 0.0);
        let b = DVec3::new(-1.0, 0.0, 3.0);
        let rod = bond(a, b, 0.1);
        let mut touches_a = false;
        let mut touches_b = false;
        for v in &rod.vertices {
            let p = DVec3::from(v.position.map(f64::from));
            if p.distance(a) < 0.2 {
                touches_a = true;
            }
            if p.distance(b) < 0.2 {
                touches_b = true;
            }
        }
        assert!(touches_a && touches_b);
    }
}
