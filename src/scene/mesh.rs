//! CPU-side mesh building.
//!
//! Everything is generated once at startup from geometry formulas; the
//! renderer uploads the buffers verbatim. Positions are computed in f64
//! and stored as f32.

use bytemuck::{Pod, Zeroable};
use glam::{DMat3, DMat4, DVec2, DVec3};

/// One vertex as the shaders consume it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Primitive topology of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
    LineList,
}

/// An indexed mesh ready for upload.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl MeshData {
    #[must_use]
    pub fn triangles() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            topology: Topology::TriangleList,
        }
    }

    #[must_use]
    pub fn lines() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            topology: Topology::LineList,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn push_vertex(&mut self, position: DVec3, normal: DVec3, uv: DVec2) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex {
            position: position.as_vec3().to_array(),
            normal: normal.as_vec3().to_array(),
            uv: uv.as_vec2().to_array(),
        });
        index
    }

    /// Append a quad as two triangles. Corners wind counter-clockwise
    /// when seen from the normal side.
    pub fn push_quad(&mut self, corners: [DVec3; 4], normal: DVec3, uvs: [DVec2; 4]) {
        let base = [
            self.push_vertex(corners[0], normal, uvs[0]),
            self.push_vertex(corners[1], normal, uvs[1]),
            self.push_vertex(corners[2], normal, uvs[2]),
            self.push_vertex(corners[3], normal, uvs[3]),
        ];
        self.indices
            .extend_from_slice(&[base[0], base[1], base[2], base[0], base[2], base[3]]);
    }

    /// Append a line segment.
    pub fn push_line(&mut self, a: DVec3, b: DVec3) {
        let ia = self.push_vertex(a, DVec3::ZERO, DVec2::ZERO);
        let ib = self.push_vertex(b, DVec3::ZERO, DVec2::ZERO);
        self.indices.extend_from_slice(&[ia, ib]);
    }

    /// Append another mesh of the same topology.
    pub fn merge(&mut self, other: &Self) {
        debug_assert_eq!(self.topology, other.topology);
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Bake a transform into the vertex data. Normals use the inverse
    /// transpose so non-uniform scales stay correct.
    pub fn transform(&mut self, m: &DMat4) {
        let normal_matrix = DMat3::from_mat4(*m).inverse().transpose();
        for v in &mut self.vertices {
            let p = m.transform_point3(DVec3::from(v.position.map(f64::from)));
            v.position = p.as_vec3().to_array();
            let n = normal_matrix * DVec3::from(v.normal.map(f64::from));
            v.normal = n.normalize_or_zero().as_vec3().to_array();
        }
    }
}

const TAU: f64 = std::f64::consts::TAU;

/// Latitude/longitude sphere centered at the origin.
#[must_use]
pub fn uv_sphere(radius: f64, slices: u32, stacks: u32) -> MeshData {
    let mut mesh = MeshData::triangles();
    for stack in 0..=stacks {
        let phi = std::f64::consts::PI * f64::from(stack) / f64::from(stacks);
        for slice in 0..=slices {
            let theta = TAU * f64::from(slice) / f64::from(slices);
            let normal = DVec3::new(
                phi.sin() * theta.cos(),
                phi.cos(),
                phi.sin() * theta.sin(),
            );
            let uv = DVec2::new(
                f64::from(slice) / f64::from(slices),
                f64::from(stack) / f64::from(stacks),
            );
            mesh.push_vertex(normal * radius, normal, uv);
        }
    }
    let stride = slices + 1;
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = stack * stride + slice;
            let b = a + stride;
            mesh.indices
                .extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    mesh
}

/// Torus around the Z axis: `ring_radius` to the tube center,
/// `tube_radius` around it.
#[must_use]
pub fn torus(tube_radius: f64, ring_radius: f64, sides: u32, rings: u32) -> MeshData {
    let mut mesh = MeshData::triangles();
    for ring in 0..=rings {
        let u = TAU * f64::from(ring) / f64::from(rings);
        let center = DVec3::new(u.cos() * ring_radius, u.sin() * ring_radius, 0.0);
        for side in 0..=sides {
            let v = TAU * f64::from(side) / f64::from(sides);
            let normal = DVec3::new(u.cos() * v.cos(), u.sin() * v.cos(), v.sin());
            let uv = DVec2::new(
                f64::from(ring) / f64::from(rings),
                f64::from(side) / f64::from(sides),
            );
            mesh.push_vertex(center + normal * tube_radius, normal, uv);
        }
    }
    let stride = sides + 1;
    for ring in 0..rings {
        for side in 0..sides {
            let a = ring * stride + side;
            let b = a + stride;
            mesh.indices
                .extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    mesh
}

/// Open tube along +Z from 0 to `length`, linearly interpolating the
/// radius from `base_radius` to `top_radius`.
#[must_use]
pub fn cylinder(base_radius: f64, top_radius: f64, length: f64, slices: u32) -> MeshData {
    let mut mesh = MeshData::triangles();
    let slope = (base_radius - top_radius) / length;
    for (z, radius) in [(0.0, base_radius), (length, top_radius)] {
        for slice in 0..=slices {
            let theta = TAU * f64::from(slice) / f64::from(slices);
            let dir = DVec3::new(theta.cos(), theta.sin(), 0.0);
            let normal = (dir + DVec3::new(0.0, 0.0, slope)).normalize();
            let uv = DVec2::new(f64::from(slice) / f64::from(slices), z / length.max(1e-12));
            mesh.push_vertex(dir * radius + DVec3::new(0.0, 0.0, z), normal, uv);
        }
    }
    let stride = slices + 1;
    for slice in 0..slices {
        let a = slice;
        let b = slice + stride;
        mesh.indices
            .extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
    }
    mesh
}

/// Annulus in the XY plane facing +Z.
#[must_use]
pub fn disk(inner_radius: f64, outer_radius: f64, slices: u32) -> MeshData {
    let mut mesh = MeshData::triangles();
    for radius in [inner_radius, outer_radius] {
        for slice in 0..=slices {
            let theta = TAU * f64::from(slice) / f64::from(slices);
            let p = DVec3::new(theta.cos() * radius, theta.sin() * radius, 0.0);
            mesh.push_vertex(p, DVec3::Z, DVec2::new(theta.cos(), theta.sin()));
        }
    }
    let stride = slices + 1;
    for slice in 0..slices {
        let a = slice;
        let b = slice + stride;
        mesh.indices
            .extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
    }
    mesh
}

/// Cone with its apex at the origin and a circular base of
/// `base_radius` at `base_y` (typically below the apex).
#[must_use]
pub fn cone_to(base_radius: f64, base_y: f64, slices: u32) -> MeshData {
    let mut mesh = MeshData::triangles();
    let apex = mesh.push_vertex(DVec3::ZERO, DVec3::Y, DVec2::new(0.5, 0.5));
    for slice in 0..=slices {
        let theta = TAU * f64::from(slice) / f64::from(slices);
        let normal = DVec3::new(theta.sin(), 0.0, theta.cos());
        mesh.push_vertex(
            DVec3::new(base_radius * theta.sin(), base_y, base_radius * theta.cos()),
            normal,
            DVec2::new(theta.sin(), theta.cos()),
        );
    }
    for slice in 0..slices {
        mesh.indices
            .extend_from_slice(&[apex, apex + 1 + slice, apex + 2 + slice]);
    }
    mesh
}

/// Square truncated pyramid: base width `w1` on the ground plane, top
/// width `w2` at height `h`, with a flat cap. Used as a pedestal.
#[must_use]
pub fn frustum_pedestal(w1: f64, w2: f64, h: f64) -> MeshData {
    let mut mesh = MeshData::triangles();
    let a = (w1 - w2) / 2.0;
    // Outward slope of each face.
    let side_normal = DVec3::new(0.0, a, h).normalize();

    for i in 0..4 {
        let rot = DMat4::from_rotation_y(f64::from(i) * TAU / 4.0);
        let mut face = MeshData::triangles();
        face.push_quad(
            [
                DVec3::new(-w1 / 2.0, 0.0, w1 / 2.0),
                DVec3::new(w1 / 2.0, 0.0, w1 / 2.0),
                DVec3::new(w1 / 2.0 - a, h, w2 / 2.0),
                DVec3::new(-w1 / 2.0 + a, h, w2 / 2.0),
            ],
            side_normal,
            [DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::Y],
        );
        face.transform(&rot);
        mesh.merge(&face);
    }

    mesh.push_quad(
        [
            DVec3::new(-w2 / 2.0, h, w2 / 2.0),
            DVec3::new(w2 / 2.0, h, w2 / 2.0),
            DVec3::new(w2 / 2.0, h, -w2 / 2.0),
            DVec3::new(-w2 / 2.0, h, -w2 / 2.0),
        ],
        DVec3::Y,
        [DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::Y],
    );
    mesh
}

/// Unit line along +X, drawn three times with different rotations and
/// colors to mark the world origin.
#[must_use]
pub fn unit_axis_line(length: f64) -> MeshData {
    let mut mesh = MeshData::lines();
    mesh.push_line(DVec3::ZERO, DVec3::new(length, 0.0, 0.0));
    mesh
}

/// A teapot-shaped composite built from primitives: squashed sphere
/// body, tapered cylinder spout, torus handle, and a lidded top.
#[must_use]
pub fn teapot(size: f64) -> MeshData {
    let mut pot = MeshData::triangles();

    // Body: squashed sphere resting on the ground plane.
    let body_radius = size * 0.8;
    let body_center_y = size * 0.6;
    let mut body = uv_sphere(body_radius, 40, 28);
    body.transform(
        &(DMat4::from_translation(DVec3::new(0.0, body_center_y, 0.0))
            * DMat4::from_scale(DVec3::new(1.0, 0.75, 1.0))),
    );
    pot.merge(&body);

    // Spout: tapered tube leaning out of the +X side.
    let mut spout = cylinder(size * 0.18, size * 0.1, size * 0.9, 20);
    spout.transform(
        &(DMat4::from_translation(DVec3::new(body_radius * 0.6, body_center_y * 0.8, 0.0))
            * DMat4::from_rotation_y(std::f64::consts::FRAC_PI_2)
            * DMat4::from_rotation_x(-0.5)),
    );
    pot.merge(&spout);

    // Handle: half-buried torus on the -X side.
    let mut handle = torus(size * 0.08, size * 0.45, 14, 30);
    handle.transform(&DMat4::from_translation(DVec3::new(
        -body_radius * 0.9,
        body_center_y,
        0.0,
    )));
    pot.merge(&handle);

    // Lid: disk plus a knob.
    let lid_y = body_center_y + body_radius * 0.75 * 0.92;
    let mut lid = disk(0.0, size * 0.4, 24);
    lid.transform(
        &(DMat4::from_translation(DVec3::new(0.0, lid_y, 0.0))
            * DMat4::from_rotation_x(-std::f64::consts::FRAC_PI_2)),
    );
    pot.merge(&lid);
    let mut knob = uv_sphere(size * 0.12, 16, 12);
    knob.transform(&DMat4::from_translation(DVec3::new(
        0.0,
        lid_y + size * 0.08,
        0.0,
    )));
    pot.merge(&knob);

    pot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_in_bounds(mesh: &MeshData) {
        let len = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < len));
    }

    fn assert_unit_normals(mesh: &MeshData) {
        for v in &mesh.vertices {
            let n = DVec3::from(v.normal.map(f64::from));
            assert!((n.length() - 1.0).abs() < 1e-3, "normal {n:?}");
        }
    }

    #[test]
    fn sphere_vertices_sit_on_the_radius() {
        let mesh = uv_sphere(128.0, 20, 12);
        assert_indices_in_bounds(&mesh);
        assert_unit_normals(&mesh);
        for v in &mesh.vertices {
            let p = DVec3::from(v.position.map(f64::from));
            assert!((p.length() - 128.0).abs() < 1e-3);
        }
        assert_eq!(mesh.indices.len() % 3, 0);
    }

    #[test]
    fn torus_stays_within_its_radii() {
        let mesh = torus(10.0, 210.0, 20, 50);
        assert_indices_in_bounds(&mesh);
        assert_unit_normals(&mesh);
        for v in &mesh.vertices {
            let p = DVec3::from(v.position.map(f64::from));
            let ring_dist = DVec2::new(p.x, p.y).length();
            assert!(ring_dist >= 200.0 - 1e-6 && ring_dist <= 220.0 + 1e-6);
            assert!(p.z.abs() <= 10.0 + 1e-6);
        }
    }

    #[test]
    fn cylinder_spans_its_length() {
        let mesh = cylinder(50.0, 50.0, 362.0, 20);
        assert_indices_in_bounds(&mesh);
        let (mut min_z, mut max_z) = (f64::MAX, f64::MIN);
        for v in &mesh.vertices {
            min_z = min_z.min(f64::from(v.position[2]));
            max_z = max_z.max(f64::from(v.position[2]));
        }
        assert!((min_z - 0.0).abs() < 1e-6);
        assert!((max_z - 362.0).abs() < 1e-3);
    }

    #[test]
    fn quad_produces_two_triangles() {
        let mut mesh = MeshData::triangles();
        mesh.push_quad(
            [
                DVec3::ZERO,
                DVec3::X,
                DVec3::new(1.0, 1.0, 0.0),
                DVec3::Y,
            ],
            DVec3::Z,
            [DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::Y],
        );
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn merge_rebases_indices() {
        let mut a = uv_sphere(1.0, 8, 6);
        let b = uv_sphere(2.0, 8, 6);
        let verts = a.vertices.len();
        let indices = a.indices.len();
        a.merge(&b);
        assert_eq!(a.vertices.len(), verts * 2);
        assert_eq!(a.indices.len(), indices * 2);
        assert_indices_in_bounds(&a);
    }

    #[test]
    fn transform_keeps_normals_unit_under_nonuniform_scale() {
        let mut mesh = uv_sphere(1.0, 12, 8);
        mesh.transform(&DMat4::from_scale(DVec3::new(1.0, 0.5, 3.0)));
        assert_unit_normals(&mesh);
    }

    #[test]
    fn pedestal_has_four_sides_and_a_cap() {
        let mesh = frustum_pedestal(512.0, 128.0, 512.0);
        assert_indices_in_bounds(&mesh);
        // 5 quads, two triangles each.
        assert_eq!(mesh.indices.len(), 5 * 6);
        // The cap sits at the pedestal height.
        let top = mesh
            .vertices
            .iter()
            .map(|v| f64::from(v.position[1]))
            .fold(f64::MIN, f64::max);
        assert!((top - 512.0).abs() < 1e-3);
    }

    #[test]
    fn axis_line_is_a_line_list() {
        let mesh = unit_axis_line(256.0);
        assert_eq!(mesh.topology, Topology::LineList);
        assert_eq!(mesh.indices.len(), 2);
    }

    #[test]
    fn teapot_is_watertight_enough_to_render() {
        let mesh = teapot(128.0);
        assert_indices_in_bounds(&mesh);
        assert!(!mesh.is_empty());
        // Roughly teapot-sized: everything within a couple of sizes.
        for v in &mesh.vertices {
            let p = DVec3::from(v.position.map(f64::from));
            assert!(p.length() < 128.0 * 3.0);
        }
    }
}
