//! The museum: one room, five sculptures, and a view outside.
//!
//! The museum owns all static geometry and all animation state. It
//! never draws anything itself; each frame it emits a list of
//! [`DrawItem`]s (mesh index, model matrix, material) for the renderer
//! to consume, so the whole scene stays testable without a GPU.

pub mod helix;
pub mod mesh;
pub mod sculpture;

use glam::{DMat4, DVec3};

use crate::navigator::NavKey;
use mesh::MeshData;
use sculpture::{GlassWindow, OrbitalSystem, PistonCrank, RingSculpture};

pub const ROOM_WIDTH: f64 = 512.0 * 8.0;
pub const ROOM_LENGTH: f64 = 512.0 * 23.0;
pub const ROOM_HEIGHT: f64 = 1536.0;
pub const FLOOR_LEVEL: f64 = -650.0;

pub const GLASS_WIDTH: f64 = 1024.0;
pub const GLASS_HEIGHT: f64 = 640.0;
pub const GLASS_ELEV: f64 = 384.0;

pub const OUTSIDE_WIDTH: f64 = 256.0 * 32.0;
pub const OUTSIDE_LENGTH: f64 = 256.0 * 5.0;
pub const OUTSIDE_HEIGHT: f64 = 256.0 * 16.0;

/// Edge length of one floor/ceiling tile.
pub const TILE_SIZE: f64 = 512.0;

/// Horizontal and vertical margins the camera keeps from the walls.
pub const WALL_CLIP_H: f64 = 140.0;
pub const WALL_CLIP_V: f64 = 420.0;

/// Milliseconds between animation ticks.
pub const ANI_RATE_MS: u64 = 100;

/// Hard cap on loaded textures.
pub const MAX_TEXTURES: usize = 20;

/// Texture files the museum expects, in slot order.
pub const TEXTURE_PATHS: [&str; 2] = ["images/skyline3.png", "images/ceiling_texture.png"];
pub const SKYLINE_TEXTURE: u32 = 0;
pub const CEILING_TEXTURE: u32 = 1;

/// Keep the camera inside the room, one tile plus a margin away from
/// each wall and between floor and ceiling.
pub fn wall_clip(pos: &mut DVec3) {
    let x_max = ROOM_WIDTH / 2.0 - TILE_SIZE - WALL_CLIP_H;
    let z_max = ROOM_LENGTH / 2.0 - TILE_SIZE - WALL_CLIP_H;
    pos.x = pos.x.clamp(-x_max, x_max);
    pos.z = pos.z.clamp(-z_max, z_max);
    pos.y = pos
        .y
        .clamp(FLOOR_LEVEL + WALL_CLIP_V, ROOM_HEIGHT + FLOOR_LEVEL - WALL_CLIP_V);
}

/// Surface appearance for one draw item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub diffuse: [f32; 4],
    pub specular: f32,
    pub shininess: f32,
}

impl Material {
    #[must_use]
    pub const fn new(diffuse: [f32; 4], specular: f32, shininess: f32) -> Self {
        Self {
            diffuse,
            specular,
            shininess,
        }
    }

    #[must_use]
    pub const fn matte(diffuse: [f32; 4]) -> Self {
        Self::new(diffuse, 0.0, 1.0)
    }
}

/// One renderable: which mesh, where, and how it looks.
#[derive(Debug, Clone)]
pub struct DrawItem {
    pub mesh: usize,
    pub model: DMat4,
    pub material: Material,
    pub texture: Option<u32>,
    /// Alpha-blended items are emitted after all opaque ones.
    pub blend: bool,
}

impl DrawItem {
    fn opaque(mesh: usize, model: DMat4, material: Material) -> Self {
        Self {
            mesh,
            model,
            material,
            texture: None,
            blend: false,
        }
    }
}

/// Indices into the museum's mesh list.
#[derive(Debug, Clone)]
struct MeshIds {
    floor_light: usize,
    floor_dark: usize,
    ceiling: usize,
    walls: usize,
    grass: usize,
    skyline: usize,
    glass_frame: usize,
    glass_pane: usize,
    sun: usize,
    earth: usize,
    moon: usize,
    mercury: usize,
    orbit_stand: usize,
    tori: [usize; 4],
    support_rod: usize,
    small_sphere: usize,
    pedestal: usize,
    teapot: usize,
    joint_sphere: usize,
    mount_cylinder: usize,
    crank_arm: usize,
    push_rod: usize,
    crank_pin: usize,
    piston_body: usize,
    piston_cap: usize,
    engine_block: usize,
    helix_first: usize,
}

/// What the host should do after a museum key binding ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuseumAction {
    None,
    Quit,
    ToggleFullscreen,
}

/// Scene state plus the prebuilt geometry.
pub struct Museum {
    pub orbital: OrbitalSystem,
    pub rings: RingSculpture,
    pub piston: PistonCrank,
    pub glass: GlassWindow,
    pub frozen: bool,
    pub show_helix: bool,
    pub show_textures: bool,
    pub lights: [bool; 8],
    meshes: Vec<MeshData>,
    helix_colors: Vec<[f32; 4]>,
    ids: MeshIds,
}

impl Default for Museum {
    fn default() -> Self {
        Self::new()
    }
}

impl Museum {
    #[must_use]
    pub fn new() -> Self {
        let (meshes, ids, helix_colors) = build_meshes();
        Self {
            orbital: OrbitalSystem::default(),
            rings: RingSculpture::default(),
            piston: PistonCrank::default(),
            glass: GlassWindow::new(GLASS_WIDTH),
            frozen: false,
            show_helix: true,
            show_textures: true,
            lights: [true; 8],
            meshes,
            helix_colors,
            ids,
        }
    }

    #[must_use]
    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }

    /// One animation step. Returns false while frozen.
    pub fn advance(&mut self) -> bool {
        if self.frozen {
            return false;
        }
        self.orbital.advance();
        self.rings.advance();
        self.piston.advance();
        self.glass.advance();
        true
    }

    /// Run the museum's key bindings. Unknown keys are ignored.
    pub fn handle_key(&mut self, key: NavKey) -> MuseumAction {
        match key {
            NavKey::Char('a') => {
                self.frozen = !self.frozen;
                MuseumAction::None
            }
            NavKey::Char('f') => MuseumAction::ToggleFullscreen,
            NavKey::Char('h') => {
                self.show_helix = !self.show_helix;
                MuseumAction::None
            }
            NavKey::Char('q') => MuseumAction::Quit,
            NavKey::Char('t') => {
                self.show_textures = !self.show_textures;
                MuseumAction::None
            }
            NavKey::Char('w') => {
                self.glass.toggle();
                MuseumAction::None
            }
            NavKey::Char(c @ '1'..='8') => {
                let index = c as usize - '1' as usize;
                self.lights[index] = !self.lights[index];
                MuseumAction::None
            }
            _ => MuseumAction::None,
        }
    }

    /// World positions of the eight scene lights: a spot shining in
    /// through the window, three outside, four inside.
    #[must_use]
    pub fn light_positions(&self) -> [DVec3; 8] {
        [
            DVec3::new(0.0, 0.0, -ROOM_LENGTH / 2.0),
            DVec3::new(0.0, 1024.0, -ROOM_LENGTH / 2.0 - 1024.0),
            DVec3::new(
                -OUTSIDE_WIDTH / 2.0 + 1024.0,
                2.0 * FLOOR_LEVEL + OUTSIDE_HEIGHT - 1024.0,
                -ROOM_LENGTH / 2.0 - OUTSIDE_LENGTH + 1024.0,
            ),
            DVec3::new(
                OUTSIDE_WIDTH / 2.0 - 1024.0,
                2.0 * FLOOR_LEVEL + OUTSIDE_HEIGHT - 1024.0,
                -ROOM_LENGTH / 2.0 - OUTSIDE_LENGTH + 1024.0,
            ),
            DVec3::new(
                ROOM_WIDTH / 2.0 - 512.0,
                512.0,
                ROOM_LENGTH / 2.0 - ROOM_LENGTH / 3.0,
            ),
            DVec3::new(
                -ROOM_WIDTH / 2.0 + 512.0,
                512.0,
                ROOM_LENGTH / 2.0 - ROOM_LENGTH / 3.0,
            ),
            DVec3::new(
                ROOM_WIDTH / 2.0 - 512.0,
                512.0,
                ROOM_LENGTH / 2.0 - 2.0 * ROOM_LENGTH / 3.0,
            ),
            DVec3::new(
                -ROOM_WIDTH / 2.0 + 512.0,
                512.0,
                ROOM_LENGTH / 2.0 - 2.0 * ROOM_LENGTH / 3.0,
            ),
        ]
    }

    /// Emit this frame's draw list: room first, then sculptures, with
    /// alpha-blended surfaces (engine block, window pane) at the end.
    #[must_use]
    pub fn draw_items(&self) -> Vec<DrawItem> {
        let ids = &self.ids;
        let mut items = Vec::with_capacity(48);

        // Room shell.
        items.push(DrawItem::opaque(
            ids.floor_light,
            DMat4::IDENTITY,
            Material::new([0.7, 0.7, 0.7, 1.0], 0.9, 100.0),
        ));
        items.push(DrawItem::opaque(
            ids.floor_dark,
            DMat4::IDENTITY,
            Material::new([0.1, 0.7, 0.7, 1.0], 0.9, 100.0),
        ));
        let mut ceiling = DrawItem::opaque(
            ids.ceiling,
            DMat4::IDENTITY,
            Material::new([0.9, 0.9, 0.9, 1.0], 0.0, 100.0),
        );
        if self.show_textures {
            ceiling.texture = Some(CEILING_TEXTURE);
        }
        items.push(ceiling);
        items.push(DrawItem::opaque(
            ids.walls,
            DMat4::IDENTITY,
            Material::new([0.2, 0.2, 0.2, 1.0], 0.5, 100.0),
        ));

        // Outside.
        items.push(DrawItem::opaque(
            ids.grass,
            DMat4::IDENTITY,
            Material::matte([0.0, 1.0, 0.0, 1.0]),
        ));
        let mut skyline = DrawItem::opaque(
            ids.skyline,
            DMat4::IDENTITY,
            Material::matte([1.0, 1.0, 1.0, 1.0]),
        );
        if self.show_textures {
            skyline.texture = Some(SKYLINE_TEXTURE);
        }
        items.push(skyline);

        self.push_orbital(&mut items);
        self.push_rings(&mut items);
        self.push_teapot(&mut items);
        self.push_piston(&mut items);
        self.push_helix(&mut items);
        self.push_glass(&mut items);

        items
    }

    fn push_orbital(&self, items: &mut Vec<DrawItem>) {
        let ids = &self.ids;
        let base = DMat4::from_translation(DVec3::new(
            ROOM_WIDTH / 2.0 - 768.0,
            0.0,
            ROOM_LENGTH / 2.0 - 2.0 * ROOM_LENGTH / 5.0,
        ));
        let stand = Material::new([0.78, 0.78, 0.78, 1.0], 0.9, 27.8);
        items.push(DrawItem::opaque(ids.orbit_stand, base, stand));
        items.push(DrawItem::opaque(
            ids.sun,
            base,
            Material::new([0.8, 0.6, 0.1, 1.0], 1.0, 100.0),
        ));

        // The orbital plane is tilted a few degrees for viewing.
        let tilted = base * DMat4::from_rotation_z(5.0_f64.to_radians());
        let orbit = &self.orbital;
        let earth = tilted
            * DMat4::from_translation(DVec3::new(
                orbit.earth_dist * orbit.earth_theta.sin(),
                0.0,
                -orbit.earth_dist * orbit.earth_theta.cos(),
            ));
        items.push(DrawItem::opaque(
            ids.earth,
            earth,
            Material::new([0.1, 0.1, 0.6, 1.0], 0.4, 100.0),
        ));
        let moon = earth
            * DMat4::from_translation(DVec3::new(
                OrbitalSystem::MOON_DIST * orbit.moon_theta.sin(),
                0.0,
                -OrbitalSystem::MOON_DIST * orbit.moon_theta.cos(),
            ));
        items.push(DrawItem::opaque(
            ids.moon,
            moon,
            Material::new([0.8, 0.8, 0.8, 1.0], 0.0, 1.0),
        ));
        let mercury = tilted
            * DMat4::from_translation(DVec3::new(
                orbit.mercury_dist * orbit.mercury_theta.sin(),
                0.0,
                -orbit.mercury_dist * orbit.mercury_theta.cos(),
            ));
        items.push(DrawItem::opaque(
            ids.mercury,
            mercury,
            Material::new([0.8, 0.8, 0.8, 1.0], 0.0, 1.0),
        ));
    }

    fn push_rings(&self, items: &mut Vec<DrawItem>) {
        let ids = &self.ids;
        let base = DMat4::from_translation(DVec3::new(
            -ROOM_WIDTH / 2.0 + 512.0,
            0.0,
            ROOM_LENGTH / 2.0 - 2.0 * ROOM_LENGTH / 8.0,
        )) * DMat4::from_rotation_y(90.0_f64.to_radians());

        let colors = [
            [0.1, 0.6, 0.1, 1.0],
            [0.6, 0.1, 0.1, 1.0],
            [0.1, 0.1, 0.6, 1.0],
            [0.1, 0.6, 0.6, 1.0],
        ];

        // Each ring spins in the frame of the ring outside it.
        let mut frame = base;
        for (i, mesh) in ids.tori.iter().enumerate() {
            frame = frame
                * if i % 2 == 0 {
                    DMat4::from_rotation_x(self.rings.rot[i].to_radians())
                } else {
                    DMat4::from_rotation_y(self.rings.rot[i].to_radians())
                };
            items.push(DrawItem::opaque(
                *mesh,
                frame,
                Material::new(colors[i], 0.8, 100.0),
            ));
        }

        // Two floor-mounted support rods.
        let rod_material = Material::new([0.6, 0.6, 0.6, 1.0], 0.8, 100.0);
        for x in [-230.0, 230.0] {
            let mount = base
                * DMat4::from_translation(DVec3::new(x, 0.0, 0.0))
                * DMat4::from_rotation_x(90.0_f64.to_radians());
            items.push(DrawItem::opaque(ids.support_rod, mount, rod_material));
            items.push(DrawItem::opaque(ids.small_sphere, mount, rod_material));
        }
    }

    fn push_teapot(&self, items: &mut Vec<DrawItem>) {
        let ids = &self.ids;
        let base = DMat4::from_translation(DVec3::new(
            -ROOM_WIDTH / 2.0 + 512.0,
            0.0,
            ROOM_LENGTH / 2.0 - 4.0 * ROOM_LENGTH / 8.0,
        ));
        let brass = Material::new([0.78, 0.57, 0.11, 1.0], 0.9, 100.0);
        items.push(DrawItem::opaque(
            ids.pedestal,
            base * DMat4::from_translation(DVec3::new(0.0, FLOOR_LEVEL, 0.0)),
            brass,
        ));
        items.push(DrawItem::opaque(
            ids.teapot,
            base * DMat4::from_rotation_y(90.0_f64.to_radians()),
            brass,
        ));
    }

    fn push_piston(&self, items: &mut Vec<DrawItem>) {
        let ids = &self.ids;
        let base = DMat4::from_translation(DVec3::new(
            ROOM_WIDTH / 2.0 - 512.0,
            200.0,
            ROOM_LENGTH / 2.0 - 3.0 * ROOM_LENGTH / 5.0,
        ));
        let metal = Material::new([0.6, 0.6, 0.6, 1.0], 0.6, 100.0);

        // Wall mount: crankshaft axle pointing at the wall.
        let mount = base
            * DMat4::from_translation(DVec3::new(150.0, 0.0, 0.0))
            * DMat4::from_rotation_y(90.0_f64.to_radians());
        items.push(DrawItem::opaque(ids.joint_sphere, mount, metal));
        items.push(DrawItem::opaque(ids.mount_cylinder, mount, metal));

        // Crank arm, rotating with the crank angle.
        let crank = base
            * DMat4::from_translation(DVec3::new(150.0, 0.0, 0.0))
            * DMat4::from_rotation_x((-self.piston.crank_theta.to_degrees() + 90.0).to_radians());
        items.push(DrawItem::opaque(ids.crank_arm, crank, metal));
        let crank_tip =
            crank * DMat4::from_translation(DVec3::new(0.0, 0.0, PistonCrank::CRANK_RADIUS));
        items.push(DrawItem::opaque(ids.joint_sphere, crank_tip, metal));

        // Piston group, sliding with the linkage height.
        let piston_frame = base
            * DMat4::from_translation(DVec3::new(0.0, -self.piston.piston_height, 0.0))
            * DMat4::from_rotation_x(90.0_f64.to_radians());
        items.push(DrawItem::opaque(ids.piston_body, piston_frame, metal));
        items.push(DrawItem::opaque(
            ids.piston_cap,
            piston_frame * DMat4::from_rotation_x(180.0_f64.to_radians()),
            metal,
        ));
        items.push(DrawItem::opaque(
            ids.piston_cap,
            piston_frame
                * DMat4::from_translation(DVec3::new(0.0, 0.0, -128.0))
                * DMat4::from_rotation_x(-180.0_f64.to_radians()),
            metal,
        ));

        // Connecting rod, swinging by the closure angle, pinned to the
        // crank tip.
        let rod = piston_frame * DMat4::from_rotation_x(self.piston.rod_angle());
        items.push(DrawItem::opaque(ids.joint_sphere, rod, metal));
        items.push(DrawItem::opaque(ids.push_rod, rod, metal));
        let pin = rod
            * DMat4::from_translation(DVec3::new(0.0, 0.0, PistonCrank::ROD_LENGTH))
            * DMat4::from_rotation_y(90.0_f64.to_radians());
        items.push(DrawItem::opaque(ids.joint_sphere, pin, metal));
        items.push(DrawItem::opaque(ids.crank_pin, pin, metal));

        // Translucent cylinder block around the whole assembly.
        let block = base
            * DMat4::from_translation(DVec3::new(0.0, FLOOR_LEVEL - 200.0, 0.0))
            * DMat4::from_rotation_x(-90.0_f64.to_radians());
        items.push(DrawItem {
            mesh: ids.engine_block,
            model: block,
            material: Material::new([0.4, 0.4, 0.4, 0.3], 1.0, 100.0),
            texture: None,
            blend: true,
        });
    }

    fn push_helix(&self, items: &mut Vec<DrawItem>) {
        if !self.show_helix {
            return;
        }
        let base = DMat4::from_translation(DVec3::new(
            -ROOM_WIDTH / 2.0 + 512.0,
            0.0,
            ROOM_LENGTH / 2.0 - 6.0 * ROOM_LENGTH / 8.0,
        )) * DMat4::from_rotation_x(-95.0_f64.to_radians())
            * DMat4::from_scale(DVec3::splat(35.0));
        for (offset, color) in self.helix_colors.iter().enumerate() {
            items.push(DrawItem::opaque(
                self.ids.helix_first + offset,
                base,
                Material::new(*color, 0.3, 50.0),
            ));
        }
    }

    fn push_glass(&self, items: &mut Vec<DrawItem>) {
        let ids = &self.ids;
        let base = DMat4::from_translation(DVec3::new(
            -GLASS_WIDTH / 2.0,
            FLOOR_LEVEL + GLASS_ELEV,
            -ROOM_LENGTH / 2.0,
        ));
        items.push(DrawItem::opaque(
            ids.glass_frame,
            base,
            Material::new([0.5, 0.5, 0.5, 1.0], 0.8, 100.0),
        ));
        // The pane is a unit quad stretched to the current opening.
        let pane = base
            * DMat4::from_translation(DVec3::new(0.0, 0.0, -50.0))
            * DMat4::from_scale(DVec3::new(GLASS_WIDTH + self.glass.open, GLASS_HEIGHT, 1.0));
        items.push(DrawItem {
            mesh: ids.glass_pane,
            model: pane,
            material: Material::new([0.1, 0.1, 0.7, 0.25], 0.5, 100.0),
            texture: None,
            blend: true,
        });
    }
}

fn build_meshes() -> (Vec<MeshData>, MeshIds, Vec<[f32; 4]>) {
    use glam::DVec2;

    let mut meshes = Vec::new();
    let mut add = |m: MeshData| {
        meshes.push(m);
        meshes.len() - 1
    };

    let (floor_light_mesh, floor_dark_mesh) = checker_floor();
    let floor_light = add(floor_light_mesh);
    let floor_dark = add(floor_dark_mesh);
    let ceiling = add(ceiling_mesh());
    let walls = add(wall_mesh());

    let mut grass_mesh = MeshData::triangles();
    grass_mesh.push_quad(
        [
            DVec3::new(-OUTSIDE_WIDTH / 2.0, 2.0 * FLOOR_LEVEL, -ROOM_LENGTH / 2.0),
            DVec3::new(OUTSIDE_WIDTH / 2.0, 2.0 * FLOOR_LEVEL, -ROOM_LENGTH / 2.0),
            DVec3::new(
                OUTSIDE_WIDTH / 2.0,
                2.0 * FLOOR_LEVEL,
                -ROOM_LENGTH / 2.0 - OUTSIDE_LENGTH,
            ),
            DVec3::new(
                -OUTSIDE_WIDTH / 2.0,
                2.0 * FLOOR_LEVEL,
                -ROOM_LENGTH / 2.0 - OUTSIDE_LENGTH,
            ),
        ],
        DVec3::Y,
        [DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::Y],
    );
    let grass = add(grass_mesh);

    let mut skyline_mesh = MeshData::triangles();
    let sky_z = -ROOM_LENGTH / 2.0 - OUTSIDE_LENGTH;
    skyline_mesh.push_quad(
        [
            DVec3::new(-OUTSIDE_WIDTH / 2.0, 2.0 * FLOOR_LEVEL, sky_z),
            DVec3::new(OUTSIDE_WIDTH / 2.0, 2.0 * FLOOR_LEVEL, sky_z),
            DVec3::new(OUTSIDE_WIDTH / 2.0, 2.0 * FLOOR_LEVEL + OUTSIDE_HEIGHT, sky_z),
            DVec3::new(
                -OUTSIDE_WIDTH / 2.0,
                2.0 * FLOOR_LEVEL + OUTSIDE_HEIGHT,
                sky_z,
            ),
        ],
        DVec3::Z,
        // Flip V so the image reads upright.
        [
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 0.0),
        ],
    );
    let skyline = add(skyline_mesh);

    let glass_frame = add(glass_frame_mesh());
    let mut pane = MeshData::triangles();
    pane.push_quad(
        [DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y],
        DVec3::Z,
        [DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::Y],
    );
    let glass_pane = add(pane);

    let sun = add(mesh::uv_sphere(128.0, 60, 40));
    let earth = add(mesh::uv_sphere(32.0, 35, 25));
    let moon = add(mesh::uv_sphere(10.0, 20, 15));
    let mercury = add(mesh::uv_sphere(20.0, 20, 15));
    let orbit_stand = add(mesh::cone_to(100.0, FLOOR_LEVEL, 16));

    let tori = [
        add(mesh::torus(10.0, 210.0, 20, 50)),
        add(mesh::torus(10.0, 190.0, 20, 50)),
        add(mesh::torus(10.0, 170.0, 20, 50)),
        add(mesh::torus(10.0, 150.0, 20, 50)),
    ];
    let support_rod = add(mesh::cylinder(10.0, 10.0, -FLOOR_LEVEL, 20));
    let small_sphere = add(mesh::uv_sphere(10.0, 10, 15));

    let pedestal = add(mesh::frustum_pedestal(512.0, 128.0, 512.0));
    let teapot = add(mesh::teapot(128.0));

    let joint_sphere = add(mesh::uv_sphere(50.0, 20, 30));
    let mount_cylinder = add(mesh::cylinder(50.0, 50.0, 362.0, 20));
    let crank_arm = add(mesh::cylinder(50.0, 50.0, PistonCrank::CRANK_RADIUS, 20));
    let push_rod = add(mesh::cylinder(50.0, 50.0, PistonCrank::ROD_LENGTH, 20));
    let crank_pin = add(mesh::cylinder(50.0, 50.0, 150.0, 20));
    let piston_body = add(mesh::cylinder(256.0, 256.0, 128.0, 30));
    let piston_cap = add(mesh::disk(0.0, 256.0, 30));
    let engine_block = add(mesh::cylinder(260.0, 260.0, 670.0, 60));

    let helix_parts = helix::build();
    let helix_first = meshes.len();
    let mut helix_colors = Vec::with_capacity(helix_parts.len());
    for part in helix_parts {
        meshes.push(part.mesh);
        helix_colors.push(part.color);
    }

    let ids = MeshIds {
        floor_light,
        floor_dark,
        ceiling,
        walls,
        grass,
        skyline,
        glass_frame,
        glass_pane,
        sun,
        earth,
        moon,
        mercury,
        orbit_stand,
        tori,
        support_rod,
        small_sphere,
        pedestal,
        teapot,
        joint_sphere,
        mount_cylinder,
        crank_arm,
        push_rod,
        crank_pin,
        piston_body,
        piston_cap,
        engine_block,
        helix_first,
    };
    (meshes, ids, helix_colors)
}

/// Checkerboard floor: one mesh per color so each keeps its material.
fn checker_floor() -> (MeshData, MeshData) {
    use glam::DVec2;

    let mut light = MeshData::triangles();
    let mut dark = MeshData::triangles();
    let cols = (ROOM_WIDTH / TILE_SIZE) as i32;
    let rows = (ROOM_LENGTH / TILE_SIZE) as i32;
    for i in 0..cols {
        for j in 0..rows {
            let x0 = -ROOM_WIDTH / 2.0 + f64::from(i) * TILE_SIZE;
            let z0 = -ROOM_LENGTH / 2.0 + f64::from(j) * TILE_SIZE;
            let target = if (i + j) % 2 == 0 { &mut light } else { &mut dark };
            target.push_quad(
                [
                    DVec3::new(x0, FLOOR_LEVEL, z0),
                    DVec3::new(x0, FLOOR_LEVEL, z0 + TILE_SIZE),
                    DVec3::new(x0 + TILE_SIZE, FLOOR_LEVEL, z0 + TILE_SIZE),
                    DVec3::new(x0 + TILE_SIZE, FLOOR_LEVEL, z0),
                ],
                DVec3::Y,
                [DVec2::ZERO, DVec2::Y, DVec2::ONE, DVec2::X],
            );
        }
    }
    (light, dark)
}

/// Ceiling: one textured quad per tile, repeating the texture.
fn ceiling_mesh() -> MeshData {
    use glam::DVec2;

    let mut mesh = MeshData::triangles();
    let y = ROOM_HEIGHT + FLOOR_LEVEL;
    let cols = (ROOM_WIDTH / TILE_SIZE) as i32;
    let rows = (ROOM_LENGTH / TILE_SIZE) as i32;
    for i in 0..cols {
        for j in 0..rows {
            let x0 = -ROOM_WIDTH / 2.0 + f64::from(i) * TILE_SIZE;
            let z0 = -ROOM_LENGTH / 2.0 + f64::from(j) * TILE_SIZE;
            mesh.push_quad(
                [
                    DVec3::new(x0, y, z0),
                    DVec3::new(x0 + TILE_SIZE, y, z0),
                    DVec3::new(x0 + TILE_SIZE, y, z0 + TILE_SIZE),
                    DVec3::new(x0, y, z0 + TILE_SIZE),
                ],
                DVec3::NEG_Y,
                [DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::Y],
            );
        }
    }
    mesh
}

/// Four walls facing inward; the far wall leaves a window-sized hole.
fn wall_mesh() -> MeshData {
    use glam::DVec2;

    let mut mesh = MeshData::triangles();
    let floor = FLOOR_LEVEL;
    let top = ROOM_HEIGHT + FLOOR_LEVEL;
    let uv = [DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::Y];
    let half_w = ROOM_WIDTH / 2.0;
    let half_l = ROOM_LENGTH / 2.0;

    // Side walls.
    mesh.push_quad(
        [
            DVec3::new(half_w, floor, half_l),
            DVec3::new(half_w, floor, -half_l),
            DVec3::new(half_w, top, -half_l),
            DVec3::new(half_w, top, half_l),
        ],
        DVec3::NEG_X,
        uv,
    );
    mesh.push_quad(
        [
            DVec3::new(-half_w, floor, -half_l),
            DVec3::new(-half_w, floor, half_l),
            DVec3::new(-half_w, top, half_l),
            DVec3::new(-half_w, top, -half_l),
        ],
        DVec3::X,
        uv,
    );

    // Near wall, behind the default camera.
    mesh.push_quad(
        [
            DVec3::new(-half_w, floor, half_l),
            DVec3::new(half_w, floor, half_l),
            DVec3::new(half_w, top, half_l),
            DVec3::new(-half_w, top, half_l),
        ],
        DVec3::NEG_Z,
        uv,
    );

    // Far wall in four segments around the window opening.
    let win_left = -GLASS_WIDTH / 2.0;
    let win_right = GLASS_WIDTH / 2.0;
    let win_bottom = floor + GLASS_ELEV;
    let win_top = win_bottom + GLASS_HEIGHT;
    let z = -half_l;
    let segments = [
        (-half_w, win_left, floor, top),
        (win_right, half_w, floor, top),
        (win_left, win_right, win_top, top),
        (win_left, win_right, floor, win_bottom),
    ];
    for (x0, x1, y0, y1) in segments {
        mesh.push_quad(
            [
                DVec3::new(x0, y0, z),
                DVec3::new(x1, y0, z),
                DVec3::new(x1, y1, z),
                DVec3::new(x0, y1, z),
            ],
            DVec3::Z,
            uv,
        );
    }
    mesh
}

/// Window frame: a 50-unit-deep reveal around the opening.
fn glass_frame_mesh() -> MeshData {
    use glam::DVec2;

    let mut mesh = MeshData::triangles();
    let uv = [DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::Y];
    let depth = 50.0;
    let w = GLASS_WIDTH;
    let h = GLASS_HEIGHT;

    let faces = [
        (
            [
                DVec3::new(0.0, 0.0, -depth),
                DVec3::new(w, 0.0, -depth),
                DVec3::new(w, 0.0, 0.0),
                DVec3::new(0.0, 0.0, 0.0),
            ],
            DVec3::Y,
        ),
        (
            [
                DVec3::new(0.0, h, 0.0),
                DVec3::new(w, h, 0.0),
                DVec3::new(w, h, -depth),
                DVec3::new(0.0, h, -depth),
            ],
            DVec3::NEG_Y,
        ),
        (
            [
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(0.0, h, 0.0),
                DVec3::new(0.0, h, -depth),
                DVec3::new(0.0, 0.0, -depth),
            ],
            DVec3::X,
        ),
        (
            [
                DVec3::new(w, 0.0, -depth),
                DVec3::new(w, h, -depth),
                DVec3::new(w, h, 0.0),
                DVec3::new(w, 0.0, 0.0),
            ],
            DVec3::NEG_X,
        ),
    ];
    for (corners, normal) in faces {
        mesh.push_quad(corners, normal, uv);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_clip_clamps_all_axes() {
        let mut pos = DVec3::new(10_000.0, 10_000.0, -10_000.0);
        wall_clip(&mut pos);
        assert_eq!(pos.x, ROOM_WIDTH / 2.0 - 512.0 - WALL_CLIP_H);
        assert_eq!(pos.y, ROOM_HEIGHT + FLOOR_LEVEL - WALL_CLIP_V);
        assert_eq!(pos.z, -(ROOM_LENGTH / 2.0 - 512.0 - WALL_CLIP_H));

        // The default camera pose is already in bounds.
        let mut home = DVec3::new(600.0, 0.0, 5200.0);
        let before = home;
        wall_clip(&mut home);
        assert_eq!(home, before);
    }

    #[test]
    fn advance_is_gated_by_frozen() {
        let mut museum = Museum::new();
        let theta = museum.orbital.earth_theta;
        assert!(museum.advance());
        assert!(museum.orbital.earth_theta != theta);

        museum.frozen = true;
        let theta = museum.orbital.earth_theta;
        assert!(!museum.advance());
        assert_eq!(museum.orbital.earth_theta, theta);
    }

    #[test]
    fn key_bindings_toggle_scene_state() {
        let mut museum = Museum::new();

        assert_eq!(museum.handle_key(NavKey::Char('a')), MuseumAction::None);
        assert!(museum.frozen);
        museum.handle_key(NavKey::Char('a'));
        assert!(!museum.frozen);

        museum.handle_key(NavKey::Char('h'));
        assert!(!museum.show_helix);
        museum.handle_key(NavKey::Char('t'));
        assert!(!museum.show_textures);

        museum.handle_key(NavKey::Char('w'));
        assert!(museum.glass.opening);

        museum.handle_key(NavKey::Char('3'));
        assert!(!museum.lights[2]);
        assert!(museum.lights[1]);

        assert_eq!(museum.handle_key(NavKey::Char('q')), MuseumAction::Quit);
        assert_eq!(
            museum.handle_key(NavKey::Char('f')),
            MuseumAction::ToggleFullscreen
        );
        assert_eq!(museum.handle_key(NavKey::Char('x')), MuseumAction::None);
    }

    #[test]
    fn draw_items_reference_valid_meshes() {
        let museum = Museum::new();
        let items = museum.draw_items();
        assert!(!items.is_empty());
        for item in &items {
            assert!(item.mesh < museum.meshes().len());
            assert!(!museum.meshes()[item.mesh].is_empty());
        }
    }

    #[test]
    fn helix_toggle_changes_the_draw_list() {
        let mut museum = Museum::new();
        let with_helix = museum.draw_items().len();
        museum.handle_key(NavKey::Char('h'));
        let without = museum.draw_items().len();
        assert_eq!(with_helix - without, 5);
    }

    #[test]
    fn texture_toggle_strips_texture_references() {
        let mut museum = Museum::new();
        assert!(museum.draw_items().iter().any(|item| item.texture.is_some()));
        museum.handle_key(NavKey::Char('t'));
        assert!(museum.draw_items().iter().all(|item| item.texture.is_none()));
    }

    #[test]
    fn blended_items_are_limited_to_glass_and_block() {
        let museum = Museum::new();
        let blended = museum
            .draw_items()
            .iter()
            .filter(|item| item.blend)
            .count();
        assert_eq!(blended, 2);
    }

    #[test]
    fn sculpture_animation_moves_the_draw_transforms() {
        let mut museum = Museum::new();
        let before = museum.draw_items();
        museum.advance();
        let after = museum.draw_items();
        assert_eq!(before.len(), after.len());
        // At least the planets and the piston moved.
        let moved = before
            .iter()
            .zip(&after)
            .filter(|(a, b)| a.model != b.model)
            .count();
        assert!(moved >= 4);
    }
}
