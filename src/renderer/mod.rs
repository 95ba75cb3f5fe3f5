//! Forward renderer for the museum scene.
//!
//! Uploads the museum's meshes once, then draws each frame from the
//! scene's [`DrawItem`] list and the navigator's view parameters. Three
//! pipelines share one shader: opaque triangles, alpha-blended
//! triangles (drawn last, depth writes off), and unlit lines for the
//! origin axes. Per-object uniforms live in one growable buffer bound
//! with dynamic offsets.

use glam::{DMat4, DVec3};
use wgpu::util::DeviceExt;

use crate::gpu::dynamic_buffer::DynamicBuffer;
use crate::gpu::pipeline_helpers;
use crate::gpu::render_context::{RenderContext, RenderContextError};
use crate::gpu::texture::{create_depth_view, upload_png, white_pixel};
use crate::navigator::ViewParams;
use crate::scene::mesh::{self, MeshData, Topology, Vertex};
use crate::scene::{DrawItem, Museum};
use crate::texture::PngTexture;

/// Length of each drawn origin axis, in world units.
const ORIGIN_AXIS_LENGTH: f64 = 256.0;

/// Background color behind everything, including the skyline.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.02,
    a: 1.0,
};

/// Per-frame uniform data, mirrored in `museum.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    /// xyz position, w = 1.0 when the light is enabled.
    lights: [[f32; 4]; 8],
}

/// Per-object uniform data, mirrored in `museum.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectUniform {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
    diffuse: [f32; 4],
    /// x: specular strength, y: shininess, z: textured, w: unlit.
    params: [f32; 4],
}

impl ObjectUniform {
    fn new(model: &DMat4, diffuse: [f32; 4], params: [f32; 4]) -> Self {
        let normal = model.inverse().transpose();
        Self {
            model: model.as_mat4().to_cols_array_2d(),
            normal: normal.as_mat4().to_cols_array_2d(),
            diffuse,
            params,
        }
    }

    fn from_item(item: &DrawItem) -> Self {
        Self::new(
            &item.model,
            item.material.diffuse,
            [
                item.material.specular,
                item.material.shininess,
                if item.texture.is_some() { 1.0 } else { 0.0 },
                0.0,
            ],
        )
    }
}

/// An uploaded mesh.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, data: &MeshData, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }
}

/// Which pipeline a queued draw uses.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Pass {
    Opaque,
    Blend,
    Line,
}

/// One queued draw: a mesh slot, its pipeline, and an optional texture.
struct QueuedDraw {
    mesh: MeshSlot,
    pass: Pass,
    texture: Option<u32>,
}

#[derive(Clone, Copy)]
enum MeshSlot {
    Scene(usize),
    Axis,
}

/// Round `size` up to the next multiple of `alignment`.
fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// Owns all GPU state for drawing the museum.
pub struct MuseumRenderer {
    context: RenderContext,
    depth_view: wgpu::TextureView,
    opaque_pipeline: wgpu::RenderPipeline,
    blend_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    object_buffer: DynamicBuffer,
    object_bind_group: wgpu::BindGroup,
    object_stride: u64,
    texture_groups: Vec<wgpu::BindGroup>,
    white_group: wgpu::BindGroup,
    meshes: Vec<GpuMesh>,
    axis_mesh: GpuMesh,
}

impl MuseumRenderer {
    /// Create the renderer, upload the museum's meshes, and upload the
    /// given decoded textures in slot order.
    ///
    /// # Errors
    ///
    /// Returns [`RenderContextError`] if GPU initialization fails.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        initial_size: (u32, u32),
        museum: &Museum,
        textures: &[PngTexture],
    ) -> Result<Self, RenderContextError> {
        let context = RenderContext::new(window, initial_size).await?;
        let device = &context.device;

        let depth_view = create_depth_view(device, context.config.width, context.config.height);

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[pipeline_helpers::uniform_buffer(0, false)],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[pipeline_helpers::uniform_buffer(0, true)],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                pipeline_helpers::texture_2d(0),
                pipeline_helpers::filtering_sampler(1),
            ],
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let object_stride = align_to(std::mem::size_of::<ObjectUniform>() as u64, alignment);
        let object_buffer = DynamicBuffer::new(
            device,
            "Object Uniform Buffer",
            (object_stride * 96) as usize,
            wgpu::BufferUsages::UNIFORM,
        );
        let object_bind_group =
            Self::create_object_bind_group(device, &object_layout, &object_buffer, object_stride);

        let sampler = pipeline_helpers::repeat_sampler(device, "Surface Sampler");
        let make_texture_group = |view: &wgpu::TextureView, label: &str| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            })
        };

        let texture_groups = textures
            .iter()
            .enumerate()
            .map(|(i, png)| {
                let label = format!("Scene Texture {i}");
                let view = upload_png(device, &context.queue, png, &label);
                make_texture_group(&view, &label)
            })
            .collect();
        let white_view = white_pixel(device, &context.queue);
        let white_group = make_texture_group(&white_view, "White Texture");

        let shader =
            device.create_shader_module(wgpu::include_wgsl!("../../assets/shaders/museum.wgsl"));
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0, // position
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 12,
                    shader_location: 1, // normal
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 24,
                    shader_location: 2, // uv
                },
            ],
        };
        let layouts: [&wgpu::BindGroupLayout; 3] =
            [&frame_layout, &object_layout, &texture_layout];

        let opaque_pipeline = pipeline_helpers::create_mesh_pipeline(
            device,
            "Opaque",
            &shader,
            context.format(),
            wgpu::PrimitiveTopology::TriangleList,
            None,
            true,
            vertex_layout.clone(),
            &layouts,
        );
        let blend_pipeline = pipeline_helpers::create_mesh_pipeline(
            device,
            "Blend",
            &shader,
            context.format(),
            wgpu::PrimitiveTopology::TriangleList,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
            vertex_layout.clone(),
            &layouts,
        );
        let line_pipeline = pipeline_helpers::create_mesh_pipeline(
            device,
            "Line",
            &shader,
            context.format(),
            wgpu::PrimitiveTopology::LineList,
            None,
            true,
            vertex_layout,
            &layouts,
        );

        let meshes = museum
            .meshes()
            .iter()
            .enumerate()
            .map(|(i, data)| {
                debug_assert_eq!(data.topology, Topology::TriangleList);
                GpuMesh::upload(device, data, &format!("Scene Mesh {i}"))
            })
            .collect();
        let axis_mesh = {
            let data = mesh::unit_axis_line(ORIGIN_AXIS_LENGTH);
            GpuMesh::upload(device, &data, "Origin Axis")
        };

        Ok(Self {
            context,
            depth_view,
            opaque_pipeline,
            blend_pipeline,
            line_pipeline,
            frame_buffer,
            frame_bind_group,
            object_layout,
            object_buffer,
            object_bind_group,
            object_stride,
            texture_groups,
            white_group,
            meshes,
            axis_mesh,
        })
    }

    fn create_object_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &DynamicBuffer,
        stride: u64,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: buffer.buffer(),
                    offset: 0,
                    size: wgpu::BufferSize::new(stride),
                }),
            }],
        })
    }

    /// Reconfigure the surface and depth buffer for a new window size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        self.depth_view =
            create_depth_view(&self.context.device, self.context.config.width, self.context.config.height);
    }

    /// Draw one frame of the museum from the given view.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] when the swapchain needs
    /// reconfiguration; callers resize and retry.
    pub fn render(
        &mut self,
        params: &ViewParams,
        museum: &Museum,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.get_next_frame()?;
        let frame_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (queued, uniforms) = self.build_queue(params, museum);
        self.upload_uniforms(params, museum, &uniforms);

        let mut encoder = self.context.create_encoder();
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Museum Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            let mut current_pass = None;
            for (index, draw) in queued.iter().enumerate() {
                if current_pass != Some(draw.pass) {
                    current_pass = Some(draw.pass);
                    pass.set_pipeline(match draw.pass {
                        Pass::Opaque => &self.opaque_pipeline,
                        Pass::Blend => &self.blend_pipeline,
                        Pass::Line => &self.line_pipeline,
                    });
                }

                let offset = (index as u64 * self.object_stride) as u32;
                pass.set_bind_group(1, &self.object_bind_group, &[offset]);

                let texture_group = draw
                    .texture
                    .and_then(|slot| self.texture_groups.get(slot as usize))
                    .unwrap_or(&self.white_group);
                pass.set_bind_group(2, texture_group, &[]);

                let gpu_mesh = match draw.mesh {
                    MeshSlot::Scene(i) => &self.meshes[i],
                    MeshSlot::Axis => &self.axis_mesh,
                };
                pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..gpu_mesh.index_count, 0, 0..1);
            }
        }
        self.context.submit(encoder);
        frame.present();
        Ok(())
    }

    /// Order this frame's draws (opaque, blended, axes) and produce the
    /// matching per-object uniforms.
    fn build_queue(
        &self,
        params: &ViewParams,
        museum: &Museum,
    ) -> (Vec<QueuedDraw>, Vec<ObjectUniform>) {
        let items = museum.draw_items();
        let mut queued = Vec::with_capacity(items.len() + 3);
        let mut uniforms = Vec::with_capacity(items.len() + 3);

        for blend_phase in [false, true] {
            for item in items.iter().filter(|item| item.blend == blend_phase) {
                queued.push(QueuedDraw {
                    mesh: MeshSlot::Scene(item.mesh),
                    pass: if item.blend { Pass::Blend } else { Pass::Opaque },
                    texture: item.texture,
                });
                uniforms.push(ObjectUniform::from_item(item));
            }
        }

        if params.show_origin {
            let axes = [
                (DMat4::IDENTITY, [1.0, 0.0, 0.0, 1.0]),
                (
                    DMat4::from_rotation_z(90.0_f64.to_radians()),
                    [0.0, 1.0, 0.0, 1.0],
                ),
                (
                    DMat4::from_rotation_y(-90.0_f64.to_radians()),
                    [0.0, 0.0, 1.0, 1.0],
                ),
            ];
            for (model, color) in axes {
                queued.push(QueuedDraw {
                    mesh: MeshSlot::Axis,
                    pass: Pass::Line,
                    texture: None,
                });
                uniforms.push(ObjectUniform::new(&model, color, [0.0, 1.0, 0.0, 1.0]));
            }
        }

        (queued, uniforms)
    }

    fn upload_uniforms(&mut self, params: &ViewParams, museum: &Museum, objects: &[ObjectUniform]) {
        let mut lights = [[0.0_f32; 4]; 8];
        for (slot, position) in lights.iter_mut().zip(museum.light_positions()) {
            *slot = light_vec(position);
        }
        for (slot, enabled) in lights.iter_mut().zip(museum.lights) {
            slot[3] = if enabled { 1.0 } else { 0.0 };
        }
        let frame = FrameUniform {
            view_proj: (params.projection * params.view).as_mat4().to_cols_array_2d(),
            eye: [
                params.eye.x as f32,
                params.eye.y as f32,
                params.eye.z as f32,
                0.0,
            ],
            lights,
        };
        self.context
            .queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));

        // Spread the object uniforms out to the dynamic-offset stride.
        let stride = self.object_stride as usize;
        let mut bytes = vec![0_u8; objects.len() * stride];
        for (i, object) in objects.iter().enumerate() {
            let src = bytemuck::bytes_of(object);
            bytes[i * stride..i * stride + src.len()].copy_from_slice(src);
        }
        let reallocated =
            self.object_buffer
                .write_bytes(&self.context.device, &self.context.queue, &bytes);
        if reallocated {
            self.object_bind_group = Self::create_object_bind_group(
                &self.context.device,
                &self.object_layout,
                &self.object_buffer,
                self.object_stride,
            );
        }
    }
}

fn light_vec(position: DVec3) -> [f32; 4] {
    [position.x as f32, position.y as f32, position.z as f32, 0.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layouts_match_the_shader() {
        // FrameUniform: mat4 + vec4 + 8 vec4 lights.
        assert_eq!(std::mem::size_of::<FrameUniform>(), 64 + 16 + 128);
        // ObjectUniform: two mat4s + two vec4s.
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 64 + 64 + 16 + 16);
    }

    #[test]
    fn align_to_rounds_up() {
        assert_eq!(align_to(160, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
    }

    #[test]
    fn normal_matrix_is_inverse_transpose() {
        let model = DMat4::from_scale(glam::DVec3::new(2.0, 1.0, 1.0));
        let object = ObjectUniform::new(&model, [1.0; 4], [0.0; 4]);
        // A +X normal under a 2x X-scale shrinks by half.
        assert!((object.normal[0][0] - 0.5).abs() < 1e-6);
        assert!((object.normal[1][1] - 1.0).abs() < 1e-6);
    }
}
