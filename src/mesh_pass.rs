//! 3D mesh rendering pass with depth testing, lighting and texture support.
//!
//! The mesh pass uses three bind groups:
//! - **Group 0**: Scene uniforms (view-projection matrix, camera position, time, spotlight)
//! - **Group 1**: Per-draw uniforms (model matrix, normal matrix, material), dynamically offset
//! - **Group 2**: Texture and sampler for the mesh surface
//!
//! # Draw order
//!
//! Queued draws are rendered in one pass: opaque surfaces first, then
//! transparent ones with depth writes off so shells blend over what is
//! behind them, then line lists.
//!
//! # Depth Buffer
//!
//! The pass keeps its own `Depth32Float` buffer and recreates it when the
//! surface size changes.

use std::num::NonZeroU64;

use crate::camera::Camera;
use crate::color::Color;
use crate::gpu::GpuContext;
use crate::handles::TextureId;
use crate::light::{LightUniforms, SpotLight};
use crate::material::MaterialUniforms;
use crate::mesh::Vertex3d;
use crate::scene::{DrawLayer, Scene};
use crate::texture::Texture;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Scene-wide uniforms, written once per frame.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    /// Combined view-projection matrix for transforming world positions to clip space.
    pub view_proj: [[f32; 4]; 4],
    /// Camera position in world space (xyz) and elapsed time in seconds (w).
    pub camera_pos: [f32; 4],
    pub light: LightUniforms,
}

/// Per-draw uniforms, one slot per queued draw.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    /// Model matrix (object to world space transformation).
    pub model: [[f32; 4]; 4],
    /// Normal matrix (inverse transpose of model matrix) for correct normal transformation.
    pub normal_matrix: [[f32; 4]; 4],
    pub material: MaterialUniforms,
}

/// Renders the scene's draw queue with depth testing.
///
/// # Pipeline Configuration
///
/// - Opaque: back-face culling, depth write, `Less` comparison
/// - Transparent: back-face culling, alpha blending, depth test without write
/// - Lines: no culling, alpha blending, depth test without write
pub struct MeshPass {
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    draw_bind_group_layout: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    /// Byte distance between per-draw slots, respecting the device's offset alignment.
    draw_stride: u64,
    /// Number of draw slots in `draw_buffer`.
    draw_capacity: usize,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    default_texture_bind_group: wgpu::BindGroup,
    /// One bind group per scene texture, indexed like the scene's texture storage.
    texture_bind_groups: Vec<wgpu::BindGroup>,
    /// View into the depth texture for render pass attachment.
    pub(crate) depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl MeshPass {
    /// Creates a new mesh rendering pass.
    ///
    /// This initializes all GPU resources including:
    /// - The opaque, transparent and line pipelines
    /// - Scene and per-draw uniform buffers
    /// - A default 1x1 white texture for untextured meshes
    /// - A depth buffer sized to the current screen dimensions
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        // Scene uniform buffer (group 0)
        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        // Per-draw uniform buffer (group 1)
        let draw_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Draw Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<DrawUniforms>() as u64
                        ),
                    },
                    count: None,
                }],
            });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let draw_stride = draw_slot_stride(alignment);
        let draw_capacity = 4;
        let (draw_buffer, draw_bind_group) =
            Self::create_draw_slots(gpu, &draw_bind_group_layout, draw_stride, draw_capacity);

        // Texture bind group layout (group 2)
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        // Untextured surfaces sample plain white
        let default_texture = Texture::solid(gpu, [255, 255, 255, 255], "Default White Texture");
        let default_texture_bind_group =
            create_texture_bind_group(gpu, &texture_bind_group_layout, &default_texture);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[
                &scene_bind_group_layout,
                &draw_bind_group_layout,
                &texture_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let opaque_pipeline = create_pipeline(
            gpu,
            &pipeline_layout,
            &shader,
            PipelineKind {
                label: "Mesh Opaque Pipeline",
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                blend: wgpu::BlendState::REPLACE,
                depth_write: true,
            },
        );
        let transparent_pipeline = create_pipeline(
            gpu,
            &pipeline_layout,
            &shader,
            PipelineKind {
                label: "Mesh Transparent Pipeline",
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
            },
        );
        let line_pipeline = create_pipeline(
            gpu,
            &pipeline_layout,
            &shader,
            PipelineKind {
                label: "Mesh Line Pipeline",
                topology: wgpu::PrimitiveTopology::LineList,
                cull_mode: None,
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
            },
        );

        let depth_view = Self::create_depth_view(gpu);

        Self {
            opaque_pipeline,
            transparent_pipeline,
            line_pipeline,
            scene_buffer,
            scene_bind_group,
            draw_bind_group_layout,
            draw_buffer,
            draw_bind_group,
            draw_stride,
            draw_capacity,
            texture_bind_group_layout,
            default_texture_bind_group,
            texture_bind_groups: Vec::new(),
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
        }
    }

    fn create_draw_slots(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });

        (buffer, bind_group)
    }

    /// Grows the per-draw buffer so it holds at least `count` slots.
    fn ensure_draw_capacity(&mut self, gpu: &GpuContext, count: usize) {
        if count <= self.draw_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        let (buffer, bind_group) = Self::create_draw_slots(
            gpu,
            &self.draw_bind_group_layout,
            self.draw_stride,
            capacity,
        );
        tracing::debug!(capacity, "grew mesh draw uniform buffer");
        self.draw_buffer = buffer;
        self.draw_bind_group = bind_group;
        self.draw_capacity = capacity;
    }

    /// Creates bind groups for scene textures registered since the last frame.
    fn sync_texture_bind_groups(&mut self, gpu: &GpuContext, scene: &Scene) {
        for texture in scene.textures.iter().skip(self.texture_bind_groups.len()) {
            let bind_group =
                create_texture_bind_group(gpu, &self.texture_bind_group_layout, texture);
            self.texture_bind_groups.push(bind_group);
        }
    }

    fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Ensures the depth buffer matches the current screen size.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            self.depth_view = Self::create_depth_view(gpu);
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Renders every queued draw of `scene` into `target`.
    ///
    /// The target is cleared to `clear_color` first, so a frame with an
    /// empty queue still presents a clean background.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        scene: &Scene,
        camera: &Camera,
        light: &SpotLight,
        clear_color: Color,
        time: f32,
    ) {
        self.ensure_depth_size(gpu);
        self.sync_texture_bind_groups(gpu, scene);

        let draws = scene.ordered_draws();
        self.ensure_draw_capacity(gpu, draws.len());

        let position = camera.position;
        let scene_uniforms = SceneUniforms {
            view_proj: camera.view_projection(gpu.aspect()).to_cols_array_2d(),
            camera_pos: [position.x, position.y, position.z, time],
            light: light.uniforms(),
        };
        gpu.queue.write_buffer(
            &self.scene_buffer,
            0,
            bytemuck::cast_slice(&[scene_uniforms]),
        );

        // Pack every draw's uniforms into its own aligned slot
        let stride = self.draw_stride as usize;
        let mut slots = vec![0u8; stride * draws.len()];
        for (i, (_, queued, _)) in draws.iter().enumerate() {
            let model_matrix = queued.transform.matrix();
            let uniforms = DrawUniforms {
                model: model_matrix.to_cols_array_2d(),
                normal_matrix: model_matrix.inverse().transpose().to_cols_array_2d(),
                material: queued.material.uniforms(),
            };
            let bytes = bytemuck::bytes_of(&uniforms);
            slots[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        if !slots.is_empty() {
            gpu.queue.write_buffer(&self.draw_buffer, 0, &slots);
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Mesh Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color.to_wgpu()),
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

        render_pass.set_bind_group(0, &self.scene_bind_group, &[]);

        let mut current_layer = None;
        for (i, (layer, queued, mesh)) in draws.iter().enumerate() {
            if current_layer != Some(*layer) {
                render_pass.set_pipeline(match layer {
                    DrawLayer::Opaque => &self.opaque_pipeline,
                    DrawLayer::Transparent => &self.transparent_pipeline,
                    DrawLayer::Lines => &self.line_pipeline,
                });
                current_layer = Some(*layer);
            }

            let offset = (i * stride) as wgpu::DynamicOffset;
            render_pass.set_bind_group(1, &self.draw_bind_group, &[offset]);

            // Bind texture (use default white texture if none provided)
            let slot = texture_slot(queued.material.map, self.texture_bind_groups.len());
            let texture_bind_group = slot.map_or(&self.default_texture_bind_group, |slot| {
                &self.texture_bind_groups[slot]
            });
            render_pass.set_bind_group(2, texture_bind_group, &[]);

            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

/// Binds a texture and its sampler to group 2.
fn create_texture_bind_group(
    gpu: &GpuContext,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
) -> wgpu::BindGroup {
    gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Mesh Texture Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}

/// Cached bind group slot for a material's map, `None` for the white fallback.
fn texture_slot(map: Option<TextureId>, cached: usize) -> Option<usize> {
    map.map(TextureId::index).filter(|&index| index < cached)
}

struct PipelineKind {
    label: &'static str,
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    blend: wgpu::BlendState,
    depth_write: bool,
}

fn create_pipeline(
    gpu: &GpuContext,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    kind: PipelineKind,
) -> wgpu::RenderPipeline {
    gpu.device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(kind.label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(kind.blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: kind.topology,
                cull_mode: kind.cull_mode,
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: kind.depth_write,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
}

/// Size of one per-draw slot, rounded up to the uniform offset alignment.
fn draw_slot_stride(alignment: u64) -> u64 {
    let size = std::mem::size_of::<DrawUniforms>() as u64;
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 144);
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 192);
    }

    #[test]
    fn texture_slots_fall_back_to_white() {
        assert_eq!(texture_slot(None, 3), None);
        assert_eq!(texture_slot(Some(TextureId(0)), 3), Some(0));
        assert_eq!(texture_slot(Some(TextureId(2)), 3), Some(2));
        assert_eq!(texture_slot(Some(TextureId(3)), 3), None);
        assert_eq!(texture_slot(Some(TextureId(0)), 0), None);
    }

    #[test]
    fn draw_slots_respect_alignment() {
        assert_eq!(draw_slot_stride(256), 256);
        assert_eq!(draw_slot_stride(64), 192);
        assert_eq!(draw_slot_stride(128), 256);
        assert_eq!(draw_slot_stride(0), 192);
    }
}
