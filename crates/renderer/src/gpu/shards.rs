//! The shard pass: one rotated, alpha-blended textured quad per panel.

use anyhow::{Context, Result};
use bytemuck::Zeroable;
use wgpu::util::{DeviceExt, TextureDataOrder};

use glassfield::{place, Panel, PanelParams, PanelPool, Pointer, Viewport};

use super::uniforms::ShardUniforms;
use crate::compile;

/// Draws the panel pool over the background. Textures are uploaded once at
/// construction; the per-shard uniform buffers are rewritten every frame
/// from the motion field.
pub(crate) struct ShardRenderer {
    pipeline: wgpu::RenderPipeline,
    slots: Vec<ShardSlot>,
}

/// GPU residency for one panel.
struct ShardSlot {
    params: PanelParams,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    _texture: wgpu::Texture,
}

impl ShardRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
        scene_layout: &wgpu::BindGroupLayout,
        pool: &PanelPool,
    ) -> Result<Self> {
        let shard_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shard uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shard texture layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shard pipeline layout"),
            bind_group_layouts: &[scene_layout, &shard_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let vertex_module =
            compile::shard_vertex(device).context("failed to compile shard vertex shader")?;
        let fragment_module =
            compile::shard_fragment(device).context("failed to compile shard fragment shader")?;

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shard pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Quads may flip winding under rotation; never cull them.
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..wgpu::MultisampleState::default()
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let slots = pool
            .panels()
            .iter()
            .enumerate()
            .map(|(index, panel)| {
                Self::build_slot(
                    device,
                    queue,
                    index,
                    panel,
                    &shard_layout,
                    &texture_layout,
                    &sampler,
                )
            })
            .collect();

        Ok(Self { pipeline, slots })
    }

    fn build_slot(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        index: usize,
        panel: &Panel,
        shard_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) -> ShardSlot {
        let (width, height) = panel.texture.dimensions();
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(&format!("shard texture #{index}")),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            panel.texture.as_raw(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("shard uniforms #{index}")),
            contents: bytemuck::bytes_of(&ShardUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("shard uniform bind group #{index}")),
            layout: shard_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("shard texture bind group #{index}")),
            layout: texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        ShardSlot {
            params: panel.params,
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group,
            _texture: texture,
        }
    }

    /// Re-evaluates the motion field for every shard and uploads the
    /// resulting placements.
    pub fn update(
        &self,
        queue: &wgpu::Queue,
        time_ms: f32,
        pointer: Pointer,
        viewport: Viewport,
    ) {
        for (index, slot) in self.slots.iter().enumerate() {
            let placement = place(time_ms, index, &slot.params, pointer, viewport);
            queue.write_buffer(
                &slot.uniform_buffer,
                0,
                bytemuck::bytes_of(&ShardUniforms::from_placement(&placement)),
            );
        }
    }

    /// Records one draw per shard; the caller has already bound the scene
    /// uniforms at group 0.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        for slot in &self.slots {
            render_pass.set_bind_group(1, &slot.uniform_bind_group, &[]);
            render_pass.set_bind_group(2, &slot.texture_bind_group, &[]);
            render_pass.draw(0..4, 0..1);
        }
    }
}
