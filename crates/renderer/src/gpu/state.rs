//! GPU bring-up and the per-frame render path.

use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;
use wgpu::TextureFormatFeatureFlags;
use winit::dpi::PhysicalSize;

use glassfield::{PanelPool, Pointer, Viewport};

use super::shards::ShardRenderer;
use super::uniforms::SceneUniforms;
use crate::compile;
use crate::runtime::TimeSample;
use crate::types::{Antialiasing, OrthoBounds, RendererConfig};

/// Owns every GPU resource needed to present a frame.
///
/// The layout mirrors the lifetime relationship between objects:
///
/// ```text
///   Surface ─▶ Device ─▶ Queue
///                │
///                ├─▶ background pipeline + scene UBO
///                └─▶ ShardRenderer (textures, per-shard UBOs)
/// ```
pub(crate) struct GpuState {
    /// `wgpu` instance that produced the surface; kept alive for the
    /// surface lifetime.
    _instance: wgpu::Instance,
    /// Limits advertised by the adapter; used to validate resize requests.
    limits: wgpu::Limits,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    /// Pixel-for-pixel projection bounds; kept in lockstep with `size` and
    /// the resolution uniform.
    ortho: OrthoBounds,
    sample_count: u32,
    multisample_target: Option<MultisampleTarget>,
    background_pipeline: wgpu::RenderPipeline,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    shards: ShardRenderer,
    /// CPU copy of the scene uniforms mirrored into the buffer each frame.
    uniforms: SceneUniforms,
    last_log_time: Instant,
}

impl GpuState {
    /// Creates the full pipeline set targeting the supplied surface.
    ///
    /// Synthesizes the panel pool from the configured seed, uploads the
    /// twelve shard textures, compiles both embedded shader pairs, and
    /// seeds the uniform buffers.
    pub fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        config: &RendererConfig,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::default();
        let window_handle = target
            .window_handle()
            .map_err(|err| anyhow!("failed to acquire window handle: {err}"))?;
        let display_handle = target
            .display_handle()
            .map_err(|err| anyhow!("failed to acquire display handle: {err}"))?;
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .context("failed to create rendering surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        let limits = adapter.limits();
        let max_dimension = limits.max_texture_dimension_2d;
        let width = initial_size.width.max(1);
        let height = initial_size.height.max(1);
        if width > max_dimension || height > max_dimension {
            anyhow::bail!(
                "GPU max texture dimension is {max_dimension}, requested surface is {width}x{height}"
            );
        }

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let sample_count = resolve_sample_count(&adapter, surface_format, config.antialiasing);

        let mut required_features = wgpu::Features::empty();
        if sample_count > 4 {
            required_features |= wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES;
        }

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("glasspaper device"),
            required_features,
            required_limits: limits.clone(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        }))
        .context("failed to create GPU device")?;

        let size = PhysicalSize::new(width, height);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &surface_config);

        let vertex_module = compile::fullscreen_vertex(&device)?;
        let fragment_module = compile::background_fragment(&device)
            .context("failed to compile background shader")?;

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene uniform layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("background pipeline layout"),
            bind_group_layouts: &[&scene_layout],
            push_constant_ranges: &[],
        });

        let background_pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("background pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex_module,
                    entry_point: Some("main"),
                    buffers: &[],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
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
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview: None,
                cache: None,
            });

        let uniforms = SceneUniforms::new(size.width, size.height);
        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene uniform buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene bind group"),
            layout: &scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let mut rng = StdRng::seed_from_u64(config.seed);
        let pool = PanelPool::generate(
            Viewport::new(size.width as f32, size.height as f32),
            &mut rng,
        );
        tracing::info!(
            seed = config.seed,
            shards = pool.len(),
            "synthesized shard pool"
        );
        let shards = ShardRenderer::new(
            &device,
            &queue,
            surface_format,
            sample_count,
            &scene_layout,
            &pool,
        )?;

        let multisample_target = (sample_count > 1)
            .then(|| MultisampleTarget::new(&device, surface_format, size, sample_count));

        tracing::info!(
            width = size.width,
            height = size.height,
            sample_count,
            "initialised GPU surface"
        );

        Ok(Self {
            _instance: instance,
            limits,
            surface,
            device,
            queue,
            config: surface_config,
            size,
            ortho: OrthoBounds::from_size(size.width, size.height),
            sample_count,
            multisample_target,
            background_pipeline,
            scene_buffer,
            scene_bind_group,
            shards,
            uniforms,
            last_log_time: Instant::now(),
        })
    }

    /// Returns the current surface size.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.size.width as f32, self.size.height as f32)
    }

    /// Reconfigures the swapchain, resolution uniform, and projection
    /// bounds together, so no frame observes a mismatched set.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        let max_dimension = self.limits.max_texture_dimension_2d;
        if new_size.width > max_dimension || new_size.height > max_dimension {
            tracing::warn!(
                width = new_size.width,
                height = new_size.height,
                max_dimension,
                "resize exceeds GPU max texture dimension; keeping previous size"
            );
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.multisample_target = (self.sample_count > 1).then(|| {
            MultisampleTarget::new(&self.device, self.config.format, new_size, self.sample_count)
        });
        self.uniforms
            .set_resolution(new_size.width as f32, new_size.height as f32);
        self.ortho = OrthoBounds::from_size(new_size.width, new_size.height);
        tracing::debug!(
            width = new_size.width,
            height = new_size.height,
            "resized surface, uniforms, and projection"
        );
    }

    /// Advances uniforms and shard placements, then records and submits one
    /// frame.
    pub fn render_frame(
        &mut self,
        pointer: Pointer,
        sample: TimeSample,
    ) -> Result<(), wgpu::SurfaceError> {
        self.uniforms.set_time(sample.seconds());
        self.uniforms.set_pointer(pointer);
        self.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&self.uniforms));
        self.shards.update(
            &self.queue,
            sample.millis as f32,
            pointer,
            self.uniforms.viewport(),
        );

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render encoder"),
            });

        let (attachment_view, resolve_target) = match &self.multisample_target {
            Some(msaa) => (&msaa.view, Some(&view)),
            None => (&view, None),
        };

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.background_pipeline);
            render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
            self.shards.draw(&mut render_pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        let now = Instant::now();
        if now.duration_since(self.last_log_time) >= Duration::from_secs(5) {
            tracing::debug!(
                time = self.uniforms.time,
                frame = sample.frame_index,
                pointer_x = self.uniforms.pointer[0],
                pointer_y = self.uniforms.pointer[1],
                width = self.size.width,
                height = self.size.height,
                ortho_left = self.ortho.left,
                ortho_top = self.ortho.top,
                "frame presented"
            );
            self.last_log_time = now;
        }
        Ok(())
    }
}

/// Resolves the MSAA sample count against what the surface format supports.
fn resolve_sample_count(
    adapter: &wgpu::Adapter,
    surface_format: wgpu::TextureFormat,
    antialiasing: Antialiasing,
) -> u32 {
    let format_features = adapter.get_texture_format_features(surface_format);
    let mut supported = format_features.flags.supported_sample_counts();
    if !supported.contains(&1) {
        supported.push(1);
    }
    supported.sort_unstable();
    supported.dedup();

    let mut sample_count = match antialiasing {
        Antialiasing::Auto => *supported.last().unwrap_or(&1),
        Antialiasing::Off => 1,
        Antialiasing::Samples(requested) => {
            if supported.contains(&requested) {
                requested
            } else {
                let fallback = supported
                    .iter()
                    .copied()
                    .filter(|&count| count <= requested)
                    .max()
                    .unwrap_or(1);
                tracing::warn!(
                    requested,
                    fallback,
                    ?supported,
                    "requested MSAA sample count not supported; falling back"
                );
                fallback
            }
        }
    };

    if sample_count > 1
        && !format_features
            .flags
            .contains(TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE)
    {
        tracing::warn!(
            ?surface_format,
            "surface format does not support MSAA resolve; disabling MSAA"
        );
        sample_count = 1;
    }

    if sample_count > 4
        && !adapter
            .features()
            .contains(wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES)
    {
        let fallback = supported
            .iter()
            .copied()
            .filter(|&count| count <= 4)
            .max()
            .unwrap_or(1);
        tracing::warn!(
            sample_count,
            fallback,
            "adapter lacks TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES; clamping MSAA"
        );
        sample_count = fallback;
    }

    tracing::info!(?antialiasing, sample_count, "resolved MSAA configuration");
    sample_count
}

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glasspaper msaa color"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}
