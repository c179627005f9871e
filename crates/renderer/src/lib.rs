//! Renderer crate for glasspaper.
//!
//! Glues the presentation surface (preview window or Wayland layer surface),
//! the `wgpu` pipelines, and the glassfield simulation together:
//!
//! ```text
//!   CLI / glasspaper
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ window / wallpaper driver ──▶ render_frame()
//!          ▲                            │
//!          │                            ├─▶ scene uniforms ─▶ background pass
//!          │                            └─▶ motion field  ─▶ shard pass
//! ```
//!
//! `GpuState` owns every GPU resource (surface, device, pipelines, shard
//! textures); the two frame drivers own scheduling and input. The
//! background fragment program and the shard quad shaders are embedded
//! GLSL compiled through naga at startup.

mod compile;
mod gpu;
mod runtime;
mod types;
mod wallpaper;
mod window;

pub use runtime::{FixedTimeSource, SystemTimeSource, TimeSample, TimeSource};
pub use types::{Antialiasing, OrthoBounds, RenderMode, RendererConfig};

use anyhow::Result;

/// High-level entry point that owns the chosen configuration.
///
/// The heavy lifting lives inside the mode drivers; `Renderer` simply
/// selects the presentation path and forwards the request.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    /// Builds a renderer for the supplied configuration.
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Launches the renderer in either wallpaper or windowed mode.
    ///
    /// Returns an error if the mode fails to initialize, for example when
    /// no Wayland compositor (or no layer-shell support) is present.
    pub fn run(&mut self) -> Result<()> {
        match self.config.mode {
            RenderMode::Wallpaper => wallpaper::run(&self.config),
            RenderMode::Windowed => window::run(&self.config),
        }
    }
}
