//! Core simulation for glasspaper.
//!
//! Everything in this crate is CPU-side and deterministic: shard textures are
//! synthesized once at startup from an injected seeded generator, and the
//! motion field is a pure function re-evaluated every frame. The renderer
//! crate consumes the output; nothing here touches the GPU or the windowing
//! system.
//!
//! ```text
//!   StdRng ──▶ PanelPool::generate ──▶ [Panel; 12] (texture + params)
//!                                            │
//!   (time, pointer, viewport) ──▶ motion::place ──▶ Placement per frame
//! ```

mod motion;
mod panel;
mod texture;

pub use motion::{place, Placement};
pub use panel::{Panel, PanelParams, PanelPool};
pub use texture::synthesize;

/// Number of floating shards; fixed for the process lifetime.
pub const SHARD_COUNT: usize = 12;

/// Edge length of every shard texture in pixels.
pub const TEXTURE_SIZE: u32 = 512;

/// Current surface dimensions in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }
}

/// Pointer position in pixel space, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
}

impl Pointer {
    /// The resting pointer sits at the viewport center, where both the
    /// shader ripple and the shard parallax contribute nothing.
    pub fn centered(viewport: Viewport) -> Self {
        let (x, y) = viewport.center();
        Self { x, y }
    }
}
