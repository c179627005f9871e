//! Configuration and shared geometry types.

/// How the renderer should present frames.
///
/// * `Wallpaper` streams frames into a Wayland layer surface owned by the
///   compositor's background layer.
/// * `Windowed` spins up an interactive preview window driven by `winit`,
///   which is also the only mode that receives pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Wallpaper,
    Windowed,
}

/// Anti-aliasing policy for the render pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to device support).
    Samples(u32),
}

impl Default for Antialiasing {
    fn default() -> Self {
        Self::Auto
    }
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window or surface size in physical pixels.
    pub surface_size: (u32, u32),
    /// Presentation mode (wallpaper vs interactive window).
    pub mode: RenderMode,
    /// Optional FPS cap for wallpaper mode; None = render every callback.
    pub target_fps: Option<f32>,
    /// Anti-aliasing policy requested by the caller.
    pub antialiasing: Antialiasing,
    /// Seed for shard texture synthesis and panel parameters.
    pub seed: u64,
}

impl Default for RendererConfig {
    /// Provides a 1080p wallpaper configuration.
    fn default() -> Self {
        Self {
            surface_size: (1920, 1080),
            mode: RenderMode::Wallpaper,
            target_fps: None,
            antialiasing: Antialiasing::default(),
            seed: 0,
        }
    }
}

/// Orthographic projection bounds matching the surface pixel-for-pixel:
/// one scene unit is one pixel, origin at the viewport center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl OrthoBounds {
    pub fn from_size(width: u32, height: u32) -> Self {
        let half_width = width as f32 * 0.5;
        let half_height = height as f32 * 0.5;
        Self {
            left: -half_width,
            right: half_width,
            top: half_height,
            bottom: -half_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ortho_bounds_are_centered_on_the_viewport() {
        let bounds = OrthoBounds::from_size(1024, 768);
        assert_eq!(bounds.left, -512.0);
        assert_eq!(bounds.right, 512.0);
        assert_eq!(bounds.top, 384.0);
        assert_eq!(bounds.bottom, -384.0);
    }
}
