//! The fixed pool of floating shard panels.

use image::RgbaImage;
use rand::Rng;

use crate::{texture, Viewport, SHARD_COUNT};

/// Immutable per-panel motion parameters, drawn once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelParams {
    /// Home offset from the viewport center, in pixels.
    pub home_x: f32,
    pub home_y: f32,
    /// Resting rotation in radians.
    pub rotation_bias: f32,
    /// Oscillation speed factor.
    pub speed: f32,
    /// Uniform render scale applied to the native texture size.
    pub scale: f32,
    /// Peak opacity before the per-frame pulse.
    pub base_opacity: f32,
}

impl PanelParams {
    fn draw(viewport: Viewport, rng: &mut impl Rng) -> Self {
        Self {
            home_x: (rng.gen::<f32>() - 0.5) * viewport.width * 0.6,
            home_y: (rng.gen::<f32>() - 0.5) * viewport.height * 0.4,
            rotation_bias: (rng.gen::<f32>() - 0.5) * 0.8,
            speed: 0.2 + rng.gen::<f32>() * 0.6,
            scale: 0.4 + rng.gen::<f32>() * 0.9,
            base_opacity: 0.3 + rng.gen::<f32>() * 0.6,
        }
    }
}

/// One shard: its synthesized texture plus motion parameters. Immutable
/// after creation; the frame-derived placement lives with the renderer.
pub struct Panel {
    pub texture: RgbaImage,
    pub params: PanelParams,
}

/// The full shard collection, in creation order.
pub struct PanelPool {
    panels: Vec<Panel>,
}

impl PanelPool {
    /// Synthesizes all [`SHARD_COUNT`] panels from the supplied generator.
    pub fn generate(viewport: Viewport, rng: &mut impl Rng) -> Self {
        let panels = (0..SHARD_COUNT)
            .map(|_| Panel {
                texture: texture::synthesize(rng),
                params: PanelParams::draw(viewport, rng),
            })
            .collect();
        Self { panels }
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const VIEWPORT: Viewport = Viewport {
        width: 1920.0,
        height: 1080.0,
    };

    #[test]
    fn pool_holds_exactly_twelve_panels() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = PanelPool::generate(VIEWPORT, &mut rng);
        assert_eq!(pool.len(), SHARD_COUNT);
    }

    #[test]
    fn parameters_stay_inside_their_bands() {
        let mut rng = StdRng::seed_from_u64(2);
        let pool = PanelPool::generate(VIEWPORT, &mut rng);
        for panel in pool.panels() {
            let p = panel.params;
            assert!(p.home_x.abs() <= VIEWPORT.width * 0.3);
            assert!(p.home_y.abs() <= VIEWPORT.height * 0.2);
            assert!(p.rotation_bias.abs() <= 0.4);
            assert!((0.2..0.8).contains(&p.speed));
            assert!((0.4..1.3).contains(&p.scale));
            assert!((0.3..0.9).contains(&p.base_opacity));
        }
    }

    #[test]
    fn same_seed_reproduces_the_pool() {
        let mut first = StdRng::seed_from_u64(77);
        let mut second = StdRng::seed_from_u64(77);
        let a = PanelPool::generate(VIEWPORT, &mut first);
        let b = PanelPool::generate(VIEWPORT, &mut second);
        for (lhs, rhs) in a.panels().iter().zip(b.panels()) {
            assert_eq!(lhs.params, rhs.params);
            assert_eq!(lhs.texture.as_raw(), rhs.texture.as_raw());
        }
    }
}
