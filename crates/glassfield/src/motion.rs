//! The per-frame motion field.
//!
//! A pure function of elapsed time, panel index, panel parameters, pointer
//! and viewport. No state survives between frames; the renderer overwrites
//! each panel's placement on every tick.

use crate::{panel::PanelParams, Pointer, Viewport, TEXTURE_SIZE};

/// Frame-derived placement of one shard, center-anchored in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    /// Rotation about the shard's own center, radians.
    pub rotation: f32,
    pub opacity: f32,
    /// Rendered edge length in pixels (uniform scale, no aspect distortion).
    pub size: f32,
}

/// Evaluates the motion field for panel `index` at `time_ms` milliseconds.
///
/// The horizontal wobble also perturbs rotation; pointer offsets are scaled
/// by index-dependent parallax factors so higher layers track the cursor
/// more strongly.
pub fn place(
    time_ms: f32,
    index: usize,
    params: &PanelParams,
    pointer: Pointer,
    viewport: Viewport,
) -> Placement {
    let (center_x, center_y) = viewport.center();
    let i = index as f32;

    let wob = (time_ms * 0.0005 * (1.0 + i * 0.1) * params.speed).sin();
    let parallax_x = (pointer.x - center_x) * 0.08 * ((index % 3) + 1) as f32;
    let parallax_y = (pointer.y - center_y) * 0.06 * ((index % 4) + 1) as f32;
    let bob = (time_ms * 0.0003 * (1.0 + i * 0.07)).cos()
        * 60.0
        * if index % 2 == 1 { 1.0 } else { -1.0 };

    Placement {
        x: center_x + params.home_x + wob * 80.0 + parallax_x,
        y: center_y + params.home_y + bob + parallax_y,
        rotation: params.rotation_bias + wob * 0.18,
        opacity: params.base_opacity * (0.6 + 0.4 * (time_ms * 0.0008 + i).sin()),
        size: TEXTURE_SIZE as f32 * params.scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };

    fn params() -> PanelParams {
        PanelParams {
            home_x: 40.0,
            home_y: -25.0,
            rotation_bias: 0.1,
            speed: 0.5,
            scale: 1.0,
            base_opacity: 0.8,
        }
    }

    #[test]
    fn placement_is_referentially_transparent() {
        let pointer = Pointer { x: 130.0, y: 470.0 };
        for index in 0..12 {
            let a = place(1234.5, index, &params(), pointer, VIEWPORT);
            let b = place(1234.5, index, &params(), pointer, VIEWPORT);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn opacity_never_exceeds_base_or_drops_below_zero() {
        let pointer = Pointer::centered(VIEWPORT);
        let p = params();
        for index in 0..12 {
            for step in 0..2000 {
                let placement = place(step as f32 * 13.7, index, &p, pointer, VIEWPORT);
                assert!(placement.opacity >= 0.0);
                assert!(placement.opacity <= p.base_opacity + 1e-6);
            }
        }
    }

    #[test]
    fn centered_pointer_contributes_no_parallax() {
        let centered = place(500.0, 4, &params(), Pointer::centered(VIEWPORT), VIEWPORT);
        let moved = place(
            500.0,
            4,
            &params(),
            Pointer { x: 600.0, y: 300.0 },
            VIEWPORT,
        );
        // x parallax factor for index 4 is (4 % 3 + 1) * 0.08 = 0.16.
        assert!((moved.x - centered.x - (600.0 - 400.0) * 0.16).abs() < 1e-3);
        assert_eq!(moved.y, centered.y);
        assert_eq!(moved.rotation, centered.rotation);
    }

    #[test]
    fn parallax_depth_increases_with_index_mod_three() {
        let pointer = Pointer { x: 500.0, y: 300.0 };
        let p = params();
        // Indices 0 and 2 share speed-independent terms only through wob;
        // compare against the same index at centered pointer instead.
        for index in 0..6 {
            let moved = place(0.0, index, &p, pointer, VIEWPORT);
            let rest = place(0.0, index, &p, Pointer::centered(VIEWPORT), VIEWPORT);
            let expected = (500.0 - 400.0) * 0.08 * ((index % 3) + 1) as f32;
            assert!((moved.x - rest.x - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn vertical_oscillation_alternates_by_parity() {
        let pointer = Pointer::centered(VIEWPORT);
        let p = PanelParams {
            home_y: 0.0,
            ..params()
        };
        // At t=0 the cosine term is 1, so odd indices sit 60px below their
        // home row and even indices 60px above it.
        let even = place(0.0, 0, &p, pointer, VIEWPORT);
        let odd = place(0.0, 1, &p, pointer, VIEWPORT);
        assert!((even.y - (300.0 - 60.0)).abs() < 1e-3);
        assert!((odd.y - (300.0 + 60.0)).abs() < 1e-3);
    }

    #[test]
    fn size_scales_the_native_texture_uniformly() {
        let placement = place(
            0.0,
            3,
            &PanelParams {
                scale: 0.75,
                ..params()
            },
            Pointer::centered(VIEWPORT),
            VIEWPORT,
        );
        assert_eq!(placement.size, TEXTURE_SIZE as f32 * 0.75);
    }

    #[test]
    fn rotation_stays_within_the_wobble_band() {
        let p = params();
        for step in 0..2000 {
            let placement = place(step as f32 * 7.3, 5, &p, Pointer::centered(VIEWPORT), VIEWPORT);
            assert!((placement.rotation - p.rotation_bias).abs() <= 0.18 + 1e-6);
        }
    }
}
