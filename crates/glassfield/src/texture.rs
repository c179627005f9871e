//! Procedural shard textures.
//!
//! Each shard gets a 512x512 RGBA raster built in three passes: a diagonal
//! translucent gradient, a handful of faint Bezier streaks, and an irregular
//! polygon mask that carves the jagged glass silhouette out of the square.
//! All randomness comes from the caller's generator, so a fixed seed yields
//! an identical raster.

use image::{Rgba, RgbaImage};
use rand::Rng;

use crate::TEXTURE_SIZE;

const STREAK_COUNT: usize = 18;
const MASK_STEPS: usize = 12;
const MASK_ANGLE_JITTER: f32 = 0.6;
const MASK_RADIUS_JITTER: f32 = 80.0;

/// Builds one shard texture from the supplied generator.
pub fn synthesize(rng: &mut impl Rng) -> RgbaImage {
    let mut image = RgbaImage::new(TEXTURE_SIZE, TEXTURE_SIZE);
    paint_gradient(rng, &mut image);
    paint_streaks(rng, &mut image);
    let mask = rasterize_mask(&mask_vertices(rng), TEXTURE_SIZE);
    apply_mask(&mut image, &mask);
    image
}

/// Diagonal three-stop gradient: translucent near-white into pale cyan into
/// near-transparent white, with the two leading alphas randomized per shard
/// so no two panels read identically.
fn paint_gradient(rng: &mut impl Rng, image: &mut RgbaImage) {
    let start = [1.0, 1.0, 1.0, 0.05 + rng.gen::<f32>() * 0.06];
    let mid = [
        155.0 / 255.0,
        231.0 / 255.0,
        1.0,
        0.04 + rng.gen::<f32>() * 0.05,
    ];
    let end = [1.0, 1.0, 1.0, 0.02];

    let span = (2 * TEXTURE_SIZE) as f32;
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let t = (x + y) as f32 / span;
        let color = if t < 0.5 {
            lerp_color(start, mid, t * 2.0)
        } else {
            lerp_color(mid, end, (t - 0.5) * 2.0)
        };
        *pixel = quantize(color);
    }
}

/// Faint white streaks along random cubic Beziers. A per-streak coverage
/// stencil keeps self-overlapping strokes from compositing twice.
fn paint_streaks(rng: &mut impl Rng, image: &mut RgbaImage) {
    let size = TEXTURE_SIZE as usize;
    let mut stencil = vec![false; size * size];

    for _ in 0..STREAK_COUNT {
        let points: [(f32, f32); 4] = std::array::from_fn(|_| {
            (
                rng.gen::<f32>() * TEXTURE_SIZE as f32,
                rng.gen::<f32>() * TEXTURE_SIZE as f32,
            )
        });
        let alpha = 0.02 + rng.gen::<f32>() * 0.02;
        let width = 1.0 + rng.gen::<f32>() * 2.0;

        stencil.fill(false);
        stamp_bezier(&points, width * 0.5, &mut stencil, size);

        for (offset, _) in stencil.iter().enumerate().filter(|(_, hit)| **hit) {
            let x = (offset % size) as u32;
            let y = (offset / size) as u32;
            blend_over(image.get_pixel_mut(x, y), [1.0, 1.0, 1.0, alpha]);
        }
    }
}

/// Marks every pixel within `radius` of the sampled curve. Sample count is
/// proportional to the control polygon length so flat and sprawling curves
/// both stay gap-free.
fn stamp_bezier(points: &[(f32, f32); 4], radius: f32, stencil: &mut [bool], size: usize) {
    let hull_length: f32 = points
        .windows(2)
        .map(|pair| {
            let (dx, dy) = (pair[1].0 - pair[0].0, pair[1].1 - pair[0].1);
            (dx * dx + dy * dy).sqrt()
        })
        .sum();
    let steps = (hull_length * 2.0).ceil().max(32.0) as usize;

    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let (x, y) = cubic_point(points, t);
        stamp_disk(x, y, radius, stencil, size);
    }
}

fn cubic_point(points: &[(f32, f32); 4], t: f32) -> (f32, f32) {
    let u = 1.0 - t;
    let w = [u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t];
    let x = points.iter().zip(w).map(|(p, w)| p.0 * w).sum();
    let y = points.iter().zip(w).map(|(p, w)| p.1 * w).sum();
    (x, y)
}

fn stamp_disk(cx: f32, cy: f32, radius: f32, stencil: &mut [bool], size: usize) {
    let radius = radius.max(0.5);
    let min_x = ((cx - radius).floor().max(0.0)) as usize;
    let max_x = ((cx + radius).ceil().min(size as f32 - 1.0)) as usize;
    let min_y = ((cy - radius).floor().max(0.0)) as usize;
    let max_y = ((cy + radius).ceil().min(size as f32 - 1.0)) as usize;
    if cx + radius < 0.0 || cy + radius < 0.0 {
        return;
    }

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= radius * radius {
                stencil[y * size + x] = true;
            }
        }
    }
}

/// Samples the shard silhouette: a base circle of radius 180-220 walked in
/// twelve steps, each vertex jittered in angle and pulled inward by up to
/// 80px. The unjittered start vertex closes the loop.
fn mask_vertices(rng: &mut impl Rng) -> Vec<(f32, f32)> {
    let center = TEXTURE_SIZE as f32 * 0.5;
    let base_radius = 180.0 + rng.gen::<f32>() * 40.0;

    let mut vertices = Vec::with_capacity(MASK_STEPS + 1);
    vertices.push((center + base_radius, center));
    for step in 0..MASK_STEPS {
        let angle = step as f32 * (std::f32::consts::PI / 6.0)
            + rng.gen_range(-MASK_ANGLE_JITTER..MASK_ANGLE_JITTER);
        let radius = base_radius - rng.gen::<f32>() * MASK_RADIUS_JITTER;
        vertices.push((center + angle.cos() * radius, center + angle.sin() * radius));
    }
    vertices
}

/// Even-odd scanline fill against pixel centers.
fn rasterize_mask(vertices: &[(f32, f32)], size: u32) -> Vec<bool> {
    let size = size as usize;
    let mut coverage = vec![false; size * size];
    let mut crossings = Vec::new();

    for y in 0..size {
        let scan_y = y as f32 + 0.5;
        crossings.clear();
        for i in 0..vertices.len() {
            let a = vertices[i];
            let b = vertices[(i + 1) % vertices.len()];
            if (a.1 <= scan_y) != (b.1 <= scan_y) {
                crossings.push(a.0 + (scan_y - a.1) / (b.1 - a.1) * (b.0 - a.0));
            }
        }
        crossings.sort_by(|lhs, rhs| lhs.total_cmp(rhs));

        // A pixel is covered when its center x + 0.5 falls inside the span.
        for span in crossings.chunks_exact(2) {
            let from = (span[0] - 0.5).ceil().max(0.0) as usize;
            let to = ((span[1] - 0.5).ceil().max(0.0) as usize).min(size);
            for x in from..to {
                coverage[y * size + x] = true;
            }
        }
    }
    coverage
}

fn apply_mask(image: &mut RgbaImage, coverage: &[bool]) {
    let size = TEXTURE_SIZE as usize;
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if !coverage[y as usize * size + x as usize] {
            pixel[3] = 0;
        }
    }
}

fn lerp_color(from: [f32; 4], to: [f32; 4], t: f32) -> [f32; 4] {
    std::array::from_fn(|i| from[i] + (to[i] - from[i]) * t)
}

fn quantize(color: [f32; 4]) -> Rgba<u8> {
    Rgba(std::array::from_fn(|i| {
        (color[i].clamp(0.0, 1.0) * 255.0).round() as u8
    }))
}

/// Source-over blend of a straight-alpha color onto an 8-bit pixel.
fn blend_over(pixel: &mut Rgba<u8>, src: [f32; 4]) {
    let src_a = src[3];
    if src_a <= 0.0 {
        return;
    }
    let dst_a = pixel[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    for channel in 0..3 {
        let dst_c = pixel[channel] as f32 / 255.0;
        let out_c = (src[channel] * src_a + dst_c * dst_a * (1.0 - src_a)) / out_a;
        pixel[channel] = (out_c.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    pixel[3] = (out_a.clamp(0.0, 1.0) * 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn masked_texture(seed: u64) -> (RgbaImage, Vec<bool>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut image = RgbaImage::new(TEXTURE_SIZE, TEXTURE_SIZE);
        paint_gradient(&mut rng, &mut image);
        paint_streaks(&mut rng, &mut image);
        let mask = rasterize_mask(&mask_vertices(&mut rng), TEXTURE_SIZE);
        apply_mask(&mut image, &mask);
        (image, mask)
    }

    #[test]
    fn raster_has_fixed_dimensions() {
        let mut rng = StdRng::seed_from_u64(7);
        let image = synthesize(&mut rng);
        assert_eq!(image.dimensions(), (TEXTURE_SIZE, TEXTURE_SIZE));
    }

    #[test]
    fn same_seed_yields_identical_rasters() {
        let mut first = StdRng::seed_from_u64(99);
        let mut second = StdRng::seed_from_u64(99);
        assert_eq!(
            synthesize(&mut first).into_raw(),
            synthesize(&mut second).into_raw()
        );
    }

    #[test]
    fn alpha_is_zero_outside_mask_and_banded_inside() {
        for seed in [0u64, 1, 42, 1234] {
            let (image, mask) = masked_texture(seed);
            let size = TEXTURE_SIZE as usize;
            let mut inside = 0usize;
            for (x, y, pixel) in image.enumerate_pixels() {
                if mask[y as usize * size + x as usize] {
                    inside += 1;
                    assert!(pixel[3] > 0, "seed {seed}: masked-in pixel lost its alpha");
                    assert!(pixel[3] <= 200, "seed {seed}: alpha outside gradient band");
                } else {
                    assert_eq!(pixel[3], 0, "seed {seed}: alpha leaked outside the mask");
                }
            }
            assert!(inside > 0, "seed {seed}: mask covered nothing");
        }
    }

    #[test]
    fn mask_stays_within_outer_radius() {
        // Vertices cannot exceed the 220px base radius, so everything
        // beyond it from the texture center must be fully transparent.
        let (image, _) = masked_texture(5);
        let center = TEXTURE_SIZE as f32 * 0.5;
        for (x, y, pixel) in image.enumerate_pixels() {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            if (dx * dx + dy * dy).sqrt() > 221.0 {
                assert_eq!(pixel[3], 0);
            }
        }
    }

    #[test]
    fn mask_polygon_has_thirteen_vertices() {
        let mut rng = StdRng::seed_from_u64(3);
        let vertices = mask_vertices(&mut rng);
        assert_eq!(vertices.len(), MASK_STEPS + 1);
        let center = TEXTURE_SIZE as f32 * 0.5;
        for (x, y) in vertices {
            let distance = ((x - center).powi(2) + (y - center).powi(2)).sqrt();
            assert!(distance <= 220.0 + 1e-3);
            assert!(distance >= 100.0 - 1e-3);
        }
    }

    #[test]
    fn streaks_only_brighten() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut plain = RgbaImage::new(TEXTURE_SIZE, TEXTURE_SIZE);
        paint_gradient(&mut rng, &mut plain);
        let mut streaked = plain.clone();
        paint_streaks(&mut rng, &mut streaked);
        for (before, after) in plain.pixels().zip(streaked.pixels()) {
            assert!(after[3] >= before[3]);
        }
    }
}
