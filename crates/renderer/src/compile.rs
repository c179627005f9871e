//! Embedded shaders and their compilation through naga's GLSL front-end.
//!
//! Both pipelines share the scene uniform block at set 0 binding 0; its
//! layout must match `SceneUniforms`, and the shard block must match
//! `ShardUniforms` in `gpu::uniforms`. Numeric constants in the background
//! program (noise octaves, ripple, rim, vignette) are empirically tuned;
//! keep them verbatim.

use std::borrow::Cow;

use anyhow::Result;
use wgpu::naga::ShaderStage;

fn compile(
    device: &wgpu::Device,
    label: &str,
    source: &'static str,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule> {
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage,
            defines: &[],
        },
    }))
}

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn fullscreen_vertex(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    compile(
        device,
        "fullscreen triangle vertex",
        FULLSCREEN_VERTEX_GLSL,
        ShaderStage::Vertex,
    )
}

/// Compiles the liquid background fragment program.
pub(crate) fn background_fragment(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    compile(
        device,
        "background fragment",
        BACKGROUND_FRAGMENT_GLSL,
        ShaderStage::Fragment,
    )
}

/// Compiles the shard quad vertex shader.
pub(crate) fn shard_vertex(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    compile(device, "shard vertex", SHARD_VERTEX_GLSL, ShaderStage::Vertex)
}

/// Compiles the shard quad fragment shader.
pub(crate) fn shard_fragment(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    compile(
        device,
        "shard fragment",
        SHARD_FRAGMENT_GLSL,
        ShaderStage::Fragment,
    )
}

/// Minimal full-screen triangle vertex shader.
const FULLSCREEN_VERTEX_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

/// Liquid distortion field: three octaves of value noise displaced by a
/// pointer-centered ripple, an iridescent color wave, a rim highlight around
/// the displaced center, and a radial vignette.
///
/// Coordinates are top-left origin (wgpu's `gl_FragCoord` convention), which
/// matches the pointer uniform's pixel space.
const BACKGROUND_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform SceneParams {
    vec2 resolution;
    float time;
    float _pad0;
    vec2 pointer;
    vec2 _pad1;
} scene;

float hash(vec2 p) {
    return fract(sin(dot(p, vec2(127.1, 311.7))) * 43758.5453123);
}

// Bilinear lattice noise with smoothstep easing 3f^2 - 2f^3.
float valueNoise(vec2 p) {
    vec2 i = floor(p);
    vec2 f = fract(p);
    float a = hash(i);
    float b = hash(i + vec2(1.0, 0.0));
    float c = hash(i + vec2(0.0, 1.0));
    float d = hash(i + vec2(1.0, 1.0));
    vec2 u = f * f * (3.0 - 2.0 * f);
    return mix(a, b, u.x) + (c - a) * u.y * (1.0 - u.x) + (d - b) * u.x * u.y;
}

void main() {
    vec2 uv = gl_FragCoord.xy / scene.resolution;
    vec2 p = uv * vec2(scene.resolution.x / scene.resolution.y, 1.0);
    float t = scene.time * 0.35;

    // Pointer mapped to [-1, 1] with inverted Y.
    vec2 m = (scene.pointer / scene.resolution) * 2.0 - 1.0;
    m.y *= -1.0;

    float n = 0.0;
    n += 0.5000 * valueNoise(p * 1.0 + t);
    n += 0.2500 * valueNoise(p * 2.3 + t * 1.2);
    n += 0.1250 * valueNoise(p * 4.6 + t * 2.0);

    // Ripple centered on the pointer; the +0.2 floor keeps it finite at
    // zero distance.
    float d = distance(uv, scene.pointer / scene.resolution);
    float ripple = 0.02 * sin(d * 40.0 - t * 6.0) / (d * 6.0 + 0.2);

    float strength = n * 0.15 + ripple;
    vec2 displaced = uv + vec2(strength * (m.x * 0.5 + 0.2), strength * (m.y * 0.5));

    vec3 col = vec3(0.02, 0.03, 0.06);
    col += 0.6 * vec3(
        0.2 + 0.6 * valueNoise(displaced * 3.0 + t),
        0.5 + 0.4 * valueNoise(displaced * 4.0 - t * 1.2),
        0.6 + 0.4 * valueNoise(displaced * 2.0 + t * 0.5));

    float rim = smoothstep(0.4, 0.0, length(displaced - 0.5)) * 0.7;
    col += vec3(0.9, 0.95, 1.0) * rim * 0.18;

    float v = smoothstep(0.0, 0.8, length(uv - 0.5));
    col *= 1.0 - v * 0.35;

    outColor = vec4(col, 1.0);
}
";

/// Shard quad vertex shader: rotates a unit quad by the shard's frame
/// rotation, scales to its rendered size, and maps pixel space to NDC
/// through the centered orthographic bounds (1 unit = 1 px).
const SHARD_VERTEX_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

layout(std140, set = 0, binding = 0) uniform SceneParams {
    vec2 resolution;
    float time;
    float _pad0;
    vec2 pointer;
    vec2 _pad1;
} scene;

layout(std140, set = 1, binding = 0) uniform ShardParams {
    vec2 center;
    vec2 size;
    float rotation;
    float opacity;
    vec2 _pad;
} shard;

const vec2 corners[4] = vec2[4](
    vec2(-0.5, -0.5),
    vec2(0.5, -0.5),
    vec2(-0.5, 0.5),
    vec2(0.5, 0.5)
);

void main() {
    vec2 corner = corners[uint(gl_VertexIndex)];
    v_uv = corner + vec2(0.5, 0.5);

    float c = cos(shard.rotation);
    float s = sin(shard.rotation);
    vec2 local = corner * shard.size;
    vec2 rotated = vec2(local.x * c - local.y * s, local.x * s + local.y * c);

    vec2 pixel = shard.center + rotated;
    vec2 half_extent = scene.resolution * 0.5;
    vec2 ndc = (pixel - half_extent) / half_extent;
    gl_Position = vec4(ndc.x, -ndc.y, 0.0, 1.0);
}
";

/// Shard quad fragment shader: samples the synthesized texture and scales
/// its alpha by the frame-computed opacity pulse.
const SHARD_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 1, binding = 0) uniform ShardParams {
    vec2 center;
    vec2 size;
    float rotation;
    float opacity;
    vec2 _pad;
} shard;

layout(set = 2, binding = 0) uniform texture2D shard_texture;
layout(set = 2, binding = 1) uniform sampler shard_sampler;

void main() {
    vec4 tint = texture(sampler2D(shard_texture, shard_sampler), v_uv);
    outColor = vec4(tint.rgb, tint.a * shard.opacity);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    /// CPU mirror of the ripple term in the background program.
    fn ripple(dist: f32, t: f32) -> f32 {
        0.02 * (dist * 40.0 - t * 6.0).sin() / (dist * 6.0 + 0.2)
    }

    #[test]
    fn ripple_vanishes_at_the_pointer_at_time_zero() {
        // dist = 0 at the pointer, so the numerator is sin(0) and the +0.2
        // floor keeps the denominator finite.
        assert_eq!(ripple(0.0, 0.0), 0.0);
    }

    #[test]
    fn ripple_is_finite_everywhere() {
        for step in 0..100 {
            let dist = step as f32 * 0.015;
            assert!(ripple(dist, 3.7).is_finite());
        }
    }

    #[test]
    fn shader_sources_share_the_scene_uniform_block() {
        for source in [BACKGROUND_FRAGMENT_GLSL, SHARD_VERTEX_GLSL] {
            assert!(source.contains("layout(std140, set = 0, binding = 0) uniform SceneParams"));
            assert!(source.contains("vec2 resolution;"));
            assert!(source.contains("float time;"));
            assert!(source.contains("vec2 pointer;"));
        }
    }

    #[test]
    fn background_program_keeps_its_tuned_constants() {
        let source = BACKGROUND_FRAGMENT_GLSL;
        assert!(source.contains("scene.time * 0.35"));
        assert!(source.contains("0.5000 * valueNoise(p * 1.0 + t)"));
        assert!(source.contains("0.2500 * valueNoise(p * 2.3 + t * 1.2)"));
        assert!(source.contains("0.1250 * valueNoise(p * 4.6 + t * 2.0)"));
        assert!(source.contains("0.02 * sin(d * 40.0 - t * 6.0) / (d * 6.0 + 0.2)"));
        assert!(source.contains("vec3(0.02, 0.03, 0.06)"));
        assert!(source.contains("smoothstep(0.4, 0.0, length(displaced - 0.5)) * 0.7"));
        assert!(source.contains("smoothstep(0.0, 0.8, length(uv - 0.5))"));
        assert!(source.contains("1.0 - v * 0.35"));
    }
}
