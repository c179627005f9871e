//! CPU mirrors of the std140 uniform blocks.

use bytemuck::{Pod, Zeroable};

use glassfield::{Placement, Pointer, Viewport};

/// Scene-wide uniforms shared by the background and shard pipelines.
///
/// Single writer: the frame driver updates this once per frame and uploads
/// it before encoding. The layout must match the `SceneParams` block in the
/// embedded GLSL.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct SceneUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    _pad0: f32,
    pub pointer: [f32; 2],
    _pad1: [f32; 2],
}

unsafe impl Zeroable for SceneUniforms {}
unsafe impl Pod for SceneUniforms {}

impl SceneUniforms {
    /// Prepares a uniform block sized to the surface, with the pointer at
    /// its resting position in the viewport center.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resolution: [width as f32, height as f32],
            time: 0.0,
            _pad0: 0.0,
            pointer: [width as f32 * 0.5, height as f32 * 0.5],
            _pad1: [0.0; 2],
        }
    }

    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.resolution = [width, height];
    }

    pub fn set_pointer(&mut self, pointer: Pointer) {
        self.pointer = [pointer.x, pointer.y];
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.time = seconds;
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.resolution[0], self.resolution[1])
    }
}

/// Per-shard uniforms, overwritten from the motion field every frame.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct ShardUniforms {
    pub center: [f32; 2],
    pub size: [f32; 2],
    pub rotation: f32,
    pub opacity: f32,
    _pad: [f32; 2],
}

unsafe impl Zeroable for ShardUniforms {}
unsafe impl Pod for ShardUniforms {}

impl ShardUniforms {
    pub fn from_placement(placement: &Placement) -> Self {
        Self {
            center: [placement.x, placement.y],
            size: [placement.size, placement.size],
            rotation: placement.rotation,
            opacity: placement.opacity,
            _pad: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};

    /// Sanity-checks that the CPU mirrors match the layout baked into the
    /// GLSL blocks.
    #[test]
    fn scene_uniforms_follow_std140_layout() {
        let uniforms = SceneUniforms::new(1920, 1080);
        let base = &uniforms as *const _ as usize;

        assert_eq!(align_of::<SceneUniforms>(), 16);
        assert_eq!(size_of::<SceneUniforms>(), 32);
        assert_eq!((&uniforms.resolution as *const _ as usize) - base, 0);
        assert_eq!((&uniforms.time as *const _ as usize) - base, 8);
        assert_eq!((&uniforms.pointer as *const _ as usize) - base, 16);
    }

    #[test]
    fn shard_uniforms_follow_std140_layout() {
        let uniforms = ShardUniforms::from_placement(&Placement {
            x: 1.0,
            y: 2.0,
            rotation: 0.3,
            opacity: 0.5,
            size: 256.0,
        });
        let base = &uniforms as *const _ as usize;

        assert_eq!(align_of::<ShardUniforms>(), 16);
        assert_eq!(size_of::<ShardUniforms>(), 32);
        assert_eq!((&uniforms.center as *const _ as usize) - base, 0);
        assert_eq!((&uniforms.size as *const _ as usize) - base, 8);
        assert_eq!((&uniforms.rotation as *const _ as usize) - base, 16);
        assert_eq!((&uniforms.opacity as *const _ as usize) - base, 20);
    }

    #[test]
    fn pointer_defaults_to_the_viewport_center() {
        let uniforms = SceneUniforms::new(800, 600);
        assert_eq!(uniforms.pointer, [400.0, 300.0]);
    }

    #[test]
    fn resize_updates_resolution_and_viewport_together() {
        let mut uniforms = SceneUniforms::new(800, 600);
        uniforms.set_resolution(1024.0, 768.0);
        assert_eq!(uniforms.resolution, [1024.0, 768.0]);
        assert_eq!(uniforms.viewport(), Viewport::new(1024.0, 768.0));
    }
}
