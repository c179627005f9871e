//! GPU resources: device bring-up, pipelines, uniforms, shard pass.

mod shards;
mod state;
mod uniforms;

pub(crate) use state::GpuState;
