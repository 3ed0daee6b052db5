pub mod sampler;
pub mod target;
