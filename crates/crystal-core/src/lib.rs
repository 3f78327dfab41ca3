pub mod camera;
pub mod constants;
pub mod deform;
pub mod envelope;
pub mod error;
pub mod extractor;
pub mod geometry;
pub mod loader;
pub mod motion;
pub mod noise;
pub mod packing;
pub mod palette;
pub mod perf;
pub mod playback;
pub mod ply;
pub mod spine;
pub mod synth;
pub mod uniforms;
pub mod viewer;

pub static CRYSTAL_WGSL: &str = include_str!("../shaders/crystal.wgsl");

pub use camera::*;
pub use constants::*;
pub use deform::*;
pub use envelope::*;
pub use error::*;
pub use extractor::*;
pub use geometry::*;
pub use loader::*;
pub use motion::*;
pub use noise::*;
pub use packing::*;
pub use palette::*;
pub use perf::*;
pub use playback::*;
pub use ply::*;
pub use spine::*;
pub use synth::*;
pub use uniforms::*;
pub use viewer::*;
