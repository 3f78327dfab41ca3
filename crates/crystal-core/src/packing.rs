//! GPU-facing layouts. Field order and padding mirror `Globals` and the vertex
//! inputs in `shaders/crystal.wgsl`.

use crate::constants::{PALETTE_LEN, PLAY_GLOW_RANGE, SPINE_POINTS};
use crate::deform::DeformConfig;
use crate::geometry::GeometryBuffers;
use crate::uniforms::{Param, UniformAnimator};
use glam::{Mat4, Vec3};
use rand::Rng;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CrystalUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub palette: [[f32; 4]; PALETTE_LEN],
    pub spine: [[f32; 4]; SPINE_POINTS],
    // x: time, y: audio level, z: play x, w: play glow range
    pub audio: [f32; 4],
    // x: line near, y: line far, z: node near, w: node far
    pub fade: [f32; 4],
    // x: thinning, y: line density, z: node density, w: xor density
    pub density: [f32; 4],
    // x: xor threshold, y: color influence, z: line opacity, w: node opacity
    pub look: [f32; 4],
    // x: invert influence, y: node saturation, z: pulse enabled, w: point size
    pub style: [f32; 4],
    // x: spine length, y: spine count, z: bounce radius, w: noise floor
    pub spine_info: [f32; 4],
    // x: soup frequency, y: soup speed, z: soup amplitude, w: bounce gain
    pub soup: [f32; 4],
}

/// Per-frame values not owned by the animator.
#[derive(Clone, Copy, Debug)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub proj: Mat4,
    pub time: f32,
    pub audio_level: f32,
    pub play_x: f32,
    pub point_size: f32,
    pub spine_length: f32,
    pub deform: DeformConfig,
}

#[inline]
fn pad(v: Vec3) -> [f32; 4] {
    [v.x, v.y, v.z, 0.0]
}

impl CrystalUniforms {
    pub fn pack(anim: &UniformAnimator, frame: &FrameUniforms) -> Self {
        let c = |p: Param| anim.current(p);
        let mut palette = [[0.0; 4]; PALETTE_LEN];
        for (dst, src) in palette.iter_mut().zip(anim.palette_current()) {
            *dst = pad(*src);
        }
        let mut spine = [[0.0; 4]; SPINE_POINTS];
        let chain = anim.spine();
        for (dst, src) in spine.iter_mut().zip(chain) {
            *dst = pad(*src);
        }
        Self {
            view: frame.view.to_cols_array_2d(),
            proj: frame.proj.to_cols_array_2d(),
            palette,
            spine,
            audio: [frame.time, frame.audio_level, frame.play_x, PLAY_GLOW_RANGE],
            fade: [
                c(Param::LineNear),
                c(Param::LineFar),
                c(Param::NodeNear),
                c(Param::NodeFar),
            ],
            density: [
                c(Param::Thinning),
                c(Param::LineDensity),
                c(Param::NodeDensity),
                c(Param::XorDensity),
            ],
            look: [
                c(Param::XorThreshold),
                c(Param::ColorInfluence),
                c(Param::LineOpacity),
                c(Param::NodeOpacity),
            ],
            style: [
                c(Param::InvertInfluence),
                c(Param::NodeSaturation),
                c(Param::PulseEnabled),
                frame.point_size,
            ],
            spine_info: [
                frame.spine_length,
                chain.len() as f32,
                frame.deform.bounce_radius,
                frame.deform.noise_floor,
            ],
            soup: [
                frame.deform.soup_frequency,
                frame.deform.soup_speed,
                frame.deform.soup_amplitude,
                frame.deform.bounce_gain,
            ],
        }
    }
}

/// One node sprite, drawn as an instanced quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeInstance {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// One end of an edge in a line list.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub seed: f32,
}

pub fn node_instances(geometry: &GeometryBuffers) -> Vec<NodeInstance> {
    geometry
        .positions
        .iter()
        .zip(&geometry.colors)
        .map(|(p, c)| NodeInstance {
            position: p.to_array(),
            color: c.to_array(),
        })
        .collect()
}

/// Expand edges into a line list; both ends of an edge share one random seed.
pub fn line_vertices<R: Rng>(geometry: &GeometryBuffers, rng: &mut R) -> Vec<LineVertex> {
    let mut out = Vec::with_capacity(geometry.edges.len() * 2);
    for &[a, b] in &geometry.edges {
        let (Some(pa), Some(pb)) = (
            geometry.positions.get(a as usize),
            geometry.positions.get(b as usize),
        ) else {
            continue;
        };
        let color = |i: u32| geometry.colors.get(i as usize).copied().unwrap_or(Vec3::ONE);
        let seed: f32 = rng.gen();
        out.push(LineVertex {
            position: pa.to_array(),
            color: color(a).to_array(),
            seed,
        });
        out.push(LineVertex {
            position: pb.to_array(),
            color: color(b).to_array(),
            seed,
        });
    }
    out
}
