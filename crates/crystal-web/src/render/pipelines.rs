use super::helpers::make_pipeline;
use crystal_core::{LineVertex, NodeInstance};
use wgpu;

/// How a layer composites over what is already drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
}

impl BlendMode {
    /// `"additive"` selects additive; anything else is normal.
    pub fn parse(name: &str) -> Self {
        if name.eq_ignore_ascii_case("additive") {
            BlendMode::Additive
        } else {
            BlendMode::Normal
        }
    }

    fn state(self) -> wgpu::BlendState {
        match self {
            BlendMode::Normal => wgpu::BlendState::ALPHA_BLENDING,
            BlendMode::Additive => ADDITIVE_BLEND,
        }
    }
}

const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

// Inverts what is underneath in proportion to the (premultiplied) source.
const XOR_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::OneMinusDst,
        dst_factor: wgpu::BlendFactor::OneMinusSrc,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Unit quad as two triangles; `vs_node` scales it per instance.
pub const QUAD_CORNERS: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

const QUAD_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const NODE_ATTRS: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![1 => Float32x3, 2 => Float32x3];
const LINE_ATTRS: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32];

fn node_buffers() -> [wgpu::VertexBufferLayout<'static>; 2] {
    [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 2]>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &QUAD_ATTRS,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<NodeInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &NODE_ATTRS,
        },
    ]
}

fn line_buffers() -> [wgpu::VertexBufferLayout<'static>; 1] {
    [wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<LineVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &LINE_ATTRS,
    }]
}

pub struct Pipelines {
    node_normal: wgpu::RenderPipeline,
    node_additive: wgpu::RenderPipeline,
    line_normal: wgpu::RenderPipeline,
    line_additive: wgpu::RenderPipeline,
    pub xor: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
    ) -> Self {
        let node = |label: &str, mode: BlendMode| {
            make_pipeline(
                device,
                label,
                layout,
                shader,
                "vs_node",
                "fs_node",
                &node_buffers(),
                wgpu::PrimitiveTopology::TriangleList,
                format,
                mode.state(),
            )
        };
        let line = |label: &str, fs_entry: &str, blend: wgpu::BlendState| {
            make_pipeline(
                device,
                label,
                layout,
                shader,
                "vs_line",
                fs_entry,
                &line_buffers(),
                wgpu::PrimitiveTopology::LineList,
                format,
                blend,
            )
        };
        Self {
            node_normal: node("node_normal", BlendMode::Normal),
            node_additive: node("node_additive", BlendMode::Additive),
            line_normal: line("line_normal", "fs_line", BlendMode::Normal.state()),
            line_additive: line("line_additive", "fs_line", BlendMode::Additive.state()),
            xor: line("line_xor", "fs_xor", XOR_BLEND),
        }
    }

    pub fn node(&self, mode: BlendMode) -> &wgpu::RenderPipeline {
        match mode {
            BlendMode::Normal => &self.node_normal,
            BlendMode::Additive => &self.node_additive,
        }
    }

    pub fn line(&self, mode: BlendMode) -> &wgpu::RenderPipeline {
        match mode {
            BlendMode::Normal => &self.line_normal,
            BlendMode::Additive => &self.line_additive,
        }
    }
}
