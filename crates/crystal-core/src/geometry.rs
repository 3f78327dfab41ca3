//! Renderable geometry and the two ways of producing it.

use glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[inline]
    pub fn max_dim(&self) -> f32 {
        self.size().max_element()
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }
}

/// Positions, per-vertex colours in `[0, 1]` and edge index pairs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryBuffers {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub edges: Vec<[u32; 2]>,
    pub bounds: Bounds,
}

impl GeometryBuffers {
    pub fn new(positions: Vec<Vec3>, colors: Vec<Vec3>, edges: Vec<[u32; 2]>) -> Self {
        let bounds = Bounds::from_points(&positions).unwrap_or_default();
        Self {
            positions,
            colors,
            edges,
            bounds,
        }
    }

    /// Translate so the bounding-box centre sits at the origin.
    pub fn centered(mut self) -> Self {
        let c = self.bounds.center();
        for p in &mut self.positions {
            *p -= c;
        }
        self.bounds = Bounds {
            min: self.bounds.min - c,
            max: self.bounds.max - c,
        };
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeometryStats {
    pub nodes: usize,
    pub links: usize,
    pub layers: u32,
}

/// What is on screen, and where it came from.
#[derive(Clone, Debug)]
pub enum SourceGeometry {
    File(GeometryBuffers),
    Audio {
        buffers: GeometryBuffers,
        duration_sec: f64,
    },
}

impl SourceGeometry {
    pub fn buffers(&self) -> &GeometryBuffers {
        match self {
            SourceGeometry::File(b) => b,
            SourceGeometry::Audio { buffers, .. } => buffers,
        }
    }

    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.buffers().bounds
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, SourceGeometry::Audio { .. })
    }

    pub fn stats(&self) -> GeometryStats {
        let b = self.buffers();
        GeometryStats {
            nodes: b.positions.len(),
            links: b.edges.len(),
            layers: match self {
                SourceGeometry::File(_) => 10,
                SourceGeometry::Audio { .. } => 2,
            },
        }
    }
}
