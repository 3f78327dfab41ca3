//! ASCII PLY reader for crystal point/edge files.
//!
//! Only the layout the crystal exporter writes is understood: vertices as
//! `x y z r g b` with 8-bit colours, then edges as `v1 v2`.

use crate::error::LoadError;
use crate::geometry::GeometryBuffers;
use glam::Vec3;

const END_HEADER: &[u8] = b"end_header";

struct Header {
    vertices: usize,
    edges: usize,
}

impl Header {
    /// Number of body tokens the declared elements need.
    fn token_count(&self) -> Option<usize> {
        self.vertices
            .checked_mul(6)?
            .checked_add(self.edges.checked_mul(2)?)
    }
}

// Shortest possible vertex line, `0 0 0 0 0 0`, without its newline.
const MIN_VERTEX_BYTES: usize = 11;
// Shortest possible edge line, `0 0`.
const MIN_EDGE_BYTES: usize = 3;

fn parse_header(text: &str) -> Result<Header, LoadError> {
    let mut lines = text.lines().map(str::trim);
    if lines.next() != Some("ply") {
        return Err(LoadError::NotPly);
    }
    let mut header = Header { vertices: 0, edges: 0 };
    for line in lines {
        let mut words = line.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some("format"), Some(kind), _) if kind != "ascii" => {
                return Err(LoadError::UnsupportedFormat(kind.to_string()));
            }
            (Some("element"), Some("vertex"), Some(n)) => {
                header.vertices = n.parse().unwrap_or(0);
            }
            (Some("element"), Some("edge"), Some(n)) => {
                header.edges = n.parse().unwrap_or(0);
            }
            _ => {}
        }
    }
    Ok(header)
}

fn find_body(bytes: &[u8]) -> Result<usize, LoadError> {
    let at = bytes
        .windows(END_HEADER.len())
        .position(|w| w == END_HEADER)
        .ok_or(LoadError::MissingHeader)?;
    let mut end = at + END_HEADER.len();
    if bytes.get(end) == Some(&b'\r') {
        end += 1;
    }
    if bytes.get(end) == Some(&b'\n') {
        end += 1;
    }
    Ok(end)
}

struct Tokens<'a> {
    inner: std::str::SplitAsciiWhitespace<'a>,
    index: usize,
    expected: usize,
}

impl<'a> Tokens<'a> {
    fn next_str(&mut self) -> Result<&'a str, LoadError> {
        let tok = self.inner.next().ok_or(LoadError::Truncated {
            expected: self.expected,
            found: self.index,
        })?;
        self.index += 1;
        Ok(tok)
    }

    fn next_f32(&mut self, field: &'static str) -> Result<f32, LoadError> {
        let tok = self.next_str()?;
        tok.parse::<f32>().map_err(|_| LoadError::InvalidNumber {
            field,
            value: tok.to_string(),
            index: self.index - 1,
        })
    }

    fn next_u32(&mut self, field: &'static str) -> Result<u32, LoadError> {
        let tok = self.next_str()?;
        tok.parse::<u32>().map_err(|_| LoadError::InvalidNumber {
            field,
            value: tok.to_string(),
            index: self.index - 1,
        })
    }
}

/// Parse an ASCII PLY buffer into centred geometry.
pub fn parse_ply(bytes: &[u8]) -> Result<GeometryBuffers, LoadError> {
    let body_start = find_body(bytes)?;
    let header_text =
        std::str::from_utf8(&bytes[..body_start]).map_err(|_| LoadError::InvalidHeaderEncoding)?;
    let header = parse_header(header_text)?;

    let expected = header.token_count().ok_or(LoadError::TooManyElements {
        vertices: header.vertices,
        edges: header.edges,
    })?;

    let body = String::from_utf8_lossy(&bytes[body_start..]);
    let mut tokens = Tokens {
        inner: body.split_ascii_whitespace(),
        index: 0,
        expected,
    };

    // Header counts are untrusted; never reserve more than the body can hold.
    let vertex_hint = header.vertices.min(body.len() / MIN_VERTEX_BYTES);
    let mut positions = Vec::with_capacity(vertex_hint);
    let mut colors = Vec::with_capacity(vertex_hint);
    for _ in 0..header.vertices {
        let x = tokens.next_f32("x")?;
        let y = tokens.next_f32("y")?;
        let z = tokens.next_f32("z")?;
        let r = tokens.next_f32("red")?;
        let g = tokens.next_f32("green")?;
        let b = tokens.next_f32("blue")?;
        positions.push(Vec3::new(x, y, z));
        colors.push(Vec3::new(r, g, b) / 255.0);
    }

    let mut edges = Vec::with_capacity(header.edges.min(body.len() / MIN_EDGE_BYTES));
    for edge in 0..header.edges {
        let a = tokens.next_u32("vertex1")?;
        let b = tokens.next_u32("vertex2")?;
        for vertex in [a, b] {
            if vertex as usize >= positions.len() {
                return Err(LoadError::EdgeOutOfRange {
                    edge,
                    vertex,
                    count: positions.len(),
                });
            }
        }
        edges.push([a, b]);
    }

    log::debug!(
        "[ply] parsed {} vertices and {} edges",
        positions.len(),
        edges.len()
    );
    Ok(GeometryBuffers::new(positions, colors, edges).centered())
}
