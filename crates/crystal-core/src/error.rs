use thiserror::Error;

/// Why a crystal or audio source could not be turned into geometry.
#[derive(Debug, Error, PartialEq)]
pub enum LoadError {
    #[error("PLY header is missing `end_header`")]
    MissingHeader,
    #[error("not a PLY file (missing `ply` magic)")]
    NotPly,
    #[error("unsupported PLY format `{0}`; only ascii is read")]
    UnsupportedFormat(String),
    #[error("PLY header is not valid UTF-8")]
    InvalidHeaderEncoding,
    #[error("PLY header declares {vertices} vertices and {edges} edges, more than can be addressed")]
    TooManyElements { vertices: usize, edges: usize },
    #[error("PLY body ended early: expected {expected} values, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("invalid {field} value `{value}` at token {index}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        index: usize,
    },
    #[error("edge {edge} references vertex {vertex} but only {count} vertices exist")]
    EdgeOutOfRange { edge: usize, vertex: u32, count: usize },
    #[error("decoded audio has no channels")]
    NoChannels,
    #[error("decoded audio has no samples")]
    EmptyAudio,
}
