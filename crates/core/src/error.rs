use serlio_scene::HostError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("host status error: {0}")]
    Host(#[from] HostError),
    #[error("vertex buffer length {0} is not a multiple of 3")]
    VertexStride(usize),
    #[error("face counts sum to {expected} corners but {actual} vertex indices were given")]
    FaceCorners { expected: usize, actual: usize },
    #[error("vertex index {index} out of range ({vertex_count} vertices)")]
    VertexIndex { index: u32, vertex_count: usize },
    #[error("{actual} normal indices given for {expected} face corners")]
    NormalIndexCount { expected: usize, actual: usize },
    #[error("normal index {index} out of range ({normal_count} normals)")]
    NormalIndex { index: u32, normal_count: usize },
    #[error("uv channel {channel}: {message}")]
    UvChannel { channel: usize, message: String },
    #[error("invalid face ranges: {0}")]
    FaceRanges(String),
    #[error("{ranges} face ranges but {materials} material maps")]
    MaterialCount { ranges: usize, materials: usize },
}

/// Unwraps a host call, logging failures with their source location before
/// returning them from the enclosing function.
macro_rules! host_check {
    ($call:expr) => {
        match $call {
            Ok(value) => value,
            Err(err) => {
                tracing::error!("host status error at {}:{}: {}", file!(), line!(), err);
                return Err($crate::error::BuildError::from(err));
            }
        }
    };
}

pub(crate) use host_check;
