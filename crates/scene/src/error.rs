use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("unknown uv set '{0}'")]
    UnknownUvSet(String),
    #[error("uv set '{0}' already exists")]
    DuplicateUvSet(String),
    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    #[error("structure '{0}' is already registered")]
    StructureExists(String),
    #[error("handle of structure '{handle}' cannot be stored in a stream of '{stream}'")]
    StructureMismatch { handle: String, stream: String },
}
