use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CmtError {
    #[error("Parameter validation failed: {constraint}")]
    InvalidParameters { constraint: String },
    #[error("Cannot build a coded Merkle tree over empty data")]
    EmptyData,
    #[error("Level {level} out of range for a tree with {levels} levels")]
    LevelOutOfRange { level: usize, levels: usize },
    #[error("Symbol index {index} out of range for level {level} with {len} symbols")]
    IndexOutOfRange { level: usize, index: usize, len: usize },
    #[error("Codec operation failed: {operation} - {details}")]
    Codec { operation: String, details: String },
    #[error("Serialization error: {details}")]
    Serialization { details: String },
}

impl CmtError {
    pub fn invalid_parameters(constraint: &str) -> Self {
        CmtError::InvalidParameters {
            constraint: constraint.to_string(),
        }
    }

    pub fn codec(operation: &str, details: &str) -> Self {
        CmtError::Codec {
            operation: operation.to_string(),
            details: details.to_string(),
        }
    }

    pub fn serialization(details: &str) -> Self {
        CmtError::Serialization {
            details: details.to_string(),
        }
    }

    /// Range errors (`LevelOutOfRange`, `IndexOutOfRange`) are the caller's fault.
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            CmtError::LevelOutOfRange { .. } | CmtError::IndexOutOfRange { .. }
        )
    }
}

/// Result type alias for convenience
pub type CmtResult<T> = Result<T, CmtError>;

impl From<bincode::Error> for CmtError {
    fn from(err: bincode::Error) -> Self {
        CmtError::serialization(&err.to_string())
    }
}

impl From<reed_solomon_erasure::Error> for CmtError {
    fn from(err: reed_solomon_erasure::Error) -> Self {
        CmtError::codec("reed-solomon encode", &err.to_string())
    }
}
