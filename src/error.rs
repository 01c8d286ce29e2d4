use std::fmt;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Main error type for the training engine
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// A vector or matrix does not have the shape the topology requires
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Mini-batch size is zero or larger than the training set
    InvalidBatchSize {
        batch_size: usize,
        training_size: usize,
    },

    /// Worker count is zero or disagrees with the allocated worker slots
    InvalidWorkerCount {
        requested: usize,
        reason: String,
    },

    /// Training was requested without any training examples
    EmptyTrainingSet,

    /// Validation was requested without any validation examples
    EmptyValidationSet,

    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// The rayon worker pool could not be built
    WorkerPool(String),

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),

    /// Malformed training configuration
    ConfigError(String),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            NetworkError::InvalidBatchSize { batch_size, training_size } => {
                write!(
                    f,
                    "Invalid mini-batch size {}: must be between 1 and the training set size {}",
                    batch_size, training_size
                )
            }
            NetworkError::InvalidWorkerCount { requested, reason } => {
                write!(f, "Invalid worker count {}: {}", requested, reason)
            }
            NetworkError::EmptyTrainingSet => write!(f, "Training set is empty"),
            NetworkError::EmptyValidationSet => {
                write!(f, "Validation requested but the validation set is empty")
            }
            NetworkError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            NetworkError::WorkerPool(msg) => write!(f, "Worker pool error: {}", msg),
            NetworkError::IoError(msg) => write!(f, "IO error: {}", msg),
            NetworkError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            NetworkError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<std::io::Error> for NetworkError {
    fn from(err: std::io::Error) -> Self {
        NetworkError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for NetworkError {
    fn from(err: bincode::Error) -> Self {
        NetworkError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        NetworkError::ConfigError(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for NetworkError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        NetworkError::WorkerPool(err.to_string())
    }
}

// Helper functions for common error patterns
impl NetworkError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        NetworkError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        NetworkError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_worker_count<S: Into<String>>(requested: usize, reason: S) -> Self {
        NetworkError::InvalidWorkerCount {
            requested,
            reason: reason.into(),
        }
    }
}
