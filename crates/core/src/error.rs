use thiserror::Error;

/// Top-level error type used across the entire stats pipeline.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("config error: {0}")]
    Config(String),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("index {index} out of range for ring buffer of length {length}")]
    IndexOutOfRange { index: isize, length: usize },

    #[error("invalid decay constant {0}: must be finite and non-negative")]
    InvalidDecayConstant(f64),

    #[error("invalid smoothing parameter: {0}")]
    InvalidSmoothing(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = StatsError> = std::result::Result<T, E>;
