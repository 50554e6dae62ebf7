use std::io;
use thiserror::Error;

/// Custom error type for hwtop
#[derive(Error, Debug)]
pub enum HwtopError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GPU not available: {0}")]
    GpuNotAvailable(String),

    #[error("Metric collection failed: {0}")]
    MetricCollection(String),

    #[error("Failed to terminate PID {pid}: {reason}")]
    Terminate { pid: u32, reason: String },

    #[error("TUI error: {0}")]
    Tui(String),
}

/// Result type alias for hwtop
pub type Result<T> = std::result::Result<T, HwtopError>;

impl HwtopError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        HwtopError::Config(msg.into())
    }

    pub fn gpu_not_available<S: Into<String>>(msg: S) -> Self {
        HwtopError::GpuNotAvailable(msg.into())
    }

    pub fn metric_collection<S: Into<String>>(msg: S) -> Self {
        HwtopError::MetricCollection(msg.into())
    }

    pub fn terminate<S: Into<String>>(pid: u32, reason: S) -> Self {
        HwtopError::Terminate {
            pid,
            reason: reason.into(),
        }
    }

    pub fn tui<S: Into<String>>(msg: S) -> Self {
        HwtopError::Tui(msg.into())
    }
}
