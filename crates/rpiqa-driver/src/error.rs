//! Error types for receiver driver operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for driver operations
pub type Result<T> = std::result::Result<T, RpiqaError>;

/// Errors that can occur while mapping, configuring or draining the receiver
#[derive(Debug, Error)]
pub enum RpiqaError {
    /// Physical memory device could not be opened
    #[error("Cannot open memory device {path}: {source}")]
    MemoryDevice {
        /// Device path that was attempted
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A register window could not be mapped
    #[error("Failed to map {window} window at {phys:#x}: {reason}")]
    MapFailed {
        /// Window name
        window: String,
        /// Physical base address
        phys: u64,
        /// Reason for failure
        reason: String,
    },

    /// A mapped window does not cover the registers the protocol touches
    #[error("{window} window at {phys:#x} is {size:#x} bytes, needs {required:#x}")]
    WindowTooSmall {
        /// Window name
        window: String,
        /// Physical base address
        phys: u64,
        /// Mapped length in bytes
        size: usize,
        /// Bytes the protocol accesses
        required: usize,
    },

    /// Channel selector outside {1, 2}
    #[error(transparent)]
    InvalidChannel(#[from] rpiqa_chip::InvalidChannel),

    /// Output destination could not be created or written
    #[error("Cannot write output {path}: {source}")]
    Output {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Capture file could not be read
    #[error("Cannot read capture {path}: {source}")]
    CaptureRead {
        /// Capture path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Argument outside the accepted domain
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// Reason for rejection
        reason: String,
    },

    /// Capture file does not hold whole I/Q samples
    #[error("Malformed capture: {reason}")]
    MalformedCapture {
        /// Reason for rejection
        reason: String,
    },

    /// I/O error while streaming samples
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

impl RpiqaError {
    /// Create a memory device error
    pub fn memory_device(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::MemoryDevice {
            path: path.into(),
            source,
        }
    }

    /// Create a map failed error
    pub fn map_failed(window: impl ToString, phys: u64, reason: impl Into<String>) -> Self {
        Self::MapFailed {
            window: window.to_string(),
            phys,
            reason: reason.into(),
        }
    }

    /// Create a window too small error
    pub fn window_too_small(window: impl ToString, phys: u64, size: usize, required: usize) -> Self {
        Self::WindowTooSmall {
            window: window.to_string(),
            phys,
            size,
            required,
        }
    }

    /// Create a capture read error
    pub fn capture_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CaptureRead {
            path: path.into(),
            source,
        }
    }

    /// Create an output error
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create a malformed capture error
    pub fn malformed_capture(reason: impl Into<String>) -> Self {
        Self::MalformedCapture {
            reason: reason.into(),
        }
    }
}
