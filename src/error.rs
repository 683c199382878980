//! Error types
//!
//! Construction and configuration fail fast; a malformed scene hierarchy is
//! reported per walk and never retried.

use std::path::PathBuf;

use thiserror::Error;

use crate::sim::ObjectHandle;

/// Detector construction failures
#[derive(Debug, Error, PartialEq)]
pub enum DetectorError {
    #[error("laser length must be finite and > 0, got {0}")]
    InvalidLength(f32),
    #[error("alarm tick interval must be finite and at least 1ms, got {0}")]
    InvalidTickInterval(f32),
    #[error("detector has no alarm timer; a detector that cannot arm its alarm is misconfigured")]
    MissingTimer,
}

/// Failure to walk an object's ancestor chain
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("malformed hierarchy: ancestor walk from {start:?} exceeded {limit} links (cycle?)")]
    DepthExceeded { start: ObjectHandle, limit: usize },
}

/// Operator settings failures
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("target object {0:?} not found in scene")]
    UnknownTarget(String),
    #[error(transparent)]
    Detector(#[from] DetectorError),
}
