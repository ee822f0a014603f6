//! Error types shared by every part of the solver.

use std::path::PathBuf;

use crate::problem::NodeId;

/// Failures surfaced by the solver.
///
/// Capacity violations are not errors; they are penalized in the fitness.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The problem definition is missing data or is inconsistent.
    #[error("malformed instance: {0}")]
    MalformedInstance(String),

    /// A problem or solution file could not be opened.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A node id was looked up that the instance does not contain.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// An operation was invoked before the program reached the required state.
    #[error("not initialized: {0}")]
    NotInitialized(&'static str),

    /// A configuration value is outside its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
