//! Error types for motion baking.

use carrig_rig::RigError;
use carrig_spec::{CodedError, SpecError};
use thiserror::Error;

/// Result type for baking operations.
pub type BakeResult<T> = Result<T, BakeError>;

/// Errors that can occur while baking or setting up animation.
///
/// Bake commands never return these directly: they are turned into report
/// messages and a `Cancelled` status by the engine.
#[derive(Debug, Error)]
pub enum BakeError {
    /// The rig has no animation container yet.
    #[error("No animation found. Create an action before baking")]
    NoAnimation,

    /// None of the nodes a bake works on exist.
    #[error("No {what} found, nothing to bake")]
    NoTargets { what: String },

    /// Sampling produced nothing usable for a node.
    #[error("Baking produced no samples for '{node}'")]
    EmptySamples { node: String },

    /// The frame range is empty or inverted.
    #[error("Invalid frame range: start {start} must be lower than end {end}")]
    InvalidRange { start: i32, end: i32 },

    /// A host callback failed.
    #[error("Host error: {message}")]
    Host { message: String },

    /// A node required by the operation does not exist.
    #[error("Node not found: {name}")]
    MissingNode { name: String },

    /// A setting is out of range.
    #[error("Invalid setting '{name}': {message}")]
    InvalidSetting { name: String, message: String },

    /// Error from the rig data model.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// Error from rig maintenance.
    #[error(transparent)]
    Rig(#[from] RigError),
}

impl BakeError {
    /// Creates a new no-targets error.
    pub fn no_targets(what: impl Into<String>) -> Self {
        Self::NoTargets { what: what.into() }
    }

    /// Creates a new empty-samples error.
    pub fn empty_samples(node: impl Into<String>) -> Self {
        Self::EmptySamples { node: node.into() }
    }

    /// Creates a new host error.
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }

    /// Creates a new missing node error.
    pub fn missing_node(name: impl Into<String>) -> Self {
        Self::MissingNode { name: name.into() }
    }

    /// Creates a new invalid setting error.
    pub fn invalid_setting(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSetting {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl CodedError for BakeError {
    fn code(&self) -> &'static str {
        match self {
            BakeError::NoAnimation => "BAKE_001",
            BakeError::NoTargets { .. } => "BAKE_002",
            BakeError::EmptySamples { .. } => "BAKE_003",
            BakeError::InvalidRange { .. } => "BAKE_004",
            BakeError::Host { .. } => "BAKE_005",
            BakeError::MissingNode { .. } => "BAKE_006",
            BakeError::InvalidSetting { .. } => "BAKE_007",
            BakeError::Spec(inner) => inner.code(),
            BakeError::Rig(inner) => inner.code(),
        }
    }

    fn category(&self) -> &'static str {
        match self {
            BakeError::Spec(inner) => inner.category(),
            BakeError::Rig(inner) => inner.category(),
            _ => "bake",
        }
    }
}
