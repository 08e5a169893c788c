//! Error types for rig generation.

use carrig_spec::{CodedError, SpecError};
use thiserror::Error;

/// Result type for rig generation operations.
pub type RigResult<T> = Result<T, RigError>;

/// Errors that can occur while generating or maintaining a rig.
#[derive(Debug, Error)]
pub enum RigError {
    /// The deformation rig has no body anchor.
    #[error("No node named DEF_Body. This is not a valid deformation rig")]
    MissingBody,

    /// The rig is not a deformation rig produced by this toolchain.
    #[error("Rig '{rig}' is not a vehicle deformation rig: {reason}")]
    NotDeformationRig { rig: String, reason: String },

    /// Options are out of range.
    #[error("Invalid option '{name}': {message}")]
    InvalidOption { name: String, message: String },

    /// Error from the rig data model.
    #[error(transparent)]
    Spec(#[from] SpecError),
}

impl RigError {
    /// Creates a new not-a-deformation-rig error.
    pub fn not_deformation_rig(rig: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotDeformationRig {
            rig: rig.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new invalid option error.
    pub fn invalid_option(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl CodedError for RigError {
    fn code(&self) -> &'static str {
        match self {
            RigError::MissingBody => "RIG_001",
            RigError::NotDeformationRig { .. } => "RIG_002",
            RigError::InvalidOption { .. } => "RIG_003",
            RigError::Spec(inner) => inner.code(),
        }
    }

    fn category(&self) -> &'static str {
        match self {
            RigError::Spec(_) => "model",
            _ => "rig",
        }
    }
}
