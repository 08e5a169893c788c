//! Error types for the rig data model.

use thiserror::Error;

/// Result type for data model operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Common trait for errors raised anywhere in the rig toolchain.
///
/// Each crate's error type implements this trait so that hosts and the CLI
/// can report a stable code alongside the message.
///
/// # Example
///
/// ```ignore
/// use carrig_spec::error::CodedError;
///
/// fn handle_error<E: CodedError>(err: E) {
///     eprintln!("[{}] {}", err.code(), err.message());
/// }
/// ```
pub trait CodedError: std::error::Error {
    /// Stable error code such as "SPEC_001" or "BAKE_004".
    fn code(&self) -> &'static str;

    /// Human-readable message, usually the `Display` output.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Error category ("model", "rig", "bake").
    fn category(&self) -> &'static str;
}

/// Errors raised while building or validating rig data.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A node referenced by name does not exist.
    #[error("Node not found: {name}")]
    NodeNotFound { name: String },

    /// A node with the same name was already inserted.
    #[error("Duplicate node name: {name}")]
    DuplicateNode { name: String },

    /// A node names a parent that has not been inserted before it.
    #[error("Parent '{parent}' of node '{node}' must exist before the node is created")]
    ParentNotFound { node: String, parent: String },

    /// A name does not follow the corner naming grammar.
    #[error("Invalid node name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// The declared drivers form a dependency cycle.
    #[error("Driver cycle detected: {}", .path.join(" -> "))]
    DriverCycle { path: Vec<String> },

    /// A driver writes the same value it reads.
    #[error("Driver on '{target}' reads its own output")]
    SelfDrivenTarget { target: String },

    /// A custom property definition is inconsistent.
    #[error("Invalid custom property '{name}': {message}")]
    InvalidProperty { name: String, message: String },

    /// A frame range is empty or inverted.
    #[error("Invalid frame range: start {start} must be lower than end {end}")]
    InvalidFrameRange { start: i32, end: i32 },

    /// A scene object referenced by name does not exist.
    #[error("Scene object not found: {name}")]
    ObjectNotFound { name: String },

    /// A constraint, driver or collection names a node that does not exist.
    #[error("'{owner}' references missing node '{target}'")]
    DanglingReference { owner: String, target: String },

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpecError {
    /// Creates a new node not found error.
    pub fn node_not_found(name: impl Into<String>) -> Self {
        Self::NodeNotFound { name: name.into() }
    }

    /// Creates a new object not found error.
    pub fn object_not_found(name: impl Into<String>) -> Self {
        Self::ObjectNotFound { name: name.into() }
    }

    /// Creates a new dangling reference error.
    pub fn dangling_reference(owner: impl Into<String>, target: impl Into<String>) -> Self {
        Self::DanglingReference {
            owner: owner.into(),
            target: target.into(),
        }
    }

    /// Creates a new invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new invalid property error.
    pub fn invalid_property(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidProperty {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl CodedError for SpecError {
    fn code(&self) -> &'static str {
        match self {
            SpecError::NodeNotFound { .. } => "SPEC_001",
            SpecError::DuplicateNode { .. } => "SPEC_002",
            SpecError::ParentNotFound { .. } => "SPEC_003",
            SpecError::InvalidName { .. } => "SPEC_004",
            SpecError::DriverCycle { .. } => "SPEC_005",
            SpecError::SelfDrivenTarget { .. } => "SPEC_006",
            SpecError::InvalidProperty { .. } => "SPEC_007",
            SpecError::InvalidFrameRange { .. } => "SPEC_008",
            SpecError::Json(_) => "SPEC_009",
            SpecError::ObjectNotFound { .. } => "SPEC_010",
            SpecError::DanglingReference { .. } => "SPEC_011",
        }
    }

    fn category(&self) -> &'static str {
        "model"
    }
}
