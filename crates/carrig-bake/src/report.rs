//! Operation reports surfaced to hosts.
//!
//! Every bake, clear and path-follow command returns a [`BakeReport`]
//! instead of an error. Failures are recorded as messages and flip the
//! status to [`BakeStatus::Cancelled`].

use carrig_spec::CodedError;
use serde::{Deserialize, Serialize};

use crate::engine::BakeState;

/// Severity of a report message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportLevel {
    Info,
    Warning,
    Error,
}

/// One user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportMessage {
    pub level: ReportLevel,
    pub message: String,
    /// Error code when the message comes from an error (e.g., "BAKE_001").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ReportMessage {
    /// Creates a new message without a code.
    pub fn new(level: ReportLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            code: None,
        }
    }

    /// Creates a new message from a coded error.
    pub fn from_error<E: CodedError>(level: ReportLevel, err: &E) -> Self {
        Self {
            level,
            message: err.message(),
            code: Some(err.code().to_string()),
        }
    }
}

/// Final status of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BakeStatus {
    Finished,
    Cancelled,
}

/// Outcome of a bake, clear or setup command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BakeReport {
    /// Operation name (e.g., "bake_wheels").
    pub operation: String,
    pub status: BakeStatus,
    #[serde(default)]
    pub messages: Vec<ReportMessage>,
    /// Keyframes written to the animation container.
    #[serde(default)]
    pub keyframes: usize,
    /// Engine states visited, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<BakeState>,
}

impl BakeReport {
    pub fn is_finished(&self) -> bool {
        self.status == BakeStatus::Finished
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == BakeStatus::Cancelled
    }

    /// Messages at the given level.
    pub fn messages_at(&self, level: ReportLevel) -> impl Iterator<Item = &ReportMessage> {
        self.messages.iter().filter(move |m| m.level == level)
    }

    pub fn has_errors(&self) -> bool {
        self.messages_at(ReportLevel::Error).next().is_some()
    }

    pub fn has_warnings(&self) -> bool {
        self.messages_at(ReportLevel::Warning).next().is_some()
    }

    /// First message with the given code.
    pub fn find_code(&self, code: &str) -> Option<&ReportMessage> {
        self.messages.iter().find(|m| m.code.as_deref() == Some(code))
    }
}

/// Builder for [`BakeReport`].
///
/// Methods take `&mut self` so the builder can be threaded through the
/// engine's state machine.
///
/// # Example
///
/// ```
/// use carrig_bake::report::{BakeStatus, ReportBuilder};
///
/// let mut builder = ReportBuilder::new("clear");
/// builder.info("Nothing to clear");
/// let report = builder.build();
/// assert_eq!(report.status, BakeStatus::Finished);
/// ```
#[derive(Debug)]
pub struct ReportBuilder {
    operation: String,
    cancelled: bool,
    messages: Vec<ReportMessage>,
    keyframes: usize,
    states: Vec<BakeState>,
}

impl ReportBuilder {
    /// Creates a new report builder for `operation`.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            cancelled: false,
            messages: Vec::new(),
            keyframes: 0,
            states: Vec::new(),
        }
    }

    /// Adds an info message.
    pub fn info(&mut self, message: impl Into<String>) -> &mut Self {
        self.messages.push(ReportMessage::new(ReportLevel::Info, message));
        self
    }

    /// Adds a warning message.
    pub fn warning(&mut self, message: impl Into<String>) -> &mut Self {
        self.messages.push(ReportMessage::new(ReportLevel::Warning, message));
        self
    }

    /// Records an error and cancels the operation.
    pub fn error<E: CodedError>(&mut self, err: &E) -> &mut Self {
        self.messages.push(ReportMessage::from_error(ReportLevel::Error, err));
        self.cancelled = true;
        self
    }

    /// Records an error as a warning and cancels the operation.
    pub fn abort<E: CodedError>(&mut self, err: &E) -> &mut Self {
        self.messages.push(ReportMessage::from_error(ReportLevel::Warning, err));
        self.cancelled = true;
        self
    }

    /// Counts written keyframes.
    pub fn keyframes(&mut self, count: usize) -> &mut Self {
        self.keyframes += count;
        self
    }

    /// Records a visited engine state.
    pub fn state(&mut self, state: BakeState) -> &mut Self {
        self.states.push(state);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Folds the messages and keyframe count of a chained operation in.
    ///
    /// A cancelled sub-operation is reported as a warning; it does not
    /// cancel the outer operation.
    pub fn merge(&mut self, report: &BakeReport) -> &mut Self {
        self.messages.extend(report.messages.iter().cloned());
        self.keyframes += report.keyframes;
        if report.is_cancelled() {
            self.warning(format!("{} was cancelled", report.operation));
        }
        self
    }

    /// Builds the report.
    pub fn build(self) -> BakeReport {
        BakeReport {
            operation: self.operation,
            status: if self.cancelled {
                BakeStatus::Cancelled
            } else {
                BakeStatus::Finished
            },
            messages: self.messages,
            keyframes: self.keyframes,
            states: self.states,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BakeError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_cancels() {
        let mut builder = ReportBuilder::new("bake_wheels");
        builder.info("Found 4 wheel bones");
        builder.error(&BakeError::NoAnimation);
        let report = builder.build();

        assert!(report.is_cancelled());
        assert!(report.has_errors());
        assert_eq!(report.find_code("BAKE_001").unwrap().level, ReportLevel::Error);
        assert_eq!(report.messages_at(ReportLevel::Info).count(), 1);
    }

    #[test]
    fn test_merge_keeps_outer_status() {
        let mut inner = ReportBuilder::new("bake_steering");
        inner.abort(&BakeError::empty_samples("MCH_SteeringRotation"));
        let inner = inner.build();

        let mut outer = ReportBuilder::new("follow_path");
        outer.keyframes(2).merge(&inner);
        let report = outer.build();

        assert!(report.is_finished());
        assert_eq!(report.keyframes, 2);
        assert_eq!(report.messages_at(ReportLevel::Warning).count(), 2);
    }

    #[test]
    fn test_report_json() {
        let mut builder = ReportBuilder::new("clear");
        builder.info("Removed 2 channels").keyframes(0);
        let report = builder.build();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "finished");
        assert_eq!(json["messages"][0]["level"], "info");
        assert!(json.get("states").is_none());

        let parsed: BakeReport = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, report);
    }
}
