//! The bake state machine.
//!
//! Every bake walks `Idle -> CapturingContext -> BakingSamples ->
//! DerivingCurve -> RestoringContext -> Done`. Any error after the context
//! is captured short-circuits to `RestoringContext`, is reported as a
//! warning and cancels the operation. Restoration always runs.

use carrig_spec::Curve;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::context::ContextGuard;
use crate::error::{BakeError, BakeResult};
use crate::host::{AnimationStore, BakeHost};
use crate::report::ReportBuilder;
use crate::sample::BakedAction;

/// Frame range used when neither the settings nor the animation give one.
pub const DEFAULT_FRAME_RANGE: (i32, i32) = (1, 250);

/// Group label of baked curves.
pub const BAKE_GROUP: &str = "Wheels rotation";

/// States of one bake invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BakeState {
    Idle,
    CapturingContext,
    BakingSamples,
    DerivingCurve,
    RestoringContext,
    Done,
}

/// What a bake captures, resets and samples.
#[derive(Debug, Clone, PartialEq)]
pub struct BakePlan {
    /// Nodes whose context is captured and whose transforms are sampled.
    pub nodes: Vec<String>,
    /// Nodes forced to their rest pose before sampling.
    pub reset: Vec<String>,
    pub start: i32,
    pub end: i32,
}

/// Resolves the bake range, defaulting to the animation's keyed range.
pub fn resolve_range<H: AnimationStore + ?Sized>(
    host: &H,
    start: Option<i32>,
    end: Option<i32>,
) -> BakeResult<(i32, i32)> {
    let (default_start, default_end) = host
        .action()
        .and_then(|action| action.frame_range())
        .unwrap_or(DEFAULT_FRAME_RANGE);
    let start = start.unwrap_or(default_start);
    let end = end.unwrap_or(default_end);
    if start >= end {
        return Err(BakeError::InvalidRange { start, end });
    }
    Ok((start, end))
}

/// Starts a report in the `Idle` state.
pub(crate) fn start_report(operation: &str) -> ReportBuilder {
    let mut report = ReportBuilder::new(operation);
    report.state(BakeState::Idle);
    report
}

/// Runs a bake from context capture to `Done`.
///
/// `derive` turns the sampled transforms into curves, which are written to
/// the animation container before the context is restored.
pub(crate) fn run<H, F>(host: &mut H, plan: &BakePlan, report: &mut ReportBuilder, derive: F)
where
    H: BakeHost + ?Sized,
    F: FnOnce(&BakedAction, &mut ReportBuilder) -> BakeResult<Vec<Curve>>,
{
    report.state(BakeState::CapturingContext);
    let mut guard = ContextGuard::capture(host, &plan.nodes);
    let outcome = sample_and_derive(&mut guard, plan, report, derive);

    report.state(BakeState::RestoringContext);
    for failure in guard.restore() {
        warn!("{}", failure);
        report.warning(failure);
    }

    match outcome {
        Ok(keyframes) => {
            report.keyframes(keyframes);
        }
        Err(err) => {
            warn!(error = %err, "Bake cancelled");
            report.abort(&err);
        }
    }
    report.state(BakeState::Done);
}

fn sample_and_derive<H, F>(
    guard: &mut ContextGuard<'_, H>,
    plan: &BakePlan,
    report: &mut ReportBuilder,
    derive: F,
) -> BakeResult<usize>
where
    H: BakeHost + ?Sized,
    F: FnOnce(&BakedAction, &mut ReportBuilder) -> BakeResult<Vec<Curve>>,
{
    guard.isolate(&plan.nodes)?;
    guard.reset_to_rest(&plan.reset)?;

    report.state(BakeState::BakingSamples);
    let baked = BakedAction::sample(&**guard, &plan.nodes, plan.start, plan.end)?;
    if baked.is_empty() {
        return Err(BakeError::empty_samples(plan.nodes.join(", ")));
    }

    report.state(BakeState::DerivingCurve);
    let curves = derive(&baked, report)?;

    let action = guard.action_mut().ok_or(BakeError::NoAnimation)?;
    let mut keyframes = 0;
    for curve in curves {
        debug!(path = %curve.path, keys = curve.len(), "Writing baked curve");
        keyframes += curve.len();
        action.set_curve(curve);
    }
    Ok(keyframes)
}
