//! Control rig generation on an existing deformation rig.
//!
//! The pipeline runs detection, synthesis, wiring and collection assignment
//! against a working copy of the rig. The caller's rig is replaced only once
//! the result validates, so a failure never leaves a half-applied rig.

use carrig_spec::naming;
use carrig_spec::{Rig, SceneGraph, VehicleGeometry};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collections;
use crate::detect::detect;
use crate::error::{RigError, RigResult};
use crate::synth::synthesize;
use crate::wire::{wire, WireStats, DEFAULT_WIDGET_PREFIX};

/// Parameters of control rig generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateOptions {
    /// Dispatch the generated nodes into themed collections.
    #[serde(default = "default_assign_collections")]
    pub assign_collections: bool,
    /// Prefix of widget shape names (`WGT-CarRig.Wheel`).
    #[serde(default = "default_widget_prefix")]
    pub widget_prefix: String,
}

fn default_assign_collections() -> bool {
    true
}

fn default_widget_prefix() -> String {
    DEFAULT_WIDGET_PREFIX.to_string()
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            assign_collections: default_assign_collections(),
            widget_prefix: default_widget_prefix(),
        }
    }
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collections(mut self, assign: bool) -> Self {
        self.assign_collections = assign;
        self
    }

    pub fn with_widget_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.widget_prefix = prefix.into();
        self
    }

    pub fn validate(&self) -> RigResult<()> {
        if self.widget_prefix.trim().is_empty() {
            return Err(RigError::invalid_option("widget_prefix", "must not be empty"));
        }
        Ok(())
    }
}

/// Summary of a generation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    pub geometry: VehicleGeometry,
    /// Nodes added on top of the deformation rig.
    pub nodes_created: usize,
    pub wiring: WireStats,
    pub collections: usize,
}

/// Outcome of [`generate`].
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    Generated(GenerationSummary),
    /// The rig already carries a control rig; nothing was changed.
    AlreadyGenerated,
}

/// Generates the control rig on top of the deformation nodes of `rig`.
pub fn generate<S: SceneGraph + ?Sized>(
    rig: &mut Rig,
    scene: &S,
    options: &GenerateOptions,
) -> RigResult<GenerateOutcome> {
    options.validate()?;
    if rig.generated {
        info!(rig = %rig.name, "Control rig already generated, nothing to do");
        return Ok(GenerateOutcome::AlreadyGenerated);
    }
    if let Some(control) = rig.nodes.names().find(|n| !n.starts_with("DEF_")) {
        return Err(RigError::not_deformation_rig(
            &rig.name,
            format!("node '{}' is not a deformation node", control),
        ));
    }

    let geometry = detect(rig, scene)?;
    debug!(
        width = geometry.width(),
        length = geometry.length(),
        height = geometry.height(),
        "Vehicle geometry"
    );

    let mut working = rig.clone();
    let before = working.nodes.len();
    working.nodes = synthesize(&working, &geometry, scene)?;
    let nodes_created = working.nodes.len() - before;
    let wiring = wire(&mut working, &geometry, &options.widget_prefix);
    if options.assign_collections {
        collections::assign(&mut working);
    }
    working.validate()?;
    working.generated = true;

    let summary = GenerationSummary {
        geometry,
        nodes_created,
        wiring,
        collections: working.collections.len(),
    };
    *rig = working;
    info!(
        rig = %rig.name,
        nodes = summary.nodes_created,
        constraints = summary.wiring.constraints,
        drivers = summary.wiring.drivers,
        "Generated control rig"
    );
    Ok(GenerateOutcome::Generated(summary))
}

/// Whether the rig looks like a generated control rig.
pub fn is_control_rig(rig: &Rig) -> bool {
    rig.generated && rig.has_node(naming::ROOT)
}
