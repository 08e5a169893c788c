//! Edits applied to an already generated rig.

use carrig_spec::naming::role;
use carrig_spec::{
    ConstraintKind, CornerName, Node, Rig, SceneGraph, ShrinkwrapMode, SpecError,
};
use tracing::{debug, info, warn};

use crate::collections;
use crate::error::RigResult;
use crate::wire::{configure_brake, GROUND_PROJECTION};

/// Assigns `ground` to every ground projection of the rig.
///
/// `None` clears the ground so sensors fall back to nearest-surface
/// projection without a surface. Returns the number of constraints updated.
pub fn set_ground<S: SceneGraph + ?Sized>(
    rig: &mut Rig,
    scene: &S,
    ground: Option<&str>,
    mode: ShrinkwrapMode,
) -> RigResult<usize> {
    if let Some(name) = ground {
        if scene.object(name).is_none() {
            return Err(SpecError::object_not_found(name).into());
        }
    }

    let mut updated = 0;
    for node in rig.nodes.iter_mut() {
        let Some(constraint) = node.constraint_mut(GROUND_PROJECTION) else {
            continue;
        };
        if let ConstraintKind::Shrinkwrap {
            ground: target,
            mode: current,
            ..
        } = &mut constraint.kind
        {
            *target = ground.map(str::to_string);
            *current = mode;
            updated += 1;
            debug!(node = %node.name, ground = ?ground, "Ground updated");
        }
    }
    info!(updated, "Set ground on projections");
    Ok(updated)
}

/// Creates the missing `Brake_*` control under `MCH_Wheel_*` for each
/// selected `Wheel_*` control. Returns the names of the created brakes.
pub fn add_missing_brakes(
    rig: &mut Rig,
    selected: &[String],
    widget_prefix: &str,
) -> RigResult<Vec<String>> {
    let mut created = Vec::new();
    for name in selected {
        let suffix = match CornerName::parse(name) {
            Ok(parsed) if parsed.role == role::WHEEL => parsed.suffix,
            _ => {
                debug!(node = %name, "Not a wheel control, ignored");
                continue;
            }
        };
        let brake = suffix.name(role::BRAKE);
        if rig.has_node(&brake) {
            continue;
        }
        let carrier = suffix.name(role::MCH_WHEEL);
        let Some((head, tail)) = rig.node(name).map(|wheel| (wheel.head, wheel.tail)) else {
            warn!(node = %name, "Selected wheel control not found");
            continue;
        };
        if !rig.has_node(&carrier) {
            warn!(node = %name, missing = %carrier, "Wheel carrier not found, brake skipped");
            continue;
        }

        let mut node = Node::new(&brake, head, tail).with_parent(&carrier);
        configure_brake(&mut node, widget_prefix);
        rig.add_node(node)?;
        debug!(brake = %brake, "Brake created");
        created.push(brake);
    }

    if !created.is_empty() && !rig.collections.is_empty() {
        collections::assign(rig);
    }
    info!(count = created.len(), "Added missing brakes");
    Ok(created)
}
