//! Topology synthesis of the control rig.
//!
//! Synthesis reads a [`VehicleGeometry`] and adds the control, mechanism and
//! display-handle nodes on top of an existing deformation tree. Construction
//! is order dependent: every node is inserted after its parent, so the
//! returned [`NodeTree`] is always in a valid evaluation order.
//!
//! Synthesis only places nodes. Constraints, drivers, locks and widgets are
//! declared afterwards by [`crate::wire`].

mod axles;
mod doors;
mod steering;
mod suspension;
mod wheels;

use carrig_spec::{Node, NodeTree, Rig, SceneGraph, VehicleGeometry};
use glam::DVec3;
use tracing::{debug, info};

use crate::error::RigResult;

/// Builds the full node tree of a control rig.
///
/// The deformation nodes of `rig` are kept as they are; the returned tree is
/// a copy of them followed by every synthesized node.
pub fn synthesize<S: SceneGraph + ?Sized>(
    rig: &Rig,
    geometry: &VehicleGeometry,
    scene: &S,
) -> RigResult<NodeTree> {
    let mut synth = Synthesizer::new(rig.nodes.clone(), geometry, scene);
    let before = synth.tree.len();

    let base = synth.axles()?;
    synth.wheels(&base)?;
    synth.axis_nodes(&base)?;
    synth.steering()?;
    synth.suspension(&base)?;
    synth.doors()?;
    synth.trunks()?;

    info!(
        rig = %rig.name,
        created = synth.tree.len() - before,
        "Synthesized control rig"
    );
    Ok(synth.tree)
}

/// Build context threaded through every synthesis step.
pub(crate) struct Synthesizer<'a, S: SceneGraph + ?Sized> {
    tree: NodeTree,
    geometry: &'a VehicleGeometry,
    scene: &'a S,
}

impl<'a, S: SceneGraph + ?Sized> Synthesizer<'a, S> {
    fn new(tree: NodeTree, geometry: &'a VehicleGeometry, scene: &'a S) -> Self {
        Self {
            tree,
            geometry,
            scene,
        }
    }

    fn add(&mut self, node: Node) -> RigResult<()> {
        debug!(node = %node.name, parent = ?node.parent, "Adding node");
        self.tree.insert(node)?;
        Ok(())
    }

    fn node(&self, name: &str) -> RigResult<&Node> {
        Ok(self.tree.require(name)?)
    }
}

/// `point` moved by `distance` along Y.
fn along_y(point: DVec3, distance: f64) -> DVec3 {
    point + DVec3::new(0.0, distance, 0.0)
}

fn with_z(mut point: DVec3, z: f64) -> DVec3 {
    point.z = z;
    point
}

fn with_x(mut point: DVec3, x: f64) -> DVec3 {
    point.x = x;
    point
}
