//! Dispatch of generated nodes into themed collections.

use carrig_spec::naming::{self, role};
use carrig_spec::{CollectionPreset, NodeCollection, Rig};
use tracing::debug;

/// Collection a node belongs to, or `None` for nodes outside every preset.
pub fn preset_for(name: &str) -> Option<CollectionPreset> {
    let has_role = |prefix: &str| {
        name.strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('_'))
    };

    if name.starts_with("DEF_") {
        return Some(CollectionPreset::Deform);
    }
    if name.starts_with("MCH_") || name.starts_with("SHP_") {
        return Some(CollectionPreset::Mechanism);
    }
    if [naming::ROOT, naming::DRIFT, naming::STEERING].contains(&name) {
        return Some(CollectionPreset::Direction);
    }
    if name == naming::SUSPENSION || has_role(role::DAMPER) {
        return Some(CollectionPreset::Suspension);
    }
    if has_role(role::WHEEL) || has_role(role::BRAKE) {
        return Some(CollectionPreset::Wheel);
    }
    if has_role(role::GROUND_SENSOR) {
        return Some(CollectionPreset::GroundSensor);
    }
    if has_role(role::DOOR) || has_role(role::TRUNK) {
        return Some(CollectionPreset::DoorTrunk);
    }
    None
}

/// Rebuilds the rig's collections from its current nodes.
///
/// Existing collections with a preset name are replaced; user collections
/// with other names are kept. Empty presets are not created.
pub fn assign(rig: &mut Rig) {
    let mut collections: Vec<NodeCollection> = CollectionPreset::ALL
        .iter()
        .map(CollectionPreset::to_collection)
        .collect();

    for node in rig.nodes.iter() {
        if let Some(preset) = preset_for(&node.name) {
            if let Some(index) = CollectionPreset::ALL.iter().position(|p| *p == preset) {
                collections[index].nodes.push(node.name.clone());
            }
        }
    }

    rig.collections
        .retain(|c| !CollectionPreset::ALL.iter().any(|p| p.default_name() == c.name));
    for collection in collections.into_iter().filter(|c| !c.nodes.is_empty()) {
        debug!(collection = %collection.name, nodes = collection.nodes.len(), "Assigned collection");
        rig.collections.push(collection);
    }
}
