//! The rig: node tree plus drivers, custom properties and collections.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collection::{ColorTheme, NodeCollection};
use crate::curve::ChannelPath;
use crate::driver::{check_self_driven, DependencyGraph, Driver, DriverSource};
use crate::error::{SpecError, SpecResult};
use crate::node::{Node, NodeTree};
use crate::property::CustomProperty;

/// A vehicle rig as declared data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rig {
    pub name: String,
    /// Set once the control rig has been generated on top of the deform nodes.
    #[serde(default)]
    pub generated: bool,
    #[serde(default)]
    pub nodes: NodeTree,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drivers: Vec<Driver>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<CustomProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<NodeCollection>,
}

impl Rig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_node(&mut self, node: Node) -> SpecResult<()> {
        self.nodes.insert(node)
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.get_mut(name)
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.contains(name)
    }

    /// Adds a property definition, replacing one with the same name.
    pub fn define_property(&mut self, property: CustomProperty) {
        match self.properties.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
    }

    pub fn property(&self, name: &str) -> Option<&CustomProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Adds a driver, replacing any driver on the same target.
    pub fn add_driver(&mut self, driver: Driver) {
        self.drivers.retain(|d| d.target != driver.target);
        self.drivers.push(driver);
    }

    pub fn driver(&self, target: &ChannelPath) -> Option<&Driver> {
        self.drivers.iter().find(|d| &d.target == target)
    }

    pub fn collection(&self, name: &str) -> Option<&NodeCollection> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Color theme of the first themed collection holding `node`.
    pub fn theme_of(&self, node: &str) -> Option<ColorTheme> {
        self.collections
            .iter()
            .filter(|c| c.contains(node))
            .find_map(|c| c.theme)
    }

    /// Parent, constraint-target and driver edges of the rig.
    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::build(&self.nodes, &self.drivers)
    }

    /// Checks every structural invariant of the rig.
    pub fn validate(&self) -> SpecResult<()> {
        self.nodes.validate_order()?;

        for node in self.nodes.iter() {
            for constraint in &node.constraints {
                if let Some(target) = &constraint.target {
                    if !self.nodes.contains(target) {
                        return Err(SpecError::dangling_reference(
                            format!("{}/{}", node.name, constraint.name),
                            target,
                        ));
                    }
                }
            }
            if let Some(handle) = &node.display_handle {
                if !self.nodes.contains(handle) {
                    return Err(SpecError::dangling_reference(&node.name, handle));
                }
            }
        }

        for property in &self.properties {
            property.validate()?;
        }

        for driver in &self.drivers {
            let owner = driver.target.to_string();
            if let Some(node) = driver.target_node() {
                if !self.nodes.contains(node) {
                    return Err(SpecError::dangling_reference(owner, node));
                }
            }
            if let ChannelPath::Constraint {
                node, constraint, ..
            } = &driver.target
            {
                let declared = self
                    .nodes
                    .get(node)
                    .is_some_and(|n| n.constraint(constraint).is_some());
                if !declared {
                    return Err(SpecError::dangling_reference(owner, format!("{}/{}", node, constraint)));
                }
            }
            for input in &driver.inputs {
                match &input.source {
                    DriverSource::Property { name } if self.property(name).is_none() => {
                        return Err(SpecError::invalid_property(
                            name,
                            format!("read by driver on {} but not defined", owner),
                        ));
                    }
                    DriverSource::Transform { node, .. } if !self.nodes.contains(node) => {
                        return Err(SpecError::dangling_reference(owner, node));
                    }
                    _ => {}
                }
            }
        }

        for collection in &self.collections {
            collection.validate()?;
            if let Some(missing) = collection.nodes.iter().find(|n| !self.nodes.contains(n)) {
                return Err(SpecError::dangling_reference(&collection.name, missing));
            }
        }

        check_self_driven(&self.drivers)?;
        self.dependency_graph().check_acyclic()?;
        debug!(
            rig = %self.name,
            nodes = self.nodes.len(),
            drivers = self.drivers.len(),
            "Rig validated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionPreset;
    use crate::constraint::Constraint;
    use crate::curve::PoseChannel;
    use glam::DVec3;
    use pretty_assertions::assert_eq;

    fn seg(name: &str) -> Node {
        Node::new(name, DVec3::ZERO, DVec3::Y)
    }

    fn small_rig() -> Rig {
        let mut rig = Rig::new("Car");
        rig.add_node(seg("Root")).unwrap();
        rig.add_node(seg("Steering").with_parent("Root")).unwrap();
        rig.define_property(CustomProperty::steering_rotation());
        rig.add_driver(Driver::from_property(
            ChannelPath::node("Steering", PoseChannel::Location, 0),
            "rotationAngle",
            "SteeringRotation",
        ));
        rig
    }

    #[test]
    fn test_valid_rig() {
        small_rig().validate().unwrap();
    }

    #[test]
    fn test_define_property_replaces() {
        let mut rig = small_rig();
        rig.define_property(CustomProperty::steering_rotation().with_description("changed"));
        assert_eq!(rig.properties.len(), 1);
        assert_eq!(rig.property("SteeringRotation").unwrap().description, "changed");
    }

    #[test]
    fn test_dangling_constraint_target() {
        let mut rig = small_rig();
        rig.node_mut("Steering")
            .unwrap()
            .constraints
            .push(Constraint::child_of("Follow", "Missing"));
        assert!(matches!(
            rig.validate(),
            Err(SpecError::DanglingReference { .. })
        ));
    }

    #[test]
    fn test_undefined_driver_property() {
        let mut rig = small_rig();
        rig.properties.clear();
        assert!(matches!(
            rig.validate(),
            Err(SpecError::InvalidProperty { .. })
        ));
    }

    #[test]
    fn test_theme_lookup() {
        let mut rig = small_rig();
        rig.collections
            .push(CollectionPreset::Wheel.to_collection().with_node("Steering"));
        assert_eq!(rig.theme_of("Steering"), Some(ColorTheme::Theme03));
        assert_eq!(rig.theme_of("Root"), None);
        rig.validate().unwrap();
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let rig = small_rig();
        let json = serde_json::to_string(&rig).unwrap();
        let back: Rig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rig);
        let names: Vec<_> = back.nodes.names().collect();
        assert_eq!(names, vec!["Root", "Steering"]);
    }
}
