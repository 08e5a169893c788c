//! Declarative drivers and the rig dependency graph.
//!
//! A driver computes one animatable scalar from other scalars: custom
//! properties on the rig or transform channels of nodes. The host evaluates
//! drivers; the rig only declares them. Together with parenting and constraint
//! targets, drivers form the evaluation graph that must stay acyclic.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::constraint::{Axis, Space, TransformChannel};
use crate::curve::ChannelPath;
use crate::error::{SpecError, SpecResult};
use crate::node::NodeTree;

/// How driver inputs combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverReduce {
    #[default]
    Average,
    Sum,
    Max,
    Min,
}

/// Where a driver input reads from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum DriverSource {
    /// A custom property on the rig root.
    Property { name: String },
    /// One axis of a node transform channel.
    Transform {
        node: String,
        channel: TransformChannel,
        axis: Axis,
        #[serde(default)]
        space: Space,
    },
}

impl DriverSource {
    pub fn property(name: impl Into<String>) -> Self {
        DriverSource::Property { name: name.into() }
    }

    pub fn transform(node: impl Into<String>, channel: TransformChannel, axis: Axis, space: Space) -> Self {
        DriverSource::Transform {
            node: node.into(),
            channel,
            axis,
            space,
        }
    }

    /// Node read by this source, if any.
    pub fn node(&self) -> Option<&str> {
        match self {
            DriverSource::Transform { node, .. } => Some(node),
            DriverSource::Property { .. } => None,
        }
    }
}

/// Named driver input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverInput {
    pub name: String,
    pub source: DriverSource,
}

/// A driver on one animatable scalar.
///
/// The result is `reduce(inputs) * scale + offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub target: ChannelPath,
    pub inputs: Vec<DriverInput>,
    #[serde(default)]
    pub reduce: DriverReduce,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Driver {
    /// Creates an averaging driver with no inputs.
    pub fn new(target: ChannelPath) -> Self {
        Self {
            target,
            inputs: Vec::new(),
            reduce: DriverReduce::Average,
            scale: 1.0,
            offset: 0.0,
        }
    }

    /// Driver mirroring a single custom property.
    pub fn from_property(target: ChannelPath, input: impl Into<String>, property: impl Into<String>) -> Self {
        Self::new(target).with_input(input, DriverSource::property(property))
    }

    pub fn with_input(mut self, name: impl Into<String>, source: DriverSource) -> Self {
        self.inputs.push(DriverInput {
            name: name.into(),
            source,
        });
        self
    }

    pub fn with_reduce(mut self, reduce: DriverReduce) -> Self {
        self.reduce = reduce;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Combines input values. An empty input list yields `offset`.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        let reduced = if values.is_empty() {
            0.0
        } else {
            match self.reduce {
                DriverReduce::Average => values.iter().sum::<f64>() / values.len() as f64,
                DriverReduce::Sum => values.iter().sum(),
                DriverReduce::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                DriverReduce::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            }
        };
        reduced * self.scale + self.offset
    }

    /// Node owning the driven scalar, if the target lives on a node.
    pub fn target_node(&self) -> Option<&str> {
        match &self.target {
            ChannelPath::Node { node, .. } | ChannelPath::Constraint { node, .. } => Some(node),
            ChannelPath::Property { .. } => None,
        }
    }
}

// =============================================================================
// Dependency graph
// =============================================================================

/// Vertex of the evaluation graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GraphVertex {
    Node(String),
    Property(String),
}

impl GraphVertex {
    fn label(&self) -> String {
        match self {
            GraphVertex::Node(name) => name.clone(),
            GraphVertex::Property(name) => format!("[\"{}\"]", name),
        }
    }
}

/// Why one vertex depends on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {
    Parent,
    ConstraintTarget,
    Driver,
}

/// Directed edges "`from` must be evaluated before `to`".
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: BTreeMap<GraphVertex, BTreeSet<(GraphVertex, EdgeKind)>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects parent, constraint-target and driver edges of a rig.
    pub fn build(nodes: &NodeTree, drivers: &[Driver]) -> Self {
        let mut graph = Self::new();
        for node in nodes.iter() {
            let owner = GraphVertex::Node(node.name.clone());
            graph.touch(owner.clone());
            if let Some(parent) = &node.parent {
                graph.add_edge(GraphVertex::Node(parent.clone()), owner.clone(), EdgeKind::Parent);
            }
            for constraint in &node.constraints {
                if let Some(target) = &constraint.target {
                    graph.add_edge(
                        GraphVertex::Node(target.clone()),
                        owner.clone(),
                        EdgeKind::ConstraintTarget,
                    );
                }
            }
        }
        for driver in drivers {
            let target = match &driver.target {
                ChannelPath::Property { name } => GraphVertex::Property(name.clone()),
                ChannelPath::Node { node, .. } | ChannelPath::Constraint { node, .. } => {
                    GraphVertex::Node(node.clone())
                }
            };
            for input in &driver.inputs {
                let source = match &input.source {
                    DriverSource::Property { name } => GraphVertex::Property(name.clone()),
                    DriverSource::Transform { node, .. } => GraphVertex::Node(node.clone()),
                };
                graph.add_edge(source, target.clone(), EdgeKind::Driver);
            }
        }
        graph
    }

    fn touch(&mut self, vertex: GraphVertex) {
        self.edges.entry(vertex).or_default();
    }

    pub fn add_edge(&mut self, from: GraphVertex, to: GraphVertex, kind: EdgeKind) {
        self.touch(to.clone());
        self.edges.entry(from).or_default().insert((to, kind));
    }

    /// Number of edges of the given kind.
    pub fn edge_count(&self, kind: EdgeKind) -> usize {
        self.edges
            .values()
            .flat_map(|targets| targets.iter())
            .filter(|(_, k)| *k == kind)
            .count()
    }

    /// Fails with the offending path when the graph contains a cycle.
    pub fn check_acyclic(&self) -> SpecResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        let mut marks: BTreeMap<&GraphVertex, Mark> = BTreeMap::new();
        for start in self.edges.keys() {
            if marks.contains_key(start) {
                continue;
            }
            // Iterative DFS; the stack holds a vertex and the index of its next edge.
            let mut stack: Vec<(&GraphVertex, usize)> = vec![(start, 0)];
            marks.insert(start, Mark::Visiting);
            while let Some((vertex, next)) = stack.pop() {
                let targets: Vec<&GraphVertex> = self
                    .edges
                    .get(vertex)
                    .map(|t| t.iter().map(|(v, _)| v).collect())
                    .unwrap_or_default();
                if next >= targets.len() {
                    marks.insert(vertex, Mark::Done);
                    continue;
                }
                stack.push((vertex, next + 1));
                let target = targets[next];
                match marks.get(target) {
                    Some(Mark::Done) => {}
                    Some(Mark::Visiting) => {
                        let mut path: Vec<String> = stack
                            .iter()
                            .skip_while(|(v, _)| *v != target)
                            .map(|(v, _)| v.label())
                            .collect();
                        path.push(target.label());
                        return Err(SpecError::DriverCycle { path });
                    }
                    None => {
                        marks.insert(target, Mark::Visiting);
                        stack.push((target, 0));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Rejects drivers whose inputs read the scalar they drive.
pub fn check_self_driven(drivers: &[Driver]) -> SpecResult<()> {
    for driver in drivers {
        if let ChannelPath::Property { name } = &driver.target {
            let reads_itself = driver
                .inputs
                .iter()
                .any(|i| matches!(&i.source, DriverSource::Property { name: n } if n == name));
            if reads_itself {
                return Err(SpecError::SelfDrivenTarget {
                    target: driver.target.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;
    use crate::curve::PoseChannel;
    use crate::node::Node;
    use glam::DVec3;
    use pretty_assertions::assert_eq;

    fn seg(name: &str) -> Node {
        Node::new(name, DVec3::ZERO, DVec3::Y)
    }

    #[test]
    fn test_evaluate_reductions() {
        let target = ChannelPath::property("x");
        let avg = Driver::new(target.clone());
        assert_eq!(avg.evaluate(&[1.0, 3.0]), 2.0);
        let max = Driver::new(target.clone()).with_reduce(DriverReduce::Max);
        assert_eq!(max.evaluate(&[-1.0, 0.25, 0.1]), 0.25);
        let scaled = Driver::new(target).with_scale(0.5);
        assert_eq!(scaled.evaluate(&[1.0]), 0.5);
        assert_eq!(scaled.evaluate(&[]), 0.0);
    }

    #[test]
    fn test_acyclic_rig_passes() {
        let mut nodes = NodeTree::new();
        nodes.insert(seg("Root")).unwrap();
        let mut child = seg("MCH_Wheel_FL_0").with_parent("Root");
        child.constraints.push(Constraint::child_of("Follow", "Root"));
        nodes.insert(child).unwrap();
        let drivers = vec![Driver::from_property(
            ChannelPath::node("MCH_Wheel_FL_0", PoseChannel::RotationEuler, 0),
            "rotationAngle",
            "WheelRotation_FL_0",
        )];
        let graph = DependencyGraph::build(&nodes, &drivers);
        assert_eq!(graph.edge_count(EdgeKind::Parent), 1);
        assert_eq!(graph.edge_count(EdgeKind::Driver), 1);
        graph.check_acyclic().unwrap();
    }

    #[test]
    fn test_constraint_cycle_reported_with_path() {
        let mut nodes = NodeTree::new();
        let mut a = seg("A");
        a.constraints.push(Constraint::damped_track("t", "B", Default::default()));
        nodes.insert(a).unwrap();
        let mut b = seg("B");
        b.constraints.push(Constraint::damped_track("t", "A", Default::default()));
        nodes.insert(b).unwrap();

        let err = DependencyGraph::build(&nodes, &[]).check_acyclic().unwrap_err();
        match err {
            SpecError::DriverCycle { path } => {
                assert_eq!(path.first(), path.last());
                assert!(path.contains(&"A".to_string()));
                assert!(path.contains(&"B".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_driver_cycle_through_property() {
        let mut nodes = NodeTree::new();
        nodes.insert(seg("Steering")).unwrap();
        let drivers = vec![
            Driver::new(ChannelPath::property("SteeringRotation")).with_input(
                "z",
                DriverSource::transform("Steering", TransformChannel::Rotation, Axis::Z, Space::Local),
            ),
            Driver::from_property(
                ChannelPath::node("Steering", PoseChannel::Location, 0),
                "x",
                "SteeringRotation",
            ),
        ];
        assert!(DependencyGraph::build(&nodes, &drivers).check_acyclic().is_err());
    }

    #[test]
    fn test_self_driven_property_rejected() {
        let drivers = vec![Driver::from_property(ChannelPath::property("P"), "v", "P")];
        assert!(matches!(
            check_self_driven(&drivers),
            Err(SpecError::SelfDrivenTarget { .. })
        ));
    }
}
