//! Rig nodes and the ordered node tree.

use std::collections::HashMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::error::{SpecError, SpecResult};
use crate::naming::{scan_corner, Corner, WheelSuffix};

/// Rotation channel representation used by a node's pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    #[default]
    Quaternion,
    /// Euler, X applied first.
    Xyz,
    /// Euler, Z applied first.
    Zyx,
}

/// Per-channel manipulation locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransformLocks {
    #[serde(default)]
    pub location: [bool; 3],
    #[serde(default)]
    pub rotation: [bool; 3],
    #[serde(default)]
    pub rotation_w: bool,
    #[serde(default)]
    pub scale: [bool; 3],
}

impl TransformLocks {
    /// Every channel locked.
    pub const ALL: Self = Self {
        location: [true; 3],
        rotation: [true; 3],
        rotation_w: true,
        scale: [true; 3],
    };

    /// No channel locked.
    pub const NONE: Self = Self {
        location: [false; 3],
        rotation: [false; 3],
        rotation_w: false,
        scale: [false; 3],
    };

    pub fn with_location(mut self, location: [bool; 3]) -> Self {
        self.location = location;
        self
    }

    pub fn with_rotation(mut self, rotation: [bool; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_rotation_w(mut self, rotation_w: bool) -> Self {
        self.rotation_w = rotation_w;
        self
    }

    pub fn with_scale(mut self, scale: [bool; 3]) -> Self {
        self.scale = scale;
        self
    }

    /// Returns true if every channel is locked.
    pub fn is_fully_locked(&self) -> bool {
        *self == Self::ALL
    }
}

/// A named, directed segment of the rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique name within the rig.
    pub name: String,
    /// Segment start.
    pub head: DVec3,
    /// Segment end.
    pub tail: DVec3,
    /// Roll around the segment axis, radians.
    #[serde(default)]
    pub roll: f64,
    /// Whether the node deforms mesh skin.
    #[serde(default)]
    pub deform: bool,
    /// Owning parent; `None` for root-level nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Secondary node used as the on-screen manipulation point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_handle: Option<String>,
    /// Widget shape reference for user-facing controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
    #[serde(default)]
    pub rotation_mode: RotationMode,
    #[serde(default)]
    pub locks: TransformLocks,
    /// Declared constraints, evaluated by the host in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl Node {
    /// Creates a node spanning `head` to `tail`.
    pub fn new(name: impl Into<String>, head: DVec3, tail: DVec3) -> Self {
        Self {
            name: name.into(),
            head,
            tail,
            roll: 0.0,
            deform: false,
            parent: None,
            display_handle: None,
            widget: None,
            rotation_mode: RotationMode::default(),
            locks: TransformLocks::NONE,
            constraints: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_roll(mut self, roll: f64) -> Self {
        self.roll = roll;
        self
    }

    pub fn with_deform(mut self, deform: bool) -> Self {
        self.deform = deform;
        self
    }

    /// Segment length.
    pub fn length(&self) -> f64 {
        self.head.distance(self.tail)
    }

    /// Unit vector from tail to head, the rig's forward convention.
    pub fn forward(&self) -> DVec3 {
        (self.head - self.tail).normalize_or_zero()
    }

    /// Finds a constraint by name.
    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Finds a constraint by name, mutably.
    pub fn constraint_mut(&mut self, name: &str) -> Option<&mut Constraint> {
        self.constraints.iter_mut().find(|c| c.name == name)
    }

    /// Removes a constraint by name. Returns true if one was removed.
    pub fn remove_constraint(&mut self, name: &str) -> bool {
        let before = self.constraints.len();
        self.constraints.retain(|c| c.name != name);
        before != self.constraints.len()
    }
}

/// Nodes in creation order.
///
/// Parents must be inserted before their children, so the insertion order is
/// always a valid topological order and cycles cannot be expressed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Node>", into = "Vec<Node>")]
pub struct NodeTree {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, enforcing unique names and parent-before-child order.
    pub fn insert(&mut self, node: Node) -> SpecResult<()> {
        if self.index.contains_key(&node.name) {
            return Err(SpecError::DuplicateNode { name: node.name });
        }
        if let Some(parent) = &node.parent {
            if !self.index.contains_key(parent) {
                return Err(SpecError::ParentNotFound {
                    node: node.name.clone(),
                    parent: parent.clone(),
                });
            }
        }
        self.index.insert(node.name.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.nodes[i]),
            None => None,
        }
    }

    /// Like [`NodeTree::get`], but fails with "node not found".
    pub fn require(&self, name: &str) -> SpecResult<&Node> {
        self.get(name).ok_or_else(|| SpecError::node_not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    /// Direct children of `name`, in insertion order.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.parent.as_deref() == Some(name))
    }

    /// Nodes without a parent.
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.parent.is_none())
    }

    /// Chain of parent names from `name` up to its root-level ancestor.
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self.get(name).and_then(|n| n.parent.as_deref());
        while let Some(parent) = current {
            chain.push(parent);
            current = self.get(parent).and_then(|n| n.parent.as_deref());
        }
        chain
    }

    /// Contiguous suffixes of `role` nodes at `corner`, from index 0.
    pub fn corner_suffixes(&self, role: &str, corner: Corner) -> Vec<WheelSuffix> {
        scan_corner(role, corner, |name| self.contains(name))
    }

    /// Insertion position of a node.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Checks unique names and parent-before-child order. Trees built with
    /// [`NodeTree::insert`] always pass; deserialized trees may not.
    pub fn validate_order(&self) -> SpecResult<()> {
        let mut seen = std::collections::HashSet::new();
        for node in &self.nodes {
            if let Some(parent) = &node.parent {
                if !seen.contains(parent.as_str()) {
                    return Err(SpecError::ParentNotFound {
                        node: node.name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
            if !seen.insert(node.name.as_str()) {
                return Err(SpecError::DuplicateNode {
                    name: node.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Re-parents an existing node. The new parent must have been inserted
    /// before the node so the ordering invariant still holds.
    pub fn set_parent(&mut self, name: &str, parent: Option<&str>) -> SpecResult<()> {
        let position = *self
            .index
            .get(name)
            .ok_or_else(|| SpecError::node_not_found(name))?;
        if let Some(parent) = parent {
            match self.index.get(parent) {
                Some(&p) if p < position => {}
                _ => {
                    return Err(SpecError::ParentNotFound {
                        node: name.to_string(),
                        parent: parent.to_string(),
                    })
                }
            }
        }
        self.nodes[position].parent = parent.map(str::to_string);
        Ok(())
    }
}

impl From<Vec<Node>> for NodeTree {
    /// Rebuilds the index. Ordering is checked by [`crate::rig::Rig::validate`].
    fn from(nodes: Vec<Node>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.name.clone(), i))
            .collect();
        Self { nodes, index }
    }
}

impl From<NodeTree> for Vec<Node> {
    fn from(tree: NodeTree) -> Self {
        tree.nodes
    }
}
