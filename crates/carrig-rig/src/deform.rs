//! Deformation rig generation from selected meshes.
//!
//! Candidate meshes are matched by name (`Body`, `Wheel_FL_0`, `Brake_BR_1`,
//! `Door_FL_0`, `Trunk_B_0`, ...). Each detected body, wheel or brake mesh
//! gets a `DEF_` anchor node at its location; missing ones fall back to
//! default positions. Detected meshes are then attached to their anchors.

use std::collections::{BTreeMap, HashMap};

use carrig_spec::naming::{self, Corner};
use carrig_spec::{Node, ObjectParent, Rig, SceneGraph};
use glam::{DMat4, DVec3};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RigError, RigResult};

/// Upper bound on wheel or brake pairs per axle.
pub const MAX_PAIRS: u32 = 32;

/// Name of the rig when no body mesh is detected.
const DEFAULT_RIG_NAME: &str = "Car";

/// Default anchor positions used when no matching mesh is found.
const DEFAULT_POSITIONS: [(&str, [f64; 3]); 9] = [
    ("Body", [0.0, 0.0, 0.8]),
    ("Wheel_FL_0", [0.9, -2.0, 0.5]),
    ("Wheel_FR_0", [-0.9, -2.0, 0.5]),
    ("Wheel_BL_0", [0.9, 2.0, 0.5]),
    ("Wheel_BR_0", [-0.9, 2.0, 0.5]),
    ("Brake_FL_0", [0.9, -2.0, 0.5]),
    ("Brake_FR_0", [-0.9, -2.0, 0.5]),
    ("Brake_BL_0", [0.9, 2.0, 0.5]),
    ("Brake_BR_0", [-0.9, 2.0, 0.5]),
];

/// Door and trunk sequences looked up among the candidates.
const DOOR_TRUNK_BASES: [&str; 6] = ["Door_FL", "Door_FR", "Door_BL", "Door_BR", "Trunk_F", "Trunk_B"];

/// Parameters of deformation rig generation.
///
/// Pair counts left unset use the number of matching meshes found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeformRigOptions {
    /// Extra translation applied to the body mesh; the anchor stays at the origin.
    #[serde(default)]
    pub body_delta: DVec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_pairs: Option<u32>,
    /// Extra translation of the front wheels; mirrored on X for the right side.
    #[serde(default)]
    pub front_delta: DVec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_pairs: Option<u32>,
    #[serde(default)]
    pub back_delta: DVec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_brake_pairs: Option<u32>,
    /// X offset of the front brakes; Y and Z follow the front wheel delta.
    #[serde(default)]
    pub front_brake_delta: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_brake_pairs: Option<u32>,
    #[serde(default)]
    pub back_brake_delta: f64,
}

impl DeformRigOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body_delta(mut self, delta: DVec3) -> Self {
        self.body_delta = delta;
        self
    }

    pub fn with_front_pairs(mut self, pairs: u32) -> Self {
        self.front_pairs = Some(pairs);
        self
    }

    pub fn with_front_delta(mut self, delta: DVec3) -> Self {
        self.front_delta = delta;
        self
    }

    pub fn with_back_pairs(mut self, pairs: u32) -> Self {
        self.back_pairs = Some(pairs);
        self
    }

    pub fn with_back_delta(mut self, delta: DVec3) -> Self {
        self.back_delta = delta;
        self
    }

    pub fn with_front_brakes(mut self, pairs: u32, delta: f64) -> Self {
        self.front_brake_pairs = Some(pairs);
        self.front_brake_delta = delta;
        self
    }

    pub fn with_back_brakes(mut self, pairs: u32, delta: f64) -> Self {
        self.back_brake_pairs = Some(pairs);
        self.back_brake_delta = delta;
        self
    }

    pub fn validate(&self) -> RigResult<()> {
        let counts = [
            ("front_pairs", self.front_pairs),
            ("back_pairs", self.back_pairs),
            ("front_brake_pairs", self.front_brake_pairs),
            ("back_brake_pairs", self.back_brake_pairs),
        ];
        for (name, count) in counts {
            if let Some(count) = count {
                if count > MAX_PAIRS {
                    return Err(RigError::invalid_option(
                        name,
                        format!("{} exceeds the maximum of {}", count, MAX_PAIRS),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// A mesh matched to an anchor name (`Wheel_FL_0`, `Door_BR_0`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshTarget {
    pub anchor: String,
    pub object: String,
}

/// Result of deformation rig generation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeformRig {
    pub rig: Rig,
    /// Matched meshes, sorted by anchor name.
    pub targets: Vec<MeshTarget>,
}

/// A matched mesh with its placement in rig space.
#[derive(Debug, Clone)]
struct Target {
    object: String,
    location: DVec3,
    dimensions: DVec3,
}

/// Name-based mesh matching over the candidate list.
struct Detection {
    /// Candidate meshes in selection order: (name, rig-space location, dimensions).
    meshes: Vec<(String, DVec3, DVec3)>,
    targets: BTreeMap<String, Target>,
}

impl Detection {
    fn new<S: SceneGraph + ?Sized>(scene: &S, candidates: &[String], to_rig: DMat4) -> Self {
        let meshes = candidates
            .iter()
            .filter_map(|name| scene.object(name))
            .filter(|object| object.is_mesh())
            .map(|object| {
                (
                    object.name.clone(),
                    to_rig.transform_point3(object.location()),
                    object.dimensions(),
                )
            })
            .collect();
        Self {
            meshes,
            targets: BTreeMap::new(),
        }
    }

    /// Records the first candidate whose name contains `anchor`, ignoring case.
    fn find(&mut self, anchor: &str) -> bool {
        let Ok(pattern) = RegexBuilder::new(&regex::escape(anchor))
            .case_insensitive(true)
            .build()
        else {
            return false;
        };
        let Some((object, location, dimensions)) =
            self.meshes.iter().find(|(name, _, _)| pattern.is_match(name))
        else {
            return false;
        };
        debug!(anchor, object = %object, "Found mesh");
        self.targets.insert(
            anchor.to_string(),
            Target {
                object: object.clone(),
                location: *location,
                dimensions: *dimensions,
            },
        );
        true
    }

    /// Number of contiguous `<base>_<i>` anchors with a matching mesh.
    fn count(&mut self, base: &str) -> u32 {
        let mut count = 0;
        while self.find(&indexed(base, count)) {
            count += 1;
        }
        count
    }
}

fn indexed(base: &str, index: u32) -> String {
    format!("{}_{}", base, index)
}

fn corner_base(kind: &str, corner: Corner) -> String {
    format!("{}_{}", kind, corner)
}

fn mirrored(delta: DVec3) -> DVec3 {
    DVec3::new(-delta.x, delta.y, delta.z)
}

/// Generates a deformation rig from the candidate meshes and attaches the
/// matched meshes to their anchors.
pub fn generate<S: SceneGraph + ?Sized>(
    scene: &mut S,
    candidates: &[String],
    options: &DeformRigOptions,
) -> RigResult<DeformRig> {
    options.validate()?;
    let to_rig = scene.rig_matrix().inverse();
    let mut detection = Detection::new(&*scene, candidates, to_rig);

    let has_body = detection.find("Body");
    let mut detected = HashMap::new();
    for kind in ["Wheel", "Brake"] {
        for corner in Corner::ALL {
            let base = corner_base(kind, corner);
            let count = detection.count(&base);
            detected.insert(base, count);
        }
    }
    for base in DOOR_TRUNK_BASES {
        detection.count(base);
    }

    let pairs = |kind: &str, front: bool| -> u32 {
        let (left, right) = if front {
            (Corner::FRONT_LEFT, Corner::FRONT_RIGHT)
        } else {
            (Corner::BACK_LEFT, Corner::BACK_RIGHT)
        };
        let l = detected.get(&corner_base(kind, left)).copied().unwrap_or(0);
        let r = detected.get(&corner_base(kind, right)).copied().unwrap_or(0);
        l.max(r)
    };
    // Without a body mesh the vehicle is assumed to have no wheel meshes either.
    let minimum = if has_body { 0 } else { 1 };
    let front_pairs = options
        .front_pairs
        .unwrap_or_else(|| pairs("Wheel", true).max(minimum));
    let back_pairs = options
        .back_pairs
        .unwrap_or_else(|| pairs("Wheel", false).max(minimum));
    let front_brake_pairs = options.front_brake_pairs.unwrap_or_else(|| pairs("Brake", true));
    let back_brake_pairs = options.back_brake_pairs.unwrap_or_else(|| pairs("Brake", false));

    let rig_name = detection
        .targets
        .get("Body")
        .map(|t| t.object.strip_suffix("_Body").unwrap_or(&t.object).to_string())
        .unwrap_or_else(|| DEFAULT_RIG_NAME.to_string());
    let mut rig = Rig::new(rig_name);

    let mut builder = AnchorBuilder::new(&detection.targets);
    builder.body(&mut rig)?;
    for corner in Corner::ALL {
        let (count, delta) = match corner.axle {
            naming::Axle::Front => (front_pairs, options.front_delta),
            naming::Axle::Back => (back_pairs, options.back_delta),
        };
        let delta = if corner.is_left() { delta } else { mirrored(delta) };
        builder.chain(&mut rig, &corner_base("Wheel", corner), count, delta)?;
    }
    for corner in Corner::ALL {
        let (count, mut delta) = match corner.axle {
            naming::Axle::Front => (front_brake_pairs, options.front_delta),
            naming::Axle::Back => (back_brake_pairs, options.back_delta),
        };
        delta.x = match corner.axle {
            naming::Axle::Front => options.front_brake_delta,
            naming::Axle::Back => options.back_brake_delta,
        };
        let delta = if corner.is_left() { delta } else { mirrored(delta) };
        builder.chain(&mut rig, &corner_base("Brake", corner), count, delta)?;
    }
    if let Some(body) = detection.targets.get("Body") {
        if options.body_delta != DVec3::ZERO {
            let offset = scene.rig_matrix().transform_vector3(options.body_delta);
            scene.translate_object(&body.object, offset)?;
        }
    }

    let targets = attach(scene, &rig, &detection.targets)?;
    info!(
        rig = %rig.name,
        nodes = rig.nodes.len(),
        meshes = targets.len(),
        "Deformation rig generated"
    );
    Ok(DeformRig { rig, targets })
}

/// Creates `DEF_` anchors, tracking default positions along wheel chains.
struct AnchorBuilder<'a> {
    targets: &'a BTreeMap<String, Target>,
    positions: HashMap<String, DVec3>,
}

impl<'a> AnchorBuilder<'a> {
    fn new(targets: &'a BTreeMap<String, Target>) -> Self {
        let mut positions: HashMap<String, DVec3> = DEFAULT_POSITIONS
            .iter()
            .map(|(name, p)| (name.to_string(), DVec3::from_array(*p)))
            .collect();
        for (anchor, target) in targets {
            positions.insert(anchor.clone(), target.location);
        }
        Self { targets, positions }
    }

    /// `DEF_Body` sits at the origin, pointing back along +Y by half the
    /// body mesh depth.
    fn body(&mut self, rig: &mut Rig) -> RigResult<()> {
        let depth = match self.targets.get("Body") {
            Some(target) if target.dimensions.x != 0.0 => target.dimensions.y / 2.0,
            _ => 1.0,
        };
        rig.add_node(
            Node::new(naming::DEF_BODY, DVec3::ZERO, DVec3::new(0.0, depth, 0.0)).with_deform(true),
        )?;
        Ok(())
    }

    /// Creates `count` anchors `DEF_<base>_<i>`. Anchors without a matched
    /// mesh step back along +Y from the previous one.
    fn chain(&mut self, rig: &mut Rig, base: &str, count: u32, delta: DVec3) -> RigResult<()> {
        let first = indexed(base, 0);
        let mut previous_default = self.positions.get(&first).copied().unwrap_or(DVec3::ZERO);
        let mut previous_head = previous_default;
        for index in 0..count {
            let name = indexed(base, index);
            let position = *self.positions.entry(name.clone()).or_insert_with(|| {
                let mut p = previous_default;
                p.y += (previous_head.z * 2.2).abs();
                p
            });
            let head = position + delta;
            let tail = head + DVec3::new(0.0, head.z, 0.0);
            rig.add_node(Node::new(format!("DEF_{}", name), head, tail).with_deform(true))?;
            previous_default = position;
            previous_head = head;
        }
        Ok(())
    }
}

/// Attaches matched meshes: body, wheels and brakes to their anchor, trunks to
/// `DEF_Body`, doors to the rig through a vertex group named after the door.
fn attach<S: SceneGraph + ?Sized>(
    scene: &mut S,
    rig: &Rig,
    targets: &BTreeMap<String, Target>,
) -> RigResult<Vec<MeshTarget>> {
    let mut attached = Vec::new();
    for (anchor, target) in targets {
        if anchor.starts_with("Door_") {
            scene.set_parent(&target.object, Some(ObjectParent::Rig))?;
            scene.add_vertex_group(&target.object, anchor)?;
        } else if anchor.starts_with("Trunk_") {
            scene.set_parent(
                &target.object,
                Some(ObjectParent::Node {
                    name: naming::DEF_BODY.to_string(),
                }),
            )?;
        } else {
            let node = format!("DEF_{}", anchor);
            if !rig.has_node(&node) {
                debug!(anchor = %anchor, "Mesh matched but no anchor created");
                continue;
            }
            scene.set_parent(&target.object, Some(ObjectParent::Node { name: node }))?;
        }
        attached.push(MeshTarget {
            anchor: anchor.clone(),
            object: target.object.clone(),
        });
    }
    Ok(attached)
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrig_spec::{MemoryScene, SceneObject};
    use pretty_assertions::assert_eq;

    fn mesh(name: &str, location: [f64; 3], size: [f64; 3]) -> SceneObject {
        SceneObject::mesh(name, DVec3::from_array(location), DVec3::from_array(size))
    }

    fn names(scene: &MemoryScene) -> Vec<String> {
        scene.objects.iter().map(|o| o.name.clone()).collect()
    }

    #[test]
    fn test_defaults_without_meshes() {
        let mut scene = MemoryScene::new();
        let result = generate(&mut scene, &[], &DeformRigOptions::default()).unwrap();
        let rig = result.rig;
        assert_eq!(rig.name, "Car");
        assert!(!rig.generated);
        let nodes: Vec<_> = rig.nodes.names().collect();
        assert_eq!(
            nodes,
            vec![
                "DEF_Body",
                "DEF_Wheel_FL_0",
                "DEF_Wheel_FR_0",
                "DEF_Wheel_BL_0",
                "DEF_Wheel_BR_0"
            ]
        );
        let body = rig.node("DEF_Body").unwrap();
        assert_eq!(body.tail, DVec3::new(0.0, 1.0, 0.0));
        let fl = rig.node("DEF_Wheel_FL_0").unwrap();
        assert_eq!(fl.head, DVec3::new(0.9, -2.0, 0.5));
        assert_eq!(fl.tail, DVec3::new(0.9, -1.5, 0.5));
        assert!(fl.deform);
        assert!(result.targets.is_empty());
    }

    #[test]
    fn test_meshes_are_detected_and_attached() {
        let mut scene = MemoryScene::new()
            .with_object(mesh("Sedan_Body", [0.0, 0.0, 0.6], [2.0, 4.4, 1.2]))
            .with_object(mesh("Wheel_FL_0", [0.85, -1.4, 0.35], [0.3, 0.7, 0.7]))
            .with_object(mesh("Wheel_FR_0", [-0.85, -1.4, 0.35], [0.3, 0.7, 0.7]))
            .with_object(mesh("sedan_wheel_bl_0", [0.85, 1.4, 0.35], [0.3, 0.7, 0.7]))
            .with_object(mesh("Wheel_BR_0", [-0.85, 1.4, 0.35], [0.3, 0.7, 0.7]))
            .with_object(mesh("Door_FL_0", [0.9, -0.3, 0.7], [0.1, 1.0, 0.8]))
            .with_object(mesh("Trunk_B_0", [0.0, 2.0, 0.9], [1.6, 0.4, 0.2]));
        let candidates = names(&scene);
        let result = generate(&mut scene, &candidates, &DeformRigOptions::default()).unwrap();

        assert_eq!(result.rig.name, "Sedan");
        assert_eq!(result.rig.node("DEF_Body").unwrap().tail, DVec3::new(0.0, 2.2, 0.0));
        let bl = result.rig.node("DEF_Wheel_BL_0").unwrap();
        assert_eq!(bl.head, DVec3::new(0.85, 1.4, 0.35));
        assert_eq!(result.targets.len(), 7);

        let wheel = scene.object("sedan_wheel_bl_0").unwrap();
        assert_eq!(
            wheel.parent,
            Some(ObjectParent::Node {
                name: "DEF_Wheel_BL_0".into()
            })
        );
        let door = scene.object("Door_FL_0").unwrap();
        assert_eq!(door.parent, Some(ObjectParent::Rig));
        assert_eq!(door.vertex_groups, vec!["Door_FL_0".to_string()]);
        let trunk = scene.object("Trunk_B_0").unwrap();
        assert_eq!(
            trunk.parent,
            Some(ObjectParent::Node {
                name: "DEF_Body".into()
            })
        );
    }

    #[test]
    fn test_body_delta_moves_the_mesh() {
        let mut scene = MemoryScene::new().with_object(mesh("Body", [0.0, 0.0, 0.6], [2.0, 4.0, 1.0]));
        let candidates = names(&scene);
        let options = DeformRigOptions::new().with_body_delta(DVec3::new(0.0, 0.0, 0.1));
        let rig = generate(&mut scene, &candidates, &options).unwrap().rig;
        assert_eq!(rig.node("DEF_Body").unwrap().head, DVec3::ZERO);
        let body = scene.object("Body").unwrap();
        assert!(body.location().abs_diff_eq(DVec3::new(0.0, 0.0, 0.7), 1e-9));
        // A body mesh alone means no wheel meshes: no default wheels either.
        assert!(!rig.has_node("DEF_Wheel_FL_0"));
    }

    #[test]
    fn test_extra_wheels_step_back() {
        let mut scene = MemoryScene::new();
        let options = DeformRigOptions::new()
            .with_front_pairs(1)
            .with_back_pairs(2)
            .with_back_delta(DVec3::new(0.1, 0.0, 0.0));
        let rig = generate(&mut scene, &[], &options).unwrap().rig;
        let second = rig.node("DEF_Wheel_BL_1").unwrap();
        // Default BL_0 at y=2 with z=0.5: next one 1.1 further back.
        assert!((second.head.y - 3.1).abs() < 1e-9);
        assert!((second.head.x - 1.0).abs() < 1e-9);
        let right = rig.node("DEF_Wheel_BR_1").unwrap();
        assert!((right.head.x + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_brakes_use_their_own_x_delta() {
        let mut scene = MemoryScene::new();
        let options = DeformRigOptions::new()
            .with_front_delta(DVec3::new(0.2, 0.1, 0.0))
            .with_front_brakes(1, -0.1);
        let rig = generate(&mut scene, &[], &options).unwrap().rig;
        let fl = rig.node("DEF_Brake_FL_0").unwrap();
        assert!(fl.head.abs_diff_eq(DVec3::new(0.8, -1.9, 0.5), 1e-9));
        let fr = rig.node("DEF_Brake_FR_0").unwrap();
        assert!(fr.head.abs_diff_eq(DVec3::new(-0.8, -1.9, 0.5), 1e-9));
        assert!(!rig.has_node("DEF_Brake_BL_0"));
    }

    #[test]
    fn test_pair_count_is_bounded() {
        let mut scene = MemoryScene::new();
        let options = DeformRigOptions::new().with_front_pairs(MAX_PAIRS + 1);
        assert!(matches!(
            generate(&mut scene, &[], &options),
            Err(RigError::InvalidOption { .. })
        ));
    }
}
