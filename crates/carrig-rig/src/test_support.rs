//! Deformation rigs shared by the unit tests of this crate.

use carrig_spec::{Node, Rig};
use glam::DVec3;

pub const SEDAN: &[(&str, DVec3)] = &[
    ("FL_0", DVec3::new(0.9, -1.5, 0.4)),
    ("FR_0", DVec3::new(-0.9, -1.5, 0.4)),
    ("BL_0", DVec3::new(0.9, 1.5, 0.4)),
    ("BR_0", DVec3::new(-0.9, 1.5, 0.4)),
];

pub const TRUCK: &[(&str, DVec3)] = &[
    ("FL_0", DVec3::new(1.1, -2.5, 0.5)),
    ("FR_0", DVec3::new(-1.1, -2.5, 0.5)),
    ("BL_0", DVec3::new(1.1, 1.5, 0.5)),
    ("BL_1", DVec3::new(1.1, 2.7, 0.5)),
    ("BR_0", DVec3::new(-1.1, 1.5, 0.5)),
    ("BR_1", DVec3::new(-1.1, 2.7, 0.5)),
];

pub const FRONT_ONLY: &[(&str, DVec3)] = &[
    ("FL_0", DVec3::new(0.9, -1.5, 0.4)),
    ("FR_0", DVec3::new(-0.9, -1.5, 0.4)),
];

pub const TRAILER: &[(&str, DVec3)] = &[
    ("BL_0", DVec3::new(0.9, 1.0, 0.4)),
    ("BR_0", DVec3::new(-0.9, 1.0, 0.4)),
];

/// Body plus the given wheels; `brakes` lists the suffixes that also get a
/// `DEF_Brake` anchor just inside their wheel.
pub fn deform_rig(wheels: &[(&str, DVec3)], brakes: &[&str]) -> Rig {
    let mut rig = Rig::new("Car");
    rig.add_node(Node::new("DEF_Body", DVec3::ZERO, DVec3::new(0.0, 2.0, 0.0)).with_deform(true))
        .unwrap();
    for (suffix, head) in wheels {
        let tail = *head + DVec3::new(0.0, head.z, 0.0);
        rig.add_node(Node::new(format!("DEF_Wheel_{}", suffix), *head, tail).with_deform(true))
            .unwrap();
        if brakes.contains(suffix) {
            let inset = DVec3::new(-head.x.signum() * 0.1, 0.0, 0.0);
            rig.add_node(
                Node::new(format!("DEF_Brake_{}", suffix), *head + inset, tail + inset)
                    .with_deform(true),
            )
            .unwrap();
        }
    }
    rig
}

/// Detected, synthesized and wired rig over an empty scene.
pub fn wired(wheels: &[(&str, DVec3)], brakes: &[&str]) -> (Rig, crate::wire::WireStats) {
    let mut rig = deform_rig(wheels, brakes);
    let scene = carrig_spec::MemoryScene::new();
    let geometry = crate::detect::detect(&rig, &scene).unwrap();
    rig.nodes = crate::synth::synthesize(&rig, &geometry, &scene).unwrap();
    let stats = crate::wire::wire(&mut rig, &geometry, crate::wire::DEFAULT_WIDGET_PREFIX);
    (rig, stats)
}
