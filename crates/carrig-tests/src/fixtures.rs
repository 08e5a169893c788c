//! Vehicle scenes shared by the integration tests.
//!
//! Each fixture is a scene of named meshes the deformation rig generator
//! recognizes. [`rigged`] runs the whole generation pipeline on one.

use carrig_bake::{Action, MemoryHost};
use carrig_rig::{deform, generate, DeformRigOptions, GenerateOptions, GenerateOutcome};
use carrig_spec::{MemoryScene, SceneObject};
use glam::DVec3;

/// Wheel mesh dimensions: thin along X, round in Y and Z.
pub const WHEEL_SIZE: DVec3 = DVec3::new(0.3, 0.7, 0.7);

/// Height of every fixture's wheel centers.
pub const WHEEL_Z: f64 = 0.35;

fn wheel(name: &str, x: f64, y: f64) -> SceneObject {
    SceneObject::mesh(name, DVec3::new(x, y, WHEEL_Z), WHEEL_SIZE)
}

fn body(name: &str, length: f64) -> SceneObject {
    SceneObject::mesh(name, DVec3::new(0.0, 0.0, 0.7), DVec3::new(1.8, length, 1.2))
}

/// Four-wheel car.
pub fn sedan() -> MemoryScene {
    MemoryScene::new()
        .with_object(body("Sedan_Body", 4.4))
        .with_object(wheel("Wheel_FL_0", 0.85, -1.4))
        .with_object(wheel("Wheel_FR_0", -0.85, -1.4))
        .with_object(wheel("Wheel_BL_0", 0.85, 1.4))
        .with_object(wheel("Wheel_BR_0", -0.85, 1.4))
}

/// Six-wheel truck with front brakes, front doors and a rear trunk.
pub fn truck() -> MemoryScene {
    MemoryScene::new()
        .with_object(body("Truck_Body", 6.0))
        .with_object(wheel("Wheel_FL_0", 1.0, -2.2))
        .with_object(wheel("Wheel_FR_0", -1.0, -2.2))
        .with_object(wheel("Wheel_BL_0", 1.0, 1.2))
        .with_object(wheel("Wheel_BL_1", 1.0, 2.2))
        .with_object(wheel("Wheel_BR_0", -1.0, 1.2))
        .with_object(wheel("Wheel_BR_1", -1.0, 2.2))
        .with_object(SceneObject::mesh(
            "Brake_FL_0",
            DVec3::new(0.9, -2.2, WHEEL_Z),
            DVec3::new(0.05, 0.4, 0.4),
        ))
        .with_object(SceneObject::mesh(
            "Brake_FR_0",
            DVec3::new(-0.9, -2.2, WHEEL_Z),
            DVec3::new(0.05, 0.4, 0.4),
        ))
        .with_object(SceneObject::mesh(
            "Door_FL_0",
            DVec3::new(0.95, -1.0, 0.9),
            DVec3::new(0.1, 1.0, 0.8),
        ))
        .with_object(SceneObject::mesh(
            "Door_FR_0",
            DVec3::new(-0.95, -1.0, 0.9),
            DVec3::new(0.1, 1.0, 0.8),
        ))
        .with_object(SceneObject::mesh(
            "Trunk_B_0",
            DVec3::new(0.0, 3.0, 1.0),
            DVec3::new(1.6, 0.2, 0.8),
        ))
}

/// Rear-only trailer: no front axle, so no steering.
pub fn trailer() -> MemoryScene {
    MemoryScene::new()
        .with_object(body("Trailer_Body", 3.0))
        .with_object(wheel("Wheel_BL_0", 0.85, 0.8))
        .with_object(wheel("Wheel_BR_0", -0.85, 0.8))
}

/// Straight path object along +Y of the given length, ending at the origin.
///
/// A rig following it from offset 1 to 0 drives towards -Y, its front.
pub fn straight_road(name: &str, length: f64) -> SceneObject {
    SceneObject::curve(name, vec![DVec3::new(0.0, -length, 0.0), DVec3::ZERO])
}

/// Ground plane.
pub fn ground(name: &str) -> SceneObject {
    SceneObject::mesh(name, DVec3::ZERO, DVec3::new(100.0, 100.0, 0.0))
}

/// Runs deformation and control rig generation on every mesh of `scene`.
pub fn rigged(mut scene: MemoryScene) -> MemoryHost {
    let candidates: Vec<String> = scene
        .objects
        .iter()
        .filter(|o| o.is_mesh())
        .map(|o| o.name.clone())
        .collect();
    let deformation = deform::generate(&mut scene, &candidates, &DeformRigOptions::new())
        .expect("deformation rig");
    let mut rig = deformation.rig;
    let outcome = generate(&mut rig, &scene, &GenerateOptions::new()).expect("control rig");
    assert!(matches!(outcome, GenerateOutcome::Generated(_)));
    MemoryHost::new(rig, scene)
}

/// [`rigged`] plus an empty animation container named after the rig.
pub fn animated(scene: MemoryScene) -> MemoryHost {
    let host = rigged(scene);
    let name = format!("{}_Action", host.rig.name);
    host.with_action(Action::new(name))
}
