//! End-to-End Bake Tests for Carrig
//!
//! Generated rigs follow a path; the resulting motion is baked into wheel
//! and steering properties, then cleared again.

use carrig_bake::{
    bake_steering, bake_wheels, clear_baked, clear_follow_path, setup_follow_path, AnimationStore, BakeState,
    ClearOptions, EditContext, EditMode, FollowPathOptions, MemoryHost, ReportLevel,
    SteeringBakeSettings, WheelBakeSettings, FOLLOW_PATH_CONSTRAINT,
};
use carrig_spec::naming::{self, property};
use carrig_spec::{ChannelPath, Corner, Keyframe, PoseChannel};
use carrig_tests::fixtures::{self, rigged, WHEEL_Z};
use glam::DVec3;
use pretty_assertions::assert_eq;

const ROAD_LENGTH: f64 = 10.0;

fn on_road(scene: carrig_spec::MemoryScene) -> MemoryHost {
    let mut host = rigged(scene);
    host.scene.add_object(fixtures::straight_road("Road", ROAD_LENGTH));
    host.scene.add_object(fixtures::ground("Ground"));
    host
}

fn wheel_total(host: &MemoryHost, property: &str) -> f64 {
    let curve = host
        .action()
        .and_then(|a| a.curve(&ChannelPath::property(property)))
        .unwrap_or_else(|| panic!("no curve for {}", property));
    curve.keyframes.last().map_or(0.0, |k| k.value)
}

#[test]
fn test_sedan_follows_road() {
    let mut host = on_road(fixtures::sedan());
    host.selection = vec![naming::STEERING.to_string()];

    let options = FollowPathOptions::new("Road")
        .with_ground("Ground")
        .with_frames(1, 101);
    let report = setup_follow_path(&mut host, &options);
    assert!(report.is_finished(), "{:?}", report.messages);
    assert!(!report.has_errors());
    assert_eq!(report.states.last(), Some(&BakeState::Done));

    // Wheels spin forward by distance over radius.
    let radius = 0.9 * WHEEL_Z;
    for corner in Corner::ALL {
        let total = wheel_total(&host, &corner.suffix(0).rotation_property());
        assert!(
            (total - ROAD_LENGTH / radius).abs() < 1e-6,
            "{}: {}",
            corner,
            total
        );
    }
    let action = host.action().unwrap();
    assert_eq!(action.name, "Sedan_Action");
    assert!(action
        .curve(&ChannelPath::property(property::STEERING_ROTATION))
        .is_some());
    assert_eq!(action.frame_range(), Some((1, 101)));

    // The interaction context is back where it was.
    assert_eq!(host.mode(), EditMode::Object);
    assert_eq!(host.selection(), vec![naming::STEERING.to_string()]);
    assert_eq!(host.properties.get(property::WHEELS_Y_ROLLING), Some(&0.0));
}

#[test]
fn test_trailer_skips_steering() {
    let mut host = on_road(fixtures::trailer());
    let report = setup_follow_path(&mut host, &FollowPathOptions::new("Road").with_frames(1, 49));
    assert!(report.is_finished());
    assert!(report.messages_at(ReportLevel::Warning).next().is_none());

    let action = host.action().unwrap();
    assert!(action
        .curve(&ChannelPath::property(property::STEERING_ROTATION))
        .is_none());
    assert!(wheel_total(&host, "WheelRotation_BL_0") > 0.0);
    assert!(wheel_total(&host, "WheelRotation_BR_0") > 0.0);
}

#[test]
fn test_truck_rear_wheels_match() {
    let mut host = on_road(fixtures::truck());
    let report = setup_follow_path(&mut host, &FollowPathOptions::new("Road").with_frames(1, 25));
    assert!(report.is_finished(), "{:?}", report.messages);
    // Rear wheels share the same travel: every rear wheel spins the same.
    let a = wheel_total(&host, "WheelRotation_BL_0");
    let b = wheel_total(&host, "WheelRotation_BR_1");
    assert!((a - b).abs() < 1e-9);
}

#[test]
fn test_rebake_replaces_curves() {
    let mut host = on_road(fixtures::sedan());
    setup_follow_path(&mut host, &FollowPathOptions::new("Road").with_frames(1, 51));
    let first = wheel_total(&host, "WheelRotation_FL_0");

    let report = bake_wheels(&mut host, &WheelBakeSettings::new().with_tolerance(0.5));
    assert!(report.is_finished(), "{:?}", report.messages);
    assert!((wheel_total(&host, "WheelRotation_FL_0") - first).abs() < 1e-9);
    let curves = host
        .action()
        .unwrap()
        .curves
        .iter()
        .filter(|c| c.path == ChannelPath::property("WheelRotation_FL_0"))
        .count();
    assert_eq!(curves, 1);
}

#[test]
fn test_clear_after_bake() {
    let mut host = on_road(fixtures::sedan());
    setup_follow_path(&mut host, &FollowPathOptions::new("Road").with_frames(1, 21));

    let report = clear_baked(&mut host, &ClearOptions::new());
    assert!(report.is_finished());
    assert_eq!(
        report.messages.last().unwrap().message,
        "Removed 1 steering and 4 wheel curves"
    );
    let action = host.action().unwrap();
    assert!(action
        .curves
        .iter()
        .all(|c| c.path.property_name().is_none()));

    assert!(clear_follow_path(&mut host));
    assert!(host
        .rig
        .node(naming::ROOT)
        .unwrap()
        .constraint(FOLLOW_PATH_CONSTRAINT)
        .is_none());
    assert!(host.action().unwrap().curves.is_empty());
}

#[test]
fn test_parked_car_keys_only_endpoints() {
    let mut host = fixtures::animated(fixtures::sedan());
    let report = bake_wheels(&mut host, &WheelBakeSettings::new().with_range(1, 10));
    assert!(report.is_finished(), "{:?}", report.messages);
    // A parked car only gets its endpoint keys.
    let curve = host
        .action()
        .unwrap()
        .curve(&ChannelPath::property("WheelRotation_FL_0"))
        .unwrap();
    let frames: Vec<i32> = curve.keyframes.iter().map(|k| k.frame).collect();
    assert_eq!(frames, vec![1, 10]);
    assert!(curve.keyframes.iter().all(|k| k.value == 0.0));
}

#[test]
fn test_cornering_is_steered() {
    let mut host = fixtures::animated(fixtures::sedan());
    let start = host.rig.node(naming::MCH_STEERING_ROTATION).unwrap().head;

    // A left-hand arc of radius 8, one key per frame.
    {
        let action = host.ensure_action("Sedan_Action");
        for frame in 1..=21 {
            let angle = (frame - 1) as f64 * 0.05;
            let location = DVec3::new(8.0 * (1.0 - angle.cos()), -8.0 * angle.sin(), 0.0);
            for (index, value) in location.to_array().into_iter().enumerate() {
                action.insert_keyframe(
                    &ChannelPath::node(naming::MCH_STEERING_ROTATION, PoseChannel::Location, index),
                    Keyframe::linear(frame, value),
                );
            }
        }
    }

    let report = bake_steering(&mut host, &SteeringBakeSettings::new());
    assert!(report.is_finished(), "{:?}", report.messages);

    let curve = host
        .action()
        .unwrap()
        .curve(&ChannelPath::property(property::STEERING_ROTATION))
        .unwrap();
    assert!(curve.len() >= 2, "{:?}", curve.keyframes);
    let first = curve.keyframes.first().unwrap().value;
    let last = curve.keyframes.last().unwrap().value;
    assert!(last.abs() > 0.1, "{:?}", curve.keyframes);
    // The turn tightens relative to the heading, so the displacement grows.
    assert!(last.abs() > first.abs());
    assert_eq!(host.rig.node(naming::MCH_STEERING_ROTATION).unwrap().head, start);
}
