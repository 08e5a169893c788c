//! Removal of baked steering and wheel animation.

use std::collections::BTreeSet;

use carrig_spec::naming::{self, property};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine;
use crate::host::BakeHost;
use crate::report::BakeReport;
use crate::wheels::clear_property;

fn default_true() -> bool {
    true
}

/// Which baked channels to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClearOptions {
    #[serde(default = "default_true")]
    pub steering: bool,
    #[serde(default = "default_true")]
    pub wheels: bool,
}

impl Default for ClearOptions {
    fn default() -> Self {
        Self {
            steering: true,
            wheels: true,
        }
    }
}

impl ClearOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_steering(mut self, steering: bool) -> Self {
        self.steering = steering;
        self
    }

    pub fn with_wheels(mut self, wheels: bool) -> Self {
        self.wheels = wheels;
        self
    }
}

/// Removes the selected baked curves and resets their properties to 0.
///
/// Wheel channels are found both among the rig's declared properties and
/// among the animation's property curves, so orphaned curves are cleared
/// too. Clearing twice is a no-op the second time.
pub fn clear_baked<H: BakeHost + ?Sized>(host: &mut H, options: &ClearOptions) -> BakeReport {
    let mut report = engine::start_report("clear_baked");

    let mut steering = 0;
    if options.steering && clear_property(host, property::STEERING_ROTATION) {
        steering += 1;
    }

    let mut wheels = 0;
    if options.wheels {
        for name in wheel_channels(host) {
            if clear_property(host, &name) {
                wheels += 1;
            }
        }
    }

    let message = format!(
        "Removed {} steering and {} wheel curves",
        steering, wheels
    );
    info!("{}", message);
    report.info(message);
    report.keyframes(0);
    report.build()
}

fn wheel_channels<H: BakeHost + ?Sized>(host: &H) -> BTreeSet<String> {
    let declared = host.rig().properties.iter().map(|p| p.name.clone());
    let animated = host
        .action()
        .into_iter()
        .flat_map(|action| action.curves.iter())
        .filter_map(|curve| curve.path.property_name().map(str::to_string));
    declared
        .chain(animated)
        .filter(|name| naming::is_wheel_rotation_property(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::host::AnimationStore;
    use crate::memory::MemoryHost;
    use carrig_spec::{ChannelPath, CustomProperty, Keyframe, MemoryScene, Rig, WheelSuffix};
    use pretty_assertions::assert_eq;

    fn host() -> MemoryHost {
        let mut rig = Rig::new("Car");
        rig.define_property(CustomProperty::steering_rotation());
        let fl: WheelSuffix = "FL_0".parse().unwrap();
        rig.define_property(CustomProperty::wheel_rotation(fl));
        let mut host = MemoryHost::new(rig, MemoryScene::new()).with_action(Action::new("Car_Action"));
        let action = host.ensure_action("Car_Action");
        for name in ["SteeringRotation", "WheelRotation_FL_0", "WheelRotation_BR_1"] {
            action.insert_keyframe(&ChannelPath::property(name), Keyframe::linear(1, 0.5));
        }
        action.insert_keyframe(&ChannelPath::property("Other"), Keyframe::linear(1, 2.0));
        host.set_property_value("SteeringRotation", 0.3).unwrap();
        host.set_property_value("WheelRotation_FL_0", 4.0).unwrap();
        host
    }

    fn property_curves(host: &MemoryHost) -> Vec<String> {
        host.action
            .as_ref()
            .unwrap()
            .curves
            .iter()
            .map(|c| c.path.to_string())
            .collect()
    }

    #[test]
    fn test_clear_everything() {
        let mut host = host();
        let report = clear_baked(&mut host, &ClearOptions::new());
        assert!(report.is_finished());
        assert_eq!(report.messages[0].message, "Removed 1 steering and 2 wheel curves");
        assert_eq!(property_curves(&host), vec!["[\"Other\"]".to_string()]);
        assert_eq!(host.property_value("SteeringRotation"), Some(0.0));
        assert_eq!(host.property_value("WheelRotation_FL_0"), Some(0.0));

        let again = clear_baked(&mut host, &ClearOptions::new());
        assert_eq!(again.messages[0].message, "Removed 0 steering and 0 wheel curves");
    }

    #[test]
    fn test_clear_only_selected_channels() {
        let mut host = host();
        clear_baked(&mut host, &ClearOptions::new().with_wheels(false));
        assert_eq!(
            property_curves(&host),
            vec![
                "[\"WheelRotation_FL_0\"]".to_string(),
                "[\"WheelRotation_BR_1\"]".to_string(),
                "[\"Other\"]".to_string(),
            ]
        );
        assert_eq!(host.property_value("WheelRotation_FL_0"), Some(4.0));
    }

    #[test]
    fn test_options_defaults() {
        let options: ClearOptions = serde_json::from_str(r#"{"wheels": false}"#).unwrap();
        assert_eq!(options, ClearOptions::new().with_wheels(false));
    }
}
