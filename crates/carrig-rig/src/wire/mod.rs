//! Constraint and driver network of the control rig.
//!
//! Wiring mutates the constraint lists, drivers, locks and display settings
//! of nodes that synthesis already created. It never creates nodes. Any
//! constraint or driver whose owner or target is missing is skipped, which
//! is how partially detected vehicles (no rear wheels, no brakes) degrade.
//!
//! Drivers are collected as explicit records on the [`Rig`]; the dependency
//! graph they form together with parents and constraint targets is checked
//! for cycles by [`Rig::validate`].

mod doors;
mod ground;
mod steering;
mod suspension;
mod wheels;

pub use doors::{ATTACHMENT_CONSTRAINT, TRUNK_OPENING_DEGREES};
pub use ground::GROUND_PROJECTION;
pub use wheels::{configure_brake, BRAKE_CONSTRAINT, WHEEL_ROLLING_CONSTRAINT};

use carrig_spec::naming;
use carrig_spec::{
    ChannelPath, Constraint, CustomProperty, Driver, Node, Rig, TransformLocks, VehicleGeometry,
};
use tracing::{debug, info, warn};

/// Widget shape names, without the configurable prefix.
pub mod widget {
    pub const ROOT: &str = "Root";
    pub const DRIFT: &str = "DriftHandle";
    pub const GROUND_SENSOR: &str = "GroundSensor";
    pub const GROUND_SENSOR_AXLE: &str = "GroundSensor.Axle";
    pub const WHEEL: &str = "Wheel";
    pub const BRAKE: &str = "WheelBrake";
    pub const DAMPER: &str = "WheelDamper";
    pub const STEERING: &str = "Steering";
    pub const SUSPENSION: &str = "Suspension";
    pub const DOOR_TRUNK: &str = "DoorTrunk";
}

/// Default prefix of widget shape names.
pub const DEFAULT_WIDGET_PREFIX: &str = "WGT-CarRig";

/// Driver input name used by influence drivers.
const INFLUENCE_INPUT: &str = "influence";

/// Driver input name used by rotation and steering drivers.
const ROTATION_INPUT: &str = "rotationAngle";

/// Counts reported by [`wire`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WireStats {
    pub constraints: usize,
    pub drivers: usize,
    /// Constraints or drivers dropped because a node they need is missing.
    pub skipped: usize,
}

/// Declares the full constraint and driver network on a synthesized rig.
pub fn wire(rig: &mut Rig, geometry: &VehicleGeometry, widget_prefix: &str) -> WireStats {
    let mut wiring = Wiring {
        rig,
        geometry,
        widget_prefix,
        stats: WireStats::default(),
    };

    wiring.define_properties();
    wiring.lock_helpers();
    wiring.wheels();
    wiring.axle_suspension();
    wiring.axis();
    wiring.root_and_axles();
    wiring.drift();
    wiring.suspension_handle();
    wiring.steering();
    wiring.body();
    wiring.doors();
    wiring.trunks();

    let stats = wiring.stats;
    info!(
        constraints = stats.constraints,
        drivers = stats.drivers,
        skipped = stats.skipped,
        "Wired control rig"
    );
    stats
}

/// Wiring context threaded through every step.
pub(crate) struct Wiring<'a> {
    rig: &'a mut Rig,
    geometry: &'a VehicleGeometry,
    widget_prefix: &'a str,
    stats: WireStats,
}

impl Wiring<'_> {
    fn has(&self, name: &str) -> bool {
        self.rig.has_node(name)
    }

    fn widget(&self, shape: &str) -> String {
        format!("{}.{}", self.widget_prefix, shape)
    }

    /// Applies display and lock settings to a node, if it exists.
    fn setup(&mut self, name: &str, apply: impl FnOnce(&mut Node)) -> bool {
        match self.rig.node_mut(name) {
            Some(node) => {
                apply(node);
                true
            }
            None => false,
        }
    }

    /// Sets a node's widget shape and optional display handle.
    fn display(&mut self, name: &str, shape: &str, handle: Option<&str>) {
        let widget = self.widget(shape);
        let handle = handle.filter(|h| self.rig.has_node(h)).map(str::to_string);
        self.setup(name, |node| {
            node.widget = Some(widget);
            node.display_handle = handle;
        });
    }

    fn lock(&mut self, name: &str, locks: TransformLocks) {
        self.setup(name, |node| node.locks = locks);
    }

    /// Appends a constraint, skipping it when the owner or target is missing.
    fn constrain(&mut self, owner: &str, constraint: Constraint) -> bool {
        if let Some(target) = &constraint.target {
            if !self.rig.has_node(target) {
                warn!(
                    owner,
                    constraint = %constraint.name,
                    missing = %target,
                    "Constraint target missing, skipped"
                );
                self.stats.skipped += 1;
                return false;
            }
        }
        match self.rig.node_mut(owner) {
            Some(node) => {
                debug!(owner, constraint = %constraint.name, "Adding constraint");
                node.constraints.push(constraint);
                self.stats.constraints += 1;
                true
            }
            None => {
                debug!(owner, constraint = %constraint.name, "Constraint owner missing, skipped");
                self.stats.skipped += 1;
                false
            }
        }
    }

    /// Registers a driver, skipping it when a node it touches is missing.
    fn drive(&mut self, driver: Driver) -> bool {
        let missing = driver
            .target_node()
            .into_iter()
            .chain(driver.inputs.iter().filter_map(|i| i.source.node()))
            .find(|name| !self.rig.has_node(name))
            .map(str::to_string);
        if let Some(name) = missing {
            warn!(path = %driver.target, node = %name, "Driver node missing, skipped");
            self.stats.skipped += 1;
            return false;
        }
        if let ChannelPath::Constraint { node, constraint, .. } = &driver.target {
            let declared = self
                .rig
                .node(node)
                .is_some_and(|n| n.constraint(constraint).is_some());
            if !declared {
                debug!(path = %driver.target, "Driven constraint missing, skipped");
                self.stats.skipped += 1;
                return false;
            }
        }
        self.rig.add_driver(driver);
        self.stats.drivers += 1;
        true
    }

    /// Drives a constraint's influence from a custom property, scaled by
    /// `base_influence`.
    fn drive_influence(&mut self, owner: &str, constraint: &str, property: &str, base_influence: f64) {
        self.drive(
            Driver::from_property(
                ChannelPath::constraint(owner, constraint, "influence"),
                INFLUENCE_INPUT,
                property,
            )
            .with_scale(base_influence),
        );
    }

    fn define_properties(&mut self) {
        self.rig.define_property(CustomProperty::wheels_y_rolling());
        self.rig.define_property(CustomProperty::suspension_factor());
        self.rig.define_property(CustomProperty::suspension_rolling_factor());
        if self.has(naming::STEERING) {
            self.rig.define_property(CustomProperty::steering_rotation());
        }
        for wheel in self.geometry.wheels() {
            self.rig.define_property(CustomProperty::wheel_rotation(wheel.suffix));
        }
        debug!(count = self.rig.properties.len(), "Defined rig properties");
    }

    /// Mechanism, deform and display-handle nodes take no direct edits.
    fn lock_helpers(&mut self) {
        for node in self.rig.nodes.iter_mut() {
            if is_helper(&node.name) {
                node.locks = TransformLocks::ALL;
            }
        }
    }
}

/// Whether a node is a deform, mechanism or display-handle helper.
pub fn is_helper(name: &str) -> bool {
    ["DEF_", "MCH_", "SHP_"].iter().any(|p| name.starts_with(p))
}
