//! Scoped capture and restoration of the host's edit context.
//!
//! A bake changes the selection, the mode, the tweak flag and the pose basis
//! of the nodes it samples. [`ContextGuard`] records all of it before the
//! first change and puts it back when the guard is restored or dropped, on
//! every exit path.

use std::ops::{Deref, DerefMut};

use carrig_spec::Transform;
use tracing::{debug, warn};

use crate::error::BakeResult;
use crate::host::{BakeHost, EditMode};

/// State recorded before a bake touches the host.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedContext {
    pub mode: EditMode,
    pub selection: Vec<String>,
    pub tweak_mode: bool,
    /// Pose basis of every node the bake may modify.
    pub bases: Vec<(String, Transform)>,
}

/// Borrow of the host that restores the captured context when released.
pub struct ContextGuard<'h, H: BakeHost + ?Sized> {
    host: &'h mut H,
    captured: Option<CapturedContext>,
}

impl<'h, H: BakeHost + ?Sized> ContextGuard<'h, H> {
    /// Records the context of `host`, including the pose basis of `nodes`.
    pub fn capture(host: &'h mut H, nodes: &[String]) -> Self {
        let captured = CapturedContext {
            mode: host.mode(),
            selection: host.selection(),
            tweak_mode: host.tweak_mode(),
            bases: nodes
                .iter()
                .map(|n| (n.clone(), host.pose_basis(n)))
                .collect(),
        };
        debug!(
            nodes = captured.bases.len(),
            selected = captured.selection.len(),
            mode = ?captured.mode,
            "Captured edit context"
        );
        Self {
            host,
            captured: Some(captured),
        }
    }

    pub fn captured(&self) -> Option<&CapturedContext> {
        self.captured.as_ref()
    }

    /// Leaves tweak mode, enters pose mode and selects only `nodes`.
    pub fn isolate(&mut self, nodes: &[String]) -> BakeResult<()> {
        self.host.set_tweak_mode(false);
        self.host.set_mode(EditMode::Pose);
        self.host.select(nodes)
    }

    /// Resets the pose basis of `nodes` to identity.
    pub fn reset_to_rest(&mut self, nodes: &[String]) -> BakeResult<()> {
        for node in nodes {
            self.host.set_pose_basis(node, Transform::IDENTITY)?;
        }
        Ok(())
    }

    /// Restores the captured context.
    ///
    /// Returns one message per part that could not be restored; the
    /// remaining parts are still restored.
    pub fn restore(mut self) -> Vec<String> {
        self.restore_captured()
    }

    fn restore_captured(&mut self) -> Vec<String> {
        let Some(captured) = self.captured.take() else {
            return Vec::new();
        };
        let mut failures = Vec::new();

        for (node, basis) in &captured.bases {
            if let Err(err) = self.host.set_pose_basis(node, *basis) {
                failures.push(format!("Could not restore the pose of {}: {}", node, err));
            }
        }
        if let Err(err) = self.host.select(&captured.selection) {
            failures.push(format!("Could not restore the selection: {}", err));
        }
        self.host.set_mode(captured.mode);
        self.host.set_tweak_mode(captured.tweak_mode);

        debug!(failures = failures.len(), "Restored edit context");
        failures
    }
}

impl<H: BakeHost + ?Sized> Deref for ContextGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: BakeHost + ?Sized> DerefMut for ContextGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: BakeHost + ?Sized> Drop for ContextGuard<'_, H> {
    fn drop(&mut self) {
        for failure in self.restore_captured() {
            warn!("{}", failure);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::EditContext;
    use crate::memory::MemoryHost;
    use carrig_spec::{MemoryScene, Node, Rig};
    use glam::DVec3;
    use pretty_assertions::assert_eq;

    fn host() -> MemoryHost {
        let mut rig = Rig::new("Car");
        rig.add_node(Node::new("Root", DVec3::ZERO, DVec3::Y)).unwrap();
        rig.add_node(Node::new("Wheel_FL_0", DVec3::X, DVec3::ONE)).unwrap();
        let mut host = MemoryHost::new(rig, MemoryScene::new());
        host.selection = vec!["Root".to_string()];
        host.tweak_mode = true;
        host.set_pose_basis("Wheel_FL_0", Transform::from_location(DVec3::Z))
            .unwrap();
        host
    }

    #[test]
    fn test_restore_after_changes() {
        let mut host = host();
        let before = host.clone();
        let nodes = vec!["Wheel_FL_0".to_string()];

        let mut guard = ContextGuard::capture(&mut host, &nodes);
        guard.isolate(&nodes).unwrap();
        guard.reset_to_rest(&nodes).unwrap();
        assert_eq!(guard.mode(), EditMode::Pose);
        assert!(!guard.tweak_mode());
        assert_eq!(guard.pose_basis("Wheel_FL_0"), Transform::IDENTITY);
        assert!(guard.restore().is_empty());

        assert_eq!(host, before);
    }

    #[test]
    fn test_drop_restores() {
        let mut host = host();
        let before = host.clone();
        let nodes = vec!["Wheel_FL_0".to_string()];
        {
            let mut guard = ContextGuard::capture(&mut host, &nodes);
            guard.isolate(&nodes).unwrap();
            guard.reset_to_rest(&nodes).unwrap();
        }
        assert_eq!(host, before);
    }

    #[test]
    fn test_restore_reports_failures() {
        let mut host = host();
        let nodes = vec!["Wheel_FL_0".to_string()];
        let mut guard = ContextGuard::capture(&mut host, &nodes);
        guard.rig_mut().nodes = Default::default();
        let failures = guard.restore();
        assert_eq!(failures.len(), 2);
        assert!(host.tweak_mode);
    }
}
