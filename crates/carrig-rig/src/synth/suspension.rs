//! Global suspension: pivots, axis, body carrier and suspension handle.

use carrig_spec::naming;
use carrig_spec::{Node, SceneGraph};
use glam::DVec3;

use super::{along_y, Synthesizer};
use crate::error::RigResult;

impl<S: SceneGraph + ?Sized> Synthesizer<'_, S> {
    pub(super) fn suspension(&mut self, base: &str) -> RigResult<()> {
        let geometry = self.geometry;
        let back = geometry.suspension_back_position();
        let front = geometry.suspension_front_position();

        self.add(
            Node::new(naming::MCH_SUSPENSION_B, back, along_y(back, 2.0)).with_parent(base),
        )?;

        let align = (back - front).try_normalize().unwrap_or(DVec3::Y) * 2.0;
        self.add(
            Node::new(naming::MCH_SUSPENSION_F, front, front + align).with_parent(base),
        )?;

        self.add(
            Node::new(naming::MCH_AXIS, front, back).with_parent(naming::MCH_SUSPENSION_F),
        )?;

        self.add(
            Node::new(naming::MCH_BODY, DVec3::ZERO, DVec3::Y).with_parent(naming::MCH_AXIS),
        )?;

        let root_length = self.node(naming::ROOT)?.length();
        let mut head = geometry.body_center();
        head.z = geometry.height() + geometry.width() * 0.25;
        self.add(
            Node::new(naming::SUSPENSION, head, along_y(head, root_length * 0.5))
                .with_parent(naming::MCH_AXIS),
        )
    }
}

#[cfg(test)]
mod tests {
    use carrig_spec::naming;
    use carrig_spec::MemoryScene;
    use glam::DVec3;

    use crate::detect::detect;
    use crate::synth::synthesize;
    use crate::test_support::{deform_rig, SEDAN};

    #[test]
    fn test_suspension_nodes() {
        let rig = deform_rig(SEDAN, &[]);
        let scene = MemoryScene::new();
        let geometry = detect(&rig, &scene).unwrap();
        let tree = synthesize(&rig, &geometry, &scene).unwrap();

        let front = tree.get(naming::MCH_SUSPENSION_F).unwrap();
        let back = tree.get(naming::MCH_SUSPENSION_B).unwrap();
        assert!((front.length() - 2.0).abs() < 1e-12);
        assert!((back.length() - 2.0).abs() < 1e-12);

        let axis = tree.get(naming::MCH_AXIS).unwrap();
        assert_eq!(axis.head, front.head);
        assert_eq!(axis.tail, back.head);

        let body = tree.get(naming::MCH_BODY).unwrap();
        assert_eq!(body.head, DVec3::ZERO);
        assert_eq!(body.parent.as_deref(), Some(naming::MCH_AXIS));

        let handle = tree.get(naming::SUSPENSION).unwrap();
        assert!(handle.head.z > geometry.height());
        assert_eq!(handle.parent.as_deref(), Some(naming::MCH_AXIS));
    }
}
