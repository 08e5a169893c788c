//! Transient per-frame samples of evaluated local transforms.

use std::collections::BTreeMap;

use carrig_spec::Transform;
use glam::{DQuat, DVec3};
use tracing::debug;

use crate::error::{BakeError, BakeResult};
use crate::host::PoseEvaluator;

/// Evaluated local transforms of a set of nodes over `[start, end]`.
///
/// Lives only for the duration of one bake and is dropped after derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct BakedAction {
    start: i32,
    tracks: BTreeMap<String, Vec<Transform>>,
}

impl BakedAction {
    /// Evaluates every node at every frame of `[start, end]`.
    pub fn sample<H: PoseEvaluator + ?Sized>(
        host: &H,
        nodes: &[String],
        start: i32,
        end: i32,
    ) -> BakeResult<Self> {
        let mut tracks = BTreeMap::new();
        for node in nodes {
            let track = (start..=end)
                .map(|frame| host.evaluate_local(node, frame))
                .collect::<BakeResult<Vec<_>>>()?;
            tracks.insert(node.clone(), track);
        }
        debug!(nodes = nodes.len(), start, end, "Sampled local transforms");
        Ok(Self { start, tracks })
    }

    pub fn frame_start(&self) -> i32 {
        self.start
    }

    /// Number of sampled frames.
    pub fn len(&self) -> usize {
        self.tracks.values().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn track(&self, node: &str) -> Option<&[Transform]> {
        self.tracks.get(node).map(Vec::as_slice)
    }

    /// The samples of `node`, failing when there are none.
    pub fn require(&self, node: &str) -> BakeResult<&[Transform]> {
        match self.track(node) {
            Some(track) if !track.is_empty() => Ok(track),
            _ => Err(BakeError::empty_samples(node)),
        }
    }

    pub fn locations(&self, node: &str) -> BakeResult<Vec<DVec3>> {
        Ok(self.require(node)?.iter().map(|t| t.location).collect())
    }

    pub fn rotations(&self, node: &str) -> BakeResult<Vec<DQuat>> {
        Ok(self.require(node)?.iter().map(|t| t.rotation).collect())
    }

    pub fn scales(&self, node: &str) -> BakeResult<Vec<DVec3>> {
        Ok(self.require(node)?.iter().map(|t| t.scale).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Linear;

    impl PoseEvaluator for Linear {
        fn evaluate_local(&self, node: &str, frame: i32) -> BakeResult<Transform> {
            match node {
                "Root" => Ok(Transform::from_location(DVec3::new(0.0, -(frame as f64), 0.0))),
                _ => Err(BakeError::missing_node(node)),
            }
        }
    }

    #[test]
    fn test_sample_range_inclusive() {
        let baked = BakedAction::sample(&Linear, &["Root".to_string()], 3, 7).unwrap();
        assert_eq!(baked.len(), 5);
        assert_eq!(baked.frame_start(), 3);
        let locations = baked.locations("Root").unwrap();
        assert_eq!(locations[0], DVec3::new(0.0, -3.0, 0.0));
        assert_eq!(locations[4], DVec3::new(0.0, -7.0, 0.0));
    }

    #[test]
    fn test_missing_track_is_empty_samples() {
        let baked = BakedAction::sample(&Linear, &[], 1, 10).unwrap();
        assert!(baked.is_empty());
        assert!(matches!(
            baked.require("Root"),
            Err(BakeError::EmptySamples { .. })
        ));
        assert!(BakedAction::sample(&Linear, &["Wheel_FL_0".to_string()], 1, 2).is_err());
    }
}
