//! The animation container: named curves keyed by channel path.

use carrig_spec::{ChannelPath, Curve, Keyframe};
use serde::{Deserialize, Serialize};

/// An animation container holding at most one curve per channel path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub curves: Vec<Curve>,
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            curves: Vec::new(),
        }
    }

    pub fn curve(&self, path: &ChannelPath) -> Option<&Curve> {
        self.curves.iter().find(|c| &c.path == path)
    }

    pub fn curve_mut(&mut self, path: &ChannelPath) -> Option<&mut Curve> {
        self.curves.iter_mut().find(|c| &c.path == path)
    }

    /// Stores a curve, replacing any curve on the same path.
    pub fn set_curve(&mut self, curve: Curve) {
        match self.curve_mut(&curve.path) {
            Some(existing) => *existing = curve,
            None => self.curves.push(curve),
        }
    }

    /// Removes the curve on `path`. Returns true if one was removed.
    pub fn remove_curve(&mut self, path: &ChannelPath) -> bool {
        let before = self.curves.len();
        self.curves.retain(|c| &c.path != path);
        before != self.curves.len()
    }

    /// Inserts a key, creating the curve when needed.
    pub fn insert_keyframe(&mut self, path: &ChannelPath, key: Keyframe) {
        match self.curve_mut(path) {
            Some(curve) => curve.insert(key),
            None => self.curves.push(Curve::from_keyframes(path.clone(), [key])),
        }
    }

    /// Value of the curve on `path` at `frame`.
    pub fn evaluate(&self, path: &ChannelPath, frame: f64) -> Option<f64> {
        self.curve(path)?.evaluate(frame)
    }

    /// Union of the keyed ranges of every curve.
    pub fn frame_range(&self) -> Option<(i32, i32)> {
        self.curves
            .iter()
            .filter_map(Curve::frame_range)
            .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)))
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}
