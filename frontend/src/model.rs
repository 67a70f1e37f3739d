//! The reconciled channel model the console renders from.

use mixdesk_types::{clamp_gain, Channel, ChannelId, ConfigSnapshot};
use std::fmt;

/// Which side of the console a channel lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Input,
    Output,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Input => write!(f, "input"),
            ChannelKind::Output => write!(f, "output"),
        }
    }
}

/// Addresses one channel. Ids are only unique within a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelKey {
    pub kind: ChannelKind,
    pub id: ChannelId,
}

impl ChannelKey {
    pub fn input(id: ChannelId) -> Self {
        Self {
            kind: ChannelKind::Input,
            id,
        }
    }

    pub fn output(id: ChannelId) -> Self {
        Self {
            kind: ChannelKind::Output,
            id,
        }
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// All inputs and outputs as last reported by the engine, plus derived levels.
///
/// Only the reconciler mutates the model; everything else reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelModel {
    inputs: Vec<Channel>,
    outputs: Vec<Channel>,
}

impl ChannelModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(&self) -> &[Channel] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Channel] {
        &self.outputs
    }

    pub fn channels(&self, kind: ChannelKind) -> &[Channel] {
        match kind {
            ChannelKind::Input => &self.inputs,
            ChannelKind::Output => &self.outputs,
        }
    }

    pub fn get(&self, key: ChannelKey) -> Option<&Channel> {
        self.channels(key.kind).iter().find(|c| c.id == key.id)
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }

    /// Replace both channel arrays with a snapshot.
    ///
    /// Nothing from the previous arrays survives, including levels. Gains are
    /// clamped on the way in so the model never holds an out-of-range value.
    pub(crate) fn replace(&mut self, snapshot: ConfigSnapshot) {
        let ConfigSnapshot {
            mut inputs,
            mut outputs,
        } = snapshot;
        for channel in inputs.iter_mut().chain(outputs.iter_mut()) {
            channel.gain = clamp_gain(channel.gain);
            channel.left_level = None;
            channel.right_level = None;
        }
        self.inputs = inputs;
        self.outputs = outputs;
    }

    /// Swap in channel arrays produced by a level merge.
    pub(crate) fn commit_levels(&mut self, inputs: Vec<Channel>, outputs: Vec<Channel>) {
        self.inputs = inputs;
        self.outputs = outputs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: ChannelId, label: &str, gain: f64) -> Channel {
        Channel {
            id,
            label: label.to_string(),
            gain,
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_empty() {
        let model = ChannelModel::new();
        assert!(model.is_empty());
        assert!(model.inputs().is_empty());
        assert!(model.outputs().is_empty());
    }

    #[test]
    fn test_replace_clamps_gain() {
        let mut model = ChannelModel::new();
        model.replace(ConfigSnapshot {
            inputs: vec![channel(0, "Hot", 40.0), channel(1, "Cold", -90.0)],
            outputs: vec![channel(0, "Main", f64::NAN)],
        });

        assert_eq!(model.inputs()[0].gain, 12.0);
        assert_eq!(model.inputs()[1].gain, -60.0);
        assert_eq!(model.outputs()[0].gain, 0.0);
    }

    #[test]
    fn test_get_by_key_respects_kind() {
        let mut model = ChannelModel::new();
        model.replace(ConfigSnapshot {
            inputs: vec![channel(0, "Mic", 0.0)],
            outputs: vec![channel(0, "Main", -3.0)],
        });

        assert_eq!(
            model.get(ChannelKey::input(0)).map(|c| c.label.as_str()),
            Some("Mic")
        );
        assert_eq!(
            model.get(ChannelKey::output(0)).map(|c| c.label.as_str()),
            Some("Main")
        );
        assert!(model.get(ChannelKey::output(5)).is_none());
    }

    #[test]
    fn test_replace_drops_stale_levels() {
        let mut model = ChannelModel::new();
        let mut metered = channel(0, "Mic", 0.0);
        metered.left_level = Some(50.0);
        metered.right_level = Some(40.0);
        model.commit_levels(vec![metered], Vec::new());

        // A snapshot never carries levels, even if a caller sets them
        let mut incoming = channel(0, "Mic", 0.0);
        incoming.left_level = Some(99.0);
        model.replace(ConfigSnapshot {
            inputs: vec![incoming],
            outputs: Vec::new(),
        });

        assert_eq!(model.inputs()[0].left_level, None);
        assert_eq!(model.inputs()[0].right_level, None);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(ChannelKey::input(3).to_string(), "input 3");
        assert_eq!(ChannelKey::output(1).to_string(), "output 1");
    }
}
