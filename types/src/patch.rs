//! Partial configuration updates sent to the engine.
//!
//! Only the fields that changed are populated; the engine merges them into
//! its own state and answers with a fresh [`ConfigSnapshot`](crate::ConfigSnapshot).

use crate::channel::ChannelId;
use serde::{Deserialize, Serialize};

/// Envelope for a partial update to inputs and/or outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<ChannelPatch>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<ChannelPatch>,
}

impl ConfigPatch {
    /// Patch touching a single input.
    pub fn input(patch: ChannelPatch) -> Self {
        Self {
            inputs: vec![patch],
            outputs: Vec::new(),
        }
    }

    /// Patch touching a single output.
    pub fn output(patch: ChannelPatch) -> Self {
        Self {
            inputs: Vec::new(),
            outputs: vec![patch],
        }
    }
}

/// Changed attributes of one channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelPatch {
    pub id: ChannelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, rename = "outputs", skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RoutePatch>,
}

impl ChannelPatch {
    pub fn new(id: ChannelId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn gain(mut self, gain: f64) -> Self {
        self.gain = Some(gain);
        self
    }

    pub fn mute(mut self, mute: bool) -> Self {
        self.mute = Some(mute);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn route(mut self, output_id: ChannelId, enabled: bool) -> Self {
        self.routes.push(RoutePatch {
            id: output_id,
            enabled: Some(enabled),
        });
        self
    }
}

/// Changed routing flag of one input → output route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutePatch {
    pub id: ChannelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}
