//! Channel records and the snapshots the engine pushes.

use crate::mixer::UNNAMED_LABEL;
use serde::{Deserialize, Deserializer, Serialize};

/// Engine-assigned channel identifier, unique within inputs or within outputs.
pub type ChannelId = u32;

/// An input or output channel as described by the engine.
///
/// Fields missing from a snapshot, or sent as `null`, take their defaults.
/// The level fields are never part of the wire format; they are derived
/// locally from level snapshots and stay `None` until the first one arrives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: ChannelId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    /// Gain in dB
    #[serde(default, deserialize_with = "null_as_default")]
    pub gain: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mute: bool,
    /// Per-output routing (inputs only)
    #[serde(
        default,
        rename = "outputs",
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub routes: Vec<Route>,
    /// Left meter position in percent (0-100)
    #[serde(skip)]
    pub left_level: Option<f64>,
    /// Right meter position in percent (0-100)
    #[serde(skip)]
    pub right_level: Option<f64>,
}

impl Channel {
    /// Label to show, falling back to "Unnamed" for an empty label.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            UNNAMED_LABEL
        } else {
            &self.label
        }
    }

    /// Look up the route to a given output.
    pub fn route(&self, output_id: ChannelId) -> Option<&Route> {
        self.routes.iter().find(|r| r.id == output_id)
    }
}

/// Whether an input feeds a particular output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Id of the output this route points at
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: ChannelId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
}

/// Full, authoritative configuration pushed by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub inputs: Vec<Channel>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub outputs: Vec<Channel>,
}

/// Raw linear peak amplitude for one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSample {
    #[serde(default, deserialize_with = "null_as_default")]
    pub level_left: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub level_right: f64,
}

impl LevelSample {
    pub fn new(level_left: f64, level_right: f64) -> Self {
        Self {
            level_left,
            level_right,
        }
    }
}

/// One metering tick, positionally aligned with the last config snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub inputs: Vec<LevelSample>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub outputs: Vec<LevelSample>,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
