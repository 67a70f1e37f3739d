//! Messages exchanged with the audio engine.
//!
//! Every message is a JSON object `{"type": <channel>, "data": <payload>}`.

use crate::channel::{ConfigSnapshot, LevelSnapshot};
use crate::patch::ConfigPatch;
use serde::{Deserialize, Serialize};

/// Events pushed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum EngineEvent {
    /// Full configuration, replaces everything the console knows
    Config(ConfigSnapshot),
    /// Periodic meter tick
    Levels(LevelSnapshot),
}

impl EngineEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            EngineEvent::Config(snapshot) => format!(
                "Config snapshot with {} inputs and {} outputs",
                snapshot.inputs.len(),
                snapshot.outputs.len()
            ),
            EngineEvent::Levels(levels) => format!(
                "Levels for {} inputs and {} outputs",
                levels.inputs.len(),
                levels.outputs.len()
            ),
        }
    }
}

/// Messages sent from the console to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum UiMessage {
    /// The console is up and wants a config snapshot
    Loaded,
    /// Partial configuration update
    Config(ConfigPatch),
}

impl UiMessage {
    pub fn description(&self) -> String {
        match self {
            UiMessage::Loaded => "Loaded".to_string(),
            UiMessage::Config(patch) => format!(
                "Config patch for {} inputs and {} outputs",
                patch.inputs.len(),
                patch.outputs.len()
            ),
        }
    }
}
