//! Shared types for the mixdesk channel strip console.
//!
//! This crate contains the wire format exchanged with the audio engine
//! and the domain limits both sides agree on.

pub mod channel;
pub mod events;
pub mod mixer;
pub mod patch;

// Re-export commonly used types
pub use channel::{Channel, ChannelId, ConfigSnapshot, LevelSample, LevelSnapshot, Route};
pub use events::{EngineEvent, UiMessage};
pub use mixer::clamp_gain;
pub use patch::{ChannelPatch, ConfigPatch, RoutePatch};
