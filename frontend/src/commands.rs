//! Turns user gestures into outbound partial updates.
//!
//! Every gesture produces exactly one message, sent immediately. Nothing is
//! batched, throttled or acknowledged; the next config snapshot from the
//! engine is the only confirmation that a change took effect.

use crate::error::LinkError;
use crate::model::{ChannelKey, ChannelKind};
use mixdesk_types::mixer::{DEFAULT_GAIN, WHEEL_STEP_DB};
use mixdesk_types::{clamp_gain, ChannelId, ChannelPatch, ConfigPatch, UiMessage};
use tokio::sync::mpsc::UnboundedSender;

/// Direction of a mouse wheel tick over a gain control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    Up,
    Down,
}

impl WheelDirection {
    /// Interpret a vertical scroll delta. Positive means the wheel moved up.
    pub fn from_scroll_delta(delta_y: f32) -> Option<Self> {
        if delta_y > 0.0 {
            Some(WheelDirection::Up)
        } else if delta_y < 0.0 {
            Some(WheelDirection::Down)
        } else {
            None
        }
    }

    fn step(self) -> f64 {
        match self {
            WheelDirection::Up => WHEEL_STEP_DB,
            WheelDirection::Down => -WHEEL_STEP_DB,
        }
    }
}

/// Gain requested by a wheel tick, clamped.
pub fn nudged_gain(current: f64, direction: WheelDirection) -> f64 {
    clamp_gain(current + direction.step())
}

/// Sends one partial update per gesture to the engine link.
#[derive(Debug, Clone)]
pub struct CommandEmitter {
    tx: UnboundedSender<UiMessage>,
}

impl CommandEmitter {
    pub fn new(tx: UnboundedSender<UiMessage>) -> Self {
        Self { tx }
    }

    /// Tell the engine the console is up.
    pub fn loaded(&self) {
        self.send(UiMessage::Loaded);
    }

    /// Set gain from a slider drag or a typed value.
    pub fn set_gain(&self, key: ChannelKey, gain: f64) {
        let gain = clamp_gain(gain);
        self.send_patch(key.kind, ChannelPatch::new(key.id).gain(gain));
    }

    /// Move gain one wheel step from its current value.
    pub fn nudge_gain(&self, key: ChannelKey, current: f64, direction: WheelDirection) {
        let gain = nudged_gain(current, direction);
        self.send_patch(key.kind, ChannelPatch::new(key.id).gain(gain));
    }

    /// Reset gain to unity.
    pub fn reset_gain(&self, key: ChannelKey) {
        self.send_patch(key.kind, ChannelPatch::new(key.id).gain(DEFAULT_GAIN));
    }

    pub fn toggle_mute(&self, key: ChannelKey, currently_muted: bool) {
        self.send_patch(key.kind, ChannelPatch::new(key.id).mute(!currently_muted));
    }

    /// Flip one input → output route.
    pub fn toggle_route(&self, input_id: ChannelId, output_id: ChannelId, currently_enabled: bool) {
        self.send_patch(
            ChannelKind::Input,
            ChannelPatch::new(input_id).route(output_id, !currently_enabled),
        );
    }

    /// Send a confirmed label edit.
    pub fn commit_label(&self, key: ChannelKey, label: impl Into<String>) {
        self.send_patch(key.kind, ChannelPatch::new(key.id).label(label));
    }

    fn send_patch(&self, kind: ChannelKind, patch: ChannelPatch) {
        let patch = match kind {
            ChannelKind::Input => ConfigPatch::input(patch),
            ChannelKind::Output => ConfigPatch::output(patch),
        };
        self.send(UiMessage::Config(patch));
    }

    fn send(&self, message: UiMessage) {
        if let Err(e) = self.dispatch(message) {
            tracing::warn!("Dropping command: {}", e);
        }
    }

    fn dispatch(&self, message: UiMessage) -> Result<(), LinkError> {
        tracing::debug!("Sending command: {}", message.description());
        self.tx.send(message).map_err(|_| LinkError::QueueClosed)
    }
}
