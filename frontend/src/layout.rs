//! Gain slider geometry.
//!
//! The gain sliders are drawn rotated, so their control size is the
//! measured container size with width and height swapped. Measurement runs
//! a short while after each config snapshot, once the strips have been laid
//! out, and again shortly after the window is resized.
//!
//! Containers are recorded with the space they were allotted, not the space
//! their contents ended up taking, so a slider left over from a larger window
//! cannot hold its container open.

use egui::{Rect, Vec2};
use instant::Instant;
use std::time::Duration;

use crate::model::ChannelKind;

/// Size of a rotated slider control.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SliderSize {
    pub width: f32,
    pub height: f32,
}

impl SliderSize {
    /// Swap the container's dimensions for a slider turned on its side.
    pub fn from_container(container: Vec2) -> Self {
        Self {
            width: container.y,
            height: container.x,
        }
    }

    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Allotted rect of the designated gain container per section, as laid
/// out in the most recent frame.
///
/// `None` means the container has not been rendered (no channels, or the
/// first frame has not run yet).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GainContainers {
    pub inputs: Option<Rect>,
    pub outputs: Option<Rect>,
}

impl GainContainers {
    pub fn record(&mut self, kind: ChannelKind, rect: Rect) {
        match kind {
            ChannelKind::Input => self.inputs = Some(rect),
            ChannelKind::Output => self.outputs = Some(rect),
        }
    }

    pub fn get(&self, kind: ChannelKind) -> Option<Rect> {
        match kind {
            ChannelKind::Input => self.inputs,
            ChannelKind::Output => self.outputs,
        }
    }
}

/// Schedules and applies slider measurements.
#[derive(Debug, Clone)]
pub struct LayoutProbe {
    settle: Duration,
    /// When the pending measurement was requested, and when it falls due
    due: Option<(Instant, Instant)>,
    viewport: Option<Vec2>,
    inputs: SliderSize,
    outputs: SliderSize,
}

impl LayoutProbe {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            due: None,
            viewport: None,
            inputs: SliderSize::default(),
            outputs: SliderSize::default(),
        }
    }

    /// Measure once the settle delay has passed. Replaces any pending measurement.
    pub fn schedule(&mut self, now: Instant) {
        self.due = Some((now, now + self.settle));
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// Time left until the pending measurement, if any.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.due.map(|(_, due)| due.saturating_duration_since(now))
    }

    /// Track the window size; a change schedules a re-measure.
    ///
    /// Returns whether a resize was detected.
    pub fn observe_viewport(&mut self, size: Vec2, now: Instant) -> bool {
        let resized = self.viewport.is_some_and(|previous| previous != size);
        self.viewport = Some(size);
        if resized {
            tracing::trace!("Window resized to {:?}, re-measuring sliders", size);
            self.schedule(now);
        }
        resized
    }

    /// Run the pending measurement if it is due.
    ///
    /// `containers` come from the previous frame, so a measurement never
    /// runs in the frame that requested it. A section whose container is
    /// missing keeps its previous size. Returns whether a measurement ran.
    pub fn poll(&mut self, now: Instant, containers: GainContainers) -> bool {
        match self.due {
            Some((requested, due)) if now >= due && now > requested => {}
            _ => return false,
        }
        self.due = None;

        if let Some(rect) = containers.inputs {
            self.inputs = SliderSize::from_container(rect.size());
        }
        if let Some(rect) = containers.outputs {
            self.outputs = SliderSize::from_container(rect.size());
        }
        tracing::trace!(
            "Measured sliders: inputs {:?}, outputs {:?}",
            self.inputs,
            self.outputs
        );
        true
    }

    pub fn slider_size(&self, kind: ChannelKind) -> SliderSize {
        match kind {
            ChannelKind::Input => self.inputs,
            ChannelKind::Output => self.outputs,
        }
    }
}
