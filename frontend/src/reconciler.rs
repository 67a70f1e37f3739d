//! Applies engine events to the channel model.
//!
//! Config snapshots always apply, in arrival order. Level snapshots go
//! through a drop-on-contention gate: a merge is staged while the gate is
//! held and the gate is only released once the merged arrays have been
//! committed to the model. A level snapshot that arrives while a merge is
//! still staged is discarded, never queued.

use crate::error::ReconcileError;
use crate::meter::to_meter_percent;
use crate::model::{ChannelKind, ChannelModel};
use mixdesk_types::{Channel, ConfigSnapshot, EngineEvent, LevelSample, LevelSnapshot};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Non-reentrant guard for level merges.
#[derive(Debug, Clone, Default)]
pub struct LevelGate {
    busy: Arc<AtomicBool>,
}

impl LevelGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the gate if it is free. The gate is released when the permit drops.
    pub fn try_acquire(&self) -> Option<LevelPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LevelPermit {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Proof that the holder owns the level gate.
#[derive(Debug)]
pub struct LevelPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for LevelPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// A level merge waiting to be committed.
#[derive(Debug)]
struct StagedLevels {
    inputs: Vec<Channel>,
    outputs: Vec<Channel>,
    permit: LevelPermit,
}

/// Result of applying a config snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigApplied {
    /// This was the first snapshot of the session
    pub became_ready: bool,
    /// A staged level merge was thrown away because it predates the snapshot
    pub superseded_levels: bool,
}

/// What happened to a level snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOutcome {
    /// Merged and waiting for [`Reconciler::commit`]
    Staged,
    /// Another merge was in flight
    Dropped,
    /// No config snapshot has arrived yet
    NotReady,
}

/// Outcome of [`Reconciler::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Config(ConfigApplied),
    Levels(LevelOutcome),
}

/// Running counters, shown in the status bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub configs: u64,
    pub levels_committed: u64,
    pub levels_dropped: u64,
    pub levels_rejected: u64,
}

/// Owns the channel model and is the only thing that mutates it.
#[derive(Debug, Default)]
pub struct Reconciler {
    model: ChannelModel,
    ready: bool,
    gate: LevelGate,
    staged: Option<StagedLevels>,
    stats: ReconcileStats,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> &ChannelModel {
        &self.model
    }

    /// Whether the first config snapshot has been applied.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }

    /// Whether a level merge is staged and holding the gate.
    pub fn has_pending_levels(&self) -> bool {
        self.staged.is_some()
    }

    /// Apply any engine event.
    pub fn apply(&mut self, event: EngineEvent) -> Result<Applied, ReconcileError> {
        match event {
            EngineEvent::Config(snapshot) => Ok(Applied::Config(self.on_config(snapshot))),
            EngineEvent::Levels(levels) => self.on_levels(levels).map(Applied::Levels),
        }
    }

    /// Replace the model wholesale with an authoritative snapshot.
    pub fn on_config(&mut self, snapshot: ConfigSnapshot) -> ConfigApplied {
        // Merged against the old arrays, so it must not land on top of the new ones
        let superseded_levels = self.staged.take().is_some();
        if superseded_levels {
            tracing::debug!("Discarding staged levels superseded by config snapshot");
        }

        tracing::debug!(
            "Applying config snapshot: {} inputs, {} outputs",
            snapshot.inputs.len(),
            snapshot.outputs.len()
        );
        self.model.replace(snapshot);
        self.stats.configs += 1;

        let became_ready = !self.ready;
        if became_ready {
            tracing::info!("First config snapshot applied, console ready");
            self.ready = true;
        }

        ConfigApplied {
            became_ready,
            superseded_levels,
        }
    }

    /// Stage a level merge, or drop the snapshot if one is already in flight.
    pub fn on_levels(&mut self, levels: LevelSnapshot) -> Result<LevelOutcome, ReconcileError> {
        if !self.ready {
            return Ok(LevelOutcome::NotReady);
        }

        let Some(permit) = self.gate.try_acquire() else {
            self.stats.levels_dropped += 1;
            tracing::trace!("Level merge in flight, dropping level snapshot");
            return Ok(LevelOutcome::Dropped);
        };

        // The permit is released on every early return below
        if let Err(err) = self.check_shape(&levels) {
            self.stats.levels_rejected += 1;
            return Err(err);
        }

        let inputs = with_levels(self.model.inputs(), &levels.inputs);
        let outputs = with_levels(self.model.outputs(), &levels.outputs);
        self.staged = Some(StagedLevels {
            inputs,
            outputs,
            permit,
        });

        Ok(LevelOutcome::Staged)
    }

    /// Commit a staged level merge to the model and release the gate.
    ///
    /// Returns whether anything was committed.
    pub fn commit(&mut self) -> bool {
        let Some(staged) = self.staged.take() else {
            return false;
        };

        let StagedLevels {
            inputs,
            outputs,
            permit,
        } = staged;
        self.model.commit_levels(inputs, outputs);
        self.stats.levels_committed += 1;
        drop(permit);
        true
    }

    fn check_shape(&self, levels: &LevelSnapshot) -> Result<(), ReconcileError> {
        for (kind, expected, actual) in [
            (
                ChannelKind::Input,
                self.model.inputs().len(),
                levels.inputs.len(),
            ),
            (
                ChannelKind::Output,
                self.model.outputs().len(),
                levels.outputs.len(),
            ),
        ] {
            if expected != actual {
                return Err(ReconcileError::LevelShapeMismatch {
                    kind,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// Copy channels with meter levels taken from the sample at the same position.
fn with_levels(channels: &[Channel], samples: &[LevelSample]) -> Vec<Channel> {
    channels
        .iter()
        .zip(samples)
        .map(|(channel, sample)| Channel {
            left_level: Some(to_meter_percent(sample.level_left)),
            right_level: Some(to_meter_percent(sample.level_right)),
            ..channel.clone()
        })
        .collect()
}
