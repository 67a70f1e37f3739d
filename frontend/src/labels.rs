//! In-progress label edits.
//!
//! Drafts are kept outside the channel model so a config snapshot arriving
//! mid-edit does not wipe what the user is typing.

use std::collections::HashMap;

use crate::model::{ChannelKey, ChannelModel};

#[derive(Debug, Clone)]
struct Draft {
    text: String,
    needs_focus: bool,
}

/// Label drafts keyed by channel.
#[derive(Debug, Clone, Default)]
pub struct LabelDrafts {
    drafts: HashMap<ChannelKey, Draft>,
}

impl LabelDrafts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing, seeded with the channel's current label.
    /// Does nothing if an edit is already open for this channel.
    pub fn begin(&mut self, key: ChannelKey, current: &str) {
        self.drafts.entry(key).or_insert_with(|| Draft {
            text: current.to_string(),
            needs_focus: true,
        });
    }

    pub fn is_editing(&self, key: ChannelKey) -> bool {
        self.drafts.contains_key(&key)
    }

    pub fn text_mut(&mut self, key: ChannelKey) -> Option<&mut String> {
        self.drafts.get_mut(&key).map(|d| &mut d.text)
    }

    /// True exactly once after [`begin`](Self::begin), so the text field can grab focus.
    pub fn take_focus_request(&mut self, key: ChannelKey) -> bool {
        self.drafts
            .get_mut(&key)
            .map(|d| std::mem::take(&mut d.needs_focus))
            .unwrap_or(false)
    }

    /// Close the edit and hand back the text to send.
    pub fn confirm(&mut self, key: ChannelKey) -> Option<String> {
        self.drafts.remove(&key).map(|d| d.text)
    }

    /// Close the edit without sending anything.
    pub fn cancel(&mut self, key: ChannelKey) {
        self.drafts.remove(&key);
    }

    /// Drop drafts for channels the model no longer has.
    pub fn retain_channels(&mut self, model: &ChannelModel) {
        self.drafts.retain(|key, _| model.get(*key).is_some());
    }
}
