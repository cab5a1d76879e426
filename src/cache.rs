use std::collections::HashMap;

use regex::Regex;
use tracing::debug;

use crate::identifier::Identifier;

/// Marker that opens a CTCP ACTION ("/me") line
pub const ACTION_MARKER: &str = "\x01ACTION";

/// Last eligible line each participant said, per channel.
#[derive(Debug)]
pub struct LineCache {
    channels: HashMap<Identifier, HashMap<Identifier, String>>,
    command_prefix: Regex,
}

impl LineCache {
    /// `command_prefix` is matched at the start of each line; lines it
    /// matches are never cached.
    pub fn new(command_prefix: Regex) -> Self {
        Self {
            channels: HashMap::new(),
            command_prefix,
        }
    }

    /// Whether a line may be cached at all
    pub fn is_cacheable(&self, text: &str) -> bool {
        if text.starts_with(ACTION_MARKER) {
            return false;
        }
        !self
            .command_prefix
            .find(text)
            .is_some_and(|m| m.start() == 0)
    }

    /// Remember `text` as the latest line from `participant` in `channel`.
    pub fn record(&mut self, channel: &Identifier, participant: &Identifier, text: &str) {
        let cacheable = self.is_cacheable(text);
        let entry = self.channels.entry(channel.clone()).or_default();
        if !cacheable {
            return;
        }
        entry.insert(participant.clone(), text.to_string());
        debug!("Cached line for {} in {}", participant, channel);
    }

    pub fn lookup(&self, channel: &Identifier, participant: &Identifier) -> Option<&str> {
        self.channels
            .get(channel)
            .and_then(|lines| lines.get(participant))
            .map(String::as_str)
            .filter(|line| !line.is_empty())
    }

    /// Drop everything cached for a channel (the bot left it).
    pub fn evict_channel(&mut self, channel: &Identifier) {
        if let Some(lines) = self.channels.remove(channel) {
            debug!("Evicted {} cached line(s) for {}", lines.len(), channel);
        }
    }

    pub fn evict_participant_in_channel(&mut self, channel: &Identifier, participant: &Identifier) {
        if let Some(lines) = self.channels.get_mut(channel) {
            if lines.remove(participant).is_some() {
                debug!("Evicted {} from {}", participant, channel);
            }
        }
    }

    /// Drop a participant's lines from every channel (they disconnected).
    pub fn evict_participant_everywhere(&mut self, participant: &Identifier) {
        let removed = self
            .channels
            .values_mut()
            .filter_map(|lines| lines.remove(participant))
            .count();
        if removed > 0 {
            debug!("Evicted {} from {} channel(s)", participant, removed);
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn line_count(&self) -> usize {
        self.channels.values().map(HashMap::len).sum()
    }

    pub fn clear(&mut self) {
        self.channels.clear();
    }
}
