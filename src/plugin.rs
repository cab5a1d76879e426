use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use regex::Regex;
use tracing::{debug, info};

use crate::cache::LineCache;
use crate::command::{self, parse_invocation};
use crate::config::Config;
use crate::events::{ChatEvent, EventKind, EventTable, Reply};
use crate::identifier::Identifier;
use crate::mock::DiversityBias;

/// State shared by the mocking handlers
pub struct SpongeMock {
    cache: LineCache,
    bot_nick: Identifier,
    bias: DiversityBias,
    prefix: Regex,
    rng: StdRng,
}

impl SpongeMock {
    pub fn new(bot_nick: Identifier, prefix: Regex, bias: DiversityBias, rng: StdRng) -> Self {
        Self {
            cache: LineCache::new(prefix.clone()),
            bot_nick,
            bias,
            prefix,
            rng,
        }
    }

    pub fn bot_nick(&self) -> &Identifier {
        &self.bot_nick
    }

    pub fn cache(&self) -> &LineCache {
        &self.cache
    }

    fn is_me(&self, nick: &Identifier) -> bool {
        *nick == self.bot_nick
    }
}

/// The mocking plugin: its state plus the handlers that drive it.
pub struct Plugin {
    state: SpongeMock,
    table: EventTable<SpongeMock>,
}

impl Plugin {
    pub fn setup(config: &Config, bot_nick: Identifier) -> Result<Self> {
        let bias = config.spongemock.bias()?;
        let prefix = config.core.prefix_regex()?;
        let rng = match config.spongemock.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            "SpongeMock ready as {} (diversity_bias = {})",
            bot_nick,
            bias.value()
        );
        Ok(Self::with_state(SpongeMock::new(bot_nick, prefix, bias, rng)))
    }

    pub fn with_state(state: SpongeMock) -> Self {
        let table = event_table();
        debug!(
            "{} message handler(s) registered",
            table.handler_count(EventKind::Message)
        );
        Self { state, table }
    }

    pub fn handle(&mut self, event: &ChatEvent) -> Vec<Reply> {
        self.table.dispatch(&mut self.state, event)
    }

    pub fn state(&self) -> &SpongeMock {
        &self.state
    }

    /// Drop everything cached; the plugin should not be used afterwards.
    pub fn shutdown(&mut self) {
        let cache = &mut self.state.cache;
        info!(
            "SpongeMock shutting down, dropping {} line(s) across {} channel(s)",
            cache.line_count(),
            cache.channel_count()
        );
        cache.clear();
    }
}

/// Handlers in priority order: the command runs before line caching.
pub fn event_table() -> EventTable<SpongeMock> {
    let mut table = EventTable::new();
    table.register(EventKind::Message, "spongemock", spongemock);
    table.register(EventKind::Message, "cache_lines", cache_lines);
    table.register(EventKind::Part, "part_prune", part_prune);
    table.register(EventKind::Quit, "quit_prune", quit_prune);
    table.register(EventKind::Kick, "kick_prune", kick_prune);
    table
}

fn spongemock(state: &mut SpongeMock, event: &ChatEvent) -> Option<Reply> {
    let ChatEvent::Message {
        channel,
        nick,
        text,
        ..
    } = event
    else {
        return None;
    };
    // The bot's own lines are only ever cached
    if state.is_me(nick) {
        return None;
    }
    let invocation = parse_invocation(&state.prefix, text)?;
    debug!("{} invoked spongemock in {}", nick, channel);

    let target = command::resolve(&invocation, &state.cache, channel);
    Some(command::respond(target, nick, state.bias, &mut state.rng))
}

fn cache_lines(state: &mut SpongeMock, event: &ChatEvent) -> Option<Reply> {
    if let ChatEvent::Message {
        channel,
        nick,
        text,
        private: false,
    } = event
    {
        state.cache.record(channel, nick, text);
    }
    None
}

fn part_prune(state: &mut SpongeMock, event: &ChatEvent) -> Option<Reply> {
    if let ChatEvent::Part { channel, nick } = event {
        prune_departure(state, channel, nick);
    }
    None
}

fn kick_prune(state: &mut SpongeMock, event: &ChatEvent) -> Option<Reply> {
    if let ChatEvent::Kick { channel, nick } = event {
        prune_departure(state, channel, nick);
    }
    None
}

fn quit_prune(state: &mut SpongeMock, event: &ChatEvent) -> Option<Reply> {
    if let ChatEvent::Quit { nick } = event {
        state.cache.evict_participant_everywhere(nick);
    }
    None
}

fn prune_departure(state: &mut SpongeMock, channel: &Identifier, nick: &Identifier) {
    if state.is_me(nick) {
        info!("No longer in {}, dropping its cached lines", channel);
        state.cache.evict_channel(channel);
    } else {
        state.cache.evict_participant_in_channel(channel, nick);
    }
}
