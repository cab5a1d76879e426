use std::collections::HashMap;

use tracing::debug;

use crate::identifier::Identifier;

/// Something that happened in a chat the bot can see.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A text line; `private` is set for one-to-one chats
    Message {
        channel: Identifier,
        nick: Identifier,
        text: String,
        private: bool,
    },
    /// `nick` left `channel` (possibly the bot itself)
    Part { channel: Identifier, nick: Identifier },
    /// `nick` is gone from every channel
    Quit { nick: Identifier },
    /// `nick` was removed from `channel` (possibly the bot itself)
    Kick { channel: Identifier, nick: Identifier },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Message,
    Part,
    Quit,
    Kick,
}

impl ChatEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ChatEvent::Message { .. } => EventKind::Message,
            ChatEvent::Part { .. } => EventKind::Part,
            ChatEvent::Quit { .. } => EventKind::Quit,
            ChatEvent::Kick { .. } => EventKind::Kick,
        }
    }

    /// The channel the event happened in, if it is tied to one
    pub fn channel(&self) -> Option<&Identifier> {
        match self {
            ChatEvent::Message { channel, .. }
            | ChatEvent::Part { channel, .. }
            | ChatEvent::Kick { channel, .. } => Some(channel),
            ChatEvent::Quit { .. } => None,
        }
    }
}

/// Text to send back to the channel an event came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain message to the channel
    Say(String),
    /// Message addressed to the participant who triggered the event
    ReplyTo { nick: String, text: String },
}

impl Reply {
    /// Render as a single line of chat text
    pub fn render(&self) -> String {
        match self {
            Reply::Say(text) => text.clone(),
            Reply::ReplyTo { nick, text } => format!("{}: {}", nick, text),
        }
    }
}

pub type Handler<S> = fn(&mut S, &ChatEvent) -> Option<Reply>;

/// Handlers registered per event kind, run in registration order.
pub struct EventTable<S> {
    handlers: HashMap<EventKind, Vec<(&'static str, Handler<S>)>>,
}

impl<S> EventTable<S> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, kind: EventKind, name: &'static str, handler: Handler<S>) {
        debug!("Registered handler '{}' for {:?}", name, kind);
        self.handlers.entry(kind).or_default().push((name, handler));
    }

    pub fn dispatch(&self, state: &mut S, event: &ChatEvent) -> Vec<Reply> {
        let Some(handlers) = self.handlers.get(&event.kind()) else {
            return Vec::new();
        };
        let mut replies = Vec::new();
        for (name, handler) in handlers {
            if let Some(reply) = handler(state, event) {
                debug!("Handler '{}' replied", name);
                replies.push(reply);
            }
        }
        replies
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }
}

impl<S> Default for EventTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_a(log: &mut Vec<&'static str>, _: &ChatEvent) -> Option<Reply> {
        log.push("a");
        None
    }

    fn push_b(log: &mut Vec<&'static str>, _: &ChatEvent) -> Option<Reply> {
        log.push("b");
        Some(Reply::Say("b".to_string()))
    }

    fn quit() -> ChatEvent {
        ChatEvent::Quit {
            nick: Identifier::new("alice"),
        }
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let mut table: EventTable<Vec<&'static str>> = EventTable::new();
        table.register(EventKind::Quit, "a", push_a);
        table.register(EventKind::Quit, "b", push_b);

        let mut log = Vec::new();
        let replies = table.dispatch(&mut log, &quit());
        assert_eq!(log, vec!["a", "b"]);
        assert_eq!(replies, vec![Reply::Say("b".to_string())]);
    }

    #[test]
    fn test_dispatch_only_matching_kind() {
        let mut table: EventTable<Vec<&'static str>> = EventTable::new();
        table.register(EventKind::Part, "a", push_a);

        let mut log = Vec::new();
        assert!(table.dispatch(&mut log, &quit()).is_empty());
        assert!(log.is_empty());
        assert_eq!(table.handler_count(EventKind::Part), 1);
        assert_eq!(table.handler_count(EventKind::Quit), 0);
    }

    #[test]
    fn test_reply_to_renders_with_nick() {
        let reply = Reply::ReplyTo {
            nick: "alice".to_string(),
            text: "hi".to_string(),
        };
        assert_eq!(reply.render(), "alice: hi");
    }

    #[test]
    fn test_quit_has_no_channel() {
        assert!(quit().channel().is_none());
    }
}
