pub mod telegram;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::events::{ChatEvent, Reply};
use crate::identifier::Identifier;
use crate::plugin::Plugin;

pub type SharedPlugin = Arc<Mutex<Plugin>>;

/// How a chat member's status changed, when it matters for caching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    Left,
    Removed,
}

impl MembershipChange {
    /// Classify a member's new status; anyone still present yields `None`.
    pub fn from_status(left: bool, banned: bool) -> Option<Self> {
        if left {
            Some(MembershipChange::Left)
        } else if banned {
            Some(MembershipChange::Removed)
        } else {
            None
        }
    }
}

/// Name used to address a user.
///
/// Handles are unique, so they are used as-is. Users without one get their
/// first name (spaces replaced so it stays a single word) tagged with their
/// numeric id, since first names collide.
pub fn display_nick(username: Option<&str>, first_name: &str, user_id: u64) -> String {
    match username {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            let name = first_name.split_whitespace().collect::<Vec<_>>().join("_");
            if name.is_empty() {
                format!("user#{}", user_id)
            } else {
                format!("{}#{}", name, user_id)
            }
        }
    }
}

/// Event for someone else's membership changing in `channel`
pub fn member_event(channel: &str, nick: &str, change: MembershipChange) -> ChatEvent {
    let channel = Identifier::new(channel);
    let nick = Identifier::new(nick);
    match change {
        MembershipChange::Left => ChatEvent::Part { channel, nick },
        MembershipChange::Removed => ChatEvent::Kick { channel, nick },
    }
}

/// Whether a change to the bot's own membership means the user quit.
///
/// In a one-to-one chat, the user removing the bot means they are gone for
/// good.
pub fn is_user_quit(change: MembershipChange, private: bool) -> bool {
    private && change == MembershipChange::Removed
}

/// Whether a change to the bot's own membership should be acted on.
/// Quits apply to every chat, so the allow-list does not gate them.
pub fn own_membership_applies(
    chat_allowed: bool,
    change: MembershipChange,
    private: bool,
) -> bool {
    chat_allowed || is_user_quit(change, private)
}

/// Event for the bot's own membership changing.
pub fn own_membership_event(
    channel: &str,
    bot_nick: &str,
    changed_by: &str,
    change: MembershipChange,
    private: bool,
) -> ChatEvent {
    if is_user_quit(change, private) {
        return ChatEvent::Quit {
            nick: Identifier::new(changed_by),
        };
    }
    member_event(channel, bot_nick, change)
}

/// Run one event through the plugin, holding the lock only for the dispatch
pub async fn dispatch(plugin: &SharedPlugin, event: &ChatEvent) -> Vec<Reply> {
    let mut plugin = plugin.lock().await;
    plugin.handle(event)
}

/// Feed a line the bot itself sent back through the plugin, so the bot's
/// own output is cached like everyone else's. Private chats are skipped.
pub async fn echo(plugin: &SharedPlugin, channel: &str, text: &str, private: bool) {
    if private {
        return;
    }
    let mut plugin = plugin.lock().await;
    let event = ChatEvent::Message {
        channel: Identifier::new(channel),
        nick: plugin.state().bot_nick().clone(),
        text: text.to_string(),
        private,
    };
    plugin.handle(&event);
}
