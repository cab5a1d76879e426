use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{Chat, ChatMemberKind, ChatMemberUpdated, User};
use tracing::{debug, error, info, warn};

use super::{
    display_nick, dispatch, echo, member_event, own_membership_applies, own_membership_event,
    MembershipChange, SharedPlugin,
};
use crate::config::Config;
use crate::events::{ChatEvent, Reply};

const USAGE_EXAMPLE: &str = "/spongemock Fortnite is the best game ever!";

fn nick_of(user: &User) -> String {
    display_nick(user.username.as_deref(), &user.first_name, user.id.0)
}

fn membership_change(kind: &ChatMemberKind) -> Option<MembershipChange> {
    MembershipChange::from_status(kind.is_left(), kind.is_banned())
}

/// Run the Telegram bot platform until interrupted
pub async fn run(bot: Bot, plugin: SharedPlugin, config: Arc<Config>) -> Result<()> {
    info!("Starting Telegram platform...");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_chat_member().endpoint(handle_chat_member))
        .branch(Update::filter_my_chat_member().endpoint(handle_my_chat_member));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![plugin, config])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Send replies to `chat`, then cache what was actually sent as the bot's
/// own line
async fn send_replies(bot: &Bot, plugin: &SharedPlugin, chat: &Chat, replies: Vec<Reply>) {
    let channel = chat.id.0.to_string();
    for reply in replies {
        let text = reply.render();
        match bot.send_message(chat.id, text.as_str()).await {
            Ok(_) => echo(plugin, &channel, &text, chat.is_private()).await,
            Err(e) => error!("Failed to send reply to {}: {}", chat.id.0, e),
        }
    }
}

async fn handle_message(
    bot: Bot,
    msg: Message,
    plugin: SharedPlugin,
    config: Arc<Config>,
) -> ResponseResult<()> {
    if !config.is_chat_allowed(msg.chat.id.0) {
        return Ok(());
    }
    let channel = msg.chat.id.0.to_string();

    if let Some(left) = msg.left_chat_member() {
        let event = member_event(&channel, &nick_of(left), MembershipChange::Left);
        dispatch(&plugin, &event).await;
        return Ok(());
    }

    let (user, text) = match (msg.from.as_ref(), msg.text()) {
        (Some(user), Some(text)) => (user, text),
        _ => return Ok(()),
    };

    if text == "/start" {
        bot.send_message(
            msg.chat.id,
            format!(
                "Hello! I turn text into sPonGeMoCk text.\n\n\
                 Commands:\n\
                 /spongemock <text> - mock the given text\n\
                 /spongemock <name> - mock the last thing someone said here\n\
                 /smock - short for /spongemock\n\n\
                 Example: {}",
                USAGE_EXAMPLE
            ),
        )
        .await?;
        return Ok(());
    }

    let event = ChatEvent::Message {
        channel: channel.into(),
        nick: nick_of(user).into(),
        text: text.to_string(),
        private: msg.chat.is_private(),
    };
    let replies = dispatch(&plugin, &event).await;
    send_replies(&bot, &plugin, &msg.chat, replies).await;

    Ok(())
}

async fn handle_chat_member(
    upd: ChatMemberUpdated,
    plugin: SharedPlugin,
    config: Arc<Config>,
) -> ResponseResult<()> {
    if !config.is_chat_allowed(upd.chat.id.0) {
        return Ok(());
    }
    let Some(change) = membership_change(&upd.new_chat_member.kind) else {
        return Ok(());
    };

    let event = member_event(
        &upd.chat.id.0.to_string(),
        &nick_of(&upd.new_chat_member.user),
        change,
    );
    debug!("Membership change in {:?}: {:?}", event.channel(), change);
    dispatch(&plugin, &event).await;

    Ok(())
}

async fn handle_my_chat_member(
    upd: ChatMemberUpdated,
    plugin: SharedPlugin,
    config: Arc<Config>,
) -> ResponseResult<()> {
    let Some(change) = membership_change(&upd.new_chat_member.kind) else {
        return Ok(());
    };
    let allowed = config.is_chat_allowed(upd.chat.id.0);
    if !own_membership_applies(allowed, change, upd.chat.is_private()) {
        return Ok(());
    }

    let mut plugin = plugin.lock().await;
    let event = own_membership_event(
        &upd.chat.id.0.to_string(),
        plugin.state().bot_nick().as_str(),
        &nick_of(&upd.from),
        change,
        upd.chat.is_private(),
    );
    info!("Own membership changed in {}: {:?}", upd.chat.id.0, change);
    plugin.handle(&event);
    debug!(
        "{} channel(s) still cached",
        plugin.state().cache().channel_count()
    );

    Ok(())
}
