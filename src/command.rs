use rand::Rng;
use regex::Regex;

use crate::cache::LineCache;
use crate::events::Reply;
use crate::identifier::Identifier;
use crate::mock::{mock, DiversityBias};

/// Names the mocking command answers to
pub const COMMAND_NAMES: &[&str] = &["spongemock", "smock"];

pub const NEED_TEXT: &str = "I need text, or a nickname!";

/// A recognized command line, minus the prefix and command word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub args: &'a str,
}

impl<'a> Invocation<'a> {
    /// The single bare word given, if that is all there is
    pub fn lone_word(&self) -> Option<&'a str> {
        let mut words = self.args.split_whitespace();
        match (words.next(), words.next()) {
            (Some(word), None) => Some(word),
            _ => None,
        }
    }
}

/// Recognize `<prefix><command>[@botname] [args]`.
pub fn parse_invocation<'a>(prefix: &Regex, text: &'a str) -> Option<Invocation<'a>> {
    let found = prefix.find(text)?;
    if found.start() != 0 {
        return None;
    }
    let rest = &text[found.end()..];
    let (word, args) = rest
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));
    let name = word.split('@').next().unwrap_or(word);
    if !COMMAND_NAMES.iter().any(|c| c.eq_ignore_ascii_case(name)) {
        return None;
    }
    Some(Invocation { args: args.trim() })
}

/// What the command should mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// Nothing usable was given
    Missing,
    /// The last line `nick` said in this channel
    Cached { nick: &'a str, line: &'a str },
    /// The arguments themselves
    Text(&'a str),
}

/// Explicit text wins unless exactly one bare name is given and the cache
/// has a line for it.
pub fn resolve<'a>(
    invocation: &Invocation<'a>,
    cache: &'a LineCache,
    channel: &Identifier,
) -> Target<'a> {
    if invocation.args.is_empty() {
        return Target::Missing;
    }

    if let Some(word) = invocation.lone_word() {
        let nick = word.strip_prefix('@').unwrap_or(word);
        if let Some(line) = cache.lookup(channel, &Identifier::new(nick)) {
            return Target::Cached { nick, line };
        }
    }

    Target::Text(invocation.args)
}

/// Turn a resolved target into the reply for `invoker`.
pub fn respond<R: Rng + ?Sized>(
    target: Target<'_>,
    invoker: &Identifier,
    bias: DiversityBias,
    rng: &mut R,
) -> Reply {
    match target {
        Target::Missing => Reply::ReplyTo {
            nick: invoker.to_string(),
            text: NEED_TEXT.to_string(),
        },
        Target::Cached { nick, line } => {
            Reply::Say(format!("<{}> {}", nick, mock(line, bias, rng)))
        }
        Target::Text(text) => Reply::Say(mock(text, bias, rng)),
    }
}
