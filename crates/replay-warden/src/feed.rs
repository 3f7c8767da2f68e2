//! Host console feed parsing.
//!
//! The warden runs as a sidecar: the host's console stream arrives line by
//! line on stdin and recorder commands leave on stdout. Recognized input
//! lines:
//!
//! - `{name} joined the game` - session join notice
//! - `{name} left the game` - session leave notice
//! - `!!rp …` - a command typed at the warden console (permission bypass)
//! - `@{name}:{level} !!rp …` - a player command annotated by the host with
//!   the privilege level it resolved for that player
//!
//! Anything else is silently ignored; the host console carries plenty of
//! unrelated traffic.

use crate::{CommandSource, HostEvent};

/// Prefix for warden commands in the feed.
pub(crate) const COMMAND_PREFIX: &str = "!!rp";

/// Parses one host console line into an event, if it is one we care about.
pub fn parse_line(line: &str) -> Option<HostEvent> {
    let line = line.trim();

    if let Some(name) = line.strip_suffix(" joined the game") {
        return single_token(name).map(|key| HostEvent::PlayerJoined { key });
    }

    if let Some(name) = line.strip_suffix(" left the game") {
        return single_token(name).map(|key| HostEvent::PlayerLeft { key });
    }

    if let Some(rest) = line.strip_prefix(COMMAND_PREFIX) {
        if !rest.is_empty() && !rest.starts_with(' ') {
            return None;
        }
        return Some(HostEvent::Command {
            source: CommandSource::Console,
            args: tokenize(rest),
        });
    }

    if let Some(rest) = line.strip_prefix('@') {
        let (annotation, command) = rest.split_once(' ')?;
        let (name, level) = annotation.split_once(':')?;
        let level: u8 = level.parse().ok()?;
        let command = command.trim_start();
        let rest = command.strip_prefix(COMMAND_PREFIX)?;
        if !rest.is_empty() && !rest.starts_with(' ') {
            return None;
        }
        return Some(HostEvent::Command {
            source: CommandSource::Player {
                name: name.to_string(),
                level,
            },
            args: tokenize(rest),
        });
    }

    None
}

/// Splits command arguments on whitespace.
fn tokenize(rest: &str) -> Vec<String> {
    rest.split_whitespace().map(str::to_string).collect()
}

/// Accepts the name only if it is a single bare token; multi-word prefixes
/// are host chatter, not join/leave notices.
fn single_token(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        None
    } else {
        Some(name.to_string())
    }
}
