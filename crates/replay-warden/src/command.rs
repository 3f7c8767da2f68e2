//! The `!!rp` command surface.
//!
//! Thin dispatch layer: permission check, synthetic-key gate, then
//! delegation to the rotation engine and config store. Every caller gets a
//! reply: success confirmation, permission denial or rejection notice.

use crate::{CommandSource, ConfigStore, HostConsole};

use std::sync::Arc;

use replay_warden_core::{RotationEngine, is_synthetic};
use tracing::{info, instrument, warn};

/// Privilege level required for every subcommand except `help`.
pub(crate) const REQUIRED_PERMISSION: u8 = 3;

/// Dependencies of the command handlers, passed explicitly rather than
/// captured, so each handler is testable in isolation.
pub struct CommandDeps {
    /// Rotation engine driving timers and the recorder.
    pub engine: Arc<RotationEngine>,
    /// Config store owning the persisted cut interval.
    pub store: Arc<ConfigStore>,
    /// Host console for replies and broadcasts.
    pub console: Arc<HostConsole>,
}

/// Dispatches one `!!rp` command.
#[instrument(skip(deps))]
pub fn dispatch(deps: &CommandDeps, source: &CommandSource, args: &[String]) {
    match args {
        [] => show_help(deps, source),
        [first] if first.as_str() == "help" => show_help(deps, source),
        [first, second, minutes] if first.as_str() == "set" && second.as_str() == "cuttime" => {
            set_cut_time(deps, source, minutes);
        }
        [player, action] => match action.as_str() {
            "start" => start_replay(deps, source, player),
            "stop" => stop_replay(deps, source, player),
            "cut" => cut_replay(deps, source, player),
            _ => deps
                .console
                .reply(source, "Unknown action; try !!rp help"),
        },
        _ => deps.console.reply(source, "Unknown command; try !!rp help"),
    }
}

fn show_help(deps: &CommandDeps, source: &CommandSource) {
    let help = concat!(
        "Replay Warden - replay recording manager | ",
        "!!rp help - show this help | ",
        "!!rp <player> start - start recording and reset the cut timer | ",
        "!!rp <player> stop - stop recording and cancel the cut timer | ",
        "!!rp <player> cut - cut the replay and reset the timer | ",
        "!!rp set cuttime <minutes> - set the automatic cut interval",
    );
    deps.console.reply(source, help);
}

/// Permission gate shared by all state-changing subcommands. Replies with
/// the denial and returns `false` if the source is not allowed.
fn check_permission(deps: &CommandDeps, source: &CommandSource) -> bool {
    if source.has_permission(REQUIRED_PERMISSION) {
        true
    } else {
        warn!(?source, "Command rejected, insufficient permission");
        deps.console
            .reply(source, "You do not have permission to use this command");
        false
    }
}

/// Synthetic-key gate for start/cut. Replies to the caller and broadcasts
/// the notice, then returns `true` if the key was rejected.
fn reject_synthetic(deps: &CommandDeps, source: &CommandSource, player: &str) -> bool {
    if is_synthetic(player) {
        let notice = format!("{player} looks like a fake player, replay recording aborted");
        deps.console.reply(source, &notice);
        deps.console.broadcast(&notice);
        true
    } else {
        false
    }
}

fn start_replay(deps: &CommandDeps, source: &CommandSource, player: &str) {
    if !check_permission(deps, source) || reject_synthetic(deps, source, player) {
        return;
    }

    deps.engine.begin_recording(player);
    deps.engine.arm_rotation(player);
    deps.console
        .reply(source, &format!("Recording started for {player}"));
}

fn stop_replay(deps: &CommandDeps, source: &CommandSource, player: &str) {
    if !check_permission(deps, source) {
        return;
    }

    // Deliberately not synthetic-gated: an explicit stop is honored for any
    // key so an accidental capture can always be ended.
    deps.engine.stop_recording(player);
    deps.console
        .reply(source, &format!("Recording stopped for {player}"));
}

fn cut_replay(deps: &CommandDeps, source: &CommandSource, player: &str) {
    if !check_permission(deps, source) || reject_synthetic(deps, source, player) {
        return;
    }

    // The pending countdown is superseded by the re-arm that follows the
    // rotation; net effect is one rotation and one live countdown.
    deps.engine.cancel_rotation(player);
    deps.engine.rotate_recording(player);
    deps.console
        .reply(source, &format!("Replay cut for {player}"));
}

fn set_cut_time(deps: &CommandDeps, source: &CommandSource, minutes: &str) {
    if !check_permission(deps, source) {
        return;
    }

    let Ok(minutes) = minutes.parse::<u64>() else {
        deps.console
            .reply(source, "Cut interval must be a positive number of minutes");
        return;
    };

    match deps.store.set_cut_minutes(minutes) {
        Ok(()) => {
            info!(minutes, "Cut interval updated");
            deps.console.reply(
                source,
                &format!("Automatic cut interval set to {minutes} minutes"),
            );
        }
        Err(e) => {
            warn!(minutes, error = ?e, "Rejected cut interval");
            deps.console
                .reply(source, "Cut interval must be a positive number of minutes");
        }
    }
}
