/// Who issued a warden command.
///
/// Console callers bypass the permission check; player-sourced commands
/// carry the privilege level the host resolved for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSource {
    /// The host console or another non-interactive caller.
    Console,
    /// A player, with the host-resolved privilege level.
    Player {
        /// Player name, used for replies.
        name: String,
        /// Numeric privilege level assigned by the host.
        level: u8,
    },
}

impl CommandSource {
    /// Returns `true` if this source meets `required`. Console always does.
    pub fn has_permission(&self, required: u8) -> bool {
        match self {
            CommandSource::Console => true,
            CommandSource::Player { level, .. } => *level >= required,
        }
    }

    /// Returns `true` for sources that receive replies over the host
    /// console rather than the warden log.
    pub fn is_interactive(&self) -> bool {
        matches!(self, CommandSource::Player { .. })
    }
}

/// Events delivered from the host console feed to the app loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A session joined and should be recorded.
    PlayerJoined {
        /// Session key of the joining player.
        key: String,
    },
    /// A session left; its countdown is canceled.
    PlayerLeft {
        /// Session key of the leaving player.
        key: String,
    },
    /// A warden command with its source and argument tokens.
    Command {
        /// Who issued the command.
        source: CommandSource,
        /// Tokens after the `!!rp` prefix.
        args: Vec<String>,
    },
    /// Request application shutdown.
    Shutdown,
}
