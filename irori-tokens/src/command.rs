use std::fmt;

/// The verbs a message can carry.
///
/// `Reply` holds a three-digit numeric, as found in server-originated
/// messages.  `Pong` is never parsed from clients, it exists for message
/// building only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Invite,
    Join,
    Kick,
    Mode,
    Nick,
    Part,
    Pass,
    Ping,
    Pong,
    PrivMsg,
    Quit,
    Topic,
    User,
    Reply(u16),
}

const COMMANDS: &[(&str, Command)] = &[
    ("INVITE", Command::Invite),
    ("JOIN", Command::Join),
    ("KICK", Command::Kick),
    ("MODE", Command::Mode),
    ("NICK", Command::Nick),
    ("PART", Command::Part),
    ("PASS", Command::Pass),
    ("PING", Command::Ping),
    ("PRIVMSG", Command::PrivMsg),
    ("QUIT", Command::Quit),
    ("TOPIC", Command::Topic),
    ("USER", Command::User),
];

impl Command {
    /// Resolves a verb, case-insensitively.
    pub fn parse(s: &str) -> Option<Command> {
        if s.len() == 3 && s.bytes().all(|b| b.is_ascii_digit()) {
            return s.parse().ok().map(Command::Reply);
        }
        COMMANDS
            .iter()
            .find(|(name, _)| s.eq_ignore_ascii_case(name))
            .map(|&(_, command)| command)
    }

    /// The canonical, upper-case name of the verb.
    ///
    /// Numerics render through `Display` instead.
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Invite => "INVITE",
            Command::Join => "JOIN",
            Command::Kick => "KICK",
            Command::Mode => "MODE",
            Command::Nick => "NICK",
            Command::Part => "PART",
            Command::Pass => "PASS",
            Command::Ping => "PING",
            Command::Pong => "PONG",
            Command::PrivMsg => "PRIVMSG",
            Command::Quit => "QUIT",
            Command::Topic => "TOPIC",
            Command::User => "USER",
            Command::Reply(_) => "",
        }
    }

    /// The number of parameters a message must carry for its handler to make
    /// sense of it.
    pub fn required_params(self) -> usize {
        match self {
            Command::User => 4,
            Command::Invite | Command::Kick | Command::PrivMsg => 2,
            Command::Join
            | Command::Mode
            | Command::Nick
            | Command::Part
            | Command::Pass
            | Command::Topic => 1,
            Command::Ping | Command::Pong | Command::Quit | Command::Reply(_) => 0,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Reply(code) => write!(f, "{:03}", code),
            command => f.write_str(command.as_str()),
        }
    }
}
