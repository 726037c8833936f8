//! Control protocol commands.

/// Prefix of the schedule command, including the separating space.
pub const SCHEDULE_PREFIX: &str = "/schedule ";

/// Reply line for anything that is not a known command.
pub const UNKNOWN_COMMAND_REPLY: &str = "Unknown command\n";

/// A parsed control line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    /// `/list`: reply with the catalog, one identifier per line.
    List,

    /// `/play`
    Play,

    /// `/pause`
    Pause,

    /// `/schedule <track>`: everything after the prefix is the track.
    Schedule(String),

    /// Anything else.
    Unknown(String),
}

impl ControlCommand {
    /// Parse one control line, without its newline.
    pub fn parse(line: &str) -> Self {
        match line {
            "/list" => Self::List,
            "/play" => Self::Play,
            "/pause" => Self::Pause,
            _ => match line.strip_prefix(SCHEDULE_PREFIX) {
                Some(track) => Self::Schedule(track.to_string()),
                None => Self::Unknown(line.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(ControlCommand::parse("/list"), ControlCommand::List);
        assert_eq!(ControlCommand::parse("/play"), ControlCommand::Play);
        assert_eq!(ControlCommand::parse("/pause"), ControlCommand::Pause);
    }

    #[test]
    fn test_parse_schedule_keeps_remainder_verbatim() {
        assert_eq!(
            ControlCommand::parse("/schedule track1.mp3"),
            ControlCommand::Schedule("track1.mp3".to_string())
        );
        assert_eq!(
            ControlCommand::parse("/schedule  my song.mp3 "),
            ControlCommand::Schedule(" my song.mp3 ".to_string())
        );
        assert_eq!(
            ControlCommand::parse("/schedule "),
            ControlCommand::Schedule(String::new())
        );
    }

    #[test]
    fn test_parse_unknown() {
        for line in ["/foo", "/schedule", "/LIST", "/list ", "", "play"] {
            assert_eq!(
                ControlCommand::parse(line),
                ControlCommand::Unknown(line.to_string()),
                "{line:?}"
            );
        }
    }
}
