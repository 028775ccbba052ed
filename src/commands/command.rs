//! Command Table
//!
//! The closed set of commands LineKV understands, with their fixed arity,
//! and the errors a request can produce before or instead of reaching the
//! storage engine.

use thiserror::Error;

/// A command the server knows how to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Set,
    Get,
    Del,
    Keys,
    Expire,
    Ttl,
    Exists,
    Persist,
    Ping,
}

impl Command {
    /// Every supported command, in the order they are documented.
    pub const ALL: [Command; 9] = [
        Command::Set,
        Command::Get,
        Command::Del,
        Command::Keys,
        Command::Expire,
        Command::Ttl,
        Command::Exists,
        Command::Persist,
        Command::Ping,
    ];

    /// Looks up an already-uppercased command name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.name() == name)
    }

    /// The uppercase keyword clients send.
    pub fn name(self) -> &'static str {
        match self {
            Command::Set => "SET",
            Command::Get => "GET",
            Command::Del => "DEL",
            Command::Keys => "KEYS",
            Command::Expire => "EXPIRE",
            Command::Ttl => "TTL",
            Command::Exists => "EXISTS",
            Command::Persist => "PERSIST",
            Command::Ping => "PING",
        }
    }

    /// Exact number of arguments after the command name.
    pub fn arity(self) -> usize {
        match self {
            Command::Set | Command::Expire => 2,
            Command::Get
            | Command::Del
            | Command::Keys
            | Command::Ttl
            | Command::Exists
            | Command::Persist => 1,
            Command::Ping => 0,
        }
    }
}

/// Why a request did not produce a normal reply.
///
/// The `Display` text is exactly what the client receives.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The command name is not in the table
    #[error("Unknown command")]
    UnknownCommand,

    /// The argument count does not match the command's arity
    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArity(&'static str),

    /// EXPIRE's TTL is not an integer
    #[error("ERR invalid expire time")]
    InvalidExpireTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_round_trips_every_command() {
        for cmd in Command::ALL {
            assert_eq!(Command::from_name(cmd.name()), Some(cmd));
        }
    }

    #[test]
    fn test_from_name_expects_uppercase() {
        assert_eq!(Command::from_name("set"), None);
        assert_eq!(Command::from_name("FOO"), None);
        assert_eq!(Command::from_name(""), None);
    }

    #[test]
    fn test_arity_table() {
        assert_eq!(Command::Set.arity(), 2);
        assert_eq!(Command::Expire.arity(), 2);
        assert_eq!(Command::Get.arity(), 1);
        assert_eq!(Command::Keys.arity(), 1);
        assert_eq!(Command::Ping.arity(), 0);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(CommandError::UnknownCommand.to_string(), "Unknown command");
        assert_eq!(
            CommandError::WrongArity("SET").to_string(),
            "ERR wrong number of arguments for 'SET' command"
        );
        assert_eq!(
            CommandError::InvalidExpireTime.to_string(),
            "ERR invalid expire time"
        );
    }
}
