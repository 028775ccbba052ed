//! Reply Types
//!
//! Every command produces exactly one [`Reply`]. Its `Display` output is the
//! wire form sent back to the client (without the terminating newline):
//!
//! | Reply              | Wire form                      |
//! |--------------------|--------------------------------|
//! | `Ok`               | `OK`                           |
//! | `Pong`             | `PONG`                         |
//! | `Value(v)`         | the raw value                  |
//! | `Nil`              | `(nil)`                        |
//! | `Integer(n)`       | `(integer) n`                  |
//! | `Keys([])`         | `(empty array)`                |
//! | `Keys([a, b])`     | `1) a` newline `2) b`          |
//! | `Error(e)`         | the error message              |

use crate::commands::CommandError;
use bytes::Bytes;
use std::fmt;

/// Line terminator appended to every reply on the wire
pub const LF: &[u8] = b"\n";

/// A command result, ready to be written to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Acknowledgement of a write
    Ok,

    /// Answer to PING
    Pong,

    /// A stored value
    Value(Bytes),

    /// Absent value
    Nil,

    /// Integer result, including the `-1` / `-2` TTL sentinels
    Integer(i64),

    /// A list of keys, printed 1-indexed
    Keys(Vec<String>),

    /// A command that could not be executed
    Error(CommandError),
}

impl Reply {
    /// Creates a value reply.
    ///
    /// # Example
    /// ```
    /// use linekv::protocol::Reply;
    /// assert_eq!(Reply::value("hello").to_string(), "hello");
    /// ```
    pub fn value(data: impl Into<Bytes>) -> Self {
        Reply::Value(data.into())
    }

    /// Creates an integer reply.
    pub fn integer(n: i64) -> Self {
        Reply::Integer(n)
    }

    /// Creates a `0`/`1` integer reply from a boolean.
    pub fn boolean(b: bool) -> Self {
        Reply::Integer(i64::from(b))
    }

    /// Returns true if this reply is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// Serializes the reply for the wire, newline included.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = self.to_string().into_bytes();
        buf.extend_from_slice(LF);
        buf
    }
}

impl From<CommandError> for Reply {
    fn from(err: CommandError) -> Self {
        Reply::Error(err)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => f.write_str("OK"),
            Reply::Pong => f.write_str("PONG"),
            Reply::Value(data) => f.write_str(&String::from_utf8_lossy(data)),
            Reply::Nil => f.write_str("(nil)"),
            Reply::Integer(n) => write!(f, "(integer) {}", n),
            Reply::Keys(keys) if keys.is_empty() => f.write_str("(empty array)"),
            Reply::Keys(keys) => {
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{}) {}", i + 1, key)?;
                }
                Ok(())
            }
            Reply::Error(err) => write!(f, "{}", err),
        }
    }
}
