//! Line Protocol Implementation
//!
//! This module implements the text protocol spoken by LineKV clients.
//!
//! ## Overview
//!
//! A request is one line of whitespace-separated tokens, the first being a
//! case-insensitive command name. A response is one block of text followed
//! by a single newline; only KEYS replies contain embedded newlines.
//!
//! ```text
//! > SET name linekv
//! OK
//! > KEYS *
//! 1) name
//! > TTL name
//! (integer) -1
//! ```
//!
//! ## Modules
//!
//! - `types`: Defines the `Reply` enum and its wire formatting
//! - `parser`: Line framing and request splitting
//!
//! ## Example
//!
//! ```
//! use linekv::protocol::{LineParser, Reply, Request};
//!
//! let parser = LineParser::default();
//! let (line, consumed) = parser.parse(b"get name\r\n").unwrap().unwrap();
//! assert_eq!(consumed, 10);
//!
//! let request = Request::parse(&line);
//! assert_eq!(request.name, "GET");
//!
//! assert_eq!(Reply::Nil.serialize(), b"(nil)\n");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{LineParser, ParseError, ParseResult, Request, DEFAULT_MAX_LINE};
pub use types::Reply;
