//! Line Protocol Parser
//!
//! Requests are single text lines terminated by `\n` (a preceding `\r` is
//! dropped). A line is split on whitespace: the first token, uppercased, is
//! the command name and the rest are its arguments.
//!
//! ## How Framing Works
//!
//! [`LineParser::parse`] looks at a buffer of received bytes and returns:
//! - `Ok(Some((line, consumed)))` - A complete line, `consumed` bytes were used
//! - `Ok(None)` - No newline yet, wait for more data
//! - `Err(ParseError)` - The line is too long or not valid UTF-8
//!
//! Tokens cannot contain whitespace; there is no quoting, so a value with
//! embedded spaces cannot be stored.

use crate::protocol::types::LF;
use thiserror::Error;

/// Errors that can occur while framing request lines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid UTF-8 in a request line
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// The line exceeds the maximum allowed size
    #[error("line too long: {size} bytes (max: {max})")]
    LineTooLong { size: usize, max: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Default maximum length of a single request line (64 KB)
pub const DEFAULT_MAX_LINE: usize = 64 * 1024;

/// A request line split into command name and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Uppercased command name; empty for a blank line
    pub name: String,
    /// Positional arguments, verbatim
    pub args: Vec<String>,
}

impl Request {
    /// Splits a request line on whitespace.
    ///
    /// # Example
    /// ```
    /// use linekv::protocol::Request;
    ///
    /// let request = Request::parse("set greeting hello");
    /// assert_eq!(request.name, "SET");
    /// assert_eq!(request.args, vec!["greeting", "hello"]);
    /// ```
    pub fn parse(line: &str) -> Self {
        let mut tokens = line.split_whitespace();
        let name = tokens.next().map(str::to_uppercase).unwrap_or_default();
        let args = tokens.map(str::to_string).collect();
        Self { name, args }
    }
}

/// Extracts newline-terminated request lines from a byte buffer.
#[derive(Debug, Clone)]
pub struct LineParser {
    max_line: usize,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE)
    }
}

impl LineParser {
    /// Creates a parser that rejects lines longer than `max_line` bytes.
    pub fn new(max_line: usize) -> Self {
        Self { max_line }
    }

    /// Attempts to take one line from the front of `buf`.
    ///
    /// The returned line has its `\n` and any trailing `\r` removed.
    pub fn parse(&self, buf: &[u8]) -> ParseResult<Option<(String, usize)>> {
        let Some(end) = buf.iter().position(|&b| b == LF[0]) else {
            if buf.len() > self.max_line {
                return Err(ParseError::LineTooLong {
                    size: buf.len(),
                    max: self.max_line,
                });
            }
            return Ok(None);
        };

        if end > self.max_line {
            return Err(ParseError::LineTooLong {
                size: end,
                max: self.max_line,
            });
        }

        let mut line = &buf[..end];
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }

        let line = std::str::from_utf8(line)
            .map_err(|e| ParseError::InvalidUtf8(e.to_string()))?;

        Ok(Some((line.to_string(), end + 1)))
    }

    /// Takes whatever is left in `buf` once the peer has stopped sending.
    ///
    /// An unterminated last line counts as a request, so `printf 'GET k' | nc`
    /// gets an answer. Returns `None` if nothing is left.
    pub fn parse_final(&self, buf: &[u8]) -> ParseResult<Option<String>> {
        if buf.is_empty() {
            return Ok(None);
        }
        if buf.len() > self.max_line {
            return Err(ParseError::LineTooLong {
                size: buf.len(),
                max: self.max_line,
            });
        }

        let line = buf.strip_suffix(b"\r").unwrap_or(buf);
        let line = std::str::from_utf8(line)
            .map_err(|e| ParseError::InvalidUtf8(e.to_string()))?;

        Ok(Some(line.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uppercases_name_only() {
        let request = Request::parse("eXpIrE MyKey 10");
        assert_eq!(request.name, "EXPIRE");
        assert_eq!(request.args, vec!["MyKey", "10"]);
    }

    #[test]
    fn test_request_collapses_whitespace() {
        let request = Request::parse("  SET \t k   v  ");
        assert_eq!(request.name, "SET");
        assert_eq!(request.args, vec!["k", "v"]);
    }

    #[test]
    fn test_request_blank_line() {
        let request = Request::parse("   ");
        assert_eq!(request.name, "");
        assert!(request.args.is_empty());
    }

    #[test]
    fn test_parse_complete_line() {
        let parser = LineParser::default();
        let result = parser.parse(b"GET key\n").unwrap();
        assert_eq!(result, Some(("GET key".to_string(), 8)));
    }

    #[test]
    fn test_parse_strips_carriage_return() {
        let parser = LineParser::default();
        let result = parser.parse(b"PING\r\n").unwrap();
        assert_eq!(result, Some(("PING".to_string(), 6)));
    }

    #[test]
    fn test_parse_incomplete() {
        let parser = LineParser::default();
        assert_eq!(parser.parse(b"SET key val").unwrap(), None);
        assert_eq!(parser.parse(b"").unwrap(), None);
    }

    #[test]
    fn test_parse_takes_only_first_line() {
        let parser = LineParser::default();
        let buf = b"SET a 1\nGET a\n";

        let (line, consumed) = parser.parse(buf).unwrap().unwrap();
        assert_eq!(line, "SET a 1");

        let (line, _) = parser.parse(&buf[consumed..]).unwrap().unwrap();
        assert_eq!(line, "GET a");
    }

    #[test]
    fn test_parse_line_too_long() {
        let parser = LineParser::new(8);

        assert!(matches!(
            parser.parse(b"0123456789"),
            Err(ParseError::LineTooLong { size: 10, max: 8 })
        ));
        assert!(matches!(
            parser.parse(b"0123456789\n"),
            Err(ParseError::LineTooLong { size: 10, max: 8 })
        ));
        assert!(parser.parse(b"01234567\n").unwrap().is_some());
    }

    #[test]
    fn test_parse_invalid_utf8() {
        let parser = LineParser::default();
        assert!(matches!(
            parser.parse(b"GET \xff\xfe\n"),
            Err(ParseError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_parse_final_unterminated_line() {
        let parser = LineParser::default();
        assert_eq!(parser.parse_final(b"SET a b").unwrap(), Some("SET a b".to_string()));
        assert_eq!(parser.parse_final(b"PING\r").unwrap(), Some("PING".to_string()));
        assert_eq!(parser.parse_final(b"").unwrap(), None);
        assert!(matches!(
            parser.parse_final(b"GET \xff"),
            Err(ParseError::InvalidUtf8(_))
        ));
    }
}
