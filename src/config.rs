//! Server Configuration
//!
//! Command-line options for the `linekv` binary, with defaults that work
//! out of the box.

use crate::protocol::DEFAULT_MAX_LINE;
use crate::{DEFAULT_HOST, DEFAULT_PORT};
use thiserror::Error;

/// Errors produced while reading command-line options.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("invalid port number: {0}")]
    InvalidPort(String),

    #[error("invalid line size: {0}")]
    InvalidLineSize(String),

    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

/// Runtime settings for the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Longest request line accepted before the connection is dropped
    pub max_line_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_line_bytes: DEFAULT_MAX_LINE,
        }
    }
}

/// What the binary should do after reading its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Run(ServerConfig),
    Help,
    Version,
}

impl ServerConfig {
    /// Parses options, not including the program name.
    ///
    /// # Example
    ///
    /// ```
    /// use linekv::config::{CliAction, ServerConfig};
    ///
    /// let action = ServerConfig::from_args(["--port", "7000"].map(String::from)).unwrap();
    /// match action {
    ///     CliAction::Run(config) => assert_eq!(config.bind_address(), "127.0.0.1:7000"),
    ///     _ => unreachable!(),
    /// }
    /// ```
    pub fn from_args<I>(args: I) -> Result<CliAction, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = ServerConfig::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--host" | "-h" => {
                    config.host = args.next().ok_or_else(|| ConfigError::MissingValue(arg))?;
                }
                "--port" | "-p" => {
                    let value = args.next().ok_or_else(|| ConfigError::MissingValue(arg))?;
                    config.port = value.parse().map_err(|_| ConfigError::InvalidPort(value))?;
                }
                "--max-line-bytes" => {
                    let value = args.next().ok_or_else(|| ConfigError::MissingValue(arg))?;
                    config.max_line_bytes = match value.parse() {
                        Ok(n) if n > 0 => n,
                        _ => return Err(ConfigError::InvalidLineSize(value)),
                    };
                }
                "--help" => return Ok(CliAction::Help),
                "--version" | "-v" => return Ok(CliAction::Version),
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        Ok(CliAction::Run(config))
    }

    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliAction, ConfigError> {
        ServerConfig::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:6379");
        assert_eq!(config.max_line_bytes, 64 * 1024);
        assert_eq!(parse(&[]), Ok(CliAction::Run(config)));
    }

    #[test]
    fn test_all_options() {
        let action = parse(&["-h", "0.0.0.0", "--port", "6380", "--max-line-bytes", "128"]);
        assert_eq!(
            action,
            Ok(CliAction::Run(ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 6380,
                max_line_bytes: 128,
            }))
        );
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(parse(&["--help"]), Ok(CliAction::Help));
        assert_eq!(parse(&["-p", "1", "-v"]), Ok(CliAction::Version));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse(&["--host"]),
            Err(ConfigError::MissingValue("--host".to_string()))
        );
        assert_eq!(
            parse(&["--port"]),
            Err(ConfigError::MissingValue("--port".to_string()))
        );
        assert_eq!(
            parse(&["--port", "99999"]),
            Err(ConfigError::InvalidPort("99999".to_string()))
        );
        assert_eq!(
            parse(&["--max-line-bytes", "0"]),
            Err(ConfigError::InvalidLineSize("0".to_string()))
        );
        assert_eq!(
            parse(&["--verbose"]),
            Err(ConfigError::UnknownArgument("--verbose".to_string()))
        );
    }
}
