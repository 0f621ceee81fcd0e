//! Configuration of the server.

use std::fmt;

/// Runtime options, read from the command line: `irori <port> <password>`.
#[derive(Debug)]
pub struct Config {
    /// The port the server listens on.
    pub port: u16,

    /// The password clients must give with PASS to register.
    pub password: String,
}

/// The subset of the configuration the IRC state works with.
pub struct StateConfig {
    /// The prefix of server-originated replies.
    pub domain: String,

    /// The password clients must give with PASS to register.
    pub password: String,

    /// Modes set on newly created channels.
    pub default_chan_mode: String,
}

impl Default for StateConfig {
    fn default() -> StateConfig {
        StateConfig {
            domain: "server".to_owned(),
            password: String::new(),
            default_chan_mode: "+t".to_owned(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Error {
    BadArgCount,
    BadPort(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadArgCount => write!(f, "expected exactly two arguments"),
            Error::BadPort(port) => write!(f, "{:?} is not a port number (1-65535)", port),
        }
    }
}

impl Config {
    /// Reads the configuration from the program arguments (the first one, the
    /// program name, is skipped).
    pub fn from_args(args: impl Iterator<Item = String>) -> Result<Config, Error> {
        let mut args = args.skip(1);
        let port = args.next().ok_or(Error::BadArgCount)?;
        let password = args.next().ok_or(Error::BadArgCount)?;
        if args.next().is_some() {
            return Err(Error::BadArgCount);
        }
        let port = match port.trim().parse() {
            Ok(port) if port != 0 => port,
            _ => return Err(Error::BadPort(port)),
        };
        Ok(Config { port, password })
    }
}
