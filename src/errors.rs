use std::fmt;

use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};

#[derive(Debug)]
pub enum ClientError {
    /// The display connection failed or a request was rejected.
    Transport(String),
    Config(String),
    EventLoop(String),
    /// Signalling the owning process failed.
    Process(String),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "transport error: {msg}"),
            ClientError::Config(msg) => write!(f, "config error: {msg}"),
            ClientError::EventLoop(msg) => write!(f, "event loop error: {msg}"),
            ClientError::Process(msg) => write!(f, "process error: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ConnectError> for ClientError {
    fn from(err: ConnectError) -> Self {
        ClientError::Transport(format!("failed to connect to display: {err}"))
    }
}

impl From<ConnectionError> for ClientError {
    fn from(err: ConnectionError) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<ReplyError> for ClientError {
    fn from(err: ReplyError) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<ReplyOrIdError> for ClientError {
    fn from(err: ReplyOrIdError) -> Self {
        ClientError::Transport(err.to_string())
    }
}
