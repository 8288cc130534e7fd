//! Custom error types for the wipe manager
//!
//! Only configuration errors are fatal to the process. Every other variant is
//! caught at a run (or force wipe cycle) boundary and written to the log.

use std::fmt;

/// Main error type for the wipe manager
#[derive(Debug)]
pub enum WipeError {
    /// Configuration-related errors
    Config(ConfigError),

    /// Panel or release feed request failures
    Remote(RemoteCallError),

    /// Power transition did not reach its target state
    Lifecycle(LifecycleError),

    /// Listing or deleting one file group failed
    FileOperation(FileOperationError),

    /// Another run is already in flight for this server
    Busy { server_id: String },

    /// Local filesystem errors (run log creation)
    Io(std::io::Error),
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Missing required configuration
    MissingRequired { field: String },

    /// Configuration parsing error
    ParseError { reason: String },
}

/// A single request to the panel or the release feed failed
#[derive(Debug)]
pub struct RemoteCallError {
    pub operation: String,
    pub cause: RemoteCause,
}

#[derive(Debug)]
pub enum RemoteCause {
    /// Connection, DNS, TLS or timeout failure
    Transport(String),

    /// Non-2xx response
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    InvalidResponse(String),
}

/// Lifecycle transition error variants
#[derive(Debug)]
pub enum LifecycleError {
    /// Retry bound exceeded without observing the target state
    Timeout {
        server_id: String,
        target: String,
        attempts: u32,
        last_state: Option<String>,
    },

    /// The power signal itself was rejected
    SignalFailed {
        server_id: String,
        signal: String,
        source: RemoteCallError,
    },

    /// A status poll failed; polling stops immediately
    PollFailed {
        server_id: String,
        attempt: u32,
        source: RemoteCallError,
    },
}

/// File group error variants (never fatal to a run)
#[derive(Debug)]
pub enum FileOperationError {
    /// Directory listing failed for one group
    ListFailed { root: String, source: RemoteCallError },

    /// A glob in a group could not be compiled
    InvalidPattern { root: String, pattern: String, reason: String },

    /// The batched delete call failed
    DeleteFailed { count: usize, source: RemoteCallError },
}

impl RemoteCallError {
    pub fn transport(operation: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            operation: operation.into(),
            cause: RemoteCause::Transport(reason.to_string()),
        }
    }

    pub fn status(operation: impl Into<String>, status: u16, body: String) -> Self {
        Self {
            operation: operation.into(),
            cause: RemoteCause::Status { status, body },
        }
    }

    pub fn invalid_response(operation: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            operation: operation.into(),
            cause: RemoteCause::InvalidResponse(reason.to_string()),
        }
    }
}

impl fmt::Display for WipeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WipeError::Config(e) => write!(f, "Configuration error: {}", e),
            WipeError::Remote(e) => write!(f, "Remote call error: {}", e),
            WipeError::Lifecycle(e) => write!(f, "Lifecycle error: {}", e),
            WipeError::FileOperation(e) => write!(f, "File operation error: {}", e),
            WipeError::Busy { server_id } => {
                write!(f, "Server {} already has a wipe in progress", server_id)
            }
            WipeError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required field: {}", field)
            }
            ConfigError::ParseError { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }
        }
    }
}

impl fmt::Display for RemoteCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            RemoteCause::Transport(reason) => {
                write!(f, "{} failed: {}", self.operation, reason)
            }
            RemoteCause::Status { status, body } if body.is_empty() => {
                write!(f, "{} returned status {}", self.operation, status)
            }
            RemoteCause::Status { status, body } => {
                write!(f, "{} returned status {}: {}", self.operation, status, body)
            }
            RemoteCause::InvalidResponse(reason) => {
                write!(f, "{} returned an invalid response: {}", self.operation, reason)
            }
        }
    }
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::Timeout {
                server_id,
                target,
                attempts,
                last_state,
            } => {
                write!(
                    f,
                    "server {} is NOT {}! (retries: {}, last state: {})",
                    server_id,
                    target,
                    attempts,
                    last_state.as_deref().unwrap_or("unknown")
                )
            }
            LifecycleError::SignalFailed {
                server_id,
                signal,
                source,
            } => {
                write!(f, "error sending '{}' to server {}: {}", signal, server_id, source)
            }
            LifecycleError::PollFailed {
                server_id,
                attempt,
                source,
            } => {
                write!(
                    f,
                    "error checking server {} status (try #{}): {}",
                    server_id, attempt, source
                )
            }
        }
    }
}

impl fmt::Display for FileOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOperationError::ListFailed { root, source } => {
                write!(f, "Listing '{}' failed: {}", root, source)
            }
            FileOperationError::InvalidPattern {
                root,
                pattern,
                reason,
            } => {
                write!(f, "Invalid glob '{}' under '{}': {}", pattern, root, reason)
            }
            FileOperationError::DeleteFailed { count, source } => {
                write!(f, "Deleting {} files failed: {}", count, source)
            }
        }
    }
}

// Implement std::error::Error
impl std::error::Error for WipeError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for RemoteCallError {}
impl std::error::Error for LifecycleError {}
impl std::error::Error for FileOperationError {}

impl From<ConfigError> for WipeError {
    fn from(err: ConfigError) -> Self {
        WipeError::Config(err)
    }
}

impl From<RemoteCallError> for WipeError {
    fn from(err: RemoteCallError) -> Self {
        WipeError::Remote(err)
    }
}

impl From<LifecycleError> for WipeError {
    fn from(err: LifecycleError) -> Self {
        WipeError::Lifecycle(err)
    }
}

impl From<FileOperationError> for WipeError {
    fn from(err: FileOperationError) -> Self {
        WipeError::FileOperation(err)
    }
}

impl From<std::io::Error> for WipeError {
    fn from(err: std::io::Error) -> Self {
        WipeError::Io(err)
    }
}
