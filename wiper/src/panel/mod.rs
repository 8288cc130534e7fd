// File: wiper/src/panel/mod.rs
//! HTTP adapter for the game server control panel
//!
//! Only the client API operations the wipe workflow needs are modeled:
//!
//! ```text
//! GET  /servers/{id}                    server metadata
//! POST /servers/{id}/power              {signal: start|stop}
//! GET  /servers/{id}/resources          current_state
//! GET  /servers/{id}/files/list         ?directory=
//! POST /servers/{id}/files/delete       {root, files}
//! PUT  /servers/{id}/startup/variable   {key, value}
//! POST /servers/{id}/command            {command: "say <text>"}
//! ```
//!
//! The adapter never retries. Any transport failure, non-2xx status or
//! malformed body surfaces as a `RemoteCallError`; callers decide whether a
//! failure is fatal (status polls) or can be logged and ignored (chat messages).
//! One client is shared by every concurrent run.

pub mod client;

pub use client::PanelClient;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSignal {
    Start,
    Stop,
}

impl fmt::Display for PowerSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerSignal::Start => write!(f, "start"),
            PowerSignal::Stop => write!(f, "stop"),
        }
    }
}

/// Panel attributes of a server the workflow logs
#[derive(Debug, Clone, Deserialize)]
pub struct ServerMetadata {
    pub name: String,
    #[serde(default)]
    pub node: Option<String>,
}

/// Remote process state as last reported by the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerState {
    Starting,
    Running,
    Stopping,
    Offline,
    Other(String),
}

impl ServerState {
    pub fn parse(state: &str) -> Self {
        match state {
            "starting" => ServerState::Starting,
            "running" => ServerState::Running,
            "stopping" => ServerState::Stopping,
            "offline" => ServerState::Offline,
            other => ServerState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerState::Starting => write!(f, "starting"),
            ServerState::Running => write!(f, "running"),
            ServerState::Stopping => write!(f, "stopping"),
            ServerState::Offline => write!(f, "offline"),
            ServerState::Other(state) => write!(f, "{}", state),
        }
    }
}

// Wire shapes

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub attributes: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceAttributes {
    pub current_state: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileListing {
    pub data: Vec<Envelope<FileAttributes>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileAttributes {
    pub name: String,
}
