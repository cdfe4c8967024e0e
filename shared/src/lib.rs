//! Grid Dispatch Shared Types
//!
//! This crate provides the grid item model, the dispatch request/result
//! types and the datagram codec shared by the dispatcher and the control
//! listener.

pub mod codec;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Default parameters for the dispatch subsystem
pub mod defaults {
    /// Host every grid action targets unless reconfigured
    pub const TARGET_HOST: &str = "localhost";

    /// Port of the control listener
    pub const TARGET_PORT: u16 = 5000;

    /// Upper bound on address resolution plus the datagram write
    pub const SEND_TIMEOUT_MS: u64 = 2000;

    /// Lowest grid position
    pub const MIN_POSITION: u8 = 1;

    /// Highest grid position (3x3 grid)
    pub const MAX_POSITION: u8 = 9;
}

/// One operator-facing button of the grid, bound to a command string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridItem {
    pub id: i64,
    pub position: u8,
    pub title: String,
    /// Sent verbatim as the datagram payload; may be empty
    pub command: String,
    /// Milliseconds since Unix epoch
    pub created_at: u64,
}

impl GridItem {
    /// Navigation target shown after a click on this item
    pub fn detail_page_url(&self) -> String {
        format!("/detail/{}", self.id)
    }
}

/// Fields supplied when a grid item is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGridItem {
    pub position: u8,
    pub title: String,
    pub command: String,
}

/// A click on a grid item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// May reference a nonexistent item
    pub grid_item_id: i64,
}

impl DispatchRequest {
    pub fn new(grid_item_id: i64) -> Self {
        Self { grid_item_id }
    }
}

/// Outcome of one dispatch, returned to the request layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    /// True iff the local transmit completed; says nothing about remote receipt
    pub success: bool,
    pub message: String,
    /// Empty when the grid item could not be resolved
    #[serde(rename = "detailPageUrl")]
    pub detail_page_url: String,
}

impl DispatchResult {
    /// Result for an id with no matching grid item
    pub fn not_found(grid_item_id: i64) -> Self {
        Self {
            success: false,
            message: format!("Grid item with ID {} not found", grid_item_id),
            detail_page_url: String::new(),
        }
    }

    /// Result for a resolved item, whatever the transport did
    pub fn clicked(item: &GridItem, outcome: SendOutcome) -> Self {
        Self {
            success: outcome.success,
            message: format!("Grid item \"{}\" clicked. {}", item.title, outcome.message),
            detail_page_url: item.detail_page_url(),
        }
    }
}

/// A command addressed to a UDP listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UdpCommand {
    pub command: String,
    #[serde(default = "default_target_host")]
    pub target_host: String,
    #[serde(default = "default_target_port")]
    pub target_port: u16,
}

fn default_target_host() -> String {
    defaults::TARGET_HOST.into()
}

fn default_target_port() -> u16 {
    defaults::TARGET_PORT
}

impl UdpCommand {
    /// Create a command for the default destination
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            target_host: default_target_host(),
            target_port: default_target_port(),
        }
    }

    /// Create a command for an explicit destination
    pub fn with_target(
        command: impl Into<String>,
        target_host: impl Into<String>,
        target_port: u16,
    ) -> Self {
        Self {
            command: command.into(),
            target_host: target_host.into(),
            target_port,
        }
    }

    /// `host:port` as accepted by address resolution
    pub fn destination(&self) -> String {
        format!("{}:{}", self.target_host, self.target_port)
    }
}

/// What the transport reports for a single send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    pub success: bool,
    pub message: String,
}

impl SendOutcome {
    /// The datagram was handed to the local network stack
    pub fn sent(command: &UdpCommand) -> Self {
        Self {
            success: true,
            message: format!(
                "UDP command '{}' sent successfully to {}:{}",
                command.command, command.target_host, command.target_port
            ),
        }
    }

    /// Resolution or the write failed
    pub fn failed(cause: impl fmt::Display) -> Self {
        Self {
            success: false,
            message: format!("Failed to send UDP command: {}", cause),
        }
    }
}
