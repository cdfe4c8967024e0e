//! Transport trait abstraction for pluggable command senders

use async_trait::async_trait;
use grid_dispatch_shared::{SendOutcome, UdpCommand};

/// Delivers one command, fire-and-forget
///
/// Implementations never return an error: every failure is folded into a
/// `SendOutcome` with `success == false`.
#[async_trait]
pub trait CommandSender: Send + Sync {
    /// Send a single command to its destination
    async fn send(&self, command: &UdpCommand) -> SendOutcome;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}
