//! Dispatch coordinator: resolve, send, build the click result

use crate::config::DispatchConfig;
use crate::store::{GridItemStore, StoreError};
use crate::transport::CommandSender;
use grid_dispatch_shared::{DispatchRequest, DispatchResult, SendOutcome, UdpCommand};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Hard failures of a dispatch call
///
/// Not-found items and transport failures are not errors; they come back
/// as a `DispatchResult` with `success == false`.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("grid item lookup failed: {0}")]
    Storage(#[from] StoreError),

    #[error("dispatch of grid item {0} cancelled")]
    Cancelled(i64),
}

/// Turns grid clicks into commands sent to the control listener
pub struct DispatchCoordinator {
    store: Arc<dyn GridItemStore>,
    sender: Arc<dyn CommandSender>,
    config: DispatchConfig,
}

impl DispatchCoordinator {
    /// Create a coordinator sending every command to `config`'s target
    pub fn new(
        store: Arc<dyn GridItemStore>,
        sender: Arc<dyn CommandSender>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            store,
            sender,
            config,
        }
    }

    /// Handle one click
    pub async fn dispatch(
        &self,
        request: DispatchRequest,
    ) -> Result<DispatchResult, DispatchError> {
        let id = request.grid_item_id;

        let item = match self.store.find_by_id(id).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                info!("[DISPATCH] Grid item {} not found", id);
                return Ok(DispatchResult::not_found(id));
            }
            Err(e) => {
                error!("[DISPATCH] Lookup of grid item {} failed: {}", id, e);
                return Err(DispatchError::Storage(e));
            }
        };

        let command = UdpCommand::with_target(
            item.command.clone(),
            self.config.target_host.clone(),
            self.config.target_port,
        );
        let outcome = self.sender.send(&command).await;

        if outcome.success {
            info!(
                "[DISPATCH] Grid item {} (\"{}\") -> '{}' via {}",
                item.id,
                item.title,
                command.command,
                self.sender.name()
            );
        } else {
            warn!(
                "[DISPATCH] Grid item {} (\"{}\"): {}",
                item.id, item.title, outcome.message
            );
        }

        Ok(DispatchResult::clicked(&item, outcome))
    }

    /// Handle one click, giving up as soon as `cancel` fires
    ///
    /// The in-flight send is dropped on cancellation, which releases its
    /// socket.
    pub async fn dispatch_cancellable(
        &self,
        request: DispatchRequest,
        cancel: &CancellationToken,
    ) -> Result<DispatchResult, DispatchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(
                    "[DISPATCH] Grid item {} dispatch cancelled",
                    request.grid_item_id
                );
                Err(DispatchError::Cancelled(request.grid_item_id))
            }
            result = self.dispatch(request) => result,
        }
    }

    /// Send an arbitrary command to an explicit destination
    pub async fn send_direct(&self, command: &UdpCommand) -> SendOutcome {
        self.sender.send(command).await
    }

    /// The configured destination as `host:port`
    pub fn target(&self) -> String {
        format!("{}:{}", self.config.target_host, self.config.target_port)
    }
}
