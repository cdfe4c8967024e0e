//! Click driver loop: request lines in, one JSON response line out per request

use crate::dispatch::{DispatchCoordinator, DispatchError};
use crate::request::{self, Request};
use crate::store::InMemoryGridStore;
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Serves request lines until end of input, a read error or cancellation
///
/// Each click runs on its own task. Lines that are not valid UTF-8 are
/// decoded lossily and rejected like any other malformed request. Clicks
/// already in flight are always awaited before returning, so their
/// responses reach `out` even when reading fails.
pub async fn run<R>(
    mut input: R,
    coordinator: Arc<DispatchCoordinator>,
    store: Arc<InMemoryGridStore>,
    cancel: CancellationToken,
    out: mpsc::UnboundedSender<String>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut tasks = JoinSet::new();
    let mut buf = Vec::new();

    let outcome = loop {
        buf.clear();
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => break Ok(()),
            read = input.read_until(b'\n', &mut buf) => read,
        };
        match read {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e).context("reading requests"),
        }

        let line = String::from_utf8_lossy(&buf);
        match request::parse_line(&line) {
            Ok(Some(Request::Click(click))) => {
                let coordinator = coordinator.clone();
                let cancel = cancel.clone();
                let out = out.clone();
                tasks.spawn(async move {
                    match coordinator.dispatch_cancellable(click, &cancel).await {
                        Ok(result) => respond(&out, &result),
                        Err(e @ DispatchError::Cancelled(_)) => warn!("{}", e),
                        Err(e) => {
                            error!("Dispatch failed: {}", e);
                            respond(&out, &serde_json::json!({ "error": e.to_string() }));
                        }
                    }
                });
            }
            Ok(Some(Request::Send(command))) => {
                let coordinator = coordinator.clone();
                let out = out.clone();
                tasks.spawn(async move {
                    respond(&out, &coordinator.send_direct(&command).await);
                });
            }
            Ok(Some(Request::List)) => respond(&out, &store.list().await),
            Ok(None) => {}
            Err(e) => warn!("Ignoring request: {}", e),
        }

        // Reap finished clicks so the set doesn't grow with the session
        while let Some(joined) = tasks.try_join_next() {
            if let Err(e) = joined {
                error!("Dispatch task failed: {}", e);
            }
        }
    };

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!("Dispatch task failed: {}", e);
        }
    }

    outcome
}

fn respond<T: Serialize>(out: &mpsc::UnboundedSender<String>, value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => {
            // The receiver only goes away at shutdown
            let _ = out.send(line);
        }
        Err(e) => error!("Failed to serialize response: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatchConfig;
    use crate::transport::CommandSender;
    use async_trait::async_trait;
    use grid_dispatch_shared::{NewGridItem, SendOutcome, UdpCommand};
    use serde_json::Value;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context as TaskContext, Poll};
    use tokio::io::{AsyncRead, ReadBuf};

    struct AcceptingSender;

    #[async_trait]
    impl CommandSender for AcceptingSender {
        async fn send(&self, command: &UdpCommand) -> SendOutcome {
            SendOutcome::sent(command)
        }

        fn name(&self) -> &'static str {
            "Accepting"
        }
    }

    /// Yields `data`, then fails every later read
    struct FailingReader {
        data: Option<&'static [u8]>,
    }

    impl AsyncRead for FailingReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut TaskContext<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.data.take() {
                Some(data) => {
                    buf.put_slice(data);
                    Poll::Ready(Ok(()))
                }
                None => Poll::Ready(Err(io::Error::other("device gone"))),
            }
        }
    }

    async fn setup() -> (Arc<DispatchCoordinator>, Arc<InMemoryGridStore>) {
        let store = Arc::new(InMemoryGridStore::new());
        store
            .create(NewGridItem {
                position: 1,
                title: "Top Left".into(),
                command: "img-1".into(),
            })
            .await
            .unwrap();
        let coordinator = Arc::new(DispatchCoordinator::new(
            store.clone(),
            Arc::new(AcceptingSender),
            DispatchConfig::default(),
        ));
        (coordinator, store)
    }

    async fn run_input<R: AsyncBufRead + Unpin>(input: R) -> (Result<()>, Vec<Value>) {
        let (coordinator, store) = setup().await;
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = run(input, coordinator, store, CancellationToken::new(), tx).await;

        let mut responses = Vec::new();
        while let Some(line) = rx.recv().await {
            responses.push(serde_json::from_str(&line).unwrap());
        }
        (result, responses)
    }

    fn find_url<'a>(responses: &'a [Value], url: &str) -> Option<&'a Value> {
        responses.iter().find(|r| r["detailPageUrl"] == url)
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_skipped() {
        let input: &[u8] = b"1\n\xff\n2\n";
        let (result, responses) = run_input(input).await;

        assert!(result.is_ok());
        assert_eq!(responses.len(), 2);

        let clicked = find_url(&responses, "/detail/1").expect("click 1 missing");
        assert_eq!(clicked["success"], true);
        assert!(responses
            .iter()
            .any(|r| r["message"] == "Grid item with ID 2 not found"));
    }

    #[tokio::test]
    async fn test_read_error_still_reports_clicks() {
        let input = tokio::io::BufReader::new(FailingReader {
            data: Some(b"1\n"),
        });
        let (result, responses) = run_input(input).await;

        assert!(result.is_err());
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["success"], true);
        assert_eq!(responses[0]["detailPageUrl"], "/detail/1");
    }

    #[tokio::test]
    async fn test_list_and_direct_send() {
        let input: &[u8] = b"list\nsend 127.0.0.1:5999 ping\nbogus\n";
        let (result, responses) = run_input(input).await;

        assert!(result.is_ok());
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0][0]["title"], "Top Left");
        assert_eq!(
            responses[1]["message"],
            "UDP command 'ping' sent successfully to 127.0.0.1:5999"
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_input() {
        let (coordinator, store) = setup().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let input: &[u8] = b"1\n";
        let result = run(input, coordinator, store, cancel, tx).await;

        assert!(result.is_ok());
        assert!(rx.recv().await.is_none());
    }
}
