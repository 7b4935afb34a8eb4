//! Best-effort replay of cart changes on the server.
//!
//! Cart mutations never wait on the network. Each change made while logged in
//! is pushed onto an unbounded queue that a single background task drains in
//! order. Failures are logged and dropped; the local cart stays authoritative.
//! The only failure reported back is session expiry, as a [`MirrorEvent`].

use drovo_core::{ItemId, ShopId};
use secrecy::SecretString;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::api::types::CartLine;
use crate::api::{ApiClient, CartAction};

/// Something the mirror worker needs the cart owner to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorEvent {
    /// The server answered `Token expired`; the session must be reset.
    SessionExpired,
}

/// One queued cart change.
#[derive(Debug)]
pub struct MirrorRequest {
    /// Token captured when the change was made.
    pub token: SecretString,
    pub action: CartAction,
    pub line: CartLine,
}

enum Message {
    Mirror(MirrorRequest),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background mirror task.
///
/// Must be created inside a Tokio runtime.
#[derive(Debug)]
pub struct CartMirror {
    sender: mpsc::UnboundedSender<Message>,
    events: mpsc::UnboundedReceiver<MirrorEvent>,
    worker: JoinHandle<()>,
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mirror(request) => f.debug_tuple("Mirror").field(request).finish(),
            Self::Flush(_) => f.write_str("Flush"),
        }
    }
}

impl CartMirror {
    /// Start the worker.
    #[must_use]
    pub fn spawn(api: ApiClient) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (event_sender, events) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run(api, receiver, event_sender));
        Self {
            sender,
            events,
            worker,
        }
    }

    /// Queue a cart change. Never blocks and never fails.
    pub fn enqueue(&self, token: &SecretString, action: CartAction, item: &ItemId, shop: &ShopId) {
        let request = MirrorRequest {
            token: token.clone(),
            action,
            line: CartLine {
                item_id: item.clone(),
                shop_id: shop.clone(),
            },
        };
        if self.sender.send(Message::Mirror(request)).is_err() {
            warn!(%action, "Cart mirror worker is gone; change not mirrored");
        }
    }

    /// Next event reported by the worker, if one is waiting.
    pub fn try_next_event(&mut self) -> Option<MirrorEvent> {
        self.events.try_recv().ok()
    }

    /// Wait until every change queued so far has been attempted.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.sender.send(Message::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }

    /// Drain the queue and stop the worker.
    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(e) = self.worker.await {
            warn!(error = %e, "Cart mirror worker panicked");
        }
    }
}

async fn run(
    api: ApiClient,
    mut receiver: mpsc::UnboundedReceiver<Message>,
    events: mpsc::UnboundedSender<MirrorEvent>,
) {
    while let Some(message) = receiver.recv().await {
        match message {
            Message::Mirror(request) => mirror_one(&api, &request, &events).await,
            Message::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Cart mirror queue closed");
}

#[instrument(skip_all, fields(action = %request.action, item_id = %request.line.item_id))]
async fn mirror_one(
    api: &ApiClient,
    request: &MirrorRequest,
    events: &mpsc::UnboundedSender<MirrorEvent>,
) {
    match api
        .mirror_cart(&request.token, request.action, &request.line)
        .await
    {
        Ok(()) => debug!("Cart change mirrored"),
        Err(e) if e.is_session_expired() => {
            warn!("Session expired while mirroring cart");
            let _ = events.send(MirrorEvent::SessionExpired);
        }
        Err(e) => warn!(error = %e, "Cart mirror failed; keeping local cart"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    #[tokio::test]
    async fn test_unreachable_server_is_ignored() {
        // Port 9 (discard) on loopback refuses connections on test machines
        let config = ClientConfig::for_api_url("http://127.0.0.1:9").unwrap();
        let mut mirror = CartMirror::spawn(ApiClient::new(&config));

        mirror.enqueue(
            &SecretString::from("tok"),
            CartAction::Add,
            &ItemId::new("i1"),
            &ShopId::new("s1"),
        );
        mirror.flush().await;

        assert_eq!(mirror.try_next_event(), None);
        mirror.shutdown().await;
    }
}
