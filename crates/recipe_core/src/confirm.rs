//! Yes/no confirmation seam. The page awaits an answer; the rendering layer
//! decides how the question is asked.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Resolves to `true` only when the user explicitly confirms.
    async fn confirm(&self, message: &str) -> bool;
}

/// Always gives the same answer.
pub struct FixedConfirmer(pub bool);

#[async_trait]
impl Confirmer for FixedConfirmer {
    async fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}

/// A pending modal question. Dropping it without answering counts as "no".
#[derive(Debug)]
pub struct ConfirmRequest {
    pub message: String,
    responder: oneshot::Sender<bool>,
}

impl ConfirmRequest {
    pub fn respond(self, confirmed: bool) {
        let _ = self.responder.send(confirmed);
    }
}

/// Hands each question to whoever drains the paired receiver, e.g. a GUI
/// event loop rendering a modal with YES/NO buttons.
#[derive(Clone)]
pub struct ModalConfirmer {
    requests: mpsc::Sender<ConfirmRequest>,
}

impl ModalConfirmer {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ConfirmRequest>) {
        let (requests, rx) = mpsc::channel(capacity.max(1));
        (Self { requests }, rx)
    }
}

#[async_trait]
impl Confirmer for ModalConfirmer {
    async fn confirm(&self, message: &str) -> bool {
        let (responder, answer) = oneshot::channel();
        let request = ConfirmRequest {
            message: message.to_string(),
            responder,
        };
        if self.requests.send(request).await.is_err() {
            warn!("confirmation modal is not being served; treating as declined");
            return false;
        }
        answer.await.unwrap_or(false)
    }
}
