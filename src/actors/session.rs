//! Support Session Actor
//!
//! Information Hiding:
//! - Context ownership hidden inside the actor task
//! - Turn ordering guaranteed by the mailbox
//! - Channel plumbing hidden behind handle methods

use std::sync::Arc;

use tokio::sync::mpsc::{channel, Receiver, Sender};
use tokio::sync::oneshot;

use super::messages::{SessionMessage, TurnRequest};
use crate::context::SupportContext;
use crate::error::{Result, SupportError};
use crate::orchestrator::{SupportOrchestrator, TurnOutcome};

/// Handle to one customer's session; the context lives in the actor task
#[derive(Clone)]
pub struct SupportSessionHandle {
    sender: Sender<SessionMessage>,
}

impl SupportSessionHandle {
    pub fn new(
        orchestrator: Arc<SupportOrchestrator>,
        context: SupportContext,
        buffer_size: usize,
    ) -> Self {
        let (sender, receiver) = channel(buffer_size.max(1));
        tokio::spawn(session_actor(receiver, orchestrator, context));
        Self { sender }
    }

    /// Run one turn and wait for its outcome
    pub async fn submit(&self, input: impl Into<String>) -> Result<TurnOutcome> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(SessionMessage::Turn(TurnRequest {
            input: input.into(),
            response: response_tx,
        }))
        .await?;

        response_rx.await.map_err(|_| SupportError::SessionClosed)?
    }

    pub async fn snapshot(&self) -> Result<SupportContext> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(SessionMessage::Snapshot(response_tx)).await?;
        response_rx.await.map_err(|_| SupportError::SessionClosed)
    }

    /// Stop the actor; turns already queued behind the stop are dropped
    pub async fn shutdown(&self) -> Result<()> {
        self.send(SessionMessage::Stop).await
    }

    async fn send(&self, message: SessionMessage) -> Result<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SupportError::SessionClosed)
    }
}

async fn session_actor(
    mut receiver: Receiver<SessionMessage>,
    orchestrator: Arc<SupportOrchestrator>,
    mut context: SupportContext,
) {
    tracing::info!("Support session started for {}", context.customer_id());

    while let Some(message) = receiver.recv().await {
        match message {
            SessionMessage::Turn(request) => {
                let outcome = orchestrator.handle_turn(&mut context, &request.input).await;
                if let Err(e) = &outcome {
                    tracing::error!("Turn failed for {}: {}", context.customer_id(), e);
                }
                let _ = request.response.send(outcome);
            }
            SessionMessage::Snapshot(response) => {
                let _ = response.send(context.clone());
            }
            SessionMessage::Stop => {
                tracing::info!("Support session for {} stopping", context.customer_id());
                break;
            }
        }
    }

    tracing::info!("Support session for {} closed", context.customer_id());
}
