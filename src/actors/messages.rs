use tokio::sync::oneshot;

use crate::context::SupportContext;
use crate::error::Result;
use crate::orchestrator::TurnOutcome;

#[derive(Debug)]
pub struct TurnRequest {
    pub input: String,
    pub response: oneshot::Sender<Result<TurnOutcome>>,
}

#[derive(Debug)]
pub enum SessionMessage {
    Turn(TurnRequest),
    /// Copy of the session's context as it stands between turns
    Snapshot(oneshot::Sender<SupportContext>),
    Stop,
}
