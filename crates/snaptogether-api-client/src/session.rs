//! Session store: owns the workflow state and runs its side effects

use std::path::Path;
use std::sync::Arc;

use snaptogether_core::{
    present, transition, Command, GenerationResult, PhotoSlot, Presentation, SessionState,
    Transition, WorkflowError, WorkflowEvent, WorkflowStage,
};
use snaptogether_processing::{PhotoFile, UploadGate};
use tokio::sync::Mutex;

use crate::{ClientError, MergeService};

/// How a `generate` call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// The result was applied to the session
    Completed(GenerationResult),
    /// The session moved on (reset, photo removed, pose changed) while the
    /// request was in flight; the late result was dropped
    Discarded,
}

/// Failure recorded when a `generate` call is dropped before its request settles
pub const GENERATION_CANCELLED: &str = "Generation was cancelled before it finished";

/// Settles an in-flight ticket as failed if the `generate` future is dropped
/// mid-request, so the session never stays in `Generating`.
struct InFlightGuard {
    state: Arc<Mutex<SessionState>>,
    ticket: u64,
    armed: bool,
}

impl InFlightGuard {
    fn new(state: Arc<Mutex<SessionState>>, ticket: u64) -> Self {
        Self {
            state,
            ticket,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

fn settle_cancelled(state: &mut SessionState, ticket: u64) {
    let event = WorkflowEvent::GenerationSettled {
        ticket,
        result: GenerationResult::failed(GENERATION_CANCELLED),
    };
    if let Ok(next) = transition(state, event) {
        if !next.stale_response {
            *state = next.state;
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::info!(ticket = self.ticket, "Generation dropped before it settled");

        let ticket = self.ticket;
        match self.state.try_lock() {
            Ok(mut state) => settle_cancelled(&mut state, ticket),
            Err(_) => {
                // Someone else holds the lock; settle once it is released
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    let state = self.state.clone();
                    handle.spawn(async move {
                        settle_cancelled(&mut *state.lock().await, ticket);
                    });
                }
            }
        }
    }
}

/// One user's upload → pose → generate session.
///
/// The state lives behind a mutex that is never held across the network call
/// or photo encoding. Single flight comes from the in-flight ticket: a second
/// `generate` while one is pending fails with `GenerationInFlight`.
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    gate: UploadGate,
    service: Arc<dyn MergeService>,
}

impl Session {
    pub fn new(gate: UploadGate, service: Arc<dyn MergeService>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::new())),
            gate,
            service,
        }
    }

    /// Session with the default 10 MiB / JPEG-PNG-WebP upload limits
    pub fn with_service(service: Arc<dyn MergeService>) -> Self {
        Self::new(UploadGate::default(), service)
    }

    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn stage(&self) -> WorkflowStage {
        self.state.lock().await.stage()
    }

    pub async fn presentation(&self) -> Presentation {
        present(&*self.state.lock().await)
    }

    async fn apply(&self, event: WorkflowEvent) -> Result<Transition, ClientError> {
        let mut state = self.state.lock().await;
        let next = transition(&state, event)?;
        *state = next.state.clone();
        Ok(next)
    }

    /// Validate and encode `file`, then place it in `slot`.
    ///
    /// A rejected file leaves the session untouched.
    pub async fn submit_photo(
        &self,
        slot: PhotoSlot,
        file: PhotoFile,
    ) -> Result<Presentation, ClientError> {
        let photo = self.gate.submit_photo(slot, file).await?;
        let next = self.apply(WorkflowEvent::PhotoSubmitted(photo)).await?;
        Ok(present(&next.state))
    }

    /// Like [`Session::submit_photo`], reading the file from disk
    pub async fn open_photo(&self, slot: PhotoSlot, path: &Path) -> Result<Presentation, ClientError> {
        let photo = self.gate.open_and_submit(slot, path).await?;
        let next = self.apply(WorkflowEvent::PhotoSubmitted(photo)).await?;
        Ok(present(&next.state))
    }

    pub async fn remove_photo(&self, slot: PhotoSlot) -> Result<Presentation, ClientError> {
        let next = self.apply(WorkflowEvent::PhotoRemoved(slot)).await?;
        Ok(present(&next.state))
    }

    pub async fn select_pose(&self, pose: impl Into<String>) -> Result<Presentation, ClientError> {
        let next = self.apply(WorkflowEvent::PoseSelected(pose.into())).await?;
        Ok(present(&next.state))
    }

    /// "Create another": back to an empty session
    pub async fn reset(&self) -> Presentation {
        let mut state = self.state.lock().await;
        // Reset is accepted from every state
        if let Ok(next) = transition(&state, WorkflowEvent::Reset) {
            *state = next.state;
        }
        present(&state)
    }

    /// Send the current photos and pose to the merge service and apply the
    /// result, unless the session moved on in the meantime.
    ///
    /// Dropping the returned future mid-request settles the ticket as a failed
    /// generation, leaving the session ready for a retry.
    pub async fn generate(&self) -> Result<GenerateOutcome, ClientError> {
        let next = self.apply(WorkflowEvent::GenerateRequested).await?;
        let Some(Command::DispatchMerge(request)) = next.command else {
            return Err(ClientError::Workflow(WorkflowError::NotReady));
        };
        let guard = InFlightGuard::new(self.state.clone(), request.ticket);

        tracing::info!(ticket = request.ticket, pose = %request.pose, "Generating merged photo");

        let result = self
            .service
            .request_merge(&request.photo1, &request.photo2, &request.pose)
            .await;

        let settled = self
            .apply(WorkflowEvent::GenerationSettled {
                ticket: request.ticket,
                result: result.clone(),
            })
            .await?;
        guard.disarm();

        if settled.stale_response {
            tracing::info!(ticket = request.ticket, "Discarding result for a superseded request");
            return Ok(GenerateOutcome::Discarded);
        }

        Ok(GenerateOutcome::Completed(result))
    }
}
