//! Photo workflow state machine
//!
//! The session is a single value updated by [`transition`]; the stage and the
//! presentation are derived from it on demand and never stored.

mod presentation;

pub use presentation::*;

use serde::{Deserialize, Serialize};

use crate::models::{GenerationResult, PhotoSlot, UploadedPhoto};

/// Where the user is in the upload → pose → generate → result flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    /// Zero or one photo uploaded
    Empty,
    ReadyForPose,
    ReadyToGenerate,
    Generating,
    Result,
    /// Last request failed; presents like `ReadyToGenerate` plus an error
    Failed,
}

impl WorkflowStage {
    /// Stages from which a new generation request may be dispatched
    pub fn can_generate(self) -> bool {
        matches!(
            self,
            WorkflowStage::ReadyToGenerate | WorkflowStage::Failed | WorkflowStage::Result
        )
    }
}

/// Derive the stage from the state tuple.
///
/// `result` is `None` when no result is held, otherwise the result's success flag.
pub fn derive_stage(
    photo1: bool,
    photo2: bool,
    pose: bool,
    in_flight: bool,
    result: Option<bool>,
) -> WorkflowStage {
    if in_flight {
        return WorkflowStage::Generating;
    }
    match (photo1 && photo2, pose, result) {
        (true, true, Some(true)) => WorkflowStage::Result,
        (true, true, Some(false)) => WorkflowStage::Failed,
        (true, true, None) => WorkflowStage::ReadyToGenerate,
        (true, false, _) => WorkflowStage::ReadyForPose,
        _ => WorkflowStage::Empty,
    }
}

/// The whole client session. Only [`transition`] produces new values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    photo1: Option<UploadedPhoto>,
    photo2: Option<UploadedPhoto>,
    pose: Option<String>,
    in_flight: Option<u64>,
    result: Option<GenerationResult>,
    // Survives Reset so tickets issued before a reset never match again
    next_ticket: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn photo(&self, slot: PhotoSlot) -> Option<&UploadedPhoto> {
        match slot {
            PhotoSlot::First => self.photo1.as_ref(),
            PhotoSlot::Second => self.photo2.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: PhotoSlot) -> &mut Option<UploadedPhoto> {
        match slot {
            PhotoSlot::First => &mut self.photo1,
            PhotoSlot::Second => &mut self.photo2,
        }
    }

    pub fn pose(&self) -> Option<&str> {
        self.pose.as_deref()
    }

    pub fn in_flight_ticket(&self) -> Option<u64> {
        self.in_flight
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    pub fn has_both_photos(&self) -> bool {
        self.photo1.is_some() && self.photo2.is_some()
    }

    pub fn stage(&self) -> WorkflowStage {
        derive_stage(
            self.photo1.is_some(),
            self.photo2.is_some(),
            self.pose.is_some(),
            self.in_flight.is_some(),
            self.result.as_ref().map(|r| r.success),
        )
    }

    fn invalidate_generation(&mut self) {
        self.in_flight = None;
        self.result = None;
    }
}

/// User actions and request completions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// A validated photo was submitted; its slot comes from the photo itself
    PhotoSubmitted(UploadedPhoto),
    PhotoRemoved(PhotoSlot),
    PoseSelected(String),
    GenerateRequested,
    GenerationSettled {
        ticket: u64,
        result: GenerationResult,
    },
    Reset,
}

/// Everything the dispatcher needs to send one generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    pub ticket: u64,
    pub photo1: String,
    pub photo2: String,
    pub pose: String,
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    DispatchMerge(MergeRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub command: Option<Command>,
    /// Set when a settled result was dropped because its ticket is no longer current
    pub stale_response: bool,
}

impl Transition {
    fn to(state: SessionState) -> Self {
        Self {
            state,
            command: None,
            stale_response: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Please upload both photos first")]
    PhotosRequired,

    #[error("Please upload both photos and select a pose")]
    NotReady,

    #[error("A generation request is already in progress")]
    GenerationInFlight,
}

/// Apply one event to the session.
///
/// Rejected events leave the caller's state untouched; there is no partial update.
pub fn transition(state: &SessionState, event: WorkflowEvent) -> Result<Transition, WorkflowError> {
    let mut next = state.clone();

    match event {
        WorkflowEvent::PhotoSubmitted(photo) => {
            // Replacing a photo keeps the pose but any result refers to the old pair
            let slot = photo.slot;
            *next.slot_mut(slot) = Some(photo);
            next.invalidate_generation();
        }
        WorkflowEvent::PhotoRemoved(slot) => {
            *next.slot_mut(slot) = None;
            next.pose = None;
            next.invalidate_generation();
        }
        WorkflowEvent::PoseSelected(pose) => {
            if !next.has_both_photos() {
                return Err(WorkflowError::PhotosRequired);
            }
            if next.pose.as_deref() != Some(pose.as_str()) {
                next.pose = Some(pose);
                next.invalidate_generation();
            }
        }
        WorkflowEvent::GenerateRequested => {
            if next.in_flight.is_some() {
                return Err(WorkflowError::GenerationInFlight);
            }
            if !next.stage().can_generate() {
                return Err(WorkflowError::NotReady);
            }
            let (Some(photo1), Some(photo2), Some(pose)) =
                (next.photo1.as_ref(), next.photo2.as_ref(), next.pose.as_ref())
            else {
                return Err(WorkflowError::NotReady);
            };

            let ticket = next.next_ticket;
            let request = MergeRequest {
                ticket,
                photo1: photo1.encoded.clone(),
                photo2: photo2.encoded.clone(),
                pose: pose.clone(),
            };
            next.next_ticket += 1;
            next.in_flight = Some(ticket);
            next.result = None;

            return Ok(Transition {
                state: next,
                command: Some(Command::DispatchMerge(request)),
                stale_response: false,
            });
        }
        WorkflowEvent::GenerationSettled { ticket, result } => {
            if next.in_flight != Some(ticket) {
                return Ok(Transition {
                    state: next,
                    command: None,
                    stale_response: true,
                });
            }
            next.in_flight = None;
            next.result = Some(result);
        }
        WorkflowEvent::Reset => {
            next = SessionState {
                next_ticket: state.next_ticket,
                ..SessionState::default()
            };
        }
    }

    Ok(Transition::to(next))
}
