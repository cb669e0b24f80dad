use serde::Serialize;

use super::{SessionState, WorkflowStage};
use crate::models::PhotoSlot;

/// What a front end should show for a given session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub stage: WorkflowStage,
    pub photo1_preview: Option<String>,
    pub photo2_preview: Option<String>,
    pub show_pose_selection: bool,
    pub selected_pose: Option<String>,
    pub show_generate: bool,
    pub show_progress: bool,
    /// Result image plus the download and "create another" affordances
    pub show_result: bool,
    pub result_image: Option<String>,
    pub analysis: Option<String>,
    pub error_message: Option<String>,
}

/// Text shown when the last generation attempt failed
pub fn failure_notice(error: &str) -> String {
    format!(
        "Failed to generate merged photo. Please check your API configuration and try again.\n\nError: {}",
        error
    )
}

/// Project the session onto the visible surfaces. Pure; recomputed after every transition.
pub fn present(state: &SessionState) -> Presentation {
    let stage = state.stage();
    let preview = |slot| state.photo(slot).map(|p| p.encoded.clone());

    let mut view = Presentation {
        stage,
        photo1_preview: preview(PhotoSlot::First),
        photo2_preview: preview(PhotoSlot::Second),
        show_pose_selection: state.has_both_photos(),
        selected_pose: state.pose().map(str::to_string),
        show_generate: false,
        show_progress: false,
        show_result: false,
        result_image: None,
        analysis: None,
        error_message: None,
    };

    match stage {
        WorkflowStage::Empty | WorkflowStage::ReadyForPose => {}
        WorkflowStage::ReadyToGenerate => view.show_generate = true,
        WorkflowStage::Generating => view.show_progress = true,
        WorkflowStage::Result => {
            if let Some(result) = state.result() {
                view.show_result = true;
                view.result_image = Some(result.image_url.clone());
                view.analysis = Some(result.analysis_text.clone()).filter(|a| !a.is_empty());
            }
        }
        WorkflowStage::Failed => {
            view.show_generate = true;
            view.error_message = state.result().map(|r| {
                failure_notice(
                    r.error_message
                        .as_deref()
                        .unwrap_or(crate::models::GenerationResult::DEFAULT_FAILURE),
                )
            });
        }
    }

    view
}
