//! `POST /api/generate`: forward two photos and a pose to the upstream model

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use std::time::Duration;

use snaptogether_core::{
    AppError, GenerateParams, GenerateRequest, GenerateResponse, GenerationMode,
};
use snaptogether_plugins::{build_prompt, DescribeContext, InlineImage};

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

const SUCCESS_MESSAGE: &str = "Analysis complete";
const PLACEHOLDER_NOTE: &str = "This is a demo response. The returned image is photo 1 until an image generation service is integrated.";
const CLIENT_SIDE_MERGE: &str = "client-side-merge";

/// Validate the body, read the credential, ask the upstream model for an
/// analysis and reply with it.
///
/// `imageUrl` is a placeholder: the upstream model only returns text, so the
/// first photo is echoed back.
#[tracing::instrument(skip(state, request), fields(operation = "generate"))]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<GenerateRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let params = GenerateParams::try_from(request).map_err(|missing| {
        tracing::debug!(missing = ?missing.0, "Generate request is missing fields");
        AppError::BadRequest("Missing required parameters".to_string())
    })?;

    let images = vec![
        InlineImage::from_data_uri(&params.photo1).map_err(AppError::from)?,
        InlineImage::from_data_uri(&params.photo2).map_err(AppError::from)?,
    ];

    let provider = state.config.provider();
    let env_var = provider.api_key_env();
    let api_key = state
        .credentials
        .api_key(env_var)
        .ok_or_else(|| AppError::missing_credential(env_var))?;
    state
        .describer
        .validate_api_key(&api_key)
        .map_err(|e| AppError::Configuration(e.to_string()))?;

    let mode = state.config.generation_mode();
    let timeout_secs = state.config.upstream_timeout_secs();

    tracing::info!(
        provider = %provider,
        mode = %mode,
        pose = %params.pose,
        photo1_type = %images[0].media_type,
        photo2_type = %images[1].media_type,
        "Requesting analysis from upstream model"
    );

    let context = DescribeContext {
        api_key,
        instruction: build_prompt(mode, &params.prompt, &params.pose),
        images,
    };

    let description = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        state.describer.describe_images(context),
    )
    .await
    .map_err(|_| AppError::UpstreamTimeout {
        seconds: timeout_secs,
    })?
    .map_err(AppError::from)?;

    if let Some(usage) = description.usage {
        tracing::debug!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Upstream token usage"
        );
    }

    let mut response = GenerateResponse {
        success: true,
        message: Some(SUCCESS_MESSAGE.to_string()),
        analysis: Some(description.text),
        image_url: Some(params.photo1.clone()),
        note: Some(PLACEHOLDER_NOTE.to_string()),
        ..Default::default()
    };

    if mode == GenerationMode::Analysis {
        response.photo1 = Some(params.photo1);
        response.photo2 = Some(params.photo2);
        response.pose = Some(params.pose);
        response.mode = Some(CLIENT_SIDE_MERGE.to_string());
    }

    Ok((StatusCode::OK, Json(response)))
}

/// Any method other than POST (OPTIONS is answered by the CORS layer)
pub async fn method_not_allowed() -> HttpAppError {
    HttpAppError(AppError::MethodNotAllowed)
}
