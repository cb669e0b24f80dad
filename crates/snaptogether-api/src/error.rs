//! Rendering of [`AppError`] as JSON error bodies.
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>` and convert with `?`.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use snaptogether_core::{AppError, ErrorMetadata, LogLevel};

/// Failure body. `success` is always `false` so clients can branch on one field
/// for both outcomes of `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    pub code: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    fn from_app_error(error: &AppError, include_details: bool) -> Self {
        Self {
            success: false,
            error: error.client_message(),
            details: include_details.then(|| error.detailed_message()),
            error_type: include_details.then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        }
    }
}

/// `AppError` lives in snaptogether-core, so `IntoResponse` goes on this newtype
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Convert JSON body failures into our ErrorResponse format.
///
/// Bodies cut off by the request size limit become 413; everything else is a 400.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return HttpAppError(AppError::PayloadTooLarge(
                "Request body is too large. Upload smaller photos.".to_string(),
            ));
        }

        let body_text = rejection.body_text();
        let message = if body_text.contains("invalid type") {
            "Invalid request body: prompt, photo1, photo2 and pose must be strings.".to_string()
        } else {
            format!("Invalid request body: {}", body_text)
        };
        HttpAppError(AppError::InvalidInput(message))
    }
}

/// `Json<T>` whose rejections render as [`ErrorResponse`] bodies
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Generate request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Generate request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Generate request failed");
        }
    }
}

/// Body with `details` and `error_type` filled in, carried as a response
/// extension until [`render_error_details`] decides whether to use it
#[derive(Debug, Clone)]
struct DetailedErrorBody(ErrorResponse);

/// Whether error bodies may carry internal details. Set from the service
/// config: never in production.
#[derive(Debug, Clone, Copy)]
pub struct ErrorDetailPolicy {
    pub include_details: bool,
}

impl ErrorDetailPolicy {
    pub fn for_environment(is_production: bool) -> Self {
        Self {
            include_details: !is_production,
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = ErrorResponse::from_app_error(app_error, false);
        let mut response = (status, Json(body)).into_response();

        // Sensitive errors never expose details, whatever the environment
        if !app_error.is_sensitive() {
            response
                .extensions_mut()
                .insert(DetailedErrorBody(ErrorResponse::from_app_error(app_error, true)));
        }

        response
    }
}

/// Router middleware: swap in the detailed error body when the policy allows it
pub async fn render_error_details(
    State(policy): State<ErrorDetailPolicy>,
    mut response: Response,
) -> Response {
    let Some(DetailedErrorBody(body)) = response.extensions_mut().remove::<DetailedErrorBody>()
    else {
        return response;
    };

    if !policy.include_details {
        return response;
    }

    (response.status(), Json(body)).into_response()
}
