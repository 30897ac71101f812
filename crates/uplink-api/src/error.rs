//! HTTP error response conversion
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse,
//! HttpAppError>`. Use `AppError` for errors so they render consistently
//! (status, body, logging).

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use uplink_core::{AppError, ErrorMetadata, LogLevel};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
}

/// Wrapper type for AppError to implement IntoResponse. Necessary because of
/// the orphan rule: IntoResponse is an external trait and AppError lives in
/// uplink-core.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

/// Convert JSON body deserialization failures into a 400 with our
/// ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<validator::ValidationErrors> for HttpAppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        HttpAppError(AppError::InvalidInput(errors.to_string()))
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let err = self.0;

        match err.log_level() {
            LogLevel::Debug => tracing::debug!(error = %err, "Request failed"),
            LogLevel::Warn => tracing::warn!(error = %err, "Request failed"),
            LogLevel::Error => tracing::error!(error = %err, "Request failed"),
        }

        let status = StatusCode::from_u16(err.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            error: err.client_message(),
            code: err.error_code().to_string(),
            recoverable: err.is_recoverable(),
        };

        (status, Json(body)).into_response()
    }
}

/// JSON body extractor that returns our ErrorResponse format (400 + JSON) on
/// deserialization failure, instead of axum's plain-text rejection.
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
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ValidatedJson(value))
    }
}
