use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use vitrine_core::errors::ApiError;

#[derive(Debug)]
pub struct HttpError(pub anyhow::Error);

impl From<anyhow::Error> for HttpError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        // If it's an ApiError (even if wrapped by anyhow contexts), preserve its fields
        if let Some(api) = self.0.chain().find_map(|e| e.downcast_ref::<ApiError>()) {
            let safe = api.sanitize_for_client();
            let status =
                StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                tracing::error!(error = %self.0, "request failed");
            }
            return (status, Json(safe.to_json())).into_response();
        }

        // Anything else is a server-side failure; clients get a generic
        // message, the detail goes to the log.
        tracing::error!(error = ?self.0, "request failed");
        let safe = ApiError::general_error("Server error").sanitize_for_client();
        (StatusCode::INTERNAL_SERVER_ERROR, Json(safe.to_json())).into_response()
    }
}
