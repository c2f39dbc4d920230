//! HTTP status mapping for bridge errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::errors::KitsupassError;

impl KitsupassError {
    /// The HTTP status a bridge client sees for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::Authentication | Self::InvalidPassword => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_)
            | Self::Format(_)
            | Self::SerializationError(_)
            | Self::InvalidName { .. } => StatusCode::BAD_REQUEST,
            Self::Locked => StatusCode::LOCKED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for KitsupassError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "bridge request failed");
            return (status, "Internal error").into_response();
        }

        tracing::warn!(%status, error = ?self, "bridge request rejected");
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_errors_map_to_client_statuses() {
        assert_eq!(
            KitsupassError::Unauthorized("No key registered").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(KitsupassError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            KitsupassError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(KitsupassError::Authentication.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(KitsupassError::Locked.status(), StatusCode::LOCKED);
        assert_eq!(
            KitsupassError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = KitsupassError::Io(std::io::Error::other("disk on fire"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
