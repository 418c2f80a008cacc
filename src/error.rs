use thiserror::Error;

/// Failures a footprint request can report to the caller
#[derive(Error, Debug)]
pub enum FootprintError {
    #[error("country not found: {0}")]
    CountryNotFound(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl FootprintError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FootprintError::CountryNotFound(_) | FootprintError::MalformedRequest(_)
        )
    }
}

#[cfg(feature = "server")]
mod response {
    use super::FootprintError;
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Json, Response},
    };
    use serde_json::json;

    impl IntoResponse for FootprintError {
        fn into_response(self) -> Response {
            let status = if self.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };

            if status.is_server_error() {
                tracing::error!("{}", self);
            }

            let body = json!({
                "success": false,
                "message": self.to_string(),
            });

            (status, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(FootprintError::CountryNotFound("ZZ".to_string()).is_client_error());
        assert!(FootprintError::MalformedRequest("bad json".to_string()).is_client_error());
        assert!(!FootprintError::Storage(anyhow::anyhow!("disk full")).is_client_error());
    }

    #[test]
    fn test_messages() {
        let err = FootprintError::CountryNotFound("ZZ".to_string());
        assert_eq!(err.to_string(), "country not found: ZZ");
    }
}
