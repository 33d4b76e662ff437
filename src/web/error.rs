//! HTTP error mapping for the scoring page

use crate::error::PipelineError;
use crate::web::page;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ServerError {
    /// The submission itself is invalid; the request is rejected with 422
    #[error("{0}")]
    BadInput(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PipelineError> for ServerError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::UnknownCategory { .. } | PipelineError::OutOfRange { .. } => {
                ServerError::BadInput(err.to_string())
            }
            other => ServerError::Internal(other.into()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ServerError::BadInput(msg) => {
                warn!(error = %msg, "Rejected submission");
                msg.clone()
            }
            ServerError::Internal(err) => {
                error!(error = ?err, "Prediction failed");
                "Internal error while scoring the transaction".to_string()
            }
        };
        (status, Html(page::render_error(status, &message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let unknown = ServerError::from(PipelineError::UnknownCategory {
            value: "WIRE".to_string(),
            known: vec!["PAYMENT".to_string()],
        });
        assert_eq!(unknown.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let out_of_range = ServerError::from(PipelineError::OutOfRange {
            field: "amount",
            value: -1.0,
            min: 0.0,
            max: 100_000.0,
        });
        assert_eq!(out_of_range.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let width = ServerError::from(PipelineError::FeatureWidth {
            expected: 6,
            actual: 5,
        });
        assert_eq!(width.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_internal_details_not_rendered() {
        let response =
            ServerError::Internal(anyhow::anyhow!("secret path /tmp/x")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("Internal error"));
        assert!(!html.contains("secret path"));
    }
}
