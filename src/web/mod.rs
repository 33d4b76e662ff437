//! Scoring page served over HTTP

pub mod error;
pub mod handlers;
pub mod page;
pub mod state;

pub use error::ServerError;
pub use state::AppState;

use crate::config::ServerConfig;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tracing::info;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Bind the listener and serve until the process is stopped
pub async fn serve(server: &ServerConfig, state: Arc<AppState>) -> Result<()> {
    let addr = server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Scoring page listening");

    axum::serve(listener, create_router(state))
        .await
        .context("HTTP server error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_extractor::FeatureExtractor;
    use crate::models::artifacts::ModelArtifacts;
    use crate::models::booster::{BoosterParams, GradientBoostedClassifier};
    use crate::models::inference::InferenceEngine;
    use crate::preprocessing::{LabelEncoder, StandardScaler};
    use crate::types::transaction::TransactionRecord;
    use axum::body::Body;
    use axum::extract::State;
    use axum::http::{header, Request, StatusCode};
    use axum::response::{Html, IntoResponse, Response};
    use axum::Form;
    use tower::ServiceExt;

    fn state() -> Arc<AppState> {
        let encoder = LabelEncoder::fit(["CASH_OUT", "PAYMENT", "TRANSFER"]).unwrap();
        let mut records = Vec::new();
        let mut labels = Vec::new();
        for i in 0..150 {
            let amount = 50.0 + i as f64 * 20.0;
            match i % 3 {
                0 => {
                    records.push(
                        TransactionRecord::new("TRANSFER", amount)
                            .with_sender_balances(amount, 0.0),
                    );
                    labels.push(1);
                }
                1 => {
                    records.push(
                        TransactionRecord::new("PAYMENT", amount)
                            .with_sender_balances(amount + 3_000.0, 3_000.0),
                    );
                    labels.push(0);
                }
                _ => {
                    records.push(
                        TransactionRecord::new("CASH_OUT", amount)
                            .with_sender_balances(amount + 8_000.0, 8_000.0)
                            .with_receiver_balances(1_000.0, 1_000.0 + amount),
                    );
                    labels.push(0);
                }
            }
        }

        let raw = FeatureExtractor::new(&encoder).extract_matrix(&records).unwrap();
        let (scaler, scaled) = StandardScaler::fit_transform(&raw).unwrap();
        let params = BoosterParams {
            n_estimators: 30,
            learning_rate: 0.3,
            ..BoosterParams::default()
        };
        let model = GradientBoostedClassifier::fit(&scaled, &labels, params).unwrap();
        let engine = InferenceEngine::new(ModelArtifacts {
            model,
            scaler,
            encoder,
        });
        Arc::new(AppState::new(Arc::new(engine)))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_lists_known_types() {
        let Html(html) = handlers::index(State(state())).await;
        assert!(html.contains("<option value=\"PAYMENT\">PAYMENT</option>"));
        assert!(html.contains("Fill out the form above"));
    }

    #[tokio::test]
    async fn test_predict_flags_drained_transfer() {
        let tx = TransactionRecord::new("TRANSFER", 181.0).with_sender_balances(181.0, 0.0);

        let Html(html) = handlers::predict(State(state()), Ok(Form(tx))).await.unwrap();
        assert!(html.contains("Fraudulent Transaction Detected! (Probability: "));
        assert!(html.contains("<option value=\"TRANSFER\" selected>"));
        assert!(html.contains("value=\"181\""));
    }

    #[tokio::test]
    async fn test_predict_passes_ordinary_payment() {
        let tx = TransactionRecord::new("PAYMENT", 500.0).with_sender_balances(3_500.0, 3_000.0);

        let Html(html) = handlers::predict(State(state()), Ok(Form(tx))).await.unwrap();
        assert!(html.contains("Legitimate Transaction (Probability of Fraud: "));
    }

    #[tokio::test]
    async fn test_predict_unknown_type_is_422() {
        let tx = TransactionRecord::new("BITCOIN", 10.0);

        let err = handlers::predict(State(state()), Ok(Form(tx))).await.unwrap_err();
        assert!(matches!(err, ServerError::BadInput(_)));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("BITCOIN"));
    }

    #[tokio::test]
    async fn test_predict_out_of_range_is_422() {
        let tx = TransactionRecord::new("PAYMENT", 100_000.5);

        let err = handlers::predict(State(state()), Ok(Form(tx))).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_health() {
        let axum::Json(health) = handlers::health(State(state())).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.known_types, ["CASH_OUT", "PAYMENT", "TRANSFER"]);
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }

    const DRAINED_TRANSFER: &str = "type=TRANSFER&amount=181&oldbalanceOrg=181&newbalanceOrig=0\
                                    &oldbalanceDest=0&newbalanceDest=0";

    async fn post_form(body: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        create_router(state()).oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_router_scores_urlencoded_form() {
        let response = post_form(DRAINED_TRANSFER).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Fraudulent Transaction Detected! (Probability: "));
        assert!(html.contains("<option value=\"TRANSFER\" selected>"));
        assert!(html.contains("name=\"oldbalanceOrg\""));
        assert!(html.contains("value=\"181\""));
    }

    #[tokio::test]
    async fn test_router_rejects_blank_and_nan_amounts() {
        let blank = DRAINED_TRANSFER.replace("amount=181", "amount=");
        let response = post_form(&blank).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Request failed (422)"));

        let nan = DRAINED_TRANSFER.replace("amount=181", "amount=NaN");
        let response = post_form(&nan).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("amount"));

        let missing = "type=TRANSFER&amount=181";
        assert_eq!(
            post_form(missing).await.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_router_serves_index_and_health() {
        let router = create_router(state());

        let index = router
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(index.status(), StatusCode::OK);
        assert!(body_text(index).await.contains("Fill out the form above"));

        let health = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(health).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["known_types"][2], "TRANSFER");
    }
}
