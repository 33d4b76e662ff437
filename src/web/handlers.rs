use crate::types::transaction::TransactionRecord;
use crate::web::error::ServerError;
use crate::web::page::{self, ResultPanel};
use crate::web::state::AppState;
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::Html;
use axum::{Form, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub known_types: Vec<String>,
    pub uptime_seconds: u64,
}

/// Empty form with the hint below it
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let known_types = state.engine.known_types();
    Html(page::render_page(
        known_types,
        &page::default_values(known_types),
        ResultPanel::Awaiting,
    ))
}

/// Score one submitted transaction and render it with the form values echoed back
pub async fn predict(
    State(state): State<Arc<AppState>>,
    form: Result<Form<TransactionRecord>, FormRejection>,
) -> Result<Html<String>, ServerError> {
    let Form(tx) = form.map_err(|e| ServerError::BadInput(e.body_text()))?;

    let prediction = state.engine.predict(&tx)?;
    info!(
        tx_type = %tx.tx_type,
        amount = tx.amount,
        verdict = ?prediction.verdict,
        fraud_probability = prediction.fraud_probability,
        "Prediction served"
    );

    Ok(Html(page::render_page(
        state.engine.known_types(),
        &tx,
        ResultPanel::Scored(&prediction),
    )))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        known_types: state.engine.known_types().to_vec(),
        uptime_seconds: state.uptime_seconds(),
    })
}
