//! Order submission endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::Money;
use domain::OrderDraft;
use serde::{Deserialize, Serialize};
use services::OrderGateway;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SubmitOrderRequest {
    pub draft: OrderDraft,
}

#[derive(Serialize)]
pub struct OrderCreatedResponse {
    pub order_id: String,
    pub grand_total: Money,
}

/// POST /orders: validates every step and creates the order.
///
/// A blocked or invalid draft never reaches the order gateway.
#[tracing::instrument(skip(state, req), fields(menu_id = ?req.draft.menu_id))]
pub async fn create<G: OrderGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Json(req): Json<SubmitOrderRequest>,
) -> Result<(StatusCode, Json<OrderCreatedResponse>), ApiError> {
    let mut session = state.resume(req.draft, 0).await?;
    let grand_total = session.quote().grand_total;
    let receipt = session.submit(&state.checkout).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreatedResponse {
            order_id: receipt.id.to_string(),
            grand_total,
        }),
    ))
}
