//! Stateless wizard endpoints.
//!
//! The client owns the draft and the cursor; each request resumes a session
//! over the current catalog and system status and answers from it.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::{
    BlockReason, NavigationOutcome, OrderDraft, PriceBreakdown, StepPlan, StepStatus, WizardStep,
};
use serde::{Deserialize, Serialize};
use services::OrderGateway;

use crate::error::ApiError;
use crate::state::{AppState, blocked_at};

#[derive(Deserialize)]
pub struct QuoteRequest {
    pub draft: OrderDraft,
    #[serde(default)]
    pub cursor: usize,
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub plan: StepPlan,
    pub steps: Vec<StepStatus>,
    pub breakdown: PriceBreakdown,
    pub meets_minimum: bool,
    /// Blocking condition for moving forward from `cursor`.
    pub blocked: Option<BlockReason>,
    pub cursor: usize,
}

#[derive(Deserialize)]
pub struct NavigateRequest {
    pub draft: OrderDraft,
    #[serde(default)]
    pub cursor: usize,
    pub target: usize,
}

#[derive(Serialize)]
pub struct NavigateResponse {
    #[serde(flatten)]
    pub outcome: NavigationOutcome,
    pub cursor: usize,
    pub step: Option<WizardStep>,
}

/// POST /quote: step plan, per-step validation and price breakdown.
#[tracing::instrument(skip(state, req), fields(menu_id = ?req.draft.menu_id))]
pub async fn quote<G: OrderGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let session = state.resume(req.draft, req.cursor).await?;
    let breakdown = session.quote();

    Ok(Json(QuoteResponse {
        plan: session.plan().clone(),
        steps: session.step_statuses(),
        meets_minimum: breakdown.meets_minimum(&session.config().policy),
        breakdown,
        blocked: blocked_at(&session),
        cursor: session.cursor(),
    }))
}

/// POST /navigate: moves the cursor through the navigation guard.
#[tracing::instrument(skip(state, req), fields(cursor = req.cursor, target = req.target))]
pub async fn navigate<G: OrderGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Json(req): Json<NavigateRequest>,
) -> Result<Json<NavigateResponse>, ApiError> {
    let mut session = state.resume(req.draft, req.cursor).await?;
    let outcome = session.go_to(req.target);

    Ok(Json(NavigateResponse {
        cursor: session.cursor(),
        step: session.current_step(),
        outcome,
    }))
}
