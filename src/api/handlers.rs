use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::PartnerView,
};

use super::{AppState, Identity};

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Returns the caller's current partner, proposing one if none is assigned
pub async fn current_partner(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Identity(requester): Identity,
) -> AppResult<Json<PartnerView>> {
    tracing::debug!(
        request_id = %request_id,
        user_id = requester.user_id,
        "Current partner requested"
    );

    let partner = state
        .run(move |engine| async move { engine.current_partner(requester).await })
        .await?;

    Ok(Json(partner))
}

/// Skips the current partner and proposes a new one
pub async fn pass_partner(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Identity(requester): Identity,
) -> AppResult<Json<PartnerView>> {
    let partner = state
        .run(move |engine| async move { engine.propose_partner(requester).await })
        .await?;

    tracing::info!(
        request_id = %request_id,
        user_id = requester.user_id,
        partner_id = partner.id,
        "Partner passed"
    );

    Ok(Json(partner))
}

/// Likes the caller's current partner
pub async fn like_partner(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Identity(requester): Identity,
) -> AppResult<StatusCode> {
    let user_id = requester.user_id;
    state
        .run(move |engine| async move { engine.like_partner(user_id).await })
        .await?;

    tracing::info!(request_id = %request_id, user_id, "Like recorded");

    Ok(StatusCode::NO_CONTENT)
}

/// Lists every partner the caller has liked
pub async fn liked_partners(
    State(state): State<AppState>,
    Identity(requester): Identity,
) -> AppResult<Json<Vec<PartnerView>>> {
    let user_id = requester.user_id;
    let liked = state
        .run(move |engine| async move { engine.list_liked(user_id).await })
        .await?;

    Ok(Json(liked))
}
