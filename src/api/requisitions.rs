//! Requisition dashboard endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::requisition::{Dashboard, Queue},
};

use super::AuthenticatedUser;

/// Dashboard query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// Copy code (numeric) or book title (substring)
    pub q: Option<String>,
}

/// Outcome of a pickup or return action
#[derive(Serialize, ToSchema)]
pub struct ActionResponse {
    pub status: String,
    /// Active queue the requisition is now in, if any
    pub queue: Option<Queue>,
}

/// Both active requisition queues
#[utoipa::path(
    get,
    path = "/requisitions/dashboard",
    tag = "requisitions",
    security(("bearer_auth" = [])),
    params(DashboardQuery),
    responses(
        (status = 200, description = "Active queues", body = Dashboard),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn dashboard(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<Dashboard>> {
    let dashboard = state
        .services
        .requisitions
        .dashboard(query.q.as_deref())
        .await?;
    Ok(Json(dashboard))
}

/// Mark a requisition as picked up
#[utoipa::path(
    post,
    path = "/requisitions/{id}/pickup",
    tag = "requisitions",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Requisition code")
    ),
    responses(
        (status = 200, description = "Picked up", body = ActionResponse),
        (status = 404, description = "Requisition not found")
    )
)]
pub async fn pickup(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ActionResponse>> {
    let requisition = state.services.requisitions.pickup(id).await?;
    Ok(Json(ActionResponse {
        status: "picked_up".to_string(),
        queue: requisition.queue(),
    }))
}

/// Record the return of a requisition
#[utoipa::path(
    post,
    path = "/requisitions/{id}/return",
    tag = "requisitions",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Requisition code")
    ),
    responses(
        (status = 200, description = "Returned", body = ActionResponse),
        (status = 404, description = "Requisition not found")
    )
)]
pub async fn give_back(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ActionResponse>> {
    let requisition = state.services.requisitions.give_back(id).await?;
    Ok(Json(ActionResponse {
        status: "returned".to_string(),
        queue: requisition.queue(),
    }))
}
