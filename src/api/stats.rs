//! Statistics endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::requisition::RecentRequisition};

use super::AuthenticatedUser;

/// Overview statistics
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    /// Requisitions without a recorded return
    pub active: i64,
    /// Picked-up requisitions open past the loan period
    pub overdue: i64,
    /// Most recent requisitions, newest first
    pub recent: Vec<RecentRequisition>,
}

/// Requisition counters and recent activity
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overview statistics", body = StatsResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    let stats = state
        .services
        .requisitions
        .stats(state.config.loans.period_days)
        .await?;

    Ok(Json(StatsResponse {
        active: stats.active,
        overdue: stats.overdue,
        recent: stats.recent,
    }))
}
