//! Follow-up processor trigger
//!
//! Lets a scheduler (cron, edge function) drive the queue over HTTP instead
//! of running the worker binary.

use axum::{extract::State, Json};
use chrono::Utc;
use inbox_core::Permissions;
use inbox_service::dto::ProcessDueResponse;
use inbox_service::{FollowUpService, PermissionService};

use crate::extractors::AuthCaller;
use crate::response::ApiResult;
use crate::state::AppState;

/// Process every due follow-up
///
/// POST /follow-ups/process
pub async fn process_due(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Json<ProcessDueResponse>> {
    let ctx = state.service_context();
    PermissionService::new(ctx)
        .require(caller, Permissions::MANAGE_FOLLOW_UPS)
        .await?;

    let report = FollowUpService::new(ctx).process_due(Utc::now()).await?;
    Ok(Json(ProcessDueResponse::from(report)))
}
