//! Outbound message handlers
//!
//! POST /api/v1/messages/{text,image,audio}

use axum::{extract::State, Json};
use inbox_service::dto::{SendAudioRequest, SendImageRequest, SendMessageResponse, SendTextRequest};
use inbox_service::OutboundService;

use crate::extractors::{AuthCaller, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Send a text message
///
/// POST /messages/text
pub async fn send_text(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ValidatedJson(request): ValidatedJson<SendTextRequest>,
) -> ApiResult<Json<SendMessageResponse>> {
    let message = OutboundService::new(state.service_context())
        .send_text(caller, request)
        .await?;
    Ok(Json(SendMessageResponse::new(message)))
}

/// Send an image
///
/// POST /messages/image
pub async fn send_image(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ValidatedJson(request): ValidatedJson<SendImageRequest>,
) -> ApiResult<Json<SendMessageResponse>> {
    let message = OutboundService::new(state.service_context())
        .send_image(caller, request)
        .await?;
    Ok(Json(SendMessageResponse::new(message)))
}

/// Send a voice note
///
/// POST /messages/audio
pub async fn send_audio(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ValidatedJson(request): ValidatedJson<SendAudioRequest>,
) -> ApiResult<Json<SendMessageResponse>> {
    let message = OutboundService::new(state.service_context())
        .send_audio(caller, request)
        .await?;
    Ok(Json(SendMessageResponse::new(message)))
}
