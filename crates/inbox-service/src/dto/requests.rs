//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Longest text accepted by WhatsApp for a single message
pub const MAX_TEXT_CHARS: u64 = 4096;

/// `POST /messages/text`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendTextRequest {
    pub conversation_id: Uuid,

    #[validate(length(min = 1, max = 4096, message = "Text must be 1-4096 characters"))]
    pub text: String,

    pub reply_to_message_id: Option<Uuid>,
}

/// `POST /messages/image`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendImageRequest {
    pub conversation_id: Uuid,

    /// Raw base64 or a `data:` URL
    #[validate(length(min = 1, message = "file_base64 is required"))]
    pub file_base64: String,

    #[validate(length(min = 1, max = 100, message = "mime_type is required"))]
    pub mime_type: String,

    #[validate(length(max = 255, message = "File name must be at most 255 characters"))]
    pub file_name: Option<String>,

    #[validate(length(max = 1024, message = "Caption must be at most 1024 characters"))]
    pub caption: Option<String>,

    pub reply_to_message_id: Option<Uuid>,
}

/// `POST /messages/audio`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendAudioRequest {
    pub conversation_id: Uuid,

    #[validate(length(min = 1, message = "file_base64 is required"))]
    pub file_base64: String,

    #[validate(length(min = 1, max = 100, message = "mime_type is required"))]
    pub mime_type: String,

    pub reply_to_message_id: Option<Uuid>,
}
