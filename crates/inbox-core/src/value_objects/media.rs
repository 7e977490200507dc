//! Media kinds accepted by the outbound senders and their storage layout

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DomainError;

const MIB: usize = 1024 * 1024;

const IMAGE_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];
const AUDIO_MIME_TYPES: [&str; 8] = [
    "audio/ogg",
    "audio/mpeg",
    "audio/mp4",
    "audio/aac",
    "audio/amr",
    "audio/wav",
    "audio/x-wav",
    "audio/webm",
];

/// Media kind for outbound attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    /// Largest accepted payload in bytes
    pub fn max_bytes(self) -> usize {
        match self {
            Self::Image => 5 * MIB,
            Self::Audio => 16 * MIB,
        }
    }

    pub fn allowed_mime_types(self) -> &'static [&'static str] {
        match self {
            Self::Image => &IMAGE_MIME_TYPES,
            Self::Audio => &AUDIO_MIME_TYPES,
        }
    }

    /// `type` value sent to the gateway's `/send/media`
    pub fn gateway_type(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "ptt",
        }
    }

    /// Strip parameters (`audio/ogg; codecs=opus`) and lowercase
    pub fn essence(mime: &str) -> String {
        mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase()
    }

    /// Validate a MIME type and payload size for this kind
    pub fn validate(self, mime: &str, size: usize) -> Result<(), DomainError> {
        let essence = Self::essence(mime);
        if !self.allowed_mime_types().contains(&essence.as_str()) {
            return Err(DomainError::ValidationError(format!(
                "unsupported mime type for {}: {mime}",
                self.as_str()
            )));
        }
        if size == 0 {
            return Err(DomainError::ValidationError("file is empty".to_string()));
        }
        if size > self.max_bytes() {
            return Err(DomainError::PayloadTooLarge {
                limit: self.max_bytes(),
                actual: size,
            });
        }
        Ok(())
    }

    /// File extension for an accepted MIME type
    pub fn extension_for(mime: &str) -> &'static str {
        match Self::essence(mime).as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "audio/ogg" => "ogg",
            "audio/mpeg" => "mp3",
            "audio/mp4" => "m4a",
            "audio/aac" => "aac",
            "audio/amr" => "amr",
            "audio/wav" | "audio/x-wav" => "wav",
            "audio/webm" => "webm",
            _ => "bin",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }
}

/// Object key for an uploaded attachment:
/// `{company}/{connection}/{yyyy-mm}/{uuid}.{ext}`
pub fn media_object_path(
    company_id: Uuid,
    connection_id: Uuid,
    at: DateTime<Utc>,
    extension: &str,
) -> String {
    format!(
        "{company_id}/{connection_id}/{}/{}.{extension}",
        at.format("%Y-%m"),
        Uuid::new_v4()
    )
}
