//! Outbound message service
//!
//! Sends text, image and audio messages from the inbox through the
//! conversation's WhatsApp connection. Every attempt leaves a `messages` row:
//! `sent` with the provider id, or `failed` with the gateway's error.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use inbox_core::traits::{MediaSend, RealtimeEvent, RealtimeEventKind, TextSend};
use inbox_core::{
    media_object_path, Contact, Conversation, DomainError, MediaKind, Message, MessageType,
    Permissions, PhoneNumber, WhatsAppConnection,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::dto::{
    MessageResponse, SendAudioRequest, SendImageRequest, SendTextRequest, MAX_TEXT_CHARS,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::{Actor, Caller, PermissionService};

/// Conversation a send is addressed to, with everything needed to deliver it
struct Target {
    actor: Actor,
    conversation: Conversation,
    connection: WhatsAppConnection,
    number: PhoneNumber,
}

/// Quoted message resolved to its gateway id
struct ReplyTarget {
    message_id: Uuid,
    provider_id: String,
}

enum Outgoing {
    Text(TextSend),
    Media(MediaSend),
}

/// Decoded upload ready for storage
struct MediaPayload {
    mime: String,
    bytes: Vec<u8>,
}

/// Outbound message service
pub struct OutboundService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> OutboundService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Send a text message
    #[instrument(skip(self, request), fields(conversation_id = %request.conversation_id))]
    pub async fn send_text(
        &self,
        caller: Caller,
        request: SendTextRequest,
    ) -> ServiceResult<MessageResponse> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(ServiceError::validation("text must not be blank"));
        }
        if text.chars().count() as u64 > MAX_TEXT_CHARS {
            return Err(DomainError::ContentTooLong {
                max: MAX_TEXT_CHARS as usize,
            }
            .into());
        }

        let target = self.target(caller, request.conversation_id).await?;
        let reply = self
            .reply_target(request.conversation_id, request.reply_to_message_id)
            .await?;

        let message = Message::new_outbound(
            target.conversation.company_id,
            target.conversation.id,
            MessageType::Text,
            target.actor.user_id,
        )
        .with_content(text)
        .replying_to(reply.as_ref().map(|r| r.message_id));

        let send = TextSend {
            token: target.connection.instance_token.clone(),
            number: target.number.as_str().to_string(),
            text: text.to_string(),
            reply_to: reply.map(|r| r.provider_id),
        };

        self.deliver(&target, message, Outgoing::Text(send)).await
    }

    /// Send an image with an optional caption
    #[instrument(skip(self, request), fields(conversation_id = %request.conversation_id))]
    pub async fn send_image(
        &self,
        caller: Caller,
        request: SendImageRequest,
    ) -> ServiceResult<MessageResponse> {
        let caption = request
            .caption
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        self.send_media(
            caller,
            request.conversation_id,
            MediaKind::Image,
            &request.file_base64,
            &request.mime_type,
            caption,
            request.reply_to_message_id,
        )
        .await
    }

    /// Send a voice note
    #[instrument(skip(self, request), fields(conversation_id = %request.conversation_id))]
    pub async fn send_audio(
        &self,
        caller: Caller,
        request: SendAudioRequest,
    ) -> ServiceResult<MessageResponse> {
        self.send_media(
            caller,
            request.conversation_id,
            MediaKind::Audio,
            &request.file_base64,
            &request.mime_type,
            None,
            request.reply_to_message_id,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn send_media(
        &self,
        caller: Caller,
        conversation_id: Uuid,
        kind: MediaKind,
        file_base64: &str,
        mime_type: &str,
        caption: Option<String>,
        reply_to_message_id: Option<Uuid>,
    ) -> ServiceResult<MessageResponse> {
        let target = self.target(caller, conversation_id).await?;
        let payload = decode_media(kind, file_base64, mime_type)?;
        let reply = self
            .reply_target(conversation_id, reply_to_message_id)
            .await?;

        let path = media_object_path(
            target.conversation.company_id,
            target.connection.id,
            Utc::now(),
            MediaKind::extension_for(&payload.mime),
        );
        let stored = self
            .ctx
            .storage()
            .upload(&path, &payload.mime, payload.bytes)
            .await?;
        info!(path = %stored.path, kind = kind.as_str(), "Media uploaded");

        let message_type = match kind {
            MediaKind::Image => MessageType::Image,
            MediaKind::Audio => MessageType::Audio,
        };
        let mut message = Message::new_outbound(
            target.conversation.company_id,
            target.conversation.id,
            message_type,
            target.actor.user_id,
        )
        .with_media(stored.public_url.clone(), payload.mime)
        .replying_to(reply.as_ref().map(|r| r.message_id));
        if let Some(caption) = &caption {
            message = message.with_content(caption.clone());
        }

        let send = MediaSend {
            token: target.connection.instance_token.clone(),
            number: target.number.as_str().to_string(),
            kind,
            file_url: stored.public_url,
            caption,
            reply_to: reply.map(|r| r.provider_id),
        };

        self.deliver(&target, message, Outgoing::Media(send)).await
    }

    /// Authorize the caller and load the conversation's contact and connection
    async fn target(&self, caller: Caller, conversation_id: Uuid) -> ServiceResult<Target> {
        let actor = PermissionService::new(self.ctx)
            .require(caller, Permissions::SEND_MESSAGES)
            .await?;

        let conversation = self
            .ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .filter(|c| actor.can_access_company(c.company_id))
            .ok_or(DomainError::ConversationNotFound(conversation_id))?;

        let contact: Contact = self
            .ctx
            .contact_repo()
            .find_by_id(conversation.contact_id)
            .await?
            .ok_or(DomainError::ContactNotFound(conversation.contact_id))?;

        let connection = self
            .ctx
            .connection_repo()
            .find_by_id(conversation.connection_id)
            .await?
            .ok_or(DomainError::ConnectionNotFound(conversation.connection_id))?;

        if !connection.is_connected() {
            return Err(DomainError::ConnectionNotConnected.into());
        }

        let number = PhoneNumber::parse(&contact.phone)?;

        Ok(Target {
            actor,
            conversation,
            connection,
            number,
        })
    }

    /// A reply must quote a delivered message of the same conversation
    async fn reply_target(
        &self,
        conversation_id: Uuid,
        reply_to_message_id: Option<Uuid>,
    ) -> ServiceResult<Option<ReplyTarget>> {
        let Some(message_id) = reply_to_message_id else {
            return Ok(None);
        };

        let message = self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .filter(|m| m.conversation_id == conversation_id)
            .ok_or_else(|| {
                DomainError::InvalidReplyTarget(format!(
                    "message {message_id} is not part of this conversation"
                ))
            })?;

        let provider_id = message
            .provider_message_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                DomainError::InvalidReplyTarget(format!(
                    "message {message_id} has no WhatsApp id yet"
                ))
            })?;

        Ok(Some(ReplyTarget {
            message_id,
            provider_id,
        }))
    }

    /// Persist the pending row, call the gateway, then record the outcome
    ///
    /// Once the gateway has accepted the message the call succeeds; later
    /// write failures are logged so a client retry cannot send it twice.
    async fn deliver(
        &self,
        target: &Target,
        mut message: Message,
        outgoing: Outgoing,
    ) -> ServiceResult<MessageResponse> {
        self.ctx.message_repo().create(&message).await?;
        self.publish(target, &message, RealtimeEventKind::MessageCreate)
            .await;

        let outcome = match &outgoing {
            Outgoing::Text(send) => self.ctx.gateway().send_text(send).await,
            Outgoing::Media(send) => self.ctx.gateway().send_media(send).await,
        };
        let now = Utc::now();

        let result = match outcome {
            Ok(receipt) => {
                message.mark_sent(receipt.provider_message_id, now);
                info!(
                    message_id = %message.id,
                    provider_message_id = ?message.provider_message_id,
                    "Message sent"
                );
                if let Err(e) = self.ctx.message_repo().update_delivery(&message).await {
                    error!(message_id = %message.id, error = %e, "Failed to record sent message");
                }
                if let Err(e) = self
                    .ctx
                    .conversation_repo()
                    .touch_last_message(message.conversation_id, now)
                    .await
                {
                    warn!(conversation_id = %message.conversation_id, error = %e, "Failed to touch conversation");
                }
                Ok(())
            }
            Err(err) => {
                let err = match err {
                    DomainError::GatewayError(_) => err,
                    other => DomainError::GatewayError(other.to_string()),
                };
                warn!(message_id = %message.id, error = %err, "Gateway rejected message");
                message.mark_failed(err.to_string());
                if let Err(update_err) = self.ctx.message_repo().update_delivery(&message).await {
                    warn!(error = %update_err, "Failed to record message failure");
                }
                Err(err)
            }
        };

        self.publish(target, &message, RealtimeEventKind::MessageUpdate)
            .await;
        result?;

        Ok(MessageResponse::from(message))
    }

    async fn publish(&self, target: &Target, message: &Message, kind: RealtimeEventKind) {
        let event = RealtimeEvent {
            kind,
            company_id: target.conversation.company_id,
            conversation_id: target.conversation.id,
            data: serde_json::to_value(MessageResponse::from(message)).unwrap_or_default(),
        };
        if let Err(e) = self.ctx.publisher().publish(&event).await {
            warn!(error = %e, message_id = %message.id, kind = kind.as_str(), "Failed to publish message event");
        }
    }
}

/// Decode a base64 upload (optionally a `data:` URL) and check it against the kind's limits
fn decode_media(kind: MediaKind, file_base64: &str, mime_type: &str) -> ServiceResult<MediaPayload> {
    let encoded = match file_base64.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => file_base64,
    };
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| ServiceError::validation("file_base64 is not valid base64"))?;

    let mime = MediaKind::essence(mime_type);
    kind.validate(&mime, bytes.len())?;

    Ok(MediaPayload { mime, bytes })
}
