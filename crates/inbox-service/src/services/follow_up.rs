//! Follow-up queue processor
//!
//! Claims due queue items, renders or generates their step content, sends it
//! through the conversation's connection and schedules the next step.
//! Items are processed one after another; a failing item is recorded and the
//! batch moves on.

use chrono::{DateTime, Duration, Utc};
use inbox_core::traits::{
    GenerationRequest, PromptMessage, PromptRole, RealtimeEvent, RealtimeEventKind, TextSend,
};
use inbox_core::{
    render_template, AiAgent, Contact, Conversation, FollowUpQueueItem, FollowUpSequence,
    FollowUpStep, Message, MessageDirection, MessageType, PhoneNumber, QueueStatus, StepContent,
    WhatsAppConnection,
};
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use crate::dto::{MessageResponse, ProcessReport};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Final turn appended after the conversation history
const WRITE_NEXT_MESSAGE: &str =
    "Escreva agora a próxima mensagem de follow-up para o contato, pronta para envio.";

/// What happened to one claimed item
#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Sent,
    Failed(String),
    Cancelled(String),
    Rescheduled(DateTime<Utc>),
    /// Another worker took the item over; it is left untouched
    LeaseLost,
}

/// The caller's `now`, advanced by the wall time spent on the batch so far
#[derive(Debug, Clone, Copy)]
struct BatchClock {
    origin: DateTime<Utc>,
    started: DateTime<Utc>,
}

impl BatchClock {
    fn start(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            started: Utc::now(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.origin + (Utc::now() - self.started).max(Duration::zero())
    }
}

/// Everything loaded for an item before content is produced
struct Delivery {
    sequence: FollowUpSequence,
    step: FollowUpStep,
    conversation: Conversation,
    contact: Contact,
    connection: WhatsAppConnection,
}

/// Follow-up queue service
pub struct FollowUpService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FollowUpService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Claim and process every item due at `now`
    ///
    /// Only the claim itself can fail the call; per-item errors end up in the
    /// item's `last_error` and the report's `failed` count.
    #[instrument(skip(self))]
    pub async fn process_due(&self, now: DateTime<Utc>) -> ServiceResult<ProcessReport> {
        let settings = self.ctx.follow_up_settings();
        let items = self
            .ctx
            .follow_up_repo()
            .claim_due(now, settings.claim_options())
            .await?;

        let mut report = ProcessReport {
            claimed: items.len(),
            ..ProcessReport::default()
        };
        if items.is_empty() {
            debug!("No follow-ups due");
            return Ok(report);
        }

        let clock = BatchClock::start(now);
        for item in items {
            let outcome = if item.attempts > settings.max_attempts {
                Outcome::Failed("exceeded maximum processing attempts".to_string())
            } else if !self.hold(&item, clock.now()).await {
                Outcome::LeaseLost
            } else {
                match self.process_item(&item, clock).await {
                    Ok(outcome) => outcome,
                    Err(e) => Outcome::Failed(e.to_string()),
                }
            };

            match &outcome {
                Outcome::Sent => report.sent += 1,
                Outcome::Failed(reason) => {
                    warn!(item_id = %item.id, attempts = item.attempts, reason = %reason, "Follow-up failed");
                    report.failed += 1;
                }
                Outcome::Cancelled(reason) => {
                    info!(item_id = %item.id, reason = %reason, "Follow-up cancelled");
                    report.cancelled += 1;
                }
                Outcome::Rescheduled(at) => {
                    info!(item_id = %item.id, scheduled_at = %at, "Follow-up outside operating hours");
                    report.rescheduled += 1;
                }
                Outcome::LeaseLost => {
                    warn!(item_id = %item.id, "Follow-up lease lost, leaving item to its new holder");
                    continue;
                }
            }

            self.settle(&item, outcome, clock.now()).await;
        }

        info!(
            claimed = report.claimed,
            sent = report.sent,
            failed = report.failed,
            cancelled = report.cancelled,
            rescheduled = report.rescheduled,
            "Follow-up batch processed"
        );
        Ok(report)
    }

    #[instrument(skip(self, item), fields(item_id = %item.id, conversation_id = %item.conversation_id))]
    async fn process_item(&self, item: &FollowUpQueueItem, clock: BatchClock) -> ServiceResult<Outcome> {
        let now = clock.now();
        let delivery = match self.load(item).await? {
            Ok(delivery) => delivery,
            Err(outcome) => return Ok(outcome),
        };

        if let Some(hours) = &delivery.sequence.operating_hours {
            if !hours.is_open(now) {
                return Ok(match hours.next_opening(now) {
                    Some(at) => Outcome::Rescheduled(at),
                    None => Outcome::Failed("operating hours never open".to_string()),
                });
            }
        }

        if delivery.sequence.stop_on_reply
            && delivery.conversation.contact_replied_since(item.created_at)
        {
            return Ok(Outcome::Cancelled("contact replied".to_string()));
        }

        let number = PhoneNumber::parse(&delivery.contact.phone)?;
        let text = self.compose(&delivery).await?;
        if text.trim().is_empty() {
            return Ok(Outcome::Failed("generated content is empty".to_string()));
        }
        if !self.hold(item, clock.now()).await {
            return Ok(Outcome::LeaseLost);
        }

        let receipt = self
            .ctx
            .gateway()
            .send_text(&TextSend {
                token: delivery.connection.instance_token.clone(),
                number: number.as_str().to_string(),
                text: text.clone(),
                reply_to: None,
            })
            .await?;

        // The text is out; bookkeeping failures below must not trigger a resend
        let sent_at = Utc::now();
        let mut message = Message::new_outbound(
            delivery.conversation.company_id,
            delivery.conversation.id,
            MessageType::Text,
            None,
        )
        .with_content(text);
        message.mark_sent(receipt.provider_message_id, sent_at);

        if let Err(e) = self.ctx.message_repo().create(&message).await {
            error!(error = %e, "Failed to store sent follow-up message");
        }
        if let Err(e) = self
            .ctx
            .conversation_repo()
            .touch_last_message(delivery.conversation.id, sent_at)
            .await
        {
            warn!(error = %e, "Failed to touch conversation");
        }

        self.publish(item, &delivery, &message).await;
        self.enqueue_next(item, &delivery.step, clock.now()).await;

        Ok(Outcome::Sent)
    }

    /// Extend the item's lease from `at`; `false` when it is no longer ours
    async fn hold(&self, item: &FollowUpQueueItem, at: DateTime<Utc>) -> bool {
        let until = at + self.ctx.follow_up_settings().lease;
        match self.ctx.follow_up_repo().renew_lease(item, until).await {
            Ok(held) => held,
            Err(e) => {
                error!(item_id = %item.id, error = %e, "Failed to renew follow-up lease");
                false
            }
        }
    }

    /// Load the item's sequence, step, conversation, contact and connection
    ///
    /// The inner `Err` is a terminal outcome for rows that are gone or unusable.
    async fn load(&self, item: &FollowUpQueueItem) -> ServiceResult<Result<Delivery, Outcome>> {
        let failed = |reason: &str| Ok(Err(Outcome::Failed(reason.to_string())));
        let repo = self.ctx.follow_up_repo();

        let Some(sequence) = repo.find_sequence(item.sequence_id).await? else {
            return failed("sequence not found");
        };
        if !sequence.is_active {
            return Ok(Err(Outcome::Cancelled("sequence inactive".to_string())));
        }

        let Some(step) = repo.find_step(item.step_id).await? else {
            return failed("step not found");
        };

        let Some(conversation) = self
            .ctx
            .conversation_repo()
            .find_by_id(item.conversation_id)
            .await?
        else {
            return failed("conversation not found");
        };

        let Some(contact) = self
            .ctx
            .contact_repo()
            .find_by_id(conversation.contact_id)
            .await?
        else {
            return failed("contact not found");
        };

        let Some(connection) = self
            .ctx
            .connection_repo()
            .find_by_id(conversation.connection_id)
            .await?
        else {
            return failed("connection not found");
        };
        if !connection.is_connected() {
            return failed("connection disconnected");
        }

        Ok(Ok(Delivery {
            sequence,
            step,
            conversation,
            contact,
            connection,
        }))
    }

    /// Render the template or ask the sequence's agent for the text
    async fn compose(&self, delivery: &Delivery) -> ServiceResult<String> {
        let instructions = match &delivery.step.content {
            StepContent::Template(template) => {
                return Ok(render_template(template, &delivery.contact).trim().to_string());
            }
            StepContent::Ai(instructions) => instructions,
        };

        let agent_id = delivery
            .sequence
            .agent_id
            .ok_or_else(|| ServiceError::validation("sequence has no AI agent"))?;
        let agent = self
            .ctx
            .agent_repo()
            .find_by_id(agent_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("AI agent", agent_id.to_string()))?;

        let history = self
            .ctx
            .message_repo()
            .find_recent(
                delivery.conversation.id,
                self.ctx.follow_up_settings().history_limit,
            )
            .await?;

        let request = build_prompt(&agent, instructions, &delivery.contact, &history);
        let text = self.ctx.generator().generate(&request).await?;
        Ok(text.trim().to_string())
    }

    async fn publish(&self, item: &FollowUpQueueItem, delivery: &Delivery, message: &Message) {
        let event = RealtimeEvent {
            kind: RealtimeEventKind::FollowUpSent,
            company_id: delivery.conversation.company_id,
            conversation_id: delivery.conversation.id,
            data: json!({
                "queue_item_id": item.id,
                "sequence_id": item.sequence_id,
                "step_id": item.step_id,
                "message": MessageResponse::from(message),
            }),
        };
        if let Err(e) = self.ctx.publisher().publish(&event).await {
            warn!(error = %e, "Failed to publish FOLLOW_UP_SENT");
        }
    }

    async fn enqueue_next(&self, item: &FollowUpQueueItem, step: &FollowUpStep, now: DateTime<Utc>) {
        let repo = self.ctx.follow_up_repo();
        let next = match repo.find_next_step(step.sequence_id, step.position).await {
            Ok(Some(next)) => next,
            Ok(None) => {
                debug!(sequence_id = %step.sequence_id, "Sequence finished");
                return;
            }
            Err(e) => {
                error!(error = %e, "Failed to look up next follow-up step");
                return;
            }
        };

        let queued = FollowUpQueueItem::new(
            item.company_id,
            item.sequence_id,
            next.id,
            item.conversation_id,
            next.schedule_after(now),
        );
        match repo.enqueue(&queued).await {
            Ok(()) => debug!(
                next_item_id = %queued.id,
                position = next.position,
                scheduled_at = %queued.scheduled_at,
                "Next follow-up step queued"
            ),
            Err(e) => error!(error = %e, "Failed to queue next follow-up step"),
        }
    }

    /// Write the outcome back to the queue row
    async fn settle(&self, item: &FollowUpQueueItem, outcome: Outcome, now: DateTime<Utc>) {
        let repo = self.ctx.follow_up_repo();
        let result = match &outcome {
            Outcome::Sent => repo.finish(item, QueueStatus::Sent, None, now).await,
            Outcome::Failed(reason) => {
                repo.finish(item, QueueStatus::Failed, Some(reason), now)
                    .await
            }
            Outcome::Cancelled(reason) => {
                repo.finish(item, QueueStatus::Cancelled, Some(reason), now)
                    .await
            }
            Outcome::Rescheduled(at) => repo.release(item, *at).await,
            Outcome::LeaseLost => return,
        };

        if let Err(e) = result {
            error!(item_id = %item.id, error = %e, outcome = ?outcome, "Failed to settle queue item");
        }
    }
}

/// Prompt for an AI step: agent instruction plus step instructions as the
/// system turn, then the conversation with consecutive turns merged
fn build_prompt(
    agent: &AiAgent,
    instructions: &str,
    contact: &Contact,
    history: &[Message],
) -> GenerationRequest {
    let mut system_instruction = agent.system_instruction();
    system_instruction.push_str("\n\n## Instruções do follow-up\n");
    system_instruction.push_str(instructions.trim());
    if let Some(name) = contact.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        system_instruction.push_str(&format!("\n\nNome do contato: {name}"));
    }

    let mut messages: Vec<PromptMessage> = Vec::new();
    let turns = history.iter().filter_map(|m| {
        let text = m.content.as_deref()?.trim();
        if text.is_empty() {
            return None;
        }
        let role = match m.direction {
            MessageDirection::Inbound => PromptRole::User,
            MessageDirection::Outbound => PromptRole::Model,
        };
        Some((role, text))
    });
    for (role, text) in turns.chain(std::iter::once((PromptRole::User, WRITE_NEXT_MESSAGE))) {
        match messages.last_mut() {
            Some(last) if last.role == role => {
                last.text.push('\n');
                last.text.push_str(text);
            }
            _ => messages.push(PromptMessage {
                role,
                text: text.to_string(),
            }),
        }
    }

    GenerationRequest {
        system_instruction,
        messages,
        model: agent.model.clone(),
        temperature: agent.temperature,
    }
}
