//! Stripe billing sync
//!
//! Mirrors subscription state from Stripe webhooks onto the company row.
//! Every event id is recorded in the webhook ledger first, so Stripe's
//! redeliveries are acknowledged without touching the company twice.

use chrono::{DateTime, Utc};
use inbox_core::{Company, PlanQuota, SubscriptionStatus};
use serde::de::DeserializeOwned;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::dto::{CheckoutSession, Invoice, StripeEvent, Subscription, WebhookOutcome};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const CHECKOUT_COMPLETED: &str = "checkout.session.completed";
const SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
const SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";
const INVOICE_PAID: &str = "invoice.payment_succeeded";
const INVOICE_FAILED: &str = "invoice.payment_failed";

/// Billing service
pub struct BillingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BillingService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Verify, deduplicate and apply one Stripe webhook delivery
    ///
    /// `now` is the current unix time used for the signature tolerance check.
    #[instrument(skip(self, payload, signature), fields(payload_len = payload.len()))]
    pub async fn handle_stripe_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        now: i64,
    ) -> ServiceResult<WebhookOutcome> {
        self.ctx.stripe_verifier().verify(signature, payload, now)?;

        let event: StripeEvent = serde_json::from_slice(payload)
            .map_err(|e| ServiceError::validation(format!("malformed Stripe event: {e}")))?;

        let ledger = self.ctx.webhook_ledger();
        if !ledger.record_once(&event.id).await? {
            info!(event_id = %event.id, event_type = %event.event_type, "Duplicate Stripe event");
            return Ok(WebhookOutcome::Duplicate);
        }

        match self.apply(&event).await {
            Ok(outcome) => {
                match &outcome {
                    WebhookOutcome::Ignored(reason) => {
                        info!(event_id = %event.id, event_type = %event.event_type, reason = %reason, "Stripe event ignored");
                    }
                    _ => info!(event_id = %event.id, event_type = %event.event_type, "Stripe event applied"),
                }
                Ok(outcome)
            }
            Err(e) => {
                // Let Stripe's retry process the event again
                if let Err(forget_err) = ledger.forget(&event.id).await {
                    warn!(event_id = %event.id, error = %forget_err, "Failed to release Stripe event id");
                }
                Err(e)
            }
        }
    }

    async fn apply(&self, event: &StripeEvent) -> ServiceResult<WebhookOutcome> {
        match event.event_type.as_str() {
            CHECKOUT_COMPLETED => self.checkout_completed(object(event)?).await,
            SUBSCRIPTION_UPDATED => self.subscription_updated(object(event)?).await,
            SUBSCRIPTION_DELETED => self.subscription_deleted(object(event)?).await,
            INVOICE_PAID => {
                self.invoice(object(event)?, SubscriptionStatus::Active)
                    .await
            }
            INVOICE_FAILED => {
                self.invoice(object(event)?, SubscriptionStatus::PastDue)
                    .await
            }
            other => Ok(WebhookOutcome::Ignored(format!("unhandled event type {other}"))),
        }
    }

    async fn checkout_completed(&self, session: CheckoutSession) -> ServiceResult<WebhookOutcome> {
        let reference = session
            .client_reference_id
            .as_deref()
            .or_else(|| session.metadata.get("company_id").map(String::as_str));
        let Some(company_id) = reference.and_then(|r| Uuid::parse_str(r.trim()).ok()) else {
            return Ok(ignored("checkout session without a company reference"));
        };
        let Some(mut company) = self.ctx.company_repo().find_by_id(company_id).await? else {
            return Ok(ignored(format!("unknown company {company_id}")));
        };

        if session.customer.is_some() {
            company.stripe_customer_id = session.customer;
        }
        if session.subscription.is_some() {
            company.stripe_subscription_id = session.subscription;
        }
        company.subscription_status = SubscriptionStatus::Active;

        if let Some(price_id) = session.metadata.get("price_id") {
            match self.ctx.plan_for_price(price_id) {
                Some(quota) => company.apply_quota(quota),
                None => warn!(%price_id, company_id = %company.id, "Checkout price has no plan"),
            }
        }

        self.save(company).await
    }

    async fn subscription_updated(&self, subscription: Subscription) -> ServiceResult<WebhookOutcome> {
        let Some(mut company) = self.company_for(subscription.customer.as_deref()).await? else {
            return Ok(ignored("subscription for an unknown customer"));
        };

        match subscription.price_id() {
            Some(price_id) => match self.ctx.plan_for_price(price_id) {
                Some(quota) => company.apply_quota(quota),
                None => warn!(%price_id, company_id = %company.id, "Unknown Stripe price, keeping plan"),
            },
            None => warn!(subscription_id = %subscription.id, "Subscription without items"),
        }

        company.stripe_subscription_id = Some(subscription.id.clone());
        company.subscription_status = SubscriptionStatus::parse(&subscription.status);
        if let Some(end) = subscription
            .period_end()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
        {
            company.current_period_end = Some(end);
        }

        self.save(company).await
    }

    async fn subscription_deleted(&self, subscription: Subscription) -> ServiceResult<WebhookOutcome> {
        let Some(mut company) = self.company_for(subscription.customer.as_deref()).await? else {
            return Ok(ignored("subscription for an unknown customer"));
        };

        company.apply_quota(&PlanQuota::free());
        company.subscription_status = SubscriptionStatus::Canceled;
        company.stripe_subscription_id = None;

        self.save(company).await
    }

    async fn invoice(
        &self,
        invoice: Invoice,
        status: SubscriptionStatus,
    ) -> ServiceResult<WebhookOutcome> {
        let Some(mut company) = self.company_for(invoice.customer.as_deref()).await? else {
            return Ok(ignored("invoice for an unknown customer"));
        };

        company.subscription_status = status;
        self.save(company).await
    }

    async fn company_for(&self, customer_id: Option<&str>) -> ServiceResult<Option<Company>> {
        match customer_id {
            Some(id) => Ok(self.ctx.company_repo().find_by_stripe_customer(id).await?),
            None => Ok(None),
        }
    }

    async fn save(&self, mut company: Company) -> ServiceResult<WebhookOutcome> {
        company.updated_at = Utc::now();
        self.ctx.company_repo().update_billing(&company).await?;
        info!(
            company_id = %company.id,
            plan = %company.plan,
            status = company.subscription_status.as_str(),
            "Company billing updated"
        );
        Ok(WebhookOutcome::Applied)
    }
}

fn object<T: DeserializeOwned>(event: &StripeEvent) -> ServiceResult<T> {
    serde_json::from_value(event.data.object.clone()).map_err(|e| {
        ServiceError::validation(format!("malformed {} object: {e}", event.event_type))
    })
}

fn ignored(reason: impl Into<String>) -> WebhookOutcome {
    WebhookOutcome::Ignored(reason.into())
}
