//! UAZAPI WhatsApp gateway client.
//!
//! Each connection carries its own instance token, so the token travels with
//! every request instead of living in the client's default headers.

use std::time::Duration;

use async_trait::async_trait;
use inbox_common::UazapiConfig;
use inbox_core::{GatewayReceipt, MediaSend, MessagingGateway, ProviderResult, TextSend};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::{truncate_body, ProviderError, Upstream};

#[derive(Debug, Serialize)]
struct SendTextBody<'a> {
    number: &'a str,
    text: &'a str,
    #[serde(rename = "replyid", skip_serializing_if = "Option::is_none")]
    reply_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SendMediaBody<'a> {
    number: &'a str,
    #[serde(rename = "type")]
    media_type: &'a str,
    file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(rename = "replyid", skip_serializing_if = "Option::is_none")]
    reply_id: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct UazapiClient {
    client: reqwest::Client,
    base_url: String,
}

impl UazapiClient {
    pub fn new(config: &UazapiConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<B: Serialize + Sync>(
        &self,
        endpoint: &str,
        token: &str,
        body: &B,
    ) -> Result<GatewayReceipt, ProviderError> {
        let response = self
            .client
            .post(format!("{}{endpoint}", self.base_url))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::transport(Upstream::Gateway, &e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(Upstream::Gateway, &e))?;
        debug!(status = %status, endpoint, "gateway response received");

        if !status.is_success() {
            warn!(status = %status, endpoint, "gateway rejected send");
            return Err(ProviderError::Status {
                upstream: Upstream::Gateway,
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }

        Ok(GatewayReceipt {
            provider_message_id: provider_message_id(&text),
        })
    }
}

/// Provider id from `messageid`, `id` or `key.id`; a non-JSON body is still an accepted send
fn provider_message_id(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["/messageid", "/id", "/key/id"]
        .iter()
        .find_map(|pointer| match value.pointer(pointer)? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

#[async_trait]
impl MessagingGateway for UazapiClient {
    #[instrument(skip(self, request), fields(number = %request.number))]
    async fn send_text(&self, request: &TextSend) -> ProviderResult<GatewayReceipt> {
        let body = SendTextBody {
            number: &request.number,
            text: &request.text,
            reply_id: request.reply_to.as_deref(),
        };
        Ok(self.post("/send/text", &request.token, &body).await?)
    }

    #[instrument(skip(self, request), fields(number = %request.number, kind = request.kind.as_str()))]
    async fn send_media(&self, request: &MediaSend) -> ProviderResult<GatewayReceipt> {
        let body = SendMediaBody {
            number: &request.number,
            media_type: request.kind.gateway_type(),
            file: &request.file_url,
            text: request.caption.as_deref(),
            reply_id: request.reply_to.as_deref(),
        };
        Ok(self.post("/send/media", &request.token, &body).await?)
    }
}
