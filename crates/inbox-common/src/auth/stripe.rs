//! Stripe webhook signature verification
//!
//! The `Stripe-Signature` header looks like `t=1700000000,v1=<hex>,v1=<hex>`.
//! Each `v1` is `HMAC-SHA256(secret, "{t}.{payload}")`; one match is enough.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Verifies signed Stripe webhook payloads
#[derive(Clone)]
pub struct StripeSignatureVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl StripeSignatureVerifier {
    #[must_use]
    pub fn new(secret: impl Into<String>, tolerance_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs,
        }
    }

    /// Verify a payload against its `Stripe-Signature` header at `now` (unix seconds)
    ///
    /// # Errors
    /// Returns `AppError::InvalidSignature` when the header is malformed, the
    /// timestamp is outside the tolerance, or no signature matches
    pub fn verify(&self, header: &str, payload: &[u8], now: i64) -> Result<(), AppError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
                Some(("v1", value)) => signatures.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| AppError::InvalidSignature("missing timestamp".to_string()))?;
        if signatures.is_empty() {
            return Err(AppError::InvalidSignature("missing v1 signature".to_string()));
        }
        if now.abs_diff(timestamp) > self.tolerance_secs.unsigned_abs() {
            return Err(AppError::InvalidSignature(
                "timestamp outside tolerance".to_string(),
            ));
        }

        let matched = signatures.iter().any(|signature| {
            let Ok(expected) = hex::decode(signature) else {
                return false;
            };
            self.mac(timestamp, payload)
                .is_ok_and(|mac| mac.verify_slice(&expected).is_ok())
        });

        if matched {
            Ok(())
        } else {
            Err(AppError::InvalidSignature("no matching signature".to_string()))
        }
    }

    /// Build a header for a payload, as Stripe would send it
    ///
    /// # Errors
    /// Returns an error if the secret cannot key the MAC
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> Result<String, AppError> {
        let signature = hex::encode(self.mac(timestamp, payload)?.finalize().into_bytes());
        Ok(format!("t={timestamp},v1={signature}"))
    }

    fn mac(&self, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, AppError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| AppError::Config(format!("invalid webhook secret: {e}")))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }
}

impl std::fmt::Debug for StripeSignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeSignatureVerifier")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish_non_exhaustive()
    }
}
