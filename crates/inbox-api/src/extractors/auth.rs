//! Authentication extractor
//!
//! Validates the Supabase access token from the Authorization header and
//! turns it into a service-layer [`Caller`].

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use inbox_common::JwtService;
use inbox_service::Caller;

use crate::response::ApiError;

/// Authenticated caller: a signed-in user or the service role
#[derive(Debug, Clone, Copy)]
pub struct AuthCaller(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for AuthCaller
where
    S: Send + Sync,
    Arc<JwtService>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let jwt_service = Arc::<JwtService>::from_ref(state);
        let claims = jwt_service
            .validate_access_token(bearer.token())
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected access token");
                ApiError::App(e)
            })?;

        let caller = Caller::from_claims(&claims)?;
        Ok(AuthCaller(caller))
    }
}
