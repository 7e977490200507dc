//! Authentication utilities

mod jwt;
mod stripe;

pub use jwt::{Claims, JwtService, SERVICE_ROLE};
pub use stripe::StripeSignatureVerifier;
