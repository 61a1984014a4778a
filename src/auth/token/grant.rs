//! Token endpoint payloads normalized into connector types.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Tokens issued by a successful grant.
#[derive(Clone, Debug)]
pub struct TokenGrant {
	/// Short-lived access token.
	pub access_token: TokenSecret,
	/// Refresh token, when the provider issued or rotated one.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the response was received.
	pub issued_at: OffsetDateTime,
	/// Lifetime reported through `expires_in`.
	pub expires_in: Duration,
}
impl TokenGrant {
	/// Absolute expiry instant (`issued_at + expires_in`), saturating at the calendar bounds.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.issued_at.saturating_add(self.expires_in)
	}
}
