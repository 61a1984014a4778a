//! Cached access-token state owned by the token store.

// self
use crate::{
	_prelude::*,
	auth::{TokenGrant, TokenSecret},
};

/// Default margin before expiry at which a cached token stops being handed out.
pub const DEFAULT_REFRESH_SKEW: Duration = Duration::minutes(5);

/// Current access token and its expiry instant.
#[derive(Clone, Debug)]
pub struct TokenState {
	/// Cached access token; empty until the first refresh.
	pub access_token: TokenSecret,
	/// Instant at which the provider considers the token expired.
	pub expires_at: OffsetDateTime,
}
impl TokenState {
	/// Creates the initial state: empty token that expires immediately.
	pub fn empty(now: OffsetDateTime) -> Self {
		Self { access_token: TokenSecret::default(), expires_at: now }
	}

	/// Builds a state from an explicit token and expiry.
	pub fn new(access_token: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { access_token: TokenSecret::new(access_token), expires_at }
	}

	/// Returns `true` when the token can still be used at `now`, i.e. `now + skew < expires_at`.
	///
	/// A skew that pushes `now` past the calendar bounds never yields a valid token.
	pub fn is_valid_at(&self, now: OffsetDateTime, skew: Duration) -> bool {
		!self.access_token.is_blank()
			&& now.checked_add(skew).is_some_and(|deadline| deadline < self.expires_at)
	}

	/// Replaces the cached token with a freshly issued grant.
	pub fn apply(&mut self, grant: &TokenGrant) {
		self.access_token = grant.access_token.clone();
		self.expires_at = grant.expires_at();
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn validity_respects_the_refresh_skew() {
		let now = macros::datetime!(2025-06-01 12:00 UTC);

		assert!(!TokenState::new("t", now + Duration::minutes(4)).is_valid_at(now, DEFAULT_REFRESH_SKEW));
		assert!(!TokenState::new("t", now + Duration::minutes(5)).is_valid_at(now, DEFAULT_REFRESH_SKEW));
		assert!(TokenState::new("t", now + Duration::minutes(10)).is_valid_at(now, DEFAULT_REFRESH_SKEW));
	}

	#[test]
	fn oversized_skew_marks_the_token_stale() {
		let now = macros::datetime!(2025-06-01 12:00 UTC);
		let state = TokenState::new("t", now + Duration::hours(1));

		assert!(!state.is_valid_at(now, Duration::seconds(i64::MAX)));
	}

	#[test]
	fn empty_state_is_never_valid() {
		let now = macros::datetime!(2025-06-01 12:00 UTC);
		let mut state = TokenState::empty(now);

		assert!(!state.is_valid_at(now, Duration::ZERO));

		state.apply(&TokenGrant {
			access_token: TokenSecret::new("fresh"),
			refresh_token: None,
			issued_at: now,
			expires_in: Duration::hours(1),
		});

		assert_eq!(state.access_token.expose(), "fresh");
		assert_eq!(state.expires_at, macros::datetime!(2025-06-01 13:00 UTC));
		assert!(state.is_valid_at(now, DEFAULT_REFRESH_SKEW));
	}
}
