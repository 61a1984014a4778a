//! Secret wrapper that keeps tokens and client secrets out of logs.

// self
use crate::_prelude::*;

/// Redacted secret wrapper used for access tokens, refresh tokens, and client secrets.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the secret holds no non-whitespace characters.
	pub fn is_blank(&self) -> bool {
		self.0.trim().is_empty()
	}

	/// Formats the secret as an `Authorization` header value.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
