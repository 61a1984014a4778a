//! Client credentials bound to a connection.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Client credentials plus the refresh token obtained during the OAuth handshake.
///
/// Values are immutable once [`Credentials::validate`] succeeds; every field must contain
/// non-whitespace text.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Credentials {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: TokenSecret,
	/// Long-lived refresh token.
	pub refresh_token: TokenSecret,
	/// Redirect URI registered with the provider.
	pub redirect_url: String,
}
impl Credentials {
	/// Validates that every property is populated.
	pub fn validate(&self) -> Result<(), ConfigError> {
		require("ClientId", &self.client_id)?;
		require("ClientSecret", self.client_secret.expose())?;
		require("RefreshToken", self.refresh_token.expose())?;
		require("RedirectUrl", &self.redirect_url)?;

		Ok(())
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.field("refresh_token", &self.refresh_token)
			.field("redirect_url", &self.redirect_url)
			.finish()
	}
}

fn require(name: &'static str, value: &str) -> Result<(), ConfigError> {
	if value.trim().is_empty() { Err(ConfigError::MissingSetting { name }) } else { Ok(()) }
}
