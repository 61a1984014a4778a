//! Connector settings and the JSON documents exchanged with the host.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	client::AuthorizationMode,
	error::ConfigError,
	schema::WriteSchema,
	template::PlaceholderMode,
};

/// Largest accepted `refresh_skew_secs` (one day).
pub const MAX_REFRESH_SKEW_SECS: u64 = 86_400;

/// Tunables for one connector instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorSettings {
	/// Per-request timeout for the default reqwest transport.
	pub request_timeout_secs: u64,
	/// Upper bound on concurrently dispatched records; `None` leaves it unbounded.
	pub max_in_flight: Option<usize>,
	/// How placeholders are discovered in templates.
	pub placeholder_mode: PlaceholderMode,
	/// Whether the access token is attached to outbound requests.
	pub authorization: AuthorizationMode,
	/// Seconds before expiry at which the cached access token is refreshed.
	pub refresh_skew_secs: u64,
	/// Capacity hint for the acknowledgement channel created by hosts.
	pub ack_buffer: usize,
}
impl ConnectorSettings {
	/// Parses settings from JSON; absent keys keep their defaults.
	pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);
		let settings: Self = serde_path_to_error::deserialize(&mut de)
			.map_err(|e| ConfigError::malformed_json("connector settings", e))?;

		settings.validate()?;

		Ok(settings)
	}

	/// Checks that every value is in range.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.request_timeout_secs == 0 {
			return Err(ConfigError::InvalidSetting {
				name: "request_timeout_secs",
				reason: "must be at least one second".into(),
			});
		}
		if self.max_in_flight == Some(0) {
			return Err(ConfigError::InvalidSetting {
				name: "max_in_flight",
				reason: "must be at least one when set".into(),
			});
		}
		if self.ack_buffer == 0 {
			return Err(ConfigError::InvalidSetting {
				name: "ack_buffer",
				reason: "must be at least one".into(),
			});
		}
		if self.refresh_skew_secs > MAX_REFRESH_SKEW_SECS {
			return Err(ConfigError::InvalidSetting {
				name: "refresh_skew_secs",
				reason: "must not exceed one day".into(),
			});
		}

		Ok(())
	}

	/// Request timeout as a std duration.
	pub fn request_timeout(&self) -> std::time::Duration {
		std::time::Duration::from_secs(self.request_timeout_secs)
	}

	/// Refresh skew as a `time` duration.
	pub fn refresh_skew(&self) -> Duration {
		Duration::seconds(self.refresh_skew_secs.min(MAX_REFRESH_SKEW_SECS) as i64)
	}
}
impl Default for ConnectorSettings {
	fn default() -> Self {
		Self {
			request_timeout_secs: 30,
			max_in_flight: None,
			placeholder_mode: PlaceholderMode::default(),
			authorization: AuthorizationMode::default(),
			refresh_skew_secs: 300,
			ack_buffer: 64,
		}
	}
}

/// Client registration supplied with every OAuth-related host call.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OAuthConfiguration {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: TokenSecret,
}

/// Tokens persisted by the host after the OAuth handshake.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OAuthState {
	/// Access token issued by the code exchange.
	pub auth_token: TokenSecret,
	/// Refresh token issued by the code exchange.
	pub refresh_token: TokenSecret,
	/// Nested JSON document holding an [`OAuthConfig`].
	pub config: String,
}

/// Redirect URI recorded during the handshake.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OAuthConfig {
	/// Redirect URI without query or fragment.
	pub redirect_uri: String,
}

/// Input of [`Connector::connect`](crate::session::Connector::connect).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConnectRequest {
	/// Client registration.
	pub oauth_configuration: OAuthConfiguration,
	/// Serialized [`OAuthState`].
	pub oauth_state_json: String,
}

/// Structured result of a connect call; empty strings mean no error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConnectResponse {
	/// Echo of the request's OAuth state.
	pub oauth_state_json: String,
	/// OAuth state or token failure.
	pub oauth_error: String,
	/// Settings validation or client construction failure.
	pub settings_error: String,
	/// Connection test failure.
	pub connection_error: String,
}
impl ConnectResponse {
	/// Whether all error slots are empty.
	pub fn is_success(&self) -> bool {
		self.oauth_error.is_empty() && self.settings_error.is_empty() && self.connection_error.is_empty()
	}
}

/// Form data submitted by the host while configuring a write.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigurationForm {
	/// User-entered template JSON.
	pub data_json: String,
	/// Opaque form state.
	pub state_json: String,
}

/// Form returned to the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigurationFormResponse {
	/// Echo of the submitted data.
	pub data_json: String,
	/// Per-field validation errors as JSON; unused.
	pub data_errors_json: String,
	/// Form-level errors.
	pub errors: Vec<String>,
	/// JSON schema of the form.
	pub schema_json: String,
	/// UI schema of the form.
	pub ui_json: String,
	/// Echo of the submitted state.
	pub state_json: String,
}

/// Result of [`Connector::configure_write`](crate::session::Connector::configure_write).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigureWriteResponse {
	/// Form to render.
	pub form: ConfigurationFormResponse,
	/// Derived schema, when the template parsed.
	pub schema: Option<WriteSchema>,
}

/// Job identifiers attached to a prepared write.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DataVersions {
	/// Host job identifier.
	pub job_id: String,
}

/// Input of [`Connector::prepare_write`](crate::session::Connector::prepare_write).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrepareWriteRequest {
	/// Schema produced by `configure_write`.
	pub schema: WriteSchema,
	/// Commit SLA requested by the host.
	#[serde(default)]
	pub commit_sla_seconds: u32,
	/// Replication settings; any value is rejected.
	#[serde(default)]
	pub replication: Option<serde_json::Value>,
	/// Job identifiers.
	#[serde(default)]
	pub data_versions: DataVersions,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn settings_fill_defaults_and_validate() {
		let settings = ConnectorSettings::from_json(r#"{"max_in_flight": 8, "placeholder_mode": "first_match"}"#)
			.expect("Partial settings should load.");

		assert_eq!(settings.max_in_flight, Some(8));
		assert_eq!(settings.placeholder_mode, PlaceholderMode::FirstMatch);
		assert_eq!(settings.request_timeout_secs, 30);
		assert_eq!(settings.refresh_skew(), Duration::minutes(5));
		assert_eq!(settings.authorization, AuthorizationMode::Bearer);

		let err = ConnectorSettings::from_json(r#"{"max_in_flight": 0}"#)
			.expect_err("Zero in-flight bound must be rejected.");

		assert!(matches!(err, ConfigError::InvalidSetting { name: "max_in_flight", .. }));

		let err = ConnectorSettings::from_json(r#"{"authorization": "basic"}"#)
			.expect_err("Unknown authorization modes must be rejected.");

		assert!(err.to_string().contains("connector settings"));

		let err = ConnectorSettings::from_json(r#"{"refresh_skew_secs": 9223372036854775807}"#)
			.expect_err("A skew beyond one day must be rejected.");

		assert!(matches!(err, ConfigError::InvalidSetting { name: "refresh_skew_secs", .. }));
	}

	#[test]
	fn oauth_state_round_trips_host_field_names() {
		let state: OAuthState = serde_json::from_str(
			r#"{"AuthToken":"a","RefreshToken":"r","Config":"{\"RedirectUri\":\"https://app.example.com/cb\"}"}"#,
		)
		.expect("OAuth state should parse.");
		let config: OAuthConfig =
			serde_json::from_str(&state.config).expect("Nested config should parse.");

		assert_eq!(state.refresh_token.expose(), "r");
		assert_eq!(config.redirect_uri, "https://app.example.com/cb");
	}
}
