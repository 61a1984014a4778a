//! Provider-specific hooks for token requests.
//!
//! A strategy may add form fields to the refresh or code-exchange request and decides how a
//! rejected token call is classified. Classification only feeds error reporting; the connector
//! never retries a token call on its own.

// self
use crate::{_prelude::*, provider::descriptor::GrantType};

/// Hooks that let a provider decorate token requests and classify token failures.
pub trait ProviderStrategy: Send + Sync {
	/// Classifies a failed token call.
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind;

	/// Adds provider-specific form fields (audience, resource, ...) before the request is sent.
	fn augment_token_request(&self, _grant: GrantType, _form: &mut BTreeMap<String, String>) {}
}

/// Categories a token failure is reported under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderErrorKind {
	/// Authorization code or refresh token was rejected; the user must re-authorize.
	InvalidGrant,
	/// Client credentials were rejected.
	InvalidClient,
	/// Requested scope is not granted to this client.
	InsufficientScope,
	/// Provider-side or rate-limit failure that may succeed later.
	Transient,
}
impl ProviderErrorKind {
	/// Returns `true` when re-authorizing is the only way forward.
	pub fn requires_reauthorization(self) -> bool {
		matches!(self, Self::InvalidGrant | Self::InvalidClient)
	}
}

/// Facts about a failed token call handed to [`ProviderStrategy::classify_token_error`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// Grant that was being exchanged.
	pub grant_type: GrantType,
	/// HTTP status, when a response arrived.
	pub http_status: Option<u16>,
	/// OAuth `error` field.
	pub oauth_error: Option<String>,
	/// OAuth `error_description` field.
	pub error_description: Option<String>,
	/// Leading part of the response body.
	pub body_preview: Option<String>,
}
impl ProviderErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates an empty context for the given grant.
	pub fn new(grant_type: GrantType) -> Self {
		Self {
			grant_type,
			http_status: None,
			oauth_error: None,
			error_description: None,
			body_preview: None,
		}
	}

	/// Records the HTTP status.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Records the OAuth `error` code.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Records the OAuth `error_description`.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Records a truncated preview of the response body.
	pub fn with_body_preview(mut self, body: &str) -> Self {
		self.body_preview = Some(body.chars().take(Self::BODY_PREVIEW_LIMIT).collect());

		self
	}
}

/// Strategy that adds nothing to requests and classifies failures by OAuth error code, then by
/// body text, then by status.
#[derive(Debug, Default)]
pub struct DefaultProviderStrategy;
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		[ctx.oauth_error.as_deref(), ctx.error_description.as_deref(), ctx.body_preview.as_deref()]
			.into_iter()
			.flatten()
			.find_map(classify_text)
			.unwrap_or_else(|| classify_status(ctx.http_status))
	}
}

const ERROR_CODES: &[(&str, ProviderErrorKind)] = &[
	("invalid_grant", ProviderErrorKind::InvalidGrant),
	("access_denied", ProviderErrorKind::InvalidGrant),
	("invalid_client", ProviderErrorKind::InvalidClient),
	("unauthorized_client", ProviderErrorKind::InvalidClient),
	("invalid_scope", ProviderErrorKind::InsufficientScope),
	("insufficient_scope", ProviderErrorKind::InsufficientScope),
	("temporarily_unavailable", ProviderErrorKind::Transient),
	("server_error", ProviderErrorKind::Transient),
];

fn classify_text(text: &str) -> Option<ProviderErrorKind> {
	let lowered = text.to_ascii_lowercase();

	ERROR_CODES.iter().find(|(code, _)| lowered.contains(code)).map(|(_, kind)| *kind)
}

fn classify_status(status: Option<u16>) -> ProviderErrorKind {
	match status {
		Some(400 | 404 | 410) => ProviderErrorKind::InvalidGrant,
		Some(401) => ProviderErrorKind::InvalidClient,
		Some(403) => ProviderErrorKind::InsufficientScope,
		_ => ProviderErrorKind::Transient,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn oauth_error_code_wins_over_status() {
		let ctx = ProviderErrorContext::new(GrantType::RefreshToken)
			.with_http_status(500)
			.with_oauth_error("invalid_grant");

		assert_eq!(DefaultProviderStrategy.classify_token_error(&ctx), ProviderErrorKind::InvalidGrant);
	}

	#[test]
	fn body_text_is_consulted_before_status() {
		let ctx = ProviderErrorContext::new(GrantType::AuthorizationCode)
			.with_http_status(400)
			.with_body_preview("{\"error\":\"Invalid_Client\"}");

		assert_eq!(
			DefaultProviderStrategy.classify_token_error(&ctx),
			ProviderErrorKind::InvalidClient
		);
	}

	#[test]
	fn status_fallback_and_preview_truncation() {
		let ctx = ProviderErrorContext::new(GrantType::RefreshToken)
			.with_http_status(503)
			.with_body_preview(&"x".repeat(1_000));

		assert_eq!(ctx.body_preview.as_ref().map(String::len), Some(256));
		assert_eq!(DefaultProviderStrategy.classify_token_error(&ctx), ProviderErrorKind::Transient);
		assert!(ProviderErrorKind::InvalidGrant.requires_reauthorization());
		assert!(!ProviderErrorKind::Transient.requires_reauthorization());
	}
}
