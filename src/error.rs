//! Connector-level error types shared across OAuth flows, dispatch, and the write session.

// self
use crate::{
	_prelude::*,
	provider::{GrantType, ProviderErrorKind},
};

/// Connector-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical connector error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; fatal and never retried.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token exchange failure.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Single-record request failure.
	#[error(transparent)]
	Dispatch(#[from] DispatchError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The health check performed while connecting failed.
	#[error("Connection test failed: {reason}.")]
	Connection {
		/// Status code or transport summary plus the response body, when available.
		reason: String,
	},
	/// The inbound record stream failed and the write loop stopped pulling records.
	#[error("Record stream failed: {reason}.")]
	Stream {
		/// Upstream failure message.
		reason: String,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required setting is empty or whitespace.
	#[error("The {name} property must be set.")]
	MissingSetting {
		/// Host-facing property name.
		name: &'static str,
	},
	/// A JSON document supplied by the host could not be parsed.
	#[error("The {document} JSON is malformed: {source}.")]
	MalformedJson {
		/// Which document failed (template, OAuth state, settings, ...).
		document: &'static str,
		/// Structured parsing failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A document could not be serialized for the host.
	#[error("The {document} could not be serialized.")]
	Serialize {
		/// Which document failed.
		document: &'static str,
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// Template uses an HTTP method outside GET/POST/PUT/PATCH/DELETE.
	#[error("HTTP method `{method}` is not supported.")]
	UnsupportedMethod {
		/// Method as written in the template.
		method: String,
	},
	/// A static header cannot be represented on the wire.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Header name as written in the template.
		name: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Provider descriptor contains an invalid URL.
	#[error("Descriptor contains an invalid URL.")]
	InvalidDescriptor {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Identifier failed validation.
	#[error(transparent)]
	Identifier(#[from] crate::auth::IdentifierError),
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// The redirect URL returned by the provider carries no `code` parameter.
	#[error("Redirect URL does not contain an authorization code.")]
	MissingAuthorizationCode,
	/// Connector settings are out of range.
	#[error("Setting `{name}` is out of range: {reason}.")]
	InvalidSetting {
		/// Setting name.
		name: &'static str,
		/// Why the value was rejected.
		reason: String,
	},
	/// Operation requires an established connection.
	#[error("The connector is not connected.")]
	NotConnected,
	/// Write stream started before a write was prepared.
	#[error("No write has been prepared for this session.")]
	WriteNotPrepared,
	/// Replication writes are not handled by this connector.
	#[error("Replication writes are not supported.")]
	ReplicationUnsupported,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Wraps a JSON parsing failure for the named host document.
	pub fn malformed_json(
		document: &'static str,
		source: serde_path_to_error::Error<serde_json::Error>,
	) -> Self {
		Self::MalformedJson { document, source }
	}

	/// Wraps a serialization failure for the named document.
	pub fn serialize(document: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
		move |source| Self::Serialize { document, source }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token exchange failures raised by the OAuth flows.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint rejected the {grant} grant ({kind:?}): {detail}.")]
	TokenEndpoint {
		/// Grant being exchanged.
		grant: GrantType,
		/// Classification supplied by the provider strategy.
		kind: ProviderErrorKind,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Response body (or OAuth error summary) returned by the provider.
		detail: String,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Authorization-code exchange returned no refresh token.
	#[error("Response did not contain a refresh token.")]
	MissingRefreshToken,
	/// Transport failure while calling the token endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl AuthError {
	/// Returns the HTTP status reported by the token endpoint, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::TokenEndpoint { status, .. } | Self::TokenResponseParse { status, .. } => *status,
			_ => None,
		}
	}

	/// Returns `true` when the stored grant is unusable and the user must re-authorize.
	pub fn requires_reauthorization(&self) -> bool {
		match self {
			Self::TokenEndpoint { kind, .. } => kind.requires_reauthorization(),
			Self::MissingRefreshToken => true,
			_ => false,
		}
	}
}

/// Failures isolated to a single record's request.
#[derive(Debug, ThisError)]
pub enum DispatchError {
	/// Record payload is not a JSON object.
	#[error("Record data is malformed.")]
	MalformedRecord {
		/// Underlying parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Record lacks a value for a template placeholder.
	#[error("Record is missing field `{field}`.")]
	MissingField {
		/// Schema field name, e.g. `URL_{1}`.
		field: String,
	},
	/// Substituted URL is not an absolute URL.
	#[error("Rendered URL `{url}` is invalid.")]
	InvalidUrl {
		/// URL after substitution.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP request could not be assembled.
	#[error(transparent)]
	Request(#[from] oauth2::http::Error),
	/// Token refresh failed for this record.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Remote API answered with a non-2xx status.
	#[error("Request failed with status {status}: {body}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body text.
		body: String,
	},
	/// Transport failure while sending the request.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The session was closed, or another write was prepared, before the record was dispatched.
	#[error("Session is no longer connected and configured for this write.")]
	SessionClosed,
	/// Dispatch task panicked; the record outcome is unknown.
	#[error("Dispatch task panicked.")]
	Panicked,
}
impl DispatchError {
	/// Returns the HTTP status associated with the failure, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::Auth(e) => e.status(),
			_ => None,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {target}: {source}.")]
	Network {
		/// Endpoint family being called.
		target: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded the configured timeout.
	#[error("Request timed out while calling {target}.")]
	Timeout {
		/// Endpoint family being called.
		target: &'static str,
	},
	/// Request could not be converted into the transport's representation.
	#[error("HTTP request is invalid: {source}.")]
	InvalidRequest {
		/// Underlying conversion failure.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
	/// Transport reported a failure without a structured error.
	#[error("HTTP client error: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(target: &'static str, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { target, source: Box::new(src) }
	}
}
