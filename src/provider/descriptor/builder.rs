// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{ClientAuthMethod, DEFAULT_SCOPE, ProviderDescriptor, ProviderEndpoints},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Authorization endpoint is required for the OAuth handshake.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is mandatory for all flows.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Connection tests need a URL to probe.
	#[error("Missing health check endpoint.")]
	MissingHealthCheckEndpoint,
	/// OAuth endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Scope contains control characters.
	#[error("Scope must not contain control characters.")]
	InvalidScope,
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint used for exchanges and refreshes.
	pub token_endpoint: Option<Url>,
	/// URL probed while connecting.
	pub health_check_endpoint: Option<Url>,
	/// Scope requested on the authorize URL.
	pub scope: String,
	/// Preferred client authentication method for the token endpoint.
	pub preferred_client_auth_method: ClientAuthMethod,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			authorization_endpoint: None,
			token_endpoint: None,
			health_check_endpoint: None,
			scope: DEFAULT_SCOPE.into(),
			preferred_client_auth_method: ClientAuthMethod::default(),
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the health-check URL.
	pub fn health_check_endpoint(mut self, url: Url) -> Self {
		self.health_check_endpoint = Some(url);

		self
	}

	/// Overrides the requested scope (defaults to `offline_access`).
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Overrides the preferred client authentication method.
	pub fn preferred_client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.preferred_client_auth_method = method;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let health_check =
			self.health_check_endpoint.ok_or(ProviderDescriptorError::MissingHealthCheckEndpoint)?;
		let descriptor = ProviderDescriptor {
			id: self.id,
			endpoints: ProviderEndpoints { authorization, token, health_check },
			scope: self.scope,
			preferred_client_auth_method: self.preferred_client_auth_method,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	pub(crate) fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;

		if self.scope.chars().any(char::is_control) {
			return Err(ProviderDescriptorError::InvalidScope);
		}

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() != "https" {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}
