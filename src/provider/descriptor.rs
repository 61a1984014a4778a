//! Provider descriptor data structures shared by all flows.
//!
//! One descriptor replaces per-environment copies of the connector: endpoints, the scope
//! requested during the handshake, and the client-auth preference all live here.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Grant identifiers used in token requests and error context.
pub mod grant;

pub use builder::*;
pub use grant::*;

// self
use crate::{_prelude::*, auth::ProviderId};

/// Scope requested by default so the provider issues a refresh token.
pub const DEFAULT_SCOPE: &str = "offline_access";

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	#[default]
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint users are redirected to.
	pub authorization: Url,
	/// Token endpoint used for code exchanges and refreshes.
	pub token: Url,
	/// URL probed with `GET` while connecting.
	pub health_check: Url,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Scope string sent on the authorize URL.
	pub scope: String,
	/// Preferred client authentication mechanism.
	pub preferred_client_auth_method: ClientAuthMethod,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Parses and validates a descriptor from JSON.
	pub fn from_json(raw: &str) -> Result<Self> {
		let mut de = serde_json::Deserializer::from_str(raw);
		let descriptor: Self = serde_path_to_error::deserialize(&mut de)
			.map_err(|e| crate::error::ConfigError::malformed_json("provider descriptor", e))?;

		descriptor.validate().map_err(crate::error::ConfigError::from)?;

		Ok(descriptor)
	}
}
