//! OAuth 2.0 flows against one provider: authorize URL, code exchange, and refresh.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{TokenGrant, TokenSecret},
	error::{AuthError, ConfigError},
	http::{HttpTransport, ReqwestHttpClient},
	oauth::{BasicFacade, OAuth2Facade, ReqwestTransportErrorMapper, TransportErrorMapper},
	obs::{FlowKind, FlowSpan},
	provider::{ProviderDescriptor, ProviderStrategy},
};

const STATE_LEN: usize = 32;

/// [`OAuthClient`] specialized for the reqwest transport.
pub type ReqwestOAuthClient = OAuthClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Browser-facing authorization request produced by [`OAuthClient::start_authorization`].
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
	/// Opaque state echoed back on the redirect.
	pub state: String,
	/// Redirect URI embedded in the authorize URL.
	pub redirect_uri: Url,
	/// Authorize URL the user should open.
	pub authorize_url: Url,
}

/// Runs the OAuth grants for a single client registration.
pub struct OAuthClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Provider endpoints and scope.
	pub descriptor: ProviderDescriptor,
	/// Strategy used to decorate token requests and classify failures.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	facade: BasicFacade<C, M>,
}
impl<C, M> OAuthClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that sends token requests through the given transport.
	pub fn new(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		client_id: impl Into<String>,
		client_secret: &TokenSecret,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self, ConfigError> {
		let client_id = client_id.into();
		let facade = BasicFacade::from_descriptor(
			&descriptor,
			&client_id,
			client_secret,
			http_client.into(),
			mapper.into(),
		)?;

		Ok(Self { descriptor, strategy, client_id, facade })
	}

	/// Builds the authorize URL with `client_id`, `response_type=code`, `redirect_uri`,
	/// `scope`, and `state` query parameters.
	pub fn authorization_url(&self, redirect_uri: &Url, state: &str) -> Url {
		let mut url = self.descriptor.endpoints.authorization.clone();

		url.query_pairs_mut()
			.append_pair("client_id", &self.client_id)
			.append_pair("response_type", "code")
			.append_pair("redirect_uri", redirect_uri.as_str())
			.append_pair("scope", &self.descriptor.scope)
			.append_pair("state", state);

		url
	}

	/// Generates a random state and the matching authorize URL.
	pub fn start_authorization(&self, redirect_uri: Url) -> AuthorizationRequest {
		let state = random_state();
		let authorize_url = self.authorization_url(&redirect_uri, &state);

		AuthorizationRequest { state, redirect_uri, authorize_url }
	}

	/// Exchanges an authorization code; the response must carry a refresh token.
	pub async fn exchange_code(
		&self,
		code: &str,
		redirect_uri: &Url,
	) -> Result<TokenGrant, AuthError> {
		FlowSpan::new(FlowKind::AuthorizationCode, "exchange_code")
			.observe(async move {
				let grant = self
					.facade
					.exchange_authorization_code(self.strategy.as_ref(), code, redirect_uri)
					.await?;

				if grant.refresh_token.as_ref().is_none_or(TokenSecret::is_blank) {
					return Err(AuthError::MissingRefreshToken);
				}

				tracing::info!(client_id = %self.client_id, "authorization code exchanged");

				Ok(grant)
			})
			.await
			.inspect_err(|e| {
				tracing::error!(
					error = %e,
					reauthorize = e.requires_reauthorization(),
					"authorization code exchange failed"
				)
			})
	}

	/// Performs a refresh-token grant.
	pub async fn refresh(&self, refresh_token: &TokenSecret) -> Result<TokenGrant, AuthError> {
		FlowSpan::new(FlowKind::Refresh, "refresh")
			.observe(self.facade.refresh_token(self.strategy.as_ref(), refresh_token))
			.await
			.inspect_err(|e| {
				tracing::error!(error = %e, reauthorize = e.requires_reauthorization(), "token refresh failed")
			})
	}
}
impl<C, M> Debug for OAuthClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthClient")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.finish()
	}
}

fn random_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{auth::ProviderId, provider::DefaultProviderStrategy};

	fn client() -> ReqwestOAuthClient {
		let descriptor =
			ProviderDescriptor::builder(ProviderId::new("flows").expect("Identifier should be valid."))
				.authorization_endpoint(
					Url::parse("https://login.example.com/oauth2/authorize")
						.expect("Authorization URL should parse."),
				)
				.token_endpoint(
					Url::parse("https://login.example.com/oauth2/token")
						.expect("Token URL should parse."),
				)
				.health_check_endpoint(
					Url::parse("https://api.example.com/").expect("Health URL should parse."),
				)
				.build()
				.expect("Descriptor should build.");

		OAuthClient::new(
			descriptor,
			Arc::new(DefaultProviderStrategy),
			"client-1",
			&TokenSecret::new("secret"),
			ReqwestHttpClient::default(),
			ReqwestTransportErrorMapper,
		)
		.expect("OAuth client should build.")
	}

	#[test]
	fn authorize_url_carries_the_handshake_parameters() {
		let redirect =
			Url::parse("https://app.example.com/callback").expect("Redirect URL should parse.");
		let url = client().authorization_url(&redirect, "abc");
		let pairs = url.query_pairs().into_owned().collect::<Vec<_>>();

		assert_eq!(url.path(), "/oauth2/authorize");
		assert_eq!(
			pairs,
			vec![
				("client_id".into(), "client-1".into()),
				("response_type".into(), "code".into()),
				("redirect_uri".into(), "https://app.example.com/callback".into()),
				("scope".into(), "offline_access".into()),
				("state".into(), "abc".into()),
			]
		);
	}

	#[test]
	fn start_authorization_generates_fresh_state() {
		let client = client();
		let redirect =
			Url::parse("https://app.example.com/callback").expect("Redirect URL should parse.");
		let first = client.start_authorization(redirect.clone());
		let second = client.start_authorization(redirect);

		assert_eq!(first.state.len(), STATE_LEN);
		assert!(first.state.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(first.state, second.state);
		assert!(first.authorize_url.as_str().contains(&format!("state={}", first.state)));
	}
}
