//! Token-endpoint calls driven through the `oauth2` crate.
//!
//! [`BasicFacade`] owns a configured `oauth2::Client` and exposes the two grants the
//! connector needs: the one-time authorization-code exchange and the steady-state refresh.
//! Every failure is normalized into [`AuthError`], with the provider's response body as detail.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AccessToken, AuthType, AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret,
	EndpointNotSet, EndpointSet, HttpClientError, RedirectUrl, RefreshToken, RequestTokenError,
	Scope, StandardRevocableToken, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse, BasicTokenType,
	},
};
// self
use crate::{
	_prelude::*,
	auth::{TokenGrant, TokenSecret},
	error::{AuthError, ConfigError, TransportError},
	http::{HttpTransport, ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::{
		ClientAuthMethod, GrantType, ProviderDescriptor, ProviderErrorContext, ProviderStrategy,
	},
};

type ConnectorClient<HasAuthUrl = EndpointNotSet, HasTokenUrl = EndpointNotSet> = Client<
	BasicErrorResponse,
	ConnectorTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	HasAuthUrl,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	HasTokenUrl,
>;
type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AuthError>> + 'a + Send>>;

/// Token endpoint success body.
///
/// Only `access_token` is mandatory on the wire. `token_type` defaults to `bearer` when omitted.
/// A missing `expires_in` is rejected when the body is mapped into a [`TokenGrant`].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ConnectorTokenResponse {
	access_token: AccessToken,
	#[serde(
		default = "default_token_type",
		deserialize_with = "oauth2::helpers::deserialize_untagged_enum_case_insensitive"
	)]
	token_type: BasicTokenType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	expires_in: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	refresh_token: Option<RefreshToken>,
	#[serde(skip)]
	scopes: Option<Vec<Scope>>,
}
impl TokenResponse for ConnectorTokenResponse {
	type TokenType = BasicTokenType;

	fn access_token(&self) -> &AccessToken {
		&self.access_token
	}

	fn token_type(&self) -> &BasicTokenType {
		&self.token_type
	}

	fn expires_in(&self) -> Option<std::time::Duration> {
		self.expires_in.map(std::time::Duration::from_secs)
	}

	fn refresh_token(&self) -> Option<&RefreshToken> {
		self.refresh_token.as_ref()
	}

	fn scopes(&self) -> Option<&Vec<Scope>> {
		self.scopes.as_ref()
	}
}

fn default_token_type() -> BasicTokenType {
	BasicTokenType::Bearer
}

/// Converts transport failures into [`TransportError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Maps an [`HttpClientError`] raised while calling `target`.
	fn map_transport_error(&self, target: &'static str, error: HttpClientError<E>) -> TransportError;
}

/// Mapper for [`ReqwestHttpClient`].
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		target: &'static str,
		error: HttpClientError<ReqwestError>,
	) -> TransportError {
		match error {
			HttpClientError::Reqwest(inner) =>
				if inner.is_timeout() {
					TransportError::Timeout { target }
				} else if inner.is_builder() {
					TransportError::InvalidRequest { source: inner }
				} else {
					TransportError::network(target, *inner)
				},
			HttpClientError::Http(inner) => TransportError::InvalidRequest { source: Box::new(inner) },
			HttpClientError::Io(inner) => TransportError::Io(inner),
			HttpClientError::Other(message) => TransportError::Other { message },
			_ => TransportError::Other { message: format!("unrecognized failure calling {target}") },
		}
	}
}

pub(crate) trait OAuth2Facade: Send + Sync {
	fn refresh_token<'a, 'strategy, 'refresh>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		refresh_token: &'refresh TokenSecret,
	) -> FacadeFuture<'a, TokenGrant>
	where
		'strategy: 'a,
		'refresh: 'a;

	fn exchange_authorization_code<'a, 'strategy, 'code, 'redirect>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		code: &'code str,
		redirect_uri: &'redirect Url,
	) -> FacadeFuture<'a, TokenGrant>
	where
		'strategy: 'a,
		'code: 'a,
		'redirect: 'a;
}

pub(crate) struct BasicFacade<C = ReqwestHttpClient, M = ReqwestTransportErrorMapper>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConnectorClient<EndpointSet, EndpointSet>,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicFacade<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_descriptor(
		descriptor: &ProviderDescriptor,
		client_id: &str,
		client_secret: &TokenSecret,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self, ConfigError> {
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let token_url = TokenUrl::new(descriptor.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let mut oauth_client = ConnectorClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.expose().to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url);

		if matches!(descriptor.preferred_client_auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self { oauth_client, http_client, error_mapper })
	}
}
impl<C, M> OAuth2Facade for BasicFacade<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn refresh_token<'a, 'strategy, 'refresh>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		refresh_token: &'refresh TokenSecret,
	) -> FacadeFuture<'a, TokenGrant>
	where
		'strategy: 'a,
		'refresh: 'a,
	{
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let handle = self.http_client.with_metadata(meta.clone());
			let secret = RefreshToken::new(refresh_token.expose().to_owned());
			let mut request = self.oauth_client.exchange_refresh_token(&secret);
			let mut extra = BTreeMap::new();

			strategy.augment_token_request(GrantType::RefreshToken, &mut extra);

			for (key, value) in extra {
				request = request.add_extra_param(key, value);
			}

			let response = request.request_async(&handle).await.map_err(|err| {
				map_request_error(
					strategy,
					GrantType::RefreshToken,
					meta.take(),
					err,
					self.error_mapper.as_ref(),
				)
			})?;

			token_grant(response)
		})
	}

	fn exchange_authorization_code<'a, 'strategy, 'code, 'redirect>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		code: &'code str,
		redirect_uri: &'redirect Url,
	) -> FacadeFuture<'a, TokenGrant>
	where
		'strategy: 'a,
		'code: 'a,
		'redirect: 'a,
	{
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let handle = self.http_client.with_metadata(meta.clone());
			let redirect_url = RedirectUrl::from_url(redirect_uri.clone());
			let mut request = self
				.oauth_client
				.exchange_code(AuthorizationCode::new(code.to_owned()))
				.set_redirect_uri(Cow::Owned(redirect_url));
			let mut extra = BTreeMap::new();

			strategy.augment_token_request(GrantType::AuthorizationCode, &mut extra);

			for (key, value) in extra {
				request = request.add_extra_param(key, value);
			}

			let response = request.request_async(&handle).await.map_err(|err| {
				map_request_error(
					strategy,
					GrantType::AuthorizationCode,
					meta.take(),
					err,
					self.error_mapper.as_ref(),
				)
			})?;

			token_grant(response)
		})
	}
}

fn token_grant(response: ConnectorTokenResponse) -> Result<TokenGrant, AuthError> {
	token_grant_at(response, OffsetDateTime::now_utc())
}

fn token_grant_at(
	response: ConnectorTokenResponse,
	issued_at: OffsetDateTime,
) -> Result<TokenGrant, AuthError> {
	let expires_in = response.expires_in().ok_or(AuthError::MissingExpiresIn)?.as_secs();
	let expires_in = i64::try_from(expires_in).map_err(|_| AuthError::ExpiresInOutOfRange)?;

	if expires_in <= 0 {
		return Err(AuthError::NonPositiveExpiresIn);
	}

	let expires_in = Duration::seconds(expires_in);

	// Expiry must stay representable as a calendar instant.
	issued_at.checked_add(expires_in).ok_or(AuthError::ExpiresInOutOfRange)?;

	Ok(TokenGrant {
		access_token: TokenSecret::new(response.access_token().secret().to_owned()),
		refresh_token: response.refresh_token().map(|token| TokenSecret::new(token.secret().to_owned())),
		issued_at,
		expires_in,
	})
}

fn map_request_error<E, M>(
	strategy: &dyn ProviderStrategy,
	grant: GrantType,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> AuthError
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let status = meta.as_ref().and_then(|m| m.status);
	let body = meta.and_then(|m| m.body);

	match err {
		RequestTokenError::ServerResponse(response) =>
			server_response_error(strategy, grant, status, body, response),
		RequestTokenError::Request(error) =>
			AuthError::Transport(mapper.map_transport_error("token endpoint", error)),
		RequestTokenError::Parse(source, raw) => match status {
			Some(code) if !(200..300).contains(&code) => rejection(
				strategy,
				grant,
				status,
				body.unwrap_or_else(|| String::from_utf8_lossy(&raw).into_owned()),
			),
			_ => AuthError::TokenResponseParse { source, status },
		},
		RequestTokenError::Other(message) => rejection(strategy, grant, status, body.unwrap_or(message)),
	}
}

fn server_response_error(
	strategy: &dyn ProviderStrategy,
	grant: GrantType,
	status: Option<u16>,
	body: Option<String>,
	response: BasicErrorResponse,
) -> AuthError {
	let mut ctx =
		ProviderErrorContext::new(grant).with_oauth_error(response.error().as_ref().to_owned());

	if let Some(description) = response.error_description() {
		ctx = ctx.with_error_description(description.clone());
	}
	if let Some(code) = status {
		ctx = ctx.with_http_status(code);
	}

	let detail = body.unwrap_or_else(|| match response.error_description() {
		Some(description) => format!("{}: {description}", response.error().as_ref()),
		None => response.error().as_ref().to_owned(),
	});

	AuthError::TokenEndpoint { grant, kind: strategy.classify_token_error(&ctx), status, detail }
}

fn rejection(
	strategy: &dyn ProviderStrategy,
	grant: GrantType,
	status: Option<u16>,
	detail: String,
) -> AuthError {
	let mut ctx = ProviderErrorContext::new(grant).with_body_preview(&detail);

	if let Some(code) = status {
		ctx = ctx.with_http_status(code);
	}

	AuthError::TokenEndpoint { grant, kind: strategy.classify_token_error(&ctx), status, detail }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::ProviderId,
		provider::{DefaultProviderStrategy, ProviderErrorKind},
	};

	fn descriptor(method: ClientAuthMethod) -> ProviderDescriptor {
		ProviderDescriptor::builder(ProviderId::new("facade").expect("Identifier should be valid."))
			.authorization_endpoint(
				Url::parse("https://example.com/oauth2/authorize")
					.expect("Authorization URL should parse."),
			)
			.token_endpoint(
				Url::parse("https://example.com/oauth2/token").expect("Token URL should parse."),
			)
			.health_check_endpoint(
				Url::parse("https://example.com/health").expect("Health URL should parse."),
			)
			.preferred_client_auth_method(method)
			.build()
			.expect("Descriptor should build.")
	}

	#[test]
	fn builds_for_both_client_auth_methods() {
		for method in [ClientAuthMethod::ClientSecretBasic, ClientAuthMethod::ClientSecretPost] {
			let facade = <BasicFacade>::from_descriptor(
				&descriptor(method),
				"client-id",
				&TokenSecret::new("secret"),
				Arc::new(ReqwestHttpClient::default()),
				Arc::new(ReqwestTransportErrorMapper),
			);

			assert!(facade.is_ok());
		}
	}

	fn token_response(raw: &str) -> ConnectorTokenResponse {
		serde_json::from_str(raw).expect("Token response fixture should deserialize.")
	}

	#[test]
	fn token_response_accepts_a_missing_token_type() {
		let response =
			token_response("{\"access_token\":\"acc\",\"refresh_token\":\"r2\",\"expires_in\":3600}");

		assert_eq!(response.token_type(), &BasicTokenType::Bearer);

		let grant = token_grant(response).expect("Grant should map.");

		assert_eq!(grant.access_token.expose(), "acc");
		assert_eq!(grant.refresh_token.as_ref().map(TokenSecret::expose), Some("r2"));
		assert_eq!(grant.expires_in, Duration::hours(1));

		let response = token_response("{\"access_token\":\"acc\",\"token_type\":\"Bearer\"}");

		assert_eq!(response.token_type(), &BasicTokenType::Bearer);
		assert!(matches!(token_grant(response), Err(AuthError::MissingExpiresIn)));
	}

	#[test]
	fn unrepresentable_expiry_is_out_of_range() {
		let response =
			token_response("{\"access_token\":\"acc\",\"expires_in\":1000000000000}");

		assert!(matches!(token_grant(response), Err(AuthError::ExpiresInOutOfRange)));
	}

	#[test]
	fn non_success_parse_failures_keep_the_body() {
		let err = rejection(
			&DefaultProviderStrategy,
			GrantType::RefreshToken,
			Some(400),
			"{\"error\":\"invalid_grant\"}".into(),
		);

		match err {
			AuthError::TokenEndpoint { kind, status, detail, .. } => {
				assert_eq!(kind, ProviderErrorKind::InvalidGrant);
				assert_eq!(status, Some(400));
				assert!(detail.contains("invalid_grant"));
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}
}
