//! Outbound API client: every request first obtains a valid access token.

// crates.io
use oauth2::{
	AsyncHttpClient,
	http::{
		self, HeaderName, HeaderValue, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::DispatchError,
	http::{HttpTransport, ReqwestHttpClient, ResponseMetadataSlot},
	oauth::{ReqwestTransportErrorMapper, TransportErrorMapper},
	obs::{FlowKind, FlowSpan},
	store::TokenProvider,
	template::{HttpMethod, RenderedRequest},
};

const JSON: &str = "application/json";

/// [`ApiClient`] specialized for the reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Whether the access token is sent with outbound requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationMode {
	/// Attach `Authorization: Bearer <token>`.
	#[default]
	Bearer,
	/// Keep the token fresh but send requests without it.
	RefreshOnly,
}

/// Status and body of a completed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Body decoded as UTF-8 (lossy).
	pub body: String,
}
impl ApiResponse {
	/// Whether the status is 2xx.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Sends templated requests and the connection test through a shared transport.
pub struct ApiClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	tokens: Arc<dyn TokenProvider>,
	health_check: Url,
	authorization: AuthorizationMode,
}
impl<C, M> ApiClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that asks `tokens` for a token before every request.
	pub fn new(
		http_client: impl Into<Arc<C>>,
		transport_mapper: impl Into<Arc<M>>,
		tokens: Arc<dyn TokenProvider>,
		health_check: Url,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: transport_mapper.into(),
			tokens,
			health_check,
			authorization: AuthorizationMode::default(),
		}
	}

	/// Selects whether the token is attached to requests.
	pub fn with_authorization(mut self, authorization: AuthorizationMode) -> Self {
		self.authorization = authorization;

		self
	}

	/// Sends a rendered request. Any status is returned as a response; only token and transport
	/// failures are errors.
	pub async fn send(&self, rendered: &RenderedRequest) -> Result<ApiResponse, DispatchError> {
		let token = self.tokens.valid_token().await?;
		let request = self.build_request(
			rendered.method,
			&rendered.url,
			rendered.body.as_deref(),
			rendered.headers.iter().map(|h| (h.key.as_str(), h.value.as_str())),
			&token,
		)?;

		self.execute(request, "remote API").await
	}

	/// Issues `GET` against the health-check URL; any non-2xx status fails the connection.
	pub async fn test_connection(&self) -> Result<()> {
		FlowSpan::new(FlowKind::HealthCheck, "test_connection")
			.observe(async move {
				let token = self.tokens.valid_token().await?;
				let request = self
					.build_request(HttpMethod::Get, &self.health_check, None, std::iter::empty(), &token)
					.map_err(|e| Error::Connection { reason: e.to_string() })?;
				let response = self
					.execute(request, "health check")
					.await
					.map_err(|e| Error::Connection { reason: e.to_string() })?;

				if response.is_success() {
					Ok(())
				} else {
					Err(Error::Connection {
						reason: format!("status {}: {}", response.status, response.body),
					})
				}
			})
			.await
			.inspect_err(|e| tracing::error!(error = %e, "connection test failed"))
	}

	fn build_request<'h>(
		&self,
		method: HttpMethod,
		url: &Url,
		body: Option<&str>,
		extra_headers: impl Iterator<Item = (&'h str, &'h str)>,
		token: &TokenSecret,
	) -> Result<Request<Vec<u8>>, DispatchError> {
		let mut request = Request::new(body.unwrap_or_default().as_bytes().to_vec());

		*request.method_mut() = method.to_http();
		*request.uri_mut() = url.as_str().parse::<http::Uri>().map_err(http::Error::from)?;

		let headers = request.headers_mut();

		for (key, value) in extra_headers {
			headers.append(
				HeaderName::from_bytes(key.as_bytes()).map_err(http::Error::from)?,
				HeaderValue::from_str(value).map_err(http::Error::from)?,
			);
		}
		if !headers.contains_key(ACCEPT) {
			headers.insert(ACCEPT, HeaderValue::from_static(JSON));
		}
		if body.is_some() && !headers.contains_key(CONTENT_TYPE) {
			headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
		}
		if self.authorization == AuthorizationMode::Bearer {
			let mut value = HeaderValue::from_str(&token.bearer()).map_err(http::Error::from)?;

			value.set_sensitive(true);
			headers.insert(AUTHORIZATION, value);
		}

		Ok(request)
	}

	async fn execute(
		&self,
		request: Request<Vec<u8>>,
		target: &'static str,
	) -> Result<ApiResponse, DispatchError> {
		let handle = self.http_client.with_metadata(ResponseMetadataSlot::default());
		let response = handle
			.call(request)
			.await
			.map_err(|e| self.transport_mapper.map_transport_error(target, e))?;

		Ok(ApiResponse {
			status: response.status().as_u16(),
			body: String::from_utf8_lossy(response.body()).into_owned(),
		})
	}
}
impl<C, M> Debug for ApiClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("health_check", &self.health_check)
			.field("authorization", &self.authorization)
			.finish()
	}
}
