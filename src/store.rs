//! Access-token cache with refresh-on-demand.
//!
//! [`TokenStore`] owns the [`TokenState`] for one connection. A token is handed out while
//! `now + skew < expires_at`; otherwise the store performs a refresh-token grant, stores the new
//! access token, and rotates the refresh token when the provider issues a new one. Refreshes
//! are single-flight: concurrent callers that find the token stale wait for one refresh and
//! reuse its result.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{DEFAULT_REFRESH_SKEW, TokenSecret, TokenState},
	error::AuthError,
	flows::OAuthClient,
	http::HttpTransport,
	oauth::TransportErrorMapper,
};

/// Future returned by [`TokenProvider::valid_token`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<TokenSecret, AuthError>> + 'a + Send>>;

/// Source of currently valid access tokens.
pub trait TokenProvider
where
	Self: Send + Sync,
{
	/// Returns a non-expired access token, refreshing first when needed.
	fn valid_token(&self) -> TokenFuture<'_>;
}

/// Cached access token for one set of credentials.
pub struct TokenStore<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client: Arc<OAuthClient<C, M>>,
	refresh_token: Mutex<TokenSecret>,
	state: RwLock<TokenState>,
	refresh_guard: AsyncMutex<()>,
	skew: Duration,
	metrics: RefreshMetrics,
}
impl<C, M> TokenStore<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a store whose first request triggers a refresh.
	pub fn new(client: Arc<OAuthClient<C, M>>, refresh_token: TokenSecret) -> Self {
		Self::with_state(client, refresh_token, TokenState::empty(OffsetDateTime::now_utc()))
	}

	/// Creates a store seeded with an existing token state.
	pub fn with_state(
		client: Arc<OAuthClient<C, M>>,
		refresh_token: TokenSecret,
		state: TokenState,
	) -> Self {
		Self {
			client,
			refresh_token: Mutex::new(refresh_token),
			state: RwLock::new(state),
			refresh_guard: AsyncMutex::new(()),
			skew: DEFAULT_REFRESH_SKEW,
			metrics: RefreshMetrics::default(),
		}
	}

	/// Overrides the margin before expiry at which tokens are refreshed.
	pub fn with_skew(mut self, skew: Duration) -> Self {
		self.skew = skew;

		self
	}

	/// Refresh counters for this store.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Current refresh token, including any rotation performed by the provider.
	pub fn refresh_token(&self) -> TokenSecret {
		self.refresh_token.lock().clone()
	}

	/// Snapshot of the cached token state.
	pub fn state(&self) -> TokenState {
		self.state.read().clone()
	}

	/// Returns the cached token while it is valid, refreshing it otherwise.
	pub async fn get_valid_token(&self) -> Result<TokenSecret, AuthError> {
		if let Some(token) = self.cached(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let _singleflight = self.refresh_guard.lock().await;

		if let Some(token) = self.cached(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		self.metrics.record_attempt();

		let refresh_token = self.refresh_token();
		let grant = self.client.refresh(&refresh_token).await.inspect_err(|_| {
			self.metrics.record_failure();
		})?;

		if let Some(rotated) = grant.refresh_token.as_ref().filter(|t| !t.is_blank()) {
			*self.refresh_token.lock() = rotated.clone();

			tracing::debug!("refresh token rotated");
		}

		self.state.write().apply(&grant);
		self.metrics.record_success();

		tracing::debug!(expires_at = %grant.expires_at(), "access token refreshed");

		Ok(grant.access_token)
	}

	fn cached(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		let state = self.state.read();

		state.is_valid_at(now, self.skew).then(|| state.access_token.clone())
	}
}
impl<C, M> TokenProvider for TokenStore<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn valid_token(&self) -> TokenFuture<'_> {
		Box::pin(self.get_valid_token())
	}
}
impl<C, M> Debug for TokenStore<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenStore")
			.field("state", &*self.state.read())
			.field("skew", &self.skew)
			.field("metrics", &self.metrics)
			.finish()
	}
}
