//! HTTP transport shared by token exchanges, outbound record requests, and the connection test.
//!
//! [`HttpTransport`] hands out [`AsyncHttpClient`] handles bound to a [`ResponseMetadataSlot`].
//! The `oauth2` facade drives the handle for token calls; the API client calls it directly for
//! templated requests. Handles record the status (and, for non-success responses, the body
//! text) in the slot so token failures can be reported with the provider's own message.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
// self
use crate::{_prelude::*, error::ConfigError};

/// Transport the connector sends every HTTP request through.
///
/// Implementations are shared behind `Arc` by all sessions and records, so they must be
/// `Send + Sync + 'static`, and the futures their handles return must be `Send`.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying client.
	type TransportError: 'static + Send + Sync + StdError;

	/// Request handle tied to one [`ResponseMetadataSlot`].
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle that records response metadata in `slot`.
	///
	/// Handles must clear the slot before sending and store metadata as soon as a status is
	/// known, including for error statuses.
	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle;
}

/// Metadata captured from the most recent response.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code, if a response arrived.
	pub status: Option<u16>,
	/// Body text of a non-success response.
	pub body: Option<String>,
}

/// Slot shared between a transport handle and the code that interprets its failures.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns and clears the captured metadata.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// reqwest-backed [`HttpTransport`].
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest client.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests give up after `timeout`.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().timeout(timeout).build()?;

		Ok(Self(client))
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl HttpTransport for ReqwestHttpClient {
	type Handle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		InstrumentedHandle(Arc::new(Instrumented { client: self.0.clone(), slot }))
	}
}

struct Instrumented {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}

/// Handle returned by [`ReqwestHttpClient`].
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<Instrumented>);
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let inner = Arc::clone(&self.0);

		Box::pin(async move {
			inner.slot.take();

			let response = inner
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			inner.slot.store(ResponseMetadata { status: Some(status.as_u16()), body: None });

			let bytes = response.bytes().await.map_err(Box::new)?.to_vec();

			if !status.is_success() {
				inner.slot.store(ResponseMetadata {
					status: Some(status.as_u16()),
					body: Some(String::from_utf8_lossy(&bytes).into_owned()),
				});
			}

			let mut converted = HttpResponse::new(bytes);

			*converted.status_mut() = status;
			*converted.headers_mut() = headers;

			Ok(converted)
		})
	}
}
