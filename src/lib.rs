//! Templated outbound web requests for data-integration hosts.
//!
//! The crate keeps an OAuth 2.0 access token fresh through refresh-token rotation, derives write
//! schemas from placeholder templates, and dispatches records concurrently with one
//! acknowledgement per record.

#![deny(clippy::all)]
#![warn(missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod schema;
pub mod session;
pub mod store;
pub mod template;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::ProviderId,
		config::ConnectorSettings,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{DefaultProviderStrategy, ProviderDescriptor, ProviderStrategy},
		session::Connector,
	};

	/// Connector type alias used by reqwest-backed integration tests.
	pub type ReqwestTestConnector = Connector<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.timeout(std::time::Duration::from_secs(10))
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a descriptor whose endpoints all live on the provided mock server base URL.
	pub fn test_descriptor(base: &str) -> ProviderDescriptor {
		let join = |path: &str| {
			Url::parse(&format!("{}{path}", base.trim_end_matches('/')))
				.expect("Mock endpoint URL should parse successfully.")
		};

		ProviderDescriptor::builder(
			ProviderId::new("mock-provider").expect("Mock provider identifier should be valid."),
		)
		.authorization_endpoint(join("/authorize"))
		.token_endpoint(join("/token"))
		.health_check_endpoint(join("/health"))
		.build()
		.expect("Mock provider descriptor should build successfully.")
	}

	/// Constructs a [`Connector`] backed by the default provider strategy and the insecure
	/// reqwest transport used across integration tests.
	pub fn build_reqwest_test_connector(
		descriptor: ProviderDescriptor,
		settings: ConnectorSettings,
	) -> ReqwestTestConnector {
		let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy);

		Connector::with_http_client(
			descriptor,
			strategy,
			settings,
			test_reqwest_http_client(),
			ReqwestTransportErrorMapper,
		)
		.expect("Test connector should build.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
