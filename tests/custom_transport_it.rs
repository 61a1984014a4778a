// std
use std::sync::atomic::{AtomicUsize, Ordering};
// crates.io
use futures::stream;
use tokio_util::sync::CancellationToken;
// self
use web_request_connector::{
	_preludet::*,
	auth::TokenSecret,
	config::{
		ConfigurationForm, ConnectRequest, ConnectorSettings, DataVersions, OAuthConfig,
		OAuthConfiguration, OAuthState, PrepareWriteRequest,
	},
	dispatch::Record,
	error::TransportError,
	http::{HttpTransport, ResponseMetadata, ResponseMetadataSlot},
	oauth::{
		TransportErrorMapper,
		oauth2::{
			AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
			http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
		},
	},
	provider::{DefaultProviderStrategy, ProviderStrategy},
	session::Connector,
};

#[derive(Debug)]
enum FakeTransportError {
	Throttled,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Throttled => write!(f, "Transport throttled."),
		}
	}
}
impl StdError for FakeTransportError {}

/// Serves canned responses and records every request line it sees.
///
/// Requests under `/items/slow` are held for a while and counted as outstanding meanwhile.
#[derive(Clone, Default)]
struct FakeHttpClient {
	seen: Arc<Mutex<Vec<String>>>,
	outstanding: Arc<AtomicUsize>,
	peak: Arc<AtomicUsize>,
}
impl HttpTransport for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, client: self.clone() }
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	client: FakeHttpClient,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let client = self.client.clone();

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);

			let authorization = request
				.headers()
				.get("authorization")
				.and_then(|v| v.to_str().ok())
				.unwrap_or("-")
				.to_owned();

			client
				.seen
				.lock()
				.push(format!("{} {} {authorization}", request.method(), request.uri().path()));

			if request.uri().path().starts_with("/items/slow") {
				let now = client.outstanding.fetch_add(1, Ordering::SeqCst) + 1;

				client.peak.fetch_max(now, Ordering::SeqCst);
				tokio::time::sleep(std::time::Duration::from_millis(50)).await;
				client.outstanding.fetch_sub(1, Ordering::SeqCst);
			}

			let (status, body) = match request.uri().path() {
				"/token" => (
					200,
					"{\"access_token\":\"fake-access\",\"token_type\":\"bearer\",\"expires_in\":3600}",
				),
				"/health" => (200, "ok"),
				"/items/throttled" => {
					slot.store(ResponseMetadata { status: Some(429), body: None });

					return Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Throttled)));
				},
				_ => (202, "accepted"),
			};

			slot.store(ResponseMetadata { status: Some(status), body: None });

			let mut response = HttpResponse::new(body.as_bytes().to_vec());

			*response.status_mut() =
				StatusCode::from_u16(status).expect("Canned status codes should be valid.");
			response
				.headers_mut()
				.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

			Ok(response)
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	targets: Arc<Mutex<Vec<&'static str>>>,
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		target: &'static str,
		error: HttpClientError<FakeTransportError>,
	) -> TransportError {
		self.targets.lock().push(target);

		match error {
			HttpClientError::Reqwest(inner) => TransportError::network(target, *inner),
			HttpClientError::Io(inner) => TransportError::Io(inner),
			other => TransportError::Other { message: format!("{other}") },
		}
	}
}

fn build_connector(
	http_client: FakeHttpClient,
	mapper: RecordingTransportErrorMapper,
	max_in_flight: usize,
) -> Connector<FakeHttpClient, RecordingTransportErrorMapper> {
	let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy);

	Connector::with_http_client(
		test_descriptor("https://fake.example.com"),
		strategy,
		ConnectorSettings { max_in_flight: Some(max_in_flight), ..Default::default() },
		http_client,
		mapper,
	)
	.expect("Connector over the fake transport should build.")
}

async fn prepare_delete_write(connector: &Connector<FakeHttpClient, RecordingTransportErrorMapper>) {
	let response = connector.connect(&connect_request()).await;

	assert!(response.is_success(), "{response:?}");

	let configured = connector.configure_write(&ConfigurationForm {
		data_json: r#"{"Name":"Touch","Method":"DELETE","Url":"https://fake.example.com/items/{1}","Body":"ignored"}"#
			.into(),
		state_json: String::new(),
	});
	let schema = configured.schema.expect("Template should derive a schema.");

	connector
		.prepare_write(&PrepareWriteRequest {
			schema,
			commit_sla_seconds: 0,
			replication: None,
			data_versions: DataVersions::default(),
		})
		.expect("Write should prepare.");
}

fn connect_request() -> ConnectRequest {
	let state = OAuthState {
		auth_token: TokenSecret::default(),
		refresh_token: TokenSecret::new("fake-refresh"),
		config: serde_json::to_string(&OAuthConfig { redirect_uri: "https://app.example.com/cb".into() })
			.expect("OAuth config should serialize."),
	};

	ConnectRequest {
		oauth_configuration: OAuthConfiguration {
			client_id: "fake-client".into(),
			client_secret: TokenSecret::new("fake-secret"),
		},
		oauth_state_json: serde_json::to_string(&state).expect("OAuth state should serialize."),
	}
}

#[tokio::test]
async fn custom_transport_carries_the_whole_session() {
	let http_client = FakeHttpClient::default();
	let mapper = RecordingTransportErrorMapper::default();
	let connector = build_connector(http_client.clone(), mapper.clone(), 1);

	prepare_delete_write(&connector).await;

	let records = [
		Record::new("ok", r#"{"URL_{1}":"7"}"#),
		Record::new("throttled", r#"{"URL_{1}":"throttled"}"#),
	];
	let (tx, mut rx) = connector.ack_channel();
	let summary = connector
		.write_stream(stream::iter(records.map(Ok::<_, String>)), tx, CancellationToken::new())
		.await
		.expect("Write stream should finish.");

	assert_eq!(summary.acknowledged, 2);
	assert_eq!(summary.failed, 1);

	let mut acks = Vec::new();

	while let Some(ack) = rx.recv().await {
		acks.push(ack);
	}

	assert_eq!(acks[0].correlation_id, "ok");
	assert!(acks[0].error.is_empty());
	assert_eq!(acks[1].correlation_id, "throttled");
	assert!(acks[1].error.contains("Transport throttled."));
	assert_eq!(*mapper.targets.lock(), vec!["remote API"]);
	assert_eq!(
		*http_client.seen.lock(),
		vec![
			"POST /token -".to_owned(),
			"GET /health Bearer fake-access".to_owned(),
			"DELETE /items/7 Bearer fake-access".to_owned(),
			"DELETE /items/throttled Bearer fake-access".to_owned(),
		]
	);
}

#[tokio::test]
async fn max_in_flight_caps_outstanding_requests() {
	let http_client = FakeHttpClient::default();
	let connector = build_connector(http_client.clone(), RecordingTransportErrorMapper::default(), 2);

	prepare_delete_write(&connector).await;

	let records = (0..6)
		.map(|i| Ok::<_, String>(Record::new(format!("r{i}"), r#"{"URL_{1}":"slow"}"#)))
		.collect::<Vec<_>>();
	let (tx, mut rx) = connector.ack_channel();
	let summary = connector
		.write_stream(stream::iter(records), tx, CancellationToken::new())
		.await
		.expect("Write stream should finish.");

	assert_eq!(summary.acknowledged, 6);
	assert_eq!(summary.failed, 0);
	assert_eq!(http_client.peak.load(Ordering::SeqCst), 2);
	assert_eq!(http_client.outstanding.load(Ordering::SeqCst), 0);

	let mut count = 0;

	while rx.recv().await.is_some() {
		count += 1;
	}

	assert_eq!(count, 6);
}
