//! Host-facing coordinator for one connector instance.
//!
//! [`Connector`] owns the session state machine `Idle → Connected → Configured`, runs the OAuth
//! handshake, connects (validating credentials and testing the connection), configures and
//! prepares writes, and drives the write stream. The write stream dispatches records
//! concurrently on a [`JoinSet`] and emits exactly one [`RecordAck`] per received record,
//! unless the stream is cancelled.

// std
use std::{panic::AssertUnwindSafe, pin::pin};
// crates.io
use futures::{FutureExt, Stream, StreamExt};
use tokio::{sync::mpsc, task::JoinSet};
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
	client::ApiClient,
	config::{
		ConfigurationForm, ConfigurationFormResponse, ConfigureWriteResponse, ConnectRequest,
		ConnectResponse, ConnectorSettings, OAuthConfig, OAuthConfiguration, OAuthState,
		PrepareWriteRequest,
	},
	dispatch::{DispatchOutcome, Record, RecordAck, RequestDispatcher},
	error::{ConfigError, DispatchError},
	flows::OAuthClient,
	http::{HttpTransport, ReqwestHttpClient},
	oauth::{ReqwestTransportErrorMapper, TransportErrorMapper},
	provider::{ProviderDescriptor, ProviderStrategy},
	schema::{self, SchemaDeriver},
	store::{TokenProvider, TokenStore},
	template::RequestTemplate,
};

/// [`Connector`] specialized for the reqwest transport.
pub type ReqwestConnector = Connector<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Why a write stream stopped pulling records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StopReason {
	/// The input ended (or failed) and all in-flight records were acknowledged.
	#[default]
	InputExhausted,
	/// The session was disconnected or reconfigured, or the acknowledgement receiver went away.
	SessionClosed,
	/// The caller cancelled the stream; in-flight records were abandoned.
	Cancelled,
}

/// Counters reported when a write stream ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteSummary {
	/// Records pulled from the input.
	pub received: u64,
	/// Acknowledgements delivered.
	pub acknowledged: u64,
	/// Acknowledgements that carried an error.
	pub failed: u64,
	/// Why the stream stopped.
	pub stop: StopReason,
}

/// Write prepared for the current session.
#[derive(Clone, Debug, PartialEq)]
pub struct WriteSettings {
	/// Host job identifier.
	pub job_id: String,
	/// Commit SLA requested by the host.
	pub commit_sla_seconds: u32,
	/// Schema the write was prepared with.
	pub schema: schema::WriteSchema,
}

struct Connection<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	api: Arc<ApiClient<C, M>>,
	tokens: Arc<TokenStore<C, M>>,
}
impl<C, M> Clone for Connection<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self { api: Arc::clone(&self.api), tokens: Arc::clone(&self.tokens) }
	}
}

struct PreparedWrite<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	dispatcher: RequestDispatcher<C, M>,
	settings: WriteSettings,
}

enum SessionState<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	Idle,
	Connected(Connection<C, M>),
	Configured(Connection<C, M>, Arc<PreparedWrite<C, M>>),
}
impl<C, M> SessionState<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn connection(&self) -> Option<&Connection<C, M>> {
		match self {
			SessionState::Idle => None,
			SessionState::Connected(connection) | SessionState::Configured(connection, _) =>
				Some(connection),
		}
	}

	fn label(&self) -> &'static str {
		match self {
			SessionState::Idle => "idle",
			SessionState::Connected(_) => "connected",
			SessionState::Configured(..) => "configured",
		}
	}
}

enum ConnectFailure {
	OAuth(Error),
	Settings(Error),
	Connection(Error),
}

/// Coordinates OAuth, configuration, and writes for one host connection.
pub struct Connector<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	descriptor: ProviderDescriptor,
	strategy: Arc<dyn ProviderStrategy>,
	settings: ConnectorSettings,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	state: RwLock<SessionState<C, M>>,
	session_release: Mutex<Option<CancellationToken>>,
}
impl ReqwestConnector {
	/// Creates a connector backed by a reqwest client using the configured timeout.
	pub fn new(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		settings: ConnectorSettings,
	) -> Result<Self, ConfigError> {
		let http_client = ReqwestHttpClient::with_timeout(settings.request_timeout())?;

		Self::with_http_client(descriptor, strategy, settings, http_client, ReqwestTransportErrorMapper)
	}
}
impl<C, M> Connector<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a connector that sends every request through the given transport.
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		settings: ConnectorSettings,
		http_client: impl Into<Arc<C>>,
		transport_mapper: impl Into<Arc<M>>,
	) -> Result<Self, ConfigError> {
		settings.validate()?;

		Ok(Self {
			descriptor,
			strategy,
			settings,
			http_client: http_client.into(),
			transport_mapper: transport_mapper.into(),
			state: RwLock::new(SessionState::Idle),
			session_release: Mutex::new(None),
		})
	}

	/// Settings this connector was built with.
	pub fn settings(&self) -> &ConnectorSettings {
		&self.settings
	}

	/// Whether a connection is established.
	pub fn is_connected(&self) -> bool {
		self.state.read().connection().is_some()
	}

	/// Whether a write is prepared and records may be written.
	pub fn is_write_configured(&self) -> bool {
		matches!(*self.state.read(), SessionState::Configured(..))
	}

	/// Write prepared for the current session, if any.
	pub fn write_settings(&self) -> Option<WriteSettings> {
		match &*self.state.read() {
			SessionState::Configured(_, prepared) => Some(prepared.settings.clone()),
			_ => None,
		}
	}

	/// Refresh token of the current connection, including provider rotations.
	pub fn refresh_token(&self) -> Option<TokenSecret> {
		self.state.read().connection().map(|c| c.tokens.refresh_token())
	}

	/// Creates a channel sized by `ack_buffer` for [`Connector::write_stream`].
	pub fn ack_channel(&self) -> (mpsc::Sender<RecordAck>, mpsc::Receiver<RecordAck>) {
		mpsc::channel(self.settings.ack_buffer)
	}

	/// Builds the browser-facing authorization URL.
	pub fn begin_oauth_flow(
		&self,
		configuration: &OAuthConfiguration,
		redirect_url: &str,
	) -> Result<Url> {
		let redirect_uri =
			Url::parse(redirect_url).map_err(|source| ConfigError::InvalidRedirect { source })?;
		let request = self.oauth_client(configuration)?.start_authorization(redirect_uri);

		tracing::info!(authorize_url = %request.authorize_url, "created authorization URL");

		Ok(request.authorize_url)
	}

	/// Exchanges the code carried by `redirect_url` and returns the OAuth state JSON the host
	/// persists.
	pub async fn complete_oauth_flow(
		&self,
		configuration: &OAuthConfiguration,
		redirect_url: &str,
	) -> Result<String> {
		let mut redirect_uri =
			Url::parse(redirect_url).map_err(|source| ConfigError::InvalidRedirect { source })?;
		let code = redirect_uri
			.query_pairs()
			.find(|(key, _)| key == "code")
			.map(|(_, value)| value.into_owned())
			.filter(|code| !code.trim().is_empty())
			.ok_or(ConfigError::MissingAuthorizationCode)?;

		redirect_uri.set_query(None);
		redirect_uri.set_fragment(None);

		let grant = self.oauth_client(configuration)?.exchange_code(&code, &redirect_uri).await?;
		let config = serde_json::to_string(&OAuthConfig { redirect_uri: redirect_uri.to_string() })
			.map_err(ConfigError::serialize("OAuth config"))?;
		let state = OAuthState {
			auth_token: grant.access_token,
			refresh_token: grant.refresh_token.unwrap_or_default(),
			config,
		};

		Ok(serde_json::to_string(&state).map_err(ConfigError::serialize("OAuth state"))?)
	}

	/// Connects: validates the OAuth state and credentials, then tests the connection. Failures
	/// are reported in the response's error slots.
	pub async fn connect(&self, request: &ConnectRequest) -> ConnectResponse {
		let mut response = ConnectResponse {
			oauth_state_json: request.oauth_state_json.clone(),
			..Default::default()
		};

		match self.try_connect(request).await {
			Ok(connection) => {
				*self.state.write() = SessionState::Connected(connection);

				tracing::info!("connected");
			},
			Err(failure) => {
				*self.state.write() = SessionState::Idle;

				let (slot, error) = match failure {
					ConnectFailure::OAuth(e) => (&mut response.oauth_error, e),
					ConnectFailure::Settings(e) => (&mut response.settings_error, e),
					ConnectFailure::Connection(e) => (&mut response.connection_error, e),
				};

				tracing::error!(error = %error, "connect failed");

				*slot = error.to_string();
			},
		}

		response
	}

	/// Connects, publishes the response, then waits until [`Connector::disconnect`] or a newer
	/// session releases this one.
	pub async fn connect_session(
		&self,
		request: &ConnectRequest,
		responses: &mpsc::Sender<ConnectResponse>,
	) -> Result<()> {
		let release = CancellationToken::new();

		if let Some(previous) = self.session_release.lock().replace(release.clone()) {
			previous.cancel();
		}

		let response = self.connect(request).await;

		responses
			.send(response)
			.await
			.map_err(|_| Error::Stream { reason: "session response receiver closed".into() })?;

		tracing::info!("session connected");

		release.cancelled().await;

		Ok(())
	}

	/// Returns the write form, plus the derived schema when `form` holds a valid template.
	pub fn configure_write(&self, form: &ConfigurationForm) -> ConfigureWriteResponse {
		let schema_json = schema::write_form_schema().to_string();
		let ui_json = schema::write_form_ui_schema().to_string();

		if form.data_json.trim().is_empty() || form.data_json == "{}" {
			return ConfigureWriteResponse {
				form: ConfigurationFormResponse { schema_json, ui_json, ..Default::default() },
				schema: None,
			};
		}

		let mut response = ConfigureWriteResponse {
			form: ConfigurationFormResponse {
				data_json: form.data_json.clone(),
				schema_json,
				ui_json,
				state_json: form.state_json.clone(),
				..Default::default()
			},
			schema: None,
		};
		let derived = RequestTemplate::parse(&form.data_json).and_then(|template| {
			let template = template.with_placeholder_mode(self.settings.placeholder_mode);

			SchemaDeriver.derive(&template).map_err(ConfigError::serialize("write schema"))
		});

		match derived {
			Ok(schema) => {
				tracing::info!(schema = %schema.id, properties = schema.properties.len(), "write configured");

				response.schema = Some(schema);
			},
			Err(e) => {
				tracing::error!(error = %e, "write configuration failed");

				response.form.errors.push(e.to_string());
			},
		}

		response
	}

	/// Binds the template stored in the schema to the current connection.
	pub fn prepare_write(&self, request: &PrepareWriteRequest) -> Result<()> {
		let mut state = self.state.write();
		let connection = state.connection().cloned().ok_or(ConfigError::NotConnected)?;

		*state = SessionState::Connected(connection.clone());

		if request.replication.is_some() {
			return Err(ConfigError::ReplicationUnsupported.into());
		}

		let template = RequestTemplate::parse(&request.schema.publisher_meta_json)?
			.with_placeholder_mode(self.settings.placeholder_mode);
		let dispatcher = RequestDispatcher::new(Arc::clone(&connection.api), Arc::new(template));
		let settings = WriteSettings {
			job_id: request.data_versions.job_id.clone(),
			commit_sla_seconds: request.commit_sla_seconds,
			schema: request.schema.clone(),
		};

		tracing::info!(job_id = %settings.job_id, schema = %settings.schema.id, "write prepared");

		*state = SessionState::Configured(connection, Arc::new(PreparedWrite { dispatcher, settings }));

		Ok(())
	}

	/// Dispatches every record from `records`, sending one acknowledgement per record to `acks`.
	///
	/// Records run concurrently, bounded by `max_in_flight`; acknowledgements arrive in
	/// completion order. Pulling stops when the input ends, when `cancel` fires, or when the
	/// session leaves the configured state or rebinds another write. On cancellation in-flight
	/// records are aborted without acknowledgements. A failing input is logged, in-flight records
	/// are drained, and the failure is returned as [`Error::Stream`].
	pub async fn write_stream<S, E>(
		&self,
		records: S,
		acks: mpsc::Sender<RecordAck>,
		cancel: CancellationToken,
	) -> Result<WriteSummary>
	where
		S: Stream<Item = std::result::Result<Record, E>>,
		E: Display,
	{
		let prepared = self.prepared_write()?;
		let limit = self.settings.max_in_flight.unwrap_or(usize::MAX);
		let mut records = pin!(records);
		let mut in_flight = JoinSet::new();
		let mut summary = WriteSummary::default();
		let mut pulling = true;
		let mut stream_error = None;

		tracing::info!(job_id = %prepared.settings.job_id, "sending web requests");

		loop {
			if pulling && !self.is_current_write(&prepared) {
				tracing::info!(state = self.state.read().label(), "write closed or rebound; no longer pulling records");

				pulling = false;
				summary.stop = StopReason::SessionClosed;
			}
			if !pulling && in_flight.is_empty() {
				break;
			}

			tokio::select! {
				biased;
				_ = cancel.cancelled() => {
					in_flight.abort_all();
					summary.stop = StopReason::Cancelled;

					break;
				},
				Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => match joined {
					Ok(outcome) =>
						if !self.acknowledge(&acks, outcome, &mut summary).await {
							in_flight.abort_all();
							summary.stop = StopReason::SessionClosed;

							break;
						},
					Err(e) => tracing::error!(error = %e, "dispatch task ended without an outcome"),
				},
				next = records.next(), if pulling && in_flight.len() < limit => match next {
					None => pulling = false,
					Some(Err(e)) => {
						tracing::error!(error = %e, "record stream failed");

						stream_error = Some(e.to_string());
						pulling = false;
					},
					Some(Ok(record)) => {
						summary.received += 1;

						if self.is_current_write(&prepared) {
							in_flight.spawn(dispatch_task(prepared.dispatcher.clone(), record));
						} else {
							let outcome =
								DispatchOutcome::failure(&record.correlation_id, &DispatchError::SessionClosed);

							pulling = false;
							summary.stop = StopReason::SessionClosed;

							if !self.acknowledge(&acks, outcome, &mut summary).await {
								in_flight.abort_all();

								break;
							}
						}
					},
				},
			}
		}

		tracing::info!(
			received = summary.received,
			acknowledged = summary.acknowledged,
			failed = summary.failed,
			stop = ?summary.stop,
			"write stream finished"
		);

		match stream_error {
			Some(reason) => Err(Error::Stream { reason }),
			None => Ok(summary),
		}
	}

	/// Clears the session and releases any waiting [`Connector::connect_session`] call.
	pub fn disconnect(&self) {
		*self.state.write() = SessionState::Idle;

		if let Some(release) = self.session_release.lock().take() {
			release.cancel();
		}

		tracing::info!("disconnected");
	}

	fn oauth_client(&self, configuration: &OAuthConfiguration) -> Result<OAuthClient<C, M>, ConfigError> {
		OAuthClient::new(
			self.descriptor.clone(),
			Arc::clone(&self.strategy),
			configuration.client_id.clone(),
			&configuration.client_secret,
			Arc::clone(&self.http_client),
			Arc::clone(&self.transport_mapper),
		)
	}

	async fn try_connect(
		&self,
		request: &ConnectRequest,
	) -> std::result::Result<Connection<C, M>, ConnectFailure> {
		let state = parse_json::<OAuthState>("OAuth state", &request.oauth_state_json)
			.map_err(|e| ConnectFailure::OAuth(e.into()))?;
		let config = parse_json::<OAuthConfig>("OAuth config", &state.config)
			.map_err(|e| ConnectFailure::OAuth(e.into()))?;
		let credentials = Credentials {
			client_id: request.oauth_configuration.client_id.clone(),
			client_secret: request.oauth_configuration.client_secret.clone(),
			refresh_token: state.refresh_token,
			redirect_url: config.redirect_uri,
		};

		credentials.validate().map_err(|e| ConnectFailure::Settings(e.into()))?;

		let oauth = self
			.oauth_client(&request.oauth_configuration)
			.map_err(|e| ConnectFailure::Settings(e.into()))?;
		let tokens = Arc::new(
			TokenStore::new(Arc::new(oauth), credentials.refresh_token)
				.with_skew(self.settings.refresh_skew()),
		);
		let provider: Arc<dyn TokenProvider> = tokens.clone();
		let api = Arc::new(
			ApiClient::new(
				Arc::clone(&self.http_client),
				Arc::clone(&self.transport_mapper),
				provider,
				self.descriptor.endpoints.health_check.clone(),
			)
			.with_authorization(self.settings.authorization),
		);

		api.test_connection().await.map_err(|e| match e {
			Error::Auth(_) => ConnectFailure::OAuth(e),
			_ => ConnectFailure::Connection(e),
		})?;

		Ok(Connection { api, tokens })
	}

	fn is_current_write(&self, prepared: &Arc<PreparedWrite<C, M>>) -> bool {
		matches!(
			&*self.state.read(),
			SessionState::Configured(_, current) if Arc::ptr_eq(current, prepared)
		)
	}

	fn prepared_write(&self) -> Result<Arc<PreparedWrite<C, M>>, ConfigError> {
		match &*self.state.read() {
			SessionState::Idle => Err(ConfigError::NotConnected),
			SessionState::Connected(_) => Err(ConfigError::WriteNotPrepared),
			SessionState::Configured(_, prepared) => Ok(Arc::clone(prepared)),
		}
	}

	async fn acknowledge(
		&self,
		acks: &mpsc::Sender<RecordAck>,
		outcome: DispatchOutcome,
		summary: &mut WriteSummary,
	) -> bool {
		let failed = !outcome.is_success();

		if acks.send(outcome.into()).await.is_err() {
			tracing::error!("acknowledgement receiver closed");

			return false;
		}

		summary.acknowledged += 1;

		if failed {
			summary.failed += 1;
		}

		true
	}
}
impl<C, M> Debug for Connector<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Connector")
			.field("descriptor", &self.descriptor)
			.field("settings", &self.settings)
			.field("state", &self.state.read().label())
			.finish()
	}
}

async fn dispatch_task<C, M>(dispatcher: RequestDispatcher<C, M>, record: Record) -> DispatchOutcome
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	match AssertUnwindSafe(dispatcher.dispatch(&record)).catch_unwind().await {
		Ok(outcome) => outcome,
		Err(_) => {
			tracing::error!(correlation_id = %record.correlation_id, "dispatch task panicked");

			DispatchOutcome::failure(&record.correlation_id, &DispatchError::Panicked)
		},
	}
}

fn parse_json<T>(document: &'static str, raw: &str) -> Result<T, ConfigError>
where
	T: for<'de> Deserialize<'de>,
{
	let mut de = serde_json::Deserializer::from_str(raw);

	serde_path_to_error::deserialize(&mut de).map_err(|e| ConfigError::malformed_json(document, e))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::ProviderId,
		provider::DefaultProviderStrategy,
		schema::WriteSchema,
		template::{HttpMethod, RequestTemplate},
	};

	fn connector() -> ReqwestConnector {
		let descriptor =
			ProviderDescriptor::builder(ProviderId::new("unit").expect("Identifier should be valid."))
				.authorization_endpoint(
					Url::parse("https://login.example.com/authorize").expect("URL should parse."),
				)
				.token_endpoint(Url::parse("https://login.example.com/token").expect("URL should parse."))
				.health_check_endpoint(Url::parse("https://api.example.com/").expect("URL should parse."))
				.build()
				.expect("Descriptor should build.");

		Connector::new(descriptor, Arc::new(DefaultProviderStrategy), ConnectorSettings::default())
			.expect("Connector should build.")
	}

	fn schema() -> WriteSchema {
		SchemaDeriver
			.derive(&RequestTemplate::new("t", HttpMethod::Get, "https://api.example.com/{1}", ""))
			.expect("Schema should derive.")
	}

	#[test]
	fn begin_oauth_flow_builds_the_authorize_url() {
		let url = connector()
			.begin_oauth_flow(
				&OAuthConfiguration { client_id: "cid".into(), client_secret: TokenSecret::default() },
				"https://app.example.com/cb",
			)
			.expect("Authorization URL should build.");

		assert!(url.as_str().starts_with("https://login.example.com/authorize?client_id=cid"));
		assert!(url.as_str().contains("scope=offline_access"));
	}

	#[tokio::test]
	async fn complete_oauth_flow_requires_a_code() {
		let err = connector()
			.complete_oauth_flow(&OAuthConfiguration::default(), "https://app.example.com/cb?state=x")
			.await
			.expect_err("Missing code must fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingAuthorizationCode)));
	}

	#[tokio::test]
	async fn connect_reports_state_and_settings_errors_in_their_slots() {
		let connector = connector();
		let response = connector
			.connect(&ConnectRequest { oauth_state_json: "{".into(), ..Default::default() })
			.await;

		assert!(!response.oauth_error.is_empty());
		assert!(response.settings_error.is_empty());
		assert_eq!(response.oauth_state_json, "{");

		let state = r#"{"AuthToken":"","RefreshToken":"r","Config":"{\"RedirectUri\":\"https://app.example.com/cb\"}"}"#;
		let response = connector
			.connect(&ConnectRequest { oauth_state_json: state.into(), ..Default::default() })
			.await;

		assert_eq!(response.settings_error, "The ClientId property must be set.");
		assert!(response.oauth_error.is_empty());
		assert!(!connector.is_connected());
	}

	#[tokio::test]
	async fn write_operations_require_a_session() {
		let connector = connector();
		let err = connector
			.prepare_write(&PrepareWriteRequest {
				schema: schema(),
				commit_sla_seconds: 0,
				replication: None,
				data_versions: Default::default(),
			})
			.expect_err("Prepare without connection must fail.");

		assert!(matches!(err, Error::Config(ConfigError::NotConnected)));

		let (tx, _rx) = connector.ack_channel();
		let err = connector
			.write_stream(futures::stream::empty::<std::result::Result<Record, String>>(), tx, CancellationToken::new())
			.await
			.expect_err("Write without a prepared session must fail.");

		assert!(matches!(err, Error::Config(ConfigError::NotConnected)));
	}

	#[test]
	fn configure_write_returns_the_bare_form_for_empty_data() {
		let connector = connector();
		let response = connector.configure_write(&ConfigurationForm { data_json: "{}".into(), state_json: "s".into() });

		assert!(response.schema.is_none());
		assert!(response.form.data_json.is_empty());
		assert!(response.form.state_json.is_empty());
		assert!(response.form.ui_json.contains("ui:order"));

		let response = connector.configure_write(&ConfigurationForm {
			data_json: r#"{"Name":"x","Method":"FETCH","Url":"https://api.example.com/"}"#.into(),
			state_json: "s".into(),
		});

		assert!(response.schema.is_none());
		assert_eq!(response.form.errors.len(), 1);
		assert_eq!(response.form.state_json, "s");
	}
}
