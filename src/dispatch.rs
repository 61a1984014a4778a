//! Per-record dispatch: render the template, send the request, classify the outcome.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	client::ApiClient,
	error::DispatchError,
	http::HttpTransport,
	oauth::TransportErrorMapper,
	obs::{FlowKind, FlowSpan},
	template::RequestTemplate,
};

/// Record delivered by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
	/// Host-supplied identifier echoed on the acknowledgement.
	pub correlation_id: String,
	/// Field values as a JSON object keyed by schema property id.
	pub data_json: String,
}
impl Record {
	/// Creates a record from a correlation id and its JSON data.
	pub fn new(correlation_id: impl Into<String>, data_json: impl Into<String>) -> Self {
		Self { correlation_id: correlation_id.into(), data_json: data_json.into() }
	}

	/// Parses the record's data into a field map.
	pub fn fields(&self) -> Result<Map<String, Value>, DispatchError> {
		serde_json::from_str(&self.data_json).map_err(|source| DispatchError::MalformedRecord { source })
	}
}

/// Result of dispatching one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchOutcome {
	/// Correlation id of the originating record.
	pub correlation_id: String,
	/// HTTP status, when a response arrived.
	pub status: Option<u16>,
	/// Failure description; `None` on success.
	pub error: Option<String>,
}
impl DispatchOutcome {
	/// Successful outcome.
	pub fn success(correlation_id: impl Into<String>, status: u16) -> Self {
		Self { correlation_id: correlation_id.into(), status: Some(status), error: None }
	}

	/// Failed outcome built from a dispatch error.
	pub fn failure(correlation_id: impl Into<String>, error: &DispatchError) -> Self {
		Self { correlation_id: correlation_id.into(), status: error.status(), error: Some(error.to_string()) }
	}

	/// Whether the record was delivered.
	pub fn is_success(&self) -> bool {
		self.error.is_none()
	}
}

/// Acknowledgement returned to the host for one record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordAck {
	/// Correlation id of the originating record.
	pub correlation_id: String,
	/// Failure description; empty on success.
	pub error: String,
}
impl From<DispatchOutcome> for RecordAck {
	fn from(outcome: DispatchOutcome) -> Self {
		Self { correlation_id: outcome.correlation_id, error: outcome.error.unwrap_or_default() }
	}
}

/// Sends one request per record using a fixed template.
pub struct RequestDispatcher<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client: Arc<ApiClient<C, M>>,
	template: Arc<RequestTemplate>,
}
impl<C, M> RequestDispatcher<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a dispatcher for the given client and template.
	pub fn new(client: Arc<ApiClient<C, M>>, template: Arc<RequestTemplate>) -> Self {
		Self { client, template }
	}

	/// Template used for every record.
	pub fn template(&self) -> &RequestTemplate {
		&self.template
	}

	/// Dispatches one record. Failures never escape; they are logged and reported on the
	/// outcome.
	pub async fn dispatch(&self, record: &Record) -> DispatchOutcome {
		tracing::debug!(correlation_id = %record.correlation_id, data = %record.data_json, "dispatching record");

		let result = FlowSpan::new(FlowKind::Dispatch, "dispatch").observe(self.try_dispatch(record)).await;

		match result {
			Ok(status) => DispatchOutcome::success(&record.correlation_id, status),
			Err(e) => {
				tracing::error!(correlation_id = %record.correlation_id, error = %e, "record dispatch failed");

				DispatchOutcome::failure(&record.correlation_id, &e)
			},
		}
	}

	async fn try_dispatch(&self, record: &Record) -> Result<u16, DispatchError> {
		let fields = record.fields()?;
		let rendered = self.template.render(&fields)?;
		let response = self.client.send(&rendered).await?;

		if response.is_success() {
			Ok(response.status)
		} else {
			Err(DispatchError::Status { status: response.status, body: response.body })
		}
	}
}
impl<C, M> Clone for RequestDispatcher<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self { client: Arc::clone(&self.client), template: Arc::clone(&self.template) }
	}
}
impl<C, M> Debug for RequestDispatcher<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestDispatcher").field("template", &self.template.name).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn malformed_record_data_is_rejected() {
		let err = Record::new("r1", "{not json").fields().expect_err("Malformed JSON must fail.");

		assert!(matches!(err, DispatchError::MalformedRecord { .. }));
		assert!(Record::new("r2", "[1, 2]").fields().is_err());
	}

	#[test]
	fn acks_carry_empty_errors_on_success() {
		let ok: RecordAck = DispatchOutcome::success("r1", 201).into();
		let failed: RecordAck =
			DispatchOutcome::failure("r2", &DispatchError::Status { status: 404, body: "gone".into() })
				.into();

		assert_eq!(ok, RecordAck { correlation_id: "r1".into(), error: String::new() });
		assert_eq!(failed.correlation_id, "r2");
		assert!(failed.error.contains("404"));
		assert!(failed.error.contains("gone"));
	}
}
