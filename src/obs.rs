//! Spans and counters for connector flows.
//!
//! Every flow runs inside a `web_request_connector.flow` span carrying `flow` and `stage`
//! fields. With the `metrics` feature enabled, each attempt, success, and failure also
//! increments `web_request_connector_flow_total{flow,outcome}`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flows observed by the connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// One-time authorization-code exchange.
	AuthorizationCode,
	/// Refresh-token grant.
	Refresh,
	/// Templated request for one record.
	Dispatch,
	/// Connection test performed while connecting.
	HealthCheck,
}
impl FlowKind {
	/// Returns a stable label for span and metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::AuthorizationCode => "authorization_code",
			FlowKind::Refresh => "refresh",
			FlowKind::Dispatch => "dispatch",
			FlowKind::HealthCheck => "health_check",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded per flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Flow started.
	Attempt,
	/// Flow completed.
	Success,
	/// Flow failed.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label for span and metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}

	/// Maps a result onto [`FlowOutcome::Success`] or [`FlowOutcome::Failure`].
	pub fn of<T, E>(result: &std::result::Result<T, E>) -> Self {
		if result.is_ok() { Self::Success } else { Self::Failure }
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
