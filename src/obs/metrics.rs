// self
use crate::obs::{FlowKind, FlowOutcome};

/// Increments the flow counter when the `metrics` feature is enabled.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"web_request_connector_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recording_is_safe_without_a_recorder() {
		record_flow_outcome(FlowKind::Dispatch, FlowOutcome::Failure);
		record_flow_outcome(FlowKind::HealthCheck, FlowOutcome::of::<(), ()>(&Ok(())));
	}
}
