// crates.io
use tracing::{Span, instrument::Instrumented};
// self
use crate::{
	_prelude::*,
	obs::{self, FlowKind, FlowOutcome},
};

/// Span wrapping one connector flow.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	kind: FlowKind,
	span: Span,
}
impl FlowSpan {
	/// Creates a span tagged with the flow kind and call site.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		let span = tracing::info_span!("web_request_connector.flow", flow = kind.as_str(), stage);

		Self { kind, span }
	}

	/// Runs `fut` inside the span without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		use tracing::Instrument;

		fut.instrument(self.span.clone())
	}

	/// Runs `fut` inside the span and records attempt plus success or failure.
	pub async fn observe<Fut, T, E>(self, fut: Fut) -> std::result::Result<T, E>
	where
		Fut: Future<Output = std::result::Result<T, E>>,
	{
		obs::record_flow_outcome(self.kind, FlowOutcome::Attempt);

		let result = FlowSpan::instrument(&self, fut).await;

		obs::record_flow_outcome(self.kind, FlowOutcome::of(&result));

		result
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn observe_passes_results_through() {
		let ok = FlowSpan::new(FlowKind::Refresh, "observe_ok").observe(async { Ok::<_, ()>(42) }).await;
		let err =
			FlowSpan::new(FlowKind::Dispatch, "observe_err").observe(async { Err::<(), _>("boom") }).await;

		assert_eq!(ok, Ok(42));
		assert_eq!(err, Err("boom"));
	}
}
