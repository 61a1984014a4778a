//! Provider-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering the HTTPS
//! authorization and token endpoints, the health-check URL probed while connecting, the
//! scope requested during the handshake, and the client authentication preference.
//! `strategy` defines [`ProviderStrategy`], an HTTP-client-agnostic hook used by flows to
//! augment outgoing token requests and classify token endpoint failures.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
