//! Access/refresh token secrets, grant payloads, and cached token state.

pub mod grant;
pub mod secret;
pub mod state;
