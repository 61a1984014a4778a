// self
use crate::_prelude::*;

/// OAuth 2.0 grant types exchanged by the connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// One-time Authorization Code exchange that yields the refresh token.
	AuthorizationCode,
	/// Steady-state Refresh Token grant.
	RefreshToken,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
