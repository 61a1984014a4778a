//! Builds a connector for a provider and prints the authorize URL a user should open to grant
//! offline access.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use web_request_connector::{
	auth::{ProviderId, TokenSecret},
	config::{ConnectorSettings, OAuthConfiguration},
	provider::{DefaultProviderStrategy, ProviderDescriptor},
	session::ReqwestConnector,
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let descriptor = ProviderDescriptor::builder(ProviderId::new("demo-provider")?)
		.authorization_endpoint(Url::parse("https://provider.example.com/authorize")?)
		.token_endpoint(Url::parse("https://provider.example.com/token")?)
		.health_check_endpoint(Url::parse("https://api.example.com/v1/me")?)
		.build()?;
	let connector =
		ReqwestConnector::new(descriptor, Arc::new(DefaultProviderStrategy), ConnectorSettings::default())?;
	let configuration = OAuthConfiguration {
		client_id: "demo-client".into(),
		client_secret: TokenSecret::new("demo-secret"),
	};
	let authorize_url =
		connector.begin_oauth_flow(&configuration, "https://app.example.com/oauth/callback")?;

	println!("Send your user to {authorize_url}.");
	println!(
		"Pass the callback URL, including its `code` parameter, to Connector::complete_oauth_flow."
	);

	Ok(())
}
