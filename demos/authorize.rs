//! Demonstrates the authorization-code dance against a mock provider: build
//! the user-facing URL, exchange a code for tokens, persist the snapshot, and
//! restore it into a fresh client.

// std
use std::env;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use logiless::{
	auth::AuthMode,
	client::{ApiEndpoints, LogilessClient},
	store::TokenFileStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/token").query_param("grant_type", "authorization_code");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"refresh_token\":\"demo-refresh\",\"token_type\":\"bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let endpoints = ApiEndpoints::default()
		.with_api_base(Url::parse(&server.url("/api"))?)
		.with_authorization(Url::parse(&server.url("/authorize"))?)
		.with_token(Url::parse(&server.url("/token"))?);
	let client = LogilessClient::with_endpoints(
		AuthMode::authorization_code(
			"demo-client-id",
			"demo-client-secret",
			Url::parse("https://example.com/callback")?,
		),
		endpoints,
	);

	println!("Visit to authorize: {}.", client.authorization_url()?);

	client.exchange_code("code-from-redirect").await?;

	token_mock.assert_async().await;

	let snapshot_path = env::temp_dir().join("logiless_demo_tokens.json");
	let store = TokenFileStore::open(&snapshot_path)?;

	store.save(&client.auth().token_state())?;

	println!("Tokens persisted to {}.", store.path().display());

	let restored = store.load()?.expect("Snapshot was just saved.");

	client.auth().restore(restored);

	println!("Token still active: {}.", !client.auth().is_expired());

	Ok(())
}
