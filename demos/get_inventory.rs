//! Demonstrates direct-token credentials: inject a pre-issued token scoped to
//! a merchant and list inventory summaries with pass-through query filters.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use logiless::{
	auth::AuthMode,
	client::{ApiEndpoints, LogilessClient},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let inventory_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/actual_inventory_summary")
				.query_param("limit", "10")
				.header("x-merchant-id", "m1700");
			then.status(200).header("content-type", "application/json").body(
				"{\"items\":[{\"article_code\":\"A-1\",\"quantity\":42}],\"total_count\":1}",
			);
		})
		.await;
	let endpoints = ApiEndpoints::default()
		.with_api_base(Url::parse(&server.url("/api"))?)
		.with_authorization(Url::parse(&server.url("/authorize"))?)
		.with_token(Url::parse(&server.url("/token"))?);
	let client =
		LogilessClient::with_endpoints(AuthMode::direct_token("m1700")?, endpoints);

	client.restore_token("demo-access-token", None);

	let inventory = client.actual_inventory_summary().list(&[("limit", "10")]).await?;

	inventory_mock.assert_async().await;

	println!(
		"Fetched {} inventory rows.",
		inventory.get("total_count").and_then(|count| count.as_u64()).unwrap_or(0),
	);
	println!("First row: {}.", inventory["items"][0]);

	Ok(())
}
