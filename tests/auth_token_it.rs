#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use logiless::{
	_preludet::*,
	auth::TokenSecret,
	error::AuthError,
};

#[tokio::test]
async fn exchange_code_uses_get_with_query_parameters() {
	let server = MockServer::start_async().await;
	let client = build_code_flow_client(&server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/token")
				.query_param("client_id", "test-client-id")
				.query_param("client_secret", "test-client-secret")
				.query_param("code", "auth-code-1")
				.query_param("grant_type", "authorization_code")
				.query_param("redirect_uri", "https://example.com/callback");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-1\",\"refresh_token\":\"refresh-1\",\"token_type\":\"bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let state = client
		.exchange_code("auth-code-1")
		.await
		.expect("Code exchange should succeed against the mock provider.");

	mock.assert_async().await;

	assert_eq!(state.access_token.as_ref().map(TokenSecret::expose), Some("access-1"));
	assert_eq!(state.refresh_token.as_ref().map(TokenSecret::expose), Some("refresh-1"));
	assert!(!client.auth().is_expired());
}

#[tokio::test]
async fn exchange_code_rejection_carries_provider_fields() {
	let server = MockServer::start_async().await;
	let client = build_code_flow_client(&server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/token");
			then.status(400).header("content-type", "application/json").body(
				"{\"error\":\"invalid_request\",\"error_description\":\"Missing required parameter\"}",
			);
		})
		.await;
	let error = client
		.exchange_code("bad-code")
		.await
		.expect_err("Provider rejection should surface to the caller.");

	mock.assert_async().await;

	match error {
		Error::Auth(AuthError::Rejected { grant, reason, status }) => {
			assert_eq!(grant, "authorization_code");
			assert_eq!(status, 400);
			assert!(reason.contains("invalid_request"));
			assert!(reason.contains("Missing required parameter"));
		},
		other => panic!("Expected a rejected grant, got {other:?}."),
	}
}

#[tokio::test]
async fn exchange_code_rejection_falls_back_to_raw_body() {
	let server = MockServer::start_async().await;
	let client = build_code_flow_client(&server.base_url());
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/token");
			then.status(502).header("content-type", "text/html").body("<html>bad gateway</html>");
		})
		.await;
	let error = client
		.exchange_code("any-code")
		.await
		.expect_err("Unparseable rejection should surface to the caller.");

	match error {
		Error::Auth(AuthError::Rejected { reason, status, .. }) => {
			assert_eq!(status, 502);
			assert!(reason.contains("bad gateway"));
		},
		other => panic!("Expected a rejected grant, got {other:?}."),
	}
}

#[tokio::test]
async fn malformed_grant_json_is_a_parse_error() {
	let server = MockServer::start_async().await;
	let client = build_code_flow_client(&server.base_url());
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":42}");
		})
		.await;
	let error = client
		.exchange_code("any-code")
		.await
		.expect_err("Malformed grant JSON should surface to the caller.");

	assert!(matches!(error, Error::Auth(AuthError::ResponseParse { .. })));
}

#[tokio::test]
async fn refresh_rotates_tokens_when_the_provider_issues_new_ones() {
	let server = MockServer::start_async().await;
	let client = build_code_flow_client(&server.base_url());

	client.set_token("stale-access", Some("rotating-refresh".into()), Duration::seconds(0));

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/token")
				.query_param("grant_type", "refresh_token")
				.query_param("refresh_token", "rotating-refresh")
				.query_param("client_id", "test-client-id")
				.query_param("client_secret", "test-client-secret");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-new\",\"refresh_token\":\"refresh-new\",\"token_type\":\"bearer\",\"expires_in\":1800}",
			);
		})
		.await;
	let state =
		client.auth().refresh().await.expect("Refresh should succeed against the mock provider.");

	mock.assert_async().await;

	assert_eq!(state.access_token.as_ref().map(TokenSecret::expose), Some("access-new"));
	assert_eq!(state.refresh_token.as_ref().map(TokenSecret::expose), Some("refresh-new"));
}

#[tokio::test]
async fn refresh_keeps_the_previous_refresh_token_when_omitted() {
	let server = MockServer::start_async().await;
	let client = build_code_flow_client(&server.base_url());

	client.set_token("stale-access", Some("keeper-refresh".into()), Duration::seconds(0));

	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/token").query_param("grant_type", "refresh_token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-new\",\"token_type\":\"bearer\",\"expires_in\":1800}",
			);
		})
		.await;
	let state =
		client.auth().refresh().await.expect("Refresh should succeed against the mock provider.");

	assert_eq!(state.refresh_token.as_ref().map(TokenSecret::expose), Some("keeper-refresh"));
}

#[tokio::test]
async fn refresh_without_a_refresh_token_fails_before_the_wire() {
	let server = MockServer::start_async().await;
	let client = build_code_flow_client(&server.base_url());

	client.set_token("access-only", None, Duration::seconds(3_600));

	let error =
		client.auth().refresh().await.expect_err("Refresh without a refresh token must fail.");

	assert!(matches!(error, Error::Auth(AuthError::MissingRefreshToken)));
}

#[tokio::test]
async fn direct_token_mode_cannot_refresh() {
	let server = MockServer::start_async().await;
	let client = build_direct_client(&server.base_url(), "m1700");

	client.set_token("direct-access", Some("unusable-refresh".into()), Duration::seconds(0));

	let error = client
		.auth()
		.ensure_active()
		.await
		.expect_err("Direct-token credentials cannot perform the refresh grant.");

	assert!(matches!(
		error,
		Error::Auth(AuthError::UnsupportedGrant { mode: "direct_token", grant: "refresh_token" }),
	));
}

#[tokio::test]
async fn concurrent_ensure_active_refreshes_once() {
	let server = MockServer::start_async().await;
	let client = build_code_flow_client(&server.base_url());

	client.set_token("stale-access", Some("singleflight-refresh".into()), Duration::seconds(0));

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/token").query_param("grant_type", "refresh_token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-singleflight\",\"refresh_token\":\"refresh-singleflight\",\"token_type\":\"bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let (first, second) =
		tokio::join!(client.auth().ensure_active(), client.auth().ensure_active());

	first.expect("First ensure_active call should succeed.");
	second.expect("Second ensure_active call should succeed.");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn ensure_active_with_a_valid_token_stays_offline() {
	let server = MockServer::start_async().await;
	let client = build_code_flow_client(&server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/token");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;

	client.set_token("fresh-access", Some("refresh".into()), Duration::seconds(3_600));
	client.auth().ensure_active().await.expect("A fresh token should be active.");

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn authorization_url_is_deterministic() {
	let server = MockServer::start_async().await;
	let client = build_code_flow_client(&server.base_url());
	let url = client.authorization_url().expect("Code-flow mode should build the URL.");

	assert_eq!(
		url.as_str(),
		format!(
			"{}/authorize?client_id=test-client-id&response_type=code&redirect_uri=https%3A%2F%2Fexample.com%2Fcallback",
			server.base_url(),
		),
	);
}
