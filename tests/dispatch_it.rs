#![cfg(feature = "reqwest")]

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use logiless::{
	_preludet::*,
	auth::AuthMode,
	client::{ApiRequest, LogilessClient},
	error::{ApiError, AuthError},
	http::{FilePart, HttpTransport, Method, TransportFuture, TransportRequest},
};

/// Transport that counts invocations so tests can prove the dispatcher
/// short-circuited before the wire.
#[derive(Default)]
struct CountingTransport(AtomicUsize);
impl CountingTransport {
	fn calls(&self) -> usize {
		self.0.load(Ordering::SeqCst)
	}
}
impl HttpTransport for CountingTransport {
	fn execute(&self, _: TransportRequest) -> TransportFuture<'_> {
		self.0.fetch_add(1, Ordering::SeqCst);

		Box::pin(async {
			Ok(logiless::http::TransportResponse {
				status: 200,
				content_type: Some("application/json".into()),
				body: "{}".into(),
			})
		})
	}
}

#[tokio::test]
async fn missing_token_short_circuits_before_any_network_call() {
	let transport = Arc::new(CountingTransport::default());
	let client: LogilessClient<CountingTransport> = LogilessClient::with_transport(
		AuthMode::direct_token("m1700").expect("Merchant fixture should be valid."),
		test_endpoints("http://127.0.0.1:9"),
		transport.clone(),
	);
	let error = client
		.article()
		.list(&[])
		.await
		.expect_err("Dispatch without a token must fail pre-flight.");

	assert!(matches!(error, Error::Auth(AuthError::MissingAccessToken)));
	assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn validation_failure_maps_to_field_details() {
	let server = MockServer::start_async().await;
	let client = build_direct_client(&server.base_url(), "m1700");

	client.restore_token("access", None);

	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/article");
			then.status(400).header("content-type", "application/json").body(
				"{\"message\":\"Validation Failed\",\"errors\":{\"name\":\"required\"}}",
			);
		})
		.await;
	let error = client
		.article()
		.create(json!({"code": "A-1"}))
		.await
		.expect_err("A 400 response must map to a validation error.");
	let Error::Api(api_error) = error else {
		panic!("Expected an API error, got a different kind.");
	};

	assert_eq!(api_error.status(), 400);
	assert_eq!(api_error.message(), "Validation Failed");
	assert_eq!(
		api_error.validation_details().and_then(|details| details.get("name")).map(String::as_str),
		Some("required"),
	);
}

#[tokio::test]
async fn unauthorized_failure_keeps_provider_wording() {
	let server = MockServer::start_async().await;
	let client = build_direct_client(&server.base_url(), "m1700");

	client.restore_token("access", None);

	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/article/123");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_token\",\"error_description\":\"expired\"}");
		})
		.await;
	let error = client
		.article()
		.get("123", &[])
		.await
		.expect_err("A 401 response must map to an auth error.");

	match error {
		Error::Api(ApiError::Unauthorized { ref message, .. }) => {
			assert!(message.contains("invalid_token"));
			assert!(message.contains("expired"));
		},
		other => panic!("Expected an unauthorized error, got {other:?}."),
	}
}

#[tokio::test]
async fn remaining_status_rows_map_to_their_kinds() {
	let server = MockServer::start_async().await;
	let client = build_direct_client(&server.base_url(), "m1700");

	client.restore_token("access", None);

	for (path, status, check) in [
		("locked", 423, (|e| matches!(e, ApiError::ResourceLocked { .. })) as fn(&ApiError) -> bool),
		("limited", 429, |e| matches!(e, ApiError::RateLimited { .. })),
		("broken", 503, |e| matches!(e, ApiError::Server { .. })),
		("teapot", 418, |e| matches!(e, ApiError::Other { .. })),
	] {
		let _mock = server
			.mock_async(|when, then| {
				when.method(GET).path(format!("/api/{path}"));
				then.status(status)
					.header("content-type", "application/json")
					.body("{\"error\":\"some_error\"}");
			})
			.await;
		let error = client
			.resource(path.to_owned())
			.list(&[])
			.await
			.expect_err("Non-2xx statuses must map to API errors.");
		let Error::Api(api_error) = error else {
			panic!("Expected an API error for status {status}.");
		};

		assert!(check(&api_error), "Status {status} mapped to the wrong kind: {api_error:?}.");
		assert_eq!(api_error.status(), status);
	}
}

#[tokio::test]
async fn unparseable_error_bodies_are_synthesized() {
	let server = MockServer::start_async().await;
	let client = build_direct_client(&server.base_url(), "m1700");

	client.restore_token("access", None);

	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/article");
			then.status(500).header("content-type", "text/html").body("<html>boom</html>");
		})
		.await;
	let error = client
		.article()
		.list(&[])
		.await
		.expect_err("A 500 response must map to a server error.");
	let Error::Api(api_error) = error else {
		panic!("Expected an API error, got a different kind.");
	};

	assert!(matches!(api_error, ApiError::Server { .. }));
	assert_eq!(
		api_error.response().get("error").and_then(|value| value.as_str()),
		Some("parse_error"),
	);
	assert_eq!(
		api_error.response().get("error_description").and_then(|value| value.as_str()),
		Some("<html>boom</html>"),
	);
}

#[tokio::test]
async fn plain_text_success_bodies_are_wrapped() {
	let server = MockServer::start_async().await;
	let client = build_direct_client(&server.base_url(), "m1700");

	client.restore_token("access", None);

	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/article");
			then.status(200).header("content-type", "text/plain").body("ok");
		})
		.await;
	let value = client.article().list(&[]).await.expect("Text responses should be wrapped.");

	assert_eq!(value, json!({"text": "ok"}));
}

#[tokio::test]
async fn malformed_json_success_bodies_are_decode_errors() {
	let server = MockServer::start_async().await;
	let client = build_direct_client(&server.base_url(), "m1700");

	client.restore_token("access", None);

	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/article");
			then.status(200).header("content-type", "application/json").body("not json");
		})
		.await;
	let error = client
		.article()
		.list(&[])
		.await
		.expect_err("Malformed success bodies must surface as decode errors.");

	assert!(matches!(error, Error::Decode(_)));
}

#[tokio::test]
async fn dispatch_sends_auth_and_merchant_headers() {
	let server = MockServer::start_async().await;
	let client = build_direct_client(&server.base_url(), "m1700");

	client.restore_token("direct-access", None);

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/article")
				.header("authorization", "Bearer direct-access")
				.header("x-merchant-id", "m1700")
				.header("content-type", "application/json");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"items\":[],\"total_count\":0}");
		})
		.await;
	let value = client.article().list(&[]).await.expect("Header-matched call should succeed.");

	mock.assert_async().await;

	assert_eq!(value, json!({"items": [], "total_count": 0}));
}

#[tokio::test]
async fn caller_headers_win_over_dispatcher_defaults() {
	let server = MockServer::start_async().await;
	let client = build_direct_client(&server.base_url(), "m1700");

	client.restore_token("access", None);

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/export").header("content-type", "text/csv");
			then.status(200).header("content-type", "text/plain").body("code,name");
		})
		.await;
	let request = ApiRequest::new(Method::Get, "export").with_header("Content-Type", "text/csv");
	let value = client.request(request).await.expect("Header override should be honored.");

	mock.assert_async().await;

	assert_eq!(value, json!({"text": "code,name"}));
}

#[tokio::test]
async fn multipart_uploads_reach_the_provider() {
	let server = MockServer::start_async().await;
	let client = build_direct_client(&server.base_url(), "m1700");

	client.restore_token("access", None);

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/article_map");
			then.status(200).header("content-type", "application/json").body("{\"imported\":1}");
		})
		.await;
	let request = ApiRequest::new(Method::Post, "article_map").with_file(
		FilePart::new("import", "map.csv", b"sku,code".to_vec()).with_mime("text/csv"),
	);
	let value = client.request(request).await.expect("Multipart upload should succeed.");

	mock.assert_async().await;

	assert_eq!(value, json!({"imported": 1}));
}

#[tokio::test]
async fn expired_token_refreshes_then_dispatches() {
	let server = MockServer::start_async().await;
	let client = build_code_flow_client(&server.base_url());

	client.set_token("stale-access", Some("refresh-1".into()), Duration::seconds(0));

	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/token").query_param("grant_type", "refresh_token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"fresh-access\",\"refresh_token\":\"refresh-2\",\"token_type\":\"bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/warehouse").header("authorization", "Bearer fresh-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"items\":[],\"total_count\":0}");
		})
		.await;

	client.warehouse().list(&[]).await.expect("Dispatch should refresh and then succeed.");

	token_mock.assert_async().await;
	api_mock.assert_async().await;
}
