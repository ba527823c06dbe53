//! LOGILESS API client and the single request-dispatch choke point.

// self
use crate::{
	_prelude::*,
	auth::{AuthMode, LogilessAuth, TokenState},
	error::{ApiError, ConfigError, DecodeError},
	http::{FilePart, HttpTransport, Method, TransportRequest},
	obs::{self, CallKind, CallOutcome, CallSpan},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

const API_BASE_URL: &str = "https://app2.logiless.com/api";
const AUTHORIZATION_URL: &str = "https://app2.logiless.com/oauth/v2/authorize";
const TOKEN_URL: &str = "https://app2.logiless.com/oauth2/token";

/// Endpoint set targeted by the client.
///
/// Defaults to the production LOGILESS endpoints; tests point the overrides
/// at a mock server instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiEndpoints {
	/// Base URL every resource path appends to.
	pub api_base: Url,
	/// User-facing authorization endpoint.
	pub authorization: Url,
	/// Token endpoint serving code exchanges and refreshes.
	pub token: Url,
}
impl ApiEndpoints {
	/// Overrides the API base URL.
	pub fn with_api_base(mut self, url: Url) -> Self {
		self.api_base = url;

		self
	}

	/// Overrides the authorization endpoint.
	pub fn with_authorization(mut self, url: Url) -> Self {
		self.authorization = url;

		self
	}

	/// Overrides the token endpoint.
	pub fn with_token(mut self, url: Url) -> Self {
		self.token = url;

		self
	}
}
impl Default for ApiEndpoints {
	fn default() -> Self {
		Self {
			api_base: parse_known_url(API_BASE_URL),
			authorization: parse_known_url(AUTHORIZATION_URL),
			token: parse_known_url(TOKEN_URL),
		}
	}
}

/// Parameters for a single dispatched API call.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: Method,
	/// Path relative to the API base, without a leading slash.
	pub path: String,
	/// Query parameters passed through verbatim.
	pub query: Vec<(String, String)>,
	/// JSON body for create/update calls.
	pub body: Option<Value>,
	/// Extra headers; these win over the dispatcher's defaults on conflict.
	pub headers: Vec<(String, String)>,
	/// Multipart attachments.
	pub files: Vec<FilePart>,
}
impl ApiRequest {
	/// Creates a bare request for the given verb and relative path.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			body: None,
			headers: Vec::new(),
			files: Vec::new(),
		}
	}

	/// Appends one query parameter.
	pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((name.into(), value.into()));

		self
	}

	/// Appends borrowed query pairs, e.g. from a resource call's slice.
	pub fn with_query_pairs(mut self, pairs: &[(&str, &str)]) -> Self {
		self.query.extend(pairs.iter().map(|(name, value)| ((*name).into(), (*value).into())));

		self
	}

	/// Sets the JSON request body.
	pub fn with_body(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Appends one extra header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Attaches a multipart file.
	pub fn with_file(mut self, file: FilePart) -> Self {
		self.files.push(file);

		self
	}
}

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestApiClient = LogilessClient<ReqwestTransport>;

/// LOGILESS API client: auth component, endpoint set, and dispatcher.
///
/// Every API call flows through [`LogilessClient::request`], which enforces
/// the never-send-with-a-known-bad-token invariant and centralizes error
/// translation. The client performs a single attempt per call; retry policy
/// belongs to the caller.
pub struct LogilessClient<C>
where
	C: ?Sized + HttpTransport,
{
	transport: Arc<C>,
	endpoints: ApiEndpoints,
	auth: LogilessAuth<C>,
}
impl<C> LogilessClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		mode: AuthMode,
		endpoints: ApiEndpoints,
		transport: impl Into<Arc<C>>,
	) -> Self {
		let transport = transport.into();
		let auth = LogilessAuth::new(mode, endpoints.clone(), transport.clone());

		Self { transport, endpoints, auth }
	}

	/// Returns the token-lifecycle component.
	pub fn auth(&self) -> &LogilessAuth<C> {
		&self.auth
	}

	/// Returns the endpoint set the client targets.
	pub fn endpoints(&self) -> &ApiEndpoints {
		&self.endpoints
	}

	/// Builds the provider's user-facing authorization URL.
	pub fn authorization_url(&self) -> Result<Url> {
		self.auth.authorization_url()
	}

	/// Exchanges an authorization code for a token set.
	pub async fn exchange_code(&self, code: &str) -> Result<TokenState> {
		self.auth.exchange_code(code).await
	}

	/// Injects a token set obtained out-of-band with an explicit TTL.
	pub fn set_token(
		&self,
		access_token: impl Into<String>,
		refresh_token: Option<String>,
		ttl: Duration,
	) {
		self.auth.set_token(access_token, refresh_token, ttl);
	}

	/// Injects a token set with the provider's 30-day default TTL.
	pub fn restore_token(&self, access_token: impl Into<String>, refresh_token: Option<String>) {
		self.auth.restore_token(access_token, refresh_token);
	}

	/// Dispatches one API call and decodes its response.
	///
	/// 1. Runs [`LogilessAuth::ensure_active`]; failure short-circuits before
	///    any network call.
	/// 2. Merges `Content-Type: application/json` (unless multipart files own
	///    the content type), the auth headers, and caller extras, later
	///    entries winning on conflict.
	/// 3. Executes a single transport attempt.
	/// 4. Maps status ≥ 400 through [`ApiError::from_response`], synthesizing
	///    a `parse_error` body for unparseable payloads.
	/// 5. Decodes JSON success bodies; wraps anything else as `{"text": …}`.
	pub async fn request(&self, request: ApiRequest) -> Result<Value> {
		let span = CallSpan::new(CallKind::Resource, "request");

		obs::record_call_outcome(CallKind::Resource, CallOutcome::Attempt);

		let result = span.instrument(self.dispatch(request)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(CallKind::Resource, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(CallKind::Resource, CallOutcome::Failure),
		}

		result
	}

	async fn dispatch(&self, request: ApiRequest) -> Result<Value> {
		self.auth.ensure_active().await?;

		let url = self.api_url(&request.path)?;
		let mut headers = Vec::new();

		// Multipart transports own the boundary-bearing content type.
		if request.files.is_empty() {
			headers.push(("Content-Type".to_owned(), "application/json".to_owned()));
		}

		for header in self.auth.auth_headers()? {
			merge_header(&mut headers, header);
		}
		for header in request.headers {
			merge_header(&mut headers, header);
		}

		let mut transport_request = TransportRequest::new(request.method, url);

		transport_request.query = request.query;
		transport_request.headers = headers;
		transport_request.body = request.body;
		transport_request.files = request.files;

		let response = self.transport.execute(transport_request).await?;

		if response.status >= 400 {
			let body = match serde_json::from_str::<Value>(&response.body) {
				Ok(parsed) => parsed,
				Err(_) => serde_json::json!({
					"error": "parse_error",
					"error_description": response.body,
				}),
			};

			return Err(ApiError::from_response(response.status, body).into());
		}

		if response.is_json() {
			let mut deserializer = serde_json::Deserializer::from_str(&response.body);

			serde_path_to_error::deserialize(&mut deserializer)
				.map_err(|source| Error::from(DecodeError { source, status: response.status }))
		} else {
			Ok(serde_json::json!({ "text": response.body }))
		}
	}

	pub(crate) fn api_url(&self, path: &str) -> Result<Url> {
		let text =
			format!("{}/{}", self.endpoints.api_base.as_str().trim_end_matches('/'), path);

		Url::parse(&text).map_err(|source| ConfigError::InvalidUrl { url: text, source }.into())
	}
}
#[cfg(feature = "reqwest")]
impl LogilessClient<ReqwestTransport> {
	/// Creates a client for the production endpoints with the default reqwest
	/// transport.
	pub fn new(mode: AuthMode) -> Self {
		Self::with_endpoints(mode, ApiEndpoints::default())
	}

	/// Creates a reqwest-backed client for a custom endpoint set.
	pub fn with_endpoints(mode: AuthMode, endpoints: ApiEndpoints) -> Self {
		Self::with_transport(mode, endpoints, ReqwestTransport::default())
	}
}
impl<C> Debug for LogilessClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LogilessClient")
			.field("endpoints", &self.endpoints)
			.field("auth", &self.auth)
			.finish()
	}
}

fn merge_header(headers: &mut Vec<(String, String)>, header: (String, String)) {
	match headers.iter_mut().find(|(name, _)| name.eq_ignore_ascii_case(&header.0)) {
		Some(existing) => existing.1 = header.1,
		None => headers.push(header),
	}
}

fn parse_known_url(text: &str) -> Url {
	Url::parse(text).expect("Statically known URL should parse.")
}
