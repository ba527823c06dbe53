//! Token lifecycle orchestration: grants, expiry tracking, and auth headers.
//!
//! [`LogilessAuth`] owns the crate's only stateful behavior. It guarantees
//! that every outbound API call carries a currently-valid credential: callers
//! run [`LogilessAuth::ensure_active`] before dispatch, which refreshes an
//! expired token at most once (serialized through a singleflight guard) and
//! never touches the network while the cached token is still valid.
//!
//! The provider deviates from RFC 6749 by serving both the code exchange and
//! the refresh grant over **GET with query-string parameters**; that wire
//! shape is preserved here verbatim.

pub mod credentials;
pub mod token;

pub use credentials::*;
pub use token::*;

// self
use crate::{
	_prelude::*,
	client::ApiEndpoints,
	error::AuthError,
	http::{HttpTransport, Method, TransportRequest},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Maintains a single OAuth2 token set for one credential mode.
///
/// Generic over the transport so tests can substitute recording or failing
/// transports for the default reqwest stack. Token state is guarded by a
/// read-write lock; refreshes additionally serialize through an async mutex
/// so concurrent [`ensure_active`](Self::ensure_active) calls trigger exactly
/// one provider round-trip.
pub struct LogilessAuth<C>
where
	C: ?Sized + HttpTransport,
{
	transport: Arc<C>,
	endpoints: ApiEndpoints,
	mode: AuthMode,
	state: RwLock<TokenState>,
	refresh_guard: AsyncMutex<()>,
}
impl<C> LogilessAuth<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates an auth component for the given credentials and endpoints.
	pub fn new(mode: AuthMode, endpoints: ApiEndpoints, transport: impl Into<Arc<C>>) -> Self {
		Self {
			transport: transport.into(),
			endpoints,
			mode,
			state: RwLock::new(TokenState::default()),
			refresh_guard: AsyncMutex::new(()),
		}
	}

	/// Returns the configured credential mode.
	pub fn mode(&self) -> &AuthMode {
		&self.mode
	}

	/// Returns a snapshot of the current token state, e.g. for persistence.
	pub fn token_state(&self) -> TokenState {
		self.state.read().clone()
	}

	/// Replaces the token state wholesale, e.g. from persisted state.
	pub fn restore(&self, state: TokenState) {
		*self.state.write() = state;
	}

	/// Builds the provider's user-facing authorization URL.
	///
	/// Purely deterministic concatenation; no network call. Only meaningful
	/// for authorization-code credentials.
	pub fn authorization_url(&self) -> Result<Url> {
		match &self.mode {
			AuthMode::AuthorizationCode { client_id, redirect_uri, .. } => {
				let mut url = self.endpoints.authorization.clone();

				url.query_pairs_mut()
					.append_pair("client_id", client_id)
					.append_pair("response_type", "code")
					.append_pair("redirect_uri", redirect_uri.as_str());

				Ok(url)
			},
			mode => Err(AuthError::UnsupportedGrant {
				mode: mode.kind(),
				grant: "authorization_code",
			}
			.into()),
		}
	}

	/// Exchanges an authorization code for a token set.
	///
	/// Stores the issued tokens and `now + expires_in` as the expiry instant,
	/// then returns a snapshot of the updated state.
	pub async fn exchange_code(&self, code: &str) -> Result<TokenState> {
		let params = match &self.mode {
			AuthMode::AuthorizationCode { client_id, client_secret, redirect_uri } => vec![
				("client_id".to_owned(), client_id.clone()),
				("client_secret".to_owned(), client_secret.clone()),
				("code".to_owned(), code.to_owned()),
				("grant_type".to_owned(), "authorization_code".to_owned()),
				("redirect_uri".to_owned(), redirect_uri.to_string()),
			],
			mode => {
				return Err(AuthError::UnsupportedGrant {
					mode: mode.kind(),
					grant: "authorization_code",
				}
				.into());
			},
		};
		let grant = self.token_grant(CallKind::TokenExchange, "authorization_code", params).await?;
		let mut state = self.state.write();

		state.apply_grant(grant, OffsetDateTime::now_utc());

		Ok(state.clone())
	}

	/// Refreshes the access token using the stored refresh token.
	///
	/// Keeps the existing refresh token when the provider does not rotate it.
	/// Serialized through the singleflight guard.
	pub async fn refresh(&self) -> Result<TokenState> {
		let _guard = self.refresh_guard.lock().await;

		self.refresh_locked().await
	}

	/// Checks expiry of the current token at a given instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.state.read().is_expired_at(instant)
	}

	/// Checks expiry of the current token against the current UTC instant.
	pub fn is_expired(&self) -> bool {
		self.state.read().is_expired()
	}

	/// Guarantees the cached token is valid, refreshing it when possible.
	///
	/// A valid token returns immediately with zero network calls. An expired
	/// token with a refresh token triggers exactly one refresh; concurrent
	/// callers wait on the guard and re-check before issuing their own.
	pub async fn ensure_active(&self) -> Result<()> {
		{
			let state = self.state.read();

			if state.access_token.is_none() {
				return Err(AuthError::MissingAccessToken.into());
			}
			if !state.is_expired() {
				return Ok(());
			}
		}

		let _guard = self.refresh_guard.lock().await;

		// Another caller may have refreshed while this one waited on the guard.
		{
			let state = self.state.read();

			if !state.is_expired() {
				return Ok(());
			}
			if state.refresh_token.is_none() {
				return Err(AuthError::MissingRefreshToken.into());
			}
		}

		self.refresh_locked().await.map(|_| ())
	}

	/// Returns the headers that authenticate an API request.
	///
	/// Always `Authorization: Bearer <token>`; direct-token credentials
	/// additionally scope the call with `X-Merchant-ID`.
	pub fn auth_headers(&self) -> Result<Vec<(String, String)>, AuthError> {
		let access_token =
			self.state.read().access_token.clone().ok_or(AuthError::MissingAccessToken)?;
		let mut headers =
			vec![("Authorization".to_owned(), format!("Bearer {}", access_token.expose()))];

		if let Some(merchant_id) = self.mode.merchant_id() {
			headers.push(("X-Merchant-ID".to_owned(), merchant_id.to_string()));
		}

		Ok(headers)
	}

	/// Injects a token set obtained out-of-band, stamping expiry as `now + ttl`.
	pub fn set_token(
		&self,
		access_token: impl Into<String>,
		refresh_token: Option<String>,
		ttl: Duration,
	) {
		self.state.write().inject(access_token, refresh_token, ttl, OffsetDateTime::now_utc());
	}

	/// [`set_token`](Self::set_token) with the provider's 30-day default TTL.
	pub fn restore_token(&self, access_token: impl Into<String>, refresh_token: Option<String>) {
		self.set_token(access_token, refresh_token, DEFAULT_TOKEN_TTL);
	}

	async fn refresh_locked(&self) -> Result<TokenState> {
		let params = match &self.mode {
			AuthMode::AuthorizationCode { client_id, client_secret, .. } => {
				let refresh_token = self
					.state
					.read()
					.refresh_token
					.clone()
					.ok_or(AuthError::MissingRefreshToken)?;

				vec![
					("client_id".to_owned(), client_id.clone()),
					("client_secret".to_owned(), client_secret.clone()),
					("refresh_token".to_owned(), refresh_token.expose().to_owned()),
					("grant_type".to_owned(), "refresh_token".to_owned()),
				]
			},
			mode => {
				return Err(AuthError::UnsupportedGrant {
					mode: mode.kind(),
					grant: "refresh_token",
				}
				.into());
			},
		};
		let grant = self.token_grant(CallKind::TokenRefresh, "refresh_token", params).await?;
		let mut state = self.state.write();

		state.apply_grant(grant, OffsetDateTime::now_utc());

		Ok(state.clone())
	}

	async fn token_grant(
		&self,
		kind: CallKind,
		grant: &'static str,
		params: Vec<(String, String)>,
	) -> Result<TokenGrant> {
		let span = CallSpan::new(kind, "token_grant");

		obs::record_call_outcome(kind, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut request = TransportRequest::new(Method::Get, self.endpoints.token.clone());

				request.query = params;

				let response = self.transport.execute(request).await?;

				if !(200..300).contains(&response.status) {
					return Err(AuthError::Rejected {
						grant,
						reason: rejection_reason(&response.body),
						status: response.status,
					}
					.into());
				}

				let mut deserializer = serde_json::Deserializer::from_str(&response.body);

				serde_path_to_error::deserialize(&mut deserializer)
					.map_err(|source| Error::from(AuthError::ResponseParse { source }))
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(kind, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(kind, CallOutcome::Failure),
		}

		result
	}
}
impl<C> Debug for LogilessAuth<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LogilessAuth")
			.field("mode", &self.mode)
			.field("endpoints", &self.endpoints)
			.finish()
	}
}

fn rejection_reason(body: &str) -> String {
	match serde_json::from_str::<Value>(body) {
		Ok(parsed) => {
			let error = parsed.get("error").and_then(Value::as_str);
			let description = parsed.get("error_description").and_then(Value::as_str);

			match (error, description) {
				(Some(error), Some(description)) => format!("{error}: {description}"),
				(Some(error), None) => error.to_owned(),
				_ => body.trim().to_owned(),
			}
		},
		Err(_) => body.trim().to_owned(),
	}
}
