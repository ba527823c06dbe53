//! Token secrets, mutable token state, and the provider grant wire model.

// self
use crate::_prelude::*;

/// Early-expiry safety margin applied by [`TokenState::is_expired_at`].
///
/// A token within five minutes of its expiry instant is treated as already
/// expired so it cannot lapse mid-request.
pub const EXPIRY_MARGIN: Duration = Duration::seconds(300);
/// Default lifetime assumed for directly injected tokens (30 days), matching
/// the provider's issued-token lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::seconds(2_592_000);

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Mutable OAuth token state owned by the auth component.
///
/// Mutated only by the grant operations and the direct-injection setter;
/// resource calls never touch it. An absent expiry instant counts as expired.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
	/// Current access token, once one has been fetched or injected.
	pub access_token: Option<TokenSecret>,
	/// Refresh token, when the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Expiry instant derived from the grant's `expires_in`.
	pub expires_at: Option<OffsetDateTime>,
}
impl TokenState {
	/// Checks expiry at a given instant, applying [`EXPIRY_MARGIN`].
	///
	/// True when the access token is absent, the expiry is unknown, or the
	/// instant falls inside the safety margin. The margin boundary itself
	/// counts as expired.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		if self.access_token.is_none() {
			return true;
		}

		match self.expires_at {
			Some(expires_at) => instant >= expires_at - EXPIRY_MARGIN,
			None => true,
		}
	}

	/// Convenience helper that checks expiry against the current UTC instant.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Applies a token-endpoint grant issued at `issued_at`.
	///
	/// The existing refresh token survives when the response omits one, so a
	/// refresh grant that does not rotate secrets keeps its rotation
	/// capability.
	pub fn apply_grant(&mut self, grant: TokenGrant, issued_at: OffsetDateTime) {
		self.access_token = Some(TokenSecret::new(grant.access_token));

		if let Some(refresh) = grant.refresh_token {
			self.refresh_token = Some(TokenSecret::new(refresh));
		}

		self.expires_at = grant.expires_in.map(|secs| issued_at + Duration::seconds(secs));
	}

	/// Replaces the token set wholesale, stamping expiry as `now + ttl`.
	pub fn inject(
		&mut self,
		access_token: impl Into<String>,
		refresh_token: Option<String>,
		ttl: Duration,
		now: OffsetDateTime,
	) {
		self.access_token = Some(TokenSecret::new(access_token));
		self.refresh_token = refresh_token.map(TokenSecret::new);
		self.expires_at = Some(now + ttl);
	}
}

/// Wire model of the provider's token endpoint response.
#[derive(Clone, Deserialize)]
pub struct TokenGrant {
	/// Newly issued access token.
	pub access_token: String,
	/// Rotated refresh token, when the provider issues one.
	#[serde(default)]
	pub refresh_token: Option<String>,
	/// Token lifetime in seconds.
	#[serde(default)]
	pub expires_in: Option<i64>,
	/// Token type label (`bearer`).
	#[serde(default)]
	pub token_type: Option<String>,
}
impl Debug for TokenGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenGrant")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_in", &self.expires_in)
			.field("token_type", &self.token_type)
			.finish()
	}
}
