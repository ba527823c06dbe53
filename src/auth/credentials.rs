//! Credential modes and the validated merchant identifier.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const MERCHANT_ID_MAX_LEN: usize = 128;

/// Error returned when merchant identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum MerchantIdError {
	/// The identifier was empty.
	#[error("Merchant identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Merchant identifier contains whitespace.")]
	ContainsWhitespace,
	/// The identifier exceeded the allowed character count.
	#[error("Merchant identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Validated merchant identifier scoping direct-token credentials.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MerchantId(String);
impl MerchantId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, MerchantIdError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for MerchantId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for MerchantId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for MerchantId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<MerchantId> for String {
	fn from(value: MerchantId) -> Self {
		value.0
	}
}
impl TryFrom<String> for MerchantId {
	type Error = MerchantIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for MerchantId {
	type Err = MerchantIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for MerchantId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Merchant({})", self.0)
	}
}
impl Display for MerchantId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Credential modes accepted by the client.
///
/// The two modes are mutually exclusive: the authorization-code flow fetches
/// and refreshes its own tokens, while direct-token mode relies on a
/// pre-issued token injected by the caller and cannot refresh.
#[derive(Clone)]
pub enum AuthMode {
	/// OAuth2 authorization-code flow with refresh capability.
	AuthorizationCode {
		/// OAuth2 client identifier.
		client_id: String,
		/// OAuth2 client secret; redacted from `Debug` output.
		client_secret: String,
		/// Redirect URI registered with the provider.
		redirect_uri: Url,
	},
	/// Pre-issued access token scoped to one merchant; no refresh capability.
	DirectToken {
		/// Merchant the injected token is scoped to.
		merchant_id: MerchantId,
	},
}
impl AuthMode {
	/// Creates authorization-code credentials.
	pub fn authorization_code(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		redirect_uri: Url,
	) -> Self {
		Self::AuthorizationCode {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			redirect_uri,
		}
	}

	/// Creates direct-token credentials for the given merchant.
	pub fn direct_token(merchant_id: impl AsRef<str>) -> Result<Self, MerchantIdError> {
		Ok(Self::DirectToken { merchant_id: MerchantId::new(merchant_id)? })
	}

	/// Returns a stable label for the mode, used in errors and spans.
	pub const fn kind(&self) -> &'static str {
		match self {
			AuthMode::AuthorizationCode { .. } => "authorization_code",
			AuthMode::DirectToken { .. } => "direct_token",
		}
	}

	/// Returns the merchant identifier in direct-token mode.
	pub fn merchant_id(&self) -> Option<&MerchantId> {
		match self {
			AuthMode::AuthorizationCode { .. } => None,
			AuthMode::DirectToken { merchant_id } => Some(merchant_id),
		}
	}

	/// Returns `true` when the mode can perform the refresh-token grant.
	pub const fn supports_refresh(&self) -> bool {
		matches!(self, AuthMode::AuthorizationCode { .. })
	}
}
impl Debug for AuthMode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			AuthMode::AuthorizationCode { client_id, client_secret, redirect_uri } => f
				.debug_struct("AuthorizationCode")
				.field("client_id", client_id)
				.field("client_secret_set", &!client_secret.is_empty())
				.field("redirect_uri", redirect_uri)
				.finish(),
			AuthMode::DirectToken { merchant_id } =>
				f.debug_struct("DirectToken").field("merchant_id", merchant_id).finish(),
		}
	}
}

fn validate_view(view: &str) -> Result<(), MerchantIdError> {
	if view.is_empty() {
		return Err(MerchantIdError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(MerchantIdError::ContainsWhitespace);
	}
	if view.len() > MERCHANT_ID_MAX_LEN {
		return Err(MerchantIdError::TooLong { max: MERCHANT_ID_MAX_LEN });
	}

	Ok(())
}
