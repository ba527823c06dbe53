//! Client-level error types shared across auth, dispatch, and storage.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem (bad URLs, unresolved path templates).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Credential or token-lifecycle failure.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Typed API failure mapped from a non-2xx response.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Malformed JSON carried by a success response.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Token persistence failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
}

/// Configuration and validation failures raised before any request is sent.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A composed request URL failed to parse.
	#[error("Composed request URL `{url}` is invalid.")]
	InvalidUrl {
		/// The rejected URL text.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A path template references `{merchant_id}` but none is configured.
	#[error("Path template `{template}` references a merchant but the credentials carry none.")]
	MissingMerchantId {
		/// The unresolved template.
		template: String,
	},
	/// Merchant identifier validation failed.
	#[error(transparent)]
	InvalidMerchantId(#[from] crate::auth::MerchantIdError),
}

/// Credential and token-lifecycle failures.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// No access token has been configured or fetched yet.
	#[error("No access token is configured.")]
	MissingAccessToken,
	/// The access token expired and no refresh token is available.
	#[error("Access token has expired and no refresh token is available.")]
	MissingRefreshToken,
	/// The configured credential mode cannot perform the requested grant.
	#[error("{mode} credentials do not support the {grant} grant.")]
	UnsupportedGrant {
		/// Credential mode label.
		mode: &'static str,
		/// Rejected grant label.
		grant: &'static str,
	},
	/// Token endpoint rejected the grant.
	#[error("Token endpoint rejected the {grant} grant: {reason}.")]
	Rejected {
		/// Grant label (`authorization_code` or `refresh_token`).
		grant: &'static str,
		/// Provider-supplied `error`/`error_description` pair, or the raw body
		/// when the response was not parseable.
		reason: String,
		/// HTTP status code returned by the token endpoint.
		status: u16,
	},
	/// Token endpoint answered a successful grant with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure with path context.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Typed API failure mapped from a non-2xx response body.
///
/// Constructed exclusively by [`ApiError::from_response`]; immutable once
/// built. Every kind retains the originating status code and the parsed
/// response body for caller-side logging or branching.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// 400 with field-level validation details.
	#[error("Validation failed with status {status}: {message}.")]
	Validation {
		/// Provider-supplied validation message.
		message: String,
		/// Originating HTTP status code.
		status: u16,
		/// Field-to-message validation details from the `errors` object.
		details: BTreeMap<String, String>,
		/// Parsed response body.
		response: Value,
	},
	/// 401/403 authentication or authorization rejection.
	#[error("Provider denied the request with status {status}: {message}.")]
	Unauthorized {
		/// Provider `error`/`error_description` summary.
		message: String,
		/// Originating HTTP status code.
		status: u16,
		/// Parsed response body.
		response: Value,
	},
	/// 423; the resource is temporarily locked.
	#[error("Resource is locked with status {status}: {message}.")]
	ResourceLocked {
		/// Provider `error`/`error_description` summary.
		message: String,
		/// Originating HTTP status code.
		status: u16,
		/// Parsed response body.
		response: Value,
	},
	/// 429; the caller must back off before retrying.
	#[error("Rate limit exceeded with status {status}: {message}.")]
	RateLimited {
		/// Provider `error`/`error_description` summary.
		message: String,
		/// Originating HTTP status code.
		status: u16,
		/// Parsed response body.
		response: Value,
	},
	/// 5xx provider-side failure.
	#[error("Provider-side failure with status {status}: {message}.")]
	Server {
		/// Provider `error`/`error_description` summary.
		message: String,
		/// Originating HTTP status code.
		status: u16,
		/// Parsed response body.
		response: Value,
	},
	/// Catch-all for any other status of 400 or above.
	#[error("API request failed with status {status}: {message}.")]
	Other {
		/// Provider `error`/`error_description` summary.
		message: String,
		/// Originating HTTP status code.
		status: u16,
		/// Parsed response body.
		response: Value,
	},
}
impl ApiError {
	/// Maps a non-2xx status and its parsed body to the matching error kind.
	///
	/// Pure and deterministic: the same `(status, body)` pair always yields
	/// the same kind and message, independent of call order.
	pub fn from_response(status: u16, body: Value) -> Self {
		match status {
			400 => {
				let message = body
					.get("message")
					.and_then(Value::as_str)
					.unwrap_or("Validation failed")
					.to_owned();
				let details = validation_details(&body);

				Self::Validation { message, status, details, response: body }
			},
			401 => Self::Unauthorized {
				message: provider_message(&body, "authentication_error", "Authentication failed"),
				status,
				response: body,
			},
			403 => Self::Unauthorized {
				message: provider_message(&body, "access_denied", "Access to the request was denied"),
				status,
				response: body,
			},
			423 => Self::ResourceLocked {
				message: provider_message(&body, "resource_locked", "Resource is temporarily locked"),
				status,
				response: body,
			},
			429 => Self::RateLimited {
				message: provider_message(
					&body,
					"rate_limit_exceeded",
					"API request rate limit exceeded",
				),
				status,
				response: body,
			},
			500.. => Self::Server {
				message: provider_message(&body, "server_error", "Internal server error"),
				status,
				response: body,
			},
			_ => Self::Other {
				message: provider_message(&body, "unknown_error", "Unexpected API error"),
				status,
				response: body,
			},
		}
	}

	/// Returns the originating HTTP status code.
	pub fn status(&self) -> u16 {
		match self {
			Self::Validation { status, .. }
			| Self::Unauthorized { status, .. }
			| Self::ResourceLocked { status, .. }
			| Self::RateLimited { status, .. }
			| Self::Server { status, .. }
			| Self::Other { status, .. } => *status,
		}
	}

	/// Returns the provider-derived message.
	pub fn message(&self) -> &str {
		match self {
			Self::Validation { message, .. }
			| Self::Unauthorized { message, .. }
			| Self::ResourceLocked { message, .. }
			| Self::RateLimited { message, .. }
			| Self::Server { message, .. }
			| Self::Other { message, .. } => message,
		}
	}

	/// Returns the parsed response body the error was mapped from.
	pub fn response(&self) -> &Value {
		match self {
			Self::Validation { response, .. }
			| Self::Unauthorized { response, .. }
			| Self::ResourceLocked { response, .. }
			| Self::RateLimited { response, .. }
			| Self::Server { response, .. }
			| Self::Other { response, .. } => response,
		}
	}

	/// Returns field-level validation details for [`ApiError::Validation`].
	pub fn validation_details(&self) -> Option<&BTreeMap<String, String>> {
		match self {
			Self::Validation { details, .. } => Some(details),
			_ => None,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request timed out before the provider responded.
	#[error("Request timed out while calling the API.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// A multipart attachment could not be encoded for sending.
	#[error("Multipart attachment `{name}` could not be encoded.")]
	Attachment {
		/// Form field name of the offending attachment.
		name: String,
		/// Underlying encoding failure.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// Malformed JSON carried by a success (2xx) response.
#[derive(Debug, ThisError)]
#[error("Response declared JSON content but the body could not be decoded.")]
pub struct DecodeError {
	/// Structured parsing failure with path context.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
	/// HTTP status of the offending response.
	pub status: u16,
}

fn provider_message(body: &Value, default_error: &str, default_description: &str) -> String {
	let error = body.get("error").and_then(Value::as_str).unwrap_or(default_error);
	let description =
		body.get("error_description").and_then(Value::as_str).unwrap_or(default_description);

	format!("{error}: {description}")
}

fn validation_details(body: &Value) -> BTreeMap<String, String> {
	body.get("errors")
		.and_then(Value::as_object)
		.map(|fields| {
			fields
				.iter()
				.map(|(field, detail)| {
					let detail =
						detail.as_str().map(str::to_owned).unwrap_or_else(|| detail.to_string());

					(field.clone(), detail)
				})
				.collect()
		})
		.unwrap_or_default()
}
