//! Transport primitives for API and token-endpoint calls.
//!
//! The module exposes [`HttpTransport`] as the crate's only dependency on an
//! HTTP stack. The default [`ReqwestTransport`] lives behind the `reqwest`
//! feature; tests and embedders can supply their own implementation (e.g. a
//! recording transport) without touching the dispatch logic.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// HTTP verbs used by the client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Method {
	#[default]
	/// Fetch a resource or perform a token grant (this provider's token
	/// endpoint accepts GET, not the usual POST).
	Get,
	/// Create a resource.
	Post,
	/// Replace a resource.
	Put,
	/// Remove a resource.
	Delete,
}
impl Method {
	/// Returns the canonical wire spelling of the verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Multipart file attachment forwarded verbatim to the provider.
#[derive(Clone)]
pub struct FilePart {
	/// Form field name.
	pub name: String,
	/// File name reported to the provider.
	pub file_name: String,
	/// MIME type, when known.
	pub mime: Option<String>,
	/// Raw file contents.
	pub bytes: Vec<u8>,
}
impl FilePart {
	/// Creates an attachment with no declared MIME type.
	pub fn new(
		name: impl Into<String>,
		file_name: impl Into<String>,
		bytes: impl Into<Vec<u8>>,
	) -> Self {
		Self { name: name.into(), file_name: file_name.into(), mime: None, bytes: bytes.into() }
	}

	/// Declares the attachment's MIME type.
	pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
		self.mime = Some(mime.into());

		self
	}
}
impl Debug for FilePart {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FilePart")
			.field("name", &self.name)
			.field("file_name", &self.file_name)
			.field("mime", &self.mime)
			.field("bytes", &format_args!("{} bytes", self.bytes.len()))
			.finish()
	}
}

/// A fully prepared outbound request handed to a transport.
#[derive(Clone)]
pub struct TransportRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Query parameters appended to the URL.
	pub query: Vec<(String, String)>,
	/// Headers in application order; transports must apply them as given.
	pub headers: Vec<(String, String)>,
	/// JSON request body, if any.
	pub body: Option<Value>,
	/// Multipart attachments; when non-empty the transport sends a multipart
	/// form and owns the boundary header.
	pub files: Vec<FilePart>,
}
impl TransportRequest {
	const SENSITIVE_QUERY_KEYS: [&'static str; 3] = ["client_secret", "code", "refresh_token"];

	/// Creates a bodiless request for the given verb and URL.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, query: Vec::new(), headers: Vec::new(), body: None, files: Vec::new() }
	}
}
impl Debug for TransportRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let query: Vec<(&str, &str)> = self
			.query
			.iter()
			.map(|(name, value)| {
				if Self::SENSITIVE_QUERY_KEYS.contains(&name.as_str()) {
					(name.as_str(), "<redacted>")
				} else {
					(name.as_str(), value.as_str())
				}
			})
			.collect();
		let headers: Vec<(&str, &str)> = self
			.headers
			.iter()
			.map(|(name, value)| {
				if name.eq_ignore_ascii_case("authorization") {
					(name.as_str(), "<redacted>")
				} else {
					(name.as_str(), value.as_str())
				}
			})
			.collect();

		f.debug_struct("TransportRequest")
			.field("method", &self.method)
			.field("url", &self.url)
			.field("query", &query)
			.field("headers", &headers)
			.field("body", &self.body)
			.field("files", &self.files)
			.finish()
	}
}

/// Raw response surfaced by a transport; JSON decoding happens downstream.
#[derive(Clone, Debug)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// `Content-Type` header value, if present.
	pub content_type: Option<String>,
	/// Response body decoded as text.
	pub body: String,
}
impl TransportResponse {
	/// Returns `true` when the response declares a JSON body.
	pub fn is_json(&self) -> bool {
		self.content_type.as_deref().is_some_and(|value| value.starts_with("application/json"))
	}
}

/// Future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing client requests.
///
/// Implementations perform exactly one attempt per call; retry policy belongs
/// to the caller. Implementations must be `Send + Sync` so one transport can
/// back both the auth component and the dispatcher behind a shared `Arc`.
pub trait HttpTransport
where
	Self: Send + Sync,
{
	/// Executes a single HTTP request, surfacing transport-level failures as
	/// [`TransportError`]. Non-2xx statuses are NOT errors at this layer.
	fn execute(&self, request: TransportRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one
/// place. The default client follows reqwest's redirect and timeout defaults;
/// configure a custom [`ReqwestClient`] to change either.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: TransportRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client.request(to_reqwest_method(request.method), request.url);

			if !request.query.is_empty() {
				builder = builder.query(&request.query);
			}
			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = &request.body {
				builder = builder.json(body);
			}
			if !request.files.is_empty() {
				let mut form = reqwest::multipart::Form::new();

				for file in request.files {
					let name = file.name.clone();

					form = form.part(name, to_reqwest_part(file)?);
				}

				builder = builder.multipart(form);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let content_type = response
				.headers()
				.get(reqwest::header::CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			let body = response.text().await.map_err(TransportError::from)?;

			Ok(TransportResponse { status, content_type, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn to_reqwest_method(method: Method) -> reqwest::Method {
	match method {
		Method::Get => reqwest::Method::GET,
		Method::Post => reqwest::Method::POST,
		Method::Put => reqwest::Method::PUT,
		Method::Delete => reqwest::Method::DELETE,
	}
}

#[cfg(feature = "reqwest")]
fn to_reqwest_part(file: FilePart) -> Result<reqwest::multipart::Part, TransportError> {
	let name = file.name;
	let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);

	if let Some(mime) = &file.mime {
		part = part
			.mime_str(mime)
			.map_err(|e| TransportError::Attachment { name, source: Box::new(e) })?;
	}

	Ok(part)
}
