//! Client for the LOGILESS warehouse-management REST API - OAuth2 token
//! lifecycle, typed error mapping, and CRUD resource endpoints in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod obs;
pub mod resource;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via
	//! `cfg(test)` or the `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::AuthMode,
		client::{ApiEndpoints, LogilessClient},
		http::ReqwestTransport,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = LogilessClient<ReqwestTransport>;

	/// Builds an endpoint set rooted at a mock server's base URL.
	pub fn test_endpoints(base_url: &str) -> ApiEndpoints {
		let base = Url::parse(base_url).expect("Failed to parse mock server base URL.");
		let join = |path: &str| base.join(path).expect("Failed to join mock endpoint path.");

		ApiEndpoints::default()
			.with_api_base(join("api"))
			.with_authorization(join("authorize"))
			.with_token(join("token"))
	}

	/// Builds an authorization-code client pointed at a mock server.
	pub fn build_code_flow_client(base_url: &str) -> ReqwestTestClient {
		let redirect = Url::parse("https://example.com/callback")
			.expect("Failed to parse test redirect URI.");

		LogilessClient::with_transport(
			AuthMode::authorization_code("test-client-id", "test-client-secret", redirect),
			test_endpoints(base_url),
			ReqwestTransport::default(),
		)
	}

	/// Builds a direct-token client pointed at a mock server.
	pub fn build_direct_client(base_url: &str, merchant_id: &str) -> ReqwestTestClient {
		LogilessClient::with_transport(
			AuthMode::direct_token(merchant_id)
				.expect("Failed to build test merchant identifier."),
			test_endpoints(base_url),
			ReqwestTransport::default(),
		)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, logiless as _, tokio as _};
