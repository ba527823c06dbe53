//! Caller-managed token persistence between runs.
//!
//! The dispatch path never touches storage; callers that want tokens to
//! survive restarts snapshot [`LogilessAuth::token_state`] into a
//! [`TokenFileStore`] and feed the loaded state back through
//! [`LogilessAuth::restore`].
//!
//! [`LogilessAuth::token_state`]: crate::auth::LogilessAuth::token_state
//! [`LogilessAuth::restore`]: crate::auth::LogilessAuth::restore

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{_prelude::*, auth::TokenState};

/// Error type produced by [`TokenFileStore`] operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced while encoding or decoding a snapshot.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Filesystem-level failure.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Persists a token snapshot to a JSON file after each save.
///
/// Writes go to a sibling `.tmp` file first and replace the snapshot via
/// rename, so a crash mid-write never leaves a torn file behind.
#[derive(Clone, Debug)]
pub struct TokenFileStore {
	path: PathBuf,
}
impl TokenFileStore {
	/// Opens a store at the provided path, creating parent directories.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		Ok(Self { path })
	}

	/// Returns the snapshot path.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Loads the persisted snapshot; absent or empty files yield `None`.
	pub fn load(&self) -> Result<Option<TokenState>, StoreError> {
		if !self.path.exists() {
			return Ok(None);
		}

		let metadata = self.path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", self.path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(None);
		}

		let bytes = fs::read(&self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", self.path.display()),
		})?;
		let state = serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", self.path.display()),
		})?;

		Ok(Some(state))
	}

	/// Atomically replaces the persisted snapshot.
	pub fn save(&self, state: &TokenState) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized = serde_json::to_vec_pretty(state).map_err(|e| {
			StoreError::Serialization { message: format!("Failed to serialize snapshot: {e}") }
		})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}
}
