//! File-based storage backend implementation for the storefront client.
//!
//! This module provides a durable implementation of the StorageInterface
//! trait that keeps one JSON file per key under a configured profile
//! directory. It is the desktop analog of the browser's local storage: state
//! survives restarts, and whichever process wrote last wins.

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use storefront_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use tokio::fs;

/// File-based storage implementation.
///
/// Each key maps to `<root>/<sanitized key>.json`. Writes go through a
/// sibling temp file followed by a rename, so a crash mid-write leaves the
/// previous value intact rather than a truncated blob.
pub struct FileStorage {
	/// Directory holding all persisted blobs.
	root: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage rooted at the given directory.
	///
	/// The directory is created if it does not exist.
	pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
		let root = root.into();
		std::fs::create_dir_all(&root)
			.map_err(|e| StorageError::Backend(format!("cannot create {}: {}", root.display(), e)))?;
		Ok(Self { root })
	}

	fn path_for(&self, key: &str) -> PathBuf {
		self.root.join(format!("{}.json", sanitize_key(key)))
	}
}

/// Maps a storage key to a safe file stem.
///
/// Keys are `namespace:id` pairs; anything outside `[A-Za-z0-9._-]` becomes
/// an underscore.
fn sanitize_key(key: &str) -> String {
	key.chars()
		.map(|c| {
			if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
				c
			} else {
				'_'
			}
		})
		.collect()
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.path_for(key);
		match fs::read(&path).await {
			Ok(bytes) => Ok(bytes),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.path_for(key);
		let tmp = path.with_extension("json.tmp");
		fs::write(&tmp, &value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&tmp, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.path_for(key);
		match fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.path_for(key);
		match fs::metadata(&path).await {
			Ok(meta) => Ok(meta.is_file()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("root", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(s) if !s.trim().is_empty() => Ok(()),
						_ => Err("must be a non-empty path".to_string()),
					}
				}),
			],
			vec![],
		);
		schema.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `root`: directory holding the persisted blobs (required)
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let root = config
		.get("root")
		.and_then(|v| v.as_str())
		.ok_or_else(|| StorageError::Configuration("'root' is required".to_string()))?;
	let storage = FileStorage::new(Path::new(root))?;
	Ok(Box::new(storage))
}

/// Registry entry for the file storage backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn round_trips_across_instances() {
		let dir = tempfile::tempdir().unwrap();
		let value = br#"{"quantity":2}"#.to_vec();

		{
			let storage = FileStorage::new(dir.path()).unwrap();
			storage.set_bytes("cart:default", value.clone()).await.unwrap();
		}

		// A fresh instance over the same root sees the previous write.
		let storage = FileStorage::new(dir.path()).unwrap();
		assert_eq!(storage.get_bytes("cart:default").await.unwrap(), value);
	}

	#[tokio::test]
	async fn delete_is_idempotent() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path()).unwrap();

		storage.set_bytes("session:default", b"{}".to_vec()).await.unwrap();
		storage.delete("session:default").await.unwrap();
		storage.delete("session:default").await.unwrap();
		assert!(!storage.exists("session:default").await.unwrap());
	}

	#[tokio::test]
	async fn keys_sanitize_to_distinct_files() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path()).unwrap();

		storage.set_bytes("cart:default", b"a".to_vec()).await.unwrap();
		storage
			.set_bytes("checkout_draft:default", b"b".to_vec())
			.await
			.unwrap();

		assert_eq!(storage.get_bytes("cart:default").await.unwrap(), b"a");
		assert_eq!(
			storage.get_bytes("checkout_draft:default").await.unwrap(),
			b"b"
		);
	}

	#[test]
	fn schema_requires_root() {
		let schema = FileStorageSchema;
		assert!(schema.validate(&"root = \"/tmp/storefront\"".parse().unwrap()).is_ok());
		assert!(schema.validate(&"".parse::<toml::Value>().unwrap()).is_err());
	}
}
