//! Configuration module for the storefront client.
//!
//! This module provides structures and utilities for managing storefront
//! configuration. It supports loading configuration from TOML files,
//! resolving `${ENV_VAR}` placeholders, and validating that all required
//! configuration values are properly set before anything is wired up.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the storefront client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this storefront instance.
	pub storefront: StorefrontConfig,
	/// Configuration for the client-local storage backend.
	pub storage: StorageConfig,
	/// Configuration for the remote backend API client.
	pub api: ApiConfig,
}

/// Configuration specific to the storefront instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorefrontConfig {
	/// Human-readable identifier for this deployment, used in logs.
	pub id: String,
	/// Capacity of the event bus before slow subscribers lose events.
	/// Defaults to 256.
	#[serde(default = "default_event_capacity")]
	pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
	256
}

/// Configuration for the client-local storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the remote backend API client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Which implementation to use.
	pub implementation: String,
	/// Map of API implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

impl Config {
	/// Loads configuration from a TOML file asynchronously.
	pub async fn from_file_async(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path.as_ref()).await?;
		content.parse()
	}

	/// Validates the configuration beyond what deserialization checks.
	///
	/// Ensures the selected storage and API implementations actually have
	/// configuration tables, so wiring fails here rather than deep inside a
	/// factory.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.storefront.id.trim().is_empty() {
			return Err(ConfigError::Validation(
				"storefront.id must not be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"storage.primary '{}' has no [storage.implementations.{}] table",
				self.storage.primary, self.storage.primary
			)));
		}
		if !self
			.api
			.implementations
			.contains_key(&self.api.implementation)
		{
			return Err(ConfigError::Validation(format!(
				"api.implementation '{}' has no [api.implementations.{}] table",
				self.api.implementation, self.api.implementation
			)));
		}
		Ok(())
	}

	/// Returns the TOML table for the selected storage implementation.
	pub fn storage_table(&self) -> Option<&toml::Value> {
		self.storage.implementations.get(&self.storage.primary)
	}

	/// Returns the TOML table for the selected API implementation.
	pub fn api_table(&self) -> Option<&toml::Value> {
		self.api.implementations.get(&self.api.implementation)
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

/// Replaces `${VAR_NAME}` placeholders with values from the environment.
///
/// Unset variables are an error: a half-resolved configuration is worse
/// than a loud failure at startup.
pub fn resolve_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
		.map_err(|e| ConfigError::Parse(e.to_string()))?;

	let mut result = String::with_capacity(content.len());
	let mut last_end = 0;
	for caps in re.captures_iter(content) {
		let whole = match caps.get(0) {
			Some(m) => m,
			None => continue,
		};
		let name = &caps[1];
		let value = std::env::var(name).map_err(|_| {
			ConfigError::Validation(format!("environment variable '{}' is not set", name))
		})?;
		result.push_str(&content[last_end..whole.start()]);
		result.push_str(&value);
		last_end = whole.end();
	}
	result.push_str(&content[last_end..]);
	Ok(result)
}

#[cfg(test)]
mod tests {
	use super::*;

	const EXAMPLE: &str = r#"
		[storefront]
		id = "industrial-storefront"

		[storage]
		primary = "memory"
		[storage.implementations.memory]

		[api]
		implementation = "http"
		[api.implementations.http]
		base_url = "https://backend.example.com/api"
	"#;

	#[test]
	fn parses_a_complete_config() {
		let config: Config = EXAMPLE.parse().unwrap();
		assert_eq!(config.storefront.id, "industrial-storefront");
		assert_eq!(config.storefront.event_capacity, 256);
		assert_eq!(config.storage.primary, "memory");
		assert!(config.api_table().is_some());
	}

	#[test]
	fn rejects_primary_without_a_table() {
		let bad = EXAMPLE.replace(r#"primary = "memory""#, r#"primary = "file""#);
		let err = bad.parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn resolves_environment_placeholders() {
		std::env::set_var("STOREFRONT_TEST_BASE_URL", "https://resolved.example.com");
		let content = EXAMPLE.replace(
			"https://backend.example.com/api",
			"${STOREFRONT_TEST_BASE_URL}",
		);
		let config: Config = content.parse().unwrap();
		let table = config.api_table().unwrap();
		assert_eq!(
			table.get("base_url").and_then(|v| v.as_str()),
			Some("https://resolved.example.com")
		);
	}

	#[test]
	fn unset_environment_variable_is_an_error() {
		let content = EXAMPLE.replace(
			"https://backend.example.com/api",
			"${STOREFRONT_TEST_UNSET_VAR}",
		);
		assert!(content.parse::<Config>().is_err());
	}

	#[tokio::test]
	async fn loads_from_a_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, EXAMPLE).unwrap();
		let config = Config::from_file_async(&path).await.unwrap();
		assert_eq!(config.api.implementation, "http");
	}
}
