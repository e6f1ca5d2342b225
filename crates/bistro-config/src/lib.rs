//! Configuration module for the bistro ordering service.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files and
//! provides validation to ensure all required values are properly set.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
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
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the ordering service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this service instance.
	pub service: ServiceConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for the HTTP API server.
	#[serde(default)]
	pub api: ApiConfig,
	/// Seeded identities standing in for the external auth service.
	pub identity: IdentityConfig,
}

/// Configuration specific to the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this service instance.
	pub id: String,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the HTTP server should be started.
	#[serde(default = "default_api_enabled")]
	pub enabled: bool,
	/// Host address to bind to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			enabled: default_api_enabled(),
			host: default_api_host(),
			port: default_api_port(),
		}
	}
}

fn default_api_enabled() -> bool {
	true
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	8080
}

/// Seeded identity directory.
///
/// Identity issuance is an external concern; this section carries the
/// bearer tokens that service has been told about, plus the initial group
/// memberships needed to bootstrap the first Manager.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityConfig {
	/// Users known to the service and their issued tokens.
	pub users: Vec<SeedUser>,
	/// Initial group memberships, keyed by group name.
	#[serde(default)]
	pub groups: HashMap<String, Vec<u64>>,
}

/// One seeded user with an externally issued bearer token.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedUser {
	pub id: u64,
	pub username: String,
	pub token: String,
}

impl Config {
	/// Loads configuration from a TOML file.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path).await?;
		content.parse()
	}

	/// Validates that all configuration values are consistent.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.is_empty() {
			return Err(ConfigError::Validation(
				"service.id cannot be empty".to_string(),
			));
		}

		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"storage.primary cannot be empty".to_string(),
			));
		}

		if self.api.enabled && self.api.port == 0 {
			return Err(ConfigError::Validation(
				"api.port cannot be 0".to_string(),
			));
		}

		let mut ids = HashSet::new();
		let mut tokens = HashSet::new();
		for user in &self.identity.users {
			if user.username.is_empty() {
				return Err(ConfigError::Validation(format!(
					"identity user {} has an empty username",
					user.id
				)));
			}
			if !ids.insert(user.id) {
				return Err(ConfigError::Validation(format!(
					"duplicate identity user id {}",
					user.id
				)));
			}
			if !tokens.insert(user.token.as_str()) {
				return Err(ConfigError::Validation(format!(
					"duplicate token for identity user {}",
					user.id
				)));
			}
		}

		for (group, members) in &self.identity.groups {
			for member in members {
				if !ids.contains(member) {
					return Err(ConfigError::Validation(format!(
						"group '{}' references unknown user id {}",
						group, member
					)));
				}
			}
		}

		Ok(())
	}

	/// Returns the configuration table for the primary storage backend,
	/// or an empty table when none was given.
	pub fn primary_storage_config(&self) -> toml::Value {
		self.storage
			.implementations
			.get(&self.storage.primary)
			.cloned()
			.unwrap_or(toml::Value::Table(Default::default()))
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let config: Config = toml::from_str(s)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const GOOD: &str = r#"
		[service]
		id = "bistro"

		[storage]
		primary = "memory"
		[storage.implementations.memory]

		[api]
		port = 8090

		[[identity.users]]
		id = 1
		username = "mia"
		token = "tok-mia"

		[[identity.users]]
		id = 2
		username = "dev"
		token = "tok-dev"

		[identity.groups]
		"Manager" = [1]
	"#;

	#[test]
	fn parses_and_validates() {
		let config: Config = GOOD.parse().unwrap();
		assert_eq!(config.service.id, "bistro");
		assert_eq!(config.api.port, 8090);
		assert!(config.api.enabled);
		assert_eq!(config.identity.groups["Manager"], vec![1]);
	}

	#[test]
	fn rejects_duplicate_tokens() {
		let bad = GOOD.replace("tok-dev", "tok-mia");
		let err = bad.parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn rejects_group_seed_with_unknown_user() {
		let bad = GOOD.replace("\"Manager\" = [1]", "\"Manager\" = [9]");
		let err = bad.parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn api_section_is_optional() {
		let minimal = r#"
			[service]
			id = "bistro"

			[storage]
			primary = "memory"

			[identity]
			users = []
		"#;
		let config: Config = minimal.parse().unwrap();
		assert_eq!(config.api.host, "127.0.0.1");
		assert_eq!(config.api.port, 8080);
	}

	#[tokio::test]
	async fn loads_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, GOOD).unwrap();

		let config = Config::from_file(path.to_str().unwrap()).await.unwrap();
		assert_eq!(config.identity.users.len(), 2);
	}
}
