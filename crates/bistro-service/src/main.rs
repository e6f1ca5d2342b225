//! Main entry point for the bistro ordering service.
//!
//! This binary wires the storage backend, the domain engine, and the HTTP
//! API together: it loads configuration, seeds the identity directory, and
//! serves the ordering API until interrupted.

use bistro_config::Config;
use bistro_core::Engine;
use bistro_storage::Store;
use bistro_types::User;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

/// Command-line arguments for the ordering service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the ordering service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the storage backend and seeds the identity directory
/// 5. Serves the HTTP API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config_path = args
		.config
		.to_str()
		.ok_or("configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let store = build_store(&config)?;
	seed_identity(store.as_ref(), &config).await?;

	let engine = Arc::new(Engine::new(store));

	if !config.api.enabled {
		tracing::warn!("API server disabled in configuration; nothing to do");
		return Ok(());
	}

	server::start_server(config, engine).await?;

	tracing::info!("Stopped service");
	Ok(())
}

/// Resolves the primary storage backend from the implementation registry.
fn build_store(config: &Config) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
	let primary = config.storage.primary.as_str();
	let backend_config = config.primary_storage_config();

	for (name, factory) in bistro_storage::get_all_implementations() {
		if name == primary {
			tracing::info!(backend = name, "Storage backend selected");
			return Ok(factory(&backend_config)?);
		}
	}

	Err(format!("unknown storage backend '{}'", primary).into())
}

/// Seeds the user directory and bootstrap group memberships.
async fn seed_identity(
	store: &dyn Store,
	config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
	let users: Vec<User> = config
		.identity
		.users
		.iter()
		.map(|u| User {
			id: u.id,
			username: u.username.clone(),
		})
		.collect();

	tracing::info!(users = users.len(), "Seeding identity directory");
	bistro_core::identity::seed_directory(store, users, &config.identity.groups).await?;
	Ok(())
}
