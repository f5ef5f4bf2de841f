//! Main entry point for the storefront CLI.
//!
//! This binary wires the storefront core from a TOML configuration file and
//! exposes its operations as subcommands: browsing the catalog, mutating the
//! persisted cart, driving the multi-step checkout, and managing the
//! session. With the file storage backend configured, cart and draft state
//! persist across invocations the way browser-local storage persists across
//! page loads.

use clap::Parser;
use std::path::PathBuf;
use storefront_config::Config;
use storefront_core::Storefront;

mod commands;

use commands::Command;

/// Command-line arguments for the storefront CLI.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "warn")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

/// Main entry point for the storefront CLI.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the storefront with all registered implementations
/// 5. Dispatches the requested subcommand
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	// Load configuration
	let config = Config::from_file_async(&args.config).await?;
	tracing::info!("Loaded configuration [{}]", config.storefront.id);

	// Build the storefront with all registered implementations
	let storefront = build_storefront(config).await?;

	commands::run(&storefront, args.command).await?;

	Ok(())
}

/// Builds the storefront, registering every available implementation.
async fn build_storefront(config: Config) -> Result<Storefront, storefront_core::CoreError> {
	let mut builder = Storefront::builder(config);
	for (name, factory) in storefront_storage::get_all_implementations() {
		builder = builder.with_storage_factory(name, factory);
	}
	for (name, factory) in storefront_api::get_all_implementations() {
		builder = builder.with_backend_factory(name, factory);
	}
	builder.build().await
}
