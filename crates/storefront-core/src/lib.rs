//! Core wiring for the storefront client.
//!
//! This module assembles the storefront from its parts: it resolves the
//! configured storage backend and API implementation through registered
//! factories, validates their configuration tables, and hands out the wired
//! [`Storefront`] that views drive. No component here holds hidden global
//! state; everything a consumer needs is reachable from the `Storefront` it
//! was given.

use std::collections::HashMap;
use std::sync::Arc;
use storefront_api::{BackendFactory, BackendService};
use storefront_auth::AuthService;
use storefront_cart::CartService;
use storefront_checkout::CheckoutFlow;
use storefront_config::Config;
use storefront_storage::{StorageFactory, StorageService};
use storefront_types::{EventBus, ProductStatus};
use thiserror::Error;

pub mod notifier;

pub use notifier::{notification_for, Notifier};

/// Errors that can occur while wiring the storefront.
#[derive(Debug, Error)]
pub enum CoreError {
	/// Error related to configuration issues.
	#[error("Configuration error: {0}")]
	Config(String),
}

/// The wired storefront session.
///
/// Owns the shared services and the event bus. Views receive this by
/// reference (or clone the `Arc`s they need) instead of reaching for
/// process-wide singletons.
pub struct Storefront {
	config: Config,
	storage: Arc<StorageService>,
	backend: Arc<BackendService>,
	cart: Arc<CartService>,
	auth: Arc<AuthService>,
	notifier: Notifier,
	events: EventBus,
}

impl std::fmt::Debug for Storefront {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Storefront").finish_non_exhaustive()
	}
}

impl Storefront {
	/// Starts building a storefront from configuration.
	pub fn builder(config: Config) -> StorefrontBuilder {
		StorefrontBuilder::new(config)
	}

	/// Returns a reference to the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns the shared storage service.
	pub fn storage(&self) -> &Arc<StorageService> {
		&self.storage
	}

	/// Returns the shared backend client.
	pub fn backend(&self) -> &Arc<BackendService> {
		&self.backend
	}

	/// Returns the shared cart store.
	pub fn cart(&self) -> &Arc<CartService> {
		&self.cart
	}

	/// Returns the shared auth service.
	pub fn auth(&self) -> &Arc<AuthService> {
		&self.auth
	}

	/// Returns the notification fan-out.
	pub fn notifier(&self) -> &Notifier {
		&self.notifier
	}

	/// Returns a reference to the event bus.
	pub fn events(&self) -> &EventBus {
		&self.events
	}

	/// Starts a checkout flow for the given product.
	///
	/// The product id and status come from the product page that initiated
	/// the checkout, exactly as the original passed them through its route.
	pub async fn begin_checkout(&self, product_id: u64, status: ProductStatus) -> CheckoutFlow {
		CheckoutFlow::begin(
			product_id,
			status,
			self.storage.clone(),
			self.backend.clone(),
			self.cart.clone(),
			self.events.clone(),
		)
		.await
	}
}

/// Builder for constructing a [`Storefront`] with pluggable implementations.
///
/// The builder uses the factory pattern to allow different implementations
/// of storage and backend access to be plugged in based on configuration.
pub struct StorefrontBuilder {
	config: Config,
	storage_factories: HashMap<String, StorageFactory>,
	backend_factories: HashMap<String, BackendFactory>,
}

impl StorefrontBuilder {
	/// Creates a new builder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self {
			config,
			storage_factories: HashMap::new(),
			backend_factories: HashMap::new(),
		}
	}

	/// Adds a factory function for creating storage backends.
	///
	/// The name should match the implementation name in the configuration.
	pub fn with_storage_factory(mut self, name: &str, factory: StorageFactory) -> Self {
		self.storage_factories.insert(name.to_string(), factory);
		self
	}

	/// Adds a factory function for creating backend API clients.
	///
	/// The name should match the implementation name in the configuration.
	pub fn with_backend_factory(mut self, name: &str, factory: BackendFactory) -> Self {
		self.backend_factories.insert(name.to_string(), factory);
		self
	}

	/// Builds the storefront using the configured factories.
	///
	/// This method creates the storage and backend implementations,
	/// validates their configuration tables against the schemas they
	/// publish, hydrates the cart, and wires everything to one event bus.
	pub async fn build(self) -> Result<Storefront, CoreError> {
		self.config
			.validate()
			.map_err(|e| CoreError::Config(e.to_string()))?;

		// Storage backend
		let storage_name = self.config.storage.primary.clone();
		let storage_factory = self.storage_factories.get(&storage_name).ok_or_else(|| {
			CoreError::Config(format!("Unknown storage implementation '{}'", storage_name))
		})?;
		let storage_table = self
			.config
			.storage_table()
			.ok_or_else(|| CoreError::Config(format!("No configuration table for '{}'", storage_name)))?;
		let storage_backend = storage_factory(storage_table).map_err(|e| {
			tracing::error!(component = "storage", implementation = %storage_name, error = %e, "Failed to create storage backend");
			CoreError::Config(format!(
				"Failed to create storage backend '{}': {}",
				storage_name, e
			))
		})?;
		storage_backend
			.config_schema()
			.validate(storage_table)
			.map_err(|e| {
				CoreError::Config(format!(
					"Invalid configuration for storage backend '{}': {}",
					storage_name, e
				))
			})?;
		let storage = Arc::new(StorageService::new(storage_backend));
		tracing::info!(component = "storage", implementation = %storage_name, "Loaded");

		// Backend API client
		let api_name = self.config.api.implementation.clone();
		let backend_factory = self.backend_factories.get(&api_name).ok_or_else(|| {
			CoreError::Config(format!("Unknown API implementation '{}'", api_name))
		})?;
		let api_table = self
			.config
			.api_table()
			.ok_or_else(|| CoreError::Config(format!("No configuration table for '{}'", api_name)))?;
		let backend_impl = backend_factory(api_table).map_err(|e| {
			tracing::error!(component = "api", implementation = %api_name, error = %e, "Failed to create API client");
			CoreError::Config(format!(
				"Failed to create API client '{}': {}",
				api_name, e
			))
		})?;
		backend_impl
			.config_schema()
			.validate(api_table)
			.map_err(|e| {
				CoreError::Config(format!(
					"Invalid configuration for API client '{}': {}",
					api_name, e
				))
			})?;
		let backend = Arc::new(BackendService::new(backend_impl));
		tracing::info!(component = "api", implementation = %api_name, "Loaded");

		// Shared event bus, stores and session management
		let events = EventBus::new(self.config.storefront.event_capacity);
		let notifier = Notifier::spawn(&events);
		let cart = Arc::new(CartService::hydrate(storage.clone(), events.clone()).await);
		let auth = Arc::new(AuthService::new(
			backend.clone(),
			storage.clone(),
			events.clone(),
		));
		tracing::info!(storefront = %self.config.storefront.id, "Storefront ready");

		Ok(Storefront {
			config: self.config,
			storage,
			backend,
			cart,
			auth,
			notifier,
			events,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config(storage: &str, api: &str) -> Config {
		format!(
			r#"
			[storefront]
			id = "test-storefront"

			[storage]
			primary = "{storage}"
			[storage.implementations.memory]
			[storage.implementations.file]
			root = "/tmp/storefront-test"

			[api]
			implementation = "{api}"
			[api.implementations.mock]
			"#
		)
		.parse()
		.unwrap()
	}

	fn builder(config: Config) -> StorefrontBuilder {
		let mut builder = Storefront::builder(config);
		for (name, factory) in storefront_storage::get_all_implementations() {
			builder = builder.with_storage_factory(name, factory);
		}
		for (name, factory) in storefront_api::get_all_implementations() {
			builder = builder.with_backend_factory(name, factory);
		}
		builder
	}

	#[tokio::test]
	async fn builds_a_working_storefront_from_config() {
		let storefront = builder(config("memory", "mock")).build().await.unwrap();

		// The factory-created mock serves the demo catalog.
		let products = storefront
			.backend()
			.list_products(&Default::default())
			.await
			.unwrap();
		assert!(!products.is_empty());

		storefront.cart().add_item(&products[0], 1).await;
		assert_eq!(storefront.cart().item_count().await, 1);
	}

	#[tokio::test]
	async fn unknown_implementation_fails_the_build() {
		let mut config = config("memory", "mock");
		config.api.implementation = "grpc".to_string();
		config
			.api
			.implementations
			.insert("grpc".to_string(), "".parse::<toml::Value>().unwrap());

		let err = builder(config).build().await.unwrap_err();
		assert!(matches!(err, CoreError::Config(_)));
	}

	#[tokio::test]
	async fn checkout_flow_is_reachable_from_the_storefront() {
		let storefront = builder(config("memory", "mock")).build().await.unwrap();
		let flow = storefront
			.begin_checkout(1, ProductStatus::Purchase)
			.await;
		assert_eq!(flow.step(), storefront_checkout::FIRST_STEP);
	}
}
