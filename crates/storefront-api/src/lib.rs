//! Remote backend client module for the storefront.
//!
//! This module handles every call the client makes to the remote backend:
//! catalog reads (products and categories), the single order-creation
//! operation, and the authentication endpoints. It provides an abstraction
//! over the transport so the stores can be exercised against a scriptable
//! in-memory backend in tests.

use async_trait::async_trait;
use storefront_types::{
	Category, CheckoutRequest, CheckoutResponse, ConfigSchema, ImplementationRegistry, Product,
	ProductFilter, Registration, Session,
};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod mock;
}

/// Errors that can occur during backend API operations.
#[derive(Debug, Error)]
pub enum ApiError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Error carried by a non-success HTTP status.
	#[error("HTTP {status}: {message}")]
	Status { status: u16, message: String },
	/// Error that occurs when a referenced entity does not exist.
	#[error("Not found")]
	NotFound,
	/// Error that occurs when a response body cannot be decoded.
	#[error("Deserialization error: {0}")]
	Deserialization(String),
	/// Error that occurs when credentials are rejected.
	#[error("Unauthorized: {0}")]
	Unauthorized(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface to the remote backend.
///
/// This trait must be implemented by any backend client that wants to serve
/// the storefront. One method per remote operation; the order-creation call
/// is the only write the checkout core performs.
#[async_trait]
pub trait BackendInterface: Send + Sync {
	/// Returns the configuration schema for this backend implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Retrieves a single product by id.
	///
	/// Returns [`ApiError::NotFound`] when the backend has no such product.
	async fn get_product(&self, id: u64) -> Result<Product, ApiError>;

	/// Lists products matching the given filter.
	async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError>;

	/// Retrieves a single category by id.
	async fn get_category(&self, id: u64) -> Result<Category, ApiError>;

	/// Lists all categories.
	async fn list_categories(&self) -> Result<Vec<Category>, ApiError>;

	/// Performs the single order-creation call.
	///
	/// A transport-level failure is an `Err`; a business-level rejection is
	/// an `Ok` response with `is_success == false` and the server's message.
	async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutResponse, ApiError>;

	/// Authenticates with email and password, returning a session.
	async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError>;

	/// Registers a new account and signs it in.
	async fn register(&self, registration: &Registration) -> Result<Session, ApiError>;
}

// Shared handles satisfy the interface too, so a caller can keep a concrete
// handle to an implementation (e.g. the scriptable mock) while the service
// owns another.
#[async_trait]
impl<T: BackendInterface + ?Sized> BackendInterface for std::sync::Arc<T> {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		(**self).config_schema()
	}

	async fn get_product(&self, id: u64) -> Result<Product, ApiError> {
		(**self).get_product(id).await
	}

	async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
		(**self).list_products(filter).await
	}

	async fn get_category(&self, id: u64) -> Result<Category, ApiError> {
		(**self).get_category(id).await
	}

	async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
		(**self).list_categories().await
	}

	async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutResponse, ApiError> {
		(**self).checkout(request).await
	}

	async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
		(**self).login(email, password).await
	}

	async fn register(&self, registration: &Registration) -> Result<Session, ApiError> {
		(**self).register(registration).await
	}
}

/// Type alias for backend factory functions.
///
/// This is the function signature that all backend implementations must
/// provide to create instances of their interface.
pub type BackendFactory = fn(&toml::Value) -> Result<Box<dyn BackendInterface>, ApiError>;

/// Registry trait for backend implementations.
pub trait BackendRegistry: ImplementationRegistry<Factory = BackendFactory> {}

/// Get all registered backend implementations.
///
/// Returns a vector of (name, factory) tuples for all available backend
/// implementations.
pub fn get_all_implementations() -> Vec<(&'static str, BackendFactory)> {
	use implementations::{http, mock};

	vec![
		(http::Registry::NAME, http::Registry::factory()),
		(mock::Registry::NAME, mock::Registry::factory()),
	]
}

/// Service that fronts the configured backend implementation.
///
/// The BackendService owns the boxed implementation and is shared by every
/// component that talks to the backend. It adds nothing over the interface
/// today beyond a stable, concrete type to hold in `Arc`s.
pub struct BackendService {
	/// The underlying backend implementation.
	implementation: Box<dyn BackendInterface>,
}

impl BackendService {
	/// Creates a new BackendService with the specified implementation.
	pub fn new(implementation: Box<dyn BackendInterface>) -> Self {
		Self { implementation }
	}

	/// Retrieves a single product by id.
	pub async fn get_product(&self, id: u64) -> Result<Product, ApiError> {
		self.implementation.get_product(id).await
	}

	/// Lists products matching the given filter.
	pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
		self.implementation.list_products(filter).await
	}

	/// Retrieves a single category by id.
	pub async fn get_category(&self, id: u64) -> Result<Category, ApiError> {
		self.implementation.get_category(id).await
	}

	/// Lists all categories.
	pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
		self.implementation.list_categories().await
	}

	/// Performs the single order-creation call.
	pub async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutResponse, ApiError> {
		self.implementation.checkout(request).await
	}

	/// Authenticates with email and password, returning a session.
	pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
		self.implementation.login(email, password).await
	}

	/// Registers a new account and signs it in.
	pub async fn register(&self, registration: &Registration) -> Result<Session, ApiError> {
		self.implementation.register(registration).await
	}
}
