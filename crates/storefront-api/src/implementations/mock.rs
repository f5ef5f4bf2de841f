//! Mock backend implementation for testing and offline development.
//!
//! This implementation serves a small in-memory catalog and lets callers
//! script the outcome of the next checkout or login calls. It records every
//! checkout request it receives so tests can assert on exactly what would
//! have gone over the wire.

use crate::{ApiError, BackendFactory, BackendInterface, BackendRegistry};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use storefront_types::{
	Category, CheckoutRequest, CheckoutResponse, ConfigSchema, ImplementationRegistry, Product,
	ProductFilter, ProductSort, ProductStatus, Registration, Schema, SecretString, Session,
	UserProfile, ValidationError,
};
use tokio::sync::{Mutex, RwLock};

/// Scripted outcome for a checkout call.
#[derive(Debug, Clone)]
pub enum MockCheckoutOutcome {
	/// Transport succeeds and the order is created.
	Accept { message: String },
	/// Transport succeeds but the backend rejects the order.
	Reject { message: String },
	/// The call fails at the transport level.
	Fail { message: String },
}

/// Scriptable in-memory backend.
///
/// With no scripting, every checkout is accepted and logins succeed for
/// accounts registered through [`MockBackend::with_account`] or
/// [`BackendInterface::register`].
pub struct MockBackend {
	products: RwLock<HashMap<u64, Product>>,
	categories: RwLock<Vec<Category>>,
	accounts: RwLock<HashMap<String, String>>,
	checkout_script: Mutex<VecDeque<MockCheckoutOutcome>>,
	recorded_requests: Mutex<Vec<CheckoutRequest>>,
}

impl MockBackend {
	/// Creates an empty mock backend.
	pub fn new() -> Self {
		Self {
			products: RwLock::new(HashMap::new()),
			categories: RwLock::new(Vec::new()),
			accounts: RwLock::new(HashMap::new()),
			checkout_script: Mutex::new(VecDeque::new()),
			recorded_requests: Mutex::new(Vec::new()),
		}
	}

	/// Adds a product to the catalog.
	pub fn with_product(self, product: Product) -> Self {
		if let Ok(mut products) = self.products.try_write() {
			products.insert(product.id, product);
		}
		self
	}

	/// Adds a category to the catalog.
	pub fn with_category(self, category: Category) -> Self {
		if let Ok(mut categories) = self.categories.try_write() {
			categories.push(category);
		}
		self
	}

	/// Registers a login account.
	pub fn with_account(self, email: &str, password: &str) -> Self {
		if let Ok(mut accounts) = self.accounts.try_write() {
			accounts.insert(email.to_string(), password.to_string());
		}
		self
	}

	/// Scripts the outcome of the next checkout call. Outcomes are consumed
	/// in order; once the script is empty, checkouts are accepted.
	pub async fn script_checkout(&self, outcome: MockCheckoutOutcome) {
		self.checkout_script.lock().await.push_back(outcome);
	}

	/// Returns a copy of every checkout request received so far.
	pub async fn checkout_requests(&self) -> Vec<CheckoutRequest> {
		self.recorded_requests.lock().await.clone()
	}

	fn session_for(email: &str) -> Session {
		Session {
			token: SecretString::new(format!("mock-token-{}", uuid::Uuid::new_v4())),
			user: UserProfile {
				id: format!("mock-{}", email),
				first_name: "Mock".into(),
				last_name: "User".into(),
				email: email.to_string(),
				phone_number: String::new(),
				address: String::new(),
				roles: "User".into(),
			},
			expires_at: Utc::now() + Duration::hours(24),
		}
	}
}

impl Default for MockBackend {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl BackendInterface for MockBackend {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MockBackendSchema)
	}

	async fn get_product(&self, id: u64) -> Result<Product, ApiError> {
		let products = self.products.read().await;
		products.get(&id).cloned().ok_or(ApiError::NotFound)
	}

	async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
		let products = self.products.read().await;
		let mut listed: Vec<Product> = products
			.values()
			.filter(|p| {
				filter
					.category
					.as_ref()
					.map(|c| p.category.eq_ignore_ascii_case(c))
					.unwrap_or(true)
			})
			.filter(|p| {
				filter
					.search
					.as_ref()
					.map(|s| p.name.to_lowercase().contains(&s.to_lowercase()))
					.unwrap_or(true)
			})
			.cloned()
			.collect();

		match filter.sort {
			Some(ProductSort::Name) | None => listed.sort_by(|a, b| a.name.cmp(&b.name)),
			Some(ProductSort::PriceLowHigh) => listed.sort_by(|a, b| a.price.cmp(&b.price)),
			Some(ProductSort::PriceHighLow) => listed.sort_by(|a, b| b.price.cmp(&a.price)),
		}

		if let Some(limit) = filter.limit {
			let page = filter.page.unwrap_or(1).max(1) as usize;
			let limit = limit as usize;
			listed = listed
				.into_iter()
				.skip((page - 1) * limit)
				.take(limit)
				.collect();
		}

		Ok(listed)
	}

	async fn get_category(&self, id: u64) -> Result<Category, ApiError> {
		let categories = self.categories.read().await;
		categories
			.iter()
			.find(|c| c.id == id)
			.cloned()
			.ok_or(ApiError::NotFound)
	}

	async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
		Ok(self.categories.read().await.clone())
	}

	async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutResponse, ApiError> {
		let outcome = self
			.checkout_script
			.lock()
			.await
			.pop_front()
			.unwrap_or(MockCheckoutOutcome::Accept {
				message: "Order created successfully".to_string(),
			});

		match outcome {
			MockCheckoutOutcome::Fail { message } => Err(ApiError::Network(message)),
			MockCheckoutOutcome::Accept { message } => {
				self.recorded_requests.lock().await.push(request.clone());
				Ok(CheckoutResponse {
					is_success: true,
					message,
					data: None,
				})
			}
			MockCheckoutOutcome::Reject { message } => {
				self.recorded_requests.lock().await.push(request.clone());
				Ok(CheckoutResponse {
					is_success: false,
					message,
					data: None,
				})
			}
		}
	}

	async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
		let accounts = self.accounts.read().await;
		match accounts.get(email) {
			Some(stored) if stored == password => Ok(Self::session_for(email)),
			_ => Err(ApiError::Unauthorized(
				"invalid email or password".to_string(),
			)),
		}
	}

	async fn register(&self, registration: &Registration) -> Result<Session, ApiError> {
		let mut accounts = self.accounts.write().await;
		if accounts.contains_key(&registration.email) {
			return Err(ApiError::Status {
				status: 409,
				message: "account already exists".to_string(),
			});
		}
		accounts.insert(registration.email.clone(), registration.password.clone());
		Ok(Self::session_for(&registration.email))
	}
}

/// Configuration schema for the mock backend.
pub struct MockBackendSchema;

impl ConfigSchema for MockBackendSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// The mock backend has no required configuration
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)
	}
}

/// Demo catalog served by factory-created mocks, so the CLI works offline.
fn demo_catalog() -> (Vec<Product>, Vec<Category>) {
	let categories = vec![
		Category {
			id: 1,
			name: "Excavation".into(),
			description: "Diggers and trenchers".into(),
			image: String::new(),
			slug: "excavation".into(),
			product_count: 2,
		},
		Category {
			id: 2,
			name: "Power".into(),
			description: "Generators and compressors".into(),
			image: String::new(),
			slug: "power".into(),
			product_count: 1,
		},
	];
	let products = vec![
		Product {
			id: 1,
			name: "Crawler Excavator 320".into(),
			description: "20-ton hydraulic excavator".into(),
			price: Decimal::from(185_000u32),
			category_id: 1,
			category: "Excavation".into(),
			image: String::new(),
			stock: 3,
			status: ProductStatus::Purchase,
			brand: "Titan".into(),
			model: "TX-320".into(),
			rating: 4.6,
		},
		Product {
			id: 2,
			name: "Mini Excavator 35".into(),
			description: "3.5-ton compact excavator".into(),
			price: Decimal::from(320u32),
			category_id: 1,
			category: "Excavation".into(),
			image: String::new(),
			stock: 8,
			status: ProductStatus::Lease,
			brand: "Titan".into(),
			model: "TX-35".into(),
			rating: 4.8,
		},
		Product {
			id: 3,
			name: "Diesel Generator 150kVA".into(),
			description: "Standby diesel generator".into(),
			price: Decimal::from(24_500u32),
			category_id: 2,
			category: "Power".into(),
			image: String::new(),
			stock: 5,
			status: ProductStatus::LeaseOrPurchase,
			brand: "Voltra".into(),
			model: "VG-150".into(),
			rating: 4.2,
		},
	];
	(products, categories)
}

/// Factory function to create a mock backend from configuration.
///
/// Configuration parameters:
/// - None required; the backend is seeded with a small demo catalog.
pub fn create_backend(_config: &toml::Value) -> Result<Box<dyn BackendInterface>, ApiError> {
	let (products, categories) = demo_catalog();
	let mut backend = MockBackend::new();
	for product in products {
		backend = backend.with_product(product);
	}
	for category in categories {
		backend = backend.with_category(category);
	}
	Ok(Box::new(backend.with_account("demo@example.com", "demo")))
}

/// Registry entry for the mock backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "mock";
	type Factory = BackendFactory;

	fn factory() -> Self::Factory {
		create_backend
	}
}

impl BackendRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	fn request(product_id: u64) -> CheckoutRequest {
		CheckoutRequest {
			name: "Avery Cole".into(),
			email: "avery@example.com".into(),
			phone_number: "+1 555 0101".into(),
			address: "9 Quarry Lane".into(),
			rental_period: None,
			status: "purchase".into(),
			product_id,
		}
	}

	#[tokio::test]
	async fn scripted_outcomes_are_consumed_in_order() {
		let backend = MockBackend::new();
		backend
			.script_checkout(MockCheckoutOutcome::Reject {
				message: "out of stock".into(),
			})
			.await;

		let rejected = backend.checkout(&request(1)).await.unwrap();
		assert!(!rejected.is_success);
		assert_eq!(rejected.message, "out of stock");

		// Script exhausted: subsequent checkouts are accepted.
		let accepted = backend.checkout(&request(1)).await.unwrap();
		assert!(accepted.is_success);
		assert_eq!(backend.checkout_requests().await.len(), 2);
	}

	#[tokio::test]
	async fn transport_failures_record_nothing() {
		let backend = MockBackend::new();
		backend
			.script_checkout(MockCheckoutOutcome::Fail {
				message: "connection reset".into(),
			})
			.await;

		assert!(matches!(
			backend.checkout(&request(1)).await,
			Err(ApiError::Network(_))
		));
		assert!(backend.checkout_requests().await.is_empty());
	}

	#[tokio::test]
	async fn login_checks_registered_accounts() {
		let backend = MockBackend::new().with_account("dana@example.com", "hunter2");
		assert!(backend.login("dana@example.com", "hunter2").await.is_ok());
		assert!(matches!(
			backend.login("dana@example.com", "wrong").await,
			Err(ApiError::Unauthorized(_))
		));
	}

	#[tokio::test]
	async fn listing_filters_and_sorts() {
		let (products, _) = demo_catalog();
		let mut backend = MockBackend::new();
		for product in products {
			backend = backend.with_product(product);
		}

		let filter = ProductFilter {
			category: Some("excavation".into()),
			sort: Some(ProductSort::PriceHighLow),
			..Default::default()
		};
		let listed = backend.list_products(&filter).await.unwrap();
		assert_eq!(listed.len(), 2);
		assert!(listed[0].price >= listed[1].price);
	}
}
