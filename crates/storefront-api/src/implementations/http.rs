//! HTTP backend implementation using reqwest.
//!
//! Talks JSON to the remote storefront backend. The endpoint layout mirrors
//! the backend's route table: catalog reads under `/products` and
//! `/categories`, order creation at `/Orders/Checkout`, and authentication
//! under `/Authentication`.

use crate::{ApiError, BackendFactory, BackendInterface, BackendRegistry};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::time::Duration as StdDuration;
use storefront_types::{
	Category, CheckoutRequest, CheckoutResponse, ConfigSchema, Field, FieldType,
	ImplementationRegistry, Product, ProductFilter, ProductSort, Registration, Schema,
	SecretString, Session, UserProfile, ValidationError,
};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fallback session lifetime when the token carries no usable expiry.
const FALLBACK_SESSION_HOURS: i64 = 24;

/// HTTP client for the remote storefront backend.
pub struct HttpBackend {
	client: reqwest::Client,
	base_url: String,
}

impl HttpBackend {
	/// Creates a new HTTP backend against the given base URL.
	pub fn new(base_url: impl Into<String>, timeout: StdDuration) -> Result<Self, ApiError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ApiError::Configuration(e.to_string()))?;
		Ok(Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
		})
	}

	fn url(&self, path: &str) -> String {
		format!("{}/{}", self.base_url, path.trim_start_matches('/'))
	}

	async fn get_json<T: serde::de::DeserializeOwned>(
		&self,
		path: &str,
		query: &[(&str, String)],
	) -> Result<T, ApiError> {
		let response = self
			.client
			.get(self.url(path))
			.query(query)
			.send()
			.await
			.map_err(|e| ApiError::Network(e.to_string()))?;
		decode_json(response).await
	}

	async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
		&self,
		path: &str,
		body: &B,
	) -> Result<T, ApiError> {
		let response = self
			.client
			.post(self.url(path))
			.json(body)
			.send()
			.await
			.map_err(|e| ApiError::Network(e.to_string()))?;
		decode_json(response).await
	}
}

/// Maps a response to a decoded body or the appropriate [`ApiError`].
async fn decode_json<T: serde::de::DeserializeOwned>(
	response: reqwest::Response,
) -> Result<T, ApiError> {
	let status = response.status();
	if status == reqwest::StatusCode::NOT_FOUND {
		return Err(ApiError::NotFound);
	}
	if status == reqwest::StatusCode::UNAUTHORIZED {
		let message = response.text().await.unwrap_or_default();
		return Err(ApiError::Unauthorized(message));
	}
	if !status.is_success() {
		let message = response.text().await.unwrap_or_default();
		return Err(ApiError::Status {
			status: status.as_u16(),
			message,
		});
	}
	response
		.json::<T>()
		.await
		.map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Wire shape of the authentication endpoints' response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
	id: String,
	first_name: String,
	last_name: String,
	email: String,
	#[serde(default)]
	phone_number: String,
	#[serde(default)]
	address: String,
	#[serde(default)]
	roles: String,
	token: String,
}

impl LoginResponse {
	fn into_session(self) -> Session {
		let expires_at = token_expiry(&self.token)
			.unwrap_or_else(|| Utc::now() + Duration::hours(FALLBACK_SESSION_HOURS));
		Session {
			token: SecretString::new(self.token),
			user: UserProfile {
				id: self.id,
				first_name: self.first_name,
				last_name: self.last_name,
				email: self.email,
				phone_number: self.phone_number,
				address: self.address,
				roles: self.roles,
			},
			expires_at,
		}
	}
}

/// Extracts the `exp` claim from a JWT without verifying its signature.
///
/// Expiry is only used client-side to decide when to drop the persisted
/// session; the backend remains the authority on token validity.
fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
	let payload = token.split('.').nth(1)?;
	let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
	let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
	let exp = claims.get("exp")?.as_i64()?;
	DateTime::from_timestamp(exp, 0)
}

fn sort_params(sort: ProductSort) -> (&'static str, &'static str) {
	match sort {
		ProductSort::Name => ("name", "asc"),
		ProductSort::PriceLowHigh => ("price", "asc"),
		ProductSort::PriceHighLow => ("price", "desc"),
	}
}

#[async_trait]
impl BackendInterface for HttpBackend {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpBackendSchema)
	}

	async fn get_product(&self, id: u64) -> Result<Product, ApiError> {
		self.get_json(&format!("products/{}", id), &[]).await
	}

	async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
		let mut query: Vec<(&str, String)> = Vec::new();
		if let Some(category) = &filter.category {
			query.push(("category", category.clone()));
		}
		if let Some(search) = &filter.search {
			query.push(("q", search.clone()));
		}
		if let Some(page) = filter.page {
			query.push(("_page", page.to_string()));
		}
		if let Some(limit) = filter.limit {
			query.push(("_limit", limit.to_string()));
		}
		if let Some(sort) = filter.sort {
			let (field, order) = sort_params(sort);
			query.push(("_sort", field.to_string()));
			query.push(("_order", order.to_string()));
		}
		self.get_json("products", &query).await
	}

	async fn get_category(&self, id: u64) -> Result<Category, ApiError> {
		self.get_json(&format!("categories/{}", id), &[]).await
	}

	async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
		self.get_json("categories", &[]).await
	}

	async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutResponse, ApiError> {
		self.post_json("Orders/Checkout", request).await
	}

	async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
		let body = serde_json::json!({ "email": email, "password": password });
		let response: LoginResponse = self.post_json("Authentication/Login", &body).await?;
		Ok(response.into_session())
	}

	async fn register(&self, registration: &Registration) -> Result<Session, ApiError> {
		let response: LoginResponse = self
			.post_json("Authentication/Register", registration)
			.await?;
		Ok(response.into_session())
	}
}

/// Configuration schema for the HTTP backend.
pub struct HttpBackendSchema;

impl ConfigSchema for HttpBackendSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("base_url", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(s) if s.starts_with("http://") || s.starts_with("https://") => Ok(()),
						_ => Err("must be an http(s) URL".to_string()),
					}
				}),
			],
			vec![Field::new(
				"timeout_seconds",
				FieldType::Integer {
					min: Some(1),
					max: Some(300),
				},
			)],
		);
		schema.validate(config)
	}
}

/// Factory function to create an HTTP backend from configuration.
///
/// Configuration parameters:
/// - `base_url`: backend root URL (required)
/// - `timeout_seconds`: request timeout, defaults to 30
pub fn create_backend(config: &toml::Value) -> Result<Box<dyn BackendInterface>, ApiError> {
	let base_url = config
		.get("base_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| ApiError::Configuration("'base_url' is required".to_string()))?;
	let timeout = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.map(|secs| StdDuration::from_secs(secs.max(1) as u64))
		.unwrap_or(StdDuration::from_secs(DEFAULT_TIMEOUT_SECS));
	Ok(Box::new(HttpBackend::new(base_url, timeout)?))
}

/// Registry entry for the HTTP backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = BackendFactory;

	fn factory() -> Self::Factory {
		create_backend
	}
}

impl BackendRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn token_expiry_reads_the_exp_claim() {
		// header/payload are unsigned; only the payload matters here.
		let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"u-1","exp":4102444800}"#);
		let token = format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", payload);
		let expiry = token_expiry(&token).unwrap();
		assert_eq!(expiry.timestamp(), 4_102_444_800);
	}

	#[test]
	fn malformed_tokens_yield_no_expiry() {
		assert!(token_expiry("not-a-jwt").is_none());
		assert!(token_expiry("a.b.c").is_none());
	}

	#[test]
	fn schema_rejects_non_http_urls() {
		let schema = HttpBackendSchema;
		assert!(schema
			.validate(&r#"base_url = "https://backend.example.com""#.parse().unwrap())
			.is_ok());
		assert!(schema
			.validate(&r#"base_url = "ftp://backend.example.com""#.parse().unwrap())
			.is_err());
	}

	#[test]
	fn base_url_trailing_slash_is_normalized() {
		let backend =
			HttpBackend::new("https://backend.example.com/api/", StdDuration::from_secs(5))
				.unwrap();
		assert_eq!(
			backend.url("products/3"),
			"https://backend.example.com/api/products/3"
		);
	}
}
