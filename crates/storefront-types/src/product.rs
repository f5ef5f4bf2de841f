//! Product and category types for the storefront catalog.
//!
//! Products are read-only snapshots from the client's perspective: the cart
//! stores the product as it was at the time it was added, including its
//! price, and never re-fetches it for total calculations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sale mode of a product, supplied by the backend.
///
/// Only `Lease` transactions require a rental period at checkout. A product
/// offered as `LeaseOrPurchase` checks out as a purchase unless the backend
/// says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
	/// Product is sold outright.
	Purchase,
	/// Product is rented for a period chosen at checkout.
	Lease,
	/// Product is offered both ways.
	LeaseOrPurchase,
}

impl ProductStatus {
	/// Returns the string representation sent to the order API.
	pub fn as_str(&self) -> &'static str {
		match self {
			ProductStatus::Purchase => "purchase",
			ProductStatus::Lease => "lease",
			ProductStatus::LeaseOrPurchase => "lease_or_purchase",
		}
	}

	/// Whether checkout for this product must collect a rental period.
	pub fn requires_rental_period(&self) -> bool {
		matches!(self, ProductStatus::Lease)
	}
}

impl std::fmt::Display for ProductStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for ProductStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"purchase" => Ok(ProductStatus::Purchase),
			"lease" => Ok(ProductStatus::Lease),
			"lease_or_purchase" => Ok(ProductStatus::LeaseOrPurchase),
			other => Err(format!("unknown product status '{}'", other)),
		}
	}
}

/// A catalog product as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
	/// Backend identifier.
	pub id: u64,
	/// Display name.
	pub name: String,
	/// Long-form description.
	pub description: String,
	/// Unit price.
	pub price: Decimal,
	/// Identifier of the category this product belongs to.
	pub category_id: u64,
	/// Display name of the category.
	pub category: String,
	/// Primary image URL.
	#[serde(default)]
	pub image: String,
	/// Units available.
	pub stock: u32,
	/// Whether the product is sold, leased, or both.
	pub status: ProductStatus,
	/// Manufacturer brand.
	#[serde(default)]
	pub brand: String,
	/// Manufacturer model designation.
	#[serde(default)]
	pub model: String,
	/// Aggregate customer rating.
	#[serde(default)]
	pub rating: f32,
}

/// A catalog category as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
	/// Backend identifier.
	pub id: u64,
	/// Display name.
	pub name: String,
	/// Long-form description.
	#[serde(default)]
	pub description: String,
	/// Category image URL.
	#[serde(default)]
	pub image: String,
	/// URL slug.
	#[serde(default)]
	pub slug: String,
	/// Number of products in this category.
	#[serde(default)]
	pub product_count: u32,
}

/// Sort orders accepted by the product listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
	/// Alphabetical by name.
	Name,
	/// Cheapest first.
	PriceLowHigh,
	/// Most expensive first.
	PriceHighLow,
}

/// Filter parameters for listing products.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFilter {
	/// Restrict to a category slug.
	pub category: Option<String>,
	/// Free-text search term.
	pub search: Option<String>,
	/// Sort order.
	pub sort: Option<ProductSort>,
	/// 1-based page index.
	pub page: Option<u32>,
	/// Page size.
	pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_round_trips_through_strings() {
		for status in [
			ProductStatus::Purchase,
			ProductStatus::Lease,
			ProductStatus::LeaseOrPurchase,
		] {
			let parsed: ProductStatus = status.as_str().parse().unwrap();
			assert_eq!(parsed, status);
		}
		assert!("rent-to-own".parse::<ProductStatus>().is_err());
	}

	#[test]
	fn only_lease_requires_rental_period() {
		assert!(ProductStatus::Lease.requires_rental_period());
		assert!(!ProductStatus::Purchase.requires_rental_period());
		assert!(!ProductStatus::LeaseOrPurchase.requires_rental_period());
	}
}
