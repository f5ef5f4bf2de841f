//! Cart line types for the shopping cart store.

use crate::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One (product, quantity) pairing in the cart.
///
/// The embedded product is a snapshot taken when the line was created;
/// price changes on the backend do not affect lines already in the cart.
/// The cart store maintains the invariant that at most one line exists per
/// product id and that `quantity >= 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
	/// Product snapshot held by this line.
	pub product: Product,
	/// Number of units, always at least 1.
	pub quantity: u32,
}

impl CartLine {
	/// Price of this line: snapshot unit price times quantity.
	pub fn line_total(&self) -> Decimal {
		self.product.price * Decimal::from(self.quantity)
	}
}
