//! Shopping cart store for the storefront client.
//!
//! The cart is the single source of truth for what the buyer intends to
//! buy, shared by the cart view, the checkout summary and the product
//! pages. It holds an in-memory list of (product, quantity) lines, mirrors
//! every mutation to persistent storage, and publishes an event for each
//! mutation so the notification layer can confirm it to the buyer.
//!
//! All operations are total functions over local state: there is no remote
//! call and thus no network failure mode. A persistence write that fails is
//! logged and otherwise ignored; the in-memory cart remains authoritative
//! for the session.

use rust_decimal::Decimal;
use std::sync::Arc;
use storefront_storage::StorageService;
use storefront_types::{CartEvent, CartLine, EventBus, Product, StorageKey, StorefrontEvent};
use tokio::sync::RwLock;

/// Id under which the cart blob is persisted within its namespace.
const CART_ID: &str = "default";

/// The cart store.
///
/// Mutations take `&self`; the line list lives behind a read-write lock and
/// each operation holds the write guard for its whole read-modify-write, so
/// no two mutations interleave.
pub struct CartService {
	lines: RwLock<Vec<CartLine>>,
	storage: Arc<StorageService>,
	events: EventBus,
}

impl CartService {
	/// Creates the cart store, hydrating it from persisted storage.
	///
	/// A missing or unreadable blob yields an empty cart; hydration is
	/// best-effort by design, mirroring a first visit or cleared profile.
	pub async fn hydrate(storage: Arc<StorageService>, events: EventBus) -> Self {
		let lines = match storage
			.retrieve::<Vec<CartLine>>(StorageKey::Cart.as_str(), CART_ID)
			.await
		{
			Ok(lines) => lines,
			Err(storefront_storage::StorageError::NotFound) => Vec::new(),
			Err(e) => {
				tracing::warn!(error = %e, "Failed to hydrate cart, starting empty");
				Vec::new()
			}
		};
		Self {
			lines: RwLock::new(lines),
			storage,
			events,
		}
	}

	/// Adds a product to the cart.
	///
	/// If a line for the product already exists its quantity is incremented
	/// by `quantity`; otherwise a new line is appended. Adding zero units is
	/// a no-op. Always persists afterwards and publishes a confirmation
	/// event.
	pub async fn add_item(&self, product: &Product, quantity: u32) {
		if quantity == 0 {
			return;
		}

		let snapshot = {
			let mut lines = self.lines.write().await;
			match lines.iter_mut().find(|l| l.product.id == product.id) {
				Some(line) => line.quantity += quantity,
				None => lines.push(CartLine {
					product: product.clone(),
					quantity,
				}),
			}
			lines.clone()
		};
		self.persist(&snapshot).await;

		self.events
			.publish(StorefrontEvent::Cart(CartEvent::LineAdded {
				product_id: product.id,
				name: product.name.clone(),
				quantity,
			}))
			.ok();
	}

	/// Sets a line's quantity exactly (not additive).
	///
	/// A quantity of zero removes the line. Setting the quantity of a
	/// product that is not in the cart is a no-op.
	pub async fn update_quantity(&self, product_id: u64, quantity: u32) {
		if quantity == 0 {
			self.remove_item(product_id).await;
			return;
		}

		let snapshot = {
			let mut lines = self.lines.write().await;
			match lines.iter_mut().find(|l| l.product.id == product_id) {
				Some(line) => line.quantity = quantity,
				None => return,
			}
			lines.clone()
		};
		self.persist(&snapshot).await;

		self.events
			.publish(StorefrontEvent::Cart(CartEvent::QuantityUpdated {
				product_id,
				quantity,
			}))
			.ok();
	}

	/// Removes the line for the given product, if present.
	///
	/// Publishes a confirmation naming the removed product; removing an
	/// absent product is a silent no-op, not an error.
	pub async fn remove_item(&self, product_id: u64) {
		let (name, snapshot) = {
			let mut lines = self.lines.write().await;
			let Some(index) = lines.iter().position(|l| l.product.id == product_id) else {
				return;
			};
			let removed = lines.remove(index);
			(removed.product.name, lines.clone())
		};
		self.persist(&snapshot).await;

		self.events
			.publish(StorefrontEvent::Cart(CartEvent::LineRemoved {
				product_id,
				name,
			}))
			.ok();
	}

	/// Empties the cart unconditionally.
	pub async fn clear(&self) {
		{
			let mut lines = self.lines.write().await;
			lines.clear();
		}
		self.persist(&[]).await;

		self.events
			.publish(StorefrontEvent::Cart(CartEvent::Cleared))
			.ok();
	}

	/// Sum over lines of unit price times quantity.
	///
	/// Uses the snapshot price held in each line's product reference, never
	/// a live re-fetch.
	pub async fn total(&self) -> Decimal {
		let lines = self.lines.read().await;
		lines.iter().map(CartLine::line_total).sum()
	}

	/// Sum of quantities across all lines (not the line count).
	pub async fn item_count(&self) -> u32 {
		let lines = self.lines.read().await;
		lines.iter().map(|l| l.quantity).sum()
	}

	/// Snapshot of the current lines.
	pub async fn lines(&self) -> Vec<CartLine> {
		self.lines.read().await.clone()
	}

	/// Writes the cart blob; failures are logged and swallowed.
	async fn persist(&self, lines: &[CartLine]) {
		if let Err(e) = self
			.storage
			.store(StorageKey::Cart.as_str(), CART_ID, &lines)
			.await
		{
			tracing::warn!(error = %e, "Failed to persist cart");
		}
	}
}
