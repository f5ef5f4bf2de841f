//! Event types for inter-component communication.
//!
//! This module defines the event system used by the storefront for
//! communication between the stores and whatever renders their outcomes.
//! Events flow through an event bus, allowing views to react to state
//! changes without the stores holding references to any UI.

use serde::{Deserialize, Serialize};

/// Main event type encompassing all storefront events.
///
/// Events are categorized by the component that produces them, allowing
/// consumers to filter and handle specific event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StorefrontEvent {
	/// Events from the cart store.
	Cart(CartEvent),
	/// Events from the checkout flow.
	Checkout(CheckoutEvent),
	/// Events from the auth service.
	Auth(AuthEvent),
}

/// Events related to cart mutations.
///
/// Every mutation that warrants a user-visible confirmation carries the
/// product name so the notification layer can render it without a lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CartEvent {
	/// A product was added to the cart (or merged into an existing line).
	LineAdded {
		product_id: u64,
		name: String,
		quantity: u32,
	},
	/// A line's quantity was set to a new value.
	QuantityUpdated { product_id: u64, quantity: u32 },
	/// A line was removed from the cart.
	LineRemoved { product_id: u64, name: String },
	/// The cart was emptied.
	Cleared,
}

/// Events related to checkout progression and submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CheckoutEvent {
	/// The buyer advanced to the given step.
	StepAdvanced { step: usize },
	/// Validation blocked the current step; the named fields are invalid.
	StepRejected { step: usize, fields: Vec<String> },
	/// The order API accepted the submission.
	SubmissionAccepted { product_id: u64, message: String },
	/// The order API reported a business-level rejection.
	SubmissionRejected { message: String },
	/// The submission failed at the transport level.
	SubmissionFailed { message: String },
	/// The referenced product could not be found before submission.
	ProductUnavailable { product_id: u64 },
}

/// Events related to authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuthEvent {
	/// A session was established.
	LoggedIn { email: String },
	/// A new account was registered and signed in.
	Registered { email: String },
	/// The session was discarded.
	LoggedOut,
}
