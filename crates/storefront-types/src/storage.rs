//! Storage namespace keys for persisted client state.

use std::str::FromStr;

/// Storage namespaces for the client-local blobs.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants. Each variant is an
/// independent JSON blob: the cart and the checkout draft are persisted
/// separately, as is the authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// The serialized cart (array of cart lines).
	Cart,
	/// The serialized checkout draft (field map).
	CheckoutDraft,
	/// The authenticated session (token and profile).
	Session,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Cart => "cart",
			StorageKey::CheckoutDraft => "checkout_draft",
			StorageKey::Session => "session",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[Self::Cart, Self::CheckoutDraft, Self::Session].into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"cart" => Ok(Self::Cart),
			"checkout_draft" => Ok(Self::CheckoutDraft),
			"session" => Ok(Self::Session),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}
