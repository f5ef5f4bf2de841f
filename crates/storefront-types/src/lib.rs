//! Common types module for the storefront system.
//!
//! This module defines the core data types and structures used throughout
//! the storefront client. It provides a centralized location for shared
//! types to ensure consistency across all storefront components.

/// Session and user profile types for authentication.
pub mod auth;
/// Cart line types for the shopping cart store.
pub mod cart;
/// Checkout draft, request and response types.
pub mod checkout;
/// Event bus for inter-component communication.
pub mod event_bus;
/// Event types published by the stores.
pub mod events;
/// Notification records a toast layer would render.
pub mod notification;
/// Product and category catalog types.
pub mod product;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Secure string type for session tokens.
pub mod secret_string;
/// Storage namespace keys for persisted client state.
pub mod storage;
/// Configuration validation types for implementation tables.
pub mod validation;

// Re-export all types for convenient access
pub use auth::*;
pub use cart::*;
pub use checkout::*;
pub use event_bus::EventBus;
pub use events::*;
pub use notification::*;
pub use product::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use storage::*;
pub use validation::*;
