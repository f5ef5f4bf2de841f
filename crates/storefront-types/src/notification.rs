//! Notification records a toast layer would render.
//!
//! The storefront core never renders anything; it produces these records
//! from events and leaves presentation to the embedding application.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
	Success,
	Error,
	Info,
	Warning,
}

/// A single user-visible message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
	/// Unique id, usable by a renderer to dismiss or dedupe.
	pub id: Uuid,
	/// Message text.
	pub message: String,
	/// Severity.
	pub kind: NotificationKind,
}

impl Notification {
	/// Creates a notification with a fresh id.
	pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
		Self {
			id: Uuid::new_v4(),
			message: message.into(),
			kind,
		}
	}
}
