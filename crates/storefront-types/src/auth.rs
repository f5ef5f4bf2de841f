//! Session and user profile types for authentication.

use crate::SecretString;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile of the authenticated user as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	/// Backend identifier.
	pub id: String,
	/// Given name.
	pub first_name: String,
	/// Family name.
	pub last_name: String,
	/// Email address, also the login identifier.
	pub email: String,
	/// Contact phone number.
	#[serde(default)]
	pub phone_number: String,
	/// Default delivery address.
	#[serde(default)]
	pub address: String,
	/// Role granted by the backend, e.g. "User" or "Admin".
	#[serde(default)]
	pub roles: String,
}

/// An established, client-persisted session.
///
/// The token is a [`SecretString`] so it never leaks through Debug output
/// or logs; expiry is checked locally before the session is trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
	/// Bearer token for authenticated backend calls.
	pub token: SecretString,
	/// Profile of the signed-in user.
	pub user: UserProfile,
	/// Instant after which the token is no longer valid.
	pub expires_at: DateTime<Utc>,
}

impl Session {
	/// Whether the session is still valid at the given instant.
	pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
		now < self.expires_at
	}
}

/// Payload for registering a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
	pub first_name: String,
	pub last_name: String,
	pub email: String,
	pub phone_number: String,
	pub address: String,
	pub password: String,
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;

	fn session(expires_at: DateTime<Utc>) -> Session {
		Session {
			token: SecretString::from("token"),
			user: UserProfile {
				id: "u-1".into(),
				first_name: "Dana".into(),
				last_name: "Reed".into(),
				email: "dana@example.com".into(),
				phone_number: String::new(),
				address: String::new(),
				roles: "User".into(),
			},
			expires_at,
		}
	}

	#[test]
	fn session_validity_is_bounded_by_expiry() {
		let now = Utc::now();
		assert!(session(now + Duration::hours(1)).is_valid_at(now));
		assert!(!session(now - Duration::seconds(1)).is_valid_at(now));
	}
}
