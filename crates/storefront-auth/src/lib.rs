//! Authentication module for the storefront client.
//!
//! Manages the user's session: signing in and registering against the
//! backend's authentication endpoints, persisting the resulting session,
//! and checking its expiry locally before trusting it. The backend remains
//! the authority on token validity; the local expiry check only decides
//! when to stop presenting a stale token.

use chrono::Utc;
use std::sync::Arc;
use storefront_api::{ApiError, BackendService};
use storefront_storage::StorageService;
use storefront_types::{
	AuthEvent, EventBus, Registration, Session, StorageKey, StorefrontEvent, UserProfile,
};
use thiserror::Error;

/// Id under which the session blob is persisted within its namespace.
const SESSION_ID: &str = "default";

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
	/// The backend rejected the credentials.
	#[error("Invalid credentials: {0}")]
	InvalidCredentials(String),
	/// The call failed at the transport level.
	#[error("Network error: {0}")]
	Network(String),
	/// The backend reported a request-level failure.
	#[error("Request failed: {0}")]
	Request(String),
}

impl From<ApiError> for AuthError {
	fn from(err: ApiError) -> Self {
		match err {
			ApiError::Unauthorized(message) => AuthError::InvalidCredentials(message),
			ApiError::Network(message) => AuthError::Network(message),
			other => AuthError::Request(other.to_string()),
		}
	}
}

/// Session manager for the storefront client.
pub struct AuthService {
	backend: Arc<BackendService>,
	storage: Arc<StorageService>,
	events: EventBus,
}

impl AuthService {
	/// Creates the auth service. No storage read happens here; the session
	/// is loaded lazily on each [`current_session`](Self::current_session)
	/// call so expiry is always evaluated against the current clock.
	pub fn new(backend: Arc<BackendService>, storage: Arc<StorageService>, events: EventBus) -> Self {
		Self {
			backend,
			storage,
			events,
		}
	}

	/// Signs in with email and password, persisting the session on success.
	pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
		let session = self.backend.login(email, password).await?;
		self.persist(&session).await;
		self.events
			.publish(StorefrontEvent::Auth(AuthEvent::LoggedIn {
				email: session.user.email.clone(),
			}))
			.ok();
		Ok(session.user)
	}

	/// Registers a new account and signs it in.
	pub async fn register(&self, registration: &Registration) -> Result<UserProfile, AuthError> {
		let session = self.backend.register(registration).await?;
		self.persist(&session).await;
		self.events
			.publish(StorefrontEvent::Auth(AuthEvent::Registered {
				email: session.user.email.clone(),
			}))
			.ok();
		Ok(session.user)
	}

	/// Discards the persisted session.
	pub async fn logout(&self) {
		if let Err(e) = self
			.storage
			.remove(StorageKey::Session.as_str(), SESSION_ID)
			.await
		{
			tracing::warn!(error = %e, "Failed to remove persisted session");
		}
		self.events
			.publish(StorefrontEvent::Auth(AuthEvent::LoggedOut))
			.ok();
	}

	/// Returns the persisted session if it exists and has not expired.
	///
	/// An expired session is removed from storage so it is not offered
	/// again.
	pub async fn current_session(&self) -> Option<Session> {
		let session = self
			.storage
			.retrieve::<Session>(StorageKey::Session.as_str(), SESSION_ID)
			.await
			.ok()?;

		if session.is_valid_at(Utc::now()) {
			Some(session)
		} else {
			tracing::debug!("Persisted session expired, discarding");
			if let Err(e) = self
				.storage
				.remove(StorageKey::Session.as_str(), SESSION_ID)
				.await
			{
				tracing::warn!(error = %e, "Failed to remove expired session");
			}
			None
		}
	}

	/// Whether a valid session currently exists.
	pub async fn is_authenticated(&self) -> bool {
		self.current_session().await.is_some()
	}

	async fn persist(&self, session: &Session) {
		if let Err(e) = self
			.storage
			.store(StorageKey::Session.as_str(), SESSION_ID, session)
			.await
		{
			tracing::warn!(error = %e, "Failed to persist session");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;
	use storefront_api::implementations::mock::MockBackend;
	use storefront_storage::implementations::memory::MemoryStorage;
	use storefront_types::SecretString;

	fn service(mock: MockBackend) -> (Arc<StorageService>, AuthService) {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let backend = Arc::new(BackendService::new(Box::new(mock)));
		let auth = AuthService::new(backend, storage.clone(), EventBus::new(64));
		(storage, auth)
	}

	#[tokio::test]
	async fn login_persists_a_session() {
		let (_, auth) = service(MockBackend::new().with_account("dana@example.com", "hunter2"));

		let user = auth.login("dana@example.com", "hunter2").await.unwrap();
		assert_eq!(user.email, "dana@example.com");
		assert!(auth.is_authenticated().await);
	}

	#[tokio::test]
	async fn bad_credentials_do_not_create_a_session() {
		let (_, auth) = service(MockBackend::new().with_account("dana@example.com", "hunter2"));

		let err = auth.login("dana@example.com", "wrong").await.unwrap_err();
		assert!(matches!(err, AuthError::InvalidCredentials(_)));
		assert!(!auth.is_authenticated().await);
	}

	#[tokio::test]
	async fn logout_discards_the_session() {
		let (_, auth) = service(MockBackend::new().with_account("dana@example.com", "hunter2"));
		auth.login("dana@example.com", "hunter2").await.unwrap();

		auth.logout().await;
		assert!(!auth.is_authenticated().await);
	}

	#[tokio::test]
	async fn expired_sessions_are_discarded() {
		let (storage, auth) = service(MockBackend::new());

		let stale = Session {
			token: SecretString::from("stale"),
			user: UserProfile {
				id: "u-1".into(),
				first_name: "Dana".into(),
				last_name: "Reed".into(),
				email: "dana@example.com".into(),
				phone_number: String::new(),
				address: String::new(),
				roles: "User".into(),
			},
			expires_at: Utc::now() - Duration::minutes(5),
		};
		storage
			.store(StorageKey::Session.as_str(), SESSION_ID, &stale)
			.await
			.unwrap();

		assert!(auth.current_session().await.is_none());
		// The stale blob is gone, not just ignored.
		assert!(!storage
			.exists(StorageKey::Session.as_str(), SESSION_ID)
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn registration_signs_the_user_in() {
		let (_, auth) = service(MockBackend::new());
		let registration = Registration {
			first_name: "Ira".into(),
			last_name: "Flint".into(),
			email: "ira@example.com".into(),
			phone_number: "+1 555 0102".into(),
			address: "3 Mill Road".into(),
			password: "correct-horse".into(),
		};

		let user = auth.register(&registration).await.unwrap();
		assert_eq!(user.email, "ira@example.com");
		assert!(auth.is_authenticated().await);
	}
}
