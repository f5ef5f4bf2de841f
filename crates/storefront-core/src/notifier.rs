//! Notification fan-out for store events.
//!
//! The original client reached for a global toast singleton from inside its
//! stores; here the stores only publish events, and this module translates
//! the notification-worthy ones into [`Notification`] records on a separate
//! channel. Whatever embeds the storefront decides how (and whether) to
//! render them.

use storefront_types::{
	AuthEvent, CartEvent, CheckoutEvent, EventBus, Notification, NotificationKind,
	StorefrontEvent,
};
use tokio::sync::broadcast;

/// Translates storefront events into user-visible notifications.
#[derive(Debug, Clone)]
pub struct Notifier {
	sender: broadcast::Sender<Notification>,
}

impl Notifier {
	/// Spawns the translation task over the given event bus.
	///
	/// The task runs until the bus is dropped. Notifications published while
	/// no renderer is subscribed are discarded, matching toast semantics.
	pub fn spawn(events: &EventBus) -> Self {
		let (sender, _) = broadcast::channel(64);
		let mut rx = events.subscribe();
		let out = sender.clone();

		tokio::spawn(async move {
			loop {
				match rx.recv().await {
					Ok(event) => {
						if let Some(notification) = notification_for(&event) {
							out.send(notification).ok();
						}
					}
					Err(broadcast::error::RecvError::Lagged(missed)) => {
						tracing::warn!(missed, "Notifier lagged behind the event bus");
					}
					Err(broadcast::error::RecvError::Closed) => break,
				}
			}
		});

		Self { sender }
	}

	/// Subscribes to the notification stream.
	pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
		self.sender.subscribe()
	}
}

/// Maps an event to the notification it should raise, if any.
///
/// Step advances are deliberately silent; the form itself is the feedback.
pub fn notification_for(event: &StorefrontEvent) -> Option<Notification> {
	use NotificationKind::{Error, Info, Success};

	let notification = match event {
		StorefrontEvent::Cart(CartEvent::LineAdded { name, .. }) => {
			Notification::new(Success, format!("{} added to cart", name))
		}
		// Quantity edits re-render the line itself; no toast for those.
		StorefrontEvent::Cart(CartEvent::QuantityUpdated { .. }) => return None,
		StorefrontEvent::Cart(CartEvent::LineRemoved { name, .. }) => {
			Notification::new(Info, format!("{} removed from cart", name))
		}
		StorefrontEvent::Cart(CartEvent::Cleared) => Notification::new(Info, "Cart cleared"),
		StorefrontEvent::Checkout(CheckoutEvent::StepAdvanced { .. }) => return None,
		StorefrontEvent::Checkout(CheckoutEvent::StepRejected { .. }) => {
			Notification::new(Error, "Please complete all required fields correctly")
		}
		StorefrontEvent::Checkout(CheckoutEvent::SubmissionAccepted { message, .. }) => {
			Notification::new(Success, message.clone())
		}
		StorefrontEvent::Checkout(CheckoutEvent::SubmissionRejected { message }) => {
			Notification::new(Error, message.clone())
		}
		StorefrontEvent::Checkout(CheckoutEvent::SubmissionFailed { message }) => {
			Notification::new(Error, message.clone())
		}
		StorefrontEvent::Checkout(CheckoutEvent::ProductUnavailable { .. }) => {
			Notification::new(Error, "Product not found")
		}
		StorefrontEvent::Auth(AuthEvent::LoggedIn { email }) => {
			Notification::new(Success, format!("Signed in as {}", email))
		}
		StorefrontEvent::Auth(AuthEvent::Registered { email }) => {
			Notification::new(Success, format!("Welcome, {}", email))
		}
		StorefrontEvent::Auth(AuthEvent::LoggedOut) => Notification::new(Info, "Signed out"),
	};
	Some(notification)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn business_rejections_surface_the_server_message_verbatim() {
		let event = StorefrontEvent::Checkout(CheckoutEvent::SubmissionRejected {
			message: "out of stock".into(),
		});
		let notification = notification_for(&event).unwrap();
		assert_eq!(notification.message, "out of stock");
		assert_eq!(notification.kind, NotificationKind::Error);
	}

	#[test]
	fn step_advances_are_silent() {
		let event = StorefrontEvent::Checkout(CheckoutEvent::StepAdvanced { step: 2 });
		assert!(notification_for(&event).is_none());
	}

	#[tokio::test]
	async fn spawned_notifier_relays_cart_confirmations() {
		let bus = EventBus::new(16);
		let notifier = Notifier::spawn(&bus);
		let mut rx = notifier.subscribe();

		bus.publish(StorefrontEvent::Cart(CartEvent::LineAdded {
			product_id: 1,
			name: "Crawler Excavator 320".into(),
			quantity: 1,
		}))
		.ok();

		let notification = rx.recv().await.unwrap();
		assert_eq!(notification.message, "Crawler Excavator 320 added to cart");
		assert_eq!(notification.kind, NotificationKind::Success);
	}
}
