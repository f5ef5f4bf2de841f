//! Event bus for inter-component communication.
//!
//! A thin wrapper around a tokio broadcast channel. The bus is cheap to
//! clone; every clone publishes into the same channel. Publishing never
//! blocks, and events published while no subscriber exists are dropped,
//! which is the desired behavior for notification-style events.

use crate::StorefrontEvent;
use tokio::sync::broadcast;

/// Broadcast bus carrying [`StorefrontEvent`]s between components.
#[derive(Debug, Clone)]
pub struct EventBus {
	sender: broadcast::Sender<StorefrontEvent>,
}

impl EventBus {
	/// Creates a new event bus retaining up to `capacity` undelivered events
	/// per subscriber before older ones are dropped.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to all current subscribers.
	///
	/// Returns the number of subscribers the event reached. An `Err` only
	/// means nobody is listening; callers treat that as non-fatal.
	pub fn publish(
		&self,
		event: StorefrontEvent,
	) -> Result<usize, broadcast::error::SendError<StorefrontEvent>> {
		self.sender.send(event)
	}

	/// Creates a new subscription receiving all events published after this
	/// call.
	pub fn subscribe(&self) -> broadcast::Receiver<StorefrontEvent> {
		self.sender.subscribe()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(256)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::CartEvent;

	#[tokio::test]
	async fn subscribers_receive_published_events() {
		let bus = EventBus::new(8);
		let mut rx = bus.subscribe();

		bus.publish(StorefrontEvent::Cart(CartEvent::Cleared)).ok();

		match rx.recv().await {
			Ok(StorefrontEvent::Cart(CartEvent::Cleared)) => {}
			other => panic!("unexpected event: {:?}", other),
		}
	}

	#[tokio::test]
	async fn publish_without_subscribers_is_non_fatal() {
		let bus = EventBus::new(8);
		assert!(bus
			.publish(StorefrontEvent::Cart(CartEvent::Cleared))
			.is_err());
	}
}
