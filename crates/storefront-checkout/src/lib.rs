//! Checkout flow for the storefront client.
//!
//! A linear multi-step form controller: it collects buyer and (for lease
//! products) rental information across ordered steps, gates progression on
//! per-step field validity, persists the draft so an interrupted checkout
//! can resume, and submits exactly one order-creation request.
//!
//! Every failure path returns control to an interactive state: validation
//! failures are values, business rejections surface the server's message
//! verbatim, and transport errors leave the flow where it was so the buyer
//! can retry.

use std::sync::Arc;
use storefront_api::{ApiError, BackendService};
use storefront_cart::CartService;
use storefront_storage::StorageService;
use storefront_types::{
	CheckoutDraft, CheckoutEvent, CheckoutRequest, DraftField, EventBus, ProductStatus,
	StorageKey, StorefrontEvent,
};

pub mod steps;

pub use steps::{FieldError, StepValidationErrors, FINAL_STEP, FIRST_STEP};

use steps::{validate_all, validate_step};

/// Id under which the draft blob is persisted within its namespace.
const DRAFT_ID: &str = "default";

/// Generic message for transport-level submission failures.
const SUBMIT_FAILED_MESSAGE: &str =
	"Something went wrong while creating your order. Please try again.";

/// Generic message for a product that vanished before submission.
const PRODUCT_FETCH_FAILED_MESSAGE: &str = "Could not load the product details. Please try again.";

/// Where the flow is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
	/// The buyer is still filling in steps; submission has not succeeded.
	Collecting,
	/// The order was accepted; the flow is terminal.
	Submitted,
}

/// Result of a [`CheckoutFlow::next`] call.
#[derive(Debug)]
pub enum StepOutcome {
	/// The step validated and the counter advanced to `step`.
	Advanced { step: usize },
	/// Validation blocked the step; the counter did not move.
	Rejected(StepValidationErrors),
	/// Already on the final step; submission is the only way forward.
	AtFinalStep,
}

/// Result of a [`CheckoutFlow::submit`] call.
#[derive(Debug)]
pub enum SubmitOutcome {
	/// The backend created the order. The flow is now terminal.
	Accepted { message: String },
	/// Business-level rejection; the server's message, verbatim.
	Rejected { message: String },
	/// The call failed at the transport level; safe to retry.
	TransportFailed { message: String },
	/// The referenced product no longer exists; nothing was sent.
	ProductUnavailable,
	/// The draft is not fully valid; nothing was sent.
	Invalid(StepValidationErrors),
	/// A submission is already in flight.
	AlreadyInFlight,
	/// The flow already submitted successfully.
	AlreadySubmitted,
}

/// The multi-step checkout controller.
///
/// One flow is created per checkout attempt, bound to the product id and
/// status handed over by the product page.
pub struct CheckoutFlow {
	product_id: u64,
	product_status: ProductStatus,
	draft: CheckoutDraft,
	step: usize,
	state: CheckoutState,
	in_flight: bool,
	storage: Arc<StorageService>,
	backend: Arc<BackendService>,
	cart: Arc<CartService>,
	events: EventBus,
}

impl CheckoutFlow {
	/// Starts a checkout for the given product.
	///
	/// The draft is hydrated from persisted storage when present, so a
	/// returning buyer finds their details prefilled; explicit
	/// [`set_field`](Self::set_field) edits overwrite hydrated values.
	pub async fn begin(
		product_id: u64,
		product_status: ProductStatus,
		storage: Arc<StorageService>,
		backend: Arc<BackendService>,
		cart: Arc<CartService>,
		events: EventBus,
	) -> Self {
		let draft = match storage
			.retrieve::<CheckoutDraft>(StorageKey::CheckoutDraft.as_str(), DRAFT_ID)
			.await
		{
			Ok(draft) => draft,
			Err(storefront_storage::StorageError::NotFound) => CheckoutDraft::default(),
			Err(e) => {
				tracing::warn!(error = %e, "Failed to hydrate checkout draft, starting blank");
				CheckoutDraft::default()
			}
		};

		Self {
			product_id,
			product_status,
			draft,
			step: FIRST_STEP,
			state: CheckoutState::Collecting,
			in_flight: false,
			storage,
			backend,
			cart,
			events,
		}
	}

	/// The current 1-based step.
	pub fn step(&self) -> usize {
		self.step
	}

	/// Where the flow is in its lifecycle.
	pub fn state(&self) -> CheckoutState {
		self.state
	}

	/// Whether a submission is currently in flight.
	pub fn is_submitting(&self) -> bool {
		self.in_flight
	}

	/// Read access to the draft, e.g. for rendering current values.
	pub fn draft(&self) -> &CheckoutDraft {
		&self.draft
	}

	/// Sets a draft field from form input.
	pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) {
		self.draft.set(field, value);
	}

	/// Attempts to advance to the next step.
	///
	/// Advances only if every required field of the current step passes its
	/// validators; on rejection the step does not change and the offending
	/// fields are returned so the form can flag them. A successful advance
	/// persists the draft.
	pub async fn next(&mut self) -> StepOutcome {
		if self.step >= FINAL_STEP {
			return StepOutcome::AtFinalStep;
		}

		match validate_step(&self.draft, self.product_status, self.step) {
			Err(errors) => {
				self.events
					.publish(StorefrontEvent::Checkout(CheckoutEvent::StepRejected {
						step: self.step,
						fields: errors.field_names(),
					}))
					.ok();
				StepOutcome::Rejected(errors)
			}
			Ok(()) => {
				self.step += 1;
				self.persist_draft().await;
				self.events
					.publish(StorefrontEvent::Checkout(CheckoutEvent::StepAdvanced {
						step: self.step,
					}))
					.ok();
				StepOutcome::Advanced { step: self.step }
			}
		}
	}

	/// Steps back unconditionally, never below the first step.
	pub fn prev(&mut self) -> usize {
		if self.step > FIRST_STEP {
			self.step -= 1;
		}
		self.step
	}

	/// Submits the order.
	///
	/// Requires a fully valid draft; performs the product existence check
	/// and then exactly one order-creation call. Only one submission may be
	/// in flight at a time. See [`SubmitOutcome`] for the possible results;
	/// in every case the in-flight flag is cleared before returning.
	pub async fn submit(&mut self) -> SubmitOutcome {
		if self.state == CheckoutState::Submitted {
			return SubmitOutcome::AlreadySubmitted;
		}
		if self.in_flight {
			return SubmitOutcome::AlreadyInFlight;
		}

		if let Err(errors) = validate_all(&self.draft, self.product_status) {
			self.events
				.publish(StorefrontEvent::Checkout(CheckoutEvent::StepRejected {
					step: errors.step,
					fields: errors.field_names(),
				}))
				.ok();
			return SubmitOutcome::Invalid(errors);
		}

		self.in_flight = true;
		let outcome = self.perform_submit().await;
		self.in_flight = false;
		outcome
	}

	async fn perform_submit(&mut self) -> SubmitOutcome {
		// The product must still exist before anything goes over the wire.
		match self.backend.get_product(self.product_id).await {
			Ok(_) => {}
			Err(ApiError::NotFound) => {
				self.events
					.publish(StorefrontEvent::Checkout(CheckoutEvent::ProductUnavailable {
						product_id: self.product_id,
					}))
					.ok();
				return SubmitOutcome::ProductUnavailable;
			}
			Err(e) => {
				tracing::error!(error = %e, product_id = self.product_id, "Product fetch failed");
				self.events
					.publish(StorefrontEvent::Checkout(CheckoutEvent::SubmissionFailed {
						message: PRODUCT_FETCH_FAILED_MESSAGE.to_string(),
					}))
					.ok();
				return SubmitOutcome::TransportFailed {
					message: PRODUCT_FETCH_FAILED_MESSAGE.to_string(),
				};
			}
		}

		let request = self.build_request();
		match self.backend.checkout(&request).await {
			Ok(response) if response.is_success => {
				let message = if response.message.is_empty() {
					"Order created successfully".to_string()
				} else {
					response.message
				};
				self.persist_draft().await;
				self.cart.clear().await;
				self.state = CheckoutState::Submitted;
				self.events
					.publish(StorefrontEvent::Checkout(CheckoutEvent::SubmissionAccepted {
						product_id: self.product_id,
						message: message.clone(),
					}))
					.ok();
				SubmitOutcome::Accepted { message }
			}
			Ok(response) => {
				let message = if response.message.is_empty() {
					"Failed to create order".to_string()
				} else {
					response.message
				};
				self.events
					.publish(StorefrontEvent::Checkout(CheckoutEvent::SubmissionRejected {
						message: message.clone(),
					}))
					.ok();
				SubmitOutcome::Rejected { message }
			}
			Err(e) => {
				tracing::error!(error = %e, product_id = self.product_id, "Order creation failed");
				self.events
					.publish(StorefrontEvent::Checkout(CheckoutEvent::SubmissionFailed {
						message: SUBMIT_FAILED_MESSAGE.to_string(),
					}))
					.ok();
				SubmitOutcome::TransportFailed {
					message: SUBMIT_FAILED_MESSAGE.to_string(),
				}
			}
		}
	}

	/// Builds the one-way order creation payload from the draft.
	fn build_request(&self) -> CheckoutRequest {
		CheckoutRequest {
			name: self.draft.full_name.clone(),
			email: self.draft.email.clone(),
			phone_number: self.draft.phone.clone(),
			address: self.draft.address.clone(),
			rental_period: self
				.product_status
				.requires_rental_period()
				.then(|| self.draft.rental_period()),
			status: self.product_status.as_str().to_string(),
			product_id: self.product_id,
		}
	}

	/// Writes the draft blob; failures are logged and swallowed.
	async fn persist_draft(&self) {
		if let Err(e) = self
			.storage
			.store(StorageKey::CheckoutDraft.as_str(), DRAFT_ID, &self.draft)
			.await
		{
			tracing::warn!(error = %e, "Failed to persist checkout draft");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal::Decimal;
	use storefront_api::implementations::mock::{MockBackend, MockCheckoutOutcome};
	use storefront_storage::implementations::memory::MemoryStorage;
	use storefront_types::Product;

	fn product(id: u64, status: ProductStatus) -> Product {
		Product {
			id,
			name: format!("Product {}", id),
			description: String::new(),
			price: Decimal::from(100u32),
			category_id: 1,
			category: "Excavation".into(),
			image: String::new(),
			stock: 10,
			status,
			brand: String::new(),
			model: String::new(),
			rating: 0.0,
		}
	}

	struct Harness {
		storage: Arc<StorageService>,
		backend: Arc<BackendService>,
		mock: Arc<MockBackend>,
		cart: Arc<CartService>,
		events: EventBus,
	}

	impl Harness {
		async fn new(mock: MockBackend) -> Self {
			// The flow talks to the mock through the service seam while the
			// test keeps a second handle for scripting and assertions.
			let mock = Arc::new(mock);
			let backend = Arc::new(BackendService::new(Box::new(mock.clone())));
			let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
			let events = EventBus::new(64);
			let cart = Arc::new(CartService::hydrate(storage.clone(), events.clone()).await);
			Self {
				storage,
				backend,
				mock,
				cart,
				events,
			}
		}

		async fn flow(&self, product_id: u64, status: ProductStatus) -> CheckoutFlow {
			CheckoutFlow::begin(
				product_id,
				status,
				self.storage.clone(),
				self.backend.clone(),
				self.cart.clone(),
				self.events.clone(),
			)
			.await
		}
	}

	fn fill_contact(flow: &mut CheckoutFlow) {
		flow.set_field(DraftField::FullName, "Rowan Hale");
		flow.set_field(DraftField::Email, "rowan@example.com");
		flow.set_field(DraftField::Phone, "+1 555 0100");
		flow.set_field(DraftField::Address, "14 Foundry Street");
	}

	fn fill_shipping(flow: &mut CheckoutFlow) {
		flow.set_field(DraftField::City, "Portsmouth");
		flow.set_field(DraftField::Country, "US");
		flow.set_field(DraftField::ShippingMethod, "standard");
	}

	fn fill_payment(flow: &mut CheckoutFlow) {
		flow.set_field(DraftField::PaymentMethod, "cash_on_delivery");
	}

	async fn filled_flow(harness: &Harness, id: u64, status: ProductStatus) -> CheckoutFlow {
		let mut flow = harness.flow(id, status).await;
		fill_contact(&mut flow);
		fill_shipping(&mut flow);
		fill_payment(&mut flow);
		if status.requires_rental_period() {
			flow.set_field(DraftField::RentalPeriodValue, "3");
			flow.set_field(DraftField::RentalPeriodUnit, "month");
		}
		assert!(matches!(flow.next().await, StepOutcome::Advanced { step: 2 }));
		assert!(matches!(flow.next().await, StepOutcome::Advanced { step: 3 }));
		flow
	}

	#[tokio::test]
	async fn next_never_advances_past_an_invalid_step() {
		let harness = Harness::new(MockBackend::new()).await;
		let mut flow = harness.flow(1, ProductStatus::Purchase).await;

		fill_contact(&mut flow);
		flow.set_field(DraftField::Email, "");

		match flow.next().await {
			StepOutcome::Rejected(errors) => {
				assert_eq!(errors.step, 1);
				assert!(errors.flags(DraftField::Email));
			}
			other => panic!("unexpected outcome: {:?}", other),
		}
		assert_eq!(flow.step(), 1);
	}

	#[tokio::test]
	async fn step_counter_moves_one_at_a_time_and_never_below_one() {
		let harness = Harness::new(MockBackend::new()).await;
		let mut flow = harness.flow(1, ProductStatus::Purchase).await;

		assert_eq!(flow.prev(), 1);

		fill_contact(&mut flow);
		assert!(matches!(flow.next().await, StepOutcome::Advanced { step: 2 }));
		assert_eq!(flow.prev(), 1);
		assert_eq!(flow.prev(), 1);

		assert!(matches!(flow.next().await, StepOutcome::Advanced { step: 2 }));
		fill_shipping(&mut flow);
		assert!(matches!(flow.next().await, StepOutcome::Advanced { step: 3 }));
		assert!(matches!(flow.next().await, StepOutcome::AtFinalStep));
	}

	#[tokio::test]
	async fn blank_rental_period_blocks_step_one_for_lease_products() {
		let harness = Harness::new(MockBackend::new()).await;
		let mut flow = harness.flow(2, ProductStatus::Lease).await;

		fill_contact(&mut flow);
		match flow.next().await {
			StepOutcome::Rejected(errors) => {
				assert!(errors.flags(DraftField::RentalPeriodValue));
				assert!(errors.flags(DraftField::RentalPeriodUnit));
			}
			other => panic!("unexpected outcome: {:?}", other),
		}
		assert_eq!(flow.step(), 1);
	}

	#[tokio::test]
	async fn invalid_draft_submission_issues_no_network_call() {
		let harness =
			Harness::new(MockBackend::new().with_product(product(1, ProductStatus::Purchase)))
				.await;
		let mut flow = harness.flow(1, ProductStatus::Purchase).await;
		fill_contact(&mut flow);
		flow.set_field(DraftField::Email, "");

		match flow.submit().await {
			SubmitOutcome::Invalid(errors) => assert!(errors.flags(DraftField::Email)),
			other => panic!("unexpected outcome: {:?}", other),
		}
		assert!(harness.mock.checkout_requests().await.is_empty());
		assert_eq!(flow.step(), 1);
	}

	#[tokio::test]
	async fn accepted_submission_is_terminal_and_clears_the_cart() {
		let harness =
			Harness::new(MockBackend::new().with_product(product(1, ProductStatus::Purchase)))
				.await;
		harness.cart.add_item(&product(1, ProductStatus::Purchase), 2).await;

		let mut flow = filled_flow(&harness, 1, ProductStatus::Purchase).await;
		match flow.submit().await {
			SubmitOutcome::Accepted { message } => {
				assert_eq!(message, "Order created successfully")
			}
			other => panic!("unexpected outcome: {:?}", other),
		}

		assert_eq!(flow.state(), CheckoutState::Submitted);
		assert_eq!(harness.cart.item_count().await, 0);
		assert!(harness
			.storage
			.exists(StorageKey::CheckoutDraft.as_str(), "default")
			.await
			.unwrap());

		// The flow is terminal: nothing more goes over the wire.
		assert!(matches!(flow.submit().await, SubmitOutcome::AlreadySubmitted));
		assert_eq!(harness.mock.checkout_requests().await.len(), 1);
	}

	#[tokio::test]
	async fn business_rejection_keeps_the_flow_interactive() {
		let harness =
			Harness::new(MockBackend::new().with_product(product(1, ProductStatus::Purchase)))
				.await;
		harness
			.mock
			.script_checkout(MockCheckoutOutcome::Reject {
				message: "out of stock".into(),
			})
			.await;

		let mut flow = filled_flow(&harness, 1, ProductStatus::Purchase).await;
		match flow.submit().await {
			SubmitOutcome::Rejected { message } => assert_eq!(message, "out of stock"),
			other => panic!("unexpected outcome: {:?}", other),
		}

		assert_eq!(flow.state(), CheckoutState::Collecting);
		assert_eq!(flow.step(), FINAL_STEP);
		assert!(!flow.is_submitting());

		// The draft survived, so a retry can succeed without re-entry.
		match flow.submit().await {
			SubmitOutcome::Accepted { .. } => {}
			other => panic!("unexpected outcome: {:?}", other),
		}
	}

	#[tokio::test]
	async fn transport_failure_surfaces_a_generic_message() {
		let harness =
			Harness::new(MockBackend::new().with_product(product(1, ProductStatus::Purchase)))
				.await;
		harness
			.mock
			.script_checkout(MockCheckoutOutcome::Fail {
				message: "connection reset".into(),
			})
			.await;

		let mut flow = filled_flow(&harness, 1, ProductStatus::Purchase).await;
		match flow.submit().await {
			SubmitOutcome::TransportFailed { message } => {
				assert_eq!(message, SUBMIT_FAILED_MESSAGE)
			}
			other => panic!("unexpected outcome: {:?}", other),
		}
		assert_eq!(flow.state(), CheckoutState::Collecting);
		assert!(!flow.is_submitting());
	}

	#[tokio::test]
	async fn missing_product_aborts_before_the_order_call() {
		let harness = Harness::new(MockBackend::new()).await;
		let mut flow = filled_flow(&harness, 42, ProductStatus::Purchase).await;

		assert!(matches!(flow.submit().await, SubmitOutcome::ProductUnavailable));
		assert!(harness.mock.checkout_requests().await.is_empty());
	}

	#[tokio::test]
	async fn lease_submissions_carry_the_joined_rental_period() {
		let harness =
			Harness::new(MockBackend::new().with_product(product(2, ProductStatus::Lease))).await;
		let mut flow = filled_flow(&harness, 2, ProductStatus::Lease).await;

		assert!(matches!(flow.submit().await, SubmitOutcome::Accepted { .. }));
		let requests = harness.mock.checkout_requests().await;
		assert_eq!(requests.len(), 1);
		assert_eq!(requests[0].rental_period.as_deref(), Some("3 month"));
		assert_eq!(requests[0].status, "lease");
		assert_eq!(requests[0].product_id, 2);
	}

	#[tokio::test]
	async fn purchase_submissions_omit_the_rental_period() {
		let harness =
			Harness::new(MockBackend::new().with_product(product(1, ProductStatus::Purchase)))
				.await;
		let mut flow = filled_flow(&harness, 1, ProductStatus::Purchase).await;

		assert!(matches!(flow.submit().await, SubmitOutcome::Accepted { .. }));
		let requests = harness.mock.checkout_requests().await;
		assert!(requests[0].rental_period.is_none());
	}

	#[tokio::test]
	async fn draft_hydrates_into_a_new_flow() {
		let harness =
			Harness::new(MockBackend::new().with_product(product(1, ProductStatus::Purchase)))
				.await;

		{
			let mut flow = harness.flow(1, ProductStatus::Purchase).await;
			fill_contact(&mut flow);
			assert!(matches!(flow.next().await, StepOutcome::Advanced { .. }));
		}

		// A later flow starts prefilled from the persisted draft.
		let flow = harness.flow(1, ProductStatus::Purchase).await;
		assert_eq!(flow.draft().email, "rowan@example.com");
		assert_eq!(flow.step(), FIRST_STEP);
	}

	#[tokio::test]
	async fn step_rejection_publishes_a_single_event() {
		let harness = Harness::new(MockBackend::new()).await;
		let mut rx = harness.events.subscribe();
		let mut flow = harness.flow(1, ProductStatus::Purchase).await;

		flow.next().await;

		match rx.recv().await.unwrap() {
			StorefrontEvent::Checkout(CheckoutEvent::StepRejected { step, fields }) => {
				assert_eq!(step, 1);
				assert!(fields.contains(&"full_name".to_string()));
			}
			other => panic!("unexpected event: {:?}", other),
		}
		assert!(matches!(
			rx.try_recv(),
			Err(tokio::sync::broadcast::error::TryRecvError::Empty)
		));
	}
}
