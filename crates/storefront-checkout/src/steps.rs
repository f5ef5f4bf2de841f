//! Step definitions and per-step draft validation.
//!
//! The checkout collects its fields across three ordered steps. Which
//! fields a step requires is data, not control flow: step 1 grows a rental
//! period pair for lease products, and step 3 grows the card fields when a
//! card payment is selected. Validation of a step checks exactly its active
//! fields, so an untouched later step never blocks an earlier one.

use storefront_types::{CheckoutDraft, DraftField, ProductStatus};
use validator::Validate;

/// The first step of every checkout.
pub const FIRST_STEP: usize = 1;
/// The last step; submission happens from here.
pub const FINAL_STEP: usize = 3;

/// Payment method value that pulls the card fields into step 3.
const CARD_PAYMENT: &str = "credit_card";

/// A single invalid field with its user-facing message.
#[derive(Debug, Clone)]
pub struct FieldError {
	/// The offending field.
	pub field: DraftField,
	/// Why it was rejected, suitable for rendering next to the field.
	pub message: String,
}

/// The set of fields that blocked a step.
#[derive(Debug, Clone)]
pub struct StepValidationErrors {
	/// The step that failed validation.
	pub step: usize,
	/// One entry per invalid field, in form order.
	pub errors: Vec<FieldError>,
}

impl StepValidationErrors {
	/// Names of the invalid fields, for events and flagging.
	pub fn field_names(&self) -> Vec<String> {
		self.errors
			.iter()
			.map(|e| e.field.as_str().to_string())
			.collect()
	}

	/// Whether a specific field is among the flagged ones.
	pub fn flags(&self, field: DraftField) -> bool {
		self.errors.iter().any(|e| e.field == field)
	}
}

/// Returns the required fields for a step, in form order.
///
/// The rental period pair appears only for lease products; the card fields
/// only when the draft currently selects a card payment.
pub fn step_fields(
	step: usize,
	status: ProductStatus,
	draft: &CheckoutDraft,
) -> Vec<DraftField> {
	match step {
		1 => {
			let mut fields = vec![
				DraftField::FullName,
				DraftField::Email,
				DraftField::Phone,
				DraftField::Address,
			];
			if status.requires_rental_period() {
				fields.push(DraftField::RentalPeriodValue);
				fields.push(DraftField::RentalPeriodUnit);
			}
			fields
		}
		2 => vec![
			DraftField::City,
			DraftField::Country,
			DraftField::ShippingMethod,
		],
		3 => {
			let mut fields = vec![DraftField::PaymentMethod];
			if draft.payment_method == CARD_PAYMENT {
				fields.push(DraftField::CardNumber);
				fields.push(DraftField::CardExpiry);
				fields.push(DraftField::CardCvv);
			}
			fields
		}
		_ => Vec::new(),
	}
}

/// Validates one step of the draft.
///
/// Every active field must be non-empty and pass its format rule. Fields
/// outside the step's active set are ignored entirely, whatever their
/// content.
pub fn validate_step(
	draft: &CheckoutDraft,
	status: ProductStatus,
	step: usize,
) -> Result<(), StepValidationErrors> {
	let fields = step_fields(step, status, draft);
	let format_errors = draft.validate().err();

	let mut errors = Vec::new();
	for field in fields {
		let value = draft.get(field);
		if value.trim().is_empty() {
			errors.push(FieldError {
				field,
				message: "is required".to_string(),
			});
			continue;
		}
		if let Some(all) = &format_errors {
			if let Some(field_errors) = all.field_errors().get(field.as_str()) {
				let message = field_errors
					.first()
					.and_then(|e| e.message.as_ref())
					.map(|m| m.to_string())
					.unwrap_or_else(|| "is invalid".to_string());
				errors.push(FieldError { field, message });
			}
		}
	}

	if errors.is_empty() {
		Ok(())
	} else {
		Err(StepValidationErrors { step, errors })
	}
}

/// Validates every step, returning the first one that fails.
pub fn validate_all(
	draft: &CheckoutDraft,
	status: ProductStatus,
) -> Result<(), StepValidationErrors> {
	for step in FIRST_STEP..=FINAL_STEP {
		validate_step(draft, status, step)?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn valid_contact(draft: &mut CheckoutDraft) {
		draft.set(DraftField::FullName, "Rowan Hale");
		draft.set(DraftField::Email, "rowan@example.com");
		draft.set(DraftField::Phone, "+1 555 0100");
		draft.set(DraftField::Address, "14 Foundry Street");
	}

	#[test]
	fn step_one_requires_contact_fields() {
		let draft = CheckoutDraft::default();
		let errors = validate_step(&draft, ProductStatus::Purchase, 1).unwrap_err();
		assert_eq!(errors.step, 1);
		assert!(errors.flags(DraftField::FullName));
		assert!(errors.flags(DraftField::Email));
		assert!(!errors.flags(DraftField::RentalPeriodValue));
	}

	#[test]
	fn lease_products_require_the_rental_period_on_step_one() {
		let mut draft = CheckoutDraft::default();
		valid_contact(&mut draft);

		let errors = validate_step(&draft, ProductStatus::Lease, 1).unwrap_err();
		assert!(errors.flags(DraftField::RentalPeriodValue));
		assert!(errors.flags(DraftField::RentalPeriodUnit));

		draft.set(DraftField::RentalPeriodValue, "3");
		draft.set(DraftField::RentalPeriodUnit, "month");
		assert!(validate_step(&draft, ProductStatus::Lease, 1).is_ok());
	}

	#[test]
	fn rental_unit_must_be_an_allowed_token() {
		let mut draft = CheckoutDraft::default();
		valid_contact(&mut draft);
		draft.set(DraftField::RentalPeriodValue, "3");
		draft.set(DraftField::RentalPeriodUnit, "fortnight");

		let errors = validate_step(&draft, ProductStatus::Lease, 1).unwrap_err();
		assert!(errors.flags(DraftField::RentalPeriodUnit));
		assert!(!errors.flags(DraftField::RentalPeriodValue));
	}

	#[test]
	fn malformed_email_blocks_step_one() {
		let mut draft = CheckoutDraft::default();
		valid_contact(&mut draft);
		draft.set(DraftField::Email, "not-an-address");

		let errors = validate_step(&draft, ProductStatus::Purchase, 1).unwrap_err();
		assert_eq!(errors.field_names(), vec!["email"]);
	}

	#[test]
	fn card_fields_are_required_only_for_card_payments() {
		let mut draft = CheckoutDraft::default();
		draft.set(DraftField::PaymentMethod, "cash_on_delivery");
		assert!(validate_step(&draft, ProductStatus::Purchase, 3).is_ok());

		draft.set(DraftField::PaymentMethod, "credit_card");
		let errors = validate_step(&draft, ProductStatus::Purchase, 3).unwrap_err();
		assert!(errors.flags(DraftField::CardNumber));
		assert!(errors.flags(DraftField::CardExpiry));
		assert!(errors.flags(DraftField::CardCvv));

		draft.set(DraftField::CardNumber, "4111111111111111");
		draft.set(DraftField::CardExpiry, "12/27");
		draft.set(DraftField::CardCvv, "123");
		assert!(validate_step(&draft, ProductStatus::Purchase, 3).is_ok());
	}

	#[test]
	fn later_steps_never_block_step_one() {
		let mut draft = CheckoutDraft::default();
		valid_contact(&mut draft);
		// Step 2 and 3 fields untouched.
		assert!(validate_step(&draft, ProductStatus::Purchase, 1).is_ok());
	}

	#[test]
	fn validate_all_reports_the_first_failing_step() {
		let mut draft = CheckoutDraft::default();
		valid_contact(&mut draft);

		let errors = validate_all(&draft, ProductStatus::Purchase).unwrap_err();
		assert_eq!(errors.step, 2);
	}
}
