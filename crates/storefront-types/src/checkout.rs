//! Checkout draft, request and response types.
//!
//! The draft is the free-form field map a buyer fills in across the checkout
//! steps. Field-level rules are declared here with `validator` so the flow
//! can validate any subset of fields per step; which fields are required on
//! which step is the checkout flow's concern, not the draft's.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9+\-\s()]+$").unwrap());
static RENTAL_VALUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[1-9][0-9]*$").unwrap());
static RENTAL_UNIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(day|month|year)$").unwrap());
static SHIPPING_METHOD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(standard|express)$").unwrap());
static PAYMENT_METHOD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(credit_card|bank_transfer|cash_on_delivery)$").unwrap());
static CARD_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{13,19}$").unwrap());
static CARD_EXPIRY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(0[1-9]|1[0-2])/[0-9]{2}$").unwrap());
static CARD_CVV_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{3,4}$").unwrap());

/// The in-progress, not-yet-submitted checkout form data.
///
/// All fields are strings because they mirror raw form input; parsing into
/// richer types happens only when the request is built. The draft is
/// persisted independently of the cart and hydrated on every flow start.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CheckoutDraft {
	/// Buyer's full name.
	#[validate(length(min = 3, message = "must be at least 3 characters"))]
	pub full_name: String,
	/// Contact email address.
	#[validate(email(message = "is not a valid email address"))]
	pub email: String,
	/// Contact phone number.
	#[validate(regex(
		path = *PHONE_RE,
		message = "may only contain digits, spaces and + - ( )"
	))]
	pub phone: String,
	/// Delivery address.
	#[validate(length(min = 5, message = "must be at least 5 characters"))]
	pub address: String,
	/// Rental period magnitude, collected only for lease products.
	#[validate(regex(path = *RENTAL_VALUE_RE, message = "must be a whole number of at least 1"))]
	pub rental_period_value: String,
	/// Rental period unit, collected only for lease products.
	#[validate(regex(path = *RENTAL_UNIT_RE, message = "must be one of day, month or year"))]
	pub rental_period_unit: String,
	/// Delivery city.
	#[validate(length(min = 1, message = "is required"))]
	pub city: String,
	/// Delivery country.
	#[validate(length(min = 1, message = "is required"))]
	pub country: String,
	/// Selected shipping method.
	#[validate(regex(path = *SHIPPING_METHOD_RE, message = "must be standard or express"))]
	pub shipping_method: String,
	/// Selected payment method.
	#[validate(regex(
		path = *PAYMENT_METHOD_RE,
		message = "must be credit_card, bank_transfer or cash_on_delivery"
	))]
	pub payment_method: String,
	/// Card number, required only for card payments.
	#[validate(regex(path = *CARD_NUMBER_RE, message = "must be 13 to 19 digits"))]
	pub card_number: String,
	/// Card expiry in MM/YY form, required only for card payments.
	#[validate(regex(path = *CARD_EXPIRY_RE, message = "must be in MM/YY form"))]
	pub card_expiry: String,
	/// Card verification code, required only for card payments.
	#[validate(regex(path = *CARD_CVV_RE, message = "must be 3 or 4 digits"))]
	pub card_cvv: String,
}

impl CheckoutDraft {
	/// Reads a field by name.
	pub fn get(&self, field: DraftField) -> &str {
		match field {
			DraftField::FullName => &self.full_name,
			DraftField::Email => &self.email,
			DraftField::Phone => &self.phone,
			DraftField::Address => &self.address,
			DraftField::RentalPeriodValue => &self.rental_period_value,
			DraftField::RentalPeriodUnit => &self.rental_period_unit,
			DraftField::City => &self.city,
			DraftField::Country => &self.country,
			DraftField::ShippingMethod => &self.shipping_method,
			DraftField::PaymentMethod => &self.payment_method,
			DraftField::CardNumber => &self.card_number,
			DraftField::CardExpiry => &self.card_expiry,
			DraftField::CardCvv => &self.card_cvv,
		}
	}

	/// Writes a field by name, replacing any hydrated value.
	pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
		let value = value.into();
		match field {
			DraftField::FullName => self.full_name = value,
			DraftField::Email => self.email = value,
			DraftField::Phone => self.phone = value,
			DraftField::Address => self.address = value,
			DraftField::RentalPeriodValue => self.rental_period_value = value,
			DraftField::RentalPeriodUnit => self.rental_period_unit = value,
			DraftField::City => self.city = value,
			DraftField::Country => self.country = value,
			DraftField::ShippingMethod => self.shipping_method = value,
			DraftField::PaymentMethod => self.payment_method = value,
			DraftField::CardNumber => self.card_number = value,
			DraftField::CardExpiry => self.card_expiry = value,
			DraftField::CardCvv => self.card_cvv = value,
		}
	}

	/// Joins the rental period fields into the wire form, e.g. `"3 month"`.
	pub fn rental_period(&self) -> String {
		format!(
			"{} {}",
			self.rental_period_value.trim(),
			self.rental_period_unit.trim()
		)
	}
}

/// Names of the draft fields, used for per-step validation and field-level
/// error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
	FullName,
	Email,
	Phone,
	Address,
	RentalPeriodValue,
	RentalPeriodUnit,
	City,
	Country,
	ShippingMethod,
	PaymentMethod,
	CardNumber,
	CardExpiry,
	CardCvv,
}

impl DraftField {
	/// Returns the field name as it appears in validation errors and the
	/// serialized draft.
	pub fn as_str(&self) -> &'static str {
		match self {
			DraftField::FullName => "full_name",
			DraftField::Email => "email",
			DraftField::Phone => "phone",
			DraftField::Address => "address",
			DraftField::RentalPeriodValue => "rental_period_value",
			DraftField::RentalPeriodUnit => "rental_period_unit",
			DraftField::City => "city",
			DraftField::Country => "country",
			DraftField::ShippingMethod => "shipping_method",
			DraftField::PaymentMethod => "payment_method",
			DraftField::CardNumber => "card_number",
			DraftField::CardExpiry => "card_expiry",
			DraftField::CardCvv => "card_cvv",
		}
	}
}

impl std::fmt::Display for DraftField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The one-way order creation payload sent to the backend.
///
/// Built from the draft plus the externally supplied product id and status;
/// the client holds no further lifecycle state for the order once this has
/// been submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
	/// Buyer's full name.
	pub name: String,
	/// Contact email address.
	pub email: String,
	/// Contact phone number.
	pub phone_number: String,
	/// Delivery address.
	pub address: String,
	/// Rental period in `"<value> <unit>"` form, only for lease products.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rental_period: Option<String>,
	/// Product status string echoed back to the backend.
	pub status: String,
	/// Identifier of the product being ordered.
	pub product_id: u64,
}

/// The order API's response envelope.
///
/// A response can complete at the transport level yet still report an
/// application-level failure ("business-level rejection"); that case is
/// signaled by `is_success == false` with a human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
	/// Whether the order was created.
	pub is_success: bool,
	/// Human-readable outcome message, surfaced verbatim to the buyer.
	#[serde(default)]
	pub message: String,
	/// Optional payload attached by the backend.
	#[serde(default)]
	pub data: Option<serde_json::Value>,
}
