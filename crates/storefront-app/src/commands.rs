//! Subcommand handlers for the storefront CLI.
//!
//! Each handler drives the storefront through the same services a graphical
//! frontend would use, then drains the event bus and prints the resulting
//! notifications, so the CLI shows exactly the confirmations a toast layer
//! would have rendered.

use anyhow::{bail, Context};
use clap::{Subcommand, ValueEnum};
use storefront_checkout::{StepOutcome, SubmitOutcome};
use storefront_core::{notification_for, Storefront};
use storefront_types::{
	DraftField, NotificationKind, Product, ProductFilter, ProductSort, Registration,
	StorefrontEvent,
};
use tokio::sync::broadcast::Receiver;

/// Sort orders accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
	Name,
	PriceLow,
	PriceHigh,
}

impl From<SortArg> for ProductSort {
	fn from(arg: SortArg) -> Self {
		match arg {
			SortArg::Name => ProductSort::Name,
			SortArg::PriceLow => ProductSort::PriceLowHigh,
			SortArg::PriceHigh => ProductSort::PriceHighLow,
		}
	}
}

/// Storefront operations.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// List products from the catalog
	Products {
		/// Restrict to a category
		#[arg(long)]
		category: Option<String>,
		/// Free-text search term
		#[arg(long)]
		search: Option<String>,
		/// Sort order
		#[arg(long, value_enum)]
		sort: Option<SortArg>,
		/// 1-based page index
		#[arg(long)]
		page: Option<u32>,
		/// Page size
		#[arg(long)]
		limit: Option<u32>,
	},
	/// Show a single product
	Product {
		/// Product id
		id: u64,
	},
	/// List categories
	Categories,
	/// Inspect or mutate the cart
	Cart {
		#[command(subcommand)]
		command: CartCommand,
	},
	/// Run the multi-step checkout for a product
	Checkout(CheckoutArgs),
	/// Sign in
	Login {
		#[arg(long)]
		email: String,
		#[arg(long)]
		password: String,
	},
	/// Register a new account
	Register {
		#[arg(long)]
		first_name: String,
		#[arg(long)]
		last_name: String,
		#[arg(long)]
		email: String,
		#[arg(long)]
		phone: String,
		#[arg(long)]
		address: String,
		#[arg(long)]
		password: String,
	},
	/// Discard the current session
	Logout,
	/// Show the signed-in user
	Whoami,
}

/// Cart operations.
#[derive(Subcommand, Debug)]
pub enum CartCommand {
	/// Show the cart lines, count and total
	Show,
	/// Add a product to the cart
	Add {
		/// Product id
		id: u64,
		/// Units to add
		#[arg(long, default_value_t = 1)]
		quantity: u32,
	},
	/// Set a line's quantity exactly (0 removes the line)
	SetQuantity {
		/// Product id
		id: u64,
		/// New quantity
		quantity: u32,
	},
	/// Remove a product from the cart
	Remove {
		/// Product id
		id: u64,
	},
	/// Empty the cart
	Clear,
}

/// Field inputs for the checkout flow.
#[derive(clap::Args, Debug)]
pub struct CheckoutArgs {
	/// Product id to check out
	#[arg(long)]
	pub product_id: u64,
	#[arg(long)]
	pub name: Option<String>,
	#[arg(long)]
	pub email: Option<String>,
	#[arg(long)]
	pub phone: Option<String>,
	#[arg(long)]
	pub address: Option<String>,
	/// Rental period magnitude, required for lease products
	#[arg(long)]
	pub rental_value: Option<String>,
	/// Rental period unit (day, month or year)
	#[arg(long)]
	pub rental_unit: Option<String>,
	#[arg(long)]
	pub city: Option<String>,
	#[arg(long)]
	pub country: Option<String>,
	/// standard or express
	#[arg(long)]
	pub shipping: Option<String>,
	/// credit_card, bank_transfer or cash_on_delivery
	#[arg(long)]
	pub payment: Option<String>,
	#[arg(long)]
	pub card_number: Option<String>,
	/// MM/YY
	#[arg(long)]
	pub card_expiry: Option<String>,
	#[arg(long)]
	pub card_cvv: Option<String>,
}

/// Dispatches a subcommand against the wired storefront.
pub async fn run(storefront: &Storefront, command: Command) -> anyhow::Result<()> {
	// Subscribe before acting so every confirmation raised by the command is
	// drained and printed afterwards.
	let events = storefront.events().subscribe();

	let result = dispatch(storefront, command).await;
	drain_notifications(events);
	result
}

async fn dispatch(storefront: &Storefront, command: Command) -> anyhow::Result<()> {
	match command {
		Command::Products {
			category,
			search,
			sort,
			page,
			limit,
		} => {
			let filter = ProductFilter {
				category,
				search,
				sort: sort.map(Into::into),
				page,
				limit,
			};
			let products = storefront
				.backend()
				.list_products(&filter)
				.await
				.context("listing products")?;
			for product in &products {
				print_product_row(product);
			}
			if products.is_empty() {
				println!("No products matched.");
			}
		}
		Command::Product { id } => {
			let product = storefront
				.backend()
				.get_product(id)
				.await
				.context("fetching product")?;
			print_product_row(&product);
			if !product.description.is_empty() {
				println!("  {}", product.description);
			}
			println!(
				"  brand: {}  model: {}  stock: {}  rating: {:.1}",
				product.brand, product.model, product.stock, product.rating
			);
		}
		Command::Categories => {
			let categories = storefront
				.backend()
				.list_categories()
				.await
				.context("listing categories")?;
			for category in categories {
				println!(
					"{:>4}  {:<24} {:>3} products",
					category.id, category.name, category.product_count
				);
			}
		}
		Command::Cart { command } => run_cart(storefront, command).await?,
		Command::Checkout(args) => run_checkout(storefront, args).await?,
		Command::Login { email, password } => {
			storefront
				.auth()
				.login(&email, &password)
				.await
				.context("signing in")?;
		}
		Command::Register {
			first_name,
			last_name,
			email,
			phone,
			address,
			password,
		} => {
			let registration = Registration {
				first_name,
				last_name,
				email,
				phone_number: phone,
				address,
				password,
			};
			storefront
				.auth()
				.register(&registration)
				.await
				.context("registering")?;
		}
		Command::Logout => storefront.auth().logout().await,
		Command::Whoami => match storefront.auth().current_session().await {
			Some(session) => {
				println!(
					"{} {} <{}> ({})",
					session.user.first_name,
					session.user.last_name,
					session.user.email,
					session.user.roles
				);
			}
			None => println!("Not signed in."),
		},
	}
	Ok(())
}

async fn run_cart(storefront: &Storefront, command: CartCommand) -> anyhow::Result<()> {
	let cart = storefront.cart();
	match command {
		CartCommand::Show => {
			let lines = cart.lines().await;
			if lines.is_empty() {
				println!("Cart is empty.");
				return Ok(());
			}
			for line in &lines {
				println!(
					"{:>4}  {:<32} x{:<4} {:>12}",
					line.product.id,
					line.product.name,
					line.quantity,
					line.line_total()
				);
			}
			println!(
				"{} items, total {}",
				cart.item_count().await,
				cart.total().await
			);
		}
		CartCommand::Add { id, quantity } => {
			let product = storefront
				.backend()
				.get_product(id)
				.await
				.context("fetching product")?;
			cart.add_item(&product, quantity).await;
		}
		CartCommand::SetQuantity { id, quantity } => cart.update_quantity(id, quantity).await,
		CartCommand::Remove { id } => cart.remove_item(id).await,
		CartCommand::Clear => cart.clear().await,
	}
	Ok(())
}

async fn run_checkout(storefront: &Storefront, args: CheckoutArgs) -> anyhow::Result<()> {
	// The product page hands checkout the id and status; here the catalog
	// lookup plays that role.
	let product = storefront
		.backend()
		.get_product(args.product_id)
		.await
		.context("fetching product")?;

	let mut flow = storefront
		.begin_checkout(product.id, product.status)
		.await;

	let fields = [
		(DraftField::FullName, args.name),
		(DraftField::Email, args.email),
		(DraftField::Phone, args.phone),
		(DraftField::Address, args.address),
		(DraftField::RentalPeriodValue, args.rental_value),
		(DraftField::RentalPeriodUnit, args.rental_unit),
		(DraftField::City, args.city),
		(DraftField::Country, args.country),
		(DraftField::ShippingMethod, args.shipping),
		(DraftField::PaymentMethod, args.payment),
		(DraftField::CardNumber, args.card_number),
		(DraftField::CardExpiry, args.card_expiry),
		(DraftField::CardCvv, args.card_cvv),
	];
	for (field, value) in fields {
		if let Some(value) = value {
			flow.set_field(field, value);
		}
	}

	// Walk the steps; any rejection stops with per-field messages.
	loop {
		match flow.next().await {
			StepOutcome::Advanced { step } => {
				tracing::debug!(step, "Advanced checkout step");
			}
			StepOutcome::Rejected(errors) => {
				eprintln!("Step {} is incomplete:", errors.step);
				for error in &errors.errors {
					eprintln!("  {} {}", error.field, error.message);
				}
				bail!("checkout blocked by validation");
			}
			StepOutcome::AtFinalStep => break,
		}
	}

	match flow.submit().await {
		SubmitOutcome::Accepted { message } => {
			println!("{}", message);
			println!("Confirmation for product {}.", args.product_id);
			Ok(())
		}
		SubmitOutcome::Rejected { message } => bail!("order rejected: {}", message),
		SubmitOutcome::TransportFailed { message } => bail!("{}", message),
		SubmitOutcome::ProductUnavailable => bail!("product not found"),
		SubmitOutcome::Invalid(errors) => {
			for error in &errors.errors {
				eprintln!("  {} {}", error.field, error.message);
			}
			bail!("checkout blocked by validation")
		}
		SubmitOutcome::AlreadyInFlight | SubmitOutcome::AlreadySubmitted => {
			bail!("submission already handled")
		}
	}
}

fn print_product_row(product: &Product) {
	println!(
		"{:>4}  {:<32} {:>12}  {:<17} {}",
		product.id,
		product.name,
		product.price,
		product.status,
		product.category
	);
}

/// Prints every notification raised while the command ran.
fn drain_notifications(mut events: Receiver<StorefrontEvent>) {
	while let Ok(event) = events.try_recv() {
		if let Some(notification) = notification_for(&event) {
			let prefix = match notification.kind {
				NotificationKind::Success => "ok",
				NotificationKind::Error => "error",
				NotificationKind::Info => "info",
				NotificationKind::Warning => "warn",
			};
			println!("[{}] {}", prefix, notification.message);
		}
	}
}
