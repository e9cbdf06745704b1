//! Checkout: order summary, form validation and order submission.
//!
//! Payment is simulated. Once the form validates, the order is recorded on
//! the hosted platform through an [`OrderSink`], stock is decremented for each
//! line, and the cart is cleared.
//!
//! # Flow
//!
//! ```text
//! signed in? -> cart non-empty? -> form valid? -> create order -> set stock -> clear cart
//! ```
//!
//! A failure to create the order leaves the cart untouched. Stock updates that
//! fail after the order exists are reported on the receipt for manual review
//! instead of failing the checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::{Email, EmailError, OrderId, ProductId, UserId};
use thiserror::Error;
use tracing::instrument;

use crate::line::CartLine;
use crate::state::CartState;
use crate::storage::KeyValueStore;
use crate::store::CartStore;

type PlatformError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Reasons a checkout is refused.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("you must be signed in to check out")]
    NotSignedIn,

    #[error("cart is empty")]
    EmptyCart,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("card number must be 16 digits")]
    InvalidCardNumber,

    #[error("expiry must be MM/YY")]
    InvalidExpiry,

    #[error("CVV must be 3 or 4 digits")]
    InvalidCvv,

    /// The platform refused to record the order.
    #[error("failed to record order: {0}")]
    Platform(#[source] PlatformError),
}

// =============================================================================
// Summary
// =============================================================================

/// Amounts shown on the checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSummary {
    pub item_count: u64,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl CheckoutSummary {
    /// Flat-rate shipping applies only when the subtotal is positive.
    #[must_use]
    pub fn from_state(state: &CartState, shipping_flat_rate: Decimal) -> Self {
        let subtotal = state.total_amount();
        let shipping = if subtotal > Decimal::ZERO {
            shipping_flat_rate
        } else {
            Decimal::ZERO
        };
        Self {
            item_count: state.total_items(),
            subtotal,
            shipping,
            total: subtotal.checked_add(shipping).unwrap_or_else(|| {
                tracing::warn!("Checkout total overflow, saturating");
                Decimal::MAX
            }),
        }
    }
}

// =============================================================================
// Form
// =============================================================================

/// Raw checkout form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    pub customer_name: String,
    pub customer_email: String,
    pub shipping_address: String,
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
}

/// Customer details that survive validation. Card data is never kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub customer_name: String,
    pub customer_email: Email,
    pub shipping_address: String,
}

impl CheckoutForm {
    /// Check every field and return the customer details.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, checking fields in form order.
    pub fn validate(&self) -> Result<CustomerDetails, CheckoutError> {
        let fields = [
            ("customer_name", &self.customer_name),
            ("customer_email", &self.customer_email),
            ("shipping_address", &self.shipping_address),
            ("card_number", &self.card_number),
            ("expiry", &self.expiry),
            ("cvv", &self.cvv),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(CheckoutError::MissingField(*name));
        }

        let customer_email = Email::parse(&self.customer_email)?;

        let card = self.card_number.trim();
        if card.len() != 16 || !all_digits(card) {
            return Err(CheckoutError::InvalidCardNumber);
        }
        if !valid_expiry(self.expiry.trim()) {
            return Err(CheckoutError::InvalidExpiry);
        }
        let cvv = self.cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !all_digits(cvv) {
            return Err(CheckoutError::InvalidCvv);
        }

        Ok(CustomerDetails {
            customer_name: self.customer_name.trim().to_string(),
            customer_email,
            shipping_address: self.shipping_address.trim().to_string(),
        })
    }
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Accepts `MM/YY` or `MMYY` with a month of 01-12.
fn valid_expiry(expiry: &str) -> bool {
    let digits: String = match expiry.len() {
        5 if expiry.as_bytes().get(2) == Some(&b'/') => expiry.replacen('/', "", 1),
        4 => expiry.to_string(),
        _ => return false,
    };
    if !all_digits(&digits) {
        return false;
    }
    digits
        .get(..2)
        .and_then(|month| month.parse::<u8>().ok())
        .is_some_and(|month| (1..=12).contains(&month))
}

// =============================================================================
// Orders
// =============================================================================

/// Order lifecycle status as recorded on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Completed,
}

/// One purchased line, with the price captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub product_price: Decimal,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.id().clone(),
            product_name: line.product.name.clone(),
            quantity: line.quantity,
            product_price: line.unit_price(),
        }
    }
}

/// Order as submitted to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub user_id: UserId,
    #[serde(flatten)]
    pub customer: CustomerDetails,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// The hosted platform's order and catalog tables.
pub trait OrderSink {
    /// The error type returned by platform calls.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Record an order and its items, returning the platform-assigned id.
    ///
    /// # Errors
    ///
    /// Returns the platform error if the order was not recorded.
    fn create_order(&mut self, draft: &OrderDraft) -> Result<OrderId, Self::Error>;

    /// Overwrite a product's stock level.
    ///
    /// # Errors
    ///
    /// Returns the platform error if the update was not applied.
    fn set_stock(&mut self, product_id: &ProductId, stock: u32) -> Result<(), Self::Error>;
}

/// A stock update that failed after the order was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockIssue {
    pub product_id: ProductId,
    pub error: String,
}

/// Result of a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub summary: CheckoutSummary,
    pub items: Vec<CartLine>,
    pub stock_issues: Vec<StockIssue>,
}

/// Submit the cart as an order.
///
/// On success the cart is cleared. On any error the cart is left as it was.
///
/// # Errors
///
/// - [`CheckoutError::NotSignedIn`] if `user` is `None`
/// - [`CheckoutError::EmptyCart`] if there is nothing to buy
/// - a form validation error
/// - [`CheckoutError::Platform`] if the order could not be recorded
#[instrument(skip(store, sink, form), fields(lines = store.lines().len()))]
pub fn checkout<S, O>(
    store: &mut CartStore<S>,
    sink: &mut O,
    user: Option<UserId>,
    form: &CheckoutForm,
    shipping_flat_rate: Decimal,
) -> Result<OrderReceipt, CheckoutError>
where
    S: KeyValueStore,
    O: OrderSink,
{
    let user_id = user.ok_or(CheckoutError::NotSignedIn)?;
    if store.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let customer = form.validate()?;

    let summary = CheckoutSummary::from_state(store.state(), shipping_flat_rate);
    let items: Vec<CartLine> = store.lines().to_vec();
    let draft = OrderDraft {
        user_id,
        customer,
        status: OrderStatus::Completed,
        items: items.iter().map(OrderItem::from).collect(),
        subtotal: summary.subtotal,
        shipping: summary.shipping,
        total_amount: summary.total,
        created_at: Utc::now(),
    };

    let order_id = sink
        .create_order(&draft)
        .map_err(|e| CheckoutError::Platform(Box::new(e)))?;
    tracing::info!(%order_id, total = %summary.total, "Order recorded");

    let mut stock_issues = Vec::new();
    for line in &items {
        let remaining = line.stock().saturating_sub(line.quantity);
        if let Err(e) = sink.set_stock(line.id(), remaining) {
            tracing::error!(
                %order_id,
                product_id = %line.id(),
                error = %e,
                "Failed to update stock after order"
            );
            stock_issues.push(StockIssue {
                product_id: line.id().clone(),
                error: e.to_string(),
            });
        }
    }

    store.clear_cart();

    Ok(OrderReceipt {
        order_id,
        summary,
        items,
        stock_issues,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal_macros::dec;
    use shopfront_core::Product;

    use super::*;
    use crate::storage::MemoryStore;

    #[derive(Debug, Error)]
    #[error("platform unavailable")]
    struct Unavailable;

    #[derive(Default)]
    struct RecordingSink {
        orders: Vec<OrderDraft>,
        stock: HashMap<ProductId, u32>,
        reject_orders: bool,
        reject_stock_for: Option<ProductId>,
    }

    impl OrderSink for RecordingSink {
        type Error = Unavailable;

        fn create_order(&mut self, draft: &OrderDraft) -> Result<OrderId, Self::Error> {
            if self.reject_orders {
                return Err(Unavailable);
            }
            self.orders.push(draft.clone());
            Ok(OrderId::generate())
        }

        fn set_stock(&mut self, product_id: &ProductId, stock: u32) -> Result<(), Self::Error> {
            if self.reject_stock_for.as_ref() == Some(product_id) {
                return Err(Unavailable);
            }
            self.stock.insert(product_id.clone(), stock);
            Ok(())
        }
    }

    fn product(id: &str, price: Decimal, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price,
            image_url: None,
            category: "general".to_string(),
            stock,
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            customer_name: "Ana Ruiz".to_string(),
            customer_email: "ana@example.com".to_string(),
            shipping_address: "Calle 1, Madrid".to_string(),
            card_number: "4242424242424242".to_string(),
            expiry: "09/29".to_string(),
            cvv: "123".to_string(),
        }
    }

    fn filled_store() -> CartStore<MemoryStore> {
        let mut store = CartStore::load_default(MemoryStore::new());
        let a = product("a", dec!(8.5), 2);
        store.add_item(&a);
        store.add_item(&a);
        store.add_item(&product("b", dec!(3), 10));
        store
    }

    #[test]
    fn test_summary_adds_shipping_when_not_empty() {
        let store = filled_store();
        let summary = CheckoutSummary::from_state(store.state(), dec!(5));
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.subtotal, dec!(20));
        assert_eq!(summary.shipping, dec!(5));
        assert_eq!(summary.total, dec!(25));
    }

    #[test]
    fn test_summary_empty_cart_has_no_shipping() {
        let summary = CheckoutSummary::from_state(&CartState::new(), dec!(5));
        assert_eq!(summary.shipping, Decimal::ZERO);
        assert_eq!(summary.total, Decimal::ZERO);
    }

    #[test]
    fn test_summary_saturates_at_max() {
        let mut store = CartStore::load_default(MemoryStore::new());
        store.add_item(&product("vault", Decimal::MAX, 2));

        let summary = CheckoutSummary::from_state(store.state(), dec!(5));
        assert_eq!(summary.subtotal, Decimal::MAX);
        assert_eq!(summary.shipping, dec!(5));
        assert_eq!(summary.total, Decimal::MAX);
    }

    #[test]
    fn test_form_validation() {
        assert!(form().validate().is_ok());

        let mut f = form();
        f.shipping_address = "   ".to_string();
        assert!(matches!(
            f.validate(),
            Err(CheckoutError::MissingField("shipping_address"))
        ));

        let mut f = form();
        f.customer_email = "ana".to_string();
        assert!(matches!(f.validate(), Err(CheckoutError::InvalidEmail(_))));

        let mut f = form();
        f.card_number = "4242 4242 4242 4242".to_string();
        assert!(matches!(f.validate(), Err(CheckoutError::InvalidCardNumber)));

        let mut f = form();
        f.cvv = "12a".to_string();
        assert!(matches!(f.validate(), Err(CheckoutError::InvalidCvv)));
    }

    #[test]
    fn test_expiry_formats() {
        assert!(valid_expiry("01/27"));
        assert!(valid_expiry("1227"));
        assert!(!valid_expiry("13/27"));
        assert!(!valid_expiry("00/27"));
        assert!(!valid_expiry("1/27"));
        assert!(!valid_expiry("12-27"));
        assert!(!valid_expiry("ab/cd"));
    }

    #[test]
    fn test_checkout_records_order_and_clears_cart() {
        let mut store = filled_store();
        let mut sink = RecordingSink::default();
        let user = UserId::generate();

        let receipt = checkout(&mut store, &mut sink, Some(user), &form(), dec!(5)).unwrap();

        assert!(store.is_empty());
        assert!(receipt.stock_issues.is_empty());
        assert_eq!(receipt.summary.total, dec!(25));
        assert_eq!(receipt.items.len(), 2);

        let order = sink.orders.first().unwrap();
        assert_eq!(order.user_id, user);
        assert_eq!(order.total_amount, dec!(25));
        assert_eq!(order.items.first().unwrap().quantity, 2);
        assert_eq!(order.items.first().unwrap().product_price, dec!(8.5));

        assert_eq!(sink.stock.get(&ProductId::new("a")), Some(&0));
        assert_eq!(sink.stock.get(&ProductId::new("b")), Some(&9));
    }

    #[test]
    fn test_checkout_requires_user_and_items() {
        let mut store = filled_store();
        let mut sink = RecordingSink::default();
        assert!(matches!(
            checkout(&mut store, &mut sink, None, &form(), dec!(5)),
            Err(CheckoutError::NotSignedIn)
        ));
        assert!(!store.is_empty());

        let mut empty = CartStore::load_default(MemoryStore::new());
        assert!(matches!(
            checkout(&mut empty, &mut sink, Some(UserId::generate()), &form(), dec!(5)),
            Err(CheckoutError::EmptyCart)
        ));
        assert!(sink.orders.is_empty());
    }

    #[test]
    fn test_rejected_order_keeps_cart() {
        let mut store = filled_store();
        let before = store.state().clone();
        let mut sink = RecordingSink {
            reject_orders: true,
            ..RecordingSink::default()
        };

        let result = checkout(&mut store, &mut sink, Some(UserId::generate()), &form(), dec!(5));
        assert!(matches!(result, Err(CheckoutError::Platform(_))));
        assert_eq!(store.state(), &before);
        assert!(sink.stock.is_empty());
    }

    #[test]
    fn test_stock_failure_is_reported_not_fatal() {
        let mut store = filled_store();
        let mut sink = RecordingSink {
            reject_stock_for: Some(ProductId::new("b")),
            ..RecordingSink::default()
        };

        let receipt =
            checkout(&mut store, &mut sink, Some(UserId::generate()), &form(), dec!(5)).unwrap();
        assert!(store.is_empty());
        assert_eq!(receipt.stock_issues.len(), 1);
        assert_eq!(receipt.stock_issues.first().unwrap().product_id, "b");
        assert_eq!(sink.stock.get(&ProductId::new("a")), Some(&0));
    }
}
