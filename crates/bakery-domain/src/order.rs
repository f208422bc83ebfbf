//! Domain models for storefront orders and their fulfillment lifecycle.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{common::*, lenient};

/// Prefix shared by every client-visible order number.
pub const ORDER_NUMBER_PREFIX: &str = "ASI";

/// Builds an order number from the last six digits of the creation instant in milliseconds.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    format!(
        "{}{:06}",
        ORDER_NUMBER_PREFIX,
        now.timestamp_millis().rem_euclid(1_000_000)
    )
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, deserialize_with = "lenient::text")]
    pub order_number: String,
    #[serde(
        default,
        deserialize_with = "lenient::record",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer: Option<Customer>,
    /// Flat customer fields carried by legacy single-product orders.
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub product: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::record",
        skip_serializing_if = "Option::is_none"
    )]
    pub delivery: Option<Delivery>,
    #[serde(
        default,
        deserialize_with = "lenient::list",
        skip_serializing_if = "Option::is_none"
    )]
    pub items: Option<Vec<OrderItem>>,
    #[serde(default, deserialize_with = "lenient_payment")]
    pub payment: Payment,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "lenient_notes")]
    pub notes: Vec<OrderNote>,
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Creates a cart-based order in the `pending` state.
    pub fn from_cart(customer: Customer, items: Vec<OrderItem>, payment: Payment) -> Self {
        Self {
            order_number: String::new(),
            customer: Some(customer),
            name: None,
            email: None,
            phone: None,
            product: None,
            message: None,
            delivery: None,
            items: Some(items),
            payment,
            status: OrderStatus::Pending,
            notes: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Creates a legacy single-product order, which carries no line items.
    pub fn legacy(name: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            order_number: String::new(),
            customer: None,
            name: Some(name.into()),
            email: None,
            phone: None,
            product: Some(product.into()),
            message: None,
            delivery: None,
            items: None,
            payment: Payment::default(),
            status: OrderStatus::Pending,
            notes: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Customer display name, falling back to the legacy flat field.
    pub fn customer_name(&self) -> Option<&str> {
        self.customer
            .as_ref()
            .and_then(|customer| customer.name.as_deref())
            .or(self.name.as_deref())
    }

    /// Line items, empty for legacy orders.
    pub fn line_items(&self) -> &[OrderItem] {
        self.items.as_deref().unwrap_or_default()
    }

    /// `true` when the order has neither line items nor a legacy product.
    pub fn is_empty(&self) -> bool {
        self.line_items().is_empty()
            && self
                .product
                .as_deref()
                .map_or(true, |product| product.trim().is_empty())
    }

    /// Σ price × quantity over the line items.
    pub fn items_total(&self) -> f64 {
        add_up(self.line_items().iter().map(OrderItem::line_total))
    }

    /// Whether the order contributes to revenue in its current state.
    pub fn counts_as_revenue(&self) -> bool {
        self.status.counts_as_revenue()
    }

    /// Latest note timestamp, if any note was written.
    pub fn last_note_at(&self) -> Option<DateTime<Utc>> {
        self.notes.iter().map(|note| note.timestamp).max()
    }
}

impl Amounted for Order {
    /// Uses the stored payment total when present and non-zero; otherwise the
    /// item sum. Legacy orders without a total are worth zero.
    fn amount(&self) -> f64 {
        match self.payment.total {
            Some(total) if total != 0.0 => finite_or_zero(total),
            _ => finite_or_zero(self.items_total()),
        }
    }
}

impl Dated for Order {
    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl Displayable for Order {
    fn display_label(&self) -> String {
        format!("order:{} [{}]", self.order_number, self.status)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
}

impl Customer {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Delivery {
    /// `delivery` or `pickup`.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::quantity",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
}

impl OrderItem {
    pub fn new(name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            price: Some(price),
            quantity: Some(quantity),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// price × quantity; a missing factor makes the line worth zero.
    pub fn line_total(&self) -> f64 {
        match (self.price, self.quantity) {
            (Some(price), Some(quantity)) => finite_or_zero(price * f64::from(quantity)),
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub method: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub subtotal: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub delivery_fee: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<f64>,
}

impl Payment {
    pub fn method(method: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            ..Self::default()
        }
    }

    pub fn with_total(mut self, total: f64) -> Self {
        self.total = Some(total);
        self
    }
}

/// Operator-written free text attached to an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderNote {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Enumerates the fulfillment state of an order.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Successor states reachable in one step.
    pub fn allowed_transitions(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
            OrderStatus::Confirmed => &[OrderStatus::Preparing, OrderStatus::Cancelled],
            OrderStatus::Preparing => &[OrderStatus::Ready, OrderStatus::Cancelled],
            OrderStatus::Ready => &[OrderStatus::Delivered, OrderStatus::Cancelled],
            OrderStatus::Delivered => &[OrderStatus::Completed],
            OrderStatus::Completed | OrderStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Only delivered and completed orders are booked as revenue.
    pub fn counts_as_revenue(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownStatus(value.trim().to_string()))
    }
}

/// Raised when a status name is not part of the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown order status `{}`", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

/// Controls whether edges outside the lifecycle graph are rejected.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Only edges in the lifecycle graph are accepted.
    #[default]
    Strict,
    /// Any edge is accepted; illegal ones are reported by the caller.
    Permissive,
}

impl TransitionPolicy {
    pub fn permits(self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            TransitionPolicy::Strict => from == to || from.can_transition_to(to),
            TransitionPolicy::Permissive => true,
        }
    }
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransitionPolicy::Strict => "strict",
            TransitionPolicy::Permissive => "permissive",
        };
        f.write_str(label)
    }
}

fn lenient_status<'de, D>(deserializer: D) -> Result<OrderStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::label(deserializer)?
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default())
}

fn lenient_payment<'de, D>(deserializer: D) -> Result<Payment, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::record(deserializer)?.unwrap_or_default())
}

/// Stored note as written by any storefront build; entries missing text or a
/// readable timestamp are dropped.
#[derive(Deserialize)]
struct StoredNote {
    #[serde(default, deserialize_with = "lenient::label")]
    text: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    timestamp: Option<DateTime<Utc>>,
}

fn lenient_notes<'de, D>(deserializer: D) -> Result<Vec<OrderNote>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored: Option<Vec<StoredNote>> = lenient::list(deserializer)?;
    Ok(stored
        .unwrap_or_default()
        .into_iter()
        .filter_map(|note| {
            Some(OrderNote {
                text: note.text?,
                timestamp: note.timestamp?,
            })
        })
        .collect())
}
