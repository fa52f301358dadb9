//! Order records as served by the orders API
//!
//! Money fields are decimals on the server side and arrive either as JSON
//! strings (`"12.50"`) or as plain numbers, depending on the serializer. Both
//! forms are accepted; amounts are always sent back as two-decimal strings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lifecycle status of an order.
///
/// Unknown values are kept verbatim in [`OrderStatus::Other`] so a newer
/// backend does not break older clients. Transitions are not validated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
    Delayed,
    Cancelled,
    Ready,
    Completed,
    Other(String),
}

impl OrderStatus {
    /// Every status the backend currently knows about
    pub const KNOWN: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Rejected,
        OrderStatus::Delayed,
        OrderStatus::Cancelled,
        OrderStatus::Ready,
        OrderStatus::Completed,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Delayed => "delayed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Other(value) => value,
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "accepted" => OrderStatus::Accepted,
            "rejected" => OrderStatus::Rejected,
            "delayed" => OrderStatus::Delayed,
            "cancelled" => OrderStatus::Cancelled,
            "ready" => OrderStatus::Ready,
            "completed" => OrderStatus::Completed,
            _ => OrderStatus::Other(value.to_string()),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(OrderStatus::from(s))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(OrderStatus::from(value.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    #[serde(serialize_with = "serialize_amount", deserialize_with = "deserialize_amount")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(serialize_with = "serialize_amount", deserialize_with = "deserialize_amount")]
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub ready_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub special_instructions: Option<String>,
    /// Short per-day number printed on tickets, when the backend assigns one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_number: Option<u32>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Short label for the board: `#<display_number>`, else the last three
    /// digits of a numeric id suffix, else the last three characters of the id.
    pub fn display_label(&self) -> String {
        if let Some(number) = self.display_number.filter(|n| *n > 0) {
            return format!("#{}", number);
        }

        let digits = self
            .id
            .chars()
            .rev()
            .take_while(char::is_ascii_digit)
            .count();
        if digits >= 3 {
            return format!("#{}", &self.id[self.id.len() - 3..]);
        }

        let tail: String = {
            let chars: Vec<char> = self.id.chars().collect();
            chars[chars.len().saturating_sub(3)..].iter().collect()
        };
        format!("#{}", tail)
    }

    /// Total number of units across all items
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Body of a create request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    #[serde(serialize_with = "serialize_amount")]
    pub total_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    pub items: Vec<OrderItem>,
}

impl NewOrder {
    /// Order with the total computed from `items`
    pub fn new(
        id: impl Into<String>,
        customer_name: impl Into<String>,
        customer_phone: impl Into<String>,
        delivery_address: impl Into<String>,
        items: Vec<OrderItem>,
    ) -> Self {
        let total_amount = items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum();

        Self {
            id: id.into(),
            customer_name: customer_name.into(),
            customer_phone: customer_phone.into(),
            delivery_address: delivery_address.into(),
            total_amount,
            status: None,
            special_instructions: None,
            items,
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_special_instructions(mut self, text: impl Into<String>) -> Self {
        self.special_instructions = Some(text.into());
        self
    }
}

/// Body of a status change request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct StatusUpdate<'a> {
    pub status: &'a OrderStatus,
}

fn serialize_amount<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.2}", value))
}

fn deserialize_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Number(value) => Ok(value),
        Amount::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid decimal amount {:?}", text))),
    }
}
