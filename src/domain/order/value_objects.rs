use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Fulfillment status of an order.
///
/// The catalogue is closed: every status the back office knows about is a
/// variant here, each bound to the id the API uses for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Processing,
    Processed,
    Delivering,
    Delivered,
    Cancelled,
}

/// Badge colour class for a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Success,
    Warning,
    Error,
    Info,
}

const PROCESSING_ID: Uuid = Uuid::from_u128(0x4113050c_3721_11f0_8560_902e16d96d3f);
const PROCESSED_ID: Uuid = Uuid::from_u128(0x4115c88e_3721_11f0_8560_902e16d96d3f);
const DELIVERING_ID: Uuid = Uuid::from_u128(0x4115ce99_3721_11f0_8560_902e16d96d3f);
const DELIVERED_ID: Uuid = Uuid::from_u128(0x4115d074_3721_11f0_8560_902e16d96d3f);
const CANCELLED_ID: Uuid = Uuid::from_u128(0x4115d225_3721_11f0_8560_902e16d96d3f);

impl OrderStatus {
    /// Read-only catalogue, in progression order with the terminal status last.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Processing,
        OrderStatus::Processed,
        OrderStatus::Delivering,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub const fn id(self) -> Uuid {
        match self {
            OrderStatus::Processing => PROCESSING_ID,
            OrderStatus::Processed => PROCESSED_ID,
            OrderStatus::Delivering => DELIVERING_ID,
            OrderStatus::Delivered => DELIVERED_ID,
            OrderStatus::Cancelled => CANCELLED_ID,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Processed => "Processed",
            OrderStatus::Delivering => "Delivering",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Resolve a status id coming from the API
    pub fn from_id(id: Uuid) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.id() == id)
    }

    /// Case-insensitive lookup by display name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.name().eq_ignore_ascii_case(name))
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }

    /// Position on the progress indicator; `None` for the terminal status.
    pub const fn rank(self) -> Option<u8> {
        match self {
            OrderStatus::Processing => Some(0),
            OrderStatus::Processed => Some(1),
            OrderStatus::Delivering => Some(2),
            OrderStatus::Delivered => Some(3),
            OrderStatus::Cancelled => None,
        }
    }

    pub const fn tone(self) -> StatusTone {
        match self {
            OrderStatus::Delivered => StatusTone::Success,
            OrderStatus::Processing => StatusTone::Warning,
            OrderStatus::Cancelled => StatusTone::Error,
            OrderStatus::Processed | OrderStatus::Delivering => StatusTone::Info,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Human label for a raw status id, falling back to the id itself.
pub fn status_label(status_id: Uuid) -> String {
    match OrderStatus::from_id(status_id) {
        Some(status) => status.name().to_string(),
        None => status_id.to_string(),
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    pub price: Decimal,
    pub quantity: u32,
}

/// Order aggregate as served by the API.
///
/// `status_id` stays a raw id so that ids missing from the catalogue can
/// still be loaded and reported.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub status_id: Uuid,
    pub customer_id: Uuid,
    #[serde(default)]
    pub coupon_id: Option<Uuid>,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub items: Vec<OrderItem>,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub order_approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_delivered_carrier_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_delivered_customer_date: Option<DateTime<Utc>>,
}

impl Order {
    pub fn status(&self) -> Option<OrderStatus> {
        OrderStatus::from_id(self.status_id)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status_id == OrderStatus::Cancelled.id()
    }

    pub fn milestones(&self) -> MilestoneDates {
        MilestoneDates {
            order_approved_at: self.order_approved_at,
            order_delivered_carrier_date: self.order_delivered_carrier_date,
            order_delivered_customer_date: self.order_delivered_customer_date,
        }
    }
}

/// The three timeline milestones. `None` clears a milestone.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneDates {
    pub order_approved_at: Option<DateTime<Utc>>,
    pub order_delivered_carrier_date: Option<DateTime<Utc>>,
    pub order_delivered_customer_date: Option<DateTime<Utc>>,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_ids_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(
            OrderStatus::Cancelled.id().to_string(),
            "4115d225-3721-11f0-8560-902e16d96d3f"
        );
        assert_eq!(OrderStatus::from_id(Uuid::new_v4()), None);
    }

    #[test]
    fn test_only_cancelled_is_terminal() {
        let terminal: Vec<_> = OrderStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![OrderStatus::Cancelled]);
    }

    #[test]
    fn test_from_name_ignores_case() {
        assert_eq!(OrderStatus::from_name("delivering"), Some(OrderStatus::Delivering));
        assert_eq!(OrderStatus::from_name(" CANCELLED "), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::from_name("Pending"), None);
    }

    #[test]
    fn test_status_tones() {
        assert_eq!(OrderStatus::Delivered.tone(), StatusTone::Success);
        assert_eq!(OrderStatus::Processing.tone(), StatusTone::Warning);
        assert_eq!(OrderStatus::Cancelled.tone(), StatusTone::Error);
        assert_eq!(OrderStatus::Delivering.tone(), StatusTone::Info);
    }

    #[test]
    fn test_status_label_falls_back_to_id() {
        let unknown = Uuid::new_v4();
        assert_eq!(status_label(OrderStatus::Processed.id()), "Processed");
        assert_eq!(status_label(unknown), unknown.to_string());
    }

    #[test]
    fn test_order_deserializes_from_api_shape() {
        let json = serde_json::json!({
            "id": "0b8f6a52-5a43-4a39-9d7e-7a4d3b0a9a11",
            "statusId": "4113050c-3721-11f0-8560-902e16d96d3f",
            "customerId": "5b0c1a52-5a43-4a39-9d7e-7a4d3b0a9a22",
            "items": [
                { "productId": "7c0c1a52-5a43-4a39-9d7e-7a4d3b0a9a33", "price": 19.5, "quantity": 2 }
            ],
            "totalPrice": 39.0,
            "createdAt": "2025-05-20T08:15:00Z",
            "orderApprovedAt": null
        });

        let order: Order = serde_json::from_value(json).unwrap();
        assert_eq!(order.status(), Some(OrderStatus::Processing));
        assert_eq!(order.coupon_id, None);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].price, Decimal::new(195, 1));
        assert!(order.order_delivered_customer_date.is_none());
    }

    #[test]
    fn test_null_items_deserialize_as_empty() {
        let json = serde_json::json!({
            "id": "0b8f6a52-5a43-4a39-9d7e-7a4d3b0a9a11",
            "statusId": "4113050c-3721-11f0-8560-902e16d96d3f",
            "customerId": "5b0c1a52-5a43-4a39-9d7e-7a4d3b0a9a22",
            "items": null,
            "totalPrice": 0,
            "createdAt": "2025-05-20T08:15:00Z"
        });

        let order: Order = serde_json::from_value(json).unwrap();
        assert!(order.items.is_empty());
    }

    #[test]
    fn test_milestones_serialize_as_instants_or_null() {
        let dates = MilestoneDates {
            order_approved_at: Some("2025-01-01T00:00:00Z".parse().unwrap()),
            ..Default::default()
        };

        let json = serde_json::to_value(dates).unwrap();
        assert_eq!(json["orderApprovedAt"], "2025-01-01T00:00:00Z");
        assert!(json["orderDeliveredCarrierDate"].is_null());
        assert!(json["orderDeliveredCustomerDate"].is_null());
    }
}
