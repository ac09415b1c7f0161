//! The persisted order aggregate

use crate::core::date::DateLike;
use crate::core::error::OrderResult;
use crate::core::store::Document;
use crate::entities::client::ClientSnapshot;
use crate::entities::item::OrderItem;
use crate::entities::payment::Payment;
use crate::entities::serde_helpers::{
    lenient_decimal, lenient_opt_decimal, lenient_opt_string, lenient_string, lenient_vec,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pickup at the shop or delivery to an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    #[default]
    Retirada,
    Entrega,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Retirada => "retirada",
            DeliveryType::Entrega => "entrega",
        }
    }

    /// Lenient parse of a select/radio value
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "retirada" => Some(DeliveryType::Retirada),
            "entrega" => Some(DeliveryType::Entrega),
            _ => None,
        }
    }
}

/// Stored shape of an order document
///
/// Dates are kept in their raw external representation ([`DateLike`]);
/// normalisation happens when the document is loaded into a form.
/// Optional fields left unset are omitted when serialized, never written
/// as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderDocument {
    #[serde(default, deserialize_with = "lenient_string")]
    pub order_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientSnapshot>,

    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<OrderItem>,

    #[serde(default, deserialize_with = "lenient_vec")]
    pub payments: Vec<Payment>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,

    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<DateLike>,

    #[serde(default)]
    pub delivery_type: DeliveryType,

    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt_decimal", skip_serializing_if = "Option::is_none")]
    pub delivery_cost: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub discount: Decimal,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub extra_services: Decimal,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_value: Decimal,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_paid: Decimal,

    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub image_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateLike>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateLike>,

    /// Legacy alias of `updated_at` still read by older report pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateLike>,
}

impl OrderDocument {
    /// Serialize to the JSON object handed to the store
    pub fn to_value(&self) -> OrderResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// An order as listed: store id plus document
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub id: String,
    pub document: OrderDocument,
}

impl OrderRecord {
    pub fn new(id: impl Into<String>, document: OrderDocument) -> Self {
        Self {
            id: id.into(),
            document,
        }
    }

    pub fn from_document(document: &Document) -> OrderResult<Self> {
        Ok(Self::new(document.id.clone(), document.parse()?))
    }

    /// Creation date, `None` when missing or unparseable
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.document
            .created_at
            .as_ref()
            .and_then(|d| d.normalize().ok())
    }

    /// Delivery date, `None` when missing or unparseable
    pub fn delivery_date(&self) -> Option<DateTime<Utc>> {
        self.document
            .delivery_date
            .as_ref()
            .and_then(|d| d.normalize().ok())
    }

    pub fn client_name(&self) -> &str {
        self.document
            .client
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("")
    }

    pub fn seller_name(&self) -> &str {
        self.document.seller_name.as_deref().unwrap_or("")
    }

    pub fn total_value(&self) -> Decimal {
        self.document.total_value
    }
}

/// Human-readable order number: `YYMMDD` plus a 3-digit random suffix
///
/// Display-only. Two orders created on the same day can collide; the store
/// id is the identity.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("{}{:03}", now.format("%y%m%d"), suffix)
}
