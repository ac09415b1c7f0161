//! Order line items

use crate::entities::product::ProductType;
use crate::entities::serde_helpers::{lenient_decimal, lenient_opt_string, lenient_string};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_quantity() -> Decimal {
    Decimal::ONE
}

fn is_zero(value: &Decimal) -> bool {
    value.is_zero()
}

/// One line of an order
///
/// `width`, `height` and `area` are only meaningful for custom-size products
/// and are expressed in metres / square metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default = "new_item_id", deserialize_with = "lenient_string")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    /// Product name at the time the item was added
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_name: String,

    #[serde(default)]
    pub product_type: ProductType,

    /// Product category at the time the item was added (material filter)
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default = "default_quantity", deserialize_with = "lenient_decimal")]
    pub quantity: Decimal,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub unit_price: Decimal,

    #[serde(default, deserialize_with = "lenient_decimal", skip_serializing_if = "is_zero")]
    pub width: Decimal,

    #[serde(default, deserialize_with = "lenient_decimal", skip_serializing_if = "is_zero")]
    pub height: Decimal,

    #[serde(default, deserialize_with = "lenient_decimal", skip_serializing_if = "is_zero")]
    pub area: Decimal,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total: Decimal,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,

    /// Production finished for this line
    #[serde(default)]
    pub completed: bool,
}

fn new_item_id() -> String {
    Uuid::new_v4().to_string()
}

impl Default for OrderItem {
    fn default() -> Self {
        Self {
            id: new_item_id(),
            product_id: None,
            product_name: String::new(),
            product_type: ProductType::Standard,
            category: None,
            quantity: Decimal::ONE,
            unit_price: Decimal::ZERO,
            width: Decimal::ZERO,
            height: Decimal::ZERO,
            area: Decimal::ZERO,
            total: Decimal::ZERO,
            description: String::new(),
            completed: false,
        }
    }
}

impl OrderItem {
    /// Empty item shell with a fresh id
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_custom_size(&self) -> bool {
        self.product_type == ProductType::CustomSize
    }
}
