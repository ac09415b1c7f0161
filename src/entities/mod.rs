//! Order, item, payment, client and product records as stored

pub mod client;
pub mod item;
pub mod order;
pub mod payment;
pub mod product;
pub mod serde_helpers;

pub use client::{ClientCategory, ClientSnapshot};
pub use item::OrderItem;
pub use order::{DeliveryType, OrderDocument, OrderRecord, generate_order_number};
pub use payment::{Payment, PaymentMethod};
pub use product::{PricingType, Product, ProductCatalog, ProductType};
