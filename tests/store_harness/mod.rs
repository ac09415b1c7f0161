//! Shared test harness for document store backends
//!
//! Provides order/product fixtures and the `document_store_tests!` macro that
//! validates any `DocumentStore` implementation against the full contract.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//! use store_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod document_store_tests;

use printshop::prelude::*;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

/// Stored order document with the given status, total and creation second
pub fn order_json(status: &str, total: f64, created_seconds: i64) -> Value {
    json!({
        "orderNumber": format!("240510{:03}", created_seconds % 1000),
        "client": {"id": "c1", "name": "Ana Souza", "category": "final"},
        "items": [],
        "payments": [],
        "status": status,
        "totalValue": total,
        "totalPaid": 0,
        "createdAt": {"seconds": created_seconds, "nanoseconds": 0}
    })
}

pub fn banner() -> Product {
    Product {
        id: "banner".to_string(),
        name: "Banner lona".to_string(),
        price: dec!(50),
        product_type: ProductType::CustomSize,
        pricing_type: PricingType::Area,
        category: Some("lona".to_string()),
        active: true,
        ..Default::default()
    }
}

pub fn business_cards() -> Product {
    Product {
        id: "cards".to_string(),
        name: "Cartão de visita".to_string(),
        price: dec!(100),
        price_final: Some(dec!(120)),
        price_reseller: Some(dec!(90)),
        category: Some("papel couché".to_string()),
        active: true,
        ..Default::default()
    }
}

pub fn catalog() -> ProductCatalog {
    ProductCatalog::new(vec![banner(), business_cards()])
}

pub fn context() -> FormContext {
    FormContext::new(AppConfig::default(), catalog())
}

pub fn client(category: ClientCategory) -> ClientSnapshot {
    ClientSnapshot::new("c1", "Ana Souza", category)
}
