//! Product catalog entries (read-only for the order engine)

use crate::core::store::{Document, DocumentStore};
use crate::core::error::OrderResult;
use crate::entities::serde_helpers::{lenient_decimal, lenient_opt_decimal, lenient_string};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the line total of a product is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Priced per unit count
    #[default]
    Standard,
    /// Priced per unit area (width × height, in metres)
    CustomSize,
}

/// Unit the price refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PricingType {
    #[default]
    Unit,
    Area,
    Hour,
}

fn default_active() -> bool {
    true
}

/// A product as stored in the `products` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing)]
    pub id: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    /// Base price, used when a category-specific price is absent
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Decimal,

    #[serde(default, deserialize_with = "lenient_opt_decimal", skip_serializing_if = "Option::is_none")]
    pub price_final: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient_opt_decimal", skip_serializing_if = "Option::is_none")]
    pub price_reseller: Option<Decimal>,

    #[serde(default)]
    pub product_type: ProductType,

    #[serde(default)]
    pub pricing_type: PricingType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Default text for the description of new order items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,
}

impl Product {
    pub fn is_custom_size(&self) -> bool {
        self.product_type == ProductType::CustomSize
    }

    /// Description pre-filled into a new item
    pub fn item_description(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name)
    }

    /// Build from a stored document, taking the id from the document key
    pub fn from_document(document: &Document) -> OrderResult<Self> {
        let mut product: Product = document.parse()?;
        product.id = document.id.clone();
        Ok(product)
    }
}

/// In-memory lookup of products by id, in store order
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: IndexMap<String, Product>,
}

impl ProductCatalog {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Load the whole products collection
    ///
    /// Malformed product documents are skipped with a warning.
    pub async fn load(store: &dyn DocumentStore, collection: &str) -> OrderResult<Self> {
        let documents = store.get_all(collection).await?;
        let products = documents.iter().filter_map(|doc| match Product::from_document(doc) {
            Ok(product) => Some(product),
            Err(err) => {
                tracing::warn!(product_id = %doc.id, error = %err, "skipping malformed product");
                None
            }
        });
        Ok(Self::new(products))
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    /// Products offered in the item picker
    pub fn active(&self) -> impl Iterator<Item = &Product> {
        self.products.values().filter(|p| p.active)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
