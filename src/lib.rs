//! # Print-shop order engine
//!
//! Pricing, totals and form-state reconciliation for print-shop orders,
//! persisted in a collection-oriented document store.
//!
//! ## Features
//!
//! - **Pricing**: client-category prices, manual overrides, custom-size
//!   (area) products, order totals rounded half away from zero
//! - **Form state**: one in-memory order as the single source of truth,
//!   kept consistent after every edit
//! - **Reconciliation**: locale-aware parsing of raw form input and
//!   write-back of formatted derived values
//! - **Persistence**: create/update/delete through a `DocumentStore`, legacy
//!   field migration on read, demo-data seeding on first run
//! - **Order list**: filtering, stable sorting, live updates from the change
//!   feed and sales summaries
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use printshop::prelude::*;
//!
//! let config = AppConfig::default();
//! let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
//! let catalog = ProductCatalog::load(store.as_ref(), &config.collections.products).await?;
//!
//! let mut state = OrderFormState::new(FormContext::new(config, catalog));
//! state.init_new(None, Utc::now());
//! let index = state.add_item(Some("banner"));
//! state.update_item_field(index, ItemField::Width, "2,5");
//! state.update_item_field(index, ItemField::Height, "1");
//! println!("{}", state.totals().grand_total);
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod form;
pub mod listing;
pub mod persistence;
pub mod pricing;
pub mod storage;
pub mod testing;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        AlwaysConfirm, ConfirmDialog, Document, DocumentStore, NoSession, NoticeLevel, Notifier,
        Seller, SessionProvider, SettingsStore,
    };

    // === Errors ===
    pub use crate::core::{
        ConfigError, ErrorNotice, NotFoundError, OrderError, OrderResult, ParseError,
        StorageError, ValidationError,
    };

    // === Primitives ===
    pub use crate::core::locale::{
        format_currency, format_date, format_date_time, format_decimal, format_number,
        parse_decimal, round2,
    };
    pub use crate::core::{
        ChangeFeed, ChangeKind, DateLike, DocumentChange, EventBus, FeedEvent, Query, SortDirection,
        WhereOp,
    };

    // === Entities ===
    pub use crate::entities::{
        ClientCategory, ClientSnapshot, DeliveryType, OrderDocument, OrderItem, OrderRecord,
        Payment, PaymentMethod, PricingType, Product, ProductCatalog, ProductType,
    };

    // === Pricing ===
    pub use crate::pricing::{OrderTotals, PricingCalculator};

    // === Form ===
    pub use crate::form::{
        EditorServices, FieldKey, FormContext, FormPhase, FormReconciler, FormView, ItemField,
        OrderEditor, OrderFormState, PaymentField, ProductionProgress,
    };

    // === Persistence ===
    pub use crate::persistence::{DemoSeeder, OrderPersistenceAdapter, SeedReport};

    // === Listing ===
    pub use crate::listing::{
        CreatedBucket, ListUpdate, LiveOrderList, OpenOrderChange, OrderFilter,
        OrderListFilterSort, OrderSummary, SortKey, summarize,
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryDocumentStore;

    // === Config ===
    pub use crate::config::{
        AppConfig, CollectionNames, DisplayConfig, OrderConfig, PricingConfig, StoreConfig,
    };

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
}
