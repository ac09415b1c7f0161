//! First-run demo data
//!
//! [`DemoSeeder`] fills an empty store with a fixed set of clients, products
//! and orders so the order list is never blank on a fresh install. It never
//! touches a store that already holds orders or clients.

use crate::config::CollectionNames;
use crate::core::date::DateLike;
use crate::core::error::OrderResult;
use crate::core::store::DocumentStore;
use crate::entities::{
    ClientCategory, ClientSnapshot, DeliveryType, OrderDocument, OrderItem, Payment,
    PaymentMethod, PricingType, Product, ProductType,
};
use crate::pricing::PricingCalculator;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

/// What a seeding run did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub clients: usize,
    pub products: usize,
    pub orders: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.clients == 0 && self.products == 0 && self.orders == 0
    }
}

/// Inserts demo data behind an emptiness check
pub struct DemoSeeder {
    store: Arc<dyn DocumentStore>,
    collections: CollectionNames,
    pricing: PricingCalculator,
}

impl DemoSeeder {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        collections: CollectionNames,
        pricing: PricingCalculator,
    ) -> Self {
        Self {
            store,
            collections,
            pricing,
        }
    }

    /// Seed only when both the orders and the clients collections are empty
    ///
    /// Demo documents use fixed ids, so running twice never duplicates data.
    pub async fn seed_if_empty(&self, now: DateTime<Utc>) -> OrderResult<SeedReport> {
        let (orders_empty, clients_empty) = futures::try_join!(
            self.store.is_empty(&self.collections.orders),
            self.store.is_empty(&self.collections.clients),
        )?;
        if !(orders_empty && clients_empty) {
            tracing::debug!(orders_empty, clients_empty, "store has data, skipping demo seed");
            return Ok(SeedReport::default());
        }

        let mut report = SeedReport::default();

        let clients = demo_clients();
        for client in &clients {
            self.store
                .set(&self.collections.clients, &client.id, serde_json::to_value(client)?)
                .await?;
            report.clients += 1;
        }

        let products = demo_products();
        for product in &products {
            self.store
                .set(&self.collections.products, &product.id, serde_json::to_value(product)?)
                .await?;
            report.products += 1;
        }

        for (id, order) in self.demo_orders(&clients, &products, now) {
            self.store
                .set(&self.collections.orders, id, order.to_value()?)
                .await?;
            report.orders += 1;
        }

        tracing::info!(
            clients = report.clients,
            products = report.products,
            orders = report.orders,
            "demo data seeded"
        );
        Ok(report)
    }

    fn item(
        &self,
        product: &Product,
        category: ClientCategory,
        quantity: i64,
        size: Option<(i64, i64)>,
    ) -> OrderItem {
        let mut item = OrderItem {
            product_id: Some(product.id.clone()),
            product_name: product.name.clone(),
            product_type: product.product_type,
            category: product.category.clone(),
            quantity: Decimal::from(quantity),
            unit_price: self.pricing.category_price(product, category),
            description: product.item_description().to_string(),
            ..OrderItem::empty()
        };
        if let Some((width, height)) = size {
            item.width = Decimal::from(width);
            item.height = Decimal::from(height);
            item.area = self.pricing.area(item.width, item.height);
        }
        item.total = self.pricing.compute_item_total(&item);
        item
    }

    fn demo_orders(
        &self,
        clients: &[ClientSnapshot],
        products: &[Product],
        now: DateTime<Utc>,
    ) -> Vec<(&'static str, OrderDocument)> {
        let (ana, grafica) = (&clients[0], &clients[1]);
        let (cards, banner, mugs) = (&products[0], &products[1], &products[2]);

        let mut first = OrderDocument {
            order_number: format!("{}001", now.format("%y%m%d")),
            client: Some(ana.clone()),
            items: vec![
                self.item(cards, ana.category, 2, None),
                self.item(banner, ana.category, 1, Some((2, 1))),
            ],
            status: "em_producao".to_string(),
            delivery_date: Some(DateLike::timestamp(&(now + Duration::days(2)))),
            delivery_type: DeliveryType::Retirada,
            seller_name: Some("Demonstração".to_string()),
            created_at: Some(DateLike::timestamp(&(now - Duration::days(1)))),
            ..Default::default()
        };
        let first_totals = self
            .pricing
            .compute_order_totals(&first.items, Decimal::ZERO, Decimal::ZERO, None, &[]);
        first.payments = vec![Payment::new(
            PaymentMethod::Pix,
            first_totals.grand_total / Decimal::TWO,
            now - Duration::days(1),
        )];

        let mut second = OrderDocument {
            order_number: format!("{}002", now.format("%y%m%d")),
            client: Some(grafica.clone()),
            items: vec![self.item(mugs, grafica.category, 12, None)],
            status: "pendente".to_string(),
            notes: Some("Arte enviada por e-mail".to_string()),
            delivery_date: Some(DateLike::timestamp(&(now + Duration::days(5)))),
            delivery_type: DeliveryType::Entrega,
            delivery_address: Some("Av. Brasil, 1500".to_string()),
            delivery_cost: Some(Decimal::from(15)),
            discount: Decimal::from(10),
            seller_name: Some("Demonstração".to_string()),
            created_at: Some(DateLike::timestamp(&now)),
            ..Default::default()
        };

        for order in [&mut first, &mut second] {
            let totals = self.pricing.compute_order_totals(
                &order.items,
                order.discount,
                order.extra_services,
                order.delivery_cost,
                &order.payments,
            );
            order.total_value = totals.grand_total;
            order.total_paid = totals.paid_total;
            order.updated_at = order.created_at.clone();
        }

        vec![("demo-order-1", first), ("demo-order-2", second)]
    }
}

fn demo_clients() -> Vec<ClientSnapshot> {
    vec![
        ClientSnapshot {
            phone: Some("(11) 98888-1234".to_string()),
            email: Some("ana.souza@example.com".to_string()),
            ..ClientSnapshot::new("demo-client-1", "Ana Souza", ClientCategory::Final)
        },
        ClientSnapshot {
            document: Some("12.345.678/0001-90".to_string()),
            address: Some("Av. Brasil, 1500".to_string()),
            ..ClientSnapshot::new("demo-client-2", "Gráfica Parceira", ClientCategory::Reseller)
        },
        ClientSnapshot::new("demo-client-3", "Érico Lima", ClientCategory::Final),
    ]
}

fn demo_products() -> Vec<Product> {
    vec![
        Product {
            id: "demo-product-cards".to_string(),
            name: "Cartão de visita".to_string(),
            price: Decimal::from(90),
            price_final: Some(Decimal::from(100)),
            price_reseller: Some(Decimal::from(75)),
            category: Some("papel couché".to_string()),
            description: Some("1000 unidades, 4x4 cores".to_string()),
            active: true,
            ..Default::default()
        },
        Product {
            id: "demo-product-banner".to_string(),
            name: "Banner lona".to_string(),
            price: Decimal::from(50),
            product_type: ProductType::CustomSize,
            pricing_type: PricingType::Area,
            category: Some("lona".to_string()),
            active: true,
            ..Default::default()
        },
        Product {
            id: "demo-product-mugs".to_string(),
            name: "Caneca personalizada".to_string(),
            price: Decimal::from(30),
            category: Some("cerâmica".to_string()),
            active: true,
            ..Default::default()
        },
        Product {
            id: "demo-product-design".to_string(),
            name: "Criação de arte".to_string(),
            price: Decimal::from(80),
            pricing_type: PricingType::Hour,
            active: true,
            ..Default::default()
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::Query;
    use crate::storage::InMemoryDocumentStore;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn seeder(store: &InMemoryDocumentStore) -> DemoSeeder {
        DemoSeeder::new(
            Arc::new(store.clone()),
            CollectionNames::default(),
            PricingCalculator::default(),
        )
    }

    #[tokio::test]
    async fn test_seeds_empty_store() {
        let store = InMemoryDocumentStore::new();
        let report = seeder(&store).seed_if_empty(Utc::now()).await.unwrap();

        assert_eq!(
            report,
            SeedReport {
                clients: 3,
                products: 4,
                orders: 2
            }
        );
        let orders = store.query("orders", &Query::new()).await.unwrap();
        assert_eq!(orders.len(), 2);

        // Card 2 × 100 + banner 2 m² × 50
        let first: OrderDocument = store
            .get("orders", "demo-order-1")
            .await
            .unwrap()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(first.total_value, dec!(300));
        assert_eq!(first.total_paid, dec!(150));

        // Reseller mugs 12 × 24 + 15 delivery − 10 discount
        let second: OrderDocument = store
            .get("orders", "demo-order-2")
            .await
            .unwrap()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(second.total_value, dec!(293));
    }

    #[tokio::test]
    async fn test_second_run_is_noop() {
        let store = InMemoryDocumentStore::new();
        let seeder = seeder(&store);
        seeder.seed_if_empty(Utc::now()).await.unwrap();
        let writes = store.write_count();

        let report = seeder.seed_if_empty(Utc::now()).await.unwrap();
        assert!(report.is_empty());
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn test_existing_client_blocks_seeding() {
        let store = InMemoryDocumentStore::new();
        store
            .set("clients", "c1", json!({"name": "Cliente real"}))
            .await
            .unwrap();

        let report = seeder(&store).seed_if_empty(Utc::now()).await.unwrap();
        assert!(report.is_empty());
        assert!(store.get_all("orders").await.unwrap().is_empty());
    }
}
