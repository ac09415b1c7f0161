//! Order desk walkthrough
//!
//! Seeds an in-memory store with demo data, fills a new order through the
//! editor the way a page would (raw text typed into fields, one reconcile per
//! input event), saves it and watches the live order list pick it up.
//!
//! ```sh
//! RUST_LOG=printshop=debug cargo run --example order_desk
//! ```

use anyhow::Result;
use printshop::prelude::*;
use printshop::listing::sort;
use printshop::testing::{RecordingFormView, RecordingNotifier, ScriptedConfirm, StaticSession};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("printshop=info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_yaml_file(&path)?,
        None => AppConfig::default(),
    };

    let shared: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::from_config(&config.store));

    let seeder = DemoSeeder::new(
        Arc::clone(&shared),
        config.collections.clone(),
        PricingCalculator::new(&config.pricing),
    );
    let report = seeder.seed_if_empty(Utc::now()).await?;
    println!(
        "Seeded {} clients, {} products, {} orders",
        report.clients, report.products, report.orders
    );

    let catalog = ProductCatalog::load(shared.as_ref(), &config.collections.products).await?;
    println!("Catalog: {} products", catalog.len());

    let mut list = LiveOrderList::load(
        Arc::clone(&shared),
        &config.collections.orders,
        config.store.list_limit,
    )
    .await?;

    let notifier = Arc::new(RecordingNotifier::new());
    let services = EditorServices {
        store: Arc::clone(&shared),
        confirm: Arc::new(ScriptedConfirm::always(true)),
        notifier: notifier.clone(),
        session: Arc::new(StaticSession::signed_in("seller-1", "Marina")),
    };
    let symbol = config.display.currency_symbol.clone();
    let mut editor = OrderEditor::new(FormContext::new(config, catalog), RecordingFormView::new(), services);

    editor.start_new(Utc::now());
    editor
        .select_client(ClientSnapshot::new(
            "demo-client-2",
            "Gráfica Parceira",
            ClientCategory::Reseller,
        ))
        .await;

    let banner = editor.add_item(Some("demo-product-banner"));
    editor.view_mut().type_into(FieldKey::ItemWidth(banner), "3,5");
    editor.view_mut().type_into(FieldKey::ItemHeight(banner), "1,2");
    editor.view_mut().type_into(FieldKey::ItemQuantity(banner), "2");
    editor.on_item_input(banner);

    let cards = editor.add_item(Some("demo-product-cards"));
    editor.view_mut().type_into(FieldKey::ItemQuantity(cards), "3");
    editor.on_item_input(cards);

    editor.view_mut().type_into(FieldKey::DeliveryType, "entrega");
    editor.view_mut().type_into(FieldKey::DeliveryCost, "25,00");
    editor.view_mut().type_into(FieldKey::Discount, "10");
    editor.on_order_input();

    let payment = editor.add_payment(Utc::now());
    editor.view_mut().type_into(FieldKey::PaymentMethod(payment), "pix");
    editor.view_mut().type_into(FieldKey::PaymentAmount(payment), "100");
    editor.on_payment_input(payment);

    for key in [
        FieldKey::Subtotal,
        FieldKey::GrandTotal,
        FieldKey::PaidTotal,
        FieldKey::Remaining,
    ] {
        println!("{:?}: {}", key, editor.view().text(key).unwrap_or("-"));
    }

    let id = editor.save().await?;
    if let Some((_, message)) = notifier.last() {
        println!("{}", message);
    }

    match list.next_update().await? {
        Some(ListUpdate::Delta { id, kind, .. }) => println!("Live list: {:?} {}", kind, id),
        Some(ListUpdate::Reloaded { missed, .. }) => {
            println!("Live list reloaded after missing {} changes", missed)
        }
        None => {}
    }

    let orders = sort(&list.orders(), SortKey::ValueDesc);
    for order in &orders {
        println!(
            "  {:<10} {:<20} {:>14}",
            order.document.order_number,
            order.client_name(),
            format_currency(order.total_value(), &symbol)
        );
    }

    let summary = summarize(&orders);
    println!(
        "{} orders, {} outstanding",
        summary.count,
        format_currency(summary.outstanding, &symbol)
    );

    editor.delete().await?;
    println!("Order {} deleted: {:?}", id, editor.phase());
    Ok(())
}
