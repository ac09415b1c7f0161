//! Save/load/delete of orders through the persistence adapter and the editor.

#[macro_use]
mod store_harness;

use chrono::TimeZone;
use printshop::prelude::*;
use printshop::testing::{RecordingFormView, RecordingNotifier, ScriptedConfirm, StaticSession};
use rust_decimal_macros::dec;
use serde_json::json;
use store_harness::*;
use tokio_test::{assert_err, assert_ok};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 12, 30, 0).unwrap()
}

fn adapter(store: &InMemoryDocumentStore, confirm: ScriptedConfirm) -> OrderPersistenceAdapter {
    OrderPersistenceAdapter::new(
        Arc::new(store.clone()),
        Arc::new(confirm),
        Arc::new(AppConfig::default()),
    )
}

async fn filled_state() -> OrderFormState {
    let mut state = OrderFormState::new(context());
    state.init_new(Some(Seller::new("u1", "Marina")), now());
    state
        .select_client(client(ClientCategory::Final), &AlwaysConfirm)
        .await;
    state.add_item(Some("cards"));
    state
}

#[tokio::test]
async fn scenario_f_save_without_items_writes_nothing() {
    let store = InMemoryDocumentStore::new();
    let adapter = adapter(&store, ScriptedConfirm::always(true));

    let mut state = OrderFormState::new(context());
    state.init_new(None, now());
    state
        .select_client(client(ClientCategory::Final), &AlwaysConfirm)
        .await;

    let err = adapter.save(&mut state, false).await.unwrap_err();
    assert!(matches!(
        err,
        OrderError::Validation(ValidationError::MissingItems)
    ));
    assert_eq!(err.to_string(), "Validation error: no items");
    assert_eq!(store.write_count(), 0);
    assert!(state.id().is_none());
}

#[tokio::test]
async fn save_without_client_is_rejected() {
    let store = InMemoryDocumentStore::new();
    let adapter = adapter(&store, ScriptedConfirm::always(true));

    let mut state = OrderFormState::new(context());
    state.init_new(None, now());
    state.add_item(Some("cards"));

    let err = assert_err!(adapter.save(&mut state, false).await);
    assert!(matches!(
        err,
        OrderError::Validation(ValidationError::MissingClient)
    ));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn create_assigns_id_and_persists_totals() {
    let store = InMemoryDocumentStore::new();
    let adapter = adapter(&store, ScriptedConfirm::always(true));
    let mut state = filled_state().await;
    state.add_payment(now());
    state.update_payment_field(0, PaymentField::Amount, "20");

    let id = assert_ok!(adapter.save(&mut state, false).await);

    assert_eq!(state.id(), Some(id.as_str()));
    assert_eq!(state.phase(), FormPhase::Saved);
    let doc = store.get("orders", &id).await.unwrap().unwrap();
    assert_eq!(doc.data["totalValue"], 120.0);
    assert_eq!(doc.data["totalPaid"], 20.0);
    assert_eq!(doc.data["sellerName"], "Marina");
    assert_eq!(doc.data["client"]["name"], "Ana Souza");
    assert!(doc.data.get("deliveryCost").is_none());
    assert!(doc.data["createdAt"]["seconds"].is_i64());
    assert_eq!(doc.data["orderNumber"], state.order_number());
}

#[tokio::test]
async fn edit_preserves_created_at_and_order_number() {
    let store = InMemoryDocumentStore::new();
    store
        .set(
            "orders",
            "o1",
            json!({
                "orderNumber": "240101007",
                "client": {"id": "c1", "name": "Ana Souza", "category": "final"},
                "items": [{"productId": "cards", "productName": "Cartão de visita",
                           "quantity": 1, "unitPrice": 120, "total": 120}],
                "status": "pendente",
                "createdAt": {"seconds": 1704067200, "nanoseconds": 0}
            }),
        )
        .await
        .unwrap();
    let adapter = adapter(&store, ScriptedConfirm::always(true));

    let document = adapter.load("o1").await.unwrap();
    let mut state = OrderFormState::new(context());
    state.init_from_existing("o1", &document, now());
    state.update_item_field(0, ItemField::Quantity, "3");

    let id = adapter.save(&mut state, true).await.unwrap();
    assert_eq!(id, "o1");

    let saved: OrderDocument = store.get("orders", "o1").await.unwrap().unwrap().parse().unwrap();
    assert_eq!(saved.order_number, "240101007");
    assert_eq!(
        saved.created_at,
        Some(DateLike::StoreTimestamp {
            seconds: 1704067200,
            nanoseconds: 0
        })
    );
    assert_eq!(saved.total_value, dec!(360));
    assert!(saved.updated_at.is_some());
    assert_eq!(store.get_all("orders").await.unwrap().len(), 1);
}

#[tokio::test]
async fn document_round_trip() {
    let adapter = adapter(&InMemoryDocumentStore::new(), ScriptedConfirm::always(true));
    let original: OrderDocument = serde_json::from_value(json!({
        "orderNumber": "240509123",
        "client": {"id": "c2", "name": "Gráfica Parceira", "phone": "(11) 3333-4444",
                   "category": "reseller"},
        "items": [
            {"id": "i1", "productId": "banner", "productName": "Banner lona",
             "productType": "custom_size", "category": "lona", "quantity": 2,
             "unitPrice": 40, "width": 1.5, "height": 1, "area": 1.5, "total": 120,
             "description": "Com aplicação", "completed": true},
            {"id": "i2", "productName": "Arte", "quantity": 1, "unitPrice": 80,
             "total": 80, "description": ""}
        ],
        "payments": [{"id": "p1", "method": "pix", "amount": 50,
                      "date": {"seconds": 1715000000, "nanoseconds": 0}, "reference": "sinal"}],
        "status": "em_producao",
        "notes": "Entregar na portaria",
        "deliveryDate": {"seconds": 1715600000, "nanoseconds": 0},
        "deliveryType": "entrega",
        "deliveryAddress": "Av. Brasil, 1500",
        "deliveryCost": 15,
        "discount": 5,
        "extraServices": 10,
        "totalValue": 220,
        "totalPaid": 50,
        "sellerId": "u1",
        "sellerName": "Marina",
        "imageUrl": "https://cdn.example.com/arte.png",
        "imageTitle": "Arte final",
        "createdAt": {"seconds": 1715000000, "nanoseconds": 0},
        "updatedAt": {"seconds": 1715000000, "nanoseconds": 0}
    }))
    .unwrap();

    let mut state = OrderFormState::new(context());
    state.init_from_existing("o9", &original, now());
    let rebuilt = adapter.to_document(&state, true, now());

    let expected = OrderDocument {
        updated_at: rebuilt.updated_at.clone(),
        last_update: rebuilt.last_update.clone(),
        ..original
    };
    assert_eq!(rebuilt, expected);
}

#[tokio::test]
async fn payment_dates_are_not_invented_on_save() {
    let adapter = adapter(&InMemoryDocumentStore::new(), ScriptedConfirm::always(true));
    let original: OrderDocument = serde_json::from_value(json!({
        "orderNumber": "240509124",
        "items": [{"id": "i1", "productName": "Arte", "quantity": 1, "unitPrice": 80}],
        "payments": [
            {"id": "p1", "method": "pix", "amount": 30},
            {"id": "p2", "method": "dinheiro", "amount": 20, "date": "na entrega"}
        ],
        "status": "pendente"
    }))
    .unwrap();

    let mut state = OrderFormState::new(context());
    state.init_from_existing("o10", &original, now());
    let rebuilt = adapter.to_document(&state, true, now()).to_value().unwrap();

    let payments = rebuilt["payments"].as_array().unwrap();
    assert!(payments[0].get("date").is_none());
    assert_eq!(payments[1]["date"], "na entrega");
    assert_eq!(rebuilt["totalPaid"], 50.0);
}

#[tokio::test]
async fn storage_failure_keeps_state_for_retry() {
    let store = InMemoryDocumentStore::new();
    let adapter = adapter(&store, ScriptedConfirm::always(true));
    let mut state = filled_state().await;
    let items = state.items().to_vec();

    store.simulate_outage(true);
    let err = adapter.save(&mut state, false).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(state.phase(), FormPhase::Editing);
    assert_eq!(state.items(), items.as_slice());
    assert!(state.id().is_none());

    store.simulate_outage(false);
    assert!(adapter.save(&mut state, false).await.is_ok());
}

#[tokio::test]
async fn edit_of_deleted_order_is_not_found() {
    let store = InMemoryDocumentStore::new();
    let adapter = adapter(&store, ScriptedConfirm::always(true));
    let mut state = filled_state().await;
    let id = adapter.save(&mut state, false).await.unwrap();

    store.delete("orders", &id).await.unwrap();
    let err = adapter.save(&mut state, true).await.unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn delete_requires_confirmation() {
    let store = InMemoryDocumentStore::new();
    let id = store.add("orders", json!({"status": "pendente"})).await.unwrap();

    let declined = adapter(&store, ScriptedConfirm::always(false));
    assert_eq!(declined.delete(&id).await.unwrap(), false);
    assert!(store.get("orders", &id).await.unwrap().is_some());

    let accepted = adapter(&store, ScriptedConfirm::always(true));
    assert!(accepted.delete(&id).await.unwrap());
    assert!(store.get("orders", &id).await.unwrap().is_none());

    let err = accepted.delete(&id).await.unwrap_err();
    assert!(matches!(err, OrderError::NotFound(_)));
}

#[tokio::test]
async fn editor_notifies_outcomes() {
    let store = InMemoryDocumentStore::new();
    let notifier = Arc::new(RecordingNotifier::new());
    let services = EditorServices {
        store: Arc::new(store.clone()),
        confirm: Arc::new(ScriptedConfirm::always(true)),
        notifier: notifier.clone(),
        session: Arc::new(StaticSession::signed_in("u7", "Joana")),
    };
    let mut editor = OrderEditor::new(context(), RecordingFormView::new(), services);
    editor.start_new(now());
    assert_eq!(editor.state().seller_name(), Some("Joana"));

    // No client yet
    assert!(editor.save().await.is_err());
    let (level, message) = notifier.last().unwrap();
    assert_eq!(level, NoticeLevel::Warning);
    assert!(message.contains("cliente"));

    editor.select_client(client(ClientCategory::Final)).await;
    let index = editor.add_item(Some("banner"));
    editor.view_mut().type_into(FieldKey::ItemWidth(index), "3");
    editor.view_mut().type_into(FieldKey::ItemHeight(index), "1");
    editor.on_item_input(index);
    assert_eq!(editor.view().text(FieldKey::GrandTotal), Some("R$ 150,00"));

    let id = editor.save().await.unwrap();
    assert_eq!(notifier.last().unwrap().0, NoticeLevel::Success);

    assert!(editor.delete().await.unwrap());
    assert_eq!(editor.phase(), FormPhase::Deleted);
    assert!(store.get("orders", &id).await.unwrap().is_none());

    let err = editor.open(&id, now()).await.unwrap_err();
    assert!(matches!(err, OrderError::NotFound(_)));
    assert!(notifier.last().unwrap().1.contains("não encontrado"));
}
