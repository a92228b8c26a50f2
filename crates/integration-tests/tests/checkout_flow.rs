//! Integration tests for checkout: stock deduction, hand-off and cart reset.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;

use simea_core::cart::PersistentCart;
use simea_core::catalog::seed_catalog;
use simea_core::checkout::{CheckoutOutcome, CheckoutSequencer, CheckoutState};
use simea_core::{PriceSchedule, Product, StoreSettings};
use simea_integration_tests::{
    CountingRefresh, InMemoryCatalogStore, MemoryCartStorage, RecordingHandoff,
};

fn priced(mut product: Product, unit: i64, wholesale: i64, bulk: i64) -> Product {
    product.pricing = PriceSchedule::new(
        Decimal::from(unit),
        Decimal::from(wholesale),
        Decimal::from(bulk),
    );
    product.stock = 20;
    product
}

async fn three_product_store() -> (InMemoryCatalogStore, Vec<Product>) {
    let seed = seed_catalog();
    let products = vec![
        priced(seed[0].clone(), 1000, 900, 800),
        priced(seed[1].clone(), 2500, 2200, 2000),
        priced(seed[2].clone(), 600, 550, 500),
    ];
    let store = InMemoryCatalogStore::with_products(&products).await;
    let stored = store.snapshot().await;
    (store, stored)
}

#[tokio::test]
async fn test_checkout_with_failing_middle_decrement() {
    let (store, products) = three_product_store().await;
    let (a, b, c) = (&products[0], &products[1], &products[2]);
    store.fail_decrement(b.id).await;

    let storage = MemoryCartStorage::new();
    let mut cart = PersistentCart::restore(storage.clone()).await;
    cart.add_line(a, "S", &a.colors[0], 3).await.unwrap();
    cart.add_line(b, "M", &b.colors[0], 8).await.unwrap();
    cart.add_line(c, "L", &c.colors[0], 13).await.unwrap();

    let handoff = RecordingHandoff::new();
    let refresh = CountingRefresh::new();
    let settings = StoreSettings::default();
    let transfer = settings.select_payment_method(Some("transferencia")).unwrap();

    let receipt = CheckoutSequencer::new(&store, &handoff, &refresh)
        .checkout(&mut cart, transfer, &settings.store_name)
        .await;

    // Deduction stops at the failing line.
    assert_eq!(store.decrement_calls().await, vec![(a.id, 3), (b.id, 8)]);
    assert_eq!(store.stock_of(a.id).await, Some(17));
    assert_eq!(store.stock_of(b.id).await, Some(20));
    assert_eq!(store.stock_of(c.id).await, Some(20));

    match &receipt.outcome {
        CheckoutOutcome::CompletedDegraded { failure } => assert_eq!(failure.product_id, b.id),
        CheckoutOutcome::Completed => panic!("expected a degraded checkout"),
    }
    assert_eq!(
        receipt.transitions,
        vec![
            CheckoutState::Idle,
            CheckoutState::Deducting,
            CheckoutState::NotifyingDegraded,
            CheckoutState::Completed,
        ]
    );

    // The order is still handed off with every line.
    // 3 × 1000 + 8 × 2200 + 13 × 500
    assert_eq!(receipt.total, Decimal::from(27_100));
    let messages = handoff.messages().await;
    assert_eq!(messages.len(), 1);
    let message = urlencoding::decode(&messages[0]).unwrap();
    assert_eq!(message, receipt.message);
    assert!(message.contains(&a.name));
    assert!(message.contains(&b.name));
    assert!(message.contains(&c.name));
    assert!(message.contains("💰 *Total: $\u{a0}27.100*"));
    assert!(message.contains("📝 "));

    // Cart reset and persisted, catalog refreshed once.
    assert!(cart.cart().is_empty());
    assert!(!cart.cart().is_open());
    assert!(PersistentCart::restore(storage).await.cart().is_empty());
    assert_eq!(refresh.calls(), 1);
}

#[tokio::test]
async fn test_checkout_deducts_every_line() {
    let (store, products) = three_product_store().await;

    let mut cart = PersistentCart::restore(MemoryCartStorage::new()).await;
    for product in &products {
        cart.add_line(product, "M", &product.colors[0], 6).await.unwrap();
    }

    let handoff = RecordingHandoff::new();
    let refresh = CountingRefresh::new();
    let settings = StoreSettings::default();
    let cash = settings.select_payment_method(Some("efectivo")).unwrap();

    let receipt = CheckoutSequencer::new(&store, &handoff, &refresh)
        .checkout(&mut cart, cash, &settings.store_name)
        .await;

    assert_eq!(receipt.outcome, CheckoutOutcome::Completed);
    assert_eq!(receipt.outcome.notice(), simea_core::checkout::COMPLETED_NOTICE);
    assert_eq!(receipt.stock_updates.len(), 3);
    for product in &products {
        assert_eq!(store.stock_of(product.id).await, Some(14));
    }
    assert!(!receipt.message.contains("📝"));
    assert_eq!(refresh.calls(), 1);
}

#[tokio::test]
async fn test_checkout_of_seed_products_is_degraded() {
    let store = InMemoryCatalogStore::new();
    let product = seed_catalog().remove(0);

    let mut cart = PersistentCart::restore(MemoryCartStorage::new()).await;
    cart.add_line(&product, "S", "Negro", 1).await.unwrap();

    let handoff = RecordingHandoff::new();
    let refresh = CountingRefresh::new();
    let settings = StoreSettings::default();
    let method = settings.select_payment_method(None).unwrap();

    let receipt = CheckoutSequencer::new(&store, &handoff, &refresh)
        .checkout(&mut cart, method, &settings.store_name)
        .await;

    assert!(receipt.outcome.is_degraded());
    assert_eq!(receipt.outcome.notice(), simea_core::checkout::DEGRADED_NOTICE);
    assert_eq!(handoff.messages().await.len(), 1);
    assert!(cart.cart().is_empty());
}

#[tokio::test]
async fn test_unreachable_store_still_hands_off() {
    let (store, products) = three_product_store().await;
    store.set_unavailable(true);

    let mut cart = PersistentCart::restore(MemoryCartStorage::new()).await;
    cart.add_line(&products[0], "S", &products[0].colors[0], 1)
        .await
        .unwrap();
    cart.add_line(&products[1], "S", &products[1].colors[0], 1)
        .await
        .unwrap();

    let handoff = RecordingHandoff::new();
    let refresh = CountingRefresh::new();
    let settings = StoreSettings::default();
    let method = settings.select_payment_method(None).unwrap();

    let receipt = CheckoutSequencer::new(&store, &handoff, &refresh)
        .checkout(&mut cart, method, &settings.store_name)
        .await;

    assert!(receipt.outcome.is_degraded());
    assert_eq!(store.decrement_calls().await.len(), 1);
    assert!(receipt.handoff_link.starts_with("https://wa.me/"));
}
