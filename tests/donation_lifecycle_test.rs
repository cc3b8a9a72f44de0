mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use foodbank_api::{
    entities::donation::DonationStatus,
    errors::ServiceError,
    services::donation_lifecycle::NewDonation,
};

use common::{
    catalog_products, inventory_for, movement_headers, movement_lines, seed_deposit,
    seed_donation, seed_inventory, seed_product, setup, DEFAULT_DEPOSIT,
};

fn new_donation(product_name: &str, quantity: rust_decimal::Decimal) -> NewDonation {
    NewDonation {
        donor_id: Uuid::new_v4(),
        catalog_item_id: None,
        product_name: product_name.to_string(),
        product_category: Some("Grains".to_string()),
        quantity,
        unit_label: "kg".to_string(),
        expiry_date: None,
    }
}

#[tokio::test]
async fn create_registers_pending_donation() {
    let app = setup().await;

    let donation = app
        .lifecycle
        .create(new_donation("Rice", dec!(5)))
        .await
        .expect("create failed");

    assert_eq!(donation.status, "pending");
    assert_eq!(donation.quantity, dec!(5));
    assert!(donation.updated_at.is_none());
}

#[tokio::test]
async fn create_rejects_nonpositive_quantity() {
    let app = setup().await;

    let err = app
        .lifecycle
        .create(new_donation("Rice", dec!(0)))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let err = app
        .lifecycle
        .create(new_donation("Rice", dec!(-2)))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn pickup_persists_status_without_inventory_effect() {
    let app = setup().await;
    let donation = app
        .lifecycle
        .create(new_donation("Rice", dec!(5)))
        .await
        .unwrap();

    let outcome = app
        .lifecycle
        .transition(donation.id, DonationStatus::PickedUp)
        .await
        .expect("transition failed");

    assert_eq!(outcome.donation.status, "picked_up");
    assert!(outcome.donation.updated_at.is_some());
    assert!(outcome.sync_warning.is_none());
    assert!(movement_headers(&app.db).await.is_empty());
    assert!(catalog_products(&app.db).await.is_empty());
}

#[tokio::test]
async fn cancellation_is_terminal() {
    let app = setup().await;
    let donation = app
        .lifecycle
        .create(new_donation("Rice", dec!(5)))
        .await
        .unwrap();

    app.lifecycle
        .transition(donation.id, DonationStatus::Cancelled)
        .await
        .expect("cancel failed");

    let err = app
        .lifecycle
        .transition(donation.id, DonationStatus::PickedUp)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn invalid_edges_are_rejected_without_write() {
    let app = setup().await;
    let donation = app
        .lifecycle
        .create(new_donation("Rice", dec!(5)))
        .await
        .unwrap();

    // Pending cannot jump straight to Delivered
    let err = app
        .lifecycle
        .transition(donation.id, DonationStatus::Delivered)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let unchanged = app.lifecycle.get(donation.id).await.unwrap();
    assert_eq!(unchanged.status, "pending");
    assert!(unchanged.updated_at.is_none());
    assert!(movement_headers(&app.db).await.is_empty());
}

#[tokio::test]
async fn transition_of_unknown_donation_is_not_found() {
    let app = setup().await;

    let err = app
        .lifecycle
        .transition(Uuid::new_v4(), DonationStatus::PickedUp)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

// Scenario: no prior stock; delivering 5 kg creates the inventory row and
// exactly one header + one ingress line.
#[tokio::test]
async fn delivery_creates_inventory_and_ledger_entries() {
    let app = setup().await;
    let donation = app
        .lifecycle
        .create(new_donation("Rice", dec!(5)))
        .await
        .unwrap();

    app.lifecycle
        .transition(donation.id, DonationStatus::PickedUp)
        .await
        .unwrap();
    let outcome = app
        .lifecycle
        .transition(donation.id, DonationStatus::Delivered)
        .await
        .expect("delivery failed");

    assert_eq!(outcome.donation.status, "delivered");
    assert!(outcome.sync_warning.is_none());

    let products = catalog_products(&app.db).await;
    assert_eq!(products.len(), 1);
    let deposits = common::deposits(&app.db).await;
    assert_eq!(deposits.len(), 1);
    assert_eq!(deposits[0].name, DEFAULT_DEPOSIT);

    let level = inventory_for(&app.db, deposits[0].id, products[0].id)
        .await
        .expect("inventory row missing");
    assert_eq!(level.quantity_available, dec!(5));

    let headers = movement_headers(&app.db).await;
    assert_eq!(headers.len(), 1);
    let lines = movement_lines(&app.db).await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].header_id, headers[0].id);
    assert_eq!(lines[0].transaction_type, "ingress");
    assert_eq!(lines[0].actor_role, "donor");
    assert_eq!(lines[0].quantity, dec!(5));
}

// Scenario: existing stock of 10; delivering 3 kg of the same product brings
// the level to 13 and reuses the catalog product.
#[tokio::test]
async fn delivery_adds_to_existing_stock() {
    let app = setup().await;
    let deposit = seed_deposit(&app.db, DEFAULT_DEPOSIT).await;
    let product = seed_product(&app.db, "Rice", Some("Grains")).await;
    seed_inventory(&app.db, deposit.id, product.id, dec!(10)).await;

    let donation = app
        .lifecycle
        .create(new_donation("Rice", dec!(3)))
        .await
        .unwrap();
    app.lifecycle
        .transition(donation.id, DonationStatus::PickedUp)
        .await
        .unwrap();
    app.lifecycle
        .transition(donation.id, DonationStatus::Delivered)
        .await
        .expect("delivery failed");

    let level = inventory_for(&app.db, deposit.id, product.id)
        .await
        .expect("inventory row missing");
    assert_eq!(level.quantity_available, dec!(13));
    assert_eq!(catalog_products(&app.db).await.len(), 1);
}

// Product resolution is exact-string and case-sensitive: "rice" and "Rice"
// are different catalog products.
#[tokio::test]
async fn product_matching_is_case_sensitive() {
    let app = setup().await;
    seed_product(&app.db, "rice", Some("Grains")).await;

    let donation = app
        .lifecycle
        .create(new_donation("Rice", dec!(2)))
        .await
        .unwrap();
    app.lifecycle
        .transition(donation.id, DonationStatus::PickedUp)
        .await
        .unwrap();
    app.lifecycle
        .transition(donation.id, DonationStatus::Delivered)
        .await
        .unwrap();

    assert_eq!(catalog_products(&app.db).await.len(), 2);
}

// The status write and the synchronization are two separate operations: a
// sync failure leaves the donation Delivered and is reported as a warning.
#[tokio::test]
async fn sync_failure_leaves_status_delivered_with_warning() {
    let app = setup().await;
    let donation = app
        .lifecycle
        .create(new_donation("Rice", dec!(5)))
        .await
        .unwrap();
    app.lifecycle
        .transition(donation.id, DonationStatus::PickedUp)
        .await
        .unwrap();

    // Make the ledger write fail
    app.db
        .execute_unprepared("DROP TABLE movement_lines")
        .await
        .expect("failed to drop table");

    let outcome = app
        .lifecycle
        .transition(donation.id, DonationStatus::Delivered)
        .await
        .expect("transition itself must not fail");

    assert_eq!(outcome.donation.status, "delivered");
    let warning = outcome.sync_warning.expect("warning expected");
    assert!(warning.contains("synchronization failed"));

    let stored = app.lifecycle.get(donation.id).await.unwrap();
    assert_eq!(stored.status, "delivered");

    // Ledger transaction rolled back as a unit: no orphaned header remains.
    assert!(movement_headers(&app.db).await.is_empty());
}

#[tokio::test]
async fn seeded_donation_follows_same_edges() {
    let app = setup().await;
    let donation = seed_donation(&app.db, DonationStatus::PickedUp, "Beans", None, dec!(4)).await;

    let outcome = app
        .lifecycle
        .transition(donation.id, DonationStatus::Delivered)
        .await
        .expect("delivery failed");

    assert_eq!(outcome.donation.status, "delivered");
    assert!(outcome.sync_warning.is_none());
}
