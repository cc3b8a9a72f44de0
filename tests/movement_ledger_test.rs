mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use uuid::Uuid;

use foodbank_api::{
    entities::{donation::DonationStatus, movement_line::TransactionType},
    errors::ServiceError,
    services::movement_ledger::{NewMovement, NewMovementLine, ROLE_DISTRIBUTOR, ROLE_DONOR},
};

use common::{movement_headers, movement_lines, seed_donation, setup};

fn movement() -> NewMovement {
    NewMovement {
        donor_actor_id: None,
        operator_actor_id: Some(Uuid::new_v4()),
        status: "completed".to_string(),
        note: None,
    }
}

#[tokio::test]
async fn movement_requires_at_least_one_line() {
    let app = setup().await;

    let err = app
        .ledger
        .record_movement(movement(), Vec::new())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
    assert!(movement_headers(&app.db).await.is_empty());
}

#[tokio::test]
async fn line_quantities_must_be_positive() {
    let app = setup().await;

    let line = NewMovementLine {
        product_id: Uuid::new_v4(),
        quantity: dec!(0),
        transaction_type: TransactionType::Ingress,
        actor_role: ROLE_DISTRIBUTOR.to_string(),
        note: None,
    };

    let err = app
        .ledger
        .record_movement(movement(), vec![line])
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
    assert!(movement_headers(&app.db).await.is_empty());
}

#[tokio::test]
async fn movement_with_multiple_lines_is_written_atomically() {
    let app = setup().await;

    let lines = vec![
        NewMovementLine {
            product_id: Uuid::new_v4(),
            quantity: dec!(3),
            transaction_type: TransactionType::Ingress,
            actor_role: ROLE_DONOR.to_string(),
            note: Some("first".to_string()),
        },
        NewMovementLine {
            product_id: Uuid::new_v4(),
            quantity: dec!(2),
            transaction_type: TransactionType::Egress,
            actor_role: ROLE_DISTRIBUTOR.to_string(),
            note: None,
        },
    ];

    let header_id = app
        .ledger
        .record_movement(movement(), lines)
        .await
        .expect("record failed");

    let headers = movement_headers(&app.db).await;
    assert_eq!(headers.len(), 1);
    assert_eq!(headers[0].id, header_id);

    let lines = movement_lines(&app.db).await;
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.header_id == header_id));
}

#[tokio::test]
async fn donation_delivery_records_a_single_donor_ingress() {
    let app = setup().await;
    let donation = seed_donation(&app.db, DonationStatus::PickedUp, "Rice", None, dec!(5)).await;
    let product_id = Uuid::new_v4();

    app.ledger
        .record_donation_delivery(&donation, product_id)
        .await
        .expect("record failed");

    let headers = movement_headers(&app.db).await;
    assert_eq!(headers.len(), 1);
    assert_eq!(headers[0].donor_actor_id, Some(donation.donor_id));
    assert_eq!(headers[0].status, "completed");

    let lines = movement_lines(&app.db).await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product_id, product_id);
    assert_eq!(lines[0].quantity, dec!(5));
    assert_eq!(lines[0].transaction_type, "ingress");
    assert_eq!(lines[0].actor_role, ROLE_DONOR);
}

#[tokio::test]
async fn manual_adjustment_direction_follows_the_delta_sign() {
    let app = setup().await;
    let product_id = Uuid::new_v4();

    app.ledger
        .record_manual_adjustment(product_id, dec!(6), None)
        .await
        .expect("ingress record failed");
    app.ledger
        .record_manual_adjustment(product_id, dec!(-4), None)
        .await
        .expect("egress record failed");

    let lines = movement_lines(&app.db).await;
    assert_eq!(lines.len(), 2);

    let ingress = lines
        .iter()
        .find(|l| l.transaction_type == "ingress")
        .expect("ingress line missing");
    assert_eq!(ingress.quantity, dec!(6));

    let egress = lines
        .iter()
        .find(|l| l.transaction_type == "egress")
        .expect("egress line missing");
    assert_eq!(egress.quantity, dec!(4));
    assert!(lines.iter().all(|l| l.actor_role == ROLE_DISTRIBUTOR));
}

#[tokio::test]
async fn zero_delta_adjustment_is_rejected() {
    let app = setup().await;

    let err = app
        .ledger
        .record_manual_adjustment(Uuid::new_v4(), dec!(0), None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}
