use payloads::{TransactionStatus, TransactionType, UserId, requests};
use reqwest::StatusCode;
use test_helpers::{assert_status_code, spawn_app, spawn_app_with};
use uuid::Uuid;

#[tokio::test]
async fn initiate_deposit_opens_pending_transaction() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let user_id = app.create_alice().await?;

    let initiated = app
        .client
        .initiate_deposit(&requests::InitiateDeposit {
            user_id,
            amount: 100_000,
        })
        .await?;

    assert!(initiated.reference.starts_with("SWVP-DEP-"));
    assert_eq!(initiated.session.tx_ref, initiated.reference);
    assert_eq!(initiated.session.amount, 100_000);
    assert_eq!(initiated.session.currency, "UGX");
    assert_eq!(initiated.session.public_key, "FLWPUBK_TEST-mock");
    assert_eq!(initiated.session.customer.email, "alice@example.com");

    let transaction =
        app.transaction_by_reference(&initiated.reference).await?;
    assert_eq!(transaction.status, TransactionStatus::Pending);
    assert_eq!(transaction.transaction_type, TransactionType::Received);
    assert_eq!(transaction.amount, 100_000);
    assert_eq!(transaction.note, "Wallet deposit");
    assert_eq!(transaction.gateway_reference, None);
    assert_eq!(transaction.gateway_transaction_id, None);

    // Settlement happens only via the webhook path.
    assert_eq!(app.get_balance(&user_id).await?, 500_000);

    Ok(())
}

#[tokio::test]
async fn deposit_rejects_non_positive_amounts() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let user_id = app.create_alice().await?;

    for amount in [0, -100] {
        let result = app
            .client
            .initiate_deposit(&requests::InitiateDeposit { user_id, amount })
            .await;
        assert_status_code(result, StatusCode::BAD_REQUEST);
    }

    assert_eq!(app.transaction_count(&user_id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn deposit_for_unknown_profile_is_not_found() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let result = app
        .client
        .initiate_deposit(&requests::InitiateDeposit {
            user_id: UserId(Uuid::new_v4()),
            amount: 100_000,
        })
        .await;
    assert_status_code(result, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn deposit_without_public_key_fails_before_any_write()
-> anyhow::Result<()> {
    let app = spawn_app_with(|config| {
        config.flutterwave_public_key = None;
    })
    .await;
    let user_id = app.create_alice().await?;

    let result = app
        .client
        .initiate_deposit(&requests::InitiateDeposit {
            user_id,
            amount: 100_000,
        })
        .await;
    assert_status_code(result, StatusCode::INTERNAL_SERVER_ERROR);

    // No orphaned pending transaction that nothing could ever settle.
    assert_eq!(app.transaction_count(&user_id).await?, 0);
    Ok(())
}
