use payloads::{TransactionStatus, TransactionType, UserId, requests};
use reqwest::StatusCode;
use test_helpers::{assert_status_code, spawn_app};
use uuid::Uuid;

fn transfer_request(user_id: UserId, amount: i64) -> requests::CreateTransfer {
    requests::CreateTransfer {
        user_id,
        recipient_name: "Bob Okello".into(),
        recipient_phone: "0701112233".into(),
        amount,
        note: None,
    }
}

#[tokio::test]
async fn successful_transfer_settles_and_decrements_once()
-> anyhow::Result<()> {
    let app = spawn_app().await;
    let user_id = app.create_alice().await?;

    let outcome = app
        .client
        .create_transfer(&transfer_request(user_id, 200_000))
        .await?;

    assert!(outcome.success);
    let receipt = outcome.receipt.expect("receipt on success");
    assert_eq!(receipt.status, TransactionStatus::Completed);
    assert_eq!(receipt.amount, 200_000);
    assert!(receipt.reference.starts_with("SWVP-"));

    // 500,000 - 200,000, applied exactly once.
    assert_eq!(app.get_balance(&user_id).await?, 300_000);

    let transaction =
        app.transaction_by_reference(&receipt.reference).await?;
    assert_eq!(transaction.status, TransactionStatus::Completed);
    assert_eq!(transaction.transaction_type, TransactionType::Sent);
    assert!(transaction.gateway_reference.is_some());
    assert!(transaction.gateway_transaction_id.is_some());

    Ok(())
}

#[tokio::test]
async fn transfer_rejects_non_positive_amounts() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let user_id = app.create_alice().await?;

    for amount in [0, -1] {
        let result = app
            .client
            .create_transfer(&transfer_request(user_id, amount))
            .await;
        assert_status_code(result, StatusCode::BAD_REQUEST);
    }

    assert_eq!(app.transaction_count(&user_id).await?, 0);
    assert_eq!(app.get_balance(&user_id).await?, 500_000);
    Ok(())
}

#[tokio::test]
async fn transfer_rejects_insufficient_balance() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let user_id = app.create_alice().await?;

    let result = app
        .client
        .create_transfer(&transfer_request(user_id, 500_001))
        .await;
    assert_status_code(result, StatusCode::BAD_REQUEST);

    // Validation happens before any write.
    assert_eq!(app.transaction_count(&user_id).await?, 0);
    assert_eq!(app.get_balance(&user_id).await?, 500_000);
    Ok(())
}

#[tokio::test]
async fn transfer_rejects_malformed_phone() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let user_id = app.create_alice().await?;

    let mut details = transfer_request(user_id, 10_000);
    details.recipient_phone = "12345".into();
    let result = app.client.create_transfer(&details).await;
    assert_status_code(result, StatusCode::BAD_REQUEST);

    assert_eq!(app.transaction_count(&user_id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn transfer_for_unknown_profile_is_not_found() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let result = app
        .client
        .create_transfer(&transfer_request(UserId(Uuid::new_v4()), 10_000))
        .await;
    assert_status_code(result, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn declined_transfer_fails_terminally_without_balance_change()
-> anyhow::Result<()> {
    let app = spawn_app().await;
    let user_id = app.create_alice().await?;

    let mut details = transfer_request(user_id, 50_000);
    details.recipient_phone = api::gateway::MOCK_DECLINED_ACCOUNT.into();
    let outcome = app.client.create_transfer(&details).await?;

    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("Transfer failed"));
    assert!(outcome.details.is_some());

    let receipt = outcome.receipt.expect("receipt on decline");
    assert_eq!(receipt.status, TransactionStatus::Failed);

    // Intent was recorded, but the balance was never touched.
    let transaction =
        app.transaction_by_reference(&receipt.reference).await?;
    assert_eq!(transaction.status, TransactionStatus::Failed);
    assert_eq!(app.get_balance(&user_id).await?, 500_000);

    Ok(())
}
