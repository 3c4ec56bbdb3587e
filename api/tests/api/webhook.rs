use payloads::{TransactionStatus, TransactionType, requests};
use serde_json::json;
use test_helpers::{WEBHOOK_SECRET, spawn_app, spawn_app_with};

fn charge_completed(tx_ref: &str, amount: i64, status: &str) -> serde_json::Value {
    json!({
        "event": "charge.completed",
        "data": {
            "tx_ref": tx_ref,
            "amount": amount,
            "status": status,
            "id": 8234113
        }
    })
}

fn transfer_completed(reference: &str, status: &str) -> serde_json::Value {
    json!({
        "event": "transfer.completed",
        "data": {
            "reference": reference,
            "status": status,
            "id": 9911223
        }
    })
}

fn transfer_failed(reference: &str) -> serde_json::Value {
    json!({
        "event": "transfer.failed",
        "data": {
            "reference": reference,
            "id": null
        }
    })
}

#[tokio::test]
async fn webhook_rejects_bad_signature_before_any_mutation()
-> anyhow::Result<()> {
    let app = spawn_app().await;
    let user_id = app.create_alice().await?;
    app.seed_pending_transaction(
        &user_id,
        TransactionType::Received,
        100_000,
        "SWVP-DEP-1700000000000-1",
    )
    .await?;

    let payload =
        charge_completed("SWVP-DEP-1700000000000-1", 100_000, "successful");
    let response = app
        .client
        .deliver_webhook(&payload, Some("wrong-secret"))
        .await?;
    assert_eq!(response.status(), 401);

    let response = app.client.deliver_webhook(&payload, None).await?;
    assert_eq!(response.status(), 401);

    let transaction = app
        .transaction_by_reference("SWVP-DEP-1700000000000-1")
        .await?;
    assert_eq!(transaction.status, TransactionStatus::Pending);
    assert_eq!(app.get_balance(&user_id).await?, 500_000);

    Ok(())
}

#[tokio::test]
async fn webhook_auth_is_skipped_when_no_secret_configured()
-> anyhow::Result<()> {
    let app = spawn_app_with(|config| {
        config.webhook_secret = None;
    })
    .await;

    let response = app
        .client
        .deliver_webhook(&json!({ "event": "unknown.event", "data": {} }), None)
        .await?;
    assert_eq!(response.status(), 200);

    Ok(())
}

#[tokio::test]
async fn charge_completed_settles_deposit_and_credits_balance()
-> anyhow::Result<()> {
    let app = spawn_app().await;
    let user_id = app.create_alice().await?;

    let initiated = app
        .client
        .initiate_deposit(&requests::InitiateDeposit {
            user_id,
            amount: 100_000,
        })
        .await?;

    let response = app
        .client
        .deliver_webhook(
            &charge_completed(&initiated.reference, 100_000, "successful"),
            Some(WEBHOOK_SECRET),
        )
        .await?;
    assert_eq!(response.status(), 200);

    let transaction =
        app.transaction_by_reference(&initiated.reference).await?;
    app.assert_terminal(&transaction, TransactionStatus::Completed);
    assert_eq!(
        transaction.gateway_reference.as_deref(),
        Some(initiated.reference.as_str())
    );
    assert_eq!(
        transaction.gateway_transaction_id.as_deref(),
        Some("8234113")
    );
    assert_eq!(app.get_balance(&user_id).await?, 600_000);

    Ok(())
}

#[tokio::test]
async fn charge_completed_replay_does_not_double_credit()
-> anyhow::Result<()> {
    let app = spawn_app().await;
    let user_id = app.create_alice().await?;

    let initiated = app
        .client
        .initiate_deposit(&requests::InitiateDeposit {
            user_id,
            amount: 100_000,
        })
        .await?;

    let payload =
        charge_completed(&initiated.reference, 100_000, "successful");
    for _ in 0..2 {
        let response = app
            .client
            .deliver_webhook(&payload, Some(WEBHOOK_SECRET))
            .await?;
        assert_eq!(response.status(), 200);
    }

    // Credited exactly once.
    assert_eq!(app.get_balance(&user_id).await?, 600_000);

    Ok(())
}

#[tokio::test]
async fn unsuccessful_charge_leaves_transaction_pending()
-> anyhow::Result<()> {
    let app = spawn_app().await;
    let user_id = app.create_alice().await?;

    let initiated = app
        .client
        .initiate_deposit(&requests::InitiateDeposit {
            user_id,
            amount: 100_000,
        })
        .await?;

    // Only the exact lower-case literal settles a charge.
    for status in ["failed", "pending", "SUCCESS"] {
        let response = app
            .client
            .deliver_webhook(
                &charge_completed(&initiated.reference, 100_000, status),
                Some(WEBHOOK_SECRET),
            )
            .await?;
        assert_eq!(response.status(), 200);
    }

    let transaction =
        app.transaction_by_reference(&initiated.reference).await?;
    assert_eq!(transaction.status, TransactionStatus::Pending);
    assert_eq!(app.get_balance(&user_id).await?, 500_000);

    Ok(())
}

#[tokio::test]
async fn unknown_reference_is_acknowledged_and_dropped()
-> anyhow::Result<()> {
    let app = spawn_app().await;

    let response = app
        .client
        .deliver_webhook(
            &charge_completed("SWVP-DEP-0-0", 5_000, "successful"),
            Some(WEBHOOK_SECRET),
        )
        .await?;
    assert_eq!(response.status(), 200);

    Ok(())
}

#[tokio::test]
async fn unrecognized_event_is_acknowledged() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let response = app
        .client
        .deliver_webhook(
            &json!({ "event": "charge.refunded", "data": {} }),
            Some(WEBHOOK_SECRET),
        )
        .await?;
    assert_eq!(response.status(), 200);

    Ok(())
}

#[tokio::test]
async fn transfer_completed_confirms_without_second_debit()
-> anyhow::Result<()> {
    let app = spawn_app().await;
    let user_id = app.create_alice().await?;

    // Both literal success casings are accepted.
    for (reference, status) in [
        ("SWVP-1700000000000-2", "successful"),
        ("SWVP-1700000000000-4", "SUCCESS"),
    ] {
        app.seed_pending_transaction(
            &user_id,
            TransactionType::Sent,
            50_000,
            reference,
        )
        .await?;
        let response = app
            .client
            .deliver_webhook(
                &transfer_completed(reference, status),
                Some(WEBHOOK_SECRET),
            )
            .await?;
        assert_eq!(response.status(), 200);

        let transaction = app.transaction_by_reference(reference).await?;
        app.assert_terminal(&transaction, TransactionStatus::Completed);
        assert!(transaction.gateway_transaction_id.is_some());
    }

    // This path never debits; the decrement belongs to the synchronous
    // payout path.
    assert_eq!(app.get_balance(&user_id).await?, 500_000);

    Ok(())
}

#[tokio::test]
async fn transfer_failed_refunds_pending_sent_transaction()
-> anyhow::Result<()> {
    let app = spawn_app().await;
    let user_id = app.create_alice().await?;
    app.seed_pending_transaction(
        &user_id,
        TransactionType::Sent,
        50_000,
        "SWVP-1700000000000-3",
    )
    .await?;

    let response = app
        .client
        .deliver_webhook(
            &transfer_failed("SWVP-1700000000000-3"),
            Some(WEBHOOK_SECRET),
        )
        .await?;
    assert_eq!(response.status(), 200);

    let transaction =
        app.transaction_by_reference("SWVP-1700000000000-3").await?;
    app.assert_terminal(&transaction, TransactionStatus::Failed);
    assert_eq!(app.get_balance(&user_id).await?, 550_000);

    Ok(())
}

#[tokio::test]
async fn transfer_failed_after_completion_does_not_credit()
-> anyhow::Result<()> {
    let app = spawn_app().await;
    let user_id = app.create_alice().await?;

    // Complete a payout synchronously: 500,000 -> 300,000.
    let outcome = app
        .client
        .create_transfer(&requests::CreateTransfer {
            user_id,
            recipient_name: "Bob Okello".into(),
            recipient_phone: "0701112233".into(),
            amount: 200_000,
            note: None,
        })
        .await?;
    assert!(outcome.success);
    let reference = outcome.receipt.unwrap().reference;
    assert_eq!(app.get_balance(&user_id).await?, 300_000);

    // A late failure notification for the same reference must be dropped
    // by the terminal-status guard: no refund, status unchanged.
    let response = app
        .client
        .deliver_webhook(&transfer_failed(&reference), Some(WEBHOOK_SECRET))
        .await?;
    assert_eq!(response.status(), 200);

    let transaction = app.transaction_by_reference(&reference).await?;
    assert_eq!(transaction.status, TransactionStatus::Completed);
    assert_eq!(app.get_balance(&user_id).await?, 300_000);

    Ok(())
}

#[tokio::test]
async fn webhook_get_probe_answers() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.client.webhook_probe().await?;
    Ok(())
}
