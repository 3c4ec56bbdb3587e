//! Wallet operations and the settlement engine.
//!
//! A transaction is opened in `pending` status before any money moves, and
//! is moved to exactly one terminal status (`completed` or `failed`) by
//! exactly one reconciliation path:
//!
//! ```text
//! pending -> completed   (synchronous payout success | charge.completed |
//!                         transfer.completed webhook)
//! pending -> failed      (synchronous payout decline/error |
//!                         transfer.failed webhook)
//! ```
//!
//! Terminal states are never left. Every path claims the transition with a
//! conditional update and applies the balance effect in the same database
//! transaction, so duplicate webhook deliveries and the webhook-vs-
//! synchronous race settle at most once.

use sqlx::PgPool;

use payloads::{
    CURRENCY, MobileNetwork, TransactionId, TransactionStatus,
    TransactionType, UserId, requests, responses,
};

use super::{StoreError, Transaction, User};
use crate::AppSettings;
use crate::gateway::{
    self, FlutterwaveClient, GatewayError, TransferRequest,
};

/// Default page size for transaction listings.
const DEFAULT_TRANSACTION_LIMIT: i64 = 50;

/// How a reconciliation attempt was resolved.
#[derive(Debug)]
pub enum SettlementOutcome {
    /// The transaction transitioned to a terminal status and any balance
    /// effect was applied.
    Applied(Box<Transaction>),
    /// The transaction was already terminal; dropped without effect.
    AlreadySettled,
    /// No transaction with this reference; dropped without effect
    /// (a replay, or a reference we don't own).
    UnknownReference,
}

pub async fn get_user(
    user_id: &UserId,
    pool: &PgPool,
) -> Result<User, StoreError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => StoreError::UserNotFound,
            e => StoreError::Database(e),
        })
}

/// Lock the user row for the remainder of the enclosing transaction.
///
/// Serializes concurrent balance mutations for the same user; must be
/// called inside a transaction.
async fn get_user_for_update_tx(
    user_id: &UserId,
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
) -> Result<User, StoreError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => StoreError::UserNotFound,
            e => StoreError::Database(e),
        })
}

/// Newest-first transaction listing for a user.
pub async fn list_transactions(
    user_id: &UserId,
    limit: Option<i64>,
    pool: &PgPool,
) -> Result<Vec<Transaction>, StoreError> {
    let limit = limit.unwrap_or(DEFAULT_TRANSACTION_LIMIT).clamp(1, 500);
    let transactions = sqlx::query_as::<_, Transaction>(
        r#"
        SELECT * FROM transactions
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(transactions)
}

/// Total amount and count of completed outbound transfers.
pub async fn send_summary(
    user_id: &UserId,
    pool: &PgPool,
) -> Result<responses::SendSummary, StoreError> {
    let (total, count): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(amount), 0)::BIGINT, COUNT(*)
        FROM transactions
        WHERE user_id = $1 AND type = 'sent' AND status = 'completed'
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(responses::SendSummary { total, count })
}

pub async fn get_transaction_by_reference(
    reference: &str,
    pool: &PgPool,
) -> Result<Transaction, StoreError> {
    sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE reference = $1",
    )
    .bind(reference)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::RowNotFound => StoreError::TransactionNotFound,
        e => StoreError::Database(e),
    })
}

/// Record intent before any externally observable side effect.
async fn create_pending_transaction(
    user_id: &UserId,
    transaction_type: TransactionType,
    recipient_name: &str,
    recipient_phone: &str,
    amount: i64,
    reference: &str,
    note: &str,
    pool: &PgPool,
) -> Result<Transaction, StoreError> {
    let transaction = sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            user_id,
            type,
            recipient_name,
            recipient_phone,
            amount,
            currency,
            status,
            reference,
            note
        )
        VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, $8)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(transaction_type)
    .bind(recipient_name)
    .bind(recipient_phone)
    .bind(amount)
    .bind(CURRENCY)
    .bind(reference)
    .bind(note)
    .fetch_one(pool)
    .await?;
    Ok(transaction)
}

/// Open a deposit: validate, record a pending `received` transaction, and
/// build the checkout-session descriptor for the gateway's inline UI.
///
/// No balance mutation happens here; the deposit settles only through the
/// `charge.completed` webhook. The public-credential check runs before the
/// transaction insert so a misconfigured gateway cannot orphan a pending
/// record that nothing could ever settle.
#[tracing::instrument(skip(settings, pool))]
pub async fn initiate_deposit(
    user_id: &UserId,
    amount: i64,
    settings: &AppSettings,
    pool: &PgPool,
) -> Result<responses::DepositInitiated, StoreError> {
    if amount <= 0 {
        return Err(StoreError::InvalidAmount);
    }

    let user = get_user(user_id, pool).await?;

    let Some(public_key) = settings.flutterwave_public_key.clone() else {
        return Err(StoreError::MissingGatewayCredential);
    };

    let reference = gateway::generate_reference(gateway::DEPOSIT_REF_PREFIX);

    let transaction = create_pending_transaction(
        user_id,
        TransactionType::Received,
        &user.name,
        &user.phone,
        amount,
        &reference,
        "Wallet deposit",
        pool,
    )
    .await?;

    tracing::info!(%reference, "Deposit opened");

    Ok(responses::DepositInitiated {
        session: responses::CheckoutSession {
            public_key,
            tx_ref: reference.clone(),
            amount,
            currency: CURRENCY.into(),
            payment_options: "card,mobilemoneyuganda,ussd,account".into(),
            redirect_url: format!("{}/?payment=success", settings.app_base_url),
            customer: responses::CheckoutCustomer {
                email: user.email,
                phone_number: user.phone,
                name: user.name,
            },
            customizations: responses::CheckoutCustomizations {
                title: "SwavePay Deposit".into(),
                description: format!("Add UGX {amount} to your wallet"),
                logo: format!("{}/logo.png", settings.app_base_url),
            },
        },
        reference,
        transaction_id: transaction.id,
    })
}

/// Move money out of the wallet to an external mobile-money account.
///
/// Validation failures return an error before any write. Once the pending
/// transaction is recorded, every outcome of the payout call leaves it in a
/// terminal status before this function returns: `completed` (with the
/// balance decremented in the same database transaction) on gateway
/// success, `failed` (balance untouched) on a decline or call error.
#[tracing::instrument(skip(details, gateway_client, pool), fields(user_id = %details.user_id))]
pub async fn process_transfer(
    details: &requests::CreateTransfer,
    gateway_client: &FlutterwaveClient,
    pool: &PgPool,
) -> Result<responses::TransferOutcome, StoreError> {
    if details.amount <= 0 {
        return Err(StoreError::InvalidAmount);
    }
    if details.recipient_name.len() > requests::NAME_MAX_LEN {
        return Err(StoreError::FieldTooLong);
    }
    if let Some(note) = &details.note
        && note.len() > requests::NOTE_MAX_LEN
    {
        return Err(StoreError::FieldTooLong);
    }
    let phone_validation = requests::validate_phone(&details.recipient_phone);
    if let Some(message) = phone_validation.error_message() {
        return Err(StoreError::InvalidPhone(message));
    }

    let user = get_user(&details.user_id, pool).await?;
    if user.balance < details.amount {
        return Err(StoreError::InsufficientBalance);
    }

    let reference = gateway::generate_reference(gateway::TRANSFER_REF_PREFIX);
    let note = details.note.clone().unwrap_or_default();

    // Records intent unconditionally; even a payout call that errors out
    // leaves an auditable failed transaction behind.
    let transaction = create_pending_transaction(
        &details.user_id,
        TransactionType::Sent,
        &details.recipient_name,
        &details.recipient_phone,
        details.amount,
        &reference,
        &note,
        pool,
    )
    .await?;

    let narration = if note.is_empty() {
        format!("Transfer from {}", user.name)
    } else {
        note.clone()
    };
    let request = TransferRequest {
        account_bank: MobileNetwork::classify(&details.recipient_phone),
        account_number: details.recipient_phone.clone(),
        amount: details.amount,
        narration,
        currency: CURRENCY.into(),
        reference: reference.clone(),
        beneficiary_name: details.recipient_name.clone(),
    };

    match gateway_client.initiate_transfer(&request).await {
        Ok(accepted) => {
            let settled = settle_outbound_success(
                &transaction.id,
                &accepted.reference,
                accepted.transaction_id,
                pool,
            )
            .await?;
            tracing::info!(%reference, "Transfer completed");
            Ok(responses::TransferOutcome {
                success: true,
                message: Some("Transfer completed successfully".into()),
                error: None,
                details: None,
                receipt: Some(responses::TransferReceipt {
                    transaction_id: settled.id,
                    reference: settled.reference,
                    amount: settled.amount,
                    status: settled.status,
                }),
            })
        }
        Err(e) => {
            mark_transfer_failed(&transaction.id, pool).await?;
            tracing::warn!(%reference, "Transfer failed: {e}");
            let provider_detail = match e {
                GatewayError::Declined { message } => message,
                e => e.to_string(),
            };
            Ok(responses::TransferOutcome {
                success: false,
                message: None,
                error: Some("Transfer failed".into()),
                details: Some(provider_detail),
                receipt: Some(responses::TransferReceipt {
                    transaction_id: transaction.id,
                    reference,
                    amount: transaction.amount,
                    status: TransactionStatus::Failed,
                }),
            })
        }
    }
}

/// Settle a gateway-confirmed payout: claim `pending -> completed` and
/// decrement the sender's balance, atomically.
///
/// If a `transfer.completed` webhook for the same reference won the race
/// and already settled the row, the claim comes back empty and the balance
/// is left alone (the webhook path never decrements).
async fn settle_outbound_success(
    transaction_id: &TransactionId,
    gateway_reference: &str,
    gateway_transaction_id: i64,
    pool: &PgPool,
) -> Result<Transaction, StoreError> {
    let mut tx = pool.begin().await?;

    let claimed = sqlx::query_as::<_, Transaction>(
        r#"
        UPDATE transactions
        SET status = 'completed',
            gateway_reference = $2,
            gateway_transaction_id = $3
        WHERE id = $1 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(transaction_id)
    .bind(gateway_reference)
    .bind(gateway_transaction_id.to_string())
    .fetch_optional(&mut *tx)
    .await?;

    let Some(transaction) = claimed else {
        // Already settled by a webhook; nothing left to do.
        tracing::info!(%transaction_id, "Payout already settled, skipping");
        return get_transaction(transaction_id, pool).await;
    };

    get_user_for_update_tx(&transaction.user_id, &mut tx).await?;
    sqlx::query("UPDATE users SET balance = balance - $2 WHERE id = $1")
        .bind(transaction.user_id)
        .bind(transaction.amount)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(transaction)
}

/// Force a pending payout to `failed` after a declined or errored gateway
/// call. The balance was never decremented on this path, so no reversal is
/// needed.
async fn mark_transfer_failed(
    transaction_id: &TransactionId,
    pool: &PgPool,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        UPDATE transactions SET status = 'failed'
        WHERE id = $1 AND status = 'pending'
        "#,
    )
    .bind(transaction_id)
    .execute(pool)
    .await?;
    Ok(())
}

async fn get_transaction(
    transaction_id: &TransactionId,
    pool: &PgPool,
) -> Result<Transaction, StoreError> {
    sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE id = $1",
    )
    .bind(transaction_id)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::RowNotFound => StoreError::TransactionNotFound,
        e => StoreError::Database(e),
    })
}

/// Claim `pending -> terminal` for the transaction with this reference.
///
/// Returns the claimed row, or resolves why nothing was claimed. Must be
/// called inside a transaction so the claim and its balance effect commit
/// or roll back together.
async fn claim_pending_tx(
    reference: &str,
    status: TransactionStatus,
    gateway_reference: &str,
    gateway_transaction_id: Option<&str>,
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
) -> Result<Result<Transaction, SettlementOutcome>, StoreError> {
    let claimed = sqlx::query_as::<_, Transaction>(
        r#"
        UPDATE transactions
        SET status = $2,
            gateway_reference = $3,
            gateway_transaction_id = $4
        WHERE reference = $1 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(reference)
    .bind(status)
    .bind(gateway_reference)
    .bind(gateway_transaction_id)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(transaction) = claimed {
        return Ok(Ok(transaction));
    }

    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM transactions WHERE reference = $1)",
    )
    .bind(reference)
    .fetch_one(&mut **tx)
    .await?;
    if exists {
        Ok(Err(SettlementOutcome::AlreadySettled))
    } else {
        Ok(Err(SettlementOutcome::UnknownReference))
    }
}

/// Settle a completed charge reported by the gateway: claim
/// `pending -> completed` and, for a `received` transaction, credit the
/// owner's balance by the transaction amount in the same database
/// transaction.
#[tracing::instrument(skip(pool))]
pub async fn settle_charge_completed(
    reference: &str,
    gateway_transaction_id: &str,
    pool: &PgPool,
) -> Result<SettlementOutcome, StoreError> {
    let mut tx = pool.begin().await?;

    let transaction = match claim_pending_tx(
        reference,
        TransactionStatus::Completed,
        reference,
        Some(gateway_transaction_id),
        &mut tx,
    )
    .await?
    {
        Ok(transaction) => transaction,
        Err(outcome) => return Ok(outcome),
    };

    if transaction.transaction_type == TransactionType::Received {
        get_user_for_update_tx(&transaction.user_id, &mut tx).await?;
        sqlx::query("UPDATE users SET balance = balance + $2 WHERE id = $1")
            .bind(transaction.user_id)
            .bind(transaction.amount)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(SettlementOutcome::Applied(Box::new(transaction)))
}

/// Settle a gateway-confirmed payout delivered via webhook: claim
/// `pending -> completed` and attach the gateway identifiers.
///
/// This path intentionally never touches the balance: the decrement belongs
/// to the synchronous payout-success path. A payout that was accepted but
/// only confirmed asynchronously therefore settles without a second debit.
#[tracing::instrument(skip(pool))]
pub async fn settle_transfer_completed(
    reference: &str,
    gateway_transaction_id: &str,
    pool: &PgPool,
) -> Result<SettlementOutcome, StoreError> {
    let mut tx = pool.begin().await?;

    let transaction = match claim_pending_tx(
        reference,
        TransactionStatus::Completed,
        reference,
        Some(gateway_transaction_id),
        &mut tx,
    )
    .await?
    {
        Ok(transaction) => transaction,
        Err(outcome) => return Ok(outcome),
    };

    tx.commit().await?;
    Ok(SettlementOutcome::Applied(Box::new(transaction)))
}

/// Settle a failed payout delivered via webhook: claim `pending -> failed`
/// and, for a `sent` transaction, refund the owner's balance in the same
/// database transaction.
///
/// The refund and the synchronous decrement are mutually exclusive through
/// the claim: a payout that already settled `completed` stays completed and
/// is not re-credited here.
#[tracing::instrument(skip(pool))]
pub async fn settle_transfer_failed(
    reference: &str,
    gateway_transaction_id: Option<&str>,
    pool: &PgPool,
) -> Result<SettlementOutcome, StoreError> {
    let mut tx = pool.begin().await?;

    let transaction = match claim_pending_tx(
        reference,
        TransactionStatus::Failed,
        reference,
        gateway_transaction_id,
        &mut tx,
    )
    .await?
    {
        Ok(transaction) => transaction,
        Err(outcome) => return Ok(outcome),
    };

    if transaction.transaction_type == TransactionType::Sent {
        get_user_for_update_tx(&transaction.user_id, &mut tx).await?;
        sqlx::query("UPDATE users SET balance = balance + $2 WHERE id = $1")
            .bind(transaction.user_id)
            .bind(transaction.amount)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(SettlementOutcome::Applied(Box::new(transaction)))
}
