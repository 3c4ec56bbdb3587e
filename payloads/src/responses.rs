use crate::{
    ContactId, TransactionId, TransactionStatus, TransactionType, UserId,
};
use jiff::Timestamp;
#[cfg(feature = "use-sqlx")]
use jiff_sqlx::Timestamp as SqlxTs;
use serde::{Deserialize, Serialize};

/// A user's wallet profile as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "use-sqlx", derive(sqlx::FromRow))]
pub struct UserProfile {
    pub user_id: UserId,
    pub name: String,
    pub phone: String,
    pub email: String,
    /// Wallet balance in whole currency units. Never negative.
    pub balance: i64,
    pub currency: String,
}

/// A transaction as rendered in the dashboard's activity list.
///
/// `amount` is signed from the user's perspective: negative for sent
/// transactions, positive for received ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    pub id: TransactionId,
    pub recipient: String,
    pub phone: String,
    pub amount: i64,
    pub currency: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub reference: String,
    pub note: String,
    pub created_at: Timestamp,
}

/// Customer contact block forwarded to the gateway's checkout UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutCustomer {
    pub email: String,
    pub phone_number: String,
    pub name: String,
}

/// Cosmetic checkout fields (title, description, logo).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutCustomizations {
    pub title: String,
    pub description: String,
    pub logo: String,
}

/// Client-side payment-session descriptor for the gateway's inline
/// checkout. Contains only the public credential; the deposit is settled
/// exclusively through the webhook path, never through the client callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub public_key: String,
    /// Idempotency reference correlating the eventual webhook back to the
    /// pending transaction.
    pub tx_ref: String,
    pub amount: i64,
    pub currency: String,
    pub payment_options: String,
    pub redirect_url: String,
    pub customer: CheckoutCustomer,
    pub customizations: CheckoutCustomizations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositInitiated {
    pub session: CheckoutSession,
    pub reference: String,
    pub transaction_id: TransactionId,
}

/// Receipt for a payout that reached a terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub transaction_id: TransactionId,
    pub reference: String,
    pub amount: i64,
    pub status: TransactionStatus,
}

/// Structured outcome of a transfer attempt.
///
/// Returned with a 200 status even when the payout itself was declined:
/// the engine did its job by recording the attempt and settling it to
/// `failed`. `error`/`details` carry the user-facing explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Provider-reported detail, when the gateway gave one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<TransferReceipt>,
}

/// Dashboard stat: total of completed outbound transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendSummary {
    pub total: i64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "use-sqlx", derive(sqlx::FromRow))]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub phone: String,
    pub favorite: bool,
    #[cfg_attr(feature = "use-sqlx", sqlx(try_from = "SqlxTs"))]
    pub created_at: Timestamp,
}
