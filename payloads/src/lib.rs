pub mod api_client;
pub mod requests;
pub mod responses;

pub use api_client::{APIClient, ClientError};

use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wallet currency. Integer units with no decimal subunits, so amounts and
/// balances are plain `i64` values rather than a decimal type.
pub const CURRENCY: &str = "UGX";

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            Display,
            Serialize,
            Deserialize,
        )]
        #[cfg_attr(
            feature = "use-sqlx",
            derive(sqlx::Type, sqlx::FromRow),
            sqlx(transparent)
        )]
        pub struct $name(pub Uuid);
    };
}

id_type!(UserId);
id_type!(TransactionId);
id_type!(ContactId);

/// Direction of a money movement from the owning user's perspective.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize,
)]
#[cfg_attr(feature = "use-sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "use-sqlx",
    sqlx(type_name = "transaction_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Outbound payout initiated by the user.
    Sent,
    /// Inbound deposit funded through the gateway's checkout.
    Received,
}

/// Caller-visible transaction status.
///
/// `Pending` transitions to exactly one of the terminal states and never
/// leaves it. Each terminal status is applied by exactly one reconciliation
/// path (synchronous payout response or webhook).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize,
)]
#[cfg_attr(feature = "use-sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "use-sqlx",
    sqlx(type_name = "transaction_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Mobile-money operator a payout is routed to.
///
/// Serialized in the gateway's `account_bank` field, which expects the
/// operator name in upper case.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum MobileNetwork {
    Airtel,
    Mtn,
}

impl MobileNetwork {
    /// Classify a local-format phone number by its operator prefix.
    ///
    /// Airtel Uganda owns the 070/074/075 ranges; everything else routes to
    /// MTN.
    pub fn classify(phone: &str) -> Self {
        if phone.starts_with("070")
            || phone.starts_with("075")
            || phone.starts_with("074")
        {
            MobileNetwork::Airtel
        } else {
            MobileNetwork::Mtn
        }
    }
}
