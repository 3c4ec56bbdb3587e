//! Database store for the wallet API.
//!
//! ## Design decisions
//!
//! ### Settlement atomicity
//! - **Single-transaction settlement**: every settlement (terminal status
//!   write plus balance mutation) executes inside one Postgres transaction.
//!   The user row is locked with `SELECT ... FOR UPDATE` before the balance
//!   write, and balance writes are relative (`balance + $delta`) rather
//!   than read-modify-write round trips through the application.
//! - **Terminal-status claim**: reconciliation paths claim a transaction
//!   with a conditional `UPDATE ... WHERE status = 'pending'`. A replayed
//!   webhook, or a webhook racing the synchronous payout path, finds the
//!   row already terminal and is dropped without touching the balance.
//!
//! ### Timestamps
//! - **Store-assigned creation times**: `created_at` columns default to
//!   `now()` at the database, so application code never supplies them.
//!
//! ### Type safety
//! - **Id newtypes with sqlx::Type**: `UserId`, `TransactionId`, and
//!   `ContactId` are transparent UUID newtypes that bind directly in
//!   queries without accessing the inner value.

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTs;
use sqlx::FromRow;

use payloads::{
    ContactId, TransactionId, TransactionStatus, TransactionType, UserId,
    responses,
};

pub mod contacts;
pub mod wallet;

/// A complete user row.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub balance: i64,
    pub currency: String,
    #[sqlx(try_from = "SqlxTs")]
    pub created_at: Timestamp,
}

impl From<User> for responses::UserProfile {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
            phone: user.phone,
            email: user.email,
            balance: user.balance,
            currency: user.currency,
        }
    }
}

/// A complete transaction row.
#[derive(Debug, Clone, FromRow)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    #[sqlx(rename = "type")]
    pub transaction_type: TransactionType,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub amount: i64,
    pub currency: String,
    pub status: TransactionStatus,
    pub reference: String,
    pub gateway_reference: Option<String>,
    pub gateway_transaction_id: Option<String>,
    pub note: String,
    #[sqlx(try_from = "SqlxTs")]
    pub created_at: Timestamp,
}

impl From<Transaction> for responses::TransactionView {
    fn from(tx: Transaction) -> Self {
        // Signed from the owner's perspective: outbound money renders
        // negative in the activity list.
        let amount = match tx.transaction_type {
            TransactionType::Sent => -tx.amount,
            TransactionType::Received => tx.amount,
        };
        Self {
            id: tx.id,
            recipient: tx.recipient_name,
            phone: tx.recipient_phone,
            amount,
            currency: tx.currency,
            transaction_type: tx.transaction_type,
            status: tx.status,
            reference: tx.reference,
            note: tx.note,
            created_at: tx.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Contact {
    pub id: ContactId,
    pub user_id: UserId,
    pub name: String,
    pub phone: String,
    pub favorite: bool,
    #[sqlx(try_from = "SqlxTs")]
    pub created_at: Timestamp,
}

impl From<Contact> for responses::Contact {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            name: contact.name,
            phone: contact.phone,
            favorite: contact.favorite,
            created_at: contact.created_at,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Amount must be greater than 0")]
    InvalidAmount,
    #[error("User profile not found")]
    UserNotFound,
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Transaction not found")]
    TransactionNotFound,
    #[error("Contact not found")]
    ContactNotFound,
    #[error("{0}")]
    InvalidPhone(&'static str),
    #[error("Field too long")]
    FieldTooLong,
    #[error("Payment configuration error: public key missing")]
    MissingGatewayCredential,
    #[error("Unique constraint violation")]
    NotUnique(#[source] sqlx::Error),
    #[error("Database error")]
    Database(#[source] sqlx::Error),
    #[error("Unexpected error")]
    UnexpectedError(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e
            && db_err.is_unique_violation()
        {
            return StoreError::NotUnique(e);
        }
        StoreError::Database(e)
    }
}
