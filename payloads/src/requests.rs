use crate::{ContactId, UserId};
use serde::{Deserialize, Serialize};

pub const NOTE_MAX_LEN: usize = 255;
pub const NAME_MAX_LEN: usize = 255;

/// Validation result for recipient phone numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneValidation {
    Valid,
    Empty,
    InvalidFormat,
}

impl PhoneValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            Self::Valid => None,
            Self::Empty => Some("Phone number is required"),
            Self::InvalidFormat => {
                Some("Phone number must be a valid Ugandan mobile number")
            }
        }
    }
}

/// Validate a Ugandan mobile number.
///
/// Accepted forms: `0700123456`, `256700123456`, `+256700123456`, with
/// spaces, dashes, and parentheses ignored. The subscriber part must be a
/// 7xx number with eight trailing digits.
pub fn validate_phone(phone: &str) -> PhoneValidation {
    let cleaned = cleaned_phone(phone);
    if cleaned.is_empty() {
        return PhoneValidation::Empty;
    }

    let digits = match cleaned.strip_prefix('+') {
        Some(rest) => rest,
        None => &cleaned,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return PhoneValidation::InvalidFormat;
    }

    let subscriber = if let Some(rest) = digits.strip_prefix("256") {
        rest
    } else if let Some(rest) = digits.strip_prefix('0') {
        rest
    } else {
        digits
    };

    if subscriber.len() == 9 && subscriber.starts_with('7') {
        PhoneValidation::Valid
    } else {
        PhoneValidation::InvalidFormat
    }
}

/// Normalize a phone number to international `+256` form.
///
/// Assumes the number has already passed [`validate_phone`]; unrecognized
/// inputs are returned with a `+256` prefix attached as-is.
pub fn normalize_phone(phone: &str) -> String {
    let cleaned = cleaned_phone(phone);
    if let Some(rest) = cleaned.strip_prefix('0') {
        format!("+256{rest}")
    } else if cleaned.starts_with("256") {
        format!("+{cleaned}")
    } else if cleaned.starts_with('+') {
        cleaned
    } else {
        format!("+256{cleaned}")
    }
}

fn cleaned_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetUserProfile {
    pub user_id: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InitiateDeposit {
    pub user_id: UserId,
    /// Deposit amount in whole currency units.
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTransfer {
    pub user_id: UserId,
    pub recipient_name: String,
    /// Local-format mobile number; classified by operator prefix.
    pub recipient_phone: String,
    /// Payout amount in whole currency units.
    pub amount: i64,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetTransactions {
    pub user_id: UserId,
    /// Maximum number of records to return, newest first. Defaults to 50.
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetSendSummary {
    pub user_id: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetContacts {
    pub user_id: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateContact {
    pub user_id: UserId,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetContactFavorite {
    pub contact_id: ContactId,
    pub favorite: bool,
}
