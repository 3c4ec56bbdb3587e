//! Contact CRUD surrounding the wallet.
//!
//! Contacts are read-only from the settlement engine's perspective; these
//! operations exist for the dashboard's quick-transfer list.

use sqlx::PgPool;

use payloads::{ContactId, UserId, requests};

use super::{Contact, StoreError};

pub async fn list_contacts(
    user_id: &UserId,
    pool: &PgPool,
) -> Result<Vec<Contact>, StoreError> {
    let contacts = sqlx::query_as::<_, Contact>(
        r#"
        SELECT * FROM contacts
        WHERE user_id = $1
        ORDER BY favorite DESC, name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(contacts)
}

pub async fn create_contact(
    details: &requests::CreateContact,
    pool: &PgPool,
) -> Result<Contact, StoreError> {
    if details.name.len() > requests::NAME_MAX_LEN {
        return Err(StoreError::FieldTooLong);
    }
    let phone_validation = requests::validate_phone(&details.phone);
    if let Some(message) = phone_validation.error_message() {
        return Err(StoreError::InvalidPhone(message));
    }

    // Stored in international form so the quick-transfer list is
    // consistent regardless of how the number was typed.
    let contact = sqlx::query_as::<_, Contact>(
        r#"
        INSERT INTO contacts (user_id, name, phone)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(details.user_id)
    .bind(&details.name)
    .bind(requests::normalize_phone(&details.phone))
    .fetch_one(pool)
    .await?;
    Ok(contact)
}

pub async fn set_favorite(
    contact_id: &ContactId,
    favorite: bool,
    pool: &PgPool,
) -> Result<Contact, StoreError> {
    sqlx::query_as::<_, Contact>(
        r#"
        UPDATE contacts SET favorite = $2
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(contact_id)
    .bind(favorite)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::RowNotFound => StoreError::ContactNotFound,
        e => StoreError::Database(e),
    })
}
