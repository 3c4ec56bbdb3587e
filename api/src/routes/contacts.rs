use actix_web::{HttpResponse, post, web};
use payloads::{requests, responses};
use sqlx::PgPool;

use crate::store;

use super::APIError;

#[tracing::instrument(skip(pool))]
#[post("/get_contacts")]
pub async fn get_contacts(
    details: web::Json<requests::GetContacts>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, APIError> {
    let contacts =
        store::contacts::list_contacts(&details.user_id, &pool).await?;
    let contacts: Vec<responses::Contact> =
        contacts.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(contacts))
}

#[tracing::instrument(skip(pool))]
#[post("/create_contact")]
pub async fn create_contact(
    details: web::Json<requests::CreateContact>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, APIError> {
    let contact = store::contacts::create_contact(&details, &pool).await?;
    Ok(HttpResponse::Ok().json(responses::Contact::from(contact)))
}

#[tracing::instrument(skip(pool))]
#[post("/set_contact_favorite")]
pub async fn set_contact_favorite(
    details: web::Json<requests::SetContactFavorite>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, APIError> {
    let contact = store::contacts::set_favorite(
        &details.contact_id,
        details.favorite,
        &pool,
    )
    .await?;
    Ok(HttpResponse::Ok().json(responses::Contact::from(contact)))
}
