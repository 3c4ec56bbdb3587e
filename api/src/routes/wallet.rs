use actix_web::{HttpResponse, post, web};
use payloads::{requests, responses};
use sqlx::PgPool;

use crate::AppSettings;
use crate::gateway::FlutterwaveClient;
use crate::store;

use super::APIError;

#[tracing::instrument(skip(pool), ret)]
#[post("/user_profile")]
pub async fn user_profile(
    details: web::Json<requests::GetUserProfile>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, APIError> {
    let user = store::wallet::get_user(&details.user_id, &pool).await?;
    Ok(HttpResponse::Ok().json(responses::UserProfile::from(user)))
}

#[tracing::instrument(skip(settings, pool))]
#[post("/initiate_deposit")]
pub async fn initiate_deposit(
    details: web::Json<requests::InitiateDeposit>,
    settings: web::Data<AppSettings>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, APIError> {
    let initiated = store::wallet::initiate_deposit(
        &details.user_id,
        details.amount,
        &settings,
        &pool,
    )
    .await?;
    Ok(HttpResponse::Ok().json(initiated))
}

#[tracing::instrument(skip(details, gateway, pool))]
#[post("/create_transfer")]
pub async fn create_transfer(
    details: web::Json<requests::CreateTransfer>,
    gateway: web::Data<FlutterwaveClient>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, APIError> {
    let outcome =
        store::wallet::process_transfer(&details, &gateway, &pool).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[tracing::instrument(skip(pool))]
#[post("/get_transactions")]
pub async fn get_transactions(
    details: web::Json<requests::GetTransactions>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, APIError> {
    let transactions = store::wallet::list_transactions(
        &details.user_id,
        details.limit,
        &pool,
    )
    .await?;
    let views: Vec<responses::TransactionView> =
        transactions.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(views))
}

#[tracing::instrument(skip(pool), ret)]
#[post("/get_send_summary")]
pub async fn get_send_summary(
    details: web::Json<requests::GetSendSummary>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, APIError> {
    let summary =
        store::wallet::send_summary(&details.user_id, &pool).await?;
    Ok(HttpResponse::Ok().json(summary))
}
