pub mod contacts;
pub mod wallet;
pub mod webhook;

use actix_web::{
    HttpResponse, Responder, ResponseError, body::BoxBody,
    dev::HttpServiceFactory, get, web,
};

use crate::store::StoreError;

pub fn api_services() -> impl HttpServiceFactory {
    web::scope("/api")
        .service(health_check)
        .service(wallet::user_profile)
        .service(wallet::initiate_deposit)
        .service(wallet::create_transfer)
        .service(wallet::get_transactions)
        .service(wallet::get_send_summary)
        .service(contacts::get_contacts)
        .service(contacts::create_contact)
        .service(contacts::set_contact_favorite)
        .service(webhook::flutterwave_webhook)
        .service(webhook::webhook_probe)
}

#[get("/health_check")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("healthy")
}

#[derive(Debug, thiserror::Error)]
pub enum APIError {
    #[error("Authentication failed")]
    AuthError(#[source] anyhow::Error),
    #[error("Bad request")]
    BadRequest(#[source] anyhow::Error),
    #[error("Not found")]
    NotFound(#[source] anyhow::Error),
    #[error("Payment configuration error")]
    Configuration(#[source] anyhow::Error),
    #[error("Something went wrong")]
    UnexpectedError(#[from] anyhow::Error),
}

impl ResponseError for APIError {
    fn error_response(&self) -> HttpResponse<BoxBody> {
        match self {
            Self::AuthError(e) => {
                HttpResponse::Unauthorized().body(format!("{self}: {e}"))
            }
            Self::BadRequest(e) => {
                HttpResponse::BadRequest().body(format!("{self}: {e}"))
            }
            Self::NotFound(e) => {
                HttpResponse::NotFound().body(format!("{self}: {e}"))
            }
            Self::Configuration(e) => HttpResponse::InternalServerError()
                .body(format!("{self}: {e}")),
            Self::UnexpectedError(_) => {
                HttpResponse::InternalServerError().body(self.to_string())
            }
        }
    }
}

impl From<StoreError> for APIError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Database(_) => APIError::UnexpectedError(e.into()),
            StoreError::UserNotFound => APIError::NotFound(e.into()),
            StoreError::TransactionNotFound => APIError::NotFound(e.into()),
            StoreError::ContactNotFound => APIError::NotFound(e.into()),
            StoreError::MissingGatewayCredential => {
                APIError::Configuration(e.into())
            }
            StoreError::UnexpectedError(inner) => {
                APIError::UnexpectedError(inner)
            }
            _ => APIError::BadRequest(e.into()),
        }
    }
}
