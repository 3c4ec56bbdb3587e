use crate::{requests, responses};
use reqwest::StatusCode;
use serde::Serialize;

type ReqwestResult = Result<reqwest::Response, reqwest::Error>;

/// An API client for interfacing with the backend.
pub struct APIClient {
    pub address: String,
    pub inner_client: reqwest::Client,
}

/// Helper methods for http actions
impl APIClient {
    fn format_url(&self, path: &str) -> String {
        format!("{}/api/{path}", &self.address)
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> ReqwestResult {
        self.inner_client
            .post(self.format_url(path))
            .json(body)
            .send()
            .await
    }

    async fn empty_get(&self, path: &str) -> ReqwestResult {
        self.inner_client.get(self.format_url(path)).send().await
    }
}

/// Methods on the backend API
impl APIClient {
    pub async fn health_check(&self) -> Result<(), ClientError> {
        let response = self.empty_get("health_check").await?;
        ok_empty(response).await
    }

    pub async fn user_profile(
        &self,
        details: &requests::GetUserProfile,
    ) -> Result<responses::UserProfile, ClientError> {
        let response = self.post("user_profile", details).await?;
        ok_body(response).await
    }

    pub async fn initiate_deposit(
        &self,
        details: &requests::InitiateDeposit,
    ) -> Result<responses::DepositInitiated, ClientError> {
        let response = self.post("initiate_deposit", details).await?;
        ok_body(response).await
    }

    pub async fn create_transfer(
        &self,
        details: &requests::CreateTransfer,
    ) -> Result<responses::TransferOutcome, ClientError> {
        let response = self.post("create_transfer", details).await?;
        ok_body(response).await
    }

    pub async fn get_transactions(
        &self,
        details: &requests::GetTransactions,
    ) -> Result<Vec<responses::TransactionView>, ClientError> {
        let response = self.post("get_transactions", details).await?;
        ok_body(response).await
    }

    pub async fn get_send_summary(
        &self,
        details: &requests::GetSendSummary,
    ) -> Result<responses::SendSummary, ClientError> {
        let response = self.post("get_send_summary", details).await?;
        ok_body(response).await
    }

    pub async fn get_contacts(
        &self,
        details: &requests::GetContacts,
    ) -> Result<Vec<responses::Contact>, ClientError> {
        let response = self.post("get_contacts", details).await?;
        ok_body(response).await
    }

    pub async fn create_contact(
        &self,
        details: &requests::CreateContact,
    ) -> Result<responses::Contact, ClientError> {
        let response = self.post("create_contact", details).await?;
        ok_body(response).await
    }

    pub async fn set_contact_favorite(
        &self,
        details: &requests::SetContactFavorite,
    ) -> Result<responses::Contact, ClientError> {
        let response = self.post("set_contact_favorite", details).await?;
        ok_body(response).await
    }

    /// Deliver a raw gateway notification, as the gateway itself would.
    ///
    /// Returns the response unconsumed so callers can assert on the status
    /// code (401 for a bad signature, 500 for a processing failure).
    pub async fn deliver_webhook(
        &self,
        payload: &serde_json::Value,
        signature: Option<&str>,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self
            .inner_client
            .post(self.format_url("webhook/flutterwave"))
            .json(payload);
        if let Some(signature) = signature {
            request = request.header("verif-hash", signature);
        }
        Ok(request.send().await?)
    }

    pub async fn webhook_probe(&self) -> Result<(), ClientError> {
        let response = self.empty_get("webhook/flutterwave").await?;
        ok_empty(response).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An unhandled API error to display, containing response text.
    #[error("{1}")]
    APIError(StatusCode, String),
    #[error("Network error. Please check your connection.")]
    Network(#[from] reqwest::Error),
}

/// Deserialize a successful request into the desired type, or return an
/// appropriate error.
pub async fn ok_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(ClientError::APIError(
            response.status(),
            response.text().await?,
        ));
    }
    Ok(response.json::<T>().await?)
}

/// Check that an empty response is OK, returning a ClientError if not.
pub async fn ok_empty(response: reqwest::Response) -> Result<(), ClientError> {
    if !response.status().is_success() {
        return Err(ClientError::APIError(
            response.status(),
            response.text().await?,
        ));
    }
    Ok(())
}
