//! Payment gateway client.
//!
//! Outbound calls to Flutterwave: payout initiation against the v3 transfers
//! endpoint. Card-charge checkout sessions are created client-side from a
//! published session descriptor (see `store::wallet::initiate_deposit`), so
//! there is no server-side charge call here.
//!
//! With the `mock-gateway` feature the transfer call never leaves the
//! process and settles deterministically based on magic account numbers,
//! the same way a sandbox gateway uses magic test cards.

use payloads::MobileNetwork;
use rand::Rng;
use secrecy::SecretBox;
#[cfg(not(feature = "mock-gateway"))]
use secrecy::ExposeSecret;
#[cfg(not(feature = "mock-gateway"))]
use serde::Deserialize;
use serde::Serialize;

/// Reference prefix for wallet deposits.
pub const DEPOSIT_REF_PREFIX: &str = "SWVP-DEP";
/// Reference prefix for outbound transfers.
pub const TRANSFER_REF_PREFIX: &str = "SWVP";

/// Mock-gateway account number that simulates a synchronously declined
/// payout.
#[cfg(feature = "mock-gateway")]
pub const MOCK_DECLINED_ACCOUNT: &str = "0700000002";

/// Generate a transaction reference: `{prefix}-{unixMillis}-{random}`.
///
/// Unique with overwhelming probability, not guaranteed; the database's
/// unique constraint on `reference` is the backstop. The reference doubles
/// as the idempotency key correlating gateway webhooks back to the
/// transaction that initiated them.
pub fn generate_reference(prefix: &str) -> String {
    let millis = jiff::Timestamp::now().as_millisecond();
    let random = rand::thread_rng().gen_range(0..1_000_000);
    format!("{prefix}-{millis}-{random}")
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Gateway request failed")]
    Http(#[from] reqwest::Error),
    #[error("Transfer declined: {message}")]
    Declined { message: String },
    #[error("Unexpected gateway response")]
    InvalidResponse(#[source] anyhow::Error),
}

/// Payout request in the gateway's wire format.
#[derive(Debug, Serialize)]
pub struct TransferRequest {
    pub account_bank: MobileNetwork,
    pub account_number: String,
    pub amount: i64,
    pub narration: String,
    pub currency: String,
    pub reference: String,
    pub beneficiary_name: String,
}

#[cfg(not(feature = "mock-gateway"))]
#[derive(Debug, Deserialize)]
struct TransferResponse {
    status: String,
    message: Option<String>,
    data: Option<TransferResponseData>,
}

#[cfg(not(feature = "mock-gateway"))]
#[derive(Debug, Deserialize)]
struct TransferResponseData {
    id: i64,
    reference: String,
}

/// Gateway-assigned identifiers for an accepted payout.
#[derive(Debug, Clone)]
pub struct TransferAccepted {
    pub transaction_id: i64,
    pub reference: String,
}

pub struct FlutterwaveClient {
    #[cfg(not(feature = "mock-gateway"))]
    http: reqwest::Client,
    #[allow(unused)]
    secret_key: SecretBox<String>,
    #[allow(unused)]
    base_url: String,
}

impl FlutterwaveClient {
    pub fn new(secret_key: SecretBox<String>, base_url: String) -> Self {
        Self {
            #[cfg(not(feature = "mock-gateway"))]
            http: reqwest::Client::new(),
            secret_key,
            base_url,
        }
    }

    /// Initiate a mobile-money payout.
    ///
    /// A `success` status from the gateway means the payout was accepted
    /// (and usually completed) synchronously; anything else is a decline.
    /// Final confirmation may still arrive later via the
    /// `transfer.completed` / `transfer.failed` webhooks.
    #[tracing::instrument(
        skip(self, request),
        fields(reference = %request.reference)
    )]
    #[cfg(not(feature = "mock-gateway"))]
    pub async fn initiate_transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<TransferAccepted, GatewayError> {
        let response = self
            .http
            .post(format!("{}/transfers", self.base_url))
            .bearer_auth(self.secret_key.expose_secret())
            .json(request)
            .send()
            .await?;

        let body: TransferResponse = response.json().await?;
        if body.status != "success" {
            return Err(GatewayError::Declined {
                message: body
                    .message
                    .unwrap_or_else(|| "Payment processing failed".into()),
            });
        }

        let data = body.data.ok_or_else(|| {
            GatewayError::InvalidResponse(anyhow::anyhow!(
                "success response missing transfer data"
            ))
        })?;
        Ok(TransferAccepted {
            transaction_id: data.id,
            reference: data.reference,
        })
    }

    #[tracing::instrument(
        skip(self, request),
        fields(reference = %request.reference)
    )]
    #[cfg(feature = "mock-gateway")]
    pub async fn initiate_transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<TransferAccepted, GatewayError> {
        if request.account_number == MOCK_DECLINED_ACCOUNT {
            tracing::info!("Mock gateway declining transfer");
            return Err(GatewayError::Declined {
                message: "Payment processing failed".into(),
            });
        }

        let id = rand::thread_rng().gen_range(1_000_000..10_000_000);
        tracing::info!(
            "Mock gateway accepted transfer to {} via {}",
            request.account_number,
            request.account_bank
        );
        Ok(TransferAccepted {
            transaction_id: id,
            reference: format!("FLW-MOCK-{id}"),
        })
    }
}
