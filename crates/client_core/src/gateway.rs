//! Read-only ledger queries over the Gateway HTTP API.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{EntityAddress, IntentHash},
    error::{GatewayErrorResponse, GatewayException},
    protocol::{
        ResourceAggregationLevel, StateEntityDetailsRequest, StateEntityDetailsResponse,
        TransactionCommittedDetailsRequest, TransactionCommittedDetailsResponse,
        TransactionDetailsOptIns, TransactionStatusRequest, TransactionStatusResponse,
    },
};
use tracing::debug;

#[async_trait]
pub trait LedgerQueryService: Send + Sync {
    async fn transaction_status(&self, intent_hash: &IntentHash)
        -> Result<TransactionStatusResponse>;
    async fn committed_details(
        &self,
        intent_hash: &IntentHash,
    ) -> Result<TransactionCommittedDetailsResponse>;
    async fn entity_details(
        &self,
        addresses: &[EntityAddress],
    ) -> Result<StateEntityDetailsResponse>;
}

pub struct MissingLedgerQueryService;

#[async_trait]
impl LedgerQueryService for MissingLedgerQueryService {
    async fn transaction_status(
        &self,
        intent_hash: &IntentHash,
    ) -> Result<TransactionStatusResponse> {
        Err(anyhow!(
            "ledger query service unavailable for intent {intent_hash}"
        ))
    }

    async fn committed_details(
        &self,
        intent_hash: &IntentHash,
    ) -> Result<TransactionCommittedDetailsResponse> {
        Err(anyhow!(
            "ledger query service unavailable for intent {intent_hash}"
        ))
    }

    async fn entity_details(
        &self,
        _addresses: &[EntityAddress],
    ) -> Result<StateEntityDetailsResponse> {
        Err(anyhow!("ledger query service unavailable"))
    }
}

pub struct GatewayClient {
    http: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), base_url)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build gateway http client")?;
        Ok(Self::with_http_client(http, base_url))
    }

    pub fn with_http_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{path}", self.base_url);
        debug!(%url, "gateway: request");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to reach gateway: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GatewayErrorResponse>(&raw)
                .map(|body| body.message)
                .unwrap_or(raw);
            return Err(GatewayException::new(status.as_u16(), message).into());
        }

        response
            .json()
            .await
            .with_context(|| format!("invalid gateway response from {path}"))
    }
}

#[async_trait]
impl LedgerQueryService for GatewayClient {
    async fn transaction_status(
        &self,
        intent_hash: &IntentHash,
    ) -> Result<TransactionStatusResponse> {
        self.post(
            "transaction/status",
            &TransactionStatusRequest {
                intent_hash: intent_hash.clone(),
            },
        )
        .await
    }

    async fn committed_details(
        &self,
        intent_hash: &IntentHash,
    ) -> Result<TransactionCommittedDetailsResponse> {
        self.post(
            "transaction/committed-details",
            &TransactionCommittedDetailsRequest {
                intent_hash: intent_hash.clone(),
                opt_ins: TransactionDetailsOptIns {
                    balance_changes: true,
                    affected_global_entities: true,
                    receipt_fee_summary: false,
                },
            },
        )
        .await
    }

    async fn entity_details(
        &self,
        addresses: &[EntityAddress],
    ) -> Result<StateEntityDetailsResponse> {
        self.post(
            "state/entity/details",
            &StateEntityDetailsRequest {
                addresses: addresses.to_vec(),
                aggregation_level: ResourceAggregationLevel::Vault,
            },
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
