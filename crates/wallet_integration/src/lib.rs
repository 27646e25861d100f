use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::domain::{AccountAddress, IntentHash};
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: AccountAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// What a dApp tells the wallet about itself when requesting a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DappIdentity {
    pub dapp_definition_address: AccountAddress,
    pub application_name: String,
    pub application_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub transaction_manifest: String,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedIntent {
    pub transaction_intent_hash: IntentHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("rejected by user: {reason}")]
    Rejected { reason: String },
    #[error("no wallet account connected")]
    NotConnected,
    #[error("wallet failure: {0}")]
    Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    AccountsChanged(Vec<Account>),
    Disconnected,
}

#[async_trait]
pub trait WalletConnector: Send + Sync {
    async fn connect(&self, dapp: &DappIdentity) -> anyhow::Result<Account>;
    async fn disconnect(&self) -> anyhow::Result<()>;
    async fn send_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<SignedIntent, WalletError>;
    fn subscribe_events(&self) -> broadcast::Receiver<WalletEvent>;
}

/// Stand-in used until a real wallet is wired in; every call fails.
pub struct MissingWalletConnector {
    events: broadcast::Sender<WalletEvent>,
}

impl MissingWalletConnector {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self { events }
    }
}

impl Default for MissingWalletConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletConnector for MissingWalletConnector {
    async fn connect(&self, _dapp: &DappIdentity) -> anyhow::Result<Account> {
        Err(anyhow::anyhow!("wallet connector is unavailable"))
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn send_transaction(
        &self,
        _request: TransactionRequest,
    ) -> Result<SignedIntent, WalletError> {
        Err(WalletError::NotConnected)
    }

    fn subscribe_events(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}
