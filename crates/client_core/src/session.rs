//! Session-scoped context shared by the orchestrator and the entity reader.
//!
//! A session starts when a wallet account connects and ends on disconnect.
//! Addresses discovered by an instantiation live here until the next
//! instantiation replaces them or the session is cleared.

use std::sync::Arc;

use anyhow::Result;
use shared::domain::{
    AccountAddress, AddressContext, ComponentAddress, DiscoveredAddresses, NetworkId,
    ResourceAddress, YieldAmmAddresses,
};
use tokio::{
    sync::{broadcast::error::RecvError, RwLock},
    task::JoinHandle,
};
use tracing::{info, warn};
use wallet_integration::{Account, DappIdentity, WalletConnector, WalletEvent};

#[derive(Debug, Default)]
struct SessionState {
    account: Option<Account>,
    discovered: Option<DiscoveredAddresses>,
}

pub struct SessionContext {
    network: NetworkId,
    yield_amm: Option<YieldAmmAddresses>,
    known: Option<DiscoveredAddresses>,
    state: RwLock<SessionState>,
}

impl SessionContext {
    pub fn new(network: NetworkId) -> Arc<Self> {
        Self::with_deployment(network, None, None)
    }

    /// `known` seeds the gumball machine addresses from an earlier
    /// instantiation; they come back after every `clear`.
    pub fn with_deployment(
        network: NetworkId,
        yield_amm: Option<YieldAmmAddresses>,
        known: Option<DiscoveredAddresses>,
    ) -> Arc<Self> {
        Arc::new(Self {
            network,
            yield_amm,
            state: RwLock::new(SessionState {
                account: None,
                discovered: known.clone(),
            }),
            known,
        })
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    pub fn xrd_address(&self) -> ResourceAddress {
        self.network.xrd_address()
    }

    pub fn yield_amm(&self) -> Option<&YieldAmmAddresses> {
        self.yield_amm.as_ref()
    }

    pub async fn connect(
        &self,
        wallet: &dyn WalletConnector,
        dapp: &DappIdentity,
    ) -> Result<Account> {
        let account = wallet.connect(dapp).await?;
        info!(account = %account.address, network = %self.network, "session: wallet connected");
        self.state.write().await.account = Some(account.clone());
        Ok(account)
    }

    pub async fn disconnect(&self, wallet: &dyn WalletConnector) -> Result<()> {
        let result = wallet.disconnect().await;
        self.clear().await;
        result
    }

    pub async fn set_account(&self, account: Option<Account>) {
        self.state.write().await.account = account;
    }

    pub async fn clear(&self) {
        let mut guard = self.state.write().await;
        guard.account = None;
        guard.discovered = self.known.clone();
        info!("session: cleared");
    }

    pub async fn account(&self) -> Option<Account> {
        self.state.read().await.account.clone()
    }

    pub async fn account_address(&self) -> Option<AccountAddress> {
        self.state
            .read()
            .await
            .account
            .as_ref()
            .map(|account| account.address.clone())
    }

    pub async fn record_instantiation(&self, discovered: DiscoveredAddresses) {
        info!(
            component = %discovered.component,
            owner_badge = %discovered.owner_badge,
            gumball_resource = %discovered.gumball_resource,
            "session: recorded instantiated addresses"
        );
        self.state.write().await.discovered = Some(discovered);
    }

    pub async fn discovered(&self) -> Option<DiscoveredAddresses> {
        self.state.read().await.discovered.clone()
    }

    pub async fn component(&self) -> Option<ComponentAddress> {
        self.state
            .read()
            .await
            .discovered
            .as_ref()
            .map(|d| d.component.clone())
    }

    pub async fn gumball_resource(&self) -> Option<ResourceAddress> {
        self.state
            .read()
            .await
            .discovered
            .as_ref()
            .map(|d| d.gumball_resource.clone())
    }

    /// Snapshot of every address a manifest may need, taken once per
    /// operation.
    pub async fn address_context(&self) -> AddressContext {
        let guard = self.state.read().await;
        let discovered = guard.discovered.as_ref();
        AddressContext {
            account: guard.account.as_ref().map(|a| a.address.clone()),
            component: discovered.map(|d| d.component.clone()),
            owner_badge: discovered.map(|d| d.owner_badge.clone()),
            gumball_resource: discovered.map(|d| d.gumball_resource.clone()),
            yield_amm: self.yield_amm.clone(),
        }
    }

    /// Keeps the connected account in step with the wallet's own account
    /// selection until the wallet event stream closes.
    pub fn follow_wallet_events(self: &Arc<Self>, wallet: &dyn WalletConnector) -> JoinHandle<()> {
        let mut events = wallet.subscribe_events();
        let session = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(WalletEvent::AccountsChanged(accounts)) => {
                        let first = accounts.into_iter().next();
                        info!(
                            account = first.as_ref().map(|a| a.address.as_str()).unwrap_or("none"),
                            "session: wallet account changed"
                        );
                        session.set_account(first).await;
                    }
                    Ok(WalletEvent::Disconnected) => session.clear().await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "session: wallet events lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
