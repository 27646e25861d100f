use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU32, Ordering},
        Mutex,
    },
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use shared::{
    amount::Amount,
    domain::{
        AccountAddress, ComponentAddress, DiscoveredAddresses, EntityAddress, IntentHash,
        NetworkId, PackageAddress, ResourceAddress, YieldAmmAddresses,
    },
    protocol::{
        EntityDetailsItem, FungibleBalanceChange, LedgerState, StateEntityDetailsResponse,
        TransactionCommittedDetailsResponse, TransactionStatus, TransactionStatusResponse,
    },
};
use tokio::sync::broadcast;
use wallet_integration::{
    Account, DappIdentity, SignedIntent, TransactionRequest, WalletConnector, WalletError,
    WalletEvent,
};

use crate::{gateway::LedgerQueryService, receipt::TransactionReceipt};

pub const ACCOUNT: &str = "account_tdx_2_12y0nsx972ueel0args3jnapz9qsexyj9kz2h6ewpsqh3mvy4a3pyvf";
pub const PACKAGE: &str = "package_tdx_2_1p4gumballpackage00000000000000000000000000000000000";
pub const COMPONENT: &str = "component_tdx_2_1cqgumballmachine000000000000000000000000000000000";
pub const OWNER_BADGE: &str = "resource_tdx_2_1t4ownerbadge0000000000000000000000000000000000000";
pub const GUMBALL: &str = "resource_tdx_2_1t5gumballtoken00000000000000000000000000000000000";
pub const AMM_COMPONENT: &str = "component_tdx_2_1czyieldamm0000000000000000000000000000000000000";
pub const PT: &str = "resource_tdx_2_1tkprincipaltoken000000000000000000000000000000000";
pub const YT: &str = "resource_tdx_2_1tkyieldtoken00000000000000000000000000000000000000";
pub const LSU: &str = "resource_tdx_2_1thliquidstakeunit0000000000000000000000000000000";
pub const INTENT: &str = "txid_tdx_2_1qyk7mwz4l0ns0f5kd83h0ylcr4wz6u6q4eqzcqnvlp7vj9hn5fqsrnzs4x";

pub fn amount(raw: &str) -> Amount {
    raw.parse().expect("amount")
}

pub fn account() -> AccountAddress {
    AccountAddress::new(ACCOUNT).expect("account")
}

pub fn resource(raw: &str) -> ResourceAddress {
    ResourceAddress::new(raw).expect("resource")
}

pub fn entity(raw: &str) -> EntityAddress {
    EntityAddress::new(raw).expect("entity")
}

pub fn intent() -> IntentHash {
    IntentHash::new(INTENT).expect("intent")
}

pub fn package() -> PackageAddress {
    PackageAddress::new(PACKAGE).expect("package")
}

pub fn xrd() -> ResourceAddress {
    NetworkId::Stokenet.xrd_address()
}

pub fn known_gumball() -> DiscoveredAddresses {
    DiscoveredAddresses {
        component: ComponentAddress::new(COMPONENT).expect("component"),
        owner_badge: resource(OWNER_BADGE),
        gumball_resource: resource(GUMBALL),
    }
}

pub fn yield_amm() -> YieldAmmAddresses {
    YieldAmmAddresses {
        component: ComponentAddress::new(AMM_COMPONENT).expect("component"),
        pt_resource: resource(PT),
        yt_resource: resource(YT),
        lsu_resource: resource(LSU),
    }
}

pub fn ledger_state(state_version: u64) -> LedgerState {
    serde_json::from_value(json!({
        "network": "stokenet",
        "state_version": state_version,
        "proposer_round_timestamp": "2024-05-01T12:00:00.000Z",
        "epoch": 41_000,
        "round": 12,
    }))
    .expect("ledger state")
}

pub fn status_response(status: TransactionStatus) -> TransactionStatusResponse {
    TransactionStatusResponse {
        ledger_state: ledger_state(1_000),
        status,
        intent_status: None,
        error_message: None,
    }
}

pub fn fungible(entity_address: &str, resource_address: &str, change: &str) -> FungibleBalanceChange {
    FungibleBalanceChange {
        entity_address: entity(entity_address),
        resource_address: resource(resource_address),
        balance_change: amount(change),
    }
}

pub fn committed_details(
    fungible_changes: Vec<FungibleBalanceChange>,
    affected: &[&str],
) -> TransactionCommittedDetailsResponse {
    serde_json::from_value(json!({
        "ledger_state": ledger_state(1_042),
        "transaction": {
            "transaction_status": "CommittedSuccess",
            "intent_hash": INTENT,
            "state_version": 1_042,
            "fee_paid": "0.3712",
            "affected_global_entities": affected,
            "balance_changes": {
                "fungible_fee_balance_changes": [{
                    "type": "FeePayment",
                    "entity_address": ACCOUNT,
                    "resource_address": xrd().as_str(),
                    "balance_change": "-0.3712",
                }],
                "fungible_balance_changes": fungible_changes,
                "non_fungible_balance_changes": [],
            },
            "receipt": { "status": "CommittedSuccess" },
        }
    }))
    .expect("committed details")
}

pub fn receipt(fungible_changes: Vec<FungibleBalanceChange>) -> TransactionReceipt {
    TransactionReceipt::from_committed_details(intent(), committed_details(fungible_changes, &[]))
}

pub fn gumball_machine_item(price: &str, gumballs: &str, earnings: &str) -> EntityDetailsItem {
    serde_json::from_value(json!({
        "address": COMPONENT,
        "fungible_resources": {
            "items": [
                {
                    "resource_address": GUMBALL,
                    "vaults": { "items": [
                        { "vault_address": "internal_vault_tdx_2_1gum", "amount": gumballs }
                    ]}
                },
                {
                    "resource_address": xrd().as_str(),
                    "vaults": { "items": [
                        { "vault_address": "internal_vault_tdx_2_1xrd", "amount": earnings }
                    ]}
                }
            ]
        },
        "details": {
            "type": "Component",
            "blueprint_name": "GumballMachine",
            "state": {
                "kind": "Tuple",
                "fields": [
                    { "kind": "Reference", "field_name": "gum_resource_manager", "value": GUMBALL },
                    { "kind": "Own", "field_name": "gumballs" },
                    { "kind": "Own", "field_name": "collected_xrd" },
                    { "kind": "Decimal", "field_name": "price", "value": price }
                ]
            }
        }
    }))
    .expect("entity item")
}

/// Ledger fake that answers status polls from a script, then `fallback`.
pub struct ScriptedLedger {
    statuses: Mutex<VecDeque<TransactionStatusResponse>>,
    fallback: Option<TransactionStatus>,
    details: Mutex<Option<TransactionCommittedDetailsResponse>>,
    entities: Mutex<Vec<EntityDetailsItem>>,
    fail_entities: bool,
    pub status_calls: AtomicU32,
    pub entity_calls: AtomicU32,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            fallback: Some(TransactionStatus::Pending),
            details: Mutex::new(None),
            entities: Mutex::new(Vec::new()),
            fail_entities: false,
            status_calls: AtomicU32::new(0),
            entity_calls: AtomicU32::new(0),
        }
    }

    pub fn with_statuses(self, statuses: Vec<TransactionStatusResponse>) -> Self {
        *self.statuses.lock().expect("statuses") = statuses.into();
        self
    }

    /// Status requests past the script never resolve.
    pub fn stalled(mut self) -> Self {
        self.fallback = None;
        self
    }

    pub fn with_details(self, details: TransactionCommittedDetailsResponse) -> Self {
        *self.details.lock().expect("details") = Some(details);
        self
    }

    pub fn with_entity(self, item: EntityDetailsItem) -> Self {
        self.entities.lock().expect("entities").push(item);
        self
    }

    pub fn failing_entities(mut self) -> Self {
        self.fail_entities = true;
        self
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn entity_calls(&self) -> u32 {
        self.entity_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerQueryService for ScriptedLedger {
    async fn transaction_status(
        &self,
        _intent_hash: &IntentHash,
    ) -> Result<TransactionStatusResponse> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.statuses.lock().expect("statuses").pop_front();
        match (scripted, self.fallback) {
            (Some(response), _) => Ok(response),
            (None, Some(status)) => Ok(status_response(status)),
            (None, None) => std::future::pending().await,
        }
    }

    async fn committed_details(
        &self,
        intent_hash: &IntentHash,
    ) -> Result<TransactionCommittedDetailsResponse> {
        self.details
            .lock()
            .expect("details")
            .clone()
            .ok_or_else(|| anyhow!("no committed details for {intent_hash}"))
    }

    async fn entity_details(
        &self,
        addresses: &[EntityAddress],
    ) -> Result<StateEntityDetailsResponse> {
        self.entity_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_entities {
            return Err(anyhow!("gateway unreachable"));
        }
        let items = self
            .entities
            .lock()
            .expect("entities")
            .iter()
            .filter(|item| addresses.contains(&item.address))
            .cloned()
            .collect();
        Ok(StateEntityDetailsResponse {
            ledger_state: ledger_state(1_050),
            items,
        })
    }
}

pub struct FakeWallet {
    outcome: Result<IntentHash, WalletError>,
    pub requests: Mutex<Vec<TransactionRequest>>,
    events: broadcast::Sender<WalletEvent>,
}

impl FakeWallet {
    pub fn signing() -> Self {
        Self::with_outcome(Ok(intent()))
    }

    pub fn rejecting(reason: &str) -> Self {
        Self::with_outcome(Err(WalletError::Rejected {
            reason: reason.to_string(),
        }))
    }

    fn with_outcome(outcome: Result<IntentHash, WalletError>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
            events,
        }
    }

    pub fn emit(&self, event: WalletEvent) {
        let _ = self.events.send(event);
    }

    pub fn sent_manifests(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("requests")
            .iter()
            .map(|request| request.transaction_manifest.clone())
            .collect()
    }
}

#[async_trait]
impl WalletConnector for FakeWallet {
    async fn connect(&self, _dapp: &DappIdentity) -> Result<Account> {
        Ok(Account {
            address: account(),
            label: Some("Main".into()),
        })
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    async fn send_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<SignedIntent, WalletError> {
        self.requests.lock().expect("requests").push(request);
        self.outcome
            .clone()
            .map(|transaction_intent_hash| SignedIntent {
                transaction_intent_hash,
            })
    }

    fn subscribe_events(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}
