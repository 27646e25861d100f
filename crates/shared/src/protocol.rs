//! Gateway API request and response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    amount::Amount,
    domain::{EntityAddress, IntentHash, ResourceAddress},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerState {
    pub network: String,
    pub state_version: u64,
    pub proposer_round_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub epoch: u64,
    #[serde(default)]
    pub round: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Unknown,
    CommittedSuccess,
    CommittedFailure,
    Pending,
    Rejected,
    #[serde(other)]
    Unrecognized,
}

impl TransactionStatus {
    pub fn is_final(self) -> bool {
        matches!(
            self,
            TransactionStatus::CommittedSuccess
                | TransactionStatus::CommittedFailure
                | TransactionStatus::Rejected
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatusRequest {
    pub intent_hash: IntentHash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatusResponse {
    pub ledger_state: LedgerState,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionDetailsOptIns {
    #[serde(default)]
    pub balance_changes: bool,
    #[serde(default)]
    pub affected_global_entities: bool,
    #[serde(default)]
    pub receipt_fee_summary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionCommittedDetailsRequest {
    pub intent_hash: IntentHash,
    pub opt_ins: TransactionDetailsOptIns,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionCommittedDetailsResponse {
    pub ledger_state: LedgerState,
    pub transaction: CommittedTransactionInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommittedTransactionInfo {
    pub transaction_status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_hash: Option<IntentHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_paid: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub affected_global_entities: Vec<EntityAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_changes: Option<TransactionBalanceChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<TransactionReceiptInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReceiptInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionBalanceChanges {
    #[serde(default)]
    pub fungible_fee_balance_changes: Vec<FungibleFeeBalanceChange>,
    #[serde(default)]
    pub fungible_balance_changes: Vec<FungibleBalanceChange>,
    #[serde(default)]
    pub non_fungible_balance_changes: Vec<NonFungibleBalanceChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungibleFeeBalanceChange {
    #[serde(rename = "type")]
    pub fee_type: String,
    pub entity_address: EntityAddress,
    pub resource_address: ResourceAddress,
    pub balance_change: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungibleBalanceChange {
    pub entity_address: EntityAddress,
    pub resource_address: ResourceAddress,
    pub balance_change: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonFungibleBalanceChange {
    pub entity_address: EntityAddress,
    pub resource_address: ResourceAddress,
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceAggregationLevel {
    Global,
    Vault,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateEntityDetailsRequest {
    pub addresses: Vec<EntityAddress>,
    pub aggregation_level: ResourceAggregationLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateEntityDetailsResponse {
    pub ledger_state: LedgerState,
    #[serde(default)]
    pub items: Vec<EntityDetailsItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDetailsItem {
    pub address: EntityAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fungible_resources: Option<FungibleResourcesCollection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<EntityDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FungibleResourcesCollection {
    #[serde(default)]
    pub items: Vec<FungibleResourceVaults>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FungibleResourceVaults {
    pub resource_address: ResourceAddress,
    #[serde(default)]
    pub vaults: VaultCollection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultCollection {
    #[serde(default)]
    pub items: Vec<VaultBalance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultBalance {
    pub vault_address: String,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at_state_version: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDetails {
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ComponentState>,
}

/// Programmatic JSON of a component's state tuple.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub fields: Vec<StateField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateField {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}
