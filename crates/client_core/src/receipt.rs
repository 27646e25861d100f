use chrono::{DateTime, Utc};
use shared::{
    amount::Amount,
    domain::{DiscoveredAddresses, EntityAddress, IntentHash},
    protocol::{
        FungibleBalanceChange, NonFungibleBalanceChange, TransactionCommittedDetailsResponse,
        TransactionStatus,
    },
};

const INSTANTIATE_COMPONENT_INDEX: usize = 2;
const INSTANTIATE_OWNER_BADGE_INDEX: usize = 3;
const INSTANTIATE_RESOURCE_INDEX: usize = 4;

/// Ledger-confirmed record of a finalized transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionReceipt {
    pub intent_hash: IntentHash,
    pub network: String,
    pub state_version: u64,
    pub proposer_timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    pub error_message: Option<String>,
    pub fee_paid: Amount,
    pub fungible_changes: Vec<FungibleBalanceChange>,
    pub non_fungible_changes: Vec<NonFungibleBalanceChange>,
    pub affected_global_entities: Vec<EntityAddress>,
}

impl TransactionReceipt {
    pub fn from_committed_details(
        intent_hash: IntentHash,
        details: TransactionCommittedDetailsResponse,
    ) -> Self {
        let transaction = details.transaction;
        let (error_message, receipt_status) = match transaction.receipt {
            Some(receipt) => (receipt.error_message, receipt.status),
            None => (None, None),
        };
        let balance_changes = transaction.balance_changes.unwrap_or_default();

        Self {
            intent_hash: transaction.intent_hash.unwrap_or(intent_hash),
            network: details.ledger_state.network,
            state_version: transaction
                .state_version
                .unwrap_or(details.ledger_state.state_version),
            proposer_timestamp: details.ledger_state.proposer_round_timestamp,
            status: receipt_status.unwrap_or(transaction.transaction_status),
            error_message,
            fee_paid: transaction.fee_paid.unwrap_or_default(),
            fungible_changes: balance_changes.fungible_balance_changes,
            non_fungible_changes: balance_changes.non_fungible_balance_changes,
            affected_global_entities: transaction.affected_global_entities,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TransactionStatus::CommittedSuccess
    }

    /// Component, owner badge and gumball resource created by an
    /// instantiation, in the ledger's affected-entity order.
    pub fn discovered_addresses(&self) -> Option<DiscoveredAddresses> {
        let entities = &self.affected_global_entities;
        if entities.len() <= INSTANTIATE_RESOURCE_INDEX {
            return None;
        }
        Some(DiscoveredAddresses {
            component: entities[INSTANTIATE_COMPONENT_INDEX].clone().into_component(),
            owner_badge: entities[INSTANTIATE_OWNER_BADGE_INDEX]
                .clone()
                .into_resource(),
            gumball_resource: entities[INSTANTIATE_RESOURCE_INDEX].clone().into_resource(),
        })
    }
}

#[cfg(test)]
#[path = "tests/receipt_tests.rs"]
mod tests;
