//! Net balance changes of the acting account, read from a committed receipt.

use shared::{
    amount::Amount,
    domain::{AccountAddress, ResourceAddress, YieldAmmAddresses},
};

use crate::receipt::TransactionReceipt;

/// Signed net change of `resource` held by `account`: positive when received,
/// negative when spent, zero when the resource does not appear at all.
///
/// Every fungible entry for the pair is summed regardless of order, and
/// non-fungible changes count one unit per added or removed id. Fee payments
/// are reported separately by the ledger and are not part of the result.
pub fn resolve_delta(
    receipt: &TransactionReceipt,
    account: &AccountAddress,
    resource: &ResourceAddress,
) -> Amount {
    let fungible: Amount = receipt
        .fungible_changes
        .iter()
        .filter(|change| change.entity_address == *account && change.resource_address == *resource)
        .map(|change| change.balance_change)
        .sum();

    let non_fungible: i64 = receipt
        .non_fungible_changes
        .iter()
        .filter(|change| change.entity_address == *account && change.resource_address == *resource)
        .map(|change| change.added.len() as i64 - change.removed.len() as i64)
        .sum();

    fungible + Amount::from_whole(non_fungible)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseSummary {
    pub spent: Amount,
    pub received: Amount,
}

pub fn purchase_summary(
    receipt: &TransactionReceipt,
    account: &AccountAddress,
    payment_resource: &ResourceAddress,
    gumball_resource: &ResourceAddress,
) -> PurchaseSummary {
    PurchaseSummary {
        spent: -resolve_delta(receipt, account, payment_resource),
        received: resolve_delta(receipt, account, gumball_resource),
    }
}

/// Redeem outcome as the account saw it. All three values are signed deltas
/// taken from the receipt, so `pt_spent` and `yt_spent` are negative when
/// tokens left the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedeemSummary {
    pub lsu_received: Amount,
    pub pt_spent: Amount,
    pub yt_spent: Amount,
}

pub fn redeem_summary(
    receipt: &TransactionReceipt,
    account: &AccountAddress,
    amm: &YieldAmmAddresses,
) -> RedeemSummary {
    RedeemSummary {
        lsu_received: resolve_delta(receipt, account, &amm.lsu_resource),
        pt_spent: resolve_delta(receipt, account, &amm.pt_resource),
        yt_spent: resolve_delta(receipt, account, &amm.yt_resource),
    }
}

#[cfg(test)]
#[path = "tests/balance_tests.rs"]
mod tests;
