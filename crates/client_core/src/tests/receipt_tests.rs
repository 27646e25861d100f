use super::*;
use crate::test_support::*;

#[test]
fn builds_receipt_from_committed_details() {
    let receipt = receipt(vec![fungible(ACCOUNT, GUMBALL, "1")]);

    assert_eq!(receipt.intent_hash, intent());
    assert_eq!(receipt.network, "stokenet");
    assert_eq!(receipt.state_version, 1_042);
    assert_eq!(receipt.fee_paid, amount("0.3712"));
    assert_eq!(receipt.fungible_changes.len(), 1);
    assert!(receipt.is_success());
}

#[test]
fn receipt_status_overrides_transaction_status() {
    let mut details = committed_details(Vec::new(), &[]);
    if let Some(info) = details.transaction.receipt.as_mut() {
        info.status = Some(TransactionStatus::CommittedFailure);
        info.error_message = Some("Assertion failed".into());
    }

    let receipt = TransactionReceipt::from_committed_details(intent(), details);

    assert!(!receipt.is_success());
    assert_eq!(receipt.error_message.as_deref(), Some("Assertion failed"));
}

#[test]
fn instantiation_addresses_come_from_entity_positions() {
    let details = committed_details(
        Vec::new(),
        &[PACKAGE, ACCOUNT, COMPONENT, OWNER_BADGE, GUMBALL, "internal_vault_tdx_2_1x"],
    );

    let receipt = TransactionReceipt::from_committed_details(intent(), details);

    assert_eq!(receipt.discovered_addresses(), Some(known_gumball()));
}

#[test]
fn too_few_entities_yield_no_addresses() {
    let details = committed_details(Vec::new(), &[PACKAGE, ACCOUNT, COMPONENT, OWNER_BADGE]);

    let receipt = TransactionReceipt::from_committed_details(intent(), details);

    assert_eq!(receipt.discovered_addresses(), None);
}

#[test]
fn large_balance_change_on_another_entity_still_parses() {
    let mut details = serde_json::to_value(committed_details(
        vec![fungible(ACCOUNT, GUMBALL, "1")],
        &[ACCOUNT, COMPONENT],
    ))
    .expect("details json");
    details["transaction"]["balance_changes"]["fungible_balance_changes"]
        .as_array_mut()
        .expect("fungible changes")
        .push(serde_json::json!({
            "entity_address": "component_tdx_2_1whale",
            "resource_address": xrd().as_str(),
            "balance_change": "1000000000000000000000",
        }));
    let details: TransactionCommittedDetailsResponse =
        serde_json::from_value(details).expect("details with 1e21 change");

    let receipt = TransactionReceipt::from_committed_details(intent(), details);

    assert_eq!(receipt.fungible_changes.len(), 2);
    assert_eq!(
        receipt.fungible_changes[1].balance_change.to_string(),
        "1000000000000000000000"
    );
    assert_eq!(
        crate::balance::resolve_delta(&receipt, &account(), &resource(GUMBALL)),
        amount("1")
    );
}
