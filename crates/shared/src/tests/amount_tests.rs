use super::*;

#[test]
fn parses_whole_and_fractional_amounts() {
    assert_eq!(Amount::parse("5").expect("whole"), Amount::from_whole(5));
    assert_eq!(Amount::parse("  12 ").expect("padded"), Amount::from_whole(12));
    assert_eq!(
        Amount::parse("0.000000000000000001").expect("smallest unit").to_string(),
        "0.000000000000000001"
    );
    assert_eq!(Amount::parse("-2.5").expect("negative").to_string(), "-2.5");
    assert_eq!(Amount::parse("+3").expect("explicit sign").to_string(), "3");
}

#[test]
fn renders_canonical_form_without_trailing_zeros() {
    assert_eq!(Amount::parse("5.500").expect("amount").to_string(), "5.5");
    assert_eq!(Amount::parse("100.0").expect("amount").to_string(), "100");
    assert_eq!(Amount::parse("-0").expect("amount").to_string(), "0");
}

#[test]
fn keeps_full_precision_of_large_values() {
    let raw = "123456789012345678.123456789012345678";
    assert_eq!(Amount::parse(raw).expect("amount").to_string(), raw);
}

#[test]
fn rejects_malformed_input() {
    assert_eq!(Amount::parse(""), Err(AmountError::Empty));
    assert!(matches!(Amount::parse("1e5"), Err(AmountError::Malformed(_))));
    assert!(matches!(Amount::parse(".5"), Err(AmountError::Malformed(_))));
    assert!(matches!(Amount::parse("5."), Err(AmountError::Malformed(_))));
    assert!(matches!(Amount::parse("1.2.3"), Err(AmountError::Malformed(_))));
    assert!(matches!(Amount::parse("NaN"), Err(AmountError::Malformed(_))));
    assert!(matches!(
        Amount::parse("0.0000000000000000001"),
        Err(AmountError::TooPrecise(_))
    ));
    assert!(matches!(
        Amount::parse(&"9".repeat(80)),
        Err(AmountError::Overflow(_))
    ));
}

#[test]
fn holds_values_across_the_ledger_decimal_range() {
    let near_decimal_max = "3138550867693340381917894711603833208051.177722232017256447";
    assert_eq!(
        Amount::parse(near_decimal_max).expect("decimal max").to_string(),
        near_decimal_max
    );
    let huge = Amount::parse("-3000000000000000000000000000000000000000.5").expect("3e39");
    assert!(huge.is_negative());
    assert_eq!(
        (-huge).to_string(),
        "3000000000000000000000000000000000000000.5"
    );
    assert_eq!(
        Amount::parse("1000000000000000000000").expect("1e21").to_string(),
        "1000000000000000000000"
    );
}

#[test]
fn large_sums_do_not_wrap() {
    let hundred_quintillion = Amount::parse("100000000000000000000").expect("1e20");
    let total: Amount = [hundred_quintillion, hundred_quintillion].iter().sum();
    assert_eq!(total.to_string(), "200000000000000000000");
    assert_eq!(
        hundred_quintillion.checked_add(hundred_quintillion),
        Some(total)
    );

    assert_eq!(Amount::MAX.checked_add(Amount::from_whole(1)), None);
    assert_eq!(Amount::MAX + Amount::from_whole(1), Amount::MAX);
    assert_eq!(Amount::MIN - Amount::from_whole(1), Amount::MIN);
    assert_eq!(-Amount::MIN, Amount::MAX);
}

#[test]
fn sums_and_negates() {
    let values = ["1.5", "-0.25", "3"]
        .iter()
        .map(|raw| Amount::parse(raw).expect("amount"))
        .collect::<Vec<_>>();
    let total: Amount = values.iter().sum();
    assert_eq!(total.to_string(), "4.25");
    assert_eq!((-total).to_string(), "-4.25");
    assert!(total.is_positive());
    assert!((-total).is_negative());
}

#[test]
fn serializes_as_decimal_string() {
    let amount = Amount::parse("7.125").expect("amount");
    assert_eq!(serde_json::to_string(&amount).expect("json"), "\"7.125\"");
    let decoded: Amount = serde_json::from_str("\"-5\"").expect("decode");
    assert_eq!(decoded, Amount::from_whole(-5));
}
