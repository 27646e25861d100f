use std::{env, fs};

use super::*;

fn temp_settings_path(name: &str) -> std::path::PathBuf {
    env::temp_dir().join(format!("{name}-{}.toml", std::process::id()))
}

#[test]
fn defaults_target_stokenet() {
    let settings = Settings::default();

    assert_eq!(settings.network, NetworkId::Stokenet);
    assert_eq!(
        settings.gateway_base_url().expect("url"),
        "https://stokenet.radixdlt.com"
    );
    assert_eq!(settings.poll_policy(), PollPolicy::default());
    assert!(settings.known_addresses().expect("known").is_none());
    assert!(settings.yield_amm().expect("amm").is_none());
}

#[test]
fn file_values_override_defaults() {
    let path = temp_settings_path("dapp-settings-file");
    fs::write(
        &path,
        r#"
network = "mainnet"
gateway_url = "http://127.0.0.1:9000/"
poll_interval_ms = 250
max_poll_attempts = 8
component_address = "component_rdx1gumball"
owner_badge_address = "resource_rdx1owner"
gumball_resource_address = "resource_rdx1gum"
"#,
    )
    .expect("write settings");

    let mut settings = Settings::default();
    let raw = fs::read_to_string(&path).expect("read settings");
    let values = parse_settings_file(&raw).expect("parse");
    apply_values(&mut settings, |key| values.get(key).cloned());
    let _ = fs::remove_file(&path);

    assert_eq!(settings.network, NetworkId::Mainnet);
    assert_eq!(settings.gateway_base_url().expect("url"), "http://127.0.0.1:9000");
    assert_eq!(settings.poll_policy().interval, Duration::from_millis(250));
    assert_eq!(settings.poll_policy().max_attempts, 8);
    let known = settings.known_addresses().expect("known").expect("configured");
    assert_eq!(known.component.as_str(), "component_rdx1gumball");
}

#[test]
fn later_source_wins_and_bad_numbers_are_ignored() {
    let mut settings = Settings::default();
    apply_values(&mut settings, |key| match key {
        "request_timeout_ms" => Some("2500".into()),
        "max_poll_attempts" => Some("lots".into()),
        _ => None,
    });
    apply_values(&mut settings, |key| {
        (key == "request_timeout_ms").then(|| "4000".to_string())
    });

    assert_eq!(settings.request_timeout(), Duration::from_millis(4000));
    assert_eq!(settings.max_poll_attempts, 120);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let settings = load_settings_from(Path::new("/nonexistent/dapp.toml"));

    assert_eq!(settings.application_name, "Radix Gumball dApp");
}

#[test]
fn gateway_url_must_be_http() {
    let settings = Settings {
        gateway_url: Some("ftp://gateway.example".into()),
        ..Settings::default()
    };

    assert!(settings.gateway_base_url().is_err());
}

#[test]
fn partially_configured_addresses_are_rejected() {
    let settings = Settings {
        component_address: Some("component_rdx1gumball".into()),
        ..Settings::default()
    };
    assert!(settings.known_addresses().is_err());

    let settings = Settings {
        pt_resource_address: Some("resource_rdx1pt".into()),
        ..Settings::default()
    };
    assert!(settings.yield_amm().is_err());
}

#[test]
fn dapp_identity_requires_definition_address() {
    assert!(Settings::default().dapp_identity().is_err());

    let settings = Settings {
        dapp_definition_address: Some("account_tdx_2_1dapp".into()),
        ..Settings::default()
    };
    let identity = settings.dapp_identity().expect("identity");
    assert_eq!(identity.dapp_definition_address.as_str(), "account_tdx_2_1dapp");
    assert_eq!(identity.application_version, "1.0.0");
}

#[test]
fn zero_poll_attempts_still_polls_once() {
    let settings = Settings {
        max_poll_attempts: 0,
        ..Settings::default()
    };

    assert_eq!(settings.poll_policy().max_attempts, 1);
}
