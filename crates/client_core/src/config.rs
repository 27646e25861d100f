use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::{anyhow, bail, Context};
use shared::domain::{
    AccountAddress, ComponentAddress, DiscoveredAddresses, NetworkId, PackageAddress,
    ResourceAddress, YieldAmmAddresses,
};
use url::Url;
use wallet_integration::DappIdentity;

use crate::PollPolicy;

pub const SETTINGS_FILE: &str = "dapp.toml";
const ENV_PREFIX: &str = "APP__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub network: NetworkId,
    pub gateway_url: Option<String>,
    pub dapp_definition_address: Option<String>,
    pub application_name: String,
    pub application_version: String,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    pub request_timeout_ms: u64,
    pub package_address: Option<String>,
    pub component_address: Option<String>,
    pub owner_badge_address: Option<String>,
    pub gumball_resource_address: Option<String>,
    pub yield_amm_component_address: Option<String>,
    pub pt_resource_address: Option<String>,
    pub yt_resource_address: Option<String>,
    pub lsu_resource_address: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network: NetworkId::Stokenet,
            gateway_url: None,
            dapp_definition_address: None,
            application_name: "Radix Gumball dApp".into(),
            application_version: "1.0.0".into(),
            poll_interval_ms: 1_000,
            max_poll_attempts: 120,
            request_timeout_ms: 10_000,
            package_address: None,
            component_address: None,
            owner_badge_address: None,
            gumball_resource_address: None,
            yield_amm_component_address: None,
            pt_resource_address: None,
            yt_resource_address: None,
            lsu_resource_address: None,
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE))
}

/// Defaults, then the settings file if it exists and parses, then `APP__*`
/// environment variables.
pub fn load_settings_from(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(values) = parse_settings_file(&raw) {
            apply_values(&mut settings, |key| values.get(key).cloned());
        }
    }

    apply_values(&mut settings, |key| {
        std::env::var(format!("{ENV_PREFIX}{}", key.to_ascii_uppercase())).ok()
    });

    settings
}

fn parse_settings_file(raw: &str) -> anyhow::Result<HashMap<String, String>> {
    let table = toml::from_str::<HashMap<String, toml::Value>>(raw)?;
    Ok(table
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}

fn apply_values(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(network) = lookup("network").and_then(|v| NetworkId::from_name(&v)) {
        settings.network = network;
    }
    if let Some(v) = lookup("gateway_url") {
        settings.gateway_url = Some(v);
    }
    if let Some(v) = lookup("dapp_definition_address") {
        settings.dapp_definition_address = Some(v);
    }
    if let Some(v) = lookup("application_name") {
        settings.application_name = v;
    }
    if let Some(v) = lookup("application_version") {
        settings.application_version = v;
    }
    if let Some(parsed) = lookup("poll_interval_ms").and_then(|v| v.parse().ok()) {
        settings.poll_interval_ms = parsed;
    }
    if let Some(parsed) = lookup("max_poll_attempts").and_then(|v| v.parse().ok()) {
        settings.max_poll_attempts = parsed;
    }
    if let Some(parsed) = lookup("request_timeout_ms").and_then(|v| v.parse().ok()) {
        settings.request_timeout_ms = parsed;
    }

    let optional_fields: [(&str, &mut Option<String>); 8] = [
        ("package_address", &mut settings.package_address),
        ("component_address", &mut settings.component_address),
        ("owner_badge_address", &mut settings.owner_badge_address),
        ("gumball_resource_address", &mut settings.gumball_resource_address),
        (
            "yield_amm_component_address",
            &mut settings.yield_amm_component_address,
        ),
        ("pt_resource_address", &mut settings.pt_resource_address),
        ("yt_resource_address", &mut settings.yt_resource_address),
        ("lsu_resource_address", &mut settings.lsu_resource_address),
    ];
    for (key, slot) in optional_fields {
        if let Some(v) = lookup(key) {
            *slot = Some(v);
        }
    }
}

impl Settings {
    pub fn gateway_base_url(&self) -> anyhow::Result<String> {
        let raw = self
            .gateway_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.network.default_gateway_url());

        let parsed =
            Url::parse(raw).with_context(|| format!("invalid gateway_url '{raw}'"))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            bail!("gateway_url must start with http:// or https://, got '{raw}'");
        }
        Ok(raw.trim_end_matches('/').to_string())
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.max_poll_attempts.max(1),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn package_address(&self) -> anyhow::Result<Option<PackageAddress>> {
        self.package_address
            .as_deref()
            .map(PackageAddress::new)
            .transpose()
            .context("invalid package_address")
    }

    pub fn dapp_identity(&self) -> anyhow::Result<DappIdentity> {
        let address = self
            .dapp_definition_address
            .as_deref()
            .ok_or_else(|| anyhow!("dapp_definition_address is not configured"))?;
        Ok(DappIdentity {
            dapp_definition_address: AccountAddress::new(address)
                .context("invalid dapp_definition_address")?,
            application_name: self.application_name.clone(),
            application_version: self.application_version.clone(),
        })
    }

    /// Gumball machine addresses from an earlier instantiation, if all three
    /// are configured.
    pub fn known_addresses(&self) -> anyhow::Result<Option<DiscoveredAddresses>> {
        match (
            &self.component_address,
            &self.owner_badge_address,
            &self.gumball_resource_address,
        ) {
            (None, None, None) => Ok(None),
            (Some(component), Some(owner_badge), Some(gumball_resource)) => {
                Ok(Some(DiscoveredAddresses {
                    component: ComponentAddress::new(component.as_str())?,
                    owner_badge: ResourceAddress::new(owner_badge.as_str())?,
                    gumball_resource: ResourceAddress::new(gumball_resource.as_str())?,
                }))
            }
            _ => bail!(
                "component_address, owner_badge_address and gumball_resource_address must be set together"
            ),
        }
    }

    pub fn yield_amm(&self) -> anyhow::Result<Option<YieldAmmAddresses>> {
        match (
            &self.yield_amm_component_address,
            &self.pt_resource_address,
            &self.yt_resource_address,
            &self.lsu_resource_address,
        ) {
            (None, None, None, None) => Ok(None),
            (Some(component), Some(pt), Some(yt), Some(lsu)) => Ok(Some(YieldAmmAddresses {
                component: ComponentAddress::new(component.as_str())?,
                pt_resource: ResourceAddress::new(pt.as_str())?,
                yt_resource: ResourceAddress::new(yt.as_str())?,
                lsu_resource: ResourceAddress::new(lsu.as_str())?,
            })),
            _ => bail!("yield AMM addresses are partially configured"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
