use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amount::Amount;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} address must not be empty")]
pub struct AddressError {
    pub kind: &'static str,
}

macro_rules! address_newtype {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Result<Self, AddressError> {
                let raw = raw.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(AddressError { kind: $kind });
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = AddressError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = AddressError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

address_newtype!(AccountAddress, "account");
address_newtype!(ComponentAddress, "component");
address_newtype!(ResourceAddress, "resource");
address_newtype!(PackageAddress, "package");
address_newtype!(EntityAddress, "entity");
address_newtype!(IntentHash, "intent hash");

macro_rules! entity_conversion {
    ($name:ident) => {
        impl From<$name> for EntityAddress {
            fn from(value: $name) -> Self {
                EntityAddress(value.0)
            }
        }

        impl From<&$name> for EntityAddress {
            fn from(value: &$name) -> Self {
                EntityAddress(value.0.clone())
            }
        }

        impl PartialEq<$name> for EntityAddress {
            fn eq(&self, other: &$name) -> bool {
                self.0 == other.0
            }
        }
    };
}

entity_conversion!(AccountAddress);
entity_conversion!(ComponentAddress);
entity_conversion!(ResourceAddress);

impl EntityAddress {
    pub fn into_component(self) -> ComponentAddress {
        ComponentAddress(self.0)
    }

    pub fn into_resource(self) -> ResourceAddress {
        ResourceAddress(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkId {
    Mainnet,
    Stokenet,
}

impl NetworkId {
    pub fn logical_name(self) -> &'static str {
        match self {
            NetworkId::Mainnet => "mainnet",
            NetworkId::Stokenet => "stokenet",
        }
    }

    pub fn default_gateway_url(self) -> &'static str {
        match self {
            NetworkId::Mainnet => "https://mainnet.radixdlt.com",
            NetworkId::Stokenet => "https://stokenet.radixdlt.com",
        }
    }

    pub fn xrd_address(self) -> ResourceAddress {
        let raw = match self {
            NetworkId::Mainnet => {
                "resource_rdx1tknxxxxxxxxxradxrdxxxxxxxxx009923554798xxxxxxxxxradxrd"
            }
            NetworkId::Stokenet => {
                "resource_tdx_2_1tknxxxxxxxxxradxrdxxxxxxxxx009923554798xxxxxxxxxtfd2jc"
            }
        };
        ResourceAddress(raw.to_string())
    }

    pub fn dashboard_transaction_url(self, intent_hash: &IntentHash) -> String {
        let host = match self {
            NetworkId::Mainnet => "https://dashboard.radixdlt.com",
            NetworkId::Stokenet => "https://stokenet-dashboard.radixdlt.com",
        };
        format!("{host}/transaction/{intent_hash}/summary")
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Some(NetworkId::Mainnet),
            "stokenet" => Some(NetworkId::Stokenet),
            _ => None,
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.logical_name())
    }
}

/// Addresses of a deployed yield AMM. Configured per deployment, never discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldAmmAddresses {
    pub component: ComponentAddress,
    pub pt_resource: ResourceAddress,
    pub yt_resource: ResourceAddress,
    pub lsu_resource: ResourceAddress,
}

/// Addresses learned from an instantiation receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredAddresses {
    pub component: ComponentAddress,
    pub owner_badge: ResourceAddress,
    pub gumball_resource: ResourceAddress,
}

/// Well-known addresses a manifest may reference. Every field is optional so
/// a missing one can be reported against the operation that needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressContext {
    pub account: Option<AccountAddress>,
    pub component: Option<ComponentAddress>,
    pub owner_badge: Option<ResourceAddress>,
    pub gumball_resource: Option<ResourceAddress>,
    pub yield_amm: Option<YieldAmmAddresses>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum OperationRequest {
    Instantiate {
        package: PackageAddress,
        price: Amount,
    },
    Deposit {
        amount: Amount,
        resource: ResourceAddress,
    },
    Withdraw,
    SetPrice {
        price: Amount,
    },
    Refill,
    Redeem {
        pt_amount: Amount,
        yt_amount: Amount,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Instantiate,
    Deposit,
    Withdraw,
    SetPrice,
    Refill,
    Redeem,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Instantiate => "instantiate",
            OperationKind::Deposit => "deposit",
            OperationKind::Withdraw => "withdraw",
            OperationKind::SetPrice => "set_price",
            OperationKind::Refill => "refill",
            OperationKind::Redeem => "redeem",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OperationRequest {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationRequest::Instantiate { .. } => OperationKind::Instantiate,
            OperationRequest::Deposit { .. } => OperationKind::Deposit,
            OperationRequest::Withdraw => OperationKind::Withdraw,
            OperationRequest::SetPrice { .. } => OperationKind::SetPrice,
            OperationRequest::Refill => OperationKind::Refill,
            OperationRequest::Redeem { .. } => OperationKind::Redeem,
        }
    }

    /// Component whose displayed state changes once this operation commits.
    /// Instantiation has no target until the receipt names the new component.
    pub fn target_component(&self, context: &AddressContext) -> Option<ComponentAddress> {
        match self {
            OperationRequest::Instantiate { .. } => None,
            OperationRequest::Redeem { .. } => {
                context.yield_amm.as_ref().map(|amm| amm.component.clone())
            }
            _ => context.component.clone(),
        }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
