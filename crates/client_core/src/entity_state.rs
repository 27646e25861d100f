use std::{collections::BTreeMap, sync::Arc};

use shared::{
    amount::Amount,
    domain::{EntityAddress, ResourceAddress},
    protocol::{EntityDetailsItem, StateField},
};
use tracing::debug;

use crate::{error::ReadError, gateway::LedgerQueryService, session::SessionContext};

pub const PRICE_FIELD: &str = "price";

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Decimal(Amount),
    Text(String),
    Other(serde_json::Value),
}

impl FieldValue {
    fn decode(field: &StateField) -> Self {
        let value = field.value.clone().unwrap_or(serde_json::Value::Null);
        match (field.kind.as_str(), &value) {
            ("Decimal" | "PreciseDecimal", serde_json::Value::String(raw)) => {
                match raw.parse::<Amount>() {
                    Ok(amount) => FieldValue::Decimal(amount),
                    Err(_) => FieldValue::Other(value),
                }
            }
            ("String", serde_json::Value::String(raw)) => FieldValue::Text(raw.clone()),
            _ => FieldValue::Other(value),
        }
    }

    pub fn as_decimal(&self) -> Option<Amount> {
        match self {
            FieldValue::Decimal(amount) => Some(*amount),
            _ => None,
        }
    }
}

/// Point-in-time projection of one entity's state fields and vault balances.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub address: EntityAddress,
    pub state_version: u64,
    pub entity_type: Option<String>,
    fields: BTreeMap<String, FieldValue>,
    vaults: BTreeMap<ResourceAddress, Amount>,
}

impl EntitySnapshot {
    pub fn from_details(state_version: u64, item: EntityDetailsItem) -> Self {
        let (entity_type, state_fields) = match item.details {
            Some(details) => (
                Some(details.entity_type),
                details.state.map(|state| state.fields).unwrap_or_default(),
            ),
            None => (None, Vec::new()),
        };

        let fields = state_fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let name = field
                    .field_name
                    .clone()
                    .unwrap_or_else(|| index.to_string());
                (name, FieldValue::decode(field))
            })
            .collect();

        let mut vaults = BTreeMap::new();
        for resource in item.fungible_resources.unwrap_or_default().items {
            let total: Amount = resource.vaults.items.iter().map(|v| v.amount).sum();
            *vaults.entry(resource.resource_address).or_insert(Amount::ZERO) += total;
        }

        Self {
            address: item.address,
            state_version,
            entity_type,
            fields,
            vaults,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn decimal_field(&self, name: &str) -> Option<Amount> {
        self.field(name).and_then(FieldValue::as_decimal)
    }

    pub fn price(&self) -> Option<Amount> {
        self.decimal_field(PRICE_FIELD)
    }

    pub fn vault_balance(&self, resource: &ResourceAddress) -> Option<Amount> {
        self.vaults.get(resource).copied()
    }

    pub fn gumball_machine(
        &self,
        gumball_resource: Option<&ResourceAddress>,
        xrd: &ResourceAddress,
    ) -> GumballMachineView {
        GumballMachineView {
            price: self.price(),
            gumballs: gumball_resource.and_then(|resource| self.vault_balance(resource)),
            earnings: self.vault_balance(xrd),
        }
    }
}

/// Displayed gumball machine values; `None` means the field or vault was not
/// present and should be shown as a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GumballMachineView {
    pub price: Option<Amount>,
    pub gumballs: Option<Amount>,
    pub earnings: Option<Amount>,
}

#[derive(Clone)]
pub struct EntityStateReader {
    ledger: Arc<dyn LedgerQueryService>,
}

impl EntityStateReader {
    pub fn new(ledger: Arc<dyn LedgerQueryService>) -> Self {
        Self { ledger }
    }

    pub async fn read_state(&self, address: &EntityAddress) -> Result<EntitySnapshot, ReadError> {
        let response = self
            .ledger
            .entity_details(std::slice::from_ref(address))
            .await
            .map_err(|err| ReadError::Gateway(format!("{err:#}")))?;

        let state_version = response.ledger_state.state_version;
        let item = response
            .items
            .into_iter()
            .find(|item| item.address == *address)
            .ok_or_else(|| ReadError::EntityNotFound(address.clone()))?;

        debug!(%address, state_version, "entity: snapshot read");
        Ok(EntitySnapshot::from_details(state_version, item))
    }

    pub async fn read_session_component(
        &self,
        session: &SessionContext,
    ) -> Result<EntitySnapshot, ReadError> {
        let component = session.component().await.ok_or(ReadError::ComponentUnset)?;
        self.read_state(&EntityAddress::from(component)).await
    }

    pub async fn read_gumball_machine(
        &self,
        session: &SessionContext,
    ) -> Result<GumballMachineView, ReadError> {
        let snapshot = self.read_session_component(session).await?;
        let gumball_resource = session.gumball_resource().await;
        Ok(snapshot.gumball_machine(gumball_resource.as_ref(), &session.xrd_address()))
    }
}

#[cfg(test)]
#[path = "tests/entity_state_tests.rs"]
mod tests;
