//! Transaction manifest templates for the gumball machine and yield AMM
//! operations.
//!
//! Every builder is a pure function of its inputs: identical inputs render a
//! byte-identical manifest. Amounts are rendered through [`Amount`]'s decimal
//! formatting so no precision is lost between the caller and the ledger.

use std::fmt::{self, Write as _};

use shared::{
    amount::Amount,
    domain::{
        AccountAddress, AddressContext, ComponentAddress, OperationRequest, PackageAddress,
        ResourceAddress, YieldAmmAddresses,
    },
};
use thiserror::Error;

pub const GUMBALL_BLUEPRINT: &str = "GumballMachine";
pub const INSTANTIATE_FUNCTION: &str = "instantiate_gumball_machine";
pub const TRANSACTION_VERSION: u32 = 1;

const PAYMENT_BUCKET: &str = "payment";
const PT_BUCKET: &str = "pt_bucket";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("invalid operand '{field}': {reason}")]
    InvalidOperand { field: &'static str, reason: String },
}

impl ManifestError {
    fn missing(field: &'static str) -> Self {
        ManifestError::InvalidOperand {
            field,
            reason: "address is not set".to_string(),
        }
    }

    fn not_positive(field: &'static str, amount: Amount) -> Self {
        ManifestError::InvalidOperand {
            field,
            reason: format!("must be greater than zero, got {amount}"),
        }
    }
}

/// Rendered manifest text, ready to hand to a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Manifest(String);

impl Manifest {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy)]
enum Arg<'a> {
    Address(&'a str),
    Decimal(Amount),
    Str(&'a str),
    Bucket(&'a str),
    Expression(&'a str),
}

impl fmt::Display for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Address(value) => write!(f, "Address(\"{value}\")"),
            Arg::Decimal(value) => write!(f, "Decimal(\"{value}\")"),
            Arg::Str(value) => write!(f, "\"{value}\""),
            Arg::Bucket(value) => write!(f, "Bucket(\"{value}\")"),
            Arg::Expression(value) => write!(f, "Expression(\"{value}\")"),
        }
    }
}

#[derive(Default)]
struct ManifestWriter {
    text: String,
}

impl ManifestWriter {
    fn instruction(mut self, name: &str, args: &[Arg<'_>]) -> Self {
        self.text.push_str(name);
        self.text.push('\n');
        for arg in args {
            // Writing into a String cannot fail.
            let _ = writeln!(self.text, "    {arg}");
        }
        self.text.push_str(";\n");
        self
    }

    fn call_method(self, address: &str, method: &str, args: &[Arg<'_>]) -> Self {
        let mut all = vec![Arg::Address(address), Arg::Str(method)];
        all.extend_from_slice(args);
        self.instruction("CALL_METHOD", &all)
    }

    fn withdraw(self, account: &AccountAddress, resource: &ResourceAddress, amount: Amount) -> Self {
        self.call_method(
            account.as_str(),
            "withdraw",
            &[Arg::Address(resource.as_str()), Arg::Decimal(amount)],
        )
    }

    fn take_all(self, resource: &ResourceAddress, bucket: &str) -> Self {
        self.instruction(
            "TAKE_ALL_FROM_WORKTOP",
            &[Arg::Address(resource.as_str()), Arg::Bucket(bucket)],
        )
    }

    fn owner_proof(self, account: &AccountAddress, owner_badge: &ResourceAddress) -> Self {
        self.call_method(
            account.as_str(),
            "create_proof_of_amount",
            &[
                Arg::Address(owner_badge.as_str()),
                Arg::Decimal(Amount::from_whole(1)),
            ],
        )
    }

    fn deposit_worktop(self, account: &AccountAddress) -> Self {
        self.call_method(
            account.as_str(),
            "deposit_batch",
            &[Arg::Expression("ENTIRE_WORKTOP")],
        )
    }

    fn finish(self) -> Manifest {
        Manifest(self.text)
    }
}

fn require_positive(field: &'static str, amount: Amount) -> Result<Amount, ManifestError> {
    if amount.is_positive() {
        Ok(amount)
    } else {
        Err(ManifestError::not_positive(field, amount))
    }
}

fn require<'a, T>(field: &'static str, value: &'a Option<T>) -> Result<&'a T, ManifestError> {
    value.as_ref().ok_or_else(|| ManifestError::missing(field))
}

pub fn instantiate_manifest(
    package: &PackageAddress,
    price: Amount,
    account: &AccountAddress,
) -> Result<Manifest, ManifestError> {
    let price = require_positive("price", price)?;
    Ok(ManifestWriter::default()
        .instruction(
            "CALL_FUNCTION",
            &[
                Arg::Address(package.as_str()),
                Arg::Str(GUMBALL_BLUEPRINT),
                Arg::Str(INSTANTIATE_FUNCTION),
                Arg::Decimal(price),
            ],
        )
        .deposit_worktop(account)
        .finish())
}

pub fn buy_gumball_manifest(
    amount: Amount,
    payment_resource: &ResourceAddress,
    account: &AccountAddress,
    component: &ComponentAddress,
) -> Result<Manifest, ManifestError> {
    let amount = require_positive("amount", amount)?;
    Ok(ManifestWriter::default()
        .withdraw(account, payment_resource, amount)
        .take_all(payment_resource, PAYMENT_BUCKET)
        .call_method(
            component.as_str(),
            "buy_gumball",
            &[Arg::Bucket(PAYMENT_BUCKET)],
        )
        .deposit_worktop(account)
        .finish())
}

pub fn set_price_manifest(
    price: Amount,
    account: &AccountAddress,
    component: &ComponentAddress,
    owner_badge: &ResourceAddress,
) -> Result<Manifest, ManifestError> {
    let price = require_positive("price", price)?;
    Ok(ManifestWriter::default()
        .owner_proof(account, owner_badge)
        .call_method(component.as_str(), "set_price", &[Arg::Decimal(price)])
        .finish())
}

pub fn withdraw_earnings_manifest(
    account: &AccountAddress,
    component: &ComponentAddress,
    owner_badge: &ResourceAddress,
) -> Manifest {
    ManifestWriter::default()
        .owner_proof(account, owner_badge)
        .call_method(component.as_str(), "withdraw_earnings", &[])
        .deposit_worktop(account)
        .finish()
}

pub fn refill_manifest(
    account: &AccountAddress,
    component: &ComponentAddress,
    owner_badge: &ResourceAddress,
) -> Manifest {
    ManifestWriter::default()
        .owner_proof(account, owner_badge)
        .call_method(component.as_str(), "refill_gumball_machine", &[])
        .finish()
}

/// Redeem principal tokens for the underlying LSU. Only the PT amount enters
/// the manifest.
pub fn redeem_manifest(
    pt_amount: Amount,
    account: &AccountAddress,
    amm: &YieldAmmAddresses,
) -> Result<Manifest, ManifestError> {
    let pt_amount = require_positive("pt_amount", pt_amount)?;
    Ok(ManifestWriter::default()
        .withdraw(account, &amm.pt_resource, pt_amount)
        .take_all(&amm.pt_resource, PT_BUCKET)
        .call_method(amm.component.as_str(), "redeem", &[Arg::Bucket(PT_BUCKET)])
        .deposit_worktop(account)
        .finish())
}

pub fn build(op: &OperationRequest, context: &AddressContext) -> Result<Manifest, ManifestError> {
    let account = require("account", &context.account)?;
    match op {
        OperationRequest::Instantiate { package, price } => {
            instantiate_manifest(package, *price, account)
        }
        OperationRequest::Deposit { amount, resource } => {
            let component = require("component", &context.component)?;
            buy_gumball_manifest(*amount, resource, account, component)
        }
        OperationRequest::SetPrice { price } => {
            let component = require("component", &context.component)?;
            let owner_badge = require("owner_badge", &context.owner_badge)?;
            set_price_manifest(*price, account, component, owner_badge)
        }
        OperationRequest::Withdraw => {
            let component = require("component", &context.component)?;
            let owner_badge = require("owner_badge", &context.owner_badge)?;
            Ok(withdraw_earnings_manifest(account, component, owner_badge))
        }
        OperationRequest::Refill => {
            let component = require("component", &context.component)?;
            let owner_badge = require("owner_badge", &context.owner_badge)?;
            Ok(refill_manifest(account, component, owner_badge))
        }
        OperationRequest::Redeem { pt_amount, .. } => {
            let amm = require("yield_amm", &context.yield_amm)?;
            redeem_manifest(*pt_amount, account, amm)
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
