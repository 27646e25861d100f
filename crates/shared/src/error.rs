use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidOperand,
    Wallet,
    LedgerRejected,
    Timeout,
    Cancelled,
    Gateway,
    Busy,
    EntityNotFound,
}

impl FailureKind {
    pub fn headline(self) -> &'static str {
        match self {
            FailureKind::InvalidOperand => "Invalid input",
            FailureKind::Wallet => "Rejected by wallet",
            FailureKind::LedgerRejected => "Rejected by ledger",
            FailureKind::Timeout => "Timed out waiting for the ledger",
            FailureKind::Cancelled => "Cancelled",
            FailureKind::Gateway => "Ledger query failed",
            FailureKind::Busy => "Another transaction is in progress",
            FailureKind::EntityNotFound => "Entity not found",
        }
    }
}

/// Terminal failure carried by a failed lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TransactionFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> String {
        if self.message.is_empty() {
            self.kind.headline().to_string()
        } else {
            format!("{}: {}", self.kind.headline(), self.message)
        }
    }
}

impl std::fmt::Display for TransactionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.user_message())
    }
}

/// Error body returned by the Gateway on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

#[derive(Debug, Error)]
#[error("gateway returned {status}: {message}")]
pub struct GatewayException {
    pub status: u16,
    pub message: String,
}

impl GatewayException {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}
