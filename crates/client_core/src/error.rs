use manifest::ManifestError;
use shared::{
    domain::{EntityAddress, IntentHash},
    error::{FailureKind, TransactionFailure},
};
use thiserror::Error;
use wallet_integration::WalletError;

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error(transparent)]
    InvalidOperand(#[from] ManifestError),
    #[error("{0}")]
    Wallet(#[from] WalletError),
    #[error("transaction {intent_hash} failed on ledger: {message}")]
    LedgerRejected {
        intent_hash: IntentHash,
        message: String,
    },
    #[error("transaction {intent_hash} not finalized after {attempts} status polls")]
    Timeout {
        intent_hash: IntentHash,
        attempts: u32,
    },
    #[error("tracking of transaction {intent_hash} was cancelled")]
    Cancelled { intent_hash: IntentHash },
    #[error("gateway request failed: {0}")]
    Gateway(String),
    #[error("operation {0} is already in flight on this surface")]
    Busy(String),
}

impl TransactionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TransactionError::InvalidOperand(_) => FailureKind::InvalidOperand,
            TransactionError::Wallet(_) => FailureKind::Wallet,
            TransactionError::LedgerRejected { .. } => FailureKind::LedgerRejected,
            TransactionError::Timeout { .. } => FailureKind::Timeout,
            TransactionError::Cancelled { .. } => FailureKind::Cancelled,
            TransactionError::Gateway(_) => FailureKind::Gateway,
            TransactionError::Busy(_) => FailureKind::Busy,
        }
    }

    /// Ledger and wallet messages are passed through verbatim.
    pub fn to_failure(&self) -> TransactionFailure {
        let message = match self {
            TransactionError::Wallet(WalletError::Rejected { reason }) => reason.clone(),
            TransactionError::LedgerRejected { message, .. } => message.clone(),
            other => other.to_string(),
        };
        TransactionFailure::new(self.kind(), message)
    }
}

impl From<TransactionError> for TransactionFailure {
    fn from(value: TransactionError) -> Self {
        value.to_failure()
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("entity {0} not found on ledger")]
    EntityNotFound(EntityAddress),
    #[error("no component address set for this session")]
    ComponentUnset,
    #[error("gateway request failed: {0}")]
    Gateway(String),
}

impl ReadError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ReadError::EntityNotFound(_) | ReadError::ComponentUnset => {
                FailureKind::EntityNotFound
            }
            ReadError::Gateway(_) => FailureKind::Gateway,
        }
    }
}
