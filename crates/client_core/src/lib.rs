use std::{sync::Arc, time::Duration};

use shared::{
    amount::Amount,
    domain::{
        AccountAddress, AddressContext, ComponentAddress, DiscoveredAddresses, EntityAddress,
        IntentHash, OperationKind, OperationRequest, ResourceAddress,
    },
    error::TransactionFailure,
    protocol::TransactionStatus,
};
use tokio::sync::{broadcast, watch, Mutex, Notify};
use tracing::{info, warn};
use uuid::Uuid;
use wallet_integration::{MissingWalletConnector, TransactionRequest, WalletConnector};

pub mod balance;
pub mod cancel;
pub mod config;
pub mod entity_state;
pub mod error;
pub mod gateway;
pub mod receipt;
pub mod session;

use cancel::{cancellation_pair, CancelSignal, CancellationHandle};
use entity_state::{EntitySnapshot, EntityStateReader};
use error::TransactionError;
use gateway::{LedgerQueryService, MissingLedgerQueryService};
use receipt::TransactionReceipt;
use session::SessionContext;

pub use manifest::TRANSACTION_VERSION;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Bounds on waiting for ledger finality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    pub request_timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 120,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommittedOperation {
    pub operation_id: Uuid,
    pub request: OperationRequest,
    pub account: AccountAddress,
    pub receipt: TransactionReceipt,
    pub discovered: Option<DiscoveredAddresses>,
    pub target_component: Option<ComponentAddress>,
}

impl CommittedOperation {
    pub fn delta(&self, resource: &ResourceAddress) -> Amount {
        balance::resolve_delta(&self.receipt, &self.account, resource)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleState {
    Idle,
    AwaitingSignature(OperationKind),
    AwaitingCommitment {
        kind: OperationKind,
        intent_hash: IntentHash,
    },
    Committed(Box<CommittedOperation>),
    Failed(TransactionFailure),
}

impl LifecycleState {
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            LifecycleState::AwaitingSignature(_) | LifecycleState::AwaitingCommitment { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Committed(_) | LifecycleState::Failed(_))
    }

    fn label(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::AwaitingSignature(_) => "awaiting_signature",
            LifecycleState::AwaitingCommitment { .. } => "awaiting_commitment",
            LifecycleState::Committed(_) => "committed",
            LifecycleState::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    LifecycleChanged(LifecycleState),
    EntityRefreshed(EntitySnapshot),
    EntityRefreshFailed {
        address: EntityAddress,
        error: String,
    },
}

struct InFlight {
    operation_id: Uuid,
    kind: OperationKind,
    cancel: CancellationHandle,
}

/// Drives one operation at a time from manifest to committed receipt. One
/// orchestrator serves one UI surface.
pub struct TransactionOrchestrator {
    wallet: Arc<dyn WalletConnector>,
    ledger: Arc<dyn LedgerQueryService>,
    session: Arc<SessionContext>,
    reader: EntityStateReader,
    policy: PollPolicy,
    in_flight: Mutex<Option<InFlight>>,
    released: Notify,
    state: watch::Sender<LifecycleState>,
    events: broadcast::Sender<ClientEvent>,
}

impl TransactionOrchestrator {
    pub fn new(session: Arc<SessionContext>) -> Arc<Self> {
        Self::new_with_dependencies(
            Arc::new(MissingWalletConnector::new()),
            Arc::new(MissingLedgerQueryService),
            session,
            PollPolicy::default(),
        )
    }

    pub fn new_with_dependencies(
        wallet: Arc<dyn WalletConnector>,
        ledger: Arc<dyn LedgerQueryService>,
        session: Arc<SessionContext>,
        policy: PollPolicy,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(LifecycleState::Idle);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            reader: EntityStateReader::new(Arc::clone(&ledger)),
            wallet,
            ledger,
            session,
            policy,
            in_flight: Mutex::new(None),
            released: Notify::new(),
            state,
            events,
        })
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn reader(&self) -> &EntityStateReader {
        &self.reader
    }

    pub fn state(&self) -> LifecycleState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn is_busy(&self) -> bool {
        self.in_flight.lock().await.is_some()
    }

    /// Requests cancellation of the in-flight operation. Cancellation is
    /// observed while waiting for commitment; a pending wallet prompt is
    /// only ended by the user. Returns false when nothing was in flight.
    pub async fn cancel(&self) -> bool {
        let guard = self.in_flight.lock().await;
        match guard.as_ref() {
            Some(active) => {
                info!(
                    operation_id = %active.operation_id,
                    kind = %active.kind,
                    "tx: cancellation requested"
                );
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Returns the surface to `Idle` unless an operation is in flight.
    pub async fn reset(&self) -> bool {
        let guard = self.in_flight.lock().await;
        if guard.is_some() {
            return false;
        }
        self.publish(LifecycleState::Idle);
        true
    }

    /// Cancels a stale in-flight operation, waits for it to release the
    /// surface, then runs `op`.
    pub async fn supersede(&self, op: OperationRequest) -> LifecycleState {
        loop {
            let released = self.released.notified();
            if !self.cancel().await {
                break;
            }
            released.await;
        }
        self.execute(op).await
    }

    /// Runs `op` to a terminal state. A call made while another operation is
    /// in flight is refused with a `Busy` failure that is returned to the
    /// caller only; the in-flight operation keeps the published state.
    pub async fn execute(&self, op: OperationRequest) -> LifecycleState {
        let operation_id = Uuid::new_v4();
        let kind = op.kind();

        let mut cancel = {
            let mut guard = self.in_flight.lock().await;
            if let Some(active) = guard.as_ref() {
                warn!(
                    operation_id = %operation_id,
                    kind = %kind,
                    active_operation_id = %active.operation_id,
                    "tx: refused while another operation is in flight"
                );
                return LifecycleState::Failed(
                    TransactionError::Busy(active.kind.to_string()).to_failure(),
                );
            }
            let (handle, signal) = cancellation_pair();
            *guard = Some(InFlight {
                operation_id,
                kind,
                cancel: handle,
            });
            signal
        };

        let terminal = match self.run(operation_id, op, &mut cancel).await {
            Ok(committed) => LifecycleState::Committed(Box::new(committed)),
            Err(err) => {
                warn!(
                    operation_id = %operation_id,
                    kind = %kind,
                    failure = ?err.kind(),
                    "tx: operation failed: {err}"
                );
                LifecycleState::Failed(err.to_failure())
            }
        };

        // The terminal state is published before the slot is released, so a
        // queued execute can only publish after it.
        let mut guard = self.in_flight.lock().await;
        guard.take();
        self.publish(terminal.clone());
        drop(guard);
        self.released.notify_waiters();

        if let LifecycleState::Committed(committed) = &terminal {
            if let Some(target) = committed.target_component.clone() {
                self.spawn_refresh(target);
            }
        }

        terminal
    }

    async fn run(
        &self,
        operation_id: Uuid,
        op: OperationRequest,
        cancel: &mut CancelSignal,
    ) -> Result<CommittedOperation, TransactionError> {
        let kind = op.kind();
        let context = self.session.address_context().await;
        let account = context
            .account
            .clone()
            .ok_or(TransactionError::Wallet(wallet_integration::WalletError::NotConnected))?;
        let manifest = manifest::build(&op, &context)?;

        info!(
            operation_id = %operation_id,
            kind = %kind,
            account = %account,
            "tx: manifest built; awaiting wallet signature"
        );
        self.publish(LifecycleState::AwaitingSignature(kind));

        let signed = self
            .wallet
            .send_transaction(TransactionRequest {
                transaction_manifest: manifest.into_string(),
                version: TRANSACTION_VERSION,
                message: None,
            })
            .await?;
        let intent_hash = signed.transaction_intent_hash;

        info!(
            operation_id = %operation_id,
            kind = %kind,
            intent_hash = %intent_hash,
            "tx: signed; awaiting commitment"
        );
        self.publish(LifecycleState::AwaitingCommitment {
            kind,
            intent_hash: intent_hash.clone(),
        });

        let receipt =
            await_commitment(self.ledger.as_ref(), &intent_hash, &self.policy, cancel).await?;

        let discovered = match &op {
            OperationRequest::Instantiate { .. } => {
                let discovered = receipt.discovered_addresses();
                match &discovered {
                    Some(addresses) => {
                        self.session.record_instantiation(addresses.clone()).await;
                    }
                    None => warn!(
                        operation_id = %operation_id,
                        intent_hash = %intent_hash,
                        affected = receipt.affected_global_entities.len(),
                        "tx: instantiation receipt lists too few affected entities"
                    ),
                }
                discovered
            }
            _ => None,
        };

        let target_component = match &discovered {
            Some(addresses) => Some(addresses.component.clone()),
            None => op.target_component(&context),
        };

        info!(
            operation_id = %operation_id,
            kind = %kind,
            intent_hash = %intent_hash,
            fee_paid = %receipt.fee_paid,
            "tx: committed"
        );

        Ok(CommittedOperation {
            operation_id,
            request: op,
            account,
            receipt,
            discovered,
            target_component,
        })
    }

    fn publish(&self, state: LifecycleState) {
        info!(state = state.label(), "tx: lifecycle transition");
        self.state.send_replace(state.clone());
        let _ = self.events.send(ClientEvent::LifecycleChanged(state));
    }

    fn spawn_refresh(&self, target: ComponentAddress) {
        let reader = self.reader.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let address = EntityAddress::from(target);
            match reader.read_state(&address).await {
                Ok(snapshot) => {
                    let _ = events.send(ClientEvent::EntityRefreshed(snapshot));
                }
                Err(err) => {
                    warn!(address = %address, "tx: entity refresh failed: {err}");
                    let _ = events.send(ClientEvent::EntityRefreshFailed {
                        address,
                        error: err.to_string(),
                    });
                }
            }
        });
    }
}

/// Polls the ledger until `intent_hash` is final, then fetches its committed
/// receipt. Usable on its own to follow a transaction submitted elsewhere.
pub async fn await_commitment(
    ledger: &dyn LedgerQueryService,
    intent_hash: &IntentHash,
    policy: &PollPolicy,
    cancel: &mut CancelSignal,
) -> Result<TransactionReceipt, TransactionError> {
    let cancelled = || TransactionError::Cancelled {
        intent_hash: intent_hash.clone(),
    };

    for attempt in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            return Err(cancelled());
        }

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(cancelled()),
            response = tokio::time::timeout(
                policy.request_timeout,
                ledger.transaction_status(intent_hash),
            ) => response,
        };
        let response = match response {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Err(TransactionError::Gateway(format!("{err:#}"))),
            Err(_) => {
                return Err(TransactionError::Gateway(format!(
                    "status request for {intent_hash} timed out after {:?}",
                    policy.request_timeout
                )))
            }
        };

        info!(
            intent_hash = %intent_hash,
            attempt,
            max_attempts = policy.max_attempts,
            status = ?response.status,
            "tx: status poll"
        );

        if response.status.is_final() {
            if response.status == TransactionStatus::CommittedSuccess {
                return fetch_receipt(ledger, intent_hash, policy).await;
            }
            return Err(TransactionError::LedgerRejected {
                intent_hash: intent_hash.clone(),
                message: response
                    .error_message
                    .unwrap_or_else(|| format!("{:?}", response.status)),
            });
        }

        if attempt < policy.max_attempts {
            tokio::select! {
                _ = cancel.cancelled() => return Err(cancelled()),
                _ = tokio::time::sleep(policy.interval) => {}
            }
        }
    }

    Err(TransactionError::Timeout {
        intent_hash: intent_hash.clone(),
        attempts: policy.max_attempts,
    })
}

async fn fetch_receipt(
    ledger: &dyn LedgerQueryService,
    intent_hash: &IntentHash,
    policy: &PollPolicy,
) -> Result<TransactionReceipt, TransactionError> {
    let details = tokio::time::timeout(policy.request_timeout, ledger.committed_details(intent_hash))
        .await
        .map_err(|_| {
            TransactionError::Gateway(format!(
                "committed details request for {intent_hash} timed out"
            ))
        })?
        .map_err(|err| TransactionError::Gateway(format!("{err:#}")))?;

    let receipt = TransactionReceipt::from_committed_details(intent_hash.clone(), details);
    if !receipt.is_success() {
        return Err(TransactionError::LedgerRejected {
            intent_hash: intent_hash.clone(),
            message: receipt
                .error_message
                .clone()
                .unwrap_or_else(|| format!("{:?}", receipt.status)),
        });
    }
    Ok(receipt)
}

/// Address context as the orchestrator would see it right now; used by
/// front ends to preview a manifest without executing it.
pub async fn preview_manifest(
    session: &SessionContext,
    op: &OperationRequest,
) -> Result<manifest::Manifest, TransactionError> {
    let context: AddressContext = session.address_context().await;
    Ok(manifest::build(op, &context)?)
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
