//! Engine context: one registry, one ledger, one store, built from config.

use bondsman_core::{Amount, BondClosed, BondId, BondNotification, BondView, EngineConfig, Identity};
use bondsman_ledger::{FeeLedger, ITransfer, LedgerSnapshot};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::error::RegistryError;
use crate::registry::BondRegistry;
use crate::store::{BondStore, MemoryStore, StoreJournal};

/// Buffered notifications per subscriber before the oldest are dropped.
pub const NOTIFICATION_CAPACITY: usize = 1024;

/// Top-level handle holding the arbiter, the id counter, and the fee
/// accumulator for one deployment.
pub struct BondEngine {
    registry: BondRegistry,
    ledger: Arc<FeeLedger>,
    notifier: broadcast::Sender<BondNotification>,
}

impl BondEngine {
    /// Engine backed by an in-process store.
    pub fn new(config: EngineConfig, rail: Arc<dyn ITransfer>) -> Result<Self, RegistryError> {
        Self::open(config, rail, Arc::new(MemoryStore::new()))
    }

    /// Engine restored from whatever `store` holds.
    pub fn open(
        config: EngineConfig,
        rail: Arc<dyn ITransfer>,
        store: Arc<dyn BondStore>,
    ) -> Result<Self, RegistryError> {
        config.validate()?;

        let snapshot = store.ledger()?.unwrap_or_default();
        let ledger = Arc::new(
            FeeLedger::restore(config.arbiter.clone(), rail, snapshot)
                .with_journal(Arc::new(StoreJournal(store.clone()))),
        );
        let (notifier, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        let registry = BondRegistry::restore(config, ledger.clone(), store, notifier.clone())?;

        tracing::info!(
            arbiter = %registry.config().arbiter,
            fee_percent = registry.config().fee_percent,
            min_amount = %registry.config().min_amount,
            "bond engine started"
        );
        Ok(Self {
            registry,
            ledger,
            notifier,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        self.registry.config()
    }

    pub fn registry(&self) -> &BondRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &FeeLedger {
        &self.ledger
    }

    /// Receive every notification emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<BondNotification> {
        self.notifier.subscribe()
    }

    pub async fn create_bond(
        &self,
        actor: &Identity,
        name: &str,
        amount: Amount,
        second_party: &Identity,
    ) -> Result<BondId, RegistryError> {
        self.registry.create_bond(actor, name, amount, second_party).await
    }

    pub async fn sign_bond(&self, id: BondId, actor: &Identity) -> Result<BondView, RegistryError> {
        self.registry.sign_bond(id, actor).await
    }

    pub async fn validate_bond(
        &self,
        id: BondId,
        actor: &Identity,
    ) -> Result<BondView, RegistryError> {
        self.registry.validate_bond(id, actor).await
    }

    pub async fn confirm(
        &self,
        id: BondId,
        actor: &Identity,
        tendered: Amount,
    ) -> Result<BondView, RegistryError> {
        self.registry.confirm(id, actor, tendered).await
    }

    pub async fn close_bond(
        &self,
        id: BondId,
        actor: &Identity,
    ) -> Result<BondClosed, RegistryError> {
        self.registry.close_bond(id, actor).await
    }

    pub async fn view_bond(&self, id: BondId) -> Result<BondView, RegistryError> {
        self.registry.view_bond(id).await
    }

    pub async fn list_bonds(&self) -> Vec<BondView> {
        self.registry.list_bonds().await
    }

    pub fn bond_count(&self) -> usize {
        self.registry.bond_count()
    }

    /// Send every accrued fee to the arbiter. Returns the amount sent.
    pub async fn withdraw_fees(&self, actor: &Identity) -> Result<Amount, RegistryError> {
        let withdrawal = self.ledger.withdraw_fees(actor).await?;
        if withdrawal.receipt.is_some() {
            let _ = self.notifier.send(BondNotification::FeesWithdrawn {
                amount: withdrawal.amount,
            });
        }
        Ok(withdrawal.amount)
    }

    pub async fn accrued_fees(&self, actor: &Identity) -> Result<Amount, RegistryError> {
        Ok(self.ledger.accrued_fees(actor).await?)
    }

    pub async fn custodial_balance(&self, actor: &Identity) -> Result<Amount, RegistryError> {
        Ok(self.ledger.custodial_balance(actor).await?)
    }

    /// Escrowed and accrued figures in one read. Arbiter only.
    pub async fn ledger_summary(&self, actor: &Identity) -> Result<LedgerSnapshot, RegistryError> {
        Ok(self.ledger.summary(actor).await?)
    }
}
