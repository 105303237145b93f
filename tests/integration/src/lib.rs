//! Shared fixtures for the cross-crate integration tests.

use bondsman_core::{Amount, BondId, EngineConfig, Identity};
use bondsman_ledger::InternalRail;
use bondsman_registry::{BondEngine, MemoryStore, RegistryError};
use std::sync::Arc;

pub fn arbiter() -> Identity {
    Identity::from("arbiter")
}

pub fn alice() -> Identity {
    Identity::from("alice")
}

pub fn bob() -> Identity {
    Identity::from("bob")
}

/// An engine wired to an in-memory rail and store, both kept reachable so
/// tests can inspect balances and stored records.
pub struct Harness {
    pub engine: Arc<BondEngine>,
    pub rail: Arc<InternalRail>,
    pub store: Arc<MemoryStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::new(arbiter()))
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let rail = Arc::new(InternalRail::new());
        let store = Arc::new(MemoryStore::new());
        let engine = BondEngine::open(config, rail.clone(), store.clone())
            .unwrap_or_else(|e| panic!("engine failed to open: {e}"));
        Self {
            engine: Arc::new(engine),
            rail,
            store,
        }
    }

    /// Reopen an engine over the same rail and store.
    pub fn reopen(&self, config: EngineConfig) -> Result<BondEngine, RegistryError> {
        BondEngine::open(config, self.rail.clone(), self.store.clone())
    }

    /// Create a bond from alice to bob and take it through signing and
    /// validation.
    pub async fn validated_bond(&self, amount: Amount) -> Result<BondId, RegistryError> {
        let id = self
            .engine
            .create_bond(&alice(), "integration bond", amount, &bob())
            .await?;
        self.engine.sign_bond(id, &bob()).await?;
        self.engine.validate_bond(id, &arbiter()).await?;
        Ok(id)
    }

    /// A validated bond with both confirmations recorded.
    pub async fn confirmed_bond(&self, amount: Amount) -> Result<BondId, RegistryError> {
        let id = self.validated_bond(amount).await?;
        self.engine.confirm(id, &alice(), 0).await?;
        self.engine.confirm(id, &bob(), amount).await?;
        Ok(id)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
