//! Persistence seam for bond records, the id counter, and ledger figures.

use bondsman_core::{Bond, BondId};
use bondsman_ledger::{LedgerError, LedgerSnapshot, SnapshotSink};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("backend failure: {0}")]
    Backend(String),

    #[error("codec failure: {0}")]
    Codec(String),
}

/// Durable keyed store behind the registry.
///
/// Writes are issued while the affected bond's lock is held, so a store
/// never sees two writers for the same record at once.
pub trait BondStore: Send + Sync {
    fn put_bond(&self, bond: &Bond) -> Result<(), StoreError>;

    /// Every stored bond, in id order.
    fn load_bonds(&self) -> Result<Vec<Bond>, StoreError>;

    /// Record the next id to hand out.
    fn put_next_id(&self, next: BondId) -> Result<(), StoreError>;

    fn next_id(&self) -> Result<Option<BondId>, StoreError>;

    fn put_ledger(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError>;

    /// Write a bond record and the ledger figures as one unit: both land or
    /// neither does.
    fn put_bond_with_ledger(
        &self,
        bond: &Bond,
        snapshot: &LedgerSnapshot,
    ) -> Result<(), StoreError>;

    fn ledger(&self) -> Result<Option<LedgerSnapshot>, StoreError>;
}

/// Writes ledger snapshots through to a [`BondStore`].
pub struct StoreJournal(pub Arc<dyn BondStore>);

impl SnapshotSink for StoreJournal {
    fn record(&self, snapshot: &LedgerSnapshot) -> Result<(), LedgerError> {
        self.0
            .put_ledger(snapshot)
            .map_err(|e| LedgerError::Journal(e.to_string()))
    }
}

/// In-process store. Nothing survives the process.
///
/// `set_failing(true)` makes every write fail and `set_failing_ledger(true)`
/// only the writes carrying ledger figures, for exercising rollback.
pub struct MemoryStore {
    bonds: DashMap<BondId, Bond>,
    /// 0 means unset.
    next_id: AtomicU64,
    ledger: Mutex<Option<LedgerSnapshot>>,
    failing: AtomicBool,
    ledger_failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            bonds: DashMap::new(),
            next_id: AtomicU64::new(0),
            ledger: Mutex::new(None),
            failing: AtomicBool::new(false),
            ledger_failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_failing_ledger(&self, failing: bool) {
        self.ledger_failing.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bonds.is_empty()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("memory store is failing writes".into()));
        }
        Ok(())
    }

    fn check_ledger_writable(&self) -> Result<(), StoreError> {
        self.check_writable()?;
        if self.ledger_failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("memory store is failing ledger writes".into()));
        }
        Ok(())
    }

    fn set_ledger(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        let mut slot = self
            .ledger
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        *slot = Some(*snapshot);
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BondStore for MemoryStore {
    fn put_bond(&self, bond: &Bond) -> Result<(), StoreError> {
        self.check_writable()?;
        self.bonds.insert(bond.id, bond.clone());
        Ok(())
    }

    fn load_bonds(&self) -> Result<Vec<Bond>, StoreError> {
        let mut bonds: Vec<Bond> = self.bonds.iter().map(|b| b.value().clone()).collect();
        bonds.sort_by_key(|b| b.id);
        Ok(bonds)
    }

    fn put_next_id(&self, next: BondId) -> Result<(), StoreError> {
        self.check_writable()?;
        self.next_id.store(next.value(), Ordering::SeqCst);
        Ok(())
    }

    fn next_id(&self) -> Result<Option<BondId>, StoreError> {
        match self.next_id.load(Ordering::SeqCst) {
            0 => Ok(None),
            n => Ok(Some(BondId(n))),
        }
    }

    fn put_ledger(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        self.check_ledger_writable()?;
        self.set_ledger(snapshot)
    }

    fn put_bond_with_ledger(
        &self,
        bond: &Bond,
        snapshot: &LedgerSnapshot,
    ) -> Result<(), StoreError> {
        self.check_ledger_writable()?;
        self.set_ledger(snapshot)?;
        self.bonds.insert(bond.id, bond.clone());
        Ok(())
    }

    fn ledger(&self) -> Result<Option<LedgerSnapshot>, StoreError> {
        let slot = self
            .ledger
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(*slot)
    }
}
