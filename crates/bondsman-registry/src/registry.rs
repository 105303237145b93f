//! Bond registry: owns every bond record and drives the lifecycle.

use bondsman_core::{
    Amount, Bond, BondClosed, BondCreated, BondError, BondEvent, BondId, BondNotification,
    BondStateMachine, BondView, EngineConfig, FeeSplit, Identity, Party,
};
use bondsman_ledger::FeeLedger;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use crate::error::RegistryError;
use crate::store::BondStore;

/// Bond records keyed by id, each behind its own async mutex.
///
/// A transition holds the bond's lock from the first precondition check to
/// the last write, including the payout transfer in [`BondRegistry::close_bond`].
/// Candidate records are persisted before they replace the in-memory copy, so
/// a failed write leaves the bond as it was.
pub struct BondRegistry {
    config: EngineConfig,
    bonds: DashMap<BondId, Arc<Mutex<Bond>>>,
    /// Next id to allocate, `None` once ids are used up. Also serializes
    /// creation.
    next_id: Mutex<Option<BondId>>,
    ledger: Arc<FeeLedger>,
    store: Arc<dyn BondStore>,
    notifier: broadcast::Sender<BondNotification>,
}

impl BondRegistry {
    /// Empty registry handing out ids from [`BondId::FIRST`].
    pub fn new(
        config: EngineConfig,
        ledger: Arc<FeeLedger>,
        store: Arc<dyn BondStore>,
        notifier: broadcast::Sender<BondNotification>,
    ) -> Self {
        Self {
            config,
            bonds: DashMap::new(),
            next_id: Mutex::new(Some(BondId::FIRST)),
            ledger,
            store,
            notifier,
        }
    }

    /// Registry holding every bond found in `store`.
    pub fn restore(
        config: EngineConfig,
        ledger: Arc<FeeLedger>,
        store: Arc<dyn BondStore>,
        notifier: broadcast::Sender<BondNotification>,
    ) -> Result<Self, RegistryError> {
        let bonds = store.load_bonds()?;
        let stored = store.next_id()?.unwrap_or(BondId::FIRST);
        let next_id = match bonds.last() {
            Some(last) => last.id.next().map(|after| after.max(stored)),
            None => Some(stored),
        };

        let mut registry = Self::new(config, ledger, store, notifier);
        for bond in bonds {
            registry.bonds.insert(bond.id, Arc::new(Mutex::new(bond)));
        }
        registry.next_id = Mutex::new(next_id);

        tracing::info!(
            bonds = registry.bonds.len(),
            next_id = ?next_id,
            "bond registry restored"
        );
        Ok(registry)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    fn entry(&self, id: BondId) -> Result<Arc<Mutex<Bond>>, RegistryError> {
        self.bonds
            .get(&id)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| BondError::NotFound(id).into())
    }

    /// Persist `candidate`, then make it the live record.
    fn commit(&self, live: &mut Bond, candidate: Bond) -> Result<(), RegistryError> {
        self.store.put_bond(&candidate)?;
        *live = candidate;
        Ok(())
    }

    /// Register a new bond in `Created`. No value moves.
    pub async fn create_bond(
        &self,
        actor: &Identity,
        name: &str,
        amount: Amount,
        second_party: &Identity,
    ) -> Result<BondId, RegistryError> {
        Bond::check_terms(&self.config, actor, name, amount, second_party)?;

        let mut next_id = self.next_id.lock().await;
        let id = (*next_id).ok_or(BondError::IdsExhausted)?;
        let following = id.next();
        let bond = Bond::new(
            id,
            name.to_string(),
            amount,
            actor.clone(),
            second_party.clone(),
        );

        // Past the last id the counter is not advanced; restore derives
        // exhaustion from the stored bond itself.
        if let Some(following) = following {
            self.store.put_next_id(following)?;
        }
        self.store.put_bond(&bond)?;
        *next_id = following;
        self.bonds.insert(id, Arc::new(Mutex::new(bond)));
        drop(next_id);

        tracing::info!(bond_id = %id, actor = %actor, amount = %amount, "bond created");
        let _ = self.notifier.send(BondNotification::Created(BondCreated {
            id,
            name: name.to_string(),
            creator: actor.clone(),
            second_party: second_party.clone(),
        }));
        Ok(id)
    }

    /// Second party accepts the bond.
    pub async fn sign_bond(&self, id: BondId, actor: &Identity) -> Result<BondView, RegistryError> {
        let entry = self.entry(id)?;
        let mut bond = entry.lock().await;

        if actor != &bond.second_party {
            return Err(BondError::unauthorized(actor, "sign this bond").into());
        }
        let next = BondStateMachine::transition(&bond.state, BondEvent::Sign)?;
        let candidate = bond.advanced(next);
        self.commit(&mut bond, candidate)?;

        tracing::info!(bond_id = %id, actor = %actor, "bond signed");
        Ok(bond.view())
    }

    /// Arbiter approves a signed bond.
    pub async fn validate_bond(
        &self,
        id: BondId,
        actor: &Identity,
    ) -> Result<BondView, RegistryError> {
        let entry = self.entry(id)?;
        let mut bond = entry.lock().await;

        if !self.config.is_arbiter(actor) {
            return Err(BondError::unauthorized(actor, "validate bonds").into());
        }
        let next = BondStateMachine::transition(&bond.state, BondEvent::Validate)?;
        let candidate = bond.advanced(next);
        self.commit(&mut bond, candidate)?;

        tracing::info!(bond_id = %id, actor = %actor, "bond validated");
        Ok(bond.view())
    }

    /// Record a party's confirmation.
    ///
    /// The second party must tender exactly the bond amount, which moves
    /// into escrow. The creator must tender nothing.
    pub async fn confirm(
        &self,
        id: BondId,
        actor: &Identity,
        tendered: Amount,
    ) -> Result<BondView, RegistryError> {
        let entry = self.entry(id)?;
        let mut bond = entry.lock().await;

        let party = bond
            .party_of(actor)
            .ok_or_else(|| BondError::unauthorized(actor, "confirm this bond"))?;
        let next = BondStateMachine::transition(
            &bond.state,
            BondEvent::Confirm {
                party,
                by: actor.clone(),
            },
        )?;
        match party {
            Party::First if tendered != 0 => {
                return Err(BondError::UnexpectedValue(tendered).into());
            }
            Party::Second if tendered != bond.amount => {
                return Err(BondError::WrongAmount {
                    expected: bond.amount,
                    tendered,
                }
                .into());
            }
            _ => {}
        }

        let candidate = bond.advanced(next);
        match party {
            Party::First => self.store.put_bond(&candidate)?,
            Party::Second => {
                // The escrow figures and the confirmed record are stored in
                // one write, before either changes in memory.
                let store = &self.store;
                let intake = self
                    .ledger
                    .deposit_escrow_with(id, actor, tendered, |snapshot| {
                        store
                            .put_bond_with_ledger(&candidate, snapshot)
                            .map_err(RegistryError::from)
                    })
                    .await;
                if let Err(e) = intake {
                    tracing::warn!(
                        bond_id = %id,
                        error = %e,
                        "escrow intake failed, confirmation not recorded"
                    );
                    return Err(e);
                }
            }
        }
        *bond = candidate;

        tracing::info!(
            bond_id = %id,
            actor = %actor,
            party = %party,
            tendered = %tendered,
            phase = %bond.state.phase(),
            "bond confirmed"
        );
        Ok(bond.view())
    }

    /// Arbiter closes a fully confirmed bond and pays the creator.
    ///
    /// The bond is marked `Completed` before the payout transfer and put
    /// back if the transfer fails, in which case no ledger figure moves.
    pub async fn close_bond(
        &self,
        id: BondId,
        actor: &Identity,
    ) -> Result<BondClosed, RegistryError> {
        let entry = self.entry(id)?;
        let mut bond = entry.lock().await;

        if !self.config.is_arbiter(actor) {
            return Err(BondError::unauthorized(actor, "close bonds").into());
        }
        let next = BondStateMachine::transition(&bond.state, BondEvent::Close)?;
        let split = FeeSplit::compute(bond.amount, self.config.fee_percent);

        let previous = bond.clone();
        let candidate = bond.advanced(next);
        self.commit(&mut bond, candidate)?;

        let settlement = match self.ledger.settle(id, &bond.creator, split).await {
            Ok(settlement) => settlement,
            Err(e) => {
                tracing::warn!(bond_id = %id, error = %e, "payout failed, close rolled back");
                if let Err(se) = self.store.put_bond(&previous) {
                    tracing::error!(bond_id = %id, error = %se, "failed to restore stored bond");
                }
                *bond = previous;
                return Err(e.into());
            }
        };

        let closed = BondClosed {
            id,
            payee: bond.creator.clone(),
            payout: settlement.split.payout,
            fee: settlement.split.fee,
        };
        tracing::info!(
            bond_id = %id,
            actor = %actor,
            payee = %closed.payee,
            payout = %closed.payout,
            fee = %closed.fee,
            "bond closed"
        );
        let _ = self.notifier.send(BondNotification::Closed(closed.clone()));
        Ok(closed)
    }

    pub async fn view_bond(&self, id: BondId) -> Result<BondView, RegistryError> {
        let entry = self.entry(id)?;
        let bond = entry.lock().await;
        Ok(bond.view())
    }

    /// Views of every bond, ordered by id.
    pub async fn list_bonds(&self) -> Vec<BondView> {
        let mut entries: Vec<(BondId, Arc<Mutex<Bond>>)> = self
            .bonds
            .iter()
            .map(|e| (*e.key(), Arc::clone(e.value())))
            .collect();
        entries.sort_by_key(|(id, _)| *id);

        let mut views = Vec::with_capacity(entries.len());
        for (_, entry) in entries {
            views.push(entry.lock().await.view());
        }
        views
    }
}
