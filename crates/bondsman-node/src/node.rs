//! The Bondsman node orchestrator.
//!
//! Opens storage, restores the bond engine, serves the HTTP API in a
//! background task, and logs engine notifications from the main loop.

use anyhow::Result;
use bondsman_core::BondNotification;
use bondsman_ledger::InternalRail;
use bondsman_registry::BondEngine;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::BondsmanConfig;
use crate::state::NodeState;
use crate::storage::RocksStore;

/// The Bondsman node.
pub struct BondsmanNode {
    /// Node configuration.
    config: BondsmanConfig,
    /// Rail paying out closed bonds and withdrawn fees.
    rail: Arc<InternalRail>,
    /// The engine (None until started).
    engine: Option<Arc<BondEngine>>,
    /// Receives engine notifications.
    notifications: Option<broadcast::Receiver<BondNotification>>,
    /// The HTTP API server task.
    api_task: Option<JoinHandle<()>>,
}

impl BondsmanNode {
    /// Create a node. Engine settings are checked here so a bad config
    /// fails before anything is opened.
    pub fn new(config: BondsmanConfig) -> Result<Self> {
        let engine_config = config.engine_config()?;
        tracing::info!(arbiter = %engine_config.arbiter, "Bondsman node created");

        Ok(Self {
            config,
            rail: Arc::new(InternalRail::new()),
            engine: None,
            notifications: None,
            api_task: None,
        })
    }

    /// Open storage, restore the engine, and start the HTTP API.
    pub async fn start(&mut self) -> Result<()> {
        tracing::info!("starting Bondsman node");

        let store = RocksStore::open(&self.config.storage.data_dir)?;
        tracing::info!(path = %self.config.storage.data_dir.display(), "storage initialized");

        let engine = Arc::new(BondEngine::open(
            self.config.engine_config()?,
            self.rail.clone(),
            Arc::new(store),
        )?);
        self.notifications = Some(engine.subscribe());

        let api_addr = self.config.api_addr()?;
        let api_state = Arc::new(NodeState::new(engine.clone()));
        self.api_task = Some(tokio::spawn(async move {
            if let Err(e) = crate::api::start_api_server(api_addr, api_state).await {
                tracing::error!(error = %e, "HTTP API server error");
            }
        }));

        self.engine = Some(engine);
        Ok(())
    }

    /// Run the node's main loop: log engine notifications until the engine
    /// goes away.
    pub async fn run(&mut self) -> Result<()> {
        let mut notifications = self
            .notifications
            .take()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;

        tracing::info!("entering main event loop");

        loop {
            match notifications.recv().await {
                Ok(notification) => Self::handle_notification(&notification),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(missed = n, "notification receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("notification channel closed");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Gracefully shut down the node.
    pub async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("shutting down Bondsman node");

        if let Some(task) = self.api_task.take() {
            task.abort();
            let _ = task.await;
            tracing::info!("HTTP API server stopped");
        }

        if let Some(engine) = self.engine.take() {
            tracing::info!(bonds = engine.bond_count(), "engine closed");
            drop(engine);
        }

        tracing::info!("Bondsman node shut down");
        Ok(())
    }

    fn handle_notification(notification: &BondNotification) {
        match notification {
            BondNotification::Created(created) => {
                tracing::info!(
                    bond_id = %created.id,
                    name = %created.name,
                    creator = %created.creator,
                    second_party = %created.second_party,
                    "BOND CREATED"
                );
            }
            BondNotification::Closed(closed) => {
                tracing::info!(
                    bond_id = %closed.id,
                    payee = %closed.payee,
                    payout = %closed.payout,
                    fee = %closed.fee,
                    "BOND CLOSED"
                );
            }
            BondNotification::FeesWithdrawn { amount } => {
                tracing::info!(amount = %amount, "FEES WITHDRAWN");
            }
        }
    }
}
