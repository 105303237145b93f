//! Bondsman core: identities, bonds, the bond lifecycle state machine,
//! fee arithmetic, and engine configuration.

pub mod bond;
pub mod config;
pub mod error;
pub mod events;
pub mod fees;
pub mod state_machine;
pub mod types;

pub use bond::{Bond, BondView};
pub use config::EngineConfig;
pub use error::BondError;
pub use events::{BondClosed, BondCreated, BondNotification};
pub use fees::FeeSplit;
pub use state_machine::{BondEvent, BondPhase, BondState, BondStateMachine, Confirmations};
pub use types::{Amount, BondId, Identity, Party};
