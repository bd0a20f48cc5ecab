//! Host-independent escrow accounting.
//!
//! `MarketController` owns the betting-phase transitions and
//! `SettlementEngine` the payout arithmetic. Neither touches accounts
//! directly; funds move through the `Ledger` capability.

pub mod controller;
pub mod ledger;
pub mod settlement;

pub use controller::*;
pub use ledger::*;
pub use settlement::*;
