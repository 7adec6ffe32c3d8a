//! League-administration portal core: the point-buy attribute economy
//! and the bank ledger.
//!
//! RULES:
//!   - Balances are derived: an account's balance is the sum of its
//!     ledger lines, a player's banked TPE is total minus applied.
//!   - Every orchestrated operation runs in one database transaction;
//!     there is no partial-commit state.
//!   - Only the store modules execute SQL.

pub mod attributes;
pub mod auth;
pub mod balance;
pub mod bank;
pub mod config;
pub mod costs;
pub mod error;
pub mod portal;
pub mod purchase;
pub mod store;
pub mod types;
pub mod updates;

pub use error::{PortalError, PortalResult, ValidationError};
pub use portal::LeaguePortal;
