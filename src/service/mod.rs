//! Service layer: scheduler operations, the sweep, and its tick driver.

pub mod boost_service;
pub mod sweep;
pub mod sweeper;

pub use boost_service::{ActiveBoost, BoostDecision, BoostService, BoostStatus};
pub use sweep::{CategorySweep, SweepAction, SweepActionKind, SweepReport};
pub use sweeper::Sweeper;
