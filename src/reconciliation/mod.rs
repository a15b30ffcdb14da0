//! Reconciliation of bank-statement lines against accrual revenue
//!
//! [`matcher`] scores every plausible pairing inside a tolerance window,
//! [`workflow`] turns the ranked candidates into a one-to-one review queue,
//! and [`session`] binds a workflow to a [`ReconciliationStore`](crate::traits::ReconciliationStore).

pub mod matcher;
pub mod session;
pub mod workflow;

pub use matcher::*;
pub use session::*;
pub use workflow::*;
