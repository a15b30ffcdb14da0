//! Cash-flow demonstrative: gap-filled daily balances and period KPIs

pub mod aggregator;
pub mod report;

pub use aggregator::*;
pub use report::*;
