//! # Franchise Finance Core
//!
//! Bank-statement reconciliation and cash-flow demonstrative calculations for
//! franchise units.
//!
//! ## Features
//!
//! - **Reconciliation matching**: Pairs statement lines with accrual revenue inside a
//!   date and amount tolerance window, with confidence-scored, ranked candidates
//! - **Review workflow**: Confirm/reject decisions with one-to-one enforcement and an
//!   auditable decision ledger
//! - **Cash-flow demonstrative**: Gap-filled daily series with running balance, totals,
//!   averages and trend classification
//! - **Storage abstraction**: Trait-based collaborators for loading statements and
//!   persisting confirmed matches
//!
//! ## Quick Start
//!
//! ```rust
//! use franchise_finance_core::{build_series, summarize, Trend};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//! use std::collections::BTreeMap;
//!
//! let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
//! let initial = BigDecimal::from(100);
//!
//! let series = build_series(&BTreeMap::new(), start, end, &initial).unwrap();
//! assert_eq!(series.len(), 3);
//!
//! let summary = summarize(&series, &initial);
//! assert_eq!(summary.trend, Trend::Neutral);
//! ```

pub mod cashflow;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use cashflow::*;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;

pub use utils::dates::{format_iso, iter_days, parse_iso_date, Period};
