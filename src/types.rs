//! Core types and data structures for reconciliation and cash-flow reporting

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::validation::{amount_from_f64, validate_non_negative_amount};

/// A bank-statement transaction eligible for matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    /// Stable identifier assigned by the import source
    pub id: String,
    /// Posting date on the statement
    pub date: NaiveDate,
    /// Signed amount (credits positive, debits negative)
    pub amount: BigDecimal,
    /// Bank memo, shown to the reviewer only
    pub description: String,
}

impl StatementLine {
    /// Create a new statement line
    pub fn new(id: String, date: NaiveDate, amount: BigDecimal, description: String) -> Self {
        Self {
            id,
            date,
            amount,
            description,
        }
    }
}

/// An accrual-basis revenue entry eligible for matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRecord {
    /// Stable identifier of the accrual entry
    pub id: String,
    /// Expected or actual receipt date
    pub date: NaiveDate,
    /// Amount expected to land in the bank account
    pub amount: BigDecimal,
    /// Professional credited with the revenue, if any
    pub professional_name: Option<String>,
    /// Revenue category (service, product, ...)
    pub category: Option<String>,
    /// Free-form description
    pub description: Option<String>,
    /// Franchise unit the revenue was booked against
    pub unit_id: Option<String>,
}

impl RevenueRecord {
    /// Create a revenue record with no display metadata
    pub fn new(id: String, date: NaiveDate, amount: BigDecimal) -> Self {
        Self {
            id,
            date,
            amount,
            professional_name: None,
            category: None,
            description: None,
            unit_id: None,
        }
    }

    pub fn with_professional(mut self, name: impl Into<String>) -> Self {
        self.professional_name = Some(name.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_unit(mut self, unit_id: impl Into<String>) -> Self {
        self.unit_id = Some(unit_id.into());
        self
    }
}

/// A scored pairing proposed by the matcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub statement_line: StatementLine,
    pub revenue_record: RevenueRecord,
    /// `revenue_record.amount - statement_line.amount`
    pub difference_amount: BigDecimal,
    /// `revenue_record.date - statement_line.date` in days
    pub date_difference_days: i64,
    /// Score in (0, 1]; 1.0 only for an exact date and amount match
    pub confidence_score: f64,
}

impl MatchCandidate {
    /// Whether this candidate shares a statement line or revenue record with `other`
    pub fn overlaps(&self, other: &MatchCandidate) -> bool {
        self.statement_line.id == other.statement_line.id
            || self.revenue_record.id == other.revenue_record.id
    }

    pub fn is_exact(&self) -> bool {
        self.date_difference_days == 0 && self.difference_amount.is_zero()
    }
}

/// Review state of a candidate inside a workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateStatus {
    /// Awaiting a reviewer decision
    Proposed,
    /// Accepted by the reviewer; both entities left the unmatched pools
    Confirmed,
    /// Declined by the reviewer; both entities stay unmatched
    Rejected,
    /// Another candidate claimed one of its entities first
    Superseded,
}

impl CandidateStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CandidateStatus::Proposed)
    }
}

impl std::fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CandidateStatus::Proposed => "proposed",
            CandidateStatus::Confirmed => "confirmed",
            CandidateStatus::Rejected => "rejected",
            CandidateStatus::Superseded => "superseded",
        };
        f.write_str(label)
    }
}

/// A confirmed pairing handed to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedMatch {
    pub statement_line: StatementLine,
    pub revenue_record: RevenueRecord,
    pub difference_amount: BigDecimal,
    pub confidence_score: f64,
}

impl From<&MatchCandidate> for ConfirmedMatch {
    fn from(candidate: &MatchCandidate) -> Self {
        Self {
            statement_line: candidate.statement_line.clone(),
            revenue_record: candidate.revenue_record.clone(),
            difference_amount: candidate.difference_amount.clone(),
            confidence_score: candidate.confidence_score,
        }
    }
}

/// Entities not yet claimed by a confirmed match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedPools {
    pub statement_lines: Vec<StatementLine>,
    pub revenue_records: Vec<RevenueRecord>,
}

/// Inflow and outflow recorded for a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub inflow: BigDecimal,
    pub outflow: BigDecimal,
}

impl DailyTotals {
    pub fn new(inflow: BigDecimal, outflow: BigDecimal) -> Self {
        Self { inflow, outflow }
    }

    /// Build totals from floating point values, rejecting NaN and infinities
    pub fn from_f64(inflow: f64, outflow: f64) -> FinanceResult<Self> {
        Ok(Self {
            inflow: amount_from_f64(inflow)?,
            outflow: amount_from_f64(outflow)?,
        })
    }

    pub fn zero() -> Self {
        Self {
            inflow: BigDecimal::zero(),
            outflow: BigDecimal::zero(),
        }
    }

    /// Both totals must be non-negative
    pub fn validate(&self) -> FinanceResult<()> {
        validate_non_negative_amount(&self.inflow, "inflow")?;
        validate_non_negative_amount(&self.outflow, "outflow")
    }
}

impl Default for DailyTotals {
    fn default() -> Self {
        Self::zero()
    }
}

/// One calendar day of the cash-flow demonstrative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub date: NaiveDate,
    pub inflow_total: BigDecimal,
    pub outflow_total: BigDecimal,
    /// `inflow_total - outflow_total`
    pub daily_net: BigDecimal,
    /// Previous day's cumulative balance plus `daily_net`
    pub cumulative_balance: BigDecimal,
}

/// Direction of the balance over a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Positive,
    Negative,
    Neutral,
}

/// Aggregate figures over a daily series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub initial_balance: BigDecimal,
    pub total_inflow: BigDecimal,
    pub total_outflow: BigDecimal,
    pub final_balance: BigDecimal,
    pub day_count: usize,
    /// Balance change relative to `|initial_balance|`, in percent
    pub percent_variation: BigDecimal,
    pub trend: Trend,
    pub average_daily_inflow: BigDecimal,
    pub average_daily_outflow: BigDecimal,
    pub average_daily_net: BigDecimal,
}

impl PeriodSummary {
    /// `final_balance - initial_balance`
    pub fn net_change(&self) -> BigDecimal {
        &self.final_balance - &self.initial_balance
    }
}

/// Selection passed to a cash-flow source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowQuery {
    /// Restrict to a single franchise unit
    pub unit_id: Option<String>,
    /// Restrict to a single bank/cash account
    pub account_id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CashFlowQuery {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            unit_id: None,
            account_id: None,
            start_date,
            end_date,
        }
    }

    pub fn for_unit(mut self, unit_id: impl Into<String>) -> Self {
        self.unit_id = Some(unit_id.into());
        self
    }

    pub fn for_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }
}

/// Errors raised by the reconciliation and cash-flow core
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FinanceError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid range: start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Candidate index {index} out of range (candidates: {len})")]
    InvalidIndex { index: usize, len: usize },
    #[error("Candidate {index} already decided ({status})")]
    AlreadyDecided {
        index: usize,
        status: CandidateStatus,
    },
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for core operations
pub type FinanceResult<T> = Result<T, FinanceError>;
