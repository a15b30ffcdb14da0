//! Traits for the persistence collaborators around the core

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::types::*;

/// Storage abstraction for reconciliation data
///
/// Implementations wrap whatever backend holds imported bank statements and
/// accrual revenue (PostgreSQL, a hosted API, in-memory, etc.). The core
/// never writes anywhere else.
#[async_trait]
pub trait ReconciliationStore: Send + Sync {
    /// Statement lines not yet linked to a revenue record
    async fn unmatched_statement_lines(&self) -> FinanceResult<Vec<StatementLine>>;

    /// Revenue records not yet marked as reconciled
    async fn unmatched_revenue_records(&self) -> FinanceResult<Vec<RevenueRecord>>;

    /// Link the pair and mark the revenue record as reconciled
    async fn save_match(&mut self, confirmed: &ConfirmedMatch) -> FinanceResult<()>;
}

/// Source of daily movement totals for the cash-flow demonstrative
#[async_trait]
pub trait CashFlowSource: Send + Sync {
    /// Inflow/outflow grouped by day for the query's range; days without
    /// movement may be omitted
    async fn daily_totals(
        &self,
        query: &CashFlowQuery,
    ) -> FinanceResult<BTreeMap<NaiveDate, DailyTotals>>;

    /// Cumulative balance at the end of the day before `query.start_date`
    async fn balance_before(&self, query: &CashFlowQuery) -> FinanceResult<BigDecimal>;
}
