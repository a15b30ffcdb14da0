//! Cash-flow demonstrative assembled from a [`CashFlowSource`]

use bigdecimal::Zero;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cashflow::aggregator::{build_series, summarize};
use crate::traits::*;
use crate::types::*;

/// Complete daily series and summary for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowReport {
    pub query: CashFlowQuery,
    pub entries: Vec<DailyEntry>,
    pub summary: PeriodSummary,
}

impl CashFlowReport {
    /// Fetch totals and the opening balance from `source`, then build the report
    #[instrument(skip(source), fields(start = %query.start_date, end = %query.end_date))]
    pub async fn generate<S: CashFlowSource + ?Sized>(
        source: &S,
        query: CashFlowQuery,
    ) -> FinanceResult<Self> {
        if query.start_date > query.end_date {
            return Err(FinanceError::InvalidRange {
                start: query.start_date,
                end: query.end_date,
            });
        }

        let initial_balance = source.balance_before(&query).await?;
        let totals = source.daily_totals(&query).await?;

        let entries = build_series(&totals, query.start_date, query.end_date, &initial_balance)?;
        let summary = summarize(&entries, &initial_balance);

        tracing::info!(
            days = summary.day_count,
            final_balance = %summary.final_balance,
            trend = ?summary.trend,
            "Generated cash-flow report"
        );

        Ok(Self {
            query,
            entries,
            summary,
        })
    }

    /// Days that had any inflow or outflow
    pub fn active_days(&self) -> impl Iterator<Item = &DailyEntry> {
        self.entries
            .iter()
            .filter(|e| !(e.inflow_total.is_zero() && e.outflow_total.is_zero()))
    }
}
