//! In-memory storage implementation for testing

use async_trait::async_trait;
use bigdecimal::{BigDecimal, Signed, Zero};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

/// A cash movement recorded against a unit and account
#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    pub date: NaiveDate,
    pub unit_id: String,
    pub account_id: String,
    /// Positive for inflow, negative for outflow
    pub amount: BigDecimal,
}

#[derive(Debug, Default)]
struct Inner {
    statement_lines: Vec<StatementLine>,
    revenue_records: Vec<RevenueRecord>,
    /// statement line id -> revenue record id
    links: HashMap<String, String>,
    movements: Vec<Movement>,
    opening_balances: HashMap<(String, String), BigDecimal>,
}

/// In-memory storage implementation for testing and development
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_statement_line(&self, line: StatementLine) -> FinanceResult<()> {
        self.write()?.statement_lines.push(line);
        Ok(())
    }

    pub fn add_revenue_record(&self, record: RevenueRecord) -> FinanceResult<()> {
        self.write()?.revenue_records.push(record);
        Ok(())
    }

    pub fn add_movement(&self, movement: Movement) -> FinanceResult<()> {
        self.write()?.movements.push(movement);
        Ok(())
    }

    /// Balance of `(unit_id, account_id)` before its first recorded movement
    pub fn set_opening_balance(
        &self,
        unit_id: &str,
        account_id: &str,
        balance: BigDecimal,
    ) -> FinanceResult<()> {
        self.write()?
            .opening_balances
            .insert((unit_id.to_string(), account_id.to_string()), balance);
        Ok(())
    }

    /// Revenue record linked to `statement_line_id`, if reconciled
    pub fn linked_revenue(&self, statement_line_id: &str) -> FinanceResult<Option<String>> {
        Ok(self.read()?.links.get(statement_line_id).cloned())
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> FinanceResult<()> {
        *self.write()? = Inner::default();
        Ok(())
    }

    fn read(&self) -> FinanceResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| FinanceError::Storage(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> FinanceResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| FinanceError::Storage(format!("lock poisoned: {}", e)))
    }
}

fn matches_query(movement: &Movement, query: &CashFlowQuery) -> bool {
    query
        .unit_id
        .as_ref()
        .is_none_or(|unit| &movement.unit_id == unit)
        && query
            .account_id
            .as_ref()
            .is_none_or(|account| &movement.account_id == account)
}

#[async_trait]
impl ReconciliationStore for MemoryStorage {
    async fn unmatched_statement_lines(&self) -> FinanceResult<Vec<StatementLine>> {
        let inner = self.read()?;
        Ok(inner
            .statement_lines
            .iter()
            .filter(|l| !inner.links.contains_key(&l.id))
            .cloned()
            .collect())
    }

    async fn unmatched_revenue_records(&self) -> FinanceResult<Vec<RevenueRecord>> {
        let inner = self.read()?;
        Ok(inner
            .revenue_records
            .iter()
            .filter(|r| !inner.links.values().any(|id| id == &r.id))
            .cloned()
            .collect())
    }

    async fn save_match(&mut self, confirmed: &ConfirmedMatch) -> FinanceResult<()> {
        let mut inner = self.write()?;
        let statement_id = &confirmed.statement_line.id;
        let revenue_id = &confirmed.revenue_record.id;

        if inner.links.contains_key(statement_id) {
            return Err(FinanceError::Storage(format!(
                "statement line '{}' is already reconciled",
                statement_id
            )));
        }
        if inner.links.values().any(|id| id == revenue_id) {
            return Err(FinanceError::Storage(format!(
                "revenue record '{}' is already reconciled",
                revenue_id
            )));
        }

        inner.links.insert(statement_id.clone(), revenue_id.clone());
        Ok(())
    }
}

#[async_trait]
impl CashFlowSource for MemoryStorage {
    async fn daily_totals(
        &self,
        query: &CashFlowQuery,
    ) -> FinanceResult<BTreeMap<NaiveDate, DailyTotals>> {
        let inner = self.read()?;
        let mut totals: BTreeMap<NaiveDate, DailyTotals> = BTreeMap::new();

        for movement in inner
            .movements
            .iter()
            .filter(|m| m.date >= query.start_date && m.date <= query.end_date)
            .filter(|m| matches_query(m, query))
        {
            let day = totals.entry(movement.date).or_default();
            if movement.amount.is_negative() {
                day.outflow += movement.amount.abs();
            } else {
                day.inflow += &movement.amount;
            }
        }

        Ok(totals)
    }

    async fn balance_before(&self, query: &CashFlowQuery) -> FinanceResult<BigDecimal> {
        let inner = self.read()?;

        let opening: BigDecimal = inner
            .opening_balances
            .iter()
            .filter(|((unit, account), _)| {
                query.unit_id.as_ref().is_none_or(|u| u == unit)
                    && query.account_id.as_ref().is_none_or(|a| a == account)
            })
            .map(|(_, balance)| balance)
            .sum();

        let prior: BigDecimal = inner
            .movements
            .iter()
            .filter(|m| m.date < query.start_date)
            .filter(|m| matches_query(m, query))
            .map(|m| &m.amount)
            .sum();

        Ok(opening + prior)
    }
}
