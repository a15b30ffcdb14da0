//! Tolerance-based pairing of statement lines with revenue records

use bigdecimal::{BigDecimal, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::types::*;
use crate::utils::dates::{abs_days_between, days_between};
use crate::utils::validation::{parse_amount, validate_tolerance, validate_unique_ids};

/// Lowest score a pair inside the tolerance window can receive
pub const CONFIDENCE_FLOOR: f64 = 0.1;
/// Share of the score penalty driven by the date difference
pub const DATE_WEIGHT: f64 = 0.5;
/// Share of the score penalty driven by the amount difference
pub const AMOUNT_WEIGHT: f64 = 0.5;

pub const DEFAULT_DATE_TOLERANCE_DAYS: i64 = 3;

/// Matching window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Maximum distance between the two dates, in days (inclusive)
    pub date_tolerance_days: i64,
    /// Maximum absolute amount difference (inclusive)
    pub amount_tolerance: BigDecimal,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            date_tolerance_days: DEFAULT_DATE_TOLERANCE_DAYS,
            // one cent
            amount_tolerance: BigDecimal::new(1.into(), 2),
        }
    }
}

impl MatchConfig {
    pub fn new(date_tolerance_days: i64, amount_tolerance: BigDecimal) -> Self {
        Self {
            date_tolerance_days,
            amount_tolerance,
        }
    }

    /// Build a config from a textual amount tolerance such as `"0.05"`
    pub fn parse(date_tolerance_days: i64, amount_tolerance: &str) -> FinanceResult<Self> {
        let amount_tolerance = parse_amount(amount_tolerance).map_err(|e| {
            FinanceError::InvalidConfiguration(format!("amount_tolerance: {}", e))
        })?;
        let config = Self::new(date_tolerance_days, amount_tolerance);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FinanceResult<()> {
        if self.date_tolerance_days < 0 {
            return Err(FinanceError::InvalidConfiguration(format!(
                "date_tolerance_days must not be negative: {}",
                self.date_tolerance_days
            )));
        }
        validate_tolerance(&self.amount_tolerance, "amount_tolerance")
    }
}

/// Score a single pair, returning `None` when it falls outside the window.
///
/// The config is assumed to be valid; [`find_matches`] checks it once per batch.
pub fn score_pair(
    statement_line: &StatementLine,
    revenue_record: &RevenueRecord,
    config: &MatchConfig,
) -> Option<f64> {
    let date_diff = abs_days_between(statement_line.date, revenue_record.date);
    let amount_diff = (&revenue_record.amount - &statement_line.amount).abs();

    if date_diff > config.date_tolerance_days || amount_diff > config.amount_tolerance {
        return None;
    }

    Some(confidence(date_diff, &amount_diff, config))
}

fn confidence(date_diff: i64, amount_diff: &BigDecimal, config: &MatchConfig) -> f64 {
    let date_ratio = if config.date_tolerance_days == 0 {
        0.0
    } else {
        date_diff as f64 / config.date_tolerance_days as f64
    };

    let amount_ratio = if config.amount_tolerance.is_zero() {
        0.0
    } else {
        (amount_diff / &config.amount_tolerance)
            .to_f64()
            .unwrap_or(1.0)
    };

    let penalty = DATE_WEIGHT * date_ratio.clamp(0.0, 1.0)
        + AMOUNT_WEIGHT * amount_ratio.clamp(0.0, 1.0);

    1.0 - (1.0 - CONFIDENCE_FLOOR) * penalty
}

/// Produce every pair inside the tolerance window, best candidates first.
///
/// Ordering: confidence descending, then absolute amount difference ascending,
/// then absolute date difference ascending, then statement id and revenue id.
/// The same statement line or revenue record may appear in several candidates.
pub fn find_matches(
    statement_lines: &[StatementLine],
    revenue_records: &[RevenueRecord],
    config: &MatchConfig,
) -> FinanceResult<Vec<MatchCandidate>> {
    config.validate()?;
    validate_unique_ids(
        statement_lines.iter().map(|l| l.id.as_str()),
        "statement lines",
    )?;
    validate_unique_ids(
        revenue_records.iter().map(|r| r.id.as_str()),
        "revenue records",
    )?;

    let mut candidates = Vec::new();
    for line in statement_lines {
        for record in revenue_records {
            if let Some(score) = score_pair(line, record, config) {
                candidates.push(MatchCandidate {
                    statement_line: line.clone(),
                    revenue_record: record.clone(),
                    difference_amount: &record.amount - &line.amount,
                    date_difference_days: days_between(line.date, record.date),
                    confidence_score: score,
                });
            }
        }
    }

    candidates.sort_by(rank);

    tracing::debug!(
        statement_lines = statement_lines.len(),
        revenue_records = revenue_records.len(),
        candidates = candidates.len(),
        "Matched statement lines against revenue records"
    );

    Ok(candidates)
}

fn rank(a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    b.confidence_score
        .total_cmp(&a.confidence_score)
        .then_with(|| a.difference_amount.abs().cmp(&b.difference_amount.abs()))
        .then_with(|| {
            a.date_difference_days
                .abs()
                .cmp(&b.date_difference_days.abs())
        })
        .then_with(|| a.statement_line.id.cmp(&b.statement_line.id))
        .then_with(|| a.revenue_record.id.cmp(&b.revenue_record.id))
}
