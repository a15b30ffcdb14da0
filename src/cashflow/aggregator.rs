//! Gap-filled daily series with running balance, and period summaries

use bigdecimal::{BigDecimal, RoundingMode, Signed, Zero};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::types::*;
use crate::utils::dates::{day_count_inclusive, iter_days, parse_iso_date};

/// Balance change (in percent) beyond which a period counts as trending
pub const TREND_THRESHOLD_PERCENT: i64 = 5;

/// Decimal places kept on averages and percent variation
pub const SUMMARY_SCALE: i64 = 2;

/// Expand sparse daily totals into one entry per calendar day of `[start_date, end_date]`.
///
/// Days missing from `sparse_entries` count as zero movement. Entries dated
/// outside the range are ignored.
pub fn build_series(
    sparse_entries: &BTreeMap<NaiveDate, DailyTotals>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    initial_balance: &BigDecimal,
) -> FinanceResult<Vec<DailyEntry>> {
    if start_date > end_date {
        return Err(FinanceError::InvalidRange {
            start: start_date,
            end: end_date,
        });
    }

    for (date, totals) in sparse_entries.range(start_date..=end_date) {
        totals.validate().map_err(|e| match e {
            FinanceError::InvalidAmount(msg) => {
                FinanceError::InvalidAmount(format!("{} on {}", msg, date))
            }
            other => other,
        })?;
    }

    let outside = sparse_entries.len() - sparse_entries.range(start_date..=end_date).count();
    if outside > 0 {
        tracing::debug!(
            outside,
            %start_date,
            %end_date,
            "Ignoring daily totals outside the requested range"
        );
    }

    let zero = DailyTotals::zero();
    let mut running = initial_balance.clone();
    let mut series = Vec::with_capacity(day_count_inclusive(start_date, end_date));

    for date in iter_days(start_date, end_date) {
        let totals = sparse_entries.get(&date).unwrap_or(&zero);
        let daily_net = &totals.inflow - &totals.outflow;
        running += &daily_net;

        series.push(DailyEntry {
            date,
            inflow_total: totals.inflow.clone(),
            outflow_total: totals.outflow.clone(),
            daily_net,
            cumulative_balance: running.clone(),
        });
    }

    Ok(series)
}

/// [`build_series`] over totals keyed by `YYYY-MM-DD` strings
pub fn build_series_from_iso(
    sparse_entries: &HashMap<String, DailyTotals>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    initial_balance: &BigDecimal,
) -> FinanceResult<Vec<DailyEntry>> {
    let mut by_date = BTreeMap::new();
    for (key, totals) in sparse_entries {
        let date = parse_iso_date(key)?;
        if by_date.insert(date, totals.clone()).is_some() {
            return Err(FinanceError::InvalidDate(format!(
                "'{}' appears more than once",
                key
            )));
        }
    }
    build_series(&by_date, start_date, end_date, initial_balance)
}

/// Totals, averages and trend over a daily series. Never fails, even when empty.
pub fn summarize(daily_entries: &[DailyEntry], initial_balance: &BigDecimal) -> PeriodSummary {
    let total_inflow: BigDecimal = daily_entries.iter().map(|e| &e.inflow_total).sum();
    let total_outflow: BigDecimal = daily_entries.iter().map(|e| &e.outflow_total).sum();
    let final_balance = daily_entries
        .last()
        .map(|e| e.cumulative_balance.clone())
        .unwrap_or_else(|| initial_balance.clone());
    let day_count = daily_entries.len();

    let net_change = &final_balance - initial_balance;
    // trend is classified before rounding so the threshold stays exact
    let raw_variation = if initial_balance.is_zero() {
        BigDecimal::zero()
    } else {
        &net_change / &initial_balance.abs() * BigDecimal::from(100)
    };
    let trend = classify_trend(&raw_variation);
    let percent_variation = round_summary(raw_variation);

    let (average_daily_inflow, average_daily_outflow, average_daily_net) = if day_count == 0 {
        (BigDecimal::zero(), BigDecimal::zero(), BigDecimal::zero())
    } else {
        let days = BigDecimal::from(day_count as u64);
        (
            round_summary(&total_inflow / &days),
            round_summary(&total_outflow / &days),
            round_summary(&net_change / &days),
        )
    };

    PeriodSummary {
        initial_balance: initial_balance.clone(),
        total_inflow,
        total_outflow,
        final_balance,
        day_count,
        percent_variation,
        trend,
        average_daily_inflow,
        average_daily_outflow,
        average_daily_net,
    }
}

/// Positive above +5%, negative below -5%, neutral otherwise
pub fn classify_trend(percent_variation: &BigDecimal) -> Trend {
    let threshold = BigDecimal::from(TREND_THRESHOLD_PERCENT);
    if *percent_variation > threshold {
        Trend::Positive
    } else if *percent_variation < -threshold {
        Trend::Negative
    } else {
        Trend::Neutral
    }
}

fn round_summary(value: BigDecimal) -> BigDecimal {
    value.with_scale_round(SUMMARY_SCALE, RoundingMode::HalfUp)
}
