//! Integration tests for franchise-finance-core

use franchise_finance_core::{
    build_series, find_matches, summarize,
    utils::{Movement, MemoryStorage},
    CandidateStatus, CashFlowQuery, CashFlowReport, DailyTotals, FinanceError, MatchConfig,
    Period, ReconciliationSession, ReconciliationStore, ReconciliationWorkflow, RevenueRecord,
    StatementLine, Trend,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::str::FromStr;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn amount(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

fn line(id: &str, d: NaiveDate, value: &str) -> StatementLine {
    StatementLine::new(id.to_string(), d, amount(value), format!("CREDITO {}", id))
}

fn revenue(id: &str, d: NaiveDate, value: &str) -> RevenueRecord {
    RevenueRecord::new(id.to_string(), d, amount(value))
}

#[test]
fn test_one_day_offset_produces_single_high_confidence_candidate() {
    let lines = vec![line("s1", date(2025, 1, 10), "150.00")];
    let records = vec![revenue("r1", date(2025, 1, 11), "150.00")];
    let config = MatchConfig::parse(3, "0.01").unwrap();

    let candidates = find_matches(&lines, &records, &config).unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].difference_amount, amount("0.00"));
    assert!(candidates[0].confidence_score < 1.0);
    assert!(candidates[0].confidence_score >= 0.8);
}

#[test]
fn test_tolerance_window_edges() {
    let config = MatchConfig::parse(3, "0.01").unwrap();
    let lines = vec![line("s1", date(2025, 1, 10), "100.00")];

    let inside = vec![revenue("r1", date(2025, 1, 7), "99.99")];
    let candidates = find_matches(&lines, &inside, &config).unwrap();
    assert_eq!(candidates.len(), 1);
    assert!(candidates[0].confidence_score > 0.0);
    assert_eq!(candidates[0].difference_amount, amount("-0.01"));
    assert_eq!(candidates[0].date_difference_days, -3);

    let too_early = vec![revenue("r1", date(2025, 1, 6), "100.00")];
    assert!(find_matches(&lines, &too_early, &config).unwrap().is_empty());

    let too_far = vec![revenue("r1", date(2025, 1, 10), "99.989")];
    assert!(find_matches(&lines, &too_far, &config).unwrap().is_empty());
}

#[test]
fn test_review_of_a_busy_day() {
    // Two identical card settlements on the same day compete for two revenue records
    let day = date(2025, 6, 2);
    let lines = vec![
        line("s1", day, "45.00"),
        line("s2", day, "45.00"),
        line("s3", date(2025, 6, 3), "120.00"),
    ];
    let records = vec![
        revenue("r1", day, "45.00").with_professional("Carlos"),
        revenue("r2", day, "45.00").with_professional("Bruna"),
        revenue("r3", date(2025, 6, 9), "120.00"),
    ];

    let mut workflow = ReconciliationWorkflow::new(lines, records, MatchConfig::default()).unwrap();
    assert_eq!(workflow.pending_candidates().len(), 4);

    let (first, _) = workflow.pending_candidates()[0];
    let confirmed = workflow.confirm(first).unwrap();

    let last = {
        let pending = workflow.pending_candidates();
        assert_eq!(pending.len(), 1);
        let (last, remaining) = pending[0];
        assert_ne!(remaining.statement_line.id, confirmed.statement_line.id);
        assert_ne!(remaining.revenue_record.id, confirmed.revenue_record.id);
        last
    };

    workflow.confirm(last).unwrap();
    assert!(workflow.pending_candidates().is_empty());

    let pools = workflow.remaining_unmatched();
    assert_eq!(pools.statement_lines.len(), 1);
    assert_eq!(pools.statement_lines[0].id, "s3");
    assert_eq!(pools.revenue_records.len(), 1);
    assert_eq!(pools.revenue_records[0].id, "r3");

    let counts = workflow.decision_counts();
    assert_eq!(counts.confirmed, 2);
    assert_eq!(counts.superseded, 2);
    assert_eq!(counts.rejected, 0);
}

#[test]
fn test_reject_then_decide_again_fails() {
    let mut workflow = ReconciliationWorkflow::new(
        vec![line("s1", date(2025, 1, 10), "10.00")],
        vec![revenue("r1", date(2025, 1, 10), "10.00")],
        MatchConfig::default(),
    )
    .unwrap();

    workflow.reject(0).unwrap();
    assert_eq!(workflow.status(0).unwrap(), CandidateStatus::Rejected);
    assert_eq!(workflow.remaining_unmatched().statement_lines.len(), 1);
    assert_eq!(workflow.remaining_unmatched().revenue_records.len(), 1);

    assert!(matches!(
        workflow.confirm(0),
        Err(FinanceError::AlreadyDecided {
            index: 0,
            status: CandidateStatus::Rejected
        })
    ));
}

#[test]
fn test_series_has_one_entry_per_day() {
    let mut sparse = BTreeMap::new();
    sparse.insert(date(2025, 2, 14), DailyTotals::new(amount("380.00"), amount("95.50")));

    for (start, end) in [
        (date(2025, 2, 1), date(2025, 2, 28)),
        (date(2024, 2, 1), date(2024, 2, 29)),
        (date(2024, 12, 30), date(2025, 1, 2)),
        (date(2025, 2, 14), date(2025, 2, 14)),
    ] {
        let series = build_series(&sparse, start, end, &BigDecimal::from(0)).unwrap();
        let expected = (end - start).num_days() as usize + 1;

        assert_eq!(series.len(), expected);
        assert!(series.windows(2).all(|w| w[1].date == w[0].date.succ_opt().unwrap()));
        assert_eq!(series[0].date, start);
        assert_eq!(series[expected - 1].date, end);
    }
}

#[test]
fn test_three_quiet_days_keep_initial_balance() {
    let series = build_series(
        &BTreeMap::new(),
        date(2025, 1, 1),
        date(2025, 1, 3),
        &amount("100.00"),
    )
    .unwrap();

    assert_eq!(series.len(), 3);
    assert!(series
        .iter()
        .all(|e| e.cumulative_balance == amount("100.00")));

    let summary = summarize(&[], &amount("100.00"));
    assert_eq!(summary.final_balance, amount("100.00"));
    assert_eq!(summary.trend, Trend::Neutral);
}

#[test]
fn test_negative_trend_over_a_month() {
    let mut sparse = BTreeMap::new();
    sparse.insert(date(2025, 3, 5), DailyTotals::new(amount("200.00"), amount("0")));
    sparse.insert(date(2025, 3, 20), DailyTotals::new(amount("0"), amount("900.00")));

    let (start, end) = Period::CurrentMonth.bounds(date(2025, 3, 15));
    let initial = amount("5000.00");
    let series = build_series(&sparse, start, end, &initial).unwrap();
    let summary = summarize(&series, &initial);

    assert_eq!(summary.day_count, 31);
    assert_eq!(summary.final_balance, amount("4300.00"));
    assert_eq!(summary.percent_variation, amount("-14.00"));
    assert_eq!(summary.trend, Trend::Negative);
}

#[test]
fn test_non_finite_totals_are_rejected_at_the_boundary() {
    assert!(matches!(
        DailyTotals::from_f64(f64::NAN, 0.0),
        Err(FinanceError::InvalidAmount(_))
    ));
    assert!(matches!(
        DailyTotals::from_f64(10.0, f64::NEG_INFINITY),
        Err(FinanceError::InvalidAmount(_))
    ));
}

#[tokio::test]
async fn test_session_persists_confirmed_matches() {
    let storage = MemoryStorage::new();
    storage.add_statement_line(line("s1", date(2025, 5, 2), "70.00")).unwrap();
    storage.add_statement_line(line("s2", date(2025, 5, 3), "25.00")).unwrap();
    storage
        .add_revenue_record(revenue("r1", date(2025, 5, 2), "70.00").with_unit("centro"))
        .unwrap();
    storage
        .add_revenue_record(revenue("r2", date(2025, 5, 4), "25.00").with_unit("centro"))
        .unwrap();

    let mut session = ReconciliationSession::open(storage.clone(), MatchConfig::default())
        .await
        .unwrap();
    assert_eq!(session.workflow().pending_candidates().len(), 2);

    let exact = session
        .workflow()
        .pending_candidates()
        .iter()
        .find(|(_, c)| c.statement_line.id == "s1")
        .map(|(i, _)| *i)
        .unwrap();
    session.confirm(exact).await.unwrap();

    assert_eq!(storage.linked_revenue("s1").unwrap(), Some("r1".to_string()));
    assert_eq!(storage.unmatched_statement_lines().await.unwrap().len(), 1);

    // A fresh session only sees what is still unmatched
    let (_, workflow) = session.finish();
    assert_eq!(workflow.confirmed_matches().len(), 1);

    let reopened = ReconciliationSession::open(storage, MatchConfig::default())
        .await
        .unwrap();
    let pending = reopened.workflow().pending_candidates();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].1.statement_line.id, "s2");
}

#[tokio::test]
async fn test_cash_flow_report_for_a_unit() {
    let storage = MemoryStorage::new();
    storage
        .set_opening_balance("centro", "caixa", amount("1000.00"))
        .unwrap();

    for (d, unit, value) in [
        (28, "centro", "-100.00"),
        (2, "centro", "350.00"),
        (2, "centro", "-50.00"),
        (4, "centro", "-120.00"),
        (2, "norte", "999.00"),
    ] {
        let month = if d == 28 { 2 } else { 3 };
        storage
            .add_movement(Movement {
                date: date(2025, month, d),
                unit_id: unit.to_string(),
                account_id: "caixa".to_string(),
                amount: amount(value),
            })
            .unwrap();
    }

    let query = CashFlowQuery::new(date(2025, 3, 1), date(2025, 3, 5)).for_unit("centro");
    let report = CashFlowReport::generate(&storage, query).await.unwrap();

    assert_eq!(report.summary.initial_balance, amount("900.00"));
    assert_eq!(report.entries.len(), 5);
    assert_eq!(report.active_days().count(), 2);
    assert_eq!(report.entries[1].daily_net, amount("300.00"));
    assert_eq!(report.summary.final_balance, amount("1080.00"));
    assert_eq!(report.summary.total_inflow, amount("350.00"));
    assert_eq!(report.summary.total_outflow, amount("170.00"));
    assert_eq!(report.summary.percent_variation, amount("20.00"));
    assert_eq!(report.summary.trend, Trend::Positive);
}

#[tokio::test]
async fn test_cash_flow_report_rejects_inverted_range() {
    let storage = MemoryStorage::new();
    let query = CashFlowQuery::new(date(2025, 3, 5), date(2025, 3, 1));

    assert!(matches!(
        CashFlowReport::generate(&storage, query).await,
        Err(FinanceError::InvalidRange { .. })
    ));
}
