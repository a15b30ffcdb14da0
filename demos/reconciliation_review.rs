//! Reconciliation review walkthrough

use franchise_finance_core::{
    utils::MemoryStorage, MatchConfig, ReconciliationSession, RevenueRecord, StatementLine,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "franchise_finance_core=info".into()),
        )
        .init();

    println!("🏦 Franchise Finance Core - Reconciliation Review\n");

    let storage = MemoryStorage::new();
    let day = |d| NaiveDate::from_ymd_opt(2025, 1, d).ok_or("invalid date");

    for (id, d, amount, memo) in [
        ("ext-001", 10, "150.00", "PIX RECEBIDO"),
        ("ext-002", 10, "45.00", "CARTAO DEBITO"),
        ("ext-003", 12, "45.00", "CARTAO DEBITO"),
        ("ext-004", 15, "89.90", "CARTAO CREDITO"),
    ] {
        storage.add_statement_line(StatementLine::new(
            id.to_string(),
            day(d)?,
            BigDecimal::from_str(amount)?,
            memo.to_string(),
        ))?;
    }

    for (id, d, amount, professional) in [
        ("rev-101", 11, "150.00", "Carlos"),
        ("rev-102", 10, "45.00", "Bruna"),
        ("rev-103", 11, "45.00", "Carlos"),
        ("rev-104", 20, "89.90", "Bruna"),
    ] {
        storage.add_revenue_record(
            RevenueRecord::new(id.to_string(), day(d)?, BigDecimal::from_str(amount)?)
                .with_professional(professional)
                .with_category("corte"),
        )?;
    }

    let mut session = ReconciliationSession::open(storage.clone(), MatchConfig::default()).await?;

    println!("📋 Proposed candidates:");
    for (index, candidate) in session.workflow().pending_candidates() {
        println!(
            "  [{}] {} ↔ {}  diff {}  {:+} days  confidence {:.2}",
            index,
            candidate.statement_line.id,
            candidate.revenue_record.id,
            candidate.difference_amount,
            candidate.date_difference_days,
            candidate.confidence_score
        );
    }
    println!();

    // Accept the best remaining candidate until the queue is empty
    loop {
        let next = session
            .workflow()
            .pending_candidates()
            .first()
            .map(|(index, _)| *index);
        let Some(index) = next else { break };

        let confirmed = session.confirm(index).await?;
        println!(
            "✅ Confirmed {} ↔ {}",
            confirmed.statement_line.id, confirmed.revenue_record.id
        );
    }
    println!();

    let pools = session.workflow().remaining_unmatched();
    println!("🔎 Still unmatched:");
    for line in &pools.statement_lines {
        println!("  statement {} on {}: {}", line.id, line.date, line.amount);
    }
    for record in &pools.revenue_records {
        println!("  revenue   {} on {}: {}", record.id, record.date, record.amount);
    }

    let counts = session.workflow().decision_counts();
    println!(
        "\n📊 confirmed {}, rejected {}, superseded {}",
        counts.confirmed, counts.rejected, counts.superseded
    );

    Ok(())
}
