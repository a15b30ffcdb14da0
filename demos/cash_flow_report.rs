//! Cash-flow demonstrative example

use franchise_finance_core::{
    format_iso,
    utils::{MemoryStorage, Movement},
    CashFlowQuery, CashFlowReport, Period,
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

    println!("💈 Franchise Finance Core - Cash-Flow Demonstrative\n");

    let storage = MemoryStorage::new();
    storage.set_opening_balance("centro", "caixa", BigDecimal::from(2500))?;

    for (month, d, amount) in [
        (1, 28, "-300.00"),
        (2, 3, "640.00"),
        (2, 3, "-85.50"),
        (2, 7, "1210.00"),
        (2, 10, "-1800.00"),
        (2, 14, "930.00"),
    ] {
        storage.add_movement(Movement {
            date: NaiveDate::from_ymd_opt(2025, month, d).ok_or("invalid date")?,
            unit_id: "centro".to_string(),
            account_id: "caixa".to_string(),
            amount: BigDecimal::from_str(amount)?,
        })?;
    }

    let reference = NaiveDate::from_ymd_opt(2025, 2, 18).ok_or("invalid date")?;
    let (start, end) = Period::CurrentMonth.bounds(reference);
    let query = CashFlowQuery::new(start, end)
        .for_unit("centro")
        .for_account("caixa");

    let report = CashFlowReport::generate(&storage, query).await?;

    println!("📅 {} → {}", format_iso(start), format_iso(end));
    println!("  Date        Inflow     Outflow    Net        Balance");
    for entry in report.active_days() {
        println!(
            "  {}  {:>9}  {:>9}  {:>9}  {:>9}",
            format_iso(entry.date),
            entry.inflow_total,
            entry.outflow_total,
            entry.daily_net,
            entry.cumulative_balance
        );
    }

    let summary = &report.summary;
    println!();
    println!("  Initial balance: {}", summary.initial_balance);
    println!("  Total inflow:    {}", summary.total_inflow);
    println!("  Total outflow:   {}", summary.total_outflow);
    println!("  Final balance:   {}", summary.final_balance);
    println!("  Variation:       {}% ({:?})", summary.percent_variation, summary.trend);
    println!("  Avg daily net:   {}", summary.average_daily_net);

    Ok(())
}
