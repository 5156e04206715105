use dotenv::dotenv;
use financial_quarter_builder::polygon::{PolygonClient, PolygonConfig};
use financial_quarter_builder::{FinancialDataProcessor, StatementKind, REVENUE_METRIC};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let ticker = std::env::args().nth(1).unwrap_or_else(|| "MSFT".to_string());
    let client = PolygonClient::new(PolygonConfig::from_env()?);

    println!("🔍 Checking {}...", ticker);
    if !client.check_ticker_validity(&ticker).await? {
        println!("❌ {} is not an active stock ticker", ticker);
        return Ok(());
    }

    let data = client.fetch_company(&ticker).await?;
    println!(
        "✅ Fetched {} filings for {}\n",
        data.financials.as_ref().map_or(0, Vec::len),
        data.ticker
    );

    let out_dir = std::env::var("SNAPSHOT_DIR").unwrap_or_else(|_| format!("snapshots/{}", data.ticker));
    data.save_dir(&out_dir)?;
    println!("💾 Saved snapshot to {}\n", out_dir);

    let processor = FinancialDataProcessor::new(data);
    match processor.ttm_series(StatementKind::IncomeStatement, REVENUE_METRIC) {
        Ok(series) => {
            println!("📈 TTM revenue:");
            for row in series {
                println!(
                    "  {}Q{} ({}): {:>18.2}",
                    row.calendar_year, row.calendar_quarter, row.calendar_end_date, row.value
                );
            }
        }
        Err(e) => println!("⚠️  Could not reconcile revenue: {}", e),
    }

    Ok(())
}
