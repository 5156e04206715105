use chrono::Local;
use dotenv::dotenv;
use financial_quarter_builder::{
    CompanyData, FinancialDataProcessor, MetricSeriesRow, StatementKind, EQUITY_METRIC,
    REVENUE_METRIC,
};
use std::error::Error;

fn print_series(title: &str, series: &[MetricSeriesRow]) {
    println!("\n{}", title);
    println!("{:<12} {:<12} {:>6} {:>18}  {}", "fiscal", "calendar", "qtr", "value", "origin");
    for row in series {
        println!(
            "{:<12} {:<12} {:>4}Q{} {:>18.2}  {:?}",
            row.fiscal_end_date.to_string(),
            row.calendar_end_date.to_string(),
            row.calendar_year,
            row.calendar_quarter,
            row.value,
            row.origin
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    // SNAPSHOT_DIR points at a directory holding financials.json, details.json, ...
    let dir = std::env::var("SNAPSHOT_DIR").unwrap_or_else(|_| {
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/ACME").to_string()
    });
    let ticker = std::env::var("TICKER").unwrap_or_else(|_| "ACME".to_string());

    println!("📊 Quarterly report for {} from {}\n", ticker, dir);

    let data = CompanyData::load_dir(&dir, &ticker)?;
    let processor = FinancialDataProcessor::new(data);

    println!("📋 Statements:");
    for (statement, metrics) in processor.statement_contents()? {
        println!("  {}: {} metrics", statement, metrics.len());
    }

    let revenue = processor.quarterly_series(StatementKind::IncomeStatement, REVENUE_METRIC)?;
    print_series("💰 Revenue (calendar quarters)", &revenue);

    let ttm = processor.ttm_series(StatementKind::IncomeStatement, REVENUE_METRIC)?;
    print_series("📈 TTM revenue", &ttm);

    let equity = processor.yearly_avg_series(StatementKind::BalanceSheet, EQUITY_METRIC)?;
    print_series("🏦 Average equity", &equity);

    println!("\n🔎 Metrics:");
    match processor.name() {
        Ok(name) => println!("  Name:            {}", name),
        Err(e) => println!("  Name:            unavailable ({})", e),
    }
    match processor.eps() {
        Ok(eps) => println!("  EPS:             {:.2}", eps),
        Err(e) => println!("  EPS:             unavailable ({})", e),
    }
    match processor.pe() {
        Ok(pe) => println!("  P/E:             {:.2}", pe),
        Err(e) => println!("  P/E:             unavailable ({})", e),
    }
    match processor.profit_margin() {
        Ok(margin) => println!("  Profit margin:   {:.2}%", margin * 100.0),
        Err(e) => println!("  Profit margin:   unavailable ({})", e),
    }
    match processor.roe() {
        Ok(roe) => println!("  ROE:             {:.2}%", roe * 100.0),
        Err(e) => println!("  ROE:             unavailable ({})", e),
    }
    match processor.dividend_yield() {
        Ok(dy) => println!("  Dividend yield:  {:.2}%", dy * 100.0),
        Err(e) => println!("  Dividend yield:  unavailable ({})", e),
    }
    match processor.yearly_price_change() {
        Ok(change) => println!("  1y change:       {:.2}%", change * 100.0),
        Err(e) => println!("  1y change:       unavailable ({})", e),
    }

    let today = Local::now().date_naive();
    if let (Ok(low), Ok(high)) = (
        processor.fifty_two_week_low(today),
        processor.fifty_two_week_high(today),
    ) {
        println!("  52w range:       {:.2} - {:.2}", low, high);
    }

    if let Ok(date) = processor.next_report_date() {
        println!("  Next report:     {}", date);
    }

    if let Ok(headlines) = processor.news_headlines() {
        println!("\n📰 News:");
        for headline in headlines {
            println!("  [{}] {}", headline.page, headline.title);
        }
    }

    Ok(())
}
