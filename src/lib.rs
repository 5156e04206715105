//! # Financial Quarter Builder
//!
//! A library for turning irregular financial filings (a mix of quarterly and
//! cumulative annual disclosures, on fiscal calendars) into clean,
//! calendar-aligned quarterly series, and for deriving trailing aggregates
//! and ratios from them.
//!
//! ## Core Concepts
//!
//! - **Filing**: One disclosed period with per-statement metric values
//! - **Flow Statements**: Income and cash-flow statements; the annual filing is cumulative,
//!   so the fourth quarter is derived as annual total minus the three reported quarters
//! - **Point-in-time Statements**: Balance sheets; values are snapshots and pass through
//! - **Calendar Alignment**: Every fiscal end date is snapped to the nearest calendar quarter end
//! - **Completeness**: Every calendar year strictly inside a series must have four quarters
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_quarter_builder::*;
//!
//! let data = CompanyData::load_dir("snapshots/ACME", "ACME")?;
//! let processor = FinancialDataProcessor::new(data);
//!
//! let revenue = processor.quarterly_series(StatementKind::IncomeStatement, "revenues")?;
//! let ttm_revenue = processor.ttm_series(StatementKind::IncomeStatement, "revenues")?;
//! let margin = processor.profit_margin()?;
//! ```

pub mod completeness;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod metrics;
pub mod rolling;
pub mod schema;
pub mod snapshot;
pub mod utils;
pub mod watchlist;

#[cfg(feature = "polygon")]
pub mod polygon;

pub use completeness::{fiscal_year_completeness, usable_years};
pub use config::ProcessorConfig;
pub use engine::{reconcile_metric, QuarterReconciler};
pub use error::{FinancialDataError, Result};
pub use ingestion::{extract_metric, statement_contents, PeriodValue};
pub use metrics::{JoinedRow, NewsHeadline, PricePair, RatioRow};
pub use rolling::{trailing_avg, trailing_sum, TTM_WINDOW};
pub use schema::*;
pub use snapshot::CompanyData;
pub use utils::nearest_calendar_quarter_end;
pub use watchlist::WatchList;

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NET_INCOME_METRIC: &str = "net_income_loss_attributable_to_parent";
pub const REVENUE_METRIC: &str = "revenues";
pub const EQUITY_METRIC: &str = "equity_attributable_to_parent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueOrigin {
    /// Taken as disclosed in a quarterly filing (or a balance-sheet snapshot)
    Reported,
    /// Annual cumulative value minus the three disclosed quarters
    DerivedFourthQuarter,
    /// Sum over a trailing window of quarters
    TrailingSum,
    /// Mean over a trailing window of quarters
    TrailingAverage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeriesRow {
    /// End date as disclosed in the filing
    pub fiscal_end_date: NaiveDate,
    /// Nearest calendar quarter end to `fiscal_end_date`
    pub calendar_end_date: NaiveDate,
    pub calendar_year: i32,
    /// 1 through 4
    pub calendar_quarter: u32,
    pub value: f64,
    pub origin: ValueOrigin,
}

/// Reconciled rows for one metric, ordered by calendar end date.
pub type QuarterlySeries = Vec<MetricSeriesRow>;

pub struct FinancialDataProcessor {
    data: CompanyData,
    config: ProcessorConfig,
}

impl FinancialDataProcessor {
    pub fn new(data: CompanyData) -> Self {
        Self::with_config(data, ProcessorConfig::default())
    }

    pub fn with_config(data: CompanyData, config: ProcessorConfig) -> Self {
        info!("Creating processor for {}", data.ticker);
        Self { data, config }
    }

    pub fn ticker(&self) -> &str {
        &self.data.ticker
    }

    pub fn data(&self) -> &CompanyData {
        &self.data
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    fn financials(&self) -> Result<&[FilingSnapshot]> {
        self.data
            .financials
            .as_deref()
            .ok_or_else(|| FinancialDataError::missing("financials"))
    }

    fn details(&self) -> Result<&TickerDetails> {
        self.data
            .details
            .as_ref()
            .ok_or_else(|| FinancialDataError::missing("details"))
    }

    fn price_history(&self) -> Result<&[PriceBar]> {
        self.data
            .price_history
            .as_deref()
            .ok_or_else(|| FinancialDataError::missing("price_history"))
    }

    fn dividend_history(&self) -> Result<&[DividendRecord]> {
        self.data
            .dividend_history
            .as_deref()
            .ok_or_else(|| FinancialDataError::missing("dividend_history"))
    }

    fn earnings_dates(&self) -> Result<&[EarningsRecord]> {
        self.data
            .earnings_dates
            .as_deref()
            .ok_or_else(|| FinancialDataError::missing("earnings_dates"))
    }

    /// Statement key → metric names, as reported by the first filing.
    pub fn statement_contents(&self) -> Result<BTreeMap<String, Vec<String>>> {
        statement_contents(self.financials()?)
    }

    pub fn quarterly_series(&self, statement: StatementKind, metric: &str) -> Result<QuarterlySeries> {
        self.quarterly_series_from(statement, metric, self.config.year_from)
    }

    pub fn quarterly_series_from(
        &self,
        statement: StatementKind,
        metric: &str,
        year_from: i32,
    ) -> Result<QuarterlySeries> {
        reconcile_metric(self.financials()?, statement, metric, year_from)
    }

    /// Trailing-twelve-month sums of the reconciled series.
    pub fn ttm_series(&self, statement: StatementKind, metric: &str) -> Result<QuarterlySeries> {
        let series = self.quarterly_series(statement, metric)?;
        Ok(trailing_sum(&series, self.config.window))
    }

    /// Trailing four-quarter averages of the reconciled series.
    pub fn yearly_avg_series(&self, statement: StatementKind, metric: &str) -> Result<QuarterlySeries> {
        let series = self.quarterly_series(statement, metric)?;
        Ok(trailing_avg(&series, self.config.window))
    }

    pub fn name(&self) -> Result<&str> {
        Ok(&self.details()?.name)
    }

    pub fn market_cap(&self) -> Result<f64> {
        self.details()?
            .market_cap
            .ok_or_else(|| FinancialDataError::missing("details.market_cap"))
    }

    pub fn sic_description(&self) -> Result<&str> {
        self.details()?
            .sic_description
            .as_deref()
            .ok_or_else(|| FinancialDataError::missing("details.sic_description"))
    }

    pub fn current_and_previous_price(&self) -> Result<PricePair> {
        metrics::current_and_previous_close(self.price_history()?)
    }

    /// Net income over the latest four reconciled quarters per weighted share.
    pub fn eps(&self) -> Result<f64> {
        let shares = self
            .details()?
            .weighted_shares_outstanding
            .ok_or_else(|| FinancialDataError::missing("details.weighted_shares_outstanding"))?;

        let income = self.quarterly_series(StatementKind::IncomeStatement, NET_INCOME_METRIC)?;
        let trailing = metrics::sum_latest(&income, self.config.window, NET_INCOME_METRIC)?;
        metrics::earnings_per_share(trailing, shares)
    }

    pub fn pe(&self) -> Result<f64> {
        Ok(self.current_and_previous_price()?.current / self.eps()?)
    }

    pub fn fifty_two_week_low(&self, as_of: NaiveDate) -> Result<f64> {
        metrics::period_low(self.price_history()?, as_of, self.config.price_lookback_weeks)
    }

    pub fn fifty_two_week_high(&self, as_of: NaiveDate) -> Result<f64> {
        metrics::period_high(self.price_history()?, as_of, self.config.price_lookback_weeks)
    }

    pub fn next_report_date(&self) -> Result<NaiveDate> {
        metrics::next_report_date(self.earnings_dates()?)
    }

    pub fn earnings_history(&self) -> Result<Vec<EarningsRecord>> {
        Ok(metrics::earnings_history(self.earnings_dates()?))
    }

    pub fn ttm_profit_margin_series(&self) -> Result<Vec<RatioRow>> {
        let income = self.ttm_series(StatementKind::IncomeStatement, NET_INCOME_METRIC)?;
        let revenue = self.ttm_series(StatementKind::IncomeStatement, REVENUE_METRIC)?;
        Ok(metrics::ratio_series(&income, &revenue, self.config.ratio_decimals))
    }

    pub fn profit_margin(&self) -> Result<f64> {
        self.ttm_profit_margin_series()?
            .last()
            .map(|row| row.value)
            .ok_or_else(|| FinancialDataError::incorrect("No overlapping TTM income and revenue"))
    }

    pub fn yearly_price_change(&self) -> Result<f64> {
        metrics::price_change(self.price_history()?, self.config.price_lookback_weeks)
    }

    pub fn dividend_yield(&self) -> Result<f64> {
        let dividends = self.dividend_history()?;
        let price = self.current_and_previous_price()?.current;
        metrics::dividend_yield(dividends, price, self.config.dividend_lookback_weeks)
    }

    /// Latest TTM net income over the latest trailing-average shareholder equity.
    pub fn roe(&self) -> Result<f64> {
        let income = self.ttm_series(StatementKind::IncomeStatement, NET_INCOME_METRIC)?;
        let equity = self.yearly_avg_series(StatementKind::BalanceSheet, EQUITY_METRIC)?;
        Ok(metrics::latest_value(&income, NET_INCOME_METRIC)?
            / metrics::latest_value(&equity, EQUITY_METRIC)?)
    }

    pub fn news_headlines(&self) -> Result<Vec<NewsHeadline>> {
        let news = self
            .data
            .news
            .as_deref()
            .ok_or_else(|| FinancialDataError::missing("news"))?;
        Ok(metrics::news_headlines(news))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn filing(
        fiscal_year: i32,
        fiscal_period: &str,
        end: NaiveDate,
        income: f64,
        revenue: f64,
        equity: f64,
    ) -> FilingSnapshot {
        let timeframe = if fiscal_period == "FY" {
            Timeframe::Annual
        } else {
            Timeframe::Quarterly
        };
        let mut financials = BTreeMap::new();
        financials.insert(
            "income_statement".to_string(),
            [
                (NET_INCOME_METRIC.to_string(), MetricValue::new(income)),
                (REVENUE_METRIC.to_string(), MetricValue::new(revenue)),
            ]
            .into_iter()
            .collect(),
        );
        financials.insert(
            "balance_sheet".to_string(),
            [(EQUITY_METRIC.to_string(), MetricValue::new(equity))]
                .into_iter()
                .collect(),
        );

        FilingSnapshot {
            start_date: end,
            end_date: end,
            timeframe,
            fiscal_period: fiscal_period.to_string(),
            fiscal_year,
            financials,
            filing_date: None,
            company_name: None,
        }
    }

    /// Two calendar fiscal years: quarterly income 1..=3 / revenue 10 each, FY totals 10 / 40.
    fn calendar_filings() -> Vec<FilingSnapshot> {
        let mut filings = Vec::new();
        for year in [2023, 2022] {
            filings.push(filing(year, "FY", d(year, 12, 31), 10.0, 40.0, 100.0));
            filings.push(filing(year, "Q3", d(year, 9, 30), 3.0, 10.0, 100.0));
            filings.push(filing(year, "Q2", d(year, 6, 30), 2.0, 10.0, 100.0));
            filings.push(filing(year, "Q1", d(year, 3, 31), 1.0, 10.0, 100.0));
        }
        filings
    }

    fn processor() -> FinancialDataProcessor {
        let mut data = CompanyData::new("test");
        data.financials = Some(calendar_filings());
        data.details = Some(TickerDetails {
            name: "Test Corp".to_string(),
            ticker: Some("TEST".to_string()),
            market_cap: Some(5.0e9),
            sic_description: Some("SERVICES-PREPACKAGED SOFTWARE".to_string()),
            weighted_shares_outstanding: Some(2.0),
            share_class_shares_outstanding: None,
        });
        data.price_history = Some(vec![
            PriceBar { date: d(2023, 12, 28), open: 9.0, high: 11.0, low: 8.0, close: 10.0, volume: 1.0 },
            PriceBar { date: d(2023, 12, 29), open: 10.0, high: 12.0, low: 9.0, close: 20.0, volume: 1.0 },
        ]);
        FinancialDataProcessor::new(data)
    }

    #[test]
    fn test_missing_inputs_are_missing_attribute() {
        let processor = FinancialDataProcessor::new(CompanyData::new("none"));

        let err = processor
            .quarterly_series(StatementKind::IncomeStatement, REVENUE_METRIC)
            .unwrap_err();
        assert!(err.is_missing_attribute());
        assert!(processor.name().unwrap_err().is_missing_attribute());
        assert!(processor.dividend_yield().unwrap_err().is_missing_attribute());
        assert!(processor.next_report_date().unwrap_err().is_missing_attribute());
        assert!(processor.news_headlines().unwrap_err().is_missing_attribute());
    }

    #[test]
    fn test_quarterly_and_ttm_series() {
        let processor = processor();

        let income = processor
            .quarterly_series(StatementKind::IncomeStatement, NET_INCOME_METRIC)
            .unwrap();
        let values: Vec<f64> = income.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 1.0, 2.0, 3.0, 4.0]);

        let ttm = processor
            .ttm_series(StatementKind::IncomeStatement, NET_INCOME_METRIC)
            .unwrap();
        assert_eq!(ttm.len(), 5);
        assert!(ttm.iter().all(|r| r.value == 10.0));
    }

    #[test]
    fn test_derived_metrics() {
        let processor = processor();

        assert_eq!(processor.name().unwrap(), "Test Corp");
        assert_eq!(processor.market_cap().unwrap(), 5.0e9);
        assert_eq!(processor.eps().unwrap(), 5.0);
        assert_eq!(processor.pe().unwrap(), 4.0);
        assert_eq!(processor.profit_margin().unwrap(), 0.25);
        assert_eq!(processor.ttm_profit_margin_series().unwrap().len(), 5);
        assert_eq!(processor.roe().unwrap(), 0.1);
        assert_eq!(
            processor.current_and_previous_price().unwrap(),
            PricePair { current: 20.0, previous: 10.0 }
        );
    }

    #[test]
    fn test_year_from_config_trims_series() {
        let mut data = processor().data().clone();
        data.ticker = "TRIM".to_string();
        let config = ProcessorConfig {
            year_from: 2023,
            ..Default::default()
        };
        let processor = FinancialDataProcessor::with_config(data, config);

        let income = processor
            .quarterly_series(StatementKind::IncomeStatement, NET_INCOME_METRIC)
            .unwrap();
        assert_eq!(income.len(), 4);
        let ttm = processor
            .ttm_series(StatementKind::IncomeStatement, NET_INCOME_METRIC)
            .unwrap();
        assert_eq!(ttm.len(), 1);
    }
}
