use crate::error::FinancialDataError;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    #[schemars(description = "Income statement (flow): revenues, costs, net income over a period")]
    IncomeStatement,

    #[schemars(description = "Cash flow statement (flow): cash movements over a period")]
    CashFlowStatement,

    #[schemars(description = "Balance sheet (point-in-time): assets, liabilities and equity on a date")]
    BalanceSheet,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum StatementBehavior {
    /// Annual figures are the sum of the quarters, so Q4 can be derived by subtraction.
    Flow,
    /// Figures are snapshots and are never summed across quarters.
    PointInTime,
}

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [
        StatementKind::IncomeStatement,
        StatementKind::CashFlowStatement,
        StatementKind::BalanceSheet,
    ];

    /// Key used for this statement inside a filing's `financials` map.
    pub fn as_key(&self) -> &'static str {
        match self {
            StatementKind::IncomeStatement => "income_statement",
            StatementKind::CashFlowStatement => "cash_flow_statement",
            StatementKind::BalanceSheet => "balance_sheet",
        }
    }

    pub fn behavior(&self) -> StatementBehavior {
        match self {
            StatementKind::IncomeStatement | StatementKind::CashFlowStatement => {
                StatementBehavior::Flow
            }
            StatementKind::BalanceSheet => StatementBehavior::PointInTime,
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl FromStr for StatementKind {
    type Err = FinancialDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatementKind::ALL
            .into_iter()
            .find(|kind| kind.as_key() == s)
            .ok_or_else(|| FinancialDataError::incorrect(format!("Unknown statement kind '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[schemars(description = "The filing covers a single fiscal quarter")]
    Quarterly,

    #[schemars(description = "The filing covers the whole fiscal year (cumulative figures for flow statements)")]
    Annual,

    #[serde(other)]
    #[schemars(description = "Any other reporting window (e.g. trailing twelve months); ignored by reconciliation")]
    Other,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct MetricValue {
    #[serde(default)]
    #[schemars(description = "Numeric value of the metric. Null is treated as not reported.")]
    pub value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl MetricValue {
    pub fn new(value: f64) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }
}

/// Metric name → value, for one statement of one filing.
pub type StatementMetrics = BTreeMap<String, MetricValue>;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FilingSnapshot {
    #[schemars(description = "First day of the fiscal period covered by the filing (YYYY-MM-DD)")]
    pub start_date: NaiveDate,

    #[schemars(description = "Last day of the fiscal period covered by the filing (YYYY-MM-DD)")]
    pub end_date: NaiveDate,

    #[schemars(description = "Reporting granularity of the filing")]
    pub timeframe: Timeframe,

    #[schemars(description = "Fiscal period label, e.g. Q1, Q2, Q3 or FY")]
    pub fiscal_period: String,

    #[serde(deserialize_with = "deserialize_fiscal_year")]
    #[schemars(description = "Fiscal year the period belongs to. Accepts a number or a numeric string.")]
    pub fiscal_year: i32,

    #[schemars(
        description = "Statement key (income_statement, cash_flow_statement, balance_sheet, ...) → metric name → value"
    )]
    pub financials: BTreeMap<String, StatementMetrics>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filing_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

impl FilingSnapshot {
    pub fn statement(&self, kind: StatementKind) -> Option<&StatementMetrics> {
        self.financials.get(kind.as_key())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FilingSnapshot)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

fn deserialize_fiscal_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawYear {
        Number(i32),
        Text(String),
    }

    match RawYear::deserialize(deserializer)? {
        RawYear::Number(year) => Ok(year),
        RawYear::Text(text) => text
            .trim()
            .parse::<i32>()
            .map_err(|_| serde::de::Error::custom(format!("invalid fiscal year '{}'", text))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TickerDetails {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Standard Industrial Classification description")]
    pub sic_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_shares_outstanding: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_class_shares_outstanding: Option<f64>,
}

/// One trading day of the daily price table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DividendRecord {
    pub date: NaiveDate,
    #[schemars(description = "Dividend paid on the date; zero on days without a payment")]
    pub dividends: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct EarningsRecord {
    #[serde(rename = "Earnings Date")]
    pub earnings_date: NaiveDate,

    #[serde(rename = "EPS Estimate", default)]
    pub eps_estimate: Option<f64>,

    #[serde(rename = "Reported EPS", default)]
    #[schemars(description = "Null for announcements that have not happened yet")]
    pub reported_eps: Option<f64>,

    #[serde(rename = "Surprise(%)", default)]
    pub surprise_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct NewsArticle {
    pub title: String,
    pub article_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_utc: Option<String>,
}
