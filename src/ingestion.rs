use crate::error::{FinancialDataError, Result};
use crate::schema::{FilingSnapshot, StatementKind, Timeframe};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One filing's value for a single (statement, metric) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodValue {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub timeframe: Timeframe,
    pub fiscal_period: String,
    pub fiscal_year: i32,
    pub value: f64,
}

impl PeriodValue {
    pub fn is_quarterly(&self) -> bool {
        self.timeframe == Timeframe::Quarterly
    }

    pub fn is_annual(&self) -> bool {
        self.timeframe == Timeframe::Annual
    }
}

/// Flattens filings into one row per filing for `statement`/`metric`.
///
/// Filings that do not carry the statement at all are skipped, as are
/// filings with a reporting window other than quarterly or annual. A filing
/// that carries the statement but not the metric (or carries it as null)
/// makes the whole extraction fail with `IncorrectData`.
pub fn extract_metric(
    filings: &[FilingSnapshot],
    statement: StatementKind,
    metric: &str,
) -> Result<Vec<PeriodValue>> {
    let mut rows = Vec::with_capacity(filings.len());

    for filing in filings {
        if filing.timeframe == Timeframe::Other {
            debug!(
                "Skipping {} filing ending {}: unsupported timeframe",
                filing.fiscal_period, filing.end_date
            );
            continue;
        }

        let Some(metrics) = filing.statement(statement) else {
            debug!(
                "Filing {} {} does not report {}",
                filing.fiscal_year, filing.fiscal_period, statement
            );
            continue;
        };

        let value = metrics
            .get(metric)
            .and_then(|m| m.value)
            .ok_or_else(|| {
                FinancialDataError::incorrect(format!(
                    "Filing {} {} (ending {}) reports {} without '{}'",
                    filing.fiscal_year, filing.fiscal_period, filing.end_date, statement, metric
                ))
            })?;

        rows.push(PeriodValue {
            start_date: filing.start_date,
            end_date: filing.end_date,
            timeframe: filing.timeframe,
            fiscal_period: filing.fiscal_period.clone(),
            fiscal_year: filing.fiscal_year,
            value,
        });
    }

    if rows.is_empty() {
        return Err(FinancialDataError::incorrect(format!(
            "No filing reports {} / '{}'",
            statement, metric
        )));
    }

    Ok(rows)
}

/// Statements and metric names available in the first filing of the batch.
pub fn statement_contents(filings: &[FilingSnapshot]) -> Result<BTreeMap<String, Vec<String>>> {
    let first = filings
        .first()
        .ok_or_else(|| FinancialDataError::incorrect("Filing batch is empty"))?;

    Ok(first
        .financials
        .iter()
        .map(|(statement, metrics)| (statement.clone(), metrics.keys().cloned().collect()))
        .collect())
}
