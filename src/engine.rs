use crate::completeness::{usable_years, KNOWN_QUARTERS_PER_YEAR};
use crate::error::{FinancialDataError, Result};
use crate::ingestion::{extract_metric, PeriodValue};
use crate::schema::{FilingSnapshot, StatementBehavior, StatementKind};
use crate::utils::{calendar_quarter, nearest_calendar_quarter_end};
use crate::{MetricSeriesRow, QuarterlySeries, ValueOrigin};
use chrono::Datelike;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

pub const QUARTERS_PER_CALENDAR_YEAR: usize = 4;

pub struct QuarterReconciler {
    year_from: i32,
}

impl QuarterReconciler {
    pub fn new(year_from: i32) -> Self {
        Self { year_from }
    }

    /// Turns extracted filing rows into a calendar-aligned quarterly series.
    ///
    /// Flow statements get their annual rows replaced by the fourth quarter
    /// (annual total minus the three disclosed quarters). Point-in-time
    /// statements are passed through. Only rows from `usable_years` survive.
    /// The result is sorted by calendar end date.
    pub fn reconcile(
        &self,
        statement: StatementKind,
        rows: &[PeriodValue],
        usable_years: &[i32],
    ) -> Result<QuarterlySeries> {
        let usable: BTreeSet<i32> = usable_years.iter().copied().collect();
        debug!("Reconciling {} over fiscal years {:?}", statement, usable_years);

        let values = match statement.behavior() {
            StatementBehavior::Flow => self.derive_fourth_quarters(statement, rows, &usable)?,
            StatementBehavior::PointInTime => rows
                .iter()
                .filter(|row| usable.contains(&row.fiscal_year))
                .map(|row| (row, row.value, ValueOrigin::Reported))
                .collect(),
        };

        let mut series: QuarterlySeries = values
            .into_iter()
            .map(|(row, value, origin)| {
                let calendar_end_date = nearest_calendar_quarter_end(row.end_date);
                MetricSeriesRow {
                    fiscal_end_date: row.end_date,
                    calendar_end_date,
                    calendar_year: calendar_end_date.year(),
                    calendar_quarter: calendar_quarter(calendar_end_date),
                    value,
                    origin,
                }
            })
            .filter(|row| row.calendar_year >= self.year_from)
            .collect();

        series.sort_by_key(|row| (row.calendar_end_date, row.fiscal_end_date));

        self.validate_interior_years(statement, &series)?;

        Ok(series)
    }

    fn derive_fourth_quarters<'a>(
        &self,
        statement: StatementKind,
        rows: &'a [PeriodValue],
        usable: &BTreeSet<i32>,
    ) -> Result<Vec<(&'a PeriodValue, f64, ValueOrigin)>> {
        let mut quarter_sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
        for row in rows
            .iter()
            .filter(|r| r.is_quarterly() && usable.contains(&r.fiscal_year))
        {
            let entry = quarter_sums.entry(row.fiscal_year).or_insert((0.0, 0));
            entry.0 += row.value;
            entry.1 += 1;
        }

        let mut values = Vec::new();
        for row in rows.iter().filter(|r| quarter_sums.contains_key(&r.fiscal_year)) {
            if row.is_quarterly() {
                values.push((row, row.value, ValueOrigin::Reported));
                continue;
            }

            let (quarter_sum, count) = quarter_sums[&row.fiscal_year];
            if count != KNOWN_QUARTERS_PER_YEAR {
                let details = format!(
                    "{} fiscal year {} has an annual filing but {} quarterly filings; cannot derive the fourth quarter",
                    statement, row.fiscal_year, count
                );
                warn!("{}", details);
                return Err(FinancialDataError::IncorrectData(details));
            }

            values.push((row, row.value - quarter_sum, ValueOrigin::DerivedFourthQuarter));
        }

        Ok(values)
    }

    /// Every calendar year strictly between the first and last one must hold four rows.
    fn validate_interior_years(&self, statement: StatementKind, series: &[MetricSeriesRow]) -> Result<()> {
        let mut per_year: BTreeMap<i32, usize> = BTreeMap::new();
        for row in series {
            *per_year.entry(row.calendar_year).or_default() += 1;
        }

        let (Some(&min_year), Some(&max_year)) = (per_year.keys().next(), per_year.keys().next_back())
        else {
            return Ok(());
        };

        for year in (min_year + 1)..max_year {
            let count = per_year.get(&year).copied().unwrap_or(0);
            if count != QUARTERS_PER_CALENDAR_YEAR {
                let details = format!(
                    "{} calendar year {} has {} quarters, expected {}",
                    statement, year, count, QUARTERS_PER_CALENDAR_YEAR
                );
                warn!("{}", details);
                return Err(FinancialDataError::IncorrectData(details));
            }
        }

        Ok(())
    }
}

/// Extracts, selects usable years and reconciles one metric in a single call.
pub fn reconcile_metric(
    filings: &[FilingSnapshot],
    statement: StatementKind,
    metric: &str,
    year_from: i32,
) -> Result<QuarterlySeries> {
    let rows = extract_metric(filings, statement, metric)?;
    let years = usable_years(&rows);
    QuarterReconciler::new(year_from).reconcile(statement, &rows, &years)
}
