use crate::ingestion::PeriodValue;
use std::collections::{BTreeMap, BTreeSet};

/// Number of quarterly disclosures that make a fiscal year's fourth quarter derivable.
pub const KNOWN_QUARTERS_PER_YEAR: usize = 3;

/// Fiscal year → whether exactly three distinct quarterly periods were disclosed.
///
/// Only quarterly rows are considered, so a year that was disclosed solely
/// through its annual filing does not appear in the map.
pub fn fiscal_year_completeness(rows: &[PeriodValue]) -> BTreeMap<i32, bool> {
    let mut periods: BTreeMap<i32, BTreeSet<&str>> = BTreeMap::new();

    for row in rows.iter().filter(|r| r.is_quarterly()) {
        periods
            .entry(row.fiscal_year)
            .or_default()
            .insert(row.fiscal_period.as_str());
    }

    periods
        .into_iter()
        .map(|(year, labels)| (year, labels.len() == KNOWN_QUARTERS_PER_YEAR))
        .collect()
}

/// Fiscal years usable for reconciliation, most recent first.
///
/// The most recent year is always kept so the latest partial year still
/// surfaces. Older years are collected while they are complete; the scan
/// stops at the first incomplete one.
pub fn usable_years(rows: &[PeriodValue]) -> Vec<i32> {
    let mut years = Vec::new();

    for (idx, (year, complete)) in fiscal_year_completeness(rows).into_iter().rev().enumerate() {
        if complete || idx == 0 {
            years.push(year);
        } else {
            break;
        }
    }

    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Timeframe;
    use chrono::NaiveDate;

    fn quarter(fiscal_year: i32, label: &str) -> PeriodValue {
        PeriodValue {
            start_date: NaiveDate::from_ymd_opt(fiscal_year, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(fiscal_year, 3, 31).unwrap(),
            timeframe: Timeframe::Quarterly,
            fiscal_period: label.to_string(),
            fiscal_year,
            value: 1.0,
        }
    }

    fn annual(fiscal_year: i32) -> PeriodValue {
        PeriodValue {
            timeframe: Timeframe::Annual,
            fiscal_period: "FY".to_string(),
            ..quarter(fiscal_year, "FY")
        }
    }

    #[test]
    fn test_usable_years_stop_at_first_gap() {
        let rows = vec![
            quarter(2023, "Q1"),
            quarter(2023, "Q2"),
            quarter(2022, "Q1"),
            quarter(2022, "Q2"),
            quarter(2022, "Q3"),
            annual(2022),
            quarter(2021, "Q1"),
            quarter(2021, "Q2"),
            quarter(2021, "Q3"),
            annual(2021),
            quarter(2020, "Q1"),
            quarter(2020, "Q2"),
            annual(2020),
            quarter(2019, "Q1"),
            quarter(2019, "Q2"),
            quarter(2019, "Q3"),
        ];

        assert_eq!(usable_years(&rows), vec![2023, 2022, 2021]);
    }

    #[test]
    fn test_complete_latest_year_is_kept_like_any_other() {
        let rows = vec![
            quarter(2023, "Q1"),
            quarter(2023, "Q2"),
            quarter(2023, "Q3"),
            quarter(2022, "Q1"),
        ];

        assert_eq!(usable_years(&rows), vec![2023]);
    }

    #[test]
    fn test_four_quarterly_disclosures_do_not_qualify() {
        let rows = vec![
            quarter(2023, "Q1"),
            quarter(2022, "Q1"),
            quarter(2022, "Q2"),
            quarter(2022, "Q3"),
            quarter(2022, "Q4"),
        ];

        let completeness = fiscal_year_completeness(&rows);
        assert!(!completeness[&2022]);
        assert_eq!(usable_years(&rows), vec![2023]);
    }

    #[test]
    fn test_duplicate_labels_count_once() {
        let rows = vec![
            quarter(2022, "Q1"),
            quarter(2022, "Q1"),
            quarter(2022, "Q2"),
            quarter(2022, "Q3"),
        ];

        assert!(fiscal_year_completeness(&rows)[&2022]);
    }

    #[test]
    fn test_no_quarterly_rows_means_no_usable_years() {
        assert!(usable_years(&[annual(2022)]).is_empty());
    }
}
