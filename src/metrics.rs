//! Ratios and scalar metrics composed from reconciled series and market data.
//!
//! Every function here is a pure composition: series come from the
//! reconciler or the rolling aggregator, prices and dividends are supplied
//! by the caller. Series are combined with [`inner_join`], so only calendar
//! quarters present on both sides contribute to a ratio.

use crate::error::{FinancialDataError, Result};
use crate::schema::{DividendRecord, EarningsRecord, NewsArticle, PriceBar};
use crate::utils::{round_to, weeks_before};
use crate::MetricSeriesRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRow {
    pub calendar_end_date: NaiveDate,
    pub calendar_year: i32,
    pub calendar_quarter: u32,
    pub left: f64,
    pub right: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRow {
    pub calendar_end_date: NaiveDate,
    pub calendar_year: i32,
    pub calendar_quarter: u32,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePair {
    pub current: f64,
    pub previous: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsHeadline {
    pub title: String,
    pub url: String,
    /// Host of the article URL without a leading `www.`
    pub page: String,
}

/// Indexes a series by calendar end date. A later row wins if two rows share a date.
pub fn index_by_calendar_date(series: &[MetricSeriesRow]) -> BTreeMap<NaiveDate, &MetricSeriesRow> {
    series.iter().map(|row| (row.calendar_end_date, row)).collect()
}

/// Rows whose calendar end date appears in both series, keyed by that date.
pub fn inner_join(
    left: &[MetricSeriesRow],
    right: &[MetricSeriesRow],
) -> BTreeMap<NaiveDate, JoinedRow> {
    let right_index = index_by_calendar_date(right);

    index_by_calendar_date(left)
        .into_iter()
        .filter_map(|(date, l)| {
            right_index.get(&date).map(|r| {
                (
                    date,
                    JoinedRow {
                        calendar_end_date: date,
                        calendar_year: l.calendar_year,
                        calendar_quarter: l.calendar_quarter,
                        left: l.value,
                        right: r.value,
                    },
                )
            })
        })
        .collect()
}

/// `numerator / denominator` per shared calendar quarter, rounded to `decimals`.
///
/// Quarters where the ratio is not finite are dropped.
pub fn ratio_series(
    numerator: &[MetricSeriesRow],
    denominator: &[MetricSeriesRow],
    decimals: u32,
) -> Vec<RatioRow> {
    inner_join(numerator, denominator)
        .into_values()
        .filter_map(|joined| {
            let ratio = joined.left / joined.right;
            ratio.is_finite().then(|| RatioRow {
                calendar_end_date: joined.calendar_end_date,
                calendar_year: joined.calendar_year,
                calendar_quarter: joined.calendar_quarter,
                value: round_to(ratio, decimals),
            })
        })
        .collect()
}

pub fn latest_value(series: &[MetricSeriesRow], metric: &str) -> Result<f64> {
    series
        .iter()
        .max_by_key(|row| row.calendar_end_date)
        .map(|row| row.value)
        .ok_or_else(|| FinancialDataError::incorrect(format!("No reconciled values for {}", metric)))
}

/// Sum of the `count` most recent rows; fails when fewer are available.
pub fn sum_latest(series: &[MetricSeriesRow], count: usize, metric: &str) -> Result<f64> {
    if series.len() < count {
        return Err(FinancialDataError::incorrect(format!(
            "{} has {} quarters, {} required",
            metric,
            series.len(),
            count
        )));
    }

    let mut values: Vec<(NaiveDate, f64)> = series
        .iter()
        .map(|row| (row.calendar_end_date, row.value))
        .collect();
    values.sort_by_key(|(date, _)| *date);

    Ok(values.iter().rev().take(count).map(|(_, v)| v).sum())
}

pub fn earnings_per_share(trailing_net_income: f64, weighted_shares: f64) -> Result<f64> {
    if weighted_shares <= 0.0 {
        return Err(FinancialDataError::incorrect(format!(
            "Weighted shares outstanding must be positive, got {}",
            weighted_shares
        )));
    }
    Ok(trailing_net_income / weighted_shares)
}

fn sorted_by_date<T: Clone, K: Ord>(rows: &[T], key: impl Fn(&T) -> K) -> Vec<T> {
    let mut sorted = rows.to_vec();
    sorted.sort_by_key(key);
    sorted
}

pub fn current_and_previous_close(prices: &[PriceBar]) -> Result<PricePair> {
    let sorted = sorted_by_date(prices, |bar| bar.date);
    match sorted.as_slice() {
        [.., previous, current] => Ok(PricePair {
            current: current.close,
            previous: previous.close,
        }),
        _ => Err(FinancialDataError::incorrect(
            "Price history needs at least two trading days",
        )),
    }
}

/// Lowest `Low` over bars dated on or after `as_of - weeks`.
pub fn period_low(prices: &[PriceBar], as_of: NaiveDate, weeks: i64) -> Result<f64> {
    let since = weeks_before(as_of, weeks);
    prices
        .iter()
        .filter(|bar| bar.date >= since)
        .map(|bar| bar.low)
        .min_by(f64::total_cmp)
        .ok_or_else(|| FinancialDataError::incorrect(format!("No prices since {}", since)))
}

/// Highest `High` over bars dated on or after `as_of - weeks`.
pub fn period_high(prices: &[PriceBar], as_of: NaiveDate, weeks: i64) -> Result<f64> {
    let since = weeks_before(as_of, weeks);
    prices
        .iter()
        .filter(|bar| bar.date >= since)
        .map(|bar| bar.high)
        .max_by(f64::total_cmp)
        .ok_or_else(|| FinancialDataError::incorrect(format!("No prices since {}", since)))
}

/// Relative change between the latest close and the last close more than `weeks` earlier.
pub fn price_change(prices: &[PriceBar], weeks: i64) -> Result<f64> {
    let sorted = sorted_by_date(prices, |bar| bar.date);
    let current = sorted
        .last()
        .ok_or_else(|| FinancialDataError::incorrect("Price history is empty"))?;

    let cutoff = weeks_before(current.date, weeks);
    let past = sorted
        .iter()
        .rev()
        .find(|bar| bar.date < cutoff)
        .ok_or_else(|| {
            FinancialDataError::incorrect(format!("Price history does not reach back before {}", cutoff))
        })?;

    Ok(current.close / past.close - 1.0)
}

/// Dividends paid within `lookback_weeks` of the latest payment, divided by `price`.
///
/// Zero rows are ignored, so the window is anchored on the last payment
/// rather than on the last trading day of the table.
pub fn dividend_yield(dividends: &[DividendRecord], price: f64, lookback_weeks: i64) -> Result<f64> {
    let payments: Vec<&DividendRecord> = dividends.iter().filter(|d| d.dividends > 0.0).collect();
    let last_payment = payments
        .iter()
        .map(|d| d.date)
        .max()
        .ok_or_else(|| FinancialDataError::incorrect("Dividend history has no payments"))?;

    let since = weeks_before(last_payment, lookback_weeks);
    let trailing: f64 = payments
        .iter()
        .filter(|d| d.date > since)
        .map(|d| d.dividends)
        .sum();

    Ok(trailing / price)
}

/// The nearest announcement that has no reported EPS yet.
pub fn next_report_date(earnings: &[EarningsRecord]) -> Result<NaiveDate> {
    earnings
        .iter()
        .filter(|e| e.reported_eps.is_none())
        .map(|e| e.earnings_date)
        .min()
        .ok_or_else(|| FinancialDataError::incorrect("No upcoming earnings date"))
}

/// Earnings records, most recent first.
pub fn earnings_history(earnings: &[EarningsRecord]) -> Vec<EarningsRecord> {
    let mut history = sorted_by_date(earnings, |e| e.earnings_date);
    history.reverse();
    history
}

pub fn news_headlines(news: &[NewsArticle]) -> Vec<NewsHeadline> {
    news.iter()
        .map(|article| NewsHeadline {
            title: article.title.clone(),
            url: article.article_url.clone(),
            page: page_name(&article.article_url),
        })
        .collect()
}

fn page_name(url: &str) -> String {
    let Some((_, rest)) = url.split_once("://") else {
        return String::new();
    };
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    match rest.split_once('/') {
        Some((host, _)) => host.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValueOrigin;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(date: NaiveDate, value: f64) -> MetricSeriesRow {
        MetricSeriesRow {
            fiscal_end_date: date,
            calendar_end_date: date,
            calendar_year: chrono::Datelike::year(&date),
            calendar_quarter: crate::utils::calendar_quarter(date),
            value,
            origin: ValueOrigin::TrailingSum,
        }
    }

    fn bar(date: NaiveDate, low: f64, high: f64, close: f64) -> PriceBar {
        PriceBar {
            date,
            open: close,
            high,
            low,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn test_inner_join_keeps_only_shared_dates() {
        let left = vec![row(d(2023, 3, 31), 1.0), row(d(2023, 6, 30), 2.0)];
        let right = vec![row(d(2023, 6, 30), 20.0), row(d(2023, 9, 30), 30.0)];

        let joined = inner_join(&left, &right);
        assert_eq!(joined.len(), 1);
        let only = &joined[&d(2023, 6, 30)];
        assert_eq!((only.left, only.right), (2.0, 20.0));
        assert_eq!(only.calendar_quarter, 2);
    }

    #[test]
    fn test_ratio_series_rounds_and_drops_non_finite() {
        let income = vec![row(d(2023, 3, 31), 1.0), row(d(2023, 6, 30), 2.0)];
        let revenue = vec![row(d(2023, 3, 31), 3.0), row(d(2023, 6, 30), 0.0)];

        let margins = ratio_series(&income, &revenue, 4);
        assert_eq!(margins.len(), 1);
        assert_eq!(margins[0].value, 0.3333);
    }

    #[test]
    fn test_sum_latest_uses_most_recent_rows() {
        let series: Vec<MetricSeriesRow> = [(2022, 12, 31, 1.0), (2023, 3, 31, 2.0), (2023, 6, 30, 3.0)]
            .iter()
            .map(|&(y, m, day, v)| row(d(y, m, day), v))
            .collect();

        assert_eq!(sum_latest(&series, 2, "net income").unwrap(), 5.0);
        assert!(sum_latest(&series, 4, "net income").unwrap_err().is_incorrect_data());
        assert_eq!(latest_value(&series, "net income").unwrap(), 3.0);
        assert!(latest_value(&[], "net income").is_err());
    }

    #[test]
    fn test_earnings_per_share_requires_shares() {
        assert_eq!(earnings_per_share(100.0, 50.0).unwrap(), 2.0);
        assert!(earnings_per_share(100.0, 0.0).is_err());
    }

    #[test]
    fn test_price_metrics() {
        let prices = vec![
            bar(d(2022, 9, 1), 5.0, 60.0, 50.0),
            bar(d(2022, 10, 3), 40.0, 55.0, 45.0),
            bar(d(2023, 9, 29), 90.0, 110.0, 100.0),
            bar(d(2023, 10, 2), 95.0, 120.0, 99.0),
        ];

        let pair = current_and_previous_close(&prices).unwrap();
        assert_eq!(pair, PricePair { current: 99.0, previous: 100.0 });

        let as_of = d(2023, 10, 2);
        assert_eq!(period_low(&prices, as_of, 52).unwrap(), 40.0);
        assert_eq!(period_high(&prices, as_of, 52).unwrap(), 120.0);

        // 52 weeks before 2023-10-02 is 2022-10-03; the last close strictly before is 50.0.
        let change = price_change(&prices, 52).unwrap();
        assert!((change - (99.0 / 50.0 - 1.0)).abs() < 1e-12);

        assert!(current_and_previous_close(&prices[..1]).is_err());
        assert!(price_change(&prices[2..], 52).is_err());
    }

    #[test]
    fn test_dividend_yield_sums_recent_payments() {
        let dividends = vec![
            DividendRecord { date: d(2022, 8, 1), dividends: 5.0 },
            DividendRecord { date: d(2022, 12, 1), dividends: 0.5 },
            DividendRecord { date: d(2023, 3, 1), dividends: 0.5 },
            DividendRecord { date: d(2023, 6, 1), dividends: 0.0 },
            DividendRecord { date: d(2023, 10, 2), dividends: 0.0 },
        ];

        // The last payment is 2023-03-01, so the August 2022 one is still in range.
        let yield_ = dividend_yield(&dividends, 50.0, 50).unwrap();
        assert!((yield_ - 0.12).abs() < 1e-12);
        assert!(dividend_yield(&[], 50.0, 50).is_err());
        assert!(dividend_yield(&dividends[3..], 50.0, 50).is_err());
    }

    #[test]
    fn test_dividend_window_ends_at_last_payment_not_last_row() {
        let payment_dates = [d(2022, 12, 15), d(2023, 3, 15), d(2023, 6, 15), d(2023, 9, 15)];
        let mut dividends = Vec::new();
        let mut date = d(2022, 12, 1);
        while date <= d(2023, 12, 29) {
            let paid = if payment_dates.contains(&date) { 0.5 } else { 0.0 };
            dividends.push(DividendRecord { date, dividends: paid });
            date = date.succ_opt().unwrap();
        }

        let yield_ = dividend_yield(&dividends, 100.0, 50).unwrap();
        assert!((yield_ - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_next_report_date_and_history() {
        let earnings = vec![
            EarningsRecord {
                earnings_date: d(2024, 4, 25),
                eps_estimate: Some(1.5),
                reported_eps: None,
                surprise_pct: None,
            },
            EarningsRecord {
                earnings_date: d(2024, 1, 30),
                eps_estimate: Some(1.6),
                reported_eps: None,
                surprise_pct: None,
            },
            EarningsRecord {
                earnings_date: d(2023, 10, 24),
                eps_estimate: Some(1.45),
                reported_eps: Some(1.55),
                surprise_pct: Some(6.9),
            },
        ];

        assert_eq!(next_report_date(&earnings).unwrap(), d(2024, 1, 30));
        let history = earnings_history(&earnings);
        assert_eq!(history[0].earnings_date, d(2024, 4, 25));
        assert_eq!(history[2].earnings_date, d(2023, 10, 24));
        assert!(next_report_date(&earnings[2..]).is_err());
    }

    #[test]
    fn test_news_headlines_extract_page() {
        let news = vec![
            NewsArticle {
                title: "Earnings beat".to_string(),
                article_url: "https://www.example.com/markets/1".to_string(),
                published_utc: None,
            },
            NewsArticle {
                title: "Odd link".to_string(),
                article_url: "https://news.example.org".to_string(),
                published_utc: None,
            },
        ];

        let headlines = news_headlines(&news);
        assert_eq!(headlines[0].page, "example.com");
        assert_eq!(headlines[1].page, "");
    }
}
