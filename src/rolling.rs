use crate::{MetricSeriesRow, QuarterlySeries, ValueOrigin};

/// Number of quarters in a trailing-twelve-month window.
pub const TTM_WINDOW: usize = 4;

/// Trailing sum over the last `window` rows (TTM when `window == 4`).
///
/// Rows without a full window behind them produce no output.
pub fn trailing_sum(series: &[MetricSeriesRow], window: usize) -> QuarterlySeries {
    rolling(series, window, ValueOrigin::TrailingSum, |values| {
        values.iter().sum()
    })
}

/// Trailing mean over the last `window` rows.
pub fn trailing_avg(series: &[MetricSeriesRow], window: usize) -> QuarterlySeries {
    rolling(series, window, ValueOrigin::TrailingAverage, |values| {
        values.iter().sum::<f64>() / values.len() as f64
    })
}

fn rolling<F>(series: &[MetricSeriesRow], window: usize, origin: ValueOrigin, aggregate: F) -> QuarterlySeries
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return Vec::new();
    }

    let mut sorted = series.to_vec();
    sorted.sort_by_key(|row| row.calendar_end_date);

    let values: Vec<f64> = sorted.iter().map(|row| row.value).collect();

    values
        .windows(window)
        .zip(sorted.iter().skip(window - 1))
        .map(|(slice, row)| MetricSeriesRow {
            value: aggregate(slice),
            origin,
            ..row.clone()
        })
        .collect()
}
