use chrono::{Datelike, Duration, NaiveDate};

/// Calendar quarter-end candidates for a date in `year`, in tie-break order.
///
/// The prior year's December 31 is included so that January and early
/// February dates can snap back to the previous year end.
pub fn quarter_end_candidates(year: i32) -> Vec<NaiveDate> {
    [
        (year, 9, 30),
        (year, 6, 30),
        (year, 3, 31),
        (year, 12, 31),
        (year - 1, 12, 31),
    ]
    .into_iter()
    .filter_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
    .collect()
}

/// Maps a fiscal period end date to the closest calendar quarter end.
///
/// Distance is measured in whole days. When two candidates are equally
/// close the one listed first by [`quarter_end_candidates`] wins.
///
/// # Examples
/// - 2022-12-15 → 2022-12-31
/// - 2023-02-05 → 2022-12-31
/// - 2023-09-05 → 2023-09-30
pub fn nearest_calendar_quarter_end(date: NaiveDate) -> NaiveDate {
    quarter_end_candidates(date.year())
        .into_iter()
        .min_by_key(|candidate| (date - *candidate).num_days().abs())
        .unwrap_or(date)
}

/// 1-based calendar quarter of a date.
pub fn calendar_quarter(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

pub fn weeks_before(date: NaiveDate, weeks: i64) -> NaiveDate {
    date.checked_sub_signed(Duration::weeks(weeks))
        .unwrap_or(NaiveDate::MIN)
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
