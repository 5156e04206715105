use crate::rolling::TTM_WINDOW;
use serde::{Deserialize, Serialize};

/// Default first calendar year kept in reconciled series.
pub const DEFAULT_YEAR_FROM: i32 = 2018;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Calendar years before this are dropped after quarter mapping.
    pub year_from: i32,
    /// Number of quarters in trailing sums and averages.
    pub window: usize,
    /// How far back dividends count towards the trailing yield.
    pub dividend_lookback_weeks: i64,
    /// Span used for the 52-week range and the yearly price change.
    pub price_lookback_weeks: i64,
    /// Decimal places kept on ratio series.
    pub ratio_decimals: u32,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            year_from: DEFAULT_YEAR_FROM,
            window: TTM_WINDOW,
            dividend_lookback_weeks: 50,
            price_lookback_weeks: 52,
            ratio_decimals: 4,
        }
    }
}
