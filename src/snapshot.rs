use crate::error::Result;
use crate::schema::{
    DividendRecord, EarningsRecord, FilingSnapshot, NewsArticle, PriceBar, TickerDetails,
};
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DETAILS_FILE: &str = "details.json";
pub const FINANCIALS_FILE: &str = "financials.json";
pub const NEWS_FILE: &str = "news.json";
pub const PRICE_HISTORY_FILE: &str = "price_hist.json";
pub const DIVIDEND_HISTORY_FILE: &str = "dividend_hist.json";
pub const EARNINGS_DATES_FILE: &str = "earning_dates.json";

/// Everything the engine knows about one identifier.
///
/// Each field is populated by an external collaborator; `None` means the
/// data was never fetched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyData {
    pub ticker: String,
    pub financials: Option<Vec<FilingSnapshot>>,
    pub details: Option<TickerDetails>,
    pub price_history: Option<Vec<PriceBar>>,
    pub dividend_history: Option<Vec<DividendRecord>>,
    pub earnings_dates: Option<Vec<EarningsRecord>>,
    pub news: Option<Vec<NewsArticle>>,
}

impl CompanyData {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into().to_uppercase(),
            ..Default::default()
        }
    }

    /// Reads a snapshot directory. Files that do not exist leave their field unset.
    pub fn load_dir(dir: impl AsRef<Path>, ticker: impl Into<String>) -> Result<Self> {
        let dir = dir.as_ref();
        debug!("Loading company snapshot from {}", dir.display());

        Ok(Self {
            financials: read_optional(&dir.join(FINANCIALS_FILE))?,
            details: read_optional(&dir.join(DETAILS_FILE))?,
            price_history: read_optional(&dir.join(PRICE_HISTORY_FILE))?,
            dividend_history: read_optional(&dir.join(DIVIDEND_HISTORY_FILE))?,
            earnings_dates: read_optional(&dir.join(EARNINGS_DATES_FILE))?,
            news: read_optional(&dir.join(NEWS_FILE))?,
            ..Self::new(ticker)
        })
    }

    /// Writes the populated fields in the layout [`CompanyData::load_dir`] reads.
    pub fn save_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        write_optional(&dir.join(FINANCIALS_FILE), &self.financials)?;
        write_optional(&dir.join(DETAILS_FILE), &self.details)?;
        write_optional(&dir.join(PRICE_HISTORY_FILE), &self.price_history)?;
        write_optional(&dir.join(DIVIDEND_HISTORY_FILE), &self.dividend_history)?;
        write_optional(&dir.join(EARNINGS_DATES_FILE), &self.earnings_dates)?;
        write_optional(&dir.join(NEWS_FILE), &self.news)?;

        Ok(())
    }
}

fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

fn write_optional<T: Serialize>(path: &Path, value: &Option<T>) -> Result<()> {
    if let Some(value) = value {
        fs::write(path, serde_json::to_string_pretty(value)?)?;
    }
    Ok(())
}
