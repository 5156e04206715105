use crate::error::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Saved identifiers, stored as a JSON array of upper-case strings.
#[derive(Debug, Clone)]
pub struct WatchList {
    path: PathBuf,
}

impl WatchList {
    /// Opens the list at `path`, creating an empty one if the file is missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, "[]")?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tickers(&self) -> Result<Vec<String>> {
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn contains(&self, ticker: &str) -> Result<bool> {
        let ticker = ticker.to_uppercase();
        Ok(self.tickers()?.contains(&ticker))
    }

    /// Adds `ticker` (upper-cased). Returns `false` if it was already present.
    pub fn add(&self, ticker: &str) -> Result<bool> {
        let ticker = ticker.to_uppercase();
        let mut tickers = self.tickers()?;
        if tickers.contains(&ticker) {
            return Ok(false);
        }

        tickers.push(ticker.clone());
        self.write(&tickers)?;
        info!("Added {} to watch list", ticker);
        Ok(true)
    }

    /// Removes `ticker`. Returns `false` if it was not on the list.
    pub fn remove(&self, ticker: &str) -> Result<bool> {
        let ticker = ticker.to_uppercase();
        let mut tickers = self.tickers()?;
        let before = tickers.len();
        tickers.retain(|t| *t != ticker);
        if tickers.len() == before {
            return Ok(false);
        }

        self.write(&tickers)?;
        info!("Removed {} from watch list", ticker);
        Ok(true)
    }

    fn write(&self, tickers: &[String]) -> Result<()> {
        fs::write(&self.path, serde_json::to_string_pretty(tickers)?)?;
        Ok(())
    }
}
