use crate::error::{FinancialDataError, Result};
use crate::polygon::types::*;
use crate::schema::{FilingSnapshot, NewsArticle, TickerDetails};
use crate::snapshot::CompanyData;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

#[derive(Clone)]
pub struct PolygonClient {
    client: Client,
    config: PolygonConfig,
}

impl PolygonClient {
    pub fn new(config: PolygonConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn financials_url(&self, ticker: &str) -> String {
        format!(
            "{}vX/reference/financials?ticker={}&filing_date.gte=2010-10-01&limit=100",
            self.config.base_url,
            ticker.to_uppercase()
        )
    }

    pub fn details_url(&self, ticker: &str) -> String {
        format!("{}v3/reference/tickers/{}", self.config.base_url, ticker.to_uppercase())
    }

    pub fn news_url(&self, ticker: &str) -> String {
        format!(
            "{}v2/reference/news?ticker={}&limit=10&sort=published_utc",
            self.config.base_url,
            ticker.to_uppercase()
        )
    }

    pub fn validity_url(&self, ticker: &str) -> String {
        format!(
            "{}v3/reference/tickers?ticker={}&market=stocks&active=true&limit=1",
            self.config.base_url,
            ticker.to_uppercase()
        )
    }

    /// GETs `url`, retrying rate-limited responses up to `max_retries` times.
    async fn get_envelope(&self, url: &str) -> Result<PolygonEnvelope> {
        let mut attempt = 0;

        loop {
            let res = self
                .client
                .get(url)
                .bearer_auth(&self.config.api_key)
                .send()
                .await?;

            if res.status() == StatusCode::TOO_MANY_REQUESTS {
                let body: serde_json::Value = res.json().await.unwrap_or_default();
                let message = body
                    .get("error")
                    .and_then(|v| v.as_str())
                    .unwrap_or("You have reached the API limit")
                    .to_string();

                if attempt >= self.config.max_retries {
                    return Err(FinancialDataError::LimitReached(message));
                }

                attempt += 1;
                warn!(
                    "Rate limited by Polygon (attempt {}/{}): {}",
                    attempt, self.config.max_retries, message
                );
                sleep(self.config.retry_delay * attempt).await;
                continue;
            }

            return Ok(res.json().await?);
        }
    }

    async fn request_results<T: DeserializeOwned>(&self, ticker: &str, url: &str) -> Result<T> {
        debug!("Requesting {}", url);
        let envelope = self.get_envelope(url).await?;

        if envelope.is_not_found() {
            return Err(FinancialDataError::TickerNotFound(ticker.to_uppercase()));
        }

        let results = envelope.results.unwrap_or_default();
        Ok(serde_json::from_value(results)?)
    }

    pub async fn fetch_financials(&self, ticker: &str) -> Result<Vec<FilingSnapshot>> {
        self.request_results(ticker, &self.financials_url(ticker)).await
    }

    pub async fn fetch_ticker_details(&self, ticker: &str) -> Result<TickerDetails> {
        self.request_results(ticker, &self.details_url(ticker)).await
    }

    pub async fn fetch_news(&self, ticker: &str) -> Result<Vec<NewsArticle>> {
        self.request_results(ticker, &self.news_url(ticker)).await
    }

    /// True when exactly one active stock matches `ticker`.
    pub async fn check_ticker_validity(&self, ticker: &str) -> Result<bool> {
        let envelope = self.get_envelope(&self.validity_url(ticker)).await?;
        Ok(matches!(
            envelope.results,
            Some(serde_json::Value::Array(ref items)) if items.len() == 1
        ))
    }

    /// Fetches details, filings and news concurrently.
    ///
    /// Price, dividend and earnings tables are not served by Polygon here and
    /// are left unset.
    pub async fn fetch_company(&self, ticker: &str) -> Result<CompanyData> {
        let (details, financials, news) = futures::try_join!(
            self.fetch_ticker_details(ticker),
            self.fetch_financials(ticker),
            self.fetch_news(ticker),
        )?;

        let mut data = CompanyData::new(ticker);
        data.details = Some(details);
        data.financials = Some(financials);
        data.news = Some(news);
        Ok(data)
    }
}
