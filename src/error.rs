use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinancialDataError {
    /// The disclosed data is structurally unusable for the requested metric.
    #[error("Incorrect data: {0}")]
    IncorrectData(String),

    /// An entry point was called before the data it depends on was supplied.
    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "polygon")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[cfg(feature = "polygon")]
    #[error("API request limit reached: {0}")]
    LimitReached(String),

    #[cfg(feature = "polygon")]
    #[error("Ticker not found: {0}")]
    TickerNotFound(String),
}

impl FinancialDataError {
    pub fn incorrect(details: impl Into<String>) -> Self {
        Self::IncorrectData(details.into())
    }

    pub fn missing(attribute: impl Into<String>) -> Self {
        Self::MissingAttribute(attribute.into())
    }

    pub fn is_incorrect_data(&self) -> bool {
        matches!(self, Self::IncorrectData(_))
    }

    pub fn is_missing_attribute(&self) -> bool {
        matches!(self, Self::MissingAttribute(_))
    }
}

pub type Result<T> = std::result::Result<T, FinancialDataError>;
