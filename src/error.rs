//! Error types for every stage of the chart pipeline
//!
//! Each module reports its own enum; [`GovGraphError`] collects them for
//! callers that drive several stages at once (the CLI, the HTTP layer).

use thiserror::Error;

/// The inference engine could not produce a preview
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error("No preview available: the input has no rows")]
    NoData,
}

/// A chart definition failed validation before entering the store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown sector '{0}'")]
    UnknownSector(String),

    #[error("Unknown chart type '{0}'")]
    UnknownKind(String),

    #[error("Chart title cannot be empty")]
    EmptyTitle,

    #[error("Chart has no data")]
    MissingSeries,

    #[error("Dataset '{label}' has {values} values for {labels} labels")]
    MisalignedSeries {
        label: String,
        values: usize,
        labels: usize,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode charts: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Storage backend lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse spreadsheet: {0}")]
    Excel(#[from] calamine::Error),

    #[error("No sheets found in Excel file")]
    NoSheets,

    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("File has no extension")]
    MissingExtension,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider for {sector} failed: {message}")]
    Failed { sector: String, message: String },
}

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Backup I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backup payload is not a chart list: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Backup contains an invalid chart '{id}': {source}")]
    InvalidChart {
        id: String,
        #[source]
        source: ValidationError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Errors from calls to upstream HTTP sources
#[cfg(feature = "web")]
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("DATA_GOV_API_KEY not configured")]
    MissingApiKey,

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Refusing to fetch from non-public address {0}")]
    Blocked(String),

    #[error("Could not resolve host: {0}")]
    Resolve(#[from] std::io::Error),

    #[error("Upstream response exceeds {0} bytes")]
    TooLarge(usize),

    #[error("Upstream response is not JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(feature = "web")]
impl UpstreamError {
    /// True when the request itself was refused before anything was sent
    pub fn is_rejected_request(&self) -> bool {
        matches!(self, UpstreamError::InvalidUrl(_) | UpstreamError::Blocked(_))
    }
}

#[derive(Debug, Error)]
pub enum GovGraphError {
    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[cfg(feature = "web")]
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
