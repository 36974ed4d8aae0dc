use sea_orm::DbErr;
use thiserror::Error;

/// Failures that end a scrape run.
///
/// Row-level parse problems never show up here: a bad row is dropped and the
/// run carries on.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("transport failure after {attempts} attempt(s): {reason}")]
    Transport { attempts: u32, reason: String },

    #[error("interrupted while waiting to retry")]
    Interrupted,

    #[error("page structure not found: {0}")]
    StructureNotFound(&'static str),

    #[error("persistence error: {0}")]
    Persistence(#[from] DbErr),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
