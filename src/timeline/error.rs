use thiserror::Error;

use crate::models::PrayerType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time '{input}': expected HH:MM with hours 00-23 and minutes 00-59")]
pub struct TimeFormatError {
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("missing {0} time")]
    Missing(PrayerType),
    #[error("bad {prayer} time: {source}")]
    Format {
        prayer: PrayerType,
        #[source]
        source: TimeFormatError,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("fetch failed: {0}")]
    Fetch(#[source] rusqlite::Error),
    #[error("write failed: {0}")]
    Mutation(#[source] rusqlite::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
