use thiserror::Error;

/// Errors raised while loading or checking settings.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A setting holds a value the library cannot work with.
    #[error("Setting {key} is invalid: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    /// Only iCalendar 2.0 is produced.
    #[error("Unsupported iCalendar version {0}; only 2.0 is written")]
    UnsupportedVersion(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key,
            reason: reason.into(),
        }
    }
}
