use thiserror::Error;

/// Errors surfaced by the configuration and settings layers.
///
/// The generation loop itself has no failure points; validation happens in
/// the setters, which leave state untouched when they reject.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A configuration value (or previously stored state) is out of range.
    #[error("invalid parameter: {what}")]
    InvalidParameter { what: &'static str },

    /// Persisted settings could not be written.
    #[error("settings: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, Error>;
