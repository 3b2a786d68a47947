//! The crate-wide `Result` type and the public error categories attached to command failures.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The category of a failure as reported to the user. Command handlers attach one of these to the
/// error chain so that `main` can decide how to exit without inspecting message text.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The configuration file or the EzPay home directory is missing or invalid.
    Config,
    /// A request to the EzPay service failed.
    Request,
    /// User input was rejected before anything was sent.
    Validation,
    /// The requested record does not exist.
    NotFound,
    /// Writing a report failed.
    Export,
}

impl Display for ErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorType::Config => "Configuration error",
            ErrorType::Request => "Request to the EzPay service failed",
            ErrorType::Validation => "Invalid input",
            ErrorType::NotFound => "Not found",
            ErrorType::Export => "Export failed",
        };
        f.write_str(s)
    }
}

/// Attaches an `ErrorType` to the error of a `Result`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.into().context(error_type))
    }
}

/// Finds the `ErrorType` attached to `e`, if any.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<ErrorType>().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_pub_result_attaches_type() {
        let r: std::result::Result<(), Error> = Err(anyhow!("boom"));
        let e = r.pub_result(ErrorType::Validation).unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
        assert!(format!("{e:#}").contains("boom"));
    }

    #[test]
    fn test_untyped_error() {
        let e = anyhow!("plain");
        assert_eq!(error_type(&e), None);
    }
}
