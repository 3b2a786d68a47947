//! The seam between this program and the EzPay service.
//!
//! Everything the program knows about the service goes through the `Backend` trait. There are two
//! implementations: `HttpBackend`, which talks to the real service over HTTP, and `TestBackend`,
//! which serves seeded data from memory so the whole program can run without the service.

mod endpoints;
mod http;
mod test_backend;
#[cfg(test)]
mod test_server;

use crate::model::{
    CompositeFilter, DateRange, ScheduledPayment, Transaction, TransactionId, TransactionStatus,
    TransactionType,
};
use crate::{Config, Result};
use std::sync::Arc;
use tracing::debug;

pub(crate) use endpoints::Endpoints;
pub(crate) use http::HttpBackend;
pub use test_backend::TestBackend;
#[cfg(test)]
pub(crate) use test_server::TestServer;

/// The environment variable that switches the program to the in-memory backend.
pub const TEST_MODE_VAR: &str = "EZPAY_IN_TEST_MODE";

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// A failed call to the EzPay service, by cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The service could not be reached at all (connection refused, DNS failure, offline).
    #[error("Unable to connect to the EzPay service: {0}")]
    Unreachable(String),
    #[error("The request to the EzPay service timed out: {0}")]
    Timeout(String),
    /// Any other transport failure.
    #[error("Network error: {0}")]
    Network(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Client error ({status}): {body}")]
    Client { status: u16, body: String },
    #[error("Server error ({status}): {body}")]
    Server { status: u16, body: String },
    /// A non-2xx status that is neither a client nor a server error.
    #[error("Unexpected HTTP status ({status}): {body}")]
    Http { status: u16, body: String },
    #[error("Unable to decode the response from the EzPay service: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classifies a non-2xx response.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            404 => ApiError::NotFound(if body.is_empty() {
                "Resource not found".to_string()
            } else {
                body
            }),
            400..=499 => ApiError::Client { status, body },
            500..=599 => ApiError::Server { status, body },
            _ => ApiError::Http { status, body },
        }
    }

    /// The HTTP status of the failure, when there was a response at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound(_) => Some(404),
            ApiError::Client { status, .. }
            | ApiError::Server { status, .. }
            | ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when no response was received.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ApiError::Unreachable(_) | ApiError::Timeout(_) | ApiError::Network(_)
        )
    }
}

/// The operations the EzPay service offers.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// `GET /transactions/history`
    async fn history(&self) -> ApiResult<Vec<Transaction>>;

    /// `GET /transactions/{id}`
    async fn by_id(&self, id: &TransactionId) -> ApiResult<Transaction>;

    /// `GET /transactions/filterByType?type=`
    async fn filter_by_type(&self, transaction_type: TransactionType)
        -> ApiResult<Vec<Transaction>>;

    /// `GET /transactions/filterByStatus?status=`
    async fn filter_by_status(&self, status: TransactionStatus) -> ApiResult<Vec<Transaction>>;

    /// `GET /transactions/filterByDateRange?startDate=&endDate=`
    async fn filter_by_date_range(&self, range: &DateRange) -> ApiResult<Vec<Transaction>>;

    /// `GET /transactions/filterByMultipleFilters?type=&status=&startDate=&endDate=`
    async fn filter_by_multiple(&self, filter: &CompositeFilter) -> ApiResult<Vec<Transaction>>;

    /// `GET /api/scheduled-payments/ScheduledPaymentsHistory`
    async fn scheduled_payments(&self) -> ApiResult<Vec<ScheduledPayment>>;

    /// `GET /api/scheduled-payments/{id}`
    async fn scheduled_payment(&self, id: &TransactionId) -> ApiResult<ScheduledPayment>;

    /// `PUT /api/scheduled-payments/modify/{id}`
    async fn modify_scheduled_payment(
        &self,
        id: &TransactionId,
        payment: &ScheduledPayment,
    ) -> ApiResult<()>;

    /// `DELETE /api/scheduled-payments/cancel/{id}`
    async fn cancel_scheduled_payment(&self, id: &TransactionId) -> ApiResult<()>;
}

/// Selects which `Backend` implementation the program uses.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Http,
    Test,
}

impl Mode {
    /// `Mode::Test` when `EZPAY_IN_TEST_MODE` is set to a non-empty value, otherwise `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_VAR) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Creates the `Backend` for `mode`.
pub fn backend(config: &Config, mode: Mode) -> Result<Arc<dyn Backend>> {
    match mode {
        Mode::Http => {
            debug!("Using the EzPay service at {}", config.base_url());
            Ok(Arc::new(HttpBackend::new(
                config.base_url(),
                config.request_timeout(),
            )?))
        }
        Mode::Test => {
            debug!("Using the in-memory test backend");
            Ok(Arc::new(TestBackend::seeded()?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(ApiError::from_status(404, ""), ApiError::NotFound(_)));
        assert!(matches!(
            ApiError::from_status(400, "bad"),
            ApiError::Client { status: 400, .. }
        ));
        assert!(matches!(
            ApiError::from_status(503, ""),
            ApiError::Server { status: 503, .. }
        ));
        assert!(matches!(
            ApiError::from_status(302, ""),
            ApiError::Http { status: 302, .. }
        ));
    }

    #[test]
    fn test_status_and_network() {
        assert_eq!(ApiError::from_status(404, "").status(), Some(404));
        assert_eq!(ApiError::Unreachable("x".into()).status(), None);
        assert!(ApiError::Timeout("x".into()).is_network());
        assert!(!ApiError::from_status(500, "").is_network());
    }
}
