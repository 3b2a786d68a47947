//! Browse, filter and export EzPay transaction history and manage scheduled payments.
//!
//! The library holds everything the `ezpay` binary does: the `api::Backend` seam to the EzPay
//! service, the `controller::FilterController` that keeps the displayed list in step with the
//! selected filter, pagination, report export and the autopay manager.

pub mod api;
pub mod args;
pub mod autopay;
pub mod commands;
mod config;
pub mod controller;
pub mod detail;
mod error;
pub mod export;
pub mod model;
pub mod paginate;
pub mod table;
mod utils;

#[cfg(test)]
mod test;

pub use api::Mode;
pub use config::Config;
pub use error::{error_type, Error, ErrorType, IntoResult, Result};
