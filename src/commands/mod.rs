//! Command handlers for the ezpay CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod autopay;
mod export;
mod history;
mod init;
mod show;

use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

pub use autopay::{autopay_cancel, autopay_list, autopay_modify, autopay_show};
pub use export::{export, Exported};
pub use history::{filter, history, Listing};
pub use init::init;
pub use show::show;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to stdout. The structured data, if it exists, is printed to stdout as JSON
    /// when `json` is true and to `debug!` otherwise.
    pub fn print(&self, json: bool) {
        println!("{}", self.message);
        let Some(structure) = self.structure() else {
            return;
        };
        match serde_json::to_string_pretty(structure) {
            Ok(s) if json => println!("{s}"),
            Ok(s) => debug!("Command output:\n\n{s}\n\n"),
            Err(e) => debug!("Unable to serialize the command output: {e}"),
        }
    }
}
