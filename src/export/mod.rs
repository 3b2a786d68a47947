//! Turns the transactions being displayed into a downloadable report.
//!
//! The report is built entirely from the list already held in memory. Nothing here talks to the
//! service.

mod csv;
mod pdf;

use crate::model::{Transaction, TransactionStatus, TransferDetails};
use crate::{utils, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub const REPORT_TITLE: &str = "Transaction History";

/// The file name the report is saved under unless another path is given.
pub const DEFAULT_FILE_STEM: &str = "Transaction_History";

const MISSING: &str = "N/A";

#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Csv,
}

serde_plain::derive_display_from_serialize!(ExportFormat);
serde_plain::derive_fromstr_from_deserialize!(ExportFormat);

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn default_file_name(&self) -> String {
        format!("{DEFAULT_FILE_STEM}.{}", self.extension())
    }
}

/// Whether money came in or went out, from the session user's point of view.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Marker {
    #[serde(rename = "Cr")]
    Credit,
    #[serde(rename = "Db")]
    Debit,
    #[serde(rename = "X")]
    Failed,
    #[serde(rename = "")]
    Pending,
}

serde_plain::derive_display_from_serialize!(Marker);

impl Marker {
    /// A successful transaction is a credit when the session user received it and a debit
    /// otherwise. Failed transactions are always `X` and processing ones have no marker.
    pub fn for_transaction(tx: &Transaction, session_user: &str) -> Self {
        match tx.status() {
            TransactionStatus::Success if tx.receiver() == session_user => Marker::Credit,
            TransactionStatus::Success => Marker::Debit,
            TransactionStatus::Failure => Marker::Failed,
            TransactionStatus::Processing => Marker::Pending,
        }
    }
}

/// The `Additional Info` column.
pub fn additional_info(tx: &Transaction) -> String {
    let or_missing = |v: Option<&str>| v.filter(|s| !s.is_empty()).unwrap_or(MISSING).to_string();
    match tx.details() {
        TransferDetails::Upi { upi_id, user_id } => format!(
            "UPI ID: {}, Transaction ID: {}",
            or_missing(upi_id),
            or_missing(user_id)
        ),
        TransferDetails::BankTransfer {
            sender_account,
            receiver_account,
            ..
        } => format!(
            "Bank: {}, Account No: {}",
            or_missing(sender_account),
            or_missing(receiver_account)
        ),
    }
}

/// One line of the report. The serialized names are the column headers.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Type")]
    pub transaction_type: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Receiver")]
    pub receiver: String,
    #[serde(rename = "Additional Info")]
    pub additional_info: String,
    #[serde(rename = "Status")]
    pub status: TransactionStatus,
    #[serde(rename = "Marker")]
    pub marker: Marker,
}

impl ReportRow {
    pub const HEADERS: [&'static str; 8] = [
        "ID",
        "Date",
        "Type",
        "Amount",
        "Receiver",
        "Additional Info",
        "Status",
        "Marker",
    ];

    pub fn new(tx: &Transaction, session_user: &str) -> Self {
        Self {
            id: tx.id().to_string(),
            date: tx.date().to_string(),
            transaction_type: tx.transaction_type().to_string(),
            amount: tx.amount().to_string(),
            receiver: tx.receiver().to_string(),
            additional_info: additional_info(tx),
            status: tx.status(),
            marker: Marker::for_transaction(tx, session_user),
        }
    }

    /// The cells in column order.
    pub fn cells(&self) -> [String; 8] {
        [
            self.id.clone(),
            self.date.clone(),
            self.transaction_type.clone(),
            self.amount.clone(),
            self.receiver.clone(),
            self.additional_info.clone(),
            self.status.to_string(),
            self.marker.to_string(),
        ]
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Report {
    title: String,
    rows: Vec<ReportRow>,
}

impl Report {
    pub fn new(transactions: &[Transaction], session_user: &str) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            rows: transactions
                .iter()
                .map(|tx| ReportRow::new(tx, session_user))
                .collect(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self, format: ExportFormat) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Pdf => pdf::render(self),
            ExportFormat::Csv => csv::render(self),
        }
    }

    /// Renders the report and writes it to `path`.
    pub async fn save(&self, format: ExportFormat, path: &Path) -> Result<()> {
        let bytes = self.render(format)?;
        utils::write(path, &bytes).await?;
        info!(
            "Wrote {} rows to {} ({} bytes)",
            self.rows.len(),
            path.display(),
            bytes.len()
        );
        Ok(())
    }
}
