//! Fetches and renders a single transaction.

use crate::api::{ApiError, ApiResult, Backend};
use crate::model::{Transaction, TransactionId, TransferDetails};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// A looked-up transaction. A missing transaction is a normal outcome here, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "transaction", rename_all = "snake_case")]
pub enum Detail {
    Found(Transaction),
    NotFound(TransactionId),
}

impl Detail {
    /// Looks up `id`. Any failure other than not-found is returned.
    pub async fn load(backend: &dyn Backend, id: &TransactionId) -> ApiResult<Self> {
        match backend.by_id(id).await {
            Ok(tx) => Ok(Detail::Found(tx)),
            Err(ApiError::NotFound(_)) => Ok(Detail::NotFound(id.clone())),
            Err(e) => Err(e),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Detail::Found(_))
    }
}

fn field(f: &mut Formatter<'_>, name: &str, value: impl Display) -> std::fmt::Result {
    writeln!(f, "{:<18}{value}", format!("{name}:"))
}

fn optional(f: &mut Formatter<'_>, name: &str, value: Option<&str>) -> std::fmt::Result {
    field(f, name, value.unwrap_or("N/A"))
}

impl Display for Detail {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let tx = match self {
            Detail::NotFound(id) => return write!(f, "Transaction {id} not found"),
            Detail::Found(tx) => tx,
        };
        field(f, "Transaction ID", tx.id())?;
        field(f, "Date", tx.date())?;
        field(f, "Type", tx.transaction_type())?;
        field(f, "Amount", tx.amount())?;
        optional(f, "Sender", tx.sender())?;
        field(f, "Receiver", tx.receiver())?;
        field(f, "Status", tx.status())?;
        match tx.details() {
            TransferDetails::Upi { upi_id, user_id } => {
                optional(f, "UPI ID", upi_id)?;
                optional(f, "User ID", user_id)
            }
            TransferDetails::BankTransfer {
                sender_account,
                receiver_account,
                transfer_id,
            } => {
                optional(f, "Sender Account", sender_account)?;
                optional(f, "Receiver Account", receiver_account)?;
                optional(f, "Transfer ID", transfer_id)
            }
        }
    }
}
