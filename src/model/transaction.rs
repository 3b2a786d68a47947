use crate::model::date::date_only;
use crate::model::Amount;
use chrono::NaiveDate;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The identifier the service assigns to a transaction. The service sends it as a number in some
/// responses and as a string in others, so it is kept as text.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TransactionId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<u64> for TransactionId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for TransactionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TransactionIdVisitor)
    }
}

struct TransactionIdVisitor;

impl<'de> Visitor<'de> for TransactionIdVisitor {
    type Value = TransactionId;

    fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("a transaction id as a number or string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TransactionId, E> {
        Ok(TransactionId::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<TransactionId, E> {
        Ok(TransactionId(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TransactionId, E> {
        Ok(TransactionId::new(v))
    }
}

/// The payment rail a transaction used.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum TransactionType {
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "Bank Transfer", alias = "BankTransfer")]
    BankTransfer,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// The settlement state of a transaction.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum TransactionStatus {
    Success,
    Processing,
    Failure,
}

serde_plain::derive_display_from_serialize!(TransactionStatus);
serde_plain::derive_fromstr_from_deserialize!(TransactionStatus);

/// Reads a string field the service may send as `null`, which becomes the empty string.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single transaction as returned by the EzPay service.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub(crate) transaction_id: TransactionId,
    #[serde(with = "date_only")]
    pub(crate) date: NaiveDate,
    pub(crate) transaction_type: TransactionType,
    pub(crate) amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) sender: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub(crate) receiver: String,
    pub(crate) status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) upi_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) sender_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) receiver_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) transfer_id: Option<String>,
}

/// The fields that only exist for one kind of transaction.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TransferDetails<'a> {
    Upi {
        upi_id: Option<&'a str>,
        user_id: Option<&'a str>,
    },
    BankTransfer {
        sender_account: Option<&'a str>,
        receiver_account: Option<&'a str>,
        transfer_id: Option<&'a str>,
    },
}

impl Transaction {
    pub fn id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn details(&self) -> TransferDetails<'_> {
        match self.transaction_type {
            TransactionType::Upi => TransferDetails::Upi {
                upi_id: self.upi_id.as_deref(),
                user_id: self.user_id.as_deref(),
            },
            TransactionType::BankTransfer => TransferDetails::BankTransfer {
                sender_account: self.sender_account.as_deref(),
                receiver_account: self.receiver_account.as_deref(),
                transfer_id: self.transfer_id.as_deref(),
            },
        }
    }
}
