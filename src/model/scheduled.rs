use crate::model::date::date_time;
use crate::model::transaction::null_as_empty;
use crate::model::{Amount, TransactionId, TransactionType};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// How often a scheduled payment recurs.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
}

serde_plain::derive_display_from_serialize!(Frequency);
serde_plain::derive_fromstr_from_deserialize!(Frequency);

/// The state of a scheduled payment derived from its enabled flag and its end date.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutopayStatus {
    Active,
    Expired,
    Cancelled,
}

serde_plain::derive_display_from_serialize!(AutopayStatus);

/// A recurring payment instruction ("autopay").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPayment {
    pub(crate) transaction_id: TransactionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) transaction_type: Option<TransactionType>,
    #[serde(with = "date_time")]
    pub(crate) next_payment_date: NaiveDateTime,
    #[serde(with = "date_time")]
    pub(crate) start_date: NaiveDateTime,
    #[serde(with = "date_time")]
    pub(crate) end_date: NaiveDateTime,
    pub(crate) frequency: Frequency,
    pub(crate) amount: Amount,
    // Jackson strips the "is" from boolean getters, so both spellings show up
    #[serde(rename = "isAutoPayEnabled", alias = "autoPayEnabled")]
    pub(crate) is_auto_pay_enabled: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub(crate) source_account: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub(crate) destination_account: String,
}

/// The fields a user may change on an existing scheduled payment. `None` keeps the current value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleUpdate {
    pub end_date: Option<NaiveDate>,
    pub frequency: Option<Frequency>,
    pub amount: Option<Amount>,
}

impl ScheduleUpdate {
    pub fn is_empty(&self) -> bool {
        self.end_date.is_none() && self.frequency.is_none() && self.amount.is_none()
    }
}

impl ScheduledPayment {
    pub fn id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn transaction_type(&self) -> Option<TransactionType> {
        self.transaction_type
    }

    pub fn next_payment_date(&self) -> NaiveDateTime {
        self.next_payment_date
    }

    pub fn start_date(&self) -> NaiveDateTime {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDateTime {
        self.end_date
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn is_auto_pay_enabled(&self) -> bool {
        self.is_auto_pay_enabled
    }

    pub fn source_account(&self) -> &str {
        &self.source_account
    }

    pub fn destination_account(&self) -> &str {
        &self.destination_account
    }

    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        now > self.end_date
    }

    pub fn is_cancelled(&self) -> bool {
        !self.is_auto_pay_enabled
    }

    pub fn status(&self, now: NaiveDateTime) -> AutopayStatus {
        if self.is_cancelled() {
            AutopayStatus::Cancelled
        } else if self.is_expired(now) {
            AutopayStatus::Expired
        } else {
            AutopayStatus::Active
        }
    }

    /// Only cancelled payments are locked against modification; expired ones may be extended.
    pub fn can_modify(&self) -> bool {
        !self.is_cancelled()
    }

    pub fn can_cancel(&self, now: NaiveDateTime) -> bool {
        !self.is_cancelled() && !self.is_expired(now)
    }

    /// Returns a copy with `update` applied. The end date is set to midnight of the chosen day.
    pub fn with_update(&self, update: &ScheduleUpdate) -> Self {
        let mut updated = self.clone();
        if let Some(end_date) = update.end_date {
            updated.end_date = end_date.and_time(NaiveTime::MIN);
        }
        if let Some(frequency) = update.frequency {
            updated.frequency = frequency;
        }
        if let Some(amount) = update.amount {
            updated.amount = amount;
        }
        updated
    }

    /// Copies the user-editable fields from `other`.
    pub(crate) fn patch_from(&mut self, other: &ScheduledPayment) {
        self.end_date = other.end_date;
        self.frequency = other.frequency;
        self.amount = other.amount;
    }

    pub(crate) fn disable(&mut self) {
        self.is_auto_pay_enabled = false;
    }
}
