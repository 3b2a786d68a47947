//! Filter predicates over the transaction history and the validation rules for their dates.

use crate::model::date::format_date;
use crate::model::{TransactionId, TransactionStatus, TransactionType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Input rejected before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Start date {start} cannot be after end date {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
    #[error("Date {date} is in the future, dates cannot be later than {today}")]
    FutureDate { date: NaiveDate, today: NaiveDate },
    #[error("Enter a transaction ID to search")]
    EmptyId,
    #[error("Scheduled payment {0} is cancelled and cannot be modified")]
    ModifyCancelled(TransactionId),
    #[error("Scheduled payment {0} is expired or already cancelled and cannot be cancelled")]
    CancelInactive(TransactionId),
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,
    #[error("Nothing to modify, provide an end date, frequency or amount")]
    EmptyUpdate,
}

/// A closed interval of dates, `start <= end <= today` at the time it was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Validates and builds a range. Future dates are reported before ordering.
    pub fn new(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<Self, ValidationError> {
        not_in_future(start, today)?;
        not_in_future(end, today)?;
        if start > end {
            return Err(ValidationError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", format_date(&self.start), format_date(&self.end))
    }
}

fn not_in_future(date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if date > today {
        Err(ValidationError::FutureDate { date, today })
    } else {
        Ok(())
    }
}

/// Several predicate axes combined into one request. Unset axes do not constrain the result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositeFilter {
    pub transaction_type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl CompositeFilter {
    pub fn is_empty(&self) -> bool {
        self.transaction_type.is_none()
            && self.status.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// Applies the same date rules as `DateRange` to whichever dates are set.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => DateRange::new(start, end, today).map(|_| ()),
            (Some(date), None) | (None, Some(date)) => not_in_future(date, today),
            (None, None) => Ok(()),
        }
    }

    /// The query parameters in the order the service documents them, skipping unset axes.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(t) = self.transaction_type {
            pairs.push(("type", t.to_string()));
        }
        if let Some(s) = self.status {
            pairs.push(("status", s.to_string()));
        }
        if let Some(d) = self.start_date {
            pairs.push(("startDate", format_date(&d)));
        }
        if let Some(d) = self.end_date {
            pairs.push(("endDate", format_date(&d)));
        }
        pairs
    }
}

impl Display for CompositeFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        if parts.is_empty() {
            f.write_str("no filters")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// The predicate currently narrowing the history. Exactly one shape is active at a time, so
/// selecting one axis discards the others.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No filter, the full history.
    #[default]
    All,
    Type(TransactionType),
    Status(TransactionStatus),
    /// A date range that is being edited. Only fetched once both ends are set.
    Dates {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    Id(TransactionId),
    /// The composite filter of the newer protocol revision.
    Composite(CompositeFilter),
}

impl Selection {
    /// Sets the start date, keeping the end date if a date range was already being edited.
    pub fn with_start(&self, start: Option<NaiveDate>) -> Selection {
        match self {
            Selection::Dates { end, .. } => Selection::Dates { start, end: *end },
            _ => Selection::Dates { start, end: None },
        }
    }

    /// Sets the end date, keeping the start date if a date range was already being edited.
    pub fn with_end(&self, end: Option<NaiveDate>) -> Selection {
        match self {
            Selection::Dates { start, .. } => Selection::Dates { start: *start, end },
            _ => Selection::Dates { start: None, end },
        }
    }
}
