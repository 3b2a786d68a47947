//! Types that represent the core data model, such as `Transaction` and `ScheduledPayment`.
mod amount;
pub(crate) mod date;
mod filter;
mod scheduled;
mod transaction;

pub use amount::{Amount, AmountError};
pub use date::{parse_date, parse_date_time};
pub use filter::{CompositeFilter, DateRange, Selection, ValidationError};
pub use scheduled::{AutopayStatus, Frequency, ScheduleUpdate, ScheduledPayment};
pub use transaction::{
    Transaction, TransactionId, TransactionStatus, TransactionType, TransferDetails,
};
