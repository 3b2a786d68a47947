//! Implements the `Backend` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without the EzPay service.

use crate::api::{ApiError, ApiResult, Backend};
use crate::model::{
    CompositeFilter, DateRange, ScheduledPayment, Transaction, TransactionId, TransactionStatus,
    TransactionType,
};
use crate::Result;
use anyhow::Context;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// An implementation of the `Backend` trait that does not talk to the service. Clones share the
/// same data so a test can keep a handle while the code under test owns another.
#[derive(Debug, Clone, Default)]
pub struct TestBackend {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    transactions: Vec<Transaction>,
    scheduled: Vec<ScheduledPayment>,
    calls: Vec<String>,
    failure: Option<ApiError>,
}

impl TestBackend {
    pub fn new(transactions: Vec<Transaction>, scheduled: Vec<ScheduledPayment>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                transactions,
                scheduled,
                ..State::default()
            })),
        }
    }

    /// Loads the seed data from this module.
    pub fn seeded() -> Result<Self> {
        let transactions: Vec<Transaction> = serde_json::from_str(TRANSACTION_DATA)
            .context("Unable to parse the seed transactions")?;
        let scheduled: Vec<ScheduledPayment> = serde_json::from_str(SCHEDULED_DATA)
            .context("Unable to parse the seed scheduled payments")?;
        Ok(Self::new(transactions, scheduled))
    }

    /// Makes every subsequent call fail with `error` until `clear_failure` is called.
    pub fn fail_with(&self, error: ApiError) {
        self.lock().failure = Some(error);
    }

    pub fn clear_failure(&self) {
        self.lock().failure = None;
    }

    /// Replaces the held transactions.
    pub fn set_transactions(&self, transactions: Vec<Transaction>) {
        self.lock().transactions = transactions;
    }

    /// The calls received so far, e.g. `"filter_by_type UPI"`.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// The scheduled payments as the "service" currently holds them.
    pub fn scheduled(&self) -> Vec<ScheduledPayment> {
        self.lock().scheduled.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `call` and returns the injected failure, if any.
    fn enter(&self, call: String) -> ApiResult<MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some(e) = &state.failure {
            return Err(e.clone());
        }
        Ok(state)
    }

    fn select(
        &self,
        call: String,
        predicate: impl Fn(&Transaction) -> bool,
    ) -> ApiResult<Vec<Transaction>> {
        let state = self.enter(call)?;
        Ok(state
            .transactions
            .iter()
            .filter(|&t| predicate(t))
            .cloned()
            .collect())
    }
}

fn payment_not_found(id: &TransactionId) -> ApiError {
    ApiError::NotFound(format!("Scheduled payment with ID {id} not found"))
}

#[async_trait::async_trait]
impl Backend for TestBackend {
    async fn history(&self) -> ApiResult<Vec<Transaction>> {
        self.select("history".to_string(), |_| true)
    }

    async fn by_id(&self, id: &TransactionId) -> ApiResult<Transaction> {
        let state = self.enter(format!("by_id {id}"))?;
        state
            .transactions
            .iter()
            .find(|t| t.id() == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Transaction with ID {id} not found")))
    }

    async fn filter_by_type(
        &self,
        transaction_type: TransactionType,
    ) -> ApiResult<Vec<Transaction>> {
        self.select(format!("filter_by_type {transaction_type}"), |t| {
            t.transaction_type() == transaction_type
        })
    }

    async fn filter_by_status(&self, status: TransactionStatus) -> ApiResult<Vec<Transaction>> {
        self.select(format!("filter_by_status {status}"), |t| {
            t.status() == status
        })
    }

    async fn filter_by_date_range(&self, range: &DateRange) -> ApiResult<Vec<Transaction>> {
        self.select(format!("filter_by_date_range {range}"), |t| {
            range.contains(t.date())
        })
    }

    async fn filter_by_multiple(&self, filter: &CompositeFilter) -> ApiResult<Vec<Transaction>> {
        self.select(format!("filter_by_multiple {filter}"), |t| {
            filter.transaction_type.map_or(true, |v| t.transaction_type() == v)
                && filter.status.map_or(true, |v| t.status() == v)
                && filter.start_date.map_or(true, |v| t.date() >= v)
                && filter.end_date.map_or(true, |v| t.date() <= v)
        })
    }

    async fn scheduled_payments(&self) -> ApiResult<Vec<ScheduledPayment>> {
        let state = self.enter("scheduled_payments".to_string())?;
        Ok(state.scheduled.clone())
    }

    async fn scheduled_payment(&self, id: &TransactionId) -> ApiResult<ScheduledPayment> {
        let state = self.enter(format!("scheduled_payment {id}"))?;
        state
            .scheduled
            .iter()
            .find(|p| p.id() == id)
            .cloned()
            .ok_or_else(|| payment_not_found(id))
    }

    async fn modify_scheduled_payment(
        &self,
        id: &TransactionId,
        payment: &ScheduledPayment,
    ) -> ApiResult<()> {
        let mut state = self.enter(format!("modify_scheduled_payment {id}"))?;
        let existing = state
            .scheduled
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| payment_not_found(id))?;
        existing.patch_from(payment);
        Ok(())
    }

    async fn cancel_scheduled_payment(&self, id: &TransactionId) -> ApiResult<()> {
        let mut state = self.enter(format!("cancel_scheduled_payment {id}"))?;
        let existing = state
            .scheduled
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| payment_not_found(id))?;
        existing.disable();
        Ok(())
    }
}

/// Seed transaction data. The session user of the seeded configuration is `user10`.
const TRANSACTION_DATA: &str = r##"[
  {"transactionId": 1001, "date": "2024-09-01", "transactionType": "UPI", "amount": 1250.0,
   "sender": "user3", "receiver": "user10", "status": "Success",
   "upiId": "user3@okaxis", "userId": "UPI-9001"},
  {"transactionId": 1002, "date": "2024-09-02", "transactionType": "Bank Transfer", "amount": 5000.0,
   "sender": "user10", "receiver": "user4", "status": "Success",
   "senderAccount": "HDFC0001234", "receiverAccount": "SBIN0005678", "transferId": "BT-2001"},
  {"transactionId": 1003, "date": "2024-09-03", "transactionType": "UPI", "amount": 320.75,
   "sender": "user10", "receiver": "user7", "status": "Failure",
   "upiId": "user10@okhdfc", "userId": "UPI-9002"},
  {"transactionId": 1004, "date": "2024-09-05", "transactionType": "UPI", "amount": 89.0,
   "sender": "user10", "receiver": "user2", "status": "Processing",
   "upiId": "user10@okhdfc", "userId": "UPI-9003"},
  {"transactionId": 1005, "date": "2024-09-08", "transactionType": "Bank Transfer", "amount": 15000.0,
   "sender": "user5", "receiver": "user10", "status": "Success",
   "senderAccount": "ICIC0004321", "receiverAccount": "HDFC0001234", "transferId": "BT-2002"},
  {"transactionId": 1006, "date": "2024-09-10", "transactionType": "Bank Transfer", "amount": 2200.5,
   "sender": "user10", "receiver": "user8", "status": "Failure",
   "senderAccount": "HDFC0001234", "receiverAccount": "UTIB0007788", "transferId": "BT-2003"},
  {"transactionId": 1007, "date": "2024-09-12", "transactionType": "UPI", "amount": 450.0,
   "sender": "user6", "receiver": "user10", "status": "Success",
   "upiId": "user6@oksbi", "userId": "UPI-9004"},
  {"transactionId": 1008, "date": "2024-09-15", "transactionType": "UPI", "amount": 60.0,
   "sender": "user10", "receiver": "user9", "status": "Success",
   "upiId": "user10@okhdfc"},
  {"transactionId": 1009, "date": "2024-09-18", "transactionType": "Bank Transfer", "amount": 7800.0,
   "sender": "user10", "receiver": "user1", "status": "Processing",
   "senderAccount": "HDFC0001234", "transferId": "BT-2004"},
  {"transactionId": 1010, "date": "2024-09-21", "transactionType": "UPI", "amount": 999.99,
   "sender": "user2", "receiver": "user10", "status": "Failure",
   "upiId": "user2@okicici", "userId": "UPI-9005"},
  {"transactionId": 1011, "date": "2024-09-25", "transactionType": "Bank Transfer", "amount": 120000.0,
   "sender": "user10", "receiver": "user11", "status": "Success",
   "senderAccount": "HDFC0001234", "receiverAccount": "KKBK0003344", "transferId": "BT-2005"},
  {"transactionId": 1012, "date": "2024-09-30", "transactionType": "UPI", "amount": 15.0,
   "sender": "user10", "receiver": "user3", "status": "Success",
   "upiId": "user10@okhdfc", "userId": "UPI-9006"}
]"##;

/// Seed scheduled payments: one active, one past its end date, one cancelled.
const SCHEDULED_DATA: &str = r##"[
  {"transactionId": 501, "transactionType": "UPI",
   "nextPaymentDate": "2024-10-01T00:00:00", "startDate": "2024-01-01T00:00:00",
   "endDate": "2099-12-31T00:00:00", "frequency": "MONTHLY", "amount": 1499.0,
   "isAutoPayEnabled": true, "sourceAccount": "HDFC0001234", "destinationAccount": "Broadband Ltd"},
  {"transactionId": 502, "transactionType": "Bank Transfer",
   "nextPaymentDate": "2024-06-07T00:00:00", "startDate": "2024-01-05T00:00:00",
   "endDate": "2024-06-30T00:00:00", "frequency": "WEEKLY", "amount": 250.0,
   "isAutoPayEnabled": true, "sourceAccount": "HDFC0001234", "destinationAccount": "SBIN0005678"},
  {"transactionId": 503, "transactionType": "UPI",
   "nextPaymentDate": "2025-01-01T00:00:00", "startDate": "2023-01-01T00:00:00",
   "endDate": "2099-01-01T00:00:00", "frequency": "YEARLY", "amount": 12000.0,
   "autoPayEnabled": false, "sourceAccount": "HDFC0001234", "destinationAccount": "Insurance Co"}
]"##;
