//! Lists, modifies and cancels scheduled payments.

use crate::api::{ApiError, Backend};
use crate::model::{ScheduleUpdate, ScheduledPayment, TransactionId, ValidationError};
use chrono::NaiveDateTime;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutopayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Scheduled payment {0} is not in the list")]
    Unknown(TransactionId),
    #[error("Unable to {action} scheduled payment {id}: {source}")]
    Api {
        action: &'static str,
        id: TransactionId,
        #[source]
        source: ApiError,
    },
}

/// The scheduled payments fetched once on load. Local records are only changed after the service
/// has accepted the change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutopayManager {
    payments: Vec<ScheduledPayment>,
}

impl AutopayManager {
    pub fn new(payments: Vec<ScheduledPayment>) -> Self {
        Self { payments }
    }

    pub async fn load(backend: &dyn Backend) -> Result<Self, ApiError> {
        let payments = backend.scheduled_payments().await?;
        info!("Loaded {} scheduled payments", payments.len());
        Ok(Self::new(payments))
    }

    pub fn payments(&self) -> &[ScheduledPayment] {
        &self.payments
    }

    pub fn get(&self, id: &TransactionId) -> Option<&ScheduledPayment> {
        self.payments.iter().find(|p| p.id() == id)
    }

    fn find(&self, id: &TransactionId) -> Result<&ScheduledPayment, AutopayError> {
        self.get(id).ok_or_else(|| AutopayError::Unknown(id.clone()))
    }

    fn find_mut(&mut self, id: &TransactionId) -> Result<&mut ScheduledPayment, AutopayError> {
        self.payments
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| AutopayError::Unknown(id.clone()))
    }

    /// Sends the payment with `update` applied and, once accepted, updates the local record.
    pub async fn modify(
        &mut self,
        backend: &dyn Backend,
        id: &TransactionId,
        update: &ScheduleUpdate,
    ) -> Result<&ScheduledPayment, AutopayError> {
        if update.is_empty() {
            return Err(ValidationError::EmptyUpdate.into());
        }
        if update.amount.is_some_and(|a| !a.is_positive()) {
            return Err(ValidationError::NonPositiveAmount.into());
        }
        let current = self.find(id)?;
        if !current.can_modify() {
            return Err(ValidationError::ModifyCancelled(id.clone()).into());
        }
        let updated = current.with_update(update);
        if let Err(source) = backend.modify_scheduled_payment(id, &updated).await {
            warn!("Modifying scheduled payment {id} failed: {source}");
            return Err(AutopayError::Api {
                action: "modify",
                id: id.clone(),
                source,
            });
        }
        let payment = self.find_mut(id)?;
        payment.patch_from(&updated);
        info!("Modified scheduled payment {id}");
        Ok(payment)
    }

    /// Cancels the payment and, once accepted, marks the local record as disabled.
    pub async fn cancel(
        &mut self,
        backend: &dyn Backend,
        id: &TransactionId,
        now: NaiveDateTime,
    ) -> Result<&ScheduledPayment, AutopayError> {
        if !self.find(id)?.can_cancel(now) {
            return Err(ValidationError::CancelInactive(id.clone()).into());
        }
        if let Err(source) = backend.cancel_scheduled_payment(id).await {
            warn!("Cancelling scheduled payment {id} failed: {source}");
            return Err(AutopayError::Api {
                action: "cancel",
                id: id.clone(),
                source,
            });
        }
        let payment = self.find_mut(id)?;
        payment.disable();
        info!("Cancelled scheduled payment {id}");
        Ok(payment)
    }
}
