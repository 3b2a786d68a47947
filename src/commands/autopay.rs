use crate::api::{self, ApiError, Mode};
use crate::autopay::{AutopayError, AutopayManager};
use crate::commands::Out;
use crate::controller::UNREACHABLE_MESSAGE;
use crate::error::ErrorType;
use crate::model::{ScheduleUpdate, ScheduledPayment, TransactionId};
use crate::{table, utils, Config, Error, Result};

/// Lists every scheduled payment with its status.
pub async fn autopay_list(config: Config, mode: Mode) -> Result<Out<Vec<ScheduledPayment>>> {
    let manager = load(&config, mode).await?;
    let payments = manager.payments().to_vec();
    if payments.is_empty() {
        return Ok(Out::new("There are no scheduled payments", payments));
    }
    let message = table::scheduled_payments(&payments, utils::now());
    Ok(Out::new(message, payments))
}

/// Shows one scheduled payment as the service currently has it.
pub async fn autopay_show(
    config: Config,
    mode: Mode,
    id: &TransactionId,
) -> Result<Out<ScheduledPayment>> {
    let backend = api::backend(&config, mode)?;
    let payment = backend
        .scheduled_payment(id)
        .await
        .map_err(request_failure)?;
    let message = table::scheduled_payments(std::slice::from_ref(&payment), utils::now());
    Ok(Out::new(message, payment))
}

/// Applies `update` to the scheduled payment `id`.
///
/// # Errors
/// - `Validation` when the update is empty, the amount is not positive or the payment is
///   cancelled.
/// - `NotFound` when there is no scheduled payment `id`.
/// - `Request` when the service rejects the change. Nothing is changed in that case.
pub async fn autopay_modify(
    config: Config,
    mode: Mode,
    id: &TransactionId,
    update: ScheduleUpdate,
) -> Result<Out<ScheduledPayment>> {
    let backend = api::backend(&config, mode)?;
    let mut manager = AutopayManager::load(backend.as_ref())
        .await
        .map_err(request_failure)?;
    let payment = manager
        .modify(backend.as_ref(), id, &update)
        .await
        .map_err(autopay_failure)?
        .clone();
    Ok(Out::new(
        format!("Modified scheduled payment {id}"),
        payment,
    ))
}

/// Cancels the scheduled payment `id`. Only active payments can be cancelled.
pub async fn autopay_cancel(
    config: Config,
    mode: Mode,
    id: &TransactionId,
) -> Result<Out<ScheduledPayment>> {
    let backend = api::backend(&config, mode)?;
    let mut manager = AutopayManager::load(backend.as_ref())
        .await
        .map_err(request_failure)?;
    let payment = manager
        .cancel(backend.as_ref(), id, utils::now())
        .await
        .map_err(autopay_failure)?
        .clone();
    Ok(Out::new(
        format!("Cancelled scheduled payment {id}"),
        payment,
    ))
}

async fn load(config: &Config, mode: Mode) -> Result<AutopayManager> {
    let backend = api::backend(config, mode)?;
    AutopayManager::load(backend.as_ref())
        .await
        .map_err(request_failure)
}

fn request_failure(e: ApiError) -> Error {
    let error_type = match &e {
        ApiError::NotFound(_) => ErrorType::NotFound,
        _ => ErrorType::Request,
    };
    let error = match &e {
        ApiError::Unreachable(_) => Error::new(e).context(UNREACHABLE_MESSAGE),
        _ => Error::new(e),
    };
    error.context(error_type)
}

fn autopay_failure(e: AutopayError) -> Error {
    let error_type = match &e {
        AutopayError::Validation(_) => ErrorType::Validation,
        AutopayError::Unknown(_) => ErrorType::NotFound,
        AutopayError::Api { .. } => ErrorType::Request,
    };
    Error::new(e).context(error_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestServer;
    use crate::error::error_type;
    use crate::model::{Amount, AutopayStatus, Frequency};
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn id(s: &str) -> TransactionId {
        TransactionId::new(s)
    }

    #[tokio::test]
    async fn test_list() {
        let env = TestEnv::new().await;
        let out = autopay_list(env.config(), Mode::Test).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 3);
        assert!(out.message().contains("active"));
        assert!(out.message().contains("expired"));
        assert!(out.message().contains("cancelled"));
    }

    #[tokio::test]
    async fn test_show() {
        let env = TestEnv::new().await;
        let out = autopay_show(env.config(), Mode::Test, &id("502"))
            .await
            .unwrap();
        assert_eq!(
            out.structure().unwrap().status(utils::now()),
            AutopayStatus::Expired
        );
        let err = autopay_show(env.config(), Mode::Test, &id("999"))
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::NotFound));
    }

    #[tokio::test]
    async fn test_modify() {
        let env = TestEnv::new().await;
        let update = ScheduleUpdate {
            end_date: NaiveDate::from_ymd_opt(2100, 6, 30),
            frequency: Some(Frequency::Yearly),
            amount: Some(Amount::from_str("2,000").unwrap()),
        };
        let out = autopay_modify(env.config(), Mode::Test, &id("501"), update)
            .await
            .unwrap();
        let payment = out.structure().unwrap();
        assert_eq!(payment.frequency(), Frequency::Yearly);
        assert_eq!(payment.amount().to_string(), "Rs. 2,000.00");
    }

    #[tokio::test]
    async fn test_modify_cancelled_is_rejected() {
        let env = TestEnv::new().await;
        let update = ScheduleUpdate {
            frequency: Some(Frequency::Weekly),
            ..Default::default()
        };
        let err = autopay_modify(env.config(), Mode::Test, &id("503"), update)
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));

        let err = autopay_modify(env.config(), Mode::Test, &id("999"), update)
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::NotFound));
    }

    #[tokio::test]
    async fn test_cancel() {
        let env = TestEnv::new().await;
        let out = autopay_cancel(env.config(), Mode::Test, &id("501"))
            .await
            .unwrap();
        assert!(out.structure().unwrap().is_cancelled());

        let err = autopay_cancel(env.config(), Mode::Test, &id("502"))
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
    }

    #[tokio::test]
    async fn test_service_failure() {
        let env = TestEnv::new().await;
        let server = TestServer::start(503, "maintenance").await;
        let err = autopay_list(env.config_for(&server.url()), Mode::Http)
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
        assert_eq!(
            server.requests(),
            vec!["GET /api/scheduled-payments/ScheduledPaymentsHistory"]
        );
    }
}
