use crate::api::{self, Mode};
use crate::commands::Out;
use crate::controller::FetchError;
use crate::detail::Detail;
use crate::error::{ErrorType, IntoResult};
use crate::model::{TransactionId, ValidationError};
use crate::{Config, Result};

/// Prints every field of one transaction. A missing transaction is reported in the message rather
/// than as an error.
pub async fn show(config: Config, mode: Mode, id: &TransactionId) -> Result<Out<Detail>> {
    if id.is_empty() {
        return Err(ValidationError::EmptyId).pub_result(ErrorType::Validation);
    }
    let backend = api::backend(&config, mode)?;
    let detail = Detail::load(backend.as_ref(), id)
        .await
        .map_err(|e| super::history::fetch_failure(FetchError::Api(e)))?;
    Ok(Out::new(detail.to_string(), detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestServer;
    use crate::error::error_type;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_show() {
        let env = TestEnv::new().await;
        let out = show(env.config(), Mode::Test, &TransactionId::new("1001"))
            .await
            .unwrap();
        assert!(out.structure().unwrap().is_found());
        assert!(out.message().contains("UPI ID:           user3@okaxis"));
    }

    #[tokio::test]
    async fn test_show_missing() {
        let env = TestEnv::new().await;
        let out = show(env.config(), Mode::Test, &TransactionId::new("42"))
            .await
            .unwrap();
        assert_eq!(out.message(), "Transaction 42 not found");
    }

    #[tokio::test]
    async fn test_show_empty_id() {
        let env = TestEnv::new().await;
        let err = show(env.config(), Mode::Test, &TransactionId::new(""))
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
    }

    #[tokio::test]
    async fn test_show_http_not_found() {
        let env = TestEnv::new().await;
        let server = TestServer::start(404, "").await;
        let out = show(
            env.config_for(&server.url()),
            Mode::Http,
            &TransactionId::new("nonexistent"),
        )
        .await
        .unwrap();
        assert!(!out.structure().unwrap().is_found());
        assert_eq!(server.requests(), vec!["GET /transactions/nonexistent"]);
    }
}
