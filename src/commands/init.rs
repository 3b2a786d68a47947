use crate::commands::Out;
use crate::config::DEFAULT_BASE_URL;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the EzPay home directory, its `exports` subdirectory and an initial `config.json`.
///
/// # Arguments
/// - `ezpay_home` - The directory that will be the EzPay home, e.g. `$HOME/.ezpay`
/// - `base_url` - The address of the EzPay service, `None` for `http://localhost:8090`
/// - `user` - The user whose transactions are being viewed, e.g. `user10`
/// - `page_size` - Rows per page, `None` for the default.
///
/// # Errors
/// - Returns an error if the settings are invalid or any file operations fail.
pub async fn init(
    ezpay_home: &Path,
    base_url: Option<&str>,
    user: &str,
    page_size: Option<usize>,
) -> Result<Out<()>> {
    let config = Config::create(
        ezpay_home,
        base_url.unwrap_or(DEFAULT_BASE_URL),
        user,
        page_size,
    )
    .await
    .context("Unable to create the EzPay home directory and config")
    .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the EzPay config at {} for {} using {}",
        config.config_path().display(),
        config.session_user(),
        config.base_url()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join(".ezpay");
        let out = init(&home, None, "user10", Some(3)).await.unwrap();
        assert!(out.message().contains("user10"));
        assert!(out.message().contains(DEFAULT_BASE_URL));

        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.page_size(), 3);
        assert_eq!(config.session_user(), "user10");
    }

    #[tokio::test]
    async fn test_init_bad_url() {
        let dir = TempDir::new().unwrap();
        let err = init(dir.path(), Some("ftp://example.com"), "user10", None)
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Config));
    }
}
