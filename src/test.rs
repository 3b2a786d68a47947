//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::config::DEFAULT_BASE_URL;
use crate::Config;
use tempfile::TempDir;

/// The session user of every test environment. Seeded transaction 1001 was received by this user.
pub(crate) const TEST_USER: &str = "user10";

/// Test environment that sets up an EzPay home directory with a Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub(crate) struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with the default page size.
    pub(crate) async fn new() -> Self {
        Self::with_page_size(None).await
    }

    pub(crate) async fn with_page_size(page_size: Option<usize>) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("ezpay");
        let config = Config::create(&root, DEFAULT_BASE_URL, TEST_USER, page_size)
            .await
            .unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub(crate) fn config(&self) -> Config {
        self.config.clone()
    }

    /// Returns a clone of the Config pointing at `base_url`, e.g. a `TestServer`.
    pub(crate) fn config_for(&self, base_url: &str) -> Config {
        self.config.clone().with_base_url(Some(base_url)).unwrap()
    }

    /// A port on localhost that nothing is listening on.
    pub(crate) fn closed_url() -> String {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        format!("http://127.0.0.1:{port}")
    }
}
