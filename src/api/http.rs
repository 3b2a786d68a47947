//! Implements the `Backend` trait against the EzPay REST service using `reqwest`.

use crate::api::{ApiError, ApiResult, Backend, Endpoints};
use crate::model::{
    CompositeFilter, DateRange, ScheduledPayment, Transaction, TransactionId, TransactionStatus,
    TransactionType,
};
use crate::Result;
use anyhow::Context;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

pub(crate) struct HttpBackend {
    client: Client,
    endpoints: Endpoints,
}

impl HttpBackend {
    pub(crate) fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let endpoints = Endpoints::new(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self { client, endpoints })
    }

    /// Sends `request` and turns any non-2xx response into an `ApiError`.
    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(from_transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        // The body only enriches the error
        let body = response.text().await.unwrap_or_default();
        debug!("The service responded with {status}: {body}");
        Err(ApiError::from_status(status.as_u16(), body))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        debug!("GET {url}");
        let response = self.send(self.client.get(url.clone())).await?;
        let bytes = response.bytes().await.map_err(from_transport)?;
        trace!("Received {} bytes from {url}", bytes.len());
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Decode(format!("Invalid response from {url}: {e}")))
    }
}

fn from_transport(e: reqwest::Error) -> ApiError {
    let message = e.to_string();
    if e.is_timeout() {
        ApiError::Timeout(message)
    } else if e.is_connect() {
        ApiError::Unreachable(message)
    } else if e.is_decode() {
        ApiError::Decode(message)
    } else {
        ApiError::Network(message)
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn history(&self) -> ApiResult<Vec<Transaction>> {
        self.get_json(self.endpoints.history()).await
    }

    async fn by_id(&self, id: &TransactionId) -> ApiResult<Transaction> {
        // The service answers 400 when the id is not one it could ever have issued
        match self.get_json(self.endpoints.by_id(id)).await {
            Err(ApiError::NotFound(_)) | Err(ApiError::Client { status: 400, .. }) => Err(
                ApiError::NotFound(format!("Transaction with ID {id} not found")),
            ),
            other => other,
        }
    }

    async fn filter_by_type(
        &self,
        transaction_type: TransactionType,
    ) -> ApiResult<Vec<Transaction>> {
        self.get_json(self.endpoints.filter_by_type(transaction_type))
            .await
    }

    async fn filter_by_status(&self, status: TransactionStatus) -> ApiResult<Vec<Transaction>> {
        self.get_json(self.endpoints.filter_by_status(status)).await
    }

    async fn filter_by_date_range(&self, range: &DateRange) -> ApiResult<Vec<Transaction>> {
        self.get_json(self.endpoints.filter_by_date_range(range))
            .await
    }

    async fn filter_by_multiple(&self, filter: &CompositeFilter) -> ApiResult<Vec<Transaction>> {
        self.get_json(self.endpoints.filter_by_multiple(filter))
            .await
    }

    async fn scheduled_payments(&self) -> ApiResult<Vec<ScheduledPayment>> {
        self.get_json(self.endpoints.scheduled_payments()).await
    }

    async fn scheduled_payment(&self, id: &TransactionId) -> ApiResult<ScheduledPayment> {
        self.get_json(self.endpoints.scheduled_payment(id)).await
    }

    async fn modify_scheduled_payment(
        &self,
        id: &TransactionId,
        payment: &ScheduledPayment,
    ) -> ApiResult<()> {
        let url = self.endpoints.modify_scheduled_payment(id);
        debug!("PUT {url}");
        self.send(self.client.put(url).json(payment)).await?;
        Ok(())
    }

    async fn cancel_scheduled_payment(&self, id: &TransactionId) -> ApiResult<()> {
        let url = self.endpoints.cancel_scheduled_payment(id);
        debug!("DELETE {url}");
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}
