//! Public address lookup. The request runs as a detached task on a small tokio runtime;
//! the caller waits only up to a fixed budget and then moves on without it.

use crate::config::PublicIpConfig;
use crate::error::MonitorError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait PublicAddressFetch: Send + Sync {
    async fn fetch(&self) -> Result<String, MonitorError>;
}

/// Plain-text address echo service (e.g. api.ipify.org).
pub struct HttpAddressFetch {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAddressFetch {
    pub fn new(config: &PublicIpConfig) -> Result<Self, MonitorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.client_timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl PublicAddressFetch for HttpAddressFetch {
    async fn fetch(&self) -> Result<String, MonitorError> {
        let body = self
            .client
            .get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let addr = body.trim();
        if addr.is_empty() {
            return Err(MonitorError::EmptyAddress);
        }
        Ok(addr.to_string())
    }
}

pub struct PublicAddressResolver {
    runtime: tokio::runtime::Runtime,
    fetcher: Arc<dyn PublicAddressFetch>,
    wait_budget: Duration,
}

impl PublicAddressResolver {
    pub fn new(
        fetcher: Arc<dyn PublicAddressFetch>,
        wait_budget: Duration,
    ) -> Result<Self, MonitorError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("public-ip")
            .enable_all()
            .build()
            .map_err(MonitorError::Runtime)?;
        Ok(Self {
            runtime,
            fetcher,
            wait_budget,
        })
    }

    /// Dispatch one lookup and wait for it up to the budget. A lookup still in flight
    /// when the budget runs out is left to finish (or fail) on its own.
    pub fn resolve(&self) -> Option<String> {
        let fetcher = Arc::clone(&self.fetcher);
        let task = self.runtime.spawn(async move { fetcher.fetch().await });
        let budget = self.wait_budget;
        // The timer must be created inside the runtime so it can reach the time driver.
        let outcome = self
            .runtime
            .block_on(async move { tokio::time::timeout(budget, task).await });
        match outcome {
            Ok(Ok(Ok(addr))) => Some(addr),
            Ok(Ok(Err(e))) => {
                debug!(error = %e, "public address lookup failed");
                None
            }
            Ok(Err(e)) => {
                debug!(error = %e, "public address task aborted");
                None
            }
            Err(_) => {
                debug!(
                    budget_ms = budget.as_millis() as u64,
                    "public address lookup abandoned"
                );
                None
            }
        }
    }
}
