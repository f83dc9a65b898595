use crate::args::BenchConfig;
use crate::error::BenchError;
use reqwest::{Client, Method, StatusCode, Url};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const PING_TIMEOUT: Duration = Duration::from_secs(1);

/// Pings the server until it returns 200 OK or the retries are exhausted.
pub struct ServerProbe {
    client: Client,
    method: Method,
    url: Url,
    delay: Duration,
    retries: u32,
}

impl ServerProbe {
    pub fn new(
        method: Method,
        url: Url,
        delay: Duration,
        retries: u32,
    ) -> Result<Self, BenchError> {
        let client = Client::builder()
            .timeout(PING_TIMEOUT)
            .build()
            .map_err(BenchError::InvalidRequest)?;
        Ok(Self {
            client,
            method,
            url,
            delay,
            retries,
        })
    }

    pub fn from_config(config: &BenchConfig) -> Result<Self, BenchError> {
        Self::new(
            config.method.clone(),
            config.url.clone(),
            config.ping_delay,
            config.ping_retries,
        )
    }

    pub async fn wait_for_server(&self, token: &CancellationToken) -> Result<(), BenchError> {
        for attempt in 1..=self.retries {
            if token.is_cancelled() {
                return Err(BenchError::Cancelled);
            }

            let request = self
                .client
                .request(self.method.clone(), self.url.clone())
                .build()
                .map_err(BenchError::InvalidRequest)?;
            let response = tokio::select! {
                _ = token.cancelled() => return Err(BenchError::Cancelled),
                response = self.client.execute(request) => response,
            };
            match response {
                Ok(response) if response.status() == StatusCode::OK => return Ok(()),
                Ok(response) => debug!(attempt, status = %response.status(), "Server is not ready"),
                Err(err) => debug!(attempt, "Server ping failed: {err}"),
            }

            tokio::select! {
                _ = token.cancelled() => return Err(BenchError::Cancelled),
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
        Err(BenchError::ServerNotReady(self.retries))
    }
}
