use crate::{
    prober::Probe,
    types::{Acceptance, ProbeMetadata, ProbeOutcome, ScanConfig},
};
use reqwest::{redirect, Client};
use std::{future::Future, time::Duration};

pub const USER_AGENT: &str = concat!("recon/", env!("CARGO_PKG_VERSION"));

/// Client used for path probing. Redirects are not followed so that 3xx
/// statuses reach the acceptance predicate.
pub fn create_http_pool(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .redirect(redirect::Policy::none())
        .pool_max_idle_per_host(100)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .use_rustls_tls()
        .build()
}

/// Issues a GET against a full URL and judges the response status.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    timeout: Duration,
    acceptance: Acceptance,
}

impl HttpProbe {
    pub fn new(config: &ScanConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(create_http_pool(config.timeout)?, config))
    }

    pub fn with_client(client: Client, config: &ScanConfig) -> Self {
        Self {
            client,
            timeout: config.timeout,
            acceptance: config.acceptance.clone(),
        }
    }
}

impl Probe for HttpProbe {
    fn probe(&self, candidate: String) -> impl Future<Output = ProbeOutcome> + Send {
        async move {
            let result = tokio::time::timeout(self.timeout, self.client.get(&candidate).send()).await;

            match result {
                Ok(Ok(response)) => {
                    let status = response.status().as_u16();
                    ProbeOutcome::judge(candidate, ProbeMetadata::Http { status }, &self.acceptance)
                }
                Ok(Err(e)) => {
                    tracing::debug!(url = %candidate, "request failed: {}", e);
                    ProbeOutcome::failed(candidate, format!("Request failed: {}", e))
                }
                Err(_) => ProbeOutcome::failed(candidate, "Timeout"),
            }
        }
    }
}
