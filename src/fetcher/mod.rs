use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, info, warn};

/// Thin HTTP client for SEFAZ invoice query pages.
///
/// One GET per call. No retries and no timeout are configured: the request
/// blocks until the server answers or the connection fails.
#[derive(Clone, Debug)]
pub struct InvoiceFetcher {
    http: Client,
}

impl InvoiceFetcher {
    pub fn new(user_agent: Option<&str>) -> Result<Self> {
        let mut builder = Client::builder().use_rustls_tls();
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent);
        }

        let http = builder
            .build()
            .context("Unable to construct reqwest client")?;

        Ok(Self { http })
    }

    /// Returns the raw page body.
    ///
    /// Non-2xx responses are logged and their body returned anyway; the
    /// extractor fails on the missing markers instead.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching invoice page: {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to send request to invoice URL")?;

        let status = response.status();
        if !status.is_success() {
            warn!("Invoice page answered with status {}", status);
        }

        let final_url = response.url().to_string();
        if final_url != url {
            info!("Invoice URL redirected: {} -> {}", url, final_url);
        }

        let body = response
            .text()
            .await
            .context("Failed to read invoice page body")?;

        debug!("Received HTML response of {} bytes", body.len());
        Ok(body)
    }
}
