use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Failure modes of a single page fetch. The crawl loop branches on the
/// variant: TLS failures trigger the session-wide downgrade, everything else
/// abandons the URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("tls failure: {0}")]
    Tls(String),
    #[error("request timed out")]
    Timeout,
    #[error("transport failure: {0}")]
    Transport(String),
}

/// A fetched HTTP response with the body already read.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

impl FetchedPage {
    /// Only 200 text/html responses are worth parsing.
    pub fn is_html_ok(&self) -> bool {
        self.status == 200 && self.content_type.contains("text/html")
    }
}

/// A source of pages. Production uses [`HttpFetcher`]; crawl-loop tests
/// script their own.
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// Disable certificate verification for the rest of the session.
    /// One-way: there is no way back to verified mode.
    fn downgrade_tls(&mut self);

    fn tls_downgraded(&self) -> bool;
}

/// reqwest-backed fetcher holding the session client.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
    timeout: Duration,
    ca_certs: Vec<reqwest::Certificate>,
    insecure: bool,
}

impl HttpFetcher {
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        ca_certs: Vec<reqwest::Certificate>,
        insecure: bool,
    ) -> anyhow::Result<Self> {
        let client = build_client(user_agent, timeout, &ca_certs, insecure)?;
        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
            timeout,
            ca_certs,
            insecure,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await.map_err(classify_error)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await.map_err(classify_error)?;
        Ok(FetchedPage {
            status,
            content_type,
            body,
        })
    }

    fn downgrade_tls(&mut self) {
        self.insecure = true;
        match build_client(&self.user_agent, self.timeout, &self.ca_certs, true) {
            Ok(client) => self.client = client,
            Err(e) => warn!("could not rebuild client without verification: {e}"),
        }
    }

    fn tls_downgraded(&self) -> bool {
        self.insecure
    }
}

fn build_client(
    user_agent: &str,
    timeout: Duration,
    ca_certs: &[reqwest::Certificate],
    insecure: bool,
) -> anyhow::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .danger_accept_invalid_certs(insecure);
    for cert in ca_certs {
        builder = builder.add_root_certificate(cert.clone());
    }
    Ok(builder.build()?)
}

/// reqwest has no dedicated certificate-failure kind, so the error chain text
/// decides between the TLS and transport variants.
fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        return FetchError::Timeout;
    }
    let chain = format!("{e:?}").to_lowercase();
    if chain.contains("certificate") || chain.contains("tls") || chain.contains("handshake") {
        FetchError::Tls(e.to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}
