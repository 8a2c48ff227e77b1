use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, Request, Response, redirect::Policy};
use tower::util::BoxCloneService;
use tower::{BoxError, ServiceBuilder, ServiceExt};
use tracing::{debug, instrument};

use crate::config::SiteConfig;
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("tcb_fetch/", env!("CARGO_PKG_VERSION"));

const MAX_REDIRECTS: usize = 10;

// Requests queued in front of the limiters before callers start waiting.
const BUFFER_CAPACITY: usize = 1024;

type HttpService = BoxCloneService<Request, Response, BoxError>;

/// GET client shared by every stage of the pipeline.
///
/// All requests go through one rate limited and concurrency limited service,
/// so a burst of page downloads across several chapters still respects the
/// site's limits. Cloning is cheap and clones share those limits.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    // The boxed service is Send but not Sync; it is cloned out of the lock
    // before every request.
    service: Arc<Mutex<HttpService>>,
    timeout: Duration,
}

impl Downloader {
    /// Must be called from within a tokio runtime.
    pub fn new(site: &SiteConfig) -> Result<Self> {
        let redirect = if site.follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(redirect)
            .build()
            .map_err(|e| Error::transport(&site.base_url, e))?;

        let service: HttpService = ServiceBuilder::new()
            .boxed_clone()
            .buffer(BUFFER_CAPACITY)
            .concurrency_limit(site.concurrency_limit())
            .rate_limit(site.rate_limit.num, Duration::from_secs(site.rate_limit.secs))
            .service(client.clone());

        Ok(Self {
            client,
            service: Arc::new(Mutex::new(service)),
            timeout: site.timeout(),
        })
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let request = self
            .client
            .get(url)
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::transport(url, e))?;

        let service = self
            .service
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let response = service
            .oneshot(request)
            .await
            .map_err(|e| Error::transport(url, e))?;
        let status = response.status();
        debug!(%status, "response received");

        // Covers 3xx too when redirects are not followed.
        if !status.is_success() {
            return Err(Error::transport(url, format!("unexpected status {}", status)));
        }
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn listing(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        response.text().await.map_err(|e| Error::transport(url, e))
    }

    #[instrument(skip(self))]
    pub async fn chapter(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        response.text().await.map_err(|e| Error::transport(url, e))
    }

    #[instrument(skip(self))]
    pub async fn image(&self, url: &str) -> Result<Bytes> {
        let response = self.get(url).await?;
        response.bytes().await.map_err(|e| Error::transport(url, e))
    }
}
