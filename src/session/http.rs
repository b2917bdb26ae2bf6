//! reqwest-backed session factories and request helpers.
//!
//! Everything here is thin glue over the HTTP client: the factories build
//! pooled clients, the helpers resolve a session through the manager and
//! delegate straight to the client's native request methods. HTTP semantics
//! (retries, redirects, TLS) stay entirely with reqwest.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;
use url::Url;

use super::blocking::SessionManager;
use super::manager::AsyncSessionManager;
use super::{AsyncSessionFactory, AsyncTeardown, SessionFactory, Teardown};
use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::error::Result;

/// Idle connections kept alive per host
const POOL_MAX_IDLE_PER_HOST: usize = 10;

/// How long idle connections stay pooled
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// TCP keepalive probe interval
const TCP_KEEPALIVE: Duration = Duration::from_secs(60);

/// Maximum time to establish a connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

impl Teardown for reqwest::blocking::Client {
    fn close(&self) -> Result<()> {
        // reqwest has no explicit close; the connection pool is torn down
        // when the last clone of the client drops.
        Ok(())
    }
}

#[async_trait]
impl AsyncTeardown for reqwest::Client {
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Session factory producing pooled blocking clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl SessionFactory<reqwest::blocking::Client> for HttpConnector {
    fn connect(&self, endpoint: &Url) -> Result<reqwest::blocking::Client> {
        debug!(%endpoint, "constructing blocking HTTP session");
        Ok(reqwest::blocking::Client::builder()
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(Some(POOL_IDLE_TIMEOUT))
            .tcp_keepalive(Some(TCP_KEEPALIVE))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?)
    }
}

/// Session factory producing pooled async clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncHttpConnector;

#[async_trait]
impl AsyncSessionFactory<reqwest::Client> for AsyncHttpConnector {
    async fn connect(&self, endpoint: &Url) -> Result<reqwest::Client> {
        debug!(%endpoint, "constructing async HTTP session");
        Ok(reqwest::Client::builder()
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(Some(POOL_IDLE_TIMEOUT))
            .tcp_keepalive(Some(TCP_KEEPALIVE))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?)
    }
}

/// Blocking session manager specialized to reqwest clients.
pub type HttpSessionManager = SessionManager<reqwest::blocking::Client, HttpConnector>;

/// Async session manager specialized to reqwest clients.
pub type AsyncHttpSessionManager = AsyncSessionManager<reqwest::Client, AsyncHttpConnector>;

impl HttpSessionManager {
    /// Manager over pooled blocking clients with the default capacity.
    pub fn pooled() -> Self {
        SessionManager::new(HttpConnector)
    }

    /// GET `endpoint` through its cached session.
    ///
    /// `timeout` bounds the network call only and defaults to
    /// [`DEFAULT_REQUEST_TIMEOUT`] when `None`.
    pub fn get(
        &self,
        endpoint: &Url,
        timeout: Option<Duration>,
    ) -> Result<reqwest::blocking::Response> {
        let session = self.session(endpoint)?;
        Ok(session
            .get(endpoint.clone())
            .timeout(timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
            .send()?)
    }

    /// POST `body` to `endpoint` through its cached session.
    pub fn post(
        &self,
        endpoint: &Url,
        body: Bytes,
        timeout: Option<Duration>,
    ) -> Result<reqwest::blocking::Response> {
        let session = self.session(endpoint)?;
        Ok(session
            .post(endpoint.clone())
            .timeout(timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
            .body(body)
            .send()?)
    }

    /// POST `body` to `endpoint`, fail on non-2xx, return the raw body.
    pub fn post_bytes(
        &self,
        endpoint: &Url,
        body: Bytes,
        timeout: Option<Duration>,
    ) -> Result<Bytes> {
        let response = self.post(endpoint, body, timeout)?.error_for_status()?;
        Ok(response.bytes()?)
    }
}

impl AsyncHttpSessionManager {
    /// Manager over pooled async clients with the default capacity.
    pub fn pooled() -> Self {
        AsyncSessionManager::new(AsyncHttpConnector)
    }

    /// GET `endpoint` through its cached session.
    ///
    /// Async sessions treat non-success statuses as errors, so the response
    /// is checked before being returned. `timeout` bounds the network call
    /// only and defaults to [`DEFAULT_REQUEST_TIMEOUT`] when `None`.
    pub async fn get(
        &self,
        endpoint: &Url,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response> {
        let session = self.session(endpoint).await?;
        let response = session
            .get(endpoint.clone())
            .timeout(timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
            .send()
            .await?;
        Ok(response.error_for_status()?)
    }

    /// POST `body` to `endpoint` through its cached session.
    pub async fn post(
        &self,
        endpoint: &Url,
        body: Bytes,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response> {
        let session = self.session(endpoint).await?;
        let response = session
            .post(endpoint.clone())
            .timeout(timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
            .body(body)
            .send()
            .await?;
        Ok(response.error_for_status()?)
    }

    /// POST `body` to `endpoint`, fail on non-2xx, return the raw body.
    pub async fn post_bytes(
        &self,
        endpoint: &Url,
        body: Bytes,
        timeout: Option<Duration>,
    ) -> Result<Bytes> {
        let response = self.post(endpoint, body, timeout).await?;
        Ok(response.bytes().await?)
    }
}
