//! HTTP transport module
//!
//! This module performs the single blocking GET behind every catalog request.
//! The response body is returned whatever the HTTP status is; interpreting it
//! is left to the envelope decoder.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// How often a cancellable request checks its token while waiting
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Timeout of a cancellable request that has no deadline of its own
pub const DEFAULT_CANCELLABLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while performing an HTTP request
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or no response was received
    #[error("Request to {url} failed: {source}")]
    Request { url: Url, source: reqwest::Error },

    /// The deadline passed before the response completed
    #[error("Request to {url} timed out")]
    TimedOut { url: Url },

    /// The caller cancelled the request before the response completed
    #[error("Request to {url} was cancelled")]
    Cancelled { url: Url },

    /// The response body could not be read
    #[error("Failed to read response body from {url}: {source}")]
    Body { url: Url, source: reqwest::Error },

    /// Local I/O failure while running the request
    #[error("I/O error during request to {url}: {source}")]
    Io { url: Url, source: io::Error },
}

/// Coarse classification of a [`TransportError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// DNS, connection refused/reset or TLS failure
    Connect,
    TimedOut,
    Cancelled,
    Body,
    Other,
}

impl TransportError {
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            TransportError::Request { source, .. } if source.is_connect() => {
                TransportErrorKind::Connect
            }
            TransportError::Request { .. } | TransportError::Io { .. } => TransportErrorKind::Other,
            TransportError::TimedOut { .. } => TransportErrorKind::TimedOut,
            TransportError::Cancelled { .. } => TransportErrorKind::Cancelled,
            TransportError::Body { .. } => TransportErrorKind::Body,
        }
    }

    /// URL of the request that failed
    pub fn url(&self) -> &Url {
        match self {
            TransportError::Request { url, .. }
            | TransportError::TimedOut { url }
            | TransportError::Cancelled { url }
            | TransportError::Body { url, .. }
            | TransportError::Io { url, .. } => url,
        }
    }
}

/// Shared flag used to abandon in-flight requests
///
/// Clones observe the same flag, so one clone can be handed to the code issuing
/// requests while another is kept to cancel them.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every call observing this token
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-call limits applied to a single request
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Point in time by which the response must be complete
    pub deadline: Option<Instant>,
    /// Token that aborts the wait for the response when triggered
    pub cancel: Option<CancelToken>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the deadline to `timeout` from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Time left until the deadline, `None` if there is no deadline
    fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

/// Performs a GET request and returns the full response body
///
/// Implementors must return the body for any HTTP status and only fail on
/// network-level problems.
pub trait Transport: Send + Sync {
    fn get(&self, url: &Url, options: &CallOptions) -> Result<Vec<u8>, TransportError>;
}

/// [`Transport`] backed by a blocking `reqwest` client
///
/// A call deadline overrides the timeout configured on the client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    cancellable_timeout: Duration,
}

impl HttpTransport {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self {
            client,
            cancellable_timeout: DEFAULT_CANCELLABLE_TIMEOUT,
        }
    }

    /// Sets the timeout of cancellable calls made without a deadline
    ///
    /// A cancelled call returns at once, but its connection is only closed when
    /// the worker running it gives up, so this bounds how long that can take.
    pub fn cancellable_timeout(mut self, timeout: Duration) -> Self {
        self.cancellable_timeout = timeout;
        self
    }

    /// Runs the request on a worker thread so the wait can be abandoned
    ///
    /// An abandoned worker still drains and drops its response when the
    /// request completes, or closes the connection when its timeout expires.
    fn fetch_cancellable(
        &self,
        url: &Url,
        timeout: Option<Duration>,
        token: &CancelToken,
    ) -> Result<Vec<u8>, TransportError> {
        let (tx, rx) = mpsc::channel();
        let client = self.client.clone();
        let worker_url = url.clone();
        let timeout = Some(timeout.unwrap_or(self.cancellable_timeout));

        thread::Builder::new()
            .name("anime365-request".to_string())
            .spawn(move || {
                // The receiver is gone if the caller cancelled
                let _ = tx.send(fetch(&client, &worker_url, timeout));
            })
            .map_err(|source| TransportError::Io {
                url: url.clone(),
                source,
            })?;

        loop {
            match rx.recv_timeout(CANCEL_POLL_INTERVAL) {
                Ok(result) => return result,
                Err(RecvTimeoutError::Timeout) => {
                    if token.is_cancelled() {
                        tracing::debug!(url = %url, "request cancelled");
                        return Err(TransportError::Cancelled { url: url.clone() });
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(TransportError::Io {
                        url: url.clone(),
                        source: io::Error::other("request worker exited without a result"),
                    });
                }
            }
        }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url, options: &CallOptions) -> Result<Vec<u8>, TransportError> {
        if options.is_cancelled() {
            return Err(TransportError::Cancelled { url: url.clone() });
        }

        let timeout = options.remaining();
        if timeout.is_some_and(|t| t.is_zero()) {
            return Err(TransportError::TimedOut { url: url.clone() });
        }

        match &options.cancel {
            None => fetch(&self.client, url, timeout),
            Some(token) => self.fetch_cancellable(url, timeout, token),
        }
    }
}

fn fetch(
    client: &reqwest::blocking::Client,
    url: &Url,
    timeout: Option<Duration>,
) -> Result<Vec<u8>, TransportError> {
    tracing::debug!(url = %url, "sending request");

    let mut request = client.get(url.clone());
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }

    let response = request.send().map_err(|source| {
        if source.is_timeout() {
            TransportError::TimedOut { url: url.clone() }
        } else {
            TransportError::Request {
                url: url.clone(),
                source,
            }
        }
    })?;

    let status = response.status();

    // Consuming the response reads the body to the end and releases the connection
    let body = response.bytes().map_err(|source| {
        if source.is_timeout() {
            TransportError::TimedOut { url: url.clone() }
        } else {
            TransportError::Body {
                url: url.clone(),
                source,
            }
        }
    })?;

    tracing::debug!(url = %url, status = status.as_u16(), bytes = body.len(), "response received");

    Ok(body.to_vec())
}
