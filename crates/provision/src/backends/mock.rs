//! In-memory collaborators used by the provisioning tests.

use crate::launcher::ServiceLauncher;
use crate::source::SeedSource;
use seedbed_core::{AppError, AppResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// How a [`MockSeedSource`] fails, if at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// Respond with a non-success HTTP status before sending any body.
    Status(u16),

    /// Send this many bytes of the body, then drop the connection.
    AfterBytes(usize),
}

/// Seed source serving a fixed body and counting requests.
#[derive(Debug)]
pub struct MockSeedSource {
    body: Vec<u8>,
    failure: Option<MockFailure>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl MockSeedSource {
    /// Serve `body` successfully.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            failure: None,
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// Serve `body`, but fail in the given way.
    pub fn failing(body: impl Into<Vec<u8>>, failure: MockFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::new(body)
        }
    }

    /// Number of fetches issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// URLs requested, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.urls.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl SeedSource for MockSeedSource {
    fn source_name(&self) -> &str {
        "mock"
    }

    async fn fetch_into(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> AppResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut urls) = self.urls.lock() {
            urls.push(url.to_string());
        }

        let to_write = match self.failure {
            Some(MockFailure::Status(code)) => {
                return Err(AppError::Fetch(format!("{} returned {}", url, code)));
            }
            Some(MockFailure::AfterBytes(n)) => &self.body[..n.min(self.body.len())],
            None => &self.body[..],
        };

        sink.write_all(to_write)
            .await
            .map_err(|e| AppError::Write(format!("Failed to write seed chunk: {}", e)))?;

        if let Some(MockFailure::AfterBytes(n)) = self.failure {
            return Err(AppError::Fetch(format!(
                "connection to {} closed after {} bytes",
                url, n
            )));
        }

        Ok(to_write.len() as u64)
    }
}

/// Launcher that records start requests instead of running anything.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    calls: AtomicUsize,
    fail_with: Option<String>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every start request fails with a `ServiceStart` error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_with: Some(message.into()),
        }
    }

    /// Number of start requests received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ServiceLauncher for RecordingLauncher {
    fn launcher_name(&self) -> &str {
        "recording"
    }

    async fn start(&self) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_with {
            Some(ref message) => Err(AppError::ServiceStart(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_source_serves_body() {
        let source = MockSeedSource::new(b"CREATE TABLE t();".to_vec());
        let mut sink = Vec::new();

        let written = source.fetch_into("https://example.com/a.sql", &mut sink).await.unwrap();

        assert_eq!(written, 17);
        assert_eq!(sink, b"CREATE TABLE t();");
        assert_eq!(source.calls(), 1);
        assert_eq!(source.requested_urls(), vec!["https://example.com/a.sql"]);
    }

    #[tokio::test]
    async fn test_mock_source_partial_failure_writes_prefix() {
        let source = MockSeedSource::failing(vec![7u8; 100], MockFailure::AfterBytes(40));
        let mut sink = Vec::new();

        let result = source.fetch_into("https://example.com/a.sql", &mut sink).await;

        assert!(matches!(result, Err(AppError::Fetch(_))));
        assert_eq!(sink.len(), 40);
    }

    #[tokio::test]
    async fn test_recording_launcher_counts() {
        let launcher = RecordingLauncher::new();
        launcher.start().await.unwrap();
        launcher.start().await.unwrap();
        assert_eq!(launcher.calls(), 2);

        let failing = RecordingLauncher::failing("daemon not running");
        assert!(matches!(failing.start().await, Err(AppError::ServiceStart(_))));
        assert_eq!(failing.calls(), 1);
    }
}
