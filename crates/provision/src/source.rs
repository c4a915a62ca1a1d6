//! Remote seed source abstraction.

use seedbed_core::AppResult;
use tokio::io::AsyncWrite;

/// Something that can stream the seed artifact's bytes into a writer.
///
/// Implementations report remote problems as `AppError::Fetch` and failures
/// writing into `sink` as `AppError::Write`. They must not retry.
#[async_trait::async_trait]
pub trait SeedSource: Send + Sync {
    /// Get the source name (e.g., "http", "mock").
    fn source_name(&self) -> &str;

    /// Copy the full content behind `url` into `sink`.
    ///
    /// # Returns
    /// Number of bytes written
    async fn fetch_into(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> AppResult<u64>;
}
