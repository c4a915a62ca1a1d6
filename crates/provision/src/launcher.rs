//! Service launcher abstraction.

use seedbed_core::AppResult;

/// Opaque handle on the orchestration layer.
///
/// `start` issues a detached "bring it up" request and returns as soon as
/// the orchestration command does. It is expected to be idempotent: calling
/// it while the service already runs is not an error. Health and readiness
/// are not observed.
#[async_trait::async_trait]
pub trait ServiceLauncher: Send + Sync {
    /// Get the launcher name (e.g., "compose", "recording").
    fn launcher_name(&self) -> &str;

    /// Request that the declared services be started.
    async fn start(&self) -> AppResult<()>;
}
