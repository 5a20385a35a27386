use crate::error::Result;

/// Host-facing lifecycle: `start` once when listening begins, `stop` once when it ends
#[async_trait::async_trait]
pub trait Lifecycle {
    async fn start(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
}
