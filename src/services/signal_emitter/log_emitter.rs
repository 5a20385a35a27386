use crate::error::Result;
use crate::events::MatchSignal;
use tracing::info;

use super::r#trait::SignalEmitter;

pub struct LogSignalEmitter;

#[async_trait::async_trait]
impl SignalEmitter for LogSignalEmitter {
    async fn emit(&self, signal: &MatchSignal) -> Result<()> {
        info!("[DRY RUN] Сигнал: {}", signal);
        Ok(())
    }
}
