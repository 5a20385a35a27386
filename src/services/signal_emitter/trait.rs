use crate::config::SignalConfig;
use crate::error::Result;
use crate::events::MatchSignal;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Outbound side: publishes matched press patterns
#[async_trait::async_trait]
pub trait SignalEmitter: Send + Sync {
    async fn emit(&self, signal: &MatchSignal) -> Result<()>;
}

/// Factory function to create an appropriate emitter based on the dry_run flag
pub async fn create_signal_emitter(
    config: &SignalConfig,
    dry_run: bool,
) -> Result<Arc<dyn SignalEmitter>> {
    if dry_run {
        Ok(Arc::new(super::log_emitter::LogSignalEmitter))
    } else {
        Ok(Arc::new(
            super::dbus_emitter::DbusSignalEmitter::connect(config).await?,
        ))
    }
}

/// Публикует сигналы, пока все отправители канала не закрыты.
/// Ошибка отправки одного сигнала не останавливает цикл.
pub async fn run_emitter(emitter: Arc<dyn SignalEmitter>, mut signals: mpsc::UnboundedReceiver<MatchSignal>) {
    while let Some(signal) = signals.recv().await {
        if let Err(e) = emitter.emit(&signal).await {
            error!("Не удалось отправить сигнал {}: {}", signal, e);
        }
    }
    info!("Канал сигналов закрыт, отправка завершена");
}
