use crate::config::{BusKind, SignalConfig};
use crate::error::Result;
use crate::events::MatchSignal;
use crate::press_error;
use tracing::{debug, info};
use zbus::names::BusName;
use zbus::Connection;

use super::r#trait::SignalEmitter;

/// Рассылает сигналы D-Bus без тела всем подписчикам шины
pub struct DbusSignalEmitter {
    connection: Connection,
    object_path: String,
    interface: String,
}

impl DbusSignalEmitter {
    pub async fn connect(config: &SignalConfig) -> Result<Self> {
        info!("Подключение к {:?} шине D-Bus", config.bus);

        let connection = match config.bus {
            BusKind::Session => Connection::session().await,
            BusKind::System => Connection::system().await,
        }
        .map_err(|e| press_error!(service_unavailable, "шина {:?} недоступна: {}", config.bus, e))?;

        if let Some(name) = &config.service_name {
            connection.request_name(name.as_str()).await?;
            info!("Зарегистрировано имя D-Bus: {}", name);
        }

        info!(
            "Сигналы будут отправляться на {} ({})",
            config.object_path, config.interface
        );

        Ok(Self {
            connection,
            object_path: config.object_path.clone(),
            interface: config.interface.clone(),
        })
    }
}

#[async_trait::async_trait]
impl SignalEmitter for DbusSignalEmitter {
    async fn emit(&self, signal: &MatchSignal) -> Result<()> {
        self.connection
            .emit_signal(
                None::<BusName<'_>>,
                self.object_path.as_str(),
                self.interface.as_str(),
                signal.name(),
                &(),
            )
            .await?;

        debug!("Сигнал D-Bus {}.{} отправлен", self.interface, signal.name());
        Ok(())
    }
}
