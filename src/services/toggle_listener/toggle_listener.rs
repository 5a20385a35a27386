use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::{PressError, Result};
use crate::events::{KeyState, ToggleEdge, ToggleEvent};
use crate::utils::{DeviceFinder, MonotonicClock};
use evdev::{Device, EventType, KeyCode};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::r#trait::ToggleListenerTrait;

pub struct RealToggleListener {
    device: Device,
    device_name: String,
    key: KeyCode,
    edge: ToggleEdge,
    clock: MonotonicClock,
}

impl RealToggleListener {
    pub fn new(config: Arc<Config>, clock: MonotonicClock) -> Result<Self> {
        info!("Инициализация RealToggleListener");

        let key = KeyCode::new(config.input.key_code()?);
        let device_path = DeviceFinder::find_toggle_device(&config.input.device_path, key)?;

        let mut device = Device::open(&device_path).map_err(|e| {
            PressError::DeviceNotFound(format!(
                "Не удалось открыть устройство {:?}: {}",
                device_path, e
            ))
        })?;

        let device_name = device.name().unwrap_or("Unknown").to_string();

        if config.input.grab {
            if let Err(e) = device.grab() {
                Self::log_grab_error(&device_path, &e);
                return Err(PressError::Permission(format!(
                    "Не удалось захватить устройство эксклюзивно: {}",
                    e
                )));
            }
            info!("Устройство захвачено эксклюзивно");
        }

        info!(
            "Слушаем {:?} на '{}' ({}), переключение: {:?}",
            key,
            device_name,
            device_path.display(),
            config.input.toggle_on
        );

        Ok(Self {
            device,
            device_name,
            key,
            edge: config.input.toggle_on,
            clock,
        })
    }

    async fn run_impl(self, events: mpsc::Sender<ToggleEvent>) -> Result<()> {
        let Self {
            device,
            device_name,
            key,
            edge,
            clock,
        } = self;

        let mut stream = device.into_event_stream()?;
        info!("RealToggleListener запущен, начинаем чтение событий");

        loop {
            let event = match stream.next_event().await {
                Ok(event) => event,
                Err(e) if Self::is_device_gone(&e) => {
                    return Err(PressError::DeviceNotFound(format!(
                        "Устройство '{}' отключено: {}",
                        device_name, e
                    )));
                }
                Err(e) => {
                    error!("Ошибка чтения событий: {}", e);
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                    continue;
                }
            };

            if event.event_type() != EventType::KEY || event.code() != key.code() {
                continue;
            }

            let Some(state) = KeyState::from_evdev_value(event.value()) else {
                debug!("Неизвестное значение события: {}", event.value());
                continue;
            };

            if !edge.accepts(state) {
                continue;
            }

            // Метка ставится в момент чтения: время ядра в evdev - wall-clock
            let toggle = ToggleEvent::new(clock.now_ms(), state, device_name.as_str());
            debug_if_enabled!("Переключение: {}", toggle);

            if events.send(toggle).await.is_err() {
                info!("Канал переключений закрыт, RealToggleListener завершает работу");
                return Ok(());
            }
        }
    }

    /// Устройство извлечено: повторять чтение бессмысленно
    fn is_device_gone(e: &std::io::Error) -> bool {
        e.kind() == std::io::ErrorKind::NotFound || e.raw_os_error() == Some(libc::ENODEV)
    }

    fn log_grab_error(device_path: &Path, e: &std::io::Error) {
        warn!(
            "Не удалось захватить устройство {}: {}",
            device_path.display(),
            e
        );
        warn!("Устройство, вероятно, уже захвачено другим процессом.");
        warn!("Выключите input.grab, чтобы слушать без захвата");
    }
}

#[async_trait::async_trait]
impl ToggleListenerTrait for RealToggleListener {
    async fn run(self: Box<Self>, events: mpsc::Sender<ToggleEvent>) -> Result<()> {
        (*self).run_impl(events).await
    }
}
