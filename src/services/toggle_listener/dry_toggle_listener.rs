use crate::error::Result;
use crate::events::{KeyState, ToggleEvent};
use crate::utils::MonotonicClock;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::info;

use super::r#trait::ToggleListenerTrait;

/// Сценарий эмуляции: (описание, паузы перед каждым нажатием в мс)
const SCRIPT: &[(&str, &[u64])] = &[
    ("двойное нажатие", &[0, 400]),
    ("тройное нажатие", &[0, 300, 300]),
    ("слишком медленная пара", &[0, 2500]),
];

const PAUSE_BETWEEN_BURSTS: Duration = Duration::from_secs(5);

pub struct DryRunToggleListener {
    clock: MonotonicClock,
}

impl DryRunToggleListener {
    pub fn new(clock: MonotonicClock) -> Self {
        info!("Инициализация DryRunToggleListener");
        Self { clock }
    }

    async fn run_impl(self, events: mpsc::Sender<ToggleEvent>) -> Result<()> {
        info!("Dry-run режим - нажатия кнопки эмулируются");

        for (title, delays) in SCRIPT.iter().cycle() {
            sleep(PAUSE_BETWEEN_BURSTS).await;
            info!("Dry-run: эмулируем {}", title);

            for delay in delays.iter() {
                sleep(Duration::from_millis(*delay)).await;
                let toggle = ToggleEvent::new(self.clock.now_ms(), KeyState::Pressed, "dry-run");
                if events.send(toggle).await.is_err() {
                    return Ok(());
                }
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl ToggleListenerTrait for DryRunToggleListener {
    async fn run(self: Box<Self>, events: mpsc::Sender<ToggleEvent>) -> Result<()> {
        (*self).run_impl(events).await
    }
}
