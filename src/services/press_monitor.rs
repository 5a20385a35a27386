use crate::config::Config;
use crate::error::Result;
use crate::press_error;
use crate::services::lifecycle::Lifecycle;
use crate::services::press_dispatcher::PressDispatcher;
use crate::services::signal_emitter::{create_signal_emitter, run_emitter, SignalEmitter};
use crate::services::toggle_listener::{create_toggle_listener, ToggleListenerTrait};
use crate::utils::MonotonicClock;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{error, info, warn};

const TOGGLE_CHANNEL_CAPACITY: usize = 64;
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

enum MonitorState {
    Idle,
    Running(RunningTasks),
    Stopped,
}

struct RunningTasks {
    listener: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
    emitter: JoinHandle<()>,
}

/// Связывает источник переключений, детекторы и отправку сигналов.
///
/// listener -> (mpsc) -> dispatcher -> (unbounded mpsc) -> emitter
pub struct PressMonitor {
    config: Arc<Config>,
    dry_run: bool,
    state: Mutex<MonitorState>,
}

impl PressMonitor {
    pub fn new(config: Arc<Config>, dry_run: bool) -> Self {
        info!("Инициализация PressMonitor (dry_run: {})", dry_run);
        Self {
            config,
            dry_run,
            state: Mutex::new(MonitorState::Idle),
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        match &*self.state.lock() {
            MonitorState::Idle => Ok(()),
            MonitorState::Running(_) => Err(press_error!(lifecycle, "PressMonitor уже запущен")),
            MonitorState::Stopped => Err(press_error!(lifecycle, "PressMonitor уже остановлен")),
        }
    }

    /// Запустить задачи с готовыми компонентами
    fn launch(
        &self,
        listener: Box<dyn ToggleListenerTrait + Send>,
        emitter: Arc<dyn SignalEmitter>,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if !matches!(*state, MonitorState::Idle) {
            return Err(press_error!(lifecycle, "PressMonitor нельзя запустить повторно"));
        }

        let (match_tx, match_rx) = mpsc::unbounded_channel();
        let (toggle_tx, toggle_rx) = mpsc::channel(TOGGLE_CHANNEL_CAPACITY);
        let dispatcher = PressDispatcher::new(&self.config.patterns, match_tx)?;

        let emitter = tokio::spawn(run_emitter(emitter, match_rx));
        let dispatcher = tokio::spawn(dispatcher.run(toggle_rx));
        let listener = tokio::spawn(async move {
            if let Err(e) = listener.run(toggle_tx).await {
                error!("Ошибка в ToggleListener: {}", e);
            }
        });

        *state = MonitorState::Running(RunningTasks {
            listener,
            dispatcher,
            emitter,
        });

        info!("PressMonitor запущен");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Lifecycle for PressMonitor {
    async fn start(&self) -> Result<()> {
        self.ensure_idle()?;

        let clock = MonotonicClock::new();
        let emitter = create_signal_emitter(&self.config.signal, self.dry_run).await?;
        let listener = create_toggle_listener(self.config.clone(), clock, self.dry_run)?;

        self.launch(listener, emitter)
    }

    async fn stop(&self) -> Result<()> {
        let tasks = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, MonitorState::Stopped) {
                MonitorState::Running(tasks) => tasks,
                MonitorState::Idle => {
                    *state = MonitorState::Idle;
                    return Err(press_error!(lifecycle, "PressMonitor ещё не запущен"));
                }
                MonitorState::Stopped => {
                    return Err(press_error!(lifecycle, "PressMonitor уже остановлен"));
                }
            }
        };

        info!("Остановка PressMonitor...");

        // Закрытие listener закрывает канал переключений, остальные задачи
        // дорабатывают накопленное и завершаются сами
        tasks.listener.abort();

        let shutdown = tokio::time::timeout(SHUTDOWN_TIMEOUT, async move {
            let _ = tasks.listener.await;
            let _ = tasks.dispatcher.await;
            let _ = tasks.emitter.await;
        })
        .await;

        match shutdown {
            Ok(()) => info!("PressMonitor остановлен"),
            Err(_) => warn!("Таймаут при остановке PressMonitor"),
        }

        Ok(())
    }
}
