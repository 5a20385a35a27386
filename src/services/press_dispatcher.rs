use crate::config::PatternConfig;
use crate::debug_if_enabled;
use crate::detector::{PressPatternDetector, ToggleOutcome};
use crate::error::Result;
use crate::events::{MatchSignal, ToggleEvent};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Единственный потребитель канала переключений: только он вызывает
/// `on_toggle`, поэтому детекторы обрабатывают события строго по очереди.
pub struct PressDispatcher {
    detectors: Vec<PressPatternDetector>,
}

impl PressDispatcher {
    pub fn new(patterns: &[PatternConfig], matches: mpsc::UnboundedSender<MatchSignal>) -> Result<Self> {
        let mut detectors = Vec::with_capacity(patterns.len());

        for pattern in patterns {
            let config = pattern.detector_config()?;
            let signal = MatchSignal::new(config.signal());
            let matches = matches.clone();

            info!(
                "Шаблон '{}': {} нажатий за {} мс",
                config.signal(),
                config.capacity(),
                config.window_ms()
            );

            detectors.push(PressPatternDetector::new(
                config,
                Box::new(move || {
                    if matches.send(signal.clone()).is_err() {
                        warn!("Получатель сигналов закрыт, {} потерян", signal);
                    }
                }),
            ));
        }

        Ok(Self { detectors })
    }

    /// Передать одно переключение всем детекторам в порядке конфигурации.
    /// Возвращает число совпавших шаблонов.
    pub fn handle(&mut self, event: &ToggleEvent) -> usize {
        let mut matched = 0;

        for detector in &mut self.detectors {
            match detector.on_toggle(event.timestamp_ms) {
                ToggleOutcome::Matched { span_ms } => {
                    info!("Совпадение '{}' ({} мс)", detector.config().signal(), span_ms);
                    matched += 1;
                }
                ToggleOutcome::Missed { span_ms } => {
                    debug_if_enabled!(
                        "'{}': нажатия не уложились в окно ({} мс, всего подряд: {})",
                        detector.config().signal(),
                        span_ms,
                        detector.press_count()
                    );
                }
                ToggleOutcome::ClockAnomaly { previous_ms } => {
                    debug_if_enabled!(
                        "'{}': событие {} мс отброшено, предыдущее {} мс",
                        detector.config().signal(),
                        event.timestamp_ms,
                        previous_ms
                    );
                }
                ToggleOutcome::Pending => {}
            }
        }

        matched
    }

    pub async fn run(mut self, mut events: mpsc::Receiver<ToggleEvent>) {
        info!("PressDispatcher запущен ({} шаблонов)", self.detectors.len());

        while let Some(event) = events.recv().await {
            self.handle(&event);
        }

        info!("Канал переключений закрыт, PressDispatcher завершает работу");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::events::KeyState;

    fn press(timestamp_ms: i64) -> ToggleEvent {
        ToggleEvent::new(timestamp_ms, KeyState::Pressed, "test")
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<MatchSignal>) -> Vec<String> {
        let mut names = Vec::new();
        while let Ok(signal) = rx.try_recv() {
            names.push(signal.name().to_string());
        }
        names
    }

    #[test]
    fn test_default_patterns_fan_out() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = PressDispatcher::new(&Config::default().patterns, tx).unwrap();

        assert_eq!(dispatcher.handle(&press(0)), 0);
        // Второе нажатие: двойное совпало, тройное ждёт
        assert_eq!(dispatcher.handle(&press(300)), 1);
        // Третье нажатие: тройное совпало, двойное начало отсчёт заново
        assert_eq!(dispatcher.handle(&press(600)), 1);

        assert_eq!(
            drain(&mut rx),
            vec!["PowerButtonDoublePress", "PowerButtonTriplePress"]
        );
    }

    #[test]
    fn test_slow_presses_emit_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = PressDispatcher::new(&Config::default().patterns, tx).unwrap();

        for t in [0, 2500, 5000, 7500] {
            assert_eq!(dispatcher.handle(&press(t)), 0);
        }
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_invalid_pattern_fails_construction() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let patterns = vec![PatternConfig {
            signal: "Single".to_string(),
            presses: 1,
            window_ms: 2000,
        }];
        assert!(PressDispatcher::new(&patterns, tx).is_err());
    }

    #[test]
    fn test_closed_receiver_does_not_panic() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut dispatcher = PressDispatcher::new(&Config::default().patterns, tx).unwrap();
        drop(rx);

        dispatcher.handle(&press(0));
        assert_eq!(dispatcher.handle(&press(10)), 1);
    }

    #[tokio::test]
    async fn test_run_ends_when_channel_closes() {
        let (match_tx, mut match_rx) = mpsc::unbounded_channel();
        let (toggle_tx, toggle_rx) = mpsc::channel(8);
        let dispatcher = PressDispatcher::new(&Config::default().patterns, match_tx).unwrap();

        let handle = tokio::spawn(dispatcher.run(toggle_rx));
        toggle_tx.send(press(0)).await.unwrap();
        toggle_tx.send(press(100)).await.unwrap();
        drop(toggle_tx);

        handle.await.unwrap();
        assert_eq!(drain(&mut match_rx), vec!["PowerButtonDoublePress"]);
        // Детекторы сброшены вместе с диспетчером, отправителей не осталось
        assert!(match_rx.recv().await.is_none());
    }
}
