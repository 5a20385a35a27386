use crate::error::DetectorConfigError;
use smallvec::{smallvec, SmallVec};
use std::fmt;
use tracing::{debug, warn};

/// Окно по умолчанию для двойного и тройного нажатия
pub const DEFAULT_WINDOW_MS: i64 = 2000;

/// Верхняя граница длины шаблона: буфер выделяется целиком при создании
pub const MAX_PRESSES: usize = 64;

pub type MatchCallback = Box<dyn FnMut() + Send>;

/// Параметры одного шаблона нажатий
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorConfig {
    signal: String,
    capacity: usize,
    window_ms: i64,
}

impl DetectorConfig {
    pub fn new(
        signal: impl Into<String>,
        capacity: usize,
        window_ms: i64,
    ) -> Result<Self, DetectorConfigError> {
        let signal = signal.into();
        if capacity < 2 {
            return Err(DetectorConfigError::TooFewPresses(capacity));
        }
        if capacity > MAX_PRESSES {
            return Err(DetectorConfigError::TooManyPresses(capacity, MAX_PRESSES));
        }
        if window_ms <= 0 {
            return Err(DetectorConfigError::NonPositiveWindow(window_ms));
        }
        if signal.trim().is_empty() {
            return Err(DetectorConfigError::EmptySignal);
        }

        Ok(Self {
            signal,
            capacity,
            window_ms,
        })
    }

    pub fn signal(&self) -> &str {
        &self.signal
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }
}

/// Результат обработки одного переключения
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Нажатий пока меньше N
    Pending,
    /// N нажатий есть, но они не уложились в окно
    Missed { span_ms: i64 },
    /// Шаблон совпал, callback вызван, счётчик сброшен
    Matched { span_ms: i64 },
    /// Метка времени меньше предыдущей, счётчик сброшен
    ClockAnomaly { previous_ms: i64 },
}

/// Детектор N последовательных нажатий в фиксированном окне.
///
/// Кольцевой буфер на N меток: слот `i` хранит нажатие с порядковым номером
/// `≡ i (mod N)`. После совпадения `press_count` обнуляется, старые метки
/// остаются в буфере, но недостижимы, пока не будут перезаписаны N новыми
/// нажатиями. Промах окно не сдвигает.
pub struct PressPatternDetector {
    config: DetectorConfig,
    timestamps: SmallVec<[i64; 4]>,
    press_count: u64,
    last_timestamp: Option<i64>,
    on_match: MatchCallback,
}

impl PressPatternDetector {
    pub fn new(config: DetectorConfig, on_match: MatchCallback) -> Self {
        debug!(
            "Создание детектора '{}' (нажатий: {}, окно: {} мс)",
            config.signal, config.capacity, config.window_ms
        );

        Self {
            timestamps: smallvec![0; config.capacity],
            config,
            press_count: 0,
            last_timestamp: None,
            on_match,
        }
    }

    pub fn on_toggle(&mut self, timestamp: i64) -> ToggleOutcome {
        if let Some(previous) = self.last_timestamp {
            if timestamp < previous {
                warn!(
                    "'{}': немонотонные часы ({} мс < {} мс), счётчик нажатий сброшен",
                    self.config.signal, timestamp, previous
                );
                self.last_timestamp = Some(timestamp);
                self.reset();
                return ToggleOutcome::ClockAnomaly {
                    previous_ms: previous,
                };
            }
        }
        self.last_timestamp = Some(timestamp);

        let capacity = self.config.capacity as u64;
        self.timestamps[(self.press_count % capacity) as usize] = timestamp;
        self.press_count += 1;

        if self.press_count < capacity {
            return ToggleOutcome::Pending;
        }

        // Слот, который будет перезаписан следующим, хранит нажатие N шагов назад
        let oldest = self.timestamps[(self.press_count % capacity) as usize];
        // Разность, не влезающая в i64, заведомо больше любого окна
        let Some(span_ms) = timestamp.checked_sub(oldest) else {
            return ToggleOutcome::Missed { span_ms: i64::MAX };
        };

        if span_ms <= self.config.window_ms {
            debug!(
                "'{}': {} нажатий за {} мс - совпадение",
                self.config.signal, capacity, span_ms
            );
            (self.on_match)();
            self.reset();
            ToggleOutcome::Matched { span_ms }
        } else {
            ToggleOutcome::Missed { span_ms }
        }
    }

    /// Начать подсчёт нажатий заново. Содержимое буфера не трогаем.
    pub fn reset(&mut self) {
        self.press_count = 0;
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn press_count(&self) -> u64 {
        self.press_count
    }
}

impl fmt::Debug for PressPatternDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PressPatternDetector")
            .field("config", &self.config)
            .field("timestamps", &self.timestamps)
            .field("press_count", &self.press_count)
            .field("last_timestamp", &self.last_timestamp)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn detector(capacity: usize, window_ms: i64) -> (PressPatternDetector, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let config = DetectorConfig::new("TestPress", capacity, window_ms).unwrap();
        let detector = PressPatternDetector::new(
            config,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        (detector, hits)
    }

    fn feed(detector: &mut PressPatternDetector, timestamps: &[i64]) -> Vec<ToggleOutcome> {
        timestamps.iter().map(|&t| detector.on_toggle(t)).collect()
    }

    #[test]
    fn test_config_rejects_invalid_values() {
        assert_eq!(
            DetectorConfig::new("X", 1, 2000),
            Err(DetectorConfigError::TooFewPresses(1))
        );
        assert_eq!(
            DetectorConfig::new("X", 0, 2000),
            Err(DetectorConfigError::TooFewPresses(0))
        );
        assert_eq!(
            DetectorConfig::new("X", MAX_PRESSES + 1, 2000),
            Err(DetectorConfigError::TooManyPresses(MAX_PRESSES + 1, MAX_PRESSES))
        );
        assert_eq!(
            DetectorConfig::new("X", 1_000_000_000_000, 2000),
            Err(DetectorConfigError::TooManyPresses(1_000_000_000_000, MAX_PRESSES))
        );
        assert!(DetectorConfig::new("X", MAX_PRESSES, 2000).is_ok());
        assert_eq!(
            DetectorConfig::new("X", 2, 0),
            Err(DetectorConfigError::NonPositiveWindow(0))
        );
        assert_eq!(
            DetectorConfig::new("X", 3, -5),
            Err(DetectorConfigError::NonPositiveWindow(-5))
        );
        assert_eq!(
            DetectorConfig::new("  ", 2, 2000),
            Err(DetectorConfigError::EmptySignal)
        );
    }

    #[test]
    fn test_n_toggles_within_window_match_once_on_last() {
        for capacity in 2..=5usize {
            let (mut d, hits) = detector(capacity, 2000);
            let timestamps: Vec<i64> = (0..capacity as i64).map(|i| i * 100).collect();
            let outcomes = feed(&mut d, &timestamps);

            for outcome in &outcomes[..capacity - 1] {
                assert_eq!(*outcome, ToggleOutcome::Pending);
            }
            assert!(matches!(outcomes[capacity - 1], ToggleOutcome::Matched { .. }));
            assert_eq!(hits.load(Ordering::SeqCst), 1);
            assert_eq!(d.press_count(), 0);
        }
    }

    #[test]
    fn test_n_toggles_outside_window_never_match() {
        let (mut d, hits) = detector(3, 2000);
        let outcomes = feed(&mut d, &[0, 1000, 2001]);
        assert_eq!(outcomes[2], ToggleOutcome::Missed { span_ms: 2001 });
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_span_equal_to_window_matches() {
        let (mut d, hits) = detector(2, 2000);
        feed(&mut d, &[0, 2000]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fewer_than_n_toggles_never_match() {
        let (mut d, hits) = detector(3, 2000);
        let outcomes = feed(&mut d, &[0, 1]);
        assert!(outcomes.iter().all(|o| *o == ToggleOutcome::Pending));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_double_press_within_window() {
        let (mut d, hits) = detector(2, 2000);
        let outcomes = feed(&mut d, &[0, 1500]);
        assert_eq!(outcomes[1], ToggleOutcome::Matched { span_ms: 1500 });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_double_press_miss_then_next_pair_matches() {
        let (mut d, hits) = detector(2, 2000);
        assert_eq!(d.on_toggle(0), ToggleOutcome::Pending);
        assert_eq!(d.on_toggle(2500), ToggleOutcome::Missed { span_ms: 2500 });
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        assert_eq!(d.on_toggle(2600), ToggleOutcome::Matched { span_ms: 100 });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_triple_press_then_count_restarts() {
        let (mut d, hits) = detector(3, 2000);
        let outcomes = feed(&mut d, &[0, 500, 1900]);
        assert_eq!(outcomes[2], ToggleOutcome::Matched { span_ms: 1900 });
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert_eq!(d.on_toggle(1950), ToggleOutcome::Pending);
        assert_eq!(d.press_count(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_match_requires_n_new_presses_after_reset() {
        // Буфер после совпадения хранит 500 и 1900, но они не должны учитываться
        let (mut d, hits) = detector(3, 2000);
        feed(&mut d, &[0, 500, 1900]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert_eq!(d.on_toggle(1950), ToggleOutcome::Pending);
        assert_eq!(d.on_toggle(2000), ToggleOutcome::Pending);
        assert_eq!(d.on_toggle(2050), ToggleOutcome::Matched { span_ms: 100 });
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_overlapping_windows_are_not_double_counted() {
        // Четыре быстрых нажатия дают два двойных, а не три
        let (mut d, hits) = detector(2, 2000);
        feed(&mut d, &[0, 100, 200, 300]);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_miss_does_not_slide_window() {
        let (mut d, hits) = detector(3, 2000);
        // 0, 3000, 3100: промах (3100 - 0 > 2000), счётчик продолжает расти
        assert_eq!(
            feed(&mut d, &[0, 3000, 3100])[2],
            ToggleOutcome::Missed { span_ms: 3100 }
        );
        assert_eq!(d.press_count(), 3);
        // Следующее нажатие сравнивается с 3000
        assert_eq!(d.on_toggle(3200), ToggleOutcome::Matched { span_ms: 200 });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_equal_timestamps_are_not_an_anomaly() {
        let (mut d, hits) = detector(2, 2000);
        let outcomes = feed(&mut d, &[700, 700]);
        assert_eq!(outcomes[1], ToggleOutcome::Matched { span_ms: 0 });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clock_regression_resets_count() {
        let (mut d, hits) = detector(2, 2000);
        assert_eq!(d.on_toggle(1000), ToggleOutcome::Pending);
        assert_eq!(
            d.on_toggle(800),
            ToggleOutcome::ClockAnomaly { previous_ms: 1000 }
        );
        assert_eq!(d.press_count(), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clock_regression_rebases_on_new_reading() {
        let (mut d, hits) = detector(2, 2000);
        feed(&mut d, &[5000, 100]);
        // Отсчёт продолжается от новой метки, а не от 5000
        assert_eq!(d.on_toggle(200), ToggleOutcome::Pending);
        assert_eq!(d.on_toggle(300), ToggleOutcome::Matched { span_ms: 100 });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_span_overflowing_i64_is_a_miss() {
        let (mut d, hits) = detector(2, 2000);
        assert_eq!(d.on_toggle(i64::MIN), ToggleOutcome::Pending);
        assert_eq!(
            d.on_toggle(i64::MAX),
            ToggleOutcome::Missed { span_ms: i64::MAX }
        );
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        // Следующая пара у верхней границы совпадает как обычно
        assert_eq!(d.on_toggle(i64::MAX), ToggleOutcome::Matched { span_ms: 0 });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clock_regression_after_match_is_detected() {
        let (mut d, _hits) = detector(2, 2000);
        feed(&mut d, &[0, 100]);
        assert_eq!(d.on_toggle(50), ToggleOutcome::ClockAnomaly { previous_ms: 100 });
    }
}
