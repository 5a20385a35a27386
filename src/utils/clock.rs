use std::time::Instant;

/// Монотонные часы в миллисекундах от момента создания.
/// Не зависят от перевода системного времени.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> i64 {
        i64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_never_regresses() {
        let clock = MonotonicClock::new();
        let mut previous = clock.now_ms();
        assert!(previous >= 0);
        for _ in 0..1000 {
            let now = clock.now_ms();
            assert!(now >= previous);
            previous = now;
        }
    }

    #[test]
    fn test_copies_share_epoch() {
        let clock = MonotonicClock::new();
        let copy = clock;
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!((copy.now_ms() - clock.now_ms()).abs() <= 1);
    }
}
