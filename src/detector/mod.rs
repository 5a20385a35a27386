//! Detector of N consecutive toggles within a fixed time window.
//!
//! The detector is free of any I/O: it consumes monotonic timestamps through
//! `on_toggle` and reports a match through the callback supplied at
//! construction. Calls must be serialized by the owner.

mod press_pattern;

pub use press_pattern::{DetectorConfig, PressPatternDetector, ToggleOutcome, DEFAULT_WINDOW_MS};
