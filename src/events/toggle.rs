use serde::{Deserialize, Serialize};
use std::fmt;

/// Состояние клавиши (значение evdev события EV_KEY)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
    Repeat,
}

impl KeyState {
    /// 0 - отпускание, 1 - нажатие, 2 - автоповтор
    pub fn from_evdev_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(KeyState::Released),
            1 => Some(KeyState::Pressed),
            2 => Some(KeyState::Repeat),
            _ => None,
        }
    }
}

/// Какие переходы клавиши считаются переключением
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleEdge {
    #[default]
    Press,
    Release,
    Both,
}

impl ToggleEdge {
    /// Автоповтор никогда не считается переключением
    pub fn accepts(self, state: KeyState) -> bool {
        matches!(
            (self, state),
            (ToggleEdge::Press, KeyState::Pressed)
                | (ToggleEdge::Release, KeyState::Released)
                | (ToggleEdge::Both, KeyState::Pressed | KeyState::Released)
        )
    }
}

/// Одно переключение кнопки с монотонной меткой времени
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleEvent {
    /// Миллисекунды монотонных часов, не wall-clock
    pub timestamp_ms: i64,
    pub state: KeyState,
    pub device_name: String,
}

impl ToggleEvent {
    pub fn new(timestamp_ms: i64, state: KeyState, device_name: impl Into<String>) -> Self {
        Self {
            timestamp_ms,
            state,
            device_name: device_name.into(),
        }
    }
}

impl fmt::Display for ToggleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}[{}] @{}ms",
            self.state, self.device_name, self.timestamp_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state_from_evdev_value() {
        assert_eq!(KeyState::from_evdev_value(0), Some(KeyState::Released));
        assert_eq!(KeyState::from_evdev_value(1), Some(KeyState::Pressed));
        assert_eq!(KeyState::from_evdev_value(2), Some(KeyState::Repeat));
        assert_eq!(KeyState::from_evdev_value(7), None);
    }

    #[test]
    fn test_toggle_edge_filtering() {
        assert!(ToggleEdge::Press.accepts(KeyState::Pressed));
        assert!(!ToggleEdge::Press.accepts(KeyState::Released));

        assert!(ToggleEdge::Release.accepts(KeyState::Released));
        assert!(!ToggleEdge::Release.accepts(KeyState::Pressed));

        assert!(ToggleEdge::Both.accepts(KeyState::Pressed));
        assert!(ToggleEdge::Both.accepts(KeyState::Released));

        for edge in [ToggleEdge::Press, ToggleEdge::Release, ToggleEdge::Both] {
            assert!(!edge.accepts(KeyState::Repeat));
        }
    }

    #[test]
    fn test_toggle_event_display() {
        let event = ToggleEvent::new(1500, KeyState::Pressed, "Power Button");
        assert_eq!(event.to_string(), "Pressed[Power Button] @1500ms");
    }
}
