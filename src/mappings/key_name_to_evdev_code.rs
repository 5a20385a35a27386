/// Преобразование имён клавиш в evdev коды
/// Поддерживаются только одиночные "кнопочные" клавиши, пригодные для подсчёта нажатий
pub struct KeyNameToEvdevCode;

const KEY_TABLE: &[(&str, u16)] = &[
    ("power", 116),       // KEY_POWER
    ("power2", 356),      // KEY_POWER2
    ("sleep", 142),       // KEY_SLEEP
    ("suspend", 205),     // KEY_SUSPEND
    ("wakeup", 143),      // KEY_WAKEUP
    ("screenlock", 152),  // KEY_SCREENLOCK
    ("mute", 113),        // KEY_MUTE
    ("volumedown", 114),  // KEY_VOLUMEDOWN
    ("volumeup", 115),    // KEY_VOLUMEUP
    ("camera", 212),      // KEY_CAMERA
    ("prog1", 148),       // KEY_PROG1
    ("help", 138),        // KEY_HELP
];

impl KeyNameToEvdevCode {
    /// Получить evdev код клавиши по её имени.
    /// Имя регистронезависимо, префикс `KEY_` необязателен: "KEY_POWER", "power".
    pub fn translate(key_name: &str) -> Result<u16, String> {
        let normalized = key_name.trim().to_lowercase();
        let short = normalized.strip_prefix("key_").unwrap_or(&normalized);

        KEY_TABLE
            .iter()
            .find(|(name, _)| *name == short)
            .map(|(_, code)| *code)
            .ok_or_else(|| format!("Неизвестная клавиша: {}", key_name))
    }
}
