use crate::error::{PressError, Result};
use evdev::KeyCode;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct DeviceFinder;

impl DeviceFinder {
    /// Найти устройство, умеющее сообщать о клавише `key`
    pub fn find_toggle_device(device_path: &str, key: KeyCode) -> Result<PathBuf> {
        if device_path != "auto" {
            let path = PathBuf::from(device_path);
            return if path.exists() {
                info!("Используется указанное устройство: {:?}", path);
                Ok(path)
            } else {
                PressError::device_not_found(format!(
                    "Указанное устройство не найдено: {:?}",
                    path
                ))
            };
        }

        Self::auto_find(key)
    }

    fn auto_find(key: KeyCode) -> Result<PathBuf> {
        info!("Начинаем автопоиск устройства с клавишей {:?}...", key);

        let input_dir = Path::new("/dev/input");
        let entries = fs::read_dir(input_dir).map_err(|e| {
            PressError::Permission(format!("Нет доступа к /dev/input: {}", e))
        })?;

        let mut event_devices = Vec::new();
        for entry in entries {
            let path = entry.map_err(PressError::Io)?.path();
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.starts_with("event") {
                event_devices.push(path);
            }
        }
        event_devices.sort();

        let mut candidates = Vec::new();
        for device_path in event_devices {
            debug!("Проверяем устройство: {:?}", device_path);
            if let Some(name) = Self::device_name_if_supports(&device_path, key) {
                let priority = Self::priority(&name);
                info!(
                    "Подходящее устройство: {} -> {} (приоритет: {})",
                    name,
                    device_path.display(),
                    priority
                );
                candidates.push((device_path, priority));
            }
        }

        // sort_by стабильна: при равном приоритете остаётся меньший номер event
        candidates.sort_by(|a, b| b.1.cmp(&a.1));

        match candidates.into_iter().next() {
            Some((path, _)) => Ok(path),
            None => PressError::device_not_found(format!(
                "Не найдено доступное устройство с клавишей {:?}. \
                 Убедитесь, что пользователь добавлен в группу 'input'",
                key
            )),
        }
    }

    /// Выделенные устройства кнопки питания предпочтительнее клавиатур
    fn priority(device_name: &str) -> u8 {
        let name = device_name.to_lowercase();
        if name.contains("power button") {
            100
        } else if name.contains("button") {
            50
        } else {
            10
        }
    }

    fn device_name_if_supports(device_path: &Path, key: KeyCode) -> Option<String> {
        match evdev::Device::open(device_path) {
            Ok(device) => {
                let supported = device
                    .supported_keys()
                    .is_some_and(|keys| keys.contains(key));
                if supported {
                    Some(device.name().unwrap_or("Unknown").to_string())
                } else {
                    debug!("Устройство {:?} не поддерживает {:?}", device_path, key);
                    None
                }
            }
            Err(e) => {
                debug!("Не удалось открыть устройство {:?}: {}", device_path, e);
                None
            }
        }
    }
}
