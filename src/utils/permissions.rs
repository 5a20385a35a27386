use crate::config::InputConfig;
use crate::error::{PressError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const INPUT_DIR: &str = "/dev/input";

/// Убедиться, что узел кнопки питания можно открыть на чтение.
/// Для `device_path = "auto"` достаточно хотя бы одного читаемого event-узла.
pub fn check_permissions(input: &InputConfig) -> Result<()> {
    info!("Проверка доступа к устройствам ввода...");

    if input.device_path == "auto" {
        let readable = readable_event_nodes(Path::new(INPUT_DIR))?;
        if readable.is_empty() {
            return Err(PressError::Permission(format!(
                "ни один узел {}/event* не доступен на чтение, \
                 узел \"Power Button\" обычно принадлежит группе 'input'",
                INPUT_DIR
            )));
        }
        info!("Доступно event-узлов: {}", readable.len());
    } else {
        let path = Path::new(&input.device_path);
        fs::File::open(path).map_err(|e| {
            PressError::Permission(format!("{} не открывается на чтение: {}", path.display(), e))
        })?;
        info!("Доступ к {} подтвержден", path.display());
    }

    if std::env::var("USER").is_ok_and(|user| user == "root") {
        warn!("Запуск от root не нужен: кнопке питания хватает чтения event-узла");
        warn!("Сигналы session-шины от root не увидит пользовательская сессия");
    }

    Ok(())
}

/// event-узлы каталога, которые текущий пользователь может открыть
fn readable_event_nodes(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(PressError::Permission(format!(
            "каталог {} не существует",
            dir.display()
        )));
    }

    let mut readable = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_event = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("event"));
        if !is_event {
            continue;
        }
        match fs::File::open(&path) {
            Ok(_) => readable.push(path),
            Err(e) => debug!("{} недоступен: {}", path.display(), e),
        }
    }
    readable.sort();

    Ok(readable)
}

/// Команды, которые стоит выполнить при отказе в доступе
pub fn get_setup_commands() -> Vec<String> {
    vec![
        "# Найти узел кнопки питания и его группу:".to_string(),
        "grep -B1 -A4 'Power Button' /proc/bus/input/devices".to_string(),
        "ls -l /dev/input/event*".to_string(),
        "".to_string(),
        "# Разрешить чтение участникам группы input и перезайти:".to_string(),
        "sudo usermod -a -G input $USER".to_string(),
    ]
}
