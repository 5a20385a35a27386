use thiserror::Error;

#[derive(Error, Debug)]
pub enum PressError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Неверные параметры детектора: {0}")]
    Detector(#[from] DetectorConfigError),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка D-Bus: {0}")]
    DBus(#[from] zbus::Error),

    #[error("Устройство не найдено: {0}")]
    DeviceNotFound(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[error("Нарушен порядок запуска/остановки: {0}")]
    Lifecycle(String),
}

impl PressError {
    pub fn device_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(PressError::DeviceNotFound(msg.into()))
    }
}

/// Ошибки построения детектора. Фатальны для конструирования: конфигурацию
/// нужно исправить и создать детектор заново.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectorConfigError {
    #[error("требуется минимум 2 нажатия, указано {0}")]
    TooFewPresses(usize),

    #[error("допускается не более {1} нажатий, указано {0}")]
    TooManyPresses(usize, usize),

    #[error("окно должно быть больше 0 мс, указано {0}")]
    NonPositiveWindow(i64),

    #[error("пустое имя сигнала")]
    EmptySignal,
}

pub type Result<T> = std::result::Result<T, PressError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! press_error {
    (device_not_found, $($arg:tt)*) => {
        $crate::error::PressError::DeviceNotFound(format!($($arg)*))
    };
    (permission, $($arg:tt)*) => {
        $crate::error::PressError::Permission(format!($($arg)*))
    };
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::PressError::ServiceUnavailable(format!($($arg)*))
    };
    (lifecycle, $($arg:tt)*) => {
        $crate::error::PressError::Lifecycle(format!($($arg)*))
    };
}
