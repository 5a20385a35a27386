use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::detector::{DetectorConfig, DEFAULT_WINDOW_MS};
use crate::error::DetectorConfigError;
use crate::events::ToggleEdge;
use crate::mappings::KeyNameToEvdevCode;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default = "default_patterns")]
    pub patterns: Vec<PatternConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    pub device_path: String,
    pub key: String,
    #[serde(default)]
    pub toggle_on: ToggleEdge,
    /// Эксклюзивный захват устройства. По умолчанию выключен, чтобы
    /// система продолжала обрабатывать кнопку питания.
    #[serde(default)]
    pub grab: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    Session,
    System,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignalConfig {
    pub bus: BusKind,
    pub object_path: String,
    pub interface: String,
    #[serde(default)]
    pub service_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PatternConfig {
    pub signal: String,
    pub presses: usize,
    #[serde(default = "default_window_ms")]
    pub window_ms: i64,
}

impl PatternConfig {
    pub fn detector_config(&self) -> std::result::Result<DetectorConfig, DetectorConfigError> {
        DetectorConfig::new(self.signal.clone(), self.presses, self.window_ms)
    }
}

impl InputConfig {
    pub fn key_code(&self) -> Result<u16> {
        KeyNameToEvdevCode::translate(&self.key).map_err(anyhow::Error::msg)
    }
}

fn default_window_ms() -> i64 {
    DEFAULT_WINDOW_MS
}

fn default_patterns() -> Vec<PatternConfig> {
    vec![
        PatternConfig {
            signal: "PowerButtonDoublePress".to_string(),
            presses: 2,
            window_ms: DEFAULT_WINDOW_MS,
        },
        PatternConfig {
            signal: "PowerButtonTriplePress".to_string(),
            presses: 3,
            window_ms: DEFAULT_WINDOW_MS,
        },
    ]
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device_path: "auto".to_string(),
            key: "KEY_POWER".to_string(),
            toggle_on: ToggleEdge::Press,
            grab: false,
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            bus: BusKind::Session,
            object_path: "/org/powerpress/PowerButton".to_string(),
            interface: "org.powerpress.PowerButton".to_string(),
            service_name: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            input: InputConfig::default(),
            signal: SignalConfig::default(),
            patterns: default_patterns(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("POWER_PRESS_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.input.device_path.is_empty() {
            anyhow::bail!("device_path не может быть пустым (используйте \"auto\")");
        }
        self.input.key_code()?;

        if !self.signal.object_path.starts_with('/') {
            anyhow::bail!("object_path должен начинаться с '/': {}", self.signal.object_path);
        }
        if !self.signal.interface.contains('.') {
            anyhow::bail!("Неверное имя интерфейса D-Bus: {}", self.signal.interface);
        }

        if self.patterns.is_empty() {
            anyhow::bail!("Не задано ни одного шаблона нажатий");
        }

        let mut seen = HashSet::new();
        for (i, pattern) in self.patterns.iter().enumerate() {
            pattern
                .detector_config()
                .with_context(|| format!("Неверный шаблон #{}", i + 1))?;

            if !is_member_name(&pattern.signal) {
                anyhow::bail!(
                    "Имя сигнала '{}' в шаблоне #{} недопустимо для D-Bus",
                    pattern.signal,
                    i + 1
                );
            }
            if !seen.insert(pattern.signal.as_str()) {
                anyhow::bail!("Сигнал '{}' указан несколько раз", pattern.signal);
            }
        }

        Ok(())
    }
}

/// Имя члена D-Bus: [A-Za-z_][A-Za-z0-9_]*, не длиннее 255
fn is_member_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 255 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
