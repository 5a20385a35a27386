use std::fmt;

/// Сигнал о совпадении шаблона нажатий. Полезной нагрузки нет, только имя.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchSignal {
    name: String,
}

impl MatchSignal {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for MatchSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
