//! Message input box and character counter.

/// Soft limit shown by the counter
pub const MAX_CHARS: usize = 4000;
const WARNING_ABOVE: usize = 3500;
const ERROR_ABOVE: usize = 3800;

/// Counter color level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterLevel {
    Normal,
    Warning,
    Error,
}

impl CounterLevel {
    /// CSS color variable the counter uses at this level.
    pub fn css_color(&self) -> &'static str {
        match self {
            CounterLevel::Normal => "var(--text-secondary)",
            CounterLevel::Warning => "var(--warning)",
            CounterLevel::Error => "var(--error)",
        }
    }
}

/// Character counter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCount {
    pub len: usize,
    pub level: CounterLevel,
}

impl CharCount {
    /// Count as the browser does (UTF-16 code units).
    pub fn of(text: &str) -> Self {
        let len = text.encode_utf16().count();
        let level = if len > ERROR_ABOVE {
            CounterLevel::Error
        } else if len > WARNING_ABOVE {
            CounterLevel::Warning
        } else {
            CounterLevel::Normal
        };
        Self { len, level }
    }

    pub fn label(&self) -> String {
        format!("{} / {}", self.len, MAX_CHARS)
    }
}

/// The pending message text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBox {
    value: String,
}

impl InputBox {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn char_count(&self) -> CharCount {
        CharCount::of(&self.value)
    }

    /// Take the trimmed text for sending.
    ///
    /// Whitespace-only input yields `None` and stays in the box.
    pub fn take_message(&mut self) -> Option<String> {
        let trimmed = self.value.trim();
        if trimmed.is_empty() {
            return None;
        }
        let message = trimmed.to_string();
        self.value.clear();
        Some(message)
    }
}
