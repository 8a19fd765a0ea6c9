#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Success,
    Error,
}

impl NotifyLevel {
    /// Background colour of the toast.
    pub fn color(self) -> &'static str {
        match self {
            NotifyLevel::Success => "#4CAF50",
            NotifyLevel::Error => "#f44336",
            NotifyLevel::Info => "#2196F3",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotifyLevel,
}

impl Notification {
    pub fn new(message: impl Into<String>, level: NotifyLevel) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }
}
