use crate::{JobId, QueueErrorKind, SourceTag};

pub type ControlId = u64;

/// Lifecycle of one injected control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    #[default]
    Idle,
    Submitting,
    Queued,
    Failed(QueueErrorKind),
}

impl ControlState {
    /// Only an idle control accepts clicks.
    pub fn is_enabled(self) -> bool {
        matches!(self, ControlState::Idle)
    }
}

/// Click binding of a control: the job id is captured when the control is
/// injected and never re-read from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEntry {
    pub job_id: JobId,
    pub source: SourceTag,
    pub state: ControlState,
}
