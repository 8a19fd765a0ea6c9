use crate::{AgentMode, ControlId, ControlState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlIcon {
    Download,
    Spinner,
    Check,
    Alert,
}

/// What an injected control should look like for its current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    pub control_id: ControlId,
    pub label: &'static str,
    pub icon: ControlIcon,
    pub enabled: bool,
}

impl ControlView {
    pub fn for_state(control_id: ControlId, state: ControlState) -> Self {
        let (label, icon) = match state {
            ControlState::Idle => ("Download", ControlIcon::Download),
            ControlState::Submitting => ("Adding...", ControlIcon::Spinner),
            ControlState::Queued => ("Queued", ControlIcon::Check),
            ControlState::Failed(_) => ("Failed", ControlIcon::Alert),
        };
        Self {
            control_id,
            label,
            icon,
            enabled: state.is_enabled(),
        }
    }

    pub fn idle(control_id: ControlId) -> Self {
        Self::for_state(control_id, ControlState::Idle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentViewModel {
    pub mode: AgentMode,
    pub server_address: String,
    pub credential_configured: bool,
    pub controls: Vec<ControlView>,
    pub dialog_open: bool,
    pub connection_status: String,
}
