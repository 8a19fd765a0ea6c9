use std::collections::{BTreeMap, BTreeSet};

use crate::view_model::{AgentViewModel, ControlView};
use crate::{
    Config, ControlEntry, ControlId, ControlState, DialogState, JobId, SourceTag, TestId,
};

/// Augmentation mode for the lifetime of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentMode {
    /// No credential at start; nothing is injected until the page reloads.
    #[default]
    Disabled,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentState {
    mode: AgentMode,
    config: Config,
    controls: BTreeMap<ControlId, ControlEntry>,
    dialog: DialogState,
    dirty_controls: BTreeSet<ControlId>,
    last_test_id: TestId,
}

impl AgentState {
    /// The mode is decided here, once: saving a key later does not activate a
    /// disabled session. Both the server address and the key are required.
    pub fn new(config: Config) -> Self {
        let mode = if config.is_ready() {
            AgentMode::Active
        } else {
            AgentMode::Disabled
        };
        Self {
            mode,
            config,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> AgentMode {
        self.mode
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dialog(&self) -> &DialogState {
        &self.dialog
    }

    pub fn control(&self, control_id: ControlId) -> Option<&ControlEntry> {
        self.controls.get(&control_id)
    }

    pub fn control_state(&self, control_id: ControlId) -> Option<ControlState> {
        self.controls.get(&control_id).map(|entry| entry.state)
    }

    pub fn control_count(&self) -> usize {
        self.controls.len()
    }

    pub fn control_ids(&self) -> Vec<ControlId> {
        self.controls.keys().copied().collect()
    }

    pub fn control_view(&self, control_id: ControlId) -> Option<ControlView> {
        self.controls
            .get(&control_id)
            .map(|entry| ControlView::for_state(control_id, entry.state))
    }

    pub fn view(&self) -> AgentViewModel {
        AgentViewModel {
            mode: self.mode,
            server_address: self.config.server_address.clone(),
            credential_configured: self.config.has_credential(),
            controls: self
                .controls
                .iter()
                .map(|(id, entry)| ControlView::for_state(*id, entry.state))
                .collect(),
            dialog_open: self.dialog.open,
            connection_status: self.dialog.status.summary(),
        }
    }

    /// Controls whose rendering changed since the last call.
    pub fn consume_dirty_controls(&mut self) -> Vec<ControlId> {
        std::mem::take(&mut self.dirty_controls).into_iter().collect()
    }

    pub(crate) fn bind_control(&mut self, control_id: ControlId, job_id: JobId, source: SourceTag) {
        self.controls.insert(
            control_id,
            ControlEntry {
                job_id,
                source,
                state: ControlState::Idle,
            },
        );
    }

    pub(crate) fn unbind_control(&mut self, control_id: ControlId) {
        self.controls.remove(&control_id);
        self.dirty_controls.remove(&control_id);
    }

    pub(crate) fn set_control_state(&mut self, control_id: ControlId, state: ControlState) {
        if let Some(entry) = self.controls.get_mut(&control_id) {
            if entry.state != state {
                entry.state = state;
                self.dirty_controls.insert(control_id);
            }
        }
    }

    pub(crate) fn dialog_mut(&mut self) -> &mut DialogState {
        &mut self.dialog
    }

    /// Ids are never reused within a session, across dialog reopens too.
    pub(crate) fn next_test_id(&mut self) -> TestId {
        self.last_test_id += 1;
        self.last_test_id
    }

    pub(crate) fn replace_config(&mut self, config: Config) {
        self.config = config;
    }
}
