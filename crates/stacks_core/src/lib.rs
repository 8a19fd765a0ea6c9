//! Stacks core: pure agent state machine, config model and view-model helpers.
mod config;
mod control;
mod dialog;
mod effect;
mod job_id;
mod msg;
mod notify;
mod outcome;
mod page;
mod state;
mod update;
mod view_model;

pub use config::{Config, ConfigValidationError, SettingsForm, DEFAULT_SERVER_ADDRESS};
pub use control::{ControlEntry, ControlId, ControlState};
pub use dialog::{ConnectionStatus, DialogState, TestId};
pub use effect::Effect;
pub use job_id::{extract_job_id, JobId, JOB_ID_LEN};
pub use msg::Msg;
pub use notify::{Notification, NotifyLevel};
pub use outcome::{
    DiagnosticResponse, QueueError, QueueErrorKind, QueueRequest, QueueResponse, SourceTag,
};
pub use page::PageMode;
pub use state::{AgentMode, AgentState};
pub use update::{update, ADDED_TO_QUEUE, ALREADY_IN_QUEUE, SETTINGS_RESET, SETTINGS_SAVED};
pub use view_model::{AgentViewModel, ControlIcon, ControlView};
