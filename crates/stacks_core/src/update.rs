use crate::dialog::ConnectionStatus;
use crate::{
    AgentMode, AgentState, Config, ControlState, DialogState, Effect, Msg, Notification,
    NotifyLevel, QueueRequest,
};

pub const ADDED_TO_QUEUE: &str = "Added to queue";
pub const ALREADY_IN_QUEUE: &str = "Already in queue";
pub const SETTINGS_SAVED: &str = "Settings saved! Refresh the page to apply changes.";
pub const SETTINGS_RESET: &str = "Settings reset! Please configure your API key in settings.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AgentState, msg: Msg) -> (AgentState, Vec<Effect>) {
    let effects = match msg {
        Msg::ControlInjected {
            control_id,
            job_id,
            source,
        } => {
            if state.mode() == AgentMode::Active {
                state.bind_control(control_id, job_id, source);
            }
            Vec::new()
        }
        Msg::ControlRemoved { control_id } => {
            state.unbind_control(control_id);
            Vec::new()
        }
        Msg::ControlClicked { control_id } => {
            // A control that is not idle is disabled; the click is dropped.
            let request = state
                .control(control_id)
                .filter(|entry| entry.state == ControlState::Idle)
                .map(|entry| QueueRequest {
                    job_id: entry.job_id.clone(),
                    source: entry.source,
                });
            let Some(request) = request else {
                return (state, Vec::new());
            };
            state.set_control_state(control_id, ControlState::Submitting);
            vec![Effect::Enqueue {
                control_id,
                request,
            }]
        }
        Msg::EnqueueFinished { control_id, result } => {
            let submitting = state.control_state(control_id) == Some(ControlState::Submitting);
            match result {
                Ok(response) if response.success => {
                    let mut effects = vec![Effect::Notify(Notification::new(
                        ADDED_TO_QUEUE,
                        NotifyLevel::Success,
                    ))];
                    if submitting {
                        state.set_control_state(control_id, ControlState::Queued);
                        effects.push(Effect::ScheduleRevert { control_id });
                    }
                    effects
                }
                Ok(response) => {
                    let message = response.server_message().unwrap_or(ALREADY_IN_QUEUE);
                    if submitting {
                        state.set_control_state(control_id, ControlState::Idle);
                    }
                    vec![Effect::Notify(Notification::new(message, NotifyLevel::Info))]
                }
                Err(err) => {
                    let mut effects = vec![Effect::Notify(Notification::new(
                        err.kind.user_message(),
                        NotifyLevel::Error,
                    ))];
                    if submitting {
                        state.set_control_state(control_id, ControlState::Failed(err.kind));
                        effects.push(Effect::ScheduleRevert { control_id });
                    }
                    effects
                }
            }
        }
        Msg::RevertElapsed { control_id } => {
            if matches!(
                state.control_state(control_id),
                Some(ControlState::Queued | ControlState::Failed(_))
            ) {
                state.set_control_state(control_id, ControlState::Idle);
            }
            Vec::new()
        }
        Msg::SettingsOpened => {
            let dialog = DialogState::opened_with(state.config());
            *state.dialog_mut() = dialog;
            Vec::new()
        }
        Msg::SettingsCancelled => {
            *state.dialog_mut() = DialogState::default();
            Vec::new()
        }
        Msg::TestConnectionClicked(form) => {
            if state.dialog().is_testing() {
                return (state, Vec::new());
            }
            let test_id = state.next_test_id();
            let dialog = state.dialog_mut();
            let server_address = form.server_address.trim().to_string();
            let api_key = form.api_key.trim().to_string();
            dialog.form = form;
            if api_key.is_empty() {
                dialog.status = ConnectionStatus::MissingApiKey;
                Vec::new()
            } else {
                dialog.status = ConnectionStatus::Testing;
                dialog.pending_test = Some(test_id);
                vec![Effect::Diagnose {
                    test_id,
                    server_address,
                    api_key,
                }]
            }
        }
        Msg::DiagnosticFinished { test_id, result } => {
            let dialog = state.dialog_mut();
            if dialog.is_testing() && dialog.pending_test == Some(test_id) {
                dialog.pending_test = None;
                let server_address = dialog.form.server_address.trim().to_string();
                dialog.status = ConnectionStatus::from_diagnostic(result, &server_address);
            }
            Vec::new()
        }
        Msg::SaveClicked(form) => match form.validate() {
            Ok(config) => {
                state.replace_config(config.clone());
                *state.dialog_mut() = DialogState::default();
                vec![
                    Effect::PersistConfig(config),
                    Effect::Notify(Notification::new(SETTINGS_SAVED, NotifyLevel::Success)),
                ]
            }
            Err(err) => {
                let dialog = state.dialog_mut();
                dialog.form = form;
                dialog.validation_error = Some(err);
                Vec::new()
            }
        },
        Msg::ResetClicked { confirmed } => {
            if !confirmed {
                return (state, Vec::new());
            }
            state.replace_config(Config::default());
            *state.dialog_mut() = DialogState::default();
            vec![
                Effect::ResetConfig,
                Effect::Notify(Notification::new(SETTINGS_RESET, NotifyLevel::Info)),
            ]
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
