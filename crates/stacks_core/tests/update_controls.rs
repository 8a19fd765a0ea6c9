use std::sync::Once;

use pretty_assertions::assert_eq;
use stacks_core::{
    update, AgentMode, AgentState, Config, ControlState, Effect, JobId, Msg, Notification,
    NotifyLevel, QueueError, QueueErrorKind, QueueRequest, QueueResponse, SourceTag,
    ADDED_TO_QUEUE, ALREADY_IN_QUEUE,
};

const ID: &str = "0123456789abcdef0123456789abcdef";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(agent_logging::initialize_for_tests);
}

fn configured() -> Config {
    Config {
        api_key: "secret".to_string(),
        ..Config::default()
    }
}

fn with_control(control_id: u64) -> AgentState {
    let (state, effects) = update(
        AgentState::new(configured()),
        Msg::ControlInjected {
            control_id,
            job_id: JobId::parse(ID).unwrap(),
            source: SourceTag::SearchPage,
        },
    );
    assert!(effects.is_empty());
    state
}

fn click(state: AgentState, control_id: u64) -> (AgentState, Vec<Effect>) {
    update(state, Msg::ControlClicked { control_id })
}

#[test]
fn missing_credential_disables_the_session() {
    init_logging();
    let state = AgentState::new(Config::default());
    assert_eq!(state.mode(), AgentMode::Disabled);

    let (state, _) = update(
        state,
        Msg::ControlInjected {
            control_id: 1,
            job_id: JobId::parse(ID).unwrap(),
            source: SourceTag::SearchPage,
        },
    );
    assert_eq!(state.control_count(), 0);
    assert_eq!(AgentState::new(configured()).mode(), AgentMode::Active);
}

#[test]
fn blank_server_address_disables_the_session() {
    init_logging();
    let config = Config {
        server_address: "   ".to_string(),
        ..configured()
    };
    assert!(config.has_credential());
    assert!(!config.is_ready());
    assert_eq!(AgentState::new(config).mode(), AgentMode::Disabled);
}

#[test]
fn click_enqueues_captured_job_id_and_disables_control() {
    init_logging();
    let (mut state, effects) = click(with_control(1), 1);

    assert_eq!(
        effects,
        vec![Effect::Enqueue {
            control_id: 1,
            request: QueueRequest {
                job_id: JobId::parse(ID).unwrap(),
                source: SourceTag::SearchPage,
            },
        }]
    );
    assert_eq!(state.control_state(1), Some(ControlState::Submitting));
    assert_eq!(state.consume_dirty_controls(), vec![1]);
    assert!(!state.control_view(1).unwrap().enabled);
}

#[test]
fn second_click_while_submitting_is_dropped() {
    init_logging();
    let (state, _) = click(with_control(1), 1);
    let (state, effects) = click(state, 1);

    assert!(effects.is_empty());
    assert_eq!(state.control_state(1), Some(ControlState::Submitting));
}

#[test]
fn success_goes_through_queued_back_to_idle() {
    init_logging();
    let (state, _) = click(with_control(1), 1);
    let (state, effects) = update(
        state,
        Msg::EnqueueFinished {
            control_id: 1,
            result: Ok(QueueResponse {
                success: true,
                ..QueueResponse::default()
            }),
        },
    );

    assert_eq!(state.control_state(1), Some(ControlState::Queued));
    assert_eq!(
        effects,
        vec![
            Effect::Notify(Notification::new(ADDED_TO_QUEUE, NotifyLevel::Success)),
            Effect::ScheduleRevert { control_id: 1 },
        ]
    );

    // Still disabled while the indicator is shown.
    let (state, effects) = click(state, 1);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::RevertElapsed { control_id: 1 });
    assert!(effects.is_empty());
    assert_eq!(state.control_state(1), Some(ControlState::Idle));
    assert!(state.control_view(1).unwrap().enabled);
}

#[test]
fn soft_failure_returns_to_idle_with_server_message() {
    init_logging();
    let (state, _) = click(with_control(1), 1);
    let (state, effects) = update(
        state,
        Msg::EnqueueFinished {
            control_id: 1,
            result: Ok(QueueResponse {
                success: false,
                error: Some("Already in queue or downloaded".to_string()),
                message: None,
            }),
        },
    );

    assert_eq!(state.control_state(1), Some(ControlState::Idle));
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::new(
            "Already in queue or downloaded",
            NotifyLevel::Info
        ))]
    );
}

#[test]
fn soft_failure_without_text_uses_default_message() {
    init_logging();
    let (state, _) = click(with_control(1), 1);
    let (_, effects) = update(
        state,
        Msg::EnqueueFinished {
            control_id: 1,
            result: Ok(QueueResponse {
                success: false,
                error: None,
                message: Some("  ".to_string()),
            }),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::new(
            ALREADY_IN_QUEUE,
            NotifyLevel::Info
        ))]
    );
}

#[test]
fn errors_mark_failed_then_revert() {
    init_logging();
    let kinds = [
        QueueErrorKind::CredentialMissing,
        QueueErrorKind::Auth,
        QueueErrorKind::Network,
        QueueErrorKind::Timeout,
        QueueErrorKind::Protocol,
    ];
    for kind in kinds {
        let (state, _) = click(with_control(7), 7);
        let (state, effects) = update(
            state,
            Msg::EnqueueFinished {
                control_id: 7,
                result: Err(QueueError::new(kind, "boom")),
            },
        );
        assert_eq!(state.control_state(7), Some(ControlState::Failed(kind)));
        assert_eq!(
            effects,
            vec![
                Effect::Notify(Notification::new(kind.user_message(), NotifyLevel::Error)),
                Effect::ScheduleRevert { control_id: 7 },
            ]
        );

        let (state, _) = update(state, Msg::RevertElapsed { control_id: 7 });
        assert_eq!(state.control_state(7), Some(ControlState::Idle));
    }
}

#[test]
fn result_for_removed_control_only_notifies() {
    init_logging();
    let (state, _) = click(with_control(3), 3);
    let (state, _) = update(state, Msg::ControlRemoved { control_id: 3 });
    let (state, effects) = update(
        state,
        Msg::EnqueueFinished {
            control_id: 3,
            result: Ok(QueueResponse {
                success: true,
                ..QueueResponse::default()
            }),
        },
    );

    assert_eq!(state.control_count(), 0);
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::new(
            ADDED_TO_QUEUE,
            NotifyLevel::Success
        ))]
    );
}

#[test]
fn controls_are_independent() {
    init_logging();
    let state = with_control(1);
    let (state, _) = update(
        state,
        Msg::ControlInjected {
            control_id: 2,
            job_id: JobId::parse(ID).unwrap(),
            source: SourceTag::DetailPage,
        },
    );
    let (state, _) = click(state, 1);
    let (state, effects) = click(state, 2);

    assert_eq!(effects.len(), 1);
    assert_eq!(state.control_state(1), Some(ControlState::Submitting));
    assert_eq!(state.control_state(2), Some(ControlState::Submitting));
    assert_eq!(state.view().controls.len(), 2);
}
