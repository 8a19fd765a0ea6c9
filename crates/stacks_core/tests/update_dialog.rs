use pretty_assertions::assert_eq;
use stacks_core::{
    update, AgentState, Config, ConfigValidationError, ConnectionStatus, DiagnosticResponse,
    Effect, Msg, Notification, NotifyLevel, QueueError, QueueErrorKind, SettingsForm,
    DEFAULT_SERVER_ADDRESS, SETTINGS_RESET, SETTINGS_SAVED,
};

fn form(server: &str, key: &str, notifications: bool) -> SettingsForm {
    SettingsForm {
        server_address: server.to_string(),
        api_key: key.to_string(),
        notifications_enabled: notifications,
    }
}

fn opened(config: Config) -> AgentState {
    let (state, effects) = update(AgentState::new(config), Msg::SettingsOpened);
    assert!(effects.is_empty());
    state
}

#[test]
fn opening_copies_current_config_into_form() {
    let config = Config {
        server_address: "http://nas:7788".to_string(),
        api_key: "k".to_string(),
        notifications_enabled: false,
    };
    let state = opened(config.clone());

    assert!(state.dialog().open);
    assert_eq!(state.dialog().form, SettingsForm::from_config(&config));
    assert_eq!(state.dialog().status, ConnectionStatus::Untested);
}

#[test]
fn test_connection_without_key_makes_no_request() {
    let state = opened(Config::default());
    let (state, effects) = update(
        state,
        Msg::TestConnectionClicked(form("http://localhost:7788", "   ", true)),
    );

    assert!(effects.is_empty());
    assert_eq!(state.dialog().status, ConnectionStatus::MissingApiKey);
    assert!(state.dialog().status.is_error());
}

#[test]
fn test_connection_reports_counts_without_persisting() {
    let state = opened(Config::default());
    let (state, effects) = update(
        state,
        Msg::TestConnectionClicked(form(" http://nas:7788 ", " key ", true)),
    );
    assert_eq!(
        effects,
        vec![Effect::Diagnose {
            test_id: 1,
            server_address: "http://nas:7788".to_string(),
            api_key: "key".to_string(),
        }]
    );
    assert!(state.dialog().is_testing());

    // A second click while testing is ignored.
    let (state, effects) = update(
        state,
        Msg::TestConnectionClicked(form("http://nas:7788", "key", true)),
    );
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::DiagnosticFinished {
            test_id: 1,
            result: Ok(DiagnosticResponse {
                queue_size: 3,
                recent_history_count: 12,
            }),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.dialog().status,
        ConnectionStatus::Connected {
            queue_size: 3,
            recent_history_count: 12
        }
    );
    assert_eq!(
        state.dialog().status.summary(),
        "Connected! Queue: 3, History: 12 items"
    );
    assert_eq!(state.config(), &Config::default());
}

#[test]
fn diagnostic_errors_map_to_coarse_status() {
    let cases = [
        (QueueErrorKind::Auth, ConnectionStatus::InvalidApiKey),
        (
            QueueErrorKind::Network,
            ConnectionStatus::ConnectionFailed {
                server_address: "http://nas:7788".to_string(),
            },
        ),
        (QueueErrorKind::Timeout, ConnectionStatus::TimedOut),
        (
            QueueErrorKind::Protocol,
            ConnectionStatus::InvalidResponse {
                detail: "bad".to_string(),
            },
        ),
    ];
    for (kind, expected) in cases {
        let state = opened(Config::default());
        let (state, _) = update(
            state,
            Msg::TestConnectionClicked(form("http://nas:7788", "key", true)),
        );
        let (state, _) = update(
            state,
            Msg::DiagnosticFinished {
                test_id: 1,
                result: Err(QueueError::new(kind, "bad")),
            },
        );
        assert_eq!(state.dialog().status, expected);
    }
}

#[test]
fn late_diagnostic_after_cancel_is_ignored() {
    let state = opened(Config::default());
    let (state, _) = update(
        state,
        Msg::TestConnectionClicked(form("http://nas:7788", "key", true)),
    );
    let (state, _) = update(state, Msg::SettingsCancelled);
    let (state, _) = update(
        state,
        Msg::DiagnosticFinished {
            test_id: 1,
            result: Err(QueueError::new(QueueErrorKind::Auth, "401")),
        },
    );

    assert!(!state.dialog().open);
    assert_eq!(state.dialog().status, ConnectionStatus::Untested);
}

#[test]
fn result_of_an_earlier_test_is_not_shown_for_a_newer_one() {
    let state = opened(Config::default());
    let (state, first) = update(
        state,
        Msg::TestConnectionClicked(form("http://a.invalid", "key-a", true)),
    );
    let (state, _) = update(state, Msg::SettingsCancelled);
    let (state, _) = update(state, Msg::SettingsOpened);
    let (state, second) = update(
        state,
        Msg::TestConnectionClicked(form("http://b.invalid", "key-b", true)),
    );

    let test_id_of = |effects: &[Effect]| match effects {
        [Effect::Diagnose { test_id, .. }] => *test_id,
        other => panic!("expected one diagnose effect, got {other:?}"),
    };
    let (stale, current) = (test_id_of(&first), test_id_of(&second));
    assert_ne!(stale, current);

    let (state, _) = update(
        state,
        Msg::DiagnosticFinished {
            test_id: stale,
            result: Ok(DiagnosticResponse {
                queue_size: 9,
                recent_history_count: 9,
            }),
        },
    );
    assert_eq!(state.dialog().form.server_address, "http://b.invalid");
    assert_eq!(state.dialog().status, ConnectionStatus::Testing);

    let (state, _) = update(
        state,
        Msg::DiagnosticFinished {
            test_id: current,
            result: Err(QueueError::new(QueueErrorKind::Network, "refused")),
        },
    );
    assert_eq!(
        state.dialog().status,
        ConnectionStatus::ConnectionFailed {
            server_address: "http://b.invalid".to_string(),
        }
    );
}

#[test]
fn save_requires_server_and_key() {
    let state = opened(Config::default());
    let (state, effects) = update(state, Msg::SaveClicked(form("  ", "key", true)));
    assert!(effects.is_empty());
    assert_eq!(
        state.dialog().validation_error,
        Some(ConfigValidationError::MissingServerAddress)
    );

    let (state, effects) = update(
        state,
        Msg::SaveClicked(form("http://nas:7788", "", true)),
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.dialog().validation_error,
        Some(ConfigValidationError::MissingApiKey)
    );
    assert!(state.dialog().open);
    assert_eq!(state.config(), &Config::default());
}

#[test]
fn save_trims_persists_and_reloads_config() {
    let state = opened(Config::default());
    let (state, effects) = update(
        state,
        Msg::SaveClicked(form(" http://nas:7788 ", " key ", false)),
    );

    let expected = Config {
        server_address: "http://nas:7788".to_string(),
        api_key: "key".to_string(),
        notifications_enabled: false,
    };
    assert_eq!(
        effects,
        vec![
            Effect::PersistConfig(expected.clone()),
            Effect::Notify(Notification::new(SETTINGS_SAVED, NotifyLevel::Success)),
        ]
    );
    assert_eq!(state.config(), &expected);
    assert!(!state.dialog().open);
}

#[test]
fn reset_requires_confirmation() {
    let config = Config {
        server_address: "http://nas:7788".to_string(),
        api_key: "key".to_string(),
        notifications_enabled: false,
    };
    let (state, effects) = update(
        AgentState::new(config.clone()),
        Msg::ResetClicked { confirmed: false },
    );
    assert!(effects.is_empty());
    assert_eq!(state.config(), &config);

    let (state, effects) = update(state, Msg::ResetClicked { confirmed: true });
    assert_eq!(
        effects,
        vec![
            Effect::ResetConfig,
            Effect::Notify(Notification::new(SETTINGS_RESET, NotifyLevel::Info)),
        ]
    );
    assert_eq!(state.config().server_address, DEFAULT_SERVER_ADDRESS);
    assert!(!state.config().has_credential());
    assert!(state.config().notifications_enabled);
}
