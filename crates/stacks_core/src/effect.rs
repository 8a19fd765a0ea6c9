use crate::{Config, ControlId, Notification, QueueRequest, TestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Enqueue {
        control_id: ControlId,
        request: QueueRequest,
    },
    /// Report `Msg::RevertElapsed` after the fixed display delay.
    ScheduleRevert { control_id: ControlId },
    Notify(Notification),
    /// Report `Msg::DiagnosticFinished` carrying the same `test_id`.
    Diagnose {
        test_id: TestId,
        server_address: String,
        api_key: String,
    },
    /// Persist and reload the given config.
    PersistConfig(Config),
    /// Restore persisted defaults and reload them.
    ResetConfig,
}
