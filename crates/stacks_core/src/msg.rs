use crate::{
    ControlId, DiagnosticResponse, JobId, QueueError, QueueResponse, SettingsForm, SourceTag,
    TestId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A scan pass injected a control bound to `job_id`.
    ControlInjected {
        control_id: ControlId,
        job_id: JobId,
        source: SourceTag,
    },
    /// The host page removed the node carrying the control.
    ControlRemoved { control_id: ControlId },
    /// User clicked an injected control.
    ControlClicked { control_id: ControlId },
    /// Enqueue request for a control resolved.
    EnqueueFinished {
        control_id: ControlId,
        result: Result<QueueResponse, QueueError>,
    },
    /// Display delay of a Queued or Failed indicator elapsed.
    RevertElapsed { control_id: ControlId },
    /// User opened the settings dialog.
    SettingsOpened,
    /// User closed the dialog without saving.
    SettingsCancelled,
    /// User clicked "Test Connection" with the current field values.
    TestConnectionClicked(SettingsForm),
    /// Diagnostic request `test_id` resolved.
    DiagnosticFinished {
        test_id: TestId,
        result: Result<DiagnosticResponse, QueueError>,
    },
    /// User clicked "Save" with the current field values.
    SaveClicked(SettingsForm),
    /// User answered the reset confirmation.
    ResetClicked { confirmed: bool },
    /// Host event with nothing for the agent to do; leaves state untouched.
    NoOp,
}
