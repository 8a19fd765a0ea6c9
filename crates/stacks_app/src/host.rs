use std::path::Path;
use std::sync::Arc;

use stacks_core::{Notification, NotifyLevel};
use stacks_engine::{
    open_settings_store, reqwest_client_factory, Agent, AgentSettings, ClientSettings,
    NotificationId, NotificationSink, PageDocument,
};

/// Location used when the agent only hosts the settings dialog.
pub(crate) const BLANK_LOCATION: &str = "about:blank";

/// Prints toasts to stderr so stdout stays free for page output.
#[derive(Debug, Default)]
pub(crate) struct ConsoleNotificationSink;

impl NotificationSink for ConsoleNotificationSink {
    fn show(&self, _id: NotificationId, notification: &Notification) {
        let tag = match notification.level {
            NotifyLevel::Info => "info",
            NotifyLevel::Success => "ok",
            NotifyLevel::Error => "error",
        };
        eprintln!("[{tag}] {}", notification.message);
    }

    fn dismiss(&self, _id: NotificationId) {}
}

pub(crate) fn start_agent(settings_path: &Path, document: PageDocument) -> anyhow::Result<Agent> {
    let store = open_settings_store(settings_path);
    let agent = Agent::start(
        document,
        store,
        Arc::new(ConsoleNotificationSink),
        reqwest_client_factory(ClientSettings::default()),
        AgentSettings::default(),
    )?;
    Ok(agent)
}

/// Agent over an empty page, for the settings flows.
pub(crate) fn start_dialog_host(settings_path: &Path) -> anyhow::Result<Agent> {
    start_agent(
        settings_path,
        PageDocument::parse("<html><body></body></html>", BLANK_LOCATION),
    )
}
