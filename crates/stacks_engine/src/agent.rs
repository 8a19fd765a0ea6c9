use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use agent_logging::{agent_error, agent_info, agent_warn};
use ego_tree::NodeId;
use stacks_core::{
    update, AgentMode, AgentState, Config, ControlId, Effect, Msg, PageMode, QueueError,
    SettingsForm,
};
use tokio::sync::mpsc;

use crate::augment::{Augmenter, PageSelectors, ScanReport, SelectorError};
use crate::client::{ClientSettings, QueueClient, ReqwestQueueClient};
use crate::document::PageDocument;
use crate::markup::control_html;
use crate::notifier::{NotificationSink, Notifier};
use crate::settings::SettingsStore;

/// Builds the queue client for a config; called at start and on every reload.
pub type ClientFactory =
    Arc<dyn Fn(&Config) -> Result<Arc<dyn QueueClient>, QueueError> + Send + Sync>;

/// Client factory producing [`ReqwestQueueClient`]s.
pub fn reqwest_client_factory(settings: ClientSettings) -> ClientFactory {
    Arc::new(move |config: &Config| {
        let client = ReqwestQueueClient::new(config, &settings)?;
        Ok(Arc::new(client) as Arc<dyn QueueClient>)
    })
}

#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// How long Queued and Failed indicators stay before the control reverts.
    pub revert_delay: Duration,
    pub notification_display: Duration,
    pub selectors: PageSelectors,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            revert_delay: Duration::from_secs(2),
            notification_display: Duration::from_secs(3),
            selectors: PageSelectors::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error("failed to build queue client: {0}")]
    Client(#[from] QueueError),
}

/// Single-threaded reactor owning the document and all agent state.
///
/// Network calls and revert timers run as spawned tasks that report back as
/// [`Msg`]s; the reactor applies them one at a time in [`Agent::pump`]. Must
/// be created inside a tokio runtime.
pub struct Agent {
    state: AgentState,
    document: PageDocument,
    augmenter: Augmenter,
    control_nodes: BTreeMap<ControlId, NodeId>,
    notifier: Notifier,
    store: Box<dyn SettingsStore>,
    client: Arc<dyn QueueClient>,
    client_factory: ClientFactory,
    settings: AgentSettings,
    msg_tx: mpsc::UnboundedSender<Msg>,
    msg_rx: mpsc::UnboundedReceiver<Msg>,
    in_flight: usize,
}

impl Agent {
    pub fn start(
        document: PageDocument,
        store: Box<dyn SettingsStore>,
        sink: Arc<dyn NotificationSink>,
        client_factory: ClientFactory,
        settings: AgentSettings,
    ) -> Result<Self, AgentError> {
        let config = store.get();
        let state = AgentState::new(config.clone());
        let mode = PageMode::from_location(document.location());
        let augmenter = Augmenter::new(mode, settings.selectors.clone())?;
        let client = client_factory(&config)?;
        let notifier = Notifier::new(
            config.notifications_enabled,
            settings.notification_display,
            sink,
        );
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();

        agent_info!("Stacks agent loaded; server: {}", config.server_address);
        agent_info!(
            "Notifications: {}",
            if config.notifications_enabled { "enabled" } else { "disabled" }
        );
        if is_remote_server(&config.server_address) {
            agent_info!("Using remote server: {}", config.server_address);
        }
        if !store.is_persistent() {
            agent_warn!("Settings are kept in memory only for this session");
        }

        let mut agent = Self {
            state,
            document,
            augmenter,
            control_nodes: BTreeMap::new(),
            notifier,
            store,
            client,
            client_factory,
            settings,
            msg_tx,
            msg_rx,
            in_flight: 0,
        };

        if agent.state.mode() == AgentMode::Disabled && config.has_credential() {
            agent_warn!("Stacks: server URL not configured! Page augmentation is disabled.");
        } else if agent.state.mode() == AgentMode::Disabled {
            agent_warn!("Stacks: API key not configured! Page augmentation is disabled.");
            agent_warn!(
                "Get your API key from the Stacks web interface (Settings tab → API Key section), then configure it in Stacks Settings and reload the page."
            );
        } else {
            agent_info!("API key: configured; page mode: {:?}", agent.augmenter.mode());
            agent.scan();
        }
        Ok(agent)
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn document(&self) -> &PageDocument {
        &self.document
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn augmenter(&self) -> &Augmenter {
        &self.augmenter
    }

    /// Current document node of a control, if it is still on the page.
    pub fn control_node(&self, control_id: ControlId) -> Option<NodeId> {
        self.control_nodes.get(&control_id).copied()
    }

    /// Requests and timers that have not reported back yet.
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    /// Apply a host-side change to the document, then react to it.
    pub fn mutate<R>(&mut self, change: impl FnOnce(&mut PageDocument) -> R) -> R {
        let result = change(&mut self.document);
        self.on_mutation();
        result
    }

    /// Mutation hook: forget controls the host removed, then run one scan.
    pub fn on_mutation(&mut self) -> ScanReport {
        let removed: Vec<ControlId> = self
            .control_nodes
            .iter()
            .filter(|(_, node)| !self.document.contains(**node))
            .map(|(control_id, _)| *control_id)
            .collect();
        for control_id in removed {
            self.control_nodes.remove(&control_id);
            self.dispatch(Msg::ControlRemoved { control_id });
        }

        if self.state.mode() == AgentMode::Disabled {
            return ScanReport::default();
        }
        self.scan()
    }

    pub fn click(&mut self, control_id: ControlId) {
        self.dispatch(Msg::ControlClicked { control_id });
    }

    pub fn open_settings(&mut self) {
        self.dispatch(Msg::SettingsOpened);
    }

    pub fn cancel_settings(&mut self) {
        self.dispatch(Msg::SettingsCancelled);
    }

    pub fn test_connection(&mut self, form: SettingsForm) {
        self.dispatch(Msg::TestConnectionClicked(form));
    }

    pub fn save_settings(&mut self, form: SettingsForm) {
        self.dispatch(Msg::SaveClicked(form));
    }

    pub fn reset_settings(&mut self, confirmed: bool) {
        self.dispatch(Msg::ResetClicked { confirmed });
    }

    /// Apply one message and run the resulting effects.
    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in effects {
            self.run_effect(effect);
        }
        self.render_dirty_controls();
    }

    /// Wait for the next task report or toast expiry and handle it.
    ///
    /// Returns `false` without waiting when nothing is outstanding.
    pub async fn pump(&mut self) -> bool {
        let deadline = self.notifier.next_expiry();
        if self.in_flight == 0 && deadline.is_none() {
            return false;
        }

        tokio::select! {
            msg = self.msg_rx.recv(), if self.in_flight > 0 => {
                if let Some(msg) = msg {
                    self.in_flight -= 1;
                    self.dispatch(msg);
                }
            }
            _ = sleep_until(deadline) => {
                self.notifier.expire(Instant::now());
            }
        }
        true
    }

    /// Pump until nothing is outstanding.
    pub async fn run_until_idle(&mut self) {
        while self.pump().await {}
    }

    /// Pump until `done` holds; `false` if the agent went idle first.
    pub async fn run_until(&mut self, done: impl Fn(&Agent) -> bool) -> bool {
        loop {
            if done(self) {
                return true;
            }
            if !self.pump().await {
                return done(self);
            }
        }
    }

    fn scan(&mut self) -> ScanReport {
        let report = self.augmenter.scan(&mut self.document);
        for control in &report.injected {
            self.control_nodes.insert(control.control_id, control.node);
            self.dispatch(Msg::ControlInjected {
                control_id: control.control_id,
                job_id: control.job_id.clone(),
                source: control.source,
            });
        }
        if !report.injected.is_empty() {
            agent_info!(
                "scan injected {} control(s), {} total",
                report.injected.len(),
                self.control_nodes.len()
            );
        }
        report
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Enqueue {
                control_id,
                request,
            } => {
                let client = self.client.clone();
                self.spawn_report(async move {
                    let result = client.enqueue(&request).await;
                    Msg::EnqueueFinished { control_id, result }
                });
            }
            Effect::ScheduleRevert { control_id } => {
                let delay = self.settings.revert_delay;
                self.spawn_report(async move {
                    tokio::time::sleep(delay).await;
                    Msg::RevertElapsed { control_id }
                });
            }
            Effect::Notify(notification) => {
                self.notifier.notify(notification, Instant::now());
            }
            Effect::Diagnose {
                test_id,
                server_address,
                api_key,
            } => {
                let client = self.client.clone();
                self.spawn_report(async move {
                    let result = client.diagnose(&server_address, &api_key).await;
                    Msg::DiagnosticFinished { test_id, result }
                });
            }
            Effect::PersistConfig(config) => {
                if let Err(err) = self.store.set(&config) {
                    agent_error!("Failed to persist settings, keeping them for this session: {}", err);
                }
                self.reload(&config);
            }
            Effect::ResetConfig => {
                let config = match self.store.reset() {
                    Ok(config) => config,
                    Err(err) => {
                        agent_error!("Failed to reset persisted settings: {}", err);
                        Config::default()
                    }
                };
                self.reload(&config);
            }
        }
    }

    fn reload(&mut self, config: &Config) {
        self.notifier.set_enabled(config.notifications_enabled);
        match (self.client_factory)(config) {
            Ok(client) => self.client = client,
            Err(err) => agent_error!("Failed to rebuild queue client: {}", err),
        }
    }

    fn spawn_report(&mut self, task: impl std::future::Future<Output = Msg> + Send + 'static) {
        let tx = self.msg_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let _ = tx.send(task.await);
        });
    }

    fn render_dirty_controls(&mut self) {
        for control_id in self.state.consume_dirty_controls() {
            let (Some(node), Some(view)) = (
                self.control_nodes.get(&control_id).copied(),
                self.state.control_view(control_id),
            ) else {
                continue;
            };
            match self.document.replace_with_html(node, &control_html(&view)) {
                Ok(inserted) => {
                    if let Some(new_node) = inserted
                        .into_iter()
                        .find(|id| self.document.element(*id).is_some())
                    {
                        self.control_nodes.insert(control_id, new_node);
                    }
                }
                Err(err) => agent_warn!("failed to render control {}: {}", control_id, err),
            }
        }
    }
}

/// Anything but localhost or 127.0.0.1; unparseable addresses count as local.
fn is_remote_server(server_address: &str) -> bool {
    reqwest::Url::parse(server_address.trim())
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .is_some_and(|host| host != "localhost" && host != "127.0.0.1")
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::is_remote_server;

    #[test]
    fn remote_server_detection() {
        assert!(!is_remote_server("http://localhost:7788"));
        assert!(!is_remote_server(" http://127.0.0.1:7788/ "));
        assert!(is_remote_server("http://nas.local:7788"));
        assert!(is_remote_server("https://stacks.example.com"));
        assert!(!is_remote_server(""));
    }
}
