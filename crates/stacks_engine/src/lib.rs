//! Stacks engine: document model, augmentation, queue client and the agent reactor.
mod agent;
mod augment;
mod client;
mod document;
mod loader;
mod markup;
mod notifier;
mod persist;
mod settings;

pub use agent::{reqwest_client_factory, Agent, AgentError, AgentSettings, ClientFactory};
pub use augment::{Augmenter, InjectedControl, PageSelectors, ScanReport, SelectorError};
pub use client::{
    ClientSettings, QueueClient, ReqwestQueueClient, API_KEY_HEADER, ENQUEUE_PATH, STATUS_PATH,
};
pub use document::{DocumentError, PageDocument};
pub use loader::{LoadSettings, LoadedPage, PageLoadError, PageLoader};
pub use markup::{control_html, CONTROL_ATTR, CONTROL_SEPARATOR};
pub use notifier::{
    ActiveNotification, NotificationId, NotificationSink, Notifier,
};
pub use persist::{ensure_writable_dir, write_atomically, PersistError};
pub use settings::{open_settings_store, FileSettingsStore, MemorySettingsStore, SettingsStore};
