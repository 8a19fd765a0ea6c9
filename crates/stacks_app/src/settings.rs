use std::path::Path;

use anyhow::bail;
use stacks_core::SettingsForm;
use stacks_engine::open_settings_store;

use crate::cli::{SettingsAction, Toggle};
use crate::host::start_dialog_host;

pub(crate) async fn run(settings_path: &Path, action: SettingsAction) -> anyhow::Result<()> {
    match action {
        SettingsAction::Show => {
            show(settings_path);
            Ok(())
        }
        SettingsAction::Set {
            server,
            api_key,
            notifications,
        } => set(settings_path, server, api_key, notifications).await,
        SettingsAction::Test { server, api_key } => test(settings_path, server, api_key).await,
        SettingsAction::Reset { yes } => reset(settings_path, yes).await,
    }
}

fn show(settings_path: &Path) {
    let store = open_settings_store(settings_path);
    let config = store.get();
    println!("server:        {}", config.server_address);
    println!(
        "api key:       {}",
        if config.has_credential() {
            "configured"
        } else {
            "not configured"
        }
    );
    println!(
        "notifications: {}",
        if config.notifications_enabled { "on" } else { "off" }
    );
    if store.is_persistent() {
        println!("stored in:     {}", settings_path.display());
    } else {
        println!("stored in:     memory only (settings location unavailable)");
    }
}

async fn set(
    settings_path: &Path,
    server: Option<String>,
    api_key: Option<String>,
    notifications: Option<Toggle>,
) -> anyhow::Result<()> {
    let mut agent = start_dialog_host(settings_path)?;
    agent.open_settings();

    let mut form = agent.state().dialog().form.clone();
    if let Some(server) = server {
        form.server_address = server;
    }
    if let Some(api_key) = api_key {
        form.api_key = api_key;
    }
    if let Some(toggle) = notifications {
        form.notifications_enabled = toggle.is_on();
    }

    agent.save_settings(form);
    if let Some(err) = agent.state().dialog().validation_error.clone() {
        bail!("{err}");
    }
    agent.run_until_idle().await;
    Ok(())
}

async fn test(
    settings_path: &Path,
    server: Option<String>,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    let mut agent = start_dialog_host(settings_path)?;
    agent.open_settings();

    let stored = agent.state().dialog().form.clone();
    let form = SettingsForm {
        server_address: server.unwrap_or(stored.server_address),
        api_key: api_key.unwrap_or(stored.api_key),
        notifications_enabled: stored.notifications_enabled,
    };
    agent.test_connection(form);
    agent
        .run_until(|agent| !agent.state().dialog().is_testing())
        .await;

    let status = agent.state().dialog().status.clone();
    agent.cancel_settings();
    if status.is_error() {
        bail!("{}", status.summary());
    }
    println!("{}", status.summary());
    Ok(())
}

async fn reset(settings_path: &Path, confirmed: bool) -> anyhow::Result<()> {
    if !confirmed {
        eprintln!("This clears the API key. Run again with --yes to confirm.");
    }
    let mut agent = start_dialog_host(settings_path)?;
    agent.reset_settings(confirmed);
    agent.run_until_idle().await;
    Ok(())
}
