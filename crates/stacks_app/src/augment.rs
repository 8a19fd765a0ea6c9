use std::fs;

use agent_logging::{agent_info, agent_warn};
use anyhow::{anyhow, bail, Context};
use scraper::Selector;
use stacks_engine::{PageDocument, PageLoader};

use crate::cli::AugmentArgs;
use crate::host::start_agent;

pub(crate) async fn run(settings_path: &std::path::Path, args: AugmentArgs) -> anyhow::Result<()> {
    let into = Selector::parse(&args.into)
        .map_err(|err| anyhow!("invalid --into selector {:?}: {}", args.into, err))?;

    let page = PageLoader::default()
        .load(&args.page)
        .await
        .with_context(|| format!("failed to load {}", args.page))?;
    let Some(location) = args.location.clone().or(page.location) else {
        bail!("--location is required when the page is read from a file");
    };
    agent_info!(
        "loaded {} ({} bytes, {}) as {}",
        args.page,
        page.html.len(),
        page.encoding_label,
        location
    );

    let mut agent = start_agent(settings_path, PageDocument::parse(&page.html, location))?;

    for path in &args.append {
        let fragment = fs::read_to_string(path)
            .with_context(|| format!("failed to read fragment {}", path.display()))?;
        let inserted = agent
            .mutate(|document| document.append_html(&into, &fragment))
            .with_context(|| format!("failed to append {}", path.display()))?;
        agent_info!("appended {} node(s) from {}", inserted.len(), path.display());
    }

    for &control_id in &args.click {
        if agent.state().control(control_id).is_none() {
            agent_warn!("no control {} on this page", control_id);
            eprintln!("no control {control_id} on this page");
            continue;
        }
        agent.click(control_id);
    }
    agent.run_until_idle().await;

    for view in agent.state().view().controls {
        if let Some(entry) = agent.state().control(view.control_id) {
            eprintln!(
                "control {}: {} ({})",
                view.control_id, entry.job_id, view.label
            );
        }
    }

    let html = agent.document().to_html();
    match &args.out {
        Some(path) => fs::write(path, html)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{html}"),
    }
    Ok(())
}
