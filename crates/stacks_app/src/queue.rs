use agent_logging::agent_info;
use anyhow::bail;
use stacks_core::{
    extract_job_id, JobId, QueueRequest, SourceTag, ADDED_TO_QUEUE, ALREADY_IN_QUEUE,
};
use stacks_engine::{open_settings_store, ClientSettings, QueueClient, ReqwestQueueClient};

fn parse_item(item: &str) -> Option<JobId> {
    JobId::parse(item.trim()).or_else(|| extract_job_id(item))
}

pub(crate) async fn run(settings_path: &std::path::Path, item: &str) -> anyhow::Result<()> {
    let Some(job_id) = parse_item(item) else {
        bail!("{item:?} is not an md5 or a /md5/<id> URL");
    };

    let config = open_settings_store(settings_path).get();
    let client = ReqwestQueueClient::new(&config, &ClientSettings::default())?;
    agent_info!("queueing {} on {}", job_id, config.server_address);

    let request = QueueRequest {
        job_id,
        source: SourceTag::Cli,
    };
    match client.enqueue(&request).await {
        Ok(response) if response.success => {
            println!("{ADDED_TO_QUEUE}");
            Ok(())
        }
        Ok(response) => {
            println!("{}", response.server_message().unwrap_or(ALREADY_IN_QUEUE));
            Ok(())
        }
        Err(err) => bail!("{} ({})", err.kind.user_message(), err.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_ids_and_item_urls() {
        let id = "0123456789abcdef0123456789abcdef";
        assert_eq!(parse_item(id).unwrap().as_str(), id);
        assert_eq!(
            parse_item(&format!("https://annas-archive.org/md5/{id}?x=1"))
                .unwrap()
                .as_str(),
            id
        );
        assert!(parse_item("not-an-id").is_none());
        assert!(parse_item(&id.to_uppercase()).is_none());
    }
}
