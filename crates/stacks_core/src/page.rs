use url::Url;

use crate::{extract_job_id, JobId};

/// Which augmentation pass applies to a document, chosen by its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageMode {
    /// Search results; re-scanned on every mutation.
    List,
    /// A single item page; augmented once per load.
    Detail(JobId),
    Unsupported,
}

impl PageMode {
    pub fn from_location(location: &str) -> Self {
        let Ok(url) = Url::parse(location) else {
            return PageMode::Unsupported;
        };
        let path = url.path();
        if path.starts_with("/search") {
            PageMode::List
        } else if path.starts_with("/md5/") {
            extract_job_id(location)
                .map(PageMode::Detail)
                .unwrap_or(PageMode::Unsupported)
        } else {
            PageMode::Unsupported
        }
    }
}
