use std::fmt;

/// Length of a job identifier (an MD5 digest in lowercase hex).
pub const JOB_ID_LEN: usize = 32;

const MD5_SEGMENT: &str = "/md5/";

/// Content identifier of one downloadable item: 32 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(String);

impl JobId {
    /// Accepts exactly 32 lowercase hex characters, nothing else.
    pub fn parse(raw: &str) -> Option<Self> {
        is_job_id(raw).then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pull the job identifier out of a URL or href containing `/md5/<id>`.
///
/// The id must be exactly 32 lowercase hex characters: a longer alphanumeric
/// run after the segment is rejected rather than truncated.
pub fn extract_job_id(url: &str) -> Option<JobId> {
    url.match_indices(MD5_SEGMENT).find_map(|(idx, _)| {
        let rest = &url[idx + MD5_SEGMENT.len()..];
        let candidate = rest.get(..JOB_ID_LEN)?;
        if !is_job_id(candidate) {
            return None;
        }
        let terminated = rest[JOB_ID_LEN..]
            .chars()
            .next()
            .map_or(true, |next| !next.is_ascii_alphanumeric());
        terminated.then(|| JobId(candidate.to_string()))
    })
}

fn is_job_id(raw: &str) -> bool {
    raw.len() == JOB_ID_LEN && raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
