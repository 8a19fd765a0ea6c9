use std::path::PathBuf;
use std::time::Duration;

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;

#[derive(Debug, Clone)]
pub struct LoadSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPage {
    pub html: String,
    /// Final URL for fetched pages, `None` for local files.
    pub location: Option<String>,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PageLoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("page too large (max {max_bytes} bytes)")]
    TooLarge { max_bytes: u64 },
    #[error("unsupported content type {0}")]
    UnsupportedContentType(String),
    #[error("failed to decode page as {0}")]
    Decode(String),
}

/// Loads a host page from a local file or over HTTP.
#[derive(Debug, Clone, Default)]
pub struct PageLoader {
    settings: LoadSettings,
}

impl PageLoader {
    pub fn new(settings: LoadSettings) -> Self {
        Self { settings }
    }

    pub async fn load(&self, source: &str) -> Result<LoadedPage, PageLoadError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            self.fetch(source).await
        } else {
            let path = PathBuf::from(source);
            let bytes = std::fs::read(&path).map_err(|source| PageLoadError::Io {
                path: path.clone(),
                source,
            })?;
            let (html, encoding_label) = decode_page(&bytes, None)?;
            Ok(LoadedPage {
                html,
                location: None,
                encoding_label,
            })
        }
    }

    async fn fetch(&self, url: &str) -> Result<LoadedPage, PageLoadError> {
        let client = reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| PageLoadError::Network(err.to_string()))?;

        let response = client.get(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(PageLoadError::HttpStatus(status.as_u16()));
        }

        let max_bytes = self.settings.max_bytes;
        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(PageLoadError::TooLarge { max_bytes });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(PageLoadError::UnsupportedContentType(ct.to_string()));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(PageLoadError::TooLarge { max_bytes });
            }
            bytes.extend_from_slice(&chunk);
        }

        let (html, encoding_label) = decode_page(&bytes, content_type.as_deref())?;
        Ok(LoadedPage {
            html,
            location: Some(final_url),
            encoding_label,
        })
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }
}

/// BOM, then the `Content-Type` charset, then detection.
fn decode_page(
    bytes: &[u8],
    content_type: Option<&str>,
) -> Result<(String, String), PageLoadError> {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| {
            content_type
                .and_then(charset_label)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        });

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(PageLoadError::Decode(encoding.name().to_string()));
    }
    Ok((text.into_owned(), encoding.name().to_string()))
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\''].as_ref()).to_string())
    })
}

fn map_reqwest_error(err: reqwest::Error) -> PageLoadError {
    if err.is_timeout() {
        PageLoadError::Timeout(err.to_string())
    } else {
        PageLoadError::Network(err.to_string())
    }
}
