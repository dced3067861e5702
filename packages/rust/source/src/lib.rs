//! Where the API reference document comes from.
//!
//! The update pipeline only needs the document bytes and the encoding they were
//! served with. [`HttpSource`] fetches the live page; [`FileSource`] reads a saved
//! copy for offline runs.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use encoding_rs::Encoding;
use jirest_shared::{JirestError, RawDocument, Result};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, instrument};
use url::Url;

/// Maximum number of redirects to follow when fetching the reference.
const MAX_REDIRECTS: usize = 5;

/// Default timeout in seconds for the document fetch.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("jirest/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Produces the raw reference document.
pub trait DocumentSource {
    /// Human-readable origin for logs and messages.
    fn describe(&self) -> String;

    /// Fetch the whole document. Any failure is a [`JirestError::Fetch`].
    fn fetch(&self) -> impl Future<Output = Result<RawDocument>> + Send;
}

// ---------------------------------------------------------------------------
// HTTP source
// ---------------------------------------------------------------------------

/// Options for [`HttpSource`].
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Timeout for the whole request in seconds.
    pub timeout_secs: u64,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Fetches the reference page over HTTP(S).
pub struct HttpSource {
    url: Url,
    client: Client,
}

impl HttpSource {
    pub fn new(url: Url, opts: &SourceOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| JirestError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { url, client })
    }
}

impl DocumentSource for HttpSource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    #[instrument(skip_all, fields(url = %self.url))]
    async fn fetch(&self) -> Result<RawDocument> {
        let url = &self.url;
        info!("fetching API reference");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| JirestError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(JirestError::Fetch(format!("{url}: HTTP {status}")));
        }

        let encoding = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type)
            .unwrap_or(encoding_rs::UTF_8);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| JirestError::Fetch(format!("{url}: failed to read body: {e}")))?;

        debug!(bytes = bytes.len(), encoding = encoding.name(), "reference fetched");
        Ok(RawDocument::new(bytes.to_vec(), encoding))
    }
}

// ---------------------------------------------------------------------------
// File source
// ---------------------------------------------------------------------------

/// Reads a previously saved copy of the reference page.
pub struct FileSource {
    path: PathBuf,
    encoding: &'static Encoding,
}

impl FileSource {
    /// A UTF-8 file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            encoding: encoding_rs::UTF_8,
        }
    }

    /// Override the encoding by WHATWG label (e.g. `iso-8859-1`).
    pub fn with_encoding_label(mut self, label: &str) -> Result<Self> {
        self.encoding = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| JirestError::validation(format!("unknown encoding '{label}'")))?;
        Ok(self)
    }
}

impl DocumentSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<RawDocument> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| JirestError::Fetch(format!("{}: {e}", self.path.display())))?;
        Ok(RawDocument::new(bytes, self.encoding))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the `charset` parameter of a `Content-Type` header value.
fn charset_from_content_type(value: &str) -> Option<&'static Encoding> {
    value.split(';').skip(1).find_map(|param| {
        let (key, label) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        Encoding::for_label(label.trim().trim_matches('"').as_bytes())
    })
}
