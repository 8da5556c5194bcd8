//! HTTP download adapter.
//!
//! Streams a URL into the destination directory, naming the file after the
//! percent-decoded last segment of the URL path. Redirects are followed;
//! the redirect target is requested exactly as the server sent it,
//! percent-escapes included.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::redirect::Policy;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use url::Url;

use binwrap_core::{BinWrapError, BinWrapResult, Downloader, NoopProgress, ProgressReporter};

/// Default cap on redirect hops per download.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Settings for [`HttpDownloader`].
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Redirect hops followed before giving up.
    pub max_redirects: usize,
    /// Honor `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("binwrap/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            use_system_proxy: true,
        }
    }
}

/// [`Downloader`] backed by reqwest.
///
/// The HTTP client is built on first use, so construction never fails.
pub struct HttpDownloader {
    config: DownloaderConfig,
    client: OnceCell<Client>,
    progress: Arc<dyn ProgressReporter>,
}

impl HttpDownloader {
    pub fn new(config: DownloaderConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
            progress: Arc::new(NoopProgress),
        }
    }

    /// Report download progress to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    async fn client(&self, url: &str) -> BinWrapResult<&Client> {
        self.client
            .get_or_try_init(|| async {
                let max = self.config.max_redirects;
                let mut builder = Client::builder()
                    .user_agent(self.config.user_agent.as_str())
                    .redirect(Policy::custom(move |attempt| {
                        if attempt.previous().len() > max {
                            attempt.error("too many redirects")
                        } else {
                            debug!(target_url = %attempt.url(), "Following redirect");
                            attempt.follow()
                        }
                    }));
                if !self.config.use_system_proxy {
                    builder = builder.no_proxy();
                }
                builder.build()
            })
            .await
            .map_err(|e| BinWrapError::transport(url, format!("failed to build HTTP client: {e}")))
    }

    async fn fetch(&self, url: &str, dest_dir: &Path) -> BinWrapResult<PathBuf> {
        let parsed = Url::parse(url).map_err(|e| BinWrapError::transport(url, e))?;
        let file_name = file_name_from_url(&parsed)?;
        let dest = dest_dir.join(&file_name);

        fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| BinWrapError::filesystem("create directory", dest_dir, e))?;

        let client = self.client(url).await?;
        let response = client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| BinWrapError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BinWrapError::transport(url, format!("HTTP {status}")));
        }

        let total = response.content_length();

        self.progress.start(&file_name, total);

        let mut file = File::create(&dest)
            .await
            .map_err(|e| BinWrapError::filesystem("create file", &dest, e))?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| BinWrapError::transport(url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| BinWrapError::filesystem("write", &dest, e))?;
            written += chunk.len() as u64;
            self.progress.update(written, total);
        }

        file.flush()
            .await
            .map_err(|e| BinWrapError::filesystem("write", &dest, e))?;
        drop(file);

        make_executable(&dest).await?;

        info!(url, path = %dest.display(), bytes = written, "Download complete");
        Ok(dest)
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new(DownloaderConfig::default())
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, dest_dir: &Path) -> BinWrapResult<PathBuf> {
        let result = self.fetch(url, dest_dir).await;
        match &result {
            Ok(path) => self.progress.finish(&path.display().to_string()),
            Err(e) => self.progress.finish_with_error(&e.to_string()),
        }
        result
    }
}

/// Local file name for `url`: the last path segment, percent-decoded.
///
/// Fails when the path is empty or ends with `/`, or when the decoded name
/// is not a single plain file name (`.`, `..`, or containing a separator).
pub fn file_name_from_url(url: &Url) -> BinWrapResult<String> {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BinWrapError::transport(url.as_str(), "URL path has no file name"))?;

    let name = urlencoding::decode(segment).map_err(|e| {
        BinWrapError::transport(url.as_str(), format!("file name is not valid UTF-8: {e}"))
    })?;

    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(BinWrapError::transport(
            url.as_str(),
            format!("`{name}` is not a usable file name"),
        ));
    }

    Ok(name.into_owned())
}

/// Downloaded files may be the binary itself, so they get the executable bit.
#[cfg(unix)]
async fn make_executable(path: &Path) -> BinWrapResult<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .map_err(|e| BinWrapError::filesystem("set permissions on", path, e))
}

#[cfg(not(unix))]
#[allow(clippy::unused_async)]
async fn make_executable(_path: &Path) -> BinWrapResult<()> {
    Ok(())
}
