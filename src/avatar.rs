// Opportunistic on-disk avatar cache, keyed by a hash of the source URL.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::feed::NinjaFeed;
use crate::metrics;

/// Suffix counter for in-flight download files.
static PARTIAL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Avatar images stored as `avatar_{sha256(url)}.png` under one directory.
///
/// A miss means a download; a failed download means no image. Neither is an error
/// for the caller. Files only appear under their final name once fully written.
#[derive(Debug, Clone)]
pub struct AvatarCache {
    dir: PathBuf,
    feed: NinjaFeed,
}

impl AvatarCache {
    /// A relative `dir` is anchored at the current working directory, since the
    /// host resolves cached images through `file://` URIs.
    pub fn new(dir: impl Into<PathBuf>, feed: NinjaFeed) -> Self {
        let dir = dir.into();
        let dir = std::path::absolute(&dir).unwrap_or(dir);
        Self { dir, feed }
    }

    /// Cache path for an absolute avatar URL.
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(format!("avatar_{}.png", url_digest(url)))
    }

    /// Local path of the avatar, downloading it on a miss. `None` on any failure.
    pub async fn fetch(&self, url: &str) -> Option<PathBuf> {
        let path = self.path_for(url);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            metrics::AVATAR_CACHE_TOTAL.with_label_values(&["hit"]).inc();
            return Some(path);
        }

        metrics::AVATAR_CACHE_TOTAL.with_label_values(&["miss"]).inc();
        match self.download(url, &path).await {
            Ok(()) => {
                tracing::info!("Cached avatar {url} at {}", path.display());
                Some(path)
            }
            Err(e) => {
                metrics::AVATAR_CACHE_TOTAL.with_label_values(&["failed"]).inc();
                tracing::warn!("Avatar download failed for {url}: {e}");
                None
            }
        }
    }

    async fn download(&self, url: &str, path: &Path) -> Result<()> {
        let bytes = self.feed.fetch_bytes(url).await?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let partial = self.dir.join(format!(
            ".{}.{}.{}.part",
            url_digest(url),
            std::process::id(),
            PARTIAL_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        let written = match tokio::fs::write(&partial, bytes).await {
            Ok(()) => tokio::fs::rename(&partial, path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// Hex SHA-256 of a URL, the stable cache key.
pub fn url_digest(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedConfig;
    use crate::forward::LookupResult;
    use std::time::Duration;

    fn cache(dir: &Path) -> AvatarCache {
        let feed = NinjaFeed::new(FeedConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            user_agent: "test".to_string(),
            referer: "http://127.0.0.1/".to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        AvatarCache::new(dir, feed)
    }

    #[test]
    fn test_url_digest_is_stable() {
        assert_eq!(url_digest("https://a/b.png"), url_digest("https://a/b.png"));
        assert_ne!(url_digest("https://a/b.png"), url_digest("https://a/c.png"));
        assert_eq!(url_digest("").len(), 64);
    }

    #[test]
    fn test_path_for_is_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());
        let path = cache.path_for("https://a/b.png");
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("avatar_{}.png", url_digest("https://a/b.png"))
        );
    }

    #[tokio::test]
    async fn test_fetch_hit_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());
        let url = "https://unreachable.invalid/a.png";
        std::fs::write(cache.path_for(url), b"png").unwrap();
        assert_eq!(cache.fetch(url).await, Some(cache.path_for(url)));
    }

    #[test]
    fn test_relative_dir_is_made_absolute() {
        let cache = cache(Path::new("image"));
        let path = cache.path_for("https://a/b.png");
        assert!(path.is_absolute());
        assert!(path.starts_with(std::env::current_dir().unwrap().join("image")));

        let node = LookupResult {
            display_name: "鸣人".to_string(),
            text: None,
            avatar: Some(path),
        }
        .to_node("1")
        .to_onebot();
        let uri = node["data"]["content"][0]["data"]["file"].as_str().unwrap();
        assert!(uri.starts_with("file:///"), "{uri}");
    }

    #[tokio::test]
    async fn test_leftover_partial_file_is_not_a_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());
        let url = "http://127.0.0.1:9/a.png";
        let partial = dir.path().join(format!(".{}.1.0.part", url_digest(url)));
        std::fs::write(&partial, b"pn").unwrap();
        assert_eq!(cache.fetch(url).await, None);
        assert!(!cache.path_for(url).exists());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir.path().join("nested"));
        let url = "http://127.0.0.1:9/missing.png";
        assert_eq!(cache.fetch(url).await, None);
        assert!(!cache.path_for(url).exists());
    }
}
