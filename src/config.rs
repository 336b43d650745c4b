// Application configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FEED_BASE_URL: &str = "https://hyrz.qq.com/act/a20221108gjx/ninja-data";
pub const DEFAULT_ASSET_ORIGIN: &str = "https://hyrz.qq.com";
pub const DEFAULT_REFERER: &str = "https://hyrz.qq.com/cp/a20230308ren/index.shtml";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the ninja data feed (index and detail files live under it).
    pub feed_base_url: String,
    /// Origin used to absolutize root-relative asset URLs.
    pub asset_origin: String,
    pub referer: String,
    pub user_agent: String,
    /// Per-request timeout for every outbound call.
    pub timeout: Duration,
    /// Directory for cached avatar images.
    pub avatar_dir: PathBuf,
    /// OneBot-compatible HTTP API used for forward delivery, if any.
    pub napcat_api_url: Option<String>,
    /// Account id that forward nodes are attributed to.
    pub bot_self_id: String,
    /// Maximum results per forward batch.
    pub batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            feed_base_url: DEFAULT_FEED_BASE_URL.to_string(),
            asset_origin: DEFAULT_ASSET_ORIGIN.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            avatar_dir: PathBuf::from("image"),
            napcat_api_url: None,
            bot_self_id: "0".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `NINJA_FEED_BASE` - feed directory URL
    /// - `NINJA_ASSET_ORIGIN` - origin for root-relative asset URLs
    /// - `NINJA_REFERER` / `NINJA_USER_AGENT` - request headers
    /// - `NINJA_TIMEOUT_SECS` - per-request timeout (default: 10)
    /// - `NINJA_AVATAR_DIR` - avatar cache directory (default: `image`)
    /// - `NAPCAT_API_URL` - forward message API base URL
    /// - `NINJA_BOT_SELF_ID` - account id used on forward nodes
    /// - `NINJA_BATCH_SIZE` - results per forward batch (default: 5)
    ///
    /// CLI flags:
    /// - `--avatar-dir <DIR>` - override the avatar directory
    /// - `--timeout <SECS>` - override the timeout
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Build a config from CLI args and an environment lookup.
    pub fn from_sources(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();

        // CLI flag takes precedence, then env var, then default
        let timeout_secs = Self::parse_cli_value(args, "--timeout")
            .and_then(|v| v.parse().ok())
            .or_else(|| env("NINJA_TIMEOUT_SECS").and_then(|v| v.parse().ok()))
            .filter(|secs: &u64| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let avatar_dir = Self::parse_cli_value(args, "--avatar-dir")
            .or_else(|| env("NINJA_AVATAR_DIR"))
            .map(PathBuf::from)
            .unwrap_or(defaults.avatar_dir);

        let batch_size = env("NINJA_BATCH_SIZE")
            .and_then(|v| v.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(DEFAULT_BATCH_SIZE);

        Config {
            feed_base_url: env("NINJA_FEED_BASE").unwrap_or(defaults.feed_base_url),
            asset_origin: env("NINJA_ASSET_ORIGIN").unwrap_or(defaults.asset_origin),
            referer: env("NINJA_REFERER").unwrap_or(defaults.referer),
            user_agent: env("NINJA_USER_AGENT").unwrap_or(defaults.user_agent),
            timeout: Duration::from_secs(timeout_secs),
            avatar_dir,
            napcat_api_url: env("NAPCAT_API_URL").filter(|v| !v.is_empty()),
            bot_self_id: env("NINJA_BOT_SELF_ID").unwrap_or(defaults.bot_self_id),
            batch_size,
        }
    }

    /// Parse a CLI flag value like `--timeout 5`.
    pub fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}
