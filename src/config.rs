use std::{path::Path, time::Duration};

use serde::Deserialize;
use tokio::sync::Semaphore;
use url::Url;

use crate::error::{Error, Result};
use crate::extractor::{ChapterExtractor, IndexExtractor};

static BUILTIN_SITE: &str = include_str!("../config/tcbscans.toml");

/// Environment variables with this prefix override top-level keys,
/// e.g. `TCB_FETCH_TIMEOUT_SECS=30`.
static ENV_PREFIX: &str = "TCB_FETCH";

#[derive(Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub base_url: String,
    /// Path of the chapter listing page, relative to `base_url`.
    pub listing_path: String,
    #[serde(default)]
    pub rate_limit: RateLimit,
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_index_ttl_secs")]
    pub index_ttl_secs: u64,
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,
    pub index: IndexExtractor,
    pub chapter: ChapterExtractor,
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub struct RateLimit {
    pub num: u64,
    pub secs: u64,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            num: u64::MAX,
            secs: 1,
        }
    }
}

fn default_concurrency_limit() -> usize {
    Semaphore::MAX_PERMITS
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_index_ttl_secs() -> u64 {
    20 * 60
}

fn default_follow_redirects() -> bool {
    true
}

impl SiteConfig {
    /// The site this binary was built for.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_SITE)
    }

    pub fn load(config_path: &Path) -> Result<Self> {
        let file_content =
            std::fs::read_to_string(config_path).map_err(|e| Error::io(config_path, e))?;
        Self::from_toml(&file_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url).map_err(|e| invalid(format!("base_url: {}", e)))?;
        if self.rate_limit.num == 0 || self.rate_limit.secs == 0 {
            return Err(invalid("rate_limit.num and rate_limit.secs must be positive"));
        }
        if self.concurrency_limit == 0 {
            return Err(invalid("concurrency_limit must be positive"));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs must be positive"));
        }
        Ok(())
    }

    pub fn listing_url(&self) -> Result<Url> {
        self.join(&self.listing_path)
    }

    /// Resolves an `href` found on the site against `base_url`.
    pub fn join(&self, href: &str) -> Result<Url> {
        Url::parse(&self.base_url)
            .and_then(|base| base.join(href))
            .map_err(|e| invalid(format!("cannot resolve '{}': {}", href, e)))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn index_ttl(&self) -> Duration {
        Duration::from_secs(self.index_ttl_secs)
    }

    /// Concurrency limit clamped to what a semaphore can hold.
    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit.min(Semaphore::MAX_PERMITS)
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::Config(config::ConfigError::Message(message.into()))
}
