use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::cache::TtlCache;
use crate::config::SiteConfig;
use crate::crawler::{Downloader, Parser};
use crate::error::Result;

/// Chapter number → chapter page URL.
pub type ChapterIndex = HashMap<u32, String>;

/// Fetches and caches the site's chapter listing.
pub struct IndexResolver {
    site: Arc<SiteConfig>,
    downloader: Downloader,
    parser: Parser,
    cache: TtlCache<ChapterIndex>,
}

impl IndexResolver {
    pub fn new(site: Arc<SiteConfig>, downloader: Downloader, parser: Parser) -> Self {
        let cache = TtlCache::new(site.index_ttl());
        Self {
            site,
            downloader,
            parser,
            cache,
        }
    }

    /// The current index. Only the first call in each TTL window touches the
    /// network; callers arriving while it is being fetched share that fetch.
    #[instrument(skip_all)]
    pub async fn index(&self) -> Result<Arc<ChapterIndex>> {
        self.cache.get_or_try_init(|| self.fetch()).await
    }

    async fn fetch(&self) -> Result<ChapterIndex> {
        let url = self.site.listing_url()?;
        info!(%url, "fetching chapter listing");
        let listing = self.downloader.listing(url.as_str()).await?;
        Ok(self.parser.chapter_index(&listing))
    }
}
