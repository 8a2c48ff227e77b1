use std::sync::{Arc, LazyLock};

use regex::Regex;
use scraper::Html;
use tracing::{debug, info, instrument, warn};

use crate::config::SiteConfig;
use crate::crawler::index::ChapterIndex;

static CHAPTER_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("chapter number pattern"));

#[derive(Clone)]
pub struct Parser {
    site: Arc<SiteConfig>,
}

impl Parser {
    pub fn new(site: Arc<SiteConfig>) -> Self {
        Self { site }
    }

    /// Builds the chapter number → chapter page URL map from the listing page.
    ///
    /// Anchors without a number in their last path segment are skipped. When
    /// two anchors carry the same number the later one wins.
    #[instrument(skip_all)]
    pub fn chapter_index(&self, listing: &str) -> ChapterIndex {
        let document = Html::parse_document(listing);
        let extractor = &self.site.index;

        let mut index = ChapterIndex::new();
        for anchor in document.select(&extractor.this) {
            for href in extractor.extract_link(anchor).into_vec() {
                let Some(chapter) = chapter_number(&href) else {
                    debug!(%href, "anchor without chapter number");
                    continue;
                };

                match self.site.join(&href) {
                    Ok(url) => {
                        if let Some(previous) = index.insert(chapter, url.to_string()) {
                            debug!(chapter, %previous, "duplicate chapter anchor, keeping the later one");
                        }
                    }
                    Err(e) => warn!(%href, "skipping anchor: {}", e),
                }
            }
        }

        info!(chapters = index.len(), "chapter index parsed");
        index
    }

    /// Page image URLs of a chapter, in reading order.
    #[instrument(skip_all)]
    pub fn page_urls(&self, chapter: &str) -> Vec<String> {
        let document = Html::parse_document(chapter);
        let urls = self
            .site
            .chapter
            .extract_pages(document.root_element())
            .into_vec();
        debug!(pages = urls.len(), "page urls extracted");
        urls
    }
}

/// First run of digits in the last path segment of `href`. Chapters are
/// numbered from 1.
pub fn chapter_number(href: &str) -> Option<u32> {
    let segment = href.rsplit('/').next()?;
    CHAPTER_NUMBER
        .find(segment)
        .and_then(|m| m.as_str().parse().ok())
        .filter(|&n| n > 0)
}
