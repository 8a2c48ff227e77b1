pub mod downloader;
pub mod index;
pub mod parser;
pub mod processor;
pub mod task;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbImage;
use tracing::{info, instrument};
use url::Url;

pub use downloader::Downloader;
pub use index::{ChapterIndex, IndexResolver};
pub use parser::Parser;
pub use processor::Processor;
pub use task::{ChapterLocks, TaskManager};

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::pdf;

/// Downloads chapters and packs each one into `<output_dir>/<chapter>.pdf`.
///
/// Clones share the HTTP limits, the chapter index cache and the per-chapter
/// locks, so one assembler can serve many concurrent callers.
#[derive(Clone)]
pub struct ChapterAssembler {
    downloader: Downloader,
    parser: Parser,
    processor: Processor,
    resolver: Arc<IndexResolver>,
    locks: Arc<ChapterLocks>,
}

impl ChapterAssembler {
    /// Must be called from within a tokio runtime.
    pub fn new(site: SiteConfig, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let site = Arc::new(site);
        let downloader = Downloader::new(&site)?;
        let parser = Parser::new(Arc::clone(&site));
        let resolver = IndexResolver::new(site, downloader.clone(), parser.clone());

        Ok(Self {
            downloader,
            parser,
            processor: Processor::new(output_dir.into()),
            resolver: Arc::new(resolver),
            locks: Arc::default(),
        })
    }

    pub fn resolver(&self) -> &IndexResolver {
        &self.resolver
    }

    pub fn output_dir(&self) -> &Path {
        self.processor.output_dir()
    }

    /// Produces one artifact per requested chapter, in the order requested.
    ///
    /// Every chapter is looked up before any work starts, so an unknown
    /// chapter fails the whole batch without touching the disk. Chapters are
    /// then processed concurrently; the first failure cancels the rest.
    #[instrument(skip(self))]
    pub async fn run(&self, chapters: &[u32]) -> Result<Vec<PathBuf>> {
        let index = self.resolver.index().await?;

        let targets = chapters
            .iter()
            .map(|&chapter| match index.get(&chapter) {
                Some(url) => Ok((chapter, url.clone())),
                None => Err(Error::ChapterNotFound { chapter }),
            })
            .collect::<Result<Vec<_>>>()?;

        self.processor.prepare().await?;

        let mut tasks = TaskManager::new();
        for (chapter, url) in targets {
            let this = self.clone();
            tasks.spawn(async move { this.process_chapter(chapter, url).await });
        }
        let paths = tasks.wait().await?;

        info!(chapters = paths.len(), "run finished");
        Ok(paths)
    }

    #[instrument(skip(self, url))]
    async fn process_chapter(&self, chapter: u32, url: String) -> Result<PathBuf> {
        let _guard = self.locks.lock(chapter).await;

        if let Some(path) = self.processor.existing(chapter).await? {
            info!("already downloaded: {}", path.display());
            return Ok(path);
        }

        let chapter_url = Url::parse(&url).map_err(|e| Error::transport(&url, e))?;
        let html = self.downloader.chapter(&url).await?;
        let srcs = self.parser.page_urls(&html);
        if srcs.is_empty() {
            return Err(Error::NoPages { chapter });
        }
        info!(pages = srcs.len(), "downloading pages");

        let mut pages = TaskManager::new();
        for src in srcs {
            let page_url = chapter_url
                .join(&src)
                .map_err(|e| Error::transport(&src, e))?;
            pages.spawn(fetch_page(self.downloader.clone(), page_url.to_string()));
        }
        let images = pages.wait().await?;

        let pdf = tokio::task::spawn_blocking(move || pdf::pack(chapter, &images)).await??;
        self.processor.write_pdf(chapter, pdf).await
    }
}

async fn fetch_page(downloader: Downloader, url: String) -> Result<RgbImage> {
    let bytes = downloader.image(&url).await?;
    tokio::task::spawn_blocking(move || pdf::decode(&url, &bytes)).await?
}
