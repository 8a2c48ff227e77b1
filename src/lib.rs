pub mod bot;
pub mod cache;
pub mod config;
pub mod crawler;
pub mod error;
pub mod extractor;
pub mod logger;
pub mod pdf;
pub mod selection;
pub mod utils;

pub use config::SiteConfig;
pub use crawler::ChapterAssembler;
pub use error::{Error, Result};
