pub mod attr;

use scraper::{ElementRef, Selector};
use serde::{Deserialize, Deserializer};

pub use attr::Attr;

#[derive(Debug, PartialEq)]
pub enum Value {
    /// Nothing matched.
    Empty,
    Single(String),
    Multiple(Vec<String>),
}

impl Value {
    /// Flattens the value into a list, keeping document order.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Value::Empty => Vec::new(),
            Value::Single(v) => vec![v],
            Value::Multiple(vs) => vs,
        }
    }
}

#[typetag::deserialize(tag = "type")]
pub trait Extractor: Send + Sync {
    fn extract(&self, element: ElementRef) -> Value;

    fn extract_all(&self, element: ElementRef) -> Value;
}

/// Locates chapter anchors on the listing page.
#[derive(Deserialize)]
pub struct IndexExtractor {
    #[serde(deserialize_with = "deserialize_selector")]
    pub this: Selector,
    pub link: Box<dyn Extractor>,
}

impl IndexExtractor {
    pub fn extract_link(&self, this: ElementRef) -> Value {
        self.link.extract(this)
    }
}

/// Locates page images on a chapter page.
#[derive(Deserialize)]
pub struct ChapterExtractor {
    pub pages: Box<dyn Extractor>,
}

impl ChapterExtractor {
    pub fn extract_pages(&self, this: ElementRef) -> Value {
        self.pages.extract_all(this)
    }
}

fn deserialize_selector<'de, D>(deserializer: D) -> Result<Selector, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;

    Selector::parse(&s).map_err(|e| serde::de::Error::custom(format!("Invalid selector: {}", e)))
}

fn deserialize_nullable_selector<'de, D>(deserializer: D) -> Result<Option<Selector>, D::Error>
where
    D: Deserializer<'de>,
{
    let option_str: Option<String> = Option::deserialize(deserializer)?;

    match option_str {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Selector::parse(&s)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("Invalid selector '{}': {}", s, e))),
        None => Ok(None),
    }
}
