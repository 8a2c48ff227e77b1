use scraper::{ElementRef, Selector};
use serde::Deserialize;

use super::{Extractor, Value, deserialize_nullable_selector};

/// Reads attribute `name` from the element itself, or from the elements
/// matched by `selector` beneath it. Missing or empty attributes are skipped.
#[derive(Deserialize)]
pub struct Attr {
    #[serde(default, deserialize_with = "deserialize_nullable_selector")]
    pub selector: Option<Selector>,
    pub name: String,
}

impl Attr {
    fn read(&self, element: ElementRef) -> Option<String> {
        element
            .value()
            .attr(&self.name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }
}

#[typetag::deserialize]
impl Extractor for Attr {
    fn extract(&self, element: ElementRef) -> Value {
        let attr = match &self.selector {
            Some(selector) => element.select(selector).find_map(|e| self.read(e)),
            None => self.read(element),
        };

        attr.map_or(Value::Empty, Value::Single)
    }

    fn extract_all(&self, element: ElementRef) -> Value {
        let results: Vec<String> = match &self.selector {
            Some(selector) => element.select(selector).filter_map(|e| self.read(e)).collect(),
            None => self.read(element).into_iter().collect(),
        };

        if results.is_empty() {
            Value::Empty
        } else {
            Value::Multiple(results)
        }
    }
}
