use scraper::ElementRef;
use std::collections::BTreeMap;

/// Snapshot of a DOM element returned by element queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name
    pub tag_name: String,
    pub text: String,
    pub inner_html: String,
    pub outer_html: String,
    pub attributes: BTreeMap<String, String>,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }
}

impl From<ElementRef<'_>> for Element {
    fn from(element: ElementRef<'_>) -> Self {
        let value = element.value();

        Self {
            tag_name: value.name().to_lowercase(),
            text: element.text().collect(),
            inner_html: element.inner_html(),
            outer_html: element.html(),
            attributes: value
                .attrs()
                .map(|(name, val)| (name.to_string(), val.to_string()))
                .collect(),
        }
    }
}
