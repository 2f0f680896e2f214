//! Static DOM queries over a fetched document
//!
//! Documents are parsed on demand and never held across an await point.

use super::{BrowserError, Element};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// Form state layered over a static document by `type_text` and `select`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FieldValue {
    Text(String),
    Selected(Vec<String>),
}

/// An element found in a document
#[derive(Debug, Clone)]
pub(crate) struct Located {
    /// Position of the element in document order; stable for a given source
    pub ordinal: usize,
    pub element: Element,

    /// Option values when the element is a `<select>`
    pub options: Vec<String>,
}

impl Located {
    pub fn is_visible(&self) -> bool {
        let attr = |name: &str| self.element.attribute(name);
        let style = attr("style")
            .map(|s| s.replace(' ', "").to_ascii_lowercase())
            .unwrap_or_default();

        attr("hidden").is_none()
            && attr("type") != Some("hidden")
            && !style.contains("display:none")
            && !style.contains("visibility:hidden")
    }
}

fn parse_selector(selector: &str) -> Result<Selector, BrowserError> {
    Selector::parse(selector)
        .map_err(|e| BrowserError::InvalidSelector(format!("{}: {:?}", selector, e)))
}

/// Finds the first element matching `selector`
pub(crate) fn locate(source: &str, selector: &str) -> Result<Option<Located>, BrowserError> {
    let parsed = parse_selector(selector)?;
    let option_selector = parse_selector("option")?;
    let document = Html::parse_document(source);

    let Some(found) = document.select(&parsed).next() else {
        return Ok(None);
    };

    let ordinal = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .position(|candidate| candidate.id() == found.id())
        .unwrap_or_default();

    let options = if found.value().name().eq_ignore_ascii_case("select") {
        found
            .select(&option_selector)
            .map(|option| {
                option
                    .value()
                    .attr("value")
                    .map(str::to_string)
                    .unwrap_or_else(|| option.text().collect::<String>().trim().to_string())
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(Some(Located {
        ordinal,
        element: Element::from(found),
        options,
    }))
}

/// Text of the document's `<title>`, or an empty string
pub(crate) fn title(source: &str) -> String {
    let Ok(selector) = parse_selector("title") else {
        return String::new();
    };

    Html::parse_document(source)
        .select(&selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// A page function the static evaluator understands
///
/// Supported shapes: `el => el.property` and `el => el.getAttribute('name')`,
/// optionally with parentheses around the parameter, a block body with
/// `return`, and a trailing semicolon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StaticExpression {
    Property(String),
    Attribute(String),
}

impl StaticExpression {
    pub fn parse(function: &str) -> Option<Self> {
        let (param, body) = function.split_once("=>")?;
        let param = param.trim().trim_start_matches('(').trim_end_matches(')').trim();
        if param.is_empty() || !param.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
            return None;
        }

        let mut body = body.trim();
        if let Some(block) = body.strip_prefix('{').and_then(|b| b.strip_suffix('}')) {
            body = block.trim().strip_prefix("return")?.trim();
        }
        let body = body.trim_end_matches(';').trim();

        let access = body.strip_prefix(param)?.strip_prefix('.')?;

        if let Some(call) = access.strip_prefix("getAttribute(") {
            let name = call
                .strip_suffix(')')?
                .trim()
                .trim_matches(|c| c == '\'' || c == '"');
            return Some(Self::Attribute(name.to_string()));
        }

        if access.is_empty() || !access.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return None;
        }

        Some(Self::Property(access.to_string()))
    }

    pub fn evaluate(
        &self,
        located: &Located,
        field: Option<&FieldValue>,
    ) -> Result<Value, BrowserError> {
        let element = &located.element;

        match self {
            Self::Attribute(name) => Ok(element
                .attribute(name)
                .map(|v| Value::from(v.to_string()))
                .unwrap_or(Value::Null)),
            Self::Property(property) => {
                let value = match property.as_str() {
                    "textContent" | "innerText" => element.text.clone(),
                    "innerHTML" => element.inner_html.clone(),
                    "outerHTML" => element.outer_html.clone(),
                    "tagName" | "nodeName" => element.tag_name.to_uppercase(),
                    "className" => element.attribute("class").unwrap_or_default().to_string(),
                    "value" => field_value(located, field),
                    "id" | "href" | "src" | "name" | "type" | "alt" | "placeholder" => {
                        element.attribute(property).unwrap_or_default().to_string()
                    }
                    other => {
                        return Err(BrowserError::Unsupported(format!(
                            "Property '{}' cannot be evaluated on a static document",
                            other
                        )))
                    }
                };
                Ok(Value::from(value))
            }
        }
    }
}

fn field_value(located: &Located, field: Option<&FieldValue>) -> String {
    match field {
        Some(FieldValue::Text(text)) => text.clone(),
        Some(FieldValue::Selected(values)) => values.first().cloned().unwrap_or_default(),
        None if located.element.tag_name == "textarea" => located.element.text.clone(),
        None if located.element.tag_name == "select" => {
            located.options.first().cloned().unwrap_or_default()
        }
        None => located
            .element
            .attribute("value")
            .unwrap_or_default()
            .to_string(),
    }
}
