//! Declarative HTML node location and value extraction.
//!
//! Sources that are scraped from HTML describe each field as a [`Descriptor`]
//! (method + CSS query + index). Descriptors are compiled into [`Locator`]s
//! once, when the adapter is built, so a bad method or selector fails at
//! startup instead of in the middle of a crawl.

use std::str::FromStr;

use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;

/// Attributes whose value is a whitespace separated list.
const LIST_VALUED_ATTRIBUTES: &[&str] = &[
    "class",
    "rel",
    "rev",
    "accept-charset",
    "headers",
    "accesskey",
];

/// Extraction name that selects inner text instead of an attribute.
pub const TEXT: &str = "text";

/// How a descriptor picks nodes below its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// First matching descendant.
    FindOne,
    /// All matching descendants, then `index`.
    FindAll,
    /// CSS select, then `index`.
    Select,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FindOne => "find-one",
            Self::FindAll => "find-all",
            Self::Select => "select",
        }
    }
}

impl FromStr for Method {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "find-one" => Ok(Self::FindOne),
            "find-all" => Ok(Self::FindAll),
            "select" => Ok(Self::Select),
            other => Err(ScrapeError::config(format!(
                "unsupported locator method '{}' (expected find-one, find-all or select)",
                other
            ))),
        }
    }
}

/// Uncompiled description of where a field lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub method: Method,
    /// CSS selector evaluated against the root's descendants.
    pub query: String,
    #[serde(default)]
    pub index: usize,
}

impl Descriptor {
    pub fn new(method: Method, query: impl Into<String>, index: usize) -> Self {
        Self {
            method,
            query: query.into(),
            index,
        }
    }

    pub fn select(query: impl Into<String>) -> Self {
        Self::new(Method::Select, query, 0)
    }

    /// Build a descriptor from a method name, rejecting unknown methods.
    pub fn parse(method: &str, query: impl Into<String>, index: usize) -> Result<Self, ScrapeError> {
        Ok(Self::new(method.parse()?, query, index))
    }

    /// Parse the query and produce a reusable locator.
    pub fn compile(&self) -> Result<Locator, ScrapeError> {
        let selector = Selector::parse(&self.query).map_err(|e| {
            ScrapeError::config(format!("invalid selector '{}': {}", self.query, e))
        })?;
        Ok(Locator {
            method: self.method,
            selector,
            index: self.index,
        })
    }
}

/// A compiled descriptor.
#[derive(Debug, Clone)]
pub struct Locator {
    method: Method,
    selector: Selector,
    index: usize,
}

impl Locator {
    pub fn method(&self) -> Method {
        self.method
    }
}

/// Locate a single node below `root`. A missing root or match yields `None`.
pub fn locate<'a>(root: Option<ElementRef<'a>>, locator: &Locator) -> Option<ElementRef<'a>> {
    let root = root?;
    match locator.method {
        Method::FindOne => root.select(&locator.selector).next(),
        Method::FindAll | Method::Select => {
            let nodes: Vec<ElementRef<'a>> = root.select(&locator.selector).collect();
            nodes.get(locator.index).copied()
        }
    }
}

/// Locate every node below `root` matching the locator.
pub fn locate_all<'a>(root: Option<ElementRef<'a>>, locator: &Locator) -> Vec<ElementRef<'a>> {
    let Some(root) = root else {
        return Vec::new();
    };
    match locator.method {
        Method::FindOne => root.select(&locator.selector).take(1).collect(),
        Method::FindAll | Method::Select => root.select(&locator.selector).collect(),
    }
}

/// Pull text (`"text"`) or an attribute value out of a node.
pub fn extract_value(node: Option<ElementRef<'_>>, name: &str) -> String {
    let Some(node) = node else {
        return String::new();
    };

    if name == TEXT {
        return node.text().collect::<String>().trim().to_string();
    }

    match node.value().attr(name) {
        Some(value) if LIST_VALUED_ATTRIBUTES.contains(&name) => {
            value.split_whitespace().collect::<Vec<_>>().join(",")
        }
        Some(value) => value.trim().to_string(),
        None => String::new(),
    }
}

/// How to read one field relative to a listing section.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// `None` reads from the section element itself.
    locator: Option<Locator>,
    attribute: String,
}

impl FieldRule {
    /// Inner text of the node the descriptor locates.
    pub fn text(descriptor: Descriptor) -> Result<Self, ScrapeError> {
        Self::attr(descriptor, TEXT)
    }

    /// Attribute of the node the descriptor locates.
    pub fn attr(descriptor: Descriptor, attribute: &str) -> Result<Self, ScrapeError> {
        Ok(Self {
            locator: Some(descriptor.compile()?),
            attribute: attribute.to_string(),
        })
    }

    /// Attribute of the section element itself.
    pub fn own_attr(attribute: &str) -> Self {
        Self {
            locator: None,
            attribute: attribute.to_string(),
        }
    }

    pub fn extract(&self, section: ElementRef<'_>) -> String {
        let node = match &self.locator {
            Some(locator) => locate(Some(section), locator),
            None => Some(section),
        };
        extract_value(node, &self.attribute)
    }
}

/// Compile a CSS selector used to split a page into sections.
pub fn section_selector(query: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(query)
        .map_err(|e| ScrapeError::config(format!("invalid selector '{}': {}", query, e)))
}

/// Parse a scraped counter. Malformed or empty text counts as 0.
pub fn parse_count(text: &str) -> i64 {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().map(|f| f as i64))
        .unwrap_or(0)
}

/// Treat an empty scraped string as missing.
pub fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
