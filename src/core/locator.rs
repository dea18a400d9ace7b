use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy half of a [`Locator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum By {
    Css,
    XPath,
    Id,
    Name,
    ClassName,
    TagName,
}

/// Immutable element selection criterion.
///
/// The waiting core never looks inside a locator; it only hands it to the
/// [`RemoteSession`](crate::core::RemoteSession) and uses it as a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    by: By,
    value: String,
}

impl Locator {
    pub fn new(by: By, value: impl Into<String>) -> Self {
        Self {
            by,
            value: value.into(),
        }
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(By::Css, selector)
    }

    pub fn xpath(query: impl Into<String>) -> Self {
        Self::new(By::XPath, query)
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::new(By::Id, id)
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::new(By::Name, name)
    }

    pub fn class_name(class: impl Into<String>) -> Self {
        Self::new(By::ClassName, class)
    }

    pub fn tag_name(tag: impl Into<String>) -> Self {
        Self::new(By::TagName, tag)
    }

    pub fn by(&self) -> By {
        self.by
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// CSS equivalent of this locator, `None` for XPath.
    pub fn to_css(&self) -> Option<String> {
        let value = &self.value;
        match self.by {
            By::Css => Some(value.clone()),
            By::XPath => None,
            By::Id => Some(format!("[id=\"{}\"]", escape_attribute(value))),
            By::Name => Some(format!("[name=\"{}\"]", escape_attribute(value))),
            By::ClassName => Some(format!("[class~=\"{}\"]", escape_attribute(value))),
            By::TagName => Some(value.clone()),
        }
    }
}

fn escape_attribute(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let by = match self.by {
            By::Css => "css",
            By::XPath => "xpath",
            By::Id => "id",
            By::Name => "name",
            By::ClassName => "class name",
            By::TagName => "tag name",
        };
        write!(f, "By.{}: {}", by, self.value)
    }
}
