//! Page identifiers, titles, and purge targets.

use crate::error::{Error, Result};
use crate::namespace::Namespace;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum title length in bytes (database key form).
pub const MAX_TITLE_BYTES: usize = 255;

/// Characters that can never appear in a stored title.
const ILLEGAL_TITLE_CHARS: &[char] = &['#', '<', '>', '[', ']', '|', '{', '}'];

/// Numeric page identifier. Always positive for stored pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(i64);

impl PageId {
    pub fn new(id: i64) -> Result<Self> {
        if id <= 0 {
            return Err(Error::InvalidPageId(id));
        }
        Ok(Self(id))
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A page title in database key form (underscores instead of spaces).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageTitle(String);

impl PageTitle {
    /// Normalize and validate a title.
    ///
    /// Leading/trailing whitespace is trimmed and inner spaces become
    /// underscores. Empty titles, control characters, and link syntax
    /// characters are rejected.
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let key = raw.as_ref().trim().replace(' ', "_");
        let key = key.trim_matches('_');

        if key.is_empty() {
            return Err(Error::InvalidTitle("title is empty".to_string()));
        }
        if key.len() > MAX_TITLE_BYTES {
            return Err(Error::InvalidTitle(format!(
                "title is {} bytes (max {})",
                key.len(),
                MAX_TITLE_BYTES
            )));
        }
        if let Some(c) = key
            .chars()
            .find(|c| c.is_control() || ILLEGAL_TITLE_CHARS.contains(c))
        {
            return Err(Error::InvalidTitle(format!(
                "title contains illegal character {c:?}"
            )));
        }

        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable form with spaces.
    pub fn display_text(&self) -> String {
        self.0.replace('_', " ")
    }
}

impl fmt::Display for PageTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PageTitle {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PageTitle> for String {
    fn from(title: PageTitle) -> Self {
        title.0
    }
}

impl AsRef<str> for PageTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A page addressed by namespace and title.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageKey {
    pub namespace: Namespace,
    pub title: PageTitle,
}

impl PageKey {
    pub fn new(namespace: Namespace, title: PageTitle) -> Self {
        Self { namespace, title }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.title)
    }
}

/// How a caller identifies the page to purge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageTarget {
    Id(PageId),
    Key(PageKey),
}

impl PageTarget {
    /// Parse a target of the form `<namespace>:<title>`, e.g. `6:Logo.png`.
    pub fn parse_key(value: &str) -> Result<Self> {
        let (ns, title) = value
            .split_once(':')
            .ok_or_else(|| Error::InvalidTarget(format!("expected <namespace>:<title>: {value}")))?;
        Ok(Self::Key(PageKey::new(ns.parse()?, PageTitle::new(title)?)))
    }
}

impl fmt::Display for PageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Key(key) => write!(f, "{key}"),
        }
    }
}

impl From<PageId> for PageTarget {
    fn from(id: PageId) -> Self {
        Self::Id(id)
    }
}

impl From<PageKey> for PageTarget {
    fn from(key: PageKey) -> Self {
        Self::Key(key)
    }
}
