//! Wiki namespaces.
//!
//! Namespaces are small integers. Non-negative namespaces come in
//! subject/talk pairs (`2n` and `2n + 1`); negative namespaces are virtual
//! and never hold stored pages.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A wiki namespace identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(i32);

impl Namespace {
    pub const MEDIA: Self = Self(-2);
    pub const SPECIAL: Self = Self(-1);
    pub const MAIN: Self = Self(0);
    pub const TALK: Self = Self(1);
    pub const USER: Self = Self(2);
    pub const PROJECT: Self = Self(4);
    pub const FILE: Self = Self(6);
    pub const FILE_TALK: Self = Self(7);
    pub const TEMPLATE: Self = Self(10);
    pub const CATEGORY: Self = Self(14);

    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn id(self) -> i32 {
        self.0
    }

    /// Virtual namespaces (Special, Media) have no stored pages.
    pub const fn is_virtual(self) -> bool {
        self.0 < 0
    }

    pub const fn is_special(self) -> bool {
        self.0 == Self::SPECIAL.0
    }

    pub const fn is_talk(self) -> bool {
        self.0 >= 0 && self.0 % 2 == 1
    }

    /// Pages in this namespace describe an uploaded file.
    pub const fn is_file(self) -> bool {
        self.0 == Self::FILE.0
    }

    /// The associated talk namespace for a subject namespace, or the
    /// subject namespace for a talk namespace. `None` for virtual namespaces.
    pub const fn counterpart(self) -> Option<Self> {
        if self.is_virtual() {
            None
        } else {
            Some(Self(self.0 ^ 1))
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Namespace {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl FromStr for Namespace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i32>()
            .map(Self)
            .map_err(|_| Error::InvalidNamespace(s.to_string()))
    }
}
