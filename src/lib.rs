pub mod directory;
pub mod error;
pub mod non_api_structs;
pub mod profile;
pub mod relationship;
pub mod shared;
pub mod visibility;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use directory::{Directory, ProfileHandle};
pub use error::{Result, SocialError};
pub use non_api_structs::{ProfileSnapshot, UserRecord, UserStore};
pub use profile::{Post, PostId, Profile};
pub use relationship::RelationshipEngine;
pub use shared::SharedDirectory;
pub use visibility::SessionView;

#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Debug, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Username(pub String);

impl AsRef<Username> for Username {
    fn as_ref(&self) -> &Username {
        self
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Username {
    /// Accepts a single non-empty token. Stores keep `username password`
    /// pairs on one whitespace-separated line, so whitespace is refused.
    pub fn parse(string: impl AsRef<str>) -> Option<Self> {
        let string = string.as_ref();
        if string.is_empty() || string.chars().any(char::is_whitespace) {
            return None;
        }
        Some(Self(string.to_string()))
    }

    /// Like [`Username::parse`], but reports the rejected input.
    pub fn try_new(string: impl AsRef<str>) -> Result<Self> {
        Self::parse(string.as_ref())
            .ok_or_else(|| SocialError::InvalidUsername(string.as_ref().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
