use crate::ids::AccountName;
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// Permission
///
/// An authorization as passed to the toolchain: either a bare actor
/// (`alice`) or `actor@permission` (`alice@active`).
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Account part of the authorization.
    #[must_use]
    pub fn actor(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }

    /// Explicit permission level, if one was given.
    #[must_use]
    pub fn level(&self) -> Option<&str> {
        self.0.split_once('@').map(|(_, level)| level)
    }
}

impl From<&str> for Permission {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Permission {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&AccountName> for Permission {
    fn from(name: &AccountName) -> Self {
        Self(name.as_str().to_string())
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_and_level_split_on_at() {
        let p = Permission::from("alice@active");
        assert_eq!(p.actor(), "alice");
        assert_eq!(p.level(), Some("active"));

        let bare = Permission::from("host");
        assert_eq!(bare.actor(), "host");
        assert_eq!(bare.level(), None);
    }
}
