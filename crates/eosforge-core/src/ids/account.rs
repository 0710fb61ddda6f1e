use crate::ThisError;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, str::FromStr};

/// Maximum length of a chain account name.
pub const ACCOUNT_NAME_MAX_LEN: usize = 12;

///
/// AccountNameError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum AccountNameError {
    #[error("account name is empty")]
    Empty,

    #[error("account name '{0}' is longer than {ACCOUNT_NAME_MAX_LEN} characters")]
    TooLong(String),

    #[error("account name '{name}' contains '{ch}'; allowed are a-z, 1-5 and '.'")]
    InvalidChar { name: String, ch: char },

    #[error("account name '{0}' ends with '.'")]
    TrailingDot(String),
}

///
/// AccountName
///
/// A validated chain account name: 1 to 12 characters over `a-z`, `1-5` and
/// `.`, not ending in a dot.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountName(String);

impl AccountName {
    pub fn parse(s: &str) -> Result<Self, AccountNameError> {
        if s.is_empty() {
            return Err(AccountNameError::Empty);
        }
        if s.len() > ACCOUNT_NAME_MAX_LEN {
            return Err(AccountNameError::TooLong(s.to_string()));
        }
        if let Some(ch) = s.chars().find(|c| !is_name_char(*c)) {
            return Err(AccountNameError::InvalidChar {
                name: s.to_string(),
                ch,
            });
        }
        if s.ends_with('.') {
            return Err(AccountNameError::TrailingDot(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

/// True for characters that may appear in a chain account name.
#[must_use]
pub const fn is_name_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '1'..='5' | '.')
}

impl FromStr for AccountName {
    type Err = AccountNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountName {
    type Error = AccountNameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl TryFrom<&str> for AccountName {
    type Error = AccountNameError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<AccountName> for String {
    fn from(name: AccountName) -> Self {
        name.into_string()
    }
}

impl AsRef<str> for AccountName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for AccountName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_chain_names() {
        for name in ["eosio", "eosio.token", "alice", "a1b2c3d4e5zz"] {
            assert_eq!(AccountName::parse(name).expect(name).as_str(), name);
        }
    }

    #[test]
    fn rejects_malformed_names() {
        assert_eq!(AccountName::parse(""), Err(AccountNameError::Empty));
        assert!(matches!(
            AccountName::parse("abcdefghijklm"),
            Err(AccountNameError::TooLong(_))
        ));
        assert!(matches!(
            AccountName::parse("Alice"),
            Err(AccountNameError::InvalidChar { ch: 'A', .. })
        ));
        assert!(matches!(
            AccountName::parse("bob6"),
            Err(AccountNameError::InvalidChar { ch: '6', .. })
        ));
        assert!(matches!(
            AccountName::parse("bob."),
            Err(AccountNameError::TrailingDot(_))
        ));
    }

    #[test]
    fn serde_validates_on_the_way_in() {
        let ok: AccountName = serde_json::from_str("\"alice\"").expect("valid");
        assert_eq!(ok.as_str(), "alice");
        assert!(serde_json::from_str::<AccountName>("\"ALICE\"").is_err());
    }
}
