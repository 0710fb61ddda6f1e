//!
//! Process-result classification.
//!
//! Toolchain failures arrive as free text (or a JSON error document when
//! `--json` was requested). The rule table below is the only place that knows
//! the tool's phrasing; callers only ever see an [`ErrorKind`].
//!

use crate::{ThisError, infra::process::ProcessOutput};
use derive_more::Display;
use serde_json::Value;
use std::borrow::Cow;

///
/// ErrorKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum ErrorKind {
    AccountNotFound,
    AlreadyExists,
    AuthorityMismatch,
    BadPassword,
    NodeNotRunning,
    Unclassified,
}

///
/// ClassifiedError
///
/// A failed toolchain call with its semantic kind. Every variant keeps the
/// raw failure text for diagnostics.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ClassifiedError {
    #[error("account not found:\n{0}")]
    AccountNotFound(String),

    #[error("object already exists:\n{0}")]
    AlreadyExists(String),

    #[error("authority mismatch:\n{0}")]
    AuthorityMismatch(String),

    #[error("bad wallet password:\n{0}")]
    BadPassword(String),

    #[error("node is not running:\n{0}")]
    NodeNotRunning(String),

    #[error("{0}")]
    Unclassified(String),
}

impl ClassifiedError {
    #[must_use]
    pub fn new(kind: ErrorKind, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        match kind {
            ErrorKind::AccountNotFound => Self::AccountNotFound(raw),
            ErrorKind::AlreadyExists => Self::AlreadyExists(raw),
            ErrorKind::AuthorityMismatch => Self::AuthorityMismatch(raw),
            ErrorKind::BadPassword => Self::BadPassword(raw),
            ErrorKind::NodeNotRunning => Self::NodeNotRunning(raw),
            ErrorKind::Unclassified => Self::Unclassified(raw),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound(_) => ErrorKind::AccountNotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::AuthorityMismatch(_) => ErrorKind::AuthorityMismatch,
            Self::BadPassword(_) => ErrorKind::BadPassword,
            Self::NodeNotRunning(_) => ErrorKind::NodeNotRunning,
            Self::Unclassified(_) => ErrorKind::Unclassified,
        }
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::AccountNotFound(raw)
            | Self::AlreadyExists(raw)
            | Self::AuthorityMismatch(raw)
            | Self::BadPassword(raw)
            | Self::NodeNotRunning(raw)
            | Self::Unclassified(raw) => raw,
        }
    }
}

///
/// Matcher
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Matcher {
    /// Case-sensitive substring of the failure text.
    Phrase(Cow<'static, str>),

    /// `error.name` of a JSON error document.
    JsonName(Cow<'static, str>),

    /// `error.code` of a JSON error document, or `Error <code>` in prose.
    JsonCode(u64),
}

///
/// Rule
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rule {
    pub kind: ErrorKind,
    pub matcher: Matcher,
}

impl Rule {
    #[must_use]
    pub fn phrase(kind: ErrorKind, phrase: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            matcher: Matcher::Phrase(phrase.into()),
        }
    }

    #[must_use]
    pub fn json_name(kind: ErrorKind, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            matcher: Matcher::JsonName(name.into()),
        }
    }

    #[must_use]
    pub const fn json_code(kind: ErrorKind, code: u64) -> Self {
        Self {
            kind,
            matcher: Matcher::JsonCode(code),
        }
    }

    fn matches(&self, text: &str, json: Option<&JsonError>) -> bool {
        match &self.matcher {
            Matcher::Phrase(phrase) => text.contains(phrase.as_ref()),
            Matcher::JsonName(name) => {
                json.is_some_and(|j| j.name.as_deref() == Some(name.as_ref()))
            }
            Matcher::JsonCode(code) => {
                json.is_some_and(|j| j.code == Some(*code))
                    || text.contains(&format!("Error {code}"))
            }
        }
    }
}

// `error` object of a toolchain JSON error document
struct JsonError {
    name: Option<String>,
    code: Option<u64>,
}

impl JsonError {
    fn find(text: &str) -> Option<Self> {
        let start = text.find('{')?;
        let doc: Value = serde_json::from_str(text[start..].trim_end()).ok()?;
        let err = doc.get("error")?;

        Some(Self {
            name: err.get("name").and_then(Value::as_str).map(str::to_string),
            code: err.get("code").and_then(Value::as_u64),
        })
    }
}

///
/// Classifier
///
/// Ordered rule table; the first matching rule decides the kind.
///

#[derive(Clone, Debug)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    /// A classifier with no rules: every failure is `Unclassified`.
    #[must_use]
    pub const fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule after the existing ones.
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Insert a rule ahead of the existing ones.
    #[must_use]
    pub fn with_priority_rule(mut self, rule: Rule) -> Self {
        self.rules.insert(0, rule);
        self
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// `Ok` for a zero exit status, otherwise the classified failure.
    pub fn classify(&self, output: &ProcessOutput) -> Result<(), ClassifiedError> {
        if output.is_success() {
            return Ok(());
        }

        let text = output.failure_text().trim();
        let text = if text.is_empty() {
            match output.exit_code {
                Some(code) => format!("process exited with status {code}"),
                None => "process terminated by signal".to_string(),
            }
        } else {
            text.to_string()
        };

        Err(self.classify_text(&text))
    }

    /// Kind of a failure text.
    #[must_use]
    pub fn classify_text(&self, text: &str) -> ClassifiedError {
        let json = JsonError::find(text);
        let kind = self
            .rules
            .iter()
            .find(|rule| rule.matches(text, json.as_ref()))
            .map_or(ErrorKind::Unclassified, |rule| rule.kind);

        ClassifiedError::new(kind, text)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        use ErrorKind::{
            AccountNotFound, AlreadyExists, AuthorityMismatch, BadPassword, NodeNotRunning,
        };

        Self::empty()
            // already exists
            .with_rule(Rule::phrase(AlreadyExists, "Wallet already exists"))
            .with_rule(Rule::phrase(AlreadyExists, "Account name already exists"))
            .with_rule(Rule::json_name(AlreadyExists, "account_name_exists_exception"))
            .with_rule(Rule::json_code(AlreadyExists, 3_050_001))
            // wallet password
            .with_rule(Rule::phrase(BadPassword, "Invalid wallet password"))
            .with_rule(Rule::json_name(BadPassword, "wallet_invalid_password_exception"))
            .with_rule(Rule::json_code(BadPassword, 3_120_005))
            // authority
            .with_rule(Rule::phrase(AuthorityMismatch, "missing authority of"))
            .with_rule(Rule::phrase(AuthorityMismatch, "Missing required authority"))
            .with_rule(Rule::phrase(AuthorityMismatch, "irrelevant authority"))
            .with_rule(Rule::json_name(AuthorityMismatch, "missing_auth_exception"))
            .with_rule(Rule::json_name(AuthorityMismatch, "unsatisfied_authorization"))
            .with_rule(Rule::json_name(AuthorityMismatch, "irrelevant_auth_exception"))
            .with_rule(Rule::json_code(AuthorityMismatch, 3_090_004))
            .with_rule(Rule::json_code(AuthorityMismatch, 3_090_003))
            .with_rule(Rule::json_code(AuthorityMismatch, 3_090_006))
            // node
            .with_rule(Rule::phrase(NodeNotRunning, "main.cpp:2712"))
            .with_rule(Rule::phrase(NodeNotRunning, "Failed to connect to nodeos"))
            .with_rule(Rule::phrase(NodeNotRunning, "Failed to connect to keosd"))
            .with_rule(Rule::phrase(NodeNotRunning, "Connection refused"))
            // account lookup
            .with_rule(Rule::phrase(AccountNotFound, "Unable to retrieve account info"))
            .with_rule(Rule::phrase(AccountNotFound, "unknown key"))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(stderr: &str) -> ErrorKind {
        Classifier::default()
            .classify(&ProcessOutput::failure(stderr))
            .expect_err("failure")
            .kind()
    }

    #[test]
    fn zero_exit_is_success_even_with_stderr() {
        let out = ProcessOutput {
            stdout: "executed transaction: abc".into(),
            stderr: "warning: transaction executed locally".into(),
            exit_code: Some(0),
        };

        assert!(Classifier::default().classify(&out).is_ok());
    }

    #[test]
    fn prose_phrases_map_to_kinds() {
        assert_eq!(
            kind_of("Error 3120005: Invalid wallet password"),
            ErrorKind::BadPassword
        );
        assert_eq!(
            kind_of("Wallet already exists: /home/u/eosio-wallet/./default.wallet"),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            kind_of("Error 3090004: Missing required authority\nmissing authority of alice"),
            ErrorKind::AuthorityMismatch
        );
        assert_eq!(
            kind_of("Failed to connect to nodeos at http://127.0.0.1:8888/"),
            ErrorKind::NodeNotRunning
        );
        assert_eq!(
            kind_of("Error 3060002: Unable to retrieve account info"),
            ErrorKind::AccountNotFound
        );
    }

    #[test]
    fn json_error_documents_are_matched_by_name_and_code() {
        let by_name = r#"{"code":500,"error":{"code":1,"name":"unsatisfied_authorization"}}"#;
        let by_code = r#"{"code":500,"error":{"code":3050001,"name":"other"}}"#;

        assert_eq!(kind_of(by_name), ErrorKind::AuthorityMismatch);
        assert_eq!(kind_of(by_code), ErrorKind::AlreadyExists);
    }

    #[test]
    fn unmatched_text_is_unclassified_with_raw_text() {
        let err = Classifier::default()
            .classify(&ProcessOutput::failure("segfault in plugin"))
            .expect_err("failure");

        assert_eq!(err.kind(), ErrorKind::Unclassified);
        assert_eq!(err.raw(), "segfault in plugin");
    }

    #[test]
    fn empty_failure_text_still_fails() {
        let out = ProcessOutput {
            exit_code: None,
            ..ProcessOutput::default()
        };
        let err = Classifier::default().classify(&out).expect_err("signal");

        assert_eq!(err.kind(), ErrorKind::Unclassified);
        assert!(err.raw().contains("signal"));
    }

    #[test]
    fn added_rules_extend_the_table() {
        let classifier = Classifier::default()
            .with_rule(Rule::phrase(ErrorKind::NodeNotRunning, "database dirty flag set"));

        let err = classifier.classify_text("database dirty flag set (likely due to unclean shutdown)");
        assert_eq!(err.kind(), ErrorKind::NodeNotRunning);
    }

    #[test]
    fn priority_rules_win_over_defaults() {
        let classifier = Classifier::default().with_priority_rule(Rule::phrase(
            ErrorKind::Unclassified,
            "Wallet already exists",
        ));

        assert_eq!(
            classifier.classify_text("Wallet already exists").kind(),
            ErrorKind::Unclassified
        );
    }
}
