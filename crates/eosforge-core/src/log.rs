use crate::{Error, config::schema::LogConfig, utils::format};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{
    cell::{Cell, RefCell},
    collections::BTreeSet,
};

///
/// Verbosity
///
/// Diagnostics channels. An emission is dropped unless its channel is enabled.
///

#[derive(
    Clone, Copy, Debug, Display, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Toolchain, // raw tool command lines and output
    Trace,
    Info,
    Error,
    Out,
    Debug,
}

impl Verbosity {
    pub const DEFAULT: [Self; 3] = [Self::Info, Self::Out, Self::Error];

    const fn label(self) -> &'static str {
        match self {
            Self::Toolchain => "TOOL",
            Self::Trace => "TRACE",
            Self::Info => "INFO",
            Self::Error => "ERROR",
            Self::Out => "OUT",
            Self::Debug => "DEBUG",
        }
    }

    const fn color(self) -> (&'static str, &'static str) {
        match self {
            Self::Info => ("\x1b[36m", "\x1b[0m"),
            Self::Trace => ("\x1b[35m", "\x1b[0m"),
            Self::Error => ("\x1b[31m", "\x1b[0m"),
            Self::Debug => ("\x1b[33m", "\x1b[0m"),
            Self::Toolchain | Self::Out => ("", ""),
        }
    }
}

///
/// Topic
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum Topic {
    Account,
    Build,
    Contract,
    Node,
    Registry,
    Template,
    Toolchain,
    Wallet,
}

///
/// LogLine
/// One emitted line, kept when capture is enabled.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogLine {
    pub verbosity: Verbosity,
    pub topic: Option<String>,
    pub message: String,
}

///
/// Diagnostics
///
/// Enabled channels plus the error-surfacing mode. Owned by the session and
/// passed by reference to everything that reports.
///

#[derive(Debug)]
pub struct Diagnostics {
    channels: BTreeSet<Verbosity>,
    testing_errors: Cell<bool>,
    captured: Option<RefCell<Vec<LogLine>>>,
}

impl Diagnostics {
    #[must_use]
    pub fn new(channels: impl IntoIterator<Item = Verbosity>) -> Self {
        Self {
            channels: channels.into_iter().collect(),
            testing_errors: Cell::new(false),
            captured: None,
        }
    }

    #[must_use]
    pub fn from_config(cfg: &LogConfig) -> Self {
        let diag = Self::new(cfg.channels.iter().copied());
        diag.set_testing_errors(cfg.testing_errors);
        diag
    }

    /// All channels off.
    #[must_use]
    pub fn silent() -> Self {
        Self::new([])
    }

    /// Keep emitted lines in memory instead of printing them.
    #[must_use]
    pub fn capturing(mut self) -> Self {
        self.captured = Some(RefCell::new(Vec::new()));
        self
    }

    #[must_use]
    pub fn is_enabled(&self, verbosity: Verbosity) -> bool {
        self.channels.contains(&verbosity)
    }

    #[must_use]
    pub const fn channels(&self) -> &BTreeSet<Verbosity> {
        &self.channels
    }

    #[must_use]
    pub fn testing_errors(&self) -> bool {
        self.testing_errors.get()
    }

    /// Testing-errors mode returns classified failures as `Err` instead of
    /// printing them and flagging the handle.
    pub fn set_testing_errors(&self, on: bool) {
        self.testing_errors.set(on);
    }

    /// Lines captured so far (empty unless built with [`Self::capturing`]).
    #[must_use]
    pub fn captured(&self) -> Vec<LogLine> {
        self.captured
            .as_ref()
            .map(|lines| lines.borrow().clone())
            .unwrap_or_default()
    }

    /// Apply the error-surfacing mode to a failure.
    pub fn surface(&self, err: Error) -> Result<(), Error> {
        if self.testing_errors() {
            return Err(err);
        }

        if self.is_enabled(Verbosity::Error) {
            self.emit(Verbosity::Error, None, &format!("ERROR:\n{err}"));
        }

        Ok(())
    }

    #[doc(hidden)]
    pub fn emit(&self, verbosity: Verbosity, topic: Option<&str>, message: &str) {
        let message = format::heredoc(message);
        if message.is_empty() {
            return;
        }

        if let Some(lines) = &self.captured {
            lines.borrow_mut().push(LogLine {
                verbosity,
                topic: topic.map(str::to_string),
                message,
            });
            return;
        }

        if verbosity == Verbosity::Out {
            println!("{message}");
            return;
        }

        let (color, reset) = verbosity.color();
        let label = format!("{color}{:^5}{reset}", verbosity.label());
        let topic_disp = format::ellipsize_middle(topic.unwrap_or("..."), 9, 4, 4);
        let line = format!("{label}|{topic_disp:^9}| {message}");

        if verbosity == Verbosity::Error {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(Verbosity::DEFAULT)
    }
}

#[macro_export]
macro_rules! log {
    // =========================================
    // (1) With topic (normal + trailing comma)
    // =========================================
    ($diag:expr, $topic:expr, $level:ident, $fmt:expr $(, $arg:expr)* $(,)?) => {{
        let topic = $topic.to_string();
        $crate::log!(
            @inner $diag,
            Some(topic.as_str()),
            $crate::log::Verbosity::$level,
            $fmt $(, $arg)*
        );
    }};

    // =========================================
    // (2) No topic (normal + trailing comma)
    // =========================================
    ($diag:expr, $level:ident, $fmt:expr $(, $arg:expr)* $(,)?) => {{
        $crate::log!(@inner $diag, None::<&str>, $crate::log::Verbosity::$level, $fmt $(, $arg)*);
    }};

    // =========================================
    // INTERNAL
    // =========================================
    (@inner $diag:expr, $topic:expr, $level:expr, $fmt:expr $(, $arg:expr)*) => {{
        let diag: &$crate::log::Diagnostics = &$diag;
        let level = $level;

        if diag.is_enabled(level) {
            let topic_opt: Option<&str> = $topic;
            let message = format!($fmt $(, $arg)*);
            diag.emit(level, topic_opt, &message);
        }
    }};
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::classify::ClassifiedError;

    #[test]
    fn disabled_channels_are_dropped() {
        let diag = Diagnostics::new([Verbosity::Info]).capturing();

        crate::log!(diag, Topic::Wallet, Info, "opened {}", "default");
        crate::log!(diag, Topic::Wallet, Debug, "not shown");
        crate::log!(diag, Trace, "nor this");

        let lines = diag.captured();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].message, "opened default");
        assert_eq!(lines[0].topic.as_deref(), Some("Wallet"));
    }

    #[test]
    fn messages_are_dedented() {
        let diag = Diagnostics::new([Verbosity::Out]).capturing();

        crate::log!(
            diag,
            Out,
            "
            Password:
                PW5abc
            "
        );

        assert_eq!(diag.captured()[0].message, "Password:\n    PW5abc");
    }

    #[test]
    fn normal_mode_prints_and_continues() {
        let diag = Diagnostics::default().capturing();
        let err = Error::from(ClassifiedError::BadPassword("Invalid wallet password".into()));

        diag.surface(err).expect("normal mode does not raise");

        let lines = diag.captured();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].verbosity, Verbosity::Error);
        assert!(lines[0].message.contains("Invalid wallet password"));
    }

    #[test]
    fn testing_errors_mode_raises() {
        let diag = Diagnostics::default().capturing();
        diag.set_testing_errors(true);

        let err = Error::from(ClassifiedError::BadPassword("Invalid wallet password".into()));
        let raised = diag.surface(err).expect_err("testing-errors mode raises");

        assert!(matches!(raised, Error::Classified(_)));
        assert!(diag.captured().is_empty());
    }

    #[test]
    fn config_selects_channels_and_mode() {
        let cfg = LogConfig {
            channels: vec![Verbosity::Debug, Verbosity::Toolchain],
            testing_errors: true,
        };
        let diag = Diagnostics::from_config(&cfg);

        assert!(diag.is_enabled(Verbosity::Debug));
        assert!(diag.is_enabled(Verbosity::Toolchain));
        assert!(!diag.is_enabled(Verbosity::Info));
        assert!(diag.testing_errors());
    }
}
