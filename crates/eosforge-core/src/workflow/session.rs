use crate::{
    Error,
    config::{Config, ConfigModel},
    domain::policy::classify::Classifier,
    infra::{
        process::ProcessOutput,
        toolchain::{CliToolchain, Invocation, Toolchain},
    },
    log::{Diagnostics, Topic, Verbosity},
    model::{CredentialCache, ObjectRegistry},
    utils::rand::NameRng,
    workflow::{Reportable, node::Node},
};
use std::{cell::RefCell, fmt, path::Path};

///
/// Session
///
/// Everything one process run needs: configuration, the diagnostics channel,
/// the toolchain seam, the classifier, and the two wallet-directory files.
/// Handles created from a session borrow it.
///
/// One session per wallet directory at a time; the mapping files are
/// replaced atomically but not locked.
///

pub struct Session {
    config: ConfigModel,
    diag: Diagnostics,
    toolchain: Box<dyn Toolchain>,
    classifier: Classifier,
    registry: ObjectRegistry,
    credentials: CredentialCache,
    names: RefCell<NameRng>,
}

impl Session {
    #[must_use]
    pub fn new(config: ConfigModel, toolchain: Box<dyn Toolchain>) -> Self {
        let registry = ObjectRegistry::new(
            config.wallet.account_map_path(&config.node),
            config.bootstrap.reserved.clone(),
        );
        let credentials = CredentialCache::new(config.wallet.password_map_path(&config.node));

        Self {
            diag: Diagnostics::from_config(&config.log),
            toolchain,
            classifier: Classifier::default(),
            registry,
            credentials,
            names: RefCell::new(NameRng::from_entropy()),
            config,
        }
    }

    /// A session driving the real `cleos`/`nodeos` binaries.
    #[must_use]
    pub fn with_cli_toolchain(config: ConfigModel) -> Self {
        let toolchain = CliToolchain::new(&config.toolchain, &config.node);
        Self::new(config, Box::new(toolchain))
    }

    /// Load `path` (defaults when missing) and drive the real binaries.
    pub fn load(path: &Path) -> Result<Self, Error> {
        Ok(Self::with_cli_toolchain(Config::load(path)?))
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diag: Diagnostics) -> Self {
        self.diag = diag;
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Make generated account names reproducible.
    #[must_use]
    pub fn with_name_seed(self, seed: [u8; 32]) -> Self {
        *self.names.borrow_mut() = NameRng::seed_from(seed);
        self
    }

    // ---- accessors ----

    #[must_use]
    pub const fn config(&self) -> &ConfigModel {
        &self.config
    }

    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    #[must_use]
    pub const fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    #[must_use]
    pub const fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn credentials(&self) -> &CredentialCache {
        &self.credentials
    }

    pub fn set_testing_errors(&self, on: bool) {
        self.diag.set_testing_errors(on);
    }

    #[must_use]
    pub const fn node(&self) -> Node<'_> {
        Node::new(self)
    }

    // ---- toolchain ----

    /// Run one invocation and classify its result. This is the only place
    /// toolchain output is classified.
    pub fn invoke(&self, invocation: &Invocation) -> Result<ProcessOutput, Error> {
        crate::log!(self.diag, Toolchain, "{}", invocation.command_line());

        let out = self.toolchain.invoke(invocation)?;

        if self.diag.is_enabled(Verbosity::Toolchain) {
            for text in [&out.stdout, &out.stderr] {
                if !text.trim().is_empty() {
                    self.diag.emit(Verbosity::Toolchain, None, text);
                }
            }
        }
        self.classifier.classify(&out)?;

        Ok(out)
    }

    pub(crate) fn next_account_name(&self) -> String {
        self.names.borrow_mut().account_name()
    }

    /// Chain names in `text` replaced by their registered local names.
    #[must_use]
    pub fn translate(&self, text: &str) -> String {
        self.registry.translate(&self.diag, text)
    }

    // ---- error surfacing ----

    /// Record a toolchain-backed failure on `handle`, then apply the
    /// error-surfacing mode: `Ok` in normal mode, `Err` in testing-errors
    /// mode.
    pub(crate) fn report<H>(&self, handle: &mut H, topic: Topic, err: Error) -> Result<(), Error>
    where
        H: Reportable,
    {
        handle.record_error(&err);
        crate::log!(self.diag, topic, Debug, "{err:?}");

        self.diag.surface(err)
    }

    /// Precondition violations bypass the surfacing mode and are always
    /// returned.
    pub(crate) const fn is_precondition(err: &Error) -> bool {
        matches!(
            err,
            Error::AccountName(_)
                | Error::Config(_)
                | Error::Conflict(_)
                | Error::Immutable(_)
                | Error::Lifecycle(_)
                | Error::Template(_)
        )
    }

    /// Apply [`Self::report`] to a fallible step: success clears the
    /// handle's flag, preconditions propagate, everything else is reported.
    pub(crate) fn settle<H, T>(
        &self,
        handle: &mut H,
        topic: Topic,
        result: Result<T, Error>,
    ) -> Result<Option<T>, Error>
    where
        H: Reportable,
    {
        match result {
            Ok(value) => {
                handle.clear_error();
                Ok(Some(value))
            }
            Err(err) if Self::is_precondition(&err) => Err(err),
            Err(err) => {
                self.report(handle, topic, err)?;
                Ok(None)
            }
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("node", &self.config.node.url)
            .field("registry", &self.registry.path())
            .field("credentials", &self.credentials.path())
            .finish_non_exhaustive()
    }
}

///
/// TESTS
///
