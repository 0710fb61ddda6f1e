use crate::{
    ThisError,
    config::ConfigError,
    domain::policy::{
        classify::{ClassifiedError, ErrorKind},
        lifecycle::{ImmutableContractError, LifecycleError},
        registry::ConflictError,
    },
    ids::AccountNameError,
    infra::toolchain::ToolchainError,
    model::FileStateError,
    ops::{build::BuildError, cleos::ResponseError},
    workflow::{node::NodeError, template::TemplateError},
};

///
/// Error
///
/// Crate-level error. Toolchain failures arrive here already classified;
/// everything above the process boundary either records them on a handle
/// (normal mode) or returns them (testing-errors mode).
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    AccountName(#[from] AccountNameError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Classified(#[from] ClassifiedError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    FileState(#[from] FileStateError),

    #[error(transparent)]
    Immutable(#[from] ImmutableContractError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),
}

impl Error {
    /// The classified toolchain failure behind this error, if any.
    #[must_use]
    pub const fn classified(&self) -> Option<&ClassifiedError> {
        match self {
            Self::Classified(err) => Some(err),
            Self::Build(err) => err.classified(),
            _ => None,
        }
    }

    /// Semantic kind of a classified failure.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        self.classified().map(ClassifiedError::kind)
    }

    #[must_use]
    pub fn is_kind(&self, kind: ErrorKind) -> bool {
        self.kind() == Some(kind)
    }
}
