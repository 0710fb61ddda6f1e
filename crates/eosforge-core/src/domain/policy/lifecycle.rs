use crate::{Error, ThisError};
use derive_more::Display;
use std::{
    io,
    path::{Path, PathBuf},
};

///
/// ContractState
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum ContractState {
    #[default]
    Uninitialized,
    Built,
    Deployed,
    Deleted,
}

///
/// LifecycleError
///

#[derive(Debug, ThisError)]
pub enum LifecycleError {
    #[error("contract must be built before it is deployed (state: {0})")]
    NotBuilt(ContractState),

    #[error("contract must be deployed before actions are pushed (state: {0})")]
    NotDeployed(ContractState),

    #[error("contract {0} has been deleted")]
    Deleted(PathBuf),

    #[error("cannot remove {path}: {source}")]
    CannotRemove { path: PathBuf, source: io::Error },
}

///
/// ImmutableContractError
///

#[derive(Debug, ThisError)]
#[error("contract {0} is immutable and cannot be rebuilt")]
pub struct ImmutableContractError(pub PathBuf);

///
/// LifecyclePolicy
///
/// `Uninitialized → Built → Deployed → Deleted`. A rebuild returns to
/// `Built`; redeploying a deployed contract is allowed.
///

pub struct LifecyclePolicy;

impl LifecyclePolicy {
    pub fn can_build(
        state: ContractState,
        is_mutable: bool,
        source_dir: &Path,
    ) -> Result<(), Error> {
        if state == ContractState::Deleted {
            return Err(LifecycleError::Deleted(source_dir.to_path_buf()).into());
        }
        if !is_mutable {
            return Err(ImmutableContractError(source_dir.to_path_buf()).into());
        }

        Ok(())
    }

    pub fn can_deploy(state: ContractState, source_dir: &Path) -> Result<(), LifecycleError> {
        match state {
            ContractState::Built | ContractState::Deployed => Ok(()),
            ContractState::Deleted => Err(LifecycleError::Deleted(source_dir.to_path_buf())),
            ContractState::Uninitialized => Err(LifecycleError::NotBuilt(state)),
        }
    }

    pub fn can_push(state: ContractState, source_dir: &Path) -> Result<(), LifecycleError> {
        match state {
            ContractState::Deployed => Ok(()),
            ContractState::Deleted => Err(LifecycleError::Deleted(source_dir.to_path_buf())),
            ContractState::Uninitialized | ContractState::Built => {
                Err(LifecycleError::NotDeployed(state))
            }
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    const DIR: &str = "contracts/hello";

    #[test]
    fn deploy_requires_a_build() {
        let err = LifecyclePolicy::can_deploy(ContractState::Uninitialized, Path::new(DIR))
            .expect_err("not built");
        assert!(matches!(err, LifecycleError::NotBuilt(ContractState::Uninitialized)));

        assert!(LifecyclePolicy::can_deploy(ContractState::Built, Path::new(DIR)).is_ok());
        assert!(LifecyclePolicy::can_deploy(ContractState::Deployed, Path::new(DIR)).is_ok());
    }

    #[test]
    fn push_requires_a_deploy() {
        assert!(matches!(
            LifecyclePolicy::can_push(ContractState::Built, Path::new(DIR)),
            Err(LifecycleError::NotDeployed(ContractState::Built))
        ));
        assert!(LifecyclePolicy::can_push(ContractState::Deployed, Path::new(DIR)).is_ok());
    }

    #[test]
    fn immutable_contracts_are_never_rebuilt() {
        let err = LifecyclePolicy::can_build(ContractState::Built, false, Path::new(DIR))
            .expect_err("immutable");
        assert!(matches!(err, Error::Immutable(_)));
    }

    #[test]
    fn deleted_is_terminal() {
        let dir = Path::new(DIR);

        assert!(matches!(
            LifecyclePolicy::can_build(ContractState::Deleted, true, dir),
            Err(Error::Lifecycle(LifecycleError::Deleted(_)))
        ));
        assert!(matches!(
            LifecyclePolicy::can_deploy(ContractState::Deleted, dir),
            Err(LifecycleError::Deleted(_))
        ));
        assert!(matches!(
            LifecyclePolicy::can_push(ContractState::Deleted, dir),
            Err(LifecycleError::Deleted(_))
        ));
    }
}
