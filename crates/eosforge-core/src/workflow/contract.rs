use crate::{
    Error,
    domain::policy::lifecycle::{ContractState, LifecycleError, LifecyclePolicy},
    ids::Permission,
    log::Topic,
    ops::build::{BuildError, BuildPlan, BuildStage},
    workflow::{
        ErrorState, Reportable,
        account::{Account, ActionData, ActionResult},
    },
};
use serde_json::Value;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

///
/// Contract
///
/// A contract source tree bound to the account it is deployed on.
/// `Uninitialized → Built → Deployed → Deleted`; ordering violations are
/// returned as errors in every mode.
///

#[derive(Debug)]
pub struct Contract<'s> {
    account: Account<'s>,
    contract_dir: PathBuf,
    is_mutable: bool,
    state: ContractState,
    plan: Option<BuildPlan>,
    last_deploy: Option<Value>,
    status: ErrorState,
}

impl<'s> Contract<'s> {
    /// Contract sources at `contract_dir`. A relative path that does not
    /// exist is looked up in the templates workspace.
    #[must_use]
    pub fn new(account: &Account<'s>, contract_dir: impl AsRef<Path>) -> Self {
        let contract_dir = resolve_dir(account, contract_dir.as_ref());

        Self {
            account: account.clone(),
            contract_dir,
            is_mutable: true,
            state: ContractState::Uninitialized,
            plan: None,
            last_deploy: None,
            status: ErrorState::default(),
        }
    }

    /// An already-compiled contract (e.g. a system contract) that is never
    /// rebuilt. Starts in `Built`.
    #[must_use]
    pub fn prebuilt(account: &Account<'s>, contract_dir: impl AsRef<Path>) -> Self {
        Self {
            is_mutable: false,
            state: ContractState::Built,
            ..Self::new(account, contract_dir)
        }
    }

    // ---- accessors ----

    #[must_use]
    pub const fn account(&self) -> &Account<'s> {
        &self.account
    }

    #[must_use]
    pub fn contract_dir(&self) -> &Path {
        &self.contract_dir
    }

    #[must_use]
    pub const fn state(&self) -> ContractState {
        self.state
    }

    #[must_use]
    pub const fn is_mutable(&self) -> bool {
        self.is_mutable
    }

    #[must_use]
    pub const fn plan(&self) -> Option<&BuildPlan> {
        self.plan.as_ref()
    }

    /// Echoed deploy record with the code payload replaced.
    #[must_use]
    pub const fn last_deploy_result(&self) -> Option<&Value> {
        self.last_deploy.as_ref()
    }

    #[must_use]
    pub const fn error(&self) -> bool {
        self.status.error
    }

    #[must_use]
    pub fn error_detail(&self) -> Option<&str> {
        self.status.detail.as_deref()
    }

    #[must_use]
    pub fn debug_buffer(&self) -> &str {
        self.account.debug_buffer()
    }

    // ---- lifecycle ----

    /// Produce the ABI and WASM in the target directory.
    pub fn build(&mut self) -> Result<bool, Error> {
        LifecyclePolicy::can_build(self.state, self.is_mutable, &self.contract_dir)?;

        let session = self.account.session();
        crate::log!(
            session.diagnostics(),
            Topic::Build,
            Info,
            "building {}",
            self.contract_dir.display()
        );

        let outcome = self.compile();
        let Some(plan) = session.settle(self, Topic::Build, outcome)? else {
            return Ok(false);
        };

        crate::log!(
            session.diagnostics(),
            Topic::Build,
            Info,
            "ABI and WASM files built in {}",
            plan.target_dir.display()
        );
        self.plan = Some(plan);
        self.state = ContractState::Built;

        Ok(true)
    }

    fn compile(&self) -> Result<BuildPlan, Error> {
        let session = self.account.session();
        let includes = &session.config().toolchain.include_dirs;
        let plan = BuildPlan::new(&self.contract_dir)?;

        if let Some(abi) = plan.existing_abi() {
            fs::copy(&abi, plan.abi_path()).map_err(|e| BuildError::io(&abi, e))?;
            crate::log!(session.diagnostics(), Topic::Build, Trace, "copied {}", abi.display());
        } else {
            session
                .invoke(&plan.abi_invocation(includes))
                .map_err(|e| at_stage(e, BuildStage::Abi))?;
        }

        session
            .invoke(&plan.wasm_invocation(includes))
            .map_err(|e| at_stage(e, BuildStage::Wasm))?;

        Ok(plan)
    }

    /// Install the built contract on the bound account.
    pub fn deploy(&mut self, permission: Option<Permission>) -> Result<bool, Error> {
        LifecyclePolicy::can_deploy(self.state, &self.contract_dir)?;

        let (dir, wasm, abi) = match &self.plan {
            Some(plan) => (
                plan.target_dir.clone(),
                file_name(&plan.wasm_path()),
                file_name(&plan.abi_path()),
            ),
            None => (self.contract_dir.clone(), None, None),
        };

        let deployed = self
            .account
            .deploy_contract(&dir, wasm.as_deref(), abi.as_deref(), permission);
        let record = self.mirror(deployed)?;

        if let Some(record) = record {
            self.last_deploy = Some(record);
            self.state = ContractState::Deployed;

            return Ok(true);
        }

        Ok(false)
    }

    /// Push an action on the deployed contract.
    pub fn push_action(
        &mut self,
        action: &str,
        data: impl Into<ActionData>,
        permission: Option<Permission>,
    ) -> Result<ActionResult, Error> {
        LifecyclePolicy::can_push(self.state, &self.contract_dir)?;

        let pushed = self.account.push_action(action, data, permission);
        self.mirror(pushed)
    }

    pub fn table(
        &mut self,
        table: &str,
        scope: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<Value>, Error> {
        let rows = self.account.query_table(table, scope, limit);
        self.mirror(rows)
    }

    pub fn code(&mut self) -> Result<Option<String>, Error> {
        let hash = self.account.get_code();
        self.mirror(hash)
    }

    /// Remove the source tree. Deleting twice is a no-op.
    pub fn delete(&mut self) -> Result<(), Error> {
        if self.state == ContractState::Deleted {
            return Ok(());
        }

        match fs::remove_dir_all(&self.contract_dir) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(LifecycleError::CannotRemove {
                    path: self.contract_dir.clone(),
                    source,
                }
                .into());
            }
        }

        self.state = ContractState::Deleted;
        crate::log!(
            self.account.session().diagnostics(),
            Topic::Contract,
            Info,
            "contract {} deleted",
            self.contract_dir.display()
        );

        Ok(())
    }

    // Copy the account's flag after a delegated call.
    fn mirror<T>(&mut self, result: Result<T, Error>) -> Result<T, Error> {
        match &result {
            Err(err) => self.status.record(err),
            Ok(_) if self.account.error() => {
                self.status.error = true;
                self.status.detail = self.account.error_detail().map(str::to_string);
            }
            Ok(_) => self.status.clear(),
        }

        result
    }
}

impl Reportable for Contract<'_> {
    fn record_error(&mut self, err: &Error) {
        self.status.record(err);
    }

    fn clear_error(&mut self) {
        self.status.clear();
    }
}

fn at_stage(err: Error, stage: BuildStage) -> Error {
    match (err, stage) {
        (Error::Classified(c), BuildStage::Abi) => BuildError::Abi(c).into(),
        (Error::Classified(c), BuildStage::Wasm) => BuildError::Wasm(c).into(),
        (other, _) => other,
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

fn resolve_dir(account: &Account<'_>, dir: &Path) -> PathBuf {
    if dir.is_absolute() || dir.exists() {
        return dir.to_path_buf();
    }

    let in_workspace = Path::new(&account.session().config().templates.workspace).join(dir);
    if in_workspace.exists() {
        in_workspace
    } else {
        dir.to_path_buf()
    }
}

///
/// TESTS
///
