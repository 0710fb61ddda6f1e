//!
//! Accounts.
//!
//! Every account, however it came to exist (created by a creator, funded
//! through `system newaccount`, restored from chain, or the bootstrap
//! master), is the same [`Account`] value with the same operations. The
//! construction path is kept as an [`AccountOrigin`] tag.
//!

pub use crate::ops::cleos::{KeyPair, Stake};

use crate::{
    Error,
    domain::policy::classify::ErrorKind,
    ids::{AccountName, Permission},
    infra::{process::ProcessOutput, toolchain::ToolOp},
    log::Topic,
    ops::cleos::{CleosOps, parse},
    workflow::{ErrorState, Reportable, session::Session, wallet::Wallet},
};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::{fmt, path::Path};

/// Rows fetched by [`Account::query_table`] when no limit is given.
pub const DEFAULT_TABLE_LIMIT: u32 = 10;

///
/// AccountOrigin
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AccountOrigin {
    Fresh { creator: AccountName },
    Funded { creator: AccountName, stake: Stake },
    Restored,
    Master,
}

///
/// AccountOptions
///

#[derive(Clone, Debug, Default)]
pub struct AccountOptions {
    /// Chain name; generated when absent.
    pub name: Option<String>,
    pub owner_key: Option<KeyPair>,
    /// Defaults to the owner key.
    pub active_key: Option<KeyPair>,
    /// Authorization for the creating transaction; defaults to the creator.
    pub permission: Option<Permission>,
    /// Create through `system newaccount` with these resources.
    pub stake: Option<Stake>,
}

impl AccountOptions {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn keys(mut self, owner: KeyPair, active: Option<KeyPair>) -> Self {
        self.owner_key = Some(owner);
        self.active_key = active;
        self
    }

    #[must_use]
    pub fn permission(mut self, permission: impl Into<Permission>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    #[must_use]
    pub fn stake(mut self, stake: Stake) -> Self {
        self.stake = Some(stake);
        self
    }
}

///
/// ActionData
///

#[derive(Clone, Debug, PartialEq)]
pub enum ActionData {
    Text(String),
    Json(Value),
}

impl ActionData {
    /// Text passed to the toolchain.
    #[must_use]
    pub fn to_wire(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Json(value) => value.to_string(),
        }
    }
}

impl From<&str> for ActionData {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ActionData {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for ActionData {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

///
/// ActionResult
///
/// Outcome of one pushed action. `debug_buffer` is the console output with
/// chain names replaced by local names.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionResult {
    pub action: String,
    pub permission: String,
    pub transaction_id: Option<String>,
    pub console: String,
    pub debug_buffer: String,
    pub json: Option<Value>,
    pub error: bool,
    pub error_detail: Option<String>,
    pub error_kind: Option<ErrorKind>,
}

impl ActionResult {
    fn executed(
        action: &str,
        permission: &Permission,
        out: &ProcessOutput,
        session: &Session,
    ) -> Self {
        let console = parse::console(out);

        Self {
            action: action.to_string(),
            permission: permission.to_string(),
            transaction_id: parse::transaction_id(out),
            debug_buffer: session.translate(&console),
            console,
            json: serde_json::from_str(out.stdout.trim()).ok(),
            ..Self::default()
        }
    }

    fn failed(action: &str, permission: &Permission, err: &Error) -> Self {
        Self {
            action: action.to_string(),
            permission: permission.to_string(),
            error: true,
            error_detail: Some(err.to_string()),
            error_kind: err.kind(),
            ..Self::default()
        }
    }
}

///
/// Account
///

#[derive(Clone)]
pub struct Account<'s> {
    session: &'s Session,
    name: AccountName,
    local_name: Option<String>,
    origin: AccountOrigin,
    owner_key: Option<KeyPair>,
    active_key: Option<KeyPair>,
    state: ErrorState,
    last_action: Option<ActionResult>,
    is_verbose: i32,
}

impl<'s> Account<'s> {
    pub(crate) const fn new(
        session: &'s Session,
        name: AccountName,
        origin: AccountOrigin,
    ) -> Self {
        Self {
            session,
            name,
            local_name: None,
            origin,
            owner_key: None,
            active_key: None,
            state: ErrorState {
                error: false,
                detail: None,
            },
            last_action: None,
            is_verbose: 1,
        }
    }

    #[must_use]
    pub(crate) fn with_local_name(mut self, local_name: &str) -> Self {
        self.local_name = Some(local_name.to_string());
        self
    }

    #[must_use]
    pub(crate) fn with_keys(mut self, owner: KeyPair, active: KeyPair) -> Self {
        self.owner_key = Some(owner);
        self.active_key = Some(active);
        self
    }

    // ---- accessors ----

    #[must_use]
    pub const fn name(&self) -> &AccountName {
        &self.name
    }

    #[must_use]
    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    #[must_use]
    pub const fn origin(&self) -> &AccountOrigin {
        &self.origin
    }

    #[must_use]
    pub const fn owner_key(&self) -> Option<&KeyPair> {
        self.owner_key.as_ref()
    }

    #[must_use]
    pub const fn active_key(&self) -> Option<&KeyPair> {
        self.active_key.as_ref()
    }

    #[must_use]
    pub const fn session(&self) -> &'s Session {
        self.session
    }

    /// True when the last toolchain-backed operation failed.
    #[must_use]
    pub const fn error(&self) -> bool {
        self.state.error
    }

    #[must_use]
    pub fn error_detail(&self) -> Option<&str> {
        self.state.detail.as_deref()
    }

    #[must_use]
    pub const fn last_action(&self) -> Option<&ActionResult> {
        self.last_action.as_ref()
    }

    /// Echo level for action output; `0` and below stay quiet unless an
    /// action fails.
    #[must_use]
    pub const fn is_verbose(&self) -> i32 {
        self.is_verbose
    }

    pub const fn set_verbose(&mut self, level: i32) {
        self.is_verbose = level;
    }

    /// Translated console output of the last pushed action.
    #[must_use]
    pub fn debug_buffer(&self) -> &str {
        self.last_action
            .as_ref()
            .map_or("", |action| action.debug_buffer.as_str())
    }

    // ---- capabilities ----

    /// Push `action` on this account's contract. Without `permission` the
    /// account's own authority is used.
    pub fn push_action(
        &mut self,
        action: &str,
        data: impl Into<ActionData>,
        permission: Option<Permission>,
    ) -> Result<ActionResult, Error> {
        let session = self.session;
        let permission = permission.unwrap_or_else(|| Permission::from(&self.name));
        let data = data.into().to_wire();

        crate::log!(
            session.diagnostics(),
            Topic::Account,
            Info,
            "push action '{action}' on {} as {permission}",
            self.to_display_string()
        );

        let inv = CleosOps::push_action(
            self.name.as_str(),
            action,
            &data,
            permission.as_str(),
            session.config().toolchain.json,
        );
        let outcome = session.invoke(&inv);

        let result = match &outcome {
            Ok(out) => ActionResult::executed(action, &permission, out, session),
            Err(err) => ActionResult::failed(action, &permission, err),
        };
        self.last_action = Some(result.clone());

        if session.settle(self, Topic::Account, outcome)?.is_some()
            && self.is_verbose > 0
            && !result.debug_buffer.is_empty()
        {
            crate::log!(session.diagnostics(), Out, "{}", result.debug_buffer);
        }

        Ok(result)
    }

    /// Install the contract in `contract_dir` on this account. Returns the
    /// echoed transaction record with its code payload stripped, or `None`
    /// when the deploy failed in normal mode.
    pub fn deploy_contract(
        &mut self,
        contract_dir: &Path,
        wasm_file: Option<&str>,
        abi_file: Option<&str>,
        permission: Option<Permission>,
    ) -> Result<Option<Value>, Error> {
        let session = self.session;
        let permission = permission.unwrap_or_else(|| Permission::from(&self.name));
        let json = session.config().toolchain.json;

        crate::log!(
            session.diagnostics(),
            Topic::Contract,
            Info,
            "deploy {} on {}",
            contract_dir.display(),
            self.to_display_string()
        );

        let outcome = session
            .invoke(&CleosOps::set_contract(
                self.name.as_str(),
                contract_dir,
                wasm_file,
                abi_file,
                permission.as_str(),
                json,
            ))
            .map(|out| {
                let mut record = parse::json(ToolOp::SetContract, &out)
                    .unwrap_or_else(|_| Value::String(out.stdout.trim().to_string()));
                parse::strip_deploy_payload(&mut record);
                record
            });

        session.settle(self, Topic::Contract, outcome)
    }

    /// Hash of the code installed on this account; `None` when there is no
    /// code or the query failed in normal mode.
    pub fn get_code(&mut self) -> Result<Option<String>, Error> {
        let session = self.session;
        let outcome = session
            .invoke(&CleosOps::get_code(self.name.as_str()))
            .map(|out| parse::code_hash(&out));

        Ok(session.settle(self, Topic::Account, outcome)?.flatten())
    }

    /// Rows of `table` in `scope` (this account when absent).
    pub fn query_table(
        &mut self,
        table: &str,
        scope: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<Value>, Error> {
        let session = self.session;
        let scope = scope.unwrap_or(self.name.as_str()).to_string();
        let outcome = session
            .invoke(&CleosOps::get_table(
                self.name.as_str(),
                &scope,
                table,
                limit.unwrap_or(DEFAULT_TABLE_LIMIT),
            ))
            .and_then(|out| Ok(parse::table_rows(&out)?));

        Ok(session
            .settle(self, Topic::Account, outcome)?
            .unwrap_or_default())
    }

    /// On-chain account document.
    pub fn info(&mut self) -> Result<Option<Value>, Error> {
        let session = self.session;
        let outcome = session
            .invoke(&CleosOps::get_account(self.name.as_str()))
            .and_then(|out| Ok(parse::json(ToolOp::GetAccount, &out)?));

        session.settle(self, Topic::Account, outcome)
    }

    /// `local (chain)` when the account has a local name, else the chain name.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match &self.local_name {
            Some(local) if local != self.name.as_str() => format!("{local} ({})", self.name),
            _ => self.name.to_string(),
        }
    }
}

impl Reportable for Account<'_> {
    fn record_error(&mut self, err: &Error) {
        self.state.record(err);
    }

    fn clear_error(&mut self) {
        self.state.clear();
    }
}

impl fmt::Display for Account<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_str())
    }
}

impl fmt::Debug for Account<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("local_name", &self.local_name)
            .field("origin", &self.origin)
            .field("error", &self.state.error)
            .finish_non_exhaustive()
    }
}

// Accounts appear in action data by their chain name.
impl Serialize for Account<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name.as_str())
    }
}

impl From<&Account<'_>> for Permission {
    fn from(account: &Account<'_>) -> Self {
        Self::from(account.name())
    }
}

///
/// Session: account construction
///

impl Session {
    /// Create a new chain account under `creator`, register it as
    /// `local_name` and import its keys into `wallet`.
    ///
    /// A registry conflict or an invalid name is returned before anything is
    /// sent to the toolchain.
    pub fn create_account(
        &self,
        wallet: &Wallet<'_>,
        local_name: &str,
        creator: &Account<'_>,
        opts: AccountOptions,
    ) -> Result<Account<'_>, Error> {
        let name = match &opts.name {
            Some(name) => AccountName::parse(name)?,
            None => AccountName::parse(&self.next_account_name())?,
        };
        self.registry()
            .check(self.diagnostics(), local_name, name.as_str())?;

        let origin = match &opts.stake {
            Some(stake) => AccountOrigin::Funded {
                creator: creator.name().clone(),
                stake: stake.clone(),
            },
            None => AccountOrigin::Fresh {
                creator: creator.name().clone(),
            },
        };

        crate::log!(
            self.diagnostics(),
            Topic::Account,
            Info,
            "create account '{local_name}' ({name}) by {}",
            creator.to_display_string()
        );

        let mut account = Account::new(self, name, origin).with_local_name(local_name);
        let outcome = self.provision_account(wallet, local_name, &account.name, creator, opts);

        if let Some((owner, active)) = self.settle(&mut account, Topic::Account, outcome)? {
            account.owner_key = Some(owner);
            account.active_key = Some(active);
            crate::log!(
                self.diagnostics(),
                Topic::Account,
                Trace,
                "account object '{local_name}' created"
            );
        }

        Ok(account)
    }

    fn provision_account(
        &self,
        wallet: &Wallet<'_>,
        local_name: &str,
        name: &AccountName,
        creator: &Account<'_>,
        opts: AccountOptions,
    ) -> Result<(KeyPair, KeyPair), Error> {
        let (owner, active) = match opts.owner_key {
            Some(owner) => {
                let active = opts.active_key.unwrap_or_else(|| owner.clone());
                (owner, active)
            }
            None => (self.create_key()?, self.create_key()?),
        };

        let permission = opts.permission.unwrap_or_else(|| Permission::from(creator));
        let json = self.config().toolchain.json;
        let inv = match &opts.stake {
            Some(stake) => CleosOps::system_newaccount(
                creator.name().as_str(),
                name.as_str(),
                &owner.public,
                &active.public,
                stake,
                permission.as_str(),
                json,
            ),
            None => CleosOps::create_account(
                creator.name().as_str(),
                name.as_str(),
                &owner.public,
                &active.public,
                permission.as_str(),
                json,
            ),
        };

        let out = self.invoke(&inv)?;
        if let Some(id) = parse::transaction_id(&out) {
            crate::log!(self.diagnostics(), Topic::Account, Trace, "transaction {id}");
        }

        wallet.import_account_keys(local_name, name, &[&owner, &active])?;

        Ok((owner, active))
    }

    /// A fresh key pair from the toolchain.
    pub fn create_key(&self) -> Result<KeyPair, Error> {
        let out = self.invoke(&CleosOps::create_key())?;

        Ok(parse::key_pair(&out)?)
    }

    /// The bootstrap master account. On a local testnet (the master's
    /// on-chain owner key is the configured bootstrap key) its key is
    /// imported into `wallet`. Otherwise a new name and keys are generated
    /// and printed for registration on a public testnet.
    pub fn create_master_account(
        &self,
        wallet: &Wallet<'_>,
        local_name: &str,
    ) -> Result<Account<'_>, Error> {
        let boot = &self.config().bootstrap;
        let master = AccountName::parse(&boot.master)?;

        let owner_key = self
            .invoke(&CleosOps::get_account(master.as_str()))
            .and_then(|out| Ok(parse::json(ToolOp::GetAccount, &out)?))
            .and_then(|doc| Ok(parse::permission_keys(&doc)?));

        let mut account = Account::new(self, master.clone(), AccountOrigin::Master)
            .with_local_name(local_name);

        let Some((owner, _)) = self.settle(&mut account, Topic::Account, owner_key)? else {
            return Ok(account);
        };

        if owner != boot.key_public {
            return self.registration_account(local_name);
        }

        let keys = KeyPair::new(&boot.key_public, &boot.key_private);
        let imported = wallet.import_account_keys(local_name, &master, &[&keys]);
        if self.settle(&mut account, Topic::Account, imported)?.is_some() {
            account = account.with_keys(keys.clone(), keys);
            crate::log!(
                self.diagnostics(),
                Topic::Account,
                Info,
                "Local testnet is ON: the `{master}` account is master."
            );
        }

        Ok(account)
    }

    fn registration_account(&self, local_name: &str) -> Result<Account<'_>, Error> {
        let name = AccountName::parse(&self.next_account_name())?;
        let mut account =
            Account::new(self, name.clone(), AccountOrigin::Master).with_local_name(local_name);

        let keys = self.create_key().and_then(|owner| Ok((owner, self.create_key()?)));
        if let Some((owner, active)) = self.settle(&mut account, Topic::Account, keys)? {
            crate::log!(
                self.diagnostics(),
                Out,
                "
                Use the following data to register a new account on a public testnet:
                Account Name: {name}
                Owner Public Key: {}
                Owner Private Key: {}
                Active Public Key: {}
                Active Private Key: {}
                ",
                owner.public,
                owner.private.as_deref().unwrap_or_default(),
                active.public,
                active.private.as_deref().unwrap_or_default()
            );
            account = account.with_keys(owner, active);
        }

        Ok(account)
    }

    /// Adopt an existing chain account as `local_name`. Its public keys are
    /// read from the chain; the mapping is registered.
    pub fn restore_account(
        &self,
        local_name: &str,
        chain_name: &str,
    ) -> Result<Account<'_>, Error> {
        let name = AccountName::parse(chain_name)?;
        self.registry()
            .check(self.diagnostics(), local_name, name.as_str())?;

        let mut account = self.restored(name.clone(), local_name)?;
        if !account.error() {
            match self.registry().register(self.diagnostics(), local_name, name.as_str()) {
                Ok(()) => {}
                Err(Error::FileState(err)) => {
                    crate::log!(self.diagnostics(), Topic::Registry, Error, "{err}");
                }
                Err(err) => {
                    account.record_error(&err);
                    return Err(err);
                }
            }
        }

        Ok(account)
    }

    pub(crate) fn restored(
        &self,
        name: AccountName,
        local_name: &str,
    ) -> Result<Account<'_>, Error> {
        crate::log!(
            self.diagnostics(),
            Topic::Account,
            Trace,
            "restore account object '{local_name}' for {name}"
        );

        let keys = self
            .invoke(&CleosOps::get_account(name.as_str()))
            .and_then(|out| Ok(parse::json(ToolOp::GetAccount, &out)?))
            .and_then(|doc| Ok(parse::permission_keys(&doc)?));

        let mut account =
            Account::new(self, name, AccountOrigin::Restored).with_local_name(local_name);
        if let Some((owner, active)) = self.settle(&mut account, Topic::Account, keys)? {
            account = account.with_keys(KeyPair::public_only(owner), KeyPair::public_only(active));
        }

        Ok(account)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        log::{Diagnostics, Verbosity},
        test::{CannedToolchain, temp_config},
    };
    use serde_json::json;

    fn host(session: &Session) -> Account<'_> {
        let name = AccountName::parse("hostaaaaaaaa").expect("name");
        Account::new(session, name, AccountOrigin::Restored).with_local_name("host")
    }

    #[test]
    fn push_action_defaults_to_own_permission_and_serializes_data() {
        let (_dir, config) = temp_config();
        let canned = CannedToolchain::new().respond(
            ToolOp::PushAction,
            ProcessOutput::success(
                json!({
                    "transaction_id": "abc123",
                    "processed": {"action_traces": [{"console": "Hello, hostaaaaaaaa"}]}
                })
                .to_string(),
            ),
        );
        let session = Session::new(config, Box::new(canned.clone()));
        session
            .registry()
            .register(session.diagnostics(), "host", "hostaaaaaaaa")
            .expect("register");

        let mut account = host(&session);
        let data = json!({ "user": &account });
        let result = account.push_action("hi", data, None).expect("push");

        let call = canned.calls().pop().expect("one call");
        assert_eq!(call.flag_value("-p"), Some("hostaaaaaaaa"));
        assert_eq!(call.positional(2), Some("{\"user\":\"hostaaaaaaaa\"}"));
        assert_eq!(result.transaction_id.as_deref(), Some("abc123"));
        assert_eq!(result.debug_buffer, "Hello, host");
        assert!(!account.error());
    }

    #[test]
    fn quiet_accounts_do_not_echo_console_output() {
        let (_dir, config) = temp_config();
        let receipt = ProcessOutput::success("executed transaction: abc123\n>> Hello, world\n");
        let canned = CannedToolchain::new()
            .respond(ToolOp::PushAction, receipt.clone())
            .respond(ToolOp::PushAction, receipt);
        let session = Session::new(config, Box::new(canned))
            .with_diagnostics(Diagnostics::new([Verbosity::Out]).capturing());

        let mut account = host(&session);
        account.set_verbose(0);
        account.push_action("hi", "[]", None).expect("quiet push");
        assert!(session.diagnostics().captured().is_empty());

        account.set_verbose(1);
        account.push_action("hi", "[]", None).expect("verbose push");
        let lines = session.diagnostics().captured();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].message.contains("Hello, world"));
    }

    #[test]
    fn failed_push_flags_the_handle() {
        let (_dir, config) = temp_config();
        let canned = CannedToolchain::new().respond(
            ToolOp::PushAction,
            ProcessOutput::failure("Error 3090004: Missing required authority"),
        );
        let session = Session::new(config, Box::new(canned));

        let mut account = host(&session);
        let result = account
            .push_action("hi", "{}", Some(Permission::from("someone")))
            .expect("normal mode");

        assert!(result.error);
        assert_eq!(result.error_kind, Some(ErrorKind::AuthorityMismatch));
        assert!(account.error());
        assert!(account.error_detail().is_some_and(|d| d.contains("Missing required authority")));
    }

    #[test]
    fn create_account_conflict_sends_nothing() {
        let (_dir, config) = temp_config();
        let canned = CannedToolchain::new();
        let session = Session::new(config, Box::new(canned.clone()));
        session
            .registry()
            .register(session.diagnostics(), "alice", "aliceaaaaaaa")
            .expect("register");

        let wallet = Wallet::detached(&session, "default");
        let creator = host(&session);
        let err = session
            .create_account(&wallet, "bob", &creator, AccountOptions::default().name("aliceaaaaaaa"))
            .expect_err("conflict");

        assert!(matches!(err, Error::Conflict(_)));
        assert!(canned.calls().is_empty());
    }

    #[test]
    fn create_account_uses_newaccount_when_staked() {
        let (_dir, config) = temp_config();
        let canned = CannedToolchain::new()
            .respond(ToolOp::CreateKey, ProcessOutput::success("Private key: 5K1\nPublic key: EOS1\n"))
            .respond(ToolOp::CreateKey, ProcessOutput::success("Private key: 5K2\nPublic key: EOS2\n"));
        let session = Session::new(config, Box::new(canned.clone()));

        let wallet = Wallet::detached(&session, "default");
        let creator = host(&session);
        let account = session
            .create_account(&wallet, "carol", &creator, AccountOptions::default().stake(Stake::default()))
            .expect("create");

        assert!(!account.error());
        assert!(matches!(account.origin(), AccountOrigin::Funded { .. }));
        assert_eq!(account.active_key().map(|k| k.public.as_str()), Some("EOS2"));
        assert_eq!(
            canned.ops(),
            [
                ToolOp::CreateKey,
                ToolOp::CreateKey,
                ToolOp::SystemNewaccount,
                ToolOp::WalletImport,
                ToolOp::WalletImport
            ]
        );
        assert_eq!(
            session.registry().lookup_by_local_name(session.diagnostics(), "carol"),
            Some(account.name().to_string())
        );
    }

    #[test]
    fn display_forms() {
        let (_dir, config) = temp_config();
        let session = Session::new(config, Box::new(CannedToolchain::new()));
        let account = host(&session);

        assert_eq!(account.to_string(), "hostaaaaaaaa");
        assert_eq!(account.to_display_string(), "host (hostaaaaaaaa)");
    }
}
