//!
//! Wallets.
//!
//! Opening a wallet by name goes through the credential cache: a cached (or
//! given) password opens and unlocks the existing wallet, otherwise the
//! wallet is created and its generated password is cached. With `keosd` the
//! cache is not used and the password is printed once.
//!

use crate::{
    Error,
    ids::AccountName,
    log::Topic,
    ops::cleos::{CleosOps, KeyPair, parse},
    workflow::{ErrorState, Reportable, account::Account, session::Session},
};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

///
/// Wallet
///

pub struct Wallet<'s> {
    session: &'s Session,
    name: String,
    password: Option<String>,
    state: ErrorState,
}

impl<'s> Wallet<'s> {
    /// A handle that has not talked to the toolchain yet.
    pub(crate) fn detached(session: &'s Session, name: &str) -> Self {
        Self {
            session,
            name: name.to_string(),
            password: None,
            state: ErrorState::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    #[must_use]
    pub const fn error(&self) -> bool {
        self.state.error
    }

    #[must_use]
    pub fn error_detail(&self) -> Option<&str> {
        self.state.detail.as_deref()
    }

    // ---- toolchain operations ----

    pub fn open(&mut self) -> Result<bool, Error> {
        let session = self.session;
        let outcome = session.invoke(&CleosOps::wallet_open(&self.name)).map(|_| ());

        Ok(session.settle(self, Topic::Wallet, outcome)?.is_some())
    }

    pub fn lock(&mut self) -> Result<bool, Error> {
        let session = self.session;
        let outcome = session.invoke(&CleosOps::wallet_lock(&self.name)).map(|_| ());
        let locked = session.settle(self, Topic::Wallet, outcome)?.is_some();
        if locked {
            crate::log!(
                session.diagnostics(),
                Topic::Wallet,
                Trace,
                "wallet '{}' locked",
                self.name
            );
        }

        Ok(locked)
    }

    /// Unlock with the handle's password, falling back to the cache.
    pub fn unlock(&mut self) -> Result<bool, Error> {
        let session = self.session;
        let password = self
            .password
            .clone()
            .or_else(|| session.credentials().get(session.diagnostics(), &self.name))
            .unwrap_or_default();
        let outcome = self.unlock_with(&password);

        Ok(session.settle(self, Topic::Wallet, outcome)?.is_some())
    }

    /// Public keys held by the open, unlocked wallets.
    pub fn keys(&mut self) -> Result<Vec<String>, Error> {
        let session = self.session;
        let outcome = session
            .invoke(&CleosOps::wallet_keys())
            .and_then(|out| Ok(parse::wallet_keys(&out)?));

        Ok(session.settle(self, Topic::Wallet, outcome)?.unwrap_or_default())
    }

    /// Open wallets with their unlocked flag.
    pub fn list(&mut self) -> Result<Vec<(String, bool)>, Error> {
        let session = self.session;
        let outcome = session
            .invoke(&CleosOps::wallet_list())
            .map(|out| parse::wallet_list(&out));

        Ok(session.settle(self, Topic::Wallet, outcome)?.unwrap_or_default())
    }

    /// Register `local_name` for `account` and import its owner and active
    /// private keys.
    pub fn import_key(&mut self, local_name: &str, account: &Account<'_>) -> Result<bool, Error> {
        let session = self.session;
        let keys: Vec<&KeyPair> = account
            .owner_key()
            .into_iter()
            .chain(account.active_key())
            .collect();
        let outcome = self.import_account_keys(local_name, account.name(), &keys);

        Ok(session.settle(self, Topic::Wallet, outcome)?.is_some())
    }

    pub fn import_private_key(&mut self, private_key: &str) -> Result<bool, Error> {
        let session = self.session;
        let outcome = self.import_private(private_key);

        Ok(session.settle(self, Topic::Wallet, outcome)?.is_some())
    }

    /// Rebuild account handles for every chain account controlled by a key
    /// in this wallet. Local names come from the registry (the chain name
    /// when unregistered); a local name taken twice becomes `local_chain`.
    pub fn restore_accounts(&mut self) -> Result<Vec<Account<'s>>, Error> {
        let session = self.session;
        let diag = session.diagnostics();

        let outcome = self.chain_names();
        let Some(chain_names) = session.settle(self, Topic::Wallet, outcome)? else {
            return Ok(Vec::new());
        };

        let registered: BTreeMap<String, String> = session
            .registry()
            .entries(diag)
            .into_iter()
            .map(|(local, chain)| (chain, local))
            .collect();

        let mut taken = BTreeSet::new();
        let mut accounts = Vec::with_capacity(chain_names.len());
        for name in chain_names {
            let mut local = registered
                .get(name.as_str())
                .cloned()
                .unwrap_or_else(|| name.to_string());
            if !taken.insert(local.clone()) {
                local = format!("{local}_{name}");
                taken.insert(local.clone());
            }

            accounts.push(session.restored(name, &local)?);
        }

        crate::log!(diag, Topic::Wallet, Info, "{} account objects restored", accounts.len());

        Ok(accounts)
    }

    // ---- internals ----

    fn chain_names(&self) -> Result<BTreeSet<AccountName>, Error> {
        let session = self.session;
        let out = session.invoke(&CleosOps::wallet_keys())?;

        let mut names = BTreeSet::new();
        for key in parse::wallet_keys(&out)? {
            let out = session.invoke(&CleosOps::get_accounts(&key))?;
            for chain_name in parse::account_names(&out)? {
                match AccountName::parse(&chain_name) {
                    Ok(name) => {
                        names.insert(name);
                    }
                    Err(err) => {
                        crate::log!(
                            session.diagnostics(),
                            Topic::Wallet,
                            Debug,
                            "skipping '{chain_name}': {err}"
                        );
                    }
                }
            }
        }

        Ok(names)
    }

    /// Register the mapping, then import the distinct private keys. A
    /// registry file that cannot be written is logged; a conflict is
    /// returned. Nothing is recorded on the handle.
    pub(crate) fn import_account_keys(
        &self,
        local_name: &str,
        chain_name: &AccountName,
        keys: &[&KeyPair],
    ) -> Result<(), Error> {
        let diag = self.session.diagnostics();

        match self.session.registry().register(diag, local_name, chain_name.as_str()) {
            Ok(()) => {}
            Err(Error::FileState(err)) => {
                crate::log!(diag, Topic::Registry, Error, "{err}");
            }
            Err(err) => return Err(err),
        }

        let mut seen = BTreeSet::new();
        for private in keys.iter().filter_map(|k| k.private.as_deref()) {
            if seen.insert(private) {
                self.import_private(private)?;
            }
        }

        crate::log!(
            diag,
            Topic::Wallet,
            Trace,
            "keys of '{local_name}' ({chain_name}) in wallet '{}'",
            self.name
        );

        Ok(())
    }

    fn import_private(&self, private_key: &str) -> Result<(), Error> {
        match self.session.invoke(&CleosOps::wallet_import(&self.name, private_key)) {
            Ok(_) => Ok(()),
            Err(err) if raw_contains(&err, "already") => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn unlock_with(&self, password: &str) -> Result<(), Error> {
        match self.session.invoke(&CleosOps::wallet_unlock(&self.name, password)) {
            Ok(_) => Ok(()),
            Err(err) if raw_contains(&err, "already unlocked") => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn open_and_unlock(&self, password: &str) -> Result<(), Error> {
        self.session.invoke(&CleosOps::wallet_open(&self.name))?;
        self.unlock_with(password)
    }

    fn create_new(&self) -> Result<String, Error> {
        let session = self.session;
        let diag = session.diagnostics();

        let out = session.invoke(&CleosOps::wallet_create(&self.name))?;
        let password = parse::wallet_password(&out)?;

        if session.config().node.use_keosd {
            crate::log!(
                diag,
                Out,
                "
                Password is
                {password}
                Save it to unlock wallet '{}' in the future.
                ",
                self.name
            );
        } else if let Err(err) = session.credentials().put(diag, &self.name, &password) {
            crate::log!(diag, Topic::Wallet, Error, "{err}");
        }

        crate::log!(diag, Topic::Wallet, Info, "wallet '{}' created", self.name);

        Ok(password)
    }
}

fn raw_contains(err: &Error, phrase: &str) -> bool {
    err.classified().is_some_and(|c| c.raw().contains(phrase))
}

impl Reportable for Wallet<'_> {
    fn record_error(&mut self, err: &Error) {
        self.state.record(err);
    }

    fn clear_error(&mut self) {
        self.state.clear();
    }
}

impl fmt::Display for Wallet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Wallet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("name", &self.name)
            .field("error", &self.state.error)
            .finish_non_exhaustive()
    }
}

///
/// Session: wallet construction
///

impl Session {
    /// Open the wallet `name` (the configured default when absent), creating
    /// it when no password is known.
    pub fn create_wallet(
        &self,
        name: Option<&str>,
        password: Option<&str>,
    ) -> Result<Wallet<'_>, Error> {
        let name = name.unwrap_or(&self.config().wallet.default_name);
        let mut wallet = Wallet::detached(self, name);

        let known = password.map(str::to_string).or_else(|| {
            if self.config().node.use_keosd {
                None
            } else {
                self.credentials().get(self.diagnostics(), name)
            }
        });

        let outcome = match known {
            Some(password) => {
                crate::log!(self.diagnostics(), Topic::Wallet, Trace, "opening wallet '{name}'");
                wallet.open_and_unlock(&password).map(|()| password)
            }
            None => wallet.create_new(),
        };

        if let Some(password) = self.settle(&mut wallet, Topic::Wallet, outcome)? {
            wallet.password = Some(password);
        }

        Ok(wallet)
    }
}

///
/// TESTS
///
