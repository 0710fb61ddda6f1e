use eosforge_core::{
    AccountName, Invocation, ProcessOutput, ToolOp, Toolchain, ToolchainError,
    config::schema::BootstrapConfig,
    ops::cleos::{FLAG_JSON, FLAG_NAME, FLAG_PASSWORD, FLAG_PERMISSION, FLAG_PRIVATE_KEY},
};
use serde_json::{Value, json};
use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

const CHAIN_ID: &str = "cf057bbfb72640471fd910bcb67639c22df9f92470936cddc1ade0e2f2e7dc4f";
const NODE_DOWN: &str = "Failed to connect to nodeos at http://127.0.0.1:8888/; is nodeos running?";

///
/// FakeNode
///
/// In-memory node, wallet daemon and contract compiler behind the
/// [`Toolchain`] seam. Authorization is enforced the way the chain does it:
/// a transaction's permission must be backed by a key in an unlocked wallet,
/// and an action that names a `user` requires that user's authority.
///
/// Clones share state, so a test can keep one handle after boxing another
/// into a session.
///

#[derive(Clone)]
pub struct FakeNode {
    chain: Rc<RefCell<Chain>>,
    calls: Rc<RefCell<Vec<Invocation>>>,
}

impl FakeNode {
    /// A running node whose master account uses the default bootstrap key.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bootstrap(&BootstrapConfig::default())
    }

    #[must_use]
    pub fn with_bootstrap(bootstrap: &BootstrapConfig) -> Self {
        Self {
            chain: Rc::new(RefCell::new(Chain::genesis(bootstrap))),
            calls: Rc::default(),
        }
    }

    /// Same node, not running.
    #[must_use]
    pub fn stopped(self) -> Self {
        self.chain.borrow_mut().running = false;
        self
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.chain.borrow().running
    }

    #[must_use]
    pub fn has_account(&self, name: &str) -> bool {
        self.chain.borrow().accounts.contains_key(name)
    }

    /// Public keys held by wallet `name`.
    #[must_use]
    pub fn wallet_keys(&self, name: &str) -> Vec<String> {
        self.chain
            .borrow()
            .wallets
            .get(name)
            .map(|w| w.keys.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn code_hash(&self, account: &str) -> Option<String> {
        self.chain
            .borrow()
            .accounts
            .get(account)
            .and_then(|a| a.code_hash.clone())
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    #[must_use]
    pub fn ops(&self) -> Vec<ToolOp> {
        self.calls.borrow().iter().map(|inv| inv.op).collect()
    }

    /// Number of recorded invocations of `op`.
    #[must_use]
    pub fn count(&self, op: ToolOp) -> usize {
        self.calls.borrow().iter().filter(|inv| inv.op == op).count()
    }
}

impl Default for FakeNode {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolchain for FakeNode {
    fn invoke(&self, inv: &Invocation) -> Result<ProcessOutput, ToolchainError> {
        self.calls.borrow_mut().push(inv.clone());
        let mut chain = self.chain.borrow_mut();

        let needs_node = matches!(
            inv.op,
            ToolOp::CreateAccount
                | ToolOp::SystemNewaccount
                | ToolOp::GetAccount
                | ToolOp::GetAccounts
                | ToolOp::GetCode
                | ToolOp::GetInfo
                | ToolOp::GetTable
                | ToolOp::PushAction
                | ToolOp::SetContract
        );
        if needs_node && !chain.running {
            return Ok(ProcessOutput::failure(NODE_DOWN));
        }

        let out = match inv.op {
            ToolOp::CreateKey => chain.create_key(),
            ToolOp::WalletCreate => chain.wallet_create(name_arg(inv)),
            ToolOp::WalletOpen => chain.wallet_open(name_arg(inv)),
            ToolOp::WalletLock => chain.wallet_lock(name_arg(inv)),
            ToolOp::WalletUnlock => {
                let password = inv.flag_value(FLAG_PASSWORD).unwrap_or_default();
                chain.wallet_unlock(name_arg(inv), password)
            }
            ToolOp::WalletImport => {
                let private = inv.flag_value(FLAG_PRIVATE_KEY).unwrap_or_default();
                chain.wallet_import(name_arg(inv), private)
            }
            ToolOp::WalletKeys => chain.wallet_keys(),
            ToolOp::WalletList => chain.wallet_list(),
            ToolOp::CreateAccount | ToolOp::SystemNewaccount => chain.create_account(inv),
            ToolOp::GetAccount => chain.get_account(arg(inv, 0)),
            ToolOp::GetAccounts => chain.get_accounts(arg(inv, 0)),
            ToolOp::GetCode => chain.get_code(arg(inv, 0)),
            ToolOp::GetInfo => chain.get_info(),
            ToolOp::GetTable => chain.get_table(arg(inv, 0)),
            ToolOp::PushAction => chain.push_action(inv),
            ToolOp::SetContract => chain.set_contract(inv),
            ToolOp::BuildAbi => build_abi(&inv.args),
            ToolOp::BuildWasm => build_wasm(&inv.args),
            ToolOp::NodeStart => chain.start(inv.has_flag("--delete-all-blocks")),
            ToolOp::NodeStop => chain.stop(),
        };

        Ok(out)
    }
}

fn arg(inv: &Invocation, n: usize) -> &str {
    inv.positional(n).unwrap_or_default()
}

fn name_arg(inv: &Invocation) -> &str {
    inv.flag_value(FLAG_NAME).unwrap_or("default")
}

// ---- chain state ----

#[derive(Clone, Debug)]
struct ChainAccount {
    owner: String,
    active: String,
    code_hash: Option<String>,
    actions: Option<BTreeSet<String>>,
}

impl ChainAccount {
    const fn new(owner: String, active: String) -> Self {
        Self {
            owner,
            active,
            code_hash: None,
            actions: None,
        }
    }
}

#[derive(Debug, Default)]
struct FakeWallet {
    password: String,
    unlocked: bool,
    keys: BTreeMap<String, String>,
}

#[derive(Debug)]
struct Chain {
    running: bool,
    head_block: u64,
    master: String,
    master_key: String,
    accounts: BTreeMap<String, ChainAccount>,
    wallets: BTreeMap<String, FakeWallet>,
    key_book: BTreeMap<String, String>,
    counter: u64,
}

impl Chain {
    fn genesis(bootstrap: &BootstrapConfig) -> Self {
        let mut chain = Self {
            running: true,
            head_block: 0,
            master: bootstrap.master.clone(),
            master_key: bootstrap.key_public.clone(),
            accounts: BTreeMap::new(),
            wallets: BTreeMap::new(),
            key_book: BTreeMap::new(),
            counter: 0,
        };
        chain
            .key_book
            .insert(bootstrap.key_private.clone(), bootstrap.key_public.clone());
        chain.reset_accounts();

        chain
    }

    fn reset_accounts(&mut self) {
        self.accounts.clear();
        self.accounts.insert(
            self.master.clone(),
            ChainAccount::new(self.master_key.clone(), self.master_key.clone()),
        );
        self.head_block = 0;
    }

    fn next(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    fn transaction_id(&mut self) -> String {
        let n = self.next();
        format!(
            "{:016x}{:016x}{:016x}{:016x}",
            n.wrapping_mul(0x9e37_79b9_7f4a_7c15),
            n.rotate_left(17),
            n.wrapping_mul(0xc2b2_ae3d_27d4_eb4f),
            n
        )
    }

    // ---- keys and wallets ----

    fn create_key(&mut self) -> ProcessOutput {
        let n = self.next();
        let public = format!("EOS{n:0>50}");
        let private = format!("5K{n:0>49}");
        self.key_book.insert(private.clone(), public.clone());

        ProcessOutput::success(format!("Private key: {private}\nPublic key: {public}\n"))
    }

    fn wallet_create(&mut self, name: &str) -> ProcessOutput {
        if self.wallets.contains_key(name) {
            return ProcessOutput::failure(format!(
                "Error 3120001: Wallet already exists\nWallet already exists: {name}"
            ));
        }

        let n = self.next();
        let password = format!("PW5KFake{n:0>45}");
        self.wallets.insert(
            name.to_string(),
            FakeWallet {
                password: password.clone(),
                unlocked: true,
                keys: BTreeMap::new(),
            },
        );

        ProcessOutput::success(format!(
            "Creating wallet: {name}\n\
             Save password to use in the future to unlock this wallet.\n\
             Without password imported keys will not be retrievable.\n\
             \"{password}\"\n"
        ))
    }

    fn wallet_open(&self, name: &str) -> ProcessOutput {
        if self.wallets.contains_key(name) {
            ProcessOutput::success(format!("Opened: {name}"))
        } else {
            nonexistent_wallet(name)
        }
    }

    fn wallet_lock(&mut self, name: &str) -> ProcessOutput {
        match self.wallets.get_mut(name) {
            Some(wallet) => {
                wallet.unlocked = false;
                ProcessOutput::success(format!("Locked: {name}"))
            }
            None => nonexistent_wallet(name),
        }
    }

    fn wallet_unlock(&mut self, name: &str, password: &str) -> ProcessOutput {
        let Some(wallet) = self.wallets.get_mut(name) else {
            return nonexistent_wallet(name);
        };

        if wallet.password != password {
            return ProcessOutput::failure(format!(
                "Error 3120005: Invalid wallet password\nError Details:\nInvalid wallet password for wallet: {name}"
            ));
        }
        if wallet.unlocked {
            return ProcessOutput::failure(format!(
                "Error 3120007: Already unlocked\nWallet is already unlocked: {name}"
            ));
        }
        wallet.unlocked = true;

        ProcessOutput::success(format!("Unlocked: {name}"))
    }

    fn wallet_import(&mut self, name: &str, private: &str) -> ProcessOutput {
        let public = self
            .key_book
            .get(private)
            .cloned()
            .unwrap_or_else(|| format!("EOS{private}"));

        let Some(wallet) = self.wallets.get_mut(name) else {
            return nonexistent_wallet(name);
        };
        if !wallet.unlocked {
            return ProcessOutput::failure(format!("Error 3120003: Locked wallet\nWallet is locked: {name}"));
        }
        if wallet.keys.contains_key(&public) {
            return ProcessOutput::failure(format!(
                "Error 3120008: Key already exists\nKey already exists: {public}"
            ));
        }
        wallet.keys.insert(public.clone(), private.to_string());

        ProcessOutput::success(format!("imported private key for: {public}"))
    }

    fn signer_keys(&self) -> BTreeSet<&str> {
        self.wallets
            .values()
            .filter(|w| w.unlocked)
            .flat_map(|w| w.keys.keys().map(String::as_str))
            .collect()
    }

    fn wallet_keys(&self) -> ProcessOutput {
        let keys: Vec<&str> = self.signer_keys().into_iter().collect();

        ProcessOutput::success(json!(keys).to_string())
    }

    fn wallet_list(&self) -> ProcessOutput {
        let entries: Vec<String> = self
            .wallets
            .iter()
            .map(|(name, w)| {
                if w.unlocked {
                    format!("  \"{name} *\"")
                } else {
                    format!("  \"{name}\"")
                }
            })
            .collect();

        ProcessOutput::success(format!("Wallets:\n[\n{}\n]\n", entries.join(",\n")))
    }

    // ---- transactions ----

    fn authorize(&self, permission: &str) -> Result<(), ProcessOutput> {
        let actor = permission.split('@').next().unwrap_or_default();
        let signers = self.signer_keys();

        let satisfied = self.accounts.get(actor).is_some_and(|account| {
            signers.contains(account.owner.as_str()) || signers.contains(account.active.as_str())
        });
        if satisfied {
            return Ok(());
        }

        Err(ProcessOutput::failure(format!(
            "Error 3090003: Provided keys, permissions, and delays do not satisfy declared authorizations\n\
             Error Details:\n\
             transaction declares authority '{{\"actor\":\"{actor}\",\"permission\":\"active\"}}', \
             but does not have signatures for it."
        )))
    }

    fn receipt(
        &mut self,
        json_out: bool,
        contract: &str,
        action: &str,
        data: &Value,
        console: &str,
    ) -> ProcessOutput {
        let id = self.transaction_id();

        if json_out {
            return ProcessOutput::success(
                json!({
                    "transaction_id": id,
                    "processed": {
                        "id": id,
                        "action_traces": [{
                            "act": {"account": contract, "name": action, "data": data},
                            "console": console,
                            "inline_traces": []
                        }]
                    }
                })
                .to_string(),
            );
        }

        let mut text = format!(
            "executed transaction: {id}  128 bytes  200 us\n#  {contract} <= {contract}::{action}  {data}\n"
        );
        for line in console.lines() {
            let _ = writeln!(text, ">> {line}");
        }

        ProcessOutput::success(text)
    }

    fn create_account(&mut self, inv: &Invocation) -> ProcessOutput {
        let (creator, name, owner, active) = (arg(inv, 0), arg(inv, 1), arg(inv, 2), arg(inv, 3));

        if let Err(out) = self.authorize(inv.flag_value(FLAG_PERMISSION).unwrap_or(creator)) {
            return out;
        }
        if AccountName::parse(name).is_err() {
            return ProcessOutput::failure(format!("Error 3010001: Invalid name\nInvalid name: {name}"));
        }
        if self.accounts.contains_key(name) {
            return ProcessOutput::failure(format!(
                "Error 3050001: Account name already exists\nError Details:\nCannot create account named {name}, as that name is already taken"
            ));
        }

        self.accounts
            .insert(name.to_string(), ChainAccount::new(owner.to_string(), active.to_string()));
        let data = json!({"creator": creator, "name": name});
        let master = self.master.clone();

        self.receipt(inv.has_flag(FLAG_JSON), &master, "newaccount", &data, "")
    }

    fn get_account(&self, name: &str) -> ProcessOutput {
        let Some(account) = self.accounts.get(name) else {
            return account_not_found(name);
        };

        let auth = |key: &str| {
            json!({"threshold": 1, "keys": [{"key": key, "weight": 1}], "accounts": [], "waits": []})
        };

        ProcessOutput::success(
            json!({
                "account_name": name,
                "head_block_num": self.head_block,
                "permissions": [
                    {"perm_name": "active", "parent": "owner", "required_auth": auth(&account.active)},
                    {"perm_name": "owner", "parent": "", "required_auth": auth(&account.owner)}
                ]
            })
            .to_string(),
        )
    }

    fn get_accounts(&self, key: &str) -> ProcessOutput {
        let names: Vec<&str> = self
            .accounts
            .iter()
            .filter(|(_, a)| a.owner == key || a.active == key)
            .map(|(name, _)| name.as_str())
            .collect();

        ProcessOutput::success(json!({ "account_names": names }).to_string())
    }

    fn get_code(&self, name: &str) -> ProcessOutput {
        let Some(account) = self.accounts.get(name) else {
            return account_not_found(name);
        };
        let hash = account.code_hash.clone().unwrap_or_else(|| "0".repeat(64));

        ProcessOutput::success(format!("code hash: {hash}\n"))
    }

    fn get_table(&self, code: &str) -> ProcessOutput {
        if !self.accounts.contains_key(code) {
            return account_not_found(code);
        }

        ProcessOutput::success(json!({"rows": [], "more": false, "next_key": ""}).to_string())
    }

    fn get_info(&mut self) -> ProcessOutput {
        self.head_block += 1;

        ProcessOutput::success(
            json!({
                "server_version": "fake",
                "chain_id": CHAIN_ID,
                "head_block_num": self.head_block,
                "last_irreversible_block_num": self.head_block.saturating_sub(1)
            })
            .to_string(),
        )
    }

    fn set_contract(&mut self, inv: &Invocation) -> ProcessOutput {
        let account = arg(inv, 0).to_string();
        let dir = PathBuf::from(arg(inv, 1));

        if let Err(out) = self.authorize(inv.flag_value(FLAG_PERMISSION).unwrap_or(&account)) {
            return out;
        }
        if !self.accounts.contains_key(&account) {
            return account_not_found(&account);
        }

        let Some(wasm) = artifact(&dir, inv.positional(2), "wasm") else {
            return ProcessOutput::failure(format!(
                "Error 3160009: No wasm file found\nno wasm file found in {}",
                dir.display()
            ));
        };
        let Ok(code) = fs::read(&wasm) else {
            return ProcessOutput::failure(format!("Error 3160009: cannot read {}", wasm.display()));
        };
        let actions = artifact(&dir, inv.positional(3), "abi")
            .and_then(|abi| fs::read_to_string(abi).ok())
            .and_then(|text| serde_json::from_str::<Value>(&text).ok())
            .map(|abi| abi_actions(&abi));

        let hash = code_hash(&code);
        if let Some(entry) = self.accounts.get_mut(&account) {
            entry.code_hash = Some(hash);
            entry.actions = actions;
        }

        let id = self.transaction_id();
        let master = self.master.clone();
        let setcode = json!({"account": account, "vmtype": 0, "vmversion": 0, "code": to_hex(&code)});
        let setabi = json!({"account": account, "abi": "0e656f73696f3a3a6162692f312e31"});

        if !inv.has_flag(FLAG_JSON) {
            return ProcessOutput::success(format!(
                "Reading WASM from {}...\nPublishing contract...\nexecuted transaction: {id}  2048 bytes  900 us\n",
                wasm.display()
            ));
        }

        ProcessOutput::success(
            json!({
                "transaction_id": id,
                "actions": [
                    {"account": master, "name": "setcode", "data": setcode},
                    {"account": master, "name": "setabi", "data": setabi}
                ],
                "processed": {
                    "id": id,
                    "action_traces": [
                        {"act": {"account": master, "name": "setcode", "data": setcode}, "console": ""},
                        {"act": {"account": master, "name": "setabi", "data": setabi}, "console": ""}
                    ]
                }
            })
            .to_string(),
        )
    }

    fn push_action(&mut self, inv: &Invocation) -> ProcessOutput {
        let (contract, action, data_text) = (arg(inv, 0), arg(inv, 1), arg(inv, 2));
        let permission = inv.flag_value(FLAG_PERMISSION).unwrap_or(contract);
        let actor = permission.split('@').next().unwrap_or_default();

        if let Err(out) = self.authorize(permission) {
            return out;
        }

        let Some(target) = self.accounts.get(contract) else {
            return account_not_found(contract);
        };
        if target.code_hash.is_none() {
            return ProcessOutput::failure(format!(
                "Error 3040008: Contract Query Exception\nError Details:\naccount {contract} has no contract code"
            ));
        }
        if let Some(actions) = &target.actions
            && !actions.contains(action)
        {
            return ProcessOutput::failure(format!(
                "Error 3015014: Invalid action\nError Details:\nUnknown action {action} in contract {contract}"
            ));
        }

        let data: Value = serde_json::from_str(data_text)
            .unwrap_or_else(|_| Value::String(data_text.to_string()));
        let user = data
            .get("user")
            .or_else(|| data.get(0))
            .and_then(Value::as_str)
            .map(str::to_string);

        if let Some(user) = &user
            && user != actor
        {
            return ProcessOutput::failure(format!(
                "Error 3090004: Missing required authority\nError Details:\nmissing authority of {user}"
            ));
        }

        let console = match (&user, action) {
            (Some(user), "hi") => format!("Hello, {user}"),
            _ => String::new(),
        };

        self.receipt(inv.has_flag(FLAG_JSON), contract, action, &data, &console)
    }

    // ---- node ----

    fn start(&mut self, clear: bool) -> ProcessOutput {
        if clear {
            self.reset_accounts();
        }
        self.running = true;

        ProcessOutput::success("nodeos started, pid 4242")
    }

    fn stop(&mut self) -> ProcessOutput {
        if !self.running {
            return ProcessOutput::failure("");
        }
        self.running = false;

        ProcessOutput::success("")
    }
}

fn nonexistent_wallet(name: &str) -> ProcessOutput {
    ProcessOutput::failure(format!(
        "Error 3120002: Nonexistent wallet\nUnable to open a wallet. Nonexistent wallet: {name}"
    ))
}

fn account_not_found(name: &str) -> ProcessOutput {
    ProcessOutput::failure(format!(
        "Error 3010001: Invalid name\nError Details:\nUnable to retrieve account info: {name}"
    ))
}

// ---- compiler ----

fn split_build_args<'a>(args: &'a [String], output_flag: &str) -> (Option<&'a str>, Vec<&'a str>) {
    let output = args.iter().find_map(|a| a.strip_prefix(output_flag));
    let sources = args
        .iter()
        .filter(|a| !a.starts_with('-'))
        .map(String::as_str)
        .collect();

    (output, sources)
}

fn read_sources(sources: &[&str]) -> Result<String, ProcessOutput> {
    let mut all = String::new();
    for source in sources {
        let text = fs::read_to_string(source)
            .map_err(|e| ProcessOutput::failure(format!("{source}: error: {e}")))?;

        if let Some((line_no, line)) = text
            .lines()
            .enumerate()
            .find(|(_, l)| l.trim_start().starts_with("#error"))
        {
            let message = line.trim_start().trim_start_matches("#error").trim();
            return Err(ProcessOutput::failure(format!(
                "{source}:{}:2: error: {message}",
                line_no + 1
            )));
        }
        all.push_str(&text);
    }

    Ok(all)
}

fn build_abi(args: &[String]) -> ProcessOutput {
    let (output, sources) = split_build_args(args, "-abigen_output=");
    let text = match read_sources(&sources) {
        Ok(text) => text,
        Err(out) => return out,
    };
    let Some(output) = output else {
        return ProcessOutput::failure("error: no -abigen_output given");
    };

    let actions: Vec<Value> = declared_actions(&text)
        .into_iter()
        .map(|name| json!({"name": name, "type": name, "ricardian_contract": ""}))
        .collect();
    let abi = json!({"version": "eosio::abi/1.1", "structs": [], "actions": actions, "tables": []});

    match fs::write(output, abi.to_string()) {
        Ok(()) => ProcessOutput::success(""),
        Err(e) => ProcessOutput::failure(format!("error: cannot write {output}: {e}")),
    }
}

fn build_wasm(args: &[String]) -> ProcessOutput {
    let (output, sources) = split_build_args(args, "-o=");
    let text = match read_sources(&sources) {
        Ok(text) => text,
        Err(out) => return out,
    };
    let Some(output) = output else {
        return ProcessOutput::failure("error: no output file given");
    };

    let mut module = b"\0asm\x01\0\0\0".to_vec();
    module.extend_from_slice(text.as_bytes());

    match fs::write(output, module) {
        Ok(()) => ProcessOutput::success(""),
        Err(e) => ProcessOutput::failure(format!("error: cannot write {output}: {e}")),
    }
}

/// Action names declared with `[[eosio::action]]` or the `ACTION` macro.
fn declared_actions(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let line = line.trim_start();
            let rest = if let Some(pos) = line.find("[[eosio::action]]") {
                let after = &line[pos + "[[eosio::action]]".len()..];
                after.trim_start().strip_prefix("void")?
            } else {
                line.strip_prefix("ACTION")?
            };
            let name: String = rest
                .trim_start()
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();

            (!name.is_empty()).then_some(name)
        })
        .collect()
}

fn abi_actions(abi: &Value) -> BTreeSet<String> {
    abi.get("actions")
        .and_then(Value::as_array)
        .map(|actions| {
            actions
                .iter()
                .filter_map(|a| a.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn artifact(dir: &Path, named: Option<&str>, ext: &str) -> Option<PathBuf> {
    if let Some(name) = named {
        let path = dir.join(name);
        return path.is_file().then_some(path);
    }

    fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .find(|path| path.extension().is_some_and(|e| e == ext))
}

// FNV-1a, spread over 32 bytes
fn code_hash(code: &[u8]) -> String {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in code {
        h ^= u64::from(*byte);
        h = h.wrapping_mul(0x0100_0000_01b3);
    }

    (0..4u32).fold(String::new(), |mut out, i| {
        let _ = write!(out, "{:016x}", h.rotate_left(i * 16) | 1);
        out
    })
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use eosforge_core::ops::cleos::CleosOps;

    #[test]
    fn actions_are_read_from_attributes_and_macros() {
        let src = "class [[eosio::contract]] hello : public contract {\n\
                   [[eosio::action]] void hi(name user);\n\
                   ACTION bye(name user);\n};";

        assert_eq!(declared_actions(src), ["hi", "bye"]);
    }

    #[test]
    fn stopped_node_refuses_chain_queries() {
        let node = FakeNode::new().stopped();

        let out = node.invoke(&CleosOps::get_info()).expect("invoke");
        assert!(!out.is_success());
        assert!(out.stderr.contains("Failed to connect to nodeos"));

        let out = node.invoke(&CleosOps::wallet_list()).expect("invoke");
        assert!(out.is_success());
    }

    #[test]
    fn unsigned_transactions_are_rejected() {
        let node = FakeNode::new();
        let inv = CleosOps::create_account("eosio", "aliceaaaaaaa", "EOS1", "EOS1", "eosio", true);

        let out = node.invoke(&inv).expect("invoke");
        assert!(out.stderr.starts_with("Error 3090003"));
        assert!(!node.has_account("aliceaaaaaaa"));
    }

    #[test]
    fn code_hash_is_stable_and_nonzero() {
        assert_eq!(code_hash(b"abc"), code_hash(b"abc"));
        assert_ne!(code_hash(b"abc"), code_hash(b"abd"));
        assert_eq!(code_hash(b"abc").len(), 64);
    }
}
