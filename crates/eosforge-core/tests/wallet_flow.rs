use eosforge_core::{ErrorKind, Session, ToolOp};
use eosforge_testkit::{FakeNode, TestWorkspace};

#[test]
fn generated_password_is_cached_and_reused() {
    let ws = TestWorkspace::new();
    let node = FakeNode::new();

    let first = ws.session(node.clone());
    let wallet = first.create_wallet(None, None).expect("create");
    let password = wallet.password().expect("generated password").to_string();
    assert_eq!(
        first.credentials().get(first.diagnostics(), "default").as_deref(),
        Some(password.as_str())
    );

    // a fresh session over the same directory opens instead of creating
    let second = ws.session(node.clone());
    let reopened = second.create_wallet(Some("default"), None).expect("open");

    assert!(!reopened.error());
    assert_eq!(reopened.password(), Some(password.as_str()));
    assert_eq!(node.count(ToolOp::WalletCreate), 1);
    assert_eq!(node.count(ToolOp::WalletOpen), 1);
}

#[test]
fn lock_then_unlock_uses_the_cache() {
    let ws = TestWorkspace::new();
    let session = ws.session(FakeNode::new());

    let mut wallet = session.create_wallet(Some("work"), None).expect("create");
    assert!(wallet.lock().expect("lock"));
    assert_eq!(wallet.list().expect("list"), [("work".to_string(), false)]);

    assert!(wallet.unlock().expect("unlock"));
    assert_eq!(wallet.list().expect("list"), [("work".to_string(), true)]);
}

#[test]
fn wrong_password_is_flagged_or_raised() {
    let ws = TestWorkspace::new();
    let node = FakeNode::new();
    let session = ws.session(node.clone());
    let mut wallet = session.create_wallet(None, None).expect("create");
    wallet.lock().expect("lock");

    let other = Session::new(ws.config().clone(), Box::new(node));
    let flagged = other.create_wallet(None, Some("PW5wrong")).expect("normal mode");
    assert!(flagged.error());
    assert!(flagged.error_detail().is_some_and(|d| d.contains("Invalid wallet password")));

    other.set_testing_errors(true);
    let err = other.create_wallet(None, Some("PW5wrong")).expect_err("testing mode");
    assert!(err.is_kind(ErrorKind::BadPassword));
}

#[test]
fn creating_an_existing_wallet_without_password_is_already_exists() {
    let ws = TestWorkspace::new();
    let node = FakeNode::new();
    ws.session(node.clone()).create_wallet(None, None).expect("create");

    let mut cfg = ws.config().clone();
    cfg.wallet.password_map = "other_passwords.json".to_string();
    let session = Session::new(cfg, Box::new(node));
    session.set_testing_errors(true);

    let err = session.create_wallet(None, None).expect_err("password unknown");
    assert!(err.is_kind(ErrorKind::AlreadyExists));
}

#[test]
fn keys_are_imported_and_accounts_restored() {
    let ws = TestWorkspace::new();
    let node = FakeNode::new();
    let session = ws.session(node.clone());

    let mut wallet = session.create_wallet(None, None).expect("wallet");
    let master = session.create_master_account(&wallet, "master").expect("master");
    let alice = session
        .create_account(&wallet, "alice", &master, Default::default())
        .expect("alice");

    let keys = wallet.keys().expect("keys");
    assert!(keys.contains(&alice.owner_key().expect("owner").public));

    let restored = wallet.restore_accounts().expect("restore");
    let mut locals: Vec<_> = restored.iter().filter_map(|a| a.local_name()).collect();
    locals.sort_unstable();
    assert_eq!(locals, ["alice", "master"]);
}
