use eosforge_core::{
    AccountOptions, AccountOrigin, Contract, ContractState, ErrorKind, Permission,
};
use eosforge_testkit::{FakeNode, TestWorkspace, workspace::HELLO_WORLD};
use serde_json::json;

#[test]
fn host_deploys_hello_and_alice_says_hi() {
    let ws = TestWorkspace::new();
    let node = FakeNode::new();
    let session = ws.session(node.clone());

    let wallet = session.create_wallet(None, None).expect("wallet");
    let master = session.create_master_account(&wallet, "master").expect("master");
    assert_eq!(master.origin(), &AccountOrigin::Master);
    assert_eq!(master.name().as_str(), "eosio");

    let host = session
        .create_account(&wallet, "host", &master, AccountOptions::default())
        .expect("host");
    let alice = session
        .create_account(&wallet, "alice", &master, AccountOptions::default())
        .expect("alice");
    assert!(!host.error() && !alice.error());
    assert!(node.has_account(host.name().as_str()));

    let mut contract = Contract::new(&host, ws.contract("hello", HELLO_WORLD));
    assert!(contract.build().expect("build"));
    assert!(contract.deploy(None).expect("deploy"));
    assert_eq!(contract.state(), ContractState::Deployed);
    assert!(node.code_hash(host.name().as_str()).is_some());

    // alice's data under alice's permission
    let ok = contract
        .push_action("hi", json!({ "user": &alice }), Some(Permission::from(&alice)))
        .expect("push");
    assert!(!ok.error);
    assert!(ok.transaction_id.is_some());
    assert!(ok.debug_buffer.contains("alice"), "{}", ok.debug_buffer);
    assert!(!contract.error());

    // default permission is the host's own authority
    let denied = contract
        .push_action("hi", json!({ "user": &alice }), None)
        .expect("normal mode does not raise");
    assert!(denied.error);
    assert_eq!(denied.error_kind, Some(ErrorKind::AuthorityMismatch));
    assert!(contract.error());

    session.set_testing_errors(true);
    let err = contract
        .push_action("hi", json!({ "user": &alice }), None)
        .expect_err("testing mode raises");
    assert!(err.is_kind(ErrorKind::AuthorityMismatch));
}

#[test]
fn registry_names_survive_a_new_session() {
    let ws = TestWorkspace::new();
    let node = FakeNode::new();

    let chain_name = {
        let session = ws.session(node.clone());
        let wallet = session.create_wallet(None, None).expect("wallet");
        let master = session.create_master_account(&wallet, "master").expect("master");
        let carol = session
            .create_account(&wallet, "carol", &master, AccountOptions::default())
            .expect("carol");
        carol.name().to_string()
    };

    let session = ws.session(node);
    let carol = session.restore_account("carol", &chain_name).expect("restore");
    assert_eq!(carol.to_display_string(), format!("carol ({chain_name})"));
    assert_eq!(
        session.registry().lookup_by_local_name(session.diagnostics(), "carol"),
        Some(chain_name)
    );
}

#[test]
fn conflicting_local_name_is_refused_before_the_chain_is_touched() {
    let ws = TestWorkspace::new();
    let node = FakeNode::new();
    let session = ws.session(node.clone());
    let wallet = session.create_wallet(None, None).expect("wallet");
    let master = session.create_master_account(&wallet, "master").expect("master");
    let dave = session
        .create_account(&wallet, "dave", &master, AccountOptions::default())
        .expect("dave");

    let calls = node.calls().len();
    let err = session
        .create_account(
            &wallet,
            "erin",
            &master,
            AccountOptions::default().name(dave.name().as_str()),
        )
        .expect_err("chain name taken by dave");

    assert!(matches!(err, eosforge_core::Error::Conflict(_)));
    assert_eq!(node.calls().len(), calls);
}
