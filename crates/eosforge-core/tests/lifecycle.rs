use eosforge_core::{
    Contract, ContractState, Error, LifecycleError, ProcessOutput, Session, ToolOp,
};
use eosforge_testkit::{ScriptedToolchain, TestWorkspace, workspace::HELLO_WORLD};

const HOST_DOC: &str = r#"{"account_name":"hostaaaaaaaa","permissions":[{"perm_name":"owner","required_auth":{"keys":[{"key":"EOS1"}]}}]}"#;

fn session(ws: &TestWorkspace, script: &ScriptedToolchain) -> Session {
    Session::new(ws.config().clone(), Box::new(script.clone()))
}

#[test]
fn deploy_before_build_is_a_state_error() {
    let ws = TestWorkspace::new();
    let script = ScriptedToolchain::new()
        .strict()
        .respond(ToolOp::GetAccount, ProcessOutput::success(HOST_DOC));
    let session = session(&ws, &script);
    let host = session.restore_account("host", "hostaaaaaaaa").expect("restore");

    let mut contract = Contract::new(&host, ws.contract("hello", HELLO_WORLD));
    let err = contract.deploy(None).expect_err("not built");

    assert!(matches!(err, Error::Lifecycle(LifecycleError::NotBuilt(ContractState::Uninitialized))));
    assert_eq!(script.ops(), [ToolOp::GetAccount]);
}

#[test]
fn immutable_build_fails_without_invoking_the_toolchain() {
    let ws = TestWorkspace::new();
    let script = ScriptedToolchain::new()
        .strict()
        .respond(ToolOp::GetAccount, ProcessOutput::success(HOST_DOC));
    let session = session(&ws, &script);
    let host = session.restore_account("host", "hostaaaaaaaa").expect("restore");

    let mut contract = Contract::prebuilt(&host, ws.contract("eosio_token", "// token\n"));
    let err = contract.build().expect_err("immutable");

    assert!(matches!(err, Error::Immutable(_)));
    assert_eq!(script.ops(), [ToolOp::GetAccount]);
    assert_eq!(contract.state(), ContractState::Built);
}

#[test]
fn errors_in_testing_mode_are_raised_after_flagging() {
    let ws = TestWorkspace::new();
    let script = ScriptedToolchain::new()
        .respond(ToolOp::GetAccount, ProcessOutput::success(HOST_DOC))
        .fail(ToolOp::BuildAbi, "hello.cpp:9:5: error: use of undeclared identifier 'prnt'");
    let session = session(&ws, &script);
    let host = session.restore_account("host", "hostaaaaaaaa").expect("restore");
    session.set_testing_errors(true);

    let mut contract = Contract::new(&host, ws.contract("hello", HELLO_WORLD));
    let err = contract.build().expect_err("abi fails");

    assert!(matches!(err, Error::Build(_)));
    assert!(contract.error());
    assert_eq!(contract.state(), ContractState::Uninitialized);
}

#[test]
fn precondition_errors_are_raised_in_normal_mode_too() {
    let ws = TestWorkspace::new();
    let script = ScriptedToolchain::new().respond(ToolOp::GetAccount, ProcessOutput::success(HOST_DOC));
    let session = session(&ws, &script);
    let host = session.restore_account("host", "hostaaaaaaaa").expect("restore");

    let mut contract = Contract::new(&host, ws.contract("hello", HELLO_WORLD));
    assert!(!session.diagnostics().testing_errors());
    assert!(contract.push_action("hi", "[]", None).is_err());
}
