use eosforge_core::{Invocation, ProcessOutput, ToolOp, Toolchain, ToolchainError};
use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    rc::Rc,
};

///
/// ScriptedToolchain
///
/// Replays outputs queued per operation and records every invocation. An
/// operation with nothing queued succeeds with empty output unless the
/// script was built with [`Self::strict`].
///

#[derive(Clone, Default)]
pub struct ScriptedToolchain {
    script: Rc<RefCell<HashMap<ToolOp, VecDeque<ProcessOutput>>>>,
    calls: Rc<RefCell<Vec<Invocation>>>,
    strict: bool,
}

impl ScriptedToolchain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unscripted operations fail as unsupported.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    #[must_use]
    pub fn respond(self, op: ToolOp, out: ProcessOutput) -> Self {
        self.script.borrow_mut().entry(op).or_default().push_back(out);
        self
    }

    #[must_use]
    pub fn succeed(self, op: ToolOp, stdout: &str) -> Self {
        self.respond(op, ProcessOutput::success(stdout))
    }

    #[must_use]
    pub fn fail(self, op: ToolOp, stderr: &str) -> Self {
        self.respond(op, ProcessOutput::failure(stderr))
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    #[must_use]
    pub fn ops(&self) -> Vec<ToolOp> {
        self.calls.borrow().iter().map(|inv| inv.op).collect()
    }
}

impl Toolchain for ScriptedToolchain {
    fn invoke(&self, invocation: &Invocation) -> Result<ProcessOutput, ToolchainError> {
        self.calls.borrow_mut().push(invocation.clone());

        let queued = self
            .script
            .borrow_mut()
            .get_mut(&invocation.op)
            .and_then(VecDeque::pop_front);

        match queued {
            Some(out) => Ok(out),
            None if self.strict => Err(ToolchainError::Unsupported(invocation.op)),
            None => Ok(ProcessOutput::success("")),
        }
    }
}
