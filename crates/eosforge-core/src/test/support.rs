use crate::infra::{
    process::ProcessOutput,
    toolchain::{Invocation, ToolOp, Toolchain, ToolchainError},
};
use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    rc::Rc,
};

///
/// CannedToolchain
///
/// Replays queued outputs per operation and records every invocation. An
/// operation with nothing queued succeeds with empty output. Clones share
/// state, so a test can keep one clone after boxing another into a session.
///

#[derive(Clone, Default)]
pub struct CannedToolchain {
    responses: Rc<RefCell<HashMap<ToolOp, VecDeque<ProcessOutput>>>>,
    calls: Rc<RefCell<Vec<Invocation>>>,
}

impl CannedToolchain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn respond(self, op: ToolOp, out: ProcessOutput) -> Self {
        self.responses.borrow_mut().entry(op).or_default().push_back(out);
        self
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

impl Toolchain for CannedToolchain {
    fn invoke(&self, invocation: &Invocation) -> Result<ProcessOutput, ToolchainError> {
        self.calls.borrow_mut().push(invocation.clone());

        Ok(self
            .responses
            .borrow_mut()
            .get_mut(&invocation.op)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| ProcessOutput::success("")))
    }
}
