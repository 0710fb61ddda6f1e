use crate::{
    Error, ThisError,
    infra::toolchain::{Invocation, SIGNATURE_PROVIDER, ToolOp},
    log::Topic,
    ops::cleos::{CleosOps, parse},
    workflow::session::Session,
};
use serde_json::Value;
use std::{thread, time::Duration};

// `pkill` exits 1 with no output when nothing matched
const NOTHING_TO_STOP: &str = "process exited with status 1";

///
/// NodeError
///

#[derive(Debug, ThisError)]
pub enum NodeError {
    #[error("node at {url} produced no new blocks after {attempts} attempts")]
    NotResponding { url: String, attempts: u32 },
}

///
/// Node
///
/// Control of the local node. Failures are returned directly; there is no
/// handle to flag.
///

#[derive(Clone, Copy, Debug)]
pub struct Node<'s> {
    session: &'s Session,
}

impl<'s> Node<'s> {
    #[must_use]
    pub const fn new(session: &'s Session) -> Self {
        Self { session }
    }

    /// `get info` document.
    pub fn info(&self) -> Result<Value, Error> {
        let out = self.session.invoke(&CleosOps::get_info())?;

        Ok(parse::json(ToolOp::GetInfo, &out)?)
    }

    pub fn head_block(&self) -> Result<u64, Error> {
        let out = self.session.invoke(&CleosOps::get_info())?;

        Ok(parse::head_block(&out)?)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.head_block().is_ok()
    }

    /// Wait until the head block has advanced by `node.probe_blocks`.
    /// Returns the head block reached.
    pub fn probe(&self) -> Result<u64, Error> {
        let cfg = &self.session.config().node;
        let diag = self.session.diagnostics();
        let interval = Duration::from_millis(cfg.probe_interval_ms);

        let mut first = None;
        for attempt in 1..=cfg.probe_attempts {
            match self.head_block() {
                Ok(head) => {
                    let start = *first.get_or_insert(head);
                    crate::log!(diag, Topic::Node, Trace, "probe {attempt}: head block {head}");
                    if head >= start + cfg.probe_blocks {
                        crate::log!(diag, Topic::Node, Info, "node is running, head block {head}");
                        return Ok(head);
                    }
                }
                Err(err) => {
                    crate::log!(diag, Topic::Node, Trace, "probe {attempt}: {err}");
                }
            }
            thread::sleep(interval);
        }

        Err(NodeError::NotResponding {
            url: cfg.url.clone(),
            attempts: cfg.probe_attempts,
        }
        .into())
    }

    /// Launch the node in the background. `clear` starts a fresh chain.
    pub fn start(&self, clear: bool) -> Result<(), Error> {
        let config = self.session.config();
        let boot = &config.bootstrap;

        let mut inv = Invocation::new(ToolOp::NodeStart)
            .args(config.toolchain.node_args.iter().cloned())
            .args([
                SIGNATURE_PROVIDER.to_string(),
                format!("{}=KEY:{}", boot.key_public, boot.key_private),
            ]);
        if clear {
            inv = inv.arg("--delete-all-blocks");
            if let Some(genesis) = &config.toolchain.genesis_json {
                inv = inv.args(["--genesis-json", genesis.as_str()]);
            }
        }

        let out = self.session.invoke(&inv)?;
        crate::log!(self.session.diagnostics(), Topic::Node, Info, "{}", out.stdout.trim());

        Ok(())
    }

    /// Stop the node. Stopping a node that is not running succeeds.
    pub fn stop(&self) -> Result<(), Error> {
        match self.session.invoke(&Invocation::new(ToolOp::NodeStop)) {
            Ok(_) => {
                crate::log!(self.session.diagnostics(), Topic::Node, Info, "node stopped");
                Ok(())
            }
            Err(err) if err.classified().is_some_and(|c| c.raw() == NOTHING_TO_STOP) => {
                crate::log!(self.session.diagnostics(), Topic::Node, Trace, "node was not running");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Restart on a fresh chain, wait for blocks, and drop every registry
    /// entry except the reserved chain names.
    pub fn reset(&self) -> Result<u64, Error> {
        let diag = self.session.diagnostics();

        self.stop()?;
        self.start(true)?;
        let head = self.probe()?;

        if let Err(err) = self.session.registry().clear_reserved(diag) {
            crate::log!(diag, Topic::Registry, Error, "{err}");
        }

        Ok(head)
    }
}

///
/// TESTS
///
