//! User-facing flows: a [`Session`](session::Session) owns configuration,
//! diagnostics, the toolchain and the wallet-directory files; wallets,
//! accounts, contracts and node control borrow it.

pub mod account;
pub mod contract;
pub mod node;
pub mod session;
pub mod template;
pub mod wallet;

use crate::Error;

///
/// Reportable
///
/// A handle that records the outcome of its last toolchain-backed operation.
///

pub trait Reportable {
    fn record_error(&mut self, err: &Error);

    fn clear_error(&mut self);
}

///
/// ErrorState
///
/// The `error` flag and detail shared by every handle.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorState {
    pub error: bool,
    pub detail: Option<String>,
}

impl ErrorState {
    pub fn record(&mut self, err: &Error) {
        self.error = true;
        self.detail = Some(err.to_string());
    }

    pub fn clear(&mut self) {
        self.error = false;
        self.detail = None;
    }
}
