//! Toolchain invocations and their responses.
//!
//! Builders here turn typed requests into [`Invocation`](crate::Invocation)s;
//! parsers turn successful outputs back into typed values. Failure
//! classification is not done here; see `domain::policy::classify`.

pub mod build;
pub mod cleos;
