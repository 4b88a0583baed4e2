use crate::state::STACK_DEPTH;
use thiserror::Error;

/// Errors raised while loading a program image into memory. The VM is left
/// in its freshly initialized state when any of these occur.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("program is {size} bytes, max is {max} bytes")]
    TooLarge { size: usize, max: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The fetched word did not match any recognized instruction pattern.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("opcode {0:#06X} not recognized")]
    UnknownOpcode(u16),
}

/// Errors surfaced by a single `step()` call.
///
/// A decode failure leaves the program counter unchanged; the caller decides
/// whether to abort or skip the offending word. Stack faults indicate a
/// malformed program and are fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("call stack overflow: more than {depth} nested subroutine calls", depth = STACK_DEPTH)]
    StackOverflow,
    #[error("call stack underflow: no return address available")]
    StackUnderflow,
}
