//! Errors surfaced when a declared descriptor is submitted to a kernel
//!
//! Declaration itself cannot fail at run time: bad sizes and mismatched
//! control blocks stop the build. What remains is the kernel's own
//! validation of the record and double submission of one descriptor.

use thiserror::Error;

use crate::kind::ObjectKind;

/// Why a kernel refused to create an object from an attribute record
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// A call argument or record field is out of range
    #[error("invalid parameter: {0}")]
    Parameter(&'static str),
    #[error("control block too small: {actual} bytes, kernel needs {required}")]
    ControlBlockTooSmall { required: usize, actual: usize },
    #[error("backing buffer too small: {actual} bytes, kernel needs {required}")]
    BufferTooSmall { required: usize, actual: usize },
    /// The control block already backs a live object
    #[error("control block already in use by a live object")]
    ControlBlockInUse,
    /// The kernel's object table is full
    #[error("no free object slot")]
    NoFreeSlot,
    #[error("unknown object handle")]
    InvalidHandle,
}

/// Failure to create an object from a declared descriptor
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The descriptor's storage already belongs to a created object
    #[error("{kind} `{name}` was already handed to the kernel")]
    AlreadyCreated { kind: ObjectKind, name: &'static str },
    #[error(transparent)]
    Kernel(#[from] KernelError),
}
