//! Mutex descriptors
//!
//! Declared mutexes always enable priority inheritance: a low-priority
//! owner is boosted while a higher-priority thread waits on it.

use core::ffi::CStr;

use crate::control_block::{ControlBlock, MutexCb};
use crate::error::Error;
use crate::kernel::Kernel;
use crate::kind::ObjectKind;
use crate::record::{impl_header_accessors, submit, Claim, Header};

/// Mutex may be locked again by its owner (`osMutexRecursive`)
pub const MUTEX_RECURSIVE: u32 = 0x0000_0001;
/// Priority inheritance (`osMutexPrioInherit`)
pub const MUTEX_PRIO_INHERIT: u32 = 0x0000_0002;
/// Released automatically when the owner terminates (`osMutexRobust`)
pub const MUTEX_ROBUST: u32 = 0x0000_0008;

/// Mutex attribute record (`osMutexAttr_t`)
#[repr(C)]
#[derive(Debug)]
pub struct MutexAttr {
    header: Header,
}

impl_header_accessors!(MutexAttr);

impl MutexAttr {
    pub const fn is_recursive(&self) -> bool {
        self.header.attr_bits() & MUTEX_RECURSIVE != 0
    }

    pub const fn has_prio_inherit(&self) -> bool {
        self.header.attr_bits() & MUTEX_PRIO_INHERIT != 0
    }

    pub const fn is_robust(&self) -> bool {
        self.header.attr_bits() & MUTEX_ROBUST != 0
    }
}

/// Static memory of one mutex
pub struct MutexStorage<C: ControlBlock = MutexCb> {
    cb: C,
}

impl<C: ControlBlock> MutexStorage<C> {
    pub const fn new() -> Self {
        Self { cb: C::UNINIT }
    }
}

impl<C: ControlBlock> Default for MutexStorage<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A statically declared mutex, see [`os_mutex_static!`](crate::os_mutex_static)
pub struct StaticMutex<C: ControlBlock = MutexCb> {
    attr: MutexAttr,
    claim: Claim,
    _storage: &'static MutexStorage<C>,
}

impl<C: ControlBlock> StaticMutex<C> {
    pub const fn new(name: &'static CStr, storage: &'static MutexStorage<C>) -> Self {
        Self {
            attr: MutexAttr {
                header: Header::new(ObjectKind::Mutex, name, MUTEX_PRIO_INHERIT, &storage.cb),
            },
            claim: Claim::new(),
            _storage: storage,
        }
    }

    /// Attribute record to pass to the kernel
    pub const fn attributes(&'static self) -> &'static MutexAttr {
        &self.attr
    }

    pub fn name(&self) -> &'static str {
        self.attr.name()
    }

    pub fn is_created(&self) -> bool {
        self.claim.is_claimed()
    }

    pub fn create<K: Kernel>(&'static self, kernel: &mut K) -> Result<K::Handle, Error> {
        submit(&self.claim, ObjectKind::Mutex, self.name(), || kernel.mutex_new(&self.attr))
    }
}
