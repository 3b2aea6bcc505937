//! Semaphore descriptors
//!
//! Only the control block is static. Maximum and initial counts are not part
//! of the record; they are passed to the creation call:
//!
//! ```
//! use rtos_static_alloc::{os_semaphore_static, HostKernel};
//!
//! os_semaphore_static!(rx_ready);
//!
//! let mut kernel = HostKernel::new();
//! // at most 5 tokens, starting with 2
//! let sem = rx_ready.create(&mut kernel, 5, 2).unwrap();
//! # assert_eq!(kernel.name(sem), Some("rx_ready"));
//! ```

use core::ffi::CStr;

use crate::control_block::{ControlBlock, SemaphoreCb};
use crate::error::Error;
use crate::kernel::Kernel;
use crate::kind::ObjectKind;
use crate::record::{impl_header_accessors, submit, Claim, Header};

/// Semaphore attribute record (`osSemaphoreAttr_t`)
#[repr(C)]
#[derive(Debug)]
pub struct SemaphoreAttr {
    header: Header,
}

impl_header_accessors!(SemaphoreAttr);

/// Static memory of one semaphore
pub struct SemaphoreStorage<C: ControlBlock = SemaphoreCb> {
    cb: C,
}

impl<C: ControlBlock> SemaphoreStorage<C> {
    pub const fn new() -> Self {
        Self { cb: C::UNINIT }
    }
}

impl<C: ControlBlock> Default for SemaphoreStorage<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A statically declared semaphore, see [`os_semaphore_static!`](crate::os_semaphore_static)
pub struct StaticSemaphore<C: ControlBlock = SemaphoreCb> {
    attr: SemaphoreAttr,
    claim: Claim,
    _storage: &'static SemaphoreStorage<C>,
}

impl<C: ControlBlock> StaticSemaphore<C> {
    pub const fn new(name: &'static CStr, storage: &'static SemaphoreStorage<C>) -> Self {
        Self {
            attr: SemaphoreAttr {
                header: Header::new(ObjectKind::Semaphore, name, 0, &storage.cb),
            },
            claim: Claim::new(),
            _storage: storage,
        }
    }

    /// Attribute record to pass to the kernel
    pub const fn attributes(&'static self) -> &'static SemaphoreAttr {
        &self.attr
    }

    pub fn name(&self) -> &'static str {
        self.attr.name()
    }

    pub fn is_created(&self) -> bool {
        self.claim.is_claimed()
    }

    /// Create the semaphore with `max_count` tokens, `initial_count` available
    pub fn create<K: Kernel>(
        &'static self,
        kernel: &mut K,
        max_count: u32,
        initial_count: u32,
    ) -> Result<K::Handle, Error> {
        submit(&self.claim, ObjectKind::Semaphore, self.name(), || {
            kernel.semaphore_new(max_count, initial_count, &self.attr)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::object_name;

    static TX_DONE_STORAGE: SemaphoreStorage = SemaphoreStorage::new();
    static TX_DONE: StaticSemaphore =
        StaticSemaphore::new(object_name("tx_done\0"), &TX_DONE_STORAGE);

    #[test]
    fn test_record_fields() {
        let attr = TX_DONE.attributes();
        assert_eq!(attr.name(), "tx_done");
        assert_eq!(attr.attr_bits(), 0);
        assert_eq!(attr.cb_size(), SemaphoreCb::SIZE);
        assert!(!TX_DONE.is_created());
    }
}
