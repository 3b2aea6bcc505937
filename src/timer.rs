//! Timer descriptors
//!
//! Software timers need only a static control block. Callback, reload
//! behavior and argument are supplied when the timer is created.

use core::ffi::{c_void, CStr};

use crate::control_block::{ControlBlock, TimerCb};
use crate::error::Error;
use crate::kernel::{Kernel, TimerFunc, TimerType};
use crate::kind::ObjectKind;
use crate::record::{impl_header_accessors, submit, Claim, Header};

/// Timer attribute record (`osTimerAttr_t`)
#[repr(C)]
#[derive(Debug)]
pub struct TimerAttr {
    header: Header,
}

impl_header_accessors!(TimerAttr);

/// Static memory of one timer
pub struct TimerStorage<C: ControlBlock = TimerCb> {
    cb: C,
}

impl<C: ControlBlock> TimerStorage<C> {
    pub const fn new() -> Self {
        Self { cb: C::UNINIT }
    }
}

impl<C: ControlBlock> Default for TimerStorage<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A statically declared timer, see [`os_timer_static!`](crate::os_timer_static)
pub struct StaticTimer<C: ControlBlock = TimerCb> {
    attr: TimerAttr,
    claim: Claim,
    _storage: &'static TimerStorage<C>,
}

impl<C: ControlBlock> StaticTimer<C> {
    pub const fn new(name: &'static CStr, storage: &'static TimerStorage<C>) -> Self {
        Self {
            attr: TimerAttr {
                header: Header::new(ObjectKind::Timer, name, 0, &storage.cb),
            },
            claim: Claim::new(),
            _storage: storage,
        }
    }

    /// Attribute record to pass to the kernel
    pub const fn attributes(&'static self) -> &'static TimerAttr {
        &self.attr
    }

    pub fn name(&self) -> &'static str {
        self.attr.name()
    }

    pub fn is_created(&self) -> bool {
        self.claim.is_claimed()
    }

    /// Create the timer; `func` is called with `argument` on every expiry
    pub fn create<K: Kernel>(
        &'static self,
        kernel: &mut K,
        func: TimerFunc,
        timer_type: TimerType,
        argument: *mut c_void,
    ) -> Result<K::Handle, Error> {
        submit(&self.claim, ObjectKind::Timer, self.name(), || {
            kernel.timer_new(func, timer_type, argument, &self.attr)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::object_name;

    static HEARTBEAT_STORAGE: TimerStorage = TimerStorage::new();
    static HEARTBEAT: StaticTimer = StaticTimer::new(object_name("heartbeat\0"), &HEARTBEAT_STORAGE);

    #[test]
    fn test_record_fields() {
        let attr = HEARTBEAT.attributes();
        assert_eq!(attr.name(), "heartbeat");
        assert_eq!(attr.name_cstr().to_bytes_with_nul(), b"heartbeat\0");
        assert_eq!(attr.attr_bits(), 0);
        assert_eq!(attr.cb_size(), TimerCb::SIZE);
        assert_eq!(attr.cb_mem(), &HEARTBEAT_STORAGE.cb as *const TimerCb as *mut c_void);
    }
}
