//! Attribute record plumbing shared by every object kind
//!
//! Records follow the CMSIS-RTOS v2 `os*Attr_t` layouts. Each starts with the
//! same four fields, kept here as [`Header`] and embedded as the first field
//! so offsets match the flat C structs on both 32- and 64-bit targets.

use core::ffi::{c_char, c_void, CStr};
use core::sync::atomic::{AtomicBool, Ordering};

use crate::control_block::{cb_ptr, ControlBlock};
use crate::error::{Error, KernelError};
use crate::kind::ObjectKind;

/// Fields common to every attribute record
#[repr(C)]
#[derive(Debug)]
pub struct Header {
    name: *const c_char,
    attr_bits: u32,
    cb_mem: *mut c_void,
    cb_size: u32,
}

impl Header {
    pub(crate) const fn new<C: ControlBlock>(
        kind: ObjectKind,
        name: &'static CStr,
        attr_bits: u32,
        cb: &'static C,
    ) -> Self {
        assert!(
            C::KIND as u8 == kind as u8,
            "control block belongs to a different object kind"
        );
        Self {
            name: name.as_ptr(),
            attr_bits,
            cb_mem: cb_ptr(cb),
            cb_size: size_u32(C::SIZE),
        }
    }

    /// Object name as a C string
    pub fn name_cstr(&self) -> &'static CStr {
        // Headers are only built from `&'static CStr` names.
        unsafe { CStr::from_ptr(self.name) }
    }

    /// Object name
    pub fn name(&self) -> &'static str {
        self.name_cstr().to_str().unwrap_or_default()
    }

    /// Behavior flags (0 = kernel default)
    pub const fn attr_bits(&self) -> u32 {
        self.attr_bits
    }

    /// Control block address
    pub const fn cb_mem(&self) -> *mut c_void {
        self.cb_mem
    }

    /// Control block size in bytes
    pub const fn cb_size(&self) -> usize {
        self.cb_size as usize
    }
}

/// Implements the [`Header`] accessors on a record embedding it as `header`
macro_rules! impl_header_accessors {
    ($($record:ty),+ $(,)?) => {
        $(
            impl $record {
                /// Fields shared by every record
                pub const fn header(&self) -> &$crate::record::Header {
                    &self.header
                }

                /// Object name
                pub fn name(&self) -> &'static str {
                    self.header.name()
                }

                /// Object name as a C string
                pub fn name_cstr(&self) -> &'static ::core::ffi::CStr {
                    self.header.name_cstr()
                }

                /// Behavior flags
                pub const fn attr_bits(&self) -> u32 {
                    self.header.attr_bits()
                }

                /// Control block address
                pub const fn cb_mem(&self) -> *mut ::core::ffi::c_void {
                    self.header.cb_mem()
                }

                /// Control block size in bytes
                pub const fn cb_size(&self) -> usize {
                    self.header.cb_size()
                }
            }

            // Records are immutable and only point at static storage.
            unsafe impl Sync for $record {}
        )+
    };
}
pub(crate) use impl_header_accessors;

/// Turn a NUL-terminated string literal into an object name
#[doc(hidden)]
pub const fn object_name(with_nul: &'static str) -> &'static CStr {
    match CStr::from_bytes_with_nul(with_nul.as_bytes()) {
        Ok(name) => name,
        Err(_) => panic!("object name must be a single NUL-terminated string"),
    }
}

/// Narrow a byte length to a record's 32-bit size field
pub(crate) const fn size_u32(bytes: usize) -> u32 {
    assert!(bytes <= u32::MAX as usize, "size does not fit the record's 32-bit size field");
    bytes as u32
}

/// One-shot latch set when a descriptor is handed to the kernel
#[derive(Debug)]
pub struct Claim(AtomicBool);

impl Claim {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Take the claim; false if it was already taken
    pub fn try_claim(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_claimed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for Claim {
    fn default() -> Self {
        Self::new()
    }
}

/// Submit a descriptor to the kernel exactly once.
///
/// The claim is released again when the kernel rejects the record, since
/// the kernel never took ownership of the storage.
pub(crate) fn submit<H>(
    claim: &Claim,
    kind: ObjectKind,
    name: &'static str,
    create: impl FnOnce() -> Result<H, KernelError>,
) -> Result<H, Error> {
    if !claim.try_claim() {
        log::warn!("{} `{}` submitted twice", kind, name);
        return Err(Error::AlreadyCreated { kind, name });
    }

    log::debug!("creating {} `{}` from static storage", kind, name);
    create().map_err(|e| {
        claim.release();
        log::warn!("kernel rejected {} `{}`: {}", kind, name, e);
        Error::Kernel(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_block::{MutexCb, TimerCb};

    #[test]
    fn test_object_name() {
        let name = object_name("motor_ctrl\0");
        assert_eq!(name.to_bytes(), b"motor_ctrl");
    }

    #[test]
    fn test_header_points_at_control_block() {
        static CB: TimerCb = TimerCb::UNINIT;
        let header = Header::new(ObjectKind::Timer, object_name("tick\0"), 0, &CB);
        assert_eq!(header.name(), "tick");
        assert_eq!(header.cb_mem(), &CB as *const TimerCb as *mut c_void);
        assert_eq!(header.cb_size(), core::mem::size_of::<TimerCb>());
        assert_eq!(header.attr_bits(), 0);
    }

    #[test]
    #[should_panic(expected = "different object kind")]
    fn test_header_rejects_foreign_control_block() {
        static CB: MutexCb = MutexCb::UNINIT;
        let _ = Header::new(ObjectKind::Timer, object_name("t\0"), 0, &CB);
    }

    #[test]
    fn test_claim_once() {
        let claim = Claim::new();
        assert!(!claim.is_claimed());
        assert!(claim.try_claim());
        assert!(!claim.try_claim());
        claim.release();
        assert!(claim.try_claim());
    }

    #[test]
    fn test_submit_twice() {
        let claim = Claim::new();
        let first = submit(&claim, ObjectKind::Mutex, "lock", || Ok(7u32));
        assert_eq!(first, Ok(7));
        let second = submit(&claim, ObjectKind::Mutex, "lock", || Ok(8u32));
        assert_eq!(
            second,
            Err(Error::AlreadyCreated { kind: ObjectKind::Mutex, name: "lock" })
        );
    }

    #[test]
    fn test_submit_rejected_releases_claim() {
        let claim = Claim::new();
        let result: Result<u32, _> =
            submit(&claim, ObjectKind::Semaphore, "sem", || Err(KernelError::NoFreeSlot));
        assert_eq!(result, Err(Error::Kernel(KernelError::NoFreeSlot)));
        assert!(!claim.is_claimed());
    }

    #[test]
    fn test_header_layout() {
        use core::mem::{offset_of, size_of};

        let ptr = size_of::<usize>();
        assert_eq!(offset_of!(Header, name), 0);
        assert_eq!(offset_of!(Header, attr_bits), ptr);
        assert_eq!(offset_of!(Header, cb_mem), 2 * ptr);
        assert_eq!(offset_of!(Header, cb_size), 3 * ptr);
        assert_eq!(size_of::<Header>(), 4 * ptr);
    }
}
