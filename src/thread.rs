//! Thread descriptors: static stacks and task control blocks
//!
//! A thread owns two pieces of static memory, its control block and a stack
//! of `WORDS` [`StackWord`]s. Both are referenced from a [`ThreadAttr`]
//! built at compile time.

use core::cell::UnsafeCell;
use core::ffi::{c_void, CStr};
use core::mem::{size_of, MaybeUninit};

use crate::control_block::{ControlBlock, ThreadCb};
use crate::error::Error;
use crate::kernel::{Kernel, ThreadFunc};
use crate::kind::ObjectKind;
use crate::port::StackWord;
use crate::record::{impl_header_accessors, size_u32, submit, Claim, Header};

/// Thread priority (`osPriority_t`)
///
/// Higher number = higher priority. The kernel validates the range when the
/// thread is created; declaring any value is accepted.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub i32);

impl Priority {
    /// No priority given; the kernel substitutes [`Priority::NORMAL`]
    pub const NONE: Priority = Priority(0);
    /// Runs only when nothing else is ready
    pub const IDLE: Priority = Priority(1);
    /// Background work (logging, telemetry)
    pub const LOW: Priority = Priority(8);
    pub const BELOW_NORMAL: Priority = Priority(16);
    /// Default application priority
    pub const NORMAL: Priority = Priority(24);
    pub const ABOVE_NORMAL: Priority = Priority(32);
    /// Control loops
    pub const HIGH: Priority = Priority(40);
    /// Hard real-time work
    pub const REALTIME: Priority = Priority(48);
    /// Reserved for deferred interrupt handling
    pub const ISR: Priority = Priority(56);
    /// Illegal priority, returned by kernels on error
    pub const ERROR: Priority = Priority(-1);

    /// Sub-level within a band, e.g. `Priority::LOW.offset(3)` is `osPriorityLow3`
    pub const fn offset(self, step: i32) -> Priority {
        Priority(self.0 + step)
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::NORMAL
    }
}

/// Thread attribute record (`osThreadAttr_t`)
#[repr(C)]
#[derive(Debug)]
pub struct ThreadAttr {
    header: Header,
    stack_mem: *mut c_void,
    stack_size: u32,
    priority: Priority,
    tz_module: u32,
    reserved: u32,
}

impl_header_accessors!(ThreadAttr);

impl ThreadAttr {
    /// Stack base address
    pub const fn stack_mem(&self) -> *mut c_void {
        self.stack_mem
    }

    /// Stack size in bytes
    pub const fn stack_size(&self) -> usize {
        self.stack_size as usize
    }

    /// Declared priority
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// TrustZone module identifier (always 0: non-secure)
    pub const fn tz_module(&self) -> u32 {
        self.tz_module
    }
}

/// Static memory of one thread: control block and stack
pub struct ThreadStorage<const WORDS: usize, C: ControlBlock = ThreadCb> {
    cb: C,
    stack: UnsafeCell<MaybeUninit<[StackWord; WORDS]>>,
}

// The stack is only ever used by the thread the kernel runs on it.
unsafe impl<const WORDS: usize, C: ControlBlock> Sync for ThreadStorage<WORDS, C> {}

impl<const WORDS: usize, C: ControlBlock> ThreadStorage<WORDS, C> {
    pub const fn new() -> Self {
        Self {
            cb: C::UNINIT,
            stack: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

impl<const WORDS: usize, C: ControlBlock> Default for ThreadStorage<WORDS, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A statically declared thread, see [`os_thread_static!`](crate::os_thread_static)
pub struct StaticThread<const WORDS: usize, C: ControlBlock = ThreadCb> {
    storage: &'static ThreadStorage<WORDS, C>,
    attr: ThreadAttr,
    claim: Claim,
}

impl<const WORDS: usize, C: ControlBlock> StaticThread<WORDS, C> {
    /// Stack size in bytes
    pub const STACK_BYTES: usize = size_of::<[StackWord; WORDS]>();

    /// Bind a name and priority to thread storage.
    ///
    /// Evaluated in a static initializer; a zero-word stack stops the build.
    pub const fn new(
        name: &'static CStr,
        storage: &'static ThreadStorage<WORDS, C>,
        priority: Priority,
    ) -> Self {
        assert!(WORDS > 0, "thread stack needs at least one word");
        Self {
            storage,
            attr: ThreadAttr {
                header: Header::new(ObjectKind::Thread, name, 0, &storage.cb),
                stack_mem: storage.stack.get().cast(),
                stack_size: size_u32(Self::STACK_BYTES),
                priority,
                tz_module: 0,
                reserved: 0,
            },
            claim: Claim::new(),
        }
    }

    /// Attribute record to pass to the kernel
    pub const fn attributes(&'static self) -> &'static ThreadAttr {
        &self.attr
    }

    pub fn name(&self) -> &'static str {
        self.attr.name()
    }

    pub const fn priority(&self) -> Priority {
        self.attr.priority
    }

    /// Number of stack words reserved
    pub const fn stack_words(&self) -> usize {
        WORDS
    }

    /// Stack address range, for overlap and watermark checks
    pub fn stack_range(&self) -> core::ops::Range<usize> {
        let base = self.storage.stack.get() as usize;
        base..base + Self::STACK_BYTES
    }

    /// Has the kernel already been given this thread's storage?
    pub fn is_created(&self) -> bool {
        self.claim.is_claimed()
    }

    /// Create the thread on `kernel` from this descriptor's storage
    pub fn create<K: Kernel>(
        &'static self,
        kernel: &mut K,
        func: ThreadFunc,
        argument: *mut c_void,
    ) -> Result<K::Handle, Error> {
        submit(&self.claim, ObjectKind::Thread, self.name(), || {
            kernel.thread_new(func, argument, &self.attr)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::STACK_WORD_SIZE;
    use crate::record::object_name;

    static WORKER_STORAGE: ThreadStorage<256> = ThreadStorage::new();
    static WORKER: StaticThread<256> =
        StaticThread::new(object_name("worker\0"), &WORKER_STORAGE, Priority::HIGH);

    #[test]
    fn test_stack_bytes() {
        let attr = WORKER.attributes();
        assert_eq!(attr.stack_size(), 256 * STACK_WORD_SIZE);
        assert_eq!(attr.stack_mem(), WORKER_STORAGE.stack.get().cast::<c_void>());
        assert_eq!(WORKER.stack_words(), 256);
    }

    #[test]
    fn test_record_fields() {
        let attr = WORKER.attributes();
        assert_eq!(attr.name(), "worker");
        assert_eq!(attr.priority(), Priority::HIGH);
        assert_eq!(attr.attr_bits(), 0);
        assert_eq!(attr.tz_module(), 0);
        assert_eq!(attr.cb_size(), ThreadCb::SIZE);
        assert_eq!(attr.cb_mem(), &WORKER_STORAGE.cb as *const ThreadCb as *mut c_void);
    }

    #[test]
    fn test_stack_does_not_overlap_control_block() {
        let stack = WORKER.stack_range();
        let cb = WORKER.attributes().cb_mem() as usize;
        assert!(cb + ThreadCb::SIZE <= stack.start || stack.end <= cb);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::IDLE < Priority::LOW);
        assert!(Priority::LOW < Priority::NORMAL);
        assert!(Priority::NORMAL < Priority::HIGH);
        assert!(Priority::REALTIME < Priority::ISR);
        assert_eq!(Priority::LOW.offset(3), Priority(11));
        assert_eq!(Priority::default(), Priority::NORMAL);
    }

    #[test]
    fn test_layout() {
        use core::mem::offset_of;

        let ptr = size_of::<usize>();
        assert_eq!(offset_of!(ThreadAttr, stack_mem), 4 * ptr);
        assert_eq!(offset_of!(ThreadAttr, stack_size), 5 * ptr);
        assert_eq!(offset_of!(ThreadAttr, priority), 5 * ptr + 4);
        assert_eq!(offset_of!(ThreadAttr, tz_module), 5 * ptr + 8);
        assert_eq!(offset_of!(ThreadAttr, reserved), 5 * ptr + 12);
    }
}
