//! Opaque control blocks
//!
//! A control block is the kernel's private bookkeeping for one object. This
//! crate never reads or writes it; it only reserves correctly sized, word
//! aligned static memory and hands the kernel a pointer to it.

use core::cell::UnsafeCell;
use core::ffi::c_void;
use core::mem::MaybeUninit;

use crate::kind::ObjectKind;
use crate::port;

/// Storage the kernel uses as the control block of one object kind.
///
/// # Safety
///
/// Every byte of `Self` must live behind an [`UnsafeCell`] (typically by
/// wrapping [`Opaque`]), because the kernel writes through a pointer derived
/// from a shared `&'static` reference. `KIND` must name the object kind the
/// layout was sized for.
pub unsafe trait ControlBlock: Sized + Sync + 'static {
    /// Object kind this control block belongs to
    const KIND: ObjectKind;
    /// Uninitialized value used in static initializers
    const UNINIT: Self;

    /// Size handed to the kernel in the attribute record
    const SIZE: usize = core::mem::size_of::<Self>();
}

/// Word-aligned, uninitialized storage of `WORDS` machine words
#[repr(transparent)]
pub struct Opaque<const WORDS: usize>(UnsafeCell<MaybeUninit<[usize; WORDS]>>);

// Only the kernel touches the contents, under its own locking.
unsafe impl<const WORDS: usize> Sync for Opaque<WORDS> {}

impl<const WORDS: usize> Opaque<WORDS> {
    /// Reserve storage without initializing it
    pub const fn uninit() -> Self {
        Self(UnsafeCell::new(MaybeUninit::uninit()))
    }
}

/// Declare an opaque control block type for a kernel object kind.
///
/// The size is given in machine words. Bindings against a specific kernel
/// build use this to mirror that build's `Static*_t` sizes:
///
/// ```
/// use rtos_static_alloc::{opaque_control_block, ObjectKind};
///
/// opaque_control_block!(
///     /// `StaticTask_t` of our kernel build
///     pub BoardTcb, ObjectKind::Thread, 40
/// );
/// ```
#[macro_export]
macro_rules! opaque_control_block {
    ($(#[$meta:meta])* $vis:vis $name:ident, $kind:expr, $words:expr) => {
        $(#[$meta])*
        #[repr(transparent)]
        $vis struct $name($crate::control_block::Opaque<{ $words }>);

        unsafe impl $crate::control_block::ControlBlock for $name {
            const KIND: $crate::ObjectKind = $kind;
            const UNINIT: Self = Self($crate::control_block::Opaque::uninit());
        }
    };
}

/// Assert at compile time that a control block matches the size the kernel
/// reports for it, typically `size_of::<StaticTask_t>()` from the kernel's
/// generated bindings.
///
/// ```
/// use rtos_static_alloc::{assert_control_block_size, port, ObjectKind, ThreadCb};
///
/// assert_control_block_size!(ThreadCb, port::control_block_size(ObjectKind::Thread));
/// ```
///
/// A mismatch fails the build:
///
/// ```compile_fail,E0080
/// use rtos_static_alloc::{assert_control_block_size, ThreadCb};
///
/// assert_control_block_size!(ThreadCb, 3);
/// ```
#[macro_export]
macro_rules! assert_control_block_size {
    ($cb:ty, $kernel_size:expr) => {
        const _: () = ::core::assert!(
            <$cb as $crate::control_block::ControlBlock>::SIZE == $kernel_size,
            "control block size differs from the kernel's"
        );
    };
}

opaque_control_block!(
    /// Thread control block (`StaticTask_t`)
    pub ThreadCb, ObjectKind::Thread, port::THREAD_CB_WORDS
);
opaque_control_block!(
    /// Message queue control block (`StaticQueue_t`)
    pub QueueCb, ObjectKind::MessageQueue, port::QUEUE_CB_WORDS
);
opaque_control_block!(
    /// Mutex control block (`StaticSemaphore_t`)
    pub MutexCb, ObjectKind::Mutex, port::SEMAPHORE_CB_WORDS
);
opaque_control_block!(
    /// Semaphore control block (`StaticSemaphore_t`)
    pub SemaphoreCb, ObjectKind::Semaphore, port::SEMAPHORE_CB_WORDS
);
opaque_control_block!(
    /// Timer control block (`StaticTimer_t`)
    pub TimerCb, ObjectKind::Timer, port::TIMER_CB_WORDS
);
opaque_control_block!(
    /// Memory pool control block (`MemPool_t`)
    pub PoolCb, ObjectKind::MemoryPool, port::POOL_CB_WORDS
);

/// Raw pointer to a control block, as recorded in an attribute record
pub(crate) const fn cb_ptr<C: ControlBlock>(cb: &'static C) -> *mut c_void {
    // ControlBlock guarantees the bytes are interior-mutable.
    (cb as *const C).cast_mut().cast()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sizes_follow_port() {
        assert_eq!(ThreadCb::SIZE, port::control_block_size(ObjectKind::Thread));
        assert_eq!(QueueCb::SIZE, port::control_block_size(ObjectKind::MessageQueue));
        assert_eq!(MutexCb::SIZE, port::control_block_size(ObjectKind::Mutex));
        assert_eq!(SemaphoreCb::SIZE, port::control_block_size(ObjectKind::Semaphore));
        assert_eq!(TimerCb::SIZE, port::control_block_size(ObjectKind::Timer));
        assert_eq!(PoolCb::SIZE, port::control_block_size(ObjectKind::MemoryPool));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(ThreadCb::KIND, ObjectKind::Thread);
        assert_eq!(QueueCb::KIND, ObjectKind::MessageQueue);
        assert_eq!(MutexCb::KIND, ObjectKind::Mutex);
        assert_eq!(SemaphoreCb::KIND, ObjectKind::Semaphore);
        assert_eq!(TimerCb::KIND, ObjectKind::Timer);
        assert_eq!(PoolCb::KIND, ObjectKind::MemoryPool);
    }

    #[test]
    fn test_word_alignment() {
        assert_eq!(core::mem::align_of::<ThreadCb>(), core::mem::align_of::<usize>());
        static CB: TimerCb = TimerCb::UNINIT;
        assert_eq!(cb_ptr(&CB) as usize % core::mem::align_of::<usize>(), 0);
    }

    #[test]
    fn test_custom_control_block() {
        opaque_control_block!(WideTcb, ObjectKind::Thread, 64);
        assert_eq!(WideTcb::SIZE, 64 * core::mem::size_of::<usize>());
    }

    assert_control_block_size!(QueueCb, port::QUEUE_CB_WORDS * core::mem::size_of::<usize>());
}
