//! Kernel boundary
//!
//! The kernel that consumes attribute records lives outside this crate. A
//! binding implements [`Kernel`] by forwarding to its "create from static
//! attributes" calls (`osThreadNew`, `osMessageQueueNew`, ...); the records
//! are `#[repr(C)]` and can be passed through unchanged.
//! [`HostKernel`](crate::host::HostKernel) is an in-process implementation.

use core::ffi::c_void;
use core::fmt::Debug;

use crate::error::KernelError;
use crate::mutex::MutexAttr;
use crate::pool::MemoryPoolAttr;
use crate::queue::MessageQueueAttr;
use crate::semaphore::SemaphoreAttr;
use crate::thread::ThreadAttr;
use crate::timer::TimerAttr;

/// Thread entry point (`osThreadFunc_t`)
pub type ThreadFunc = extern "C" fn(argument: *mut c_void);

/// Timer callback (`osTimerFunc_t`)
pub type TimerFunc = extern "C" fn(argument: *mut c_void);

/// Timer reload behavior (`osTimerType_t`)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerType {
    /// Fires once
    Once = 0,
    /// Reloads after every expiry
    Periodic = 1,
}

/// Object creation entry points of an RTOS kernel.
///
/// Each call receives the static attribute record plus the arguments the
/// kernel takes at the call site rather than in the record. On success the
/// kernel owns the record's control block and buffer until the object is
/// deleted.
pub trait Kernel {
    /// Opaque object identifier (`osThreadId_t`, `osMutexId_t`, ...)
    type Handle: Copy + Debug;

    fn thread_new(
        &mut self,
        func: ThreadFunc,
        argument: *mut c_void,
        attr: &'static ThreadAttr,
    ) -> Result<Self::Handle, KernelError>;

    fn message_queue_new(
        &mut self,
        msg_count: u32,
        msg_size: u32,
        attr: &'static MessageQueueAttr,
    ) -> Result<Self::Handle, KernelError>;

    fn mutex_new(&mut self, attr: &'static MutexAttr) -> Result<Self::Handle, KernelError>;

    fn semaphore_new(
        &mut self,
        max_count: u32,
        initial_count: u32,
        attr: &'static SemaphoreAttr,
    ) -> Result<Self::Handle, KernelError>;

    fn timer_new(
        &mut self,
        func: TimerFunc,
        timer_type: TimerType,
        argument: *mut c_void,
        attr: &'static TimerAttr,
    ) -> Result<Self::Handle, KernelError>;

    fn memory_pool_new(
        &mut self,
        block_count: u32,
        block_size: u32,
        attr: &'static MemoryPoolAttr,
    ) -> Result<Self::Handle, KernelError>;
}
