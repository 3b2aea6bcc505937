//! Message queue descriptors
//!
//! The queue buffer is typed as `[T; N]` so its byte length is exactly
//! `N * size_of::<T>()` with `T`'s natural alignment; the kernel sees it as
//! raw bytes and copies messages in and out by value.

use core::cell::UnsafeCell;
use core::ffi::{c_void, CStr};
use core::marker::PhantomData;
use core::mem::{size_of, MaybeUninit};

use crate::control_block::{ControlBlock, QueueCb};
use crate::error::Error;
use crate::kernel::Kernel;
use crate::kind::ObjectKind;
use crate::record::{impl_header_accessors, size_u32, submit, Claim, Header};

/// Message queue attribute record (`osMessageQueueAttr_t`)
#[repr(C)]
#[derive(Debug)]
pub struct MessageQueueAttr {
    header: Header,
    mq_mem: *mut c_void,
    mq_size: u32,
}

impl_header_accessors!(MessageQueueAttr);

impl MessageQueueAttr {
    /// Queue buffer address
    pub const fn mq_mem(&self) -> *mut c_void {
        self.mq_mem
    }

    /// Queue buffer size in bytes
    pub const fn mq_size(&self) -> usize {
        self.mq_size as usize
    }
}

/// Static memory of one queue: control block and `N` message slots
pub struct QueueStorage<T, const N: usize, C: ControlBlock = QueueCb> {
    cb: C,
    buf: UnsafeCell<MaybeUninit<[T; N]>>,
}

// Messages are moved between threads by the kernel, hence `T: Send`.
unsafe impl<T: Send, const N: usize, C: ControlBlock> Sync for QueueStorage<T, N, C> {}

impl<T, const N: usize, C: ControlBlock> QueueStorage<T, N, C> {
    pub const fn new() -> Self {
        Self {
            cb: C::UNINIT,
            buf: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

impl<T, const N: usize, C: ControlBlock> Default for QueueStorage<T, N, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A statically declared message queue of `N` messages of type `T`,
/// see [`os_message_queue_static!`](crate::os_message_queue_static)
pub struct StaticMessageQueue<T: Send + 'static, const N: usize, C: ControlBlock = QueueCb> {
    storage: &'static QueueStorage<T, N, C>,
    attr: MessageQueueAttr,
    claim: Claim,
    _msg: PhantomData<fn(T) -> T>,
}

impl<T: Send + 'static, const N: usize, C: ControlBlock> StaticMessageQueue<T, N, C> {
    /// Size of one message in bytes
    pub const MSG_SIZE: usize = size_of::<T>();
    /// Buffer size in bytes
    pub const BUFFER_BYTES: usize = size_of::<[T; N]>();

    /// Bind a name to queue storage.
    ///
    /// An empty queue or a zero-sized message type stops the build.
    pub const fn new(name: &'static CStr, storage: &'static QueueStorage<T, N, C>) -> Self {
        assert!(N > 0, "message queue needs at least one slot");
        assert!(Self::MSG_SIZE > 0, "message type must not be zero-sized");
        Self {
            storage,
            attr: MessageQueueAttr {
                header: Header::new(ObjectKind::MessageQueue, name, 0, &storage.cb),
                mq_mem: storage.buf.get().cast(),
                mq_size: size_u32(Self::BUFFER_BYTES),
            },
            claim: Claim::new(),
            _msg: PhantomData,
        }
    }

    /// Attribute record to pass to the kernel
    pub const fn attributes(&'static self) -> &'static MessageQueueAttr {
        &self.attr
    }

    pub fn name(&self) -> &'static str {
        self.attr.name()
    }

    /// Queue depth in messages
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Buffer address range
    pub fn buffer_range(&self) -> core::ops::Range<usize> {
        let base = self.storage.buf.get() as usize;
        base..base + Self::BUFFER_BYTES
    }

    pub fn is_created(&self) -> bool {
        self.claim.is_claimed()
    }

    /// Create the queue on `kernel`; message count and size come from `N` and `T`
    pub fn create<K: Kernel>(&'static self, kernel: &mut K) -> Result<K::Handle, Error> {
        submit(&self.claim, ObjectKind::MessageQueue, self.name(), || {
            kernel.message_queue_new(
                size_u32(N),
                size_u32(Self::MSG_SIZE),
                &self.attr,
            )
        })
    }
}
