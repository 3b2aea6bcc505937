//! Memory pool descriptors
//!
//! A pool hands out fixed-size blocks of `T` from a static array of `N`
//! blocks. Kernels built on FreeRTOS round block sizes up to 4 bytes, so a
//! `T` whose size is not a multiple of [`POOL_ALIGN`](crate::port::POOL_ALIGN)
//! is rejected at creation time rather than silently overrunning the buffer.

use core::cell::UnsafeCell;
use core::ffi::{c_void, CStr};
use core::marker::PhantomData;
use core::mem::{size_of, MaybeUninit};

use crate::control_block::{ControlBlock, PoolCb};
use crate::error::Error;
use crate::kernel::Kernel;
use crate::kind::ObjectKind;
use crate::record::{impl_header_accessors, size_u32, submit, Claim, Header};

/// Memory pool attribute record (`osMemoryPoolAttr_t`)
#[repr(C)]
#[derive(Debug)]
pub struct MemoryPoolAttr {
    header: Header,
    mp_mem: *mut c_void,
    mp_size: u32,
}

impl_header_accessors!(MemoryPoolAttr);

impl MemoryPoolAttr {
    /// Pool storage address
    pub const fn mp_mem(&self) -> *mut c_void {
        self.mp_mem
    }

    /// Pool storage size in bytes
    pub const fn mp_size(&self) -> usize {
        self.mp_size as usize
    }
}

/// Static memory of one pool: control block and `N` blocks
pub struct PoolStorage<T, const N: usize, C: ControlBlock = PoolCb> {
    cb: C,
    blocks: UnsafeCell<MaybeUninit<[T; N]>>,
}

unsafe impl<T: Send, const N: usize, C: ControlBlock> Sync for PoolStorage<T, N, C> {}

impl<T, const N: usize, C: ControlBlock> PoolStorage<T, N, C> {
    pub const fn new() -> Self {
        Self {
            cb: C::UNINIT,
            blocks: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

impl<T, const N: usize, C: ControlBlock> Default for PoolStorage<T, N, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A statically declared pool of `N` blocks of type `T`,
/// see [`os_memory_pool_static!`](crate::os_memory_pool_static)
pub struct StaticMemoryPool<T: Send + 'static, const N: usize, C: ControlBlock = PoolCb> {
    storage: &'static PoolStorage<T, N, C>,
    attr: MemoryPoolAttr,
    claim: Claim,
    _block: PhantomData<fn(T) -> T>,
}

impl<T: Send + 'static, const N: usize, C: ControlBlock> StaticMemoryPool<T, N, C> {
    /// Size of one block in bytes
    pub const BLOCK_SIZE: usize = size_of::<T>();
    /// Pool storage in bytes
    pub const BUFFER_BYTES: usize = size_of::<[T; N]>();

    /// Bind a name to pool storage.
    ///
    /// An empty pool or a zero-sized block type stops the build.
    pub const fn new(name: &'static CStr, storage: &'static PoolStorage<T, N, C>) -> Self {
        assert!(N > 0, "memory pool needs at least one block");
        assert!(Self::BLOCK_SIZE > 0, "block type must not be zero-sized");
        Self {
            storage,
            attr: MemoryPoolAttr {
                header: Header::new(ObjectKind::MemoryPool, name, 0, &storage.cb),
                mp_mem: storage.blocks.get().cast(),
                mp_size: size_u32(Self::BUFFER_BYTES),
            },
            claim: Claim::new(),
            _block: PhantomData,
        }
    }

    /// Attribute record to pass to the kernel
    pub const fn attributes(&'static self) -> &'static MemoryPoolAttr {
        &self.attr
    }

    pub fn name(&self) -> &'static str {
        self.attr.name()
    }

    /// Number of blocks
    pub const fn block_count(&self) -> usize {
        N
    }

    pub fn buffer_range(&self) -> core::ops::Range<usize> {
        let base = self.storage.blocks.get() as usize;
        base..base + Self::BUFFER_BYTES
    }

    pub fn is_created(&self) -> bool {
        self.claim.is_claimed()
    }

    /// Create the pool on `kernel`; block count and size come from `N` and `T`
    pub fn create<K: Kernel>(&'static self, kernel: &mut K) -> Result<K::Handle, Error> {
        submit(&self.claim, ObjectKind::MemoryPool, self.name(), || {
            kernel.memory_pool_new(size_u32(N), size_u32(Self::BLOCK_SIZE), &self.attr)
        })
    }
}
