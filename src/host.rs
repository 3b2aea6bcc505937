//! Host kernel: an in-process object table behind the [`Kernel`] trait
//!
//! Validates attribute records the way CMSIS-RTOS v2 on FreeRTOS does and
//! registers the objects in a fixed table. Nothing is scheduled: threads
//! never run and timers never fire. Used to check declarations on the host
//! and in tests before they meet the real kernel.
//!
//! Static table, no dynamic allocation.
//! Size: MAX_OBJECTS × sizeof(ObjectRecord) + overhead

use core::ffi::c_void;
use core::mem::{align_of, size_of};

use crate::error::KernelError;
use crate::kernel::{Kernel, ThreadFunc, TimerFunc, TimerType};
use crate::kind::ObjectKind;
use crate::mutex::MutexAttr;
use crate::pool::MemoryPoolAttr;
use crate::port::{self, StackWord, POOL_ALIGN};
use crate::queue::MessageQueueAttr;
use crate::record::Header;
use crate::semaphore::SemaphoreAttr;
use crate::thread::{Priority, ThreadAttr};
use crate::timer::TimerAttr;

/// Maximum live objects the host kernel can track
pub const MAX_OBJECTS: usize = 32;

/// Handle returned by [`HostKernel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    kind: ObjectKind,
    slot: u16,
}

impl ObjectId {
    pub const fn kind(self) -> ObjectKind {
        self.kind
    }

    /// Table slot the object occupies
    pub const fn slot(self) -> usize {
        self.slot as usize
    }
}

/// Kind-specific state recorded at creation
#[derive(Debug, Clone, Copy)]
pub enum ObjectDetail {
    Thread {
        /// Effective priority (`NONE` resolved to `NORMAL`)
        priority: Priority,
        func: ThreadFunc,
        stack_size: usize,
    },
    MessageQueue {
        msg_count: u32,
        msg_size: u32,
    },
    Mutex {
        recursive: bool,
        prio_inherit: bool,
        robust: bool,
    },
    Semaphore {
        max_count: u32,
        count: u32,
    },
    Timer {
        func: TimerFunc,
        timer_type: TimerType,
    },
    MemoryPool {
        block_count: u32,
        /// Block size after rounding to the pool alignment
        block_size: u32,
    },
}

// Entry functions compare by address.
impl PartialEq for ObjectDetail {
    fn eq(&self, other: &Self) -> bool {
        use ObjectDetail::*;
        match (*self, *other) {
            (
                Thread { priority: p1, func: f1, stack_size: s1 },
                Thread { priority: p2, func: f2, stack_size: s2 },
            ) => p1 == p2 && f1 as usize == f2 as usize && s1 == s2,
            (
                MessageQueue { msg_count: c1, msg_size: s1 },
                MessageQueue { msg_count: c2, msg_size: s2 },
            ) => c1 == c2 && s1 == s2,
            (
                Mutex { recursive: r1, prio_inherit: p1, robust: b1 },
                Mutex { recursive: r2, prio_inherit: p2, robust: b2 },
            ) => r1 == r2 && p1 == p2 && b1 == b2,
            (
                Semaphore { max_count: m1, count: c1 },
                Semaphore { max_count: m2, count: c2 },
            ) => m1 == m2 && c1 == c2,
            (
                Timer { func: f1, timer_type: t1 },
                Timer { func: f2, timer_type: t2 },
            ) => f1 as usize == f2 as usize && t1 == t2,
            (
                MemoryPool { block_count: c1, block_size: s1 },
                MemoryPool { block_count: c2, block_size: s2 },
            ) => c1 == c2 && s1 == s2,
            _ => false,
        }
    }
}

impl Eq for ObjectDetail {}

/// One registered object
#[derive(Debug, Clone, Copy)]
pub struct ObjectRecord {
    pub name: &'static str,
    pub cb_mem: *mut c_void,
    pub cb_size: usize,
    pub detail: ObjectDetail,
}

impl ObjectRecord {
    pub const fn kind(&self) -> ObjectKind {
        match self.detail {
            ObjectDetail::Thread { .. } => ObjectKind::Thread,
            ObjectDetail::MessageQueue { .. } => ObjectKind::MessageQueue,
            ObjectDetail::Mutex { .. } => ObjectKind::Mutex,
            ObjectDetail::Semaphore { .. } => ObjectKind::Semaphore,
            ObjectDetail::Timer { .. } => ObjectKind::Timer,
            ObjectDetail::MemoryPool { .. } => ObjectKind::MemoryPool,
        }
    }
}

/// In-process reference kernel
pub struct HostKernel {
    /// Static object table
    objects: [Option<ObjectRecord>; MAX_OBJECTS],
    /// Objects created since start, deleted ones included
    pub total_created: u64,
}

impl HostKernel {
    /// Create an empty kernel
    pub const fn new() -> Self {
        Self {
            objects: [None; MAX_OBJECTS],
            total_created: 0,
        }
    }

    /// Look up a live object
    pub fn get(&self, id: ObjectId) -> Option<&ObjectRecord> {
        self.objects
            .get(id.slot())?
            .as_ref()
            .filter(|record| record.kind() == id.kind)
    }

    /// Name of a live object (`osThreadGetName` and friends)
    pub fn name(&self, id: ObjectId) -> Option<&'static str> {
        self.get(id).map(|record| record.name)
    }

    /// Delete an object, returning its control block to the caller
    pub fn delete(&mut self, id: ObjectId) -> Result<(), KernelError> {
        if self.get(id).is_none() {
            return Err(KernelError::InvalidHandle);
        }
        if let Some(record) = self.objects[id.slot()].take() {
            log::debug!("host kernel: deleted {} `{}` from slot {}", id.kind, record.name, id.slot);
        }
        Ok(())
    }

    /// Number of live objects
    pub fn live_count(&self) -> usize {
        self.objects.iter().flatten().count()
    }

    /// Number of live objects of one kind
    pub fn count_of(&self, kind: ObjectKind) -> usize {
        self.objects
            .iter()
            .flatten()
            .filter(|record| record.kind() == kind)
            .count()
    }

    /// Memory footprint of the kernel table
    pub fn memory_footprint(&self) -> usize {
        size_of::<Self>()
    }

    /// Checks shared by every object kind
    fn check_header(&self, header: &Header, kind: ObjectKind) -> Result<(), KernelError> {
        let required = port::control_block_size(kind);
        if header.cb_size() < required {
            return Err(KernelError::ControlBlockTooSmall {
                required,
                actual: header.cb_size(),
            });
        }
        if header.cb_mem().is_null() || header.cb_mem() as usize % align_of::<usize>() != 0 {
            return Err(KernelError::Parameter("control block must be word aligned"));
        }
        if self.objects.iter().flatten().any(|record| record.cb_mem == header.cb_mem()) {
            return Err(KernelError::ControlBlockInUse);
        }
        Ok(())
    }

    /// Store a validated object in the first free slot
    fn register(&mut self, header: &Header, detail: ObjectDetail) -> Result<ObjectId, KernelError> {
        let slot = self
            .objects
            .iter()
            .position(Option::is_none)
            .ok_or(KernelError::NoFreeSlot)?;

        let record = ObjectRecord {
            name: header.name(),
            cb_mem: header.cb_mem(),
            cb_size: header.cb_size(),
            detail,
        };
        let kind = record.kind();
        self.objects[slot] = Some(record);
        self.total_created = self.total_created.wrapping_add(1);

        log::trace!("host kernel: {} `{}` in slot {}", kind, record.name, slot);
        Ok(ObjectId { kind, slot: slot as u16 })
    }
}

impl Default for HostKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// Checked `count × size`, the byte length a buffer must at least have
fn required_bytes(count: u32, size: u32) -> Result<usize, KernelError> {
    (count as usize)
        .checked_mul(size as usize)
        .ok_or(KernelError::Parameter("buffer size overflows"))
}

impl Kernel for HostKernel {
    type Handle = ObjectId;

    fn thread_new(
        &mut self,
        func: ThreadFunc,
        _argument: *mut c_void,
        attr: &'static ThreadAttr,
    ) -> Result<ObjectId, KernelError> {
        self.check_header(attr.header(), ObjectKind::Thread)?;

        let priority = match attr.priority() {
            Priority::NONE => Priority::NORMAL,
            p if p < Priority::IDLE || p > Priority::ISR => {
                return Err(KernelError::Parameter("thread priority out of range"));
            }
            p => p,
        };
        if attr.attr_bits() != 0 {
            return Err(KernelError::Parameter("joinable threads are not supported"));
        }

        let stack_size = attr.stack_size();
        if stack_size == 0 || stack_size % size_of::<StackWord>() != 0 {
            return Err(KernelError::Parameter("stack must be a whole number of stack words"));
        }
        if attr.stack_mem().is_null() || attr.stack_mem() as usize % align_of::<StackWord>() != 0 {
            return Err(KernelError::Parameter("stack must be aligned to the stack word"));
        }

        self.register(
            attr.header(),
            ObjectDetail::Thread {
                priority,
                func,
                stack_size,
            },
        )
    }

    fn message_queue_new(
        &mut self,
        msg_count: u32,
        msg_size: u32,
        attr: &'static MessageQueueAttr,
    ) -> Result<ObjectId, KernelError> {
        if msg_count == 0 || msg_size == 0 {
            return Err(KernelError::Parameter("message count and size must be non-zero"));
        }
        self.check_header(attr.header(), ObjectKind::MessageQueue)?;

        let required = required_bytes(msg_count, msg_size)?;
        if attr.mq_mem().is_null() || attr.mq_size() < required {
            return Err(KernelError::BufferTooSmall {
                required,
                actual: attr.mq_size(),
            });
        }

        self.register(attr.header(), ObjectDetail::MessageQueue { msg_count, msg_size })
    }

    fn mutex_new(&mut self, attr: &'static MutexAttr) -> Result<ObjectId, KernelError> {
        self.check_header(attr.header(), ObjectKind::Mutex)?;
        self.register(
            attr.header(),
            ObjectDetail::Mutex {
                recursive: attr.is_recursive(),
                prio_inherit: attr.has_prio_inherit(),
                robust: attr.is_robust(),
            },
        )
    }

    fn semaphore_new(
        &mut self,
        max_count: u32,
        initial_count: u32,
        attr: &'static SemaphoreAttr,
    ) -> Result<ObjectId, KernelError> {
        if max_count == 0 || initial_count > max_count {
            return Err(KernelError::Parameter("semaphore needs 0 <= initial <= max, max > 0"));
        }
        self.check_header(attr.header(), ObjectKind::Semaphore)?;
        self.register(
            attr.header(),
            ObjectDetail::Semaphore {
                max_count,
                count: initial_count,
            },
        )
    }

    fn timer_new(
        &mut self,
        func: TimerFunc,
        timer_type: TimerType,
        _argument: *mut c_void,
        attr: &'static TimerAttr,
    ) -> Result<ObjectId, KernelError> {
        self.check_header(attr.header(), ObjectKind::Timer)?;
        self.register(attr.header(), ObjectDetail::Timer { func, timer_type })
    }

    fn memory_pool_new(
        &mut self,
        block_count: u32,
        block_size: u32,
        attr: &'static MemoryPoolAttr,
    ) -> Result<ObjectId, KernelError> {
        if block_count == 0 || block_size == 0 {
            return Err(KernelError::Parameter("block count and size must be non-zero"));
        }
        self.check_header(attr.header(), ObjectKind::MemoryPool)?;

        let block_size = block_size
            .checked_next_multiple_of(POOL_ALIGN as u32)
            .ok_or(KernelError::Parameter("block size overflows"))?;
        let required = required_bytes(block_count, block_size)?;
        if attr.mp_mem().is_null() || attr.mp_size() < required {
            return Err(KernelError::BufferTooSmall {
                required,
                actual: attr.mp_size(),
            });
        }
        if attr.mp_mem() as usize % POOL_ALIGN != 0 {
            return Err(KernelError::Parameter("pool storage must be 4-byte aligned"));
        }

        self.register(
            attr.header(),
            ObjectDetail::MemoryPool {
                block_count,
                block_size,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_block::ControlBlock;
    use crate::error::Error;
    use core::ptr;

    extern "C" fn idle_entry(_argument: *mut c_void) {}
    extern "C" fn tick(_argument: *mut c_void) {}

    #[test]
    fn test_kernel_creation() {
        let kernel = HostKernel::new();
        assert_eq!(kernel.live_count(), 0);
        assert_eq!(kernel.total_created, 0);
    }

    #[test]
    fn test_thread_registration() {
        os_thread_static!(control_loop, 128, Priority::REALTIME);

        let mut kernel = HostKernel::new();
        let id = control_loop
            .create(&mut kernel, idle_entry, ptr::null_mut())
            .unwrap();

        assert_eq!(id.kind(), ObjectKind::Thread);
        assert_eq!(kernel.name(id), Some("control_loop"));
        let record = kernel.get(id).unwrap();
        assert_eq!(record.cb_size, crate::control_block::ThreadCb::SIZE);
        match record.detail {
            ObjectDetail::Thread { priority, stack_size, .. } => {
                assert_eq!(priority, Priority::REALTIME);
                assert_eq!(stack_size, 128 * size_of::<StackWord>());
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn test_default_priority() {
        os_thread_static!(background, 64, Priority::NONE);

        let mut kernel = HostKernel::new();
        let id = background.create(&mut kernel, idle_entry, ptr::null_mut()).unwrap();
        match kernel.get(id).unwrap().detail {
            ObjectDetail::Thread { priority, .. } => assert_eq!(priority, Priority::NORMAL),
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn test_priority_out_of_range() {
        os_thread_static!(too_high, 64, Priority::ISR.offset(1));

        let mut kernel = HostKernel::new();
        let result = too_high.create(&mut kernel, idle_entry, ptr::null_mut());
        assert_eq!(
            result,
            Err(Error::Kernel(KernelError::Parameter("thread priority out of range")))
        );
        // rejected records can be fixed up and resubmitted
        assert!(!too_high.is_created());
    }

    #[test]
    fn test_small_control_block_rejected() {
        opaque_control_block!(TinyTcb, ObjectKind::Thread, 1);
        os_thread_static!(cramped, 64, Priority::LOW, cb = TinyTcb);

        let mut kernel = HostKernel::new();
        let result = cramped.create(&mut kernel, idle_entry, ptr::null_mut());
        assert_eq!(
            result,
            Err(Error::Kernel(KernelError::ControlBlockTooSmall {
                required: port::control_block_size(ObjectKind::Thread),
                actual: size_of::<usize>(),
            }))
        );
    }

    #[test]
    fn test_larger_control_block_accepted() {
        opaque_control_block!(RoomyTcb, ObjectKind::Thread, 2 * port::THREAD_CB_WORDS);
        os_thread_static!(roomy, 64, Priority::LOW, cb = RoomyTcb);

        let mut kernel = HostKernel::new();
        assert!(roomy.create(&mut kernel, idle_entry, ptr::null_mut()).is_ok());
    }

    #[test]
    fn test_control_block_in_use() {
        os_mutex_static!(shared);

        let mut kernel = HostKernel::new();
        kernel.mutex_new(shared.attributes()).unwrap();
        assert_eq!(
            kernel.mutex_new(shared.attributes()),
            Err(KernelError::ControlBlockInUse)
        );
    }

    #[test]
    fn test_queue_validation() {
        os_message_queue_static!(events, 4, u32);

        let mut kernel = HostKernel::new();
        assert_eq!(
            kernel.message_queue_new(8, 4, events.attributes()),
            Err(KernelError::BufferTooSmall { required: 32, actual: 16 })
        );
        assert_eq!(
            kernel.message_queue_new(0, 4, events.attributes()),
            Err(KernelError::Parameter("message count and size must be non-zero"))
        );
        let id = events.create(&mut kernel).unwrap();
        assert_eq!(
            kernel.get(id).unwrap().detail,
            ObjectDetail::MessageQueue { msg_count: 4, msg_size: 4 }
        );
    }

    #[test]
    fn test_semaphore_counts() {
        os_semaphore_static!(slots);

        let mut kernel = HostKernel::new();
        assert_eq!(
            slots.create(&mut kernel, 2, 3),
            Err(Error::Kernel(KernelError::Parameter(
                "semaphore needs 0 <= initial <= max, max > 0"
            )))
        );
        let id = slots.create(&mut kernel, 5, 2).unwrap();
        assert_eq!(
            kernel.get(id).unwrap().detail,
            ObjectDetail::Semaphore { max_count: 5, count: 2 }
        );
    }

    #[test]
    fn test_timer_registration() {
        os_timer_static!(watchdog);

        let mut kernel = HostKernel::new();
        let id = watchdog
            .create(&mut kernel, tick, TimerType::Periodic, ptr::null_mut())
            .unwrap();
        assert_eq!(kernel.count_of(ObjectKind::Timer), 1);
        match kernel.get(id).unwrap().detail {
            ObjectDetail::Timer { timer_type, .. } => assert_eq!(timer_type, TimerType::Periodic),
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn test_pool_block_rounding() {
        os_memory_pool_static!(triples, 8, [u8; 3]);
        os_memory_pool_static!(words, 8, u32);

        let mut kernel = HostKernel::new();
        // 3-byte blocks round to 4, which the 24-byte buffer cannot hold
        assert_eq!(
            triples.create(&mut kernel),
            Err(Error::Kernel(KernelError::BufferTooSmall { required: 32, actual: 24 }))
        );
        let id = words.create(&mut kernel).unwrap();
        assert_eq!(
            kernel.get(id).unwrap().detail,
            ObjectDetail::MemoryPool { block_count: 8, block_size: 4 }
        );
    }

    #[test]
    fn test_delete_frees_slot() {
        os_mutex_static!(first);
        os_mutex_static!(second);

        let mut kernel = HostKernel::new();
        let a = first.create(&mut kernel).unwrap();
        let b = second.create(&mut kernel).unwrap();
        assert_eq!(kernel.live_count(), 2);

        kernel.delete(a).unwrap();
        assert_eq!(kernel.live_count(), 1);
        assert_eq!(kernel.get(a).map(|r| r.name), None);
        assert_eq!(kernel.delete(a), Err(KernelError::InvalidHandle));
        assert_eq!(kernel.name(b), Some("second"));

        // the freed control block can back a new object
        kernel.mutex_new(first.attributes()).unwrap();
        assert_eq!(kernel.total_created, 3);
    }

    #[test]
    fn test_creation_counter_passes_u32() {
        os_semaphore_static!(rollover);

        let mut kernel = HostKernel::new();
        kernel.total_created = u64::from(u32::MAX);
        rollover.create(&mut kernel, 1, 1).unwrap();
        assert_eq!(kernel.total_created, u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_detail_compares_entry_functions() {
        let thread = |func: ThreadFunc| ObjectDetail::Thread {
            priority: Priority::NORMAL,
            func,
            stack_size: 512,
        };
        assert_eq!(thread(idle_entry), thread(idle_entry));
        assert_ne!(thread(idle_entry), thread(tick));
        assert_ne!(
            ObjectDetail::Timer { func: tick, timer_type: TimerType::Once },
            ObjectDetail::Timer { func: tick, timer_type: TimerType::Periodic }
        );
        assert_ne!(
            thread(idle_entry),
            ObjectDetail::Timer { func: idle_entry, timer_type: TimerType::Once }
        );
    }

    #[test]
    fn test_mutex_flags_recorded() {
        os_mutex_static!(uart_lock);

        let mut kernel = HostKernel::new();
        let id = uart_lock.create(&mut kernel).unwrap();
        assert_eq!(
            kernel.get(id).unwrap().detail,
            ObjectDetail::Mutex { recursive: false, prio_inherit: true, robust: false }
        );
    }

    #[test]
    fn test_wrong_kind_handle() {
        os_timer_static!(blink);

        let mut kernel = HostKernel::new();
        let id = blink
            .create(&mut kernel, tick, TimerType::Once, ptr::null_mut())
            .unwrap();
        let forged = ObjectId { kind: ObjectKind::Mutex, slot: id.slot };
        assert!(kernel.get(forged).is_none());
        assert_eq!(kernel.delete(forged), Err(KernelError::InvalidHandle));
    }

    #[test]
    fn test_table_full() {
        os_semaphore_static!(s00);
        let mut kernel = HostKernel::new();
        kernel.semaphore_new(1, 0, s00.attributes()).unwrap();
        for _ in 1..MAX_OBJECTS {
            kernel.semaphore_new(1, 0, fresh_semaphore()).unwrap();
        }
        assert_eq!(
            kernel.semaphore_new(1, 0, fresh_semaphore()),
            Err(KernelError::NoFreeSlot)
        );
    }

    /// Leak a semaphore descriptor with its own control block
    fn fresh_semaphore() -> &'static SemaphoreAttr {
        use crate::semaphore::{SemaphoreStorage, StaticSemaphore};
        use std::boxed::Box;

        let storage: &'static SemaphoreStorage = Box::leak(Box::new(SemaphoreStorage::new()));
        let sem: &'static StaticSemaphore = Box::leak(Box::new(StaticSemaphore::new(
            crate::record::object_name("fill\0"),
            storage,
        )));
        sem.attributes()
    }

    #[test]
    fn test_memory_footprint() {
        let kernel = HostKernel::new();
        assert!(kernel.memory_footprint() >= MAX_OBJECTS * size_of::<Option<ObjectRecord>>());
    }
}
