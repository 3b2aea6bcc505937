//! Declaration macros
//!
//! Each macro declares one `static` named after the object. Its storage
//! (control block and buffer) is a second static nested in the initializer,
//! so two declarations never share memory and no extra names leak into the
//! caller's scope. Declaring the same name twice is a redefinition error.
//!
//! Every macro takes an optional trailing `cb = Type` to use a control block
//! declared with [`opaque_control_block!`](crate::opaque_control_block)
//! instead of the port default.

/// Pick the caller's control block type or the port default
#[doc(hidden)]
#[macro_export]
macro_rules! __control_block_type {
    (; $default:ty) => { $default };
    ($cb:ty; $default:ty) => { $cb };
}

/// Build an object name from the declared identifier
#[doc(hidden)]
#[macro_export]
macro_rules! __object_name {
    ($name:ident) => {
        $crate::record::object_name(::core::concat!(::core::stringify!($name), "\0"))
    };
}

/// Statically allocate a thread: control block and a stack of
/// `stack_words` [`StackWord`](crate::port::StackWord)s.
///
/// ```
/// use rtos_static_alloc::{os_thread_static, port::STACK_WORD_SIZE, Priority};
///
/// os_thread_static!(pub SENSOR_TASK, 256, Priority::HIGH);
///
/// let attr = SENSOR_TASK.attributes();
/// assert_eq!(attr.name(), "SENSOR_TASK");
/// assert_eq!(attr.stack_size(), 256 * STACK_WORD_SIZE);
/// assert_eq!(attr.priority(), Priority::HIGH);
/// ```
///
/// A thread without a stack is rejected while the static is evaluated:
///
/// ```compile_fail,E0080
/// use rtos_static_alloc::{os_thread_static, Priority};
///
/// os_thread_static!(EMPTY, 0, Priority::NORMAL);
/// # fn main() { let _ = EMPTY.attributes(); }
/// ```
#[macro_export]
macro_rules! os_thread_static {
    ($(#[$meta:meta])* $vis:vis $name:ident, $stack_words:expr, $priority:expr $(, cb = $cb:ty)?) => {
        $(#[$meta])*
        #[allow(non_upper_case_globals)]
        $vis static $name: $crate::thread::StaticThread<
            { $stack_words },
            $crate::__control_block_type!($($cb)?; $crate::control_block::ThreadCb),
        > = {
            static STORAGE: $crate::thread::ThreadStorage<
                { $stack_words },
                $crate::__control_block_type!($($cb)?; $crate::control_block::ThreadCb),
            > = $crate::thread::ThreadStorage::new();
            $crate::thread::StaticThread::new($crate::__object_name!($name), &STORAGE, $priority)
        };
    };
}

/// Statically allocate a message queue of `queue_size` items of `type`.
///
/// ```
/// use rtos_static_alloc::os_message_queue_static;
///
/// os_message_queue_static!(uart_rx, 32, u16);
///
/// assert_eq!(uart_rx.attributes().mq_size(), 64);
/// ```
///
/// Queues need at least one slot, and messages must have a size:
///
/// ```compile_fail,E0080
/// use rtos_static_alloc::os_message_queue_static;
///
/// os_message_queue_static!(NOTHING, 0, u32);
/// # fn main() { let _ = NOTHING.attributes(); }
/// ```
///
/// ```compile_fail,E0080
/// use rtos_static_alloc::os_message_queue_static;
///
/// os_message_queue_static!(SIGNALS, 4, ());
/// # fn main() { let _ = SIGNALS.attributes(); }
/// ```
#[macro_export]
macro_rules! os_message_queue_static {
    ($(#[$meta:meta])* $vis:vis $name:ident, $queue_size:expr, $type:ty $(, cb = $cb:ty)?) => {
        $(#[$meta])*
        #[allow(non_upper_case_globals)]
        $vis static $name: $crate::queue::StaticMessageQueue<
            $type,
            { $queue_size },
            $crate::__control_block_type!($($cb)?; $crate::control_block::QueueCb),
        > = {
            static STORAGE: $crate::queue::QueueStorage<
                $type,
                { $queue_size },
                $crate::__control_block_type!($($cb)?; $crate::control_block::QueueCb),
            > = $crate::queue::QueueStorage::new();
            $crate::queue::StaticMessageQueue::new($crate::__object_name!($name), &STORAGE)
        };
    };
}

/// Statically allocate a mutex with priority inheritance.
///
/// ```
/// use rtos_static_alloc::{mutex::MUTEX_PRIO_INHERIT, os_mutex_static};
///
/// os_mutex_static!(I2C_LOCK);
///
/// assert_eq!(I2C_LOCK.attributes().attr_bits(), MUTEX_PRIO_INHERIT);
/// ```
///
/// A custom control block must be sized for the same object kind:
///
/// ```compile_fail,E0080
/// use rtos_static_alloc::{os_mutex_static, TimerCb};
///
/// os_mutex_static!(BUS_LOCK, cb = TimerCb);
/// # fn main() { let _ = BUS_LOCK.attributes(); }
/// ```
///
/// Every declared name is a `static`, so it may appear only once per scope:
///
/// ```compile_fail,E0428
/// use rtos_static_alloc::os_mutex_static;
///
/// os_mutex_static!(BUS_LOCK);
/// os_mutex_static!(BUS_LOCK);
/// # fn main() {}
/// ```
#[macro_export]
macro_rules! os_mutex_static {
    ($(#[$meta:meta])* $vis:vis $name:ident $(, cb = $cb:ty)?) => {
        $(#[$meta])*
        #[allow(non_upper_case_globals)]
        $vis static $name: $crate::mutex::StaticMutex<
            $crate::__control_block_type!($($cb)?; $crate::control_block::MutexCb),
        > = {
            static STORAGE: $crate::mutex::MutexStorage<
                $crate::__control_block_type!($($cb)?; $crate::control_block::MutexCb),
            > = $crate::mutex::MutexStorage::new();
            $crate::mutex::StaticMutex::new($crate::__object_name!($name), &STORAGE)
        };
    };
}

/// Statically allocate a semaphore. Counts are given at creation, see
/// [`StaticSemaphore::create`](crate::semaphore::StaticSemaphore::create).
#[macro_export]
macro_rules! os_semaphore_static {
    ($(#[$meta:meta])* $vis:vis $name:ident $(, cb = $cb:ty)?) => {
        $(#[$meta])*
        #[allow(non_upper_case_globals)]
        $vis static $name: $crate::semaphore::StaticSemaphore<
            $crate::__control_block_type!($($cb)?; $crate::control_block::SemaphoreCb),
        > = {
            static STORAGE: $crate::semaphore::SemaphoreStorage<
                $crate::__control_block_type!($($cb)?; $crate::control_block::SemaphoreCb),
            > = $crate::semaphore::SemaphoreStorage::new();
            $crate::semaphore::StaticSemaphore::new($crate::__object_name!($name), &STORAGE)
        };
    };
}

/// Statically allocate a software timer.
#[macro_export]
macro_rules! os_timer_static {
    ($(#[$meta:meta])* $vis:vis $name:ident $(, cb = $cb:ty)?) => {
        $(#[$meta])*
        #[allow(non_upper_case_globals)]
        $vis static $name: $crate::timer::StaticTimer<
            $crate::__control_block_type!($($cb)?; $crate::control_block::TimerCb),
        > = {
            static STORAGE: $crate::timer::TimerStorage<
                $crate::__control_block_type!($($cb)?; $crate::control_block::TimerCb),
            > = $crate::timer::TimerStorage::new();
            $crate::timer::StaticTimer::new($crate::__object_name!($name), &STORAGE)
        };
    };
}

/// Statically allocate a memory pool of `pool_size` blocks of `type`.
///
/// ```
/// use rtos_static_alloc::os_memory_pool_static;
///
/// os_memory_pool_static!(PACKETS, 8, [u8; 64]);
///
/// assert_eq!(PACKETS.attributes().mp_size(), 512);
/// ```
///
/// ```compile_fail,E0080
/// use rtos_static_alloc::os_memory_pool_static;
///
/// os_memory_pool_static!(NO_BLOCKS, 0, u32);
/// # fn main() { let _ = NO_BLOCKS.attributes(); }
/// ```
#[macro_export]
macro_rules! os_memory_pool_static {
    ($(#[$meta:meta])* $vis:vis $name:ident, $pool_size:expr, $type:ty $(, cb = $cb:ty)?) => {
        $(#[$meta])*
        #[allow(non_upper_case_globals)]
        $vis static $name: $crate::pool::StaticMemoryPool<
            $type,
            { $pool_size },
            $crate::__control_block_type!($($cb)?; $crate::control_block::PoolCb),
        > = {
            static STORAGE: $crate::pool::PoolStorage<
                $type,
                { $pool_size },
                $crate::__control_block_type!($($cb)?; $crate::control_block::PoolCb),
            > = $crate::pool::PoolStorage::new();
            $crate::pool::StaticMemoryPool::new($crate::__object_name!($name), &STORAGE)
        };
    };
}
