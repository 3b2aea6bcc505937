//! Kernel object kinds

use core::fmt;

/// The kernel object a descriptor or control block belongs to
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Thread (task) with its own stack
    Thread = 0,
    /// Fixed-size message queue
    MessageQueue = 1,
    /// Mutex
    Mutex = 2,
    /// Counting semaphore
    Semaphore = 3,
    /// Software timer
    Timer = 4,
    /// Fixed-size block memory pool
    MemoryPool = 5,
}

impl ObjectKind {
    /// Every kind, in declaration order
    pub const ALL: [ObjectKind; 6] = [
        ObjectKind::Thread,
        ObjectKind::MessageQueue,
        ObjectKind::Mutex,
        ObjectKind::Semaphore,
        ObjectKind::Timer,
        ObjectKind::MemoryPool,
    ];

    /// Human-readable name
    pub const fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Thread => "thread",
            ObjectKind::MessageQueue => "message queue",
            ObjectKind::Mutex => "mutex",
            ObjectKind::Semaphore => "semaphore",
            ObjectKind::Timer => "timer",
            ObjectKind::MemoryPool => "memory pool",
        }
    }

    /// Does this kind own a backing buffer besides its control block?
    pub const fn has_buffer(self) -> bool {
        matches!(
            self,
            ObjectKind::Thread | ObjectKind::MessageQueue | ObjectKind::MemoryPool
        )
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
