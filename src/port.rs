//! Port tables: kernel-defined object sizes per target
//!
//! Selected with Cargo features. Without a feature the generic FreeRTOS
//! table is used with native machine words, which is what host builds and
//! tests run against.
//!
//! | Feature    | Stack word | Kernel                     |
//! |------------|-----------|----------------------------|
//! | (none)     | `usize`   | FreeRTOS, host word size   |
//! | `cortex-m` | `u32`     | FreeRTOS ARM_CM* ports     |
//! | `riscv`    | `u32`     | FreeRTOS RISC-V port       |
//! | `esp32`    | `u8`      | ESP-IDF FreeRTOS (SMP TCB) |
//!
//! Word counts are the opaque `Static*_t` sizes rounded up to whole machine
//! words. They are defaults: a binding against a real kernel build should
//! pin them with [`assert_control_block_size!`](crate::assert_control_block_size).

use crate::kind::ObjectKind;

#[cfg(any(
    all(feature = "cortex-m", feature = "riscv"),
    all(feature = "cortex-m", feature = "esp32"),
    all(feature = "riscv", feature = "esp32"),
))]
compile_error!("select at most one port feature: `cortex-m`, `riscv` or `esp32`");

#[cfg(not(feature = "esp32"))]
mod table {
    pub const NAME: &str = if cfg!(feature = "cortex-m") {
        "freertos-cortex-m"
    } else if cfg!(feature = "riscv") {
        "freertos-riscv"
    } else {
        "freertos-generic"
    };

    /// `StaticTask_t`
    pub const THREAD_CB_WORDS: usize = 25;
    /// `StaticQueue_t`
    pub const QUEUE_CB_WORDS: usize = 20;
    /// `StaticSemaphore_t` (shared by mutexes and semaphores)
    pub const SEMAPHORE_CB_WORDS: usize = 20;
    /// `StaticTimer_t`
    pub const TIMER_CB_WORDS: usize = 11;
    /// CMSIS `MemPool_t`, which embeds a `StaticSemaphore_t`
    pub const POOL_CB_WORDS: usize = 28;
}

#[cfg(feature = "esp32")]
mod table {
    pub const NAME: &str = "esp-idf-freertos";

    pub const THREAD_CB_WORDS: usize = 88;
    pub const QUEUE_CB_WORDS: usize = 22;
    pub const SEMAPHORE_CB_WORDS: usize = 22;
    pub const TIMER_CB_WORDS: usize = 11;
    pub const POOL_CB_WORDS: usize = 30;
}

pub use table::*;

/// Unit a thread stack is counted in (`StackType_t`)
#[cfg(any(feature = "cortex-m", feature = "riscv"))]
pub type StackWord = u32;
/// Unit a thread stack is counted in (`StackType_t`)
#[cfg(feature = "esp32")]
pub type StackWord = u8;
/// Unit a thread stack is counted in (`StackType_t`)
#[cfg(not(any(feature = "cortex-m", feature = "riscv", feature = "esp32")))]
pub type StackWord = usize;

/// Bytes per stack word
pub const STACK_WORD_SIZE: usize = core::mem::size_of::<StackWord>();

/// Alignment the kernel requires for memory pool storage and block sizes
pub const POOL_ALIGN: usize = 4;

/// Control block size in machine words for an object kind
pub const fn control_block_words(kind: ObjectKind) -> usize {
    match kind {
        ObjectKind::Thread => THREAD_CB_WORDS,
        ObjectKind::MessageQueue => QUEUE_CB_WORDS,
        ObjectKind::Mutex | ObjectKind::Semaphore => SEMAPHORE_CB_WORDS,
        ObjectKind::Timer => TIMER_CB_WORDS,
        ObjectKind::MemoryPool => POOL_CB_WORDS,
    }
}

/// Control block size in bytes for an object kind
pub const fn control_block_size(kind: ObjectKind) -> usize {
    control_block_words(kind) * core::mem::size_of::<usize>()
}
