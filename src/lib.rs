//! rtos-static-alloc: compile-time storage for RTOS kernel objects
//!
//! Declare threads, queues, mutexes, semaphores, timers and memory pools as
//! `static`s. Each declaration reserves the object's control block and
//! backing buffer and builds the kernel's attribute record at compile time:
//! - No heap, no allocation, no runtime initialization order
//! - Buffer sizes derived from element counts and types
//! - Attribute records laid out like CMSIS-RTOS v2 `os*Attr_t`
//! - Control block sizes pinned per port and checkable at compile time
//!
//! ```
//! use core::ptr;
//! use rtos_static_alloc::{os_message_queue_static, os_thread_static, HostKernel, Priority};
//!
//! os_thread_static!(SENSOR, 256, Priority::HIGH);
//! os_message_queue_static!(SAMPLES, 8, [u32; 4]);
//!
//! extern "C" fn sensor_main(_arg: *mut core::ffi::c_void) {}
//!
//! let mut kernel = HostKernel::new();
//! let sensor = SENSOR.create(&mut kernel, sensor_main, ptr::null_mut()).unwrap();
//! let samples = SAMPLES.create(&mut kernel).unwrap();
//! assert_eq!(kernel.name(sensor), Some("SENSOR"));
//! assert_eq!(SAMPLES.attributes().mq_size(), 128);
//! # let _ = samples;
//! ```

#![no_std]

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;
#[macro_use]
pub mod control_block;

pub mod error;
pub mod host;
pub mod kernel;
pub mod kind;
pub mod mutex;
pub mod pool;
pub mod port;
pub mod queue;
pub mod record;
pub mod semaphore;
pub mod thread;
pub mod timer;

pub use control_block::{ControlBlock, MutexCb, PoolCb, QueueCb, SemaphoreCb, ThreadCb, TimerCb};
pub use error::{Error, KernelError};
pub use host::{HostKernel, ObjectId};
pub use kernel::{Kernel, ThreadFunc, TimerFunc, TimerType};
pub use kind::ObjectKind;
pub use mutex::{MutexAttr, StaticMutex};
pub use pool::{MemoryPoolAttr, StaticMemoryPool};
pub use queue::{MessageQueueAttr, StaticMessageQueue};
pub use semaphore::{SemaphoreAttr, StaticSemaphore};
pub use thread::{Priority, StaticThread, ThreadAttr};
pub use timer::{StaticTimer, TimerAttr};
