//! Synchronization primitives for webhook-driven work
//!
//! - **`serial_queue`**: at most one in-flight task per key, FIFO per key

pub mod serial_queue;

pub use serial_queue::KeyedSerialQueue;
