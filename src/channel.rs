//! Lock-free SPSC (Single Producer, Single Consumer) byte channel.
//!
//! Moves raw bytes from the receive interrupt to the protocol task.
//!
//! # Architecture
//!
//! ```text
//! RX interrupt ──try_send──▶ ByteChannel ──recv──▶ protocol task
//!                            (lock-free)
//!                            (drop on full)
//! ```
//!
//! The producer side never blocks, never allocates, and never touches the
//! interrupt mask — it is a handful of atomic operations, safe to call with
//! interrupts disabled. On a full ring the newest byte is discarded and the
//! caller accounts the loss; existing entries are never corrupted.
//!
//! FIFO ordering is guaranteed for exactly one producer and one consumer.
//! Multiple producers into the same channel are not a supported
//! configuration.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::port;

/// Result of an interrupt-side enqueue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendResult {
    /// Byte stored in the ring.
    Accepted,
    /// Ring full; byte discarded. Observable, not fatal.
    Dropped,
}

/// Result of a task-side blocking receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recv {
    /// Next byte in FIFO order.
    Byte(u8),
    /// No byte arrived within the timeout. Routine, not an error.
    TimedOut,
}

/// Timeout for [`ByteChannel::recv`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecvTimeout {
    /// Block until a byte arrives.
    Forever,
    /// Block for at most this many scheduler ticks.
    ///
    /// `Ticks(0)` blocks forever, matching the tick-queue convention of the
    /// underlying kernel where a zero timeout means "wait indefinitely".
    Ticks(u32),
}

/// Bounded FIFO of single bytes, written from interrupt context and read
/// from one consumer task.
///
/// # Safety
///
/// This type uses `UnsafeCell` internally but is safe to use because:
/// - Single producer, single consumer (enforced by design, not by the type
///   system — the producer owns `write_idx`, the consumer owns `read_idx`)
/// - All coordination through atomic operations
/// - A slot is published only after it is written (Release on `write_idx`)
///   and recycled only after it is read (Release on `read_idx`)
///
/// # Memory Ordering
///
/// - Producer: `read_idx` Acquire (observe freed slots), `write_idx` Release
/// - Consumer: `write_idx` Acquire (observe published slots), `read_idx`
///   Release
pub struct ByteChannel<const N: usize = { crate::config::RX_QUEUE_CAPACITY }> {
    /// Ring storage. The channel owns it; no external buffer is shared.
    slots: UnsafeCell<[u8; N]>,

    /// Next write index (monotonically increasing, wraps via mask).
    write_idx: AtomicU32,

    /// Next read index (monotonically increasing, wraps via mask).
    read_idx: AtomicU32,
}

// SAFETY: Single producer, single consumer, atomic coordination.
// No mutable aliasing possible within those rules.
unsafe impl<const N: usize> Sync for ByteChannel<N> {}
unsafe impl<const N: usize> Send for ByteChannel<N> {}

impl<const N: usize> ByteChannel<N> {
    /// Mask for wrapping index to buffer size.
    /// N must be a power of 2.
    const MASK: usize = N - 1;

    /// Create a new empty channel.
    ///
    /// # Panics
    ///
    /// Panics at compile time if N is not a power of 2.
    pub const fn new() -> Self {
        // Compile-time check: N must be power of 2
        assert!(N.is_power_of_two(), "Channel capacity must be power of 2");

        Self {
            slots: UnsafeCell::new([0; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
        }
    }

    /// Enqueue one byte from the producer side.
    ///
    /// Callable from interrupt context: completes in O(1), never blocks,
    /// never disables or re-enables interrupts. When the ring is at
    /// capacity the byte is dropped and [`SendResult::Dropped`] is
    /// returned; the caller increments its loss counter.
    #[inline]
    pub fn try_send(&self, byte: u8) -> SendResult {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N as u32 {
            return SendResult::Dropped;
        }

        // SAFETY: Single producer; this slot is outside the readable window
        // until write_idx is published below.
        unsafe {
            (*self.slots.get())[(write as usize) & Self::MASK] = byte;
        }

        self.write_idx.store(write.wrapping_add(1), Ordering::Release);
        SendResult::Accepted
    }

    /// Dequeue one byte without blocking.
    #[inline]
    pub fn try_recv(&self) -> Option<u8> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        // SAFETY: Single consumer; the slot was published by the producer's
        // Release store and is not recycled until read_idx advances.
        let byte = unsafe { (*self.slots.get())[(read as usize) & Self::MASK] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(byte)
    }

    /// Dequeue one byte, blocking the calling task until one is available
    /// or the timeout elapses.
    ///
    /// Callable only from task context. Waiting is a poll-and-sleep loop on
    /// the platform tick ([`port::sleep_tick`]), so the task yields while
    /// the ring is empty.
    pub fn recv(&self, timeout: RecvTimeout) -> Recv {
        if let Some(byte) = self.try_recv() {
            return Recv::Byte(byte);
        }

        let ticks = match timeout {
            RecvTimeout::Forever | RecvTimeout::Ticks(0) => loop {
                port::sleep_tick();
                if let Some(byte) = self.try_recv() {
                    return Recv::Byte(byte);
                }
            },
            RecvTimeout::Ticks(n) => n,
        };

        for _ in 0..ticks {
            port::sleep_tick();
            if let Some(byte) = self.try_recv() {
                return Recv::Byte(byte);
            }
        }
        Recv::TimedOut
    }

    /// Number of unread bytes.
    #[inline]
    pub fn len(&self) -> usize {
        let write = self.write_idx.load(Ordering::Acquire);
        let read = self.read_idx.load(Ordering::Acquire);
        write.wrapping_sub(read) as usize
    }

    /// Check for unread bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the ring capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for ByteChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}
