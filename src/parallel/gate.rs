//! Counting admission gate bounding concurrently analyzed files
//!
//! A bounded channel doubles as a semaphore: acquiring sends a token (blocking
//! while every slot is taken), releasing takes one back out.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct AdmissionGate {
    slots: Sender<()>,
    released: Receiver<()>,
    capacity: usize,
    peak: AtomicUsize,
}

/// Held by a worker for as long as its file is in flight
pub struct Permit<'a> {
    gate: &'a AdmissionGate,
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (slots, released) = bounded(capacity);
        Self {
            slots,
            released,
            capacity,
            peak: AtomicUsize::new(0),
        }
    }

    /// Block until a slot is free
    pub fn acquire(&self) -> Permit<'_> {
        // Both ends live in `self`, so the channel cannot be disconnected here
        let _ = self.slots.send(());
        self.peak.fetch_max(self.slots.len(), Ordering::Relaxed);
        Permit { gate: self }
    }

    pub fn in_use(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Highest number of simultaneously held permits observed
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        let _ = self.gate.released.try_recv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_zero_capacity_is_clamped() {
        let gate = AdmissionGate::new(0);
        assert_eq!(gate.capacity(), 1);
        let _permit = gate.acquire();
        assert_eq!(gate.in_use(), 1);
    }

    #[test]
    fn test_release_on_drop() {
        let gate = AdmissionGate::new(2);
        {
            let _a = gate.acquire();
            let _b = gate.acquire();
            assert_eq!(gate.in_use(), 2);
        }
        assert_eq!(gate.in_use(), 0);
        assert_eq!(gate.peak(), 2);
    }

    #[test]
    fn test_bound_holds_under_contention() {
        let gate = AdmissionGate::new(3);
        let active = AtomicUsize::new(0);
        let max_seen = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..12 {
                let permit = gate.acquire();
                let active = &active;
                let max_seen = &max_seen;
                scope.spawn(move || {
                    let _permit = permit;
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(5));
                    active.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });

        assert!(max_seen.load(Ordering::SeqCst) <= 3);
        assert!(gate.peak() <= 3);
        assert_eq!(gate.in_use(), 0);
    }
}
