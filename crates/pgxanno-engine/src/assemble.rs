//! Record assembly: ID allocation plus sentence rendering.

use std::sync::atomic::{AtomicU64, Ordering};

use pgxanno_core::{AnnotationRecord, ResolvedAnnotation};

/// Per-document Variant Annotation ID source.
///
/// Starts at 1. Every call to [`next`](Self::next) consumes one ID, even if
/// the record it labels later fails validation. Safe to share across threads.
#[derive(Debug)]
pub struct SequenceCounter {
    next: AtomicU64,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// How many IDs have been handed out.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed) - 1
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Combine resolved fields into a record with the next ID.
pub fn assemble(resolved: ResolvedAnnotation, counter: &SequenceCounter) -> AnnotationRecord {
    AnnotationRecord::new(counter.next(), resolved)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn counter_starts_at_one() {
        let c = SequenceCounter::new();
        assert_eq!(c.issued(), 0);
        assert_eq!(c.next(), 1);
        assert_eq!(c.next(), 2);
        assert_eq!(c.issued(), 2);
    }

    #[test]
    fn concurrent_ids_are_unique() {
        let c = Arc::new(SequenceCounter::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = Arc::clone(&c);
                std::thread::spawn(move || (0..250).map(|_| c.next()).collect::<Vec<_>>())
            })
            .collect();
        let mut ids: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=1000).collect::<Vec<_>>());
    }
}
