//! Delivery identifier generator
//!
//! Ids are process-local: a restart begins again at 1.

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out strictly increasing ids, safe to share across publish calls
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id, greater than every id returned before it
    pub fn next_id(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Most recently issued id, 0 if none yet
    pub fn last_issued(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn starts_at_one_and_increases() {
        let ids = IdGenerator::new();
        assert_eq!(ids.last_issued(), 0);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
        assert_eq!(ids.last_issued(), 3);
    }

    #[test]
    fn concurrent_callers_never_share_an_id() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 1_000;

        let ids = Arc::new(IdGenerator::new());
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || {
                    let issued: Vec<u64> = (0..PER_THREAD).map(|_| ids.next_id()).collect();
                    // Each caller observes its own ids in increasing order
                    assert!(issued.windows(2).all(|w| w[0] < w[1]));
                    issued
                })
            })
            .collect();

        let all: HashSet<u64> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(all.len(), THREADS * PER_THREAD);
        assert_eq!(all.iter().max().copied(), Some((THREADS * PER_THREAD) as u64));
    }
}
