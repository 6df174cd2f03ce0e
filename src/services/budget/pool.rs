//! Process-wide replenishing token pool.

use super::decision::{decide_shared, Admission};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A single allowance shared by every client of the process.
///
/// Admission and replenishment go through the same mutex, so concurrent
/// requests can neither over-admit nor lose a replenishment.
#[derive(Debug)]
pub struct TokenPool {
    tokens: Mutex<u32>,
    ceiling: u32,
}

impl TokenPool {
    /// Create a pool holding `initial` tokens, clamped to `ceiling`.
    pub fn new(initial: u32, ceiling: u32) -> Self {
        Self {
            tokens: Mutex::new(initial.min(ceiling)),
            ceiling,
        }
    }

    // The guarded value is a plain counter, so a poisoned lock is still usable
    fn lock(&self) -> MutexGuard<'_, u32> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn available(&self) -> u32 {
        *self.lock()
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Take one token if any is left.
    pub fn try_acquire(&self) -> Admission {
        let mut tokens = self.lock();
        let decision = decide_shared(*tokens);
        if decision.admitted {
            *tokens = decision.next;
        }
        decision
    }

    /// Grant one token back. Returns `false` when the pool is already full.
    pub fn replenish(&self) -> bool {
        let mut tokens = self.lock();
        if *tokens >= self.ceiling {
            return false;
        }
        *tokens += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    };

    #[test]
    fn test_acquire_until_empty() {
        let pool = TokenPool::new(2, 5);
        assert_eq!(pool.try_acquire(), Admission::admit(1));
        assert_eq!(pool.try_acquire(), Admission::admit(0));
        assert_eq!(pool.try_acquire(), Admission::deny());
        assert_eq!(pool.available(), 0, "a denied request must not decrement further");
    }

    #[test]
    fn test_initial_value_clamped_to_ceiling() {
        let pool = TokenPool::new(50, 10);
        assert_eq!(pool.available(), 10);
        assert_eq!(pool.ceiling(), 10);
    }

    #[test]
    fn test_replenish_capped_at_ceiling() {
        let pool = TokenPool::new(1, 3);
        assert!(pool.replenish());
        assert!(pool.replenish());
        assert_eq!(pool.available(), 3);
        assert!(!pool.replenish(), "no increment once at the ceiling");
        assert_eq!(pool.available(), 3);
    }

    #[test]
    fn test_concurrent_admission_never_over_admits() {
        let pool = Arc::new(TokenPool::new(50, 50));
        let admitted = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let admitted = Arc::clone(&admitted);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        if pool.try_acquire().admitted {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 50);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_concurrent_replenish_and_acquire_stay_in_bounds() {
        let pool = Arc::new(TokenPool::new(5, 5));
        let refill = {
            let pool = Arc::clone(&pool);
            std::thread::spawn(move || {
                for _ in 0..1_000 {
                    pool.replenish();
                    assert!(pool.available() <= 5);
                }
            })
        };
        let drain = {
            let pool = Arc::clone(&pool);
            std::thread::spawn(move || {
                for _ in 0..1_000 {
                    pool.try_acquire();
                }
            })
        };
        refill.join().unwrap();
        drain.join().unwrap();
        assert!(pool.available() <= pool.ceiling());
    }
}
