use tokio::sync::{Mutex, MutexGuard};

/// Process-wide lock serializing every board mutation.
///
/// One lock covers all slots. It is held only across the read-modify-write
/// against the store and is released when the returned permit drops, on both
/// success and error paths. Not re-entrant.
#[derive(Debug, Default)]
pub struct ReservationGuard {
    lock: Mutex<()>,
}

/// Proof that the caller holds the [`ReservationGuard`].
pub struct ReservationPermit<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl ReservationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the board.
    pub async fn acquire(&self) -> ReservationPermit<'_> {
        ReservationPermit {
            _guard: self.lock.lock().await,
        }
    }

    /// Whether some operation currently holds the guard.
    pub fn is_held(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn permit_releases_on_drop() {
        let guard = ReservationGuard::new();
        {
            let _permit = guard.acquire().await;
            assert!(guard.is_held());
        }
        assert!(!guard.is_held());
    }

    #[tokio::test]
    async fn second_acquire_waits() {
        let guard = Arc::new(ReservationGuard::new());
        let permit = guard.acquire().await;

        let waiter = {
            let guard = guard.clone();
            tokio::spawn(async move {
                let _permit = guard.acquire().await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(permit);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should acquire after release")
            .unwrap();
    }
}
