use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

type LockMap = HashMap<Uuid, Arc<Mutex<()>>>;

/// One async mutex per job. Holding a job's guard makes
/// "update an application's scores, then re-rank the job" a single unit with
/// respect to every other submission for that job in this process.
///
/// Entries only live while someone holds or waits for them, so the map stays
/// as small as the number of jobs with in-flight submissions.
#[derive(Default)]
pub struct JobLocks {
    locks: Arc<StdMutex<LockMap>>,
}

/// Releases the job's mutex on drop and prunes its entry once no other task
/// holds or awaits it.
pub struct JobGuard {
    job_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<StdMutex<LockMap>>,
}

impl JobLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, job_id: Uuid) -> JobGuard {
        let lock = lock_map(&self.locks).entry(job_id).or_default().clone();
        JobGuard {
            job_id,
            guard: Some(lock.lock_owned().await),
            locks: self.locks.clone(),
        }
    }

    #[cfg(test)]
    fn tracked_jobs(&self) -> usize {
        lock_map(&self.locks).len()
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = lock_map(&self.locks);
        // Waiters clone the Arc under the map lock, so a count of 1 means the map is the only owner.
        if locks
            .get(&self.job_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.job_id);
        }
    }
}

// The map holds no invariant a panicking holder could break.
fn lock_map(locks: &StdMutex<LockMap>) -> MutexGuard<'_, LockMap> {
    locks.lock().unwrap_or_else(PoisonError::into_inner)
}
