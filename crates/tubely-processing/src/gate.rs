use crate::error::{ProcessingError, ProcessingResult};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Caps the number of media tool subprocesses running at once.
///
/// Cloning shares the same permits.
#[derive(Clone, Debug)]
pub struct ProcessingGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ProcessingGate {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a free slot. The slot is released when the permit drops.
    pub async fn acquire(&self) -> ProcessingResult<OwnedSemaphorePermit> {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ProcessingError::GateClosed)
    }
}
