//! Tracker returning configured values, for tools without a usage API.

use super::{CapacitySnapshot, CapacityTracker, TrackerError};
use crate::worker::WorkerId;
use async_trait::async_trait;

pub struct StaticTracker {
    worker: WorkerId,
    snapshot: CapacitySnapshot,
}

impl StaticTracker {
    pub fn new(worker: WorkerId, snapshot: CapacitySnapshot) -> Self {
        Self { worker, snapshot }
    }

    /// Always fully available, free of spend.
    pub fn unlimited(worker: WorkerId) -> Self {
        Self::new(worker, CapacitySnapshot::new(100.0, 0, 0.0))
    }
}

#[async_trait]
impl CapacityTracker for StaticTracker {
    fn worker(&self) -> &WorkerId {
        &self.worker
    }

    async fn available_percent(&self) -> Result<f64, TrackerError> {
        Ok(self.snapshot.available_percent)
    }

    async fn remaining_minutes(&self) -> Result<u32, TrackerError> {
        Ok(self.snapshot.remaining_minutes)
    }

    async fn current_spend(&self) -> Result<f64, TrackerError> {
        Ok(self.snapshot.current_spend)
    }

    async fn snapshot(&self) -> Result<CapacitySnapshot, TrackerError> {
        Ok(self.snapshot)
    }
}
