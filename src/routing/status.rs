//! Per-worker capacity status for the `status` command.

use crate::tracker::CapacitySnapshot;
use crate::worker::WorkerId;
use serde::Serialize;
use std::fmt;

/// Below this available percentage an available worker is reported as low.
pub const LOW_CAPACITY_PERCENT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Available,
    Low,
    Limited,
    Error,
}

impl StatusLevel {
    pub fn from_snapshot(snapshot: &CapacitySnapshot) -> Self {
        if !snapshot.is_available {
            StatusLevel::Limited
        } else if snapshot.available_percent < LOW_CAPACITY_PERCENT {
            StatusLevel::Low
        } else {
            StatusLevel::Available
        }
    }
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusLevel::Available => "available",
            StatusLevel::Low => "low",
            StatusLevel::Limited => "limited",
            StatusLevel::Error => "error",
        };
        f.write_str(s)
    }
}

/// One row of the status table.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatus {
    pub worker: WorkerId,
    pub worker_name: String,
    pub available_percent: f64,
    pub remaining_minutes: u32,
    pub current_spend: f64,
    pub is_available: bool,
    pub status: StatusLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkerStatus {
    pub fn from_snapshot(worker: WorkerId, worker_name: String, snapshot: &CapacitySnapshot) -> Self {
        Self {
            worker,
            worker_name,
            available_percent: snapshot.available_percent,
            remaining_minutes: snapshot.remaining_minutes,
            current_spend: snapshot.current_spend,
            is_available: snapshot.is_available,
            status: StatusLevel::from_snapshot(snapshot),
            error: None,
        }
    }

    pub fn failed(worker: WorkerId, worker_name: String, error: String) -> Self {
        Self {
            worker,
            worker_name,
            available_percent: 0.0,
            remaining_minutes: 0,
            current_spend: 0.0,
            is_available: false,
            status: StatusLevel::Error,
            error: Some(error),
        }
    }
}
